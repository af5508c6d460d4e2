//! Request middleware.
//!
//! Purpose: define middleware components for request lifecycle concerns such
//! as tracing and role gating.

pub mod authorization;
pub mod trace;

pub use authorization::RequireRole;
pub use trace::Trace;
