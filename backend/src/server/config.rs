//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use taskhub::domain::NewUser;
use taskhub::inbound::http::session_config::SessionSettings;
use taskhub::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) bootstrap_admin: Option<NewUser>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        Self {
            session,
            bind_addr,
            db_pool: None,
            bootstrap_admin: None,
        }
    }

    /// Attach a database connection pool.
    ///
    /// Without one the server runs on the in-memory repositories.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Administrator account created at startup unless its username exists.
    #[must_use]
    pub fn with_bootstrap_admin(mut self, admin: Option<NewUser>) -> Self {
        self.bootstrap_admin = admin;
        self
    }
}
