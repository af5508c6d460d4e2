//! Readers for the individual session toggles.
//!
//! Every reader goes through [`lenient`]: a debug build logs the problem and
//! keeps the default, a release build returns it.

use actix_web::cookie::SameSite;
use mockable::Env;
use tracing::warn;

use super::{BuildMode, SAMESITE_ENV, SessionConfigError};

const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Keep `fallback` in debug builds, fail with `problem` in release builds.
fn lenient<T>(
    mode: BuildMode,
    fallback: T,
    problem: SessionConfigError,
) -> Result<T, SessionConfigError> {
    match mode {
        BuildMode::Debug => {
            warn!(problem = %problem, "session setting falls back to its default");
            Ok(fallback)
        }
        BuildMode::Release => Err(problem),
    }
}

/// Read a yes/no toggle.
pub(super) fn flag<E: Env>(
    env: &E,
    mode: BuildMode,
    name: &'static str,
    default: bool,
) -> Result<bool, SessionConfigError> {
    let Some(raw) = env.string(name) else {
        return lenient(mode, default, SessionConfigError::MissingEnv { name });
    };
    match spelled_bool(&raw) {
        Some(value) => Ok(value),
        None => lenient(
            mode,
            default,
            SessionConfigError::InvalidEnv {
                name,
                value: raw,
                expected: BOOL_EXPECTED,
            },
        ),
    }
}

/// Read `SESSION_SAMESITE`.
///
/// Debug builds default to `Lax` so local front ends on another port keep
/// their cookie; release builds default to `Strict`. `None` is only accepted
/// alongside a `Secure` cookie.
pub(super) fn same_site<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let default = match mode {
        BuildMode::Debug => SameSite::Lax,
        BuildMode::Release => SameSite::Strict,
    };
    let Some(raw) = env.string(SAMESITE_ENV) else {
        return lenient(mode, default, SessionConfigError::MissingEnv { name: SAMESITE_ENV });
    };
    match spelled_same_site(&raw) {
        Some(SameSite::None) if !cookie_secure => lenient(
            mode,
            SameSite::None,
            SessionConfigError::InsecureSameSiteNone,
        ),
        Some(policy) => Ok(policy),
        None => lenient(
            mode,
            default,
            SessionConfigError::InvalidEnv {
                name: SAMESITE_ENV,
                value: raw,
                expected: SAMESITE_EXPECTED,
            },
        ),
    }
}

fn spelled_bool(raw: &str) -> Option<bool> {
    const TRUE: [&str; 4] = ["1", "true", "yes", "y"];
    const FALSE: [&str; 4] = ["0", "false", "no", "n"];
    if TRUE.iter().any(|word| raw.eq_ignore_ascii_case(word)) {
        Some(true)
    } else if FALSE.iter().any(|word| raw.eq_ignore_ascii_case(word)) {
        Some(false)
    } else {
        None
    }
}

fn spelled_same_site(raw: &str) -> Option<SameSite> {
    [SameSite::Strict, SameSite::Lax, SameSite::None]
        .into_iter()
        .find(|policy| raw.eq_ignore_ascii_case(&policy.to_string()))
}
