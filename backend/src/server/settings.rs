//! Process settings loaded via OrthoConfig.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use ortho_config::OrthoConfig;
use serde::Deserialize;
use taskhub::domain::{
    EmailAddress, NewUser, Password, PersonName, Role, UserProfile, UserValidationError, Username,
};

const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
const DEFAULT_ADMIN_NAME: &str = "Administrator";

/// Listener, database and bootstrap settings (`TASKHUB_*`).
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TASKHUB")]
pub struct ServerSettings {
    /// Address to bind. Defaults to all interfaces.
    pub host: Option<IpAddr>,
    /// Port to bind.
    #[ortho_config(default = 8080)]
    pub port: u16,
    /// PostgreSQL URL. Without one the server keeps data in memory.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    #[ortho_config(default = 10)]
    pub db_max_connections: u32,
    /// Username of the administrator created at startup, if absent.
    pub bootstrap_admin_username: Option<String>,
    pub bootstrap_admin_password: Option<String>,
    pub bootstrap_admin_email: Option<String>,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host.unwrap_or(DEFAULT_HOST), self.port)
    }

    /// Administrator account to ensure at startup.
    ///
    /// `None` unless username, password and email are all set.
    pub fn bootstrap_admin(&self) -> Result<Option<NewUser>, UserValidationError> {
        let (Some(username), Some(password), Some(email)) = (
            self.bootstrap_admin_username.as_deref(),
            self.bootstrap_admin_password.as_deref(),
            self.bootstrap_admin_email.as_deref(),
        ) else {
            return Ok(None);
        };
        let profile = UserProfile {
            name: PersonName::new(DEFAULT_ADMIN_NAME)?,
            username: Username::new(username)?,
            email: EmailAddress::new(email)?,
        };
        Ok(Some(NewUser::new(
            profile,
            Password::new(password)?,
            password,
            Role::Admin,
        )))
    }
}
