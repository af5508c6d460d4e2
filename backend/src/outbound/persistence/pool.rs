//! bb8 pool of `diesel-async` PostgreSQL connections.
//!
//! Only the pool ceiling is configurable; `db_max_connections` feeds it from
//! settings. A checkout that waits longer than [`CHECKOUT_TIMEOUT`] fails with
//! [`PoolError::Checkout`], which the repositories report as a connection
//! error and the HTTP layer as 503.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

/// Longest a request waits for a free connection.
pub const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(5);

const DEFAULT_MAX_SIZE: u32 = 10;

/// Failure to build the pool or to hand out a connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// No connection could be handed out.
    #[error("failed to get connection from pool: {message}")]
    Checkout { message: String },

    /// The pool itself could not be set up.
    #[error("failed to build connection pool: {message}")]
    Build { message: String },
}

impl PoolError {
    /// [`PoolError::Checkout`] carrying `message`.
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    /// [`PoolError::Build`] carrying `message`.
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

/// Where to connect and how many connections to hold at most.
///
/// ```
/// use taskhub::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("postgres://taskhub@localhost/taskhub").with_max_size(4);
/// assert_eq!(config.max_size(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
}

impl PoolConfig {
    /// Ten connections unless [`with_max_size`](Self::with_max_size) says otherwise.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: DEFAULT_MAX_SIZE,
        }
    }

    /// Cap the pool at `max_size` connections.
    pub fn with_max_size(self, max_size: u32) -> Self {
        Self { max_size, ..self }
    }

    /// Connection ceiling.
    pub fn max_size(&self) -> u32 {
        self.max_size
    }
}

/// Shared handle to the pool; clones point at the same connections.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Build the pool. Connections are opened lazily on first checkout.
    ///
    /// # Errors
    ///
    /// [`PoolError::Build`] for a zero-sized pool or when bb8 refuses the
    /// manager.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        if config.max_size == 0 {
            return Err(PoolError::build("pool needs room for at least one connection"));
        }
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.database_url);
        let inner = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(CHECKOUT_TIMEOUT)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;
        Ok(Self { inner })
    }

    /// Check out a connection, waiting at most [`CHECKOUT_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// [`PoolError::Checkout`] when none frees up in time or PostgreSQL
    /// refuses a new one.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}
