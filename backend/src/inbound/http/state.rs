//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{ItemCommand, ItemQuery, LoginService, UserCommand, UserQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UserCommand>,
    pub users_query: Arc<dyn UserQuery>,
    pub items: Arc<dyn ItemCommand>,
    pub items_query: Arc<dyn ItemQuery>,
}

impl HttpState {
    /// Bundle the driving ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use taskhub::domain::{CredentialsLoginService, ItemService, UserService};
    /// use taskhub::inbound::http::state::HttpState;
    /// use taskhub::outbound::memory::InMemoryStore;
    /// use taskhub::outbound::password::Argon2PasswordHasher;
    ///
    /// let (users, items) = InMemoryStore::new().repositories();
    /// let users = Arc::new(users);
    /// let hasher = Arc::new(Argon2PasswordHasher::default());
    /// let user_service = Arc::new(UserService::new(users.clone(), hasher.clone()));
    /// let item_service = Arc::new(ItemService::new(Arc::new(items)));
    ///
    /// let state = HttpState::new(
    ///     Arc::new(CredentialsLoginService::new(users, hasher)),
    ///     (user_service.clone(), user_service),
    ///     (item_service.clone(), item_service),
    /// );
    /// let _login = state.login.clone();
    /// ```
    pub fn new(
        login: Arc<dyn LoginService>,
        (users, users_query): (Arc<dyn UserCommand>, Arc<dyn UserQuery>),
        (items, items_query): (Arc<dyn ItemCommand>, Arc<dyn ItemQuery>),
    ) -> Self {
        Self {
            login,
            users,
            users_query,
            items,
            items_query,
        }
    }
}
