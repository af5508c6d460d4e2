//! Builders wiring repositories into the services behind [`HttpState`].

use std::sync::Arc;

use taskhub::domain::ports::{ItemRepository, UserRepository};
use taskhub::domain::{CredentialsLoginService, ItemService, NewUser, UserService};
use taskhub::inbound::http::state::HttpState;
use taskhub::outbound::memory::InMemoryStore;
use taskhub::outbound::password::Argon2PasswordHasher;
use taskhub::outbound::persistence::{DbPool, DieselItemRepository, DieselUserRepository};
use tracing::info;

/// Build the HTTP state on PostgreSQL when a pool is configured, otherwise on
/// a fresh in-memory store.
///
/// # Errors
/// Returns [`std::io::Error`] when the bootstrap administrator cannot be
/// created.
pub(crate) async fn build_http_state(
    db_pool: Option<&DbPool>,
    bootstrap_admin: Option<NewUser>,
) -> std::io::Result<HttpState> {
    match db_pool {
        Some(pool) => {
            assemble(
                Arc::new(DieselUserRepository::new(pool.clone())),
                Arc::new(DieselItemRepository::new(pool.clone())),
                bootstrap_admin,
            )
            .await
        }
        None => {
            info!("no database configured; data lives in memory");
            let (users, items) = InMemoryStore::new().repositories();
            assemble(Arc::new(users), Arc::new(items), bootstrap_admin).await
        }
    }
}

async fn assemble<U, I>(
    users: Arc<U>,
    items: Arc<I>,
    bootstrap_admin: Option<NewUser>,
) -> std::io::Result<HttpState>
where
    U: UserRepository + 'static,
    I: ItemRepository + 'static,
{
    let hasher = Arc::new(Argon2PasswordHasher::default());
    let user_service = Arc::new(UserService::new(users.clone(), hasher.clone()));
    if let Some(admin) = bootstrap_admin {
        let username = admin.profile().username.clone();
        match user_service.ensure_admin(admin).await {
            Ok(Some(created)) => info!(user_id = %created.id(), "bootstrap administrator created"),
            Ok(None) => info!(username = %username.as_ref(), "bootstrap administrator already present"),
            Err(err) => {
                return Err(std::io::Error::other(format!(
                    "bootstrap administrator failed: {err}"
                )));
            }
        }
    }
    let item_service = Arc::new(ItemService::new(items));
    let login = Arc::new(CredentialsLoginService::new(users, hasher));
    Ok(HttpState::new(
        login,
        (user_service.clone(), user_service),
        (item_service.clone(), item_service),
    ))
}
