//! In-memory `UserRepository`.

use async_trait::async_trait;
use pagination::{Page, Pagination};

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{
    EmailAddress, NewUserRecord, StoredCredentials, User, UserChanges, UserId, UserProfile,
    Username,
};

use super::{InMemoryStore, PoisonedStore, State, UserEntry, paginate};

impl From<PoisonedStore> for UserRepositoryError {
    fn from(_: PoisonedStore) -> Self {
        Self::query("in-memory store poisoned")
    }
}

/// Mutex-guarded user table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    store: InMemoryStore,
}

impl InMemoryUserRepository {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

fn check_unique(
    state: &State,
    skip: Option<&UserId>,
    username: Option<&Username>,
    email: Option<&EmailAddress>,
) -> Result<(), UserRepositoryError> {
    for (id, entry) in &state.users {
        if Some(id) == skip {
            continue;
        }
        if username.is_some_and(|name| entry.user.username() == name) {
            return Err(UserRepositoryError::conflict(
                "unique constraint violated: users_username_key",
            ));
        }
        if email.is_some_and(|email| entry.user.email() == email) {
            return Err(UserRepositoryError::conflict(
                "unique constraint violated: users_email_key",
            ));
        }
    }
    Ok(())
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, record: &NewUserRecord) -> Result<User, UserRepositoryError> {
        let mut state = self.store.lock()?;
        if state.users.contains_key(&record.id) {
            return Err(UserRepositoryError::conflict(
                "unique constraint violated: users_pkey",
            ));
        }
        check_unique(
            &state,
            None,
            Some(&record.profile.username),
            Some(&record.profile.email),
        )?;
        let user = User::new(record.id, record.profile.clone(), record.role);
        state.users.insert(
            record.id,
            UserEntry {
                user: user.clone(),
                password_digest: record.password_digest.clone(),
            },
        );
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let state = self.store.lock()?;
        Ok(state.users.get(id).map(|entry| entry.user.clone()))
    }

    async fn update(
        &self,
        id: &UserId,
        changes: &UserChanges,
    ) -> Result<u64, UserRepositoryError> {
        let mut state = self.store.lock()?;
        let Some(current) = state.users.get(id).map(|entry| entry.user.clone()) else {
            return Ok(0);
        };
        check_unique(
            &state,
            Some(id),
            changes.username.as_ref(),
            changes.email.as_ref(),
        )?;
        let profile = UserProfile {
            name: changes.name.clone().unwrap_or_else(|| current.name().clone()),
            username: changes
                .username
                .clone()
                .unwrap_or_else(|| current.username().clone()),
            email: changes
                .email
                .clone()
                .unwrap_or_else(|| current.email().clone()),
        };
        if let Some(entry) = state.users.get_mut(id) {
            entry.user = User::new(*id, profile, current.role());
        }
        Ok(1)
    }

    async fn delete(&self, id: &UserId) -> Result<u64, UserRepositoryError> {
        let mut state = self.store.lock()?;
        if state.users.remove(id).is_none() {
            return Ok(0);
        }
        state.items.retain(|_, item| item.owner() != id);
        Ok(1)
    }

    async fn list(&self, pagination: &Pagination) -> Result<Page<User>, UserRepositoryError> {
        let state = self.store.lock()?;
        Ok(paginate(
            state.users.values().map(|entry| entry.user.clone()),
            pagination,
        ))
    }

    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        let state = self.store.lock()?;
        Ok(state
            .users
            .values()
            .find(|entry| entry.user.username() == username)
            .map(|entry| StoredCredentials {
                user_id: *entry.user.id(),
                role: entry.user.role(),
                password_digest: entry.password_digest.clone(),
            }))
    }
}
