//! In-memory repository adapters.
//!
//! Used when no database URL is configured and by the HTTP integration tests.
//! Both repositories share one [`InMemoryStore`], so the foreign-key and
//! cascade rules of the PostgreSQL schema hold here as well: items need an
//! existing owner and vanish with it.

mod item_repository;
mod user_repository;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use pagination::{Page, Pagination};

use crate::domain::{Item, ItemId, User, UserId};

pub use item_repository::InMemoryItemRepository;
pub use user_repository::InMemoryUserRepository;

#[derive(Debug, Clone)]
struct UserEntry {
    user: User,
    password_digest: crate::domain::PasswordDigest,
}

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<UserId, UserEntry>,
    items: BTreeMap<ItemId, Item>,
}

/// Shared state behind the in-memory repositories.
///
/// The lock is never held across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pair over this store.
    pub fn repositories(&self) -> (InMemoryUserRepository, InMemoryItemRepository) {
        (
            InMemoryUserRepository::new(self.clone()),
            InMemoryItemRepository::new(self.clone()),
        )
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, PoisonedStore> {
        self.state.lock().map_err(|_| PoisonedStore)
    }
}

/// A previous holder of the lock panicked.
struct PoisonedStore;

/// Slice one page out of an id-ordered iterator.
fn paginate<T>(ordered: impl ExactSizeIterator<Item = T>, pagination: &Pagination) -> Page<T> {
    let total = ordered.len() as u64;
    let skip = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
    let data = ordered
        .skip(skip)
        .take(pagination.page_size() as usize)
        .collect();
    Page::new(data, total, *pagination)
}
