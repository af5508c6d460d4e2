//! In-memory `ItemRepository`.

use async_trait::async_trait;
use pagination::{Page, Pagination};

use crate::domain::ports::{ItemRepository, ItemRepositoryError};
use crate::domain::{Item, ItemChanges, ItemFields, ItemId, UserId};

use super::{InMemoryStore, PoisonedStore, paginate};

impl From<PoisonedStore> for ItemRepositoryError {
    fn from(_: PoisonedStore) -> Self {
        Self::query("in-memory store poisoned")
    }
}

/// Mutex-guarded item table keyed by item id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryItemRepository {
    store: InMemoryStore,
}

impl InMemoryItemRepository {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn create(&self, item: &Item) -> Result<Item, ItemRepositoryError> {
        let mut state = self.store.lock()?;
        if !state.users.contains_key(item.owner()) {
            return Err(ItemRepositoryError::conflict(
                "foreign key constraint violated: items_user_id_fkey",
            ));
        }
        if state.items.contains_key(item.id()) {
            return Err(ItemRepositoryError::conflict(
                "unique constraint violated: items_pkey",
            ));
        }
        state.items.insert(*item.id(), item.clone());
        Ok(item.clone())
    }

    async fn find_owned(
        &self,
        id: &ItemId,
        owner: &UserId,
    ) -> Result<Option<Item>, ItemRepositoryError> {
        let state = self.store.lock()?;
        Ok(state
            .items
            .get(id)
            .filter(|item| item.owner() == owner)
            .cloned())
    }

    async fn update_owned(
        &self,
        id: &ItemId,
        owner: &UserId,
        changes: &ItemChanges,
    ) -> Result<u64, ItemRepositoryError> {
        let mut state = self.store.lock()?;
        let Some(item) = state.items.get_mut(id).filter(|item| item.owner() == owner) else {
            return Ok(0);
        };
        let fields = ItemFields {
            title: changes.title.clone().unwrap_or_else(|| item.title().clone()),
            priority: changes.priority.unwrap_or(item.priority()),
            description: changes
                .description
                .clone()
                .unwrap_or_else(|| item.description().clone()),
            due_date: changes.due_date.unwrap_or(item.due_date()),
        };
        *item = Item::new(*id, *owner, fields);
        Ok(1)
    }

    async fn delete_owned(&self, id: &ItemId, owner: &UserId) -> Result<u64, ItemRepositoryError> {
        let mut state = self.store.lock()?;
        if !state.items.get(id).is_some_and(|item| item.owner() == owner) {
            return Ok(0);
        }
        state.items.remove(id);
        Ok(1)
    }

    async fn list_owned(
        &self,
        owner: &UserId,
        pagination: &Pagination,
    ) -> Result<Page<Item>, ItemRepositoryError> {
        let state = self.store.lock()?;
        let owned: Vec<Item> = state
            .items
            .values()
            .filter(|item| item.owner() == owner)
            .cloned()
            .collect();
        Ok(paginate(owned.into_iter(), pagination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::UserRepository;
    use crate::domain::{
        EmailAddress, ItemDescription, ItemTitle, NewUserRecord, PasswordDigest, PersonName,
        Priority, Role, UserProfile, Username, parse_due_date,
    };
    use rstest::{fixture, rstest};

    struct Fixture {
        users: crate::outbound::memory::InMemoryUserRepository,
        items: InMemoryItemRepository,
    }

    #[fixture]
    fn store() -> Fixture {
        let (users, items) = InMemoryStore::new().repositories();
        Fixture { users, items }
    }

    async fn owner(fx: &Fixture, username: &str) -> UserId {
        let record = NewUserRecord {
            id: UserId::generate(),
            profile: UserProfile {
                name: PersonName::new("Owner").expect("valid name"),
                username: Username::new(username).expect("valid username"),
                email: EmailAddress::new(format!("{username}@example.com")).expect("valid email"),
            },
            role: Role::User,
            password_digest: PasswordDigest::new("$argon2id$stub"),
        };
        *fx.users.create(&record).await.expect("insert owner").id()
    }

    fn item(owner: UserId, title: &str) -> Item {
        Item::new(
            ItemId::generate(),
            owner,
            ItemFields {
                title: ItemTitle::new(title).expect("valid title"),
                priority: Priority::Medium,
                description: ItemDescription::default(),
                due_date: parse_due_date("2025-03-01").expect("valid date"),
            },
        )
    }

    #[rstest]
    #[tokio::test]
    async fn items_are_invisible_to_other_owners(store: Fixture) {
        let alice = owner(&store, "alice").await;
        let bob = owner(&store, "bob_b").await;
        let milk = store
            .items
            .create(&item(alice, "Buy milk"))
            .await
            .expect("insert");

        assert!(store.items.find_owned(milk.id(), &bob).await.expect("find").is_none());
        assert_eq!(
            store
                .items
                .update_owned(milk.id(), &bob, &ItemChanges::default())
                .await
                .expect("update"),
            0
        );
        assert_eq!(store.items.delete_owned(milk.id(), &bob).await.expect("delete"), 0);
        assert!(store.items.find_owned(milk.id(), &alice).await.expect("find").is_some());
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_owner_is_a_conflict(store: Fixture) {
        let err = store
            .items
            .create(&item(UserId::generate(), "Orphan"))
            .await
            .expect_err("rejected");
        assert!(matches!(err, ItemRepositoryError::Conflict { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn update_keeps_untouched_fields(store: Fixture) {
        let alice = owner(&store, "alice").await;
        let milk = store
            .items
            .create(&item(alice, "Buy milk"))
            .await
            .expect("insert");
        let changes = ItemChanges {
            priority: Some(Priority::High),
            ..ItemChanges::default()
        };

        store
            .items
            .update_owned(milk.id(), &alice, &changes)
            .await
            .expect("update");
        let stored = store
            .items
            .find_owned(milk.id(), &alice)
            .await
            .expect("find")
            .expect("present");

        assert_eq!(stored.priority(), Priority::High);
        assert_eq!(stored.title().as_ref(), "Buy milk");
    }

    #[rstest]
    #[tokio::test]
    async fn list_counts_only_owned_items(store: Fixture) {
        let alice = owner(&store, "alice").await;
        let bob = owner(&store, "bob_b").await;
        for n in 0..5 {
            store
                .items
                .create(&item(alice, &format!("Task {n}")))
                .await
                .expect("insert");
        }
        store.items.create(&item(bob, "Other")).await.expect("insert");

        let page = store
            .items
            .list_owned(&alice, &Pagination::default())
            .await
            .expect("list");

        assert_eq!(page.total, 5);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].title().as_ref(), "Task 0");
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_the_owner_removes_their_items(store: Fixture) {
        let alice = owner(&store, "alice").await;
        let milk = store
            .items
            .create(&item(alice, "Buy milk"))
            .await
            .expect("insert");

        store.users.delete(&alice).await.expect("delete owner");

        assert!(store.items.find_owned(milk.id(), &alice).await.expect("find").is_none());
    }
}
