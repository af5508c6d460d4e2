//! Tests for the item service.

use std::sync::Arc;

use chrono::NaiveDate;
use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::MockItemRepository;
use crate::domain::{ErrorCode, ItemDescription, ItemTitle, Priority, Role, UserId};

#[fixture]
fn caller() -> Caller {
    Caller::new(UserId::generate(), Role::User)
}

#[fixture]
fn fields() -> ItemFields {
    ItemFields {
        title: ItemTitle::new("Buy milk").expect("valid title"),
        priority: Priority::High,
        description: ItemDescription::default(),
        due_date: NaiveDate::from_ymd_opt(2025, 1, 31).expect("valid date"),
    }
}

fn service(repo: MockItemRepository) -> ItemService<MockItemRepository> {
    ItemService::new(Arc::new(repo))
}

#[rstest]
#[tokio::test]
async fn create_assigns_caller_as_owner(caller: Caller, fields: ItemFields) {
    let owner = caller.user_id;
    let mut repo = MockItemRepository::new();
    repo.expect_create()
        .withf(move |item| item.owner() == &owner)
        .times(1)
        .returning(|item| Ok(item.clone()));

    let item = service(repo)
        .create_item(&caller, fields)
        .await
        .expect("created");

    assert_eq!(item.owner(), &owner);
    assert_eq!(item.title().as_ref(), "Buy milk");
}

#[rstest]
#[tokio::test]
async fn reads_are_scoped_by_owner(caller: Caller) {
    let id = ItemId::generate();
    let owner = caller.user_id;
    let mut repo = MockItemRepository::new();
    repo.expect_find_owned()
        .with(eq(id), eq(owner))
        .times(1)
        .return_once(|_, _| Ok(None));

    let err = service(repo)
        .get_item(&caller, id)
        .await
        .expect_err("foreign item hidden");

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(
        err.message(),
        format!("Item with id: {id} cannot be found. Check Id again in URL")
    );
}

#[rstest]
#[tokio::test]
async fn zero_row_update_matches_missing_read(caller: Caller) {
    let id = ItemId::generate();
    let mut repo = MockItemRepository::new();
    repo.expect_update_owned().return_once(|_, _, _| Ok(0));
    repo.expect_find_owned().times(0);

    let changes = ItemChanges {
        priority: Some(Priority::Low),
        ..ItemChanges::default()
    };
    let err = service(repo)
        .update_item(&caller, id, changes)
        .await
        .expect_err("not found");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn update_returns_re_read_item(caller: Caller, fields: ItemFields) {
    let id = ItemId::generate();
    let owner = caller.user_id;
    let stored = Item::new(
        id,
        owner,
        ItemFields {
            priority: Priority::Low,
            ..fields
        },
    );
    let mut repo = MockItemRepository::new();
    repo.expect_update_owned()
        .withf(move |item_id, user_id, changes| {
            *item_id == id && *user_id == owner && changes.priority == Some(Priority::Low)
        })
        .times(1)
        .return_once(|_, _, _| Ok(1));
    repo.expect_find_owned()
        .times(1)
        .return_once(move |_, _| Ok(Some(stored)));

    let changes = ItemChanges {
        priority: Some(Priority::Low),
        ..ItemChanges::default()
    };
    let item = service(repo)
        .update_item(&caller, id, changes)
        .await
        .expect("updated");

    assert_eq!(item.priority(), Priority::Low);
}

#[rstest]
#[case(1, None)]
#[case(0, Some(ErrorCode::NotFound))]
#[tokio::test]
async fn delete_maps_zero_rows_to_not_found(
    caller: Caller,
    #[case] deleted: u64,
    #[case] expected: Option<ErrorCode>,
) {
    let mut repo = MockItemRepository::new();
    repo.expect_delete_owned()
        .return_once(move |_, _| Ok(deleted));

    let result = service(repo).delete_item(&caller, ItemId::generate()).await;

    assert_eq!(result.err().map(|err| err.code()), expected);
}

#[rstest]
#[tokio::test]
async fn list_is_scoped_to_caller(caller: Caller) {
    let owner = caller.user_id;
    let mut repo = MockItemRepository::new();
    repo.expect_list_owned()
        .withf(move |user_id, _| *user_id == owner)
        .times(1)
        .return_once(|_, pagination| Ok(Page::new(Vec::new(), 0, *pagination)));

    let page = service(repo)
        .list_items(&caller, Pagination::default())
        .await
        .expect("listed");

    assert_eq!(page.total, 0);
    assert_eq!(page.limit, 2);
}

#[rstest]
#[case(ItemRepositoryError::connection("timeout"), ErrorCode::ServiceUnavailable)]
#[case(ItemRepositoryError::query("bad row"), ErrorCode::InternalError)]
#[case(ItemRepositoryError::conflict("owner missing"), ErrorCode::Conflict)]
#[tokio::test]
async fn repository_failures_map_to_error_codes(
    caller: Caller,
    #[case] failure: ItemRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockItemRepository::new();
    repo.expect_list_owned()
        .return_once(move |_, _| Err(failure));

    let err = service(repo)
        .list_items(&caller, Pagination::default())
        .await
        .expect_err("failure");

    assert_eq!(err.code(), expected);
}

#[rstest]
#[tokio::test]
async fn conflicts_hide_database_detail(caller: Caller, fields: ItemFields) {
    let mut repo = MockItemRepository::new();
    repo.expect_create().return_once(|_| {
        Err(ItemRepositoryError::conflict(
            "insert or update on table \"items\" violates foreign key constraint \"items_owner_id_fkey\"",
        ))
    });

    let err = service(repo)
        .create_item(&caller, fields)
        .await
        .expect_err("conflict");

    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.message(), ITEM_CONFLICT_MESSAGE);
    assert!(!err.message().contains("items_owner_id_fkey"));
}
