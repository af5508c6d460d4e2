//! Tests for items API handlers.

use super::*;
use crate::domain::access::Caller;
use crate::domain::ports::{
    MockItemCommand, MockItemQuery, MockLoginService, MockUserCommand, MockUserQuery,
};
use crate::domain::{ItemId, Role, UserId, item_not_found};
use crate::inbound::http::configure_api;
use crate::inbound::http::test_utils::{
    login_request, resolving_login, session_cookie, test_login_resource, test_session_middleware,
};
use actix_web::http::StatusCode;
use actix_web::{App, test};
use chrono::NaiveDate;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use std::sync::Arc;

#[fixture]
fn caller() -> Caller {
    Caller::new(UserId::generate(), Role::User)
}

fn state(items: MockItemCommand, items_query: MockItemQuery) -> HttpState {
    HttpState::new(
        Arc::new(MockLoginService::new()),
        (Arc::new(MockUserCommand::new()), Arc::new(MockUserQuery::new())),
        (Arc::new(items), Arc::new(items_query)),
    )
}

fn sample_item(owner: UserId) -> Item {
    Item::new(
        ItemId::generate(),
        owner,
        ItemFields {
            title: ItemTitle::new("Buy milk").expect("title"),
            priority: Priority::High,
            description: ItemDescription::default(),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 31).expect("date"),
        },
    )
}

async fn call_as(
    mut state: HttpState,
    caller: Option<Caller>,
    request: test::TestRequest,
) -> (StatusCode, Value) {
    state.login = Arc::new(resolving_login(caller));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .wrap(test_session_middleware())
            .service(test_login_resource())
            .service(web::scope("/api/v1").configure(configure_api)),
    )
    .await;
    let request = match caller {
        Some(caller) => {
            let login = test::call_service(&app, login_request(&caller).to_request()).await;
            request.cookie(session_cookie(&login))
        }
        None => request,
    };
    let res = test::call_service(&app, request.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

#[rstest]
#[actix_web::test]
async fn create_item_returns_created_item(caller: Caller) {
    let mut items = MockItemCommand::new();
    items
        .expect_create_item()
        .withf(move |c, fields| {
            *c == caller
                && fields.title.as_ref() == "Buy milk"
                && fields.priority == Priority::High
                && fields.description.as_ref().is_empty()
        })
        .return_once(|c, fields| Ok(Item::new(ItemId::generate(), c.user_id, fields)));

    let (status, body) = call_as(
        state(items, MockItemQuery::new()),
        Some(caller),
        test::TestRequest::post().uri("/api/v1/items").set_json(json!({
            "title": "Buy milk",
            "priority": "high",
            "dueDate": "2025-01-31"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["userId"], caller.user_id.to_string());
    assert_eq!(body["dueDate"], "2025-01-31");
    assert_eq!(body["priority"], "high");
}

#[rstest]
#[case::priority(json!({"title": "t", "priority": "urgent", "dueDate": "2025-01-31"}), "priority")]
#[case::date(json!({"title": "t", "priority": "low", "dueDate": "31/01/2025"}), "dueDate")]
#[case::title(json!({"title": "  ", "priority": "low", "dueDate": "2025-01-31"}), "title")]
#[actix_web::test]
async fn create_item_reports_the_invalid_field(
    caller: Caller,
    #[case] payload: Value,
    #[case] field: &str,
) {
    let mut items = MockItemCommand::new();
    items.expect_create_item().times(0);

    let (status, body) = call_as(
        state(items, MockItemQuery::new()),
        Some(caller),
        test::TestRequest::post().uri("/api/v1/items").set_json(payload),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], field);
}

#[rstest]
#[actix_web::test]
async fn list_items_forwards_pagination(caller: Caller) {
    let mut query = MockItemQuery::new();
    query
        .expect_list_items()
        .withf(|_, pagination| pagination.page_size() == 2 && pagination.page_number() == 3)
        .return_once(move |c, p| Ok(Page::new(vec![sample_item(c.user_id)], 5, p)));

    let (status, body) = call_as(
        state(MockItemCommand::new(), query),
        Some(caller),
        test::TestRequest::get().uri("/api/v1/items?limit=2&page=3"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 3);
    assert_eq!(body["total"], 5);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
}

#[rstest]
#[actix_web::test]
async fn non_numeric_page_is_an_invalid_query(caller: Caller) {
    let mut query = MockItemQuery::new();
    query.expect_list_items().times(0);

    let (status, body) = call_as(
        state(MockItemCommand::new(), query),
        Some(caller),
        test::TestRequest::get().uri("/api/v1/items?page=two"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["code"], "invalid_query");
}

#[rstest]
#[actix_web::test]
async fn missing_items_are_not_found(caller: Caller) {
    let id = ItemId::generate();
    let mut query = MockItemQuery::new();
    query
        .expect_get_item()
        .withf(move |_, requested| *requested == id)
        .return_once(|_, requested| Err(item_not_found(&requested)));

    let (status, body) = call_as(
        state(MockItemCommand::new(), query),
        Some(caller),
        test::TestRequest::get().uri(&format!("/api/v1/items/{id}")),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[rstest]
#[case::patch(test::TestRequest::patch())]
#[case::put(test::TestRequest::put())]
#[actix_web::test]
async fn update_item_applies_partial_changes(caller: Caller, #[case] request: test::TestRequest) {
    let id = ItemId::generate();
    let mut items = MockItemCommand::new();
    items
        .expect_update_item()
        .withf(move |_, requested, changes| {
            *requested == id
                && changes.priority == Some(Priority::Low)
                && changes.title.is_none()
                && changes.due_date.is_none()
        })
        .return_once(|c, _, _| Ok(sample_item(c.user_id)));

    let (status, _) = call_as(
        state(items, MockItemQuery::new()),
        Some(caller),
        request
            .uri(&format!("/api/v1/items/{id}"))
            .set_json(json!({ "priority": "low" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn update_item_refuses_owner_changes(caller: Caller) {
    let mut items = MockItemCommand::new();
    items.expect_update_item().times(0);

    let (status, _) = call_as(
        state(items, MockItemQuery::new()),
        Some(caller),
        test::TestRequest::patch()
            .uri(&format!("/api/v1/items/{}", ItemId::generate()))
            .set_json(json!({ "userId": UserId::generate() })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn delete_item_is_no_content(caller: Caller) {
    let id = ItemId::generate();
    let mut items = MockItemCommand::new();
    items
        .expect_delete_item()
        .withf(move |c, requested| *c == caller && *requested == id)
        .return_once(|_, _| Ok(()));

    let (status, _) = call_as(
        state(items, MockItemQuery::new()),
        Some(caller),
        test::TestRequest::delete().uri(&format!("/api/v1/items/{id}")),
    )
    .await;

    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[rstest]
#[case::list(test::TestRequest::get().uri("/api/v1/items"))]
#[case::create(test::TestRequest::post().uri("/api/v1/items").set_json(json!({
    "title": "Buy milk",
    "priority": "high",
    "dueDate": "2025-01-31"
})))]
#[actix_web::test]
async fn anonymous_callers_are_unauthorised(#[case] request: test::TestRequest) {
    let (status, body) = call_as(
        state(MockItemCommand::new(), MockItemQuery::new()),
        None,
        request,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "login required");
}

