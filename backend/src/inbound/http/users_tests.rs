//! Tests for users API handlers.

use super::*;
use crate::domain::access::Caller;
use crate::domain::ports::{
    MockItemCommand, MockItemQuery, MockLoginService, MockUserCommand, MockUserQuery,
};
use crate::domain::{UserId, user_not_found};
use crate::inbound::http::configure_api;
use crate::inbound::http::test_utils::{
    login_request, resolving_login, session_cookie, test_login_resource, test_session_middleware,
};
use actix_web::http::StatusCode;
use actix_web::{App, test};
use pagination::Pagination;
use rstest::rstest;
use serde_json::{Value, json};
use std::sync::Arc;

fn state(users: MockUserCommand, users_query: MockUserQuery) -> HttpState {
    HttpState::new(
        Arc::new(MockLoginService::new()),
        (Arc::new(users), Arc::new(users_query)),
        (Arc::new(MockItemCommand::new()), Arc::new(MockItemQuery::new())),
    )
}

fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .service(test_login_resource())
        .service(web::scope("/api/v1").configure(configure_api))
}

fn sample_user(id: UserId, role: Role) -> User {
    User::new(
        id,
        UserProfile {
            name: PersonName::new("Ada Lovelace").expect("name"),
            username: Username::new("ada_l").expect("username"),
            email: EmailAddress::new("ada@example.com").expect("email"),
        },
        role,
    )
}

async fn call_as(
    mut state: HttpState,
    caller: Option<Caller>,
    request: test::TestRequest,
) -> (StatusCode, Value) {
    state.login = Arc::new(resolving_login(caller));
    let app = test::init_service(test_app(state)).await;
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
async fn admin_lists_users_with_default_pagination() {
    let admin = Caller::new(UserId::generate(), Role::Admin);
    let mut query = MockUserQuery::new();
    query
        .expect_list_users()
        .withf(move |caller, pagination| *caller == admin && *pagination == Pagination::default())
        .return_once(|_, p| {
            Ok(Page::new(
                vec![sample_user(UserId::generate(), Role::User)],
                5,
                p,
            ))
        });

    let (status, body) = call_as(
        state(MockUserCommand::new(), query),
        Some(admin),
        test::TestRequest::get().uri("/api/v1/users"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 5);
    assert_eq!(body["limit"], 2);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["data"][0]["username"], "ada_l");
}

#[rstest]
#[actix_web::test]
async fn plain_users_cannot_list_users() {
    let mut query = MockUserQuery::new();
    query.expect_list_users().times(0);

    let (status, body) = call_as(
        state(MockUserCommand::new(), query),
        Some(Caller::new(UserId::generate(), Role::User)),
        test::TestRequest::get().uri("/api/v1/users"),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        crate::domain::access::PERMISSION_DENIED_MESSAGE
    );
}

#[rstest]
#[actix_web::test]
async fn list_rejects_out_of_range_limits() {
    let mut query = MockUserQuery::new();
    query.expect_list_users().times(0);

    let (status, body) = call_as(
        state(MockUserCommand::new(), query),
        Some(Caller::new(UserId::generate(), Role::Admin)),
        test::TestRequest::get().uri("/api/v1/users?limit=0"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "limit");
}

#[rstest]
#[actix_web::test]
async fn admin_creates_user_with_requested_role() {
    let mut users = MockUserCommand::new();
    users
        .expect_create_user()
        .withf(|_, user| user.role() == Role::Admin)
        .return_once(|_, _| Ok(sample_user(UserId::generate(), Role::Admin)));

    let (status, body) = call_as(
        state(users, MockUserQuery::new()),
        Some(Caller::new(UserId::generate(), Role::Admin)),
        test::TestRequest::post().uri("/api/v1/users").set_json(json!({
            "name": "Ada Lovelace",
            "username": "ada_l",
            "email": "ada@example.com",
            "password": "password123",
            "passwordConfirm": "password123",
            "role": "admin"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "admin");
}

#[rstest]
#[actix_web::test]
async fn unknown_roles_are_rejected() {
    let mut users = MockUserCommand::new();
    users.expect_create_user().times(0);

    let (status, body) = call_as(
        state(users, MockUserQuery::new()),
        Some(Caller::new(UserId::generate(), Role::Admin)),
        test::TestRequest::post().uri("/api/v1/users").set_json(json!({
            "name": "Ada Lovelace",
            "username": "ada_l",
            "email": "ada@example.com",
            "password": "password123",
            "passwordConfirm": "password123",
            "role": "superuser"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "role");
}

#[rstest]
#[actix_web::test]
async fn malformed_bodies_use_the_error_envelope() {
    let mut users = MockUserCommand::new();
    users.expect_create_user().times(0);

    let (status, body) = call_as(
        state(users, MockUserQuery::new()),
        Some(Caller::new(UserId::generate(), Role::Admin)),
        test::TestRequest::post()
            .uri("/api/v1/users")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"name\": "),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["code"], "invalid_body");
}

#[rstest]
#[actix_web::test]
async fn get_user_passes_the_requested_id_through() {
    let caller = Caller::new(UserId::generate(), Role::User);
    let requested = UserId::generate();
    let mut query = MockUserQuery::new();
    query
        .expect_get_user()
        .withf(move |c, id| *c == caller && *id == requested)
        .return_once(move |c, _| Ok(sample_user(c.user_id, Role::User)));

    let (status, body) = call_as(
        state(MockUserCommand::new(), query),
        Some(caller),
        test::TestRequest::get().uri(&format!("/api/v1/users/{requested}")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], caller.user_id.to_string());
}

#[rstest]
#[actix_web::test]
async fn unknown_user_is_a_bad_request() {
    let requested = UserId::generate();
    let mut query = MockUserQuery::new();
    query
        .expect_get_user()
        .return_once(move |_, id| Err(user_not_found(&id)));

    let (status, body) = call_as(
        state(MockUserCommand::new(), query),
        Some(Caller::new(UserId::generate(), Role::Admin)),
        test::TestRequest::get().uri(&format!("/api/v1/users/{requested}")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        format!("User with id: {requested} cannot be found. Check Id again in URL")
    );
}

#[rstest]
#[actix_web::test]
async fn malformed_ids_are_rejected_before_the_service() {
    let mut query = MockUserQuery::new();
    query.expect_get_user().times(0);

    let (status, body) = call_as(
        state(MockUserCommand::new(), query),
        Some(Caller::new(UserId::generate(), Role::Admin)),
        test::TestRequest::get().uri("/api/v1/users/not-a-uuid"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], "invalid_uuid");
}

#[rstest]
#[case::patch(test::TestRequest::patch())]
#[case::put(test::TestRequest::put())]
#[actix_web::test]
async fn update_accepts_patch_and_put(#[case] request: test::TestRequest) {
    let caller = Caller::new(UserId::generate(), Role::User);
    let mut users = MockUserCommand::new();
    users
        .expect_update_user()
        .withf(|_, _, changes| {
            changes.email.as_ref().map(AsRef::as_ref) == Some("new@example.com")
                && changes.name.is_none()
        })
        .return_once(move |c, _, _| Ok(sample_user(c.user_id, Role::User)));

    let (status, _) = call_as(
        state(users, MockUserQuery::new()),
        Some(caller),
        request
            .uri(&format!("/api/v1/users/{}", caller.user_id))
            .set_json(json!({ "email": "new@example.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn update_refuses_role_changes() {
    let caller = Caller::new(UserId::generate(), Role::User);
    let mut users = MockUserCommand::new();
    users.expect_update_user().times(0);

    let (status, body) = call_as(
        state(users, MockUserQuery::new()),
        Some(caller),
        test::TestRequest::patch()
            .uri(&format!("/api/v1/users/{}", caller.user_id))
            .set_json(json!({ "role": "admin" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[rstest]
#[actix_web::test]
async fn delete_is_no_content() {
    let caller = Caller::new(UserId::generate(), Role::User);
    let mut users = MockUserCommand::new();
    users
        .expect_delete_user()
        .withf(move |c, id| *c == caller && *id == caller.user_id)
        .return_once(|_, _| Ok(()));

    let (status, _) = call_as(
        state(users, MockUserQuery::new()),
        Some(caller),
        test::TestRequest::delete().uri(&format!("/api/v1/users/{}", caller.user_id)),
    )
    .await;

    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[rstest]
#[actix_web::test]
async fn anonymous_requests_are_unauthorised() {
    let (status, body) = call_as(
        state(MockUserCommand::new(), MockUserQuery::new()),
        None,
        test::TestRequest::get().uri(&format!("/api/v1/users/{}", UserId::generate())),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "login required");
}
