//! Shared harness for HTTP integration tests.
//!
//! Builds the real services on top of the in-memory repositories, seeds an
//! administrator, and drives the app through `actix_web::test`.

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use argon2::Params;
use serde_json::{Value, json};
use taskhub::Trace;
use taskhub::domain::{
    CredentialsLoginService, EmailAddress, ItemService, NewUser, Password, PersonName, Role,
    UserProfile, UserService, Username,
};
use taskhub::inbound::http::configure_api;
use taskhub::inbound::http::state::HttpState;
use taskhub::inbound::http::test_utils::{session_cookie, test_session_middleware};
use taskhub::outbound::memory::InMemoryStore;
use taskhub::outbound::password::Argon2PasswordHasher;

pub const ADMIN_USERNAME: &str = "root_admin";
pub const ADMIN_PASSWORD: &str = "correct-horse";
pub const PASSWORD: &str = "password123";

fn cheap_hasher() -> Argon2PasswordHasher {
    let params = Params::new(Params::MIN_M_COST, 1, 1, None).expect("argon2 params");
    Argon2PasswordHasher::with_params(params)
}

fn admin_account() -> NewUser {
    NewUser::new(
        UserProfile {
            name: PersonName::new("Administrator").expect("name"),
            username: Username::new(ADMIN_USERNAME).expect("username"),
            email: EmailAddress::new("root@example.com").expect("email"),
        },
        Password::new(ADMIN_PASSWORD).expect("password"),
        ADMIN_PASSWORD,
        Role::Admin,
    )
}

/// Fresh in-memory state with one administrator.
pub async fn seeded_state() -> HttpState {
    seeded_store().await.0
}

/// Like [`seeded_state`], also handing back the store for direct inspection.
pub async fn seeded_store() -> (HttpState, InMemoryStore) {
    let store = InMemoryStore::new();
    let (users, items) = store.repositories();
    let users = Arc::new(users);
    let hasher = Arc::new(cheap_hasher());
    let user_service = Arc::new(UserService::new(users.clone(), hasher.clone()));
    user_service
        .ensure_admin(admin_account())
        .await
        .expect("seed admin")
        .expect("admin created");
    let item_service = Arc::new(ItemService::new(Arc::new(items)));
    let state = HttpState::new(
        Arc::new(CredentialsLoginService::new(users, hasher)),
        (user_service.clone(), user_service),
        (item_service.clone(), item_service),
    );
    (state, store)
}

/// The production route table behind a test session layer.
pub fn app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .service(
            web::scope("/api/v1")
                .wrap(test_session_middleware())
                .configure(configure_api),
        )
}

/// Send `req` and decode the JSON body (or `null` when empty).
pub async fn send<S, B>(app: &S, req: test::TestRequest) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

/// Send `req` with a session cookie attached.
pub async fn send_as<S, B>(
    app: &S,
    cookie: &Cookie<'static>,
    req: test::TestRequest,
) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    send(app, req.cookie(cookie.clone())).await
}

/// Register `username` through `POST /signup`; returns the cookie and user id.
pub async fn signup<S, B>(app: &S, username: &str) -> (Cookie<'static>, String)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/signup")
            .set_json(json!({
                "name": "Test User",
                "username": username,
                "email": format!("{username}@example.com"),
                "password": PASSWORD,
                "passwordConfirm": PASSWORD
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED, "signup {username}");
    let cookie = session_cookie(&res);
    let body: Value = serde_json::from_slice(&test::read_body(res).await).expect("json body");
    let id = body["id"].as_str().expect("user id").to_owned();
    (cookie, id)
}

/// Log in through `POST /login`; returns the cookie and the response body.
pub async fn login<S, B>(app: &S, username: &str, password: &str) -> (Cookie<'static>, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({ "username": username, "password": password }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK, "login {username}");
    let cookie = session_cookie(&res);
    let body = serde_json::from_slice(&test::read_body(res).await).expect("json body");
    (cookie, body)
}
