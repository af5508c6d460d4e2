//! Session endpoints: signup, login and logout.
//!
//! ```text
//! POST /api/v1/signup {"name":"Ada","username":"ada_l","email":"ada@example.com",
//!                      "password":"password123","passwordConfirm":"password123"}
//! POST /api/v1/login  {"username":"ada_l","password":"password123"}
//! POST /api/v1/logout
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::access::Caller;
use crate::domain::{Error, LoginCredentials, NewUser, Role, User, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::CreateUserRequest;
use crate::inbound::http::validation::field_error;

/// Login request body for `POST /api/v1/login`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "ada_l")]
    pub username: String,
    #[schema(example = "password123")]
    pub password: String,
}

/// Identity bound to the session after signup or login.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user_id: UserId,
    pub role: Role,
}

impl From<Caller> for SessionResponse {
    fn from(caller: Caller) -> Self {
        Self {
            user_id: caller.user_id,
            role: caller.role,
        }
    }
}

/// Register a new account and log it in.
///
/// The account always receives the `user` role; a `role` in the body is
/// ignored.
#[utoipa::path(
    post,
    path = "/api/v1/signup",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Account created", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Username or email taken", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signup",
    security([])
)]
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let new_user = NewUser::try_from(payload.into_inner()).map_err(|err| field_error(&err))?;
    let user = state.users.register(new_user).await?;
    session.persist_caller(&Caller::new(*user.id(), user.role()))?;
    info!(user_id = %user.id(), "signup started a session");
    Ok(HttpResponse::Created().json(user))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = SessionResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<SessionResponse>> {
    let LoginRequest { username, password } = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&username, &password).map_err(|err| field_error(&err))?;
    let caller = state.login.authenticate(&credentials).await?;
    session.persist_caller(&caller)?;
    Ok(web::Json(caller.into()))
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}
