//! Users API handlers.
//!
//! ```text
//! GET    /api/v1/users?limit=2&page=1   (admin)
//! POST   /api/v1/users                  (admin)
//! GET    /api/v1/users/{id}
//! PATCH  /api/v1/users/{id}
//! PUT    /api/v1/users/{id}
//! DELETE /api/v1/users/{id}
//! ```
//!
//! Non-admin callers always act on their own account, whatever `{id}` says.

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    EmailAddress, Error, NewUser, Password, PersonName, Role, User, UserChanges, UserProfile,
    UserValidationError, Username,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::UserPageSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{PageQuery, field_error, parse_user_id};
use crate::middleware::RequireRole;

/// Body for `POST /signup` and `POST /users`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada_l")]
    pub username: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "password123")]
    pub password: String,
    #[schema(example = "password123")]
    pub password_confirm: String,
    /// Only honoured on `POST /users`. Defaults to `user`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "user")]
    pub role: Option<String>,
}

impl TryFrom<CreateUserRequest> for NewUser {
    type Error = UserValidationError;

    fn try_from(value: CreateUserRequest) -> Result<Self, Self::Error> {
        let profile = UserProfile {
            name: PersonName::new(value.name)?,
            username: Username::new(value.username)?,
            email: EmailAddress::new(value.email)?,
        };
        let password = Password::new(value.password)?;
        let role = value
            .role
            .as_deref()
            .map(str::parse::<Role>)
            .transpose()?
            .unwrap_or_default();
        Ok(NewUser::new(profile, password, value.password_confirm, role))
    }
}

/// Body for `PATCH`/`PUT /users/{id}`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl TryFrom<UpdateUserRequest> for UserChanges {
    type Error = UserValidationError;

    fn try_from(value: UpdateUserRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: value.name.map(PersonName::new).transpose()?,
            username: value.username.map(Username::new).transpose()?,
            email: value.email.map(EmailAddress::new).transpose()?,
        })
    }
}

/// List users one page at a time.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(PageQuery),
    responses(
        (status = 200, description = "Users", body = UserPageSchema),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users", wrap = "RequireRole::admin()")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Page<User>>> {
    let caller = session.require_caller(state.login.as_ref()).await?;
    let pagination = query.pagination()?;
    let page = state.users_query.list_users(&caller, pagination).await?;
    Ok(web::Json(page))
}

/// Create a user with an explicit role.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Username or email taken", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users", wrap = "RequireRole::admin()")]
pub async fn create_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_caller(state.login.as_ref()).await?;
    let new_user = NewUser::try_from(payload.into_inner()).map_err(|err| field_error(&err))?;
    let user = state.users.create_user(&caller, new_user).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Read one user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id (UUID)")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 400, description = "Invalid request or unknown user", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let caller = session.require_caller(state.login.as_ref()).await?;
    let id = parse_user_id(&path)?;
    let user = state.users_query.get_user(&caller, id).await?;
    Ok(web::Json(user))
}

async fn apply_update(
    state: &HttpState,
    session: &SessionContext,
    raw_id: &str,
    payload: UpdateUserRequest,
) -> ApiResult<web::Json<User>> {
    let caller = session.require_caller(state.login.as_ref()).await?;
    let id = parse_user_id(raw_id)?;
    let changes = UserChanges::try_from(payload).map_err(|err| field_error(&err))?;
    let user = state.users.update_user(&caller, id, changes).await?;
    Ok(web::Json(user))
}

/// Update fields of a user.
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id (UUID)")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid request or unknown user", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Username or email taken", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[patch("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<User>> {
    apply_update(&state, &session, &path, payload.into_inner()).await
}

/// Same as `PATCH /users/{id}`.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id (UUID)")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid request or unknown user", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Username or email taken", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "replaceUser"
)]
#[put("/users/{id}")]
pub async fn replace_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<User>> {
    apply_update(&state, &session, &path, payload.into_inner()).await
}

/// Delete a user and, through the foreign key, their items.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id (UUID)")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Invalid request or unknown user", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_caller(state.login.as_ref()).await?;
    let id = parse_user_id(&path)?;
    state.users.delete_user(&caller, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
