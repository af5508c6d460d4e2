//! Items API handlers.
//!
//! ```text
//! GET    /api/v1/items?limit=2&page=1
//! POST   /api/v1/items
//! GET    /api/v1/items/{id}
//! PATCH  /api/v1/items/{id}
//! PUT    /api/v1/items/{id}
//! DELETE /api/v1/items/{id}
//! ```
//!
//! Every operation is scoped to the caller's own items. Another user's item
//! is indistinguishable from a missing one.

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Error, Item, ItemChanges, ItemDescription, ItemFields, ItemTitle, ItemValidationError,
    Priority, parse_due_date,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ItemPageSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{PageQuery, field_error, parse_item_id};

/// Body for `POST /items`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    #[schema(example = "Buy milk")]
    pub title: String,
    #[schema(example = "high")]
    pub priority: String,
    #[serde(default)]
    #[schema(example = "Semi-skimmed, two litres")]
    pub description: Option<String>,
    #[schema(example = "2025-01-31")]
    pub due_date: String,
}

impl TryFrom<CreateItemRequest> for ItemFields {
    type Error = ItemValidationError;

    fn try_from(value: CreateItemRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: ItemTitle::new(value.title)?,
            priority: value.priority.parse()?,
            description: value
                .description
                .map(ItemDescription::new)
                .transpose()?
                .unwrap_or_default(),
            due_date: parse_due_date(&value.due_date)?,
        })
    }
}

/// Body for `PATCH`/`PUT /items/{id}`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateItemRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl TryFrom<UpdateItemRequest> for ItemChanges {
    type Error = ItemValidationError;

    fn try_from(value: UpdateItemRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: value.title.map(ItemTitle::new).transpose()?,
            priority: value
                .priority
                .as_deref()
                .map(str::parse::<Priority>)
                .transpose()?,
            description: value.description.map(ItemDescription::new).transpose()?,
            due_date: value.due_date.as_deref().map(parse_due_date).transpose()?,
        })
    }
}

/// List the caller's items one page at a time.
#[utoipa::path(
    get,
    path = "/api/v1/items",
    params(PageQuery),
    responses(
        (status = 200, description = "Items", body = ItemPageSchema),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["items"],
    operation_id = "listItems"
)]
#[get("/items")]
pub async fn list_items(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Page<Item>>> {
    let caller = session.require_caller(state.login.as_ref()).await?;
    let pagination = query.pagination()?;
    let page = state.items_query.list_items(&caller, pagination).await?;
    Ok(web::Json(page))
}

/// Create an item owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/items",
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["items"],
    operation_id = "createItem"
)]
#[post("/items")]
pub async fn create_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateItemRequest>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_caller(state.login.as_ref()).await?;
    let fields = ItemFields::try_from(payload.into_inner()).map_err(|err| field_error(&err))?;
    let item = state.items.create_item(&caller, fields).await?;
    Ok(HttpResponse::Created().json(item))
}

/// Read one of the caller's items.
#[utoipa::path(
    get,
    path = "/api/v1/items/{id}",
    params(("id" = String, Path, description = "Item id (UUID)")),
    responses(
        (status = 200, description = "Item", body = Item),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["items"],
    operation_id = "getItem"
)]
#[get("/items/{id}")]
pub async fn get_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Item>> {
    let caller = session.require_caller(state.login.as_ref()).await?;
    let id = parse_item_id(&path)?;
    let item = state.items_query.get_item(&caller, id).await?;
    Ok(web::Json(item))
}

async fn apply_update(
    state: &HttpState,
    session: &SessionContext,
    raw_id: &str,
    payload: UpdateItemRequest,
) -> ApiResult<web::Json<Item>> {
    let caller = session.require_caller(state.login.as_ref()).await?;
    let id = parse_item_id(raw_id)?;
    let changes = ItemChanges::try_from(payload).map_err(|err| field_error(&err))?;
    let item = state.items.update_item(&caller, id, changes).await?;
    Ok(web::Json(item))
}

/// Update fields of one of the caller's items.
#[utoipa::path(
    patch,
    path = "/api/v1/items/{id}",
    params(("id" = String, Path, description = "Item id (UUID)")),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Updated item", body = Item),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["items"],
    operation_id = "updateItem"
)]
#[patch("/items/{id}")]
pub async fn update_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateItemRequest>,
) -> ApiResult<web::Json<Item>> {
    apply_update(&state, &session, &path, payload.into_inner()).await
}

/// Same as `PATCH /items/{id}`.
#[utoipa::path(
    put,
    path = "/api/v1/items/{id}",
    params(("id" = String, Path, description = "Item id (UUID)")),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Updated item", body = Item),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["items"],
    operation_id = "replaceItem"
)]
#[put("/items/{id}")]
pub async fn replace_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateItemRequest>,
) -> ApiResult<web::Json<Item>> {
    apply_update(&state, &session, &path, payload.into_inner()).await
}

/// Delete one of the caller's items.
#[utoipa::path(
    delete,
    path = "/api/v1/items/{id}",
    params(("id" = String, Path, description = "Item id (UUID)")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["items"],
    operation_id = "deleteItem"
)]
#[delete("/items/{id}")]
pub async fn delete_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_caller(state.login.as_ref()).await?;
    let id = parse_item_id(&path)?;
    state.items.delete_item(&caller, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "items_tests.rs"]
mod tests;
