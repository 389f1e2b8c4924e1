//! Administrative user API handlers. Every route requires an admin session.
//!
//! ```text
//! GET    /api/v1/users?role=publisher
//! POST   /api/v1/users {"name":"Ada","email":"ada@example.com","password":"123456"}
//! GET    /api/v1/users/{id}
//! PUT    /api/v1/users/{id}
//! DELETE /api/v1/users/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde_json::Value;

use super::access::AdminUser;
use super::envelope::{DataEnvelope, EmptyData};
use super::state::HttpState;
use super::ApiResult;
use crate::domain::resource::public_view;
use crate::domain::{ErrorEnvelope, QueryResultEnvelope, User, UserInput};

/// List accounts through the listing pipeline.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users", body = QueryResultEnvelope),
        (status = 401, description = "Not signed in", body = ErrorEnvelope),
        (status = 403, description = "Not an admin", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    _admin: AdminUser,
    query: web::Query<Vec<(String, String)>>,
) -> ApiResult<web::Json<QueryResultEnvelope>> {
    let envelope = state
        .users
        .list(&query.into_inner(), state.limits.page_limit)
        .await?;
    Ok(web::Json(envelope))
}

/// Fetch one account.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = DataEnvelope<User>),
        (status = 401, description = "Not signed in", body = ErrorEnvelope),
        (status = 403, description = "Not an admin", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    _admin: AdminUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<DataEnvelope<Value>>> {
    let user = state.users.get(&path.into_inner()).await?;
    Ok(web::Json(DataEnvelope::new(public_view(&user)?)))
}

/// Create an account with any role.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = UserInput,
    responses(
        (status = 201, description = "Created", body = DataEnvelope<User>),
        (status = 400, description = "Validation failed or duplicate email", body = ErrorEnvelope),
        (status = 401, description = "Not signed in", body = ErrorEnvelope),
        (status = 403, description = "Not an admin", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    _admin: AdminUser,
    payload: web::Json<UserInput>,
) -> ApiResult<HttpResponse> {
    let user = state.users.create(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(DataEnvelope::new(public_view(&user)?)))
}

/// Merge changes into an account.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    request_body = UserInput,
    responses(
        (status = 200, description = "Updated", body = DataEnvelope<User>),
        (status = 400, description = "Validation failed", body = ErrorEnvelope),
        (status = 403, description = "Not an admin", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    _admin: AdminUser,
    path: web::Path<String>,
    payload: web::Json<UserInput>,
) -> ApiResult<web::Json<DataEnvelope<Value>>> {
    let user = state
        .users
        .update(&path.into_inner(), payload.into_inner())
        .await?;
    Ok(web::Json(DataEnvelope::new(public_view(&user)?)))
}

/// Delete an account.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Deleted", body = DataEnvelope<EmptyData>),
        (status = 403, description = "Not an admin", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    _admin: AdminUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<DataEnvelope<EmptyData>>> {
    state.users.delete(&path.into_inner()).await?;
    Ok(web::Json(DataEnvelope::empty()))
}
