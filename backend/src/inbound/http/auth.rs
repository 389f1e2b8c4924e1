//! Authentication handlers: register, login, logout and identity.
//!
//! ```text
//! POST /api/v1/auth/register {"name":"Ada","email":"ada@example.com","password":"123456","role":"publisher"}
//! POST /api/v1/auth/login    {"email":"ada@example.com","password":"123456"}
//! GET  /api/v1/auth/logout
//! GET  /api/v1/auth/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde_json::Value;

use super::access::CurrentUser;
use super::envelope::{DataEnvelope, EmptyData};
use super::session::SessionContext;
use super::state::HttpState;
use super::ApiResult;
use crate::domain::resource::public_view;
use crate::domain::{ErrorEnvelope, LoginRequest, User, UserInput};

/// Self-service sign-up; starts a session for the new account.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = UserInput,
    responses(
        (status = 201, description = "Registered", body = DataEnvelope<User>,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Validation failed or duplicate email", body = ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UserInput>,
) -> ApiResult<HttpResponse> {
    let user = state.auth.register(payload.into_inner()).await?;
    session.persist_user(user.id)?;
    Ok(HttpResponse::Created().json(DataEnvelope::new(public_view(&user)?)))
}

/// Check credentials and start a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = DataEnvelope<User>,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Missing email or password", body = ErrorEnvelope),
        (status = 401, description = "Invalid credentials", body = ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<DataEnvelope<Value>>> {
    let user = state.auth.login(payload.into_inner()).await?;
    session.persist_user(user.id)?;
    Ok(web::Json(DataEnvelope::new(public_view(&user)?)))
}

/// End the session.
#[utoipa::path(
    get,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Signed out", body = DataEnvelope<EmptyData>),
        (status = 401, description = "Not signed in", body = ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[get("/auth/logout")]
pub async fn logout(
    _user: CurrentUser,
    session: SessionContext,
) -> ApiResult<web::Json<DataEnvelope<EmptyData>>> {
    session.clear();
    Ok(web::Json(DataEnvelope::empty()))
}

/// The signed-in account.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = DataEnvelope<User>),
        (status = 401, description = "Not signed in", body = ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/auth/me")]
pub async fn me(user: CurrentUser) -> ApiResult<web::Json<DataEnvelope<Value>>> {
    Ok(web::Json(DataEnvelope::new(public_view(&user.into_inner())?)))
}
