//! Route protection: resolve the session's user and check roles.
//!
//! Handlers opt in by taking [`CurrentUser`] (any signed-in account) or
//! [`AdminUser`] as an argument; public handlers take neither.

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use super::session::SessionContext;
use super::state::HttpState;
use crate::domain::{Error, Role, User};

const NOT_AUTHORIZED: &str = "Not authorized to access this route";

/// The signed-in account.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    /// Fail with 403 unless the account holds one of `roles`.
    pub fn require_role(&self, roles: &[Role]) -> Result<(), Error> {
        if roles.contains(&self.0.role) {
            Ok(())
        } else {
            Err(Error::forbidden(format!(
                "User role {} is not authorized to access this route",
                self.0.role
            )))
        }
    }

    /// Unwrap the account.
    pub fn into_inner(self) -> User {
        self.0
    }
}

async fn resolve(req: HttpRequest) -> Result<User, Error> {
    let session = SessionContext::from_request(&req, &mut Payload::None).await?;
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not registered"))?;
    let Some(id) = session.user_id()? else {
        return Err(Error::unauthorized(NOT_AUTHORIZED));
    };
    state
        .auth
        .current(id)
        .await?
        .ok_or_else(|| Error::unauthorized(NOT_AUTHORIZED))
}

impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { resolve(req).await.map(CurrentUser) })
    }
}

/// A signed-in account holding the `admin` role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl FromRequest for AdminUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let current = CurrentUser::from_request(req, payload);
        Box::pin(async move {
            let current = current.await?;
            current.require_role(&[Role::Admin])?;
            Ok(AdminUser(current.into_inner()))
        })
    }
}
