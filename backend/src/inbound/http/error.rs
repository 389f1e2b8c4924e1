//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while giving every
//! failure the same JSON shape and status mapping. This is the single place
//! that turns an [`Error`] into a response.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode, ErrorEnvelope, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest | ErrorCode::Duplicate => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Upstream | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = ?self.code(), trace_id = ?self.trace_id(), message = %self, "request failed");
        } else {
            warn!(code = ?self.code(), trace_id = ?self.trace_id(), message = %self, "request rejected");
        }

        let mut builder = HttpResponse::build(status);
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(ErrorEnvelope::from_error(self))
    }
}

/// Promote a framework error (extractor failure, payload limit) into the
/// domain signal, keeping client-side categories intact.
impl From<&actix_web::Error> for Error {
    fn from(err: &actix_web::Error) -> Self {
        if let Some(domain) = err.as_error::<Error>() {
            return domain.clone();
        }
        let status = err.as_response_error().status_code();
        match status {
            StatusCode::UNAUTHORIZED => Error::unauthorized(err.to_string()),
            StatusCode::FORBIDDEN => Error::forbidden(err.to_string()),
            StatusCode::NOT_FOUND => Error::not_found(err.to_string()),
            status if status.is_client_error() => Error::invalid_request(err.to_string()),
            _ => Error::internal(err.to_string()),
        }
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        Self::from(&err)
    }
}
