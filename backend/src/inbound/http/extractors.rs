//! Extractor configuration routing framework failures to the domain error.
//!
//! Malformed JSON bodies, oversize payloads, and bad query strings would
//! otherwise answer with actix's plain-text bodies.

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, web};

use crate::domain::Error;

/// Largest accepted JSON body.
pub const JSON_LIMIT_BYTES: usize = 64 * 1024;

fn json_error(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &error {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            "Request body is too large".to_owned()
        }
        JsonPayloadError::ContentType => "Content type must be application/json".to_owned(),
        other => format!("Invalid JSON body: {other}"),
    };
    Error::invalid_request(message).into()
}

fn query_error(error: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("Invalid query string: {error}")).into()
}

/// JSON extractor configuration for the API scope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT_BYTES)
        .error_handler(json_error)
}

/// Query extractor configuration for the API scope.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(query_error)
}

/// Fallback for unmatched routes.
pub async fn route_not_found(req: HttpRequest) -> Result<actix_web::HttpResponse, Error> {
    Err(Error::not_found(format!(
        "Route {} {} not found",
        req.method(),
        req.path()
    )))
}
