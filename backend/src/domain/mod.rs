//! Domain primitives, aggregates and use-cases.
//!
//! Purpose: define the bootcamp and user records, the generic listing
//! pipeline, and the services the HTTP layer drives. Nothing here knows about
//! HTTP or SQL; adapters reach the domain through [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): failure signal with a stable code.
//! - ErrorCode (alias to `error::ErrorCode`): decides the transport status.
//! - ErrorEnvelope: `{ success: false, error }` wire shape.
//! - TraceId: per-request correlation identifier.

pub mod advanced_results;
pub mod auth_service;
pub mod bootcamp;
pub mod bootcamps_service;
pub mod error;
pub mod geo;
pub mod password;
pub mod photo;
pub mod ports;
pub mod query;
pub mod resource;
pub mod slug;
pub mod timestamp;
pub mod trace_id;
pub mod user;
pub mod users_service;
pub mod validation;

pub use self::advanced_results::{Populate, QueryResultEnvelope, advanced_results};
pub use self::auth_service::{AuthService, LoginRequest};
pub use self::bootcamp::{Bootcamp, BootcampInput, Career, Location};
pub use self::bootcamps_service::{BootcampsService, RadiusResults};
pub use self::error::{Error, ErrorCode, ErrorEnvelope, ErrorValidationError};
pub use self::photo::PhotoUpload;
pub use self::resource::{Collection, Document, Resource, ResourceId};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{Role, User, UserInput};
pub use self::users_service::{AdminSeed, UsersService};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use devcamper::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
