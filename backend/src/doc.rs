//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer together
//! with the envelope and resource schemas they exchange, plus the session
//! cookie security scheme. The document backs Swagger UI in debug builds and
//! is exported via `cargo run --bin openapi-dump` for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::geo::GeoPoint;
use crate::domain::{
    Bootcamp, BootcampInput, Career, ErrorCode, ErrorEnvelope, Location, LoginRequest,
    QueryResultEnvelope, Role, User, UserInput,
};
use crate::inbound::http::envelope::EmptyData;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "DevCamper API",
        description = "Bootcamp directory with session-authenticated writes and health checks."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::bootcamps::list_bootcamps,
        crate::inbound::http::bootcamps::get_bootcamp,
        crate::inbound::http::bootcamps::create_bootcamp,
        crate::inbound::http::bootcamps::update_bootcamp,
        crate::inbound::http::bootcamps::delete_bootcamp,
        crate::inbound::http::bootcamps::bootcamps_in_radius,
        crate::inbound::http::bootcamps::upload_bootcamp_photo,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Bootcamp,
        BootcampInput,
        Career,
        Location,
        GeoPoint,
        User,
        UserInput,
        Role,
        LoginRequest,
        QueryResultEnvelope,
        ErrorEnvelope,
        ErrorCode,
        EmptyData,
    )),
    tags(
        (name = "bootcamps", description = "Bootcamp directory"),
        (name = "users", description = "User administration"),
        (name = "auth", description = "Registration and sessions"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
