//! Shared helpers for the HTTP integration suites.
//!
//! Integration tests compile as separate crates under `backend/tests/`; each
//! suite pulls this module in with `mod support;`. The app mirrors the
//! production wiring but runs in-process over the memory store, the fixture
//! geocoder, and a temporary upload directory.

use std::sync::Arc;

use actix_web::body::{BoxBody, EitherBody};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::HeaderMap;
use actix_web::{App, test, web};
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use serde_json::{Value, json};
use tempfile::TempDir;

use devcamper::domain::ports::FixtureGeocoder;
use devcamper::domain::{Bootcamp, User, UserInput};
use devcamper::inbound::http::configure_api;
use devcamper::inbound::http::extractors::route_not_found;
use devcamper::inbound::http::state::{HttpLimits, HttpState, HttpStatePorts};
use devcamper::outbound::persistence::MemoryDocumentStore;
use devcamper::outbound::storage::FsPhotoStorage;
use devcamper::{CatchFailure, Trace};

/// Password shared by every seeded account.
pub const PASSWORD: &str = "123456";

/// Service state plus the upload directory it writes into.
pub struct TestContext {
    pub state: web::Data<HttpState>,
    pub uploads: TempDir,
}

/// Fresh adapters with default limits.
pub fn context() -> TestContext {
    let uploads = tempfile::tempdir().expect("upload dir");
    let ports = HttpStatePorts {
        store: Arc::new(
            MemoryDocumentStore::new()
                .with_resource::<Bootcamp>()
                .with_resource::<User>(),
        ),
        geocoder: Arc::new(FixtureGeocoder),
        photos: Arc::new(FsPhotoStorage::open(uploads.path()).expect("open uploads")),
    };
    TestContext {
        state: web::Data::new(HttpState::new(ports, HttpLimits::default())),
        uploads,
    }
}

/// Build the app the way the server does, with an insecure test cookie.
pub async fn init_app(
    ctx: &TestContext,
) -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<EitherBody<BoxBody>>,
    Error = actix_web::Error,
> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build();
    test::init_service(
        App::new()
            .app_data(ctx.state.clone())
            .service(
                web::scope("/api/v1")
                    .wrap(session)
                    .configure(configure_api)
                    .default_service(web::to(route_not_found)),
            )
            .default_service(web::to(route_not_found))
            .wrap(CatchFailure)
            .wrap(Trace),
    )
    .await
}

/// Captured response parts.
pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub cookie: Option<Cookie<'static>>,
    pub body: Value,
}

/// Send `req` and capture status, headers, session cookie, and JSON body.
///
/// Service-level errors are rendered the way the HTTP server renders them.
pub async fn send<S>(app: &S, req: test::TestRequest) -> Reply
where
    S: Service<
            actix_http::Request,
            Response = ServiceResponse<EitherBody<BoxBody>>,
            Error = actix_web::Error,
        >,
{
    let res = match test::try_call_service(app, req.to_request()).await {
        Ok(res) => res.into_parts().1.map_into_boxed_body(),
        Err(err) => err.error_response(),
    };
    let status = res.status();
    let headers = res.headers().clone();
    let cookie = res
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(|cookie| cookie.into_owned());
    let bytes = actix_web::body::to_bytes(res.into_body())
        .await
        .expect("response body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Reply {
        status,
        headers,
        cookie,
        body,
    }
}

/// Register through the API and return the session cookie.
pub async fn register<S>(app: &S, email: &str, role: &str) -> Cookie<'static>
where
    S: Service<
            actix_http::Request,
            Response = ServiceResponse<EitherBody<BoxBody>>,
            Error = actix_web::Error,
        >,
{
    let reply = send(
        app,
        test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(json!({
                "name": email.split('@').next().unwrap_or(email),
                "email": email,
                "password": PASSWORD,
                "role": role
            })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "register failed: {}", reply.body);
    reply.cookie.expect("session cookie")
}

/// Seed an admin directly through the service and sign in as them.
pub async fn sign_in_admin<S>(app: &S, ctx: &TestContext) -> Cookie<'static>
where
    S: Service<
            actix_http::Request,
            Response = ServiceResponse<EitherBody<BoxBody>>,
            Error = actix_web::Error,
        >,
{
    ctx.state
        .users
        .create(UserInput {
            name: Some("Admin".into()),
            email: Some("admin@example.com".into()),
            role: Some("admin".into()),
            password: Some(PASSWORD.into()),
        })
        .await
        .expect("seed admin");
    let reply = send(
        app,
        test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": "admin@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK, "login failed: {}", reply.body);
    reply.cookie.expect("session cookie")
}

/// Minimal valid bootcamp payload.
pub fn bootcamp(name: &str, address: &str, average_cost: f64) -> Value {
    json!({
        "name": name,
        "description": format!("{name} teaches full stack development"),
        "address": address,
        "careers": ["Web Development", "UI/UX"],
        "averageCost": average_cost
    })
}
