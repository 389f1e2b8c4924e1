//! Test helpers for inbound HTTP components.

use std::path::Path;
use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::web;

use super::state::{HttpLimits, HttpState, HttpStatePorts};
use crate::domain::ports::FixtureGeocoder;
use crate::domain::{Bootcamp, User};
use crate::outbound::persistence::MemoryDocumentStore;
use crate::outbound::storage::FsPhotoStorage;

/// Session middleware with a fresh key and the `Secure` flag off for plain
/// HTTP test requests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Handler state over the memory store, the fixture geocoder, and photo
/// storage rooted at `uploads`.
pub fn memory_state(uploads: &Path, limits: HttpLimits) -> web::Data<HttpState> {
    let ports = HttpStatePorts {
        store: Arc::new(
            MemoryDocumentStore::new()
                .with_resource::<Bootcamp>()
                .with_resource::<User>(),
        ),
        geocoder: Arc::new(FixtureGeocoder),
        photos: Arc::new(FsPhotoStorage::open(uploads).expect("open upload directory")),
    };
    web::Data::new(HttpState::new(ports, limits))
}
