//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{DocumentStore, Geocoder, PhotoStorage};
use crate::domain::{AuthService, BootcampsService, UsersService};

/// Request-handling limits taken from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpLimits {
    /// Page size when a listing omits `limit`.
    pub page_limit: u32,
    /// Largest accepted photo upload, in bytes.
    pub max_file_upload: u64,
}

impl Default for HttpLimits {
    fn default() -> Self {
        Self {
            page_limit: pagination::DEFAULT_LIMIT,
            max_file_upload: 1_000_000,
        }
    }
}

/// Parameter object bundling the port implementations the services need.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub store: Arc<dyn DocumentStore>,
    pub geocoder: Arc<dyn Geocoder>,
    pub photos: Arc<dyn PhotoStorage>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub bootcamps: BootcampsService,
    pub users: UsersService,
    pub auth: AuthService,
    pub limits: HttpLimits,
}

impl HttpState {
    /// Build every service over the supplied ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use devcamper::domain::ports::FixtureGeocoder;
    /// use devcamper::inbound::http::state::{HttpLimits, HttpState, HttpStatePorts};
    /// use devcamper::outbound::persistence::MemoryDocumentStore;
    /// use devcamper::outbound::storage::FsPhotoStorage;
    ///
    /// let uploads = std::env::temp_dir().join("devcamper-doc-uploads");
    /// let ports = HttpStatePorts {
    ///     store: Arc::new(MemoryDocumentStore::new()),
    ///     geocoder: Arc::new(FixtureGeocoder),
    ///     photos: Arc::new(FsPhotoStorage::open(uploads).expect("upload dir")),
    /// };
    /// let state = HttpState::new(ports, HttpLimits::default());
    /// assert_eq!(state.limits.page_limit, 25);
    /// ```
    pub fn new(ports: HttpStatePorts, limits: HttpLimits) -> Self {
        let HttpStatePorts {
            store,
            geocoder,
            photos,
        } = ports;
        Self {
            bootcamps: BootcampsService::new(Arc::clone(&store), geocoder, photos),
            users: UsersService::new(Arc::clone(&store)),
            auth: AuthService::new(store),
            limits,
        }
    }
}
