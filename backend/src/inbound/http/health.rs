//! Health endpoints: liveness & readiness checks for orchestration and load balancers.
//! Document endpoints in OpenAPI via Utoipa.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use tracing::warn;

use crate::domain::ports::DocumentStore;

/// Shared health state for readiness and liveness checks.
///
/// Readiness also requires the document store to answer a ping, so a lost
/// database connection takes the instance out of rotation.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
    store: Arc<dyn DocumentStore>,
}

impl HealthState {
    /// Create a new health state starting as not ready but live.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
            store,
        }
    }

    /// Mark the service as ready.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Flag the service as unhealthy so liveness checks fail fast during shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Return readiness state, pinging the store.
    pub async fn is_ready(&self) -> bool {
        if !self.ready.load(Ordering::Acquire) {
            return false;
        }
        match self.store.ping().await {
            Ok(()) => true,
            Err(error) => {
                warn!(%error, "readiness check failed to reach the document store");
                false
            }
        }
    }

    /// Return liveness state. When false, liveness checks get 503 to trigger restarts.
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    fn check_response(healthy: bool) -> HttpResponse {
        let mut response = if healthy {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };

        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    }
}

/// Readiness check. Return 200 when startup finished and the store answers; 503 otherwise.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server is not ready")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::check_response(state.is_ready().await)
}

/// Liveness check. Return 200 while the process is marked alive and 503 once draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is alive"),
        (status = 503, description = "Server is shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::check_response(state.is_alive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{DocumentStoreError, MockDocumentStore};
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;

    async fn status_of(state: HealthState, uri: &str) -> StatusCode {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(ready)
                .service(live),
        )
        .await;
        test::call_service(&app, test::TestRequest::get().uri(uri).to_request())
            .await
            .status()
    }

    fn pinging(ok: bool) -> MockDocumentStore {
        let mut store = MockDocumentStore::new();
        store.expect_ping().returning(move || {
            if ok {
                Ok(())
            } else {
                Err(DocumentStoreError::connection("refused"))
            }
        });
        store
    }

    #[rstest]
    #[case(false, true, StatusCode::SERVICE_UNAVAILABLE)]
    #[case(true, false, StatusCode::SERVICE_UNAVAILABLE)]
    #[case(true, true, StatusCode::OK)]
    #[actix_web::test]
    async fn readiness_needs_startup_and_store(
        #[case] marked: bool,
        #[case] store_ok: bool,
        #[case] expected: StatusCode,
    ) {
        let state = HealthState::new(Arc::new(pinging(store_ok)));
        if marked {
            state.mark_ready();
        }
        assert_eq!(status_of(state, "/health/ready").await, expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn liveness_fails_once_draining() {
        let state = HealthState::new(Arc::new(MockDocumentStore::new()));
        state.mark_unhealthy();
        assert_eq!(
            status_of(state, "/health/live").await,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
