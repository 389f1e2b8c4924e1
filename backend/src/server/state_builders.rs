//! Builders selecting concrete adapters for the HTTP state ports.
//!
//! Each port has a production adapter and an in-process fallback; the
//! settings decide which one backs the running server.

use std::sync::Arc;

use color_eyre::eyre::{Context, Result};
use tracing::{info, warn};

use devcamper::domain::ports::{DocumentStore, FixtureGeocoder, Geocoder, PhotoStorage};
use devcamper::domain::{Bootcamp, User};
use devcamper::inbound::http::state::{HttpLimits, HttpStatePorts};
use devcamper::outbound::geocoding::HttpGeocoder;
use devcamper::outbound::persistence::{
    DbPool, DieselDocumentStore, MemoryDocumentStore, PoolConfig, run_migrations,
};
use devcamper::outbound::storage::FsPhotoStorage;
use devcamper::settings::AppSettings;

/// Build every port implementation from settings.
///
/// # Errors
/// Fails when the database is unreachable, migrations fail, the geocoder
/// endpoint is malformed, or the upload directory cannot be opened.
pub async fn build_ports(settings: &AppSettings) -> Result<HttpStatePorts> {
    Ok(HttpStatePorts {
        store: build_store(settings).await?,
        geocoder: build_geocoder(settings)?,
        photos: build_photo_storage(settings)?,
    })
}

/// Listing and upload limits from settings.
pub fn build_limits(settings: &AppSettings) -> HttpLimits {
    HttpLimits {
        page_limit: settings.page_limit(),
        max_file_upload: settings.max_file_upload(),
    }
}

async fn build_store(settings: &AppSettings) -> Result<Arc<dyn DocumentStore>> {
    let Some(url) = settings.database_url() else {
        warn!("no database configured; documents are kept in memory");
        return Ok(Arc::new(
            MemoryDocumentStore::new()
                .with_resource::<Bootcamp>()
                .with_resource::<User>(),
        ));
    };

    run_migrations(url)
        .await
        .wrap_err("failed to apply database migrations")?;
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.db_max_connections()))
        .await
        .wrap_err("failed to build database pool")?;
    info!(max_connections = settings.db_max_connections(), "connected to PostgreSQL");
    Ok(Arc::new(DieselDocumentStore::new(pool)))
}

fn build_geocoder(settings: &AppSettings) -> Result<Arc<dyn Geocoder>> {
    let Some(api_key) = settings.geocoder_api_key() else {
        warn!("no geocoder key configured; using offline fixture locations");
        return Ok(Arc::new(FixtureGeocoder));
    };
    let endpoint = settings.geocoder_url()?;
    let geocoder = HttpGeocoder::new(endpoint, api_key, settings.geocoder_timeout())
        .wrap_err("failed to build geocoder client")?;
    Ok(Arc::new(geocoder))
}

fn build_photo_storage(settings: &AppSettings) -> Result<Arc<dyn PhotoStorage>> {
    let root = settings.file_upload_path();
    let storage = FsPhotoStorage::open(root.clone())
        .wrap_err_with(|| format!("failed to open upload directory {}", root.display()))?;
    Ok(Arc::new(storage))
}
