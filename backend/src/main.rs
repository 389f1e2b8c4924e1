//! Backend entry-point: loads settings, wires adapters, and serves the REST API.

mod server;

use actix_web::cookie::SameSite;
use actix_web::web;
use color_eyre::eyre::{Context, Result};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use devcamper::inbound::http::health::HealthState;
use devcamper::settings::AppSettings;
use server::{
    BuildMode, ServerConfig, build_limits, build_ports, create_server, load_session_key,
    seed_admin_on_startup,
};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().wrap_err("failed to load settings")?;
    let bind_addr = settings.bind_addr()?;
    let key = load_session_key(
        &settings.session_key_file(),
        BuildMode::from_debug_assertions(),
        settings.session_allow_ephemeral,
    )?;

    let ports = build_ports(&settings).await?;
    seed_admin_on_startup(&settings, ports.store.clone())
        .await
        .wrap_err("failed to seed the bootstrap admin")?;
    let health_state = web::Data::new(HealthState::new(ports.store.clone()));
    let config = ServerConfig::new(key, settings.cookie_secure(), SameSite::Lax, bind_addr, ports)
        .with_limits(build_limits(&settings));

    let server = create_server(health_state, config)
        .wrap_err_with(|| format!("failed to bind {bind_addr}"))?;
    info!(%bind_addr, "devcamper listening");
    server.await.wrap_err("server terminated with an error")
}
