//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use devcamper::inbound::http::state::{HttpLimits, HttpStatePorts};

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) ports: HttpStatePorts,
    pub(crate) limits: HttpLimits,
}

impl ServerConfig {
    /// Construct a server configuration around prepared adapters.
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        ports: HttpStatePorts,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            ports,
            limits: HttpLimits::default(),
        }
    }

    /// Override listing and upload limits.
    #[must_use]
    pub fn with_limits(mut self, limits: HttpLimits) -> Self {
        self.limits = limits;
        self
    }
}
