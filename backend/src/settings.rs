//! Application settings loaded via OrthoConfig.
//!
//! Values layer defaults, an optional config file, `DEVCAMPER_*` environment
//! variables and command-line flags. Optional fields fall back to the
//! defaults exposed by the accessor methods.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MAX_FILE_UPLOAD: u64 = 1_000_000;
const DEFAULT_FILE_UPLOAD_PATH: &str = "./public/uploads";
const DEFAULT_GEOCODER_URL: &str = "https://www.mapquestapi.com/geocoding/v1/address";
const DEFAULT_GEOCODER_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
const DEFAULT_ADMIN_NAME: &str = "Administrator";

/// Configuration for the HTTP server and its adapters.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DEVCAMPER")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Largest accepted photo upload in bytes.
    pub max_file_upload: Option<u64>,
    /// Directory receiving uploaded photos.
    pub file_upload_path: Option<PathBuf>,
    /// Page size for listings that omit `limit`.
    pub page_limit: Option<u32>,
    /// Geocoding endpoint.
    pub geocoder_url: Option<String>,
    /// Geocoding API key; the offline fixture geocoder is used when absent.
    pub geocoder_api_key: Option<String>,
    /// Geocoder request timeout.
    pub geocoder_timeout_secs: Option<u64>,
    /// File holding the session signing key.
    pub session_key_file: Option<PathBuf>,
    /// Generate a throwaway session key when the key file is unreadable.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
    /// Mark the session cookie `Secure`; on unless explicitly disabled.
    pub cookie_secure: Option<bool>,
    /// E-mail of the administrator ensured at startup.
    pub admin_email: Option<String>,
    /// Password of the administrator ensured at startup.
    pub admin_password: Option<String>,
    /// Display name of the administrator ensured at startup.
    pub admin_name: Option<String>,
}

/// Invalid setting values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// `bind_addr` is not `host:port`.
    #[error("invalid bind address {value}: {message}")]
    BindAddr { value: String, message: String },
    /// `geocoder_url` is not a URL.
    #[error("invalid geocoder URL {value}: {message}")]
    GeocoderUrl { value: String, message: String },
}

impl AppSettings {
    /// Parsed listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|error: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: error.to_string(),
        })
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Connection pool size.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS)
    }

    /// Upload ceiling in bytes.
    pub fn max_file_upload(&self) -> u64 {
        self.max_file_upload.unwrap_or(DEFAULT_MAX_FILE_UPLOAD)
    }

    /// Upload directory.
    pub fn file_upload_path(&self) -> PathBuf {
        self.file_upload_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE_UPLOAD_PATH))
    }

    /// Default page size; zero falls back to the pagination default.
    pub fn page_limit(&self) -> u32 {
        self.page_limit
            .filter(|limit| *limit > 0)
            .unwrap_or(pagination::DEFAULT_LIMIT)
    }

    /// Parsed geocoding endpoint.
    pub fn geocoder_url(&self) -> Result<url::Url, SettingsError> {
        let raw = self.geocoder_url.as_deref().unwrap_or(DEFAULT_GEOCODER_URL);
        url::Url::parse(raw).map_err(|error| SettingsError::GeocoderUrl {
            value: raw.to_owned(),
            message: error.to_string(),
        })
    }

    /// Geocoding key, ignoring blank values.
    pub fn geocoder_api_key(&self) -> Option<&str> {
        self.geocoder_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Geocoder request timeout.
    pub fn geocoder_timeout(&self) -> Duration {
        Duration::from_secs(
            self.geocoder_timeout_secs
                .unwrap_or(DEFAULT_GEOCODER_TIMEOUT_SECS),
        )
    }

    /// Session key location.
    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Whether the session cookie carries the `Secure` attribute.
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }

    /// Administrator account to ensure at startup.
    ///
    /// Both an e-mail and a password must be configured; otherwise no
    /// account is seeded.
    pub fn bootstrap_admin(&self) -> Option<BootstrapAdmin> {
        let email = non_blank(self.admin_email.as_deref())?;
        let password = self.admin_password.as_deref().filter(|value| !value.is_empty())?;
        Some(BootstrapAdmin {
            name: non_blank(self.admin_name.as_deref())
                .unwrap_or(DEFAULT_ADMIN_NAME)
                .to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Credentials for the administrator seeded at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    /// Display name.
    pub name: String,
    /// Login e-mail.
    pub email: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
