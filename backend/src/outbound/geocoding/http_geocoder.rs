//! Reqwest-backed geocoder speaking the MapQuest geocoding API.
//!
//! The adapter owns transport details only: query encoding, timeout and
//! status mapping, and JSON decoding into [`GeocodedLocation`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::dto::GeocodeResponseDto;
use crate::domain::ports::{GeocodedLocation, Geocoder, GeocoderError};

const USER_AGENT: &str = "devcamper-backend/0.1";

/// Geocoder calling `GET <endpoint>?key=<key>&location=<query>`.
pub struct HttpGeocoder {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl HttpGeocoder {
    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn geocode(&self, query: &str) -> Result<GeocodedLocation, GeocoderError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("key", self.api_key.as_str()), ("location", query)])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status));
        }
        parse_location(query, body.as_ref())
    }
}

fn parse_location(query: &str, body: &[u8]) -> Result<GeocodedLocation, GeocoderError> {
    let decoded: GeocodeResponseDto = serde_json::from_slice(body)
        .map_err(|error| GeocoderError::decode(format!("invalid geocoding JSON: {error}")))?;
    if decoded.info.statuscode != 0 {
        return Err(GeocoderError::rejected(format!(
            "status {}: {}",
            decoded.info.statuscode,
            decoded.info.messages.join("; ")
        )));
    }
    decoded
        .best_match()
        .ok_or_else(|| GeocoderError::not_found(query))?
        .into_domain()
        .map_err(GeocoderError::decode)
}

fn map_transport_error(error: reqwest::Error) -> GeocoderError {
    GeocoderError::transport(error.to_string())
}

fn map_status_error(status: StatusCode) -> GeocoderError {
    let message = format!("status {}", status.as_u16());
    if status.is_client_error() {
        GeocoderError::rejected(message)
    } else {
        GeocoderError::transport(message)
    }
}
