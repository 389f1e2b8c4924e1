//! Port for resolving postal codes and street addresses to coordinates.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;

use crate::domain::Error;
use crate::domain::geo::GeoPoint;

use super::define_port_error;

define_port_error! {
    /// Errors raised by geocoding adapters.
    pub enum GeocoderError {
        /// The provider returned no usable match.
        NotFound { query: String } => "no geocoding match for {query}",
        /// The provider could not be reached or timed out.
        Transport { message: String } => "geocoder transport failed: {message}",
        /// The provider rejected the request (bad key, quota).
        Rejected { message: String } => "geocoder rejected the request: {message}",
        /// The provider answered with a payload we could not read.
        Decode { message: String } => "geocoder response could not be decoded: {message}",
    }
}

impl From<GeocoderError> for Error {
    fn from(value: GeocoderError) -> Self {
        match value {
            GeocoderError::NotFound { query } => {
                Self::invalid_request(format!("Could not geocode location '{query}'"))
            }
            other => Self::upstream(other.to_string()),
        }
    }
}

/// A resolved location, ready to store as a bootcamp's GeoJSON point.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedLocation {
    /// Coordinates of the best match.
    pub point: GeoPoint,
    /// Provider-formatted single-line address.
    pub formatted_address: String,
    /// Street line, when the provider reports one.
    pub street: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State or region code.
    pub state: Option<String>,
    /// Postal code.
    pub zipcode: Option<String>,
    /// Country code.
    pub country: Option<String>,
}

/// Resolve free-form location text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Return the best match for `query`.
    async fn geocode(&self, query: &str) -> Result<GeocodedLocation, GeocoderError>;
}

struct KnownZip {
    zipcode: &'static str,
    longitude: f64,
    latitude: f64,
    city: &'static str,
    state: &'static str,
}

const KNOWN_ZIPS: &[KnownZip] = &[
    KnownZip { zipcode: "02118", longitude: -71.0726, latitude: 42.3388, city: "Boston", state: "MA" },
    KnownZip { zipcode: "02139", longitude: -71.1045, latitude: 42.3647, city: "Cambridge", state: "MA" },
    KnownZip { zipcode: "02215", longitude: -71.1028, latitude: 42.3467, city: "Boston", state: "MA" },
    KnownZip { zipcode: "01060", longitude: -72.6412, latitude: 42.3251, city: "Northampton", state: "MA" },
    KnownZip { zipcode: "10001", longitude: -73.9967, latitude: 40.7506, city: "New York", state: "NY" },
    KnownZip { zipcode: "90210", longitude: -118.4065, latitude: 34.0901, city: "Beverly Hills", state: "CA" },
    KnownZip { zipcode: "94103", longitude: -122.4119, latitude: 37.7725, city: "San Francisco", state: "CA" },
];

static ZIP_RE: OnceLock<Regex> = OnceLock::new();

fn zip_regex() -> &'static Regex {
    ZIP_RE.get_or_init(|| {
        Regex::new(r"\b(\d{5})\b")
            .unwrap_or_else(|error| panic!("zip regex failed to compile: {error}"))
    })
}

/// Offline geocoder answering from a small table of US postal codes.
///
/// Any query containing a known five-digit zipcode resolves; everything else
/// is `NotFound`. Used when no provider key is configured and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureGeocoder;

#[async_trait]
impl Geocoder for FixtureGeocoder {
    async fn geocode(&self, query: &str) -> Result<GeocodedLocation, GeocoderError> {
        let known = zip_regex()
            .captures_iter(query)
            .filter_map(|captures| captures.get(1))
            .find_map(|zip| KNOWN_ZIPS.iter().find(|known| known.zipcode == zip.as_str()))
            .ok_or_else(|| GeocoderError::not_found(query))?;

        let street = query
            .split_once(',')
            .map(|(first, _)| first.trim().to_owned())
            .filter(|first| !first.is_empty() && !zip_regex().is_match(first));
        let locality = format!("{}, {} {}, US", known.city, known.state, known.zipcode);
        let formatted_address = match &street {
            Some(street) => format!("{street}, {locality}"),
            None => locality,
        };

        Ok(GeocodedLocation {
            point: GeoPoint::new(known.longitude, known.latitude),
            formatted_address,
            street,
            city: Some(known.city.to_owned()),
            state: Some(known.state.to_owned()),
            zipcode: Some(known.zipcode.to_owned()),
            country: Some("US".to_owned()),
        })
    }
}
