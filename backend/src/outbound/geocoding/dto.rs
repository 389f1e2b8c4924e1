//! DTOs for decoding MapQuest geocoding responses.

use serde::Deserialize;

use crate::domain::geo::GeoPoint;
use crate::domain::ports::GeocodedLocation;

#[derive(Debug, Deserialize)]
pub(super) struct GeocodeResponseDto {
    pub(super) info: InfoDto,
    #[serde(default)]
    pub(super) results: Vec<ResultDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct InfoDto {
    pub(super) statuscode: i64,
    #[serde(default)]
    pub(super) messages: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ResultDto {
    #[serde(default)]
    pub(super) locations: Vec<LocationDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LocationDto {
    #[serde(default)]
    street: String,
    /// City.
    #[serde(default, rename = "adminArea5")]
    city: String,
    /// State.
    #[serde(default, rename = "adminArea3")]
    state: String,
    /// Country.
    #[serde(default, rename = "adminArea1")]
    country: String,
    #[serde(default)]
    postal_code: String,
    lat_lng: LatLngDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct LatLngDto {
    lat: f64,
    lng: f64,
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

impl GeocodeResponseDto {
    /// First location of the first result, if any.
    pub(super) fn best_match(self) -> Option<LocationDto> {
        self.results
            .into_iter()
            .flat_map(|result| result.locations)
            .next()
    }
}

impl LocationDto {
    pub(super) fn into_domain(self) -> Result<GeocodedLocation, String> {
        let LatLngDto { lat, lng } = self.lat_lng;
        if !lat.is_finite() || !lng.is_finite() {
            return Err("location includes non-finite coordinates".to_owned());
        }
        let street = non_empty(self.street);
        let city = non_empty(self.city);
        let state = non_empty(self.state);
        let zipcode = non_empty(self.postal_code);
        let country = non_empty(self.country);

        let region = [state.as_deref(), zipcode.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        let formatted_address = [street.as_deref(), city.as_deref(), Some(region.as_str()), country.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        Ok(GeocodedLocation {
            point: GeoPoint::new(lng, lat),
            formatted_address,
            street,
            city,
            state,
            zipcode,
            country,
        })
    }
}
