//! Bootcamp records and the payload used to create or update them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::geo::GeoPoint;
use super::ports::GeocodedLocation;
use super::resource::{Resource, ResourceId};
use super::slug::slugify;
use super::timestamp;
use super::validation::{ValidationErrors, is_http_url, is_valid_email};

/// Longest accepted bootcamp name.
pub const NAME_MAX: usize = 50;
/// Longest accepted description.
pub const DESCRIPTION_MAX: usize = 500;
/// Longest accepted phone number.
pub const PHONE_MAX: usize = 20;
/// Photo assigned until one is uploaded.
pub const DEFAULT_PHOTO: &str = "no-photo.jpg";

/// Career track a bootcamp prepares students for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Career {
    /// Web Development.
    #[serde(rename = "Web Development")]
    WebDevelopment,
    /// Mobile Development.
    #[serde(rename = "Mobile Development")]
    MobileDevelopment,
    /// UI/UX.
    #[serde(rename = "UI/UX")]
    UiUx,
    /// Data Science.
    #[serde(rename = "Data Science")]
    DataScience,
    /// Business.
    Business,
    /// Other.
    Other,
}

impl Career {
    /// Every career, in display order.
    pub const ALL: [Self; 6] = [
        Self::WebDevelopment,
        Self::MobileDevelopment,
        Self::UiUx,
        Self::DataScience,
        Self::Business,
        Self::Other,
    ];

    /// Display label, identical to the stored value.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::WebDevelopment => "Web Development",
            Self::MobileDevelopment => "Mobile Development",
            Self::UiUx => "UI/UX",
            Self::DataScience => "Data Science",
            Self::Business => "Business",
            Self::Other => "Other",
        }
    }

    /// Resolve a stored or submitted label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|career| career.label() == label)
    }
}

impl fmt::Display for Career {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// GeoJSON point enriched with the geocoder's address breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Always `Point`.
    #[serde(rename = "type")]
    pub kind: String,
    /// `[longitude, latitude]`.
    pub coordinates: Vec<f64>,
    /// Single-line address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    /// Street line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    /// City.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// State or region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Postal code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    /// Country code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Location {
    /// Coordinates as a point, when well formed.
    #[must_use]
    pub fn point(&self) -> Option<GeoPoint> {
        GeoPoint::from_coordinates(&self.coordinates)
    }
}

impl From<GeocodedLocation> for Location {
    fn from(value: GeocodedLocation) -> Self {
        Self {
            kind: "Point".to_owned(),
            coordinates: vec![value.point.longitude, value.point.latitude],
            formatted_address: Some(value.formatted_address),
            street: value.street,
            city: value.city,
            state: value.state,
            zipcode: value.zipcode,
            country: value.country,
        }
    }
}

/// A coding bootcamp listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bootcamp {
    /// Identifier.
    #[schema(value_type = String, format = Uuid)]
    pub id: ResourceId,
    /// Unique display name.
    pub name: String,
    /// URL slug derived from `name`.
    pub slug: String,
    /// Free-text description.
    pub description: String,
    /// Public website.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Contact phone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Contact e-mail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Geocoded location.
    pub location: Location,
    /// Career tracks offered.
    pub careers: Vec<Career>,
    /// Mean review rating, 1 to 10.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    /// Mean tuition cost.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_cost: Option<f64>,
    /// Stored photo file name.
    pub photo: String,
    /// Offers housing.
    pub housing: bool,
    /// Offers job assistance.
    pub job_assistance: bool,
    /// Guarantees a job.
    pub job_guarantee: bool,
    /// Accepts the GI Bill.
    pub accept_gi: bool,
    /// Owning user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub user: Option<ResourceId>,
    /// Creation time.
    #[serde(with = "timestamp")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl Resource for Bootcamp {
    const COLLECTION: &'static str = "bootcamps";
    const LABEL: &'static str = "Bootcamp";
    const UNIQUE_FIELDS: &'static [&'static str] = &["name"];

    fn id(&self) -> ResourceId {
        self.id
    }
}

/// Create or update payload. Every field is optional so updates can be
/// partial; creation enforces the required ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BootcampInput {
    /// Display name.
    pub name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Website URL.
    pub website: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Contact e-mail.
    pub email: Option<String>,
    /// Free-form address, geocoded into `location`.
    pub address: Option<String>,
    /// Career labels.
    pub careers: Option<Vec<String>>,
    /// Mean rating.
    pub average_rating: Option<f64>,
    /// Mean cost.
    pub average_cost: Option<f64>,
    /// Offers housing.
    pub housing: Option<bool>,
    /// Offers job assistance.
    pub job_assistance: Option<bool>,
    /// Guarantees a job.
    pub job_guarantee: Option<bool>,
    /// Accepts the GI Bill.
    pub accept_gi: Option<bool>,
}

/// Fields that passed validation, ready to become a [`Bootcamp`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidBootcamp {
    name: String,
    description: String,
    website: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    careers: Vec<Career>,
    average_rating: Option<f64>,
    average_cost: Option<f64>,
    housing: bool,
    job_assistance: bool,
    job_guarantee: bool,
    accept_gi: bool,
}

impl BootcampInput {
    /// Overlay this payload on `existing`, keeping stored values for every
    /// absent field. The address is left as submitted.
    #[must_use]
    pub fn over(self, existing: &Bootcamp) -> Self {
        Self {
            name: self.name.or_else(|| Some(existing.name.clone())),
            description: self.description.or_else(|| Some(existing.description.clone())),
            website: self.website.or_else(|| existing.website.clone()),
            phone: self.phone.or_else(|| existing.phone.clone()),
            email: self.email.or_else(|| existing.email.clone()),
            address: self.address,
            careers: self.careers.or_else(|| {
                Some(
                    existing
                        .careers
                        .iter()
                        .map(|career| career.label().to_owned())
                        .collect(),
                )
            }),
            average_rating: self.average_rating.or(existing.average_rating),
            average_cost: self.average_cost.or(existing.average_cost),
            housing: self.housing.or(Some(existing.housing)),
            job_assistance: self.job_assistance.or(Some(existing.job_assistance)),
            job_guarantee: self.job_guarantee.or(Some(existing.job_guarantee)),
            accept_gi: self.accept_gi.or(Some(existing.accept_gi)),
        }
    }

    /// Check every field, collecting all failures.
    ///
    /// `require_address` is set on creation, where the location is derived
    /// from the address.
    pub fn validate(&self, require_address: bool) -> Result<ValidBootcamp, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = trimmed(self.name.as_deref());
        match name {
            None => errors.push("Please add a name"),
            Some(name) => errors.check(
                name.chars().count() > NAME_MAX,
                "Name can not be more than 50 characters",
            ),
        }

        let description = trimmed(self.description.as_deref());
        match description {
            None => errors.push("Please add a description"),
            Some(text) => errors.check(
                text.chars().count() > DESCRIPTION_MAX,
                "Description can not be more than 500 characters",
            ),
        }

        let website = trimmed(self.website.as_deref());
        errors.check(
            website.is_some_and(|url| !is_http_url(url)),
            "Please use a valid URL with HTTP or HTTPS",
        );
        let phone = trimmed(self.phone.as_deref());
        errors.check(
            phone.is_some_and(|phone| phone.chars().count() > PHONE_MAX),
            "Phone number can not be longer than 20 characters",
        );
        let email = trimmed(self.email.as_deref());
        errors.check(
            email.is_some_and(|email| !is_valid_email(email)),
            "Please add a valid email",
        );
        errors.check(
            require_address && trimmed(self.address.as_deref()).is_none(),
            "Please add an address",
        );

        let careers = self.validate_careers(&mut errors);

        if let Some(rating) = self.average_rating {
            errors.check(rating < 1.0, "Rating must be at least 1");
            errors.check(rating > 10.0, "Rating can not be more than 10");
        }
        errors.check(
            self.average_cost.is_some_and(|cost| cost < 0.0),
            "Average cost can not be negative",
        );

        errors.into_result()?;
        Ok(ValidBootcamp {
            name: name.unwrap_or_default().to_owned(),
            description: description.unwrap_or_default().to_owned(),
            website: website.map(str::to_owned),
            phone: phone.map(str::to_owned),
            email: email.map(str::to_owned),
            careers,
            average_rating: self.average_rating,
            average_cost: self.average_cost,
            housing: self.housing.unwrap_or(false),
            job_assistance: self.job_assistance.unwrap_or(false),
            job_guarantee: self.job_guarantee.unwrap_or(false),
            accept_gi: self.accept_gi.unwrap_or(false),
        })
    }

    fn validate_careers(&self, errors: &mut ValidationErrors) -> Vec<Career> {
        let labels = self.careers.as_deref().unwrap_or_default();
        if labels.is_empty() {
            errors.push("Please add at least one career");
            return Vec::new();
        }
        let mut careers = Vec::with_capacity(labels.len());
        for label in labels {
            match Career::parse(label.trim()) {
                Some(career) if !careers.contains(&career) => careers.push(career),
                Some(_) => {}
                None => errors.push(format!("'{label}' is not a valid career")),
            }
        }
        careers
    }
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}

impl Bootcamp {
    /// Build a new record owned by `owner`.
    #[must_use]
    pub fn create(valid: ValidBootcamp, location: Location, owner: Option<ResourceId>) -> Self {
        let mut bootcamp = Self {
            id: ResourceId::random(),
            name: String::new(),
            slug: String::new(),
            description: String::new(),
            website: None,
            phone: None,
            email: None,
            location,
            careers: Vec::new(),
            average_rating: None,
            average_cost: None,
            photo: DEFAULT_PHOTO.to_owned(),
            housing: false,
            job_assistance: false,
            job_guarantee: false,
            accept_gi: false,
            user: owner,
            created_at: timestamp::now(),
        };
        bootcamp.apply(valid);
        bootcamp
    }

    /// Overwrite the editable fields, re-deriving the slug.
    pub fn apply(&mut self, valid: ValidBootcamp) {
        self.slug = slugify(&valid.name);
        self.name = valid.name;
        self.description = valid.description;
        self.website = valid.website;
        self.phone = valid.phone;
        self.email = valid.email;
        self.careers = valid.careers;
        self.average_rating = valid.average_rating;
        self.average_cost = valid.average_cost;
        self.housing = valid.housing;
        self.job_assistance = valid.job_assistance;
        self.job_guarantee = valid.job_guarantee;
        self.accept_gi = valid.accept_gi;
    }
}
