//! Bootcamp use-cases: CRUD, radius search and photo upload.

use std::sync::Arc;

use tracing::info;

use super::advanced_results::{Populate, QueryResultEnvelope, advanced_results};
use super::bootcamp::{Bootcamp, BootcampInput, Location};
use super::geo::GeoCap;
use super::photo::PhotoUpload;
use super::ports::{DocumentStore, Geocoder, PhotoStorage};
use super::query::FieldPath;
use super::resource::{Collection, Resource, ResourceId, from_document};
use super::user::User;
use super::Error;

/// Owning user embedded in bootcamp listings.
pub const OWNER_POPULATE: Populate = Populate {
    field: "user",
    collection: User::COLLECTION,
    fields: &["name", "email"],
};

/// Radius-search result: `{success, count, data}` without pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct RadiusResults {
    /// Matching records in creation order.
    pub bootcamps: Vec<Bootcamp>,
}

/// Bootcamp service wiring the store, geocoder and photo storage together.
#[derive(Clone)]
pub struct BootcampsService {
    bootcamps: Collection<Bootcamp>,
    geocoder: Arc<dyn Geocoder>,
    photos: Arc<dyn PhotoStorage>,
}

impl BootcampsService {
    /// Create a service over `store`.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        geocoder: Arc<dyn Geocoder>,
        photos: Arc<dyn PhotoStorage>,
    ) -> Self {
        Self {
            bootcamps: Collection::new(store),
            geocoder,
            photos,
        }
    }

    /// Listing with owner population.
    pub async fn list(
        &self,
        params: &[(String, String)],
        default_limit: u32,
    ) -> Result<QueryResultEnvelope, Error> {
        advanced_results(params, &self.bootcamps, Some(&OWNER_POPULATE), default_limit).await
    }

    /// Fetch one bootcamp.
    pub async fn get(&self, raw_id: &str) -> Result<Bootcamp, Error> {
        let id = ResourceId::parse(raw_id)?;
        self.bootcamps.require(id).await
    }

    /// Validate, geocode and store a new bootcamp owned by `owner`.
    pub async fn create(
        &self,
        owner: Option<ResourceId>,
        input: BootcampInput,
    ) -> Result<Bootcamp, Error> {
        let valid = input.validate(true)?;
        let address = input.address.as_deref().unwrap_or_default().trim();
        let location = self.locate(address).await?;
        let bootcamp = Bootcamp::create(valid, location, owner);
        self.bootcamps.insert(&bootcamp).await?;
        info!(id = %bootcamp.id, name = %bootcamp.name, "bootcamp created");
        Ok(bootcamp)
    }

    /// Merge `input` into the stored record and re-validate.
    ///
    /// The location is re-geocoded only when an address is supplied.
    pub async fn update(&self, raw_id: &str, input: BootcampInput) -> Result<Bootcamp, Error> {
        let id = ResourceId::parse(raw_id)?;
        let mut bootcamp = self.bootcamps.require(id).await?;
        let merged = input.over(&bootcamp);
        let valid = merged.validate(false)?;
        if let Some(address) = merged
            .address
            .as_deref()
            .map(str::trim)
            .filter(|address| !address.is_empty())
        {
            bootcamp.location = self.locate(address).await?;
        }
        bootcamp.apply(valid);
        self.store_existing(&bootcamp).await?;
        Ok(bootcamp)
    }

    /// Hard delete.
    pub async fn delete(&self, raw_id: &str) -> Result<(), Error> {
        let id = ResourceId::parse(raw_id)?;
        if !self.bootcamps.delete(id).await? {
            return Err(Bootcamp::not_found(id));
        }
        info!(%id, "bootcamp deleted");
        Ok(())
    }

    /// Bootcamps within `distance_raw` miles of `zipcode`.
    pub async fn within_radius(
        &self,
        zipcode: &str,
        distance_raw: &str,
    ) -> Result<RadiusResults, Error> {
        let miles: f64 = distance_raw
            .trim()
            .parse()
            .map_err(|_| Error::invalid_request("Please provide a valid distance in miles"))?;
        let center = self.geocoder.geocode(zipcode).await?.point;
        let cap = GeoCap::from_miles(center, miles)?;
        let field = FieldPath::parse("location")
            .map_err(|error| Error::internal(format!("location path: {error}")))?;
        let bootcamps = self
            .bootcamps
            .find_within(&field, cap)
            .await?
            .into_iter()
            .map(from_document)
            .collect::<Result<Vec<Bootcamp>, _>>()?;
        Ok(RadiusResults { bootcamps })
    }

    /// Check and store an uploaded photo, returning the stored file name.
    ///
    /// The record must exist before the upload is inspected.
    pub async fn upload_photo(
        &self,
        raw_id: &str,
        upload: Option<PhotoUpload>,
        max_bytes: u64,
    ) -> Result<String, Error> {
        let id = ResourceId::parse(raw_id)?;
        let mut bootcamp = self.bootcamps.require(id).await?;
        let upload = PhotoUpload::check(upload, max_bytes)?;
        let file_name = upload.stored_name(id);
        self.photos.save(&file_name, upload.bytes).await?;
        bootcamp.photo.clone_from(&file_name);
        self.store_existing(&bootcamp).await?;
        info!(%id, file_name, "bootcamp photo uploaded");
        Ok(file_name)
    }

    async fn locate(&self, address: &str) -> Result<Location, Error> {
        let geocoded = self.geocoder.geocode(address).await?;
        Ok(Location::from(geocoded))
    }

    async fn store_existing(&self, bootcamp: &Bootcamp) -> Result<(), Error> {
        if self.bootcamps.replace(bootcamp).await? {
            Ok(())
        } else {
            Err(Bootcamp::not_found(bootcamp.id))
        }
    }
}

#[cfg(test)]
#[path = "bootcamps_service_tests.rs"]
mod tests;
