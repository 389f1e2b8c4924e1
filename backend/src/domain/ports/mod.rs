//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod document_store;
mod geocoder;
mod photo_storage;

#[cfg(test)]
pub use document_store::MockDocumentStore;
pub use document_store::{DocumentStore, DocumentStoreError, FindQuery};
#[cfg(test)]
pub use geocoder::MockGeocoder;
pub use geocoder::{FixtureGeocoder, GeocodedLocation, Geocoder, GeocoderError};
#[cfg(test)]
pub use photo_storage::MockPhotoStorage;
pub use photo_storage::{PhotoStorage, PhotoStorageError};
