//! Resource identity and the typed collection handle over the document store.
//!
//! Records are persisted as JSON documents keyed by collection name. A
//! [`Collection`] binds one [`Resource`] type to its collection so services
//! read and write typed values while list endpoints work with raw documents.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::Error;
use super::geo::GeoCap;
use super::ports::{DocumentStore, FindQuery};
use super::query::{FieldPath, Filter};

/// Raw stored record: a JSON object with at least `id` and `createdAt`.
pub type Document = serde_json::Map<String, Value>;

/// Field every stored document carries its identifier under.
pub const ID_FIELD: &str = "id";

/// Identifier of a stored resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(Uuid);

impl ResourceId {
    /// Mint a fresh identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier taken from a path segment or document field.
    pub fn parse(raw: &str) -> Result<Self, ResourceIdError> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| ResourceIdError {
                raw: raw.to_owned(),
            })
    }

    /// Access the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ResourceId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A path or body value that is not a well-formed identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed resource id: {raw}")]
pub struct ResourceIdError {
    raw: String,
}

impl From<ResourceIdError> for Error {
    fn from(value: ResourceIdError) -> Self {
        Self::not_found(format!("Resource not found with id of {}", value.raw))
    }
}

/// A record type persisted in its own collection.
pub trait Resource: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection (table partition) holding the records.
    const COLLECTION: &'static str;
    /// Human label used in messages, e.g. `Bootcamp`.
    const LABEL: &'static str;
    /// Stored fields that must never appear in a response.
    const HIDDEN_FIELDS: &'static [&'static str] = &[];
    /// Fields whose values must be unique across the collection.
    const UNIQUE_FIELDS: &'static [&'static str] = &[];

    /// Identifier of this record.
    fn id(&self) -> ResourceId;

    /// Error raised when no record exists for `id`.
    fn not_found(id: impl fmt::Display) -> Error {
        Error::not_found(format!("{} not found with id of {id}", Self::LABEL))
    }
}

/// Serialize a record into its stored document form.
pub fn to_document<R: Resource>(record: &R) -> Result<Document, Error> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(Error::internal(format!(
            "{} did not serialize to an object",
            R::LABEL
        ))),
        Err(err) => Err(Error::internal(format!(
            "failed to serialize {}: {err}",
            R::LABEL
        ))),
    }
}

/// Decode a stored document back into its record type.
pub fn from_document<R: Resource>(document: Document) -> Result<R, Error> {
    serde_json::from_value(Value::Object(document))
        .map_err(|err| Error::internal(format!("stored {} is malformed: {err}", R::LABEL)))
}

/// Remove the fields of `R` that must never leave the service.
pub fn strip_hidden<R: Resource>(mut document: Document) -> Document {
    for field in R::HIDDEN_FIELDS {
        document.remove(*field);
    }
    document
}

/// Client-facing JSON view of a record.
pub fn public_view<R: Resource>(record: &R) -> Result<Value, Error> {
    to_document(record).map(|document| Value::Object(strip_hidden::<R>(document)))
}

/// Typed handle over one collection of the document store.
pub struct Collection<R> {
    store: Arc<dyn DocumentStore>,
    marker: PhantomData<fn() -> R>,
}

impl<R> Clone for Collection<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            marker: PhantomData,
        }
    }
}

impl<R: Resource> Collection<R> {
    /// Bind `R` to its collection in `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            marker: PhantomData,
        }
    }

    /// Underlying store, for reads that cross into other collections.
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Fetch one record.
    pub async fn get(&self, id: ResourceId) -> Result<Option<R>, Error> {
        self.store
            .find_by_id(R::COLLECTION, *id.as_uuid())
            .await?
            .map(from_document)
            .transpose()
    }

    /// Fetch one record or fail with the resource's not-found error.
    pub async fn require(&self, id: ResourceId) -> Result<R, Error> {
        self.get(id).await?.ok_or_else(|| R::not_found(id))
    }

    /// Persist a new record.
    pub async fn insert(&self, record: &R) -> Result<(), Error> {
        let document = to_document(record)?;
        self.store
            .insert(R::COLLECTION, *record.id().as_uuid(), document)
            .await?;
        Ok(())
    }

    /// Overwrite an existing record. Returns `false` when it vanished.
    pub async fn replace(&self, record: &R) -> Result<bool, Error> {
        let document = to_document(record)?;
        Ok(self
            .store
            .replace(R::COLLECTION, *record.id().as_uuid(), document)
            .await?)
    }

    /// Remove a record. Returns `false` when nothing was deleted.
    pub async fn delete(&self, id: ResourceId) -> Result<bool, Error> {
        Ok(self.store.delete(R::COLLECTION, *id.as_uuid()).await?)
    }

    /// Raw documents matching `query`.
    pub async fn find(&self, query: &FindQuery) -> Result<Vec<Document>, Error> {
        Ok(self.store.find(R::COLLECTION, query).await?)
    }

    /// Number of documents matching `filter`.
    pub async fn count(&self, filter: &Filter) -> Result<u64, Error> {
        Ok(self.store.count(R::COLLECTION, filter).await?)
    }

    /// Raw documents whose GeoJSON point at `field` lies inside `cap`.
    pub async fn find_within(&self, field: &FieldPath, cap: GeoCap) -> Result<Vec<Document>, Error> {
        Ok(self.store.find_within(R::COLLECTION, field, cap).await?)
    }
}
