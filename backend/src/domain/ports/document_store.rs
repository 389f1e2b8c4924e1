//! Port abstraction over the document store holding every resource.
//!
//! Documents are JSON objects partitioned by collection name and keyed by
//! UUID. Adapters must honour the query model in [`crate::domain::query`]:
//! missing fields never match, array fields match when any element does, and
//! results come back in creation order unless a sort is given.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::geo::GeoCap;
use crate::domain::query::{FieldPath, Filter, SortKey};
use crate::domain::resource::Document;

use super::define_port_error;

define_port_error! {
    /// Errors raised by document store adapters.
    pub enum DocumentStoreError {
        /// The store could not be reached.
        Connection { message: String } => "document store connection failed: {message}",
        /// A read or write failed during execution.
        Query { message: String } => "document store query failed: {message}",
        /// A unique field already holds the submitted value.
        Duplicate { field: String } => "duplicate value for unique field {field}",
    }
}

impl From<DocumentStoreError> for Error {
    fn from(value: DocumentStoreError) -> Self {
        match value {
            DocumentStoreError::Duplicate { .. } => Self::duplicate("Duplicate field value entered"),
            DocumentStoreError::Connection { message } => {
                Self::upstream(format!("document store unavailable: {message}"))
            }
            DocumentStoreError::Query { message } => Self::internal(message),
        }
    }
}

/// Filtered, ordered, windowed read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindQuery {
    /// Conditions every returned document satisfies.
    pub filter: Filter,
    /// Ordering; ties and the empty sort fall back to creation order.
    pub sort: Vec<SortKey>,
    /// Documents to skip after ordering.
    pub skip: u64,
    /// Maximum documents to return; `None` returns the rest.
    pub limit: Option<u64>,
}

impl FindQuery {
    /// Every document matching `filter`, in creation order.
    #[must_use]
    pub fn matching(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }
}

/// Persistence port for JSON documents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store a new document. Fails with `Duplicate` on unique-field clashes.
    async fn insert(
        &self,
        collection: &str,
        id: Uuid,
        document: Document,
    ) -> Result<(), DocumentStoreError>;

    /// Fetch a document by identifier.
    async fn find_by_id(
        &self,
        collection: &str,
        id: Uuid,
    ) -> Result<Option<Document>, DocumentStoreError>;

    /// Overwrite an existing document, keeping its creation position.
    /// Returns `false` when no document has that identifier.
    async fn replace(
        &self,
        collection: &str,
        id: Uuid,
        document: Document,
    ) -> Result<bool, DocumentStoreError>;

    /// Remove a document. Returns `false` when nothing was removed.
    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, DocumentStoreError>;

    /// Read documents matching `query`.
    async fn find(
        &self,
        collection: &str,
        query: &FindQuery,
    ) -> Result<Vec<Document>, DocumentStoreError>;

    /// Count documents matching `filter`.
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, DocumentStoreError>;

    /// Documents whose GeoJSON point at `field` lies inside `cap`, in
    /// creation order.
    async fn find_within(
        &self,
        collection: &str,
        field: &FieldPath,
        cap: GeoCap,
    ) -> Result<Vec<Document>, DocumentStoreError>;

    /// Check the store is reachable.
    async fn ping(&self) -> Result<(), DocumentStoreError>;
}
