//! In-process document store.
//!
//! Backs tests and local runs without a database. Every collection is a
//! vector in insertion order, so creation order is the vector order. One
//! `RwLock` guards all collections and is never held across an await.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::geo::{GeoCap, GeoPoint};
use crate::domain::ports::{DocumentStore, DocumentStoreError, FindQuery};
use crate::domain::query::{FieldPath, Filter, compare_documents, lookup};
use crate::domain::resource::{Document, Resource};

#[derive(Debug, Clone)]
struct Entry {
    id: Uuid,
    document: Document,
}

#[derive(Debug, Default)]
struct Collections {
    entries: HashMap<String, Vec<Entry>>,
}

/// Document store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    inner: RwLock<Collections>,
    unique_fields: HashMap<String, Vec<String>>,
}

impl MemoryDocumentStore {
    /// Empty store without uniqueness rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enforce uniqueness of `field` within `collection`.
    #[must_use]
    pub fn with_unique_field(mut self, collection: &str, field: &str) -> Self {
        self.unique_fields
            .entry(collection.to_owned())
            .or_default()
            .push(field.to_owned());
        self
    }

    /// Enforce the unique fields declared by `R`.
    #[must_use]
    pub fn with_resource<R: Resource>(self) -> Self {
        R::UNIQUE_FIELDS
            .iter()
            .fold(self, |store, field| store.with_unique_field(R::COLLECTION, field))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collections>, DocumentStoreError> {
        self.inner
            .read()
            .map_err(|_| DocumentStoreError::query("memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collections>, DocumentStoreError> {
        self.inner
            .write()
            .map_err(|_| DocumentStoreError::query("memory store lock poisoned"))
    }

    fn check_unique(
        &self,
        collection: &str,
        entries: &[Entry],
        id: Uuid,
        document: &Document,
    ) -> Result<(), DocumentStoreError> {
        let Some(fields) = self.unique_fields.get(collection) else {
            return Ok(());
        };
        for field in fields {
            let Some(candidate) = document.get(field).filter(|value| !value.is_null()) else {
                continue;
            };
            let clash = entries
                .iter()
                .any(|entry| entry.id != id && entry.document.get(field) == Some(candidate));
            if clash {
                return Err(DocumentStoreError::duplicate(field.as_str()));
            }
        }
        Ok(())
    }
}

fn point_at(document: &Document, field: &FieldPath) -> Option<GeoPoint> {
    let coordinates: Vec<f64> = lookup(document, field)?
        .get("coordinates")?
        .as_array()?
        .iter()
        .map(Value::as_f64)
        .collect::<Option<_>>()?;
    GeoPoint::from_coordinates(&coordinates)
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(
        &self,
        collection: &str,
        id: Uuid,
        document: Document,
    ) -> Result<(), DocumentStoreError> {
        let mut guard = self.write()?;
        let entries = guard.entries.entry(collection.to_owned()).or_default();
        if entries.iter().any(|entry| entry.id == id) {
            return Err(DocumentStoreError::duplicate("id"));
        }
        self.check_unique(collection, entries, id, &document)?;
        entries.push(Entry { id, document });
        Ok(())
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: Uuid,
    ) -> Result<Option<Document>, DocumentStoreError> {
        let guard = self.read()?;
        Ok(guard.entries.get(collection).and_then(|entries| {
            entries
                .iter()
                .find(|entry| entry.id == id)
                .map(|entry| entry.document.clone())
        }))
    }

    async fn replace(
        &self,
        collection: &str,
        id: Uuid,
        document: Document,
    ) -> Result<bool, DocumentStoreError> {
        let mut guard = self.write()?;
        let Some(entries) = guard.entries.get_mut(collection) else {
            return Ok(false);
        };
        self.check_unique(collection, entries, id, &document)?;
        match entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.document = document;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, DocumentStoreError> {
        let mut guard = self.write()?;
        let Some(entries) = guard.entries.get_mut(collection) else {
            return Ok(false);
        };
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        Ok(entries.len() < before)
    }

    async fn find(
        &self,
        collection: &str,
        query: &FindQuery,
    ) -> Result<Vec<Document>, DocumentStoreError> {
        let guard = self.read()?;
        let mut matched: Vec<&Document> = guard
            .entries
            .get(collection)
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| &entry.document)
                    .filter(|document| query.filter.matches(document))
                    .collect()
            })
            .unwrap_or_default();
        if !query.sort.is_empty() {
            matched.sort_by(|left, right| compare_documents(left, right, &query.sort));
        }
        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let take = query
            .limit
            .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(matched.into_iter().skip(skip).take(take).cloned().collect())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, DocumentStoreError> {
        let guard = self.read()?;
        let count = guard.entries.get(collection).map_or(0, |entries| {
            entries
                .iter()
                .filter(|entry| filter.matches(&entry.document))
                .count()
        });
        u64::try_from(count).map_err(|err| DocumentStoreError::query(err.to_string()))
    }

    async fn find_within(
        &self,
        collection: &str,
        field: &FieldPath,
        cap: GeoCap,
    ) -> Result<Vec<Document>, DocumentStoreError> {
        let guard = self.read()?;
        Ok(guard
            .entries
            .get(collection)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| point_at(&entry.document, field).is_some_and(|p| cap.contains(&p)))
                    .map(|entry| entry.document.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn ping(&self) -> Result<(), DocumentStoreError> {
        self.read().map(|_| ())
    }
}
