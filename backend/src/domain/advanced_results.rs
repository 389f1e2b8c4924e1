//! The listing pipeline shared by every collection endpoint.
//!
//! [`advanced_results`] turns decoded query-string pairs into one filtered,
//! ordered, paginated read and packages it as a [`QueryResultEnvelope`]. It
//! does not know which resource it is listing; route handlers pass the
//! collection and echo the envelope.

use std::collections::HashMap;
use std::sync::Arc;

use pagination::Pagination;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::Error;
use super::ports::{DocumentStore, FindQuery};
use super::query::{Condition, FieldPath, Filter, ListQuery};
use super::resource::{Collection, Document, ID_FIELD, Resource, strip_hidden};

/// Successful listing response.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct QueryResultEnvelope {
    /// Always `true`.
    pub success: bool,
    /// Number of records in `data`.
    pub count: usize,
    /// Neighbouring pages, each `{page, limit}`, present only when they exist.
    #[schema(value_type = Object)]
    pub pagination: Pagination,
    /// Records on this page.
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Value>,
}

/// Eagerly embed a referenced record in place of its identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Populate {
    /// Field holding the referenced identifier.
    pub field: &'static str,
    /// Collection the identifier points into.
    pub collection: &'static str,
    /// Fields of the referenced record to embed besides `id`.
    pub fields: &'static [&'static str],
}

impl Populate {
    /// Replace each document's `field` with the referenced record's selected
    /// fields, or `null` when the reference dangles.
    pub async fn apply(
        &self,
        store: &Arc<dyn DocumentStore>,
        documents: &mut [Document],
    ) -> Result<(), Error> {
        let ids: Vec<String> = documents
            .iter()
            .filter_map(|document| document.get(self.field))
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect();
        if ids.is_empty() {
            return Ok(());
        }

        let filter = Filter::all().and(Condition::any_of(FieldPath::id(), ids));
        let related: HashMap<String, Value> = store
            .find(self.collection, &FindQuery::matching(filter))
            .await?
            .into_iter()
            .filter_map(|document| {
                let id = document.get(ID_FIELD)?.as_str()?.to_owned();
                Some((id, Value::Object(self.embed(&document))))
            })
            .collect();

        for document in documents.iter_mut() {
            let Some(reference) = document.get(self.field).and_then(Value::as_str) else {
                continue;
            };
            let embedded = related.get(reference).cloned().unwrap_or(Value::Null);
            document.insert(self.field.to_owned(), embedded);
        }
        Ok(())
    }

    fn embed(&self, related: &Document) -> Document {
        std::iter::once(ID_FIELD)
            .chain(self.fields.iter().copied())
            .filter_map(|field| {
                related
                    .get(field)
                    .map(|value| (field.to_owned(), value.clone()))
            })
            .collect()
    }
}

/// Run one listing request against `collection`.
///
/// Reserved keys (`select`, `sort`, `page`, `limit`) steer the read; every
/// other key filters it. The total before paging decides which neighbouring
/// pages are advertised. Filtering or sorting on one of the resource's hidden
/// fields is rejected.
pub async fn advanced_results<R: Resource>(
    params: &[(String, String)],
    collection: &Collection<R>,
    populate: Option<&Populate>,
    default_limit: u32,
) -> Result<QueryResultEnvelope, Error> {
    let query = ListQuery::from_params(params, default_limit)?;
    query.reject_hidden(R::HIDDEN_FIELDS)?;
    let total = collection.count(&query.filter).await?;
    let find = FindQuery {
        filter: query.filter,
        sort: query.sort,
        skip: query.page.offset(),
        limit: Some(u64::from(query.page.limit())),
    };

    let mut documents: Vec<Document> = collection
        .find(&find)
        .await?
        .into_iter()
        .map(strip_hidden::<R>)
        .map(|document| match &query.projection {
            Some(projection) => projection.apply(&document),
            None => document,
        })
        .collect();

    if let Some(populate) = populate {
        let selected = query
            .projection
            .as_ref()
            .is_none_or(|projection| projection.keeps(populate.field));
        if selected {
            populate.apply(collection.store(), &mut documents).await?;
        }
    }

    Ok(QueryResultEnvelope {
        success: true,
        count: documents.len(),
        pagination: Pagination::for_total(query.page, total),
        data: documents.into_iter().map(Value::Object).collect(),
    })
}
