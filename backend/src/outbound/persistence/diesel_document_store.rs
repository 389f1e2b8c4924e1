//! PostgreSQL-backed [`DocumentStore`] storing each record as JSONB.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::sql_query;
use diesel::sql_types::{Array, BigInt, Double, Jsonb, Nullable, Text};
use diesel_async::RunQueryDsl;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::geo::GeoCap;
use crate::domain::ports::{DocumentStore, DocumentStoreError, FindQuery};
use crate::domain::query::{FieldPath, Filter};
use crate::domain::resource::Document;

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::document_sql::{self, SqlBind, SqlStatement};
use super::pool::DbPool;
use super::schema::documents;

#[derive(Insertable)]
#[diesel(table_name = documents)]
struct NewDocumentRow<'a> {
    collection: &'a str,
    id: Uuid,
    body: Value,
}

#[derive(QueryableByName)]
struct BodyRow {
    #[diesel(sql_type = Jsonb)]
    body: Value,
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    total: i64,
}

/// Diesel-backed document store.
#[derive(Clone)]
pub struct DieselDocumentStore {
    pool: DbPool,
}

impl DieselDocumentStore {
    /// Create a store over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn into_document(value: Value) -> Result<Document, DocumentStoreError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(DocumentStoreError::query("stored document is not a JSON object")),
    }
}

fn prepare(statement: SqlStatement) -> BoxedSqlQuery<'static, Pg, SqlQuery> {
    statement
        .binds
        .into_iter()
        .fold(sql_query(statement.sql).into_boxed(), |query, bind| match bind {
            SqlBind::Text(value) => query.bind::<Text, _>(value),
            SqlBind::TextArray(value) => query.bind::<Array<Text>, _>(value),
            SqlBind::Double(value) => query.bind::<Nullable<Double>, _>(value),
            SqlBind::BigInt(value) => query.bind::<BigInt, _>(value),
        })
}

#[async_trait]
impl DocumentStore for DieselDocumentStore {
    async fn insert(
        &self,
        collection: &str,
        id: Uuid,
        document: Document,
    ) -> Result<(), DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(documents::table)
            .values(NewDocumentRow {
                collection,
                id,
                body: Value::Object(document),
            })
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(collection, err))?;
        Ok(())
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: Uuid,
    ) -> Result<Option<Document>, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        documents::table
            .filter(documents::collection.eq(collection))
            .filter(documents::id.eq(id))
            .select(documents::body)
            .first::<Value>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(collection, err))?
            .map(into_document)
            .transpose()
    }

    async fn replace(
        &self,
        collection: &str,
        id: Uuid,
        document: Document,
    ) -> Result<bool, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            documents::table
                .filter(documents::collection.eq(collection))
                .filter(documents::id.eq(id)),
        )
        .set((
            documents::body.eq(Value::Object(document)),
            documents::updated_at.eq(diesel::dsl::now),
        ))
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(collection, err))?;
        Ok(updated > 0)
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            documents::table
                .filter(documents::collection.eq(collection))
                .filter(documents::id.eq(id)),
        )
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(collection, err))?;
        Ok(deleted > 0)
    }

    async fn find(
        &self,
        collection: &str,
        query: &FindQuery,
    ) -> Result<Vec<Document>, DocumentStoreError> {
        let statement = document_sql::select_documents(collection, query);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        prepare(statement)
            .load::<BodyRow>(&mut conn)
            .await
            .map_err(|err| map_diesel_error(collection, err))?
            .into_iter()
            .map(|row| into_document(row.body))
            .collect()
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, DocumentStoreError> {
        let statement = document_sql::count_documents(collection, filter);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = prepare(statement)
            .get_result::<CountRow>(&mut conn)
            .await
            .map_err(|err| map_diesel_error(collection, err))?;
        u64::try_from(row.total).map_err(|err| DocumentStoreError::query(err.to_string()))
    }

    async fn find_within(
        &self,
        collection: &str,
        field: &FieldPath,
        cap: GeoCap,
    ) -> Result<Vec<Document>, DocumentStoreError> {
        let statement = document_sql::select_within(collection, field, cap);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        prepare(statement)
            .load::<BodyRow>(&mut conn)
            .await
            .map_err(|err| map_diesel_error(collection, err))?
            .into_iter()
            .map(|row| into_document(row.body))
            .collect()
    }

    async fn ping(&self) -> Result<(), DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error("documents", err))?;
        Ok(())
    }
}
