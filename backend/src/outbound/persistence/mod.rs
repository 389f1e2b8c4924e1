//! Document store adapters.
//!
//! Two implementations of [`crate::domain::ports::DocumentStore`]:
//!
//! - [`MemoryDocumentStore`] keeps everything in process for tests and local
//!   runs without a database.
//! - [`DieselDocumentStore`] stores each document as JSONB in PostgreSQL via
//!   `diesel-async` and a `bb8` pool. Listing filters compile to
//!   parameterised SQL in `document_sql`.
//!
//! Both honour the same query semantics so the HTTP layer cannot tell them
//! apart.

mod diesel_document_store;
mod diesel_error_mapping;
mod document_sql;
mod memory_document_store;
mod migrations;
mod pool;
mod schema;

pub use diesel_document_store::DieselDocumentStore;
pub use memory_document_store::MemoryDocumentStore;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
