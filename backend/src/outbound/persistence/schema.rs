//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `backend/migrations`.
//! Every resource lives in `documents`, partitioned by `collection`; `seq`
//! records insertion order and backs the default creation-order sort.

diesel::table! {
    /// JSONB documents keyed by collection and identifier.
    documents (collection, id) {
        /// Collection name, e.g. `bootcamps`.
        collection -> Text,
        /// Document identifier, mirrored in `body ->> 'id'`.
        id -> Uuid,
        /// Monotonic insertion counter.
        seq -> Int8,
        /// The stored document.
        body -> Jsonb,
        /// Row creation time.
        created_at -> Timestamptz,
        /// Last replacement time.
        updated_at -> Timestamptz,
    }
}
