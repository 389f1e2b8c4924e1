//! Maps pool and Diesel failures onto document store errors.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::DocumentStoreError;

use super::pool::PoolError;

/// Pool failures mean the database is unreachable.
pub(crate) fn map_pool_error(error: PoolError) -> DocumentStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            DocumentStoreError::connection(message)
        }
    }
}

/// Unique index names follow `documents_<collection>_<field>_key`.
fn unique_field(collection: &str, constraint: Option<&str>) -> String {
    let prefix = format!("documents_{collection}_");
    constraint
        .and_then(|name| name.strip_prefix(prefix.as_str()))
        .and_then(|rest| rest.strip_suffix("_key"))
        .map_or_else(|| "id".to_owned(), str::to_owned)
}

/// Translate a Diesel error raised while touching `collection`.
pub(crate) fn map_diesel_error(collection: &str, error: DieselError) -> DocumentStoreError {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            debug!(constraint = ?info.constraint_name(), "unique violation");
            DocumentStoreError::duplicate(unique_field(collection, info.constraint_name()))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            DocumentStoreError::connection(info.message())
        }
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
            DocumentStoreError::query(info.message())
        }
        other => {
            debug!(error = %other, "diesel operation failed");
            DocumentStoreError::query(other.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("documents_bootcamps_name_key"), "name")]
    #[case(Some("documents_pkey"), "id")]
    #[case(Some("documents_users_email_key"), "id")]
    #[case(None, "id")]
    fn unique_field_comes_from_index_name(
        #[case] constraint: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(unique_field("bootcamps", constraint), expected);
    }

    #[rstest]
    fn pool_failures_are_connection_errors() {
        let err = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(err, DocumentStoreError::connection("timed out"));
    }

    #[rstest]
    fn other_diesel_errors_are_query_errors() {
        let err = map_diesel_error("bootcamps", DieselError::NotFound);
        assert!(matches!(err, DocumentStoreError::Query { .. }));
    }
}
