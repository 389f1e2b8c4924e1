//! Tests for error construction and envelope redaction.

use super::*;
use crate::domain::TraceId;
use rstest::{fixture, rstest};

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn base_error() -> Error {
    Error::invalid_request("bad")
}

#[rstest]
fn invalid_request_constructor_sets_code(base_error: Error) {
    assert_eq!(base_error.code(), ErrorCode::InvalidRequest);
    assert_eq!(base_error.message(), "bad");
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert_eq!(result, Err(ErrorValidationError::EmptyMessage));
}

#[rstest]
fn new_replaces_blank_messages() {
    let error = Error::new(ErrorCode::NotFound, "");
    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), "Server Error");
}

#[rstest]
fn try_with_trace_id_rejects_empty_values(base_error: Error) {
    let result = base_error.try_with_trace_id("   ");
    assert_eq!(result, Err(ErrorValidationError::EmptyTraceId));
}

#[rstest]
fn trace_id_is_none_out_of_scope() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope() {
    let trace_id: TraceId = TRACE_ID.parse().expect("valid UUID");
    let error = TraceId::scope(trace_id, async { Error::not_found("missing") }).await;
    assert_eq!(error.trace_id(), Some(TRACE_ID));
}

#[rstest]
#[case(ErrorCode::Upstream)]
#[case(ErrorCode::InternalError)]
fn envelope_redacts_server_side_messages(#[case] code: ErrorCode) {
    let envelope = ErrorEnvelope::from_error(&Error::new(code, "connection refused on 10.0.0.3"));
    assert!(!envelope.success);
    assert_eq!(envelope.error, "Server Error");
}

#[rstest]
#[case(ErrorCode::InvalidRequest)]
#[case(ErrorCode::Duplicate)]
#[case(ErrorCode::Unauthorized)]
#[case(ErrorCode::Forbidden)]
#[case(ErrorCode::NotFound)]
fn envelope_keeps_client_side_messages(#[case] code: ErrorCode) {
    let envelope = ErrorEnvelope::from_error(&Error::new(code, "specific"));
    assert_eq!(envelope.error, "specific");
}

#[rstest]
fn envelope_serialises_without_data() {
    let json = serde_json::to_value(ErrorEnvelope::from_error(&Error::not_found("gone")))
        .expect("envelope serialises");
    assert_eq!(json, serde_json::json!({ "success": false, "error": "gone" }));
}
