//! Success envelopes shared by every endpoint.
//!
//! Successful responses always carry `success: true` and a `data` field;
//! failures go through [`crate::inbound::http::error`] instead.

use serde::Serialize;
use utoipa::ToSchema;

/// `{ success: true, data }`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DataEnvelope<T> {
    /// Always `true`.
    pub success: bool,
    /// Payload.
    pub data: T,
}

impl<T> DataEnvelope<T> {
    /// Wrap `data`.
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Serialises as `{}`.
#[derive(Debug, Clone, Copy, Default, Serialize, ToSchema)]
pub struct EmptyData {}

impl DataEnvelope<EmptyData> {
    /// `{ success: true, data: {} }`, used by deletes and logout.
    pub fn empty() -> Self {
        Self::new(EmptyData {})
    }
}

/// `{ success: true, count, data }` for unpaginated collections.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CountedEnvelope<T> {
    /// Always `true`.
    pub success: bool,
    /// Number of records in `data`.
    pub count: usize,
    /// Records.
    pub data: Vec<T>,
}

impl<T> CountedEnvelope<T> {
    /// Wrap `data`, counting it.
    pub fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}
