//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: document stores (in-memory and PostgreSQL JSONB via
//!   Diesel)
//! - **geocoding**: MapQuest-compatible HTTP geocoder
//! - **storage**: capability-scoped filesystem photo storage
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod geocoding;
pub mod persistence;
pub mod storage;
