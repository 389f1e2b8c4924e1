//! Request middleware.
//!
//! Purpose: request lifecycle concerns such as trace correlation and
//! last-resort failure capture.

pub mod catch_failure;
pub mod trace;

pub use catch_failure::CatchFailure;
pub use trace::Trace;
