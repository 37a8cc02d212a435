//! Request middleware shared by every route.
//!
//! [`Trace`] scopes a per-request [`crate::domain::TraceId`] so error
//! envelopes and log lines can be correlated.

pub mod trace;

pub use trace::Trace;
