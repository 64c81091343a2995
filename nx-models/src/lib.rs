//! Entity models for automation server payloads.
//!
//! Serde types for the `entity-type` tagged wire envelopes (documents and
//! document lists) plus date conversion helpers.

pub mod dates;
pub mod document;

pub use document::{Document, Documents};
