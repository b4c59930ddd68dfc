//! Core domain for the Legacore business administration platform.
//!
//! Holds the entity models, the error taxonomy, the repository traits the
//! persistence layer implements, and the pure query/aggregation logic that
//! turns request parameters into tenant-scoped filters and list envelopes.

pub mod aggregate;
pub mod ai;
pub mod error;
pub mod models;
pub mod query;
pub mod repository;
pub mod tenant;

pub use error::{LegacoreError, LegacoreResult};
