//! Matchday - match lifecycle and application consistency layer
//!
//! This crate provides the core consistency machinery of a sports-match
//! recruitment client: keyset-paginated match retrieval with an automatic
//! recruiting-to-finished lifecycle sweep, reconciliation of the dual-written
//! application status, client-side compound filtering over a single-predicate
//! store, and atomic per-user rating aggregation.

pub mod config;
pub mod error;
pub mod filter;
pub mod rating;
pub mod repository;
pub mod status;
pub mod store;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{MatchdayError, Result};
pub use types::*;

// Re-export key components
pub use filter::{FilterCriteria, FilterEngine};
pub use rating::RatingAggregator;
pub use repository::{ApplicationDecision, MatchRepository, SessionContext};
pub use status::{ParticipationStatus, ResolvedStatus, StatusResolver};
pub use store::{DocumentStore, InMemoryDocumentStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
