//! Match and application retrieval
//!
//! Paginated reads over the document store, the lifecycle-transition sweep,
//! and the two discrete writes (apply, decide) that feed the dual status
//! representations.

pub mod matches;
pub mod session;

pub use matches::{ApplicationDecision, MatchRepository};
pub use session::SessionContext;
