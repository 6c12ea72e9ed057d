//! Application-status resolution
//!
//! Reconciles the two independently-written representations of an applicant's
//! status: the denormalized participants map on the match and the full
//! application document.

pub mod resolver;

pub use resolver::{ParticipationStatus, ResolvedStatus, StatusResolver};
