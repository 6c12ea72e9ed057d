//! Client-side compound filtering
//!
//! The store efficiently supports a single sort key plus at most one equality
//! predicate, so compound conjunctions are applied in memory over one fetched
//! ordered page. A deliberate trade-off with a known scalability ceiling: the
//! scan is bounded by the fetch limit, not by an index.

pub mod criteria;
pub mod engine;

pub use criteria::{apply_criteria, FilterCriteria};
pub use engine::FilterEngine;
