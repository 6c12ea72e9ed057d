//! Rating aggregation
//!
//! Incremental maintenance of per-user rating sums and counts, safe under
//! concurrent raters.

pub mod aggregator;

pub use aggregator::RatingAggregator;
