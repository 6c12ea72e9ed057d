//! Atomic rating aggregation
//!
//! All writes go through the store's atomic-increment primitive, never a
//! read-then-write, so N concurrent raters for the same user converge to the
//! correct totals regardless of interleaving. The accumulator document is
//! created lazily by the first increment and only ever grows; no retraction
//! path exists.

use crate::config::RatingSettings;
use crate::error::{MatchdayError, Result};
use crate::store::DocumentStore;
use crate::types::{RatingAccumulator, RatingDimension, RatingScores, RATINGS_COLLECTION};
use std::sync::Arc;
use tracing::{debug, info};

const FIELD_TOTAL_COUNT: &str = "totalRatingCount";

/// Maintains per-user rating sums and counts through atomic increments
pub struct RatingAggregator {
    store: Arc<dyn DocumentStore>,
    settings: RatingSettings,
}

impl RatingAggregator {
    pub fn new(store: Arc<dyn DocumentStore>, settings: RatingSettings) -> Self {
        Self { store, settings }
    }

    /// Validate provided scores and fill omitted dimensions with the default
    ///
    /// Rejects before any store write so a bad submission never leaves a
    /// partial increment behind.
    fn effective_scores(&self, scores: &RatingScores) -> Result<[(RatingDimension, u8); 3]> {
        let dims = [
            (RatingDimension::Appointment, scores.appointment),
            (RatingDimension::Manner, scores.manner),
            (RatingDimension::Teamwork, scores.teamwork),
        ];
        for (dimension, score) in &dims {
            if let Some(score) = score {
                if *score < self.settings.min_score || *score > self.settings.max_score {
                    return Err(MatchdayError::Validation {
                        reason: format!(
                            "{:?} score {} is outside {}..={}",
                            dimension, score, self.settings.min_score, self.settings.max_score
                        ),
                    }
                    .into());
                }
            }
        }
        Ok(dims.map(|(dimension, score)| {
            (dimension, score.unwrap_or(self.settings.default_score))
        }))
    }

    /// Record one rating: one `+1` on the count, one `+score` per dimension
    pub async fn submit_rating(&self, user_id: &str, scores: RatingScores) -> Result<()> {
        let effective = self.effective_scores(&scores)?;

        self.store
            .atomic_increment(RATINGS_COLLECTION, user_id, FIELD_TOTAL_COUNT, 1)
            .await?;
        for (dimension, score) in effective {
            self.store
                .atomic_increment(
                    RATINGS_COLLECTION,
                    user_id,
                    dimension.sum_field(),
                    i64::from(score),
                )
                .await?;
        }

        info!("Recorded rating for user {}", user_id);
        Ok(())
    }

    /// Current accumulator for a user, `None` when never rated
    pub async fn get_accumulator(&self, user_id: &str) -> Result<Option<RatingAccumulator>> {
        let docs = self
            .store
            .get_by_ids(RATINGS_COLLECTION, &[user_id.to_string()])
            .await?;
        let doc = match docs.into_iter().next() {
            Some(doc) => doc,
            None => return Ok(None),
        };

        let mut accumulator: RatingAccumulator = doc.decode(RATINGS_COLLECTION)?;
        // Lazily-created documents carry only counters; recover the identity
        // from the document id.
        if accumulator.user_id.is_empty() {
            accumulator.user_id = doc.id;
        }
        Ok(Some(accumulator))
    }

    /// Average for one dimension; `None` while the count is zero (undefined,
    /// not zero)
    pub async fn average(&self, user_id: &str, dimension: RatingDimension) -> Result<Option<f64>> {
        let average = self
            .get_accumulator(user_id)
            .await?
            .and_then(|accumulator| accumulator.average(dimension));
        debug!("Average {:?} for user {}: {:?}", dimension, user_id, average);
        Ok(average)
    }
}
