//! Status resolver for the dual-written application status
//!
//! The participants map on the match ("quick" status) and the application
//! document ("detailed" status) are written by two discrete operations with no
//! shared transaction, so they can disagree at read time. Resolution never
//! blocks waiting for convergence; it returns the best available snapshot with
//! a fixed precedence: quick wins because it is co-located with the match and
//! costs no extra round trip. Only the detailed status carries a rejection
//! reason, so callers that see `Rejected` and need the reason must fetch the
//! application explicitly.

use crate::types::{Application, ApplicationStatus, Match, UserId};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A user's participation status for one match, as seen by presentation code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipationStatus {
    /// The user never applied (or nothing is readable yet)
    None,
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl From<ApplicationStatus> for ParticipationStatus {
    fn from(status: ApplicationStatus) -> Self {
        match status {
            ApplicationStatus::Pending => ParticipationStatus::Pending,
            ApplicationStatus::Accepted => ParticipationStatus::Accepted,
            ApplicationStatus::Rejected => ParticipationStatus::Rejected,
            ApplicationStatus::Cancelled => ParticipationStatus::Cancelled,
        }
    }
}

/// Resolved status plus the rejection reason when one is readable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedStatus {
    pub status: ParticipationStatus,
    pub rejection_reason: Option<String>,
}

impl ResolvedStatus {
    pub fn none() -> Self {
        Self {
            status: ParticipationStatus::None,
            rejection_reason: None,
        }
    }
}

/// Reconciles quick and detailed status representations
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusResolver;

impl StatusResolver {
    /// Direct lookup in the match's participants map
    ///
    /// Unrecognized raw strings are treated as absent so corrupt denormalized
    /// data cannot mask a readable application.
    pub fn quick_status(match_doc: &Match, user_id: &UserId) -> Option<ParticipationStatus> {
        let raw = match_doc.participants.get(user_id)?;
        match ApplicationStatus::from_raw(raw) {
            Some(status) => Some(status.into()),
            None => {
                warn!(
                    "Unrecognized participants entry '{}' for user {} on match {}",
                    raw, user_id, match_doc.id
                );
                None
            }
        }
    }

    /// Status from the application document, including the rejection reason
    pub fn detailed_status(application: &Application) -> ResolvedStatus {
        ResolvedStatus {
            status: application.status.into(),
            rejection_reason: application.rejection_reason.clone(),
        }
    }

    /// Resolve the user's status for a match
    ///
    /// Precedence: quick status wins whenever present, even when a cached
    /// detailed status disagrees; quick never carries a reason. With no quick
    /// status the cached application decides; with neither, `None`.
    pub fn resolve(
        match_doc: &Match,
        user_id: &UserId,
        cached_application: Option<&Application>,
    ) -> ResolvedStatus {
        if let Some(status) = Self::quick_status(match_doc, user_id) {
            return ResolvedStatus {
                status,
                rejection_reason: None,
            };
        }

        match cached_application {
            Some(application) => Self::detailed_status(application),
            None => ResolvedStatus::none(),
        }
    }
}
