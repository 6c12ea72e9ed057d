//! Common types used throughout the match lifecycle layer

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::store::PageCursor;

/// Unique identifier for users (organizers and applicants)
pub type UserId = String;

/// Unique identifier for matches
pub type MatchId = String;

/// Unique identifier for applications
pub type ApplicationId = String;

/// Collection holding match documents
pub const MATCHES_COLLECTION: &str = "matches";

/// Collection holding application documents
pub const APPLICATIONS_COLLECTION: &str = "applications";

/// Collection holding per-user rating accumulators
pub const RATINGS_COLLECTION: &str = "userRatings";

/// Lifecycle status of a match
///
/// `Recruiting -> Finished` is the only automatic transition; cancellation is
/// written by an external surface and only read here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Recruiting,
    Finished,
    Cancelled,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Recruiting => "recruiting",
            MatchStatus::Finished => "finished",
            MatchStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of an application as written by organizer decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Cancelled => "cancelled",
        }
    }

    /// Parse a raw participants-map value. Returns `None` for unrecognized strings.
    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(ApplicationStatus::Pending),
            "accepted" => Some(ApplicationStatus::Accepted),
            "rejected" => Some(ApplicationStatus::Rejected),
            "cancelled" => Some(ApplicationStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sport discipline of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Soccer,
    Futsal,
    Basketball,
    Badminton,
    Tennis,
}

/// Self-reported skill level a match recruits for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

/// Gender constraint on a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Mixed,
}

/// Fee tier derived from the match price: free means price == 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeTier {
    Free,
    Paid,
}

impl FeeTier {
    pub fn of_price(price: u32) -> Self {
        if price == 0 {
            FeeTier::Free
        } else {
            FeeTier::Paid
        }
    }
}

/// A recruitment match document
///
/// `participants` is the denormalized "quick" status map: userId -> raw status
/// string. Its keys are a subset of the organizer plus every applicant; values
/// are written separately from the Application documents and may lag them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    pub organizer_id: UserId,
    pub match_type: MatchType,
    pub skill_level: SkillLevel,
    pub gender: Gender,
    pub price: u32,
    pub scheduled_start: DateTime<Utc>,
    pub duration_minutes: i64,
    pub capacity: u32,
    pub status: MatchStatus,
    #[serde(default)]
    pub participants: HashMap<UserId, String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Match {
    /// Scheduled end derived from start plus duration
    pub fn scheduled_end(&self) -> DateTime<Utc> {
        self.scheduled_start + Duration::minutes(self.duration_minutes)
    }

    /// Whether this match should have been transitioned to finished by `now`
    pub fn is_due_for_transition(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_end() < now && self.status != MatchStatus::Finished
    }

    /// Whether the user organizes this match or appears in the participants map
    pub fn involves(&self, user_id: &str) -> bool {
        self.organizer_id == user_id || self.participants.contains_key(user_id)
    }
}

/// An application from a user to join a match
///
/// Created once per apply action and mutated exactly once by the organizer
/// decision; never deleted. On re-application the latest `applied_at` wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub match_id: MatchId,
    pub applicant_id: UserId,
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub applied_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
}

/// A rating dimension tracked per user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingDimension {
    Appointment,
    Manner,
    Teamwork,
}

impl RatingDimension {
    /// Document field holding the running sum for this dimension
    pub fn sum_field(&self) -> &'static str {
        match self {
            RatingDimension::Appointment => "appointmentSum",
            RatingDimension::Manner => "mannerSum",
            RatingDimension::Teamwork => "teamworkSum",
        }
    }
}

/// Per-user rating accumulator: running sums and a shared count
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingAccumulator {
    /// Missing on lazily-created documents; recovered from the document id
    #[serde(default)]
    pub user_id: UserId,
    #[serde(default)]
    pub total_rating_count: i64,
    #[serde(default)]
    pub appointment_sum: i64,
    #[serde(default)]
    pub manner_sum: i64,
    #[serde(default)]
    pub teamwork_sum: i64,
}

impl RatingAccumulator {
    /// Average for a dimension; `None` while no ratings exist (undefined, not zero)
    pub fn average(&self, dimension: RatingDimension) -> Option<f64> {
        if self.total_rating_count == 0 {
            return None;
        }
        let sum = match dimension {
            RatingDimension::Appointment => self.appointment_sum,
            RatingDimension::Manner => self.manner_sum,
            RatingDimension::Teamwork => self.teamwork_sum,
        };
        Some(sum as f64 / self.total_rating_count as f64)
    }
}

/// Scores submitted by one rater; omitted dimensions fall back to the
/// configured default score at submission time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatingScores {
    pub appointment: Option<u8>,
    pub manner: Option<u8>,
    pub teamwork: Option<u8>,
}

impl RatingScores {
    pub fn new(appointment: Option<u8>, manner: Option<u8>, teamwork: Option<u8>) -> Self {
        Self {
            appointment,
            manner,
            teamwork,
        }
    }
}

/// One page of matches as returned by the repository
///
/// `fetched_count` counts raw store hits; the page itself may be shorter after
/// lifecycle cleanup and decode skips. That gap is documented behavior.
#[derive(Debug, Clone)]
pub struct MatchPage {
    pub matches: Vec<Match>,
    pub next_cursor: Option<PageCursor>,
    pub fetched_count: usize,
}
