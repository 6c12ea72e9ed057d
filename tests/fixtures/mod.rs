//! Test fixtures and seeding helpers for integration testing

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use matchday::config::{PaginationSettings, RatingSettings};
use matchday::repository::{MatchRepository, SessionContext};
use matchday::store::{Document, InMemoryDocumentStore};
use matchday::types::{
    Application, ApplicationStatus, Gender, Match, MatchStatus, MatchType, SkillLevel,
    APPLICATIONS_COLLECTION, MATCHES_COLLECTION,
};
use matchday::RatingAggregator;
use std::collections::HashMap;
use std::sync::Arc;

/// A complete system wired over one in-memory store
pub struct TestSystem {
    pub store: Arc<InMemoryDocumentStore>,
    pub session: Arc<SessionContext>,
    pub repository: MatchRepository,
    pub aggregator: RatingAggregator,
}

pub fn create_test_system() -> TestSystem {
    let store = Arc::new(InMemoryDocumentStore::new());
    let session = Arc::new(SessionContext::new());
    let repository = MatchRepository::new(
        store.clone(),
        session.clone(),
        PaginationSettings::default(),
    );
    let aggregator = RatingAggregator::new(store.clone(), RatingSettings::default());
    TestSystem {
        store,
        session,
        repository,
        aggregator,
    }
}

/// The calendar day all fixture matches are scheduled on
pub fn fixture_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

/// A fixed instant on the fixture day, for deterministic ordering
pub fn fixture_instant(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap()
}

/// Build a match starting at the given offset from now
pub fn match_starting_in(id: &str, organizer: &str, offset_minutes: i64) -> Match {
    let start = Utc::now() + Duration::minutes(offset_minutes);
    Match {
        id: id.to_string(),
        organizer_id: organizer.to_string(),
        match_type: MatchType::Soccer,
        skill_level: SkillLevel::Intermediate,
        gender: Gender::Mixed,
        price: 0,
        scheduled_start: start,
        duration_minutes: 60,
        capacity: 10,
        status: MatchStatus::Recruiting,
        participants: HashMap::new(),
        created_at: start,
        updated_at: None,
    }
}

pub fn seed_match(store: &InMemoryDocumentStore, m: &Match) {
    let doc = Document::from_serializable(m.id.clone(), m).expect("serializable match");
    store.seed(MATCHES_COLLECTION, doc).expect("seed match");
}

#[allow(dead_code)]
pub fn seed_application(store: &InMemoryDocumentStore, a: &Application) {
    let doc = Document::from_serializable(a.id.clone(), a).expect("serializable application");
    store
        .seed(APPLICATIONS_COLLECTION, doc)
        .expect("seed application");
}

#[allow(dead_code)]
pub fn pending_application(id: &str, match_id: &str, applicant: &str) -> Application {
    Application {
        id: id.to_string(),
        match_id: match_id.to_string(),
        applicant_id: applicant.to_string(),
        status: ApplicationStatus::Pending,
        rejection_reason: None,
        applied_at: Utc::now(),
        processed_at: None,
    }
}
