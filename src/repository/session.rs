//! Per-session just-finished match tracking
//!
//! Index updates on the backing store can lag the transition writes this
//! process has just issued. The session context remembers those matches so a
//! finished-matches fetch that races the index still sees them. It is advisory
//! only: the store remains the source of truth, and the set is scoped to the
//! context object rather than hidden in global state so tests and multi-tenant
//! callers stay isolated.

use crate::types::{Match, MatchId, MatchStatus};
use crate::utils::current_timestamp;
use std::collections::HashMap;
use std::sync::RwLock;

/// Session-scoped record of matches this process has transitioned to finished
#[derive(Debug, Default)]
pub struct SessionContext {
    just_finished: RwLock<HashMap<MatchId, Match>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a match this session has just transitioned
    ///
    /// The stored copy is forced to finished regardless of the status the
    /// caller read before the write.
    pub fn record_finished(&self, mut match_doc: Match) {
        match_doc.status = MatchStatus::Finished;
        if match_doc.updated_at.is_none() {
            match_doc.updated_at = Some(current_timestamp());
        }
        if let Ok(mut set) = self.just_finished.write() {
            set.insert(match_doc.id.clone(), match_doc);
        }
    }

    /// Snapshot of the just-finished matches
    pub fn finished_snapshot(&self) -> Vec<Match> {
        self.just_finished
            .read()
            .map(|set| set.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of tracked matches
    pub fn len(&self) -> usize {
        self.just_finished.read().map(|set| set.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget everything (e.g. on sign-out)
    pub fn clear(&self) {
        if let Ok(mut set) = self.just_finished.write() {
            set.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Gender, MatchType, SkillLevel};
    use std::collections::HashMap as StdHashMap;

    fn recruiting_match(id: &str) -> Match {
        let now = current_timestamp();
        Match {
            id: id.to_string(),
            organizer_id: "org".to_string(),
            match_type: MatchType::Futsal,
            skill_level: SkillLevel::Beginner,
            gender: Gender::Mixed,
            price: 0,
            scheduled_start: now,
            duration_minutes: 60,
            capacity: 10,
            status: MatchStatus::Recruiting,
            participants: StdHashMap::new(),
            created_at: now,
            updated_at: None,
        }
    }

    #[test]
    fn test_recorded_match_is_forced_finished() {
        let session = SessionContext::new();
        session.record_finished(recruiting_match("m1"));

        let snapshot = session.finished_snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].status, MatchStatus::Finished);
        assert!(snapshot[0].updated_at.is_some());
    }

    #[test]
    fn test_recording_same_match_twice_deduplicates() {
        let session = SessionContext::new();
        session.record_finished(recruiting_match("m1"));
        session.record_finished(recruiting_match("m1"));
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn test_clear() {
        let session = SessionContext::new();
        session.record_finished(recruiting_match("m1"));
        session.clear();
        assert!(session.is_empty());
    }
}
