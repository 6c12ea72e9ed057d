//! Filter engine: fetch one ordered page, narrow it in memory
//!
//! Every predicate mutation triggers an eager re-fetch with no debouncing.
//! That is a known inefficiency inherited from the product behavior, not a
//! correctness bug. Cursors are never carried across predicate changes; each
//! mutation restarts from an unpaginated fetch.

use crate::config::PaginationSettings;
use crate::error::Result;
use crate::filter::criteria::{apply_criteria, FilterCriteria};
use crate::store::{decode_lenient, DocumentStore, PageQuery};
use crate::types::{FeeTier, Gender, Match, MatchType, SkillLevel, MATCHES_COLLECTION};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

const FIELD_CREATED_AT: &str = "createdAt";

/// Compound in-memory filtering over one fetched ordered page
pub struct FilterEngine {
    store: Arc<dyn DocumentStore>,
    criteria: FilterCriteria,
    selected_date: NaiveDate,
    fetch_limit: usize,
}

impl FilterEngine {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        selected_date: NaiveDate,
        pagination: &PaginationSettings,
    ) -> Self {
        Self {
            store,
            criteria: FilterCriteria::new(),
            selected_date,
            fetch_limit: pagination.filter_fetch_limit,
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    /// Re-fetch one createdAt-descending page and apply the current
    /// conjunction. The date predicate always applies; the result keeps the
    /// fetched order.
    pub async fn apply_filter(&self) -> Result<Vec<Match>> {
        let query = PageQuery::ordered_by(FIELD_CREATED_AT, true, self.fetch_limit);
        let page = self.store.get_page(MATCHES_COLLECTION, query).await?;
        let matches: Vec<Match> = decode_lenient(&page.documents, MATCHES_COLLECTION);

        let filtered = apply_criteria(&matches, &self.criteria, self.selected_date);
        debug!(
            "Filter pass kept {} of {} fetched matches for {}",
            filtered.len(),
            matches.len(),
            self.selected_date
        );
        Ok(filtered)
    }

    /// Clear all optional predicates, then re-fetch and filter
    pub async fn reset_filter(&mut self) -> Result<Vec<Match>> {
        self.criteria = FilterCriteria::new();
        self.apply_filter().await
    }

    pub async fn set_match_type(&mut self, match_type: Option<MatchType>) -> Result<Vec<Match>> {
        self.criteria.match_type = match_type;
        self.apply_filter().await
    }

    pub async fn set_gender(&mut self, gender: Option<Gender>) -> Result<Vec<Match>> {
        self.criteria.gender = gender;
        self.apply_filter().await
    }

    pub async fn set_fee(&mut self, fee: Option<FeeTier>) -> Result<Vec<Match>> {
        self.criteria.fee = fee;
        self.apply_filter().await
    }

    pub async fn set_skill_levels(&mut self, levels: HashSet<SkillLevel>) -> Result<Vec<Match>> {
        self.criteria.skill_levels = levels;
        self.apply_filter().await
    }

    pub async fn set_selected_date(&mut self, date: NaiveDate) -> Result<Vec<Match>> {
        self.selected_date = date;
        self.apply_filter().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Document, InMemoryDocumentStore};
    use crate::types::MatchStatus;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn seed_match(
        store: &InMemoryDocumentStore,
        id: &str,
        match_type: MatchType,
        skill: SkillLevel,
        minute: u32,
    ) {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 18, minute, 0).unwrap();
        let m = Match {
            id: id.to_string(),
            organizer_id: "org".to_string(),
            match_type,
            skill_level: skill,
            gender: Gender::Mixed,
            price: 0,
            scheduled_start: start,
            duration_minutes: 60,
            capacity: 10,
            status: MatchStatus::Recruiting,
            participants: HashMap::new(),
            created_at: start,
            updated_at: None,
        };
        let doc = Document::from_serializable(m.id.clone(), &m).unwrap();
        store.seed(MATCHES_COLLECTION, doc).unwrap();
    }

    fn test_engine(store: Arc<InMemoryDocumentStore>) -> FilterEngine {
        FilterEngine::new(store, day(), &PaginationSettings::default())
    }

    #[tokio::test]
    async fn test_apply_filter_narrows_and_preserves_order() {
        let store = Arc::new(InMemoryDocumentStore::new());
        seed_match(&store, "m1", MatchType::Soccer, SkillLevel::Beginner, 1);
        seed_match(&store, "m2", MatchType::Tennis, SkillLevel::Beginner, 2);
        seed_match(&store, "m3", MatchType::Soccer, SkillLevel::Advanced, 3);
        seed_match(&store, "m4", MatchType::Soccer, SkillLevel::Beginner, 4);

        let mut engine = test_engine(store);
        engine.criteria.match_type = Some(MatchType::Soccer);
        let result = engine
            .set_skill_levels([SkillLevel::Beginner].into_iter().collect())
            .await
            .unwrap();

        // createdAt descending fetch order, narrowed, never re-sorted.
        let ids: Vec<_> = result.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m4", "m1"]);
    }

    #[tokio::test]
    async fn test_reset_clears_predicates_but_keeps_date() {
        let store = Arc::new(InMemoryDocumentStore::new());
        seed_match(&store, "m1", MatchType::Soccer, SkillLevel::Beginner, 1);
        seed_match(&store, "m2", MatchType::Tennis, SkillLevel::Advanced, 2);

        let mut engine = test_engine(store);
        let narrowed = engine.set_match_type(Some(MatchType::Soccer)).await.unwrap();
        assert_eq!(narrowed.len(), 1);

        let reset = engine.reset_filter().await.unwrap();
        assert!(engine.criteria().is_empty());
        assert_eq!(reset.len(), 2);
        assert_eq!(engine.selected_date(), day());
    }

    #[tokio::test]
    async fn test_date_change_refilters() {
        let store = Arc::new(InMemoryDocumentStore::new());
        seed_match(&store, "m1", MatchType::Soccer, SkillLevel::Beginner, 1);

        let mut engine = test_engine(store);
        let other_day = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let none = engine.set_selected_date(other_day).await.unwrap();
        assert!(none.is_empty());

        let back = engine.set_selected_date(day()).await.unwrap();
        assert_eq!(back.len(), 1);
    }
}
