//! Filter criteria and the pure in-memory conjunction

use crate::types::{FeeTier, Gender, Match, MatchType, SkillLevel};
use crate::utils::same_calendar_day;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Optional predicates conjoined over a fetched page
///
/// Every member is optional; an empty skill-level set means no skill
/// constraint. The always-applied calendar-day predicate lives with the
/// engine's selected date, not here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub match_type: Option<MatchType>,
    pub gender: Option<Gender>,
    pub fee: Option<FeeTier>,
    pub skill_levels: HashSet<SkillLevel>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_match_type(mut self, match_type: MatchType) -> Self {
        self.match_type = Some(match_type);
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn with_fee(mut self, fee: FeeTier) -> Self {
        self.fee = Some(fee);
        self
    }

    pub fn with_skill_levels(mut self, levels: impl IntoIterator<Item = SkillLevel>) -> Self {
        self.skill_levels = levels.into_iter().collect();
        self
    }

    /// True when no optional predicate is set
    pub fn is_empty(&self) -> bool {
        self.match_type.is_none()
            && self.gender.is_none()
            && self.fee.is_none()
            && self.skill_levels.is_empty()
    }

    /// Conjunction of all set predicates (date handled by the caller)
    pub fn matches(&self, m: &Match) -> bool {
        if let Some(match_type) = self.match_type {
            if m.match_type != match_type {
                return false;
            }
        }
        if let Some(gender) = self.gender {
            if m.gender != gender {
                return false;
            }
        }
        if let Some(fee) = self.fee {
            if FeeTier::of_price(m.price) != fee {
                return false;
            }
        }
        if !self.skill_levels.is_empty() && !self.skill_levels.contains(&m.skill_level) {
            return false;
        }
        true
    }
}

/// Filter a fetched page: the calendar-day predicate always applies, the
/// criteria conjunction narrows further. Order-preserving; never re-sorts.
pub fn apply_criteria(
    matches: &[Match],
    criteria: &FilterCriteria,
    selected_date: NaiveDate,
) -> Vec<Match> {
    matches
        .iter()
        .filter(|m| same_calendar_day(m.scheduled_start, selected_date) && criteria.matches(m))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MatchStatus;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn make_match(
        id: &str,
        match_type: MatchType,
        skill: SkillLevel,
        gender: Gender,
        price: u32,
        day_offset: i64,
    ) -> Match {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap()
            + chrono::Duration::days(day_offset);
        Match {
            id: id.to_string(),
            organizer_id: "org".to_string(),
            match_type,
            skill_level: skill,
            gender,
            price,
            scheduled_start: start,
            duration_minutes: 60,
            capacity: 10,
            status: MatchStatus::Recruiting,
            participants: HashMap::new(),
            created_at: start,
            updated_at: None,
        }
    }

    #[test]
    fn test_empty_criteria_still_applies_date() {
        let matches = vec![
            make_match("today", MatchType::Soccer, SkillLevel::Beginner, Gender::Mixed, 0, 0),
            make_match("tomorrow", MatchType::Soccer, SkillLevel::Beginner, Gender::Mixed, 0, 1),
        ];

        let result = apply_criteria(&matches, &FilterCriteria::new(), day());
        let ids: Vec<_> = result.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["today"]);
    }

    #[test]
    fn test_conjunction_selects_exact_subset_in_order() {
        // Ten matches on the selected day, three satisfying the conjunction.
        let mut matches = vec![
            make_match("s1", MatchType::Soccer, SkillLevel::Beginner, Gender::Mixed, 0, 0),
            make_match("x1", MatchType::Tennis, SkillLevel::Beginner, Gender::Mixed, 0, 0),
            make_match("s2", MatchType::Soccer, SkillLevel::Beginner, Gender::Male, 100, 0),
            make_match("x2", MatchType::Soccer, SkillLevel::Advanced, Gender::Mixed, 0, 0),
            make_match("x3", MatchType::Futsal, SkillLevel::Beginner, Gender::Female, 0, 0),
            make_match("s3", MatchType::Soccer, SkillLevel::Beginner, Gender::Female, 0, 0),
            make_match("x4", MatchType::Basketball, SkillLevel::Intermediate, Gender::Mixed, 0, 0),
            make_match("x5", MatchType::Soccer, SkillLevel::Intermediate, Gender::Mixed, 0, 0),
            make_match("x6", MatchType::Badminton, SkillLevel::Beginner, Gender::Mixed, 500, 0),
            make_match("x7", MatchType::Tennis, SkillLevel::Advanced, Gender::Male, 0, 0),
        ];
        matches.rotate_left(3); // arbitrary fetched order, must be preserved

        let criteria =
            FilterCriteria::new()
                .with_match_type(MatchType::Soccer)
                .with_skill_levels([SkillLevel::Beginner]);
        let result = apply_criteria(&matches, &criteria, day());

        let ids: Vec<_> = result.iter().map(|m| m.id.as_str()).collect();
        let expected: Vec<_> = matches
            .iter()
            .filter(|m| m.id.starts_with('s'))
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(ids, expected);
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_fee_tier_predicate() {
        let matches = vec![
            make_match("free", MatchType::Soccer, SkillLevel::Beginner, Gender::Mixed, 0, 0),
            make_match("paid", MatchType::Soccer, SkillLevel::Beginner, Gender::Mixed, 3000, 0),
        ];

        let free = apply_criteria(&matches, &FilterCriteria::new().with_fee(FeeTier::Free), day());
        assert_eq!(free.len(), 1);
        assert_eq!(free[0].id, "free");

        let paid = apply_criteria(&matches, &FilterCriteria::new().with_fee(FeeTier::Paid), day());
        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0].id, "paid");
    }

    #[test]
    fn test_empty_skill_set_means_unconstrained() {
        let matches = vec![make_match(
            "m1",
            MatchType::Soccer,
            SkillLevel::Advanced,
            Gender::Mixed,
            0,
            0,
        )];
        let criteria = FilterCriteria::new().with_skill_levels([]);
        assert!(criteria.is_empty());
        assert_eq!(apply_criteria(&matches, &criteria, day()).len(), 1);
    }

    fn arbitrary_matches() -> impl Strategy<Value = Vec<Match>> {
        proptest::collection::vec(
            (0usize..5, 0usize..3, 0usize..3, 0u32..2, 0i64..3),
            0..40,
        )
        .prop_map(|rows| {
            let types = [
                MatchType::Soccer,
                MatchType::Futsal,
                MatchType::Basketball,
                MatchType::Badminton,
                MatchType::Tennis,
            ];
            let skills = [
                SkillLevel::Beginner,
                SkillLevel::Intermediate,
                SkillLevel::Advanced,
            ];
            let genders = [Gender::Male, Gender::Female, Gender::Mixed];
            rows.into_iter()
                .enumerate()
                .map(|(i, (t, s, g, price, offset))| {
                    make_match(
                        &format!("m{i}"),
                        types[t],
                        skills[s],
                        genders[g],
                        price * 1000,
                        offset,
                    )
                })
                .collect()
        })
    }

    proptest! {
        /// Adding a predicate to a fixed base set can only shrink or preserve
        /// the result, never grow it.
        #[test]
        fn prop_adding_predicate_never_grows_result(matches in arbitrary_matches()) {
            let base = FilterCriteria::new().with_gender(Gender::Mixed);
            let narrowed = base.clone().with_match_type(MatchType::Soccer);
            let narrower = narrowed
                .clone()
                .with_skill_levels([SkillLevel::Beginner, SkillLevel::Intermediate]);

            let a = apply_criteria(&matches, &base, day());
            let b = apply_criteria(&matches, &narrowed, day());
            let c = apply_criteria(&matches, &narrower, day());

            prop_assert!(b.len() <= a.len());
            prop_assert!(c.len() <= b.len());

            let a_ids: std::collections::HashSet<_> = a.iter().map(|m| m.id.clone()).collect();
            prop_assert!(b.iter().all(|m| a_ids.contains(&m.id)));
        }
    }
}
