//! Match repository: paginated retrieval and the lifecycle sweep
//!
//! Every page of an organizer's matches doubles as a lifecycle sweep: items
//! whose scheduled end has passed are transitioned to finished before the page
//! is returned, so callers never see stale "recruiting" entries whose time has
//! passed. The transition write is idempotent, and a failed write is only
//! logged: the due condition keeps re-evaluating true, so a later sweep
//! retries it naturally.

use crate::config::PaginationSettings;
use crate::error::{MatchdayError, Result};
use crate::repository::session::SessionContext;
use crate::store::{decode_lenient, Document, DocumentStore, PageCursor, PageQuery};
use crate::types::{
    Application, ApplicationStatus, Match, MatchPage, MatchStatus, APPLICATIONS_COLLECTION,
    MATCHES_COLLECTION,
};
use crate::utils::{current_timestamp, generate_application_id};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

const FIELD_CREATED_AT: &str = "createdAt";
const FIELD_APPLIED_AT: &str = "appliedAt";
const FIELD_ORGANIZER_ID: &str = "organizerId";
const FIELD_APPLICANT_ID: &str = "applicantId";
const FIELD_STATUS: &str = "status";
const FIELD_UPDATED_AT: &str = "updatedAt";
const FIELD_PROCESSED_AT: &str = "processedAt";
const FIELD_REJECTION_REASON: &str = "rejectionReason";
const FIELD_PARTICIPANTS: &str = "participants";
const FIELD_INITIAL_RATING: &str = "initialRating";

/// Organizer's verdict on a pending application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationDecision {
    Accept,
    Reject,
}

impl ApplicationDecision {
    pub fn as_status(&self) -> ApplicationStatus {
        match self {
            ApplicationDecision::Accept => ApplicationStatus::Accepted,
            ApplicationDecision::Reject => ApplicationStatus::Rejected,
        }
    }
}

/// Fields written by the idempotent finished transition
fn finished_fields(now: DateTime<Utc>, with_initial_rating: bool) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert(
        FIELD_STATUS.to_string(),
        json!(MatchStatus::Finished.as_str()),
    );
    fields.insert(FIELD_UPDATED_AT.to_string(), json!(now));
    if with_initial_rating {
        fields.insert(FIELD_INITIAL_RATING.to_string(), Value::Null);
    }
    fields
}

/// Paginated match/application retrieval plus the lifecycle-transition sweep
pub struct MatchRepository {
    store: Arc<dyn DocumentStore>,
    session: Arc<SessionContext>,
    pagination: PaginationSettings,
}

impl MatchRepository {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        session: Arc<SessionContext>,
        pagination: PaginationSettings,
    ) -> Self {
        Self {
            store,
            session,
            pagination,
        }
    }

    fn effective_page_size(&self, requested: usize) -> Result<usize> {
        if requested == 0 {
            return Err(MatchdayError::Validation {
                reason: "page size must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(requested.min(self.pagination.max_page_size))
    }

    /// One keyset page of an organizer's matches, createdAt descending
    ///
    /// Past-due items are transitioned to finished concurrently and awaited
    /// before returning, so the page can be shorter than `page_size` even
    /// though `fetched_count` equals the raw store hits. That gap is
    /// documented behavior, not a defect.
    pub async fn fetch_recruiting_page(
        &self,
        organizer_id: &str,
        page_size: usize,
        cursor: Option<PageCursor>,
    ) -> Result<MatchPage> {
        let page_size = self.effective_page_size(page_size)?;
        let query = PageQuery::ordered_by(FIELD_CREATED_AT, true, page_size)
            .with_equality(FIELD_ORGANIZER_ID, json!(organizer_id))
            .with_cursor(cursor);

        let page = self.store.get_page(MATCHES_COLLECTION, query).await?;
        let fetched_count = page.documents.len();
        let decoded: Vec<Match> = decode_lenient(&page.documents, MATCHES_COLLECTION);

        let now = current_timestamp();
        let (due, current): (Vec<Match>, Vec<Match>) = decoded
            .into_iter()
            .partition(|m| m.is_due_for_transition(now));
        let current: Vec<Match> = current
            .into_iter()
            .filter(|m| m.status != MatchStatus::Finished)
            .collect();

        if !due.is_empty() {
            info!(
                "Transitioning {} past-due matches for organizer {}",
                due.len(),
                organizer_id
            );
            let writes = due.iter().map(|m| {
                let store = Arc::clone(&self.store);
                let id = m.id.clone();
                let fields = finished_fields(now, false);
                async move { store.merge_write(MATCHES_COLLECTION, &id, fields).await }
            });
            for (m, result) in due.iter().zip(join_all(writes).await) {
                match result {
                    Ok(()) => {
                        debug!("Match {} transitioned to finished", m.id);
                        self.session.record_finished(m.clone());
                    }
                    Err(e) => {
                        // Self-healing: the due condition persists, a later
                        // sweep retries the same idempotent write.
                        warn!(
                            "{}",
                            MatchdayError::LifecycleTransitionWrite {
                                match_id: m.id.clone(),
                                message: e.to_string(),
                            }
                        );
                    }
                }
            }
        }

        Ok(MatchPage {
            matches: current,
            next_cursor: page.next_cursor,
            fetched_count,
        })
    }

    /// One keyset page of matches a user has applied to, appliedAt descending
    ///
    /// Re-applications collapse to one entry per match (latest appliedAt
    /// wins). A match that no longer exists is dropped silently.
    pub async fn fetch_applied_page(
        &self,
        applicant_id: &str,
        page_size: usize,
        cursor: Option<PageCursor>,
    ) -> Result<MatchPage> {
        let page_size = self.effective_page_size(page_size)?;
        let query = PageQuery::ordered_by(FIELD_APPLIED_AT, true, page_size)
            .with_equality(FIELD_APPLICANT_ID, json!(applicant_id))
            .with_cursor(cursor);

        let page = self.store.get_page(APPLICATIONS_COLLECTION, query).await?;
        let fetched_count = page.documents.len();
        let applications: Vec<Application> = decode_lenient(&page.documents, APPLICATIONS_COLLECTION);

        // Page order is appliedAt descending, so the first occurrence per
        // match is the authoritative (latest) application.
        let mut seen = HashSet::new();
        let mut match_ids = Vec::new();
        for application in &applications {
            if seen.insert(application.match_id.clone()) {
                match_ids.push(application.match_id.clone());
            }
        }

        let docs = self.store.get_by_ids(MATCHES_COLLECTION, &match_ids).await?;
        let mut by_id: HashMap<String, Match> = decode_lenient(&docs, MATCHES_COLLECTION)
            .into_iter()
            .map(|m: Match| (m.id.clone(), m))
            .collect();

        let matches = match_ids
            .iter()
            .filter_map(|id| {
                let found = by_id.remove(id);
                if found.is_none() {
                    debug!("Applied-to match {} no longer exists, dropping", id);
                }
                found
            })
            .collect();

        Ok(MatchPage {
            matches,
            next_cursor: page.next_cursor,
            fetched_count,
        })
    }

    /// All finished matches the user organized or participated in
    ///
    /// Store results are merged with this session's just-transitioned set to
    /// paper over index lag right after a transition write. The session set is
    /// advisory only; the store stays the source of truth.
    pub async fn fetch_finished(&self, user_id: &str) -> Result<Vec<Match>> {
        let mut results: Vec<Match> = Vec::new();
        let mut cursor = None;
        loop {
            let query = PageQuery::ordered_by(
                FIELD_CREATED_AT,
                true,
                self.pagination.finished_sweep_page_size,
            )
            .with_equality(FIELD_STATUS, json!(MatchStatus::Finished.as_str()))
            .with_cursor(cursor);

            let page = self.store.get_page(MATCHES_COLLECTION, query).await?;
            results.extend(
                decode_lenient::<Match>(&page.documents, MATCHES_COLLECTION)
                    .into_iter()
                    .filter(|m| m.involves(user_id)),
            );
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        let mut seen: HashSet<String> = results.iter().map(|m| m.id.clone()).collect();
        for m in self.session.finished_snapshot() {
            if m.involves(user_id) && seen.insert(m.id.clone()) {
                results.push(m);
            }
        }
        results.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(results)
    }

    /// Idempotent transition of one match to finished
    ///
    /// Failure is logged and swallowed; the due condition re-evaluates true
    /// until the write eventually lands.
    pub async fn transition_to_finished(&self, match_id: &str, with_initial_rating: bool) {
        let now = current_timestamp();
        let fields = finished_fields(now, with_initial_rating);
        match self
            .store
            .merge_write(MATCHES_COLLECTION, match_id, fields)
            .await
        {
            Ok(()) => {
                info!("Match {} transitioned to finished", match_id);
                if let Ok(docs) = self
                    .store
                    .get_by_ids(MATCHES_COLLECTION, &[match_id.to_string()])
                    .await
                {
                    if let Some(doc) = docs.first() {
                        if let Ok(m) = doc.decode::<Match>(MATCHES_COLLECTION) {
                            self.session.record_finished(m);
                        }
                    }
                }
            }
            Err(e) => {
                warn!(
                    "{}",
                    MatchdayError::LifecycleTransitionWrite {
                        match_id: match_id.to_string(),
                        message: e.to_string(),
                    }
                );
            }
        }
    }

    /// Point lookup of one match
    pub async fn get_match(&self, match_id: &str) -> Result<Match> {
        let docs = self
            .store
            .get_by_ids(MATCHES_COLLECTION, &[match_id.to_string()])
            .await?;
        let doc = docs.into_iter().next().ok_or_else(|| MatchdayError::NotFound {
            collection: MATCHES_COLLECTION.to_string(),
            id: match_id.to_string(),
        })?;
        doc.decode(MATCHES_COLLECTION)
    }

    /// Latest application a user filed for a match, if any
    ///
    /// This is the explicit detailed fetch callers trigger when resolution
    /// reports `rejected` and the reason is needed.
    pub async fn fetch_latest_application(
        &self,
        match_id: &str,
        applicant_id: &str,
    ) -> Result<Option<Application>> {
        let mut cursor = None;
        loop {
            let query = PageQuery::ordered_by(
                FIELD_APPLIED_AT,
                true,
                self.pagination.default_page_size,
            )
            .with_equality(FIELD_APPLICANT_ID, json!(applicant_id))
            .with_cursor(cursor);

            let page = self.store.get_page(APPLICATIONS_COLLECTION, query).await?;
            let found = decode_lenient::<Application>(&page.documents, APPLICATIONS_COLLECTION)
                .into_iter()
                .find(|application| application.match_id == match_id);
            if let Some(application) = found {
                return Ok(Some(application));
            }
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => return Ok(None),
            }
        }
    }

    /// File an application: one new application document plus a pending entry
    /// in the match's participants map
    ///
    /// These are two discrete writes with no shared transaction; the status
    /// resolver tolerates the window where only one has landed.
    pub async fn apply_to_match(&self, match_id: &str, applicant_id: &str) -> Result<Application> {
        let match_doc = self.get_match(match_id).await?;
        if match_doc.status != MatchStatus::Recruiting {
            return Err(MatchdayError::Validation {
                reason: format!("match {match_id} is not recruiting"),
            }
            .into());
        }
        let accepted = match_doc
            .participants
            .values()
            .filter(|raw| raw.as_str() == ApplicationStatus::Accepted.as_str())
            .count();
        if accepted >= match_doc.capacity as usize {
            return Err(MatchdayError::Validation {
                reason: format!("match {match_id} is at capacity"),
            }
            .into());
        }

        let application = Application {
            id: generate_application_id(),
            match_id: match_id.to_string(),
            applicant_id: applicant_id.to_string(),
            status: ApplicationStatus::Pending,
            rejection_reason: None,
            applied_at: current_timestamp(),
            processed_at: None,
        };
        let doc = Document::from_serializable(application.id.clone(), &application)?;
        self.store
            .merge_write(APPLICATIONS_COLLECTION, &application.id, doc.fields)
            .await?;

        if let Err(e) = self
            .write_participant_entry(match_id, applicant_id, ApplicationStatus::Pending)
            .await
        {
            warn!(
                "Quick-status write for {} on match {} failed; detail remains readable: {}",
                applicant_id, match_id, e
            );
        }

        info!("User {} applied to match {}", applicant_id, match_id);
        Ok(application)
    }

    /// Record the organizer's decision on a pending application
    ///
    /// Writes the application document first, then the denormalized
    /// participants-map entry. A failed second write leaves the quick status
    /// stale; resolution precedence surfaces the stale value until it is
    /// rewritten, which is the documented read-skew tolerance.
    pub async fn decide_application(
        &self,
        application: &Application,
        decision: ApplicationDecision,
        reason: Option<String>,
    ) -> Result<()> {
        if application.status != ApplicationStatus::Pending {
            return Err(MatchdayError::Validation {
                reason: format!("application {} was already decided", application.id),
            }
            .into());
        }

        let status = decision.as_status();
        let now = current_timestamp();
        let mut fields = Map::new();
        fields.insert(FIELD_STATUS.to_string(), json!(status.as_str()));
        fields.insert(FIELD_PROCESSED_AT.to_string(), json!(now));
        if status == ApplicationStatus::Rejected {
            if let Some(reason) = &reason {
                fields.insert(FIELD_REJECTION_REASON.to_string(), json!(reason));
            }
        }
        self.store
            .merge_write(APPLICATIONS_COLLECTION, &application.id, fields)
            .await?;

        if let Err(e) = self
            .write_participant_entry(&application.match_id, &application.applicant_id, status)
            .await
        {
            warn!(
                "Quick-status write for {} on match {} failed; quick status is stale: {}",
                application.applicant_id, application.match_id, e
            );
        }

        info!(
            "Application {} {} for match {}",
            application.id, status, application.match_id
        );
        Ok(())
    }

    async fn write_participant_entry(
        &self,
        match_id: &str,
        applicant_id: &str,
        status: ApplicationStatus,
    ) -> Result<()> {
        let mut entry = Map::new();
        entry.insert(applicant_id.to_string(), json!(status.as_str()));
        let mut fields = Map::new();
        fields.insert(FIELD_PARTICIPANTS.to_string(), Value::Object(entry));
        self.store
            .merge_write(MATCHES_COLLECTION, match_id, fields)
            .await
    }
}
