//! In-memory document store
//!
//! Backs tests and local development. Implements the same ordered keyset
//! pagination and lazy-upsert write semantics the managed backend provides,
//! and records merge writes so tests can assert on the exact write traffic.

use crate::error::{MatchdayError, Result};
use crate::store::document::{
    Document, DocumentId, DocumentPage, DocumentStore, PageCursor, PageQuery,
};
use async_trait::async_trait;
use chrono::DateTime;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::RwLock;

/// A recorded merge-write call, for test assertions
#[derive(Debug, Clone)]
pub struct MergeWriteRecord {
    pub collection: String,
    pub id: DocumentId,
    pub fields: Map<String, Value>,
}

/// In-memory `DocumentStore` implementation
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, HashMap<DocumentId, Document>>>,
    merge_writes: RwLock<Vec<MergeWriteRecord>>,
    fail_merge_writes: AtomicBool,
}

/// Rank JSON values by type so mixed-type sort keys still order totally
fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Natural ascending order for sort-key values
///
/// Timestamp strings are compared as instants rather than bytes so that
/// RFC 3339 values with and without fractional seconds interleave correctly.
fn compare_sort_keys(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(x), Value::String(y)) => {
            match (
                DateTime::parse_from_rfc3339(x),
                DateTime::parse_from_rfc3339(y),
            ) {
                (Ok(tx), Ok(ty)) => tx.cmp(&ty),
                _ => x.cmp(y),
            }
        }
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Recursive merge: nested objects merge key-by-key, everything else replaces.
/// Matches the backend's set-with-merge semantics so a write touching one
/// participants-map entry does not clobber its siblings.
fn deep_merge(target: &mut Map<String, Value>, incoming: Map<String, Value>) {
    for (field, value) in incoming {
        match (target.get_mut(&field), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            (_, value) => {
                target.insert(field, value);
            }
        }
    }
}

/// Query-order comparison of two (sort key, doc id) positions
fn compare_positions(
    descending: bool,
    a_key: &Value,
    a_id: &str,
    b_key: &Value,
    b_id: &str,
) -> Ordering {
    let key_ord = compare_sort_keys(a_key, b_key);
    let key_ord = if descending {
        key_ord.reverse()
    } else {
        key_ord
    };
    key_ord.then_with(|| a_id.cmp(b_id))
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document directly (test seeding)
    pub fn seed(&self, collection: &str, document: Document) -> Result<()> {
        let mut collections =
            self.collections
                .write()
                .map_err(|_| MatchdayError::InternalError {
                    message: "Failed to acquire collections write lock".to_string(),
                })?;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(document.id.clone(), document);
        Ok(())
    }

    /// Read a document directly (test assertions)
    pub fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let collections =
            self.collections
                .read()
                .map_err(|_| MatchdayError::InternalError {
                    message: "Failed to acquire collections read lock".to_string(),
                })?;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    /// Number of documents in a collection
    pub fn collection_len(&self, collection: &str) -> Result<usize> {
        let collections =
            self.collections
                .read()
                .map_err(|_| MatchdayError::InternalError {
                    message: "Failed to acquire collections read lock".to_string(),
                })?;
        Ok(collections.get(collection).map_or(0, HashMap::len))
    }

    /// All merge-write calls made so far (for testing)
    pub fn recorded_merge_writes(&self) -> Vec<MergeWriteRecord> {
        self.merge_writes
            .read()
            .map(|writes| writes.clone())
            .unwrap_or_default()
    }

    /// Clear the merge-write record (for testing)
    pub fn clear_merge_write_record(&self) {
        if let Ok(mut writes) = self.merge_writes.write() {
            writes.clear();
        }
    }

    /// Make subsequent merge writes fail with a transient error (for testing)
    pub fn set_fail_merge_writes(&self, fail: bool) {
        self.fail_merge_writes.store(fail, AtomicOrdering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get_page(&self, collection: &str, query: PageQuery) -> Result<DocumentPage> {
        let shape = query.shape_fingerprint(collection);
        if let Some(cursor) = &query.cursor {
            if !cursor.matches_shape(shape) {
                return Err(MatchdayError::InvalidCursor {
                    reason: format!(
                        "cursor was issued for a different query shape on {collection}"
                    ),
                }
                .into());
            }
        }

        let collections =
            self.collections
                .read()
                .map_err(|_| MatchdayError::InternalError {
                    message: "Failed to acquire collections read lock".to_string(),
                })?;

        let mut candidates: Vec<(Value, DocumentId, Document)> = collections
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| {
                        query
                            .equality
                            .iter()
                            .all(|(field, value)| doc.fields.get(field) == Some(value))
                    })
                    .map(|doc| {
                        let key = doc.fields.get(&query.order_by).cloned().unwrap_or(Value::Null);
                        (key, doc.id.clone(), doc.clone())
                    })
                    .collect()
            })
            .unwrap_or_default();
        drop(collections);

        candidates.sort_by(|a, b| compare_positions(query.descending, &a.0, &a.1, &b.0, &b.1));

        let after_cursor: Vec<_> = match &query.cursor {
            Some(cursor) => candidates
                .into_iter()
                .filter(|(key, id, _)| {
                    compare_positions(
                        query.descending,
                        key,
                        id,
                        cursor.last_sort_key(),
                        cursor.last_doc_id(),
                    ) == Ordering::Greater
                })
                .collect(),
            None => candidates,
        };

        let page: Vec<_> = after_cursor.into_iter().take(query.limit).collect();
        let next_cursor = if page.len() == query.limit {
            page.last()
                .map(|(key, id, _)| PageCursor::new(key.clone(), id.clone(), shape))
        } else {
            None
        };

        Ok(DocumentPage {
            documents: page.into_iter().map(|(_, _, doc)| doc).collect(),
            next_cursor,
        })
    }

    async fn get_by_ids(&self, collection: &str, ids: &[DocumentId]) -> Result<Vec<Document>> {
        let collections =
            self.collections
                .read()
                .map_err(|_| MatchdayError::InternalError {
                    message: "Failed to acquire collections read lock".to_string(),
                })?;

        let docs = collections.get(collection);
        Ok(ids
            .iter()
            .filter_map(|id| docs.and_then(|d| d.get(id)).cloned())
            .collect())
    }

    async fn merge_write(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<()> {
        if self.fail_merge_writes.load(AtomicOrdering::SeqCst) {
            return Err(MatchdayError::TransientStore {
                message: format!("injected merge-write failure for {collection}/{id}"),
            }
            .into());
        }

        if let Ok(mut writes) = self.merge_writes.write() {
            writes.push(MergeWriteRecord {
                collection: collection.to_string(),
                id: id.to_string(),
                fields: fields.clone(),
            });
        }

        let mut collections =
            self.collections
                .write()
                .map_err(|_| MatchdayError::InternalError {
                    message: "Failed to acquire collections write lock".to_string(),
                })?;

        let doc = collections
            .entry(collection.to_string())
            .or_default()
            .entry(id.to_string())
            .or_insert_with(|| Document {
                id: id.to_string(),
                fields: Map::new(),
            });
        doc.fields
            .entry("id".to_string())
            .or_insert_with(|| Value::String(id.to_string()));
        deep_merge(&mut doc.fields, fields);

        Ok(())
    }

    async fn atomic_increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<()> {
        let mut collections =
            self.collections
                .write()
                .map_err(|_| MatchdayError::InternalError {
                    message: "Failed to acquire collections write lock".to_string(),
                })?;

        let doc = collections
            .entry(collection.to_string())
            .or_default()
            .entry(id.to_string())
            .or_insert_with(|| Document {
                id: id.to_string(),
                fields: Map::new(),
            });
        doc.fields
            .entry("id".to_string())
            .or_insert_with(|| Value::String(id.to_string()));

        let current = doc.fields.get(field).and_then(Value::as_i64).unwrap_or(0);
        doc.fields
            .insert(field.to_string(), Value::from(current + delta));

        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let mut collections =
            self.collections
                .write()
                .map_err(|_| MatchdayError::InternalError {
                    message: "Failed to acquire collections write lock".to_string(),
                })?;

        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}
