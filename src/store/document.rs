//! Document store interface and query types
//!
//! The backing store only supports ordered queries over a single sort key with
//! at most one pushed-down equality predicate; everything richer happens in
//! memory on top of pages fetched through this interface.

use crate::error::{MatchdayError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Unique identifier of a document within its collection
pub type DocumentId = String;

/// A raw document: id plus loosely-typed fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub fields: Map<String, Value>,
}

impl Document {
    /// Build a document from any serializable domain value
    pub fn from_serializable<T: Serialize>(id: impl Into<DocumentId>, value: &T) -> Result<Self> {
        let json = serde_json::to_value(value)?;
        match json {
            Value::Object(fields) => Ok(Self {
                id: id.into(),
                fields,
            }),
            other => Err(MatchdayError::InternalError {
                message: format!("expected object document, got {other}"),
            }
            .into()),
        }
    }

    /// Decode the document into a typed domain value
    ///
    /// Failures map to a `Decoding` error carrying collection and id so the
    /// caller can apply the partial-page skip policy.
    pub fn decode<T: DeserializeOwned>(&self, collection: &str) -> Result<T> {
        serde_json::from_value(Value::Object(self.fields.clone())).map_err(|e| {
            MatchdayError::Decoding {
                collection: collection.to_string(),
                id: self.id.clone(),
                message: e.to_string(),
            }
            .into()
        })
    }
}

/// Decode a fetched page leniently: undecodable documents are logged and
/// skipped rather than failing the whole page (partial-result policy)
pub fn decode_lenient<T: DeserializeOwned>(documents: &[Document], collection: &str) -> Vec<T> {
    documents
        .iter()
        .filter_map(|doc| match doc.decode::<T>(collection) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Skipping undecodable document: {e}");
                None
            }
        })
        .collect()
}

/// Opaque keyset-pagination cursor
///
/// Anchored to the last returned item's sort key and document id, and bound to
/// the exact query shape (collection, ordering, equality set) it was produced
/// by. A cursor handed to a query with a different shape is rejected rather
/// than silently returning wrong pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageCursor {
    last_sort_key: Value,
    last_doc_id: DocumentId,
    shape: u64,
}

impl PageCursor {
    pub(crate) fn new(last_sort_key: Value, last_doc_id: DocumentId, shape: u64) -> Self {
        Self {
            last_sort_key,
            last_doc_id,
            shape,
        }
    }

    pub(crate) fn last_sort_key(&self) -> &Value {
        &self.last_sort_key
    }

    pub(crate) fn last_doc_id(&self) -> &str {
        &self.last_doc_id
    }

    pub(crate) fn matches_shape(&self, shape: u64) -> bool {
        self.shape == shape
    }
}

/// An ordered, keyset-paginated page query
#[derive(Debug, Clone)]
pub struct PageQuery {
    /// Field the page is ordered by
    pub order_by: String,
    /// Descending order when true
    pub descending: bool,
    /// Maximum number of documents to return
    pub limit: usize,
    /// Resume after this position; `None` starts from the beginning
    pub cursor: Option<PageCursor>,
    /// Pushed-down equality predicates (real backends support at most one)
    pub equality: Vec<(String, Value)>,
}

impl PageQuery {
    /// Create a query ordered by one field
    pub fn ordered_by(order_by: impl Into<String>, descending: bool, limit: usize) -> Self {
        Self {
            order_by: order_by.into(),
            descending,
            limit,
            cursor: None,
            equality: Vec::new(),
        }
    }

    /// Add an equality predicate
    pub fn with_equality(mut self, field: impl Into<String>, value: Value) -> Self {
        self.equality.push((field.into(), value));
        self
    }

    /// Resume from a previous page's cursor
    pub fn with_cursor(mut self, cursor: Option<PageCursor>) -> Self {
        self.cursor = cursor;
        self
    }

    /// Fingerprint of the (collection, ordering, equality) shape this query
    /// binds its cursors to
    pub fn shape_fingerprint(&self, collection: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        collection.hash(&mut hasher);
        self.order_by.hash(&mut hasher);
        self.descending.hash(&mut hasher);
        for (field, value) in &self.equality {
            field.hash(&mut hasher);
            value.to_string().hash(&mut hasher);
        }
        hasher.finish()
    }
}

/// One page of raw documents
#[derive(Debug, Clone)]
pub struct DocumentPage {
    pub documents: Vec<Document>,
    pub next_cursor: Option<PageCursor>,
}

/// Interface consumed from the backing document store
///
/// All writes reachable through this trait are idempotent or commutative:
/// merge writes apply the same assignment each time, increments are
/// order-independent. The lifecycle layer leans on both properties.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one ordered page; `next_cursor` is `None` once exhausted
    async fn get_page(&self, collection: &str, query: PageQuery) -> Result<DocumentPage>;

    /// Point lookups by id; missing ids are silently omitted
    async fn get_by_ids(&self, collection: &str, ids: &[DocumentId]) -> Result<Vec<Document>>;

    /// Idempotent partial update; creates the document when absent
    async fn merge_write(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<()>;

    /// Add `delta` to a numeric field without a read-modify-write round trip;
    /// creates the document/field lazily (missing treated as zero)
    async fn atomic_increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<()>;

    /// Remove a document; removing a missing document is not an error
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;
}
