//! Document store boundary
//!
//! This module defines the interface the lifecycle layer consumes from the
//! backing document store, plus an in-memory implementation used for tests
//! and local development.

pub mod document;
pub mod memory;

pub use document::{decode_lenient, Document, DocumentPage, DocumentStore, PageCursor, PageQuery};
pub use memory::InMemoryDocumentStore;
