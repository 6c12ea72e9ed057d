//! Error types for the match lifecycle layer
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific lifecycle and consistency scenarios
#[derive(Debug, thiserror::Error)]
pub enum MatchdayError {
    #[error("Transient store failure: {message}")]
    TransientStore { message: String },

    #[error("Failed to decode document {id} in {collection}: {message}")]
    Decoding {
        collection: String,
        id: String,
        message: String,
    },

    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Invalid input: {reason}")]
    Validation { reason: String },

    #[error("Invalid pagination cursor: {reason}")]
    InvalidCursor { reason: String },

    #[error("Lifecycle transition write failed for match {match_id}: {message}")]
    LifecycleTransitionWrite { match_id: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}
