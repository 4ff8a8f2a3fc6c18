//! Error types.
//!
//! Everything here belongs to the fatal, pre-run tier: any of these aborts the
//! run before a single virtual user starts. Per-attempt failures are not
//! errors; they are [`PurchaseResult::Failure`](crate::types::PurchaseResult)
//! values counted in the run statistics.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain a venue layout from the layout document.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The document does not exist
    #[error("venue layout document {} not found; run from the project root or set VENUES_FILE_PATH", .path.display())]
    NotFound {
        /// Path that was tried
        path: PathBuf,
    },

    /// The document exists but could not be read
    #[error("failed to read venue layout document {}: {source}", .path.display())]
    Unreadable {
        /// Path that was tried
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid YAML of the expected shape
    #[error("failed to parse venue layout document {}: {source}", .path.display())]
    Malformed {
        /// Path that was parsed
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: serde_yaml::Error,
    },

    /// The document has no entry for the requested venue
    #[error("venue '{venue_id}' not found in {}", .path.display())]
    VenueMissing {
        /// Venue that was requested
        venue_id: String,
        /// Document that was searched
        path: PathBuf,
    },
}

/// Misuse of the seat queue's one-shot lifecycle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// `populate` was called a second time
    #[error("seat queue already populated with {seeded} seats")]
    AlreadyPopulated {
        /// Seats seeded by the first call
        seeded: usize,
    },
}

/// Invalid run parameters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// At least one virtual user is required
    #[error("LOADTEST_USERS must be at least 1")]
    NoUsers,

    /// The verification probability is not a probability
    #[error("LOADTEST_VERIFY_PROBABILITY must be within [0, 1], got {0}")]
    InvalidProbability(f64),

    /// A service base address is not an http(s) URL
    #[error("{name} must be an http:// or https:// address, got '{value}'")]
    InvalidHost {
        /// Variable name
        name: &'static str,
        /// Offending value
        value: String,
    },
}

/// Fatal errors surfaced by the lifecycle controller.
#[derive(Debug, Error)]
pub enum RunError {
    /// Run parameters failed validation
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The layout could not be loaded
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// The layout has zero zones
    #[error("venue '{venue_id}' layout has 0 zones; nothing to sell")]
    EmptyLayout {
        /// Venue whose layout was empty
        venue_id: String,
    },

    /// The queue was seeded before this run prepared it
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// A virtual user task panicked or was cancelled
    #[error("virtual user task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result alias for pre-run operations.
pub type RunResult<T> = Result<T, RunError>;
