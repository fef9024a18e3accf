//! Feedback Store: every helpfulness judgment, mirrored in memory and
//! rewritten in full to a single JSON array after each submission.
//!
//! There is no temp-file swap and no lock. A crash mid-write can leave a
//! truncated document, and a truncated document fails the next `load`.

pub mod store;

use std::path::PathBuf;

use thiserror::Error;

pub use store::FeedbackStore;

#[derive(Error, Debug)]
pub enum FeedbackError {
    #[error("Feedback file I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Feedback file {path} is not a valid JSON array of records: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Feedback serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
