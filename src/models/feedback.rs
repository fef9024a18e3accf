use serde::{Deserialize, Serialize};

/// A persisted judgment of whether a response was helpful.
///
/// Field order is the on-disk key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// ISO-8601 local time with microsecond precision.
    pub timestamp: String,
    pub query: String,
    pub response: String,
    pub is_helpful: bool,
    pub user_comment: Option<String>,
}

/// Aggregate counts over all stored feedback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackStats {
    pub helpful: usize,
    pub not_helpful: usize,
    pub total: usize,
}
