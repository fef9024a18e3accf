use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;

use super::FeedbackError;
use crate::models::{FeedbackRecord, FeedbackStats};

/// ISO-8601 local time, microsecond precision.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// On-disk indentation; identical on every save.
const INDENT: &[u8] = b"    ";

/// In-memory mirror of the feedback document.
#[derive(Debug)]
pub struct FeedbackStore {
    path: PathBuf,
    records: Vec<FeedbackRecord>,
}

impl FeedbackStore {
    /// Load the document at `path`, or start empty when it does not exist.
    ///
    /// A present but unreadable or malformed file is an error; it is not
    /// repaired or moved aside.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, FeedbackError> {
        let path = path.into();

        if !path.exists() {
            tracing::info!(path = %path.display(), "No existing feedback data found. Starting fresh.");
            return Ok(Self {
                path,
                records: Vec::new(),
            });
        }

        let data = std::fs::read_to_string(&path).map_err(|source| FeedbackError::Io {
            path: path.clone(),
            source,
        })?;
        let records: Vec<FeedbackRecord> =
            serde_json::from_str(&data).map_err(|source| FeedbackError::Parse {
                path: path.clone(),
                source,
            })?;

        tracing::info!(path = %path.display(), records = records.len(), "Feedback data loaded successfully.");
        Ok(Self { path, records })
    }

    /// Record a judgment and rewrite the whole document.
    ///
    /// The record stays in memory even if the write fails.
    pub fn append(
        &mut self,
        query: &str,
        response: &str,
        is_helpful: bool,
        user_comment: Option<&str>,
    ) -> Result<&FeedbackRecord, FeedbackError> {
        let record = FeedbackRecord {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            query: query.to_string(),
            response: response.to_string(),
            is_helpful,
            user_comment: user_comment.map(str::to_string),
        };
        self.records.push(record);
        tracing::debug!(records = ?self.records, "Feedback data before saving");

        self.save()?;

        let added = &self.records[self.records.len() - 1];
        tracing::info!(
            timestamp = %added.timestamp,
            is_helpful = added.is_helpful,
            "Feedback added"
        );
        Ok(added)
    }

    /// Helpful / not-helpful counts over every stored record.
    pub fn stats(&self) -> FeedbackStats {
        if self.records.is_empty() {
            tracing::info!("No feedback data available.");
            return FeedbackStats::default();
        }

        let total = self.records.len();
        let helpful = self.records.iter().filter(|r| r.is_helpful).count();
        let stats = FeedbackStats {
            helpful,
            not_helpful: total - helpful,
            total,
        };
        tracing::info!(
            total = stats.total,
            helpful = stats.helpful,
            not_helpful = stats.not_helpful,
            "Feedback stats"
        );
        stats
    }

    pub fn records(&self) -> &[FeedbackRecord] {
        &self.records
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), FeedbackError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.records.serialize(&mut serializer)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| FeedbackError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(&self.path, &buf).map_err(|source| FeedbackError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::info!(path = %self.path.display(), "Feedback data saved successfully.");
        Ok(())
    }
}
