//! Canned-answer lookup: exact key first, then the ordered fuzzy scan.

pub mod resolver;
pub mod table;

use std::path::PathBuf;

use thiserror::Error;

pub use resolver::{resolve, CannedAnswer};
pub use table::ResponseTable;

#[derive(Error, Debug)]
pub enum ResponseTableError {
    #[error("Cannot read response table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Response table is not a JSON object of strings: {0}")]
    Parse(#[from] serde_json::Error),
}
