//! Where the chosen project is remembered once the user picks one.

mod file;

pub use file::FileSession;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Receives the identifying fields of a selected item.
///
/// Fire-and-forget: implementations log their own failures.
pub trait SessionSink: Send + Sync {
    fn record_selection(&self, id: u64, name: &str);
}

/// The project currently selected for the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentProject {
    pub current_project_id: u64,
    pub current_project_name: String,
    pub selected_at: DateTime<Utc>,
}

impl CurrentProject {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            current_project_id: id,
            current_project_name: name.into(),
            selected_at: Utc::now(),
        }
    }
}

/// Session store errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to access session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed session file: {0}")]
    Malformed(#[from] serde_json::Error),
}
