pub mod providers;

use serde::{Deserialize, Serialize};

/// Search provider abstraction - different backends can be plugged in
///
/// Pages are 1-based. An empty page means there is nothing at or after it.
#[async_trait::async_trait]
pub trait SearchProvider<T>: Send + Sync {
    /// Fetch one page of results for `query`
    async fn search(&self, query: &str, page: u32) -> Result<Vec<T>, SearchError>;
}

/// Identifying fields an item hands to the session when it is selected
pub trait Identified {
    fn id(&self) -> u64;
    fn name(&self) -> &str;
}

/// A project as returned by project search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInSearch {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(rename = "i_am_member", default)]
    pub is_member: bool,
    #[serde(rename = "i_am_admin", default)]
    pub is_admin: bool,
    #[serde(rename = "i_am_owner", default)]
    pub is_owner: bool,
}

impl Identified for ProjectInSearch {
    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Search-related errors
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Not authorized to list projects")]
    Unauthorized,

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}
