use serde::{Deserialize, Serialize};

/// Environment variable that overrides `auth_token` from the config file
pub const AUTH_TOKEN_ENV: &str = "PROJSEL_AUTH_TOKEN";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the tracker API (without the `/api/v1` suffix)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Bearer token sent with every request (empty = anonymous)
    #[serde(default)]
    pub auth_token: String,

    /// Page size requested from the server; the server default applies when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,

    /// Per-request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Where the selected project is remembered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_path: Option<String>,

    /// Write debug logs to a file
    #[serde(default)]
    pub debug: bool,

    /// Log file or directory; defaults next to the config file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_rotation: Option<DebugLogRotation>,

    /// How many rotated log files to keep (0 = keep everything)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_keep: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            auth_token: String::new(),
            page_size: None,
            request_timeout_secs: default_request_timeout_secs(),
            session_path: None,
            debug: false,
            debug_log_path: None,
            debug_log_rotation: None,
            debug_log_keep: None,
        }
    }
}

impl Config {
    /// Token to authenticate with, preferring the environment over the file
    pub fn resolved_auth_token(&self) -> Option<String> {
        std::env::var(AUTH_TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| Some(self.auth_token.clone()).filter(|t| !t.trim().is_empty()))
            .map(|t| t.trim().to_string())
    }
}

/// Debug log file rotation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DebugLogRotation {
    /// Append to a single file forever
    None,
    /// One file per day
    Daily,
    /// One file per process run
    Session,
}

fn default_api_base() -> String {
    "https://api.taiga.io".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}
