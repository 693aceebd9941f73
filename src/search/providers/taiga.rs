use crate::config::Config;
use crate::logging::redact_secrets;
use crate::search::{ProjectInSearch, SearchError, SearchProvider};
use reqwest::StatusCode;
use std::time::Duration;

/// Project search against a Taiga-compatible REST API
///
/// Uses `GET {api_base}/api/v1/projects`. The server answers 404 for a page
/// past the last one, which is reported as an empty page.
pub struct TaigaProjectProvider {
    client: reqwest::Client,
    api_base: String,
    auth_token: Option<String>,
    page_size: Option<u32>,
}

impl TaigaProjectProvider {
    /// Create a provider with its own HTTP client configured from `config`
    pub fn new(config: &Config) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self::with_client(client, config))
    }

    /// Create a provider around an existing client
    pub fn with_client(client: reqwest::Client, config: &Config) -> Self {
        let auth_token = config.resolved_auth_token();
        if auth_token.is_none() {
            tracing::warn!("no auth token configured, only public projects will be listed");
        }

        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            auth_token,
            page_size: config.page_size,
        }
    }

    fn projects_url(&self) -> String {
        format!("{}/api/v1/projects", self.api_base)
    }

    fn query_params(&self, query: &str, page: u32) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("order_by", "user_order".to_string()),
            ("slight", "true".to_string()),
            ("q", query.to_string()),
            ("page", page.to_string()),
        ];
        if let Some(size) = self.page_size {
            params.push(("page_size", size.to_string()));
        }
        params
    }
}

#[async_trait::async_trait]
impl SearchProvider<ProjectInSearch> for TaigaProjectProvider {
    async fn search(&self, query: &str, page: u32) -> Result<Vec<ProjectInSearch>, SearchError> {
        tracing::debug!(query = %query, page, "searching projects");

        let mut request = self
            .client
            .get(self.projects_url())
            .header("Accept", "application/json")
            .query(&self.query_params(query, page));
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            tracing::debug!(query = %query, page, "page past the end");
            return Ok(Vec::new());
        }

        if !status.is_success() {
            // The body may echo request headers back.
            let error_text = redact_secrets(&response.text().await.unwrap_or_default());

            tracing::warn!(
                status = %status,
                error = %error_text,
                "project search api error"
            );

            return match status.as_u16() {
                401 | 403 => Err(SearchError::Unauthorized),
                _ => Err(SearchError::ApiError(format!("HTTP {}: {}", status, error_text))),
            };
        }

        let projects: Vec<ProjectInSearch> = response.json().await?;

        tracing::debug!(
            query = %query,
            page,
            result_count = projects.len(),
            "project search completed"
        );

        Ok(projects)
    }
}
