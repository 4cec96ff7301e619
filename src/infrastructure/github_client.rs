// GitHub REST client for a user's repository listing
use crate::application::remote_sources::RepositorySource;
use crate::domain::repository::RepositoryRecord;
use crate::error::{AnalysisError, Result};
use crate::infrastructure::config::GithubSettings;
use crate::infrastructure::http::{ensure_success, request_error};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
    timeout: Duration,
}

impl GithubClient {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    fn repos_url(settings: &GithubSettings) -> String {
        format!(
            "{}/users/{}/repos",
            settings.api_url,
            urlencoding::encode(&settings.user)
        )
    }
}

#[async_trait]
impl RepositorySource for GithubClient {
    async fn fetch_repositories(&self, settings: &GithubSettings) -> Result<Vec<RepositoryRecord>> {
        let url = Self::repos_url(settings);
        tracing::info!("Loading repositories for {} from {}", settings.user, url);

        let response = self
            .client
            .get(&url)
            .basic_auth(&settings.user, Some(&settings.key))
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| request_error(&url, self.timeout, e))?;

        let response = ensure_success(&url, response).await?;

        let body = response
            .text()
            .await
            .map_err(|e| request_error(&url, self.timeout, e))?;

        serde_json::from_str::<Vec<RepositoryRecord>>(&body).map_err(|e| {
            AnalysisError::InvalidResponse {
                url,
                reason: format!("expected a JSON array of repositories with a numeric size: {}", e),
            }
        })
    }
}
