// Traits for the remote collaborators of an analysis job
use crate::domain::chart::ChartRecord;
use crate::domain::repository::RepositoryRecord;
use crate::error::Result;
use crate::infrastructure::config::{ChartSourceSettings, GithubSettings, NotifySettings};
use async_trait::async_trait;

#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// List the repositories owned by the configured GitHub user
    async fn fetch_repositories(&self, settings: &GithubSettings) -> Result<Vec<RepositoryRecord>>;
}

#[async_trait]
pub trait ChartDataSource: Send + Sync {
    /// Download and parse the chart dataset
    async fn fetch_chart_records(&self, settings: &ChartSourceSettings) -> Result<Vec<ChartRecord>>;
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver a message and return the HTTP status the service answered with.
    ///
    /// A non-success status is not an error at this level; only transport failures are.
    async fn send(&self, settings: &NotifySettings, message: &str) -> Result<u16>;
}
