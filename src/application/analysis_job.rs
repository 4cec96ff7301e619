// Analysis job - The five independent operations sharing one configuration
use crate::application::remote_sources::{ChartDataSource, NotificationSink, RepositorySource};
use crate::domain::chart::{count_by_year_and_category, CategorySeries};
use crate::domain::repository::{median_size, RepositoryRecord};
use crate::error::{AnalysisError, Result};
use crate::infrastructure::chart_renderer::render_chart;
use crate::infrastructure::config::{
    ChartSourceSettings, GithubSettings, JobConfig, NotifySettings, PlotSettings,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What `plot_data` produced.
#[derive(Debug, Clone)]
pub struct ChartOutcome {
    pub series: Vec<CategorySeries>,
    /// `None` when neither an explicit nor a default path was available
    pub saved_to: Option<PathBuf>,
}

pub struct AnalysisJob {
    config: JobConfig,
    repositories: Arc<dyn RepositorySource>,
    chart_data: Arc<dyn ChartDataSource>,
    notifier: Arc<dyn NotificationSink>,
    dataset: Option<Vec<RepositoryRecord>>,
    last_status: Option<u16>,
}

impl AnalysisJob {
    pub fn new(
        config: JobConfig,
        repositories: Arc<dyn RepositorySource>,
        chart_data: Arc<dyn ChartDataSource>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            config,
            repositories,
            chart_data,
            notifier,
            dataset: None,
            last_status: None,
        }
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    pub fn dataset(&self) -> Option<&[RepositoryRecord]> {
        self.dataset.as_deref()
    }

    /// Status code ntfy answered to the last notification attempt. `None` when that
    /// attempt never got a response.
    pub fn last_status(&self) -> Option<u16> {
        self.last_status
    }

    /// Fetch the configured user's repositories and keep them for `compute_statistic`.
    pub async fn load_data(&mut self) -> Result<usize> {
        let settings = GithubSettings::from_config(&self.config)?;

        let records = self
            .repositories
            .fetch_repositories(&settings)
            .await
            .inspect_err(|e| {
                tracing::error!("Could not load repositories for {}: {}", settings.user, e);
            })?;

        tracing::info!("Loaded {} repositories for {}", records.len(), settings.user);
        for record in &records {
            tracing::debug!(
                "Repository {} is {} KiB",
                record.name.as_deref().unwrap_or("<unnamed>"),
                record.size
            );
        }
        let count = records.len();
        self.dataset = Some(records);
        Ok(count)
    }

    /// Median repository size of the loaded dataset.
    pub fn compute_statistic(&self) -> Result<f64> {
        let dataset = self.dataset.as_ref().ok_or(AnalysisError::DatasetNotLoaded)?;
        let median = median_size(dataset).ok_or(AnalysisError::EmptyDataset)?;

        tracing::info!("Median repository size is {} KiB", median);
        Ok(median)
    }

    /// Fetch the chart dataset, count rows per year and category and save the figure.
    ///
    /// The figure goes to `save_path`, else to `default_save_path`. With neither, nothing
    /// is rendered and a warning is logged.
    pub async fn plot_data(&self, save_path: Option<&Path>) -> Result<ChartOutcome> {
        let plot = PlotSettings::from_config(&self.config)?;
        let source = ChartSourceSettings::from_config(&self.config)?;

        let records = self
            .chart_data
            .fetch_chart_records(&source)
            .await
            .inspect_err(|e| {
                tracing::error!("Could not load chart data from {}: {}", source.url, e);
            })?;

        let series = count_by_year_and_category(&records);

        let target = save_path
            .map(Path::to_path_buf)
            .or(plot.default_save_path);

        let Some(target) = target else {
            tracing::warn!(
                "No save path given and default_save_path is not configured; chart was not saved"
            );
            return Ok(ChartOutcome {
                series,
                saved_to: None,
            });
        };

        render_chart(&series, &plot.style, &target)?;
        tracing::info!("Saved chart to {}", target.display());

        Ok(ChartOutcome {
            series,
            saved_to: Some(target),
        })
    }

    /// Post `message` to the configured ntfy topic. Only a 200 answer counts as delivered.
    pub async fn notify_done(&mut self, message: &str) -> Result<()> {
        let settings = NotifySettings::from_config(&self.config)?;
        self.last_status = None;

        let status = self
            .notifier
            .send(&settings, message)
            .await
            .inspect_err(|e| {
                tracing::error!("Could not reach ntfy topic '{}': {}", settings.topic, e);
            })?;
        self.last_status = Some(status);

        if status != 200 {
            tracing::error!(
                "Notification to ntfy topic '{}' was rejected with status {}",
                settings.topic,
                status
            );
            return Err(AnalysisError::NotificationFailed {
                topic: settings.topic,
                status,
            });
        }

        tracing::info!("Notification delivered to ntfy topic '{}'", settings.topic);
        Ok(())
    }
}
