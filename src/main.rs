// Main entry point - Logging, configuration and dependency wiring
mod application;
mod domain;
mod error;
mod infrastructure;
mod presentation;

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;

use crate::application::analysis_job::AnalysisJob;
use crate::error::AnalysisError;
use crate::infrastructure::config::{ConfigLayout, HttpSettings, JobConfig};
use crate::infrastructure::csv_chart_source::CsvChartSource;
use crate::infrastructure::github_client::GithubClient;
use crate::infrastructure::http::build_client;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::ntfy_notifier::NtfyNotifier;
use crate::presentation::cli::{execute, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_logging(&cli.log_file)
        .with_context(|| format!("Failed to open log file {}", cli.log_file.display()))?;

    // Load configuration
    let layout = ConfigLayout {
        system: cli.system_config.clone(),
        user: cli.user_config.clone(),
    };
    let config = JobConfig::load(&layout, &cli.config)
        .with_context(|| format!("Failed to load configuration for {}", cli.config.display()))?;

    // Create adapters (infrastructure layer)
    let http = HttpSettings::from_config(&config)?;
    let client = build_client(&http)?;
    let github = Arc::new(GithubClient::new(client.clone(), http.timeout));
    let chart_data = Arc::new(CsvChartSource::new(client.clone(), http.timeout));
    let notifier = Arc::new(NtfyNotifier::new(client, http.timeout));

    // Create the job (application layer)
    let mut job = AnalysisJob::new(config, github, chart_data, notifier);

    let result = execute(&mut job, cli.command).await;
    if let Err(err) = &result {
        let transient = err.chain().any(|cause| {
            cause
                .downcast_ref::<AnalysisError>()
                .is_some_and(AnalysisError::is_retriable)
        });
        if transient {
            tracing::warn!("The failure looks transient; running the command again may succeed");
        }
    }
    result
}
