// Command line interface
use crate::application::analysis_job::AnalysisJob;
use crate::infrastructure::config::{SYSTEM_CONFIG_PATH, USER_CONFIG_PATH};
use crate::infrastructure::logging::DEFAULT_LOG_FILE;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "repo-analysis")]
#[command(
    about = "Repository size statistics, an open-data chart and a push notification",
    long_about = None
)]
pub struct Cli {
    /// Job-specific configuration file, layered over the system and user files
    #[arg(short, long, env = "ANALYSIS_CONFIG", default_value = "configs/job_config.yml")]
    pub config: PathBuf,

    /// System-wide configuration file
    #[arg(long, default_value = SYSTEM_CONFIG_PATH)]
    pub system_config: PathBuf,

    /// User configuration file
    #[arg(long, default_value = USER_CONFIG_PATH)]
    pub user_config: PathBuf,

    /// File that receives a copy of every log line
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the merged configuration as JSON
    ShowConfig,

    /// Fetch the GitHub repositories and print their median size
    Median,

    /// Render the chart
    Plot {
        /// Where to save the chart; defaults to `default_save_path`
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Send a push notification
    Notify {
        /// Notification text
        message: String,
    },

    /// Median and chart, then a notification summarising both
    Run {
        /// Where to save the chart; defaults to `default_save_path`
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Notification text; defaults to a summary of the run
        #[arg(short, long)]
        message: Option<String>,
    },
}

pub async fn execute(job: &mut AnalysisJob, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::ShowConfig => {
            let merged = job.config().to_json()?;
            println!("{}", serde_json::to_string_pretty(&merged)?);
        }
        Commands::Median => {
            let median = median(job).await?;
            let count = job.dataset().map_or(0, |d| d.len());
            println!("Median repository size over {} repositories: {} KiB", count, median);
        }
        Commands::Plot { output } => {
            let outcome = job
                .plot_data(output.as_deref())
                .await
                .context("Failed to plot chart")?;
            println!("Chart has {} categories", outcome.series.len());
            match outcome.saved_to {
                Some(path) => println!("Chart saved to {}", path.display()),
                None => println!("Chart was not saved: no output path available"),
            }
        }
        Commands::Notify { message } => {
            job.notify_done(&message)
                .await
                .context("Failed to send notification")?;
            println!("Notification delivered");
        }
        Commands::Run { output, message } => {
            let median = median(job).await?;
            println!("Median repository size: {} KiB", median);

            let outcome = job
                .plot_data(output.as_deref())
                .await
                .context("Failed to plot chart")?;
            let chart = match &outcome.saved_to {
                Some(path) => format!("chart saved to {}", path.display()),
                None => "chart not saved".to_string(),
            };
            println!("{}", chart);

            let message = message.unwrap_or_else(|| {
                format!("Analysis finished: median repository size {} KiB, {}", median, chart)
            });
            job.notify_done(&message)
                .await
                .context("Failed to send notification")?;
            println!("Notification delivered");
        }
    }

    Ok(())
}

async fn median(job: &mut AnalysisJob) -> anyhow::Result<f64> {
    job.load_data()
        .await
        .context("Failed to load repositories from GitHub")?;
    let median = job
        .compute_statistic()
        .context("Failed to compute median repository size")?;
    Ok(median)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["repo-analysis", "median"]).unwrap();
        assert_eq!(cli.system_config, PathBuf::from("configs/system_config.yml"));
        assert_eq!(cli.user_config, PathBuf::from("configs/user_config.yml"));
        assert_eq!(cli.log_file, PathBuf::from("analysis.log"));
        assert!(matches!(cli.command, Commands::Median));
    }

    #[test]
    fn test_parse_plot_and_run() {
        let cli = Cli::try_parse_from([
            "repo-analysis",
            "--config",
            "configs/weekly.yml",
            "plot",
            "--output",
            "chart.svg",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("configs/weekly.yml"));
        assert!(matches!(
            cli.command,
            Commands::Plot { output: Some(ref p) } if p == &PathBuf::from("chart.svg")
        ));

        let cli = Cli::try_parse_from(["repo-analysis", "run", "-m", "done"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Run { output: None, message: Some(ref m) } if m == "done"
        ));
    }

    #[test]
    fn test_notify_requires_message() {
        assert!(Cli::try_parse_from(["repo-analysis", "notify"]).is_err());
    }
}
