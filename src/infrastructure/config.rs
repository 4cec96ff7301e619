// Layered job configuration and the typed settings each operation reads from it
use crate::domain::chart::ChartStyle;
use crate::error::{AnalysisError, Result};
use config::{Config, ConfigError, File};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SYSTEM_CONFIG_PATH: &str = "configs/system_config.yml";
pub const USER_CONFIG_PATH: &str = "configs/user_config.yml";

const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
const DEFAULT_NTFY_URL: &str = "https://ntfy.sh";
const DEFAULT_NTFY_TITLE: &str = "Analysis complete";
const DEFAULT_CHART_DATA_URL: &str =
    "https://od-do.agr.gc.ca/MonthlyRedMeatSlaughter_AbattageAnimauxViandeRougeMensuelle.csv";
const DEFAULT_PLOT_TITLE: &str = "Amount of Inspection per Meat Type";
const DEFAULT_PLOT_COLOR: &str = "blue";
const DEFAULT_LEGEND_TITLE: &str = "Meat Type";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// Figure sizes are configured in inches
const PIXELS_PER_INCH: f64 = 100.0;
const DEFAULT_FIGURE_WIDTH: f64 = 6.4;
const DEFAULT_FIGURE_HEIGHT: f64 = 4.8;

/// Locations of the two fixed configuration files layered under every job file.
#[derive(Debug, Clone)]
pub struct ConfigLayout {
    pub system: PathBuf,
    pub user: PathBuf,
}

impl Default for ConfigLayout {
    fn default() -> Self {
        Self {
            system: PathBuf::from(SYSTEM_CONFIG_PATH),
            user: PathBuf::from(USER_CONFIG_PATH),
        }
    }
}

/// Merged key/value configuration: system defaults, then user overrides, then the job file.
#[derive(Debug, Clone)]
pub struct JobConfig {
    settings: Config,
}

impl JobConfig {
    /// Load `job_config` on top of the files named by `layout`.
    ///
    /// Every file must exist; existence is checked before anything is parsed so a typo in
    /// any path fails fast with [`AnalysisError::ConfigNotFound`].
    pub fn load(layout: &ConfigLayout, job_config: &Path) -> Result<Self> {
        let paths = [layout.system.as_path(), layout.user.as_path(), job_config];

        if let Some(missing) = paths.iter().find(|path| !path.exists()) {
            return Err(AnalysisError::ConfigNotFound {
                path: missing.to_path_buf(),
            });
        }

        let mut merged = Config::default();
        for path in paths {
            tracing::info!("Loading configuration from {}", path.display());
            merged = Config::builder()
                .add_source(merged)
                .add_source(File::from(path).required(true))
                .build()
                .map_err(|source| {
                    tracing::error!("Could not load configuration from {}", path.display());
                    AnalysisError::ConfigParse {
                        path: path.to_path_buf(),
                        source,
                    }
                })?;
        }

        Ok(Self { settings: merged })
    }

    #[cfg(test)]
    pub(crate) fn from_yaml(contents: &str) -> Self {
        let settings = Config::builder()
            .add_source(File::from_str(contents, config::FileFormat::Yaml))
            .build()
            .expect("test configuration should be valid YAML");
        Self { settings }
    }

    /// Typed lookup. Absent and null keys are `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.settings.get::<Option<T>>(key) {
            Ok(value) => Ok(value),
            Err(ConfigError::NotFound(_)) => Ok(None),
            Err(source) => Err(AnalysisError::InvalidConfigValue {
                key: key.to_string(),
                source,
            }),
        }
    }

    /// String lookup treating blank values as absent.
    pub fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .get::<String>(key)?
            .filter(|value| !value.trim().is_empty()))
    }

    pub fn require_string(&self, key: &'static str, operation: &'static str) -> Result<String> {
        self.get_string(key)?
            .ok_or(AnalysisError::MissingConfigKey { key, operation })
    }

    /// The merged mapping as JSON, for display.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        self.settings
            .clone()
            .try_deserialize::<serde_json::Value>()
            .map_err(|source| AnalysisError::InvalidConfigValue {
                key: "<root>".to_string(),
                source,
            })
    }
}

/// Identity and secret for the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GithubSettings {
    pub api_url: String,
    pub user: String,
    pub key: String,
}

impl GithubSettings {
    pub fn from_config(config: &JobConfig) -> Result<Self> {
        let user = config.get_string("github_user")?;
        let key = config.get_string("github_key")?;

        match (user, key) {
            (Some(user), Some(key)) => Ok(Self {
                api_url: base_url(config, "github_api_url", DEFAULT_GITHUB_API_URL)?,
                user,
                key,
            }),
            (user, key) => {
                let mut missing = Vec::new();
                if user.is_none() {
                    missing.push("github_user");
                }
                if key.is_none() {
                    missing.push("github_key");
                }
                Err(AnalysisError::MissingCredentials { missing })
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotifySettings {
    pub base_url: String,
    pub topic: String,
    pub title: String,
}

impl NotifySettings {
    pub fn from_config(config: &JobConfig) -> Result<Self> {
        Ok(Self {
            base_url: base_url(config, "ntfy_url", DEFAULT_NTFY_URL)?,
            topic: config.require_string("ntfy_topic", "send a notification")?,
            title: config
                .get_string("ntfy_title")?
                .unwrap_or_else(|| DEFAULT_NTFY_TITLE.to_string()),
        })
    }
}

/// Where the chart CSV lives and which of its columns to use.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSourceSettings {
    pub url: String,
    pub date_column: String,
    pub category_column: String,
    pub value_column: String,
}

impl ChartSourceSettings {
    pub fn from_config(config: &JobConfig) -> Result<Self> {
        let column = |key: &str, default: &str| -> Result<String> {
            Ok(config
                .get_string(key)?
                .unwrap_or_else(|| default.to_string()))
        };

        Ok(Self {
            url: column("chart_data_url", DEFAULT_CHART_DATA_URL)?,
            date_column: column("chart_date_column", "EndDt_DtFin")?,
            category_column: column("chart_category_column", "MjCmdtyFr_PrdtPrncplFr")?,
            value_column: column("chart_value_column", "NumHd_NmbTetes")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PlotSettings {
    pub style: ChartStyle,
    pub default_save_path: Option<PathBuf>,
}

impl PlotSettings {
    pub fn from_config(config: &JobConfig) -> Result<Self> {
        let x_title = config.require_string("plot_x_title", "plot the chart")?;
        let y_title = config.require_string("plot_y_title", "plot the chart")?;

        let width = config
            .get::<f64>("figure_width_size")?
            .unwrap_or(DEFAULT_FIGURE_WIDTH);
        let height = config
            .get::<f64>("figure_height_size")?
            .unwrap_or(DEFAULT_FIGURE_HEIGHT);

        Ok(Self {
            style: ChartStyle {
                title: config
                    .get_string("plot_title")?
                    .unwrap_or_else(|| DEFAULT_PLOT_TITLE.to_string()),
                x_title,
                y_title,
                background: config
                    .get_string("plot_color")?
                    .unwrap_or_else(|| DEFAULT_PLOT_COLOR.to_string()),
                legend_title: config
                    .get_string("plot_legend_title")?
                    .unwrap_or_else(|| DEFAULT_LEGEND_TITLE.to_string()),
                width_px: inches_to_pixels(width),
                height_px: inches_to_pixels(height),
            },
            default_save_path: config.get_string("default_save_path")?.map(PathBuf::from),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HttpSettings {
    pub timeout: Duration,
}

impl HttpSettings {
    pub fn from_config(config: &JobConfig) -> Result<Self> {
        let secs = config
            .get::<u64>("http_timeout_secs")?
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Ok(Self {
            timeout: Duration::from_secs(secs),
        })
    }
}

fn base_url(config: &JobConfig, key: &str, default: &str) -> Result<String> {
    let url = config
        .get_string(key)?
        .unwrap_or_else(|| default.to_string());
    Ok(url.trim_end_matches('/').to_string())
}

fn inches_to_pixels(inches: f64) -> u32 {
    (inches.max(1.0) * PIXELS_PER_INCH).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn layout(dir: &TempDir, system: &str, user: &str) -> ConfigLayout {
        ConfigLayout {
            system: write(dir, "system_config.yml", system),
            user: write(dir, "user_config.yml", user),
        }
    }

    #[test]
    fn test_missing_job_config() {
        let dir = TempDir::new().unwrap();
        let layout = layout(&dir, "plot_color: white\n", "plot_color: black\n");
        let missing = dir.path().join("nope.yml");

        let err = JobConfig::load(&layout, &missing).unwrap_err();
        assert!(matches!(err, AnalysisError::ConfigNotFound { path } if path == missing));
    }

    #[test]
    fn test_missing_fixed_config() {
        let dir = TempDir::new().unwrap();
        let job = write(&dir, "job.yml", "plot_color: red\n");
        let layout = ConfigLayout {
            system: dir.path().join("system_config.yml"),
            user: write(&dir, "user_config.yml", "plot_color: black\n"),
        };

        let err = JobConfig::load(&layout, &job).unwrap_err();
        assert!(matches!(err, AnalysisError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_later_sources_override_earlier() {
        let dir = TempDir::new().unwrap();
        let layout = layout(
            &dir,
            "plot_color: white\nplot_title: System title\n\
             ntfy_topic: system_topic\nfigure_width_size: 8\n",
            "plot_color: black\nntfy_topic: user_topic\n",
        );
        let job = write(&dir, "job.yml", "ntfy_topic: job_topic\n");

        let config = JobConfig::load(&layout, &job).unwrap();

        assert_eq!(config.get_string("ntfy_topic").unwrap().as_deref(), Some("job_topic"));
        assert_eq!(config.get_string("plot_color").unwrap().as_deref(), Some("black"));
        assert_eq!(
            config.get_string("plot_title").unwrap().as_deref(),
            Some("System title")
        );
        assert_eq!(config.get::<u32>("figure_width_size").unwrap(), Some(8));
        assert_eq!(config.get_string("default_save_path").unwrap(), None);
    }

    #[test]
    fn test_malformed_file_names_the_file() {
        let dir = TempDir::new().unwrap();
        let layout = layout(&dir, "plot_color: white\n", "plot_color: [unclosed\n");
        let job = write(&dir, "job.yml", "ntfy_topic: job_topic\n");

        let err = JobConfig::load(&layout, &job).unwrap_err();
        match err {
            AnalysisError::ConfigParse { path, .. } => assert_eq!(path, layout.user),
            other => panic!("expected ConfigParse, got {other:?}"),
        }
    }

    #[test]
    fn test_github_settings_report_missing_keys() {
        let config = JobConfig::from_yaml("github_user: alice\n");
        let err = GithubSettings::from_config(&config).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::MissingCredentials { ref missing } if missing == &vec!["github_key"]
        ));

        let config = JobConfig::from_yaml("github_user: alice\ngithub_key: xyz\n");
        let settings = GithubSettings::from_config(&config).unwrap();
        assert_eq!(settings.api_url, "https://api.github.com");
        assert_eq!(settings.user, "alice");
    }

    #[test]
    fn test_plot_settings_fallbacks() {
        let config = JobConfig::from_yaml(
            "plot_x_title: Years\nplot_y_title: Count\nplot_title: ''\n\
             figure_width_size: 8\nfigure_height_size: 10\n",
        );
        let settings = PlotSettings::from_config(&config).unwrap();

        assert_eq!(settings.style.title, DEFAULT_PLOT_TITLE);
        assert_eq!(settings.style.background, "blue");
        assert_eq!(settings.style.legend_title, "Meat Type");
        assert_eq!(settings.style.width_px, 800);
        assert_eq!(settings.style.height_px, 1000);
        assert_eq!(settings.default_save_path, None);
    }

    #[test]
    fn test_plot_settings_require_axis_titles() {
        let config = JobConfig::from_yaml("plot_x_title: Years\n");
        let err = PlotSettings::from_config(&config).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::MissingConfigKey { key: "plot_y_title", .. }
        ));
    }

    #[test]
    fn test_invalid_value_type() {
        let config = JobConfig::from_yaml("http_timeout_secs: soon\n");
        let err = HttpSettings::from_config(&config).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InvalidConfigValue { ref key, .. } if key == "http_timeout_secs"
        ));
    }

    #[test]
    fn test_to_json() {
        let config = JobConfig::from_yaml("ntfy_topic: reports\nfigure_width_size: 8\n");
        let json = config.to_json().unwrap();
        assert_eq!(json["ntfy_topic"], "reports");
        assert_eq!(json["figure_width_size"], 8);
    }
}
