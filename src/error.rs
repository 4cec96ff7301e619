// Crate-wide error kinds
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("configuration file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("could not parse configuration file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: config::ConfigError,
    },

    #[error("invalid value for configuration key `{key}`: {source}")]
    InvalidConfigValue {
        key: String,
        #[source]
        source: config::ConfigError,
    },

    #[error("GitHub credentials not configured: missing {}", missing.join(", "))]
    MissingCredentials { missing: Vec<&'static str> },

    #[error("configuration key `{key}` is required to {operation}")]
    MissingConfigKey {
        key: &'static str,
        operation: &'static str,
    },

    #[error("repository data has not been loaded; call load_data first")]
    DatasetNotLoaded,

    #[error("cannot compute the median of an empty repository list")]
    EmptyDataset,

    #[error("request to {url} failed: {reason}")]
    RemoteFetch {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("could not build request for {url}: {reason}")]
    InvalidRequest { url: String, reason: String },

    #[error("unexpected response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },

    #[error("notification to ntfy topic `{topic}` failed with status {status}")]
    NotificationFailed { topic: String, status: u16 },

    #[error("could not render chart to {}: {reason}", path.display())]
    ChartRender { path: PathBuf, reason: String },
}

impl AnalysisError {
    /// Whether the caller may reasonably retry the failed operation.
    pub fn is_retriable(&self) -> bool {
        match self {
            AnalysisError::Timeout { .. } => true,
            AnalysisError::RemoteFetch { status, .. } => match status {
                Some(code) => *code >= 500,
                None => true,
            },
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
