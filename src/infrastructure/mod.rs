// Infrastructure layer - External dependencies and adapters
pub mod chart_renderer;
pub mod config;
pub mod csv_chart_source;
pub mod github_client;
pub mod http;
pub mod logging;
pub mod ntfy_notifier;
