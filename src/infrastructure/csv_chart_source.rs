// Chart dataset fetched as CSV over HTTP
use crate::application::remote_sources::ChartDataSource;
use crate::domain::chart::{parse_date, ChartRecord};
use crate::error::{AnalysisError, Result};
use crate::infrastructure::config::ChartSourceSettings;
use crate::infrastructure::http::{ensure_success, request_error};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CsvChartSource {
    client: Client,
    timeout: Duration,
}

impl CsvChartSource {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl ChartDataSource for CsvChartSource {
    async fn fetch_chart_records(
        &self,
        settings: &ChartSourceSettings,
    ) -> Result<Vec<ChartRecord>> {
        let url = settings.url.as_str();
        tracing::info!("Loading chart data from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| request_error(url, self.timeout, e))?;

        let body = ensure_success(url, response)
            .await?
            .text()
            .await
            .map_err(|e| request_error(url, self.timeout, e))?;

        parse_chart_csv(url, &body, settings)
    }
}

/// Parse CSV text into chart records using the configured column names.
///
/// Rows without a parseable date or a category are skipped and reported in one warning.
pub fn parse_chart_csv(
    url: &str,
    body: &str,
    settings: &ChartSourceSettings,
) -> Result<Vec<ChartRecord>> {
    let invalid = |reason: String| AnalysisError::InvalidResponse {
        url: url.to_string(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| invalid(format!("could not read CSV header: {}", e)))?
        .clone();

    let column_index = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
            .ok_or_else(|| invalid(format!("CSV has no `{}` column", name)))
    };
    let date_idx = column_index(settings.date_column.as_str())?;
    let category_idx = column_index(settings.category_column.as_str())?;
    let value_idx = column_index(settings.value_column.as_str())?;

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for row in reader.records() {
        let row = row.map_err(|e| invalid(format!("malformed CSV row: {}", e)))?;

        let date = row.get(date_idx).and_then(parse_date);
        let category = row.get(category_idx).map(str::trim).unwrap_or_default();

        match date {
            Some(date) if !category.is_empty() => {
                let has_value = row
                    .get(value_idx)
                    .map(|v| !v.trim().is_empty())
                    .unwrap_or(false);
                records.push(ChartRecord::new(date, category, has_value));
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::warn!(
            "Skipped {} rows from {} without a usable date or category",
            skipped,
            url
        );
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mockito::Server;

    const FIXTURE: &str = "\u{feff}EndDt_DtFin,MjCmdtyFr_PrdtPrncplFr,Region,NumHd_NmbTetes\n\
        2021-01-31,Hogs,East,1200\n\
        2021-02-28,Cattle,West,\n\
        not-a-date,Hogs,East,55\n\
        2022-01-31,Hogs,East,1300\n";

    fn settings(url: String) -> ChartSourceSettings {
        ChartSourceSettings {
            url,
            date_column: "EndDt_DtFin".to_string(),
            category_column: "MjCmdtyFr_PrdtPrncplFr".to_string(),
            value_column: "NumHd_NmbTetes".to_string(),
        }
    }

    #[test]
    fn test_parse_chart_csv() {
        let settings = settings("fixture".to_string());
        let records = parse_chart_csv("fixture", FIXTURE, &settings).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0],
            ChartRecord::new(NaiveDate::from_ymd_opt(2021, 1, 31).unwrap(), "Hogs", true)
        );
        assert!(!records[1].has_value);
        assert_eq!(records[2].category, "Hogs");
    }

    #[test]
    fn test_parse_chart_csv_missing_column() {
        let mut settings = settings("fixture".to_string());
        settings.category_column = "Species".to_string();

        let err = parse_chart_csv("fixture", FIXTURE, &settings).unwrap_err();
        match err {
            AnalysisError::InvalidResponse { reason, .. } => assert!(reason.contains("`Species`")),
            other => panic!("expected InvalidResponse, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_chart_records() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/slaughter.csv")
            .with_status(200)
            .with_header("content-type", "text/csv")
            .with_body(FIXTURE)
            .create_async()
            .await;

        let source = CsvChartSource::new(Client::new(), Duration::from_secs(5));
        let records = source
            .fetch_chart_records(&settings(format!("{}/slaughter.csv", server.url())))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(records.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_chart_records_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/slaughter.csv")
            .with_status(404)
            .create_async()
            .await;

        let source = CsvChartSource::new(Client::new(), Duration::from_secs(5));
        let err = source
            .fetch_chart_records(&settings(format!("{}/slaughter.csv", server.url())))
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::RemoteFetch { status: Some(404), .. }));
    }
}
