// Push notifications through an ntfy server
use crate::application::remote_sources::NotificationSink;
use crate::error::Result;
use crate::infrastructure::config::NotifySettings;
use crate::infrastructure::http::request_error;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct NtfyNotifier {
    client: Client,
    timeout: Duration,
}

impl NtfyNotifier {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl NotificationSink for NtfyNotifier {
    async fn send(&self, settings: &NotifySettings, message: &str) -> Result<u16> {
        let url = format!(
            "{}/{}",
            settings.base_url,
            urlencoding::encode(&settings.topic)
        );
        tracing::info!("Sending notification to ntfy topic '{}'", settings.topic);

        let response = self
            .client
            .post(&url)
            .header("Title", settings.title.as_str())
            .body(message.as_bytes().to_vec())
            .send()
            .await
            .map_err(|e| request_error(&url, self.timeout, e))?;

        Ok(response.status().as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn settings(base_url: String) -> NotifySettings {
        NotifySettings {
            base_url,
            topic: "weekly_report".to_string(),
            title: "Analysis finished".to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_posts_body_and_title() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/weekly_report")
            .match_header("title", "Analysis finished")
            .match_body("Median repository size: 5 KiB")
            .with_status(200)
            .create_async()
            .await;

        let notifier = NtfyNotifier::new(Client::new(), Duration::from_secs(5));
        let status = notifier
            .send(&settings(server.url()), "Median repository size: 5 KiB")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(status, 200);
    }

    #[tokio::test]
    async fn test_send_returns_error_status() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/weekly_report")
            .with_status(429)
            .create_async()
            .await;

        let notifier = NtfyNotifier::new(Client::new(), Duration::from_secs(5));
        let status = notifier.send(&settings(server.url()), "hello").await.unwrap();

        assert_eq!(status, 429);
    }
}
