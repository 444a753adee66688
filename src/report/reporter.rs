/*!
Collector delivery

Single-shot POST of an encoded topology report to the collector endpoint.
A lost report is normal operating behavior: failures are surfaced to the
caller for logging and then dropped, never retried within the tick.
*/

use crate::config::BridgeConfig;
use crate::error::{BridgeError, ReportError, Result};
use tracing::{debug, instrument};

/// HTTP reporter for topology snapshots
#[derive(Debug)]
pub struct Reporter {
    client: reqwest::Client,
    collector_url: String,
}

impl Reporter {
    /// Build a reporter from the bridge configuration. The configured
    /// request timeout bounds the whole call (DNS, connect, response) so a
    /// hung collector cannot hang the bridge.
    pub fn new(config: &BridgeConfig) -> Result<Self> {
        reqwest::Url::parse(&config.collector_url)
            .map_err(|e| ReportError::InvalidUrl(format!("{}: {}", config.collector_url, e)))?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| BridgeError::Report(ReportError::Transport(e)))?;

        Ok(Self {
            client,
            collector_url: config.collector_url.clone(),
        })
    }

    /// POST one report body to the collector. The response body is not
    /// interpreted; a non-2xx status counts as a failed delivery.
    #[instrument(skip(self, body), fields(url = %self.collector_url))]
    pub async fn send(&self, body: String) -> Result<()> {
        debug!(bytes = body.len(), "sending topology report");

        let response = self
            .client
            .post(&self.collector_url)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(body)
            .send()
            .await
            .map_err(ReportError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::CollectorStatus {
                status: status.as_u16(),
            }
            .into());
        }

        debug!(status = status.as_u16(), "topology report delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;
    use std::time::Duration;

    fn config_for(url: &str) -> BridgeConfig {
        BridgeConfig::builder()
            .collector_url(url)
            .request_timeout(Duration::from_secs(2))
            .build()
            .unwrap()
    }

    #[test]
    fn test_invalid_url_rejected() {
        let mut config = BridgeConfig::default();
        config.collector_url = "http://".to_string();
        assert!(Reporter::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_send_posts_form_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/gateway")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body("masterNodeId=0&masterAddress=00&nodeList=")
            .with_status(200)
            .create_async()
            .await;

        let reporter = Reporter::new(&config_for(&format!("{}/api/gateway", server.url()))).unwrap();
        let result = reporter
            .send("masterNodeId=0&masterAddress=00&nodeList=".to_string())
            .await;

        assert!(result.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_collector_error_status_is_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/gateway")
            .with_status(503)
            .create_async()
            .await;

        let reporter = Reporter::new(&config_for(&format!("{}/api/gateway", server.url()))).unwrap();
        let err = reporter.send("masterNodeId=0".to_string()).await.unwrap_err();

        assert_eq!(err.category(), "report");
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_transport_failure_is_failure_not_panic() {
        // Unroutable per RFC 5737
        let reporter = Reporter::new(&config_for("http://192.0.2.1:9/api/gateway")).unwrap();
        let err = reporter.send("masterNodeId=0".to_string()).await.unwrap_err();
        assert!(err.is_retryable());
    }
}
