use crate::adapters::line_protocol;
use crate::config::InfluxConfig;
use crate::domain::model::DataPoint;
use crate::domain::ports::PointWriter;
use crate::utils::error::{ReporterError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Writes points through the InfluxDB 1.x `/write` endpoint.
pub struct InfluxClient {
    client: Client,
    write_url: Url,
}

impl InfluxClient {
    pub fn new(config: &InfluxConfig) -> Result<Self> {
        let base = format!("{}/write", config.base_url());
        let mut write_url =
            Url::parse(&base).map_err(|e| ReporterError::InvalidConfigValueError {
                field: "influx.host".to_string(),
                value: base.clone(),
                reason: format!("Invalid URL format: {}", e),
            })?;

        {
            let mut query = write_url.query_pairs_mut();
            query.append_pair("db", &config.database);
            query.append_pair("precision", "ms");
            if let Some(rp) = config.retention_policy.as_deref().filter(|rp| !rp.is_empty()) {
                query.append_pair("rp", rp);
            }
            query.append_pair("u", &config.username);
            query.append_pair("p", &config.password);
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms()))
            .build()?;

        Ok(Self { client, write_url })
    }

    /// Write URL with the password masked, for logs.
    pub fn redacted_url(&self) -> String {
        let mut url = self.write_url.clone();
        let pairs: Vec<(String, String)> = self
            .write_url
            .query_pairs()
            .map(|(k, v)| {
                let v = if k == "p" { "***".to_string() } else { v.into_owned() };
                (k.into_owned(), v)
            })
            .collect();
        url.query_pairs_mut().clear().extend_pairs(pairs);
        url.to_string()
    }
}

#[async_trait]
impl PointWriter for InfluxClient {
    async fn write_points(&self, points: &[DataPoint]) -> Result<()> {
        let body = line_protocol::encode_points(points)?;

        tracing::debug!("Writing {} point(s) to {}", points.len(), self.redacted_url());
        let response = self
            .client
            .post(self.write_url.clone())
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ReporterError::WriteError {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::FieldValue;
    use httpmock::prelude::*;

    fn config_for(server: &MockServer) -> InfluxConfig {
        InfluxConfig {
            host: server.host(),
            port: server.port(),
            database: "loadtest".to_string(),
            ..Default::default()
        }
    }

    fn point(rps: i64) -> DataPoint {
        let mut point = DataPoint::new("ccxp-load-test");
        point.fields.insert("rps".to_string(), FieldValue::Integer(rps));
        point
    }

    #[tokio::test]
    async fn test_write_posts_line_protocol() {
        let server = MockServer::start_async().await;
        let write_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/write")
                    .query_param("db", "loadtest")
                    .query_param("precision", "ms")
                    .query_param("u", "root")
                    .query_param("p", "root")
                    .body("ccxp-load-test rps=7i");
                then.status(204);
            })
            .await;

        let client = InfluxClient::new(&config_for(&server)).unwrap();
        client.write_points(&[point(7)]).await.unwrap();

        write_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_write_with_retention_policy_and_path() {
        let server = MockServer::start_async().await;
        let write_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/influx/write")
                    .query_param("rp", "two_weeks")
                    .query_param("u", "writer");
                then.status(204);
            })
            .await;

        let config = InfluxConfig {
            path: "/influx".to_string(),
            retention_policy: Some("two_weeks".to_string()),
            username: "writer".to_string(),
            ..config_for(&server)
        };
        let client = InfluxClient::new(&config).unwrap();
        client.write_points(&[point(1), point(2)]).await.unwrap();

        write_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_write_returns_status_and_body() {
        let server = MockServer::start_async().await;
        let write_mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/write");
                then.status(404).body(r#"{"error":"database not found: \"loadtest\""}"#);
            })
            .await;

        let client = InfluxClient::new(&config_for(&server)).unwrap();
        let err = client.write_points(&[point(1)]).await.unwrap_err();

        write_mock.assert_async().await;
        match err {
            ReporterError::WriteError { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("database not found"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_point_is_not_sent() {
        let server = MockServer::start_async().await;
        let write_mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/write");
                then.status(204);
            })
            .await;

        let client = InfluxClient::new(&config_for(&server)).unwrap();
        let result = client.write_points(&[DataPoint::new("ccxp-load-test")]).await;

        assert!(matches!(result, Err(ReporterError::ValidationError { .. })));
        write_mock.assert_hits_async(0).await;
    }

    #[test]
    fn test_redacted_url_masks_password() {
        let config = InfluxConfig {
            database: "loadtest".to_string(),
            password: "hunter2".to_string(),
            ..Default::default()
        };
        let client = InfluxClient::new(&config).unwrap();
        let url = client.redacted_url();

        assert!(url.starts_with("http://127.0.0.1:8086/write?db=loadtest"));
        assert!(!url.contains("hunter2"));
        assert!(url.contains("p=***") || url.contains("p=%2A%2A%2A"));
    }
}
