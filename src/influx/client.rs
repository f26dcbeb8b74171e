use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Request timeout for store round-trips
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// InfluxDB-related errors
#[derive(Debug, Error)]
pub enum InfluxError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("InfluxDB API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed query response: {0}")]
    MalformedResponse(String),

    #[error("Point cannot be encoded: {0}")]
    Encoding(String),
}

/// JSON error body returned by the InfluxDB v2 API
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Thin HTTP client for the InfluxDB 2.x API
///
/// Speaks the two endpoints the job needs: `/api/v2/query` (Flux in,
/// annotated CSV out) and `/api/v2/write` (line protocol in). Authentication
/// is a token header; the organization rides along as a query parameter.
pub struct InfluxClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    org: String,
}

impl InfluxClient {
    /// Create a client for the given endpoint, token and organization
    pub fn new(url: &str, token: &str, org: &str) -> Result<Self, InfluxError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            org: org.to_string(),
        })
    }

    /// Run a Flux query and return the raw annotated-CSV response
    pub async fn query(&self, flux: &str) -> Result<String, InfluxError> {
        let url = format!("{}/api/v2/query", self.base_url);

        let body = serde_json::json!({
            "query": flux,
            "type": "flux",
            "dialect": {
                "header": true,
                "delimiter": ",",
                "annotations": ["group", "datatype", "default"],
            },
        });

        let response = self
            .http
            .post(&url)
            .query(&[("org", self.org.as_str())])
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/csv")
            .json(&body)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        Ok(response.text().await?)
    }

    /// Write line-protocol lines to a bucket at nanosecond precision
    pub async fn write(&self, bucket: &str, line_protocol: &str) -> Result<(), InfluxError> {
        let url = format!("{}/api/v2/write", self.base_url);

        let response = self
            .http
            .post(&url)
            .query(&[
                ("org", self.org.as_str()),
                ("bucket", bucket),
                ("precision", "ns"),
            ])
            .header("Authorization", format!("Token {}", self.token))
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(line_protocol.to_string())
            .send()
            .await?;

        Self::check_status(response).await?;
        Ok(())
    }

    /// Map a non-success status to an API error, decoding the JSON error body
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, InfluxError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiErrorBody>(&text) {
            Ok(body) if !body.message.is_empty() => {
                if body.code.is_empty() {
                    body.message
                } else {
                    format!("{}: {}", body.code, body.message)
                }
            }
            _ => text,
        };

        Err(InfluxError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore]
    async fn test_live_query() {
        // Requires a running InfluxDB instance - run manually with --ignored
        let (url, token, org) = match (
            std::env::var("INFLUXDB_URL"),
            std::env::var("INFLUXDB_TOKEN"),
            std::env::var("INFLUXDB_ORG"),
        ) {
            (Ok(url), Ok(token), Ok(org)) => (url, token, org),
            _ => return,
        };

        let client = InfluxClient::new(&url, &token, &org).unwrap();
        let result = client.query("buckets() |> limit(n: 1)").await;
        assert!(result.is_ok(), "query failed: {:?}", result.err());
    }
}
