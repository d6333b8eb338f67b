//! HTTP client for the page fetch service

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::{Error, PipelineError, Result};
use crate::fetcher::{ContentFetcher, FetchResult};
use crate::http::{HttpClient, status_error};
use crate::validator::CandidateUrl;

/// Client for a fetch service queried as `GET {endpoint}?api_key=..&url=..`
#[derive(Clone)]
pub struct ScrapingClient {
    http_client: HttpClient,
    endpoint: String,
    api_key: String,
}

impl ScrapingClient {
    /// Create a client from the fetch settings of a configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let http_client = HttpClient::new(config.timeout(), &config.user_agent)?;
        Ok(Self::new(
            http_client,
            config.fetch_endpoint.clone(),
            config.fetch_api_key.clone(),
        ))
    }

    pub fn new(http_client: HttpClient, endpoint: String, api_key: String) -> Self {
        Self {
            http_client,
            endpoint,
            api_key,
        }
    }
}

impl ContentFetcher for ScrapingClient {
    #[instrument(skip(self), fields(url = %url), level = "debug")]
    async fn fetch(&self, url: &CandidateUrl) -> std::result::Result<FetchResult, PipelineError> {
        let response = self
            .http_client
            .get_raw(
                &self.endpoint,
                &[("api_key", self.api_key.as_str()), ("url", url.as_str())],
            )
            .await
            .map_err(|e| {
                warn!(error = %e, "fetch service call failed");
                PipelineError::FetchFailure(e.to_string())
            })?;

        if !response.status.is_success() {
            let err = status_error(response.status, response.body);
            if let Error::Auth(_) = err {
                warn!(status = %response.status, "fetch service rejected credentials");
                return Err(PipelineError::FetchFailure(err.to_string()));
            }
            debug!(status = %response.status, "fetch service refused the page");
            return Ok(FetchResult::Error(err.to_string()));
        }

        if let Some(reason) = reported_error(&response.body) {
            debug!(%reason, "fetch service reported an error payload");
            return Ok(FetchResult::Error(reason));
        }

        Ok(FetchResult::Html(response.body))
    }
}

/// Reason carried by an `{"is_error": true, ...}` payload, if the body is one
fn reported_error(body: &str) -> Option<String> {
    let trimmed = body.trim_start();
    if !trimmed.starts_with('{') {
        return None;
    }

    let payload: Value = serde_json::from_str(trimmed).ok()?;
    if !payload.get("is_error").is_some_and(is_truthy) {
        return None;
    }

    let reason = ["message", "reason", "error"]
        .iter()
        .find_map(|field| payload.get(*field).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| "fetch service reported an error".to_string());
    Some(reason)
}

// Some fetch services send the flag as the string "true"
fn is_truthy(flag: &Value) -> bool {
    match flag {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::validate;
    use mockito::{Matcher, Server};

    fn client_for(server: &Server) -> ScrapingClient {
        let config = Config::builder()
            .fetch_endpoint(format!("{}/api/v1/", server.url()))
            .fetch_api_key("fetch-key")
            .timeout_secs(5)
            .build();
        ScrapingClient::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_html() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("GET", "/api/v1/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("api_key".into(), "fetch-key".into()),
                Matcher::UrlEncoded("url".into(), "https://example.com/a%20b?c=d&e=f".into()),
            ]))
            .with_status(200)
            .with_body("<html><title>T</title></html>")
            .expect(1)
            .create_async()
            .await;

        let url = validate("https://example.com/a%20b?c=d&e=f").unwrap();
        let result = client_for(&server).fetch(&url).await.unwrap();
        assert_eq!(result, FetchResult::Html("<html><title>T</title></html>".to_string()));

        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_is_error_payload() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("GET", "/api/v1/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"is_error": true, "message": "target blocked"}"#)
            .create_async()
            .await;

        let url = validate("https://example.com").unwrap();
        let result = client_for(&server).fetch(&url).await.unwrap();
        assert_eq!(result, FetchResult::Error("target blocked".to_string()));

        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_reported_error() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("GET", "/api/v1/")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("upstream unreachable")
            .create_async()
            .await;

        let url = validate("https://example.com").unwrap();
        let result = client_for(&server).fetch(&url).await.unwrap();
        assert!(result.is_error());

        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_bad_credentials_are_a_fetch_failure() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("GET", "/api/v1/")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"message": "Invalid api key"}"#)
            .create_async()
            .await;

        let url = validate("https://example.com").unwrap();
        let result = client_for(&server).fetch(&url).await;
        assert!(matches!(result, Err(PipelineError::FetchFailure(_))));

        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let config = Config::builder()
            .fetch_endpoint("http://127.0.0.1:1/api/v1/")
            .timeout_secs(2)
            .build();
        let client = ScrapingClient::from_config(&config).unwrap();

        let url = validate("https://example.com").unwrap();
        let result = client.fetch(&url).await;
        assert!(matches!(result, Err(PipelineError::FetchFailure(_))));
    }

    #[tokio::test]
    async fn test_timeout_is_a_fetch_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold connections without ever answering
        let silent = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let config = Config::builder()
            .fetch_endpoint(format!("http://{addr}/api/v1/"))
            .timeout_secs(1)
            .build();
        let client = ScrapingClient::from_config(&config).unwrap();

        let url = validate("https://example.com").unwrap();
        let started = std::time::Instant::now();
        let result = client.fetch(&url).await;
        assert!(matches!(result, Err(PipelineError::FetchFailure(_))));
        assert!(started.elapsed() < std::time::Duration::from_secs(10));

        silent.abort();
    }

    #[test]
    fn test_reported_error_detection() {
        assert_eq!(reported_error("<html></html>"), None);
        assert_eq!(reported_error(r#"{"is_error": false}"#), None);
        assert_eq!(reported_error(r#"{"title": "json page"}"#), None);
        assert_eq!(
            reported_error(r#"{"is_error": true}"#).as_deref(),
            Some("fetch service reported an error")
        );
        assert_eq!(
            reported_error(r#"  {"is_error": true, "reason": "captcha"}"#).as_deref(),
            Some("captcha")
        );
        assert_eq!(
            reported_error(r#"{"is_error": "true", "message": "blocked"}"#).as_deref(),
            Some("blocked")
        );
        assert!(reported_error(r#"{"is_error": "TRUE"}"#).is_some());
        assert_eq!(reported_error(r#"{"is_error": "false"}"#), None);
        assert_eq!(reported_error(r#"{"is_error": 1}"#), None);
    }
}
