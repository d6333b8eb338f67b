//! HTTP client shared by the collaborator clients
//!
//! Wraps a reqwest client with a fixed per-call timeout. JSON calls map
//! non-success statuses to crate errors; raw calls hand status and body back
//! so the caller can classify them itself.

use crate::error::{Error, Result};
use reqwest::{Client as ReqwestClient, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, instrument};
use url::Url;

/// Status and body of a response, before any interpretation
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

/// HTTP client used by the fetch and threat clients
#[derive(Clone)]
pub struct HttpClient {
    /// The underlying reqwest client
    client: ReqwestClient,
}

impl HttpClient {
    /// Create a client with the given per-call timeout and user agent
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(Error::Http)?;

        Ok(Self { client })
    }

    fn parse_endpoint(endpoint: &str) -> Result<Url> {
        Url::parse(endpoint).map_err(|e| Error::Other(format!("Invalid URL: {}", e)))
    }

    /// Send a GET request with query parameters and return the raw response
    #[instrument(skip(self, query), level = "debug")]
    pub async fn get_raw(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<RawResponse> {
        let url = Self::parse_endpoint(endpoint)?;
        let request = self.client.get(url).query(query);

        debug!("Sending GET request to {}", endpoint);
        let response = request.send().await.map_err(Error::Http)?;
        let status = response.status();
        let body = response.text().await.map_err(Error::Http)?;
        debug!(status = %status, bytes = body.len(), "GET response received");

        Ok(RawResponse { status, body })
    }

    /// Send a POST request with a JSON body and decode a JSON response
    #[instrument(skip(self, query, body), level = "debug")]
    pub async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<T> {
        let url = Self::parse_endpoint(endpoint)?;
        let request = self.client.post(url).query(query).json(body);

        debug!("Sending POST request to {}", endpoint);
        self.execute_request(request).await
    }

    /// Execute an HTTP request and handle the response
    async fn execute_request<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(Error::Http)?;

        let status = response.status();
        let response_text = response.text().await.map_err(Error::Http)?;

        if status.is_success() {
            serde_json::from_str(&response_text).map_err(|e| {
                error!("Failed to parse response: {}", e);
                Error::Json(e)
            })
        } else {
            error!("API error: {} - {}", status, response_text);
            Err(status_error(status, response_text))
        }
    }
}

/// Map a non-success status to a crate error
pub(crate) fn status_error(status: StatusCode, body: String) -> Error {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Error::Auth("Invalid API key or credentials".to_string())
        }
        _ => Error::Api {
            status_code: status.as_u16(),
            message: body,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct TestResponse {
        message: String,
    }

    fn client() -> HttpClient {
        HttpClient::new(Duration::from_secs(5), "linkscout-test").unwrap()
    }

    #[tokio::test]
    async fn test_get_raw_passes_query_and_keeps_status() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("GET", "/page")
            .match_query(Matcher::UrlEncoded("url".into(), "https://a.b/?x=1&y=2".into()))
            .with_status(404)
            .with_body("gone")
            .expect(1)
            .create_async()
            .await;

        let endpoint = format!("{}/page", server.url());
        let response = client()
            .get_raw(&endpoint, &[("url", "https://a.b/?x=1&y=2")])
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body, "gone");

        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_request_success() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("POST", "/test")
            .match_query(Matcher::UrlEncoded("key".into(), "k".into()))
            .match_body(Matcher::Json(serde_json::json!({"test": "data"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{\"message\": \"success\"}")
            .expect(1)
            .create_async()
            .await;

        let endpoint = format!("{}/test", server.url());
        let body = serde_json::json!({"test": "data"});
        let response: TestResponse = client()
            .post_json(&endpoint, &[("key", "k")], &body)
            .await
            .unwrap();
        assert_eq!(response.message, "success");

        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_handling() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("POST", "/test")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body("bad key")
            .create_async()
            .await;

        let endpoint = format!("{}/test", server.url());
        let result: Result<TestResponse> = client()
            .post_json(&endpoint, &[], &serde_json::json!({}))
            .await;
        assert!(matches!(result, Err(Error::Auth(_))));

        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_undecodable_body_is_json_error() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("POST", "/test")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let endpoint = format!("{}/test", server.url());
        let result: Result<TestResponse> = client()
            .post_json(&endpoint, &[], &serde_json::json!({}))
            .await;
        assert!(matches!(result, Err(Error::Json(_))));

        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalid_endpoint() {
        let result = client().get_raw("not an endpoint", &[]).await;
        assert!(matches!(result, Err(Error::Other(_))));
    }
}
