//! HTTP client for the Safe Browsing lookup API

use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::http::HttpClient;
use crate::threat::types::{FindThreatMatchesRequest, FindThreatMatchesResponse};
use crate::threat::{ThreatChecker, ThreatVerdict};
use crate::validator::CandidateUrl;

/// Client for `POST {endpoint}?key=..` threat lookups
#[derive(Clone)]
pub struct SafeBrowsingClient {
    http_client: HttpClient,
    endpoint: String,
    api_key: String,
    client_id: String,
    client_version: String,
}

impl SafeBrowsingClient {
    /// Create a client from the threat settings of a configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let http_client = HttpClient::new(config.timeout(), &config.user_agent)?;
        Ok(Self {
            http_client,
            endpoint: config.threat_endpoint.clone(),
            api_key: config.threat_api_key.clone(),
            client_id: config.client_id.clone(),
            client_version: config.client_version.clone(),
        })
    }

    /// Send the raw lookup request for a URL
    pub async fn find_matches(&self, url: &str) -> Result<FindThreatMatchesResponse> {
        let body = FindThreatMatchesRequest::for_url(&self.client_id, &self.client_version, url);
        self.http_client
            .post_json(&self.endpoint, &[("key", self.api_key.as_str())], &body)
            .await
    }
}

impl ThreatChecker for SafeBrowsingClient {
    #[instrument(skip(self), fields(url = %url), level = "debug")]
    async fn check(&self, url: &CandidateUrl) -> std::result::Result<ThreatVerdict, PipelineError> {
        let response = self.find_matches(url.as_str()).await.map_err(|e| {
            warn!(error = %e, "threat service call failed");
            PipelineError::ThreatServiceFailure(e.to_string())
        })?;

        let matches = response.into_matches();
        debug!(matches = matches.len(), "threat lookup finished");
        Ok(ThreatVerdict::from_matches(matches))
    }
}
