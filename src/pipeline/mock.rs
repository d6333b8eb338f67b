//! # Mock Collaborators for Testing
//!
//! In-process `ContentFetcher` and `ThreatChecker` implementations that
//! return a preset answer, count their calls, and can be slowed down to
//! simulate overlapping runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::PipelineError;
use crate::fetcher::{ContentFetcher, FetchResult};
use crate::threat::{ThreatChecker, ThreatMatch, ThreatVerdict};
use crate::validator::CandidateUrl;

/// A fetcher that always returns the same answer
#[derive(Debug, Clone)]
pub struct MockFetcher {
    response: Result<FetchResult, PipelineError>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl MockFetcher {
    pub fn html(html: &str) -> Self {
        Self::with_response(Ok(FetchResult::Html(html.to_string())))
    }

    pub fn reported_error(reason: &str) -> Self {
        Self::with_response(Ok(FetchResult::Error(reason.to_string())))
    }

    pub fn transport_failure() -> Self {
        Self::with_response(Err(PipelineError::FetchFailure(
            "connection refused".to_string(),
        )))
    }

    fn with_response(response: Result<FetchResult, PipelineError>) -> Self {
        Self {
            response,
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Sleep before answering
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ContentFetcher for MockFetcher {
    async fn fetch(&self, _url: &CandidateUrl) -> Result<FetchResult, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.response.clone()
    }
}

/// A threat checker that always returns the same answer
#[derive(Debug, Clone)]
pub struct MockChecker {
    response: Result<ThreatVerdict, PipelineError>,
    calls: Arc<AtomicUsize>,
}

impl MockChecker {
    pub fn clean() -> Self {
        Self::with_response(Ok(ThreatVerdict::Clean))
    }

    pub fn malicious() -> Self {
        Self::with_response(Ok(ThreatVerdict::Malicious(vec![ThreatMatch {
            threat_type: "MALWARE".to_string(),
            platform_type: "ANY_PLATFORM".to_string(),
            threat_entry_type: "URL".to_string(),
            threat: None,
            cache_duration: None,
        }])))
    }

    pub fn unreachable() -> Self {
        Self::with_response(Err(PipelineError::ThreatServiceFailure(
            "network unreachable".to_string(),
        )))
    }

    fn with_response(response: Result<ThreatVerdict, PipelineError>) -> Self {
        Self {
            response,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ThreatChecker for MockChecker {
    async fn check(&self, _url: &CandidateUrl) -> Result<ThreatVerdict, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}
