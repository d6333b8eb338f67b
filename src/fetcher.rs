//! # Content Fetcher Module
//!
//! Retrieves the rendered HTML of a candidate URL through a remote fetch
//! service. The service answers either with the page or with a structured
//! error payload; both are successful calls from the transport's point of
//! view and are told apart by [`FetchResult`].
//!
//! ## Key Components
//!
//! - `ContentFetcher`: the seam the pipeline depends on
//! - `ScrapingClient`: implementation for a ScrapingBee-style HTTP API
//! - `FetchResult`: the page, or the reason the service gave for not serving it

mod client;

pub use client::ScrapingClient;

use std::future::Future;

use crate::error::PipelineError;
use crate::validator::CandidateUrl;

/// Outcome of a fetch call that reached the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// Page HTML as returned by the service
    Html(String),

    /// The service reported that the page could not be served
    Error(String),
}

impl FetchResult {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The HTML, if the service returned a page
    pub fn html(&self) -> Option<&str> {
        match self {
            Self::Html(html) => Some(html),
            Self::Error(_) => None,
        }
    }
}

/// Something that can fetch the HTML of a candidate URL.
///
/// A transport-level failure is `Err(PipelineError::FetchFailure)`; a
/// service-reported refusal is `Ok(FetchResult::Error)`.
pub trait ContentFetcher {
    fn fetch(
        &self,
        url: &CandidateUrl,
    ) -> impl Future<Output = Result<FetchResult, PipelineError>> + Send;
}
