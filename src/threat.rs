//! # Threat Checker Module
//!
//! Asks a threat-intelligence service whether a candidate URL is known to be
//! malicious. The verdict is binary: any match at all makes the URL
//! `Malicious`.
//!
//! ## Key Components
//!
//! - `ThreatChecker`: the seam the pipeline depends on
//! - `SafeBrowsingClient`: implementation for the Safe Browsing v4 lookup API
//! - `ThreatVerdict`: `Clean`, or `Malicious` with the non-empty match list

mod client;
pub mod types;

pub use client::SafeBrowsingClient;
pub use types::ThreatMatch;

use std::future::Future;

use crate::error::PipelineError;
use crate::validator::CandidateUrl;

/// Safety classification of a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreatVerdict {
    Clean,

    /// Never constructed with an empty list, see [`ThreatVerdict::from_matches`]
    Malicious(Vec<ThreatMatch>),
}

impl ThreatVerdict {
    /// `Malicious` if and only if `matches` is non-empty
    pub fn from_matches(matches: Vec<ThreatMatch>) -> Self {
        if matches.is_empty() {
            Self::Clean
        } else {
            Self::Malicious(matches)
        }
    }

    pub fn is_malicious(&self) -> bool {
        matches!(self, Self::Malicious(_))
    }
}

/// Something that can classify a candidate URL.
///
/// Transport or decoding failures are `Err(PipelineError::ThreatServiceFailure)`.
pub trait ThreatChecker {
    fn check(
        &self,
        url: &CandidateUrl,
    ) -> impl Future<Output = Result<ThreatVerdict, PipelineError>> + Send;
}
