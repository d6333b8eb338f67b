//! # Pipeline Orchestrator Module
//!
//! Sequences one "is this link safe, and what is it?" run:
//!
//! ```text
//! Idle -> Validating -> Fetching -> Checking -> Extracting -> Done
//! ```
//!
//! Validation failures go straight back to `Idle` without touching the
//! network. A valid URL is fetched first and then checked against the threat
//! service. If the fetch service reported an error or the threat service
//! found a match, the run ends with `MaliciousUrl`; the two causes are not
//! told apart. Otherwise the fetched HTML is turned into [`SiteMetadata`].
//!
//! Runs are independent and never cancelled. Each one carries a
//! [`RunToken`], and a [`ResultSlot`] keeps only the result of the newest
//! submission.

mod result;
mod slot;

#[cfg(test)]
pub(crate) mod mock;

pub use result::PipelineResult;
pub use slot::{ResultSlot, RunToken};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::error::{Error, PipelineError, Result};
use crate::fetcher::{ContentFetcher, FetchResult, ScrapingClient};
use crate::metadata::{SiteMetadata, extract_metadata};
use crate::threat::{SafeBrowsingClient, ThreatChecker, ThreatVerdict};
use crate::validator::validate;

/// Whether the threat lookup still runs after the fetch service refused a page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckPolicy {
    /// Always issue both calls
    #[default]
    Eager,

    /// Skip the threat lookup once the fetch result is already an error
    ShortCircuit,
}

impl fmt::Display for CheckPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eager => f.write_str("eager"),
            Self::ShortCircuit => f.write_str("short-circuit"),
        }
    }
}

impl FromStr for CheckPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "eager" => Ok(Self::Eager),
            "short-circuit" => Ok(Self::ShortCircuit),
            other => Err(Error::Config(format!("unknown check policy '{other}'"))),
        }
    }
}

/// Stage a run is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Validating,
    Fetching,
    Checking,
    Extracting,
    Done { success: bool },
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Validating => f.write_str("validating"),
            Self::Fetching => f.write_str("fetching page"),
            Self::Checking => f.write_str("checking threat lists"),
            Self::Extracting => f.write_str("extracting metadata"),
            Self::Done { success: true } => f.write_str("done"),
            Self::Done { success: false } => f.write_str("failed"),
        }
    }
}

/// A state transition of one run, sent on the progress channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateUpdate {
    pub token: RunToken,
    pub state: PipelineState,
}

/// Validation, fetch, threat check and extraction over two collaborators
#[derive(Debug, Clone)]
pub struct Pipeline<F, T> {
    fetcher: F,
    checker: T,
    policy: CheckPolicy,
}

impl Pipeline<ScrapingClient, SafeBrowsingClient> {
    /// Build a pipeline talking to the HTTP collaborators in `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            ScrapingClient::from_config(config)?,
            SafeBrowsingClient::from_config(config)?,
            config.check_policy,
        ))
    }
}

impl<F, T> Pipeline<F, T>
where
    F: ContentFetcher,
    T: ThreatChecker,
{
    pub fn new(fetcher: F, checker: T, policy: CheckPolicy) -> Self {
        Self {
            fetcher,
            checker,
            policy,
        }
    }

    pub fn policy(&self) -> CheckPolicy {
        self.policy
    }

    /// Start a new submission against `slot`.
    ///
    /// The returned token supersedes every token issued before it, so results
    /// of runs still in flight will no longer be shown.
    pub fn begin(&self, slot: &ResultSlot) -> RunToken {
        let token = slot.issue();
        debug!(%token, "submission started");
        token
    }

    /// Run the pipeline for one submission
    pub async fn run(&self, token: RunToken, input: &str) -> PipelineResult {
        self.run_with_progress(token, input, None).await
    }

    /// Run the pipeline, reporting every state change on `progress`
    #[instrument(skip(self, progress), fields(policy = %self.policy))]
    pub async fn run_with_progress(
        &self,
        token: RunToken,
        input: &str,
        progress: Option<mpsc::Sender<StateUpdate>>,
    ) -> PipelineResult {
        let reporter = Reporter { token, progress };
        let outcome = self.execute(input, &reporter).await;

        let result = PipelineResult {
            token,
            input: input.to_string(),
            outcome,
        };

        match &result.outcome {
            Ok(_) => info!(%token, "pipeline run succeeded"),
            Err(err) => info!(%token, kind = ?err.kind(), "pipeline run failed: {}", err),
        }
        reporter.enter(result.final_state()).await;

        result
    }

    async fn execute(
        &self,
        input: &str,
        reporter: &Reporter,
    ) -> std::result::Result<SiteMetadata, PipelineError> {
        reporter.enter(PipelineState::Validating).await;
        let url = validate(input)?;
        debug!(host = ?url.host(), "input accepted");

        reporter.enter(PipelineState::Fetching).await;
        let fetched = self.fetcher.fetch(&url).await?;

        if fetched.is_error() && self.policy == CheckPolicy::ShortCircuit {
            warn!("fetch service refused the page, skipping threat lookup");
            return Err(PipelineError::MaliciousUrl);
        }

        reporter.enter(PipelineState::Checking).await;
        let verdict = self.checker.check(&url).await?;

        let html = match (fetched, verdict) {
            (FetchResult::Html(html), ThreatVerdict::Clean) => html,
            (fetched, verdict) => {
                let threat_matches = match &verdict {
                    ThreatVerdict::Malicious(matches) => matches.len(),
                    ThreatVerdict::Clean => 0,
                };
                warn!(
                    fetch_refused = fetched.is_error(),
                    threat_matches, "url rejected"
                );
                return Err(PipelineError::MaliciousUrl);
            }
        };

        reporter.enter(PipelineState::Extracting).await;
        Ok(extract_metadata(&html))
    }
}

struct Reporter {
    token: RunToken,
    progress: Option<mpsc::Sender<StateUpdate>>,
}

impl Reporter {
    async fn enter(&self, state: PipelineState) {
        debug!(token = %self.token, %state, "pipeline state");
        if let Some(progress) = &self.progress {
            // A dropped receiver only means nobody is watching.
            let _ = progress
                .send(StateUpdate {
                    token: self.token,
                    state,
                })
                .await;
        }
    }
}
