//! Result of one pipeline run

use serde::{Serialize, Serializer};

use crate::error::{ErrorKind, PipelineError};
use crate::metadata::SiteMetadata;
use crate::pipeline::{PipelineState, RunToken};

/// Outcome of one run: metadata or an error, never both
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    /// Token of the submission that produced this result
    pub token: RunToken,

    /// The input string as submitted
    pub input: String,

    pub outcome: Result<SiteMetadata, PipelineError>,
}

impl PipelineResult {
    pub fn metadata(&self) -> Option<&SiteMetadata> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&PipelineError> {
        self.outcome.as_ref().err()
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Validation failures go back to `Idle`; everything else ends in `Done`
    pub fn final_state(&self) -> PipelineState {
        match &self.outcome {
            Err(err) if err.is_local() => PipelineState::Idle,
            outcome => PipelineState::Done {
                success: outcome.is_ok(),
            },
        }
    }
}

#[derive(Serialize)]
struct ErrorView {
    kind: ErrorKind,
    message: String,
}

#[derive(Serialize)]
struct ResultView<'a> {
    url: &'a str,
    error: Option<ErrorView>,
    metadata: Option<&'a SiteMetadata>,
}

impl Serialize for PipelineResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ResultView {
            url: &self.input,
            error: self.error().map(|err| ErrorView {
                kind: err.kind(),
                message: err.to_string(),
            }),
            metadata: self.metadata(),
        }
        .serialize(serializer)
    }
}
