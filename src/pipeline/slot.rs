//! Run tokens and the displayed-result slot
//!
//! Every submission gets a fresh [`RunToken`]. Runs are never cancelled, so
//! an older run can finish after a newer one; the slot only accepts the
//! result whose token is the latest one issued.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::pipeline::PipelineResult;

/// Generation number of a pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunToken(u64);

impl RunToken {
    pub fn new(generation: u64) -> Self {
        Self(generation)
    }

    pub fn generation(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RunToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run#{}", self.0)
    }
}

#[derive(Debug, Default)]
struct SlotInner {
    issued: AtomicU64,
    current: Mutex<Option<PipelineResult>>,
}

/// The single "currently displayed" result, shared between runs
#[derive(Debug, Clone, Default)]
pub struct ResultSlot {
    inner: Arc<SlotInner>,
}

impl ResultSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the token for a new submission; it supersedes all earlier ones
    pub fn issue(&self) -> RunToken {
        RunToken(self.inner.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// The most recently issued token
    pub fn latest(&self) -> RunToken {
        RunToken(self.inner.issued.load(Ordering::SeqCst))
    }

    /// Store `result` if it belongs to the latest submission.
    ///
    /// Returns `false` and leaves the slot untouched for stale results.
    pub async fn apply(&self, result: PipelineResult) -> bool {
        let mut current = self.inner.current.lock().await;
        let latest = self.latest();
        if result.token != latest {
            debug!(token = %result.token, latest = %latest, "discarding stale pipeline result");
            return false;
        }
        *current = Some(result);
        true
    }

    /// A copy of the displayed result
    pub async fn current(&self) -> Option<PipelineResult> {
        self.inner.current.lock().await.clone()
    }
}
