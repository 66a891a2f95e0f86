//! Trial outcomes and the launcher seam.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Why a trial failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The solver ran but exited non-zero (or was killed by a signal).
    Invocation,
    /// The solver could not be started. Aborts the campaign.
    Launch,
    /// The solver exceeded its deadline and was terminated.
    Timeout,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureKind::Invocation => "invocation",
            FailureKind::Launch => "launch",
            FailureKind::Timeout => "timeout",
        })
    }
}

/// Outcome of one solver invocation.
///
/// Any objective value the solver prints is opaque here; success only means
/// the process exited with status 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrialStatus {
    Success,
    Failed { kind: FailureKind, reason: String },
}

impl TrialStatus {
    pub fn failed(kind: FailureKind, reason: impl Into<String>) -> Self {
        TrialStatus::Failed {
            kind,
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TrialStatus::Success)
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            TrialStatus::Success => None,
            TrialStatus::Failed { kind, .. } => Some(*kind),
        }
    }
}

/// One completed trial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialResult {
    /// Zero-based trial index within its record.
    pub trial: u32,
    #[serde(flatten)]
    pub status: TrialStatus,
    /// Wall-clock time from launch to exit, in milliseconds.
    pub elapsed_ms: u64,
}

impl TrialResult {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Everything a launcher needs to start one trial.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    /// Position of the record within its campaign.
    pub record_index: usize,
    /// Zero-based trial index within the record.
    pub trial: u32,
    /// Positional solver arguments from [`ConfigurationRecord::serialize`](crate::config::ConfigurationRecord::serialize).
    pub args: &'a [String],
}

/// Starts the external solver and waits for it.
///
/// Implementations must be synchronous: `launch` returns only after the
/// invocation has finished or been terminated.
///
/// # Errors
///
/// Return [`CampaignError::Launch`](crate::CampaignError::Launch) only when
/// the solver could not be started at all; the campaign is aborted. Every
/// other problem is reported as a failed [`TrialStatus`].
pub trait Launcher: Send + Sync {
    fn launch(&self, invocation: &Invocation<'_>) -> Result<TrialStatus>;
}

impl<L: Launcher + ?Sized> Launcher for &L {
    fn launch(&self, invocation: &Invocation<'_>) -> Result<TrialStatus> {
        (**self).launch(invocation)
    }
}
