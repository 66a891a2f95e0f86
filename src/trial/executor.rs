//! Repeated synchronous invocations for one configuration record.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, warn};

use super::command::SolverCommand;
use super::types::{FailureKind, Invocation, Launcher, TrialResult, TrialStatus};
use crate::config::ConfigurationRecord;
use crate::error::Result;

/// How a batch of trials ended without a launch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BatchEnd {
    Finished,
    Cancelled,
}

/// Runs the trials of one [`ConfigurationRecord`].
///
/// Each trial is a separate, blocking invocation with the record's
/// serialized arguments. Executors hold no mutable state, so several can run
/// side by side on different records.
///
/// # Usage
///
/// ```ignore
/// let executor = TrialExecutor::new(SolverCommand::new("java").with_arg("SMTWTP_HYBRID"));
/// let results = executor.run(&record)?;
/// println!("{} trials", results.len());
/// ```
#[derive(Debug, Clone)]
pub struct TrialExecutor<L = SolverCommand> {
    launcher: L,
}

impl TrialExecutor<SolverCommand> {
    /// Executor that starts `command` as a child process per trial.
    pub fn new(command: SolverCommand) -> Self {
        Self { launcher: command }
    }
}

impl<L: Launcher> TrialExecutor<L> {
    /// Executor backed by a custom launcher.
    pub fn with_launcher(launcher: L) -> Self {
        Self { launcher }
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Runs all `record.repetitions()` trials in index order.
    ///
    /// Non-zero exits and timeouts become failed [`TrialResult`]s and do not
    /// stop later trials.
    ///
    /// # Errors
    ///
    /// Returns [`CampaignError::Launch`](crate::CampaignError::Launch) as soon
    /// as the solver cannot be started; remaining trials are not attempted.
    pub fn run(&self, record: &ConfigurationRecord) -> Result<Vec<TrialResult>> {
        let mut results = Vec::with_capacity(record.repetitions() as usize);
        self.run_into(0, record, None, &mut results)?;
        Ok(results)
    }

    /// Runs trials for the record at `record_index`, appending to `results`.
    ///
    /// On a launch failure the failed trial is appended before the error is
    /// returned, so the caller's partial results stay complete.
    pub(crate) fn run_into(
        &self,
        record_index: usize,
        record: &ConfigurationRecord,
        cancel: Option<&AtomicBool>,
        results: &mut Vec<TrialResult>,
    ) -> Result<BatchEnd> {
        let args = record.serialize();

        for trial in 0..record.repetitions() {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                debug!(record = record_index, trial, "cancelled before trial");
                return Ok(BatchEnd::Cancelled);
            }

            debug!(record = record_index, trial, args = ?args, "starting trial");
            let invocation = Invocation {
                record_index,
                trial,
                args: &args,
            };

            let start = Instant::now();
            let launched = self.launcher.launch(&invocation);
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match launched {
                Ok(status) => {
                    if let TrialStatus::Failed { kind, reason } = &status {
                        warn!(record = record_index, trial, %kind, %reason, elapsed_ms, "trial failed");
                    } else {
                        debug!(record = record_index, trial, elapsed_ms, "trial succeeded");
                    }
                    results.push(TrialResult {
                        trial,
                        status,
                        elapsed_ms,
                    });
                }
                Err(err) => {
                    results.push(TrialResult {
                        trial,
                        status: TrialStatus::failed(FailureKind::Launch, err.to_string()),
                        elapsed_ms,
                    });
                    return Err(err);
                }
            }
        }

        Ok(BatchEnd::Finished)
    }
}
