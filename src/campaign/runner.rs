//! Campaign execution and reporting.
//!
//! [`CampaignRunner`] drives a built [`Campaign`] end to end:
//! records in declared order → trials in index order → report.

use serde::Serialize;
use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{error, info, info_span};

use super::builder::Campaign;
use crate::config::ConfigurationRecord;
use crate::error::CampaignError;
use crate::trial::{BatchEnd, FailureKind, Launcher, SolverCommand, TrialExecutor, TrialResult};

/// What happened to one record during execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordState {
    /// Every trial ran (possibly zero of them).
    Completed,
    /// A launch failure stopped this record and the campaign.
    Aborted,
    /// Cancellation was requested while this record was running.
    Cancelled,
    /// Never started because the campaign stopped earlier.
    Skipped,
}

/// Success and failure counts over a set of trials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrialSummary {
    pub trials: usize,
    pub successes: usize,
    pub failures: usize,
    pub invocation_failures: usize,
    pub timeouts: usize,
    pub launch_failures: usize,
}

impl TrialSummary {
    fn from_results(results: &[TrialResult]) -> Self {
        let mut s = TrialSummary::default();
        for r in results {
            s.add(r);
        }
        s
    }

    fn add(&mut self, result: &TrialResult) {
        self.trials += 1;
        match result.status.failure_kind() {
            None => self.successes += 1,
            Some(kind) => {
                self.failures += 1;
                match kind {
                    FailureKind::Invocation => self.invocation_failures += 1,
                    FailureKind::Timeout => self.timeouts += 1,
                    FailureKind::Launch => self.launch_failures += 1,
                }
            }
        }
    }

    fn merge(&mut self, other: &TrialSummary) {
        self.trials += other.trials;
        self.successes += other.successes;
        self.failures += other.failures;
        self.invocation_failures += other.invocation_failures;
        self.timeouts += other.timeouts;
        self.launch_failures += other.launch_failures;
    }

    /// Fraction of trials that succeeded; `1.0` when no trial ran.
    pub fn success_rate(&self) -> f64 {
        if self.trials == 0 {
            1.0
        } else {
            self.successes as f64 / self.trials as f64
        }
    }
}

impl fmt::Display for TrialSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} succeeded", self.successes, self.trials)?;
        if self.failures > 0 {
            write!(
                f,
                " ({} failed: {} non-zero exit, {} timeout, {} launch)",
                self.failures, self.invocation_failures, self.timeouts, self.launch_failures
            )?;
        }
        Ok(())
    }
}

/// One campaign row and the trials it produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordReport {
    /// Position of the record in the campaign.
    pub index: usize,
    pub record: ConfigurationRecord,
    pub state: RecordState,
    pub summary: TrialSummary,
    pub results: Vec<TrialResult>,
}

impl RecordReport {
    fn new(
        index: usize,
        record: &ConfigurationRecord,
        state: RecordState,
        results: Vec<TrialResult>,
    ) -> Self {
        Self {
            index,
            record: record.clone(),
            state,
            summary: TrialSummary::from_results(&results),
            results,
        }
    }
}

/// Where and why a campaign was aborted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbortInfo {
    /// Index of the record whose trial could not be launched.
    pub record: usize,
    /// Trial index within that record.
    pub trial: u32,
    pub reason: String,
}

/// The externally visible outcome of a campaign.
///
/// Every record of the campaign appears exactly once, in declared order,
/// even when execution stopped early.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignReport {
    pub records: Vec<RecordReport>,
    pub summary: TrialSummary,
    /// Set when a launch failure aborted the campaign.
    pub aborted: Option<AbortInfo>,
    pub cancelled: bool,
}

impl CampaignReport {
    fn new(records: Vec<RecordReport>, aborted: Option<AbortInfo>, cancelled: bool) -> Self {
        let mut summary = TrialSummary::default();
        for r in &records {
            summary.merge(&r.summary);
        }
        Self {
            records,
            summary,
            aborted,
            cancelled,
        }
    }

    /// `true` if the campaign ran to the end and every trial succeeded.
    pub fn is_success(&self) -> bool {
        self.aborted.is_none() && !self.cancelled && self.summary.failures == 0
    }

    /// All trial results, flattened in execution order.
    pub fn results(&self) -> impl Iterator<Item = &TrialResult> {
        self.records.iter().flat_map(|r| r.results.iter())
    }
}

/// Executes campaigns against one solver.
///
/// # Usage
///
/// ```ignore
/// let runner = CampaignRunner::new(SolverCommand::new("java").with_arg("SMTWTP_HYBRID"));
/// let report = runner.execute(&campaign);
/// println!("{}", report.summary);
/// ```
#[derive(Debug, Clone)]
pub struct CampaignRunner<L = SolverCommand> {
    executor: TrialExecutor<L>,
}

impl CampaignRunner<SolverCommand> {
    pub fn new(command: SolverCommand) -> Self {
        Self {
            executor: TrialExecutor::new(command),
        }
    }
}

impl<L: Launcher> CampaignRunner<L> {
    pub fn with_launcher(launcher: L) -> Self {
        Self {
            executor: TrialExecutor::with_launcher(launcher),
        }
    }

    pub fn executor(&self) -> &TrialExecutor<L> {
        &self.executor
    }

    /// Runs every record serially, in declared order.
    ///
    /// Failed and timed-out trials are recorded and execution continues. A
    /// launch failure stops the campaign: the failing record is marked
    /// [`RecordState::Aborted`] and later records [`RecordState::Skipped`].
    pub fn execute(&self, campaign: &Campaign) -> CampaignReport {
        self.execute_with_cancel(campaign, None)
    }

    /// Like [`execute`](Self::execute), with an optional cancellation token.
    ///
    /// The flag is checked before each trial. Once set, the running record
    /// is marked [`RecordState::Cancelled`] and no further trial starts.
    pub fn execute_with_cancel(
        &self,
        campaign: &Campaign,
        cancel: Option<Arc<AtomicBool>>,
    ) -> CampaignReport {
        info!(
            records = campaign.len(),
            trials = campaign.total_trials(),
            "starting campaign"
        );

        let mut reports = Vec::with_capacity(campaign.len());
        let mut aborted: Option<AbortInfo> = None;
        let mut cancelled = false;

        for (index, record) in campaign.records().iter().enumerate() {
            if aborted.is_some() || cancelled {
                reports.push(RecordReport::new(index, record, RecordState::Skipped, Vec::new()));
                continue;
            }

            let span = info_span!(
                "record",
                index,
                mode = %record.mode(),
                instance = %record.instance()
            );
            let _enter = span.enter();

            let mut results = Vec::with_capacity(record.repetitions() as usize);
            let state = match self
                .executor
                .run_into(index, record, cancel.as_deref(), &mut results)
            {
                Ok(BatchEnd::Finished) => RecordState::Completed,
                Ok(BatchEnd::Cancelled) => {
                    cancelled = true;
                    RecordState::Cancelled
                }
                Err(err) => {
                    aborted = Some(abort_info(index, &results, &err));
                    RecordState::Aborted
                }
            };

            let report = RecordReport::new(index, record, state, results);
            info!(state = ?report.state, summary = %report.summary, "record finished");
            reports.push(report);
        }

        finish(reports, aborted, cancelled)
    }

    /// Runs records concurrently on the rayon thread pool.
    ///
    /// Trials within a record stay serial. A launch failure raises a shared
    /// flag: records that have not started are skipped and running ones stop
    /// before their next trial (marked [`RecordState::Aborted`]).
    #[cfg(feature = "parallel")]
    pub fn execute_parallel(&self, campaign: &Campaign) -> CampaignReport {
        use rayon::prelude::*;
        use std::sync::atomic::Ordering;

        info!(
            records = campaign.len(),
            trials = campaign.total_trials(),
            "starting parallel campaign"
        );

        let abort_flag = AtomicBool::new(false);
        let outcomes: Vec<(RecordReport, Option<AbortInfo>)> = campaign
            .records()
            .par_iter()
            .enumerate()
            .map(|(index, record)| {
                if abort_flag.load(Ordering::Relaxed) {
                    return (
                        RecordReport::new(index, record, RecordState::Skipped, Vec::new()),
                        None,
                    );
                }
                let mut results = Vec::with_capacity(record.repetitions() as usize);
                let (state, abort) =
                    match self
                        .executor
                        .run_into(index, record, Some(&abort_flag), &mut results)
                    {
                        Ok(BatchEnd::Finished) => (RecordState::Completed, None),
                        Ok(BatchEnd::Cancelled) => (RecordState::Aborted, None),
                        Err(err) => {
                            abort_flag.store(true, Ordering::Relaxed);
                            (RecordState::Aborted, Some(abort_info(index, &results, &err)))
                        }
                    };
                (RecordReport::new(index, record, state, results), abort)
            })
            .collect();

        let mut reports = Vec::with_capacity(outcomes.len());
        let mut aborted = None;
        for (report, abort) in outcomes {
            if aborted.is_none() {
                aborted = abort;
            }
            reports.push(report);
        }
        finish(reports, aborted, false)
    }
}

fn abort_info(index: usize, results: &[TrialResult], err: &CampaignError) -> AbortInfo {
    let trial = results.last().map_or(0, |r| r.trial);
    error!(record = index, trial, error = %err, "solver launch failed, aborting campaign");
    AbortInfo {
        record: index,
        trial,
        reason: err.to_string(),
    }
}

fn finish(
    reports: Vec<RecordReport>,
    aborted: Option<AbortInfo>,
    cancelled: bool,
) -> CampaignReport {
    let report = CampaignReport::new(reports, aborted, cancelled);
    info!(
        summary = %report.summary,
        aborted = report.aborted.is_some(),
        cancelled = report.cancelled,
        "campaign finished"
    );
    report
}
