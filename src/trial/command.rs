//! The external solver as a child process.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use super::types::{FailureKind, Invocation, Launcher, TrialStatus};
use crate::error::{CampaignError, Result};

/// Environment variable carrying the record index to the child.
pub const RECORD_INDEX_ENV: &str = "CAMPAIGN_RECORD_INDEX";
/// Environment variable carrying the trial index to the child.
pub const TRIAL_INDEX_ENV: &str = "CAMPAIGN_TRIAL_INDEX";

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How to start the solver.
///
/// The full command line is `program args... <record arguments>`, so a JVM
/// solver is described as program `java` with leading argument
/// `SMTWTP_HYBRID`.
///
/// ```
/// use std::time::Duration;
/// use u_campaign::trial::SolverCommand;
///
/// let cmd = SolverCommand::new("java")
///     .with_arg("SMTWTP_HYBRID")
///     .with_timeout(Duration::from_secs(600));
/// assert_eq!(cmd.args, vec!["SMTWTP_HYBRID"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolverCommand {
    /// Executable to run.
    pub program: PathBuf,

    /// Arguments placed before the record's positional arguments.
    #[serde(default)]
    pub args: Vec<String>,

    /// Working directory for the child. Inherited when `None`.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// Per-invocation deadline in seconds. `None` waits indefinitely.
    #[serde(default, rename = "timeout_secs", with = "opt_secs")]
    pub timeout: Option<Duration>,

    /// Discard the child's stdout and stderr instead of inheriting them.
    #[serde(default)]
    pub quiet: bool,
}

impl SolverCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            timeout: None,
            quiet: false,
        }
    }

    /// Appends one leading argument.
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Sets the per-invocation deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Validates the command.
    ///
    /// Returns `Err` with a description if any setting is invalid.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.program.as_os_str().is_empty() {
            return Err("program must not be empty".into());
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err("timeout must be positive or None".into());
        }
        Ok(())
    }

    /// The full command line for `args`, for dry runs and logs.
    pub fn command_line(&self, args: &[String]) -> Vec<String> {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .chain(args.iter().cloned())
            .collect()
    }

    fn spawn(&self, invocation: &Invocation<'_>) -> io::Result<Child> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .args(invocation.args)
            .env(RECORD_INDEX_ENV, invocation.record_index.to_string())
            .env(TRIAL_INDEX_ENV, invocation.trial.to_string())
            .stdin(Stdio::null());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        if self.quiet {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }
        cmd.spawn()
    }
}

impl Launcher for SolverCommand {
    fn launch(&self, invocation: &Invocation<'_>) -> Result<TrialStatus> {
        let mut child = self.spawn(invocation).map_err(|source| CampaignError::Launch {
            program: self.program.clone(),
            source,
        })?;

        let waited = match self.timeout {
            Some(limit) => wait_with_deadline(&mut child, limit),
            None => child.wait().map(Some),
        };

        Ok(match waited {
            Ok(Some(status)) => exit_status(status),
            Ok(None) => {
                terminate(&mut child);
                let limit = self.timeout.unwrap_or_default();
                TrialStatus::failed(
                    FailureKind::Timeout,
                    format!("no exit within {:.3}s", limit.as_secs_f64()),
                )
            }
            Err(e) => {
                terminate(&mut child);
                TrialStatus::failed(FailureKind::Invocation, format!("wait failed: {e}"))
            }
        })
    }
}

fn exit_status(status: ExitStatus) -> TrialStatus {
    if status.success() {
        TrialStatus::Success
    } else {
        let reason = match status.code() {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        };
        TrialStatus::failed(FailureKind::Invocation, reason)
    }
}

/// Polls `child` until it exits or `limit` elapses. `Ok(None)` on timeout.
fn wait_with_deadline(child: &mut Child, limit: Duration) -> io::Result<Option<ExitStatus>> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let elapsed = start.elapsed();
        if elapsed >= limit {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(limit - elapsed));
    }
}

fn terminate(child: &mut Child) {
    // The child may exit between the last poll and the kill.
    if let Err(e) = child.kill() {
        tracing::debug!(error = %e, "kill after deadline failed");
    }
    if let Err(e) = child.wait() {
        tracing::warn!(error = %e, "reaping terminated solver failed");
    }
}

mod opt_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&d.as_secs_f64()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let secs = Option::<f64>::deserialize(d)?;
        match secs {
            Some(s) if !s.is_finite() || s < 0.0 => Err(serde::de::Error::custom(
                "timeout_secs must be a non-negative number",
            )),
            Some(s) => Ok(Some(Duration::from_secs_f64(s))),
            None => Ok(None),
        }
    }
}
