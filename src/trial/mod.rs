//! Trial execution.
//!
//! A trial is one complete, synchronous invocation of the external solver
//! under one [`ConfigurationRecord`](crate::config::ConfigurationRecord).
//! [`TrialExecutor`] runs a record's repetitions in index order through a
//! [`Launcher`]; the default launcher is a [`SolverCommand`] started as a
//! child process, with an optional deadline after which the child is killed.
//!
//! # Failure policy
//!
//! - Non-zero exit → [`FailureKind::Invocation`], recorded, execution continues
//! - Deadline exceeded → [`FailureKind::Timeout`], recorded, execution continues
//! - Cannot start → [`FailureKind::Launch`], recorded, then returned as an error

mod command;
mod executor;
mod types;

pub(crate) use executor::BatchEnd;

pub use command::{SolverCommand, RECORD_INDEX_ENV, TRIAL_INDEX_ENV};
pub use executor::TrialExecutor;
pub use types::{FailureKind, Invocation, Launcher, TrialResult, TrialStatus};
