//! Experiment-campaign orchestrator for external scheduling solvers.
//!
//! Benchmarks a hybrid SMTWTP solver (an elitist ant system, EAS, feeding a
//! genetic algorithm, GA) by running it as an opaque executable over a grid
//! of configurations:
//!
//! - **Run modes** ([`RunMode`]): EAS only, GA only, or the hybrid, each
//!   reading its own subset of hyperparameters.
//! - **Configuration** ([`config`]): immutable records built from a base
//!   template plus validated per-row overrides, rendered into one fixed
//!   positional argument schema.
//! - **Trials** ([`trial`]): repeated, synchronous solver invocations with
//!   optional deadlines.
//! - **Campaigns** ([`campaign`]): declarative tables, serial execution and
//!   structured reports.
//!
//! # Example
//!
//! ```no_run
//! use u_campaign::campaign::{CampaignBuilder, CampaignRunner};
//! use u_campaign::config::{HyperparameterSet, ProblemInstance};
//! use u_campaign::trial::SolverCommand;
//!
//! let instances = ["40.1.txt", "50.1.txt", "100.3.txt"]
//!     .map(|p| ProblemInstance::new(p).unwrap());
//! let campaign =
//!     CampaignBuilder::mode_comparison(HyperparameterSet::default(), &instances, 300, 10)
//!         .build()
//!         .unwrap();
//!
//! let runner = CampaignRunner::new(SolverCommand::new("java").with_arg("SMTWTP_HYBRID"));
//! let report = runner.execute(&campaign);
//! println!("{}", report.summary);
//! ```

pub mod campaign;
pub mod config;
pub mod error;
pub mod mode;
pub mod trial;

pub use error::{CampaignError, Result};
pub use mode::RunMode;
