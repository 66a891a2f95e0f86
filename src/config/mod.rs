//! Experiment configuration.
//!
//! A [`ConfigurationRecord`] is one fully specified experiment: run mode,
//! problem instance, a complete [`HyperparameterSet`] and a repetition
//! count. Records are built from a shared base template plus per-row
//! [`Overrides`] whose names are checked against the [`Param`] schema, and
//! rendered for the solver by [`ConfigurationRecord::serialize`], the one
//! place that knows the positional argument order.
//!
//! # Key Types
//!
//! - [`Param`]: the closed set of hyperparameter names
//! - [`HyperparameterSet`]: every knob, with defaults and per-mode validation
//! - [`ProblemInstance`]: instance file plus optional known optimum
//! - [`ConfigurationRecord`]: the immutable experiment and its serializer

mod hyperparams;
mod instance;
mod params;
mod record;

pub use hyperparams::HyperparameterSet;
pub use instance::ProblemInstance;
pub use params::{Overrides, Param, ParamKind, ParamValue};
pub use record::{ConfigurationRecord, Slot, SCHEMA, SCHEMA_LEN, SENTINEL};
