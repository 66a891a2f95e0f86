//! Campaign construction and execution.
//!
//! A campaign is the full set of experiments for one benchmarking session.
//! [`CampaignBuilder`] turns a declarative table of
//! `(instance, mode, overrides, repetitions)` rows into a [`Campaign`] of
//! immutable records; [`CampaignRunner`] executes it serially and produces
//! a [`CampaignReport`].
//!
//! # Key Types
//!
//! - [`CampaignBuilder`]: base template + rows, with the mode-comparison preset
//! - [`Campaign`]: ordered configuration records
//! - [`CampaignRunner`]: drives records through a trial executor
//! - [`CampaignReport`]: every record with its results and summary counts
//! - [`CampaignDefinition`]: the JSON form of a campaign table

mod builder;
mod definition;
mod runner;

pub use builder::{Campaign, CampaignBuilder, CampaignRow};
pub use definition::{CampaignDefinition, RowDefinition};
pub use runner::{
    AbortInfo, CampaignReport, CampaignRunner, RecordReport, RecordState, TrialSummary,
};
