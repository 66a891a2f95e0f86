//! Fully specified experiments and their positional serialization.

use serde::Serialize;

use super::hyperparams::HyperparameterSet;
use super::instance::ProblemInstance;
use super::params::{Overrides, Param};
use crate::error::{CampaignError, Result};
use crate::mode::RunMode;

/// One slot of the solver's positional argument list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// A hyperparameter; rendered as `"0"` when the mode does not read it.
    Param(Param),
    /// Known optimum of the instance; `"0"` when unknown.
    Optimal,
    /// Path of the instance file.
    Instance,
    /// Mode token (`eas`, `ga`, `both`).
    Mode,
}

/// Argument order read by the solver.
///
/// The first nine slots are the colony arguments in the order the hybrid
/// solver has always parsed them; the GA knobs follow, and the mode token
/// is last. Changing the order or length here changes it for every
/// invocation.
pub const SCHEMA: [Slot; 14] = [
    Slot::Param(Param::NumAnts),
    Slot::Param(Param::NumIterations),
    Slot::Param(Param::Alpha),
    Slot::Param(Param::Beta),
    Slot::Param(Param::Rho),
    Slot::Param(Param::ElitismFactor),
    Slot::Optimal,
    Slot::Param(Param::StopPercent),
    Slot::Instance,
    Slot::Param(Param::PopulationSize),
    Slot::Param(Param::MaxGenerations),
    Slot::Param(Param::MutationProb),
    Slot::Param(Param::CrossoverProb),
    Slot::Mode,
];

/// Length of every serialized argument list.
pub const SCHEMA_LEN: usize = SCHEMA.len();

/// Placeholder for slots the current mode does not read.
pub const SENTINEL: &str = "0";

/// An immutable, fully specified experiment.
///
/// Built once from a base template plus the row's own overrides, then only
/// read. Fields are private so a record cannot drift from what was
/// validated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigurationRecord {
    mode: RunMode,
    instance: ProblemInstance,
    hyperparameters: HyperparameterSet,
    repetitions: u32,
}

impl ConfigurationRecord {
    /// Merges `overrides` onto a copy of `base` and validates the result.
    ///
    /// # Errors
    ///
    /// - [`CampaignError::UnknownParameter`] if an override name is not in the schema.
    /// - [`CampaignError::InvalidValue`] if a value does not fit its field.
    /// - [`CampaignError::UnusedParameter`] if an override targets a field
    ///   `mode` never reads (it would be replaced by the sentinel).
    /// - [`CampaignError::InvalidConfig`] if the merged set fails
    ///   [`HyperparameterSet::validate_for`].
    ///
    /// `repetitions == 0` is allowed: the record is listed but runs no trials.
    pub fn build(
        mode: RunMode,
        instance: ProblemInstance,
        base: &HyperparameterSet,
        overrides: &Overrides,
        repetitions: u32,
    ) -> Result<Self> {
        let mut hyperparameters = base.clone();
        for (name, value) in overrides.iter() {
            let param: Param = name.parse()?;
            if !mode.requires(param) {
                return Err(CampaignError::UnusedParameter {
                    name: name.to_string(),
                    mode: mode.to_string(),
                });
            }
            hyperparameters.set(param, value)?;
        }
        hyperparameters
            .validate_for(mode)
            .map_err(CampaignError::InvalidConfig)?;

        Ok(Self {
            mode,
            instance,
            hyperparameters,
            repetitions,
        })
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn instance(&self) -> &ProblemInstance {
        &self.instance
    }

    pub fn hyperparameters(&self) -> &HyperparameterSet {
        &self.hyperparameters
    }

    pub fn repetitions(&self) -> u32 {
        self.repetitions
    }

    /// Renders the record in [`SCHEMA`] order.
    ///
    /// Always returns exactly [`SCHEMA_LEN`] entries, none empty.
    pub fn serialize(&self) -> Vec<String> {
        SCHEMA.iter().map(|&slot| self.render(slot)).collect()
    }

    fn render(&self, slot: Slot) -> String {
        match slot {
            Slot::Param(p) if self.mode.requires(p) => self.hyperparameters.get(p).to_string(),
            Slot::Param(_) => SENTINEL.to_string(),
            Slot::Optimal => self
                .instance
                .optimal
                .map_or_else(|| SENTINEL.to_string(), |o| o.to_string()),
            Slot::Instance => self.instance.path_arg(),
            Slot::Mode => self.mode.solver_token().to_string(),
        }
    }

    /// Short label for logs: `EAS 40.1`.
    pub fn label(&self) -> String {
        format!("{} {}", self.mode, self.instance)
    }
}
