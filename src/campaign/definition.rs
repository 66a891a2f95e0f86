//! Campaign definition files.
//!
//! A definition is the declarative table in JSON form:
//!
//! ```json
//! {
//!   "solver": { "program": "java", "args": ["SMTWTP_HYBRID"], "timeout_secs": 600 },
//!   "base": { "num_ants": 20, "population_size": 50 },
//!   "rows": [
//!     { "instance": "40.1.txt", "mode": "eas", "overrides": { "num_iterations": 300 }, "repetitions": 10 },
//!     { "instance": "40.1.txt", "optimal": 913, "mode": "both",
//!       "overrides": { "num_iterations": 150, "max_generations": 150 }, "repetitions": 10 }
//!   ]
//! }
//! ```
//!
//! Unknown keys are rejected everywhere except inside `overrides`, whose
//! names are checked by the builder so that errors carry a row index.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::builder::{Campaign, CampaignBuilder};
use crate::config::{HyperparameterSet, Overrides, ProblemInstance};
use crate::error::{CampaignError, Result};
use crate::mode::RunMode;
use crate::trial::SolverCommand;

/// One row of a definition file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RowDefinition {
    /// Instance file passed to the solver.
    pub instance: PathBuf,
    /// Known optimum for early stopping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimal: Option<u64>,
    pub mode: RunMode,
    #[serde(default, skip_serializing_if = "Overrides::is_empty")]
    pub overrides: Overrides,
    pub repetitions: u32,
}

/// A complete campaign: solver, base template and rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CampaignDefinition {
    pub solver: SolverCommand,
    #[serde(default)]
    pub base: HyperparameterSet,
    pub rows: Vec<RowDefinition>,
}

impl CampaignDefinition {
    /// Parses a definition from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let def: Self =
            serde_json::from_str(text).map_err(|e| CampaignError::Definition(e.to_string()))?;
        def.solver
            .validate()
            .map_err(|e| CampaignError::Definition(format!("solver: {e}")))?;
        Ok(def)
    }

    /// Reads and parses a definition file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| CampaignError::Definition(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    /// Captures an in-memory builder as a definition, e.g. to save a preset.
    pub fn from_builder(solver: SolverCommand, builder: &CampaignBuilder) -> Self {
        let rows = builder
            .rows()
            .iter()
            .map(|row| RowDefinition {
                instance: row.instance.path.clone(),
                optimal: row.instance.optimal,
                mode: row.mode,
                overrides: row.overrides.clone(),
                repetitions: row.repetitions,
            })
            .collect();
        Self {
            solver,
            base: builder.base().clone(),
            rows,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CampaignError::Definition(e.to_string()))
    }

    /// The rows as a [`CampaignBuilder`] over `base`.
    pub fn to_builder(&self) -> Result<CampaignBuilder> {
        let mut builder = CampaignBuilder::new(self.base.clone());
        for (i, row) in self.rows.iter().enumerate() {
            let mut instance =
                ProblemInstance::new(row.instance.clone()).map_err(|e| e.at_row(i))?;
            instance.optimal = row.optimal;
            builder.add(instance, row.mode, row.overrides.clone(), row.repetitions);
        }
        Ok(builder)
    }

    /// Builds the campaign described by the rows.
    pub fn build(&self) -> Result<Campaign> {
        self.to_builder()?.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"{
        "solver": { "program": "java", "args": ["SMTWTP_HYBRID"], "timeout_secs": 600 },
        "base": { "num_ants": 25 },
        "rows": [
            { "instance": "40.1.txt", "mode": "eas", "overrides": { "num_iterations": 300 }, "repetitions": 10 },
            { "instance": "40.1.txt", "mode": "ga", "overrides": { "max_generations": 300 }, "repetitions": 10 },
            { "instance": "40.1.txt", "optimal": 913, "mode": "both",
              "overrides": { "num_iterations": 150, "max_generations": 150 }, "repetitions": 10 }
        ]
    }"#;

    #[test]
    fn test_parse_and_build() {
        let def = CampaignDefinition::from_json(SCRIPT).unwrap();
        assert_eq!(def.solver.args, vec!["SMTWTP_HYBRID"]);
        assert_eq!(def.base.num_ants, 25);
        assert_eq!(def.base.population_size, 50);

        let campaign = def.build().unwrap();
        assert_eq!(campaign.len(), 3);
        assert_eq!(campaign.total_trials(), 30);

        let hybrid = &campaign.records()[2];
        assert_eq!(hybrid.mode(), RunMode::Hybrid);
        assert_eq!(hybrid.instance().optimal, Some(913));
        assert_eq!(hybrid.serialize()[0], "25");
    }

    #[test]
    fn test_misspelled_override_reports_row() {
        let text = r#"{
            "solver": { "program": "java" },
            "rows": [
                { "instance": "40.1.txt", "mode": "ga", "repetitions": 1 },
                { "instance": "40.1.txt", "mode": "ga", "overrides": { "populaton_size": 80 }, "repetitions": 1 }
            ]
        }"#;
        let def = CampaignDefinition::from_json(text).unwrap();
        let err = def.build().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().starts_with("row 1:"), "{err}");
    }

    #[test]
    fn test_unknown_row_key_rejected() {
        let text = r#"{
            "solver": { "program": "java" },
            "rows": [ { "instance": "40.1.txt", "mode": "ga", "repetition": 1 } ]
        }"#;
        assert!(matches!(
            CampaignDefinition::from_json(text),
            Err(CampaignError::Definition(_))
        ));
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let text = r#"{
            "solver": { "program": "java" },
            "rows": [ { "instance": "40.1.txt", "mode": "aco", "repetitions": 1 } ]
        }"#;
        assert!(CampaignDefinition::from_json(text).is_err());
    }

    #[test]
    fn test_negative_repetitions_rejected() {
        let text = r#"{
            "solver": { "program": "java" },
            "rows": [ { "instance": "40.1.txt", "mode": "ga", "repetitions": -1 } ]
        }"#;
        assert!(CampaignDefinition::from_json(text).is_err());
    }

    #[test]
    fn test_empty_program_rejected() {
        let text = r#"{ "solver": { "program": "" }, "rows": [] }"#;
        assert!(CampaignDefinition::from_json(text).is_err());
    }

    #[test]
    fn test_preset_survives_json() {
        let instances = [
            ProblemInstance::new("40.1.txt").unwrap(),
            ProblemInstance::new("50.1.txt").unwrap().with_optimal(2134),
        ];
        let builder =
            CampaignBuilder::mode_comparison(HyperparameterSet::default(), &instances, 300, 10);
        let def = CampaignDefinition::from_builder(
            SolverCommand::new("java").with_arg("SMTWTP_HYBRID"),
            &builder,
        );

        let text = def.to_json_pretty().unwrap();
        let parsed = CampaignDefinition::from_json(&text).unwrap();

        assert_eq!(parsed, def);
        assert_eq!(parsed.build().unwrap(), builder.build().unwrap());
    }
}
