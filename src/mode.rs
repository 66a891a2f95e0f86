//! Run modes of the external solver.
//!
//! The solver reads the same positional schema in every mode; the mode only
//! decides which slots carry real values and which carry the `"0"` sentinel.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::Param;
use crate::error::CampaignError;

/// Which half (or both halves) of the hybrid solver a trial exercises.
///
/// | Mode     | Budget read                              |
/// |----------|------------------------------------------|
/// | `Eas`    | `num_iterations`, best of `population_size` restarts |
/// | `Ga`     | `max_generations` over a random population |
/// | `Hybrid` | both: EAS output seeds the GA population |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Elitist ant system only.
    Eas,
    /// Genetic algorithm only.
    Ga,
    /// EAS seeds the GA's initial population.
    #[serde(alias = "both")]
    Hybrid,
}

impl RunMode {
    /// All modes, in the order the comparison preset lists them.
    pub const ALL: [RunMode; 3] = [RunMode::Eas, RunMode::Ga, RunMode::Hybrid];

    /// Returns `true` if the solver reads `param` in this mode.
    ///
    /// `population_size` is shared: restart count for EAS, population for GA,
    /// and seeded population for the hybrid.
    pub fn requires(self, param: Param) -> bool {
        match param {
            Param::PopulationSize | Param::StopPercent => true,
            Param::NumAnts
            | Param::NumIterations
            | Param::Alpha
            | Param::Beta
            | Param::Rho
            | Param::ElitismFactor => matches!(self, RunMode::Eas | RunMode::Hybrid),
            Param::MaxGenerations | Param::MutationProb | Param::CrossoverProb => {
                matches!(self, RunMode::Ga | RunMode::Hybrid)
            }
        }
    }

    /// Parameters this mode reads, in schema order.
    pub fn required_params(self) -> impl Iterator<Item = Param> {
        Param::ALL.into_iter().filter(move |&p| self.requires(p))
    }

    /// The command token the solver expects in its last argument slot.
    pub fn solver_token(self) -> &'static str {
        match self {
            RunMode::Eas => "eas",
            RunMode::Ga => "ga",
            RunMode::Hybrid => "both",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunMode::Eas => "EAS",
            RunMode::Ga => "GA",
            RunMode::Hybrid => "HYBRID",
        };
        f.write_str(name)
    }
}

impl FromStr for RunMode {
    type Err = CampaignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "eas" => Ok(RunMode::Eas),
            "ga" => Ok(RunMode::Ga),
            "hybrid" | "both" => Ok(RunMode::Hybrid),
            _ => Err(CampaignError::UnknownMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_size_required_everywhere() {
        for mode in RunMode::ALL {
            assert!(mode.requires(Param::PopulationSize), "{mode}");
        }
    }

    #[test]
    fn test_eas_ignores_ga_params() {
        assert!(RunMode::Eas.requires(Param::NumIterations));
        assert!(!RunMode::Eas.requires(Param::MaxGenerations));
        assert!(!RunMode::Eas.requires(Param::MutationProb));
        assert!(!RunMode::Eas.requires(Param::CrossoverProb));
    }

    #[test]
    fn test_ga_ignores_colony_params() {
        assert!(RunMode::Ga.requires(Param::MaxGenerations));
        assert!(!RunMode::Ga.requires(Param::NumAnts));
        assert!(!RunMode::Ga.requires(Param::NumIterations));
        assert!(!RunMode::Ga.requires(Param::Rho));
    }

    #[test]
    fn test_hybrid_requires_everything() {
        assert_eq!(RunMode::Hybrid.required_params().count(), Param::ALL.len());
    }

    #[test]
    fn test_solver_tokens() {
        assert_eq!(RunMode::Eas.solver_token(), "eas");
        assert_eq!(RunMode::Ga.solver_token(), "ga");
        assert_eq!(RunMode::Hybrid.solver_token(), "both");
    }

    #[test]
    fn test_parse() {
        assert_eq!("EAS".parse::<RunMode>().unwrap(), RunMode::Eas);
        assert_eq!(" ga ".parse::<RunMode>().unwrap(), RunMode::Ga);
        assert_eq!("both".parse::<RunMode>().unwrap(), RunMode::Hybrid);
        assert_eq!("hybrid".parse::<RunMode>().unwrap(), RunMode::Hybrid);
        assert!(matches!(
            "aco".parse::<RunMode>(),
            Err(CampaignError::UnknownMode(_))
        ));
    }

    #[test]
    fn test_serde_accepts_both_alias() {
        let mode: RunMode = serde_json::from_str("\"both\"").unwrap();
        assert_eq!(mode, RunMode::Hybrid);
        assert_eq!(serde_json::to_string(&RunMode::Hybrid).unwrap(), "\"hybrid\"");
    }
}
