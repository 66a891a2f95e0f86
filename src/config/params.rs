//! Hyperparameter names, values and per-row overrides.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::CampaignError;

/// A named solver knob.
///
/// The set of variants is the complete override schema: any name that does
/// not parse into a `Param` is rejected at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Param {
    /// Ants per EAS iteration.
    NumAnts,
    /// EAS iteration budget.
    NumIterations,
    /// Pheromone influence weight.
    Alpha,
    /// Heuristic influence weight.
    Beta,
    /// Pheromone evaporation rate.
    Rho,
    /// Extra pheromone deposited on the best-so-far tour.
    ElitismFactor,
    /// Early-stop threshold as a fraction above the known optimum.
    StopPercent,
    /// EAS restarts / GA population size.
    PopulationSize,
    /// GA generation budget.
    MaxGenerations,
    /// GA mutation probability.
    MutationProb,
    /// GA crossover probability.
    CrossoverProb,
}

/// Value domain of a [`Param`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Non-negative integer.
    Count,
    /// Real number.
    Real,
}

impl Param {
    /// Every hyperparameter, in the order they are documented and listed.
    pub const ALL: [Param; 11] = [
        Param::NumAnts,
        Param::NumIterations,
        Param::Alpha,
        Param::Beta,
        Param::Rho,
        Param::ElitismFactor,
        Param::StopPercent,
        Param::PopulationSize,
        Param::MaxGenerations,
        Param::MutationProb,
        Param::CrossoverProb,
    ];

    /// The canonical (snake_case) name used in overrides and definition files.
    pub fn name(self) -> &'static str {
        match self {
            Param::NumAnts => "num_ants",
            Param::NumIterations => "num_iterations",
            Param::Alpha => "alpha",
            Param::Beta => "beta",
            Param::Rho => "rho",
            Param::ElitismFactor => "elitism_factor",
            Param::StopPercent => "stop_percent",
            Param::PopulationSize => "population_size",
            Param::MaxGenerations => "max_generations",
            Param::MutationProb => "mutation_prob",
            Param::CrossoverProb => "crossover_prob",
        }
    }

    pub fn kind(self) -> ParamKind {
        match self {
            Param::NumAnts
            | Param::NumIterations
            | Param::PopulationSize
            | Param::MaxGenerations => ParamKind::Count,
            _ => ParamKind::Real,
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Param {
    type Err = CampaignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Param::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| CampaignError::UnknownParameter { name: s.to_string() })
    }
}

/// A raw override value as written in a campaign table.
///
/// Integral JSON numbers deserialize as [`ParamValue::Count`], everything
/// else as [`ParamValue::Real`]. Type checking against the target
/// [`Param`] happens when the override is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Count(u64),
    Real(f64),
}

impl ParamValue {
    /// Interprets the value as a count, accepting integral reals.
    pub fn as_count(self) -> Option<u32> {
        match self {
            ParamValue::Count(n) => u32::try_from(n).ok(),
            ParamValue::Real(x) if x.fract() == 0.0 && x >= 0.0 && x <= u32::MAX as f64 => {
                Some(x as u32)
            }
            ParamValue::Real(_) => None,
        }
    }

    pub fn as_real(self) -> f64 {
        match self {
            ParamValue::Count(n) => n as f64,
            ParamValue::Real(x) => x,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Count(n) => write!(f, "{n}"),
            ParamValue::Real(x) => write!(f, "{x}"),
        }
    }
}

impl From<u32> for ParamValue {
    fn from(n: u32) -> Self {
        ParamValue::Count(n as u64)
    }
}

impl From<u64> for ParamValue {
    fn from(n: u64) -> Self {
        ParamValue::Count(n)
    }
}

impl From<usize> for ParamValue {
    fn from(n: usize) -> Self {
        ParamValue::Count(n as u64)
    }
}

impl From<f64> for ParamValue {
    fn from(x: f64) -> Self {
        ParamValue::Real(x)
    }
}

/// Per-row hyperparameter overrides, keyed by name.
///
/// Names stay unchecked strings until the row is built so that a
/// declarative table (or a JSON file) can be loaded as-is and every
/// misspelling is reported by the builder with its row index.
///
/// ```
/// use u_campaign::config::Overrides;
///
/// let overrides = Overrides::new()
///     .set("num_iterations", 150u32)
///     .set("max_generations", 150u32);
/// assert_eq!(overrides.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Overrides {
    values: BTreeMap<String, ParamValue>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, replacing any earlier value for the same name.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Typed variant of [`set`](Self::set).
    pub fn set_param(self, param: Param, value: impl Into<ParamValue>) -> Self {
        self.set(param.name(), value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Overrides {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
