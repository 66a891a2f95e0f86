//! The full hyperparameter set and its validation rules.

use serde::{Deserialize, Serialize};

use super::params::{Param, ParamValue};
use crate::error::{CampaignError, Result};
use crate::mode::RunMode;

/// Every knob the solver reads, each with a defined default.
///
/// A mode only reads a subset (see [`RunMode::requires`]), but the set is
/// always complete so a record never carries an undefined slot.
///
/// # Defaults
///
/// ```
/// use u_campaign::config::HyperparameterSet;
///
/// let hp = HyperparameterSet::default();
/// assert_eq!(hp.population_size, 50);
/// assert_eq!(hp.max_generations, 50);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_campaign::config::HyperparameterSet;
///
/// let base = HyperparameterSet::default()
///     .with_num_ants(40)
///     .with_rho(0.2)
///     .with_mutation_prob(0.05);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HyperparameterSet {
    /// Ants per EAS iteration.
    pub num_ants: u32,

    /// EAS iteration budget per restart.
    pub num_iterations: u32,

    /// Pheromone influence weight (alpha).
    pub alpha: f64,

    /// Heuristic influence weight (beta).
    pub beta: f64,

    /// Pheromone evaporation rate, in `[0, 1]`.
    pub rho: f64,

    /// Elitism factor for the best-so-far tour. Often equal to `num_ants`.
    pub elitism_factor: f64,

    /// Stop once the best score is within this fraction of the optimum.
    ///
    /// Only effective when the instance has a known optimum.
    pub stop_percent: f64,

    /// EAS restarts (EAS mode) or GA population size (GA and hybrid).
    pub population_size: u32,

    /// GA generation budget.
    pub max_generations: u32,

    /// GA mutation probability, in `[0, 1]`.
    pub mutation_prob: f64,

    /// GA crossover probability, in `[0, 1]`.
    pub crossover_prob: f64,
}

impl Default for HyperparameterSet {
    fn default() -> Self {
        Self {
            num_ants: 20,
            num_iterations: 50,
            alpha: 1.0,
            beta: 2.0,
            rho: 0.1,
            elitism_factor: 20.0,
            stop_percent: 0.0,
            population_size: 50,
            max_generations: 50,
            mutation_prob: 0.1,
            crossover_prob: 0.6,
        }
    }
}

impl HyperparameterSet {
    pub fn with_num_ants(mut self, n: u32) -> Self {
        self.num_ants = n;
        self
    }

    pub fn with_num_iterations(mut self, n: u32) -> Self {
        self.num_iterations = n;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// Sets the evaporation rate (clamped to `[0, 1]`).
    pub fn with_rho(mut self, rho: f64) -> Self {
        self.rho = rho.clamp(0.0, 1.0);
        self
    }

    pub fn with_elitism_factor(mut self, factor: f64) -> Self {
        self.elitism_factor = factor;
        self
    }

    /// Sets the early-stop threshold (negative values become 0).
    pub fn with_stop_percent(mut self, pct: f64) -> Self {
        self.stop_percent = pct.max(0.0);
        self
    }

    pub fn with_population_size(mut self, n: u32) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_max_generations(mut self, n: u32) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the mutation probability (clamped to `[0, 1]`).
    pub fn with_mutation_prob(mut self, p: f64) -> Self {
        self.mutation_prob = p.clamp(0.0, 1.0);
        self
    }

    /// Sets the crossover probability (clamped to `[0, 1]`).
    pub fn with_crossover_prob(mut self, p: f64) -> Self {
        self.crossover_prob = p.clamp(0.0, 1.0);
        self
    }

    /// Reads one field by name.
    pub fn get(&self, param: Param) -> ParamValue {
        match param {
            Param::NumAnts => self.num_ants.into(),
            Param::NumIterations => self.num_iterations.into(),
            Param::Alpha => self.alpha.into(),
            Param::Beta => self.beta.into(),
            Param::Rho => self.rho.into(),
            Param::ElitismFactor => self.elitism_factor.into(),
            Param::StopPercent => self.stop_percent.into(),
            Param::PopulationSize => self.population_size.into(),
            Param::MaxGenerations => self.max_generations.into(),
            Param::MutationProb => self.mutation_prob.into(),
            Param::CrossoverProb => self.crossover_prob.into(),
        }
    }

    /// Writes one field, checking that the value fits the field's type.
    ///
    /// Range checks are left to [`validate_for`](Self::validate_for), which
    /// sees the merged set.
    pub fn set(&mut self, param: Param, value: ParamValue) -> Result<()> {
        let invalid = |reason: String| CampaignError::InvalidValue {
            name: param.name().to_string(),
            reason,
        };
        let count = || {
            value
                .as_count()
                .ok_or_else(|| invalid(format!("expected a non-negative integer, got {value}")))
        };
        let real = || {
            let x = value.as_real();
            if x.is_finite() {
                Ok(x)
            } else {
                Err(invalid(format!("expected a finite number, got {value}")))
            }
        };

        match param {
            Param::NumAnts => self.num_ants = count()?,
            Param::NumIterations => self.num_iterations = count()?,
            Param::Alpha => self.alpha = real()?,
            Param::Beta => self.beta = real()?,
            Param::Rho => self.rho = real()?,
            Param::ElitismFactor => self.elitism_factor = real()?,
            Param::StopPercent => self.stop_percent = real()?,
            Param::PopulationSize => self.population_size = count()?,
            Param::MaxGenerations => self.max_generations = count()?,
            Param::MutationProb => self.mutation_prob = real()?,
            Param::CrossoverProb => self.crossover_prob = real()?,
        }
        Ok(())
    }

    /// Validates the fields `mode` reads.
    ///
    /// Fields the mode ignores are serialized as sentinels and are not
    /// checked. Returns `Err` with a description of the first problem.
    pub fn validate_for(&self, mode: RunMode) -> std::result::Result<(), String> {
        let uses = |p: Param| mode.requires(p);

        if uses(Param::NumAnts) && self.num_ants == 0 {
            return Err("num_ants must be at least 1".into());
        }
        if uses(Param::NumIterations) && self.num_iterations == 0 {
            return Err(format!("num_iterations must be at least 1 in {mode} mode"));
        }
        if uses(Param::MaxGenerations) && self.max_generations == 0 {
            return Err(format!("max_generations must be at least 1 in {mode} mode"));
        }
        let min_population = if uses(Param::CrossoverProb) { 2 } else { 1 };
        if self.population_size < min_population {
            return Err(format!(
                "population_size must be at least {min_population} in {mode} mode"
            ));
        }
        for p in [Param::Alpha, Param::Beta, Param::ElitismFactor, Param::StopPercent] {
            if uses(p) && self.get(p).as_real() < 0.0 {
                return Err(format!("{p} must be non-negative"));
            }
        }
        for p in [Param::Rho, Param::MutationProb, Param::CrossoverProb] {
            let x = self.get(p).as_real();
            if uses(p) && !(0.0..=1.0).contains(&x) {
                return Err(format!("{p} must be within [0, 1], got {x}"));
            }
        }
        Ok(())
    }
}
