//! Declarative campaign tables and their materialization.

use serde::Serialize;
use tracing::debug;

use crate::config::{ConfigurationRecord, HyperparameterSet, Overrides, Param, ProblemInstance};
use crate::error::Result;
use crate::mode::RunMode;

/// One logical experiment definition: a row of the campaign table.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignRow {
    pub instance: ProblemInstance,
    pub mode: RunMode,
    /// Applied to a fresh copy of the base template; never shared with other rows.
    pub overrides: Overrides,
    pub repetitions: u32,
}

/// Collects campaign rows on top of one base template.
///
/// Rows are independent: each one starts from the untouched base, so an
/// override in one row can never leak into the next.
///
/// # Builder Pattern
///
/// ```
/// use u_campaign::campaign::CampaignBuilder;
/// use u_campaign::config::{HyperparameterSet, Overrides, ProblemInstance};
/// use u_campaign::RunMode;
///
/// let inst = ProblemInstance::new("40.1.txt").unwrap();
/// let campaign = CampaignBuilder::new(HyperparameterSet::default())
///     .with_row(inst.clone(), RunMode::Eas, Overrides::new().set("num_iterations", 300u32), 10)
///     .with_row(inst, RunMode::Ga, Overrides::new().set("max_generations", 300u32), 10)
///     .build()
///     .unwrap();
/// assert_eq!(campaign.total_trials(), 20);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CampaignBuilder {
    base: HyperparameterSet,
    rows: Vec<CampaignRow>,
}

impl CampaignBuilder {
    pub fn new(base: HyperparameterSet) -> Self {
        Self {
            base,
            rows: Vec::new(),
        }
    }

    pub fn base(&self) -> &HyperparameterSet {
        &self.base
    }

    pub fn rows(&self) -> &[CampaignRow] {
        &self.rows
    }

    /// Appends one row. Validation is deferred to [`build`](Self::build).
    pub fn add(
        &mut self,
        instance: ProblemInstance,
        mode: RunMode,
        overrides: Overrides,
        repetitions: u32,
    ) -> &mut Self {
        self.rows.push(CampaignRow {
            instance,
            mode,
            overrides,
            repetitions,
        });
        self
    }

    /// Chaining variant of [`add`](Self::add).
    pub fn with_row(
        mut self,
        instance: ProblemInstance,
        mode: RunMode,
        overrides: Overrides,
        repetitions: u32,
    ) -> Self {
        self.add(instance, mode, overrides, repetitions);
        self
    }

    /// Materializes one [`ConfigurationRecord`] per row, in row order.
    ///
    /// A pure function of the declared rows: calling it twice yields equal
    /// campaigns.
    ///
    /// # Errors
    ///
    /// The first row that fails [`ConfigurationRecord::build`], wrapped in
    /// [`CampaignError::Row`](crate::CampaignError::Row) with its index. No
    /// partial campaign is returned.
    pub fn build(&self) -> Result<Campaign> {
        let records = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                ConfigurationRecord::build(
                    row.mode,
                    row.instance.clone(),
                    &self.base,
                    &row.overrides,
                    row.repetitions,
                )
                .map_err(|e| e.at_row(i))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(records = records.len(), "campaign built");
        Ok(Campaign { records })
    }

    /// The EAS / GA / hybrid comparison on a shared budget.
    ///
    /// For every instance: EAS with `budget` iterations, GA with `budget`
    /// generations, and the hybrid with the budget split between both
    /// halves (`budget / 2` iterations, the rest as generations). Rows are
    /// grouped by mode: all EAS rows first, then GA, then hybrid.
    pub fn mode_comparison(
        base: HyperparameterSet,
        instances: &[ProblemInstance],
        budget: u32,
        repetitions: u32,
    ) -> Self {
        let mut builder = Self::new(base);
        let eas_share = budget / 2;
        for mode in RunMode::ALL {
            let overrides = match mode {
                RunMode::Eas => Overrides::new().set_param(Param::NumIterations, budget),
                RunMode::Ga => Overrides::new().set_param(Param::MaxGenerations, budget),
                RunMode::Hybrid => Overrides::new()
                    .set_param(Param::NumIterations, eas_share)
                    .set_param(Param::MaxGenerations, budget - eas_share),
            };
            for instance in instances {
                builder.add(instance.clone(), mode, overrides.clone(), repetitions);
            }
        }
        builder
    }
}

/// An ordered, immutable list of configuration records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Campaign {
    records: Vec<ConfigurationRecord>,
}

impl Campaign {
    pub fn records(&self) -> &[ConfigurationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of repetitions over all records.
    pub fn total_trials(&self) -> u64 {
        self.records.iter().map(|r| r.repetitions() as u64).sum()
    }

    /// Each record with its serialized solver arguments, for dry runs.
    pub fn invocations(&self) -> impl Iterator<Item = (&ConfigurationRecord, Vec<String>)> {
        self.records.iter().map(|r| (r, r.serialize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CampaignError;

    fn inst(path: &str) -> ProblemInstance {
        ProblemInstance::new(path).unwrap()
    }

    #[test]
    fn test_build_preserves_row_order() {
        let campaign = CampaignBuilder::default()
            .with_row(inst("40.1.txt"), RunMode::Ga, Overrides::new(), 1)
            .with_row(inst("50.1.txt"), RunMode::Eas, Overrides::new(), 2)
            .with_row(inst("100.3.txt"), RunMode::Hybrid, Overrides::new(), 3)
            .build()
            .unwrap();

        let labels: Vec<String> = campaign.records().iter().map(|r| r.label()).collect();
        assert_eq!(labels, vec!["GA 40.1", "EAS 50.1", "HYBRID 100.3"]);
        assert_eq!(campaign.total_trials(), 6);
    }

    #[test]
    fn test_no_leakage_between_rows() {
        let campaign = CampaignBuilder::default()
            .with_row(
                inst("40.1.txt"),
                RunMode::Ga,
                Overrides::new().set("population_size", 80u32),
                1,
            )
            .with_row(inst("40.1.txt"), RunMode::Ga, Overrides::new(), 1)
            .build()
            .unwrap();

        assert_eq!(campaign.records()[0].hyperparameters().population_size, 80);
        assert_eq!(campaign.records()[1].hyperparameters().population_size, 50);
    }

    #[test]
    fn test_error_reports_row_index() {
        let err = CampaignBuilder::default()
            .with_row(inst("40.1.txt"), RunMode::Eas, Overrides::new(), 1)
            .with_row(
                inst("40.1.txt"),
                RunMode::Ga,
                Overrides::new().set("max_generation", 300u32),
                1,
            )
            .build()
            .unwrap_err();

        match err {
            CampaignError::Row { row, source } => {
                assert_eq!(row, 1);
                assert!(matches!(*source, CampaignError::UnknownParameter { .. }));
            }
            other => panic!("expected row error, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_repetition_row_is_listed() {
        let campaign = CampaignBuilder::default()
            .with_row(inst("40.1.txt"), RunMode::Eas, Overrides::new(), 0)
            .build()
            .unwrap();
        assert_eq!(campaign.len(), 1);
        assert_eq!(campaign.total_trials(), 0);
    }

    #[test]
    fn test_build_is_idempotent() {
        let builder = CampaignBuilder::mode_comparison(
            HyperparameterSet::default(),
            &[inst("40.1.txt"), inst("50.1.txt")],
            300,
            10,
        );
        let a = builder.build().unwrap();
        let b = builder.build().unwrap();
        assert_eq!(a, b);
        let args_a: Vec<_> = a.invocations().map(|(_, args)| args).collect();
        let args_b: Vec<_> = b.invocations().map(|(_, args)| args).collect();
        assert_eq!(args_a, args_b);
    }

    // ---- mode_comparison ----

    #[test]
    fn test_mode_comparison_layout() {
        let instances = [inst("40.1.txt"), inst("50.1.txt"), inst("100.3.txt")];
        let campaign =
            CampaignBuilder::mode_comparison(HyperparameterSet::default(), &instances, 300, 10)
                .build()
                .unwrap();

        assert_eq!(campaign.len(), 9);
        assert_eq!(campaign.total_trials(), 90);

        let modes: Vec<RunMode> = campaign.records().iter().map(|r| r.mode()).collect();
        assert_eq!(&modes[..3], &[RunMode::Eas; 3]);
        assert_eq!(&modes[3..6], &[RunMode::Ga; 3]);
        assert_eq!(&modes[6..], &[RunMode::Hybrid; 3]);

        let eas = campaign.records()[0].hyperparameters();
        assert_eq!(eas.num_iterations, 300);
        let ga = campaign.records()[3].hyperparameters();
        assert_eq!(ga.max_generations, 300);
        let hybrid = campaign.records()[6].hyperparameters();
        assert_eq!(hybrid.num_iterations, 150);
        assert_eq!(hybrid.max_generations, 150);
    }

    #[test]
    fn test_mode_comparison_odd_budget() {
        let campaign = CampaignBuilder::mode_comparison(
            HyperparameterSet::default(),
            &[inst("40.1.txt")],
            301,
            1,
        )
        .build()
        .unwrap();
        let hybrid = campaign.records()[2].hyperparameters();
        assert_eq!(hybrid.num_iterations + hybrid.max_generations, 301);
    }

    #[test]
    fn test_mode_comparison_budget_too_small_for_hybrid() {
        let err = CampaignBuilder::mode_comparison(
            HyperparameterSet::default(),
            &[inst("40.1.txt")],
            1,
            1,
        )
        .build()
        .unwrap_err();
        assert!(matches!(err, CampaignError::Row { row: 2, .. }));
    }
}
