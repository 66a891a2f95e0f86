//! Campaign CLI.
//!
//! Plan, run, and generate benchmarking campaigns for an external SMTWTP
//! solver.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use u_campaign::campaign::{CampaignBuilder, CampaignDefinition, CampaignRunner};
use u_campaign::config::{HyperparameterSet, ProblemInstance};
use u_campaign::trial::SolverCommand;

#[derive(Parser)]
#[command(name = "u-campaign")]
#[command(about = "Benchmark campaigns for EAS / GA / hybrid scheduling solvers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every trial of a campaign definition.
    Run {
        /// Campaign definition (JSON)
        definition: PathBuf,
        /// Override the solver timeout, in seconds
        #[arg(long)]
        timeout_secs: Option<f64>,
        /// Discard solver stdout/stderr
        #[arg(long, short)]
        quiet: bool,
        /// Write the full report here (JSON)
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Print every solver invocation without running anything.
    Plan {
        /// Campaign definition (JSON)
        definition: PathBuf,
    },

    /// Generate the EAS / GA / hybrid comparison as a definition file.
    Preset {
        /// Instance files, e.g. 40.1.txt 50.1.txt 100.3.txt
        #[arg(required = true)]
        instances: Vec<PathBuf>,
        /// Combined iteration/generation budget per trial
        #[arg(short, long, default_value = "300")]
        budget: u32,
        /// Trials per configuration
        #[arg(short = 'n', long, default_value = "10")]
        repetitions: u32,
        /// Solver program
        #[arg(long, default_value = "java")]
        program: PathBuf,
        /// Leading solver arguments (comma-separated)
        #[arg(long, default_value = "SMTWTP_HYBRID", value_delimiter = ',')]
        solver_args: Vec<String>,
        /// Output file; prints to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            definition,
            timeout_secs,
            quiet,
            report,
        } => {
            let mut def = CampaignDefinition::load(&definition)
                .with_context(|| format!("loading {}", definition.display()))?;
            if let Some(secs) = timeout_secs {
                anyhow::ensure!(
                    secs.is_finite() && secs > 0.0,
                    "--timeout-secs must be positive"
                );
                def.solver.timeout = Some(Duration::from_secs_f64(secs));
            }
            if quiet {
                def.solver.quiet = true;
            }

            let campaign = def.build().context("building campaign")?;
            info!(
                definition = %definition.display(),
                records = campaign.len(),
                trials = campaign.total_trials(),
                "campaign loaded"
            );

            let runner = CampaignRunner::new(def.solver.clone());
            let outcome = runner.execute(&campaign);

            println!("\n=== Campaign Complete ===");
            for entry in &outcome.records {
                println!(
                    "[{:>3}] {:<20} {:?}: {}",
                    entry.index,
                    entry.record.label(),
                    entry.state,
                    entry.summary
                );
            }
            println!("Total: {}", outcome.summary);
            if let Some(abort) = &outcome.aborted {
                println!(
                    "Aborted at record {} trial {}: {}",
                    abort.record, abort.trial, abort.reason
                );
            }

            if let Some(path) = report {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("creating {}", parent.display()))?;
                }
                let json = serde_json::to_string_pretty(&outcome)?;
                fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
                info!(path = %path.display(), "report written");
            }

            Ok(if outcome.aborted.is_some() {
                ExitCode::from(2)
            } else if outcome.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }

        Commands::Plan { definition } => {
            let def = CampaignDefinition::load(&definition)
                .with_context(|| format!("loading {}", definition.display()))?;
            let campaign = def.build().context("building campaign")?;

            for (index, (record, args)) in campaign.invocations().enumerate() {
                println!(
                    "# [{index}] {} x{}",
                    record.label(),
                    record.repetitions()
                );
                println!("{}", def.solver.command_line(&args).join(" "));
            }
            println!(
                "# {} configurations, {} trials",
                campaign.len(),
                campaign.total_trials()
            );
            Ok(ExitCode::SUCCESS)
        }

        Commands::Preset {
            instances,
            budget,
            repetitions,
            program,
            solver_args,
            output,
        } => {
            let instances = instances
                .into_iter()
                .map(|path| ProblemInstance::new(path))
                .collect::<u_campaign::Result<Vec<_>>>()?;
            let builder = CampaignBuilder::mode_comparison(
                HyperparameterSet::default(),
                &instances,
                budget,
                repetitions,
            );
            // Surface configuration errors now rather than at run time.
            builder.build().context("preset does not build")?;

            let solver = SolverCommand::new(program).with_args(solver_args);
            let json = CampaignDefinition::from_builder(solver, &builder).to_json_pretty()?;
            match output {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!(path = %path.display(), "definition written");
                }
                None => println!("{json}"),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
