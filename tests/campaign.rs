//! End-to-end campaigns against mock solvers started through `sh`.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::time::{Duration, Instant};

use u_campaign::campaign::{Campaign, CampaignBuilder, CampaignRunner, RecordState};
use u_campaign::config::{HyperparameterSet, Overrides, ProblemInstance};
use u_campaign::trial::{FailureKind, SolverCommand, TrialExecutor};
use u_campaign::{CampaignError, RunMode};

/// A solver that runs `script` with the record arguments as `$1..$14`.
fn mock_solver(script: &str) -> SolverCommand {
    SolverCommand::new("sh")
        .with_args(["-c", script, "mock-solver"])
        .with_quiet(true)
}

fn three_configs(repetitions: u32) -> Campaign {
    let inst = |p: &str| ProblemInstance::new(p).unwrap();
    CampaignBuilder::new(HyperparameterSet::default())
        .with_row(
            inst("40.1.txt"),
            RunMode::Eas,
            Overrides::new().set("num_iterations", 300u32),
            repetitions,
        )
        .with_row(
            inst("50.1.txt"),
            RunMode::Ga,
            Overrides::new().set("max_generations", 300u32),
            repetitions,
        )
        .with_row(
            inst("100.3.txt"),
            RunMode::Hybrid,
            Overrides::new()
                .set("num_iterations", 150u32)
                .set("max_generations", 150u32),
            repetitions,
        )
        .build()
        .unwrap()
}

#[test]
fn always_succeeding_solver_yields_full_success() {
    let runner = CampaignRunner::new(mock_solver("exit 0"));

    let report = runner.execute(&three_configs(10));

    assert_eq!(report.summary.trials, 30);
    assert_eq!(report.summary.successes, 30);
    assert_eq!(report.summary.to_string(), "30/30 succeeded");
    assert!(report.is_success());
}

#[test]
fn one_failing_trial_does_not_stop_the_campaign() {
    let script = r#"[ "$CAMPAIGN_RECORD_INDEX.$CAMPAIGN_TRIAL_INDEX" != "1.4" ]"#;
    let runner = CampaignRunner::new(mock_solver(script));

    let report = runner.execute(&three_configs(10));

    assert_eq!(report.summary.trials, 30);
    assert_eq!(report.summary.failures, 1);
    assert!(report.aborted.is_none());

    let failed: Vec<_> = report
        .records
        .iter()
        .flat_map(|r| r.results.iter().map(move |t| (r.index, t)))
        .filter(|(_, t)| !t.is_success())
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].0, 1);
    assert_eq!(failed[0].1.trial, 4);
    assert_eq!(
        failed[0].1.status.failure_kind(),
        Some(FailureKind::Invocation)
    );
}

#[test]
fn missing_executable_aborts_after_first_launch_failure() {
    let dir = tempfile::tempdir().unwrap();
    let runner = CampaignRunner::new(SolverCommand::new(dir.path().join("no-such-solver")));

    let report = runner.execute(&three_configs(10));

    let abort = report.aborted.as_ref().expect("campaign should abort");
    assert_eq!(abort.record, 0);
    assert_eq!(abort.trial, 0);

    assert_eq!(report.records.len(), 3);
    assert_eq!(report.records[0].state, RecordState::Aborted);
    assert_eq!(report.records[0].results.len(), 1);
    assert_eq!(
        report.records[0].results[0].status.failure_kind(),
        Some(FailureKind::Launch)
    );
    for later in &report.records[1..] {
        assert_eq!(later.state, RecordState::Skipped);
        assert!(later.results.is_empty());
    }
}

#[test]
fn non_executable_file_is_a_launch_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("solver");
    fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

    let executor = TrialExecutor::new(SolverCommand::new(&path));
    let campaign = three_configs(2);

    let err = executor.run(&campaign.records()[0]).unwrap_err();
    assert!(matches!(err, CampaignError::Launch { .. }));
}

#[test]
fn solver_receives_serialized_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let script = format!(
        r#"printf '%s\n' "$@" > '{}/'"$CAMPAIGN_RECORD_INDEX.$CAMPAIGN_TRIAL_INDEX""#,
        dir.path().display()
    );
    let campaign = three_configs(2);

    let report = CampaignRunner::new(mock_solver(&script)).execute(&campaign);
    assert!(report.is_success());

    for (index, record) in campaign.records().iter().enumerate() {
        for trial in 0..2 {
            let written = fs::read_to_string(dir.path().join(format!("{index}.{trial}"))).unwrap();
            let args: Vec<String> = written.lines().map(str::to_string).collect();
            assert_eq!(args, record.serialize());
        }
    }
}

#[test]
fn slow_solver_times_out() {
    let solver = mock_solver("sleep 5").with_timeout(Duration::from_millis(200));
    let campaign = CampaignBuilder::default()
        .with_row(
            ProblemInstance::new("40.1.txt").unwrap(),
            RunMode::Eas,
            Overrides::new(),
            2,
        )
        .build()
        .unwrap();

    let start = Instant::now();
    let report = CampaignRunner::new(solver).execute(&campaign);

    assert!(start.elapsed() < Duration::from_secs(4));
    assert_eq!(report.summary.trials, 2);
    assert_eq!(report.summary.timeouts, 2);
    assert!(report.aborted.is_none());
}

#[test]
fn zero_repetition_rows_are_reported() {
    let inst = ProblemInstance::new("40.1.txt").unwrap();
    let campaign = CampaignBuilder::default()
        .with_row(inst.clone(), RunMode::Eas, Overrides::new(), 0)
        .with_row(inst, RunMode::Ga, Overrides::new(), 3)
        .build()
        .unwrap();

    let report = CampaignRunner::new(mock_solver("exit 0")).execute(&campaign);

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.records[0].state, RecordState::Completed);
    assert!(report.records[0].results.is_empty());
    assert_eq!(report.summary.trials, 3);
}
