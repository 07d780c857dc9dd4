//! # Orchestrator Integration Tests / 编排器集成测试
//!
//! Drives whole runs through the orchestrator: planning, execution of every
//! step regardless of failures, reporting, log cleanup and cancellation.
//!
//! 通过编排器驱动完整的运行：计划、无论失败与否都执行每个步骤、报告、日志清理和取消。

mod common;

use common::{FEATURE_MATRIX, FakeRunner, parse_config, setup_project};
use tokio_util::sync::CancellationToken;
use workspace_checker::config::GroupSelection;
use workspace_checker::core::{ConfigError, Orchestrator, RunError, RunPhase};

const TWO_GROUPS: &str = r#"
[[groups]]
name = "workspace"

[[groups.steps]]
label = "format"
[[groups.steps.commands]]
run = "cargo fmt --all -- --check"

[[groups.steps]]
label = "lint"
[[groups.steps.commands]]
run = "cargo clippy -- -D warnings"

[[groups]]
name = "abi-gen"

[[groups.steps]]
label = "testing abi-gen"
[[groups.steps.commands]]
run = "cargo test -p abi-gen"
"#;

#[cfg(test)]
mod run_tests {
    use super::*;

    #[tokio::test]
    async fn test_feature_matrix_with_one_failure() {
        let project = setup_project(&[]);
        let config = parse_config(FEATURE_MATRIX);
        let runner = FakeRunner::new().exit_with("cargo check --features contract", 101);
        let mut orchestrator = Orchestrator::new(runner).with_locale("en");
        assert_eq!(orchestrator.phase(), RunPhase::NotStarted);

        let mut out = Vec::new();
        let summary = orchestrator
            .run(&config, &GroupSelection::Default, project.path(), &mut out)
            .await
            .unwrap();

        assert_eq!(
            summary.report.text,
            "- check feature contract : ERROR\n\
             - check feature collaboration : OK\n\
             Some checks failed\n"
        );
        assert_eq!(summary.exit_code(), 1);
        assert!(!summary.interrupted);
        assert_eq!(
            orchestrator.runner().calls(),
            [
                "cargo check --features contract",
                "cargo check --features collaboration"
            ]
        );
        assert_eq!(orchestrator.phase(), RunPhase::Done);
        assert!(String::from_utf8(out).unwrap().contains("Some checks failed"));
    }

    #[tokio::test]
    async fn test_every_step_runs_even_when_all_fail() {
        let project = setup_project(&[]);
        let config = parse_config(TWO_GROUPS);
        let runner = FakeRunner::new()
            .exit_with("cargo fmt --all -- --check", 1)
            .exit_with("cargo clippy -- -D warnings", 101)
            .launch_fails("cargo test -p abi-gen");
        let mut orchestrator = Orchestrator::new(runner).with_locale("en");

        let summary = orchestrator
            .run(&config, &GroupSelection::Default, project.path(), &mut Vec::new())
            .await
            .unwrap();

        assert_eq!(orchestrator.runner().call_count(), 3);
        assert_eq!(summary.ledger.len(), 3);
        assert_eq!(summary.ledger.failures().count(), 3);
        assert_eq!(summary.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_all_passing_run() {
        let project = setup_project(&[]);
        let config = parse_config(TWO_GROUPS);
        let mut orchestrator = Orchestrator::new(FakeRunner::new()).with_locale("en");

        let summary = orchestrator
            .run(&config, &GroupSelection::Default, project.path(), &mut Vec::new())
            .await
            .unwrap();

        assert_eq!(summary.exit_code(), 0);
        assert!(summary.report.text.ends_with("All checks passed\n"));
    }

    #[tokio::test]
    async fn test_selection_limits_the_run() {
        let project = setup_project(&[]);
        let config = parse_config(TWO_GROUPS);
        let mut orchestrator = Orchestrator::new(FakeRunner::new()).with_locale("en");

        let summary = orchestrator
            .run(
                &config,
                &GroupSelection::Only(vec!["abi-gen".into()]),
                project.path(),
                &mut Vec::new(),
            )
            .await
            .unwrap();

        assert_eq!(orchestrator.runner().calls(), ["cargo test -p abi-gen"]);
        assert_eq!(summary.report.text, "- testing abi-gen : OK\nAll checks passed\n");
    }
}

#[cfg(test)]
mod config_error_tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_names_abort_before_anything_runs() {
        let project = setup_project(&[]);
        let config = parse_config(
            r#"
[[groups]]
name = "workspace"

[[groups.steps]]
label = "fmt"
[[groups.steps.commands]]
run = "cargo fmt"

[[groups.steps]]
label = "fmt"
[[groups.steps.commands]]
run = "cargo fmt -p abi-gen"
"#,
        );
        let mut orchestrator = Orchestrator::new(FakeRunner::new());

        let mut out = Vec::new();
        let result = orchestrator
            .run(&config, &GroupSelection::Default, project.path(), &mut out)
            .await;

        assert!(matches!(
            result,
            Err(RunError::Config(ConfigError::DuplicateStep { ref name })) if name == "fmt"
        ));
        assert_eq!(orchestrator.runner().call_count(), 0);
        assert_eq!(orchestrator.phase(), RunPhase::Expanding);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_empty_selection_is_not_a_pass() {
        let project = setup_project(&[]);
        let config = parse_config("[[groups]]\nname = \"workspace\"\nsteps = []\n");
        let mut orchestrator = Orchestrator::new(FakeRunner::new());

        let result = orchestrator
            .run(&config, &GroupSelection::Default, project.path(), &mut Vec::new())
            .await;

        assert!(matches!(result, Err(RunError::Config(ConfigError::EmptyRun))));
    }

    #[tokio::test]
    async fn test_unknown_group_runs_nothing() {
        let project = setup_project(&[]);
        let config = parse_config(TWO_GROUPS);
        let mut orchestrator = Orchestrator::new(FakeRunner::new());

        let result = orchestrator
            .run(
                &config,
                &GroupSelection::from_flags(true, false, vec![]),
                project.path(),
                &mut Vec::new(),
            )
            .await;

        assert!(matches!(
            result,
            Err(RunError::Config(ConfigError::UnknownGroup { .. }))
        ));
        assert_eq!(orchestrator.runner().call_count(), 0);
    }
}

#[cfg(test)]
mod cancellation_tests {
    use super::*;

    #[tokio::test]
    async fn test_steps_after_cancellation_are_reported_as_errors() {
        let project = setup_project(&[]);
        let config = parse_config(TWO_GROUPS);
        let token = CancellationToken::new();
        let runner = FakeRunner::new().cancel_after("cargo fmt --all -- --check", token.clone());
        let mut orchestrator = Orchestrator::new(runner)
            .with_cancellation(token)
            .with_locale("en");

        let summary = orchestrator
            .run(&config, &GroupSelection::Default, project.path(), &mut Vec::new())
            .await
            .unwrap();

        assert!(summary.interrupted);
        assert_eq!(orchestrator.runner().call_count(), 1);
        assert_eq!(
            summary.report.text,
            "- format : OK\n- lint : ERROR\n- testing abi-gen : ERROR\nSome checks failed\n"
        );
        assert_eq!(summary.exit_code(), 1);
        assert_eq!(orchestrator.phase(), RunPhase::Done);
    }
}

#[cfg(unix)]
#[cfg(test)]
mod log_cleanup_tests {
    use super::*;
    use std::io::{self, Write};
    use workspace_checker::core::ReportError;
    use workspace_checker::infra::command::ProcessRunner;

    /// A reporting stream whose every write fails.
    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_logs_are_shown_on_failure_and_removed_afterwards() {
        let project = setup_project(&[]);
        let config = parse_config(
            r#"
[[axes]]
name = "feature"
values = ["contract", "collaboration"]

[[groups]]
name = "workspace"

[[groups.steps]]
label = "check feature {feature}"
[[groups.steps.commands]]
run = "sh -c 'echo checking {feature}; test {feature} = collaboration'"
log = "target/{feature}.log"
"#,
        );
        let mut orchestrator = Orchestrator::new(ProcessRunner::default()).with_locale("en");

        let mut out = Vec::new();
        let summary = orchestrator
            .run(&config, &GroupSelection::Default, project.path(), &mut out)
            .await
            .unwrap();

        assert_eq!(summary.exit_code(), 1);
        let failed = summary.ledger.get("check feature contract").unwrap();
        assert_eq!(failed.exit_code, Some(1));
        assert_eq!(
            failed.log_path.as_deref(),
            Some(project.path().join("target/contract.log").as_path())
        );
        assert!(summary.ledger.get("check feature collaboration").unwrap().success);

        let written = String::from_utf8(out).unwrap();
        assert!(written.contains("checking contract"));
        assert!(!project.path().join("target/contract.log").exists());
        assert!(!project.path().join("target/collaboration.log").exists());
    }

    #[tokio::test]
    async fn test_report_write_failure_aborts_run_and_still_removes_logs() {
        let project = setup_project(&[]);
        let config = parse_config(
            r#"
[[groups]]
name = "workspace"

[[groups.steps]]
label = "format"
[[groups.steps.commands]]
run = "sh -c 'echo formatting'"
log = "target/format.log"

[[groups.steps]]
label = "lint"
[[groups.steps.commands]]
run = "sh -c 'echo linting; exit 3'"
log = "target/lint.log"
"#,
        );
        let mut orchestrator = Orchestrator::new(ProcessRunner::default()).with_locale("en");

        let result = orchestrator
            .run(&config, &GroupSelection::Default, project.path(), &mut FullDisk)
            .await;

        assert!(matches!(result, Err(RunError::Report(ReportError::Write(_)))));
        assert_eq!(orchestrator.phase(), RunPhase::Reporting);
        assert!(project.path().join("target").is_dir());
        assert!(!project.path().join("target/format.log").exists());
        assert!(!project.path().join("target/lint.log").exists());
    }

    #[tokio::test]
    async fn test_configured_env_reaches_every_child() {
        let project = setup_project(&[]);
        let config = parse_config(
            r#"
[env]
WORKSPACE_CHECKER_TEST_FEATURE = "contract"

[[axes]]
name = "check"
values = ["first", "second", "third"]

[[groups]]
name = "workspace"

[[groups.steps]]
label = "{check} sees the feature"
[[groups.steps.commands]]
run = "sh -c 'test \"$WORKSPACE_CHECKER_TEST_FEATURE\" = contract'"
[[groups.steps.commands]]
run = "sh -c 'test \"$WORKSPACE_CHECKER_TEST_FEATURE\" = contract'"
"#,
        );
        let mut orchestrator =
            Orchestrator::new(ProcessRunner::new(config.env.clone())).with_locale("en");

        let mut out = Vec::new();
        let summary = orchestrator
            .run(&config, &GroupSelection::Default, project.path(), &mut out)
            .await
            .unwrap();

        assert_eq!(
            summary.report.text,
            "- first sees the feature : OK\n\
             - second sees the feature : OK\n\
             - third sees the feature : OK\n\
             All checks passed\n"
        );
        assert_eq!(summary.exit_code(), 0);
    }
}
