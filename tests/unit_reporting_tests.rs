//! # Reporting Module Unit Tests / Reporting 模块单元测试
//!
//! Tests the exact text of the summary, the exit code mapping and the
//! failure details written after it.
//!
//! 测试摘要的确切文本、退出码映射以及其后写出的失败详情。

mod common;

use common::{parse_config, setup_project};
use std::fs;
use workspace_checker::config::GroupSelection;
use workspace_checker::core::{ConfigError, Ledger};
use workspace_checker::models::StepOutcome;
use workspace_checker::planner::plan_execution;
use workspace_checker::reporting::console::{
    FAILURE_LOG_TAIL, render, write_failure_details, write_plan, write_report,
};

fn ledger_of(outcomes: Vec<StepOutcome>) -> Ledger {
    let mut ledger = Ledger::new();
    for outcome in outcomes {
        ledger.record(outcome).unwrap();
    }
    ledger
}

#[cfg(test)]
mod render_tests {
    use super::*;

    #[test]
    fn test_mixed_run_renders_one_line_per_step_and_fails() {
        let ledger = ledger_of(vec![
            StepOutcome::failed("check feature contract", 101),
            StepOutcome::passed("check feature collaboration"),
        ]);

        let report = render(&ledger).unwrap();

        assert_eq!(
            report.text,
            "- check feature contract : ERROR\n\
             - check feature collaboration : OK\n\
             Some checks failed\n"
        );
        assert_eq!(report.exit_code, 1);
        assert!(!report.passed());
    }

    #[test]
    fn test_all_passing_run_exits_zero() {
        let ledger = ledger_of(vec![
            StepOutcome::passed("fmt"),
            StepOutcome::passed("clippy"),
            StepOutcome::passed("test"),
        ]);

        let report = render(&ledger).unwrap();

        assert_eq!(report.text.lines().count(), 3 + 1);
        assert_eq!(report.text.lines().last(), Some("All checks passed"));
        assert_eq!(report.exit_code, 0);
        assert!(report.passed());
    }

    #[test]
    fn test_all_failing_run_still_lists_every_step() {
        let ledger = ledger_of(vec![
            StepOutcome::failed("a", 1),
            StepOutcome::failed("b", 2),
            StepOutcome::cancelled("c"),
        ]);

        let report = render(&ledger).unwrap();
        let lines: Vec<_> = report.text.lines().collect();

        assert_eq!(lines, ["- a : ERROR", "- b : ERROR", "- c : ERROR", "Some checks failed"]);
        assert_eq!(report.exit_code, 1);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let ledger = ledger_of(vec![StepOutcome::passed("a"), StepOutcome::failed("b", 1)]);
        assert_eq!(render(&ledger).unwrap(), render(&ledger).unwrap());
    }

    #[test]
    fn test_empty_ledger_cannot_be_rendered() {
        assert_eq!(render(&Ledger::new()).unwrap_err(), ConfigError::EmptyRun);
    }

    #[test]
    fn test_only_the_banner_follows_the_ui_language() {
        let ledger = ledger_of(vec![StepOutcome::passed("fmt")]);
        let report = render(&ledger).unwrap();

        let mut out = Vec::new();
        write_report(&report, &mut out, "zh-CN").unwrap();
        let written = String::from_utf8(out).unwrap();

        assert!(written.contains("--- 检查摘要 ---"));
        assert!(written.ends_with("- fmt : OK\nAll checks passed\n"));
    }
}

#[cfg(test)]
mod write_tests {
    use super::*;

    #[test]
    fn test_written_report_contains_the_rendered_text() {
        let ledger = ledger_of(vec![StepOutcome::passed("fmt")]);
        let report = render(&ledger).unwrap();

        let mut out = Vec::new();
        write_report(&report, &mut out, "en").unwrap();
        let written = String::from_utf8(out).unwrap();

        assert!(written.contains("--- Check Summary ---"));
        assert!(written.ends_with(&report.text));
    }

    #[test]
    fn test_failure_details_show_the_tail_of_the_log() {
        let project = setup_project(&[]);
        let log = project.path().join("check.log");
        let content: String = (1..=100).map(|i| format!("line {i}\n")).collect();
        fs::write(&log, content).unwrap();

        let mut failed = StepOutcome::failed("check feature contract", 101);
        failed.log_path = Some(log.clone());
        let mut passed = StepOutcome::passed("check feature collaboration");
        passed.log_path = Some(log);
        let ledger = ledger_of(vec![failed, passed]);

        let mut out = Vec::new();
        write_failure_details(&ledger, &mut out, "en").unwrap();
        let written = String::from_utf8(out).unwrap();

        assert!(written.contains("Log of 'check feature contract'"));
        assert!(!written.contains("check feature collaboration"));
        assert!(written.contains("line 100"));
        assert!(written.contains(&format!("line {}", 100 - FAILURE_LOG_TAIL + 1)));
        assert!(!written.contains(&format!("line {}\n", 100 - FAILURE_LOG_TAIL)));
    }

    #[test]
    fn test_failure_without_log_writes_nothing() {
        let project = setup_project(&[]);
        let mut missing = StepOutcome::failed("b", 1);
        missing.log_path = Some(project.path().join("never-written.log"));
        let ledger = ledger_of(vec![StepOutcome::failed("a", 1), missing]);

        let mut out = Vec::new();
        write_failure_details(&ledger, &mut out, "en").unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_plan_listing() {
        let project = setup_project(&[]);
        let config = parse_config(common::FEATURE_MATRIX);
        let plan = plan_execution(&config, &GroupSelection::Default, project.path()).unwrap();

        let mut out = Vec::new();
        write_plan(&plan, &mut out, "en").unwrap();
        let written = String::from_utf8(out).unwrap();

        assert!(written.contains("Group workspace"));
        assert!(written.contains("  - check feature contract"));
        assert!(written.contains("cargo check --features collaboration"));
        assert!(written.contains("2 check steps"));
    }
}
