//! # Console Reporting Module / 控制台报告模块
//!
//! This module renders the ledger of a run as a deterministic summary and
//! maps the verdict onto the process exit code. Rendering is pure; writing
//! is a separate step so the summary can be tested without running anything.
//!
//! 此模块将一次运行的台账渲染为确定性的摘要，并将裁决映射为进程退出码。
//! 渲染是纯函数；写出是单独的步骤，因此无需运行任何命令即可测试摘要。

use colored::*;
use std::io::Write;

use crate::core::error::{ConfigError, ReportError};
use crate::core::ledger::Ledger;
use crate::core::planner::ExecutionPlan;
use crate::infra::{fs, t};

/// Number of log lines shown for each failing step.
pub const FAILURE_LOG_TAIL: usize = 40;

/// Summary line of a run in which every step passed.
pub const ALL_PASSED: &str = "All checks passed";
/// Summary line of a run with at least one failing step.
pub const SOME_FAILED: &str = "Some checks failed";

/// The rendered summary of a run.
/// 一次运行的渲染摘要。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// One line per step in execution order, then one summary line.
    /// 按执行顺序每个步骤一行，然后是一行总结。
    pub text: String,
    /// 0 iff every step passed, 1 otherwise.
    /// 当且仅当所有步骤都通过时为 0，否则为 1。
    pub exit_code: i32,
}

impl Report {
    pub fn passed(&self) -> bool {
        self.exit_code == 0
    }
}

/// Renders the ledger as plain text. The text is the same for every UI
/// language, only the banner printed by [`write_report`] is localized.
///
/// # Output Format / 输出格式
/// ```text
/// - check feature contract : ERROR
/// - check feature collaboration : OK
/// Some checks failed
/// ```
///
/// # Errors
/// `EmptyRun` if the ledger holds no outcome.
pub fn render(ledger: &Ledger) -> Result<Report, ConfigError> {
    let verdict = ledger.verdict()?;

    let mut text = String::new();
    for outcome in ledger.iter() {
        let status = if outcome.success { "OK" } else { "ERROR" };
        text.push_str(&format!("- {} : {}\n", outcome.name, status));
    }

    text.push_str(if verdict { ALL_PASSED } else { SOME_FAILED });
    text.push('\n');

    Ok(Report {
        text,
        exit_code: if verdict { 0 } else { 1 },
    })
}

/// Writes a rendered report to the reporting stream.
/// 将渲染好的报告写入报告输出流。
pub fn write_report(report: &Report, out: &mut impl Write, locale: &str) -> Result<(), ReportError> {
    writeln!(out)?;
    writeln!(out, "{}", t!("report.banner", locale = locale).bold())?;
    out.write_all(report.text.as_bytes())?;
    out.flush()?;
    Ok(())
}

/// Prints the tail of the captured log of every failing step that has one.
/// Logs are displayed as-is and never interpreted.
///
/// 打印每个失败步骤所捕获日志的末尾部分（如果有）。日志按原样显示，从不解析。
pub fn write_failure_details(
    ledger: &Ledger,
    out: &mut impl Write,
    locale: &str,
) -> Result<(), ReportError> {
    let with_logs: Vec<_> = ledger
        .failures()
        .filter_map(|outcome| outcome.log_path.as_ref().map(|log| (outcome, log)))
        .filter(|(_, log)| log.is_file())
        .collect();

    for (i, (outcome, log)) in with_logs.iter().enumerate() {
        writeln!(out)?;
        writeln!(
            out,
            "[{}/{}] {}",
            i + 1,
            with_logs.len(),
            t!(
                "report.log_header",
                locale = locale,
                name = &outcome.name,
                path = log.display(),
                lines = FAILURE_LOG_TAIL
            )
            .red()
        )?;
        writeln!(out, "{}", "-".repeat(80))?;
        match fs::tail_lines(log, FAILURE_LOG_TAIL) {
            Ok(lines) => {
                for line in lines {
                    writeln!(out, "{line}")?;
                }
            }
            Err(e) => writeln!(out, "{}", t!("report.log_unreadable", locale = locale, error = e).yellow())?,
        }
        writeln!(out, "{}", "-".repeat(80))?;
    }
    Ok(())
}

/// Prints the expanded plan without running it.
/// 打印展开后的计划而不运行它。
pub fn write_plan(plan: &ExecutionPlan, out: &mut impl Write, locale: &str) -> Result<(), ReportError> {
    let mut current_group: Option<&str> = None;
    for step in &plan.steps {
        if current_group != Some(step.group.as_str()) {
            writeln!(out, "{}", t!("plan.group", locale = locale, name = &step.group).cyan().bold())?;
            current_group = Some(step.group.as_str());
        }
        writeln!(out, "  - {}", step.name)?;
        for command in &step.commands {
            writeln!(
                out,
                "      {} {}  {}",
                "$".dimmed(),
                command.display_line(),
                format!("({})", command.working_dir.display()).dimmed()
            )?;
        }
    }
    writeln!(
        out,
        "{}",
        t!("plan.total", locale = locale, count = plan.steps.len()).bold()
    )?;
    Ok(())
}
