//! # Run Orchestrator Module / 运行编排模块
//!
//! Drives one run through its phases:
//! `NotStarted -> Expanding -> Executing(i) -> ... -> Reporting -> Done`.
//!
//! Configuration errors abort during `Expanding`, before any command runs.
//! Once execution has started, every step is recorded and `Reporting` is
//! always reached, however many steps fail.
//!
//! 驱动一次运行经历各个阶段。配置错误会在 `Expanding` 阶段、任何命令运行之前中止运行。
//! 一旦开始执行，每个步骤都会被记录，并且无论多少步骤失败，总会到达 `Reporting` 阶段。

use colored::*;
use std::io::Write;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        config::{CheckConfig, GroupSelection},
        error::{ConfigError, RunError},
        execution::execute_step,
        ledger::Ledger,
        models::StepOutcome,
        planner::{self, ExecutionPlan},
    },
    infra::{command::CommandRunner, fs::TransientFiles, t},
    reporting::console::{self, Report},
};

/// Where a run currently is.
/// 运行当前所处的阶段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    NotStarted,
    Expanding,
    /// Executing the step at this index of the plan.
    /// 正在执行计划中该索引处的步骤。
    Executing(usize),
    Reporting,
    Done,
}

/// Everything a finished run produced.
/// 一次完成的运行所产生的全部内容。
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub ledger: Ledger,
    pub report: Report,
    /// The run was cancelled before every step could execute.
    /// 运行在所有步骤执行完之前被取消。
    pub interrupted: bool,
}

impl RunSummary {
    pub fn exit_code(&self) -> i32 {
        self.report.exit_code
    }
}

/// Sequential orchestrator over a [`CommandRunner`].
/// 基于 [`CommandRunner`] 的顺序编排器。
pub struct Orchestrator<R> {
    runner: R,
    cancel: CancellationToken,
    locale: String,
    phase: RunPhase,
}

impl<R: CommandRunner> Orchestrator<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            cancel: CancellationToken::new(),
            locale: rust_i18n::locale().to_string(),
            phase: RunPhase::NotStarted,
        }
    }

    /// Uses `token` to stop the run between sub-commands.
    /// 使用 `token` 在子命令之间停止运行。
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_locale(mut self, locale: &str) -> Self {
        self.locale = locale.to_string();
        self
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Runs the selected groups of `config` and writes the report to `out`.
    ///
    /// # Errors
    /// * `RunError::Config` - the matrix is broken; no command was executed
    /// * `RunError::Report` - the report could not be written
    pub async fn run(
        &mut self,
        config: &CheckConfig,
        selection: &GroupSelection,
        project_root: &Path,
        out: &mut impl Write,
    ) -> Result<RunSummary, RunError> {
        let plan = self.plan(config, selection, project_root)?;
        println!(
            "{}",
            t!(
                "run.plan_summary",
                count = plan.steps.len(),
                groups = plan.groups.join(", ")
            )
            .bold()
        );

        // Removes the logs on every exit path below, early returns included.
        let mut logs = TransientFiles::new();
        for path in plan.log_targets() {
            logs.register(path);
        }

        let ledger = self.execute(&plan).await?;
        let report = self.report(&ledger, out)?;

        for (path, e) in logs.cleanup() {
            eprintln!(
                "{}",
                t!("run.log_cleanup_failed", path = path.display(), error = e).yellow()
            );
        }
        self.phase = RunPhase::Done;

        let interrupted = ledger.iter().any(StepOutcome::is_cancelled);
        Ok(RunSummary {
            ledger,
            report,
            interrupted,
        })
    }

    /// Expands and validates the selected groups.
    /// 展开并验证所选的检查组。
    pub fn plan(
        &mut self,
        config: &CheckConfig,
        selection: &GroupSelection,
        project_root: &Path,
    ) -> Result<ExecutionPlan, ConfigError> {
        self.phase = RunPhase::Expanding;
        planner::plan_execution(config, selection, project_root)
    }

    /// Executes every step of the plan in order and records each outcome.
    /// Steps reached after cancellation are recorded as cancelled without
    /// running anything.
    ///
    /// 按顺序执行计划中的每个步骤并记录每个结果。
    /// 取消之后才轮到的步骤会被记录为已取消，且不运行任何命令。
    pub async fn execute(&mut self, plan: &ExecutionPlan) -> Result<Ledger, ConfigError> {
        let mut ledger = Ledger::new();
        let mut current_group: Option<&str> = None;

        for (i, step) in plan.steps.iter().enumerate() {
            self.phase = RunPhase::Executing(i);

            if self.cancel.is_cancelled() {
                ledger.record(StepOutcome::cancelled(&step.name))?;
                continue;
            }

            if current_group != Some(step.group.as_str()) && !step.group.is_empty() {
                println!(
                    "\n{}",
                    t!("run.group_started", name = &step.group).cyan().bold()
                );
                current_group = Some(step.group.as_str());
            }

            let outcome = execute_step(&self.runner, step, &self.cancel).await;
            ledger.record(outcome)?;
        }

        Ok(ledger)
    }

    /// Renders the ledger and writes the report and failure details to `out`.
    /// 渲染台账，并将报告和失败详情写入 `out`。
    pub fn report(&mut self, ledger: &Ledger, out: &mut impl Write) -> Result<Report, RunError> {
        self.phase = RunPhase::Reporting;
        let report = console::render(ledger)?;
        console::write_report(&report, out, &self.locale)?;
        console::write_failure_details(ledger, out, &self.locale)?;
        Ok(report)
    }
}
