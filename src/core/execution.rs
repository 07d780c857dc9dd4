//! # Check Step Execution Module / 检查步骤执行模块
//!
//! Runs the sub-commands of one check step in order. The first failing
//! sub-command ends the step; the failure is returned as data so the caller
//! can move on to the next step.
//!
//! 按顺序运行一个检查步骤的子命令。第一个失败的子命令会结束该步骤；
//! 失败作为数据返回，以便调用方继续执行下一个步骤。

use colored::*;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{
    core::models::{CheckStep, EXIT_CANCELLED, StepOutcome},
    infra::{command::CommandRunner, t},
};

/// Executes a single check step.
///
/// Sub-commands run sequentially. As soon as one fails, the remaining
/// sub-commands of the step are skipped and the failing exit code is
/// recorded. Cancellation is observed between sub-commands only; a running
/// child is always awaited.
///
/// 执行单个检查步骤。
/// 子命令按顺序运行。一旦某个子命令失败，该步骤剩余的子命令将被跳过，
/// 并记录失败的退出码。仅在子命令之间检查取消；正在运行的子进程总会被等待结束。
///
/// # Arguments
/// * `runner` - The command runner used for every sub-command
/// * `step` - The step to execute
/// * `cancel` - Token checked before each sub-command
///
/// # Returns
/// The `StepOutcome` of the step. Never an error.
pub async fn execute_step<R: CommandRunner>(
    runner: &R,
    step: &CheckStep,
    cancel: &CancellationToken,
) -> StepOutcome {
    println!("{}", t!("run.step_started", name = &step.name).blue());

    let start_time = Instant::now();
    let mut outcome = StepOutcome::passed(&step.name);

    for command in &step.commands {
        if cancel.is_cancelled() {
            println!("{}", t!("run.step_cancelled", name = &step.name).yellow());
            outcome.success = false;
            outcome.exit_code = Some(EXIT_CANCELLED);
            break;
        }

        println!("  {} {}", "$".dimmed(), command.display_line());
        let result = runner.run(command).await;

        if let Some(reason) = &result.launch_error {
            println!("  {}", t!("run.launch_failed", reason = reason).red());
        }

        if !result.succeeded() {
            outcome.success = false;
            outcome.exit_code = Some(result.exit_code);
            outcome.log_path = command.log_target.clone();
            break;
        }
        if command.log_target.is_some() {
            outcome.log_path = command.log_target.clone();
        }
    }

    outcome.duration = start_time.elapsed();
    let duration = format!("{:.2?}", outcome.duration);

    if outcome.success {
        println!(
            "{}",
            t!("run.step_passed", name = &step.name, duration = duration).green()
        );
    } else if !outcome.is_cancelled() {
        println!(
            "{}",
            t!(
                "run.step_failed",
                name = &step.name,
                code = outcome.exit_code.unwrap_or_default(),
                duration = duration
            )
            .red()
        );
    }

    outcome
}
