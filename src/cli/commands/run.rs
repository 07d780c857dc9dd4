//! # Run Command Module / 运行命令模块
//!
//! This module implements the default command of the Workspace Checker CLI,
//! which executes the selected check groups according to the configuration.
//!
//! 此模块实现了 Workspace Checker CLI 的默认命令，
//! 根据配置执行所选的检查组。

use anyhow::{Context, Result};
use colored::*;
use std::{fs, io, path::PathBuf};
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        config::{CheckConfig, GroupSelection},
        orchestrator::Orchestrator,
        planner,
    },
    infra::{command::ProcessRunner, fs::absolute_path, t},
    match_locale,
    reporting::console::write_plan,
};

/// Options of a check run, as parsed from the command line.
/// 从命令行解析出的检查运行选项。
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub selection: GroupSelection,
    pub config: PathBuf,
    pub project_dir: PathBuf,
    /// Print the expanded plan instead of executing it.
    pub list: bool,
    /// Overrides the language from the configuration.
    pub lang: Option<String>,
}

/// Executes the run command with the provided options.
///
/// # Returns
/// The process exit code of the run: 0 when every check passed, 1 otherwise.
/// Configuration and reporting errors are returned as `Err`.
pub async fn execute(options: RunOptions) -> Result<i32> {
    let (config, config_path) = setup_and_parse_config(&options.config)?;
    let locale = match_locale(options.lang.as_deref().unwrap_or(&config.language));
    rust_i18n::set_locale(&locale);

    let project_root = absolute_path(&options.project_dir)
        .with_context(|| t!("project_dir_not_found", path = options.project_dir.display()))?;

    println!(
        "{}",
        t!("project_root_detected", path = project_root.display())
    );
    println!(
        "{}",
        t!("loading_check_matrix", path = config_path.display())
    );
    for (key, value) in &config.env {
        println!("{}", t!("env_override", key = key, value = value).dimmed());
    }

    if options.list {
        let plan = planner::plan_execution(&config, &options.selection, &project_root)?;
        write_plan(&plan, &mut io::stdout().lock(), &locale)?;
        return Ok(0);
    }

    let stop_token = setup_signal_handler();
    let runner = ProcessRunner::new(config.env.clone());
    let mut orchestrator = Orchestrator::new(runner)
        .with_cancellation(stop_token)
        .with_locale(&locale);

    let mut stdout = io::stdout();
    let summary = orchestrator
        .run(&config, &options.selection, &project_root, &mut stdout)
        .await?;

    if summary.interrupted {
        println!("\n{}", t!("run.interrupted").yellow().bold());
    }

    Ok(summary.exit_code())
}

fn setup_and_parse_config(config_path_arg: &PathBuf) -> Result<(CheckConfig, PathBuf)> {
    let config_path = fs::canonicalize(config_path_arg)
        .with_context(|| t!("config_read_failed_path", path = config_path_arg.display()))?;

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| t!("config_read_failed_path", path = config_path.display()))?;

    let config: CheckConfig =
        toml::from_str(&config_content).with_context(|| t!("config_parse_failed", path = config_path.display()))?;

    Ok((config, config_path))
}

/// Cancels the returned token on Ctrl-C. Children in the foreground process
/// group receive the signal themselves; the orchestrator only stops starting
/// new commands.
fn setup_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            println!("\n{}", t!("shutdown_signal").yellow());
            token_clone.cancel();
        }
    });

    token
}
