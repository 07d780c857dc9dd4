//! # Command Runner Module / 命令运行模块
//!
//! The only place that spawns processes. The rest of the crate talks to the
//! [`CommandRunner`] trait, so the orchestration logic is the same on every
//! platform and can be driven by a fake in tests.
//!
//! 这是唯一派生进程的地方。crate 的其余部分通过 [`CommandRunner`] trait 交互，
//! 因此编排逻辑在所有平台上都相同，并且可以在测试中由伪实现驱动。

use std::collections::BTreeMap;
use std::fs::File;
use std::future::Future;
use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use crate::core::models::{CommandOutcome, SubCommand};
use crate::infra::fs;

/// Executes a single external command and reports how it ended.
///
/// Implementations never retry and never impose a timeout: the call resolves
/// once the child has exited. A command that cannot be started resolves to a
/// failed [`CommandOutcome`] carrying a synthetic exit code, not to an error.
///
/// 执行单个外部命令并报告其结束方式。
///
/// 实现从不重试，也从不施加超时：子进程退出后调用才会完成。
/// 无法启动的命令会得到一个带有合成退出码的失败 [`CommandOutcome`]，而不是错误。
pub trait CommandRunner {
    fn run(&self, command: &SubCommand) -> impl Future<Output = CommandOutcome>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, command: &SubCommand) -> impl Future<Output = CommandOutcome> {
        (**self).run(command)
    }
}

/// Runs commands as child processes of the orchestrator.
///
/// The children inherit the parent's environment plus the configured
/// overrides, which are applied to every spawned process.
///
/// 以编排器子进程的方式运行命令。
/// 子进程继承父进程的环境变量以及配置的覆盖项，覆盖项会应用于每个派生的进程。
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    env: BTreeMap<String, String>,
}

impl ProcessRunner {
    pub fn new(env: BTreeMap<String, String>) -> Self {
        Self { env }
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }
}

impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &SubCommand) -> CommandOutcome {
        if !fs::is_directory(&command.working_dir) {
            return CommandOutcome::launch_failed(format!(
                "working directory {} does not exist",
                command.working_dir.display()
            ));
        }

        let mut cmd = tokio::process::Command::new(&command.program);
        cmd.args(&command.args)
            .current_dir(&command.working_dir)
            .envs(&self.env)
            .kill_on_drop(true);

        if let Some(log) = &command.log_target {
            match open_log(log) {
                Ok((stdout, stderr)) => {
                    cmd.stdout(stdout).stderr(stderr);
                }
                Err(e) => {
                    return CommandOutcome::launch_failed(format!(
                        "cannot open log file {}: {}",
                        log.display(),
                        e
                    ));
                }
            }
        }

        match cmd.status().await {
            Ok(status) => outcome_from_status(status),
            Err(e) => CommandOutcome::launch_failed(format!("{}: {}", command.program, e)),
        }
    }
}

/// Creates (or truncates) the log file and hands out two handles to it, so
/// stdout and stderr end up interleaved in one file.
/// 创建（或截断）日志文件并提供两个句柄，使 stdout 和 stderr 交错写入同一个文件。
fn open_log(path: &Path) -> io::Result<(Stdio, Stdio)> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    let clone = file.try_clone()?;
    Ok((Stdio::from(file), Stdio::from(clone)))
}

fn outcome_from_status(status: ExitStatus) -> CommandOutcome {
    match status.code() {
        Some(code) => CommandOutcome::exited(code),
        None => CommandOutcome::terminated(),
    }
}
