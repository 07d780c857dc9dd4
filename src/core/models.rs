//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures of a check run: the axes of
//! the matrix, the concrete check steps produced by expansion, and the
//! outcomes recorded for commands and steps.
//!
//! 此模块定义了检查运行的核心数据结构：矩阵的轴、展开后得到的具体检查步骤，
//! 以及为命令和步骤记录的结果。

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::error::ConfigError;

/// The program could not be started (not found, not executable, missing
/// working directory, unwritable log target).
/// 程序无法启动（未找到、不可执行、工作目录缺失、日志目标不可写）。
pub const EXIT_LAUNCH_FAILED: i32 = -1;
/// The process ended without an exit status, e.g. killed by a signal.
/// 进程结束时没有退出状态，例如被信号杀死。
pub const EXIT_TERMINATED: i32 = -2;
/// The step was not (fully) executed because the run was cancelled.
/// 由于运行被取消，该步骤未（完整）执行。
pub const EXIT_CANCELLED: i32 = -3;

/// A named dimension of the check matrix with its ordered values.
/// 检查矩阵的一个具名维度及其有序值。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Axis {
    name: String,
    values: Vec<String>,
}

impl Axis {
    /// Creates an axis, rejecting repeated values. An empty value list is
    /// accepted here and rejected by the expander as soon as a template
    /// references the axis.
    ///
    /// 创建一个轴，拒绝重复的值。空值列表在此处被接受，
    /// 但一旦有模板引用该轴，展开器就会拒绝它。
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        let mut seen = HashSet::new();
        for value in &values {
            if !seen.insert(value.as_str()) {
                return Err(ConfigError::DuplicateAxisValue {
                    axis: name,
                    value: value.clone(),
                });
            }
        }
        Ok(Self { name, values })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// One external command of a check step.
/// 检查步骤中的一个外部命令。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubCommand {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    /// When set, combined stdout and stderr go to this file instead of the terminal.
    /// 设置后，合并的 stdout 和 stderr 将写入此文件而不是终端。
    pub log_target: Option<PathBuf>,
}

impl SubCommand {
    /// Renders the command line for display, quoting words where needed.
    /// 渲染命令行以供显示，必要时为单词加引号。
    pub fn display_line(&self) -> String {
        let words = std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        shlex::try_join(words).unwrap_or_else(|_| {
            let mut line = self.program.clone();
            for arg in &self.args {
                line.push(' ');
                line.push_str(arg);
            }
            line
        })
    }
}

/// A concrete, named unit of work produced by matrix expansion.
/// 由矩阵展开产生的具体的、具名的工作单元。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckStep {
    /// Unique within a run.
    /// 在一次运行中唯一。
    pub name: String,
    /// The group the step was expanded from. Empty for ad-hoc expansions.
    /// 步骤所属的检查组。对于临时展开则为空。
    pub group: String,
    pub commands: Vec<SubCommand>,
}

impl CheckStep {
    /// Log files this step may create.
    pub fn log_targets(&self) -> impl Iterator<Item = &PathBuf> {
        self.commands.iter().filter_map(|c| c.log_target.as_ref())
    }
}

/// The result of a single command invocation.
/// 单次命令调用的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// The tool's exit code, or one of the negative synthetic codes.
    /// 工具的退出码，或某个负数的合成退出码。
    pub exit_code: i32,
    /// Why the command could not be launched, if it could not.
    pub launch_error: Option<String>,
}

impl CommandOutcome {
    pub fn exited(exit_code: i32) -> Self {
        Self {
            exit_code,
            launch_error: None,
        }
    }

    pub fn launch_failed(reason: impl Into<String>) -> Self {
        Self {
            exit_code: EXIT_LAUNCH_FAILED,
            launch_error: Some(reason.into()),
        }
    }

    pub fn terminated() -> Self {
        Self::exited(EXIT_TERMINATED)
    }

    pub fn succeeded(&self) -> bool {
        self.launch_error.is_none() && self.exit_code == 0
    }
}

/// The recorded result of executing one check step.
/// 执行一个检查步骤后记录的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub name: String,
    /// `true` iff every sub-command exited with status 0.
    /// 当且仅当每个子命令都以状态 0 退出时为 `true`。
    pub success: bool,
    /// Exit code of the first failing sub-command.
    /// 第一个失败子命令的退出码。
    pub exit_code: Option<i32>,
    /// Log of the failing sub-command, or of the last one that wrote a log.
    /// 失败子命令的日志，或最后一个写入日志的子命令的日志。
    pub log_path: Option<PathBuf>,
    pub duration: Duration,
}

impl StepOutcome {
    pub fn passed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            success: true,
            exit_code: None,
            log_path: None,
            duration: Duration::ZERO,
        }
    }

    pub fn failed(name: impl Into<String>, exit_code: i32) -> Self {
        Self {
            name: name.into(),
            success: false,
            exit_code: Some(exit_code),
            log_path: None,
            duration: Duration::ZERO,
        }
    }

    /// A step that never ran because the run was cancelled before it.
    /// 由于运行在其之前被取消而从未执行的步骤。
    pub fn cancelled(name: impl Into<String>) -> Self {
        Self::failed(name, EXIT_CANCELLED)
    }

    pub fn is_cancelled(&self) -> bool {
        self.exit_code == Some(EXIT_CANCELLED)
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.success, self.exit_code) {
            (true, _) => write!(f, "{}: ok", self.name),
            (false, Some(code)) => write!(f, "{}: failed with exit code {}", self.name, code),
            (false, None) => write!(f, "{}: failed", self.name),
        }
    }
}
