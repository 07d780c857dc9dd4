//! # Error Types / 错误类型
//!
//! Fatal errors of a check run. Step failures are not errors: they are
//! recorded as [`StepOutcome`](crate::core::models::StepOutcome) data and the
//! run continues. Only configuration and reporting problems interrupt it.
//!
//! 检查运行的致命错误。步骤失败不是错误：它们作为数据被记录，运行会继续。
//! 只有配置错误和报告错误会中断运行。

use std::path::PathBuf;

/// A broken check matrix. Always raised before the first command executes.
/// 损坏的检查矩阵。总是在第一个命令执行之前抛出。
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Two steps expanded to the same name.
    /// 两个步骤展开后得到相同的名称。
    #[error("duplicate check step name: '{name}'")]
    DuplicateStep { name: String },

    #[error("axis '{name}' is defined more than once")]
    DuplicateAxis { name: String },

    #[error("axis '{axis}' lists value '{value}' more than once")]
    DuplicateAxisValue { axis: String, value: String },

    /// A template references an axis that has no values.
    /// 模板引用了一个没有任何值的轴。
    #[error("axis '{axis}' has no values but is referenced by '{template}'")]
    EmptyAxis { axis: String, template: String },

    #[error("'{template}' references unknown axis '{axis}'")]
    UnknownAxis { template: String, axis: String },

    #[error("axis '{axis}' discovers values in '{}', which is not a directory", path.display())]
    MissingAxisSource { axis: String, path: PathBuf },

    #[error("working directory '{}' of step '{step}' does not exist", path.display())]
    MissingWorkingDir { step: String, path: PathBuf },

    #[error("invalid command in '{template}': {command:?}")]
    InvalidCommand { template: String, command: String },

    #[error("cannot expand '{word}' in '{template}': {reason}")]
    UndefinedVariable {
        template: String,
        word: String,
        reason: String,
    },

    #[error("unknown check group '{name}'")]
    UnknownGroup { name: String },

    /// Zero steps were executed or planned. An empty run is not a pass.
    /// 没有执行或计划任何步骤。空运行不算通过。
    #[error("the run contains no check steps")]
    EmptyRun,
}

/// Failure to emit the report.
/// 输出报告失败。
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write the report: {0}")]
    Write(#[from] std::io::Error),
}

/// Everything that can abort a run before it reaches `Done`.
/// 所有可能在运行到达 `Done` 之前中止运行的错误。
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Report(#[from] ReportError),
}
