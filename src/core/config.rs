//! # Configuration Module / 配置模块
//!
//! The check matrix is configuration data loaded from a TOML file: global
//! settings, the axes of the matrix, and the check groups with their
//! parametrized step templates.
//!
//! 检查矩阵是从 TOML 文件加载的配置数据：全局设置、矩阵的轴，
//! 以及包含参数化步骤模板的检查组。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::error::ConfigError;

/// Name of the group selected by `-e`.
pub const EXAMPLES_GROUP: &str = "examples";
/// Name of the group selected by `-w`.
pub const WORKSPACE_GROUP: &str = "workspace";

/// Represents the entire check matrix configuration, loaded from a TOML file.
/// 代表从 TOML 文件加载的整个检查矩阵配置。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckConfig {
    /// The language for the runner's output messages (e.g., "en", "zh-CN").
    /// Defaults to "en" if not specified.
    ///
    /// 运行器输出消息的语言（例如 "en", "zh-CN"）。
    /// 如果未指定，则默认为 "en"。
    #[serde(default = "default_language")]
    pub language: String,

    /// Environment overrides passed to every spawned command.
    /// 传递给每个子进程的环境变量覆盖。
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Groups to run when no selection flag is given. `None` means every
    /// group, in file order.
    /// 未提供选择标志时运行的检查组。`None` 表示按文件顺序运行所有组。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_groups: Option<Vec<String>>,

    /// The axes of the matrix, in the order that drives expansion loops.
    /// 矩阵的轴，其顺序决定展开循环的嵌套顺序。
    #[serde(default)]
    pub axes: Vec<AxisConfig>,

    /// The check groups, in execution order.
    /// 检查组，按执行顺序排列。
    pub groups: Vec<CheckGroup>,
}

fn default_language() -> String {
    "en".to_string()
}

/// An axis as written in the configuration. Values are either listed
/// literally or discovered from directories at planning time.
/// 配置中书写的轴。值可以直接列出，也可以在规划时从目录中发现。
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AxisConfig {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
    /// Directories whose immediate sub-directories become values
    /// (project-relative, sorted by name within each directory).
    /// 其直接子目录成为轴值的目录（相对于项目根目录，每个目录内按名称排序）。
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dirs_in: Vec<String>,
}

/// A named, independently selectable set of check steps.
/// 一个具名的、可独立选择的检查步骤集合。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckGroup {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub steps: Vec<StepTemplate>,
}

/// A parametrized step. `{axis}` placeholders in the label, commands,
/// directories and log targets are substituted during expansion.
/// 参数化的步骤。标签、命令、目录和日志目标中的 `{axis}` 占位符在展开时被替换。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StepTemplate {
    pub label: String,
    /// Default working directory for the commands of this step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    pub commands: Vec<CommandTemplate>,
}

impl StepTemplate {
    /// Shorthand used by tests and the default configuration.
    pub fn new(label: &str, runs: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            dir: None,
            commands: runs.iter().map(|run| CommandTemplate::new(run)).collect(),
        }
    }
}

/// A single command line inside a step template.
/// 步骤模板中的单条命令行。
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CommandTemplate {
    /// The command line, split with shell-word rules.
    /// 命令行，按 shell 单词规则拆分。
    pub run: String,
    /// Working directory, overriding the step's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    /// File receiving combined stdout and stderr, overwritten on each run.
    /// 接收合并后的 stdout 和 stderr 的文件，每次运行时覆盖。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
}

impl CommandTemplate {
    pub fn new(run: &str) -> Self {
        Self {
            run: run.to_string(),
            ..Self::default()
        }
    }
}

/// Which groups a run executes.
/// 一次运行执行哪些检查组。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GroupSelection {
    /// No selection flags were given: run the configured default groups.
    /// 未提供任何选择标志：运行配置的默认组。
    #[default]
    Default,
    /// Run exactly these groups.
    /// 仅运行这些组。
    Only(Vec<String>),
}

impl GroupSelection {
    /// Builds the selection from the CLI flags. `-e` and `-w` are shorthands
    /// for the `examples` and `workspace` groups.
    ///
    /// 根据 CLI 标志构建选择。`-e` 和 `-w` 分别是 `examples` 和 `workspace` 组的简写。
    pub fn from_flags(examples: bool, workspace: bool, groups: Vec<String>) -> Self {
        let mut names = Vec::new();
        if workspace {
            names.push(WORKSPACE_GROUP.to_string());
        }
        if examples {
            names.push(EXAMPLES_GROUP.to_string());
        }
        names.extend(groups);

        if names.is_empty() {
            GroupSelection::Default
        } else {
            GroupSelection::Only(names)
        }
    }

    /// Resolves the selection against the configuration. Groups come back in
    /// configuration order, each at most once.
    ///
    /// 根据配置解析选择。返回的组按配置顺序排列，每组至多出现一次。
    pub fn resolve<'a>(&self, config: &'a CheckConfig) -> Result<Vec<&'a CheckGroup>, ConfigError> {
        let wanted: Vec<String> = match self {
            GroupSelection::Default => match &config.default_groups {
                Some(names) => names.clone(),
                None => return Ok(config.groups.iter().collect()),
            },
            GroupSelection::Only(names) => names.clone(),
        };

        if let Some(unknown) = wanted
            .iter()
            .find(|name| !config.groups.iter().any(|g| &g.name == *name))
        {
            return Err(ConfigError::UnknownGroup {
                name: unknown.clone(),
            });
        }

        Ok(config
            .groups
            .iter()
            .filter(|group| wanted.contains(&group.name))
            .collect())
    }
}

