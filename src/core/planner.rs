//! # Check Matrix Planner Module / 检查矩阵计划模块
//!
//! This module expands step templates over the axes of the matrix into the
//! ordered list of concrete check steps, and turns a configuration plus a
//! group selection into an execution plan that is fully validated before
//! anything runs.
//!
//! 此模块将步骤模板在矩阵的轴上展开为有序的具体检查步骤列表，
//! 并将配置和组选择转换为在任何命令运行之前就已完全验证的执行计划。

use std::collections::{BTreeMap, HashSet};
use std::env::VarError;
use std::path::{Path, PathBuf};

use crate::core::config::{AxisConfig, CheckConfig, GroupSelection, StepTemplate};
use crate::core::error::ConfigError;
use crate::core::models::{Axis, CheckStep, SubCommand};
use crate::infra::fs;

/// A validated, ready-to-execute sequence of check steps.
/// 一个已验证的、可直接执行的检查步骤序列。
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    /// Names of the selected groups, in execution order.
    /// 所选组的名称，按执行顺序排列。
    pub groups: Vec<String>,
    /// The steps to run, in execution order. Never empty.
    /// 要运行的步骤，按执行顺序排列。永不为空。
    pub steps: Vec<CheckStep>,
}

impl ExecutionPlan {
    /// Every log file the plan may create, without duplicates.
    /// 计划可能创建的所有日志文件，无重复。
    pub fn log_targets(&self) -> Vec<PathBuf> {
        let mut targets: Vec<PathBuf> = Vec::new();
        for path in self.steps.iter().flat_map(CheckStep::log_targets) {
            if !targets.contains(path) {
                targets.push(path.clone());
            }
        }
        targets
    }
}

/// Creates an execution plan for the selected groups of the configuration.
/// This resolves the axes the selected templates reference, expands every
/// group, anchors relative paths at `project_root`, and rejects duplicate
/// step names, missing working directories and empty runs.
///
/// 为配置中选定的组创建执行计划。
/// 这会解析所选模板引用的轴，展开每个组，将相对路径锚定到 `project_root`，
/// 并拒绝重复的步骤名称、缺失的工作目录和空运行。
///
/// # Arguments
/// * `config` - The parsed check matrix configuration
/// * `selection` - Which groups to plan
/// * `project_root` - Directory that relative paths are resolved against
pub fn plan_execution(
    config: &CheckConfig,
    selection: &GroupSelection,
    project_root: &Path,
) -> Result<ExecutionPlan, ConfigError> {
    let groups = selection.resolve(config)?;

    let referenced: HashSet<String> = groups
        .iter()
        .flat_map(|group| group.steps.iter())
        .flat_map(referenced_axes)
        .collect();
    let axes = resolve_axes(&config.axes, project_root, &referenced)?;

    let mut names = HashSet::new();
    let mut steps = Vec::new();
    for group in &groups {
        for mut step in expand_with_env(&axes, &group.steps, &config.env)? {
            if !names.insert(step.name.clone()) {
                return Err(ConfigError::DuplicateStep { name: step.name });
            }
            step.group = group.name.clone();
            for command in &mut step.commands {
                command.working_dir = rebase(project_root, &command.working_dir);
                command.log_target = command.log_target.as_deref().map(|log| rebase(project_root, log));
                if !fs::is_directory(&command.working_dir) {
                    return Err(ConfigError::MissingWorkingDir {
                        step: step.name.clone(),
                        path: command.working_dir.clone(),
                    });
                }
            }
            steps.push(step);
        }
    }

    if steps.is_empty() {
        return Err(ConfigError::EmptyRun);
    }

    Ok(ExecutionPlan {
        groups: groups.iter().map(|g| g.name.clone()).collect(),
        steps,
    })
}

/// Expands step templates over the axes into concrete check steps.
///
/// Each template yields one step per combination of the values of the axes
/// it references. The first configured axis is the outermost loop. A template
/// that references no axis yields exactly one step. Paths in the result are
/// left as written (relative paths stay relative).
///
/// 将步骤模板在轴上展开为具体的检查步骤。
///
/// 每个模板为其引用的轴的每种取值组合生成一个步骤。第一个配置的轴是最外层循环。
/// 不引用任何轴的模板恰好生成一个步骤。结果中的路径保持原样（相对路径仍为相对路径）。
///
/// # Errors
/// * `UnknownAxis` - a placeholder names an axis that is not configured
/// * `EmptyAxis` - a referenced axis has no values
/// * `InvalidCommand` / `UndefinedVariable` - a command cannot be split or expanded
/// * `DuplicateStep` - two steps share a name
pub fn expand(axes: &[Axis], templates: &[StepTemplate]) -> Result<Vec<CheckStep>, ConfigError> {
    expand_with_env(axes, templates, &BTreeMap::new())
}

/// Like [`expand`], but `$VAR` references are looked up in `env` before the
/// process environment, so variables defined in the `[env]` table of the
/// configuration can be used in commands, directories and log paths.
///
/// 与 [`expand`] 相同，但 `$VAR` 引用会先在 `env` 中查找，再查找进程环境，
/// 因此配置 `[env]` 表中定义的变量可以用于命令、目录和日志路径。
pub fn expand_with_env(
    axes: &[Axis],
    templates: &[StepTemplate],
    env: &BTreeMap<String, String>,
) -> Result<Vec<CheckStep>, ConfigError> {
    let mut names = HashSet::new();
    let mut steps = Vec::new();

    for template in templates {
        for step in expand_template(axes, template, env)? {
            if !names.insert(step.name.clone()) {
                return Err(ConfigError::DuplicateStep { name: step.name });
            }
            steps.push(step);
        }
    }

    Ok(steps)
}

/// A command template after shell-word splitting, before substitution.
struct SplitCommand<'a> {
    words: Vec<String>,
    dir: Option<&'a str>,
    log: Option<&'a str>,
}

fn expand_template(
    axes: &[Axis],
    template: &StepTemplate,
    env: &BTreeMap<String, String>,
) -> Result<Vec<CheckStep>, ConfigError> {
    let commands = template
        .commands
        .iter()
        .map(|command| {
            let words = shlex::split(&protect_literals(&command.run))
                .filter(|words| !words.is_empty())
                .ok_or_else(|| ConfigError::InvalidCommand {
                    template: template.label.clone(),
                    command: command.run.clone(),
                })?;
            Ok(SplitCommand {
                words,
                dir: command.dir.as_deref().or(template.dir.as_deref()),
                log: command.log.as_deref(),
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    if commands.is_empty() {
        return Err(ConfigError::InvalidCommand {
            template: template.label.clone(),
            command: String::new(),
        });
    }

    let referenced = referenced_axes(template);
    if let Some(unknown) = referenced
        .iter()
        .find(|name| !axes.iter().any(|axis| axis.name() == name.as_str()))
    {
        return Err(ConfigError::UnknownAxis {
            template: template.label.clone(),
            axis: unknown.clone(),
        });
    }

    // Configured order, not placeholder order, drives the loop nesting.
    let used: Vec<&Axis> = axes
        .iter()
        .filter(|axis| referenced.iter().any(|name| name == axis.name()))
        .collect();
    if let Some(empty) = used.iter().find(|axis| axis.values().is_empty()) {
        return Err(ConfigError::EmptyAxis {
            axis: empty.name().to_string(),
            template: template.label.clone(),
        });
    }

    let total: usize = used.iter().map(|axis| axis.values().len()).product();
    let mut cursor = vec![0usize; used.len()];
    let mut steps = Vec::with_capacity(total);

    for _ in 0..total {
        let binding: Vec<(&str, &str)> = used
            .iter()
            .zip(&cursor)
            .map(|(axis, &i)| (axis.name(), axis.values()[i].as_str()))
            .collect();
        steps.push(instantiate(template, &commands, &binding, env)?);

        // Advance the innermost axis first.
        for pos in (0..cursor.len()).rev() {
            cursor[pos] += 1;
            if cursor[pos] < used[pos].values().len() {
                break;
            }
            cursor[pos] = 0;
        }
    }

    Ok(steps)
}

fn instantiate(
    template: &StepTemplate,
    commands: &[SplitCommand<'_>],
    binding: &[(&str, &str)],
    env: &BTreeMap<String, String>,
) -> Result<CheckStep, ConfigError> {
    let expand_word = |word: &str| -> Result<String, ConfigError> {
        let substituted = interpolate(word, binding);
        expand_variables(&substituted, env)
            .map(|expanded| restore_literals(&expanded))
            .map_err(|e| ConfigError::UndefinedVariable {
                template: template.label.clone(),
                word: restore_literals(&substituted),
                reason: e.to_string(),
            })
    };

    let mut concrete = Vec::with_capacity(commands.len());
    for command in commands {
        let mut words = command
            .words
            .iter()
            .map(|word| expand_word(word))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter();
        let program = words.next().unwrap_or_default();

        concrete.push(SubCommand {
            program,
            args: words.collect(),
            working_dir: PathBuf::from(expand_word(command.dir.unwrap_or("."))?),
            log_target: command.log.map(|log| expand_word(log)).transpose()?.map(PathBuf::from),
        });
    }

    Ok(CheckStep {
        name: interpolate(&template.label, binding),
        group: String::new(),
        commands: concrete,
    })
}

/// Expands `$VAR`/`${VAR}` from `env` or the process environment, then a
/// leading `~`. A `~` that only appears through a variable value stays as is.
fn expand_variables(
    word: &str,
    env: &BTreeMap<String, String>,
) -> Result<String, shellexpand::LookupError<VarError>> {
    let expanded = shellexpand::env_with_context(word, |name| match env.get(name) {
        Some(value) => Ok(Some(value.clone())),
        None => std::env::var(name).map(Some),
    })?;
    if word.starts_with('~') {
        Ok(shellexpand::tilde(&*expanded).into_owned())
    } else {
        Ok(expanded.into_owned())
    }
}

/// Private-use stand-ins for `$` and `~` characters the shell keeps literal.
const LITERAL_DOLLAR: char = '\u{E000}';
const LITERAL_TILDE: char = '\u{E001}';

#[derive(Clone, Copy, PartialEq)]
enum Quote {
    None,
    Single,
    Double,
}

/// Marks the `$` and `~` that quoting or a backslash makes literal, so that
/// expansion after word splitting leaves them alone. Single quotes protect
/// both, double quotes protect `~` only.
fn protect_literals(run: &str) -> String {
    let mut out = String::with_capacity(run.len());
    let mut quote = Quote::None;
    let mut chars = run.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Quote::Single, '\'') | (Quote::Double, '"') => {
                quote = Quote::None;
                out.push(c);
            }
            (Quote::Single, '$') => out.push(LITERAL_DOLLAR),
            (Quote::Single | Quote::Double, '~') => out.push(LITERAL_TILDE),
            (Quote::None, '\'') => {
                quote = Quote::Single;
                out.push(c);
            }
            (Quote::None, '"') => {
                quote = Quote::Double;
                out.push(c);
            }
            (Quote::None | Quote::Double, '\\') => match chars.next() {
                Some('$') => out.push(LITERAL_DOLLAR),
                Some('~') if quote == Quote::None => out.push(LITERAL_TILDE),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            },
            _ => out.push(c),
        }
    }
    out
}

fn restore_literals(word: &str) -> String {
    word.replace(LITERAL_DOLLAR, "$").replace(LITERAL_TILDE, "~")
}

/// Axis names referenced by a template, in order of first appearance.
/// 模板引用的轴名称，按首次出现的顺序排列。
pub fn referenced_axes(template: &StepTemplate) -> Vec<String> {
    let texts = std::iter::once(template.label.as_str())
        .chain(template.dir.as_deref())
        .chain(template.commands.iter().flat_map(|c| {
            std::iter::once(c.run.as_str())
                .chain(c.dir.as_deref())
                .chain(c.log.as_deref())
        }));

    let mut names: Vec<String> = Vec::new();
    for text in texts {
        for piece in scan(text) {
            if let Piece::Axis(name) = piece {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
    }
    names
}

fn resolve_axes(
    configs: &[AxisConfig],
    project_root: &Path,
    referenced: &HashSet<String>,
) -> Result<Vec<Axis>, ConfigError> {
    let mut seen = HashSet::new();
    let mut axes = Vec::new();

    for config in configs {
        if !seen.insert(config.name.as_str()) {
            return Err(ConfigError::DuplicateAxis {
                name: config.name.clone(),
            });
        }
        // Directory discovery only happens for axes somebody actually uses.
        if !referenced.contains(&config.name) {
            continue;
        }

        let mut values = config.values.clone();
        for dir in &config.dirs_in {
            let found = fs::list_subdirs(project_root, dir).map_err(|_| ConfigError::MissingAxisSource {
                axis: config.name.clone(),
                path: project_root.join(dir),
            })?;
            values.extend(found);
        }
        axes.push(Axis::new(config.name.clone(), values)?);
    }

    Ok(axes)
}

fn rebase(root: &Path, path: &Path) -> PathBuf {
    if path.as_os_str().is_empty() || path == Path::new(".") {
        root.to_path_buf()
    } else {
        root.join(path)
    }
}

enum Piece<'a> {
    Text(&'a str),
    Axis(&'a str),
}

/// Splits text into literal runs and `{axis}` placeholders. `${VAR}` is left
/// alone for environment expansion, and braces around anything that is not an
/// identifier stay literal.
fn scan(text: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        let before = &rest[..open];
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if is_axis_name(&after[..close]) && !before.ends_with(['$', LITERAL_DOLLAR]) => {
                if !before.is_empty() {
                    pieces.push(Piece::Text(before));
                }
                pieces.push(Piece::Axis(&after[..close]));
                rest = &after[close + 1..];
            }
            _ => {
                pieces.push(Piece::Text(&rest[..=open]));
                rest = after;
            }
        }
    }
    if !rest.is_empty() {
        pieces.push(Piece::Text(rest));
    }
    pieces
}

fn is_axis_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Substitutes bound axis values into `text`. Unbound placeholders are kept
/// verbatim.
/// 将绑定的轴值代入 `text`。未绑定的占位符保持原样。
pub fn interpolate(text: &str, binding: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(text.len());
    for piece in scan(text) {
        match piece {
            Piece::Text(literal) => out.push_str(literal),
            Piece::Axis(name) => match binding.iter().find(|(axis, _)| *axis == name) {
                Some((_, value)) => out.push_str(value),
                None => {
                    out.push('{');
                    out.push_str(name);
                    out.push('}');
                }
            },
        }
    }
    out
}
