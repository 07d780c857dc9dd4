//! # Init Command Module / 初始化命令模块
//!
//! This module implements the `init` command for the Workspace Checker CLI,
//! which creates a new check matrix configuration file.
//!
//! 此模块实现了 Workspace Checker CLI 的 `init` 命令，
//! 用于创建新的检查矩阵配置文件。

use anyhow::{Context, Result, bail};
use colored::*;
use std::{fs, path::PathBuf};

use crate::infra::t;

pub const DEFAULT_CONFIG: &str = r#"# Workspace Check Matrix / 工作区检查矩阵

# Language for output messages / 输出消息的语言
language = "en"

# Groups run when no -e / -w / -g flag is given. Remove to run every group.
# 未提供 -e / -w / -g 标志时运行的组。删除此行则运行所有组。
default_groups = ["workspace", "abi-gen", "examples"]

# Passed to every spawned command / 传递给每个子进程
[env]
RUST_BACKTRACE = "1"

# Axes of the matrix. The first axis is the outermost loop.
# 矩阵的轴。第一个轴是最外层循环。
[[axes]]
name = "feature"
values = ["contract", "collaboration"]

[[axes]]
name = "target"
values = ["wasm32-unknown-unknown"]

# Values discovered from sub-directories / 从子目录中发现的值
[[axes]]
name = "example"
dirs_in = ["examples/contract", "examples/collaboration"]

[[groups]]
name = "workspace"
description = "Format, lint, build and test the workspace crates"

[[groups.steps]]
label = "checking formatting"
[[groups.steps.commands]]
run = "cargo fmt --all -- --check"

[[groups.steps]]
label = "checking feature {feature}"
[[groups.steps.commands]]
run = "cargo check --no-default-features --features {feature}"
# Combined stdout/stderr, removed when the run ends / 合并的输出，运行结束时删除
log = "target/check.log"

[[groups.steps]]
label = "building feature {feature} for {target}"
[[groups.steps.commands]]
run = "cargo build --no-default-features --features {feature} --target {target}"
log = "target/check.log"

[[groups.steps]]
label = "linting feature {feature}"
[[groups.steps.commands]]
run = "cargo clippy --no-default-features --features {feature} -- -D warnings"

[[groups.steps]]
label = "testing feature {feature}"
[[groups.steps.commands]]
run = "cargo test --no-default-features --features {feature}"

[[groups]]
name = "abi-gen"
description = "Test the ABI generator"

[[groups.steps]]
label = "testing abi-gen"
[[groups.steps.commands]]
run = "cargo test -p abi-gen"

[[groups]]
name = "examples"
description = "Check every example project independently"

[[groups.steps]]
label = "checking formatting of {example}"
dir = "{example}"
[[groups.steps.commands]]
run = "cargo fmt -- --check"

[[groups.steps]]
label = "testing {example}"
dir = "{example}"
[[groups.steps.commands]]
run = "cargo test"
"#;

/// Executes the init command with the provided arguments.
///
/// # Arguments
/// * `output` - Path for the new configuration file
/// * `force` - Whether to overwrite an existing file
pub fn execute(output: PathBuf, force: bool) -> Result<()> {
    if output.exists() && !force {
        println!("{}", t!("init.use_force").yellow());
        bail!(t!("init.file_exists", path = output.display()).to_string());
    }

    // Create parent directories if needed
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| t!("init.create_parent_dir_failed", path = parent.display()))?;
        }
    }

    fs::write(&output, DEFAULT_CONFIG)
        .with_context(|| t!("init.write_failed", path = output.display()))?;

    println!(
        "{}",
        t!("init.success", path = output.display()).green()
    );
    Ok(())
}
