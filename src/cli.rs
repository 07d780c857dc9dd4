//! # Command Line Interface / 命令行接口
//!
//! Thin option parsing: selects the check groups to run, or dispatches to
//! the `init` subcommand.
//!
//! 轻量的选项解析：选择要运行的检查组，或分派到 `init` 子命令。

use clap::{Arg, ArgAction, ArgMatches, Command};
use colored::*;
use std::{env, path::PathBuf, process::ExitCode};

use crate::core::config::GroupSelection;
use crate::infra::t;

pub mod commands;

/// Configuration file looked up in the current directory by default.
pub const DEFAULT_CONFIG_FILE: &str = "checks.toml";

/// Exit code for configuration, usage and reporting errors.
/// 配置、用法和报告错误的退出码。
pub const EXIT_FATAL: u8 = 2;

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// It looks for a `--lang <VALUE>` or `--lang=<VALUE>` argument.
fn pre_parse_language() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    if let Some(pos) = args.iter().position(|arg| arg == "--lang") {
        return args.get(pos + 1).cloned();
    }
    args.iter()
        .find_map(|arg| arg.strip_prefix("--lang=").map(str::to_string))
}

/// Builds the command line definition, with help texts in `locale`.
/// 构建命令行定义，帮助文本使用 `locale` 语言。
pub fn build_cli(locale: &str) -> Command {
    Command::new("workspace-checker")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli.about", locale = locale).to_string())
        .after_help(t!("cli.after_help", locale = locale, config = DEFAULT_CONFIG_FILE).to_string())
        .args_conflicts_with_subcommands(true)
        .arg(
            Arg::new("examples")
                .short('e')
                .long("examples")
                .help(t!("cli.arg_examples", locale = locale).to_string())
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("workspace")
                .short('w')
                .long("workspace")
                .help(t!("cli.arg_workspace", locale = locale).to_string())
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("group")
                .short('g')
                .long("group")
                .help(t!("cli.arg_group", locale = locale).to_string())
                .value_name("GROUP")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help(t!("cli.arg_config", locale = locale).to_string())
                .value_name("CONFIG")
                .default_value(DEFAULT_CONFIG_FILE)
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("project-dir")
                .long("project-dir")
                .help(t!("cli.arg_project_dir", locale = locale).to_string())
                .value_name("PROJECT_DIR")
                .default_value(".")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("list")
                .long("list")
                .help(t!("cli.arg_list", locale = locale).to_string())
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli.arg_lang", locale = locale).to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("init")
                .about(t!("cli.cmd_init_about", locale = locale).to_string())
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help(t!("cli.arg_init_output", locale = locale).to_string())
                        .value_name("PATH")
                        .default_value(DEFAULT_CONFIG_FILE)
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .help(t!("cli.arg_init_force", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
}

/// Reads the group selection from parsed arguments. No selection flag means
/// [`GroupSelection::Default`].
/// 从解析后的参数中读取组选择。没有选择标志即 [`GroupSelection::Default`]。
pub fn selection_from_matches(matches: &ArgMatches) -> GroupSelection {
    let groups = matches
        .get_many::<String>("group")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    GroupSelection::from_flags(matches.get_flag("examples"), matches.get_flag("workspace"), groups)
}

/// Parses the command line, runs the selected command and maps the result
/// onto the process exit code.
///
/// 解析命令行，运行所选命令，并将结果映射为进程退出码。
pub async fn run() -> ExitCode {
    // Help texts need a language before the arguments are parsed.
    let locale = crate::init(pre_parse_language());

    let matches = build_cli(&locale).get_matches();
    let lang = matches.get_one::<String>("lang").cloned();

    let result = match matches.subcommand() {
        Some(("init", init_matches)) => {
            let output = init_matches
                .get_one::<PathBuf>("output")
                .cloned()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            commands::init::execute(output, init_matches.get_flag("force")).map(|()| 0)
        }
        _ => {
            let options = commands::run::RunOptions {
                selection: selection_from_matches(&matches),
                config: matches
                    .get_one::<PathBuf>("config")
                    .cloned()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE)),
                project_dir: matches
                    .get_one::<PathBuf>("project-dir")
                    .cloned()
                    .unwrap_or_else(|| PathBuf::from(".")),
                list: matches.get_flag("list"),
                lang,
            };
            commands::run::execute(options).await
        }
    };

    match result {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("{} {:#}", t!("error_prefix").red().bold(), e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}
