// Shared test helpers for integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tempfile::{TempDir, tempdir};
use tokio_util::sync::CancellationToken;
use workspace_checker::config::CheckConfig;
use workspace_checker::infra::command::CommandRunner;
use workspace_checker::models::{CommandOutcome, SubCommand};

/// A command runner that never spawns anything. Every command exits with 0
/// unless scripted otherwise, and every invocation is recorded.
#[derive(Default)]
pub struct FakeRunner {
    exit_codes: HashMap<String, i32>,
    launch_failures: Vec<String>,
    cancel_after: Option<(String, CancellationToken)>,
    calls: Mutex<Vec<SubCommand>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the command whose display line is `line` exit with `code`.
    pub fn exit_with(mut self, line: &str, code: i32) -> Self {
        self.exit_codes.insert(line.to_string(), code);
        self
    }

    /// Makes the command whose display line is `line` fail to launch.
    pub fn launch_fails(mut self, line: &str) -> Self {
        self.launch_failures.push(line.to_string());
        self
    }

    /// Cancels `token` once the command `line` has run, as Ctrl-C would.
    pub fn cancel_after(mut self, line: &str, token: CancellationToken) -> Self {
        self.cancel_after = Some((line.to_string(), token));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(SubCommand::display_line)
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl CommandRunner for FakeRunner {
    async fn run(&self, command: &SubCommand) -> CommandOutcome {
        let line = command.display_line();
        self.calls.lock().unwrap().push(command.clone());

        if let Some((after, token)) = &self.cancel_after {
            if *after == line {
                token.cancel();
            }
        }
        if self.launch_failures.contains(&line) {
            return CommandOutcome::launch_failed(format!("{line}: not found"));
        }
        CommandOutcome::exited(self.exit_codes.get(&line).copied().unwrap_or(0))
    }
}

pub fn parse_config(content: &str) -> CheckConfig {
    toml::from_str(content).expect("test configuration must parse")
}

/// An empty project directory with the given sub-directories created.
pub fn setup_project(dirs: &[&str]) -> TempDir {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    for dir in dirs {
        fs::create_dir_all(temp_dir.path().join(dir)).expect("Failed to create directory");
    }
    temp_dir
}

pub fn write_config(project: &Path, content: &str) -> std::path::PathBuf {
    let path = project.join("checks.toml");
    fs::write(&path, content).expect("Failed to write checks.toml");
    path
}

/// The two-feature matrix used throughout the tests.
pub const FEATURE_MATRIX: &str = r#"
[[axes]]
name = "feature"
values = ["contract", "collaboration"]

[[groups]]
name = "workspace"

[[groups.steps]]
label = "check feature {feature}"
[[groups.steps.commands]]
run = "cargo check --features {feature}"
"#;
