use std::process::ExitCode;
use workspace_checker::cli;

#[tokio::main]
async fn main() -> ExitCode {
    cli::run().await
}
