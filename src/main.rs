// src/main.rs
use clap::Parser;
use seed_sections::cli::Cli;
use seed_sections::{commands, utils, AppError};

fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let cli = Cli::parse();
    tracing::debug!("Starting with args: {:?}", cli);

    // 3. Run the requested pass
    commands::run(cli)
}
