use clap::Parser;
use datamatic::cli::{run_cli, Cli};
use datamatic::logging::{init_logging, LogConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env();
    if cli.verbose {
        log_config = log_config.verbose();
    }
    if let Err(e) = init_logging(&log_config) {
        eprintln!("Warning: {e}");
    }

    match run_cli(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {e:#}");
            ExitCode::FAILURE
        }
    }
}
