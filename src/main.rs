use clap::Parser;
use declutter::cli::{Cli, run_cli};
use declutter::output::OutputFormatter;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run_cli(&cli) {
        Ok(report) if report.is_complete_success() => ExitCode::SUCCESS,
        // Ran, but some files were left where they were.
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            OutputFormatter::error(&e.to_string());
            ExitCode::from(2)
        }
    }
}
