//! Command-line interface module for declutter.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing and validation
//! - Merging flags with configuration files
//! - Running the organizer with console or JSON output

use crate::config::{
    ConfigError, OrganizeSettings, OrganizerConfig, validate_age_threshold,
    validate_size_threshold,
};
use crate::file_organizer::{
    FolderOrganizer, OrganizeError, OrganizeOptions, Progress, RunReport,
};
use crate::output::OutputFormatter;
use clap::Parser;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};

/// Sort the files of a folder into subfolders by extension, age, or size.
#[derive(Debug, Clone, Parser)]
#[command(name = "declutter", version, about)]
pub struct Cli {
    /// Folder to organize.
    pub directory: PathBuf,

    /// Move log to append to [default: <DIRECTORY>/cleaning_log.txt].
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Move files last modified more than DAYS days ago to "Old Files".
    #[arg(long, value_name = "DAYS", value_parser = parse_days)]
    pub older_than: Option<u64>,

    /// Move files larger than MB megabytes to "Large Files".
    #[arg(long, value_name = "MB", value_parser = parse_megabytes)]
    pub larger_than: Option<f64>,

    /// Only process these extensions, e.g. `txt,pdf,docx`.
    #[arg(long, value_name = "EXT", value_delimiter = ',')]
    pub types: Option<Vec<String>>,

    /// Configuration file [default: ./.declutter.toml, then ~/.config/declutter/config.toml].
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show where files would go without moving anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run report as JSON instead of progress lines.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// The settings given on the command line, used to override the config file.
    pub fn overrides(&self) -> OrganizeSettings {
        OrganizeSettings {
            older_than_days: self.older_than,
            larger_than_mb: self.larger_than,
            file_types: self.types.clone(),
            log_file: self.log_file.clone(),
        }
    }
}

/// Errors that stop a run before or while it executes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Organize(#[from] OrganizeError),
    #[error("Failed to render report: {0}")]
    Report(#[from] serde_json::Error),
}

fn parse_days(value: &str) -> Result<u64, String> {
    let days = value
        .trim()
        .parse::<u64>()
        .map_err(|_| format!("'{}' is not a whole number of days", value))?;
    validate_age_threshold(days).map_err(|e| e.to_string())
}

fn parse_megabytes(value: &str) -> Result<f64, String> {
    let mb = value
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("'{}' is not a number", value))?;
    validate_size_threshold(mb).map_err(|e| e.to_string())
}

/// Runs the CLI application with the parsed arguments.
///
/// Loads configuration, applies command-line overrides and organizes the
/// target directory. Per-file failures do not make this return `Err`; check
/// [`RunReport::is_complete_success`] on the result.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use declutter::cli::{Cli, run_cli};
///
/// let cli = Cli::parse_from(["declutter", "/home/user/Desktop", "--larger-than", "100"]);
/// match run_cli(&cli) {
///     Ok(report) => println!("Moved {} files", report.moves.len()),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(cli: &Cli) -> Result<RunReport, CliError> {
    let config = OrganizerConfig::load(cli.config.as_deref())?;
    run_cli_with_config(cli, config)
}

/// Runs the CLI application against an already loaded configuration.
///
/// `cli.config` is ignored; the command-line overrides are applied on top of
/// `config` exactly as [`run_cli`] would.
///
/// # Arguments
///
/// * `cli` - Parsed command-line arguments
/// * `config` - Configuration to resolve the arguments against
///
/// # Returns
///
/// The [`RunReport`] of the run, or a [`CliError`] if the settings are
/// invalid or the run was aborted.
pub fn run_cli_with_config(cli: &Cli, config: OrganizerConfig) -> Result<RunReport, CliError> {
    let mut options = config.resolve(&cli.directory, cli.overrides())?;
    options.dry_run = cli.dry_run;

    if cli.json {
        let report = FolderOrganizer::organize(&cli.directory, &options, |_| {})?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report);
    }

    organize_with_output(&cli.directory, &options)
}

/// Organizes `base_path`, printing one line per move and a final summary.
///
/// A progress bar tracks the directory snapshot; per-move lines are printed
/// above it.
///
/// # Arguments
///
/// * `base_path` - Directory to organize
/// * `options` - Resolved policy, log path and dry-run flag
///
/// # Returns
///
/// The [`RunReport`] after the summary has been printed.
pub fn organize_with_output(
    base_path: &Path,
    options: &OrganizeOptions,
) -> Result<RunReport, CliError> {
    if options.dry_run {
        OutputFormatter::dry_run_notice(&format!(
            "Analyzing contents of: {}",
            base_path.display()
        ));
    } else {
        OutputFormatter::info(&format!("Organizing contents of: {}", base_path.display()));
    }

    let mut bar: Option<ProgressBar> = None;
    let result = FolderOrganizer::organize(base_path, options, |progress| match progress {
        Progress::Started { entries } => {
            bar = Some(OutputFormatter::create_progress_bar(entries as u64));
        }
        Progress::Moved(record) => announce(
            bar.as_ref(),
            OutputFormatter::moved_line(&record.file_name, &record.destination),
        ),
        Progress::Planned(record) => announce(
            bar.as_ref(),
            OutputFormatter::planned_line(&record.file_name, &record.destination),
        ),
        Progress::Failed(failure) => {
            let message = format!("Could not move {}: {}", failure.file_name, failure.reason);
            match bar.as_ref() {
                Some(pb) => pb.suspend(|| OutputFormatter::error(&message)),
                None => OutputFormatter::error(&message),
            }
        }
        Progress::Inspected => {
            if let Some(pb) = bar.as_ref() {
                pb.inc(1);
            }
        }
    });

    if let Some(pb) = bar {
        pb.finish_and_clear();
    }
    let report = result?;

    if report.moves.is_empty() && report.failures.is_empty() {
        OutputFormatter::plain("No files to organize.");
    } else {
        OutputFormatter::summary_table(&report.destination_counts(), report.moves.len());
    }
    OutputFormatter::failure_list(&report.failures);

    if report.dry_run {
        OutputFormatter::dry_run_notice("Dry run complete. No files were modified.");
    } else if report.is_complete_success() {
        OutputFormatter::success(&format!(
            "Cleaning complete. Log saved to {}.",
            options.log_file.display()
        ));
    } else {
        OutputFormatter::warning(&format!(
            "{} file(s) could not be organized. Please review errors above.",
            report.failures.len()
        ));
    }

    Ok(report)
}

fn announce(bar: Option<&ProgressBar>, line: String) {
    match bar {
        Some(pb) => pb.suspend(|| OutputFormatter::plain(&line)),
        None => OutputFormatter::plain(&line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_arguments() {
        let cli = Cli::try_parse_from(["declutter", "/tmp/desk"]).unwrap();

        assert_eq!(cli.directory, PathBuf::from("/tmp/desk"));
        assert_eq!(cli.overrides(), OrganizeSettings::default());
        assert!(!cli.dry_run);
        assert!(!cli.json);
    }

    #[test]
    fn test_parse_all_arguments() {
        let cli = Cli::try_parse_from([
            "declutter",
            "/tmp/desk",
            "--older-than",
            "30",
            "--larger-than",
            "2.5",
            "--types",
            "txt, pdf,docx",
            "--log-file",
            "moves.log",
            "--dry-run",
        ])
        .unwrap();

        let overrides = cli.overrides();
        assert_eq!(overrides.older_than_days, Some(30));
        assert_eq!(overrides.larger_than_mb, Some(2.5));
        assert_eq!(
            overrides.file_types,
            Some(vec!["txt".to_string(), " pdf".to_string(), "docx".to_string()])
        );
        assert_eq!(overrides.log_file, Some(PathBuf::from("moves.log")));
        assert!(cli.dry_run);
    }

    #[test]
    fn test_rejects_non_positive_thresholds() {
        assert!(Cli::try_parse_from(["declutter", "/tmp", "--older-than", "0"]).is_err());
        assert!(Cli::try_parse_from(["declutter", "/tmp", "--older-than", "-2"]).is_err());
        assert!(Cli::try_parse_from(["declutter", "/tmp", "--larger-than", "0"]).is_err());
        assert!(Cli::try_parse_from(["declutter", "/tmp", "--larger-than", "big"]).is_err());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let cli = Cli::try_parse_from(["declutter", "/non/existent/path"]).unwrap();
        let result = run_cli_with_config(&cli, OrganizerConfig::default());
        assert!(matches!(
            result,
            Err(CliError::Organize(OrganizeError::InvalidBasePath { .. }))
        ));
    }

    #[test]
    fn test_explicit_config_file_missing_is_an_error() {
        let cli = Cli::try_parse_from([
            "declutter",
            "/tmp",
            "--config",
            "/non/existent/declutter.toml",
        ])
        .unwrap();
        assert!(matches!(run_cli(&cli), Err(CliError::Config(_))));
    }
}
