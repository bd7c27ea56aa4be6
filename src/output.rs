//! Console output for declutter runs.
//!
//! Line builders return plain strings so the wording can be tested; the
//! printing methods add color and pick stdout or stderr.

use crate::file_organizer::FailedMove;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

const PROGRESS_TEMPLATE: &str = "{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use declutter::output::OutputFormatter;
    /// OutputFormatter::success("Cleaning complete.");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message to stderr in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a bold section header preceded by a blank line.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Formats the console line announcing a move.
    ///
    /// # Arguments
    ///
    /// * `file_name` - Name of the moved file
    /// * `folder` - Destination folder name, without a trailing separator
    ///
    /// # Example
    ///
    /// ```
    /// use declutter::output::OutputFormatter;
    /// assert_eq!(
    ///     OutputFormatter::moved_line("report.TXT", "TXT Files"),
    ///     "Moved: report.TXT -> TXT Files/"
    /// );
    /// ```
    pub fn moved_line(file_name: &str, folder: &str) -> String {
        format!("Moved: {} -> {}/", file_name, folder)
    }

    /// Same as [`moved_line`](Self::moved_line), worded for a dry run.
    pub fn planned_line(file_name: &str, folder: &str) -> String {
        format!("Would move: {} -> {}/", file_name, folder)
    }

    /// Formats one entry of the failure list.
    ///
    /// # Example
    ///
    /// ```
    /// use declutter::file_organizer::FailedMove;
    /// use declutter::output::OutputFormatter;
    ///
    /// let failure = FailedMove {
    ///     file_name: "a.txt".into(),
    ///     destination: "TXT Files".into(),
    ///     reason: "Destination already exists".into(),
    /// };
    /// assert_eq!(
    ///     OutputFormatter::failure_line(&failure),
    ///     "a.txt -> TXT Files/: Destination already exists"
    /// );
    /// ```
    pub fn failure_line(failure: &FailedMove) -> String {
        format!(
            "{} -> {}/: {}",
            failure.file_name, failure.destination, failure.reason
        )
    }

    /// Creates a progress bar over the entries of a directory snapshot.
    ///
    /// Lines printed while the bar is active should go through
    /// [`ProgressBar::suspend`] so they are not overdrawn.
    ///
    /// # Arguments
    ///
    /// * `total` - Number of entries the run will inspect
    ///
    /// # Returns
    ///
    /// A bar with the cyan block style, or indicatif's default style if the
    /// template is rejected.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_TEMPLATE) {
            pb.set_style(style.progress_chars("█▓░"));
        }
        pb
    }

    /// Builds the rows of the summary table, without color.
    ///
    /// The folder column is padded to the longest folder name (at least as
    /// wide as the `Folder` heading). Rows follow the map's order; the last
    /// row is the total.
    ///
    /// # Arguments
    ///
    /// * `folder_counts` - Files moved (or planned) per destination folder
    /// * `total_files` - Value shown on the `Total` row
    ///
    /// # Returns
    ///
    /// Heading, rule, one row per folder, rule, total.
    pub fn summary_lines(folder_counts: &BTreeMap<String, usize>, total_files: usize) -> Vec<String> {
        let width = folder_counts
            .keys()
            .map(|name| name.chars().count())
            .max()
            .unwrap_or(0)
            .max("Folder".len());
        let rule = "-".repeat(width + 10);

        let mut lines = Vec::with_capacity(folder_counts.len() + 4);
        lines.push(format!("{:<width$} | Files", "Folder"));
        lines.push(rule.clone());
        for (folder, count) in folder_counts {
            lines.push(count_row(folder, *count, width));
        }
        lines.push(rule);
        lines.push(count_row("Total", total_files, width));
        lines
    }

    /// Prints the summary table under a `SUMMARY` header.
    ///
    /// See [`summary_lines`](Self::summary_lines) for the layout. The heading
    /// and total rows are printed in bold.
    pub fn summary_table(folder_counts: &BTreeMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let lines = Self::summary_lines(folder_counts, total_files);
        let last = lines.len() - 1;
        for (i, line) in lines.iter().enumerate() {
            if i == 0 || i == last {
                println!("{}", line.bold());
            } else {
                println!("{}", line);
            }
        }
    }

    /// Lists files that could not be moved on stderr. Prints nothing when
    /// `failures` is empty.
    pub fn failure_list(failures: &[FailedMove]) {
        if failures.is_empty() {
            return;
        }
        Self::header("FAILED");
        for failure in failures {
            eprintln!("  {} {}", "✗".red(), Self::failure_line(failure));
        }
    }

    /// Prints `message` in yellow with a `[DRY RUN]` prefix.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}

fn count_row(label: &str, count: usize, width: usize) -> String {
    format!("{:<width$} | {} {}", label, count, plural(count))
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
