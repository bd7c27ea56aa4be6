/// Append-only text log of file moves.
///
/// Every move made by the organizer is written as one line:
/// `<timestamp>: Moved <file name> to <folder name>`. The log file is opened,
/// appended to, and closed again for each record.
use crate::file_organizer::{OrganizeError, OrganizeResult};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name used for the log when none is configured.
pub const DEFAULT_LOG_FILE_NAME: &str = "cleaning_log.txt";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// A single file move, either performed or planned.
#[derive(Debug, Clone, Serialize)]
pub struct MoveRecord {
    /// Local time at which the move was made.
    pub timestamp: DateTime<Local>,
    /// Name of the moved file.
    pub file_name: String,
    /// Name of the destination folder.
    pub destination: String,
}

impl MoveRecord {
    /// Creates a record stamped with the current local time.
    pub fn new(file_name: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            file_name: file_name.into(),
            destination: destination.into(),
        }
    }

    /// Formats this record as a newline-terminated log line.
    ///
    /// # Examples
    ///
    /// ```
    /// use declutter::move_log::MoveRecord;
    ///
    /// let record = MoveRecord::new("report.TXT", "TXT Files");
    /// assert!(record.to_log_line().ends_with(": Moved report.TXT to TXT Files\n"));
    /// ```
    pub fn to_log_line(&self) -> String {
        format!(
            "{}: Moved {} to {}\n",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.file_name,
            self.destination
        )
    }
}

/// Handle on the log file. Holds only the path; no file descriptor stays open.
#[derive(Debug, Clone)]
pub struct MoveLog {
    path: PathBuf,
}

impl MoveLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fails with [`OrganizeError::LogWriteFailed`] if the log cannot be
    /// opened for appending.
    ///
    /// A log file created by the check is removed again, so a run that ends
    /// up moving nothing leaves no empty log behind.
    pub fn check_writable(&self) -> OrganizeResult<()> {
        let existed = fs::symlink_metadata(&self.path).is_ok();
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| OrganizeError::LogWriteFailed {
                path: self.path.clone(),
                source: e,
            })?;

        if !existed {
            let _ = fs::remove_file(&self.path);
        }
        Ok(())
    }

    /// Appends one record, creating the log file if needed.
    pub fn append(&self, record: &MoveRecord) -> OrganizeResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| OrganizeError::LogWriteFailed {
                path: self.path.clone(),
                source: e,
            })?;

        file.write_all(record.to_log_line().as_bytes())
            .map_err(|e| OrganizeError::LogWriteFailed {
                path: self.path.clone(),
                source: e,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_line_format() {
        let record = MoveRecord::new("bigvideo.mp4", "Large Files");
        let line = record.to_log_line();

        let (stamp, rest) = line.split_once(": ").expect("line should contain a separator");
        assert_eq!(rest, "Moved bigvideo.mp4 to Large Files\n");
        assert!(
            chrono::NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).is_ok(),
            "timestamp should parse: {}",
            stamp
        );
    }

    #[test]
    fn test_append_creates_and_appends() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let log = MoveLog::new(temp_dir.path().join("moves.txt"));

        log.append(&MoveRecord::new("a.txt", "TXT Files"))
            .expect("Failed to append first record");
        log.append(&MoveRecord::new("b", "Unknown Files"))
            .expect("Failed to append second record");

        let content = fs::read_to_string(log.path()).expect("Failed to read log");
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("Moved a.txt to TXT Files"));
        assert!(lines[1].ends_with("Moved b to Unknown Files"));
    }

    #[test]
    fn test_append_to_missing_directory_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let log = MoveLog::new(temp_dir.path().join("missing").join("moves.txt"));

        let result = log.append(&MoveRecord::new("a.txt", "TXT Files"));
        assert!(matches!(result, Err(OrganizeError::LogWriteFailed { .. })));
    }

    #[test]
    fn test_check_writable_leaves_no_file_behind() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let log = MoveLog::new(temp_dir.path().join("moves.txt"));

        log.check_writable().expect("log should be writable");
        assert!(!log.path().exists());
    }

    #[test]
    fn test_check_writable_keeps_existing_log() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let log = MoveLog::new(temp_dir.path().join("moves.txt"));
        log.append(&MoveRecord::new("a.txt", "TXT Files"))
            .expect("Failed to append record");

        log.check_writable().expect("log should be writable");
        let content = fs::read_to_string(log.path()).expect("Failed to read log");
        assert!(content.ends_with("Moved a.txt to TXT Files\n"));
    }

    #[test]
    fn test_check_writable_fails_for_missing_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let log = MoveLog::new(temp_dir.path().join("missing").join("moves.txt"));

        assert!(matches!(
            log.check_writable(),
            Err(OrganizeError::LogWriteFailed { .. })
        ));
    }
}
