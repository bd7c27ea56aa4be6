/// Folder organization: the decision-and-move routine.
///
/// This module walks the top level of a directory once, classifies each
/// visible regular file with a [`ClassificationPolicy`], moves it into the
/// matching subfolder and appends a line to the move log.
use crate::move_log::{MoveLog, MoveRecord};
use crate::policy::{ClassificationPolicy, Destination, FileEntry, LARGE_FILES_DIR, is_hidden};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Errors that can occur during folder organization.
#[derive(Debug, thiserror::Error)]
pub enum OrganizeError {
    /// The target path is missing, unreadable or not a directory.
    #[error("Invalid folder path {}: {source}", path.display())]
    InvalidBasePath { path: PathBuf, source: io::Error },

    /// Failed to create a destination folder.
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    /// Failed to move a file into its destination folder.
    #[error("Failed to move {} to {}: {source}", from.display(), to.display())]
    FileMoveFailure {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    /// A file with the same name already sits in the destination folder.
    #[error("Destination already exists: {}", path.display())]
    DestinationExists { path: PathBuf },

    /// Failed to append to the move log.
    #[error("Failed to write move log {}: {source}", path.display())]
    LogWriteFailed { path: PathBuf, source: io::Error },
}

/// Result type for folder organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Everything the organizer needs for one run.
#[derive(Debug, Clone)]
pub struct OrganizeOptions {
    /// Rules deciding each file's destination.
    pub policy: ClassificationPolicy,
    /// Where move records are appended.
    pub log_file: PathBuf,
    /// Classify only; create nothing, move nothing, log nothing.
    pub dry_run: bool,
}

/// A file that could not be moved.
#[derive(Debug, Clone, Serialize)]
pub struct FailedMove {
    pub file_name: String,
    pub destination: String,
    pub reason: String,
}

/// Entries left alone, by reason.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    /// Names starting with `.` or `~`.
    pub hidden: usize,
    /// Directories and anything else that is not a regular file.
    pub not_a_file: usize,
    /// Extensions outside the allow-list.
    pub filtered: usize,
    /// The move log itself.
    pub log_file: usize,
}

/// Outcome of a single organizer run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub base_path: PathBuf,
    pub dry_run: bool,
    /// Moves performed, or planned when `dry_run` is set.
    pub moves: Vec<MoveRecord>,
    pub failures: Vec<FailedMove>,
    pub skipped: SkipCounts,
}

impl RunReport {
    fn new(base_path: &Path, dry_run: bool) -> Self {
        Self {
            base_path: base_path.to_path_buf(),
            dry_run,
            moves: Vec::new(),
            failures: Vec::new(),
            skipped: SkipCounts::default(),
        }
    }

    /// Returns true if no file failed to move.
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of files moved (or planned) per destination folder.
    pub fn destination_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.moves {
            *counts.entry(record.destination.clone()).or_insert(0) += 1;
        }
        counts
    }
}

/// Progress notifications emitted while a run is under way.
#[derive(Debug)]
pub enum Progress<'a> {
    /// The directory snapshot was taken.
    Started { entries: usize },
    /// A file was moved and logged.
    Moved(&'a MoveRecord),
    /// A file would be moved (dry run).
    Planned(&'a MoveRecord),
    /// A file could not be moved.
    Failed(&'a FailedMove),
    /// An entry was looked at, whatever the outcome.
    Inspected,
}

/// Sorts the files of a directory into destination subfolders.
pub struct FolderOrganizer;

impl FolderOrganizer {
    /// Organizes the top level of `base_path` according to `options`.
    ///
    /// Per-file failures are collected in the returned [`RunReport`] and the
    /// run carries on. An invalid `base_path` fails before anything is
    /// touched, and a failed log write aborts the run.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use declutter::file_organizer::{FolderOrganizer, OrganizeOptions};
    /// use declutter::policy::ClassificationPolicy;
    /// use std::path::Path;
    ///
    /// let options = OrganizeOptions {
    ///     policy: ClassificationPolicy::new().with_size_threshold_mb(100.0),
    ///     log_file: "/home/user/Desktop/cleaning_log.txt".into(),
    ///     dry_run: false,
    /// };
    /// let report = FolderOrganizer::organize(Path::new("/home/user/Desktop"), &options, |_| {})
    ///     .expect("organize failed");
    /// println!("Moved {} files", report.moves.len());
    /// ```
    pub fn organize<F>(
        base_path: &Path,
        options: &OrganizeOptions,
        mut on_progress: F,
    ) -> OrganizeResult<RunReport>
    where
        F: FnMut(Progress<'_>),
    {
        Self::validate_base_path(base_path)?;

        let log = MoveLog::new(&options.log_file);
        if !options.dry_run {
            // Nothing may move unless its record can be written.
            log.check_writable()?;
            Self::ensure_folder(base_path, LARGE_FILES_DIR)?;
        }

        // Snapshot the listing so folders and the log created below are not revisited.
        let entries: Vec<_> = fs::read_dir(base_path)
            .map_err(|e| OrganizeError::InvalidBasePath {
                path: base_path.to_path_buf(),
                source: e,
            })?
            .collect();

        on_progress(Progress::Started {
            entries: entries.len(),
        });

        let log_identity = fs::canonicalize(log.path()).ok();
        let now = SystemTime::now();
        let mut report = RunReport::new(base_path, options.dry_run);

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", base_path.display(), e);
                    on_progress(Progress::Inspected);
                    continue;
                }
            };

            if let Some(file) = Self::inspect(&entry, log_identity.as_deref(), &mut report) {
                match options.policy.classify(&file, now) {
                    Some(destination) => Self::dispatch(
                        base_path,
                        &file,
                        &destination,
                        options,
                        &log,
                        &mut report,
                        &mut on_progress,
                    )?,
                    None => {
                        debug!("{}: extension not allowed", file.name);
                        report.skipped.filtered += 1;
                    }
                }
            }
            on_progress(Progress::Inspected);
        }

        Ok(report)
    }

    /// Applies the skip rules that do not depend on the policy.
    ///
    /// Returns the file entry if the policy should look at it.
    fn inspect(
        entry: &fs::DirEntry,
        log_identity: Option<&Path>,
        report: &mut RunReport,
    ) -> Option<FileEntry> {
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_hidden(&name) {
            debug!("{}: hidden", name);
            report.skipped.hidden += 1;
            return None;
        }

        let path = entry.path();
        // fs::metadata follows symlinks, so a link to a regular file counts as a file.
        let metadata = match fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => metadata,
            _ => {
                debug!("{}: not a regular file", name);
                report.skipped.not_a_file += 1;
                return None;
            }
        };

        if let Some(log_path) = log_identity
            && fs::canonicalize(&path).is_ok_and(|p| p.as_path() == log_path)
        {
            debug!("{}: move log", name);
            report.skipped.log_file += 1;
            return None;
        }

        match FileEntry::from_metadata(path, name, &metadata) {
            Ok(file) => Some(file),
            Err(e) => {
                warn!("{}: no modification time: {}", entry.path().display(), e);
                report.skipped.not_a_file += 1;
                None
            }
        }
    }

    /// Moves (or plans to move) one classified file and records the outcome.
    fn dispatch<F>(
        base_path: &Path,
        file: &FileEntry,
        destination: &Destination,
        options: &OrganizeOptions,
        log: &MoveLog,
        report: &mut RunReport,
        on_progress: &mut F,
    ) -> OrganizeResult<()>
    where
        F: FnMut(Progress<'_>),
    {
        let folder_name = destination.dir_name();

        let moved = if options.dry_run {
            Self::plan_move(base_path, &file.path, &folder_name)
        } else {
            Self::ensure_folder(base_path, &folder_name)
                .and_then(|folder| Self::move_into(&file.path, &folder))
        };

        match moved {
            Ok(_) if options.dry_run => {
                let record = MoveRecord::new(&file.name, folder_name);
                on_progress(Progress::Planned(&record));
                report.moves.push(record);
            }
            Ok(new_path) => {
                info!("Moved {} to {}", file.path.display(), new_path.display());
                let record = MoveRecord::new(&file.name, folder_name);
                on_progress(Progress::Moved(&record));
                log.append(&record)?;
                report.moves.push(record);
            }
            Err(e) => {
                warn!("{}", e);
                let failure = FailedMove {
                    file_name: file.name.clone(),
                    destination: folder_name,
                    reason: e.to_string(),
                };
                on_progress(Progress::Failed(&failure));
                report.failures.push(failure);
            }
        }

        Ok(())
    }

    /// Fails unless `base_path` is an existing directory.
    fn validate_base_path(base_path: &Path) -> OrganizeResult<()> {
        let metadata = fs::metadata(base_path).map_err(|e| OrganizeError::InvalidBasePath {
            path: base_path.to_path_buf(),
            source: e,
        })?;

        if !metadata.is_dir() {
            return Err(OrganizeError::InvalidBasePath {
                path: base_path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
            });
        }

        Ok(())
    }

    /// Creates `base_path/folder_name` unless it already exists.
    ///
    /// Returns the folder's path.
    pub fn ensure_folder(base_path: &Path, folder_name: &str) -> OrganizeResult<PathBuf> {
        let folder = base_path.join(folder_name);
        fs::create_dir_all(&folder).map_err(|e| OrganizeError::DirectoryCreationFailed {
            path: folder.clone(),
            source: e,
        })?;
        Ok(folder)
    }

    /// Checks, without touching the filesystem, that a real run could move
    /// `file_path` into `base_path/folder_name`.
    ///
    /// Fails the same way a real run would when a non-directory occupies the
    /// folder name or the destination file already exists.
    fn plan_move(base_path: &Path, file_path: &Path, folder_name: &str) -> OrganizeResult<PathBuf> {
        let folder = base_path.join(folder_name);
        if let Ok(metadata) = fs::metadata(&folder)
            && !metadata.is_dir()
        {
            return Err(OrganizeError::DirectoryCreationFailed {
                path: folder,
                source: io::Error::new(io::ErrorKind::AlreadyExists, "a file has this name"),
            });
        }
        Self::destination_for(file_path, &folder)
    }

    /// Path `file_path` would have inside `folder`; fails if it is taken.
    fn destination_for(file_path: &Path, folder: &Path) -> OrganizeResult<PathBuf> {
        let file_name = file_path
            .file_name()
            .ok_or_else(|| OrganizeError::FileMoveFailure {
                from: file_path.to_path_buf(),
                to: folder.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "file has no name component"),
            })?;

        let destination = folder.join(file_name);
        if fs::symlink_metadata(&destination).is_ok() {
            return Err(OrganizeError::DestinationExists { path: destination });
        }
        Ok(destination)
    }

    /// Moves `file_path` into `folder`, keeping its name.
    ///
    /// Refuses to overwrite an existing entry. Falls back to copy and delete
    /// when a rename would cross filesystems. Returns the new path.
    pub fn move_into(file_path: &Path, folder: &Path) -> OrganizeResult<PathBuf> {
        let destination = Self::destination_for(file_path, folder)?;

        let moved = match fs::rename(file_path, &destination) {
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                fs::copy(file_path, &destination).and_then(|_| fs::remove_file(file_path))
            }
            other => other,
        };

        moved.map_err(|e| OrganizeError::FileMoveFailure {
            from: file_path.to_path_buf(),
            to: destination.clone(),
            source: e,
        })?;

        Ok(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn options(base_path: &Path, policy: ClassificationPolicy) -> OrganizeOptions {
        OrganizeOptions {
            policy,
            log_file: base_path.join("cleaning_log.txt"),
            dry_run: false,
        }
    }

    #[test]
    fn test_ensure_folder_is_idempotent() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        let first = FolderOrganizer::ensure_folder(base_path, "TXT Files")
            .expect("Failed to create folder");
        let second = FolderOrganizer::ensure_folder(base_path, "TXT Files")
            .expect("Second creation should succeed");

        assert_eq!(first, second);
        assert!(first.is_dir());
    }

    #[test]
    fn test_move_into_keeps_name() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        let file_path = base_path.join("test.txt");
        fs::write(&file_path, "test content").expect("Failed to write test file");
        let folder = FolderOrganizer::ensure_folder(base_path, "TXT Files")
            .expect("Failed to create folder");

        let new_path = FolderOrganizer::move_into(&file_path, &folder).expect("Failed to move file");

        assert_eq!(new_path, folder.join("test.txt"));
        assert!(!file_path.exists());
        assert_eq!(fs::read_to_string(new_path).unwrap(), "test content");
    }

    #[test]
    fn test_move_into_refuses_to_overwrite() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        let folder = FolderOrganizer::ensure_folder(base_path, "TXT Files")
            .expect("Failed to create folder");
        fs::write(folder.join("test.txt"), "already here").unwrap();
        let file_path = base_path.join("test.txt");
        fs::write(&file_path, "newcomer").unwrap();

        let result = FolderOrganizer::move_into(&file_path, &folder);

        assert!(matches!(result, Err(OrganizeError::DestinationExists { .. })));
        assert!(file_path.exists());
        assert_eq!(fs::read_to_string(folder.join("test.txt")).unwrap(), "already here");
    }

    #[test]
    fn test_organize_invalid_base_path() {
        let non_existent = Path::new("/non/existent/path");
        let result = FolderOrganizer::organize(
            non_existent,
            &options(non_existent, ClassificationPolicy::new()),
            |_| {},
        );
        assert!(matches!(result, Err(OrganizeError::InvalidBasePath { .. })));
    }

    #[test]
    fn test_organize_rejects_regular_file_as_base() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file_path = temp_dir.path().join("plain.txt");
        fs::write(&file_path, "x").unwrap();

        let result = FolderOrganizer::organize(
            &file_path,
            &options(temp_dir.path(), ClassificationPolicy::new()),
            |_| {},
        );
        assert!(matches!(result, Err(OrganizeError::InvalidBasePath { .. })));
    }

    #[test]
    fn test_organize_reports_progress() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::write(base_path.join("a.txt"), "a").unwrap();
        fs::write(base_path.join(".hidden"), "h").unwrap();

        let mut started = None;
        let mut moved = Vec::new();
        let mut inspected = 0;
        let report = FolderOrganizer::organize(
            base_path,
            &options(base_path, ClassificationPolicy::new()),
            |progress| match progress {
                Progress::Started { entries } => started = Some(entries),
                Progress::Moved(record) => moved.push(record.file_name.clone()),
                Progress::Inspected => inspected += 1,
                _ => {}
            },
        )
        .expect("organize failed");

        // "Large Files" is created before the snapshot is taken.
        assert_eq!(started, Some(3));
        assert_eq!(inspected, 3);
        assert_eq!(moved, vec!["a.txt".to_string()]);
        assert_eq!(report.skipped.hidden, 1);
        assert_eq!(report.skipped.not_a_file, 1);
    }

    #[test]
    fn test_destination_counts() {
        let mut report = RunReport::new(Path::new("/tmp"), true);
        report.moves.push(MoveRecord::new("a.txt", "TXT Files"));
        report.moves.push(MoveRecord::new("b.txt", "TXT Files"));
        report.moves.push(MoveRecord::new("c", "Unknown Files"));

        let counts = report.destination_counts();
        assert_eq!(counts.get("TXT Files"), Some(&2));
        assert_eq!(counts.get("Unknown Files"), Some(&1));
        assert!(report.is_complete_success());
    }
}
