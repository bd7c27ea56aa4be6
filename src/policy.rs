//! Classification policy deciding which subfolder a file belongs in.
//!
//! Rules are evaluated in a fixed order: size first, then age, then the
//! file extension. An optional allow-list of extensions filters files out
//! before any rule runs.
//!
//! # Examples
//!
//! ```
//! use declutter::policy::{Destination, extension_of};
//!
//! assert_eq!(extension_of("archive.tar.gz").as_deref(), Some("gz"));
//! assert_eq!(Destination::for_extension(Some("txt")).dir_name(), "TXT Files");
//! assert_eq!(Destination::for_extension(None).dir_name(), "Unknown Files");
//! ```

use std::collections::HashSet;
use std::fs::Metadata;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

/// Folder receiving files above the size threshold.
pub const LARGE_FILES_DIR: &str = "Large Files";
/// Folder receiving files above the age threshold.
pub const OLD_FILES_DIR: &str = "Old Files";
/// Folder receiving files without an extension.
pub const UNKNOWN_FILES_DIR: &str = "Unknown Files";

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// A regular file found at the top level of the target directory.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// The file name, without any directory component.
    pub name: String,
    /// The full path to the file.
    pub path: PathBuf,
    /// Last modification time.
    pub modified: SystemTime,
    /// Size in bytes.
    pub size: u64,
}

impl FileEntry {
    /// Builds an entry from already-fetched metadata.
    ///
    /// Fails only on platforms that do not expose modification times.
    pub fn from_metadata(
        path: PathBuf,
        name: String,
        metadata: &Metadata,
    ) -> std::io::Result<Self> {
        Ok(Self {
            name,
            path,
            modified: metadata.modified()?,
            size: metadata.len(),
        })
    }

    /// The lower-cased extension of this file, if its name has one.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.name)
    }
}

/// The subfolder a file is routed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Destination {
    /// Size threshold exceeded.
    Large,
    /// Age threshold exceeded.
    Old,
    /// Grouped by a (lower-cased, non-empty) extension.
    Extension(String),
    /// No usable extension.
    Unknown,
}

impl Destination {
    /// Picks the extension-based destination for a derived extension.
    ///
    /// An empty extension (a name ending in `.`) is treated like a missing one.
    pub fn for_extension(ext: Option<&str>) -> Self {
        match ext {
            Some(ext) if !ext.is_empty() => Destination::Extension(ext.to_lowercase()),
            _ => Destination::Unknown,
        }
    }

    /// Returns the subfolder name for this destination.
    ///
    /// # Examples
    ///
    /// ```
    /// use declutter::policy::Destination;
    ///
    /// assert_eq!(Destination::Large.dir_name(), "Large Files");
    /// assert_eq!(Destination::Old.dir_name(), "Old Files");
    /// assert_eq!(Destination::Extension("pdf".into()).dir_name(), "PDF Files");
    /// ```
    pub fn dir_name(&self) -> String {
        match self {
            Destination::Large => LARGE_FILES_DIR.to_string(),
            Destination::Old => OLD_FILES_DIR.to_string(),
            Destination::Extension(ext) => format!("{} Files", ext.to_uppercase()),
            Destination::Unknown => UNKNOWN_FILES_DIR.to_string(),
        }
    }
}

/// Returns true for names treated as hidden or system files.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('~')
}

/// Derives the lower-cased extension of a file name.
///
/// The extension is everything after the last `.`; a name without a dot has
/// none, and a name ending in a dot has the empty extension.
///
/// # Examples
///
/// ```
/// use declutter::policy::extension_of;
///
/// assert_eq!(extension_of("report.TXT").as_deref(), Some("txt"));
/// assert_eq!(extension_of("Makefile"), None);
/// assert_eq!(extension_of("notes.").as_deref(), Some(""));
/// ```
pub fn extension_of(name: &str) -> Option<String> {
    name.rfind('.').map(|idx| name[idx + 1..].to_lowercase())
}

/// Normalizes a user-supplied extension: trimmed, lower-cased, leading dots removed.
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// Ordered rule set used to classify files.
///
/// Each rule is optional; a policy with no rules sorts every file by extension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificationPolicy {
    /// Files strictly larger than this many MB go to `Large Files`.
    pub size_threshold_mb: Option<f64>,
    /// Files last modified strictly more than this many days ago go to `Old Files`.
    pub age_threshold_days: Option<u64>,
    /// When set, only files whose extension is in the set are processed.
    pub allowed_extensions: Option<HashSet<String>>,
}

impl ClassificationPolicy {
    /// Creates a policy without any thresholds or filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the size threshold. Positivity is checked by the config layer.
    pub fn with_size_threshold_mb(mut self, mb: f64) -> Self {
        self.size_threshold_mb = Some(mb);
        self
    }

    /// Sets the age threshold. Positivity is checked by the config layer.
    pub fn with_age_threshold_days(mut self, days: u64) -> Self {
        self.age_threshold_days = Some(days);
        self
    }

    /// Sets the allowed extensions.
    ///
    /// Entries are normalized and blanks dropped. An empty list leaves the
    /// filter disabled.
    pub fn with_allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: HashSet<String> = extensions
            .into_iter()
            .map(|ext| normalize_extension(ext.as_ref()))
            .filter(|ext| !ext.is_empty())
            .collect();
        self.allowed_extensions = if set.is_empty() { None } else { Some(set) };
        self
    }

    /// Checks a derived extension against the allow-list.
    pub fn allows(&self, ext: Option<&str>) -> bool {
        match (&self.allowed_extensions, ext) {
            (None, _) => true,
            (Some(allowed), Some(ext)) => allowed.contains(ext),
            (Some(_), None) => false,
        }
    }

    /// Returns true if `size` bytes exceeds the size threshold.
    pub fn is_large(&self, size: u64) -> bool {
        self.size_threshold_mb
            .is_some_and(|threshold| size as f64 / BYTES_PER_MB > threshold)
    }

    /// Returns true if `modified` is older than the age threshold relative to `now`.
    pub fn is_old(&self, modified: SystemTime, now: SystemTime) -> bool {
        let Some(days) = self.age_threshold_days else {
            return false;
        };
        let limit = Duration::from_secs(days.saturating_mul(SECONDS_PER_DAY));
        // A modification time in the future yields Err and is never old.
        now.duration_since(modified).is_ok_and(|age| age > limit)
    }

    /// Decides where a file goes.
    ///
    /// Returns `None` when the allow-list filters the file out. Otherwise the
    /// size rule wins over the age rule, which wins over the extension.
    pub fn classify(&self, entry: &FileEntry, now: SystemTime) -> Option<Destination> {
        let ext = entry.extension();
        if !self.allows(ext.as_deref()) {
            return None;
        }

        if self.is_large(entry.size) {
            return Some(Destination::Large);
        }

        if self.is_old(entry.modified, now) {
            return Some(Destination::Old);
        }

        Some(Destination::for_extension(ext.as_deref()))
    }
}
