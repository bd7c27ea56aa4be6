//! declutter - sort the files of a folder into subfolders
//!
//! This library classifies the top-level files of a directory by size, age,
//! or extension, moves each one into a matching subfolder, and keeps an
//! append-only log of every move. Settings come from TOML configuration
//! files and command-line flags.

pub mod cli;
pub mod config;
pub mod file_organizer;
pub mod move_log;
pub mod output;
pub mod policy;

pub use config::{ConfigError, OrganizeSettings, OrganizerConfig};
pub use file_organizer::{FolderOrganizer, OrganizeError, OrganizeOptions, RunReport};
pub use move_log::{MoveLog, MoveRecord};
pub use policy::{ClassificationPolicy, Destination, FileEntry};

pub use cli::{Cli, run_cli, run_cli_with_config};
