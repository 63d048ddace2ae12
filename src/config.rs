use std::path::PathBuf;

/// Canonical calendar-date rendering used across storage and reports.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Runtime configuration handed to every component at construction.
///
/// Both paths come from the command line; there are no process-wide
/// path constants.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub export_dir: PathBuf,
}

impl Config {
    pub fn new(db_path: PathBuf, export_dir: PathBuf) -> Self {
        Self {
            db_path,
            export_dir,
        }
    }
}
