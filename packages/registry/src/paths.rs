#![allow(clippy::module_name_repetitions)]
//! Canonical file paths for the snapshot data directory.
//!
//! The directory defaults to the project root's `data/` directory and can
//! be redirected with the `EE_STATUS_DATA_DIR` environment variable.

use std::path::{Path, PathBuf};

/// Environment variable that overrides [`data_dir`].
pub const DATA_DIR_ENV: &str = "EE_STATUS_DATA_DIR";

/// File name of the current-totals table.
pub const CURRENT_TOTALS_FILE: &str = "current_totals.csv";

/// File name of the monthly-timeline table.
pub const MONTHLY_TIMELINE_FILE: &str = "monthly_timeline.csv";

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`; falls back to the
/// current directory if the manifest sits fewer than two levels deep.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Returns the snapshot directory: `$EE_STATUS_DATA_DIR` if set and
/// non-empty, otherwise `<project root>/data`.
#[must_use]
pub fn data_dir() -> PathBuf {
    std::env::var(DATA_DIR_ENV)
        .ok()
        .filter(|dir| !dir.trim().is_empty())
        .map_or_else(|| project_root().join("data"), PathBuf::from)
}

/// Returns the path of the current-totals table inside `dir`.
#[must_use]
pub fn current_totals_path(dir: &Path) -> PathBuf {
    dir.join(CURRENT_TOTALS_FILE)
}

/// Returns the path of the monthly-timeline table inside `dir`.
#[must_use]
pub fn monthly_timeline_path(dir: &Path) -> PathBuf {
    dir.join(MONTHLY_TIMELINE_FILE)
}
