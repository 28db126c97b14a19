#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Snapshot loading for the MaStR capacity tables.
//!
//! The `current_totals` and `monthly_timeline` tables are written as CSV by
//! an external loader. This crate reads them once into an immutable
//! [`Snapshot`] that request handlers share behind an `Arc`.

pub mod load;
pub mod paths;

use std::path::{Path, PathBuf};

use ee_status_registry_models::{ScopedTotal, TimelineRow};

/// Errors that can occur while loading a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A value could not be interpreted.
    #[error("Parse error in {file} line {line}: {message}")]
    Parse {
        /// Table the value came from.
        file: String,
        /// 1-based line number, counting the header.
        line: u64,
        /// Description of what went wrong.
        message: String,
    },

    /// A required table file does not exist.
    #[error("Missing table file: {}", .0.display())]
    MissingFile(PathBuf),
}

/// An immutable, in-memory copy of both snapshot tables.
///
/// Row order is the order of the source files and is significant: it is
/// the tie-break order for equal ranking scores.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    current_totals: Vec<ScopedTotal>,
    monthly_timeline: Vec<TimelineRow>,
}

impl Snapshot {
    /// Creates a snapshot from already-loaded rows.
    #[must_use]
    pub const fn new(current_totals: Vec<ScopedTotal>, monthly_timeline: Vec<TimelineRow>) -> Self {
        Self {
            current_totals,
            monthly_timeline,
        }
    }

    /// Rows of the `current_totals` table.
    #[must_use]
    pub fn current_totals(&self) -> &[ScopedTotal] {
        &self.current_totals
    }

    /// Rows of the `monthly_timeline` table.
    #[must_use]
    pub fn monthly_timeline(&self) -> &[TimelineRow] {
        &self.monthly_timeline
    }
}

/// Loads both tables from `dir`.
///
/// `current_totals.csv` is required. `monthly_timeline.csv` is optional; a
/// missing file yields an empty timeline.
///
/// # Errors
///
/// Returns [`RegistryError`] if the totals file is missing or either file
/// cannot be read or decoded.
pub fn load_snapshot(dir: &Path) -> Result<Snapshot, RegistryError> {
    let totals_path = paths::current_totals_path(dir);
    if !totals_path.exists() {
        return Err(RegistryError::MissingFile(totals_path));
    }

    log::info!("Loading current totals from {}", totals_path.display());
    let current_totals = load::read_current_totals(std::fs::File::open(&totals_path)?)?;
    log::info!("Loaded {} municipalities", current_totals.len());

    let timeline_path = paths::monthly_timeline_path(dir);
    let monthly_timeline = if timeline_path.exists() {
        log::info!("Loading monthly timeline from {}", timeline_path.display());
        let rows = load::read_monthly_timeline(std::fs::File::open(&timeline_path)?)?;
        log::info!("Loaded {} timeline rows", rows.len());
        rows
    } else {
        log::warn!(
            "No monthly timeline at {}, timelines will be empty",
            timeline_path.display()
        );
        Vec::new()
    };

    Ok(Snapshot::new(current_totals, monthly_timeline))
}

/// Loads the snapshot from [`paths::data_dir`].
///
/// # Errors
///
/// Returns [`RegistryError`] under the same conditions as [`load_snapshot`].
pub fn load_from_env() -> Result<Snapshot, RegistryError> {
    load_snapshot(&paths::data_dir())
}
