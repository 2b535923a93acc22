//! Progress reporting for multi-year loads.
//!
//! [`load_years`](crate::load_years) reports one step per yearly extract.
//! The CLI renders these as an `indicatif` bar; library callers and tests
//! pass [`null_progress()`].

use std::path::Path;
use std::sync::Arc;

/// Receives progress from a multi-year load.
pub trait LoadProgress: Send + Sync {
    /// Called once with the number of extracts about to be read.
    fn start(&self, files: u64);

    /// Called before the extract for `year` is read from `path`.
    fn reading(&self, year: i32, path: &Path);

    /// Called after an extract with `rows` data rows has been read.
    fn file_read(&self, rows: usize);

    /// Called once all extracts are concatenated into `rows` raw trips.
    fn finish(&self, rows: usize);
}

/// Ignores every update.
pub struct NullProgress;

impl LoadProgress for NullProgress {
    fn start(&self, _files: u64) {}
    fn reading(&self, _year: i32, _path: &Path) {}
    fn file_read(&self, _rows: usize) {}
    fn finish(&self, _rows: usize) {}
}

#[must_use]
pub fn null_progress() -> Arc<dyn LoadProgress> {
    Arc::new(NullProgress)
}
