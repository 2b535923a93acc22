#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the bike-share toolchain.
//!
//! [`IndicatifProgress`] renders [`LoadProgress`] updates as an `indicatif`
//! bar, and [`init_logger`] routes `log` output through the same
//! [`MultiProgress`] so log lines and bars do not overwrite each other.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bikeshare_ingest::LoadProgress;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// Environment variable holding the `env_logger` filter.
pub const LOG_ENV: &str = "RUST_LOG";

/// An `indicatif` [`ProgressBar`] counting yearly extracts.
pub struct IndicatifProgress {
    bar: ProgressBar,
    /// Style used once the number of extracts is known.
    files_style: ProgressStyle,
}

impl IndicatifProgress {
    /// A bar for a multi-year load. Spins until [`LoadProgress::start()`]
    /// gives the number of extracts.
    #[must_use]
    pub fn files_bar(multi: &MultiProgress, message: &str) -> Arc<dyn LoadProgress> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());

        let files_style = ProgressStyle::with_template(
            "  {msg} {wide_bar:.cyan/dim} {pos}/{len} extracts [{elapsed_precise}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

        Arc::new(Self { bar, files_style })
    }
}

impl LoadProgress for IndicatifProgress {
    fn start(&self, files: u64) {
        self.bar.set_length(files);
        self.bar.set_position(0);
        self.bar.set_style(self.files_style.clone());
    }

    fn reading(&self, year: i32, path: &Path) {
        let file = path.file_name().unwrap_or(path.as_os_str());
        self.bar.set_message(format!("{year} ({})", file.to_string_lossy()));
    }

    fn file_read(&self, _rows: usize) {
        self.bar.inc(1);
    }

    fn finish(&self, rows: usize) {
        self.bar.finish_with_message(format!("Read {rows} raw trips"));
    }
}

/// Initializes `pretty_env_logger` wrapped in `indicatif-log-bridge`.
///
/// Logs at `info` unless [`LOG_ENV`] says otherwise. Returns the
/// [`MultiProgress`] that all progress bars must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_env(LOG_ENV)
        .build();
    let level = logger.filter();

    // A logger may already be installed, e.g. in tests.
    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok();

    log::set_max_level(level);

    multi
}
