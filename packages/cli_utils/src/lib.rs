#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal output for the MTR Bus dictionary extractor: a logger that
//! cooperates with progress bars, and one progress bar per page scan.

use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};
use mtr_bus_dictionary::{Pass, ProgressCallback};

pub use indicatif::MultiProgress;

const PASS_TEMPLATE: &str = "{prefix:>28.cyan} {wide_bar:.cyan/dim} {pos}/{len} pages";

/// Shows each extraction pass as its own bar under a [`MultiProgress`].
pub struct PassProgress {
    multi: MultiProgress,
    current: Mutex<Option<ProgressBar>>,
}

impl PassProgress {
    #[must_use]
    pub const fn new(multi: MultiProgress) -> Self {
        Self {
            multi,
            current: Mutex::new(None),
        }
    }

    fn with_current(&self, f: impl FnOnce(&mut Option<ProgressBar>)) {
        if let Ok(mut current) = self.current.lock() {
            f(&mut current);
        }
    }
}

impl ProgressCallback for PassProgress {
    fn begin_pass(&self, pass: Pass, pages: u64) {
        let bar = self.multi.add(ProgressBar::new(pages));
        bar.set_style(
            ProgressStyle::with_template(PASS_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        bar.set_prefix(pass.to_string());

        self.with_current(|current| {
            if let Some(done) = current.replace(bar) {
                done.finish();
            }
        });
    }

    fn page_done(&self) {
        self.with_current(|current| {
            if let Some(bar) = current {
                bar.inc(1);
            }
        });
    }

    fn finish(&self, routes: usize) {
        self.with_current(|current| {
            if let Some(bar) = current.take() {
                bar.finish();
            }
        });
        log::debug!("Progress closed after {routes} routes");
    }
}

/// Installs a `pretty_env_logger` logger behind `indicatif-log-bridge`,
/// so log lines print above the bars of the returned [`MultiProgress`].
///
/// `default_filter` applies unless `RUST_LOG` is set.
///
/// # Errors
///
/// Returns [`log::SetLoggerError`] if a global logger is already installed.
pub fn init_logger(default_filter: &str) -> Result<MultiProgress, log::SetLoggerError> {
    let mut builder = pretty_env_logger::formatted_builder();
    match std::env::var("RUST_LOG") {
        Ok(filters) => builder.parse_filters(&filters),
        Err(_) => builder.parse_filters(default_filter),
    };
    let logger = builder.build();
    let max_level = logger.filter();

    let multi = MultiProgress::new();
    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger).try_init()?;
    log::set_max_level(max_level);

    Ok(multi)
}

#[cfg(test)]
mod tests {
    use indicatif::ProgressDrawTarget;

    use super::*;

    fn hidden() -> PassProgress {
        PassProgress::new(MultiProgress::with_draw_target(ProgressDrawTarget::hidden()))
    }

    #[test]
    fn pages_advance_the_current_pass() {
        let progress = hidden();
        progress.begin_pass(Pass::Descriptions, 4);
        progress.page_done();
        progress.page_done();

        let current = progress.current.lock().unwrap();
        let bar = current.as_ref().unwrap();
        assert_eq!(bar.position(), 2);
        assert_eq!(bar.length(), Some(4));
        assert_eq!(bar.prefix(), "Reading route descriptions");
    }

    #[test]
    fn a_new_pass_replaces_the_previous_bar() {
        let progress = hidden();
        progress.begin_pass(Pass::Descriptions, 2);
        progress.page_done();
        progress.begin_pass(Pass::Stations, 2);

        let current = progress.current.lock().unwrap();
        let bar = current.as_ref().unwrap();
        assert_eq!(bar.position(), 0);
        assert_eq!(bar.prefix(), "Reading route stations");
    }

    #[test]
    fn finish_closes_the_bar() {
        let progress = hidden();
        progress.begin_pass(Pass::Stations, 1);
        progress.page_done();
        progress.finish(1);

        assert!(progress.current.lock().unwrap().is_none());
    }
}
