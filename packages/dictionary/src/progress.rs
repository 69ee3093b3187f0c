//! Page scan progress.
//!
//! [`crate::extract`] reads the document twice. Each pass announces itself
//! with [`ProgressCallback::begin_pass`] and reports every page it has
//! read, so a front end can show one bar per pass.

use strum_macros::Display;

/// One scan over the document's pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Pass {
    #[strum(to_string = "Reading route descriptions")]
    Descriptions,
    #[strum(to_string = "Reading route stations")]
    Stations,
}

/// Receives progress from the page scans.
pub trait ProgressCallback: Send + Sync {
    /// A pass over `pages` pages is starting.
    fn begin_pass(&self, pass: Pass, pages: u64);

    /// One more page of the current pass has been read.
    fn page_done(&self);

    /// Extraction has finished with `routes` routes.
    fn finish(&self, routes: usize);
}

/// Discards all progress.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn begin_pass(&self, _pass: Pass, _pages: u64) {}
    fn page_done(&self) {}
    fn finish(&self, _routes: usize) {}
}
