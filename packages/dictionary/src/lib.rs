#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Route and station extraction from the MTR Bus data dictionary.
//!
//! The dictionary PDF lists every bus route twice: once in a parameter
//! table mapping route numbers to bilingual descriptions, and once as a
//! series of `Route <number> (<direction>)` headings, each followed by a
//! table of stops. [`extract`] reads both and produces the routes, their
//! directional lines and ordered stops.
//!
//! Two passes are made over the pages:
//!
//! 1. [`DescriptionParser`] builds the route description lookup.
//! 2. [`RouteStationParser`] pairs headings with stop tables and builds
//!    one [`Line`](mtr_bus_dictionary_models::Line) per table, falling back
//!    to the lookup when a line's endpoints do not describe it.
//!
//! [`assemble`] then orders the routes by route number.

pub mod assemble;
pub mod config;
pub mod descriptions;
pub mod output;
pub mod progress;
pub mod stations;
pub mod text;

use mtr_bus_dictionary_models::OutputDocument;
use mtr_bus_pdf::Page;

pub use assemble::{RouteCatalog, assemble};
pub use config::ExtractorConfig;
pub use descriptions::{DescriptionLookup, DescriptionParser};
pub use output::{render_summary, write_json, write_json_file};
pub use progress::{NullProgress, Pass, ProgressCallback};
pub use stations::RouteStationParser;

/// Errors that can occur while configuring or running an extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The route header pattern failed to compile.
    #[error("Invalid route header pattern: {0}")]
    Regex(#[from] regex::Error),

    /// The extractor config could not be parsed.
    #[error("Invalid extractor config: {0}")]
    Config(#[from] toml::de::Error),

    /// Serializing the output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Extracts the routes of a document.
///
/// Pages are scanned twice, descriptions first. `progress` hears about
/// each pass and each page read.
///
/// # Errors
///
/// Returns [`ExtractError::Regex`] if the configured route header pattern
/// is invalid. Malformed tables and rows are skipped, never errors.
pub fn extract<P: Page>(
    pages: &[P],
    config: &ExtractorConfig,
    progress: &dyn ProgressCallback,
) -> Result<OutputDocument, ExtractError> {
    let station_parser = RouteStationParser::new(config)?;

    let descriptions = DescriptionParser::new(config).parse(pages, progress);
    if descriptions.is_empty() {
        log::warn!(
            "No route descriptions found (no table starting with '{}')",
            config.description_table_marker
        );
    } else {
        log::info!("Found {} route descriptions", descriptions.len());
    }

    let routes = assemble(station_parser.parse(pages, &descriptions, progress));

    log::info!(
        "Extracted {} routes with {} lines",
        routes.len(),
        routes.iter().map(|r| r.lines.len()).sum::<usize>()
    );
    progress.finish(routes.len());

    Ok(routes)
}
