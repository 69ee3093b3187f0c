#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Positioned text and table layout of PDF pages.
//!
//! The dictionary extractor never looks at raw PDF objects. It sees each
//! page through the [`Page`] trait: searchable text lines that know their
//! vertical position, and [`Table`]s that know their top edge and expose a
//! grid of nullable cell strings.
//!
//! Two ways of producing pages are provided:
//!
//! - [`load_pdf`] reads text spans and ruling lines with [`pdf_oxide`] and
//!   rebuilds the ruled tables (see [`ruled`]).
//! - [`load_layout`] reads a layout dump (JSON) produced by any external
//!   PDF tool.

pub mod layout;
mod oxide;
pub mod ruled;

use std::io::Write as _;

pub use layout::{LayoutPage, TextLine};

/// Errors specific to PDF layout extraction.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// The PDF could not be parsed.
    #[error("PDF extraction error: {0}")]
    Pdf(#[from] pdf_oxide::Error),

    /// A layout dump could not be parsed.
    #[error("Invalid layout dump: {0}")]
    Layout(#[from] serde_json::Error),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A fragment of page text matching a search pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMatch {
    /// The matched text.
    pub text: String,
    /// Vertical position of the text's top edge. Grows downwards.
    pub top: f64,
}

/// A single table cell. `None` for cells the layout could not fill.
pub type Cell = Option<String>;

/// A table on a page: a grid of cells and the position of its top edge.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Table {
    /// Vertical position of the table's top edge. Grows downwards.
    pub top: f64,
    /// Rows of cells, top to bottom.
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Creates a table from its top edge and rows.
    #[must_use]
    pub const fn new(top: f64, rows: Vec<Vec<Cell>>) -> Self {
        Self { top, rows }
    }

    /// Returns the cell grid.
    #[must_use]
    pub fn extract(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Returns the vertical position of the table's top edge.
    #[must_use]
    pub const fn top(&self) -> f64 {
        self.top
    }

    /// Returns the text of the cell at `row`/`col`, if present.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }
}

/// One page of a document, as seen by the extractor.
pub trait Page {
    /// Returns every match of `pattern` in the page text, in page order.
    fn search(&self, pattern: &regex::Regex) -> Vec<TextMatch>;

    /// Returns every table on the page, in page order.
    fn find_tables(&self) -> Vec<Table>;
}

impl<P: Page + ?Sized> Page for &P {
    fn search(&self, pattern: &regex::Regex) -> Vec<TextMatch> {
        (**self).search(pattern)
    }

    fn find_tables(&self) -> Vec<Table> {
        (**self).find_tables()
    }
}

/// Extracts the pages of an in-memory PDF.
///
/// # Errors
///
/// Returns [`PdfError::Io`] if the PDF cannot be staged on disk, or
/// [`PdfError::Pdf`] if it cannot be parsed.
pub fn load_pdf(bytes: &[u8]) -> Result<Vec<LayoutPage>, PdfError> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(bytes)?;
    file.flush()?;
    load_pdf_file(file.path())
}

/// Reads a PDF from disk and extracts its pages.
///
/// # Errors
///
/// Returns [`PdfError::Pdf`] if the file is missing or not a readable PDF.
pub fn load_pdf_file(path: impl AsRef<std::path::Path>) -> Result<Vec<LayoutPage>, PdfError> {
    let mut doc = pdf_oxide::PdfDocument::open(path)?;
    let pages = oxide::read_pages(&mut doc)?;

    log::debug!(
        "Extracted {} PDF pages with {} tables",
        pages.len(),
        pages.iter().map(|p| p.tables.len()).sum::<usize>()
    );
    Ok(pages)
}

/// Parses a layout dump: a JSON array of pages, each with positioned
/// `lines` and `tables`.
///
/// # Errors
///
/// Returns [`PdfError::Layout`] if the JSON does not describe pages.
pub fn load_layout(json: &str) -> Result<Vec<LayoutPage>, PdfError> {
    let pages: Vec<LayoutPage> = serde_json::from_str(json)?;
    log::debug!("Loaded layout dump with {} pages", pages.len());
    Ok(pages)
}
