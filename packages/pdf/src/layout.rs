//! In-memory page layout.
//!
//! A [`LayoutPage`] holds the text lines and tables of a page together
//! with their vertical positions. It is what [`crate::load_pdf`] and
//! [`crate::load_layout`] produce, and what tests build by hand.

use serde::{Deserialize, Serialize};

use crate::{Page, Table, TextMatch};

/// A line of page text and the position of its top edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    /// The line's text.
    pub text: String,
    /// Vertical position of the line's top edge. Grows downwards.
    pub top: f64,
}

/// A page made of positioned text lines and tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutPage {
    /// Text lines in reading order.
    #[serde(default)]
    pub lines: Vec<TextLine>,
    /// Tables in reading order.
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl LayoutPage {
    /// Creates an empty page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a text line at the given position.
    #[must_use]
    pub fn with_line(mut self, text: &str, top: f64) -> Self {
        self.lines.push(TextLine {
            text: text.to_owned(),
            top,
        });
        self
    }

    /// Adds a table.
    #[must_use]
    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }
}

impl Page for LayoutPage {
    fn search(&self, pattern: &regex::Regex) -> Vec<TextMatch> {
        self.lines
            .iter()
            .flat_map(|line| {
                pattern.find_iter(&line.text).map(|m| TextMatch {
                    text: m.as_str().to_owned(),
                    top: line.top,
                })
            })
            .collect()
    }

    fn find_tables(&self) -> Vec<Table> {
        self.tables.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_reports_line_positions() {
        let page = LayoutPage::new()
            .with_line("Route K12 (Circular)", 40.0)
            .with_line("Some prose", 55.0)
            .with_line("Route 506 (Inbound) and Route 506 (Outbound)", 300.0);
        let pattern = regex::Regex::new(r"Route\s+\w+\s+\([^)]+\)").unwrap();

        let matches = page.search(&pattern);

        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].text, "Route K12 (Circular)");
        assert_eq!(matches[0].top, 40.0);
        assert_eq!(matches[1].text, "Route 506 (Inbound)");
        assert_eq!(matches[2].text, "Route 506 (Outbound)");
        assert_eq!(matches[2].top, 300.0);
    }
}
