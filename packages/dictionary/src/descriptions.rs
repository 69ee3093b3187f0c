//! Route description table parsing.
//!
//! The dictionary documents the `routeName` request parameter with a table
//! whose top-left cell reads `Parameter 2`. Each data row pairs a route
//! number (column 0) with a bilingual description (column 2), English on
//! the first line of the cell and Chinese on the second. A route with
//! several descriptions only names itself in its first row; the following
//! rows leave column 0 empty and inherit it.

use std::collections::BTreeMap;

use mtr_bus_dictionary_models::RouteDescription;
use mtr_bus_pdf::{Page, Table};

use crate::ExtractorConfig;
use crate::progress::{Pass, ProgressCallback};
use crate::text::{clean_route_number, unescape_html};

/// Route descriptions keyed by route number.
pub type DescriptionLookup = BTreeMap<String, RouteDescription>;

/// Reads route descriptions out of the description table.
#[derive(Debug, Clone, Copy)]
pub struct DescriptionParser<'a> {
    config: &'a ExtractorConfig,
}

impl<'a> DescriptionParser<'a> {
    /// Creates a parser using the markers in `config`.
    #[must_use]
    pub const fn new(config: &'a ExtractorConfig) -> Self {
        Self { config }
    }

    /// Builds the description lookup from every page of a document. Later
    /// entries for the same route replace earlier ones.
    #[must_use]
    pub fn parse<P: Page>(&self, pages: &[P], progress: &dyn ProgressCallback) -> DescriptionLookup {
        progress.begin_pass(Pass::Descriptions, pages.len() as u64);

        let mut lookup = DescriptionLookup::new();
        for page in pages {
            self.parse_page(page, &mut lookup);
            progress.page_done();
        }
        lookup
    }

    fn parse_page(&self, page: &impl Page, lookup: &mut DescriptionLookup) {
        for table in page.find_tables() {
            if self.is_description_table(&table) {
                self.parse_table(&table, lookup);
            }
        }
    }

    fn is_description_table(&self, table: &Table) -> bool {
        table
            .cell(0, 0)
            .is_some_and(|cell| cell.contains(&self.config.description_table_marker))
    }

    fn parse_table(&self, table: &Table, lookup: &mut DescriptionLookup) {
        let mut last_route_number: Option<String> = None;

        for row in table.extract().iter().skip(1) {
            if row.len() < 3 {
                continue;
            }

            if let Some(raw) = row[0].as_deref() {
                let route_number =
                    clean_route_number(raw, &self.config.route_number_placeholder);
                if !route_number.is_empty() {
                    last_route_number = Some(route_number);
                }
            }

            let (Some(route_number), Some(raw)) = (&last_route_number, row[2].as_deref()) else {
                continue;
            };

            let text = unescape_html(raw);
            let text = text.trim();
            if text.contains(&self.config.type_annotation_marker) {
                continue;
            }

            let Some((description_en, description_zh)) = split_bilingual(text) else {
                continue;
            };

            log::trace!("Description for route {route_number}: {description_en} / {description_zh}");

            lookup.insert(
                route_number.clone(),
                RouteDescription {
                    route_number: route_number.clone(),
                    description_en,
                    description_zh,
                },
            );
        }
    }
}

/// Splits a description cell into its English and Chinese lines. A single
/// line serves as both. Returns `None` unless both are non-empty.
fn split_bilingual(text: &str) -> Option<(String, String)> {
    let mut lines = text.split('\n');
    let first = lines.next()?.trim();
    let second = lines.next().map_or(first, str::trim);

    (!first.is_empty() && !second.is_empty()).then(|| (first.to_owned(), second.to_owned()))
}

#[cfg(test)]
mod tests {
    use mtr_bus_pdf::LayoutPage;

    use super::*;
    use crate::NullProgress;

    fn row(cells: &[Option<&str>]) -> Vec<Option<String>> {
        cells.iter().map(|c| c.map(str::to_owned)).collect()
    }

    fn description_page() -> LayoutPage {
        LayoutPage::new().with_table(Table::new(
            100.0,
            vec![
                row(&[Some("Parameter 2"), Some("Mandatory"), Some("Description")]),
                row(&[Some("(routeName)"), None, Some("Type\nString")]),
                row(&[
                    Some("K12\n(routeName)"),
                    Some("Y"),
                    Some("Tai Po Market Station - Eightland Gardens\n大埔墟站 - 八號花園"),
                ]),
                row(&[Some("506"), Some("Y"), Some("Tuen Mun Station - Siu Lun")]),
                row(&[None, Some("Y"), Some("Tuen Mun Station - Siu Lun (Circular)\n屯門站 - 兆麟 (循環線)")]),
                row(&[Some("K14"), Some("Y"), Some("   ")]),
                row(&[Some("K17")]),
            ],
        ))
    }

    #[test]
    fn reads_bilingual_descriptions() {
        let config = ExtractorConfig::default();
        let lookup = DescriptionParser::new(&config).parse(&[description_page()], &NullProgress);

        let k12 = &lookup["K12"];
        assert_eq!(k12.route_number, "K12");
        assert_eq!(k12.description_en, "Tai Po Market Station - Eightland Gardens");
        assert_eq!(k12.description_zh, "大埔墟站 - 八號花園");
    }

    #[test]
    fn continuation_rows_inherit_and_overwrite_the_route() {
        let config = ExtractorConfig::default();
        let lookup = DescriptionParser::new(&config).parse(&[description_page()], &NullProgress);

        let route = &lookup["506"];
        assert_eq!(route.description_en, "Tuen Mun Station - Siu Lun (Circular)");
        assert_eq!(route.description_zh, "屯門站 - 兆麟 (循環線)");
    }

    #[test]
    fn skips_type_annotations_blank_and_short_rows() {
        let config = ExtractorConfig::default();
        let lookup = DescriptionParser::new(&config).parse(&[description_page()], &NullProgress);

        assert_eq!(lookup.len(), 2);
        assert!(!lookup.contains_key("K14"));
        assert!(!lookup.contains_key("K17"));
    }

    #[test]
    fn single_line_descriptions_serve_both_languages() {
        assert_eq!(
            split_bilingual("Tuen Mun Station - Siu Lun"),
            Some((
                "Tuen Mun Station - Siu Lun".to_owned(),
                "Tuen Mun Station - Siu Lun".to_owned()
            ))
        );
        assert_eq!(split_bilingual("English\n"), None);
    }

    #[test]
    fn ignores_other_tables() {
        let config = ExtractorConfig::default();
        let page = LayoutPage::new().with_table(Table::new(
            0.0,
            vec![
                row(&[Some("Parameter 1"), None, None]),
                row(&[Some("K12"), None, Some("Not a route description")]),
            ],
        ));

        assert!(DescriptionParser::new(&config).parse(&[page], &NullProgress).is_empty());
    }

    #[test]
    fn parsing_is_repeatable() {
        let config = ExtractorConfig::default();
        let parser = DescriptionParser::new(&config);
        let pages = [description_page(), description_page()];

        assert_eq!(
            parser.parse(&pages, &NullProgress),
            parser.parse(&pages, &NullProgress)
        );
    }
}
