//! Route station table parsing.
//!
//! Each direction of a route is printed as a header line such as
//! `Route 506 (Inbound)` followed by a table of stops. Headers and tables
//! are separate page objects, so each page's headers and tables are merged
//! into a single list ordered by vertical position and walked top to
//! bottom: a header becomes the current route and direction, and every
//! table below it belongs to that header until the next header appears.
//!
//! Stop tables are recognised by their header row (`Station ID`,
//! `Name (Chi)`, `Name (Eng)`, optionally `Lat`/`Long`). A few tables were
//! published without a header row; those are matched by route and
//! direction against [`ExtractorConfig::fixed_layouts`].

use mtr_bus_dictionary_models::{Line, Stop};
use mtr_bus_pdf::{Cell, Page, Table};
use regex::Regex;
use strum_macros::Display;

use crate::assemble::RouteCatalog;
use crate::config::ColumnMap;
use crate::descriptions::DescriptionLookup;
use crate::progress::{Pass, ProgressCallback};
use crate::text::{clean_name, parse_coordinate};
use crate::{ExtractError, ExtractorConfig};

/// A route header or a table, positioned on its page.
#[derive(Debug)]
enum PageItem {
    Header { route_number: String, direction: String },
    Table(Table),
}

/// A field of a stop table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
enum ColumnRole {
    StationId,
    ChineseName,
    EnglishName,
    Latitude,
    Longitude,
}

/// Header labels, uppercased, in matching priority order.
#[derive(Debug)]
struct HeaderLabels {
    roles: [(ColumnRole, String); 5],
}

impl HeaderLabels {
    fn new(config: &ExtractorConfig) -> Self {
        Self {
            roles: [
                (ColumnRole::StationId, config.station_id_label.to_uppercase()),
                (ColumnRole::ChineseName, config.chinese_name_label.to_uppercase()),
                (ColumnRole::EnglishName, config.english_name_label.to_uppercase()),
                (ColumnRole::Latitude, config.latitude_label.to_uppercase()),
                (ColumnRole::Longitude, config.longitude_label.to_uppercase()),
            ],
        }
    }

    fn station_id(&self) -> &str {
        &self.roles[0].1
    }

    /// The role of a header cell: the first label it contains.
    fn role_of(&self, cell: &str) -> Option<ColumnRole> {
        self.roles
            .iter()
            .find(|(_, label)| !label.is_empty() && cell.contains(label.as_str()))
            .map(|(role, _)| *role)
    }

    /// Locates the stop fields in a header row. A later cell with the same
    /// role replaces an earlier one.
    fn locate(&self, header: &[String]) -> Result<ColumnMap, ColumnRole> {
        let mut found = [None; 5];
        for (idx, cell) in header.iter().enumerate() {
            if let Some(role) = self.role_of(cell) {
                found[role as usize] = Some(idx);
            }
        }

        let required = |role: ColumnRole| found[role as usize].ok_or(role);
        Ok(ColumnMap {
            station_id: required(ColumnRole::StationId)?,
            chinese_name: required(ColumnRole::ChineseName)?,
            english_name: required(ColumnRole::EnglishName)?,
            latitude: found[ColumnRole::Latitude as usize],
            longitude: found[ColumnRole::Longitude as usize],
        })
    }
}

/// Reads stop tables and groups them into routes and lines.
#[derive(Debug)]
pub struct RouteStationParser<'a> {
    config: &'a ExtractorConfig,
    header_re: Regex,
    labels: HeaderLabels,
}

impl<'a> RouteStationParser<'a> {
    /// Creates a parser, compiling the route header pattern from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Regex`] if the header pattern is invalid.
    pub fn new(config: &'a ExtractorConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            config,
            header_re: Regex::new(&config.route_header_pattern)?,
            labels: HeaderLabels::new(config),
        })
    }

    /// Reads every page of a document into a new catalog.
    #[must_use]
    pub fn parse<P: Page>(
        &self,
        pages: &[P],
        descriptions: &DescriptionLookup,
        progress: &dyn ProgressCallback,
    ) -> RouteCatalog {
        progress.begin_pass(Pass::Stations, pages.len() as u64);

        let mut catalog = RouteCatalog::new();
        for (idx, page) in pages.iter().enumerate() {
            self.parse_page(idx + 1, page, descriptions, &mut catalog);
            progress.page_done();
        }
        catalog
    }

    /// The current route header does not carry over from the previous
    /// page.
    fn parse_page(
        &self,
        page_number: usize,
        page: &impl Page,
        descriptions: &DescriptionLookup,
        catalog: &mut RouteCatalog,
    ) {
        let mut current: Option<(String, String)> = None;

        for item in self.page_items(page) {
            match item {
                PageItem::Header {
                    route_number,
                    direction,
                } => current = Some((route_number, direction)),
                PageItem::Table(table) => {
                    let Some((route_number, direction)) = &current else {
                        continue;
                    };
                    let Some(stops) = self.read_stops(&table, route_number, direction) else {
                        log::debug!(
                            "Page {page_number}: table at {} under route {route_number} ({direction}) is not a stop table",
                            table.top()
                        );
                        continue;
                    };
                    if let Some(line) = describe_line(route_number, direction, stops, descriptions)
                    {
                        log::debug!(
                            "Page {page_number}: route {route_number} ({direction}): {} stops",
                            line.stops.len()
                        );
                        catalog.push_line(route_number, line);
                    }
                }
            }
        }
    }

    /// Route headers and non-empty tables of a page, ordered by vertical
    /// position. Headers come before tables at the same position.
    fn page_items(&self, page: &impl Page) -> Vec<PageItem> {
        let headers = page.search(&self.header_re).into_iter().filter_map(|m| {
            let caps = self.header_re.captures(&m.text)?;
            let item = PageItem::Header {
                route_number: caps.get(1)?.as_str().to_owned(),
                direction: caps.get(2)?.as_str().to_owned(),
            };
            Some((m.top, item))
        });
        let tables = page
            .find_tables()
            .into_iter()
            .filter(|t| t.extract().first().is_some_and(|row| !row.is_empty()))
            .map(|t| (t.top(), PageItem::Table(t)));

        let mut items: Vec<(f64, PageItem)> = headers.chain(tables).collect();
        items.sort_by(|a, b| a.0.total_cmp(&b.0));
        items.into_iter().map(|(_, item)| item).collect()
    }

    /// Reads the stops of a table, or `None` if it is not a stop table.
    fn read_stops(&self, table: &Table, route_number: &str, direction: &str) -> Option<Vec<Stop>> {
        let rows = table.extract();
        let header = header_labels(rows.first()?);
        let has_proper_header = header.join(" ").contains(self.labels.station_id());

        let (columns, data_rows) = if has_proper_header {
            match self.labels.locate(&header) {
                Ok(columns) => (columns, &rows[1..]),
                Err(missing) => {
                    log::debug!("Stop table header {header:?} has no {missing} column");
                    return None;
                }
            }
        } else {
            let columns = self.config.fixed_layout(route_number, direction)?;
            log::debug!("Using fixed column layout for route {route_number} ({direction})");
            (*columns, rows)
        };

        Some(
            data_rows
                .iter()
                .filter_map(|row| read_stop(row, &columns))
                .collect(),
        )
    }
}

/// Uppercased header cells with line breaks turned into spaces.
fn header_labels(row: &[Cell]) -> Vec<String> {
    row.iter()
        .map(|cell| cell.as_deref().unwrap_or_default().replace('\n', " ").to_uppercase())
        .collect()
}

/// Reads one stop from a data row. Rows missing an identifying field, or
/// too short to reach a coordinate column, are skipped. Unreadable
/// coordinates are left out.
fn read_stop(row: &[Cell], columns: &ColumnMap) -> Option<Stop> {
    let text = |idx: usize| row.get(idx)?.as_deref();
    // Outer `None`: the column exists but the row does not reach it.
    let coordinate = |idx: Option<usize>| match idx {
        None => Some(None),
        Some(idx) => row.get(idx).map(|cell| cell.as_deref().and_then(parse_coordinate)),
    };

    let ref_id = text(columns.station_id)?.trim();
    let name_ch = clean_name(text(columns.chinese_name)?);
    let name_en = clean_name(text(columns.english_name)?);
    let latitude = coordinate(columns.latitude)?;
    let longitude = coordinate(columns.longitude)?;

    Stop::new(ref_id, name_en, name_ch).map(|stop| stop.with_coordinates(latitude, longitude))
}

/// Builds a line from its stops. The description names the first and last
/// stops when they differ; otherwise it is the route's dictionary
/// description, or the route number and direction.
fn describe_line(
    route_number: &str,
    direction: &str,
    stops: Vec<Stop>,
    descriptions: &DescriptionLookup,
) -> Option<Line> {
    let (first, last) = (stops.first()?, stops.last()?);

    let (base_en, base_zh) = descriptions.get(route_number).map_or_else(
        || {
            let fallback = format!("{route_number} {direction}");
            (fallback.clone(), fallback)
        },
        |d| (d.description_en.clone(), d.description_zh.clone()),
    );

    let description_en = if first.name_en == last.name_en {
        base_en
    } else {
        format!("{} to {}", first.name_en, last.name_en)
    };
    let description_zh = if first.name_ch == last.name_ch {
        base_zh
    } else {
        format!("{}至{}", first.name_ch, last.name_ch)
    };

    Line::new(description_en, description_zh, stops)
}
