//! Extractor configuration.
//!
//! Every pattern and label the parsers look for lives in
//! [`ExtractorConfig`]. The defaults match the published dictionary; a TOML
//! file can override any subset of them when the document's wording
//! drifts.
//!
//! ```toml
//! description_table_marker = "Parameter 2"
//!
//! [[fixed_layouts]]
//! route_number = "506"
//! direction_contains = "Inbound"
//! columns = { station_id = 0, latitude = 1, longitude = 2, chinese_name = 3, english_name = 4 }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::ExtractError;

/// Patterns and labels used to recognise route headers and tables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Regex matching a route header such as `Route 506 (Inbound)`.
    /// Capture group 1 is the route number, group 2 the direction.
    pub route_header_pattern: String,
    /// Text in the top-left cell of the route description table.
    pub description_table_marker: String,
    /// Placeholder stripped from route number cells.
    pub route_number_placeholder: String,
    /// Description cells containing this text are type annotations, not
    /// descriptions.
    pub type_annotation_marker: String,
    /// Header label of the station id column.
    pub station_id_label: String,
    /// Header label of the Chinese name column.
    pub chinese_name_label: String,
    /// Header label of the English name column.
    pub english_name_label: String,
    /// Header label of the latitude column.
    pub latitude_label: String,
    /// Header label of the longitude column.
    pub longitude_label: String,
    /// Stop tables printed without a header row.
    pub fixed_layouts: Vec<FixedLayoutRule>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            route_header_pattern: r"(?i)Route\s+([A-Z0-9]+)\s+\(([^)]+)\)".to_owned(),
            description_table_marker: "Parameter 2".to_owned(),
            route_number_placeholder: "(routeName)".to_owned(),
            type_annotation_marker: "Type\nString".to_owned(),
            station_id_label: "STATION ID".to_owned(),
            chinese_name_label: "NAME (CHI)".to_owned(),
            english_name_label: "NAME (ENG)".to_owned(),
            latitude_label: "LAT".to_owned(),
            longitude_label: "LONG".to_owned(),
            fixed_layouts: vec![FixedLayoutRule {
                route_number: "506".to_owned(),
                direction_contains: "Inbound".to_owned(),
                columns: ColumnMap {
                    station_id: 0,
                    latitude: Some(1),
                    longitude: Some(2),
                    chinese_name: 3,
                    english_name: 4,
                },
            }],
        }
    }
}

impl ExtractorConfig {
    /// Parses a TOML config. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Config`] if the TOML is malformed.
    pub fn from_toml_str(toml: &str) -> Result<Self, ExtractError> {
        Ok(toml::from_str(toml)?)
    }

    /// Reads and parses a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Io`] if the file cannot be read, or
    /// [`ExtractError::Config`] if it is malformed.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ExtractError> {
        let path = path.as_ref();
        log::debug!("Loading extractor config from {}", path.display());
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Returns the fixed column layout for a header-less table under the
    /// given route header, if one is configured.
    #[must_use]
    pub fn fixed_layout(&self, route_number: &str, direction: &str) -> Option<&ColumnMap> {
        self.fixed_layouts
            .iter()
            .find(|rule| rule.matches(route_number, direction))
            .map(|rule| &rule.columns)
    }
}

/// A stop table known to be printed without its header row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FixedLayoutRule {
    /// Route number the rule applies to (exact match).
    pub route_number: String,
    /// Text the header's direction must contain (case-sensitive).
    pub direction_contains: String,
    /// Column positions to use instead of header detection.
    pub columns: ColumnMap,
}

impl FixedLayoutRule {
    /// Whether the rule applies to a table under this route header.
    #[must_use]
    pub fn matches(&self, route_number: &str, direction: &str) -> bool {
        self.route_number == route_number && direction.contains(&self.direction_contains)
    }
}

/// Column positions of the fields of a stop table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ColumnMap {
    /// Station id column.
    pub station_id: usize,
    /// Latitude column, if the table has one.
    #[serde(default)]
    pub latitude: Option<usize>,
    /// Longitude column, if the table has one.
    #[serde(default)]
    pub longitude: Option<usize>,
    /// Chinese name column.
    pub chinese_name: usize,
    /// English name column.
    pub english_name: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_keeps_defaults() {
        let config = ExtractorConfig::from_toml_str("").unwrap();
        assert_eq!(config, ExtractorConfig::default());
    }

    #[test]
    fn toml_overrides_selected_fields() {
        let config = ExtractorConfig::from_toml_str(
            r#"
            description_table_marker = "Parameter 3"

            [[fixed_layouts]]
            route_number = "K12"
            direction_contains = "Outbound"
            columns = { station_id = 1, chinese_name = 2, english_name = 3 }
            "#,
        )
        .unwrap();

        assert_eq!(config.description_table_marker, "Parameter 3");
        assert_eq!(config.station_id_label, "STATION ID");
        assert!(config.fixed_layout("506", "Inbound").is_none());

        let columns = config.fixed_layout("K12", "to Tai Po (Outbound)").unwrap();
        assert_eq!(columns.station_id, 1);
        assert_eq!(columns.latitude, None);
    }

    #[test]
    fn default_fixed_layout_matches_route_506_inbound_only() {
        let config = ExtractorConfig::default();

        assert!(config.fixed_layout("506", "Inbound").is_some());
        assert!(config.fixed_layout("506", "Outbound").is_none());
        assert!(config.fixed_layout("506", "inbound").is_none());
        assert!(config.fixed_layout("K506", "Inbound").is_none());
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        assert!(matches!(
            ExtractorConfig::from_toml_str("fixed_layouts = 3"),
            Err(ExtractError::Config(_))
        ));
    }
}
