#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Route, line, and stop types extracted from the MTR Bus data dictionary.
//!
//! These types double as the JSON output schema: a document is a list of
//! [`Route`]s sorted by route number, each holding one [`Line`] per
//! direction of travel, each line holding its [`Stop`]s in travel order.

use serde::{Deserialize, Serialize};

/// Bilingual description of a route, as listed in the dictionary's route
/// parameter table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDescription {
    /// Route number (e.g. `"K12"`).
    pub route_number: String,
    /// English description.
    pub description_en: String,
    /// Chinese description.
    pub description_zh: String,
}

/// A bus stop on a line.
///
/// `name_en`, `name_ch` and `ref_id` are never empty; use [`Stop::new`] to
/// construct one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    /// English stop name.
    pub name_en: String,
    /// Chinese stop name.
    pub name_ch: String,
    /// Station identifier from the dictionary.
    #[serde(rename = "ref_ID")]
    pub ref_id: String,
    /// Latitude (WGS84), when the source table provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Longitude (WGS84), when the source table provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Stop {
    /// Creates a stop without coordinates.
    ///
    /// Returns `None` if any of the identifying fields is empty.
    #[must_use]
    pub fn new(
        ref_id: impl Into<String>,
        name_en: impl Into<String>,
        name_ch: impl Into<String>,
    ) -> Option<Self> {
        let (ref_id, name_en, name_ch) = (ref_id.into(), name_en.into(), name_ch.into());
        if ref_id.is_empty() || name_en.is_empty() || name_ch.is_empty() {
            return None;
        }
        Some(Self {
            name_en,
            name_ch,
            ref_id,
            latitude: None,
            longitude: None,
        })
    }

    /// Sets the coordinates. Non-finite values are treated as absent.
    #[must_use]
    pub fn with_coordinates(mut self, latitude: Option<f64>, longitude: Option<f64>) -> Self {
        self.latitude = latitude.filter(|v| v.is_finite());
        self.longitude = longitude.filter(|v| v.is_finite());
        self
    }
}

/// One direction of travel on a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// English description (usually `"<first stop> to <last stop>"`).
    pub description_en: String,
    /// Chinese description (usually `"<first stop>至<last stop>"`).
    pub description_zh: String,
    /// Stops in travel order. Never empty.
    pub stops: Vec<Stop>,
}

impl Line {
    /// Creates a line, returning `None` when `stops` is empty.
    #[must_use]
    pub fn new(
        description_en: impl Into<String>,
        description_zh: impl Into<String>,
        stops: Vec<Stop>,
    ) -> Option<Self> {
        if stops.is_empty() {
            return None;
        }
        Some(Self {
            description_en: description_en.into(),
            description_zh: description_zh.into(),
            stops,
        })
    }
}

/// A bus route and its directional lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Route number (e.g. `"506"`).
    pub route_number: String,
    /// Lines in the order they were found in the document.
    pub lines: Vec<Line>,
}

impl Route {
    /// Creates a route with no lines yet.
    #[must_use]
    pub fn new(route_number: impl Into<String>) -> Self {
        Self {
            route_number: route_number.into(),
            lines: Vec::new(),
        }
    }
}

/// The extracted document: routes sorted by route number.
pub type OutputDocument = Vec<Route>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_requires_identifying_fields() {
        assert!(Stop::new("", "Tuen Mun", "屯門").is_none());
        assert!(Stop::new("1", "", "屯門").is_none());
        assert!(Stop::new("1", "Tuen Mun", "").is_none());
        assert!(Stop::new("1", "Tuen Mun", "屯門").is_some());
    }

    #[test]
    fn non_finite_coordinates_are_dropped() {
        let stop = Stop::new("1", "Tuen Mun", "屯門")
            .unwrap()
            .with_coordinates(Some(f64::NAN), Some(113.97));
        assert_eq!(stop.latitude, None);
        assert_eq!(stop.longitude, Some(113.97));
    }

    #[test]
    fn line_requires_stops() {
        assert!(Line::new("A to B", "A至B", Vec::new()).is_none());
    }

    #[test]
    fn stop_serializes_with_dictionary_field_names() {
        let stop = Stop::new("506-U010", "Tuen Mun Station", "屯門站")
            .unwrap()
            .with_coordinates(Some(22.395), None);
        let json = serde_json::to_value(&stop).unwrap();

        assert_eq!(json["ref_ID"], "506-U010");
        assert_eq!(json["name_ch"], "屯門站");
        assert_eq!(json["latitude"], 22.395);
        assert!(json.get("longitude").is_none());
        assert!(json.get("ref_id").is_none());
    }
}
