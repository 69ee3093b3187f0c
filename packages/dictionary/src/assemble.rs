//! Route accumulation and final ordering.

use std::collections::HashMap;

use mtr_bus_dictionary_models::{Line, OutputDocument, Route};

/// Routes collected while scanning pages, in order of first appearance.
#[derive(Debug, Default)]
pub struct RouteCatalog {
    routes: Vec<Route>,
    index: HashMap<String, usize>,
}

impl RouteCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line to a route, creating the route on first sight.
    pub fn push_line(&mut self, route_number: &str, line: Line) {
        let idx = *self
            .index
            .entry(route_number.to_owned())
            .or_insert_with(|| {
                self.routes.push(Route::new(route_number));
                self.routes.len() - 1
            });
        self.routes[idx].lines.push(line);
    }

    /// Returns the routes in order of first appearance.
    #[must_use]
    pub fn into_routes(self) -> Vec<Route> {
        self.routes
    }
}

/// Produces the output document: routes sorted by route number.
#[must_use]
pub fn assemble(catalog: RouteCatalog) -> OutputDocument {
    let mut routes = catalog.into_routes();
    routes.sort_by(|a, b| a.route_number.cmp(&b.route_number));
    routes
}
