//! Cell text cleanup.

use std::borrow::Cow;

use scraper::Html;

/// Decodes HTML character references (`&amp;`, `&#39;`, ...) in cell text.
///
/// Text without an ampersand is returned unchanged. Angle brackets are
/// kept as literal text.
#[must_use]
pub fn unescape_html(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    let fragment = Html::parse_fragment(&text.replace('<', "&lt;"));
    Cow::Owned(fragment.root_element().text().collect())
}

/// Cleans a stop name: decodes entities, collapses whitespace runs
/// (line breaks included) to single spaces, trims, and drops the space
/// before an opening parenthesis.
#[must_use]
pub fn clean_name(raw: &str) -> String {
    unescape_html(raw)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace(" (", "(")
}

/// Cleans a route number cell: decodes entities, strips `placeholder`,
/// turns line breaks into spaces, and trims.
#[must_use]
pub fn clean_route_number(raw: &str, placeholder: &str) -> String {
    let text = unescape_html(raw);
    let text = if placeholder.is_empty() {
        text.into_owned()
    } else {
        text.replace(placeholder, "")
    };
    text.replace('\n', " ").trim().to_owned()
}

/// Parses a coordinate cell, accepting only finite numbers.
#[must_use]
pub fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
