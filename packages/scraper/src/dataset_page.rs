//! Data dictionary link discovery on the dataset page.
//!
//! The portal's markup has changed over time, so three places are tried in
//! order and the first link found wins:
//!
//! 1. resource blocks (`div`/`section` with a `resource-item`, `resource`
//!    or `data-resource` class);
//! 2. the section around a "Data Dictionary" heading;
//! 3. any `DataDictionary*.pdf` link on the page.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::ScrapeError;

static DICTIONARY_HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)DataDictionary.*\.pdf").expect("valid regex"));

static PDF_HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.pdf").expect("valid regex"));

static DICTIONARY_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Data\s+Dictionar(y|ies)").expect("valid regex"));

const RESOURCE_SELECTOR: &str = "div.resource-item, div.resource, div.data-resource, \
     section.resource-item, section.resource, section.data-resource";
const HEADING_SELECTOR: &str = "h2, h3, h4";
const LINK_SELECTOR: &str = "a[href]";

/// Finds the data dictionary PDF link in a dataset page and resolves it
/// against `base_url`.
///
/// # Errors
///
/// Returns [`ScrapeError::PdfNotFound`] if the page has no dictionary
/// link, or [`ScrapeError::Url`] if the link cannot be resolved.
pub fn find_dictionary_pdf_url(html: &str, base_url: &str) -> Result<String, ScrapeError> {
    let document = Html::parse_document(html);
    let links = parse_selector(LINK_SELECTOR)?;

    let href = match resource_link(&document, &links)? {
        Some(href) => Some(href),
        None => heading_link(&document, &links)?,
    }
    .or_else(|| page_link(&document, &links))
    .ok_or_else(|| ScrapeError::PdfNotFound(base_url.to_owned()))?;

    resolve(base_url, &href)
}

/// Dictionary links inside resource blocks.
fn resource_link(document: &Html, links: &Selector) -> Result<Option<String>, ScrapeError> {
    let sections = parse_selector(RESOURCE_SELECTOR)?;
    Ok(document
        .select(&sections)
        .find_map(|section| first_href(section, links, |href| DICTIONARY_HREF_RE.is_match(href))))
}

/// PDF links next to a "Data Dictionary" heading.
fn heading_link(document: &Html, links: &Selector) -> Result<Option<String>, ScrapeError> {
    let headings = parse_selector(HEADING_SELECTOR)?;
    Ok(document
        .select(&headings)
        .filter(|heading| DICTIONARY_HEADING_RE.is_match(&heading.text().collect::<String>()))
        .filter_map(|heading| heading.parent().and_then(ElementRef::wrap))
        .find_map(|parent| {
            first_href(parent, links, |href| {
                PDF_HREF_RE.is_match(href) && href.contains("DataDictionary")
            })
        }))
}

/// Any dictionary link on the page.
fn page_link(document: &Html, links: &Selector) -> Option<String> {
    document
        .select(links)
        .filter_map(|link| link.value().attr("href"))
        .find(|href| DICTIONARY_HREF_RE.is_match(href))
        .map(str::to_owned)
}

fn first_href(
    scope: ElementRef<'_>,
    links: &Selector,
    accept: impl Fn(&str) -> bool,
) -> Option<String> {
    scope
        .select(links)
        .filter_map(|link| link.value().attr("href"))
        .find(|href| !href.is_empty() && accept(href))
        .map(str::to_owned)
}

fn resolve(base_url: &str, href: &str) -> Result<String, ScrapeError> {
    let base = Url::parse(base_url).map_err(|e| invalid_url(base_url, &e))?;
    let url = base.join(href).map_err(|e| invalid_url(href, &e))?;
    Ok(url.to_string())
}

fn invalid_url(url: &str, error: &impl std::fmt::Display) -> ScrapeError {
    ScrapeError::Url {
        url: url.to_owned(),
        message: error.to_string(),
    }
}

/// Parses a CSS selector string, returning a [`ScrapeError`] on failure.
fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|_| ScrapeError::Selector(selector.to_owned()))
}
