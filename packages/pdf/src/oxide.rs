//! Page content read through `pdf_oxide`.
//!
//! Text spans become [`Fragment`]s and the straight parts of painted paths
//! become [`Rule`]s. PDF space has y growing upwards, so every position is
//! flipped to a distance below the highest content on the page.

use pdf_oxide::PdfDocument;
use pdf_oxide::elements::PathOperation;
use pdf_oxide::geometry::Rect;

use crate::ruled::{self, Fragment, Rule};
use crate::{LayoutPage, PdfError};

/// Rectangles no thicker than this are drawn lines, not boxes.
const THIN: f32 = 2.0;

/// Segments drifting less than this off an axis run along it.
const STRAIGHT: f32 = 0.5;

/// Reads every page of an open document.
pub fn read_pages(doc: &mut PdfDocument) -> Result<Vec<LayoutPage>, PdfError> {
    let count = doc.page_count()?;
    (0..count).map(|index| read_page(doc, index)).collect()
}

fn read_page(doc: &mut PdfDocument, index: usize) -> Result<LayoutPage, PdfError> {
    let spans = doc.extract_spans(index)?;
    let paths = doc.extract_paths(index)?;

    let page_top = spans
        .iter()
        .map(|span| &span.bbox)
        .chain(paths.iter().map(|path| &path.bbox))
        .map(|bbox| bbox.y + bbox.height)
        .fold(0.0_f32, f32::max);
    let flip = Flip(page_top);

    let fragments: Vec<Fragment> = spans
        .iter()
        .filter(|span| !span.text.trim().is_empty())
        .map(|span| flip.fragment(&span.text, &span.bbox))
        .collect();
    let rules: Vec<Rule> = paths
        .iter()
        .filter(|path| path.has_stroke() || path.has_fill())
        .flat_map(|path| flip.rules(&path.operations))
        .collect();

    log::trace!(
        "Page {}: {} text spans, {} rules",
        index + 1,
        fragments.len(),
        rules.len()
    );

    Ok(ruled::layout_page(&fragments, &rules))
}

/// Converts PDF coordinates to top-down ones below `self.0`.
#[derive(Debug, Clone, Copy)]
struct Flip(f32);

impl Flip {
    fn y(self, y: f32) -> f64 {
        f64::from(self.0 - y)
    }

    fn fragment(self, text: &str, bbox: &Rect) -> Fragment {
        Fragment {
            text: text.to_owned(),
            x0: f64::from(bbox.x),
            x1: f64::from(bbox.x + bbox.width),
            top: self.y(bbox.y + bbox.height),
            bottom: self.y(bbox.y),
        }
    }

    fn rules(self, operations: &[PathOperation]) -> Vec<Rule> {
        let mut rules = Vec::new();
        let mut current: Option<(f32, f32)> = None;
        let mut start: Option<(f32, f32)> = None;

        for op in operations {
            match *op {
                PathOperation::MoveTo(x, y) => {
                    current = Some((x, y));
                    start = current;
                }
                PathOperation::LineTo(x, y) => {
                    if let Some(from) = current {
                        rules.extend(self.segment(from, (x, y)));
                    }
                    current = Some((x, y));
                }
                PathOperation::CurveTo(.., x, y) => current = Some((x, y)),
                PathOperation::Rectangle(x, y, width, height) => {
                    rules.extend(self.rectangle(x, y, width, height));
                    current = Some((x, y));
                    start = current;
                }
                PathOperation::ClosePath => {
                    if let (Some(from), Some(to)) = (current, start) {
                        rules.extend(self.segment(from, to));
                    }
                    current = start;
                }
            }
        }
        rules
    }

    fn segment(self, (x0, y0): (f32, f32), (x1, y1): (f32, f32)) -> Option<Rule> {
        let (dx, dy) = ((x1 - x0).abs(), (y1 - y0).abs());
        if dx <= STRAIGHT && dy <= STRAIGHT {
            None
        } else if dy <= STRAIGHT {
            Some(Rule::horizontal(self.y(y0), f64::from(x0), f64::from(x1)))
        } else if dx <= STRAIGHT {
            Some(Rule::vertical(f64::from(x0), self.y(y0), self.y(y1)))
        } else {
            None
        }
    }

    fn rectangle(self, x: f32, y: f32, width: f32, height: f32) -> Vec<Rule> {
        let (left, right) = (x.min(x + width), x.max(x + width));
        let (low, high) = (y.min(y + height), y.max(y + height));
        let (x0, x1) = (f64::from(left), f64::from(right));
        let (top, bottom) = (self.y(high), self.y(low));

        if high - low <= THIN {
            vec![Rule::horizontal((top + bottom) / 2.0, x0, x1)]
        } else if right - left <= THIN {
            vec![Rule::vertical((x0 + x1) / 2.0, top, bottom)]
        } else {
            vec![
                Rule::horizontal(top, x0, x1),
                Rule::horizontal(bottom, x0, x1),
                Rule::vertical(x0, top, bottom),
                Rule::vertical(x1, top, bottom),
            ]
        }
    }
}
