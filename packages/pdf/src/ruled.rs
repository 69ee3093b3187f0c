//! Ruled table detection.
//!
//! The dictionary draws its tables with ruling lines. Rules are snapped
//! and joined, their crossings become grid points, and every smallest
//! rectangle whose four sides are ruled becomes a cell. Cells sharing a
//! corner make up one table. Text belongs to the cell containing the
//! centre of its fragment, one line of cell text per line of fragments.
//!
//! All positions are in points, with `top` growing downwards.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::{Cell, LayoutPage, Table, TextLine};

/// Rules closer than this are merged, and crossings this close count.
const TOLERANCE: f64 = 3.0;

/// Fragments whose vertical centres are this close share a line.
const LINE_TOLERANCE: f64 = 3.0;

/// Fragments further apart than this are separated by a space.
const WORD_GAP: f64 = 1.0;

/// A run of text and its bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub text: String,
    pub x0: f64,
    pub x1: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Fragment {
    fn middle(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }

    fn centre(&self) -> f64 {
        (self.x0 + self.x1) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// A ruling line. `at` is the y of a horizontal rule or the x of a
/// vertical one, and `from..=to` its extent along the other axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub axis: Axis,
    pub at: f64,
    pub from: f64,
    pub to: f64,
}

impl Rule {
    #[must_use]
    pub fn horizontal(y: f64, x0: f64, x1: f64) -> Self {
        Self {
            axis: Axis::Horizontal,
            at: y,
            from: x0.min(x1),
            to: x0.max(x1),
        }
    }

    #[must_use]
    pub fn vertical(x: f64, top: f64, bottom: f64) -> Self {
        Self {
            axis: Axis::Vertical,
            at: x,
            from: top.min(bottom),
            to: top.max(bottom),
        }
    }

    fn covers(&self, at: f64, from: f64, to: f64) -> bool {
        (self.at - at).abs() <= TOLERANCE
            && self.from <= from + TOLERANCE
            && self.to >= to - TOLERANCE
    }
}

/// Builds a page from its text fragments and ruling lines.
#[must_use]
pub fn layout_page(fragments: &[Fragment], rules: &[Rule]) -> LayoutPage {
    let grid = Grid::new(rules);

    let mut tables: Vec<Table> = group_tables(grid.cells())
        .iter()
        .map(|cells| grid.table(cells, fragments))
        .collect();
    tables.sort_by(|a, b| a.top.total_cmp(&b.top));

    LayoutPage {
        lines: text_lines(fragments.iter()),
        tables,
    }
}

/// Snaps rules of one axis that lie within [`TOLERANCE`] of each other to
/// their mean position, then joins the ones that touch.
#[allow(clippy::cast_precision_loss)]
fn merge_rules(rules: &[Rule], axis: Axis) -> Vec<Rule> {
    let mut rules: Vec<Rule> = rules.iter().filter(|r| r.axis == axis).copied().collect();
    rules.sort_by(|a, b| a.at.total_cmp(&b.at));

    let mut clusters: Vec<Vec<Rule>> = Vec::new();
    for rule in rules {
        match clusters.last_mut() {
            Some(cluster) if rule.at - cluster[0].at <= TOLERANCE => cluster.push(rule),
            _ => clusters.push(vec![rule]),
        }
    }

    let mut merged = Vec::new();
    for mut cluster in clusters {
        let at = cluster.iter().map(|r| r.at).sum::<f64>() / cluster.len() as f64;
        cluster.sort_by(|a, b| a.from.total_cmp(&b.from));

        let mut open: Option<Rule> = None;
        for rule in cluster {
            match &mut open {
                Some(current) if rule.from <= current.to + TOLERANCE => {
                    current.to = current.to.max(rule.to);
                }
                _ => {
                    let next = Rule {
                        axis,
                        at,
                        from: rule.from,
                        to: rule.to,
                    };
                    merged.extend(open.replace(next));
                }
            }
        }
        merged.extend(open);
    }
    merged
}

/// A cell as indices into the grid's rule positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GridCell {
    left: usize,
    top: usize,
    right: usize,
    bottom: usize,
}

impl GridCell {
    const fn corners(self) -> [(usize, usize); 4] {
        [
            (self.left, self.top),
            (self.right, self.top),
            (self.left, self.bottom),
            (self.right, self.bottom),
        ]
    }
}

#[derive(Debug)]
struct Grid {
    horizontals: Vec<Rule>,
    verticals: Vec<Rule>,
    /// Distinct x positions of vertical rules, ascending.
    xs: Vec<f64>,
    /// Distinct y positions of horizontal rules, ascending.
    ys: Vec<f64>,
}

impl Grid {
    fn new(rules: &[Rule]) -> Self {
        fn positions(rules: &[Rule]) -> Vec<f64> {
            let mut at: Vec<f64> = rules.iter().map(|r| r.at).collect();
            at.dedup();
            at
        }

        let horizontals = merge_rules(rules, Axis::Horizontal);
        let verticals = merge_rules(rules, Axis::Vertical);

        Self {
            xs: positions(&verticals),
            ys: positions(&horizontals),
            horizontals,
            verticals,
        }
    }

    fn ruled(&self, axis: Axis, at: f64, from: f64, to: f64) -> bool {
        let rules = match axis {
            Axis::Horizontal => &self.horizontals,
            Axis::Vertical => &self.verticals,
        };
        rules.iter().any(|r| r.covers(at, from, to))
    }

    fn crossing(&self, xi: usize, yi: usize) -> bool {
        let (x, y) = (self.xs[xi], self.ys[yi]);
        self.ruled(Axis::Horizontal, y, x, x) && self.ruled(Axis::Vertical, x, y, y)
    }

    fn cells(&self) -> Vec<GridCell> {
        let mut cells = Vec::new();
        for top in 0..self.ys.len() {
            for left in 0..self.xs.len() {
                if self.crossing(left, top) {
                    cells.extend(self.cell_at(left, top));
                }
            }
        }
        cells
    }

    /// The smallest fully ruled cell with its top-left corner at the
    /// given crossing.
    fn cell_at(&self, left: usize, top: usize) -> Option<GridCell> {
        let (x0, y0) = (self.xs[left], self.ys[top]);

        for bottom in top + 1..self.ys.len() {
            let y1 = self.ys[bottom];
            if !self.crossing(left, bottom) || !self.ruled(Axis::Vertical, x0, y0, y1) {
                continue;
            }
            for right in left + 1..self.xs.len() {
                let x1 = self.xs[right];
                if !self.crossing(right, top) || !self.ruled(Axis::Horizontal, y0, x0, x1) {
                    continue;
                }
                if self.crossing(right, bottom)
                    && self.ruled(Axis::Horizontal, y1, x0, x1)
                    && self.ruled(Axis::Vertical, x1, y0, y1)
                {
                    return Some(GridCell {
                        left,
                        top,
                        right,
                        bottom,
                    });
                }
            }
        }
        None
    }

    /// Lays cells out as rows and columns. A position no cell starts at
    /// (inside a merged cell) is `None`.
    fn table(&self, cells: &[GridCell], fragments: &[Fragment]) -> Table {
        let mut tops: Vec<usize> = cells.iter().map(|c| c.top).collect();
        tops.sort_unstable();
        tops.dedup();
        let mut lefts: Vec<usize> = cells.iter().map(|c| c.left).collect();
        lefts.sort_unstable();
        lefts.dedup();

        let rows = tops
            .iter()
            .map(|&top| {
                lefts
                    .iter()
                    .map(|&left| {
                        cells
                            .iter()
                            .find(|c| c.top == top && c.left == left)
                            .and_then(|c| self.cell_text(*c, fragments))
                    })
                    .collect()
            })
            .collect();

        let top = tops.first().map_or(0.0, |&yi| self.ys[yi]);
        Table::new(top, rows)
    }

    fn cell_text(&self, cell: GridCell, fragments: &[Fragment]) -> Cell {
        let (x0, x1) = (self.xs[cell.left], self.xs[cell.right]);
        let (y0, y1) = (self.ys[cell.top], self.ys[cell.bottom]);

        let inside = fragments.iter().filter(|f| {
            (x0..x1).contains(&f.centre()) && (y0..y1).contains(&f.middle())
        });
        let text = text_lines(inside)
            .into_iter()
            .map(|line| line.text)
            .collect::<Vec<_>>()
            .join("\n");

        (!text.is_empty()).then_some(text)
    }
}

/// Groups cells that share a corner. Groups of a single cell are not
/// tables.
fn group_tables(cells: Vec<GridCell>) -> Vec<Vec<GridCell>> {
    fn root(parent: &mut [usize], mut idx: usize) -> usize {
        while parent[idx] != idx {
            parent[idx] = parent[parent[idx]];
            idx = parent[idx];
        }
        idx
    }

    let mut parent: Vec<usize> = (0..cells.len()).collect();
    let mut corner_owner: HashMap<(usize, usize), usize> = HashMap::new();
    for (idx, cell) in cells.iter().enumerate() {
        for corner in cell.corners() {
            match corner_owner.entry(corner) {
                Entry::Occupied(owner) => {
                    let (a, b) = (root(&mut parent, *owner.get()), root(&mut parent, idx));
                    parent[b] = a;
                }
                Entry::Vacant(slot) => {
                    slot.insert(idx);
                }
            }
        }
    }

    let mut group_of_root: HashMap<usize, usize> = HashMap::new();
    let mut groups: Vec<Vec<GridCell>> = Vec::new();
    for (idx, cell) in cells.into_iter().enumerate() {
        let group = *group_of_root
            .entry(root(&mut parent, idx))
            .or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
        groups[group].push(cell);
    }

    groups.retain(|group| group.len() > 1);
    groups
}

/// Clusters fragments into lines, top to bottom, each read left to right.
fn text_lines<'a>(fragments: impl Iterator<Item = &'a Fragment>) -> Vec<TextLine> {
    let mut sorted: Vec<&Fragment> = fragments.collect();
    sorted.sort_by(|a, b| a.middle().total_cmp(&b.middle()));

    let mut lines: Vec<Vec<&Fragment>> = Vec::new();
    for fragment in sorted {
        match lines.last_mut() {
            Some(line) if (fragment.middle() - line[0].middle()).abs() <= LINE_TOLERANCE => {
                line.push(fragment);
            }
            _ => lines.push(vec![fragment]),
        }
    }

    lines
        .into_iter()
        .filter_map(|mut line| {
            line.sort_by(|a, b| a.x0.total_cmp(&b.x0));

            let mut text = String::new();
            let mut previous_end: Option<f64> = None;
            for fragment in &line {
                let spaced = text.ends_with(char::is_whitespace)
                    || fragment.text.starts_with(char::is_whitespace);
                if !spaced && previous_end.is_some_and(|end| fragment.x0 - end > WORD_GAP) {
                    text.push(' ');
                }
                text.push_str(&fragment.text);
                previous_end = Some(fragment.x1);
            }

            let text = text.trim();
            let top = line.iter().map(|f| f.top).fold(f64::INFINITY, f64::min);
            (!text.is_empty()).then(|| TextLine {
                text: text.to_owned(),
                top,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(text: &str, x0: f64, top: f64) -> Fragment {
        let width = 5.0 * text.chars().count() as f64;
        Fragment {
            text: text.to_owned(),
            x0,
            x1: x0 + width,
            top,
            bottom: top + 10.0,
        }
    }

    /// Rules for a grid with the given column and row boundaries.
    fn grid(xs: &[f64], ys: &[f64]) -> Vec<Rule> {
        let (left, right) = (xs[0], xs[xs.len() - 1]);
        let (top, bottom) = (ys[0], ys[ys.len() - 1]);
        ys.iter()
            .map(|&y| Rule::horizontal(y, left, right))
            .chain(xs.iter().map(|&x| Rule::vertical(x, top, bottom)))
            .collect()
    }

    #[test]
    fn wrapped_cell_text_keeps_its_lines() {
        let rules = grid(&[50.0, 150.0, 220.0, 500.0], &[100.0, 120.0, 160.0]);
        let fragments = vec![
            fragment("Parameter 2", 55.0, 105.0),
            fragment("Mandatory", 155.0, 105.0),
            fragment("Description", 225.0, 105.0),
            fragment("K12", 55.0, 125.0),
            fragment("Y", 155.0, 125.0),
            fragment("Tai Po Market - Eightland", 225.0, 125.0),
            fragment("大埔墟 - 八號花園", 240.0, 142.0),
        ];

        let page = layout_page(&fragments, &rules);

        assert_eq!(page.tables.len(), 1);
        let table = &page.tables[0];
        assert_eq!(table.top, 100.0);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.cell(0, 0), Some("Parameter 2"));
        assert_eq!(table.cell(1, 0), Some("K12"));
        assert_eq!(
            table.cell(1, 2),
            Some("Tai Po Market - Eightland\n大埔墟 - 八號花園")
        );
    }

    #[test]
    fn wrapped_header_labels_stay_in_their_column() {
        let rules = grid(&[0.0, 60.0, 120.0, 180.0], &[200.0, 230.0, 250.0]);
        let fragments = vec![
            fragment("Station ID", 5.0, 205.0),
            fragment("Name", 65.0, 203.0),
            fragment("(Chi)", 65.0, 216.0),
            fragment("Name", 125.0, 203.0),
            fragment("(Eng)", 125.0, 216.0),
            fragment("U010", 5.0, 235.0),
            fragment("屯門站", 65.0, 235.0),
            fragment("Tuen Mun", 125.0, 235.0),
        ];

        let page = layout_page(&fragments, &rules);
        let table = &page.tables[0];

        assert_eq!(table.cell(0, 1), Some("Name\n(Chi)"));
        assert_eq!(table.cell(0, 2), Some("Name\n(Eng)"));
        assert_eq!(table.cell(1, 1), Some("屯門站"));
    }

    #[test]
    fn empty_cells_are_none() {
        let rules = grid(&[0.0, 50.0, 100.0], &[0.0, 20.0, 40.0]);
        let fragments = vec![fragment("A", 5.0, 5.0), fragment("D", 55.0, 25.0)];

        let table = &layout_page(&fragments, &rules).tables[0];

        assert_eq!(table.rows, vec![vec![Some("A".to_owned()), None], vec![None, Some("D".to_owned())]]);
    }

    #[test]
    fn merged_cells_leave_gaps_in_their_row() {
        // The middle vertical only runs through the second row.
        let mut rules = vec![
            Rule::horizontal(0.0, 0.0, 100.0),
            Rule::horizontal(20.0, 0.0, 100.0),
            Rule::horizontal(40.0, 0.0, 100.0),
            Rule::vertical(0.0, 0.0, 40.0),
            Rule::vertical(100.0, 0.0, 40.0),
        ];
        rules.push(Rule::vertical(50.0, 20.0, 40.0));
        let fragments = vec![
            fragment("Route 506", 30.0, 5.0),
            fragment("a", 5.0, 25.0),
            fragment("b", 55.0, 25.0),
        ];

        let table = &layout_page(&fragments, &rules).tables[0];

        assert_eq!(table.rows[0], vec![Some("Route 506".to_owned()), None]);
        assert_eq!(table.rows[1], vec![Some("a".to_owned()), Some("b".to_owned())]);
    }

    #[test]
    fn nearly_aligned_and_broken_rules_are_joined() {
        let rules = vec![
            Rule::horizontal(0.0, 0.0, 48.0),
            Rule::horizontal(0.8, 49.0, 100.0),
            Rule::horizontal(20.0, 0.0, 100.0),
            Rule::vertical(0.0, 0.0, 20.0),
            Rule::vertical(50.5, 0.0, 20.0),
            Rule::vertical(100.0, 0.0, 20.0),
        ];
        let fragments = vec![fragment("x", 5.0, 5.0), fragment("y", 60.0, 5.0)];

        let table = &layout_page(&fragments, &rules).tables[0];

        assert_eq!(table.rows, vec![vec![Some("x".to_owned()), Some("y".to_owned())]]);
        assert!((table.top - 0.4).abs() < 1e-9);
    }

    #[test]
    fn separate_grids_are_separate_tables_in_page_order() {
        let mut rules = grid(&[0.0, 50.0, 100.0], &[300.0, 320.0]);
        rules.extend(grid(&[0.0, 50.0, 100.0], &[100.0, 120.0]));
        let fragments = vec![fragment("lower", 5.0, 305.0), fragment("upper", 5.0, 105.0)];

        let page = layout_page(&fragments, &rules);

        assert_eq!(page.tables.len(), 2);
        assert_eq!(page.tables[0].cell(0, 0), Some("upper"));
        assert_eq!(page.tables[1].cell(0, 0), Some("lower"));
    }

    #[test]
    fn lone_boxes_are_not_tables() {
        let rules = grid(&[0.0, 200.0], &[0.0, 30.0]);
        assert!(layout_page(&[fragment("Note", 5.0, 5.0)], &rules).tables.is_empty());
    }

    #[test]
    fn page_lines_join_fragments_left_to_right() {
        let fragments = vec![
            fragment("(Inbound)", 80.0, 51.0),
            fragment("Route", 0.0, 50.0),
            fragment("506", 40.0, 50.0),
            fragment("Next line", 0.0, 80.0),
        ];

        let page = layout_page(&fragments, &[]);

        assert_eq!(page.lines.len(), 2);
        assert_eq!(page.lines[0].text, "Route 506 (Inbound)");
        assert_eq!(page.lines[0].top, 50.0);
        assert_eq!(page.lines[1].text, "Next line");
    }

    #[test]
    fn touching_fragments_are_not_spaced() {
        let fragments = vec![fragment("屯門", 0.0, 0.0), fragment("站", 10.0, 0.0)];
        assert_eq!(layout_page(&fragments, &[]).lines[0].text, "屯門站");
    }
}
