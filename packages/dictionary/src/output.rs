//! JSON output and console summary.

use std::fmt;
use std::io::Write;
use std::path::Path;

use mtr_bus_dictionary_models::Route;
use serde::Serialize as _;

use crate::ExtractError;

/// Writes routes as tab-indented JSON. Non-ASCII text is written as is.
///
/// # Errors
///
/// Returns [`ExtractError::Json`] or [`ExtractError::Io`] if writing
/// fails.
pub fn write_json(routes: &[Route], mut writer: impl Write) -> Result<(), ExtractError> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    routes.serialize(&mut serializer)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Writes routes as JSON to the file at `path`, replacing it.
///
/// # Errors
///
/// Returns [`ExtractError::Io`] if the file cannot be written.
pub fn write_json_file(routes: &[Route], path: impl AsRef<Path>) -> Result<(), ExtractError> {
    let file = std::fs::File::create(path)?;
    write_json(routes, std::io::BufWriter::new(file))
}

/// Console summary of an extraction: route count, then lines and stop
/// counts per route.
pub struct Summary<'a>(pub &'a [Route]);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Extraction Summary ---")?;
        writeln!(f, "Total routes found: {}", self.0.len())?;
        for route in self.0 {
            writeln!(f)?;
            writeln!(f, "## Route: {}", route.route_number)?;
            writeln!(f, "  - Lines (directions): {}", route.lines.len())?;
            for (idx, line) in route.lines.iter().enumerate() {
                writeln!(
                    f,
                    "    - Line {} ('{}'): {} stops",
                    idx + 1,
                    line.description_en,
                    line.stops.len()
                )?;
            }
        }
        write!(f, "--------------------------")
    }
}

/// Renders the [`Summary`] of `routes`.
#[must_use]
pub fn render_summary(routes: &[Route]) -> String {
    Summary(routes).to_string()
}
