//! JSON export and import of decoded worksheets.

use crate::error::Result;
use crate::worksheet::Worksheet;

/// JSON output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonFormat {
    /// Compact single-line JSON
    Compact,
    /// Pretty-printed with 2-space indentation
    #[default]
    Pretty,
}

/// Convert a worksheet to JSON.
///
/// Rows and cells are emitted as objects keyed by their 1-based number, in
/// ascending order; blank cells do not appear.
pub fn to_json(sheet: &Worksheet, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Compact => serde_json::to_string(sheet)?,
        JsonFormat::Pretty => serde_json::to_string_pretty(sheet)?,
    };
    Ok(json)
}

/// Parse a worksheet back from JSON produced by [`to_json`].
pub fn from_json(json: &str) -> Result<Worksheet> {
    Ok(serde_json::from_str(json)?)
}
