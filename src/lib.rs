//! # unsheet
//!
//! Read-only access to the cells of Excel workbooks in the Office Open XML
//! (`.xlsx`) format.
//!
//! Opening a file reads the workbook index and the shared string table.
//! Worksheets are decoded lazily, one streaming pass each, into a sparse
//! map of rows and cells. Formulas are not evaluated; a formula cell shows
//! the result the spreadsheet application last cached in the file.
//!
//! ## Quick Start
//!
//! ```no_run
//! let book = unsheet::open("report.xlsx")?;
//! println!("Worksheets: {}", book.num_worksheets());
//!
//! let sheet = book.get_worksheet(0)?;
//! let bbox = sheet.dimension();
//! for row in bbox.min_row..=bbox.max_row {
//!     for column in bbox.min_column..=bbox.max_column {
//!         print!("{}\t", sheet.cell(column, row));
//!     }
//!     println!();
//! }
//! # Ok::<(), unsheet::Error>(())
//! ```
//!
//! ## Coordinates
//!
//! Cell accessors always take `(column, row)`, both 1-based, so `cell(1, 1)`
//! is `A1` and `cell(2, 5)` is `B5`. A coordinate with no stored cell reads
//! as an empty string.

pub mod error;
pub mod json;
pub mod options;
pub mod package;
pub mod reference;
pub mod shared_strings;
pub mod spreadsheet;
pub mod workbook;
pub mod worksheet;

mod xml;

#[cfg(test)]
mod testutil;

// Re-exports
pub use error::{Error, ErrorKind, Result};
pub use json::{to_json, JsonFormat};
pub use options::OpenOptions;
pub use reference::{column_index, column_name, BoundingBox, CellRef};
pub use shared_strings::SharedStrings;
pub use spreadsheet::Spreadsheet;
pub use workbook::{SheetDescriptor, SheetState};
pub use worksheet::{Cell, CellType, Row, Worksheet};

use std::path::Path;

/// Open a spreadsheet file with default options.
///
/// # Example
///
/// ```no_run
/// let book = unsheet::open("data.xlsx")?;
/// let sheet = book.get_worksheet(0)?;
/// println!("{}", sheet.cell(1, 2));
/// # Ok::<(), unsheet::Error>(())
/// ```
pub fn open(path: impl AsRef<Path>) -> Result<Spreadsheet> {
    Spreadsheet::open(path)
}

/// Open a spreadsheet file with explicit options.
pub fn open_with_options(path: impl AsRef<Path>, options: &OpenOptions) -> Result<Spreadsheet> {
    Spreadsheet::open_with_options(path, options)
}
