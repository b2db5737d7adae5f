//! Worksheet model and the streaming worksheet decoder.
//!
//! A decoded [`Worksheet`] is sparse: only cells that appear in the part are
//! stored, and a lookup of any other coordinate yields a blank value.
//! Cell coordinates are always passed as `(column, row)`, both 1-based.

use crate::error::{Error, Result};
use crate::reference::{BoundingBox, CellRef};
use crate::shared_strings::SharedStrings;
use crate::xml;
use quick_xml::events::{BytesStart, Event};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a cell's value was stored in the worksheet part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellType {
    /// No (or an unrecognized) `t` attribute; the value is kept verbatim.
    #[default]
    Literal,
    /// `t="s"`: the value indexes the shared string table.
    SharedString,
    /// `t="n"`: an explicit number.
    Numeric,
    /// `t="b"`: `0` or `1`.
    Boolean,
    /// `t="e"`: an error code such as `#DIV/0!`.
    Error,
    /// `t="str"`: the cached string result of a formula.
    FormulaString,
    /// `t="inlineStr"`: text stored in the cell's `<is>` element.
    InlineString,
    /// `t="d"`: an ISO 8601 date.
    Date,
}

impl CellType {
    /// Map a `t` attribute value to a cell type.
    pub fn from_attribute(value: &str) -> Self {
        match value {
            "" => CellType::Literal,
            "s" => CellType::SharedString,
            "n" => CellType::Numeric,
            "b" => CellType::Boolean,
            "e" => CellType::Error,
            "str" => CellType::FormulaString,
            "inlineStr" => CellType::InlineString,
            "d" => CellType::Date,
            other => {
                log::warn!("unknown cell type {:?}, keeping value verbatim", other);
                CellType::Literal
            }
        }
    }
}

/// A single cell value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Normalized text value
    pub value: String,
    #[serde(rename = "type")]
    pub cell_type: CellType,
}

/// A row of cells keyed by 1-based column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub number: u32,
    pub cells: BTreeMap<u32, Cell>,
}

impl Row {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            cells: BTreeMap::new(),
        }
    }

    /// Cell at `column`, if present.
    pub fn cell(&self, column: u32) -> Option<&Cell> {
        self.cells.get(&column)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A decoded worksheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worksheet {
    name: String,
    dimension: BoundingBox,
    rows: BTreeMap<u32, Row>,
}

impl Worksheet {
    /// Create an empty worksheet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sheet name as shown on its tab.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text of the cell at `(column, row)`, or `""` when no such cell exists.
    ///
    /// ```no_run
    /// let book = unsheet::open("book.xlsx")?;
    /// let sheet = book.get_worksheet(0)?;
    /// println!("B2 = {}", sheet.cell(2, 2));
    /// # Ok::<(), unsheet::Error>(())
    /// ```
    pub fn cell(&self, column: u32, row: u32) -> &str {
        self.get_cell(column, row)
            .map(|cell| cell.value.as_str())
            .unwrap_or("")
    }

    /// The cell at `(column, row)`, if the part stored one.
    pub fn get_cell(&self, column: u32, row: u32) -> Option<&Cell> {
        self.rows.get(&row)?.cell(column)
    }

    /// Text of the cell at an A1 reference such as `"B2"`.
    pub fn cell_at(&self, reference: &str) -> Result<&str> {
        let cell = CellRef::parse(reference)?;
        Ok(self.cell(cell.column, cell.row))
    }

    /// Row `number`, if the part stored one.
    pub fn row(&self, number: u32) -> Option<&Row> {
        self.rows.get(&number)
    }

    /// Stored rows in ascending order.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.values()
    }

    /// Number of stored rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of stored cells across all rows.
    pub fn cell_count(&self) -> usize {
        self.rows.values().map(|row| row.cells.len()).sum()
    }

    /// Declared bounding box; all zero when the part has no `<dimension>`.
    pub fn dimension(&self) -> BoundingBox {
        self.dimension
    }

    pub fn min_row(&self) -> u32 {
        self.dimension.min_row
    }

    pub fn max_row(&self) -> u32 {
        self.dimension.max_row
    }

    pub fn min_column(&self) -> u32 {
        self.dimension.min_column
    }

    pub fn max_column(&self) -> u32 {
        self.dimension.max_column
    }
}

/// Decodes worksheet parts against a shared string table.
///
/// The table is only borrowed for the decode; the resulting [`Worksheet`]
/// stores resolved text and keeps no reference back to it.
#[derive(Debug, Clone, Copy)]
pub struct WorksheetDecoder<'a> {
    strings: &'a SharedStrings,
}

impl<'a> WorksheetDecoder<'a> {
    pub fn new(strings: &'a SharedStrings) -> Self {
        Self { strings }
    }

    /// Decode a worksheet part in one forward pass.
    ///
    /// Any malformed markup, undecodable reference or dangling shared-string
    /// index fails the whole decode; no partial worksheet is returned.
    pub fn decode(&self, name: &str, xml_text: &str) -> Result<Worksheet> {
        let mut reader = quick_xml::Reader::from_str(xml_text);
        reader.config_mut().trim_text(false);

        let mut scan = SheetScan::new(Worksheet::new(name));
        let mut buf = Vec::new();
        let mut depth = 0usize;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    depth += 1;
                    scan.start(&e)?;
                }
                Event::Empty(e) => {
                    scan.start(&e)?;
                    scan.end(e.local_name().as_ref(), self.strings)?;
                }
                Event::End(e) => {
                    depth = depth.saturating_sub(1);
                    scan.end(e.local_name().as_ref(), self.strings)?;
                }
                Event::Text(e) => {
                    if scan.capturing() {
                        scan.push_text(&e.unescape()?);
                    }
                }
                Event::CData(e) => {
                    if scan.capturing() {
                        scan.push_text(&String::from_utf8_lossy(&e));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        xml::ensure_closed(depth, "worksheet")?;

        let sheet = scan.sheet;
        log::debug!(
            "decoded worksheet {:?}: {} rows, {} cells",
            sheet.name,
            sheet.row_count(),
            sheet.cell_count()
        );
        Ok(sheet)
    }
}

/// Cell whose start tag has been seen but not its end tag.
#[derive(Debug)]
struct PendingCell {
    reference: CellRef,
    cell_type: CellType,
    text: String,
}

/// Mutable state of one decode pass.
struct SheetScan {
    sheet: Worksheet,
    row: Option<u32>,
    last_row: u32,
    last_column: u32,
    cell: Option<PendingCell>,
    in_value: bool,
    in_inline: bool,
    in_phonetic: bool,
    in_inline_text: bool,
}

impl SheetScan {
    fn new(sheet: Worksheet) -> Self {
        Self {
            sheet,
            row: None,
            last_row: 0,
            last_column: 0,
            cell: None,
            in_value: false,
            in_inline: false,
            in_phonetic: false,
            in_inline_text: false,
        }
    }

    fn capturing(&self) -> bool {
        self.cell.is_some() && (self.in_value || self.in_inline_text)
    }

    fn push_text(&mut self, text: &str) {
        if let Some(cell) = self.cell.as_mut() {
            cell.text.push_str(text);
        }
    }

    fn start(&mut self, e: &BytesStart<'_>) -> Result<()> {
        match e.local_name().as_ref() {
            b"dimension" => {
                if let Some(range) = xml::find_attr(e, b"ref")? {
                    self.sheet.dimension = BoundingBox::parse(&range)?;
                }
            }
            b"row" => self.start_row(e)?,
            b"c" if self.row.is_some() => self.start_cell(e)?,
            b"v" if self.cell.is_some() => self.in_value = true,
            b"is" if self.cell.is_some() => self.in_inline = true,
            b"rPh" if self.in_inline => self.in_phonetic = true,
            b"t" if self.in_inline && !self.in_phonetic => self.in_inline_text = true,
            _ => {}
        }
        Ok(())
    }

    fn start_row(&mut self, e: &BytesStart<'_>) -> Result<()> {
        let number = match xml::find_attr(e, b"r")? {
            Some(r) => match r.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err(Error::InvalidData(format!("invalid row number {:?}", r))),
            },
            None => self.last_row.checked_add(1).ok_or_else(|| {
                Error::InvalidData("row number out of range".to_string())
            })?,
        };

        self.sheet
            .rows
            .entry(number)
            .or_insert_with(|| Row::new(number));
        self.row = Some(number);
        self.last_row = number;
        self.last_column = 0;
        Ok(())
    }

    fn start_cell(&mut self, e: &BytesStart<'_>) -> Result<()> {
        let row = self.row.unwrap_or(self.last_row);
        let mut reference = None;
        let mut cell_type = CellType::Literal;

        for attr in e.attributes() {
            let attr = attr?;
            match attr.key.as_ref() {
                b"r" => reference = Some(CellRef::parse(&xml::attr_value(&attr)?)?),
                b"t" => cell_type = CellType::from_attribute(&xml::attr_value(&attr)?),
                _ => {}
            }
        }

        // Only the column is taken from the reference; the enclosing row wins.
        let column = match reference {
            Some(cell) => cell.column,
            None => self.last_column.checked_add(1).ok_or_else(|| {
                Error::InvalidData("column number out of range".to_string())
            })?,
        };

        self.last_column = column;
        self.cell = Some(PendingCell {
            reference: CellRef::new(column, row),
            cell_type,
            text: String::new(),
        });
        Ok(())
    }

    fn end(&mut self, name: &[u8], strings: &SharedStrings) -> Result<()> {
        match name {
            b"row" => self.row = None,
            b"c" => {
                if let Some(pending) = self.cell.take() {
                    let reference = pending.reference;
                    let cell = resolve_cell(pending, strings)?;
                    if let Some(row) = self.sheet.rows.get_mut(&reference.row) {
                        row.cells.insert(reference.column, cell);
                    }
                }
                self.in_value = false;
                self.in_inline = false;
                self.in_phonetic = false;
                self.in_inline_text = false;
            }
            b"v" => self.in_value = false,
            b"is" => self.in_inline = false,
            b"rPh" => self.in_phonetic = false,
            b"t" => self.in_inline_text = false,
            _ => {}
        }
        Ok(())
    }
}

/// Turn the accumulated text of a cell into its stored value.
fn resolve_cell(pending: PendingCell, strings: &SharedStrings) -> Result<Cell> {
    let PendingCell {
        reference,
        cell_type,
        text,
    } = pending;

    let value = match cell_type {
        CellType::SharedString => {
            let index = text.trim().parse::<usize>().map_err(|_| {
                Error::InvalidData(format!(
                    "cell {}: shared string index {:?} is not a number",
                    reference, text
                ))
            })?;
            strings
                .get(index)
                .ok_or(Error::SharedStringIndex {
                    index,
                    len: strings.len(),
                })?
                .to_string()
        }
        CellType::Numeric if text.ends_with(".0") => text[..text.len() - 2].to_string(),
        _ => text,
    };

    Ok(Cell { value, cell_type })
}
