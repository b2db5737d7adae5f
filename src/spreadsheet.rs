//! The opened workbook and lazy worksheet access.

use crate::error::{Error, Result};
use crate::options::OpenOptions;
use crate::package::Package;
use crate::shared_strings::SharedStrings;
use crate::workbook::{SheetDescriptor, WorkbookIndex};
use crate::worksheet::{Worksheet, WorksheetDecoder};
use std::io::{Read, Seek};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

/// An opened `.xlsx` workbook.
///
/// Opening reads the workbook index and the shared string table. Worksheets
/// are decoded on first access through [`Spreadsheet::get_worksheet`] and
/// cached; each index is decoded at most once, even when the spreadsheet is
/// shared between threads.
///
/// # Example
///
/// ```no_run
/// use unsheet::Spreadsheet;
///
/// let book = Spreadsheet::open("report.xlsx")?;
/// for index in 0..book.num_worksheets() {
///     let sheet = book.get_worksheet(index)?;
///     println!("{}: {}", sheet.name(), sheet.cell(1, 1));
/// }
/// # Ok::<(), unsheet::Error>(())
/// ```
pub struct Spreadsheet {
    package: Package,
    shared_strings: SharedStrings,
    sheets: Vec<SheetDescriptor>,
    worksheets: Vec<OnceLock<Worksheet>>,
    decode_lock: Mutex<()>,
}

impl Spreadsheet {
    /// Open a spreadsheet file with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, &OpenOptions::default())
    }

    /// Open a spreadsheet file.
    pub fn open_with_options(path: impl AsRef<Path>, options: &OpenOptions) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("opening spreadsheet {}", path.display());
        let package = Package::open(path)?;
        Self::from_package(package, options)
    }

    /// Create a spreadsheet from the bytes of an `.xlsx` file.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_bytes_with_options(data, &OpenOptions::default())
    }

    /// Create a spreadsheet from bytes with explicit options.
    pub fn from_bytes_with_options(data: Vec<u8>, options: &OpenOptions) -> Result<Self> {
        Self::from_package(Package::from_bytes(data)?, options)
    }

    /// Create a spreadsheet from a reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, &OpenOptions::default())
    }

    /// Create a spreadsheet from a reader with explicit options.
    pub fn from_reader_with_options<R: Read + Seek>(
        reader: R,
        options: &OpenOptions,
    ) -> Result<Self> {
        Self::from_package(Package::from_reader(reader)?, options)
    }

    fn from_package(package: Package, options: &OpenOptions) -> Result<Self> {
        let package = package.with_max_part_size(options.max_part_size);
        let index = WorkbookIndex::load(&package, options.sheet_id_fallback)?;

        let shared_strings = match index.shared_strings_part() {
            Some(part) => match package.read_xml_if_exists(part)? {
                Some(xml) => SharedStrings::parse(&xml)?,
                None => SharedStrings::default(),
            },
            None => SharedStrings::default(),
        };

        let sheets = index.into_sheets();
        let worksheets = sheets.iter().map(|_| OnceLock::new()).collect();
        Ok(Self {
            package,
            shared_strings,
            sheets,
            worksheets,
            decode_lock: Mutex::new(()),
        })
    }

    /// Number of worksheets declared by the workbook.
    pub fn num_worksheets(&self) -> usize {
        self.sheets.len()
    }

    /// Worksheet at 0-based `index`, in workbook declaration order.
    ///
    /// The first call for an index decodes the worksheet part; later calls
    /// return the same cached worksheet. A failed decode caches nothing and
    /// leaves other worksheets usable.
    pub fn get_worksheet(&self, index: usize) -> Result<&Worksheet> {
        let (sheet, slot) = self
            .sheets
            .get(index)
            .zip(self.worksheets.get(index))
            .ok_or(Error::WorksheetIndex {
                index,
                count: self.sheets.len(),
            })?;

        if let Some(worksheet) = slot.get() {
            return Ok(worksheet);
        }

        let _guard = match self.decode_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // another caller may have finished while we waited
        if let Some(worksheet) = slot.get() {
            return Ok(worksheet);
        }

        log::debug!("decoding worksheet {:?} from {}", sheet.name, sheet.part_name);
        let xml = self.package.read_xml(&sheet.part_name)?;
        let worksheet = WorksheetDecoder::new(&self.shared_strings).decode(&sheet.name, &xml)?;
        Ok(slot.get_or_init(|| worksheet))
    }

    /// Worksheet with the given tab name.
    pub fn worksheet_by_name(&self, name: &str) -> Result<&Worksheet> {
        let index = self
            .sheet_index(name)
            .ok_or_else(|| Error::WorksheetName(name.to_string()))?;
        self.get_worksheet(index)
    }

    /// Index of the worksheet with the given tab name.
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.sheets.iter().position(|sheet| sheet.name == name)
    }

    /// Decode and yield every worksheet in order.
    pub fn worksheets(&self) -> impl Iterator<Item = Result<&Worksheet>> {
        (0..self.num_worksheets()).map(move |index| self.get_worksheet(index))
    }

    /// Sheet descriptors in declaration order.
    pub fn sheets(&self) -> &[SheetDescriptor] {
        &self.sheets
    }

    /// Sheet names in declaration order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// The workbook's shared string table.
    pub fn shared_strings(&self) -> &SharedStrings {
        &self.shared_strings
    }

    /// Whether the worksheet at `index` has already been decoded.
    pub fn is_decoded(&self, index: usize) -> bool {
        self.worksheets
            .get(index)
            .is_some_and(|slot| slot.get().is_some())
    }

    /// The underlying package.
    pub fn package(&self) -> &Package {
        &self.package
    }
}

impl std::fmt::Debug for Spreadsheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spreadsheet")
            .field("sheets", &self.sheet_names())
            .field("shared_strings", &self.shared_strings.len())
            .finish()
    }
}
