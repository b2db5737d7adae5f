//! Options for opening a spreadsheet.

/// Default ceiling for a single inflated package member (256 MiB).
pub const DEFAULT_MAX_PART_SIZE: u64 = 256 * 1024 * 1024;

/// Options controlling how a spreadsheet package is opened and resolved.
///
/// # Example
///
/// ```
/// use unsheet::OpenOptions;
///
/// let options = OpenOptions::default()
///     .with_max_part_size(64 * 1024 * 1024)
///     .with_sheet_id_fallback(false);
/// assert!(!options.sheet_id_fallback);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOptions {
    /// Largest inflated size accepted for any single package member.
    pub max_part_size: u64,

    /// When the workbook has no relationships part, locate worksheets by the
    /// `xl/worksheets/sheet{sheetId}.xml` naming convention instead of failing.
    pub sheet_id_fallback: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            max_part_size: DEFAULT_MAX_PART_SIZE,
            sheet_id_fallback: true,
        }
    }
}

impl OpenOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the member size ceiling.
    pub fn with_max_part_size(mut self, limit: u64) -> Self {
        self.max_part_size = limit;
        self
    }

    /// Enable or disable the sheet-id naming fallback.
    pub fn with_sheet_id_fallback(mut self, enabled: bool) -> Self {
        self.sheet_id_fallback = enabled;
        self
    }
}
