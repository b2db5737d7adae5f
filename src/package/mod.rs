//! ZIP package access for SpreadsheetML documents.
//!
//! [`Package`] holds the archive in memory and hands out members by name,
//! either as raw bytes or as decoded XML text. Every member read checks the
//! inflated length against the size recorded in the archive, so a truncated
//! or corrupt member is reported instead of being parsed half-way.

mod encoding;
pub mod relationships;

pub use encoding::decode_xml_bytes;
pub use relationships::{rels_part_for, resolve_target, Relationship, Relationships};

use crate::error::{Error, Result};
use crate::options::DEFAULT_MAX_PART_SIZE;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

type Archive = zip::ZipArchive<Cursor<Vec<u8>>>;

/// Upper bound on the buffer reserved from a member's recorded size.
const PREALLOC_LIMIT: u64 = 1 << 20;

/// An opened OOXML package.
///
/// The archive sits behind a mutex, so a `Package` can be shared between
/// threads; concurrent member reads are serialized.
pub struct Package {
    archive: Mutex<Archive>,
    max_part_size: u64,
}

impl Package {
    /// Open a package from a file path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use unsheet::package::Package;
    ///
    /// let package = Package::open("book.xlsx")?;
    /// assert!(package.exists("xl/workbook.xml"));
    /// # Ok::<(), unsheet::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Create a package from a byte vector.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let archive = zip::ZipArchive::new(Cursor::new(data))?;
        Ok(Self {
            archive: Mutex::new(archive),
            max_part_size: DEFAULT_MAX_PART_SIZE,
        })
    }

    /// Create a package from a reader.
    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Set the largest inflated member size this package will read.
    pub fn with_max_part_size(mut self, limit: u64) -> Self {
        self.max_part_size = limit;
        self
    }

    fn archive(&self) -> MutexGuard<'_, Archive> {
        match self.archive.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Read a member as raw bytes.
    ///
    /// Fails with [`Error::MissingPart`] when no such member exists and with
    /// [`Error::SizeMismatch`] when the inflated data is shorter or longer
    /// than the size the archive records for it.
    pub fn read_part(&self, name: &str) -> Result<Vec<u8>> {
        let mut archive = self.archive();
        let file = match archive.by_name(name) {
            Ok(file) => file,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(Error::MissingPart(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let expected = file.size();
        if expected > self.max_part_size {
            return Err(Error::PartTooLarge {
                part: name.to_string(),
                size: expected,
                limit: self.max_part_size,
            });
        }

        // Read one byte past the recorded size so an understated header shows up.
        let mut data = Vec::with_capacity(expected.min(PREALLOC_LIMIT) as usize);
        file.take(expected.saturating_add(1)).read_to_end(&mut data)?;

        let actual = data.len() as u64;
        if actual != expected {
            return Err(Error::SizeMismatch {
                part: name.to_string(),
                expected,
                actual,
            });
        }
        Ok(data)
    }

    /// Read a member and decode it as XML text.
    pub fn read_xml(&self, name: &str) -> Result<String> {
        let bytes = self.read_part(name)?;
        decode_xml_bytes(&bytes)
    }

    /// Read a member as XML text if it exists.
    pub fn read_xml_if_exists(&self, name: &str) -> Result<Option<String>> {
        if self.exists(name) {
            self.read_xml(name).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Check if a member exists in the archive.
    pub fn exists(&self, name: &str) -> bool {
        self.archive().index_for_name(name).is_some()
    }

    /// List all member names in the archive.
    pub fn list_parts(&self) -> Vec<String> {
        self.archive().file_names().map(String::from).collect()
    }

    /// Read the relationships declared by `part_name`.
    ///
    /// Returns `None` when the part has no relationships member at all,
    /// which callers must distinguish from an empty relationship list.
    pub fn read_relationships(&self, part_name: &str) -> Result<Option<Relationships>> {
        match self.read_xml_if_exists(&rels_part_for(part_name))? {
            Some(xml) => Relationships::parse(&xml).map(Some),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Package")
            .field("parts", &self.archive().len())
            .field("max_part_size", &self.max_part_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::build_package;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// A single stored `xl/workbook.xml` whose headers record `recorded` bytes.
    fn stored_workbook_recording(content: &str, recorded: u32) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            let options =
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
            zip.start_file("xl/workbook.xml", options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
            zip.finish().unwrap();
        }

        // uncompressed size: local header offset 22, central directory offset 24
        let size = recorded.to_le_bytes();
        buffer[22..26].copy_from_slice(&size);
        let central = buffer
            .windows(4)
            .position(|w| w == b"PK\x01\x02")
            .unwrap();
        buffer[central + 24..central + 28].copy_from_slice(&size);
        buffer
    }

    fn sample() -> Package {
        Package::from_bytes(build_package(&[
            ("xl/workbook.xml", "<workbook/>"),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<Relationships><Relationship Id="rId1" Type="x/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#,
            ),
            ("xl/worksheets/sheet1.xml", "<worksheet/>"),
        ]))
        .unwrap()
    }

    #[test]
    fn test_read_part() {
        let package = sample();
        assert!(package.exists("xl/workbook.xml"));
        assert!(!package.exists("xl/sharedStrings.xml"));
        assert_eq!(package.read_part("xl/workbook.xml").unwrap(), b"<workbook/>");
        assert_eq!(package.read_xml("xl/worksheets/sheet1.xml").unwrap(), "<worksheet/>");
        assert_eq!(package.list_parts().len(), 3);
    }

    #[test]
    fn test_missing_part() {
        let package = sample();
        let err = package.read_part("xl/sharedStrings.xml").unwrap_err();
        assert!(matches!(err, Error::MissingPart(ref p) if p == "xl/sharedStrings.xml"));
        assert_eq!(err.kind(), crate::ErrorKind::Io);
        assert!(package
            .read_xml_if_exists("xl/sharedStrings.xml")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_part_size_limit() {
        let package = sample().with_max_part_size(4);
        let err = package.read_part("xl/workbook.xml").unwrap_err();
        assert!(matches!(
            err,
            Error::PartTooLarge {
                size: 11,
                limit: 4,
                ..
            }
        ));
    }

    #[test]
    fn test_understated_size() {
        let content = "<workbook><sheets/></workbook>";
        let package = Package::from_bytes(stored_workbook_recording(content, 5)).unwrap();
        let err = package.read_part("xl/workbook.xml").unwrap_err();
        assert!(matches!(
            err,
            Error::SizeMismatch {
                expected: 5,
                actual: 6,
                ..
            }
        ));
        assert_eq!(err.kind(), crate::ErrorKind::Io);
    }

    #[test]
    fn test_overstated_size() {
        let content = "<workbook><sheets/></workbook>";
        let package = Package::from_bytes(stored_workbook_recording(content, 100)).unwrap();
        let err = package.read_part("xl/workbook.xml").unwrap_err();
        match err {
            Error::SizeMismatch {
                ref part,
                expected,
                actual,
            } => {
                assert_eq!(part, "xl/workbook.xml");
                assert_eq!(expected, 100);
                assert_eq!(actual, content.len() as u64);
            }
            ref other => panic!("expected SizeMismatch, got {:?}", other),
        }
        assert_eq!(err.kind(), crate::ErrorKind::Io);
        assert!(package.read_xml("xl/workbook.xml").is_err());
    }

    #[test]
    fn test_unbounded_size_limit() {
        let package = sample().with_max_part_size(u64::MAX);
        assert_eq!(package.read_part("xl/workbook.xml").unwrap(), b"<workbook/>");
    }

    #[test]
    fn test_read_relationships() {
        let package = sample();
        let rels = package.read_relationships("xl/workbook.xml").unwrap().unwrap();
        assert_eq!(rels.get("rId1").unwrap().target, "worksheets/sheet1.xml");

        assert!(package
            .read_relationships("xl/worksheets/sheet1.xml")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_not_a_zip() {
        let err = Package::from_bytes(b"plain text, not an archive".to_vec()).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Io);
    }
}
