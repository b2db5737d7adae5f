//! Workbook part: the ordered list of sheets and where each one lives.

use crate::error::{Error, Result};
use crate::package::{resolve_target, Package, Relationships};
use crate::xml;
use quick_xml::events::{BytesStart, Event};
use serde::{Deserialize, Serialize};

/// Workbook part name used when the package does not say otherwise.
pub const DEFAULT_WORKBOOK_PART: &str = "xl/workbook.xml";

/// Shared strings part name used when the workbook does not say otherwise.
pub const DEFAULT_SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// Visibility of a sheet in the workbook UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SheetState {
    #[default]
    Visible,
    Hidden,
    VeryHidden,
}

impl SheetState {
    fn from_attribute(value: &str) -> Self {
        match value {
            "hidden" => SheetState::Hidden,
            "veryHidden" => SheetState::VeryHidden,
            _ => SheetState::Visible,
        }
    }
}

/// One `<sheet>` entry of the workbook, resolved to its worksheet part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetDescriptor {
    /// Display name shown on the sheet tab
    pub name: String,
    /// `sheetId` attribute
    pub sheet_id: String,
    /// `r:id` attribute pointing into the workbook relationships
    pub rel_id: String,
    /// Package member holding the worksheet XML
    pub part_name: String,
    pub state: SheetState,
}

/// Sheet entry as declared, before part resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SheetEntry {
    name: String,
    sheet_id: String,
    rel_id: String,
    state: SheetState,
}

/// The decoded workbook part.
#[derive(Debug, Clone)]
pub struct WorkbookIndex {
    part_name: String,
    sheets: Vec<SheetDescriptor>,
    shared_strings_part: Option<String>,
}

impl WorkbookIndex {
    /// Locate and decode the workbook part of `package`.
    ///
    /// Sheets are resolved through the workbook relationships. The
    /// `sheet{sheetId}.xml` naming convention is only consulted when the
    /// workbook has no relationships part and `sheet_id_fallback` is set.
    pub fn load(package: &Package, sheet_id_fallback: bool) -> Result<Self> {
        let part_name = locate_workbook_part(package)?;
        let xml_text = package.read_xml(&part_name)?;
        let entries = parse_sheet_entries(&xml_text)?;
        let rels = package.read_relationships(&part_name)?;

        let mut sheets = Vec::with_capacity(entries.len());
        for entry in entries {
            let part = match &rels {
                Some(rels) => resolve_by_relationship(&part_name, rels, &entry)?,
                None if sheet_id_fallback => {
                    let guess = format!("worksheets/sheet{}.xml", entry.sheet_id);
                    let part = resolve_target(&part_name, &guess);
                    log::warn!(
                        "workbook {} has no relationships part, assuming sheet {:?} lives in {}",
                        part_name,
                        entry.name,
                        part
                    );
                    part
                }
                None => {
                    return Err(Error::UnresolvedSheet {
                        sheet: entry.name,
                        reason: format!("workbook {} has no relationships part", part_name),
                    })
                }
            };

            if !package.exists(&part) {
                return Err(Error::UnresolvedSheet {
                    sheet: entry.name,
                    reason: format!("part {} is not in the package", part),
                });
            }

            sheets.push(SheetDescriptor {
                name: entry.name,
                sheet_id: entry.sheet_id,
                rel_id: entry.rel_id,
                part_name: part,
                state: entry.state,
            });
        }

        let shared_strings_part = match &rels {
            Some(rels) => rels
                .first_of_type("sharedStrings")
                .map(|rel| resolve_target(&part_name, &rel.target)),
            None => None,
        }
        .or_else(|| {
            package
                .exists(DEFAULT_SHARED_STRINGS_PART)
                .then(|| DEFAULT_SHARED_STRINGS_PART.to_string())
        });

        log::debug!("workbook {} declares {} sheets", part_name, sheets.len());
        Ok(Self {
            part_name,
            sheets,
            shared_strings_part,
        })
    }

    /// Package member the workbook was read from.
    pub fn part_name(&self) -> &str {
        &self.part_name
    }

    /// Sheets in declaration order.
    pub fn sheets(&self) -> &[SheetDescriptor] {
        &self.sheets
    }

    /// Shared strings member, if the package has one.
    pub fn shared_strings_part(&self) -> Option<&str> {
        self.shared_strings_part.as_deref()
    }

    pub(crate) fn into_sheets(self) -> Vec<SheetDescriptor> {
        self.sheets
    }
}

/// The package relationships name the main workbook part; older or
/// hand-built packages without `_rels/.rels` use the default location.
fn locate_workbook_part(package: &Package) -> Result<String> {
    let from_rels = package
        .read_relationships("")?
        .and_then(|rels| {
            rels.first_of_type("officeDocument")
                .map(|rel| resolve_target("", &rel.target))
        });
    Ok(from_rels.unwrap_or_else(|| DEFAULT_WORKBOOK_PART.to_string()))
}

fn resolve_by_relationship(
    workbook_part: &str,
    rels: &Relationships,
    entry: &SheetEntry,
) -> Result<String> {
    let rel = rels.get(&entry.rel_id).ok_or_else(|| Error::UnresolvedSheet {
        sheet: entry.name.clone(),
        reason: format!("relationship {:?} not found", entry.rel_id),
    })?;
    if rel.external {
        return Err(Error::UnresolvedSheet {
            sheet: entry.name.clone(),
            reason: format!("relationship {:?} targets an external resource", entry.rel_id),
        });
    }
    Ok(resolve_target(workbook_part, &rel.target))
}

fn parse_sheet_entries(xml_text: &str) -> Result<Vec<SheetEntry>> {
    let mut sheets = Vec::new();
    let mut reader = quick_xml::Reader::from_str(xml_text);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut depth = 0usize;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                depth += 1;
                if e.local_name().as_ref() == b"sheet" {
                    sheets.push(sheet_entry(&e)?);
                }
            }
            Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                sheets.push(sheet_entry(&e)?);
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    xml::ensure_closed(depth, "workbook")?;

    Ok(sheets)
}

fn sheet_entry(e: &BytesStart<'_>) -> Result<SheetEntry> {
    let mut entry = SheetEntry {
        name: String::new(),
        sheet_id: String::new(),
        rel_id: String::new(),
        state: SheetState::Visible,
    };

    for attr in e.attributes() {
        let attr = attr?;
        // r:id is namespaced; the prefix itself is not fixed
        if attr.key.prefix().is_some() {
            if attr.key.local_name().as_ref() == b"id" {
                entry.rel_id = xml::attr_value(&attr)?;
            }
            continue;
        }
        match attr.key.as_ref() {
            b"name" => entry.name = xml::attr_value(&attr)?,
            b"sheetId" => entry.sheet_id = xml::attr_value(&attr)?,
            b"state" => entry.state = SheetState::from_attribute(&xml::attr_value(&attr)?),
            _ => {}
        }
    }

    if entry.name.is_empty() {
        return Err(Error::InvalidData("sheet without a name attribute".to_string()));
    }
    Ok(entry)
}
