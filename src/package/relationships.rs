//! Package relationship parts (`_rels/*.rels`).

use crate::error::{Error, Result};
use crate::xml;
use quick_xml::events::Event;
use std::collections::HashMap;

/// A relationship entry from a .rels part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path, relative to the source part unless it starts with `/`
    pub target: String,
    /// Whether the target lives outside the package
    pub external: bool,
}

impl Relationship {
    /// Whether the type URI ends in the given short name (e.g. `worksheet`).
    ///
    /// Transitional and strict SpreadsheetML use different URI prefixes for
    /// the same relationship, so only the last path segment is compared.
    pub fn is_type(&self, short_name: &str) -> bool {
        self.rel_type.rsplit('/').next() == Some(short_name)
    }
}

/// Relationships of one source part, kept in document order.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    entries: Vec<Relationship>,
    by_id: HashMap<String, usize>,
}

impl Relationships {
    /// Create a new empty relationships collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the XML of a .rels part.
    pub fn parse(xml_text: &str) -> Result<Self> {
        let mut rels = Relationships::new();
        let mut reader = quick_xml::Reader::from_str(xml_text);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut depth = 0usize;
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    depth += 1;
                    if e.local_name().as_ref() == b"Relationship" {
                        rels.add_from_attributes(&e)?;
                    }
                }
                Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                    rels.add_from_attributes(&e)?;
                }
                Event::End(_) => depth = depth.saturating_sub(1),
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        xml::ensure_closed(depth, "relationships")?;

        Ok(rels)
    }

    fn add_from_attributes(&mut self, e: &quick_xml::events::BytesStart<'_>) -> Result<()> {
        let mut rel = Relationship {
            id: String::new(),
            rel_type: String::new(),
            target: String::new(),
            external: false,
        };
        for attr in e.attributes() {
            let attr = attr?;
            match attr.key.as_ref() {
                b"Id" => rel.id = xml::attr_value(&attr)?,
                b"Type" => rel.rel_type = xml::attr_value(&attr)?,
                b"Target" => rel.target = xml::attr_value(&attr)?,
                b"TargetMode" => {
                    rel.external = xml::attr_value(&attr)?.eq_ignore_ascii_case("external")
                }
                _ => {}
            }
        }
        if rel.id.is_empty() {
            return Err(Error::InvalidData(
                "relationship without an Id attribute".to_string(),
            ));
        }
        self.add(rel);
        Ok(())
    }

    /// Add a relationship. A repeated id replaces the earlier entry.
    pub fn add(&mut self, rel: Relationship) {
        match self.by_id.get(&rel.id) {
            Some(&idx) => self.entries[idx] = rel,
            None => {
                self.by_id.insert(rel.id.clone(), self.entries.len());
                self.entries.push(rel);
            }
        }
    }

    /// Get a relationship by ID.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.by_id.get(id).map(|&idx| &self.entries[idx])
    }

    /// First internal relationship of the given short type name.
    pub fn first_of_type(&self, short_name: &str) -> Option<&Relationship> {
        self.entries
            .iter()
            .find(|rel| !rel.external && rel.is_type(short_name))
    }

    /// Iterate relationships in document order.
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Name of the relationships part describing `part_name`.
///
/// `xl/workbook.xml` maps to `xl/_rels/workbook.xml.rels`; the package
/// root (empty name) maps to `_rels/.rels`.
pub fn rels_part_for(part_name: &str) -> String {
    let part_name = part_name.trim_start_matches('/');
    match part_name.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None if part_name.is_empty() => "_rels/.rels".to_string(),
        None => format!("_rels/{}.rels", part_name),
    }
}

/// Resolve a relationship target against the part that declared it.
///
/// Absolute targets (leading `/`) are rooted at the package root; relative
/// targets are joined to the source part's directory with `.` and `..`
/// segments collapsed.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    let (base, target) = match target.strip_prefix('/') {
        Some(absolute) => ("", absolute),
        None => (
            source_part
                .trim_start_matches('/')
                .rsplit_once('/')
                .map(|(dir, _)| dir)
                .unwrap_or(""),
            target,
        ),
    };

    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}
