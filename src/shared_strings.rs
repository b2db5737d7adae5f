//! Shared string table (`xl/sharedStrings.xml`).

use crate::error::Result;
use crate::xml;
use quick_xml::events::Event;

/// Shared strings table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedStrings {
    /// All strings in order
    strings: Vec<String>,
}

impl SharedStrings {
    /// Parse shared strings from XML content.
    ///
    /// Each `<si>` item yields one entry: plain `<t>` text, or the
    /// concatenated `<t>` of its rich-text runs. Phonetic hints (`<rPh>`)
    /// are not part of the value and are skipped.
    pub fn parse(xml_text: &str) -> Result<Self> {
        let mut strings = Vec::new();
        let mut reader = quick_xml::Reader::from_str(xml_text);
        // whitespace inside <t> is significant
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut depth = 0usize;
        let mut in_si = false;
        let mut in_t = false;
        let mut in_phonetic = false;
        let mut current_text = String::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    depth += 1;
                    match e.local_name().as_ref() {
                        b"si" => {
                            in_si = true;
                            current_text.clear();
                        }
                        b"rPh" if in_si => in_phonetic = true,
                        b"t" if in_si && !in_phonetic => in_t = true,
                        _ => {}
                    }
                }
                Event::Empty(e) => {
                    if e.local_name().as_ref() == b"si" {
                        strings.push(String::new());
                    }
                }
                Event::Text(e) => {
                    if in_t {
                        current_text.push_str(&e.unescape()?);
                    }
                }
                Event::CData(e) => {
                    if in_t {
                        current_text.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                Event::End(e) => {
                    depth = depth.saturating_sub(1);
                    match e.local_name().as_ref() {
                        b"si" => {
                            strings.push(std::mem::take(&mut current_text));
                            in_si = false;
                        }
                        b"rPh" => in_phonetic = false,
                        b"t" => in_t = false,
                        _ => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        xml::ensure_closed(depth, "shared strings")?;

        log::debug!("parsed {} shared strings", strings.len());
        Ok(Self { strings })
    }

    /// Get a string by index.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(|s| s.as_str())
    }

    /// Get the count of shared strings.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Iterate strings in table order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(String::as_str)
    }
}
