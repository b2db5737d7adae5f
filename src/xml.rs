//! Small helpers shared by the pull-event XML scanners.

use crate::error::{Error, Result};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::BytesStart;

/// Unescaped value of an attribute.
pub(crate) fn attr_value(attr: &Attribute<'_>) -> Result<String> {
    let raw = String::from_utf8_lossy(&attr.value);
    Ok(quick_xml::escape::unescape(&raw)?.into_owned())
}

/// Unescaped value of the attribute with the given unprefixed name.
pub(crate) fn find_attr(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == name {
            return attr_value(&attr).map(Some);
        }
    }
    Ok(None)
}

/// Fail when the input ended while elements were still open.
pub(crate) fn ensure_closed(depth: usize, part: &str) -> Result<()> {
    if depth == 0 {
        Ok(())
    } else {
        Err(Error::XmlParse(format!(
            "unexpected end of {} part: {} element(s) left open",
            part, depth
        )))
    }
}
