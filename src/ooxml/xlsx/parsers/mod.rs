//! XML parsing modules for Excel parts.
//!
//! This module contains the streaming parsers for individual parts of an
//! Excel workbook (.xlsx), plus the small event helpers they share.

pub mod worksheet_parser;

use quick_xml::events::{BytesStart, Event};

use crate::common::Result;
use crate::common::xml::unescape_xml;

/// Look up an attribute by local name and return its unescaped value.
pub(crate) fn attribute(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == name {
            let raw = std::str::from_utf8(&attr.value)?;
            return Ok(Some(unescape_xml(raw)?));
        }
    }
    Ok(None)
}

/// Append the character content carried by a text-like event to `buf`.
///
/// Entity references arrive as separate events and are resolved here.
pub(crate) fn push_text(buf: &mut String, event: &Event<'_>) -> Result<()> {
    match event {
        Event::Text(t) => buf.push_str(&unescape_xml(std::str::from_utf8(t)?)?),
        Event::GeneralRef(r) => {
            let name = std::str::from_utf8(r)?;
            buf.push_str(&unescape_xml(&format!("&{name};"))?);
        },
        Event::CData(c) => buf.push_str(std::str::from_utf8(c)?),
        _ => {},
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::Reader;

    #[test]
    fn test_attribute_by_local_name() {
        let mut reader = Reader::from_str(r#"<c x:r="B2" t="s"/>"#);
        let Event::Empty(e) = reader.read_event().unwrap() else {
            panic!("expected empty element");
        };
        assert_eq!(attribute(&e, b"r").unwrap().as_deref(), Some("B2"));
        assert_eq!(attribute(&e, b"t").unwrap().as_deref(), Some("s"));
        assert_eq!(attribute(&e, b"s").unwrap(), None);
    }

    #[test]
    fn test_push_text_resolves_entities() {
        let mut reader = Reader::from_str("<t>a &amp; b &#60;c&#62;</t>");
        let mut text = String::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Eof => break,
                ev => push_text(&mut text, &ev).unwrap(),
            }
        }
        assert_eq!(text, "a & b <c>");
    }
}
