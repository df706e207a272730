// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! XML output sink.

use std::borrow::Cow;
use std::io::Write;

use gedcom_lite_core::{Attributes, Error, EventSink, Locator, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Writes the event stream as an XML document, one element per GEDCOM line.
pub struct XmlSink<W: Write> {
    writer: Writer<W>,
    locator: Option<Locator>,
}

impl<W: Write> XmlSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            writer: Writer::new(out),
            locator: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer.write_event(event).map_err(|err| {
            let line = self.locator.as_ref().map_or(0, Locator::line);
            Error::sink(format!("XML write failed at line {}: {}", line, err))
        })
    }
}

/// GEDCOM tags may start with a digit, XML names may not
fn xml_name(tag: &str) -> Cow<'_, str> {
    if tag.starts_with(|c: char| c.is_ascii_digit()) {
        Cow::Owned(format!("_{}", tag))
    } else {
        Cow::Borrowed(tag)
    }
}

impl<W: Write> EventSink for XmlSink<W> {
    fn set_locator(&mut self, locator: Locator) {
        self.locator = Some(locator);
    }

    fn start_document(&mut self) -> Result<()> {
        self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    fn start_element(&mut self, name: &str, attributes: &Attributes) -> Result<()> {
        let mut start = BytesStart::new(xml_name(name));
        for attribute in attributes.iter() {
            start.push_attribute(attribute);
        }
        self.write(Event::Start(start))
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        self.write(Event::Text(BytesText::new(text)))
    }

    fn end_element(&mut self, name: &str) -> Result<()> {
        self.write(Event::End(BytesEnd::new(xml_name(name))))
    }

    fn end_document(&mut self) -> Result<()> {
        self.writer.get_mut().flush()?;
        Ok(())
    }

    fn fatal_error(&mut self, error: &Error) {
        tracing::debug!(error = %error, "XML output left incomplete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gedcom_lite_core::{GedcomReader, Input};
    use pretty_assertions::assert_eq;

    fn convert(text: &str) -> String {
        let mut sink = XmlSink::new(Vec::new());
        GedcomReader::default().parse(Input::text(text), &mut sink).unwrap();
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn test_record_to_xml() {
        assert_eq!(
            convert("0 @I1@ INDI\n1 NAME Ann & Bo /Lee/\n1 FAMS @F1@\n"),
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?>"#,
                r#"<GED><INDI ID="I1"><NAME>Ann &amp; Bo /Lee/</NAME><FAMS REF="F1"></FAMS></INDI></GED>"#
            )
        );
    }

    #[test]
    fn test_digit_tag_is_prefixed() {
        assert!(convert("0 @I1@ INDI\n1 1ST y\n").contains("<_1ST>y</_1ST>"));
        assert_eq!(xml_name("1ST"), "_1ST");
        assert_eq!(xml_name("NAME"), "NAME");
    }
}
