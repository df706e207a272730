// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Document events
//!
//! The parser pushes a SAX-style event stream into an [`EventSink`]:
//!
//! ```text
//! start_document
//! start_element("GED")
//!   start_element("INDI", ID=I1)
//!     start_element("NAME")  characters("John /Smith/")  end_element("NAME")
//!   end_element("INDI")
//! end_element("GED")
//! end_document
//! ```
//!
//! Events are delivered synchronously, in order, on the parsing thread.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::{Error, Result};

/// Attribute carrying the record's own cross-reference id
pub const ATTR_ID: &str = "ID";
/// Attribute carrying a pointer to another record
pub const ATTR_REF: &str = "REF";

/// Ordered element attributes (at most `ID` then `REF`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: SmallVec<[(&'static str, String); 2]>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `name=value`; empty values are skipped
    pub fn push(&mut self, name: &'static str, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.entries.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter().find(|(k, _)| *k == name).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read-only view of the parser's current physical line (1-based).
///
/// Handed to the sink before `start_document`; stays valid for the whole
/// parse call.
#[derive(Debug, Clone, Default)]
pub struct Locator {
    line: Arc<AtomicUsize>,
}

impl Locator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current physical line, 0 before the first line is read
    pub fn line(&self) -> usize {
        self.line.load(Ordering::Relaxed)
    }

    pub(crate) fn set_line(&self, line: usize) {
        self.line.store(line, Ordering::Relaxed);
    }
}

/// Receiver of the document event stream
pub trait EventSink {
    /// Called once before `start_document`
    fn set_locator(&mut self, _locator: Locator) {}

    fn start_document(&mut self) -> Result<()>;

    fn start_element(&mut self, name: &str, attributes: &Attributes) -> Result<()>;

    /// Text of the current element, verbatim. May be called several times
    /// for one element.
    fn characters(&mut self, text: &str) -> Result<()>;

    fn end_element(&mut self, name: &str) -> Result<()>;

    fn end_document(&mut self) -> Result<()>;

    /// The parse is about to abort with `error`
    fn fatal_error(&mut self, _error: &Error) {}
}

/// Owned copy of one event
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Event {
    StartDocument,
    StartElement {
        name: String,
        attributes: Vec<(String, String)>,
    },
    Characters(String),
    EndElement(String),
    EndDocument,
}

impl Event {
    /// Start element without attributes
    pub fn start(name: &str) -> Self {
        Event::StartElement {
            name: name.to_string(),
            attributes: Vec::new(),
        }
    }

    /// Start element with attributes
    pub fn start_with(name: &str, attributes: &[(&str, &str)]) -> Self {
        Event::StartElement {
            name: name.to_string(),
            attributes: attributes.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    pub fn text(text: &str) -> Self {
        Event::Characters(text.to_string())
    }

    pub fn end(name: &str) -> Self {
        Event::EndElement(name.to_string())
    }

    #[inline]
    pub fn is_start_element(&self) -> bool {
        matches!(self, Event::StartElement { .. })
    }

    #[inline]
    pub fn is_end_element(&self) -> bool {
        matches!(self, Event::EndElement(_))
    }

    /// Element name for start/end events
    pub fn element_name(&self) -> Option<&str> {
        match self {
            Event::StartElement { name, .. } | Event::EndElement(name) => Some(name.as_str()),
            _ => None,
        }
    }
}

/// Sink that records every event
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<Event>,
    fatal: Option<String>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Take the collected events
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    /// Message of the fatal error reported to this sink, if any
    pub fn fatal(&self) -> Option<&str> {
        self.fatal.as_deref()
    }
}

impl EventSink for EventCollector {
    fn start_document(&mut self) -> Result<()> {
        self.events.push(Event::StartDocument);
        Ok(())
    }

    fn start_element(&mut self, name: &str, attributes: &Attributes) -> Result<()> {
        self.events.push(Event::StartElement {
            name: name.to_string(),
            attributes: attributes.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        });
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        self.events.push(Event::Characters(text.to_string()));
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> Result<()> {
        self.events.push(Event::EndElement(name.to_string()));
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        self.events.push(Event::EndDocument);
        Ok(())
    }

    fn fatal_error(&mut self, error: &Error) {
        self.fatal = Some(error.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_keep_order_and_skip_empty() {
        let mut attrs = Attributes::new();
        attrs.push(ATTR_ID, "I1");
        attrs.push(ATTR_REF, "");
        attrs.push(ATTR_REF, "F2");
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.get("ID"), Some("I1"));
        assert_eq!(attrs.get("REF"), Some("F2"));
        assert_eq!(attrs.iter().collect::<Vec<_>>(), vec![("ID", "I1"), ("REF", "F2")]);
    }

    #[test]
    fn test_locator_is_shared() {
        let locator = Locator::new();
        let copy = locator.clone();
        locator.set_line(42);
        assert_eq!(copy.line(), 42);
    }

    #[test]
    fn test_collector() {
        let mut sink = EventCollector::new();
        let mut attrs = Attributes::new();
        attrs.push(ATTR_ID, "I1");
        sink.start_document().unwrap();
        sink.start_element("INDI", &attrs).unwrap();
        sink.characters("x").unwrap();
        sink.end_element("INDI").unwrap();
        sink.end_document().unwrap();
        assert_eq!(sink.fatal(), None);

        assert_eq!(
            sink.events(),
            &[
                Event::StartDocument,
                Event::start_with("INDI", &[("ID", "I1")]),
                Event::text("x"),
                Event::end("INDI"),
                Event::EndDocument,
            ]
        );
        assert!(sink.events()[1].is_start_element());
        assert_eq!(sink.events()[3].element_name(), Some("INDI"));

        let taken = sink.take_events();
        assert_eq!(taken.len(), 5);
        assert!(sink.events().is_empty());
    }
}
