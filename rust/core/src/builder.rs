// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hierarchy builder
//!
//! Turns the flat, level-numbered line sequence into nested element events.
//! Level numbers are the only source of structure: a line at level `n`
//! closes every open element at level `n` or deeper, then opens its own.
//!
//! Invariant: stack levels strictly increase from bottom to top, and the
//! bottom entry is the synthetic root at level -1.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::charset::is_recognized_token;
use crate::config::ParserConfig;
use crate::error::{Error, Result};
use crate::event::{Attributes, EventSink, ATTR_ID, ATTR_REF};
use crate::line::LineRecord;
use crate::validity::{Validity, ValidityTracker};

/// End-of-file marker; never opens an element
pub const TRAILER_TAG: &str = "TRLR";

const ROOT_LEVEL: i64 = -1;

#[derive(Debug, Clone)]
struct OpenElement {
    tag: String,
    level: i64,
    /// Fills a skipped level; produces no events
    placeholder: bool,
}

/// Whether the caller should keep feeding lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Result of a completed build
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub validity: Validity,
    pub records: usize,
    pub record_counts: FxHashMap<String, usize>,
}

/// Level-driven state machine feeding an [`EventSink`]
pub struct HierarchyBuilder<'s, S: EventSink + ?Sized> {
    sink: &'s mut S,
    stack: SmallVec<[OpenElement; 16]>,
    prev_level: i64,
    tracker: ValidityTracker,
    root: String,
}

impl<'s, S: EventSink + ?Sized> HierarchyBuilder<'s, S> {
    pub fn new(sink: &'s mut S, config: &ParserConfig) -> Self {
        Self {
            sink,
            stack: SmallVec::new(),
            prev_level: ROOT_LEVEL,
            tracker: ValidityTracker::new(config.validity_window),
            root: config.root_element.clone(),
        }
    }

    /// Emit the document start and open the root element
    pub fn begin(&mut self) -> Result<()> {
        self.sink.start_document()?;
        self.sink.start_element(&self.root, &Attributes::new())?;
        self.stack.push(OpenElement {
            tag: self.root.clone(),
            level: ROOT_LEVEL,
            placeholder: false,
        });
        Ok(())
    }

    /// Number of open elements, root and placeholders included
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Consume one control-filtered physical line
    pub fn feed(&mut self, line_no: usize, line: &str) -> Result<Flow> {
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        let record = LineRecord::parse(line);
        let Some(level) = record.level else {
            if self.tracker.reject_line(line_no) {
                return Ok(Flow::Stop);
            }
            // Continuation text without a level number
            self.sink.characters(line)?;
            return Ok(Flow::Continue);
        };
        self.tracker.accept_line();

        let lvl = i64::from(level);
        if lvl > self.prev_level + 1 {
            tracing::warn!(
                line = line_no,
                level,
                previous = self.prev_level,
                "Level number skipped, inserting placeholder"
            );
            self.stack.push(OpenElement {
                tag: String::new(),
                level: lvl - 1,
                placeholder: true,
            });
            self.prev_level = lvl - 1;
        }

        let tag = record.tag.ok_or(Error::MissingTag { line: line_no })?;
        let value = record.remainder.unwrap_or_default();

        if matches!(tag.as_str(), "CHAR" | "CHARACTER") && !is_recognized_token(&value) {
            return Err(Error::InvalidCharset {
                line: line_no,
                value,
            });
        }

        self.close_to(lvl, line_no)?;

        if tag == TRAILER_TAG {
            return Ok(Flow::Continue);
        }

        let mut attributes = Attributes::new();
        if let Some(xref) = record.cross_ref_id {
            attributes.push(ATTR_ID, xref);
        }
        if let Some(id) = record.inline_id {
            attributes.push(ATTR_REF, id);
        }
        self.sink.start_element(&tag, &attributes)?;
        self.tracker.open_element(level, &tag);
        self.stack.push(OpenElement {
            tag,
            level: lvl,
            placeholder: false,
        });
        self.prev_level = lvl;

        if !value.is_empty() {
            self.sink.characters(&value)?;
        }
        Ok(Flow::Continue)
    }

    /// Close every open element at `level` or deeper
    fn close_to(&mut self, level: i64, line_no: usize) -> Result<()> {
        while self.stack.last().is_some_and(|top| top.level >= level) {
            if self.stack.len() == 1 {
                return Err(Error::StackUnderflow { line: line_no });
            }
            if let Some(element) = self.stack.pop() {
                if !element.placeholder {
                    self.sink.end_element(&element.tag)?;
                }
            }
        }
        self.prev_level = self.stack.last().map_or(ROOT_LEVEL, |top| top.level);
        Ok(())
    }

    /// Close everything, root last, and end the document
    pub fn finish(mut self) -> Result<BuildSummary> {
        while let Some(element) = self.stack.pop() {
            if !element.placeholder {
                self.sink.end_element(&element.tag)?;
            }
        }
        self.sink.end_document()?;

        let validity = self.tracker.finish();
        Ok(BuildSummary {
            validity,
            records: self.tracker.records(),
            record_counts: self.tracker.take_record_counts(),
        })
    }
}
