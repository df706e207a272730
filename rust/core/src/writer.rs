// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GEDCOM serialization sink
//!
//! Writes an event stream back out as level-numbered UTF-8 lines. Element
//! depth below the root becomes the level number, `ID` and `REF` become
//! `@..@` tokens, and the first text after a start tag becomes the line
//! value.
//!
//! The header's `1 CHAR` declaration is rewritten to `UTF-8` and its
//! subordinate lines (`2 VERS ...`) are dropped, so the output is read back
//! with the encoding it was written in.

use std::io::Write;

use crate::builder::TRAILER_TAG;
use crate::error::Result;
use crate::event::{Attributes, EventSink, ATTR_ID, ATTR_REF};

const HEADER_TAG: &str = "HEAD";
const OUTPUT_CHARSET: &str = "UTF-8";

/// [`EventSink`] producing GEDCOM text
#[derive(Debug)]
pub struct GedcomWriter<W: Write> {
    out: W,
    /// Open elements, root included
    depth: usize,
    line_open: bool,
    /// The current line was just started and has no value yet
    takes_value: bool,
    /// The open level-0 element is the header
    in_header: bool,
    /// Level of the open header `CHAR` element; its text and children are
    /// replaced by the output declaration
    charset_level: Option<usize>,
    terminator: &'static str,
}

impl<W: Write> GedcomWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            depth: 0,
            line_open: false,
            takes_value: false,
            in_header: false,
            charset_level: None,
            terminator: "\n",
        }
    }

    /// Terminate lines with CR LF
    pub fn with_crlf(mut self) -> Self {
        self.terminator = "\r\n";
        self
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn end_line(&mut self) -> Result<()> {
        if self.line_open {
            self.out.write_all(self.terminator.as_bytes())?;
            self.line_open = false;
        }
        self.takes_value = false;
        Ok(())
    }

    /// Level of the innermost open element, `None` at the root
    fn current_level(&self) -> Option<usize> {
        self.depth.checked_sub(2)
    }
}

impl<W: Write> EventSink for GedcomWriter<W> {
    fn start_document(&mut self) -> Result<()> {
        self.depth = 0;
        self.line_open = false;
        self.takes_value = false;
        self.in_header = false;
        self.charset_level = None;
        Ok(())
    }

    fn start_element(&mut self, name: &str, attributes: &Attributes) -> Result<()> {
        if self.depth == 0 {
            // Synthetic root has no line of its own
            self.depth = 1;
            return Ok(());
        }

        let level = self.depth - 1;
        self.depth += 1;
        if level == 0 {
            self.in_header = name == HEADER_TAG;
        }
        if self.charset_level.is_some_and(|l| level > l) {
            return Ok(());
        }
        self.end_line()?;

        write!(self.out, "{}", level)?;
        if let Some(id) = attributes.get(ATTR_ID) {
            write!(self.out, " @{}@", id)?;
        }
        write!(self.out, " {}", name)?;
        if let Some(target) = attributes.get(ATTR_REF) {
            write!(self.out, " @{}@", target)?;
        }
        self.line_open = true;

        if level == 1 && self.in_header && matches!(name, "CHAR" | "CHARACTER") {
            write!(self.out, " {}", OUTPUT_CHARSET)?;
            self.charset_level = Some(level);
        } else {
            self.takes_value = true;
        }
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        if let (Some(current), Some(charset)) = (self.current_level(), self.charset_level) {
            if current >= charset {
                return Ok(());
            }
        }
        if self.takes_value {
            write!(self.out, " {}", text)?;
            self.takes_value = false;
        } else {
            self.end_line()?;
            self.out.write_all(text.as_bytes())?;
            self.line_open = true;
        }
        Ok(())
    }

    fn end_element(&mut self, _name: &str) -> Result<()> {
        if self.current_level().is_some() && self.current_level() == self.charset_level {
            self.charset_level = None;
        }
        self.depth = self.depth.saturating_sub(1);
        self.takes_value = false;
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        self.end_line()?;
        write!(self.out, "0 {}{}", TRAILER_TAG, self.terminator)?;
        self.out.flush()?;
        Ok(())
    }
}
