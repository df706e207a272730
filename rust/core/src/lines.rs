// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Physical line splitting
//!
//! GEDCOM producers terminate lines with CR LF, LF or a bare CR (classic
//! Mac OS). Each terminator ends exactly one physical line.

use memchr::memchr2;

/// Iterator over the physical lines of a byte buffer, terminators removed
#[derive(Debug, Clone)]
pub struct PhysicalLines<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> PhysicalLines<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Next line as a byte range into the buffer
    fn next_range(&mut self) -> Option<(usize, usize)> {
        let len = self.bytes.len();
        if self.pos >= len {
            return None;
        }
        let start = self.pos;
        match memchr2(b'\r', b'\n', &self.bytes[start..]) {
            Some(offset) => {
                let end = start + offset;
                self.pos = end + 1;
                if self.bytes[end] == b'\r' && self.bytes.get(end + 1) == Some(&b'\n') {
                    self.pos += 1;
                }
                Some((start, end))
            }
            None => {
                self.pos = len;
                Some((start, len))
            }
        }
    }
}

impl<'a> Iterator for PhysicalLines<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.bytes;
        self.next_range().map(|(start, end)| &bytes[start..end])
    }
}

/// Physical lines of decoded text
#[derive(Debug, Clone)]
pub struct TextLines<'a> {
    text: &'a str,
    inner: PhysicalLines<'a>,
}

impl<'a> TextLines<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            inner: PhysicalLines::new(text.as_bytes()),
        }
    }
}

impl<'a> Iterator for TextLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        // CR and LF are ASCII, so both ends are char boundaries
        let text = self.text;
        self.inner.next_range().map(|(start, end)| &text[start..end])
    }
}

/// Drop control characters below U+0020 other than TAB, CR and LF.
/// Borrows when there is nothing to remove.
pub fn strip_controls(line: &str) -> std::borrow::Cow<'_, str> {
    let is_junk = |c: char| c < ' ' && !matches!(c, '\t' | '\r' | '\n');
    if line.chars().any(is_junk) {
        std::borrow::Cow::Owned(line.chars().filter(|&c| !is_junk(c)).collect())
    } else {
        std::borrow::Cow::Borrowed(line)
    }
}
