// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GEDCOM line field extraction using nom
//!
//! Splits one decoded line into level, cross-reference id, tag, inline id
//! and value. A line that does not follow the grammar yields an empty
//! record, which callers treat as continuation text.

use nom::{
    bytes::complete::{take_while, take_while1},
    character::complete::{char, digit1},
    combinator::map_res,
    sequence::{delimited, preceded, terminated, tuple},
    IResult,
};

/// Characters some producers wrap around reference tokens
const INLINE_ID_JUNK: [char; 3] = ['|', '#', '/'];

/// The five canonical fields of one GEDCOM line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineRecord {
    /// Nesting depth, `None` when the line is not a record line
    pub level: Option<u32>,
    /// `@ID@` before the tag (defines a record), without the delimiters
    pub cross_ref_id: Option<String>,
    pub tag: Option<String>,
    /// `@ID@` after the tag (points at a record), delimiters and `|#/` removed
    pub inline_id: Option<String>,
    /// Value text, never trimmed
    pub remainder: Option<String>,
}

impl LineRecord {
    /// Extract the fields of `line`
    pub fn parse(line: &str) -> Self {
        parse_line(line)
    }

    /// True when the line matched the record grammar
    #[inline]
    pub fn is_well_formed(&self) -> bool {
        self.level.is_some()
    }

    fn build(level: u32, xref: Option<&str>, tag: &str, id: Option<&str>, value: Option<&str>) -> Self {
        Self {
            level: Some(level),
            cross_ref_id: xref.map(str::to_string),
            tag: Some(tag.to_string()),
            inline_id: id.map(|id| id.chars().filter(|c| !INLINE_ID_JUNK.contains(c)).collect()),
            remainder: value.filter(|v| !v.is_empty()).map(str::to_string),
        }
    }
}

#[inline]
fn is_sep(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Field separator: one or more blanks
fn sep(input: &str) -> IResult<&str, &str> {
    take_while1(is_sep)(input)
}

/// Level number, optionally indented
fn level(input: &str) -> IResult<&str, u32> {
    preceded(take_while(is_sep), map_res(digit1, |s: &str| s.parse::<u32>()))(input)
}

/// Cross-reference token: @I1@
fn xref(input: &str) -> IResult<&str, &str> {
    delimited(char('@'), take_while1(|c: char| c != '@'), char('@'))(input)
}

/// Tag token: word characters
fn tag(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

/// What may follow the last structural field: end of line, or exactly one
/// blank and then the untouched value.
fn tail(rest: &str) -> Option<Option<&str>> {
    let mut chars = rest.chars();
    match chars.next() {
        None => Some(None),
        Some(c) if is_sep(c) => Some(Some(chars.as_str())),
        Some(_) => None,
    }
}

/// Parse a GEDCOM line
/// Examples: `0 @I1@ INDI`, `1 FAMC @F2@`, `2 CONT  indented text`
pub fn parse_line(line: &str) -> LineRecord {
    let (rest, lvl) = match terminated(level, sep)(line) {
        Ok(parsed) => parsed,
        Err(_) => return LineRecord::default(),
    };

    // Record definition: 0 @I1@ INDI
    if let Ok((after, (id, _, tag_name))) = tuple((xref, sep, tag))(rest) {
        if let Some(value) = tail(after) {
            return LineRecord::build(lvl, Some(id), tag_name, None, value);
        }
    }

    if let Ok((after_tag, tag_name)) = tag(rest) {
        // Reference: 1 FAMS @F1@
        if let Ok((after_id, id)) = preceded(sep, xref)(after_tag) {
            if let Some(value) = tail(after_id) {
                return LineRecord::build(lvl, None, tag_name, Some(id), value);
            }
        }
        // Anything else after the tag is the value, `@` text included
        if let Some(value) = tail(after_tag) {
            return LineRecord::build(lvl, None, tag_name, None, value);
        }
    }

    LineRecord::default()
}
