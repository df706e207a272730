// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Encoding detection
//!
//! GEDCOM declares its character set in the header (`1 CHAR ...`), but the
//! declaration is only a hint: several generators are known to mislabel
//! their output. The sniffer reads the header provisionally, applies the
//! known corrections, falls back to UTF-16 when no declaration is readable,
//! and finds where the real content starts.

use memchr::memchr;

use crate::charset::{normalize_token, Charset};
use crate::decode::{utf16_byte_order, utf16_units};
use crate::error::{Error, Result};
use crate::line::LineRecord;
use crate::lines::{PhysicalLines, TextLines};

/// The only Geni.com export version whose labelling has been checked
pub const GENI_TRUSTED_VERSION: &str = "1.0";

/// Header facts gathered by the provisional scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HeaderFacts {
    /// `1 SOUR` value
    pub generator: Option<String>,
    /// `2 VER`/`2 VERS` under `1 SOUR`
    pub version: Option<String>,
    /// `1 CHAR` value as written
    pub declared: Option<String>,
    /// `2 VERS` directly after `1 CHAR`
    pub charset_version: Option<String>,
}

/// Outcome of encoding detection
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Resolution {
    pub charset: Charset,
    /// Canonical upper-case token after corrections
    pub token: String,
    pub header: HeaderFacts,
    /// Bytes of leading junk before the first `0`
    pub junk_offset: usize,
}

impl Resolution {
    /// Resolution for a caller-chosen charset; only the junk offset is computed
    pub fn forced(charset: Charset, bytes: &[u8]) -> Self {
        Self {
            charset,
            token: charset.as_str().to_string(),
            header: HeaderFacts::default(),
            junk_offset: junk_offset(bytes, charset),
        }
    }
}

/// Encoding sniffer over a raw byte buffer
#[derive(Debug, Clone, Copy)]
pub struct EncodingSniffer {
    line_limit: usize,
}

impl EncodingSniffer {
    pub fn new(line_limit: usize) -> Self {
        Self { line_limit }
    }

    /// Work out how `bytes` must be decoded
    pub fn sniff(&self, bytes: &[u8]) -> Result<Resolution> {
        let narrow = scan_header(PhysicalLines::new(bytes).map(latin1), self.line_limit);

        let (charset, token, header) = if narrow.declared.is_some() {
            let token = correct_declared(&narrow)?;
            (Charset::resolve(&token)?, token, narrow)
        } else {
            let prefix = decode_utf16_prefix(bytes, self.line_limit);
            let wide = scan_header(TextLines::new(&prefix).map(str::to_string), self.line_limit);
            let token = wide
                .declared
                .as_deref()
                .map(|t| normalize_token(&t.trim().to_ascii_uppercase()).to_string());
            match token.as_deref() {
                Some("UNICODE") | Some("UTF-16") => (Charset::Utf16, "UTF-16".to_string(), wide),
                _ => {
                    tracing::debug!("No character set declaration found, assuming ANSEL");
                    (Charset::Ansel, Charset::Ansel.as_str().to_string(), narrow)
                }
            }
        };

        let junk_offset = junk_offset(bytes, charset);
        tracing::debug!(
            charset = %charset,
            token = %token,
            generator = ?header.generator,
            junk_offset,
            "Resolved encoding"
        );

        Ok(Resolution {
            charset,
            token,
            header,
            junk_offset,
        })
    }
}

impl Default for EncodingSniffer {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SNIFF_LINE_LIMIT)
    }
}

/// Bytes as characters, one to one
fn latin1(line: &[u8]) -> String {
    line.iter().map(|&b| b as char).collect()
}

/// Decode UTF-16 until roughly `max_lines` lines have been seen
fn decode_utf16_prefix(bytes: &[u8], max_lines: usize) -> String {
    let (order, bom) = utf16_byte_order(bytes);
    let mut text = String::new();
    let mut breaks = 0;
    for unit in char::decode_utf16(utf16_units(&bytes[bom..], order)) {
        let ch = unit.unwrap_or(char::REPLACEMENT_CHARACTER);
        if ch == '\n' || ch == '\r' {
            breaks += 1;
            // CR LF counts twice here
            if breaks > max_lines * 2 {
                break;
            }
        }
        text.push(ch);
    }
    text
}

/// Collect generator, version and charset declaration from the first
/// `limit` lines. Stops at the `CHAR` line (after peeking at the next one).
pub fn scan_header<I>(lines: I, limit: usize) -> HeaderFacts
where
    I: Iterator<Item = String>,
{
    let mut facts = HeaderFacts::default();
    let mut in_source = false;
    let mut lines = lines.take(limit);

    while let Some(line) = lines.next() {
        let record = LineRecord::parse(&line);
        let (Some(level), Some(tag)) = (record.level, record.tag.as_deref()) else {
            continue;
        };
        let value = record.remainder.as_deref().map(str::trim).unwrap_or("");

        match (level, tag) {
            (1, "SOUR") if facts.generator.is_none() => {
                facts.generator = Some(value.to_string());
                in_source = true;
                continue;
            }
            (2, "VER" | "VERS") if in_source && facts.version.is_none() => {
                facts.version = Some(value.to_string());
            }
            (1, "CHAR" | "CHARACTER") => {
                if !value.is_empty() {
                    facts.declared = Some(value.to_string());
                }
                if let Some(next) = lines.next() {
                    let next = LineRecord::parse(&next);
                    if next.level == Some(2) && matches!(next.tag.as_deref(), Some("VERS" | "VER")) {
                        facts.charset_version = next.remainder.map(|v| v.trim().to_string());
                    }
                }
                break;
            }
            _ => {}
        }

        if level <= 1 {
            in_source = false;
        }
    }

    facts
}

/// Apply generator-specific corrections and aliases to the declared token
fn correct_declared(facts: &HeaderFacts) -> Result<String> {
    let declared = facts.declared.as_deref().unwrap_or_default();
    let mut token = normalize_token(&declared.trim().to_ascii_uppercase()).to_string();
    let generator = facts.generator.as_deref().unwrap_or_default();

    if generator.eq_ignore_ascii_case("Geni.com") {
        if facts.version.as_deref() != Some(GENI_TRUSTED_VERSION) {
            return Err(Error::UntrustedSource {
                generator: generator.to_string(),
                version: facts.version.clone(),
            });
        }
        // Geni writes UTF-8 whatever it declares
        if token == "UNICODE" || token == "ANSEL" {
            token = "UTF-8".to_string();
        }
    } else if generator.eq_ignore_ascii_case("GeneWeb") {
        if token == "ASCII" {
            token = "ANSI".to_string();
        }
    } else if generator.eq_ignore_ascii_case("GENJ") && token == "UNICODE" {
        token = "UTF-8".to_string();
    }

    if token == "ASCII"
        && facts
            .charset_version
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("MacOS Roman"))
    {
        token = "MACINTOSH".to_string();
    }

    Ok(token)
}

/// Offset of the first structural `0`: the first `0` byte for byte-oriented
/// charsets, the first `0` code unit for UTF-16. Zero when there is none.
pub fn junk_offset(bytes: &[u8], charset: Charset) -> usize {
    if charset.is_wide() {
        let (order, bom) = utf16_byte_order(bytes);
        utf16_units(&bytes[bom..], order)
            .position(|unit| unit == u16::from(b'0'))
            .map(|index| bom + index * 2)
            .unwrap_or(0)
    } else {
        memchr(b'0', bytes).unwrap_or(0)
    }
}
