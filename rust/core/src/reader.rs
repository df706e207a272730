// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parse driver
//!
//! Ties the pipeline together: read bytes, sniff the encoding, skip leading
//! junk, decode, split physical lines, drop control characters and feed the
//! hierarchy builder.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::builder::{Flow, HierarchyBuilder};
use crate::charset::Charset;
use crate::config::ParserConfig;
use crate::decode::DecoderRegistry;
use crate::error::Result;
use crate::event::{EventSink, Locator};
use crate::lines::{strip_controls, TextLines};
use crate::sniffer::{EncodingSniffer, Resolution};
use crate::validity::Validity;

enum Source<'a> {
    Path(PathBuf),
    Bytes(Vec<u8>),
    Reader(Box<dyn Read + 'a>),
    /// Already-decoded text; only a leading BOM is removed
    Text(String),
}

/// Input to a parse call
pub struct Input<'a> {
    source: Source<'a>,
    charset: Option<Charset>,
}

impl<'a> Input<'a> {
    pub fn path(path: impl AsRef<Path>) -> Self {
        Self::from_source(Source::Path(path.as_ref().to_path_buf()))
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::from_source(Source::Bytes(bytes.into()))
    }

    /// Byte stream, read to the end before parsing
    pub fn reader(reader: impl Read + 'a) -> Self {
        Self::from_source(Source::Reader(Box::new(reader)))
    }

    /// Character stream supplied by the caller
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_source(Source::Text(text.into()))
    }

    /// Decode with `charset` instead of sniffing. Ignored for text input.
    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = Some(charset);
        self
    }

    fn from_source(source: Source<'a>) -> Self {
        Self { source, charset: None }
    }
}

impl fmt::Debug for Input<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.source {
            Source::Path(path) => format!("Path({})", path.display()),
            Source::Bytes(bytes) => format!("Bytes({} bytes)", bytes.len()),
            Source::Reader(_) => "Reader".to_string(),
            Source::Text(text) => format!("Text({} bytes)", text.len()),
        };
        f.debug_struct("Input")
            .field("source", &kind)
            .field("charset", &self.charset)
            .finish()
    }
}

/// Summary of a completed parse
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParseOutcome {
    pub validity: Validity,
    /// Top-level records, header and trailer excluded
    pub records: usize,
    pub record_counts: FxHashMap<String, usize>,
    /// Physical lines consumed
    pub lines: usize,
    /// Encoding decision; `None` for text input
    pub resolution: Option<Resolution>,
}

impl ParseOutcome {
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.validity.is_valid()
    }

    pub fn charset(&self) -> Option<Charset> {
        self.resolution.as_ref().map(|r| r.charset)
    }
}

/// Streaming GEDCOM reader
///
/// # Example
///
/// ```
/// use gedcom_lite_core::{EventCollector, GedcomReader, Input, ParserConfig};
///
/// let mut reader = GedcomReader::new(ParserConfig::default());
/// let mut sink = EventCollector::new();
/// let outcome = reader
///     .parse(Input::text("0 HEAD\n0 @I1@ INDI\n1 NAME Ann\n0 TRLR\n"), &mut sink)
///     .unwrap();
/// assert!(outcome.is_valid());
/// assert_eq!(outcome.records, 1);
/// ```
#[derive(Debug, Default)]
pub struct GedcomReader {
    config: ParserConfig,
    registry: DecoderRegistry,
    locator: Locator,
}

impl GedcomReader {
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            registry: DecoderRegistry::default(),
            locator: Locator::new(),
        }
    }

    /// Replace the charset decoders
    pub fn with_registry(mut self, registry: DecoderRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry_mut(&mut self) -> &mut DecoderRegistry {
        &mut self.registry
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Physical line most recently read, 0 before parsing starts
    pub fn line_number(&self) -> usize {
        self.locator.line()
    }

    /// Parse `input`, pushing events into `sink`.
    ///
    /// On failure the sink's `fatal_error` is invoked before the error is
    /// returned. An invalid document is not a failure; check
    /// [`ParseOutcome::validity`].
    pub fn parse<S: EventSink + ?Sized>(&mut self, input: Input<'_>, sink: &mut S) -> Result<ParseOutcome> {
        let result = self.run(input, sink);
        if let Err(err) = &result {
            tracing::error!(line = self.line_number(), error = %err, "GEDCOM parse aborted");
            sink.fatal_error(err);
        }
        result
    }

    fn run<S: EventSink + ?Sized>(&mut self, input: Input<'_>, sink: &mut S) -> Result<ParseOutcome> {
        self.locator = Locator::new();
        self.config.validate()?;
        let (text, resolution) = self.load(input)?;

        sink.set_locator(self.locator.clone());
        let mut builder = HierarchyBuilder::new(sink, &self.config);
        builder.begin()?;

        let interval = self.config.progress_interval;
        let mut lines = 0;
        for (index, raw) in TextLines::new(&text).enumerate() {
            let line_no = index + 1;
            self.locator.set_line(line_no);
            lines = line_no;

            if interval > 0 && line_no % interval == 0 {
                tracing::debug!(line = line_no, depth = builder.depth(), "Parsing progress");
            }

            if builder.feed(line_no, &strip_controls(raw))? == Flow::Stop {
                break;
            }
        }

        let summary = builder.finish()?;
        tracing::info!(
            lines,
            records = summary.records,
            valid = summary.validity.is_valid(),
            charset = resolution.as_ref().map(|r| r.charset.as_str()),
            "GEDCOM parse complete"
        );

        Ok(ParseOutcome {
            validity: summary.validity,
            records: summary.records,
            record_counts: summary.record_counts,
            lines,
            resolution,
        })
    }

    /// Read the input and decode it to text
    fn load(&self, input: Input<'_>) -> Result<(String, Option<Resolution>)> {
        let Input { source, charset } = input;
        let bytes = match source {
            Source::Text(text) => {
                let text = match text.strip_prefix('\u{feff}') {
                    Some(rest) => rest.to_string(),
                    None => text,
                };
                return Ok((text, None));
            }
            Source::Path(path) => std::fs::read(&path)?,
            Source::Bytes(bytes) => bytes,
            Source::Reader(mut reader) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf)?;
                buf
            }
        };

        let resolution = match charset {
            Some(charset) => Resolution::forced(charset, &bytes),
            None => EncodingSniffer::new(self.config.sniff_line_limit).sniff(&bytes)?,
        };
        let text = self
            .registry
            .decode(resolution.charset, &bytes[resolution.junk_offset..])?;
        Ok((text, Some(resolution)))
    }
}

/// Parse a file with the default configuration
pub fn parse_file<S: EventSink + ?Sized>(path: impl AsRef<Path>, sink: &mut S) -> Result<ParseOutcome> {
    GedcomReader::default().parse(Input::path(path), sink)
}

/// Parse an in-memory byte buffer with the default configuration
pub fn parse_bytes<S: EventSink + ?Sized>(bytes: &[u8], sink: &mut S) -> Result<ParseOutcome> {
    GedcomReader::default().parse(Input::bytes(bytes), sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::event::{Attributes, Event, EventCollector};

    #[test]
    fn test_parse_text() {
        let mut sink = EventCollector::new();
        let mut reader = GedcomReader::new(ParserConfig::default());
        let outcome = reader
            .parse(Input::text("0 HEAD\n0 @I1@ INDI\n1 NAME Ann\n0 TRLR\n"), &mut sink)
            .unwrap();
        assert!(outcome.is_valid());
        assert_eq!(outcome.lines, 4);
        assert_eq!(outcome.charset(), None);
        assert_eq!(reader.line_number(), 4);
        assert!(sink.events().contains(&Event::text("Ann")));
    }

    #[test]
    fn test_text_bom_removed() {
        let mut sink = EventCollector::new();
        let outcome = GedcomReader::default()
            .parse(Input::text("\u{feff}0 HEAD\n0 @I1@ INDI\n0 TRLR\n"), &mut sink)
            .unwrap();
        assert!(outcome.is_valid());
        assert_eq!(outcome.records, 1);
        assert_eq!(sink.events()[2], Event::start("HEAD"));
    }

    #[test]
    fn test_reader_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<GedcomReader>();
    }

    #[test]
    fn test_custom_decoder_via_registry() {
        struct Upper;
        impl crate::decode::Decoder for Upper {
            fn name(&self) -> &str {
                "UPPER"
            }
            fn decode(&self, bytes: &[u8]) -> String {
                String::from_utf8_lossy(bytes).to_uppercase()
            }
        }

        let mut reader = GedcomReader::default();
        reader.registry_mut().register(Charset::Utf8, Box::new(Upper));
        let mut sink = EventCollector::new();
        reader
            .parse(Input::bytes(&b"0 @I1@ INDI\n1 NAME ann\n"[..]).with_charset(Charset::Utf8), &mut sink)
            .unwrap();
        assert!(sink.events().contains(&Event::text("ANN")));
    }

    #[test]
    fn test_junk_is_skipped() {
        let mut sink = EventCollector::new();
        let outcome = parse_bytes(b"\xEF\xBB\xBF\x00junk0 HEAD\n1 CHAR UTF-8\n0 @I1@ INDI\n", &mut sink).unwrap();
        assert!(outcome.is_valid());
        assert_eq!(outcome.charset(), Some(Charset::Utf8));
        assert_eq!(sink.events()[2], Event::start("HEAD"));
    }

    #[test]
    fn test_forced_charset() {
        let mut sink = EventCollector::new();
        let input = Input::bytes(&b"0 @I1@ INDI\n1 NAME J\xF6rg\n"[..]).with_charset(Charset::Ansi);
        GedcomReader::default().parse(input, &mut sink).unwrap();
        assert!(sink.events().contains(&Event::text("J\u{f6}rg")));
    }

    #[test]
    fn test_reader_input() {
        let mut sink = EventCollector::new();
        let cursor = std::io::Cursor::new(b"0 @I1@ INDI\r\n1 SEX F\r\n".to_vec());
        let outcome = GedcomReader::default().parse(Input::reader(cursor), &mut sink).unwrap();
        assert_eq!(outcome.records, 1);
    }

    #[test]
    fn test_bad_root_name_rejected() {
        let mut sink = EventCollector::new();
        let mut reader = GedcomReader::new(ParserConfig::default().with_root_element(""));
        let err = reader.parse(Input::text("0 @I1@ INDI\n"), &mut sink).unwrap_err();
        assert!(matches!(err, Error::Parse { position: 0, .. }));
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let mut sink = EventCollector::new();
        let err = parse_file("/nonexistent/tree.ged", &mut sink).unwrap_err();
        assert!(err.is_io());
        assert!(sink.fatal().is_some());
    }

    #[test]
    fn test_fatal_error_reaches_sink() {
        let mut sink = EventCollector::new();
        let err = GedcomReader::default()
            .parse(Input::text("0 HEAD\n1 CHAR EBCDIC\n"), &mut sink)
            .unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert!(sink.fatal().unwrap_or_default().contains("EBCDIC"));
    }

    struct LineProbe {
        locator: Option<Locator>,
        seen: Vec<(String, usize)>,
    }

    impl EventSink for LineProbe {
        fn set_locator(&mut self, locator: Locator) {
            self.locator = Some(locator);
        }
        fn start_document(&mut self) -> Result<()> {
            Ok(())
        }
        fn start_element(&mut self, name: &str, _attributes: &Attributes) -> Result<()> {
            let line = self.locator.as_ref().map_or(0, Locator::line);
            self.seen.push((name.to_string(), line));
            Ok(())
        }
        fn characters(&mut self, _text: &str) -> Result<()> {
            Ok(())
        }
        fn end_element(&mut self, _name: &str) -> Result<()> {
            Ok(())
        }
        fn end_document(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_locator_tracks_lines() {
        let mut probe = LineProbe { locator: None, seen: Vec::new() };
        GedcomReader::default()
            .parse(Input::text("0 HEAD\n\n0 @I1@ INDI\n1 NAME x\n"), &mut probe)
            .unwrap();
        assert_eq!(
            probe.seen,
            vec![
                ("GED".to_string(), 0),
                ("HEAD".to_string(), 1),
                ("INDI".to_string(), 3),
                ("NAME".to_string(), 4),
            ]
        );
    }

    struct FailingSink;

    impl EventSink for FailingSink {
        fn start_document(&mut self) -> Result<()> {
            Ok(())
        }
        fn start_element(&mut self, name: &str, _attributes: &Attributes) -> Result<()> {
            if name == "INDI" {
                return Err(Error::sink("disk full"));
            }
            Ok(())
        }
        fn characters(&mut self, _text: &str) -> Result<()> {
            Ok(())
        }
        fn end_element(&mut self, _name: &str) -> Result<()> {
            Ok(())
        }
        fn end_document(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sink_error_aborts() {
        let err = GedcomReader::default()
            .parse(Input::text("0 HEAD\n0 @I1@ INDI\n"), &mut FailingSink)
            .unwrap_err();
        assert!(matches!(err, Error::Sink(ref msg) if msg == "disk full"));
    }
}
