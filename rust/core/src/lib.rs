// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # GEDCOM-Lite Core Parser
//!
//! Streaming GEDCOM parser built with [nom](https://docs.rs/nom). Reads a
//! genealogy file in any of its legacy character sets and pushes a
//! SAX-style element event stream into a caller-supplied sink.
//!
//! ## Overview
//!
//! - **Encoding detection**: header sniffing with known-generator corrections
//!   and UTF-16 fallback, plus leading junk removal
//! - **Legacy decoding**: ANSEL (with combining marks reordered), Windows
//!   code pages, IBM PC and Mac Roman, through a pluggable [`DecoderRegistry`]
//! - **Line grammar**: `level [@xref@] TAG [@ptr@] [value]`, tolerant of
//!   continuation text
//! - **Hierarchy building**: level numbers become nested elements, with
//!   repair of skipped levels
//! - **Validity checks**: early garbage and record-less files are flagged
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gedcom_lite_core::{EventCollector, GedcomReader, Input, ParserConfig};
//!
//! let mut reader = GedcomReader::new(ParserConfig::default());
//! let mut sink = EventCollector::new();
//! let outcome = reader.parse(Input::path("family.ged"), &mut sink)?;
//!
//! println!("{} records, valid: {}", outcome.records, outcome.is_valid());
//! for event in sink.events() {
//!     println!("{:?}", event);
//! }
//! ```
//!
//! ## Writing GEDCOM
//!
//! [`GedcomWriter`] is itself an [`EventSink`], so a parse can be piped
//! straight back out as normalized GEDCOM text.
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for events and parse outcomes

pub mod ansel;
pub mod builder;
pub mod charset;
pub mod codepage;
pub mod config;
pub mod decode;
pub mod error;
pub mod event;
pub mod line;
pub mod lines;
pub mod reader;
pub mod sniffer;
pub mod validity;
pub mod writer;

pub use ansel::AnselDecoder;
pub use builder::{BuildSummary, Flow, HierarchyBuilder, TRAILER_TAG};
pub use charset::{is_recognized_token, Charset, RECOGNIZED_TOKENS};
pub use codepage::SingleByteDecoder;
pub use config::ParserConfig;
pub use decode::{AsciiDecoder, Decoder, DecoderRegistry, Utf16Decoder, Utf8Decoder};
pub use error::{Error, Result};
pub use event::{Attributes, Event, EventCollector, EventSink, Locator, ATTR_ID, ATTR_REF};
pub use line::{parse_line, LineRecord};
pub use lines::{strip_controls, PhysicalLines, TextLines};
pub use reader::{parse_bytes, parse_file, GedcomReader, Input, ParseOutcome};
pub use sniffer::{EncodingSniffer, HeaderFacts, Resolution};
pub use validity::{InvalidReason, Validity, ValidityTracker};
pub use writer::GedcomWriter;
