// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end parsing of small GEDCOM documents in their various encodings.

use gedcom_lite_core::{
    parse_bytes, Charset, Error, Event, EventCollector, GedcomReader, Input, InvalidReason, ParserConfig,
    Validity,
};
use pretty_assertions::assert_eq;

fn parse(bytes: &[u8]) -> (Vec<Event>, gedcom_lite_core::ParseOutcome) {
    let mut sink = EventCollector::new();
    let outcome = parse_bytes(bytes, &mut sink).expect("parse failed");
    (sink.into_events(), outcome)
}

fn texts(events: &[Event]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Characters(t) => Some(t.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn name_line_becomes_element_with_text() {
    let (events, _) = parse(b"0 HEAD\n1 CHAR UTF-8\n0 @I1@ INDI\n1 NAME John /Smith/\n0 TRLR\n");
    assert_eq!(
        events,
        vec![
            Event::StartDocument,
            Event::start("GED"),
            Event::start("HEAD"),
            Event::start("CHAR"),
            Event::text("UTF-8"),
            Event::end("CHAR"),
            Event::end("HEAD"),
            Event::start_with("INDI", &[("ID", "I1")]),
            Event::start("NAME"),
            Event::text("John /Smith/"),
            Event::end("NAME"),
            Event::end("INDI"),
            Event::end("GED"),
            Event::EndDocument,
        ]
    );
}

#[test]
fn level_jump_keeps_stream_balanced() {
    let (events, outcome) = parse(b"0 @I1@ INDI\n1 BIRT\n3 DATE 1 JAN 1900\n1 DEAT Y\n0 TRLR\n");
    let starts = events.iter().filter(|e| e.is_start_element()).count();
    let ends = events.iter().filter(|e| e.is_end_element()).count();
    assert_eq!(starts, ends);
    assert!(outcome.is_valid());
    assert!(texts(&events).contains(&"1 JAN 1900"));
}

#[test]
fn ansel_file_decodes_combining_marks() {
    // 0xE2 acute before "e"
    let bytes = b"0 HEAD\r\n1 CHAR ANSEL\r\n0 @I1@ INDI\r\n1 NAME Ren\xE2e /Dupont/\r\n0 TRLR\r\n";
    let (events, outcome) = parse(bytes);
    assert_eq!(outcome.charset(), Some(Charset::Ansel));
    assert!(texts(&events).contains(&"Rene\u{301} /Dupont/"));
}

#[test]
fn undeclared_file_defaults_to_ansel() {
    let (_, outcome) = parse(b"0 HEAD\n0 @I1@ INDI\n0 TRLR\n");
    assert_eq!(outcome.charset(), Some(Charset::Ansel));
}

#[test]
fn utf16_file_without_declaration() {
    let text = "0 HEAD\r\n1 CHAR UNICODE\r\n0 @I1@ INDI\r\n1 NAME \u{5f20}\u{4f1f}\r\n0 TRLR\r\n";
    let mut bytes = vec![0xFF, 0xFE];
    bytes.extend(text.encode_utf16().flat_map(|u| u.to_le_bytes()));

    let (events, outcome) = parse(&bytes);
    assert_eq!(outcome.charset(), Some(Charset::Utf16));
    assert!(texts(&events).contains(&"\u{5f20}\u{4f1f}"));
    assert_eq!(outcome.records, 1);
}

#[test]
fn geneweb_ascii_is_read_as_ansi() {
    let bytes = b"0 HEAD\n1 SOUR GeneWeb\n1 CHAR ASCII\n0 @I1@ INDI\n1 NAME Andr\xE9\n0 TRLR\n";
    let (events, outcome) = parse(bytes);
    assert_eq!(outcome.charset(), Some(Charset::Ansi));
    assert!(texts(&events).contains(&"Andr\u{e9}"));
}

#[test]
fn geni_trusted_version_is_read_as_utf8() {
    let bytes = "0 HEAD\n1 SOUR Geni.com\n2 VER 1.0\n1 CHAR UNICODE\n0 @I1@ INDI\n1 NAME Zo\u{eb}\n0 TRLR\n";
    let (events, outcome) = parse(bytes.as_bytes());
    assert_eq!(outcome.charset(), Some(Charset::Utf8));
    assert!(texts(&events).contains(&"Zo\u{eb}"));
}

#[test]
fn geni_unknown_version_is_rejected() {
    let mut sink = EventCollector::new();
    let err = parse_bytes(b"0 HEAD\n1 SOUR Geni.com\n2 VERS 2.0\n1 CHAR UTF-8\n0 TRLR\n", &mut sink).unwrap_err();
    match err {
        Error::UntrustedSource { generator, version } => {
            assert_eq!(generator, "Geni.com");
            assert_eq!(version.as_deref(), Some("2.0"));
        }
        other => panic!("expected UntrustedSource, got {:?}", other),
    }
    assert!(sink.events().is_empty());
    assert!(sink.fatal().is_some());
}

#[test]
fn mac_roman_via_charset_version() {
    let bytes = b"0 HEAD\r1 CHAR ASCII\r2 VERS MacOS Roman\r0 @I1@ INDI\r1 NAME M\x9Fller\r0 TRLR\r";
    let (events, outcome) = parse(bytes);
    assert_eq!(outcome.charset(), Some(Charset::Macintosh));
    assert!(texts(&events).contains(&"M\u{fc}ller"));
}

#[test]
fn unknown_declaration_is_an_error() {
    let mut sink = EventCollector::new();
    let err = parse_bytes(b"0 HEAD\n1 CHAR EBCDIC\n0 TRLR\n", &mut sink).unwrap_err();
    assert!(matches!(err, Error::UnrecognizedEncoding(ref token) if token == "EBCDIC"));
}

#[test]
fn garbage_prefix_marks_document_invalid() {
    let (events, outcome) = parse(b"this is not gedcom\n0 @I1@ INDI\n");
    // Skipping to the first '0' leaves no garbage line here
    assert!(outcome.is_valid());
    assert_eq!(events[2], Event::start_with("INDI", &[("ID", "I1")]));

    let mut sink = EventCollector::new();
    let outcome = GedcomReader::default()
        .parse(Input::text("not gedcom\n0 @I1@ INDI\n"), &mut sink)
        .unwrap();
    assert_eq!(
        outcome.validity,
        Validity::Invalid(InvalidReason::NoWellFormedLines { line: 1 })
    );
    assert_eq!(sink.events().len(), 4);
}

#[test]
fn validity_window_is_configurable() {
    let config = ParserConfig::default().with_validity_window(0);
    let mut sink = EventCollector::new();
    let outcome = GedcomReader::new(config)
        .parse(Input::text("not gedcom\n0 @I1@ INDI\n"), &mut sink)
        .unwrap();
    assert!(outcome.is_valid());
    assert_eq!(sink.events()[2], Event::text("not gedcom"));
}

#[test]
fn header_only_file_has_no_records() {
    let (_, outcome) = parse(b"0 HEAD\n1 SOUR X\n0 TRLR\n");
    assert_eq!(outcome.validity, Validity::Invalid(InvalidReason::NoRecords));
}

#[test]
fn record_counts_by_tag() {
    let (_, outcome) = parse(b"0 HEAD\n0 @I1@ INDI\n0 @I2@ INDI\n0 @F1@ FAM\n0 @S1@ SOUR\n0 TRLR\n");
    assert_eq!(outcome.records, 4);
    assert_eq!(outcome.record_counts.get("INDI"), Some(&2));
    assert_eq!(outcome.record_counts.get("FAM"), Some(&1));
    assert_eq!(outcome.record_counts.get("HEAD"), None);
}

#[test]
fn control_characters_are_dropped() {
    let (events, _) = parse(b"0 @I1@ INDI\n1 NAME An\x01n\x1a\n");
    assert!(texts(&events).contains(&"Ann"));
}

#[test]
fn trailer_opens_no_element() {
    let (events, _) = parse(b"0 @I1@ INDI\n0 TRLR\n");
    assert!(!events.iter().any(|e| e.element_name() == Some("TRLR")));
    assert_eq!(events.last(), Some(&Event::EndDocument));
}
