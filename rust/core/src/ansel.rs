// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ANSEL (ANSI Z39.47) decoding
//!
//! The GEDCOM 5.x default character set. ANSEL writes a combining diacritic
//! *before* the letter it modifies; Unicode wants it after, so marks are
//! held back until their base character has been written.

use smallvec::SmallVec;

use crate::decode::Decoder;

const NONE: u16 = 0xFFFD;

/// Bytes 0xA0-0xFF. 0xE0 and above are combining marks.
/// Includes the GEDCOM additions 0xBE, 0xBF, 0xC7, 0xC8 and 0xCF.
static ANSEL_HIGH: [u16; 96] = [
    // 0xA0
    NONE, 0x0141, 0x00D8, 0x0110, 0x00DE, 0x00C6, 0x0152, 0x02B9,
    0x00B7, 0x266D, 0x00AE, 0x00B1, 0x01A0, 0x01AF, 0x02BC, NONE,
    // 0xB0
    0x02BB, 0x0142, 0x00F8, 0x0111, 0x00FE, 0x00E6, 0x0153, 0x02BA,
    0x0131, 0x00A3, 0x00F0, NONE, 0x01A1, 0x01B0, 0x25A1, 0x25A0,
    // 0xC0
    0x00B0, 0x2113, 0x2117, 0x00A9, 0x266F, 0x00BF, 0x00A1, 0x00DF,
    0x20AC, NONE, NONE, NONE, NONE, NONE, NONE, 0x00DF,
    // 0xD0
    NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE,
    NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE,
    // 0xE0 combining
    0x0309, 0x0300, 0x0301, 0x0302, 0x0303, 0x0304, 0x0306, 0x0307,
    0x0308, 0x030C, 0x030A, 0xFE20, 0xFE21, 0x0315, 0x030B, 0x0310,
    // 0xF0 combining
    0x0327, 0x0328, 0x0323, 0x0324, 0x0325, 0x0333, 0x0332, 0x0326,
    0x031C, 0x032E, 0xFE22, 0xFE23, NONE, NONE, 0x0313, NONE,
];

const FIRST_COMBINING: u8 = 0xE0;

/// Table-driven ANSEL decoder
#[derive(Debug, Default, Clone, Copy)]
pub struct AnselDecoder;

impl AnselDecoder {
    fn lookup(byte: u8) -> char {
        match byte {
            0x00..=0x7F => byte as char,
            0x8D => '\u{200D}',
            0x8E => '\u{200C}',
            0x80..=0x9F => char::REPLACEMENT_CHARACTER,
            _ => char::from_u32(ANSEL_HIGH[(byte - 0xA0) as usize] as u32)
                .unwrap_or(char::REPLACEMENT_CHARACTER),
        }
    }

    #[inline]
    fn is_combining(byte: u8) -> bool {
        byte >= FIRST_COMBINING && ANSEL_HIGH[(byte - 0xA0) as usize] != NONE
    }
}

impl Decoder for AnselDecoder {
    fn name(&self) -> &str {
        "ANSEL"
    }

    fn decode(&self, bytes: &[u8]) -> String {
        let mut out = String::with_capacity(bytes.len());
        let mut pending: SmallVec<[char; 4]> = SmallVec::new();

        for &byte in bytes {
            if Self::is_combining(byte) {
                pending.push(Self::lookup(byte));
                continue;
            }
            let ch = Self::lookup(byte);
            // Marks never cross a line break
            if (ch == '\n' || ch == '\r') && !pending.is_empty() {
                out.extend(pending.drain(..));
                out.push(ch);
                continue;
            }
            out.push(ch);
            out.extend(pending.drain(..));
        }
        out.extend(pending.drain(..));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        assert_eq!(AnselDecoder.decode(b"0 @I1@ INDI\r\n"), "0 @I1@ INDI\r\n");
    }

    #[test]
    fn test_spacing_characters() {
        assert_eq!(AnselDecoder.decode(b"\xA1\xB1\xC3\xC7"), "\u{141}\u{142}\u{a9}\u{df}");
    }

    #[test]
    fn test_combining_mark_follows_base() {
        // "Jos" + acute + "e" -> "Jose\u{301}"
        assert_eq!(AnselDecoder.decode(b"Jos\xE2e"), "Jose\u{301}");
    }

    #[test]
    fn test_stacked_marks_keep_order() {
        assert_eq!(AnselDecoder.decode(b"\xE2\xE8u"), "u\u{301}\u{308}");
    }

    #[test]
    fn test_dangling_mark() {
        assert_eq!(AnselDecoder.decode(b"x\xE1"), "x\u{300}");
        assert_eq!(AnselDecoder.decode(b"a\xE3\nb"), "a\u{302}\nb");
    }

    #[test]
    fn test_unmapped_bytes() {
        assert_eq!(AnselDecoder.decode(b"\x80\xD5\xFC"), "\u{FFFD}\u{FFFD}\u{FFFD}");
    }
}
