// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Byte decoders and the registry that selects them by charset
//!
//! Each [`Charset`] maps to one [`Decoder`]. The built-in decoders are
//! registered by default; callers can swap any of them, e.g. to plug in a
//! different ANSEL implementation.

use rustc_hash::FxHashMap;

use crate::ansel::AnselDecoder;
use crate::charset::Charset;
use crate::codepage::SingleByteDecoder;
use crate::error::{Error, Result};

/// Converts raw bytes into text
pub trait Decoder: Send + Sync {
    /// Name for diagnostics
    fn name(&self) -> &str;

    /// Decode the whole buffer. Undecodable input becomes U+FFFD.
    fn decode(&self, bytes: &[u8]) -> String;
}

/// 7-bit ASCII; anything above 0x7F is replaced
#[derive(Debug, Default, Clone, Copy)]
pub struct AsciiDecoder;

impl Decoder for AsciiDecoder {
    fn name(&self) -> &str {
        "ASCII"
    }

    fn decode(&self, bytes: &[u8]) -> String {
        bytes
            .iter()
            .map(|&b| if b.is_ascii() { b as char } else { char::REPLACEMENT_CHARACTER })
            .collect()
    }
}

/// UTF-8, lossy, byte order mark dropped
#[derive(Debug, Default, Clone, Copy)]
pub struct Utf8Decoder;

impl Decoder for Utf8Decoder {
    fn name(&self) -> &str {
        "UTF-8"
    }

    fn decode(&self, bytes: &[u8]) -> String {
        let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
        String::from_utf8_lossy(bytes).into_owned()
    }
}

/// Byte order of a UTF-16 stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

/// Detect UTF-16 byte order from a BOM or from where the zero byte of the
/// first (ASCII) code unit sits. Returns the order and the BOM length.
pub fn utf16_byte_order(bytes: &[u8]) -> (ByteOrder, usize) {
    match bytes {
        [0xFF, 0xFE, ..] => (ByteOrder::Little, 2),
        [0xFE, 0xFF, ..] => (ByteOrder::Big, 2),
        [0x00, b, ..] if *b != 0 => (ByteOrder::Big, 0),
        [a, 0x00, ..] if *a != 0 => (ByteOrder::Little, 0),
        _ => (ByteOrder::Big, 0),
    }
}

/// Split UTF-16 bytes into code units, ignoring a trailing odd byte
pub fn utf16_units(bytes: &[u8], order: ByteOrder) -> impl Iterator<Item = u16> + '_ {
    bytes.chunks_exact(2).map(move |pair| match order {
        ByteOrder::Little => u16::from_le_bytes([pair[0], pair[1]]),
        ByteOrder::Big => u16::from_be_bytes([pair[0], pair[1]]),
    })
}

/// UTF-16 of either byte order, lossy
#[derive(Debug, Default, Clone, Copy)]
pub struct Utf16Decoder;

impl Decoder for Utf16Decoder {
    fn name(&self) -> &str {
        "UTF-16"
    }

    fn decode(&self, bytes: &[u8]) -> String {
        let (order, bom) = utf16_byte_order(bytes);
        let mut text: String = char::decode_utf16(utf16_units(&bytes[bom..], order))
            .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();
        if bytes.len() > bom && (bytes.len() - bom) % 2 != 0 {
            text.push(char::REPLACEMENT_CHARACTER);
        }
        text
    }
}

/// Charset -> decoder table
pub struct DecoderRegistry {
    decoders: FxHashMap<Charset, Box<dyn Decoder>>,
}

impl DecoderRegistry {
    /// Registry without any decoder
    pub fn empty() -> Self {
        Self {
            decoders: FxHashMap::default(),
        }
    }

    /// Replace the decoder used for `charset`
    pub fn register(&mut self, charset: Charset, decoder: Box<dyn Decoder>) -> &mut Self {
        self.decoders.insert(charset, decoder);
        self
    }

    pub fn get(&self, charset: Charset) -> Option<&dyn Decoder> {
        self.decoders.get(&charset).map(|d| d.as_ref())
    }

    /// Decode `bytes` with the decoder registered for `charset`
    pub fn decode(&self, charset: Charset, bytes: &[u8]) -> Result<String> {
        let decoder = self
            .get(charset)
            .ok_or_else(|| Error::UnrecognizedEncoding(charset.as_str().to_string()))?;
        Ok(decoder.decode(bytes))
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register(Charset::Ansel, Box::new(AnselDecoder))
            .register(Charset::Ascii, Box::new(AsciiDecoder))
            .register(Charset::Ansi, Box::new(SingleByteDecoder::windows_1252()))
            .register(Charset::Windows1250, Box::new(SingleByteDecoder::windows_1250()))
            .register(Charset::Windows1251, Box::new(SingleByteDecoder::windows_1251()))
            .register(Charset::IbmPc, Box::new(SingleByteDecoder::cp850()))
            .register(Charset::Macintosh, Box::new(SingleByteDecoder::mac_roman()))
            .register(Charset::Utf8, Box::new(Utf8Decoder))
            .register(Charset::Utf16, Box::new(Utf16Decoder));
        registry
    }
}

impl std::fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.decoders.iter().map(|(c, d)| (c.as_str(), d.name())).collect();
        names.sort_unstable();
        f.debug_map().entries(names).finish()
    }
}
