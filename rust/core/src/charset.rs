// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Character set names
//!
//! Canonical encodings a GEDCOM file can be decoded with, and the table of
//! `CHAR` tokens producers write for them.

use std::fmt;

use crate::error::{Error, Result};

/// Every `CHAR` value accepted, upper case
pub const RECOGNIZED_TOKENS: [&str; 15] = [
    "ANSEL",
    "ASCII",
    "ANSI",
    "UNICODE",
    "UTF-8",
    "UTF-16",
    "UTF-16BE",
    "MACINTOSH",
    "MACROMAN",
    "IBMPC",
    "IBM DOS",
    "IBM WINDOWS",
    "WINDOWS-1250",
    "WINDOWS-1251",
    "ATARIST_ASCII",
];

/// Decoding strategy for a GEDCOM byte stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Charset {
    /// ANSI Z39.47, the GEDCOM 5.x default
    Ansel,
    Ascii,
    /// Windows-1252
    Ansi,
    Windows1250,
    Windows1251,
    /// DOS code page 850
    IbmPc,
    Utf8,
    Utf16,
    /// Mac OS Roman
    Macintosh,
}

impl Charset {
    /// Look up a `CHAR` token (case-insensitive, surrounding blanks ignored)
    pub fn from_token(token: &str) -> Option<Self> {
        let upper = token.trim().to_ascii_uppercase();
        let charset = match normalize_token(&upper) {
            "ANSEL" => Self::Ansel,
            "ASCII" => Self::Ascii,
            "ANSI" | "IBM WINDOWS" => Self::Ansi,
            "WINDOWS-1250" => Self::Windows1250,
            "WINDOWS-1251" => Self::Windows1251,
            "IBMPC" | "IBM DOS" => Self::IbmPc,
            "UNICODE" | "UTF-16" => Self::Utf16,
            "UTF-8" => Self::Utf8,
            "MACINTOSH" => Self::Macintosh,
            _ => return None,
        };
        Some(charset)
    }

    /// Like [`Charset::from_token`], failing with `UnrecognizedEncoding`
    pub fn resolve(token: &str) -> Result<Self> {
        Self::from_token(token).ok_or_else(|| Error::UnrecognizedEncoding(token.trim().to_string()))
    }

    /// Canonical upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ansel => "ANSEL",
            Self::Ascii => "ASCII",
            Self::Ansi => "ANSI",
            Self::Windows1250 => "WINDOWS-1250",
            Self::Windows1251 => "WINDOWS-1251",
            Self::IbmPc => "IBMPC",
            Self::Utf8 => "UTF-8",
            Self::Utf16 => "UTF-16",
            Self::Macintosh => "MACINTOSH",
        }
    }

    /// Two bytes per code unit
    #[inline]
    pub fn is_wide(&self) -> bool {
        matches!(self, Self::Utf16)
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fold producer aliases onto the canonical spelling.
/// Expects an upper-case token.
pub fn normalize_token(upper: &str) -> &str {
    match upper {
        "ATARIST_ASCII" => "ASCII",
        "MACROMAN" => "MACINTOSH",
        "UTF-16BE" => "UTF-16",
        other => other,
    }
}

/// True when `value` is a `CHAR` token this parser knows
pub fn is_recognized_token(value: &str) -> bool {
    let upper = value.trim().to_ascii_uppercase();
    RECOGNIZED_TOKENS.contains(&upper.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_token() {
        assert_eq!(Charset::from_token("ANSEL"), Some(Charset::Ansel));
        assert_eq!(Charset::from_token("utf-8"), Some(Charset::Utf8));
        assert_eq!(Charset::from_token(" UNICODE "), Some(Charset::Utf16));
        assert_eq!(Charset::from_token("IBM WINDOWS"), Some(Charset::Ansi));
        assert_eq!(Charset::from_token("IBM DOS"), Some(Charset::IbmPc));
        assert_eq!(Charset::from_token("Windows-1251"), Some(Charset::Windows1251));
    }

    #[test]
    fn test_aliases() {
        assert_eq!(Charset::from_token("ATARIST_ASCII"), Some(Charset::Ascii));
        assert_eq!(Charset::from_token("MacRoman"), Some(Charset::Macintosh));
        assert_eq!(Charset::from_token("UTF-16BE"), Some(Charset::Utf16));
    }

    #[test]
    fn test_every_recognized_token_resolves() {
        for token in RECOGNIZED_TOKENS {
            assert!(Charset::from_token(token).is_some(), "{} did not resolve", token);
            assert!(is_recognized_token(&token.to_lowercase()));
        }
    }

    #[test]
    fn test_unknown_token() {
        assert_eq!(Charset::from_token("EBCDIC"), None);
        assert!(!is_recognized_token("LATIN1"));
        match Charset::resolve("EBCDIC ") {
            Err(Error::UnrecognizedEncoding(name)) => assert_eq!(name, "EBCDIC"),
            other => panic!("expected UnrecognizedEncoding, got {:?}", other),
        }
    }

    #[test]
    fn test_as_str_round_trips() {
        for charset in [
            Charset::Ansel,
            Charset::Ascii,
            Charset::Ansi,
            Charset::Windows1250,
            Charset::Windows1251,
            Charset::IbmPc,
            Charset::Utf8,
            Charset::Utf16,
            Charset::Macintosh,
        ] {
            assert_eq!(Charset::from_token(charset.as_str()), Some(charset));
        }
    }
}
