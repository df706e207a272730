// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;

use thiserror::Error;

/// Result type for GEDCOM parsing
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a parse call.
///
/// Document invalidity (no well-formed lines, no records) is not an error;
/// see [`crate::Validity`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The generator is known to mislabel its output and this version has
    /// not been checked.
    #[error("Untrusted source: {generator} version {} is unknown, verify before proceeding", .version.as_deref().unwrap_or("<none>"))]
    UntrustedSource {
        generator: String,
        version: Option<String>,
    },

    #[error("Unrecognized encoding: {0}")]
    UnrecognizedEncoding(String),

    #[error("Line {line}: tag was not found")]
    MissingTag { line: usize },

    #[error("Line {line}: unrecognized character set {value:?}")]
    InvalidCharset { line: usize, value: String },

    #[error("Line {line}: more elements closed than opened")]
    StackUnderflow { line: usize },

    #[error("Parse error at {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("Event sink error: {0}")]
    Sink(String),
}

impl Error {
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            position,
            message: message.into(),
        }
    }

    /// Wrap a consumer-side failure.
    pub fn sink(err: impl fmt::Display) -> Self {
        Error::Sink(err.to_string())
    }

    /// Physical line the error refers to, when it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::MissingTag { line }
            | Error::InvalidCharset { line, .. }
            | Error::StackUnderflow { line } => Some(*line),
            Error::Parse { position, .. } if *position > 0 => Some(*position),
            _ => None,
        }
    }

    /// I/O class failures: the input could not be read or cannot be trusted.
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io(_) | Error::UntrustedSource { .. })
    }

    /// Structural failures raised while building the hierarchy.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::MissingTag { .. } | Error::InvalidCharset { .. } | Error::StackUnderflow { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_context() {
        assert_eq!(Error::MissingTag { line: 7 }.line(), Some(7));
        assert_eq!(Error::parse(0, "boom").line(), None);
        assert_eq!(Error::UnrecognizedEncoding("EBCDIC".into()).line(), None);
    }

    #[test]
    fn test_error_classes() {
        let untrusted = Error::UntrustedSource {
            generator: "Geni.com".into(),
            version: Some("2.0".into()),
        };
        assert!(untrusted.is_io());
        assert!(!untrusted.is_structural());
        assert!(Error::StackUnderflow { line: 3 }.is_structural());
        assert!(untrusted.to_string().contains("verify before proceeding"));
    }
}
