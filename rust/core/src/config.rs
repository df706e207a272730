// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parser tuning knobs

use crate::error::{Error, Result};

/// Physical lines within which at least one well-formed line must appear
pub const DEFAULT_VALIDITY_WINDOW: usize = 20;

/// Lines read while looking for the header's `CHAR` declaration
pub const DEFAULT_SNIFF_LINE_LIMIT: usize = 100;

/// Lines between two progress log records
pub const DEFAULT_PROGRESS_INTERVAL: usize = 10_000;

/// Name of the synthetic element wrapping the whole document
pub const DEFAULT_ROOT_ELEMENT: &str = "GED";

/// Parser configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// An unparseable line inside this many leading lines, before any
    /// well-formed one, marks the document invalid.
    pub validity_window: usize,
    /// Header lines scanned by the encoding sniffer.
    pub sniff_line_limit: usize,
    /// Progress is logged every this many lines (0 disables).
    pub progress_interval: usize,
    /// Root element name.
    pub root_element: String,
}

impl ParserConfig {
    pub fn with_validity_window(mut self, lines: usize) -> Self {
        self.validity_window = lines;
        self
    }

    pub fn with_sniff_line_limit(mut self, lines: usize) -> Self {
        self.sniff_line_limit = lines;
        self
    }

    pub fn with_progress_interval(mut self, lines: usize) -> Self {
        self.progress_interval = lines;
        self
    }

    pub fn with_root_element(mut self, name: impl Into<String>) -> Self {
        self.root_element = name.into();
        self
    }

    /// Reject settings that cannot produce a usable event stream
    pub fn validate(&self) -> Result<()> {
        let root = self.root_element.as_str();
        if root.is_empty() || root.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(Error::parse(0, format!("invalid root element name {:?}", root)));
        }
        Ok(())
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            validity_window: DEFAULT_VALIDITY_WINDOW,
            sniff_line_limit: DEFAULT_SNIFF_LINE_LIMIT,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            root_element: DEFAULT_ROOT_ELEMENT.to_string(),
        }
    }
}
