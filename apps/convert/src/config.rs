// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Converter configuration loaded from environment variables.

use gedcom_lite_core::config::{
    DEFAULT_PROGRESS_INTERVAL, DEFAULT_ROOT_ELEMENT, DEFAULT_SNIFF_LINE_LIMIT, DEFAULT_VALIDITY_WINDOW,
};
use gedcom_lite_core::ParserConfig;

/// Converter configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Leading lines in which garbage invalidates the document.
    pub validity_window: usize,
    /// Header lines scanned for the character set declaration.
    pub sniff_lines: usize,
    /// Log progress every this many lines.
    pub progress_interval: usize,
    /// Name of the document root element.
    pub root_element: String,
    /// Emit logs as JSON lines.
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            validity_window: std::env::var("GEDCOM_VALIDITY_WINDOW")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_VALIDITY_WINDOW),
            sniff_lines: std::env::var("GEDCOM_SNIFF_LINES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SNIFF_LINE_LIMIT),
            progress_interval: std::env::var("GEDCOM_PROGRESS_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PROGRESS_INTERVAL),
            root_element: std::env::var("GEDCOM_ROOT_ELEMENT")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ROOT_ELEMENT.into()),
            log_json: std::env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }

    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig::default()
            .with_validity_window(self.validity_window)
            .with_sniff_line_limit(self.sniff_lines)
            .with_progress_interval(self.progress_interval)
            .with_root_element(self.root_element.clone())
    }
}
