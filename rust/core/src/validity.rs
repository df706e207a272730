// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Document validity tracking
//!
//! Invalidity is advisory: the event stream is still completed and the
//! caller decides whether to keep the result.

use rustc_hash::FxHashMap;

/// Tags that close or introduce the document rather than holding data
const NON_RECORD_TAGS: [&str; 2] = ["HEAD", "TRLR"];

/// Why a document was flagged invalid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum InvalidReason {
    /// An unparseable line came before any well-formed one, early in the input
    NoWellFormedLines { line: usize },
    /// The document has no top-level records
    NoRecords,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Validity {
    Valid,
    Invalid(InvalidReason),
}

impl Validity {
    #[inline]
    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid)
    }
}

/// Observes the line stream for early structural failure and counts records
#[derive(Debug, Clone)]
pub struct ValidityTracker {
    window: usize,
    seen_well_formed: bool,
    records: usize,
    record_counts: FxHashMap<String, usize>,
    reason: Option<InvalidReason>,
}

impl ValidityTracker {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            seen_well_formed: false,
            records: 0,
            record_counts: FxHashMap::default(),
            reason: None,
        }
    }

    /// A line matched the record grammar
    #[inline]
    pub fn accept_line(&mut self) {
        self.seen_well_formed = true;
    }

    /// An unparseable line was read at physical `line`. Returns true when the
    /// document is invalid and parsing should stop.
    pub fn reject_line(&mut self, line: usize) -> bool {
        if !self.seen_well_formed && line <= self.window {
            self.flag(InvalidReason::NoWellFormedLines { line });
            return true;
        }
        false
    }

    /// An element was opened at `level`
    pub fn open_element(&mut self, level: u32, tag: &str) {
        if level == 0 && !NON_RECORD_TAGS.contains(&tag) {
            self.records += 1;
            *self.record_counts.entry(tag.to_string()).or_insert(0) += 1;
        }
    }

    pub fn seen_well_formed(&self) -> bool {
        self.seen_well_formed
    }

    pub fn records(&self) -> usize {
        self.records
    }

    /// Top-level records by tag
    pub fn record_counts(&self) -> &FxHashMap<String, usize> {
        &self.record_counts
    }

    /// Take the per-tag record counts
    pub fn take_record_counts(&mut self) -> FxHashMap<String, usize> {
        std::mem::take(&mut self.record_counts)
    }

    /// Verdict once the document is closed. The first reason found wins.
    pub fn finish(&mut self) -> Validity {
        if self.records == 0 {
            self.flag(InvalidReason::NoRecords);
        }
        match self.reason {
            Some(reason) => Validity::Invalid(reason),
            None => Validity::Valid,
        }
    }

    fn flag(&mut self, reason: InvalidReason) {
        if self.reason.is_none() {
            tracing::warn!(?reason, "Document flagged invalid");
            self.reason = Some(reason);
        }
    }
}
