// LogDigest - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no platform
// dependencies.
//
// These types are the shared vocabulary across all layers.

use crate::util::error::SourceError;
use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

// =============================================================================
// Colour tag
// =============================================================================

/// Display colour attached to a registry entry.
///
/// The registry spells these in upper case; matching is case-sensitive and
/// any unrecognised value maps to `None` rather than failing the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColorTag {
    Red,
    Green,
    Yellow,
    Blue,
    Purple,
    Cyan,
    #[default]
    None,
}

impl ColorTag {
    /// Parse a registry colour field. Never fails.
    pub fn from_field(raw: &str) -> Self {
        match raw {
            "RED" => ColorTag::Red,
            "GREEN" => ColorTag::Green,
            "YELLOW" => ColorTag::Yellow,
            "BLUE" => ColorTag::Blue,
            "PURPLE" => ColorTag::Purple,
            "CYAN" => ColorTag::Cyan,
            _ => ColorTag::None,
        }
    }

    /// Registry spelling of the tag.
    pub fn label(&self) -> &'static str {
        match self {
            ColorTag::Red => "RED",
            ColorTag::Green => "GREEN",
            ColorTag::Yellow => "YELLOW",
            ColorTag::Blue => "BLUE",
            ColorTag::Purple => "PURPLE",
            ColorTag::Cyan => "CYAN",
            ColorTag::None => "NONE",
        }
    }
}

impl std::fmt::Display for ColorTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Registry
// =============================================================================

/// One registry record describing a single log file to digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Report grouping name.
    pub category: String,

    /// Free-text description shown in the source header.
    pub description: String,

    /// Path exactly as written by the operator (not validated).
    pub path: String,

    /// Display colour for the source header.
    pub color: ColorTag,
}

/// Ordered collection of source entries, built once per run.
///
/// Entries are kept in file order. The category set is always derived from
/// the entries, so the two can never disagree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: Vec<SourceEntry>,
}

impl Registry {
    pub fn new(entries: Vec<SourceEntry>) -> Self {
        Self { entries }
    }

    /// Entries in registry (file) order.
    pub fn entries(&self) -> &[SourceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct category names, sorted.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.entries.iter().map(|e| e.category.as_str()).collect()
    }

    /// Entries grouped by category in display order: categories sorted
    /// lexicographically, registry order preserved within each category.
    pub fn grouped(&self) -> BTreeMap<&str, Vec<&SourceEntry>> {
        let mut groups: BTreeMap<&str, Vec<&SourceEntry>> = BTreeMap::new();
        for entry in &self.entries {
            groups.entry(entry.category.as_str()).or_default().push(entry);
        }
        groups
    }
}

// =============================================================================
// Time window
// =============================================================================

/// An active "last N minutes" window, fixed to an absolute cutoff.
///
/// The cutoff is computed once when the window is created and never moves
/// for the rest of the run. `None` in an `Option<TimeWindow>` means no time
/// filtering at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Minutes requested by the operator.
    pub minutes: u32,

    /// Local wall-clock instant; timestamped lines strictly before it are
    /// excluded.
    pub cutoff: NaiveDateTime,
}

impl TimeWindow {
    /// Returns true if a timestamped line at `ts` falls inside the window.
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        ts >= self.cutoff
    }
}

// =============================================================================
// Continuation policy
// =============================================================================

/// How lines without a parseable leading timestamp are treated while a
/// time window is active. With no window every line is retained regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContinuationPolicy {
    /// Always retain continuation lines (continuation-inclusion law).
    #[default]
    Include,

    /// Follow the decision made for the nearest preceding timestamped line.
    /// Lines before the first timestamped line are retained.
    Inherit,

    /// Drop continuation lines.
    Exclude,
}

impl ContinuationPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            ContinuationPolicy::Include => "include",
            ContinuationPolicy::Inherit => "inherit",
            ContinuationPolicy::Exclude => "exclude",
        }
    }

    /// Parse a config/CLI spelling (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "include" => Some(ContinuationPolicy::Include),
            "inherit" => Some(ContinuationPolicy::Inherit),
            "exclude" => Some(ContinuationPolicy::Exclude),
            _ => None,
        }
    }
}

// =============================================================================
// Per-line and per-source results
// =============================================================================

/// Transient per-line classification produced during the filtering pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    pub raw_text: String,

    /// Leading timestamp. `None` marks a continuation line.
    pub timestamp: Option<NaiveDateTime>,

    /// Whether the time predicate retained the line.
    pub included: bool,
}

/// Size and modification time of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceMetadata {
    pub size_bytes: u64,
    pub modified: Option<DateTime<Local>>,
}

/// Outcome of filtering one source.
#[derive(Debug)]
pub enum SourceStatus {
    /// The file was read to the end.
    Read,

    /// The file exists but contains no lines.
    Empty,

    /// The file could not be opened. No lines were read.
    Unavailable(SourceError),

    /// Reading failed partway through. Partial results were discarded.
    Failed(SourceError),
}

impl SourceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SourceStatus::Read => "read",
            SourceStatus::Empty => "empty",
            SourceStatus::Unavailable(_) => "unavailable",
            SourceStatus::Failed(_) => "failed",
        }
    }

    pub fn error(&self) -> Option<&SourceError> {
        match self {
            SourceStatus::Unavailable(e) | SourceStatus::Failed(e) => Some(e),
            SourceStatus::Read | SourceStatus::Empty => None,
        }
    }
}

/// Per-source result, produced fresh on every run.
#[derive(Debug)]
pub struct FilterResult {
    /// Path that was actually opened (after home expansion).
    pub path: PathBuf,

    /// Physical lines read from the source.
    pub total_lines_read: u64,

    /// Lines accepted by the time predicate, before the line cap.
    pub lines_matched: u64,

    /// Final capped sequence, oldest first.
    pub retained_lines: Vec<String>,

    pub status: SourceStatus,

    /// File size and mtime, when the file could be stat'ed.
    pub metadata: Option<SourceMetadata>,
}

impl FilterResult {
    /// Result for a source that could not be opened.
    pub fn unavailable(path: PathBuf, error: SourceError) -> Self {
        Self {
            path,
            total_lines_read: 0,
            lines_matched: 0,
            retained_lines: Vec::new(),
            status: SourceStatus::Unavailable(error),
            metadata: None,
        }
    }

    /// Result for a source whose read failed mid-stream. Any lines read so
    /// far are dropped so the report never shows partial output.
    pub fn failed(path: PathBuf, error: SourceError, metadata: Option<SourceMetadata>) -> Self {
        Self {
            path,
            total_lines_read: 0,
            lines_matched: 0,
            retained_lines: Vec::new(),
            status: SourceStatus::Failed(error),
            metadata,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self.status, SourceStatus::Unavailable(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, SourceStatus::Failed(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.status, SourceStatus::Empty)
    }
}

// =============================================================================
// Run report
// =============================================================================

/// One source entry paired with its filter result.
#[derive(Debug)]
pub struct SourceReport {
    pub entry: SourceEntry,
    pub result: FilterResult,
}

/// All sources of one category, in registry order.
#[derive(Debug)]
pub struct CategorySection {
    pub category: String,
    pub sources: Vec<SourceReport>,
}

/// Run-level statistics and effective settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub sources_processed: usize,
    pub sources_unavailable: usize,
    pub sources_failed: usize,
    pub sources_empty: usize,
    pub lines_read: u64,
    pub lines_retained: u64,

    /// Requested window in minutes; `None` when no window was requested.
    pub window_minutes: Option<u32>,

    /// Effective cutoff, when time filtering was active.
    pub cutoff: Option<NaiveDateTime>,

    /// Per-source line cap (0 = unlimited).
    pub max_lines: u32,

    pub continuation: ContinuationPolicy,

    /// A window was requested but the clock failed, so filtering was off.
    pub time_filter_disabled: bool,

    /// Registry lines skipped as malformed.
    pub registry_lines_skipped: usize,
}

impl RunSummary {
    /// Add one source's outcome to the run counters.
    pub fn record(&mut self, result: &FilterResult) {
        self.sources_processed += 1;
        self.lines_read += result.total_lines_read;
        self.lines_retained += result.retained_lines.len() as u64;
        match result.status {
            SourceStatus::Unavailable(_) => self.sources_unavailable += 1,
            SourceStatus::Failed(_) => self.sources_failed += 1,
            SourceStatus::Empty => self.sources_empty += 1,
            SourceStatus::Read => {}
        }
    }
}

/// Complete result of one digest run, already in display order.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Sections sorted by category name.
    pub sections: Vec<CategorySection>,
    pub summary: RunSummary,
}

impl RunReport {
    /// Iterate over every source in display order.
    pub fn sources(&self) -> impl Iterator<Item = (&str, &SourceReport)> {
        self.sections.iter().flat_map(|section| {
            section
                .sources
                .iter()
                .map(move |source| (section.category.as_str(), source))
        })
    }
}
