// LogDigest - core/filter.rs
//
// Per-source filtering: the time predicate followed by the line cap.
// Core layer: accepts BufRead trait objects, never touches the filesystem
// directly.
//
// Order of operations is fixed: every line goes through the time predicate
// first; the cap then keeps the last `max_lines` lines that survived it.
// The cap is applied with a bounded ring buffer while streaming, which gives
// the same result as capping after the full pass without holding every
// retained line in memory.

use crate::core::model::{ContinuationPolicy, LineRecord, TimeWindow};
use crate::core::timestamp::extract_timestamp;
use crate::util::constants;
use crate::util::error::SourceError;
use std::collections::VecDeque;
use std::io::{self, BufRead};
use std::path::Path;

/// Configuration for filtering a single source.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Keep at most this many of the most recent retained lines (0 = all).
    pub max_lines: u32,

    /// Treatment of lines without a leading timestamp.
    pub continuation: ContinuationPolicy,

    /// Lines longer than this are truncated.
    pub max_line_bytes: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_lines: constants::DEFAULT_MAX_LINES,
            continuation: ContinuationPolicy::default(),
            max_line_bytes: constants::MAX_LINE_BYTES,
        }
    }
}

/// Lines kept from one source plus the counters behind them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredLines {
    pub total_lines_read: u64,

    /// Lines accepted by the time predicate (before capping).
    pub lines_matched: u64,

    /// Retained lines after capping, oldest first.
    pub retained: Vec<String>,
}

/// Classify one line against the window.
///
/// `previous_included` is the decision for the nearest preceding timestamped
/// line and only matters under `ContinuationPolicy::Inherit`.
pub fn classify_line(
    line: &str,
    window: Option<&TimeWindow>,
    policy: ContinuationPolicy,
    previous_included: bool,
) -> LineRecord {
    let timestamp = extract_timestamp(line);

    let included = match (window, timestamp) {
        (None, _) => true,
        (Some(w), Some(ts)) => w.contains(ts),
        (Some(_), None) => match policy {
            ContinuationPolicy::Include => true,
            ContinuationPolicy::Inherit => previous_included,
            ContinuationPolicy::Exclude => false,
        },
    };

    LineRecord {
        raw_text: line.to_string(),
        timestamp,
        included,
    }
}

/// Stream `reader` line by line, applying the time predicate and line cap.
///
/// Invalid UTF-8 is replaced rather than rejected. A trailing `\r` is
/// stripped so CRLF files render cleanly. An I/O error partway through
/// returns `SourceError::ReadFailure`; the caller discards whatever was read.
pub fn filter_lines<R: BufRead>(
    mut reader: R,
    path: &Path,
    window: Option<&TimeWindow>,
    config: &FilterConfig,
) -> Result<FilteredLines, SourceError> {
    let cap = config.max_lines as usize;
    let mut kept: VecDeque<String> = VecDeque::with_capacity(cap.min(1024));
    let mut total_lines_read: u64 = 0;
    let mut lines_matched: u64 = 0;
    let mut previous_included = true;
    let mut buf: Vec<u8> = Vec::new();

    loop {
        buf.clear();
        let (consumed, overflowed) = read_line_bounded(&mut reader, &mut buf, config.max_line_bytes)
            .map_err(|source| SourceError::ReadFailure {
                path: path.to_path_buf(),
                line_number: total_lines_read,
                source,
            })?;
        if consumed == 0 {
            break;
        }
        total_lines_read += 1;

        let line = finish_line(&mut buf, overflowed, config.max_line_bytes);
        let record = classify_line(&line, window, config.continuation, previous_included);
        if record.timestamp.is_some() {
            previous_included = record.included;
        }
        if !record.included {
            continue;
        }
        lines_matched += 1;

        if cap > 0 && kept.len() == cap {
            kept.pop_front();
        }
        kept.push_back(record.raw_text);
    }

    tracing::debug!(
        file = %path.display(),
        lines = total_lines_read,
        matched = lines_matched,
        retained = kept.len(),
        "Source filtered"
    );

    Ok(FilteredLines {
        total_lines_read,
        lines_matched,
        retained: kept.into(),
    })
}

/// Read one physical line into `buf` without its `\n`, keeping at most
/// `max_bytes + 1` bytes. The remainder of a longer line is consumed and
/// discarded, so memory stays bounded even for files without newlines.
///
/// Returns the bytes consumed from `reader` (0 at end of input) and whether
/// content was discarded.
fn read_line_bounded<R: BufRead>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max_bytes: usize,
) -> io::Result<(usize, bool)> {
    // One spare byte so a trailing '\r' never counts against the limit.
    let keep_limit = max_bytes.saturating_add(1);
    let mut consumed = 0;
    let mut overflowed = false;

    loop {
        let available = match reader.fill_buf() {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if available.is_empty() {
            return Ok((consumed, overflowed));
        }

        let newline = available.iter().position(|&b| b == b'\n');
        let content = match newline {
            Some(i) => &available[..i],
            None => available,
        };
        let room = keep_limit.saturating_sub(buf.len());
        let keep = content.len().min(room);
        buf.extend_from_slice(&content[..keep]);
        overflowed |= keep < content.len();

        let used = newline.map_or(available.len(), |i| i + 1);
        reader.consume(used);
        consumed += used;
        if newline.is_some() {
            return Ok((consumed, overflowed));
        }
    }
}

/// Strip a trailing `\r`, cap the line at `max_bytes` on a char boundary
/// and decode it, replacing invalid UTF-8.
fn finish_line(buf: &mut Vec<u8>, overflowed: bool, max_bytes: usize) -> String {
    if !overflowed && buf.last() == Some(&b'\r') {
        buf.pop();
    }
    if !overflowed && buf.len() <= max_bytes {
        return String::from_utf8_lossy(buf).into_owned();
    }

    let mut cut = max_bytes.min(buf.len());
    while cut > 0 && cut < buf.len() && (buf[cut] & 0xC0) == 0x80 {
        cut -= 1;
    }
    buf.truncate(cut);
    let mut line = String::from_utf8_lossy(buf).into_owned();
    line.push_str(constants::TRUNCATION_MARKER);
    line
}
