// LogDigest - app/digest.rs
//
// Digest run orchestration. Walks the registry in display order, filters
// each source independently and assembles the `RunReport`.
//
// Error policy:
//   - Every per-source condition (missing file, open failure, mid-read I/O
//     error) is recovered here and recorded on that source's result.
//   - A clock failure disables time filtering for the run; it never aborts.
//   - Sources are processed sequentially and share no mutable state, so
//     the order results are produced in never affects the report.

use crate::core::filter::{self, FilterConfig};
use crate::core::model::{
    CategorySection, FilterResult, Registry, RunReport, RunSummary, SourceMetadata, SourceReport,
    SourceStatus, TimeWindow,
};
use crate::core::registry;
use crate::core::window::{self, Clock};
use crate::platform::fs;
use crate::util::error::RegistryError;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Read and parse the registry file.
///
/// Fails only when the file itself cannot be read. Malformed lines come
/// back in the second tuple element and have already been logged.
pub fn load_registry(
    path: &Path,
    delimiter: char,
) -> Result<(Registry, Vec<RegistryError>), RegistryError> {
    let text = fs::read_registry_file(path)?;
    let (registry, skipped) = registry::parse_registry(&text, delimiter);
    tracing::info!(
        path = %path.display(),
        sources = registry.len(),
        categories = registry.categories().len(),
        skipped = skipped.len(),
        "Registry loaded"
    );
    Ok((registry, skipped))
}

/// Digest `registry` with a fixed window and line cap, using the default
/// continuation policy.
pub fn run(registry: &Registry, window: Option<&TimeWindow>, max_lines: u32) -> RunReport {
    let config = FilterConfig {
        max_lines,
        ..Default::default()
    };
    run_with_config(registry, window, &config)
}

/// Digest `registry` with full filter configuration.
pub fn run_with_config(
    registry: &Registry,
    window: Option<&TimeWindow>,
    config: &FilterConfig,
) -> RunReport {
    let started = Instant::now();
    let mut summary = RunSummary {
        window_minutes: window.map(|w| w.minutes),
        cutoff: window.map(|w| w.cutoff),
        max_lines: config.max_lines,
        continuation: config.continuation,
        ..Default::default()
    };

    let mut sections = Vec::new();
    for (category, entries) in registry.grouped() {
        let mut sources = Vec::with_capacity(entries.len());
        for entry in entries {
            let result = filter_source_file(&entry.path, window, config);

            summary.record(&result);

            sources.push(SourceReport {
                entry: entry.clone(),
                result,
            });
        }
        sections.push(CategorySection {
            category: category.to_string(),
            sources,
        });
    }

    tracing::info!(
        sources = summary.sources_processed,
        unavailable = summary.sources_unavailable,
        failed = summary.sources_failed,
        lines_read = summary.lines_read,
        lines_retained = summary.lines_retained,
        duration_ms = started.elapsed().as_millis() as u64,
        "Digest complete"
    );

    RunReport { sections, summary }
}

/// Compute the window for a "last N minutes" request.
///
/// On clock failure the error is logged and filtering is disabled; the
/// second tuple element reports that it happened.
pub fn resolve_window(minutes: Option<u32>, clock: &dyn Clock) -> (Option<TimeWindow>, bool) {
    match window::compute_window(minutes, clock) {
        Ok(window) => (window, false),
        Err(e) => {
            tracing::warn!(error = %e, "Time filtering disabled for this run");
            (None, true)
        }
    }
}

/// Full run: resolve the window from `clock`, digest every source, and
/// record run-level settings in the summary.
pub fn digest(
    registry: &Registry,
    registry_lines_skipped: usize,
    minutes: Option<u32>,
    clock: &dyn Clock,
    config: &FilterConfig,
) -> RunReport {
    let (window, disabled) = resolve_window(minutes, clock);
    let mut report = run_with_config(registry, window.as_ref(), config);
    report.summary.window_minutes = minutes;
    report.summary.time_filter_disabled = disabled;
    report.summary.registry_lines_skipped = registry_lines_skipped;
    report
}

/// Filter one source file. Never fails: every problem is recorded on the
/// returned result.
pub fn filter_source_file(
    raw_path: &str,
    window: Option<&TimeWindow>,
    config: &FilterConfig,
) -> FilterResult {
    let path = fs::expand_home(raw_path);

    match fs::open_source(&path) {
        Ok((reader, metadata)) => filter_opened_source(reader, path, Some(metadata), window, config),
        Err(e) if e.is_unavailable() => {
            tracing::warn!(path = %path.display(), error = %e, "Source unavailable");
            FilterResult::unavailable(path, e)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Source read failed");
            FilterResult::failed(path, e, None)
        }
    }
}

/// Filter an already opened source. A read failure discards every line
/// read so far and marks the source failed.
pub fn filter_opened_source<R: BufRead>(
    reader: R,
    path: PathBuf,
    metadata: Option<SourceMetadata>,
    window: Option<&TimeWindow>,
    config: &FilterConfig,
) -> FilterResult {
    match filter::filter_lines(reader, &path, window, config) {
        Ok(lines) => {
            let status = if lines.total_lines_read == 0 {
                SourceStatus::Empty
            } else {
                SourceStatus::Read
            };
            FilterResult {
                path,
                total_lines_read: lines.total_lines_read,
                lines_matched: lines.lines_matched,
                retained_lines: lines.retained,
                status,
                metadata,
            }
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Source read failed; output discarded");
            FilterResult::failed(path, e, metadata)
        }
    }
}
