// LogDigest - core/export.rs
//
// CSV and JSON export of a run report.
// Core layer: writes to any Write trait object.

use crate::core::model::{ColorTag, RunReport, RunSummary};
use crate::util::error::ExportError;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Machine-readable export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

/// Export the report to `writer` in the given format.
///
/// `export_path` is used only for error context. Returns the number of
/// records written (sources for JSON, lines for CSV).
pub fn export_report<W: Write>(
    report: &RunReport,
    format: ExportFormat,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    match format {
        ExportFormat::Json => export_json(report, writer, export_path),
        ExportFormat::Csv => export_csv(report, writer, export_path),
    }
}

/// Export retained lines to CSV, one row per line.
///
/// Writes: category, description, path, line
pub fn export_csv<W: Write>(
    report: &RunReport,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let csv_err = |e: csv::Error| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };

    csv_writer
        .write_record(["category", "description", "path", "line"])
        .map_err(csv_err)?;

    let mut count = 0;
    for (category, source) in report.sources() {
        for line in &source.result.retained_lines {
            csv_writer
                .write_record([
                    category,
                    source.entry.description.as_str(),
                    source.entry.path.as_str(),
                    line.as_str(),
                ])
                .map_err(csv_err)?;
            count += 1;
        }
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    tracing::info!(path = %export_path.display(), rows = count, "CSV export complete");
    Ok(count)
}

#[derive(Serialize)]
struct JsonSource<'a> {
    category: &'a str,
    description: &'a str,
    path: &'a str,
    color: ColorTag,
    status: &'static str,
    error: Option<String>,
    total_lines_read: u64,
    lines_matched: u64,
    size_bytes: Option<u64>,
    modified: Option<String>,
    lines: &'a [String],
}

#[derive(Serialize)]
struct JsonSummary {
    sources_processed: usize,
    sources_unavailable: usize,
    sources_failed: usize,
    sources_empty: usize,
    lines_read: u64,
    lines_retained: u64,
    window_minutes: Option<u32>,
    cutoff: Option<String>,
    max_lines: u32,
    continuation: &'static str,
    time_filter_disabled: bool,
    registry_lines_skipped: usize,
}

impl From<&RunSummary> for JsonSummary {
    fn from(s: &RunSummary) -> Self {
        Self {
            sources_processed: s.sources_processed,
            sources_unavailable: s.sources_unavailable,
            sources_failed: s.sources_failed,
            sources_empty: s.sources_empty,
            lines_read: s.lines_read,
            lines_retained: s.lines_retained,
            window_minutes: s.window_minutes,
            cutoff: s.cutoff.map(|c| c.format("%Y-%m-%dT%H:%M:%S").to_string()),
            max_lines: s.max_lines,
            continuation: s.continuation.label(),
            time_filter_disabled: s.time_filter_disabled,
            registry_lines_skipped: s.registry_lines_skipped,
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    sources: Vec<JsonSource<'a>>,
    summary: JsonSummary,
}

/// Export the report to pretty-printed JSON.
pub fn export_json<W: Write>(
    report: &RunReport,
    mut writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let sources: Vec<JsonSource<'_>> = report
        .sources()
        .map(|(category, source)| {
            let result = &source.result;
            JsonSource {
                category,
                description: &source.entry.description,
                path: &source.entry.path,
                color: source.entry.color,
                status: result.status.label(),
                error: result.status.error().map(|e| e.reason()),
                total_lines_read: result.total_lines_read,
                lines_matched: result.lines_matched,
                size_bytes: result.metadata.map(|m| m.size_bytes),
                modified: result
                    .metadata
                    .and_then(|m| m.modified)
                    .map(|m| m.to_rfc3339()),
                lines: &result.retained_lines,
            }
        })
        .collect();
    let count = sources.len();

    let doc = JsonReport {
        sources,
        summary: JsonSummary::from(&report.summary),
    };

    serde_json::to_writer_pretty(&mut writer, &doc).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    tracing::info!(path = %export_path.display(), sources = count, "JSON export complete");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{CategorySection, FilterResult, SourceEntry, SourceReport, SourceStatus};
    use crate::util::error::SourceError;
    use std::path::PathBuf;

    fn sample_report() -> RunReport {
        let ok = SourceReport {
            entry: SourceEntry {
                category: "SERVER".to_string(),
                description: "Errors, mostly".to_string(),
                path: "/tmp/a.log".to_string(),
                color: ColorTag::Red,
            },
            result: FilterResult {
                path: PathBuf::from("/tmp/a.log"),
                total_lines_read: 3,
                lines_matched: 2,
                retained_lines: vec!["[2024-01-01 10:05:00] y".to_string(), "z".to_string()],
                status: SourceStatus::Read,
                metadata: None,
            },
        };
        let missing = SourceReport {
            entry: SourceEntry {
                category: "SERVER".to_string(),
                description: "Gone".to_string(),
                path: "/nope.log".to_string(),
                color: ColorTag::None,
            },
            result: FilterResult::unavailable(
                PathBuf::from("/nope.log"),
                SourceError::NotFound {
                    path: PathBuf::from("/nope.log"),
                },
            ),
        };
        RunReport {
            sections: vec![CategorySection {
                category: "SERVER".to_string(),
                sources: vec![ok, missing],
            }],
            summary: RunSummary {
                sources_processed: 2,
                sources_unavailable: 1,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_csv_one_row_per_line() {
        let mut buf = Vec::new();
        let rows = export_csv(&sample_report(), &mut buf, Path::new("out.csv")).unwrap();
        assert_eq!(rows, 2);
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "category,description,path,line");
        assert_eq!(
            lines[1],
            "SERVER,\"Errors, mostly\",/tmp/a.log,[2024-01-01 10:05:00] y"
        );
    }

    #[test]
    fn test_json_includes_unavailable_sources() {
        let mut buf = Vec::new();
        let count = export_report(
            &sample_report(),
            ExportFormat::Json,
            &mut buf,
            Path::new("out.json"),
        )
        .unwrap();
        assert_eq!(count, 2);
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        let sources = value["sources"].as_array().unwrap();
        assert_eq!(sources[0]["status"], "read");
        assert_eq!(sources[0]["color"], "RED");
        assert_eq!(sources[0]["lines"].as_array().unwrap().len(), 2);
        assert_eq!(sources[1]["status"], "unavailable");
        assert_eq!(sources[1]["error"], "file not found");
        assert_eq!(value["summary"]["sources_unavailable"], 1);
    }
}
