// LogDigest - app/output.rs
//
// Report delivery: console plus an optional plain-text copy on disk.
// The two writers are independent; a failure of one is reported and the
// other still runs.

use crate::core::model::RunReport;
use crate::core::report::{render_report, ReportOptions};
use crate::util::error::OutputError;
use std::io::{self, Write};
use std::path::Path;

/// Write the report to `console` (coloured per `options`) and, when
/// `file` is set, a plain copy to that path.
///
/// Returns every writer failure; an empty Vec means both succeeded. A
/// console closed early by its reader is not a failure.
pub fn emit_report<W: Write>(
    report: &RunReport,
    options: &ReportOptions,
    mut console: W,
    file: Option<&Path>,
) -> Vec<OutputError> {
    let mut failures = Vec::new();

    let text = render_report(report, options);
    if let Err(source) = console
        .write_all(text.as_bytes())
        .and_then(|()| console.flush())
    {
        if source.kind() == io::ErrorKind::BrokenPipe {
            // Reader went away (`| head`); the rest of the report is unwanted.
            tracing::debug!("Console closed before the report was fully written");
        } else {
            tracing::warn!(error = %source, "Console output failed");
            failures.push(OutputError::Console { source });
        }
    }

    if let Some(path) = file {
        let plain = ReportOptions {
            color: false,
            ..*options
        };
        let text = if options.color {
            render_report(report, &plain)
        } else {
            text
        };
        match write_file(path, &text) {
            Ok(()) => tracing::info!(path = %path.display(), "Report written to file"),
            Err(source) => {
                tracing::warn!(path = %path.display(), error = %source, "Report file output failed");
                failures.push(OutputError::File {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }
    }

    failures
}

fn write_file(path: &Path, text: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)
}
