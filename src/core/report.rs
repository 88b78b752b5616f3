// LogDigest - core/report.rs
//
// Text rendering of a `RunReport`: one header per category (sorted), one
// header plus retained lines per source, then the run summary.
//
// Unavailable and failed sources always get an explicit marker; they are
// never silently omitted.

use crate::core::model::{ColorTag, RunReport, RunSummary, SourceReport, SourceStatus};
use crate::util::constants;
use colored::{Color, Colorize};
use std::fmt::{self, Write};

/// Rendering switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Show file size and modification time under each source header.
    pub show_metadata: bool,

    /// Emit ANSI colour sequences.
    pub color: bool,
}

/// Terminal colour for a registry colour tag.
pub fn terminal_color(tag: ColorTag) -> Option<Color> {
    match tag {
        ColorTag::Red => Some(Color::Red),
        ColorTag::Green => Some(Color::Green),
        ColorTag::Yellow => Some(Color::Yellow),
        ColorTag::Blue => Some(Color::Blue),
        ColorTag::Purple => Some(Color::Magenta),
        ColorTag::Cyan => Some(Color::Cyan),
        ColorTag::None => None,
    }
}

fn paint(text: &str, color: Option<Color>, bold: bool, enabled: bool) -> String {
    if !enabled {
        return text.to_string();
    }
    let styled = match color {
        Some(c) => text.color(c),
        None => text.normal(),
    };
    if bold {
        styled.bold().to_string()
    } else {
        styled.to_string()
    }
}

/// Render the full report to a string.
pub fn render_report(report: &RunReport, options: &ReportOptions) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, report, options);
    out
}

/// Render the full report into any `fmt::Write` sink.
pub fn write_report<W: Write>(
    out: &mut W,
    report: &RunReport,
    options: &ReportOptions,
) -> fmt::Result {
    let rule = "=".repeat(constants::REPORT_RULE_WIDTH);

    if report.sections.is_empty() {
        writeln!(out, "No log sources configured.")?;
        writeln!(out)?;
    }

    for section in &report.sections {
        writeln!(out, "{rule}")?;
        writeln!(
            out,
            " {}",
            paint(&section.category, None, true, options.color)
        )?;
        writeln!(out, "{rule}")?;

        for source in &section.sources {
            write_source(out, source, options)?;
        }
    }

    writeln!(out, "{rule}")?;
    write_summary(out, &report.summary, options)
}

fn write_source<W: Write>(out: &mut W, source: &SourceReport, options: &ReportOptions) -> fmt::Result {
    let entry = &source.entry;
    let result = &source.result;

    writeln!(out)?;
    let header = format!("--- {} ({})", entry.description, entry.path);
    writeln!(
        out,
        "{}",
        paint(&header, terminal_color(entry.color), true, options.color)
    )?;

    if options.show_metadata {
        if let Some(meta) = &result.metadata {
            let modified = meta
                .modified
                .map(|m| m.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "unknown".to_string());
            writeln!(
                out,
                "    size: {}, modified: {modified}",
                format_size(meta.size_bytes)
            )?;
        }
    }

    match &result.status {
        SourceStatus::Unavailable(err) => {
            let line = format!("{} {}", constants::UNAVAILABLE_MARKER, err.reason());
            writeln!(out, "{}", paint(&line, Some(Color::Red), true, options.color))?;
        }
        SourceStatus::Failed(err) => {
            let line = format!("{} {}", constants::FAILED_MARKER, err.reason());
            writeln!(out, "{}", paint(&line, Some(Color::Red), true, options.color))?;
        }
        SourceStatus::Empty => {
            let line = format!("{} file has no content", constants::EMPTY_MARKER);
            writeln!(out, "{}", paint(&line, Some(Color::Yellow), false, options.color))?;
        }
        SourceStatus::Read => {
            if options.show_metadata {
                writeln!(
                    out,
                    "    lines read: {}, matched: {}, shown: {}",
                    result.total_lines_read,
                    result.lines_matched,
                    result.retained_lines.len()
                )?;
            }
            if result.retained_lines.is_empty() {
                writeln!(out, "    (no lines in window)")?;
            }
            for line in &result.retained_lines {
                writeln!(out, "{line}")?;
            }
        }
    }

    Ok(())
}

fn write_summary<W: Write>(out: &mut W, summary: &RunSummary, options: &ReportOptions) -> fmt::Result {
    writeln!(out, "{}", paint("Summary", None, true, options.color))?;
    writeln!(out, "  Sources processed:   {}", summary.sources_processed)?;

    let unavailable = format!("  Sources unavailable: {}", summary.sources_unavailable);
    let flagged = summary.sources_unavailable > 0;
    writeln!(
        out,
        "{}",
        paint(&unavailable, flagged.then_some(Color::Red), false, options.color)
    )?;

    if summary.sources_failed > 0 {
        let failed = format!("  Sources failed:      {}", summary.sources_failed);
        writeln!(out, "{}", paint(&failed, Some(Color::Red), false, options.color))?;
    }
    if summary.sources_empty > 0 {
        writeln!(out, "  Sources empty:       {}", summary.sources_empty)?;
    }
    writeln!(
        out,
        "  Lines read/shown:    {}/{}",
        summary.lines_read, summary.lines_retained
    )?;
    writeln!(out, "  Time window:         {}", describe_window(summary))?;

    let cap = if summary.max_lines == 0 {
        "unlimited".to_string()
    } else {
        format!("last {} lines per source", summary.max_lines)
    };
    writeln!(out, "  Line cap:            {cap}")?;
    writeln!(
        out,
        "  Continuation lines:  {}",
        summary.continuation.label()
    )?;
    if summary.registry_lines_skipped > 0 {
        writeln!(
            out,
            "  Registry lines skipped: {}",
            summary.registry_lines_skipped
        )?;
    }
    Ok(())
}

fn describe_window(summary: &RunSummary) -> String {
    match (summary.window_minutes, summary.cutoff) {
        (None, _) => "none (all lines)".to_string(),
        (Some(minutes), _) if summary.time_filter_disabled => {
            format!("last {minutes} minutes requested; disabled (clock unavailable)")
        }
        (Some(minutes), Some(cutoff)) => format!(
            "last {minutes} minutes (since {})",
            cutoff.format("%Y-%m-%d %H:%M:%S")
        ),
        (Some(minutes), None) => format!("last {minutes} minutes"),
    }
}

/// Human-readable byte size (binary units).
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
