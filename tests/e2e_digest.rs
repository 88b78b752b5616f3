// LogDigest - tests/e2e_digest.rs
//
// End-to-end tests for the registry -> filter -> report pipeline.
//
// These tests exercise the real filesystem, real registry parsing, and real
// chrono timestamp handling. The clock is pinned with `FixedClock` so every
// run is reproducible.

use chrono::NaiveDateTime;
use logdigest::app::digest::{digest, load_registry};
use logdigest::core::export::{export_report, ExportFormat};
use logdigest::core::filter::FilterConfig;
use logdigest::core::model::{ContinuationPolicy, RunReport};
use logdigest::core::registry::parse_registry;
use logdigest::core::report::{render_report, ReportOptions};
use logdigest::core::window::{compute_window, FixedClock};
use logdigest::run;
use std::fs;
use std::path::{Path, PathBuf};

// =============================================================================
// Helpers
// =============================================================================

/// Absolute path to the on-disk fixture files.
fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn write_log(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut text = lines.join("\n");
    text.push('\n');
    fs::write(&path, text).unwrap();
    path
}

fn retained(report: &RunReport, path: &Path) -> Vec<String> {
    report
        .sources()
        .find(|(_, s)| s.result.path == path)
        .map(|(_, s)| s.result.retained_lines.clone())
        .unwrap_or_else(|| panic!("no source for {}", path.display()))
}

fn plain() -> ReportOptions {
    ReportOptions {
        show_metadata: false,
        color: false,
    }
}

// =============================================================================
// Scenarios
// =============================================================================

/// Window of 3 minutes at 10:06 keeps the 10:05 line and the continuation.
#[test]
fn e2e_window_scenario_keeps_recent_and_continuation() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_log(
        dir.path(),
        "a.log",
        &[
            "[2024-01-01 10:00:00] x",
            "[2024-01-01 10:05:00] y",
            "continuation z",
        ],
    );
    let registry_text = format!("SERVER|Err|{}|RED\n", log.display());
    let (registry, skipped) = parse_registry(&registry_text, '|');
    assert!(skipped.is_empty());

    let clock = FixedClock(at("2024-01-01 10:06:00"));
    let window = compute_window(Some(3), &clock).unwrap();
    let report = run(&registry, window.as_ref(), 0);

    assert_eq!(
        retained(&report, &log),
        vec!["[2024-01-01 10:05:00] y", "continuation z"]
    );
    let (_, source) = report.sources().next().unwrap();
    assert_eq!(source.result.total_lines_read, 3);
    assert_eq!(source.result.lines_matched, 2);
}

/// maxLines = 1 with no window yields exactly the last line.
#[test]
fn e2e_line_cap_keeps_last_line() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_log(dir.path(), "five.log", &["1", "2", "3", "4", "5"]);
    let (registry, _) = parse_registry(&format!("A|five|{}|NONE\n", log.display()), '|');

    let report = run(&registry, None, 1);
    assert_eq!(retained(&report, &log), vec!["5"]);
}

/// Registry order Z, A renders A before Z.
#[test]
fn e2e_categories_render_sorted() {
    let dir = tempfile::tempdir().unwrap();
    let z = write_log(dir.path(), "z.log", &["zulu"]);
    let a = write_log(dir.path(), "a.log", &["alpha"]);
    let text = format!(
        "Z|Zed|{}|BLUE\nA|Ay|{}|GREEN\n",
        z.display(),
        a.display()
    );
    let (registry, _) = parse_registry(&text, '|');

    let report = run(&registry, None, 0);
    let categories: Vec<_> = report.sections.iter().map(|s| s.category.as_str()).collect();
    assert_eq!(categories, vec!["A", "Z"]);

    let rendered = render_report(&report, &plain());
    let a_pos = rendered.find("alpha").unwrap();
    let z_pos = rendered.find("zulu").unwrap();
    assert!(a_pos < z_pos);
}

/// Grouping depends only on category names, not on how entries interleave.
#[test]
fn e2e_grouping_independent_of_registry_interleaving() {
    let dir = tempfile::tempdir().unwrap();
    let a1 = write_log(dir.path(), "a1.log", &["a1"]);
    let a2 = write_log(dir.path(), "a2.log", &["a2"]);
    let b1 = write_log(dir.path(), "b1.log", &["b1"]);

    let order_one = format!(
        "B|b1|{}|NONE\nA|a1|{}|NONE\nA|a2|{}|NONE\n",
        b1.display(),
        a1.display(),
        a2.display()
    );
    let order_two = format!(
        "A|a1|{}|NONE\nB|b1|{}|NONE\nA|a2|{}|NONE\n",
        a1.display(),
        b1.display(),
        a2.display()
    );

    let layout = |text: &str| -> Vec<(String, Vec<String>)> {
        let (registry, _) = parse_registry(text, '|');
        run(&registry, None, 0)
            .sections
            .iter()
            .map(|s| {
                (
                    s.category.clone(),
                    s.sources.iter().map(|r| r.entry.description.clone()).collect(),
                )
            })
            .collect()
    };

    let expected = vec![
        ("A".to_string(), vec!["a1".to_string(), "a2".to_string()]),
        ("B".to_string(), vec!["b1".to_string()]),
    ];
    assert_eq!(layout(&order_one), expected);
    assert_eq!(layout(&order_two), expected);
}

/// A missing source is reported with a marker; the other sources still run.
#[test]
fn e2e_missing_source_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let present = write_log(dir.path(), "present.log", &["still here"]);
    let missing = dir.path().join("gone.log");
    let text = format!(
        "APP|Gone|{}|RED\nAPP|Present|{}|GREEN\n",
        missing.display(),
        present.display()
    );
    let (registry, _) = parse_registry(&text, '|');

    let report = run(&registry, None, 0);
    let (_, gone) = report
        .sources()
        .find(|(_, s)| s.entry.description == "Gone")
        .unwrap();
    assert!(gone.result.is_unavailable());
    assert!(!gone.result.is_failed());
    assert_eq!(gone.result.total_lines_read, 0);
    assert!(gone.result.retained_lines.is_empty());
    assert_eq!(retained(&report, &present), vec!["still here"]);
    assert_eq!(report.summary.sources_unavailable, 1);
    assert_eq!(report.summary.sources_processed, 2);

    let rendered = render_report(&report, &plain());
    assert!(rendered.contains("[UNAVAILABLE]"));
    assert!(rendered.contains(&missing.display().to_string()));
}

/// Two runs over unchanged inputs with a fixed clock are identical.
#[test]
fn e2e_runs_are_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let registry_path = dir.path().join("sources.conf");
    fs::write(
        &registry_path,
        format!("APP|Sample|{}|CYAN\n", fixture("app_sample.log").display()),
    )
    .unwrap();

    let clock = FixedClock(at("2024-06-01 09:20:00"));
    let config = FilterConfig {
        max_lines: 4,
        ..Default::default()
    };
    let once = || {
        let (registry, skipped) = load_registry(&registry_path, '|').unwrap();
        let report = digest(&registry, skipped.len(), Some(5), &clock, &config);
        render_report(&report, &plain())
    };
    assert_eq!(once(), once());
}

// =============================================================================
// Fixture: multi-line entries
// =============================================================================

#[test]
fn e2e_fixture_window_keeps_stack_trace() {
    let log = fixture("app_sample.log");
    let (registry, _) = parse_registry(&format!("APP|Sample|{}|CYAN\n", log.display()), '|');
    let clock = FixedClock(at("2024-06-01 09:20:00"));

    let report = digest(&registry, 0, Some(5), &clock, &FilterConfig::default());
    let lines = retained(&report, &log);
    assert_eq!(lines.len(), 7);
    assert_eq!(lines[0], "[2024-06-01 09:15:42] ERROR request failed");
    assert_eq!(lines[1], "java.lang.IllegalStateException: pool exhausted");
    assert_eq!(lines[6], "[2024-06-01 09:17:05] INFO request succeeded");
    assert_eq!(report.summary.lines_read, 9);
}

#[test]
fn e2e_fixture_inherit_policy_drops_orphaned_trace() {
    let log = fixture("app_sample.log");
    let (registry, _) = parse_registry(&format!("APP|Sample|{}|CYAN\n", log.display()), '|');
    // Cutoff 09:16:10 excludes the 09:15:42 error and the 09:16:00 retry.
    let clock = FixedClock(at("2024-06-01 09:20:10"));

    let include = digest(&registry, 0, Some(4), &clock, &FilterConfig::default());
    assert_eq!(
        retained(&include, &log),
        vec![
            "java.lang.IllegalStateException: pool exhausted",
            "    at com.example.Pool.acquire(Pool.java:88)",
            "    at com.example.Handler.handle(Handler.java:21)",
            "[2024-13-01 09:16:30] malformed stamp treated as continuation",
            "[2024-06-01 09:17:05] INFO request succeeded",
        ]
    );

    let inherit = digest(
        &registry,
        0,
        Some(4),
        &clock,
        &FilterConfig {
            continuation: ContinuationPolicy::Inherit,
            ..Default::default()
        },
    );
    assert_eq!(
        retained(&inherit, &log),
        vec!["[2024-06-01 09:17:05] INFO request succeeded"]
    );

    // Without a window the policy is irrelevant.
    let everything = digest(
        &registry,
        0,
        None,
        &clock,
        &FilterConfig {
            continuation: ContinuationPolicy::Exclude,
            ..Default::default()
        },
    );
    assert_eq!(retained(&everything, &log).len(), 9);
}

// =============================================================================
// Registry file handling
// =============================================================================

#[test]
fn e2e_registry_with_bad_lines_still_runs() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_log(dir.path(), "ok.log", &["fine"]);
    let registry_path = dir.path().join("sources.conf");
    fs::write(
        &registry_path,
        format!(
            "# comment\n\nthis line is broken\nOK|Fine|{}|GREEN\nALSO|broken|too\n",
            log.display()
        ),
    )
    .unwrap();

    let (registry, skipped) = load_registry(&registry_path, '|').unwrap();
    assert_eq!(registry.len(), 1);
    assert_eq!(skipped.len(), 2);

    let report = digest(
        &registry,
        skipped.len(),
        None,
        &FixedClock(at("2024-01-01 00:00:00")),
        &FilterConfig::default(),
    );
    assert_eq!(report.summary.registry_lines_skipped, 2);
    assert!(render_report(&report, &plain()).contains("Registry lines skipped: 2"));
}

#[test]
fn e2e_missing_registry_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_registry(&dir.path().join("nope.conf"), '|');
    assert!(matches!(
        result,
        Err(logdigest::util::error::RegistryError::NotFound { .. })
    ));
}

// =============================================================================
// Export
// =============================================================================

#[test]
fn e2e_csv_export_matches_retained_lines() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_log(dir.path(), "a.log", &["one", "two", "three"]);
    let (registry, _) = parse_registry(&format!("A|Alpha|{}|RED\n", log.display()), '|');
    let report = run(&registry, None, 2);

    let export_path = dir.path().join("digest.csv");
    let file = fs::File::create(&export_path).unwrap();
    let rows = export_report(&report, ExportFormat::Csv, file, &export_path).unwrap();
    assert_eq!(rows, 2);

    let text = fs::read_to_string(&export_path).unwrap();
    let last_fields: Vec<_> = text
        .lines()
        .skip(1)
        .map(|l| l.rsplit(',').next().unwrap().to_string())
        .collect();
    assert_eq!(last_fields, vec!["two", "three"]);
}
