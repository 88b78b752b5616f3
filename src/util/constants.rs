// LogDigest - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogDigest";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "LogDigest";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Registry
// =============================================================================

/// Default field delimiter between `CATEGORY|DESCRIPTION|PATH|COLOR`.
pub const DEFAULT_REGISTRY_DELIMITER: char = '|';

/// Number of fields every registry record must carry.
pub const REGISTRY_FIELD_COUNT: usize = 4;

/// Prefix marking a registry line as a comment.
pub const REGISTRY_COMMENT_PREFIX: char = '#';

/// Default registry file name (inside the platform config directory).
pub const REGISTRY_FILE_NAME: &str = "sources.conf";

/// Maximum size of a registry file in bytes. A registry is a handful of
/// lines; anything larger is almost certainly the wrong file.
pub const MAX_REGISTRY_FILE_SIZE: u64 = 1024 * 1024; // 1 MB

/// Maximum number of source entries accepted from one registry.
pub const MAX_REGISTRY_ENTRIES: usize = 1_000;

// =============================================================================
// Time window and line cap
// =============================================================================

/// Smallest accepted "last N minutes" value.
pub const MIN_WINDOW_MINUTES: u32 = 1;

/// Largest accepted "last N minutes" value (one year).
pub const MAX_WINDOW_MINUTES: u32 = 525_600;

/// Default per-source line cap. 0 means unlimited.
pub const DEFAULT_MAX_LINES: u32 = 0;

/// Leading timestamp format recognised on log lines, e.g.
/// `[2024-01-01 10:05:00] message`.
pub const LINE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Source reading limits
// =============================================================================

/// Read buffer size in bytes for streaming source reads.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 64 * 1024; // 64 KB

/// Maximum length of a single retained line in bytes. Bytes past the limit
/// are skipped while reading, so a file without newlines is never held in
/// memory whole.
pub const MAX_LINE_BYTES: usize = 64 * 1024; // 64 KB

/// Marker appended to lines truncated at `MAX_LINE_BYTES`.
pub const TRUNCATION_MARKER: &str = "... [truncated]";

// =============================================================================
// Report
// =============================================================================

/// Width of the separator rule drawn under category headers.
pub const REPORT_RULE_WIDTH: usize = 72;

/// Marker shown in place of lines for a source that could not be opened.
pub const UNAVAILABLE_MARKER: &str = "[UNAVAILABLE]";

/// Marker shown in place of lines for a source whose read failed mid-stream.
pub const FAILED_MARKER: &str = "[READ FAILED]";

/// Marker shown for a source that exists but has no content.
pub const EMPTY_MARKER: &str = "[EMPTY]";

/// Environment variable that disables ANSI colour when set (no-color.org).
pub const NO_COLOR_ENV: &str = "NO_COLOR";

// =============================================================================
// Logging
// =============================================================================

/// Default log level. Diagnostics go to stderr; stdout carries the report,
/// so only warnings surface unless asked for.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Valid values for `[logging] level`.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Maximum size of config.toml in bytes.
pub const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024; // 64 KB
