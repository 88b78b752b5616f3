// LogDigest - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation.
// All errors preserve the causal chain for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::SystemTimeError;

/// Top-level error type for all LogDigest operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum LogDigestError {
    /// Registry loading or parsing failed.
    Registry(RegistryError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// Export operation failed.
    Export(ExportError),

    /// Writing the rendered report failed.
    Output(OutputError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for LogDigestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry(e) => write!(f, "Registry error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Output(e) => write!(f, "Output error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for LogDigestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Registry(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Output(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry errors
// ---------------------------------------------------------------------------

/// Errors related to the source registry.
///
/// `MalformedLine` and `TooManyEntries` are non-fatal: the offending line is
/// skipped and the run continues. The file-level variants are fatal because
/// without a registry there is nothing to report on.
#[derive(Debug)]
pub enum RegistryError {
    /// A record did not split into the expected number of fields.
    MalformedLine {
        line_number: usize,
        found: usize,
        expected: usize,
    },

    /// The registry holds more records than the configured maximum.
    TooManyEntries { line_number: usize, max: usize },

    /// The registry file does not exist.
    NotFound { path: PathBuf },

    /// The registry file exceeds the maximum allowed size.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// Refused to overwrite an existing registry with the default template.
    AlreadyExists { path: PathBuf },

    /// I/O error reading or writing the registry file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedLine {
                line_number,
                found,
                expected,
            } => write!(
                f,
                "line {line_number}: expected {expected} fields, found {found}; line skipped"
            ),
            Self::TooManyEntries { line_number, max } => write!(
                f,
                "line {line_number}: registry exceeds maximum of {max} entries; line skipped"
            ),
            Self::NotFound { path } => {
                write!(f, "Registry file '{}' does not exist", path.display())
            }
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Registry '{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::AlreadyExists { path } => write!(
                f,
                "Registry '{}' already exists. Use --force to overwrite it.",
                path.display()
            ),
            Self::Io { path, source } => {
                write!(f, "I/O error on registry '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<RegistryError> for LogDigestError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

// ---------------------------------------------------------------------------
// Source errors
// ---------------------------------------------------------------------------

/// Per-source conditions. Always recovered locally and surfaced in the
/// report; never abort the run.
#[derive(Debug)]
pub enum SourceError {
    /// The configured path does not exist.
    NotFound { path: PathBuf },

    /// The configured path exists but is not a regular file.
    NotAFile { path: PathBuf },

    /// The file exists but could not be opened (permissions, etc.).
    Open { path: PathBuf, source: io::Error },

    /// An I/O error occurred after reading had started.
    ReadFailure {
        path: PathBuf,
        line_number: u64,
        source: io::Error,
    },
}

impl SourceError {
    /// Returns true for the "could not open" family, as opposed to a
    /// failure partway through reading.
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, Self::ReadFailure { .. })
    }

    /// Short human-readable reason without the path, for report lines.
    pub fn reason(&self) -> String {
        match self {
            Self::NotFound { .. } => "file not found".to_string(),
            Self::NotAFile { .. } => "not a regular file".to_string(),
            Self::Open { source, .. } => format!("cannot open: {source}"),
            Self::ReadFailure {
                line_number,
                source,
                ..
            } => format!("read failed after line {line_number}: {source}"),
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path } => {
                write!(f, "Source '{}' does not exist", path.display())
            }
            Self::NotAFile { path } => {
                write!(f, "Source '{}' is not a regular file", path.display())
            }
            Self::Open { path, source } => {
                write!(f, "Cannot open source '{}': {source}", path.display())
            }
            Self::ReadFailure {
                path,
                line_number,
                source,
            } => write!(
                f,
                "'{}': read failed after line {line_number}: {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::ReadFailure { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Clock errors
// ---------------------------------------------------------------------------

/// The host time facility could not produce a usable current time.
/// Recovered by disabling time filtering for the run.
#[derive(Debug)]
pub enum ClockError {
    /// System time is earlier than the Unix epoch.
    BeforeEpoch { source: SystemTimeError },

    /// System time cannot be represented as a calendar date-time.
    OutOfRange { seconds: u64 },
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeforeEpoch { source } => {
                write!(f, "Clock unavailable: system time precedes the Unix epoch ({source})")
            }
            Self::OutOfRange { seconds } => write!(
                f,
                "Clock unavailable: {seconds}s since the Unix epoch is out of range"
            ),
        }
    }
}

impl std::error::Error for ClockError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::BeforeEpoch { source } => Some(source),
            Self::OutOfRange { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Config file exceeds the maximum allowed size.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// A config value is out of the allowed range or not recognised.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(
                    f,
                    "Config parse error '{}': {source}. Using defaults.",
                    path.display()
                )
            }
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Config '{}' is {size} bytes, exceeds maximum of {max_size} bytes. Using defaults.",
                path.display()
            ),
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}. Using default."
            ),
            Self::Io { path, source } => {
                write!(
                    f,
                    "Config I/O error '{}': {source}. Using defaults.",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for LogDigestError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for LogDigestError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Output errors
// ---------------------------------------------------------------------------

/// Errors writing the rendered report to one of its sinks.
#[derive(Debug)]
pub enum OutputError {
    /// Writing to the console failed (closed pipe, etc.).
    Console { source: io::Error },

    /// Writing the report copy to a file failed.
    File { path: PathBuf, source: io::Error },
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Console { source } => write!(f, "Cannot write report to console: {source}"),
            Self::File { path, source } => {
                write!(f, "Cannot write report to '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Console { source } => Some(source),
            Self::File { source, .. } => Some(source),
        }
    }
}

impl From<OutputError> for LogDigestError {
    fn from(e: OutputError) -> Self {
        Self::Output(e)
    }
}

/// Convenience type alias for LogDigest results.
pub type Result<T> = std::result::Result<T, LogDigestError>;
