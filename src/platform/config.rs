// LogDigest - platform/config.rs
//
// Platform-specific directory resolution and config.toml loading with
// startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::model::ContinuationPolicy;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for LogDigest configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logdigest/ or %APPDATA%\LogDigest\config\)
    pub config_dir: PathBuf,

    /// Default config.toml location.
    pub config_file: PathBuf,

    /// Default registry location.
    pub registry_file: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        let config_dir = match ProjectDirs::from("", "", constants::APP_ID) {
            Some(proj_dirs) => proj_dirs.config_dir().to_path_buf(),
            None => {
                tracing::warn!("Could not determine platform directories, using current directory");
                PathBuf::from(".")
            }
        };

        let paths = Self::under(config_dir);
        tracing::debug!(
            config = %paths.config_file.display(),
            registry = %paths.registry_file.display(),
            "Platform paths resolved"
        );
        paths
    }

    /// Paths rooted at an explicit configuration directory.
    pub fn under(config_dir: PathBuf) -> Self {
        Self {
            config_file: config_dir.join(constants::CONFIG_FILE_NAME),
            registry_file: config_dir.join(constants::REGISTRY_FILE_NAME),
            config_dir,
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[digest]` section.
    pub digest: DigestSection,
    /// `[output]` section.
    pub output: OutputSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[digest]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DigestSection {
    /// Registry file path.
    pub registry: Option<String>,
    /// Default "last N minutes" window.
    pub minutes: Option<i64>,
    /// Default per-source line cap (0 = unlimited).
    pub max_lines: Option<i64>,
    /// Show file size and mtime under each source.
    pub show_metadata: Option<bool>,
    /// Registry field delimiter (single character).
    pub delimiter: Option<String>,
    /// Continuation line policy: "include", "inherit" or "exclude".
    pub continuation: Option<String>,
}

/// `[output]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Also write the plain-text report to this file.
    pub file: Option<String>,
    /// ANSI colour on the console.
    pub color: Option<bool>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated configuration derived from `config.toml`.
///
/// Invalid values produce a `ConfigError` warning and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // -- Digest --
    pub registry_path: Option<PathBuf>,
    pub minutes: Option<u32>,
    pub max_lines: u32,
    pub show_metadata: bool,
    pub delimiter: char,
    pub continuation: ContinuationPolicy,

    // -- Output --
    pub output_file: Option<PathBuf>,
    pub color: bool,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            registry_path: None,
            minutes: None,
            max_lines: constants::DEFAULT_MAX_LINES,
            show_metadata: false,
            delimiter: constants::DEFAULT_REGISTRY_DELIMITER,
            continuation: ContinuationPolicy::default(),
            output_file: None,
            color: true,
            log_level: None,
        }
    }
}

/// Load and validate config.toml at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal
/// problems. A missing file yields defaults with no warnings; an unreadable
/// or unparseable file yields defaults plus one warning.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<ConfigError>) {
    let mut warnings: Vec<ConfigError> = Vec::new();

    let size = match std::fs::metadata(config_path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
            return (AppConfig::default(), warnings);
        }
        Err(e) => {
            warnings.push(ConfigError::Io {
                path: config_path.to_path_buf(),
                source: e,
            });
            return (AppConfig::default(), warnings);
        }
    };

    if size > constants::MAX_CONFIG_FILE_SIZE {
        warnings.push(ConfigError::FileTooLarge {
            path: config_path.to_path_buf(),
            size,
            max_size: constants::MAX_CONFIG_FILE_SIZE,
        });
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) => {
            warnings.push(ConfigError::Io {
                path: config_path.to_path_buf(),
                source: e,
            });
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            warnings.push(ConfigError::TomlParse {
                path: config_path.to_path_buf(),
                source: e,
            });
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let config = validate(raw, &mut warnings);
    (config, warnings)
}

/// Validate each field against named constants, accumulating all problems.
pub fn validate(raw: RawConfig, warnings: &mut Vec<ConfigError>) -> AppConfig {
    let mut config = AppConfig::default();

    // -- Digest: registry --
    if let Some(registry) = raw.digest.registry.filter(|r| !r.trim().is_empty()) {
        config.registry_path = Some(PathBuf::from(registry));
    }

    // -- Digest: minutes --
    if let Some(minutes) = raw.digest.minutes {
        let range = i64::from(constants::MIN_WINDOW_MINUTES)..=i64::from(constants::MAX_WINDOW_MINUTES);
        if range.contains(&minutes) {
            config.minutes = u32::try_from(minutes).ok();
        } else {
            warnings.push(ConfigError::ValueOutOfRange {
                field: "[digest] minutes".to_string(),
                value: minutes.to_string(),
                expected: format!(
                    "{}-{} (omit for no window)",
                    constants::MIN_WINDOW_MINUTES,
                    constants::MAX_WINDOW_MINUTES
                ),
            });
        }
    }

    // -- Digest: max_lines --
    if let Some(max_lines) = raw.digest.max_lines {
        match u32::try_from(max_lines) {
            Ok(v) => config.max_lines = v,
            Err(_) => warnings.push(ConfigError::ValueOutOfRange {
                field: "[digest] max_lines".to_string(),
                value: max_lines.to_string(),
                expected: format!("0-{} (0 = unlimited)", u32::MAX),
            }),
        }
    }

    if let Some(show) = raw.digest.show_metadata {
        config.show_metadata = show;
    }

    // -- Digest: delimiter --
    if let Some(ref delimiter) = raw.digest.delimiter {
        match parse_delimiter(delimiter) {
            Some(c) => config.delimiter = c,
            None => warnings.push(ConfigError::ValueOutOfRange {
                field: "[digest] delimiter".to_string(),
                value: delimiter.clone(),
                expected: DELIMITER_EXPECTED.to_string(),
            }),
        }
    }

    // -- Digest: continuation --
    if let Some(ref name) = raw.digest.continuation {
        match ContinuationPolicy::from_name(name) {
            Some(policy) => config.continuation = policy,
            None => warnings.push(ConfigError::ValueOutOfRange {
                field: "[digest] continuation".to_string(),
                value: name.clone(),
                expected: "include, inherit or exclude".to_string(),
            }),
        }
    }

    // -- Output --
    if let Some(file) = raw.output.file.filter(|f| !f.trim().is_empty()) {
        config.output_file = Some(PathBuf::from(file));
    }
    if let Some(color) = raw.output.color {
        config.color = color;
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        if constants::VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(ConfigError::ValueOutOfRange {
                field: "[logging] level".to_string(),
                value: level.clone(),
                expected: constants::VALID_LOG_LEVELS.join(", "),
            });
        }
    }

    config
}

/// Description of an acceptable registry delimiter, for error messages.
pub const DELIMITER_EXPECTED: &str = "a single non-whitespace character other than '#'";

/// Accept `raw` as a registry delimiter: exactly one character, not
/// whitespace and not the comment prefix.
pub fn parse_delimiter(raw: &str) -> Option<char> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_whitespace() && c != constants::REGISTRY_COMMENT_PREFIX => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> (AppConfig, Vec<ConfigError>) {
        let raw: RawConfig = toml::from_str(text).unwrap();
        let mut warnings = Vec::new();
        let config = validate(raw, &mut warnings);
        (config, warnings)
    }

    #[test]
    fn test_parse_delimiter_rules() {
        assert_eq!(parse_delimiter("|"), Some('|'));
        assert_eq!(parse_delimiter(";"), Some(';'));
        assert_eq!(parse_delimiter("#"), None);
        assert_eq!(parse_delimiter(" "), None);
        assert_eq!(parse_delimiter("\t"), None);
        assert_eq!(parse_delimiter("||"), None);
        assert_eq!(parse_delimiter(""), None);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(&dir.path().join("config.toml"));
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_unparseable_file_gives_defaults_and_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[digest\nminutes = ").unwrap();
        let (config, warnings) = load_config(&path);
        assert_eq!(config, AppConfig::default());
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], ConfigError::TomlParse { .. }));
    }

    #[test]
    fn test_valid_values_applied() {
        let (config, warnings) = parse(
            r#"
            [digest]
            registry = "/etc/logdigest/sources.conf"
            minutes = 15
            max_lines = 200
            show_metadata = true
            delimiter = ";"
            continuation = "inherit"

            [output]
            file = "/tmp/digest.txt"
            color = false

            [logging]
            level = "DEBUG"

            [future]
            unknown = 1
            "#,
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(
            config.registry_path,
            Some(PathBuf::from("/etc/logdigest/sources.conf"))
        );
        assert_eq!(config.minutes, Some(15));
        assert_eq!(config.max_lines, 200);
        assert!(config.show_metadata);
        assert_eq!(config.delimiter, ';');
        assert_eq!(config.continuation, ContinuationPolicy::Inherit);
        assert_eq!(config.output_file, Some(PathBuf::from("/tmp/digest.txt")));
        assert!(!config.color);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_invalid_values_fall_back_with_warnings() {
        let (config, warnings) = parse(
            r#"
            [digest]
            minutes = 0
            max_lines = -5
            delimiter = "||"
            continuation = "sometimes"

            [logging]
            level = "loud"
            "#,
        );
        assert_eq!(warnings.len(), 5);
        assert_eq!(config.minutes, None);
        assert_eq!(config.max_lines, constants::DEFAULT_MAX_LINES);
        assert_eq!(config.delimiter, '|');
        assert_eq!(config.continuation, ContinuationPolicy::Include);
        assert_eq!(config.log_level, None);
    }

    #[test]
    fn test_paths_under_config_dir() {
        let paths = PlatformPaths::under(PathBuf::from("/cfg"));
        assert_eq!(paths.config_file, PathBuf::from("/cfg/config.toml"));
        assert_eq!(paths.registry_file, PathBuf::from("/cfg/sources.conf"));
    }
}
