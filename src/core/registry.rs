// LogDigest - core/registry.rs
//
// Registry parsing: `CATEGORY|DESCRIPTION|PATH|COLOR` records into typed
// `SourceEntry` values. Raw text never leaves this module.
// Core layer: operates on text already read by the platform layer.

use crate::core::model::{ColorTag, Registry, SourceEntry};
use crate::util::constants;
use crate::util::error::RegistryError;

/// Template written by `logdigest init`.
pub const DEFAULT_REGISTRY_TEMPLATE: &str = "\
# LogDigest source registry
#
# One source per line:  CATEGORY|DESCRIPTION|PATH|COLOR
# COLOR is one of RED, GREEN, YELLOW, BLUE, PURPLE, CYAN, NONE.
# Blank lines and lines starting with '#' are ignored.
# A leading ~/ in PATH expands to your home directory.
#
SYSTEM|System log|/var/log/syslog|BLUE
SYSTEM|Kernel messages|/var/log/kern.log|CYAN
AUTH|Authentication|/var/log/auth.log|YELLOW
#WEB|Nginx errors|/var/log/nginx/error.log|RED
#APP|My application|~/logs/app.log|GREEN
";

/// Parse registry text into a `Registry`.
///
/// Blank lines and comment lines are ignored. Lines with the wrong number of
/// fields are skipped and returned as `RegistryError::MalformedLine` so one
/// bad line never blocks the remaining sources. Field contents are trimmed
/// but not otherwise validated; a nonexistent path is a valid entry.
pub fn parse_registry(text: &str, delimiter: char) -> (Registry, Vec<RegistryError>) {
    let mut entries = Vec::new();
    let mut skipped = Vec::new();

    for (idx, raw_line) in text.lines().enumerate() {
        let line_number = idx + 1;
        let line = raw_line.trim();

        if line.is_empty() || line.starts_with(constants::REGISTRY_COMMENT_PREFIX) {
            continue;
        }

        let fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();
        if fields.len() != constants::REGISTRY_FIELD_COUNT {
            let err = RegistryError::MalformedLine {
                line_number,
                found: fields.len(),
                expected: constants::REGISTRY_FIELD_COUNT,
            };
            tracing::warn!(line = line_number, error = %err, "Skipping malformed registry line");
            skipped.push(err);
            continue;
        }

        if entries.len() >= constants::MAX_REGISTRY_ENTRIES {
            let err = RegistryError::TooManyEntries {
                line_number,
                max: constants::MAX_REGISTRY_ENTRIES,
            };
            tracing::warn!(line = line_number, error = %err, "Registry entry limit reached");
            skipped.push(err);
            continue;
        }

        entries.push(SourceEntry {
            category: fields[0].to_string(),
            description: fields[1].to_string(),
            path: fields[2].to_string(),
            color: ColorTag::from_field(fields[3]),
        });
    }

    tracing::debug!(
        entries = entries.len(),
        skipped = skipped.len(),
        "Registry parsed"
    );

    (Registry::new(entries), skipped)
}
