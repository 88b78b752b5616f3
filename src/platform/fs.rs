// LogDigest - platform/fs.rs
//
// Filesystem helpers: opening log sources, reading the registry file, and
// home-directory expansion for operator-written paths.

use crate::core::model::SourceMetadata;
use crate::util::constants;
use crate::util::error::{RegistryError, SourceError};
use chrono::{DateTime, Local};
use directories::BaseDirs;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

/// Expand a leading `~` or `~/` to the current user's home directory.
///
/// Paths without a leading tilde, and `~user` forms, are returned as-is.
/// If the home directory cannot be determined the path is left unexpanded.
pub fn expand_home(raw: &str) -> PathBuf {
    let rest = if raw == "~" {
        Some("")
    } else {
        raw.strip_prefix("~/")
    };

    match (rest, BaseDirs::new()) {
        (Some(rest), Some(dirs)) => dirs.home_dir().join(rest),
        (Some(_), None) => {
            tracing::debug!(path = raw, "Home directory unknown; leaving path unexpanded");
            PathBuf::from(raw)
        }
        (None, _) => PathBuf::from(raw),
    }
}

/// Open a log source for streaming and collect its metadata.
///
/// Missing paths, non-regular files, and open failures are all reported as
/// `SourceError` variants for which `is_unavailable()` is true.
pub fn open_source(path: &Path) -> Result<(BufReader<File>, SourceMetadata), SourceError> {
    let meta = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(SourceError::NotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => {
            return Err(SourceError::Open {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    if !meta.is_file() {
        return Err(SourceError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(|e| SourceError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;

    let metadata = SourceMetadata {
        size_bytes: meta.len(),
        modified: meta.modified().ok().map(DateTime::<Local>::from),
    };

    Ok((
        BufReader::with_capacity(constants::DEFAULT_READ_BUFFER_SIZE, file),
        metadata,
    ))
}

/// Read the registry file as text.
///
/// Invalid UTF-8 is replaced rather than rejected. Files above
/// `MAX_REGISTRY_FILE_SIZE` are refused.
pub fn read_registry_file(path: &Path) -> Result<String, RegistryError> {
    let meta = std::fs::metadata(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            RegistryError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            RegistryError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    if meta.len() > constants::MAX_REGISTRY_FILE_SIZE {
        return Err(RegistryError::FileTooLarge {
            path: path.to_path_buf(),
            size: meta.len(),
            max_size: constants::MAX_REGISTRY_FILE_SIZE,
        });
    }

    let bytes = std::fs::read(path).map_err(|e| RegistryError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("/var/log/syslog"), PathBuf::from("/var/log/syslog"));
        assert_eq!(expand_home("relative/x.log"), PathBuf::from("relative/x.log"));
        assert_eq!(expand_home("~other/x.log"), PathBuf::from("~other/x.log"));
    }

    #[test]
    fn test_expand_home_tilde_slash() {
        if let Some(dirs) = BaseDirs::new() {
            assert_eq!(expand_home("~/logs/a.log"), dirs.home_dir().join("logs/a.log"));
            assert_eq!(expand_home("~"), dirs.home_dir().to_path_buf());
        }
    }

    #[test]
    fn test_open_source_missing_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_source(&dir.path().join("missing.log")).unwrap_err();
        assert!(matches!(err, SourceError::NotFound { .. }));
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_open_source_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_source(dir.path()).unwrap_err();
        assert!(matches!(err, SourceError::NotAFile { .. }));
    }

    #[test]
    fn test_open_source_reports_size() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "hello").unwrap();
        let (_, meta) = open_source(file.path()).unwrap();
        assert_eq!(meta.size_bytes, 6);
        assert!(meta.modified.is_some());
    }

    #[test]
    fn test_read_registry_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_registry_file(&dir.path().join("sources.conf")).unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
    }

    #[test]
    fn test_read_registry_too_large() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let chunk = vec![b'#'; 64 * 1024];
        for _ in 0..((constants::MAX_REGISTRY_FILE_SIZE as usize / chunk.len()) + 1) {
            file.write_all(&chunk).unwrap();
        }
        file.flush().unwrap();
        let err = read_registry_file(file.path()).unwrap_err();
        assert!(matches!(err, RegistryError::FileTooLarge { .. }));
    }
}
