// LogDigest - app/init.rs
//
// Writes the commented default registry so a first run has something to
// edit.

use crate::core::registry::DEFAULT_REGISTRY_TEMPLATE;
use crate::util::error::RegistryError;
use std::path::Path;

/// Write the default registry template to `path`.
///
/// Refuses to replace an existing file unless `force` is set. Missing parent
/// directories are created.
pub fn write_default_registry(path: &Path, force: bool) -> Result<(), RegistryError> {
    if path.exists() && !force {
        return Err(RegistryError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }

    let io_err = |source: std::io::Error| RegistryError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, DEFAULT_REGISTRY_TEMPLATE).map_err(io_err)?;

    tracing::info!(path = %path.display(), "Default registry written");
    Ok(())
}
