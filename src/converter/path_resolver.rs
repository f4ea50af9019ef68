//! # Path Resolution Module
//!
//! Centralizza tutta la logica di calcolo dei path di output.
//! In modalità ricorsiva preserva la struttura relativa alla root di
//! discovery, altrimenti appiattisce tutto nella directory di output.

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Utility per calcolare i path di output in modo centralizzato
pub struct PathResolver;

impl PathResolver {
    /// Compute the destination path for a source file.
    ///
    /// The base name is kept and the extension becomes `.jpg`. With
    /// `recursive` the subpath relative to `source_root` is preserved
    /// under `output_root`; otherwise the file lands directly in it.
    pub fn resolve(
        source: &Path,
        source_root: &Path,
        output_root: &Path,
        recursive: bool,
    ) -> Result<PathBuf> {
        let file_stem = source
            .file_stem()
            .ok_or_else(|| anyhow::anyhow!("Invalid file name: {}", source.display()))?;
        let filename = format!("{}.jpg", file_stem.to_string_lossy());

        if recursive {
            let relative_dir = source
                .strip_prefix(source_root)
                .ok()
                .and_then(|rel| rel.parent())
                .unwrap_or_else(|| Path::new(""));
            Ok(output_root.join(relative_dir).join(filename))
        } else {
            Ok(output_root.join(filename))
        }
    }

    /// Create the parent directories of `path` if needed (idempotent)
    pub async fn ensure_parent_dirs(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                anyhow::anyhow!(
                    "Failed to create parent directories for {}: {}",
                    path.display(),
                    e
                )
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_flat() {
        let dest = PathResolver::resolve(
            Path::new("/photos/IMG_001.heic"),
            Path::new("/photos"),
            Path::new("/out"),
            false,
        )
        .unwrap();
        assert_eq!(dest, PathBuf::from("/out/IMG_001.jpg"));
    }

    #[test]
    fn test_resolve_flat_ignores_subdirs() {
        let dest = PathResolver::resolve(
            Path::new("/photos/2023/vacation/IMG_001.heic"),
            Path::new("/photos"),
            Path::new("/out"),
            false,
        )
        .unwrap();
        assert_eq!(dest, PathBuf::from("/out/IMG_001.jpg"));
    }

    #[test]
    fn test_resolve_recursive_preserves_structure() {
        let dest = PathResolver::resolve(
            Path::new("/photos/2023/vacation/IMG_001.heic"),
            Path::new("/photos"),
            Path::new("/out"),
            true,
        )
        .unwrap();
        assert_eq!(dest, PathBuf::from("/out/2023/vacation/IMG_001.jpg"));
    }

    #[test]
    fn test_resolve_extension_replacement() {
        let dest = PathResolver::resolve(
            Path::new("/photos/shot.HEIF"),
            Path::new("/photos"),
            Path::new("/out"),
            false,
        )
        .unwrap();
        assert_eq!(dest, PathBuf::from("/out/shot.jpg"));
    }

    #[tokio::test]
    async fn test_ensure_parent_dirs_idempotent() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let nested = temp_dir.path().join("a/b/c.jpg");

        PathResolver::ensure_parent_dirs(&nested).await.unwrap();
        assert!(nested.parent().unwrap().is_dir());

        // Creating again must not fail
        PathResolver::ensure_parent_dirs(&nested).await.unwrap();
    }
}
