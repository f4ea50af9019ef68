//! # File Management Module
//!
//! Questo modulo gestisce la discovery dei file HEIC e le operazioni sui file.
//!
//! ## Responsabilità:
//! - Discovery di file HEIC/HEIF in una directory (ricorsiva o meno)
//! - Determinazione formato file tramite estensione (case-insensitive)
//! - Copia dei timestamp (atime/mtime) dal sorgente all'output
//!
//! ## Formati supportati:
//! - **HEIC/HEIF**: estensioni `.heic` e `.heif`
//!
//! La discovery è lazy sul filesystem ma materializza il risultato in un
//! `Vec`, così la fase di planning lavora su uno snapshot stabile. Se la
//! root non esiste o non è una directory l'intera run viene abortita prima
//! di creare qualsiasi task.

use crate::error::ConvertError;
use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Manages file discovery and filesystem utilities
pub struct FileManager;

impl FileManager {
    /// Find all HEIC/HEIF files under a directory.
    ///
    /// Non-recursive mode inspects only the direct children of the root.
    pub fn find_heic_files(root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(ConvertError::NotADirectory(root.to_path_buf()).into());
        }

        let walker = if recursive {
            WalkDir::new(root)
        } else {
            WalkDir::new(root).max_depth(1)
        };

        let mut files = Vec::new();
        for entry in walker
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            if Self::is_heic(entry.path()) {
                files.push(entry.path().to_path_buf());
            }
        }

        Ok(files)
    }

    /// Check if a file has a HEIC/HEIF extension (case-insensitive)
    pub fn is_heic(path: &Path) -> bool {
        if let Some(ext) = path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            matches!(ext_lower.as_str(), "heic" | "heif")
        } else {
            false
        }
    }

    /// Copy last-access and last-modification times from `src` onto `dst`
    pub fn copy_file_times(src: &Path, dst: &Path) -> std::io::Result<()> {
        let metadata = std::fs::metadata(src)?;
        let atime = filetime::FileTime::from_last_access_time(&metadata);
        let mtime = filetime::FileTime::from_last_modification_time(&metadata);
        filetime::set_file_times(dst, atime, mtime)
    }
}
