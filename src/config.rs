//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri di conversione
//! - Fornisce validazione robusta dei parametri di input
//! - Parsing della specifica di resize in forma testuale `WIDTHxHEIGHT`
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `quality`: Qualità JPEG (1-100, default: 50)
//! - `workers`: Numero di worker paralleli (default: 4)
//! - `output_path`: Directory di output (default: None = `ConvertedFiles` nella sorgente)
//! - `recursive`: Discovery ricorsiva preservando la struttura (default: false)
//! - `resize`: Dimensioni esatte di resize (default: None = nessun resize)
//! - `delete_originals`: Cancella i sorgenti dopo conversione riuscita (default: false)
//! - `keep_existing`: Riusa la directory di output esistente senza prompt (default: false)
//! - `json_output`: Eventi JSON su stdout per uso programmatico (default: false)
//!
//! ## Validazione:
//! - Controlla che quality sia 1-100
//! - Controlla che workers sia > 0
//! - Controlla che le dimensioni di resize siano entrambe > 0
//!
//! La validazione avviene una sola volta, prima che qualsiasi task venga creato:
//! una quality invalida è un errore di configurazione, non un errore per-file.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a conversion run, shared read-only by all workers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// JPEG quality (1-100)
    pub quality: u8,
    /// Number of parallel workers
    pub workers: usize,
    /// Output directory (None = `ConvertedFiles` inside the source directory)
    pub output_path: Option<PathBuf>,
    /// Recurse into subdirectories, preserving the relative structure
    pub recursive: bool,
    /// Exact output dimensions (width, height); aspect ratio is not preserved
    pub resize: Option<(u32, u32)>,
    /// Delete each source file after its conversion succeeded
    pub delete_originals: bool,
    /// Reuse an existing output directory instead of prompting to delete it
    pub keep_existing: bool,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quality: 50,
            workers: 4,
            output_path: None,
            recursive: false,
            resize: None,
            delete_originals: false,
            keep_existing: false,
            json_output: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.quality == 0 || self.quality > 100 {
            return Err(anyhow::anyhow!("JPEG quality must be between 1 and 100"));
        }

        if self.workers == 0 {
            return Err(anyhow::anyhow!("Number of workers must be greater than 0"));
        }

        if let Some((width, height)) = self.resize {
            if width == 0 || height == 0 {
                return Err(anyhow::anyhow!(
                    "Resize dimensions must both be greater than 0"
                ));
            }
        }

        Ok(())
    }
}

/// Parse a textual resize spec of the form `WIDTHxHEIGHT` (e.g. `1920x1080`)
pub fn parse_resize_spec(spec: &str) -> Result<(u32, u32)> {
    let (width, height) = spec
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow::anyhow!("Invalid resize spec '{}', expected WIDTHxHEIGHT", spec))?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid resize width '{}'", width))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid resize height '{}'", height))?;

    if width == 0 || height == 0 {
        return Err(anyhow::anyhow!(
            "Resize dimensions must both be greater than 0"
        ));
    }

    Ok((width, height))
}
