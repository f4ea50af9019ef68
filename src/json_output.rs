//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per uso programmatico.
//!
//! ## Responsabilità:
//! - Emette messaggi JSON strutturati per gli eventi di conversione
//! - Un oggetto JSON per riga su stdout, consumabile da altri processi
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio della run con configurazione e totale file
//! - `file_complete`: Fine elaborazione di un singolo file
//! - `progress`: Progresso corrente (completati, totale, contatori)
//! - `complete`: Fine run con il report finale

use crate::report::{ConversionOutcome, ConversionReport, RunStatus};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JsonMessage {
    /// Inizio della run di conversione
    #[serde(rename = "start")]
    Start {
        input_dir: PathBuf,
        output_dir: PathBuf,
        total_files: usize,
        quality: u8,
        workers: usize,
    },

    /// Fine elaborazione di un file specifico
    #[serde(rename = "file_complete")]
    FileComplete {
        path: PathBuf,
        succeeded: bool,
        duration_ms: u64,
        error: Option<String>,
        warning: Option<String>,
    },

    /// Progresso corrente
    #[serde(rename = "progress")]
    Progress {
        current: usize,
        total: usize,
        percentage: f64,
        converted: usize,
        failed: usize,
    },

    /// Run completata
    #[serde(rename = "complete")]
    Complete {
        status: RunStatus,
        attempted: usize,
        converted: usize,
        failed: usize,
        failed_paths: Vec<PathBuf>,
        duration_seconds: f64,
    },
}

impl JsonMessage {
    pub fn start(
        input_dir: PathBuf,
        output_dir: PathBuf,
        total_files: usize,
        quality: u8,
        workers: usize,
    ) -> Self {
        Self::Start {
            input_dir,
            output_dir,
            total_files,
            quality,
            workers,
        }
    }

    pub fn file_complete(outcome: &ConversionOutcome) -> Self {
        Self::FileComplete {
            path: outcome.source_path.clone(),
            succeeded: outcome.succeeded,
            duration_ms: outcome.duration.as_millis() as u64,
            error: outcome.error.clone(),
            warning: outcome.warning.clone(),
        }
    }

    pub fn progress(current: usize, total: usize, converted: usize, failed: usize) -> Self {
        let percentage = if total == 0 {
            100.0
        } else {
            (current as f64 / total as f64) * 100.0
        };
        Self::Progress {
            current,
            total,
            percentage,
            converted,
            failed,
        }
    }

    pub fn complete(report: &ConversionReport) -> Self {
        Self::Complete {
            status: report.status,
            attempted: report.files_attempted,
            converted: report.files_converted,
            failed: report.files_failed,
            failed_paths: report.failed_paths.clone(),
            duration_seconds: report.total_duration.as_secs_f64(),
        }
    }

    /// Emit as a single JSON line on stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }
}
