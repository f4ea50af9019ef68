//! # Task Converter Module
//!
//! Worker per la conversione di singoli file.
//! Separato dall'orchestratore principale per maggiore modularità.
//!
//! La pipeline per file è: decode → resize opzionale → encode JPEG →
//! scrittura atomica → copia timestamp → cancellazione opzionale del
//! sorgente. La scrittura passa da un file temporaneo nella directory di
//! destinazione, poi viene promossa con un rename: nessun file di output
//! parziale sopravvive a un fallimento.

use crate::{
    codec::ImageCodec,
    config::Config,
    converter::ConversionTask,
    error::ConvertError,
    file_manager::FileManager,
    report::ConversionOutcome,
};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Worker that converts one file end-to-end
pub struct TaskConverter {
    config: Config,
    codec: Arc<dyn ImageCodec>,
}

impl TaskConverter {
    pub fn new(config: Config, codec: Arc<dyn ImageCodec>) -> Self {
        Self { config, codec }
    }

    /// Convert a single task, always producing exactly one outcome.
    ///
    /// Decode/encode errors become failed outcomes; timestamp-copy and
    /// original-deletion failures become warnings on a successful outcome.
    pub async fn convert(&self, task: ConversionTask) -> ConversionOutcome {
        let started = Instant::now();
        let source = task.source_path.clone();
        let config = self.config.clone();
        let codec = Arc::clone(&self.codec);

        // La pipeline del codec è CPU-bound: fuori dall'executor async
        let result =
            tokio::task::spawn_blocking(move || convert_blocking(&task, &config, codec.as_ref()))
                .await;

        match result {
            Ok(Ok(warning)) => {
                debug!("Converted {} in {:.2?}", source.display(), started.elapsed());
                ConversionOutcome::success(source, started.elapsed(), warning)
            }
            Ok(Err(e)) => ConversionOutcome::failure(source, started.elapsed(), e),
            Err(e) => ConversionOutcome::failure(
                source,
                started.elapsed(),
                ConvertError::WorkerFault(e.to_string()),
            ),
        }
    }
}

/// Synchronous per-file pipeline, run under `spawn_blocking`
fn convert_blocking(
    task: &ConversionTask,
    config: &Config,
    codec: &dyn ImageCodec,
) -> Result<Option<String>, ConvertError> {
    let mut decoded = codec.decode(&task.source_path)?;

    if let Some((width, height)) = config.resize {
        decoded = codec.resize(decoded, width, height);
    }

    let bytes = codec.encode_jpeg(&decoded, config.quality)?;
    write_atomically(&task.dest_path, &bytes)?;

    let mut warnings = Vec::new();

    // Timestamp fidelity persa non invalida la conversione
    if let Err(e) = FileManager::copy_file_times(&task.source_path, &task.dest_path) {
        warn!(
            "Failed to copy timestamps onto {}: {}",
            task.dest_path.display(),
            e
        );
        warnings.push(format!("timestamp copy failed: {}", e));
    }

    if config.delete_originals {
        if let Err(e) = std::fs::remove_file(&task.source_path) {
            warn!(
                "Converted {} but could not delete the original: {}",
                task.source_path.display(),
                e
            );
            warnings.push(format!("original deletion failed: {}", e));
        }
    }

    Ok((!warnings.is_empty()).then(|| warnings.join("; ")))
}

/// Write `bytes` to `dest` via a temp file in the same directory plus rename
fn write_atomically(dest: &Path, bytes: &[u8]) -> Result<(), ConvertError> {
    let dest_dir = dest.parent().ok_or_else(|| {
        ConvertError::Validation(format!("destination has no parent: {}", dest.display()))
    })?;

    let mut tmp = tempfile::NamedTempFile::new_in(dest_dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(dest).map_err(|e| ConvertError::Io(e.error))?;
    Ok(())
}
