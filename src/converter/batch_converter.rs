//! # Batch Converter Main Orchestrator
//!
//! Orchestratore principale della run: valida la configurazione, prepara la
//! directory di output (con conferma per l'operazione distruttiva), pianifica
//! i task applicando skip-if-exists, esegue il pool e aggrega il report.
//!
//! ## Sequenza della run:
//! 1. Directory sorgente valida, altrimenti report `invalid_target`
//! 2. Risoluzione output root (esplicita o `ConvertedFiles` nella sorgente)
//! 3. Clobber dell'output esistente, serializzato PRIMA di qualsiasi task
//! 4. Discovery → planning (skip-if-exists, rifiuto collisioni)
//! 5. Task list vuota → report `no_input`
//! 6. Pool a concorrenza limitata → aggregazione outcome → report finale

use crate::{
    codec::ImageCodec,
    config::Config,
    confirm::Confirmation,
    converter::{
        path_resolver::PathResolver, progress_tracker::ProgressTracker, worker_pool::WorkerPool,
        ConversionTask,
    },
    error::ConvertError,
    file_manager::FileManager,
    json_output::JsonMessage,
    report::{ConversionReport, ReportAggregator, RunStatus},
};
use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

/// Orchestrates a full conversion run
pub struct BatchConverter {
    config: Config,
    codec: Arc<dyn ImageCodec>,
    confirmation: Arc<dyn Confirmation>,
    stop_receiver: Option<broadcast::Receiver<()>>,
}

impl BatchConverter {
    /// Create a new converter; the configuration is validated up front
    pub fn new(
        config: Config,
        codec: Arc<dyn ImageCodec>,
        confirmation: Arc<dyn Confirmation>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            codec,
            confirmation,
            stop_receiver: None,
        })
    }

    /// Attach an external shutdown channel: on signal the pool stops
    /// dispatching and lets in-flight conversions finish.
    pub fn with_cancellation(mut self, stop_receiver: broadcast::Receiver<()>) -> Self {
        self.stop_receiver = Some(stop_receiver);
        self
    }

    /// Run the whole conversion and produce the final report
    pub async fn run(&mut self, source_dir: &Path) -> Result<ConversionReport> {
        let started = Instant::now();

        // Sorgente valida prima di qualsiasi side effect
        if !source_dir.is_dir() {
            error!(
                "Source directory does not exist or is not a directory: {}",
                source_dir.display()
            );
            return Ok(ConversionReport::empty(
                RunStatus::InvalidTarget,
                started.elapsed(),
            ));
        }

        let output_root = self.resolve_output_root(source_dir);
        if !self.prepare_output_root(&output_root).await? {
            info!("Conversion aborted.");
            return Ok(ConversionReport::empty(
                RunStatus::AbortedByUser,
                started.elapsed(),
            ));
        }

        let files = FileManager::find_heic_files(source_dir, self.config.recursive)?;
        let tasks = self.plan_tasks(&files, source_dir, &output_root).await?;

        self.log_configuration(source_dir, &output_root, files.len(), tasks.len());
        if self.config.json_output {
            JsonMessage::start(
                source_dir.to_path_buf(),
                output_root.clone(),
                tasks.len(),
                self.config.quality,
                self.config.workers,
            )
            .emit();
        }

        if tasks.is_empty() {
            info!("No HEIC files to convert");
            let report = ConversionReport::empty(RunStatus::NoInput, started.elapsed());
            if self.config.json_output {
                JsonMessage::complete(&report).emit();
            }
            return Ok(report);
        }

        let progress = ProgressTracker::new(tasks.len(), self.config.json_output);
        let mut pool = match self.stop_receiver.as_ref() {
            Some(receiver) => WorkerPool::new_with_cancellation(
                self.config.clone(),
                Arc::clone(&self.codec),
                receiver.resubscribe(),
            ),
            None => WorkerPool::new(self.config.clone(), Arc::clone(&self.codec)),
        };

        let outcomes = pool.run(tasks, &progress).await?;
        let report = ReportAggregator::aggregate(&outcomes, started.elapsed());

        progress.finish(&report.format_summary());
        self.emit_final_report(&report);

        Ok(report)
    }

    /// Explicit output directory, or `ConvertedFiles` inside the source
    fn resolve_output_root(&self, source_dir: &Path) -> PathBuf {
        self.config
            .output_path
            .clone()
            .unwrap_or_else(|| source_dir.join("ConvertedFiles"))
    }

    /// Prepare the output root. Returns false if the user aborted.
    ///
    /// Deleting an existing directory is gated on the injected
    /// confirmation; with `keep_existing` the directory is reused and the
    /// skip-if-exists filter does the rest.
    async fn prepare_output_root(&self, output_root: &Path) -> Result<bool> {
        if output_root.exists() {
            if self.config.keep_existing {
                info!(
                    "Reusing existing output directory: {}",
                    output_root.display()
                );
            } else {
                let prompt = format!(
                    "Existing output folder '{}' detected. Delete and proceed?",
                    output_root.display()
                );
                if !self.confirmation.confirm(&prompt) {
                    return Ok(false);
                }
                tokio::fs::remove_dir_all(output_root).await?;
            }
        }
        tokio::fs::create_dir_all(output_root).await?;
        Ok(true)
    }

    /// Build the task list: one task per discovered file, skipping files
    /// whose destination already exists and refusing destination collisions.
    async fn plan_tasks(
        &self,
        files: &[PathBuf],
        source_root: &Path,
        output_root: &Path,
    ) -> Result<Vec<ConversionTask>> {
        let mut tasks = Vec::with_capacity(files.len());
        let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();

        for file in files {
            let dest =
                PathResolver::resolve(file, source_root, output_root, self.config.recursive)?;

            // Due sorgenti sullo stesso output: mai sovrascrivere in silenzio
            if let Some(first) = claimed.get(&dest) {
                return Err(ConvertError::DestinationCollision {
                    first: first.clone(),
                    second: file.clone(),
                    dest,
                }
                .into());
            }
            claimed.insert(dest.clone(), file.clone());

            if dest.exists() {
                debug!(
                    "Skipping {}, output already exists: {}",
                    file.display(),
                    dest.display()
                );
                continue;
            }

            PathResolver::ensure_parent_dirs(&dest).await?;
            tasks.push(ConversionTask {
                source_path: file.clone(),
                dest_path: dest,
            });
        }

        Ok(tasks)
    }

    /// Logga configurazione (solo se non JSON mode)
    fn log_configuration(
        &self,
        source_dir: &Path,
        output_root: &Path,
        discovered: usize,
        planned: usize,
    ) {
        if self.config.json_output {
            return;
        }

        info!("Starting HEIC conversion in: {}", source_dir.display());
        info!("Output directory: {}", output_root.display());
        info!(
            "JPEG quality: {} | Workers: {}",
            self.config.quality, self.config.workers
        );
        if let Some((width, height)) = self.config.resize {
            info!("Resize: {}x{}", width, height);
        }
        if self.config.delete_originals {
            info!("Originals will be deleted after successful conversion");
        }
        if discovered > planned {
            info!(
                "Found {} HEIC files, {} already converted",
                discovered,
                discovered - planned
            );
        } else {
            info!("Found {} HEIC files to convert", discovered);
        }
    }

    /// Stampa il report finale
    fn emit_final_report(&self, report: &ConversionReport) {
        if self.config.json_output {
            JsonMessage::complete(report).emit();
            return;
        }

        info!("=== Conversion Complete ===");
        info!("Files attempted: {}", report.files_attempted);
        info!("Files converted: {}", report.files_converted);
        info!("Files failed: {}", report.files_failed);
        info!(
            "Total time: {:.2}s | Average per file: {:.2}s",
            report.total_duration.as_secs_f64(),
            report.average_duration.as_secs_f64()
        );
        for path in &report.failed_paths {
            info!("  failed: {}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::mock::MockCodec;
    use crate::confirm::AutoConfirm;
    use tempfile::TempDir;

    fn write_sources(root: &Path, names: &[&str]) {
        for name in names {
            std::fs::write(root.join(name), b"heic bytes").unwrap();
        }
    }

    fn converter(config: Config) -> BatchConverter {
        BatchConverter::new(config, Arc::new(MockCodec::new()), Arc::new(AutoConfirm(true)))
            .unwrap()
    }

    #[tokio::test]
    async fn test_run_converts_all_valid_files() {
        let temp_dir = TempDir::new().unwrap();
        write_sources(temp_dir.path(), &["a.heic", "b.heic", "c.heic"]);

        let config = Config {
            quality: 90,
            workers: 2,
            ..Default::default()
        };
        let report = converter(config).run(temp_dir.path()).await.unwrap();

        assert_eq!(report.status, RunStatus::Ok);
        assert_eq!(report.files_attempted, 3);
        assert_eq!(report.files_converted, 3);
        assert_eq!(report.files_failed, 0);

        let out_dir = temp_dir.path().join("ConvertedFiles");
        for name in ["a.jpg", "b.jpg", "c.jpg"] {
            assert!(out_dir.join(name).is_file(), "missing {}", name);
        }
    }

    #[tokio::test]
    async fn test_run_reports_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        write_sources(temp_dir.path(), &["a.heic", "corrupt.heic", "b.heic"]);

        let report = converter(Config::default())
            .run(temp_dir.path())
            .await
            .unwrap();

        assert_eq!(report.files_attempted, 3);
        assert_eq!(report.files_converted, 2);
        assert_eq!(report.files_failed, 1);
        assert_eq!(
            report.failed_paths,
            vec![temp_dir.path().join("corrupt.heic")]
        );
        assert!(!temp_dir
            .path()
            .join("ConvertedFiles")
            .join("corrupt.jpg")
            .exists());
    }

    #[tokio::test]
    async fn test_run_empty_directory_is_no_input() {
        let temp_dir = TempDir::new().unwrap();

        let report = converter(Config::default())
            .run(temp_dir.path())
            .await
            .unwrap();

        assert_eq!(report.status, RunStatus::NoInput);
        assert_eq!(report.files_attempted, 0);
        // L'unico side effect è la creazione dell'output root
        assert!(temp_dir.path().join("ConvertedFiles").is_dir());
    }

    #[tokio::test]
    async fn test_run_missing_source_is_invalid_target() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");

        let report = converter(Config::default()).run(&missing).await.unwrap();

        assert_eq!(report.status, RunStatus::InvalidTarget);
        assert_eq!(report.files_attempted, 0);
    }

    #[tokio::test]
    async fn test_declined_confirmation_aborts_without_touching_anything() {
        let temp_dir = TempDir::new().unwrap();
        write_sources(temp_dir.path(), &["a.heic"]);
        let out_dir = temp_dir.path().join("ConvertedFiles");
        std::fs::create_dir(&out_dir).unwrap();
        let sentinel = out_dir.join("existing.jpg");
        std::fs::write(&sentinel, b"old output").unwrap();

        let mut converter = BatchConverter::new(
            Config::default(),
            Arc::new(MockCodec::new()),
            Arc::new(AutoConfirm(false)),
        )
        .unwrap();
        let report = converter.run(temp_dir.path()).await.unwrap();

        assert_eq!(report.status, RunStatus::AbortedByUser);
        assert_eq!(report.files_attempted, 0);
        // Niente cancellato, niente convertito
        assert_eq!(std::fs::read(&sentinel).unwrap(), b"old output");
        assert!(temp_dir.path().join("a.heic").is_file());
    }

    #[tokio::test]
    async fn test_second_run_with_keep_existing_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        write_sources(temp_dir.path(), &["a.heic", "b.heic"]);

        let config = Config {
            keep_existing: true,
            ..Default::default()
        };

        let first = converter(config.clone()).run(temp_dir.path()).await.unwrap();
        assert_eq!(first.files_attempted, 2);
        assert_eq!(first.files_converted, 2);

        let second = converter(config).run(temp_dir.path()).await.unwrap();
        assert_eq!(second.status, RunStatus::NoInput);
        assert_eq!(second.files_attempted, 0);
    }

    #[tokio::test]
    async fn test_destination_collision_refuses_run() {
        let temp_dir = TempDir::new().unwrap();
        // Stesso stem, estensioni diverse: stessa destinazione
        write_sources(temp_dir.path(), &["shot.heic", "shot.heif"]);

        let err = converter(Config::default())
            .run(temp_dir.path())
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ConvertError>(),
            Some(ConvertError::DestinationCollision { .. })
        ));
    }

    #[tokio::test]
    async fn test_recursive_run_preserves_structure() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("2023/trip")).unwrap();
        write_sources(temp_dir.path(), &["top.heic"]);
        write_sources(&temp_dir.path().join("2023/trip"), &["nested.heic"]);

        let out_dir = temp_dir.path().join("jpegs");
        let config = Config {
            recursive: true,
            output_path: Some(out_dir.clone()),
            ..Default::default()
        };
        let report = converter(config).run(temp_dir.path()).await.unwrap();

        assert_eq!(report.files_converted, 2);
        assert!(out_dir.join("top.jpg").is_file());
        assert!(out_dir.join("2023/trip/nested.jpg").is_file());
    }

    #[tokio::test]
    async fn test_delete_originals_removes_sources() {
        let temp_dir = TempDir::new().unwrap();
        write_sources(temp_dir.path(), &["a.heic", "corrupt.heic"]);

        let config = Config {
            delete_originals: true,
            ..Default::default()
        };
        let report = converter(config).run(temp_dir.path()).await.unwrap();

        assert_eq!(report.files_converted, 1);
        assert_eq!(report.files_failed, 1);
        // Solo il sorgente convertito con successo viene cancellato
        assert!(!temp_dir.path().join("a.heic").exists());
        assert!(temp_dir.path().join("corrupt.heic").is_file());
    }
}
