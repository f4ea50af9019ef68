//! # Progress Tracking Module
//!
//! Sink thread-safe per gli outcome: aggiorna i contatori condivisi, la
//! progress bar e, se richiesto, emette gli eventi JSON. Le notifiche
//! arrivano dal pool in ordine di arrivo degli outcome e devono restare
//! economiche per non bloccare i worker.

use crate::{json_output::JsonMessage, progress::ProgressManager, report::ConversionOutcome};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Thread-safe progress sink shared by the pool and the orchestrator
#[derive(Clone)]
pub struct ProgressTracker {
    pub total_files: usize,
    completed: Arc<Mutex<usize>>,
    converted: Arc<Mutex<usize>>,
    failed: Arc<Mutex<usize>>,
    progress_manager: ProgressManager,
    json_output: bool,
}

impl ProgressTracker {
    /// Tracker with a visible progress bar
    pub fn new(total_files: usize, json_output: bool) -> Self {
        Self::build(total_files, json_output, ProgressManager::new(total_files as u64))
    }

    /// Tracker without terminal output, for tests
    pub fn hidden(total_files: usize, json_output: bool) -> Self {
        Self::build(
            total_files,
            json_output,
            ProgressManager::hidden(total_files as u64),
        )
    }

    fn build(total_files: usize, json_output: bool, progress_manager: ProgressManager) -> Self {
        Self {
            total_files,
            completed: Arc::new(Mutex::new(0)),
            converted: Arc::new(Mutex::new(0)),
            failed: Arc::new(Mutex::new(0)),
            progress_manager,
            json_output,
        }
    }

    /// Record one outcome: counters, bar message, JSON events
    pub async fn handle_outcome(&self, outcome: &ConversionOutcome) {
        let mut completed = self.completed.lock().await;
        *completed += 1;
        let completed_now = *completed;
        drop(completed);

        let name = outcome
            .source_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        if outcome.succeeded {
            let mut converted = self.converted.lock().await;
            *converted += 1;
            drop(converted);

            let message = match &outcome.warning {
                Some(warning) => format!("[WARN] {}: {}", name, warning),
                None => format!("[OK] {} ({:.2}s)", name, outcome.duration.as_secs_f64()),
            };
            self.progress_manager.update(&message);
        } else {
            let mut failed = self.failed.lock().await;
            *failed += 1;
            drop(failed);

            let message = format!(
                "[ERROR] {}: {}",
                name,
                outcome.error.as_deref().unwrap_or("unknown error")
            );
            self.progress_manager.update(&message);
        }

        if self.json_output {
            JsonMessage::file_complete(outcome).emit();
            JsonMessage::progress(
                completed_now,
                self.total_files,
                *self.converted.lock().await,
                *self.failed.lock().await,
            )
            .emit();
        }
    }

    /// Finalize the progress bar with a summary line
    pub fn finish(&self, summary: &str) {
        self.progress_manager.finish(summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[tokio::test]
    async fn test_handle_outcome_counts() {
        let tracker = ProgressTracker::hidden(3, false);

        tracker
            .handle_outcome(&ConversionOutcome::success(
                PathBuf::from("a.heic"),
                Duration::from_millis(10),
                None,
            ))
            .await;
        tracker
            .handle_outcome(&ConversionOutcome::failure(
                PathBuf::from("b.heic"),
                Duration::from_millis(10),
                "boom",
            ))
            .await;

        assert_eq!(*tracker.completed.lock().await, 2);
        assert_eq!(*tracker.converted.lock().await, 1);
        assert_eq!(*tracker.failed.lock().await, 1);
    }
}
