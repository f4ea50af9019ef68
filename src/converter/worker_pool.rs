//! # Worker Pool Module
//!
//! Scheduler a concorrenza limitata: al massimo `workers` conversioni in
//! volo, outcome raccolti in ordine di completamento tramite canale mpsc.
//!
//! ## Garanzie:
//! - Esattamente un outcome per ogni task dispatchato (no drop, no duplicati)
//! - Un panic dentro un worker diventa un outcome fallito, mai un abort della run
//! - Il progress sink viene notificato a ogni arrivo, in ordine di arrivo
//! - Un segnale di stop ferma il dispatch e lascia finire i task in volo

use crate::{
    codec::ImageCodec,
    config::Config,
    converter::{ConversionTask, ProgressTracker, TaskConverter},
    report::ConversionOutcome,
};
use anyhow::Result;
use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, Semaphore};
use tracing::{debug, warn};

/// Bounded-concurrency scheduler for conversion tasks
pub struct WorkerPool {
    config: Config,
    codec: Arc<dyn ImageCodec>,
    stop_receiver: Option<broadcast::Receiver<()>>,
}

impl WorkerPool {
    pub fn new(config: Config, codec: Arc<dyn ImageCodec>) -> Self {
        Self {
            config,
            codec,
            stop_receiver: None,
        }
    }

    /// Pool with external shutdown support: when the sender signals, the
    /// pool stops dispatching new tasks and lets in-flight tasks finish.
    pub fn new_with_cancellation(
        config: Config,
        codec: Arc<dyn ImageCodec>,
        stop_receiver: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            config,
            codec,
            stop_receiver: Some(stop_receiver),
        }
    }

    /// Check if a stop signal has been received
    fn should_stop(&mut self) -> bool {
        if let Some(ref mut receiver) = self.stop_receiver {
            match receiver.try_recv() {
                Ok(_) => return true,
                Err(broadcast::error::TryRecvError::Empty) => return false,
                Err(broadcast::error::TryRecvError::Lagged(_)) => return true,
                Err(broadcast::error::TryRecvError::Closed) => return false,
            }
        }
        false
    }

    /// Run all tasks and collect their outcomes in completion order.
    ///
    /// Every dispatched task yields exactly one outcome; the progress
    /// tracker is notified after each arrival.
    pub async fn run(
        &mut self,
        tasks: Vec<ConversionTask>,
        progress: &ProgressTracker,
    ) -> Result<Vec<ConversionOutcome>> {
        let semaphore = Arc::new(Semaphore::new(self.config.workers));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut dispatched = 0usize;

        for task in tasks {
            if self.should_stop() {
                warn!("Stop signal received, not dispatching remaining tasks");
                break;
            }

            // Il permit limita i task in volo; viene rilasciato a fine task
            let permit = semaphore.clone().acquire_owned().await?;
            let worker = TaskConverter::new(self.config.clone(), Arc::clone(&self.codec));
            let tx = tx.clone();
            let source = task.source_path.clone();

            tokio::spawn(async move {
                let _permit = permit;
                let outcome = match std::panic::AssertUnwindSafe(worker.convert(task))
                    .catch_unwind()
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        ConversionOutcome::failure(source, Duration::ZERO, "worker panicked")
                    }
                };
                // Il receiver vive fino a fine raccolta: il send non fallisce
                let _ = tx.send(outcome);
            });
            dispatched += 1;
        }
        drop(tx);

        debug!("Dispatched {} tasks, collecting outcomes", dispatched);

        let mut outcomes = Vec::with_capacity(dispatched);
        while let Some(outcome) = rx.recv().await {
            progress.handle_outcome(&outcome).await;
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}
