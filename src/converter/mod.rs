//! # Converter Module
//!
//! Pipeline di conversione suddivisa in sottomoduli:
//! - `batch_converter`: Orchestratore principale della run
//! - `worker_pool`: Scheduler a concorrenza limitata
//! - `task_converter`: Worker per la conversione di singoli file
//! - `path_resolver`: Logica di calcolo path di output centralizzata
//! - `progress_tracker`: Gestione progress unificata

pub mod batch_converter;
pub mod path_resolver;
pub mod progress_tracker;
pub mod task_converter;
pub mod worker_pool;

pub use batch_converter::BatchConverter;
pub use path_resolver::PathResolver;
pub use progress_tracker::ProgressTracker;
pub use task_converter::TaskConverter;
pub use worker_pool::WorkerPool;

use std::path::PathBuf;

/// One unit of work: a source file and its computed destination.
/// Created by the planning phase, consumed exactly once by a worker.
#[derive(Debug, Clone)]
pub struct ConversionTask {
    pub source_path: PathBuf,
    pub dest_path: PathBuf,
}
