//! # Outcome and Report Module
//!
//! Questo modulo definisce l'outcome per singolo file e il report finale.
//!
//! ## Responsabilità:
//! - `ConversionOutcome`: risultato immutabile di un singolo task
//! - `RunStatus`: stato terminale della run (ok, no_input, aborted, invalid)
//! - `ConversionReport`: riduzione finale dello stream di outcome
//! - `ReportAggregator`: fold puro sugli outcome in ordine di arrivo
//!
//! L'aggregatore non riordina e non ritenta: conta successi e fallimenti,
//! preserva l'ordine di arrivo dei path falliti e calcola la durata media
//! evitando la divisione per zero quando non è stato tentato alcun file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Outcome of a single conversion task, produced exactly once per task
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutcome {
    pub source_path: PathBuf,
    pub succeeded: bool,
    pub duration: Duration,
    /// Why the conversion failed, when `succeeded` is false
    pub error: Option<String>,
    /// Non-fatal post-success problem (timestamp copy, original deletion)
    pub warning: Option<String>,
}

impl ConversionOutcome {
    pub fn success(source_path: PathBuf, duration: Duration, warning: Option<String>) -> Self {
        Self {
            source_path,
            succeeded: true,
            duration,
            error: None,
            warning,
        }
    }

    pub fn failure(
        source_path: PathBuf,
        duration: Duration,
        error: impl std::fmt::Display,
    ) -> Self {
        Self {
            source_path,
            succeeded: false,
            duration,
            error: Some(error.to_string()),
            warning: None,
        }
    }
}

/// Terminal status of a conversion run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Run completed (some files may still have failed individually)
    Ok,
    /// Nothing to do: no candidate files, or all outputs already exist
    NoInput,
    /// User declined the destructive output-directory prompt
    AbortedByUser,
    /// Source directory missing or not a directory
    InvalidTarget,
}

/// Final summary of a conversion run
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub status: RunStatus,
    pub files_attempted: usize,
    pub files_converted: usize,
    pub files_failed: usize,
    /// Failed source paths, in outcome-arrival order
    pub failed_paths: Vec<PathBuf>,
    pub total_duration: Duration,
    pub average_duration: Duration,
}

impl ConversionReport {
    /// A report with zero counts, for runs that never dispatched a task
    pub fn empty(status: RunStatus, total_duration: Duration) -> Self {
        Self {
            status,
            files_attempted: 0,
            files_converted: 0,
            files_failed: 0,
            failed_paths: Vec::new(),
            total_duration,
            average_duration: Duration::ZERO,
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Attempted: {} | Converted: {} | Failed: {} | Total: {:.2}s | Avg per file: {:.2}s",
            self.files_attempted,
            self.files_converted,
            self.files_failed,
            self.total_duration.as_secs_f64(),
            self.average_duration.as_secs_f64(),
        )
    }
}

/// Reduces the outcome stream into the final report
pub struct ReportAggregator;

impl ReportAggregator {
    /// Pure fold over outcomes in arrival order
    pub fn aggregate(outcomes: &[ConversionOutcome], total_duration: Duration) -> ConversionReport {
        let mut converted = 0;
        let mut failed = 0;
        let mut failed_paths = Vec::new();
        let mut busy = Duration::ZERO;

        for outcome in outcomes {
            busy += outcome.duration;
            if outcome.succeeded {
                converted += 1;
            } else {
                failed += 1;
                failed_paths.push(outcome.source_path.clone());
            }
        }

        let attempted = outcomes.len();
        let average_duration = if attempted == 0 {
            Duration::ZERO
        } else {
            busy / attempted as u32
        };

        ConversionReport {
            status: RunStatus::Ok,
            files_attempted: attempted,
            files_converted: converted,
            files_failed: failed,
            failed_paths,
            total_duration,
            average_duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(name: &str, millis: u64) -> ConversionOutcome {
        ConversionOutcome::success(PathBuf::from(name), Duration::from_millis(millis), None)
    }

    fn ko(name: &str, millis: u64) -> ConversionOutcome {
        ConversionOutcome::failure(PathBuf::from(name), Duration::from_millis(millis), "boom")
    }

    #[test]
    fn test_aggregate_counts_and_invariant() {
        let outcomes = vec![ok("a.heic", 100), ko("b.heic", 50), ok("c.heic", 150)];
        let report = ReportAggregator::aggregate(&outcomes, Duration::from_millis(200));

        assert_eq!(report.files_attempted, 3);
        assert_eq!(report.files_converted, 2);
        assert_eq!(report.files_failed, 1);
        assert_eq!(
            report.files_converted + report.files_failed,
            report.files_attempted
        );
        assert_eq!(report.average_duration, Duration::from_millis(100));
    }

    #[test]
    fn test_aggregate_empty_has_zero_average() {
        let report = ReportAggregator::aggregate(&[], Duration::from_secs(1));
        assert_eq!(report.files_attempted, 0);
        assert_eq!(report.average_duration, Duration::ZERO);
    }

    #[test]
    fn test_failed_paths_preserve_arrival_order() {
        let outcomes = vec![ko("z.heic", 10), ok("m.heic", 10), ko("a.heic", 10)];
        let report = ReportAggregator::aggregate(&outcomes, Duration::from_millis(30));

        assert_eq!(
            report.failed_paths,
            vec![PathBuf::from("z.heic"), PathBuf::from("a.heic")]
        );
    }

    #[test]
    fn test_outcome_constructors() {
        let s = ConversionOutcome::success(
            PathBuf::from("a.heic"),
            Duration::ZERO,
            Some("timestamp copy failed".into()),
        );
        assert!(s.succeeded);
        assert!(s.error.is_none());
        assert!(s.warning.is_some());

        let f = ConversionOutcome::failure(PathBuf::from("b.heic"), Duration::ZERO, "bad");
        assert!(!f.succeeded);
        assert_eq!(f.error.as_deref(), Some("bad"));
    }
}
