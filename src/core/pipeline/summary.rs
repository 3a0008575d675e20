//! Batch summary and reporting
//!
//! This module defines structures for tracking and reporting delivery results.

use crate::domain::record::RecordIdentity;
use std::path::PathBuf;
use std::time::Duration;

/// Per-record delivery outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Message file written at the contained path
    Written(PathBuf),

    /// Record was silent; acknowledged without writing
    Silent,

    /// Record could not be delivered
    Failed(String),
}

/// Outcome of one record within a batch
#[derive(Debug, Clone)]
pub struct DeliveryOutcome {
    /// Record identity
    pub identity: RecordIdentity,

    /// What happened to the record
    pub outcome: RecordOutcome,
}

/// Summary of one delivery batch
///
/// Always produced, even when every record fails.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    /// Number of files written
    pub written: usize,

    /// Number of silent records acknowledged
    pub silent: usize,

    /// Number of records that could not be delivered
    pub failed: usize,

    /// Duration of the batch
    pub duration: Duration,

    /// Per-record outcomes in input order
    pub outcomes: Vec<DeliveryOutcome>,
}

impl BatchSummary {
    /// Create a new empty batch summary
    pub fn new() -> Self {
        Self {
            written: 0,
            silent: 0,
            failed: 0,
            duration: Duration::from_secs(0),
            outcomes: Vec::new(),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Record a written file
    pub fn add_written(&mut self, identity: RecordIdentity, path: PathBuf) {
        self.written += 1;
        self.outcomes.push(DeliveryOutcome {
            identity,
            outcome: RecordOutcome::Written(path),
        });
    }

    /// Record a silent record
    pub fn add_silent(&mut self, identity: RecordIdentity) {
        self.silent += 1;
        self.outcomes.push(DeliveryOutcome {
            identity,
            outcome: RecordOutcome::Silent,
        });
    }

    /// Record a failed record
    pub fn add_failed(&mut self, identity: RecordIdentity, reason: impl Into<String>) {
        self.failed += 1;
        self.outcomes.push(DeliveryOutcome {
            identity,
            outcome: RecordOutcome::Failed(reason.into()),
        });
    }

    /// Total number of records accounted for
    pub fn total(&self) -> usize {
        self.written + self.silent + self.failed
    }

    /// Check if the batch was successful (no failures)
    pub fn is_successful(&self) -> bool {
        self.failed == 0
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total() == 0 {
            return 100.0;
        }
        ((self.written + self.silent) as f64 / self.total() as f64) * 100.0
    }

    /// One-line rendition of the counts, also sent to stream clients
    pub fn summary_line(&self) -> String {
        format!(
            "written={} silent={} failed={}",
            self.written, self.silent, self.failed
        )
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            written = self.written,
            silent = self.silent,
            failed = self.failed,
            duration_ms = self.duration.as_millis() as u64,
            success_rate = format!("{:.2}%", self.success_rate()),
            "Batch completed"
        );

        if self.failed > 0 {
            tracing::warn!(failed = self.failed, "Batch completed with failures");
            for outcome in &self.outcomes {
                if let RecordOutcome::Failed(reason) = &outcome.outcome {
                    tracing::warn!(
                        patient_id = %outcome.identity.patient_id,
                        observation = %outcome.identity.observation_identifier,
                        reason = %reason,
                        "Record delivery failed"
                    );
                }
            }
        }
    }
}

impl Default for BatchSummary {
    fn default() -> Self {
        Self::new()
    }
}
