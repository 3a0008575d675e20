//! Delivery pipeline orchestration
//!
//! This module ties the delivery stages together:
//!
//! - [`coordinator`] - Cycle orchestration and the poll loop
//! - [`batch`] - Batch procedure over fetched records
//! - [`summary`] - Batch outcome accounting
//! - [`control`] - Pause and shutdown signalling

pub mod batch;
pub mod control;
pub mod coordinator;
pub mod summary;

pub use batch::BatchProcessor;
pub use control::{control_channel, ServiceControl, ServiceSignals};
pub use coordinator::{CycleReport, DeliveryCoordinator, RecordProcessor};
pub use summary::{BatchSummary, DeliveryOutcome, RecordOutcome};
