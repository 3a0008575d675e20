//! Batch delivery procedure
//!
//! This module runs one batch of result records through message
//! construction and file delivery. Records are grouped by target EMR so
//! each kind's import directory is resolved once; the records themselves
//! are delivered strictly in input order.
//!
//! Failure isolation: a failed record never aborts the rest of the batch,
//! and an EMR group whose directory cannot be resolved fails only its own
//! records. The summary accounts for every record either way.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::MessageVariant;
use crate::core::deliver::directory::DirectoryResolver;
use crate::core::deliver::writer::{deliver, Delivered};
use crate::core::message::builder::{build_message, BuildContext, SoftwareInfo};
use crate::domain::emr::EmrKind;
use crate::domain::errors::DeliveryError;
use crate::domain::record::ResultRecord;

use super::summary::BatchSummary;

/// Batch processor for result records
pub struct BatchProcessor {
    variant: MessageVariant,
    software: SoftwareInfo,
}

impl BatchProcessor {
    /// Create a new batch processor
    pub fn new(variant: MessageVariant, software: SoftwareInfo) -> Self {
        Self { variant, software }
    }

    /// Process a batch of records, stamping them with the current time
    pub async fn process_batch(
        &self,
        records: &[ResultRecord],
        resolver: &mut DirectoryResolver,
    ) -> BatchSummary {
        self.process_batch_at(records, resolver, Utc::now()).await
    }

    /// Process a batch of records with a pinned generation timestamp
    ///
    /// Each record is stamped one tick later than the previous one, so
    /// records sharing a (patient id, observation text) identity still
    /// get distinct filenames within the batch.
    pub async fn process_batch_at(
        &self,
        records: &[ResultRecord],
        resolver: &mut DirectoryResolver,
        generated_at: DateTime<Utc>,
    ) -> BatchSummary {
        let start = Instant::now();
        let mut summary = BatchSummary::new();
        let ctx = BuildContext::new(self.software.clone(), generated_at);

        // One directory per distinct EMR kind, resolved up front
        let mut directories: HashMap<EmrKind, Result<PathBuf, DeliveryError>> = HashMap::new();
        for record in records {
            let kind = record.target_emr().clone();
            if directories.contains_key(&kind) {
                continue;
            }
            let resolved = resolver.resolve(&kind).await;
            match &resolved {
                Ok(dir) => tracing::info!(
                    emr = %kind,
                    directory = %dir.display(),
                    "Resolved import directory"
                ),
                Err(e) => tracing::warn!(
                    emr = %kind,
                    error = %e,
                    "Import directory unavailable; group will be skipped"
                ),
            }
            directories.insert(kind, resolved);
        }

        for (index, record) in records.iter().enumerate() {
            let identity = record.identity();
            let stamped_at = generated_at + chrono::Duration::nanoseconds(100 * index as i64);
            let target_dir = match directories.get(record.target_emr()) {
                Some(Ok(dir)) => dir.clone(),
                Some(Err(e)) => {
                    summary.add_failed(identity, e.to_string());
                    continue;
                }
                None => {
                    summary.add_failed(identity, "import directory was not resolved");
                    continue;
                }
            };

            match self.deliver_one(record, &target_dir, &ctx, stamped_at).await {
                Ok(Delivered::Written(path)) => {
                    tracing::debug!(
                        patient_id = %identity.patient_id,
                        path = %path.display(),
                        "Message written"
                    );
                    summary.add_written(identity, path);
                }
                Ok(Delivered::Silent) => summary.add_silent(identity),
                Err(e) => {
                    tracing::warn!(
                        patient_id = %identity.patient_id,
                        observation = %identity.observation_identifier,
                        error = %e,
                        "Record delivery failed"
                    );
                    summary.add_failed(identity, e.to_string());
                }
            }
        }

        summary.with_duration(start.elapsed())
    }

    async fn deliver_one(
        &self,
        record: &ResultRecord,
        target_dir: &std::path::Path,
        ctx: &BuildContext,
        stamped_at: DateTime<Utc>,
    ) -> Result<Delivered, DeliveryError> {
        let message = build_message(record, self.variant, ctx)?;
        deliver(record, &message, target_dir, stamped_at).await
    }
}
