//! Delivery coordinator - main orchestrator for the delivery process
//!
//! This module coordinates one delivery cycle end to end: remote login and
//! configuration retrieval, effective-config resolution (with discovery
//! when nothing names the local API), record fetching and the batch
//! procedure. The poll loop drives cycles on a delay; the stream front end
//! feeds pushed batches through the same coordinator via
//! [`RecordProcessor`].

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::api::ApiClient;
use crate::adapters::discovery::discover_local_endpoint;
use crate::adapters::emr::{EmrPathRepository, PostgresEmrPaths};
use crate::config::{ConfigDecryptor, CourierConfig, EffectiveConfig, PassthroughDecryptor, RemoteConfig};
use crate::core::deliver::directory::{local_hostname, DirectoryResolver};
use crate::core::message::builder::SoftwareInfo;
use crate::core::pipeline::batch::BatchProcessor;
use crate::core::pipeline::control::ServiceSignals;
use crate::core::pipeline::summary::BatchSummary;
use crate::domain::record::ResultRecord;
use crate::domain::Result;

/// Processes one batch of records and reports the outcome
///
/// The stream front end depends on this trait rather than the concrete
/// coordinator.
#[async_trait]
pub trait RecordProcessor: Send + Sync {
    /// Run the batch procedure over the given records
    async fn process(&self, records: Vec<ResultRecord>) -> Result<BatchSummary>;
}

/// Outcome of one polling cycle
#[derive(Debug)]
pub struct CycleReport {
    /// Batch summary for the cycle's records
    pub summary: BatchSummary,

    /// Delay to observe before the next cycle
    pub next_delay: Duration,
}

/// Delivery coordinator
pub struct DeliveryCoordinator {
    config: CourierConfig,
    decryptor: Arc<dyn ConfigDecryptor>,
    repository: Option<Arc<dyn EmrPathRepository>>,
}

impl DeliveryCoordinator {
    /// Create a coordinator over the local configuration
    pub fn new(config: CourierConfig) -> Self {
        Self {
            config,
            decryptor: Arc::new(PassthroughDecryptor),
            repository: None,
        }
    }

    /// Replace the decryptor applied to remote configuration values
    pub fn with_decryptor(mut self, decryptor: Arc<dyn ConfigDecryptor>) -> Self {
        self.decryptor = decryptor;
        self
    }

    /// Use a fixed path repository instead of the per-cycle database one
    pub fn with_repository(mut self, repository: Arc<dyn EmrPathRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Local configuration this coordinator was built over
    pub fn config(&self) -> &CourierConfig {
        &self.config
    }

    /// Run one polling cycle
    ///
    /// Remote configuration failures degrade to local config; only the
    /// record fetch itself can fail the cycle.
    ///
    /// # Errors
    ///
    /// Returns an error when the unsent-record fetch fails. The caller
    /// logs it and retries after the configured delay.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let (remote, token) = self.fetch_remote_state().await;
        let effective = self.resolve_effective(remote, true).await;

        let mut local_client = ApiClient::new(
            &effective.local_api_endpoint,
            Duration::from_secs(self.config.local_api.timeout_seconds),
            self.config.local_api.tls_verify,
        )?;
        local_client.set_token(token);

        let records = local_client.fetch_unsent_records().await?;
        tracing::info!(
            count = records.len(),
            endpoint = %effective.local_api_endpoint,
            "Fetched unsent records"
        );

        let summary = self.process_with_effective(&records, &effective).await;
        summary.log_summary();

        Ok(CycleReport {
            summary,
            next_delay: effective.service_delay,
        })
    }

    /// Drive polling cycles until shutdown
    ///
    /// A failed cycle is logged and retried after the locally configured
    /// delay; the pause flag is honored between cycles, never mid-cycle.
    pub async fn run_loop(&self, mut signals: ServiceSignals) {
        tracing::info!("Starting delivery poll loop");

        while !signals.is_shutdown() {
            if signals.is_paused() {
                tracing::info!("Delivery paused");
                signals.resumed_or_shutdown().await;
                if signals.is_shutdown() {
                    break;
                }
                tracing::info!("Delivery resumed");
            }

            let delay = match self.run_cycle().await {
                Ok(report) => report.next_delay,
                Err(e) => {
                    tracing::error!(error = %e, "Delivery cycle failed");
                    Duration::from_millis(self.config.delivery.delay_ms)
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = signals.shutdown_requested() => break,
            }
        }

        tracing::info!("Delivery poll loop stopped");
    }

    /// Log in and fetch the remote configuration
    ///
    /// Any failure along the way degrades to `(None, None)`; the cycle
    /// proceeds on local configuration alone.
    async fn fetch_remote_state(&self) -> (Option<RemoteConfig>, Option<String>) {
        let mut client = match ApiClient::from_remote_config(&self.config.remote_api) {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(error = %e, "Remote API unusable; using local configuration");
                return (None, None);
            }
        };

        let session = match client
            .login(
                &self.config.remote_api.username,
                &self.config.remote_api.password,
            )
            .await
        {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Remote login failed; using local configuration");
                return (None, None);
            }
        };

        let remote = match client
            .fetch_remote_config(
                session.account_id,
                self.config.remote_api.software_id,
                self.decryptor.as_ref(),
            )
            .await
        {
            Ok(remote) => Some(remote),
            Err(e) => {
                tracing::warn!(error = %e, "Remote config fetch failed; using local configuration");
                None
            }
        };

        (remote, Some(session.token))
    }

    /// Merge configuration layers, invoking discovery only when the local
    /// API endpoint is named nowhere
    async fn resolve_effective(
        &self,
        remote: Option<RemoteConfig>,
        allow_discovery: bool,
    ) -> EffectiveConfig {
        let discovered = if allow_discovery
            && EffectiveConfig::needs_discovery(&self.config, remote.as_ref())
        {
            match discover_local_endpoint(&self.config.discovery, self.config.local_api.port).await
            {
                Ok(endpoint) => Some(endpoint),
                Err(e) => {
                    tracing::warn!(error = %e, "Discovery failed; using default endpoint");
                    None
                }
            }
        } else {
            None
        };

        EffectiveConfig::resolve(&self.config, remote.as_ref(), discovered)
    }

    async fn process_with_effective(
        &self,
        records: &[ResultRecord],
        effective: &EffectiveConfig,
    ) -> BatchSummary {
        let repository = self.repository.clone().unwrap_or_else(|| {
            Arc::new(PostgresEmrPaths::new(
                effective.bp_connection_string.clone(),
                effective.md_connection_string.clone(),
            ))
        });

        let hostname = local_hostname(self.config.emr.hostname.as_deref());
        let mut resolver = DirectoryResolver::new(
            effective.output_dir_override.clone(),
            hostname,
            repository,
        );

        let processor = BatchProcessor::new(
            self.config.delivery.variant,
            SoftwareInfo::from_config(&self.config.delivery),
        );
        processor.process_batch(records, &mut resolver).await
    }
}

#[async_trait]
impl RecordProcessor for DeliveryCoordinator {
    /// Batches pushed over the stream reuse the remote-config merge but
    /// never trigger discovery: the records are already in hand.
    async fn process(&self, records: Vec<ResultRecord>) -> Result<BatchSummary> {
        let (remote, _token) = self.fetch_remote_state().await;
        let effective = self.resolve_effective(remote, false).await;

        let summary = self.process_with_effective(&records, &effective).await;
        summary.log_summary();
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::emr::EmrKind;
    use tempfile::tempdir;

    fn test_config(output_dir: Option<&str>) -> CourierConfig {
        // Port 9 (discard) refuses connections immediately, so remote
        // fetches degrade without waiting out a timeout.
        let mut config: CourierConfig = toml::from_str(
            r#"
            [application]

            [remote_api]
            base_url = "http://127.0.0.1:9"
            username = "clinic"
            password = "secret"

            [local_api]
            endpoint = "http://127.0.0.1:9"
            "#,
        )
        .unwrap();
        config.delivery.output_dir = output_dir.map(str::to_string);
        config
    }

    fn record(patient_id: &str) -> ResultRecord {
        let mut record = ResultRecord::default();
        record.patient.id = Some(patient_id.to_string());
        record.patient.target_emr = EmrKind::BestPractice;
        record.observation.identifier = Some("14647-2".to_string());
        record.observation.identifier_text = Some("Cholesterol".to_string());
        record
    }

    #[tokio::test]
    async fn test_pushed_batch_delivers_on_local_config_alone() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path().to_str());
        let coordinator = DeliveryCoordinator::new(config);

        let summary = coordinator
            .process(vec![record("8173"), record("8174")])
            .await
            .unwrap();

        assert_eq!(summary.written, 2);
        assert_eq!(summary.failed, 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_cycle_fails_when_record_fetch_fails() {
        let dir = tempdir().unwrap();
        let coordinator = DeliveryCoordinator::new(test_config(dir.path().to_str()));

        // Local API at a refused port: remote degradation is silent but
        // the record fetch itself must surface.
        assert!(coordinator.run_cycle().await.is_err());
    }

    #[tokio::test]
    async fn test_run_loop_stops_on_shutdown() {
        let dir = tempdir().unwrap();
        let coordinator = DeliveryCoordinator::new(test_config(dir.path().to_str()));
        let (control, signals) = crate::core::pipeline::control::control_channel();

        control.shutdown();
        tokio::time::timeout(Duration::from_secs(5), coordinator.run_loop(signals))
            .await
            .unwrap();
    }
}
