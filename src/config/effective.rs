//! Per-cycle effective configuration
//!
//! Each orchestration cycle merges three layers into one [`EffectiveConfig`]:
//! remote config fetched from the results API (highest precedence), the
//! local TOML config, and, for the local API endpoint only, a UDP-discovered
//! address. Resolution is a pure merge and never fails; a value absent from
//! every layer falls back to a hard-coded default. Whitespace-only strings
//! count as absent, so a blanked-out remote field does not shadow local
//! config.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::ExposeSecret;
use serde::Deserialize;

use super::schema::{CourierConfig, DiscoverySettings};
use super::secret::{secret_string, ConfigDecryptor, DecryptError, SecretString};

/// Configuration fields served by the remote results API
///
/// Every field is optional; absent or empty values fall through to local
/// config during resolution.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteConfig {
    pub service_delay_milliseconds: Option<u64>,
    pub message_output_dir: Option<String>,
    pub local_api_endpoint: Option<String>,
    pub bp_connection_string: Option<String>,
    pub md_connection_string: Option<String>,
}

impl RemoteConfig {
    /// Decrypts the connection-string fields in place
    ///
    /// A decryption failure leaves the affected value unchanged: plaintext
    /// deployments rely on this with the passthrough decryptor, while a
    /// value that looked encrypted but failed to decrypt is kept and logged.
    pub fn decrypt_secrets(&mut self, decryptor: &dyn ConfigDecryptor) {
        for field in [
            &mut self.bp_connection_string,
            &mut self.md_connection_string,
        ] {
            if let Some(value) = field {
                match decryptor.decrypt(value) {
                    Ok(plain) => *value = plain,
                    Err(DecryptError::NotEncrypted) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "Keeping connection string as delivered");
                    }
                }
            }
        }
    }
}

/// Resolved configuration for one orchestration cycle
///
/// Built once at the start of a cycle and discarded at its end.
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    /// Delay before the next polling cycle
    pub service_delay: Duration,

    /// When set, every message is written here regardless of EMR kind
    pub output_dir_override: Option<PathBuf>,

    /// Endpoint serving unsent records
    pub local_api_endpoint: String,

    /// Discovery parameters in effect for this cycle
    pub discovery: DiscoverySettings,

    /// Best Practice database connection string
    pub bp_connection_string: Option<SecretString>,

    /// Medical Director database connection string
    pub md_connection_string: Option<SecretString>,
}

impl EffectiveConfig {
    /// Merges the three configuration layers
    ///
    /// Precedence per field: non-empty remote value, then local config,
    /// then (endpoint only) the discovered address, then a hard-coded
    /// default.
    pub fn resolve(
        local: &CourierConfig,
        remote: Option<&RemoteConfig>,
        discovered: Option<String>,
    ) -> Self {
        let service_delay = remote
            .and_then(|r| r.service_delay_milliseconds)
            .map(Duration::from_millis)
            .unwrap_or_else(|| Duration::from_millis(local.delivery.delay_ms));

        let output_dir_override = remote
            .and_then(|r| non_empty(r.message_output_dir.as_deref()))
            .or_else(|| non_empty(local.delivery.output_dir.as_deref()))
            .map(PathBuf::from);

        let local_api_endpoint = remote
            .and_then(|r| non_empty(r.local_api_endpoint.as_deref()))
            .or_else(|| non_empty(local.local_api.endpoint.as_deref()))
            .or_else(|| non_empty(discovered.as_deref()))
            .unwrap_or_else(|| format!("https://localhost:{}", local.local_api.port));

        let bp_connection_string = remote
            .and_then(|r| non_empty(r.bp_connection_string.as_deref()))
            .map(secret_string)
            .or_else(|| non_empty_secret(&local.emr.bp_connection_string));

        let md_connection_string = remote
            .and_then(|r| non_empty(r.md_connection_string.as_deref()))
            .map(secret_string)
            .or_else(|| non_empty_secret(&local.emr.md_connection_string));

        Self {
            service_delay,
            output_dir_override,
            local_api_endpoint,
            discovery: local.discovery.clone(),
            bp_connection_string,
            md_connection_string,
        }
    }

    /// True when endpoint resolution would have to fall back to discovery
    pub fn needs_discovery(local: &CourierConfig, remote: Option<&RemoteConfig>) -> bool {
        remote
            .and_then(|r| non_empty(r.local_api_endpoint.as_deref()))
            .is_none()
            && non_empty(local.local_api.endpoint.as_deref()).is_none()
    }
}

/// Trims and drops empty strings
pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn non_empty_secret(value: &Option<SecretString>) -> Option<SecretString> {
    value
        .as_ref()
        .filter(|s| !s.expose_secret().is_empty())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{
        ApplicationConfig, DeliveryConfig, EmrConfig, LocalApiConfig, LoggingConfig,
        RemoteApiConfig, StreamConfig,
    };
    use crate::config::PassthroughDecryptor;

    fn local_config() -> CourierConfig {
        CourierConfig {
            application: ApplicationConfig {
                log_level: "info".to_string(),
            },
            remote_api: RemoteApiConfig {
                base_url: "https://results.example.com/api/".to_string(),
                username: "svc-courier".to_string(),
                password: secret_string("hunter2".to_string()),
                software_id: 3,
                tls_verify: true,
                timeout_seconds: 30,
            },
            local_api: LocalApiConfig::default(),
            discovery: DiscoverySettings::default(),
            delivery: DeliveryConfig::default(),
            emr: EmrConfig::default(),
            stream: StreamConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_resolve_all_defaults() {
        let local = local_config();
        let effective = EffectiveConfig::resolve(&local, None, None);

        assert_eq!(effective.service_delay, Duration::from_millis(60_000));
        assert_eq!(effective.output_dir_override, None);
        assert_eq!(effective.local_api_endpoint, "https://localhost:5100");
        assert!(effective.bp_connection_string.is_none());
        assert!(effective.md_connection_string.is_none());
    }

    #[test]
    fn test_remote_values_win() {
        let mut local = local_config();
        local.delivery.output_dir = Some("/local/out".to_string());
        local.local_api.endpoint = Some("https://local-host:5100".to_string());

        let remote = RemoteConfig {
            service_delay_milliseconds: Some(15_000),
            message_output_dir: Some("/remote/out".to_string()),
            local_api_endpoint: Some("https://remote-host:5100".to_string()),
            bp_connection_string: Some("postgresql://remote/bp".to_string()),
            md_connection_string: None,
        };

        let effective = EffectiveConfig::resolve(&local, Some(&remote), None);

        assert_eq!(effective.service_delay, Duration::from_millis(15_000));
        assert_eq!(
            effective.output_dir_override,
            Some(PathBuf::from("/remote/out"))
        );
        assert_eq!(effective.local_api_endpoint, "https://remote-host:5100");
        assert_eq!(
            effective.bp_connection_string.unwrap().expose_secret(),
            "postgresql://remote/bp"
        );
    }

    #[test]
    fn test_empty_remote_values_fall_through() {
        let mut local = local_config();
        local.delivery.output_dir = Some("/local/out".to_string());
        local.emr.bp_connection_string = Some(secret_string("postgresql://local/bp".to_string()));

        let remote = RemoteConfig {
            message_output_dir: Some("   ".to_string()),
            bp_connection_string: Some(String::new()),
            ..RemoteConfig::default()
        };

        let effective = EffectiveConfig::resolve(&local, Some(&remote), None);

        assert_eq!(
            effective.output_dir_override,
            Some(PathBuf::from("/local/out"))
        );
        assert_eq!(
            effective.bp_connection_string.unwrap().expose_secret(),
            "postgresql://local/bp"
        );
    }

    #[test]
    fn test_discovered_endpoint_used_as_fallback() {
        let local = local_config();
        let effective = EffectiveConfig::resolve(
            &local,
            None,
            Some("https://clinic-server:5100".to_string()),
        );
        assert_eq!(effective.local_api_endpoint, "https://clinic-server:5100");
    }

    #[test]
    fn test_configured_endpoint_beats_discovery() {
        let mut local = local_config();
        local.local_api.endpoint = Some("https://local-host:5100".to_string());

        let effective = EffectiveConfig::resolve(
            &local,
            None,
            Some("https://clinic-server:5100".to_string()),
        );
        assert_eq!(effective.local_api_endpoint, "https://local-host:5100");
    }

    #[test]
    fn test_empty_local_secret_counts_as_absent() {
        let mut local = local_config();
        local.emr.bp_connection_string = Some(secret_string(String::new()));

        let effective = EffectiveConfig::resolve(&local, None, None);
        assert!(effective.bp_connection_string.is_none());
    }

    #[test]
    fn test_needs_discovery() {
        let mut local = local_config();
        assert!(EffectiveConfig::needs_discovery(&local, None));

        let remote = RemoteConfig {
            local_api_endpoint: Some("https://remote-host:5100".to_string()),
            ..RemoteConfig::default()
        };
        assert!(!EffectiveConfig::needs_discovery(&local, Some(&remote)));

        local.local_api.endpoint = Some("https://local-host:5100".to_string());
        assert!(!EffectiveConfig::needs_discovery(&local, None));

        // Empty strings still need discovery
        local.local_api.endpoint = Some(String::new());
        assert!(EffectiveConfig::needs_discovery(&local, None));
    }

    #[test]
    fn test_decrypt_secrets_passthrough_keeps_values() {
        let mut remote = RemoteConfig {
            bp_connection_string: Some("postgresql://plain/bp".to_string()),
            ..RemoteConfig::default()
        };
        remote.decrypt_secrets(&PassthroughDecryptor);
        assert_eq!(
            remote.bp_connection_string.as_deref(),
            Some("postgresql://plain/bp")
        );
    }

    #[test]
    fn test_decrypt_secrets_applies_decryptor() {
        struct Upper;
        impl ConfigDecryptor for Upper {
            fn decrypt(&self, value: &str) -> Result<String, DecryptError> {
                Ok(value.to_uppercase())
            }
        }

        let mut remote = RemoteConfig {
            md_connection_string: Some("cipher".to_string()),
            ..RemoteConfig::default()
        };
        remote.decrypt_secrets(&Upper);
        assert_eq!(remote.md_connection_string.as_deref(), Some("CIPHER"));
    }
}
