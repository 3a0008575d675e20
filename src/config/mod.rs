//! Configuration management for Courier.
//!
//! This module provides TOML-based configuration loading, parsing, and
//! validation, plus the per-cycle merge of local and remote configuration.
//!
//! # Overview
//!
//! Courier uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Environment variable overrides (`COURIER_*`)
//! - Default values for optional settings
//! - Comprehensive validation
//! - Type-safe configuration structs
//!
//! On top of the local file, each delivery cycle fetches configuration from
//! the remote results API and merges the two (remote wins) into an
//! [`EffectiveConfig`]; see [`effective`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use courier::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration from file
//! let config = load_config("courier.toml")?;
//!
//! // Access configuration sections
//! println!("Remote API: {}", config.remote_api.base_url);
//! println!("Cycle delay: {}ms", config.delivery.delay_ms);
//! println!("Stream bind: {}", config.stream.bind);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! The configuration is organized into sections:
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`RemoteApiConfig`] - Remote results API connection and credentials
//! - [`LocalApiConfig`] - Local API endpoint and port
//! - [`DiscoverySettings`] - UDP discovery of the local API host
//! - [`DeliveryConfig`] - Cycle delay, message variant, software identity
//! - [`EmrConfig`] - EMR database access for directory lookups
//! - [`StreamConfig`] - Framed TCP front end
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [remote_api]
//! base_url = "https://results.example.com/api/"
//! username = "svc-courier"
//! password = "${COURIER_REMOTE_PASSWORD}"
//! software_id = 3
//!
//! [delivery]
//! delay_ms = 60000
//! variant = "observation-result"
//!
//! [emr]
//! bp_connection_string = "${COURIER_BP_CONNECTION}"
//! ```
//!
//! # Environment Variables
//!
//! Use `${VAR_NAME}` syntax for environment variable substitution:
//!
//! ```bash
//! export COURIER_REMOTE_PASSWORD="secret-password"
//! export COURIER_BP_CONNECTION="postgresql://bp:pw@emr-host/bp"
//! ```
//!
//! # Validation
//!
//! Configuration is validated on load:
//!
//! ```rust,no_run
//! use courier::config::load_config;
//!
//! # fn example() {
//! match load_config("courier.toml") {
//!     Ok(config) => println!("Configuration valid"),
//!     Err(e) => eprintln!("Configuration error: {}", e),
//! }
//! # }
//! ```

pub mod effective;
pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use effective::{EffectiveConfig, RemoteConfig};
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, CourierConfig, DeliveryConfig, DiscoverySettings, EmrConfig,
    LocalApiConfig, LoggingConfig, MessageVariant, RemoteApiConfig, StreamConfig,
};
pub use secret::{
    secret_string, secret_string_opt, ConfigDecryptor, DecryptError, PassthroughDecryptor,
    SecretString, SecretValue,
};
