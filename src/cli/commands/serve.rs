//! Serve command implementation
//!
//! This module implements the `serve` command: the stream front end that
//! accepts framed TCP connections pushing record batches.

use crate::config::load_config;
use crate::core::pipeline::control::ServiceSignals;
use crate::core::pipeline::DeliveryCoordinator;
use crate::log_error_with_context;
use crate::server::stream::serve;
use clap::Args;
use std::sync::Arc;

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Override the listen address
    #[arg(short, long)]
    pub bind: Option<String>,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(&self, config_path: &str, signals: ServiceSignals) -> anyhow::Result<i32> {
        tracing::info!("Starting serve command");

        // Load configuration
        let mut config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                log_error_with_context!(&e, "Failed to load configuration");
                eprintln!("Configuration error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        // Apply CLI overrides
        if let Some(bind) = &self.bind {
            tracing::info!(bind = %bind, "Overriding listen address from CLI");
            config.stream.bind = bind.clone();
        }

        // Validate configuration after overrides
        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let stream_config = config.stream.clone();
        let coordinator = Arc::new(DeliveryCoordinator::new(config));

        println!("🚀 Stream front end listening on {}...", stream_config.bind);
        match serve(&stream_config, coordinator, signals).await {
            Ok(()) => {
                println!("✅ Stream front end stopped.");
                Ok(0)
            }
            Err(e) => {
                tracing::error!(error = %e, "Stream front end failed");
                eprintln!("Stream front end failed: {e}");
                Ok(4) // Connection error exit code
            }
        }
    }
}
