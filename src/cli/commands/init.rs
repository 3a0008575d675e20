//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "courier.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Courier configuration");
        println!();

        // Check if file already exists
        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        // Generate configuration content
        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        // Write to file
        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Create a .env file with your credentials:");
                println!("     - Set COURIER_REMOTE_USERNAME and COURIER_REMOTE_PASSWORD");
                println!("     - Set COURIER_BP_CONNECTION (if delivering to Best Practice)");
                println!("     - Set COURIER_MD_CONNECTION (if delivering to Medical Director)");
                println!("  3. Validate configuration: courier validate-config");
                println!("  4. Run the delivery service: courier run");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Courier Configuration File
# Clinical results delivery service

[application]
log_level = "info"

[remote_api]
base_url = "https://results.example.com/api/"
username = "${COURIER_REMOTE_USERNAME}"
password = "${COURIER_REMOTE_PASSWORD}"
software_id = 1

[local_api]
# Explicit endpoint skips remote config and discovery
# endpoint = "https://clinic-server:5100"
port = 5100

[delivery]
delay_ms = 60000
variant = "observation-result"  # observation-result | referral

[emr]
# hostname = "RECEPTION-1"
# bp_connection_string = "${COURIER_BP_CONNECTION}"
# md_connection_string = "${COURIER_MD_CONNECTION}"

[stream]
bind = "0.0.0.0:7010"
idle_timeout_seconds = 60

[logging]
local_enabled = true
local_path = "/var/log/courier"
local_rotation = "daily"
local_max_size_mb = 100
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Courier Configuration File
# Clinical results delivery service
#
# This file contains all configuration options with examples and explanations.
#
# Local configuration is the lowest-precedence layer: each delivery cycle
# fetches configuration from the remote results API, and remote values
# override the ones below.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Remote Results API
# ============================================================================
[remote_api]
# Base URL of the remote results API
base_url = "https://results.example.com/api/"

# Account credentials for the login call (use environment variables)
username = "${COURIER_REMOTE_USERNAME}"
password = "${COURIER_REMOTE_PASSWORD}"

# Software id sent with the system-config request
software_id = 1

# TLS/SSL verification
tls_verify = true

# Request timeout in seconds
timeout_seconds = 30

# ============================================================================
# Local API (serves unsent records)
# ============================================================================
[local_api]
# Explicit endpoint. When unset here and in the remote configuration, the
# endpoint is discovered over UDP multicast each cycle.
# endpoint = "https://clinic-server:5100"

# Port the local API listens on (used to build discovered endpoints)
port = 5100

# TLS/SSL verification (clinic servers often use self-signed certificates)
tls_verify = true

# Request timeout in seconds
timeout_seconds = 30

# ============================================================================
# UDP Discovery of the Local API Host
# ============================================================================
[discovery]
# Multicast group address
multicast_address = "239.255.90.61"

# Port to bind and listen on for the reply
multicast_port = 5986

# Port the probe datagram is sent to
target_port = 5987

# Seconds to wait for a reply before giving up
timeout_seconds = 20

# ============================================================================
# Message Delivery
# ============================================================================
[delivery]
# Delay between polling cycles in milliseconds
delay_ms = 60000

# Message construction variant: "observation-result" or "referral"
variant = "observation-result"

# Write every message here instead of the per-EMR import directories
# output_dir = "/srv/courier/outbox"

# Software identity stamped into message headers
software_name = "Courier Message Service"
software_organization = "Courier Health"

# ============================================================================
# EMR Database Access (import-directory lookups)
# ============================================================================
[emr]
# Hostname used for Best Practice report-path matching
# (unset = ask the operating system)
# hostname = "RECEPTION-1"

# Best Practice database connection string
# bp_connection_string = "${COURIER_BP_CONNECTION}"

# Medical Director database connection string
# md_connection_string = "${COURIER_MD_CONNECTION}"

# ============================================================================
# Stream Front End
# ============================================================================
[stream]
# Listen address for the framed TCP front end
bind = "0.0.0.0:7010"

# Seconds a connection may sit idle before it is closed
idle_timeout_seconds = 60

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Enable local file logging
local_enabled = true

# Local log file path
local_path = "/var/log/courier"

# Log rotation (daily or size)
local_rotation = "daily"

# Maximum log file size in MB
local_max_size_mb = 100
"#
        .to_string()
    }
}
