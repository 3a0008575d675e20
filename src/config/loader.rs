//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::CourierConfig;
use super::secret::secret_string;
use crate::domain::errors::CourierError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into CourierConfig
/// 4. Applies environment variable overrides (COURIER_* prefix)
/// 5. Validates the configuration
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use courier::config::loader::load_config;
///
/// let config = load_config("courier.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<CourierConfig> {
    let path = path.as_ref();

    // Check if file exists
    if !path.exists() {
        return Err(CourierError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    // Read file contents
    let contents = fs::read_to_string(path).map_err(|e| {
        CourierError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    // Perform environment variable substitution
    let contents = substitute_env_vars(&contents)?;

    // Parse TOML
    let mut config: CourierConfig = toml::from_str(&contents)
        .map_err(|e| CourierError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    // Apply environment variable overrides
    apply_env_overrides(&mut config)?;

    // Validate configuration
    config.validate().map_err(|e| {
        CourierError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Arguments
///
/// * `input` - String containing ${VAR} placeholders
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    // Process line by line to skip comments
    for line in input.lines() {
        let trimmed = line.trim_start();

        // Skip comment lines - don't process env vars in comments
        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        // Process non-comment lines for env var substitution
        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(CourierError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using COURIER_* prefix
///
/// Environment variables follow the pattern: COURIER_<SECTION>_<KEY>
/// For example: COURIER_REMOTE_API_BASE_URL, COURIER_DELIVERY_DELAY_MS
///
/// # Arguments
///
/// * `config` - Mutable reference to the configuration to update
fn apply_env_overrides(config: &mut CourierConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("COURIER_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Remote API overrides
    if let Ok(val) = std::env::var("COURIER_REMOTE_API_BASE_URL") {
        config.remote_api.base_url = val;
    }
    if let Ok(val) = std::env::var("COURIER_REMOTE_API_USERNAME") {
        config.remote_api.username = val;
    }
    if let Ok(val) = std::env::var("COURIER_REMOTE_API_PASSWORD") {
        config.remote_api.password = secret_string(val);
    }
    if let Ok(val) = std::env::var("COURIER_REMOTE_API_SOFTWARE_ID") {
        if let Ok(id) = val.parse() {
            config.remote_api.software_id = id;
        }
    }
    if let Ok(val) = std::env::var("COURIER_REMOTE_API_TLS_VERIFY") {
        config.remote_api.tls_verify = val.parse().unwrap_or(true);
    }

    // Local API overrides
    if let Ok(val) = std::env::var("COURIER_LOCAL_API_ENDPOINT") {
        config.local_api.endpoint = Some(val);
    }
    if let Ok(val) = std::env::var("COURIER_LOCAL_API_PORT") {
        if let Ok(port) = val.parse() {
            config.local_api.port = port;
        }
    }

    // Delivery overrides
    if let Ok(val) = std::env::var("COURIER_DELIVERY_DELAY_MS") {
        if let Ok(delay) = val.parse() {
            config.delivery.delay_ms = delay;
        }
    }
    if let Ok(val) = std::env::var("COURIER_DELIVERY_VARIANT") {
        if let Ok(variant) = val.parse() {
            config.delivery.variant = variant;
        }
    }
    if let Ok(val) = std::env::var("COURIER_DELIVERY_OUTPUT_DIR") {
        config.delivery.output_dir = Some(val);
    }
    if let Ok(val) = std::env::var("COURIER_DELIVERY_SOFTWARE_NAME") {
        config.delivery.software_name = val;
    }

    // EMR overrides
    if let Ok(val) = std::env::var("COURIER_EMR_HOSTNAME") {
        config.emr.hostname = Some(val);
    }
    if let Ok(val) = std::env::var("COURIER_EMR_BP_CONNECTION_STRING") {
        config.emr.bp_connection_string = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("COURIER_EMR_MD_CONNECTION_STRING") {
        config.emr.md_connection_string = Some(secret_string(val));
    }

    // Stream overrides
    if let Ok(val) = std::env::var("COURIER_STREAM_BIND") {
        config.stream.bind = val;
    }
    if let Ok(val) = std::env::var("COURIER_STREAM_IDLE_TIMEOUT_SECONDS") {
        if let Ok(seconds) = val.parse() {
            config.stream.idle_timeout_seconds = seconds;
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("COURIER_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("COURIER_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
