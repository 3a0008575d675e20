//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Courier using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Courier - Clinical Results Delivery Service
#[derive(Parser, Debug)]
#[command(name = "courier")]
#[command(version, about, long_about = None)]
#[command(author = "Courier Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "courier.toml", env = "COURIER_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "COURIER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the polling delivery service
    Run(commands::run::RunArgs),

    /// Serve the framed TCP front end for pushed batches
    Serve(commands::serve::ServeArgs),

    /// Push a JSON file of records to a running stream front end
    Send(commands::send::SendArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::parse_from(["courier", "run"]);
        assert_eq!(cli.config, "courier.toml");
        assert!(matches!(cli.command, Commands::Run(_)));
    }

    #[test]
    fn test_cli_parse_run_once() {
        let cli = Cli::parse_from(["courier", "run", "--once"]);
        match cli.command {
            Commands::Run(args) => assert!(args.once),
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["courier", "--config", "custom.toml", "run"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["courier", "--log-level", "debug", "run"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_serve_with_bind() {
        let cli = Cli::parse_from(["courier", "serve", "--bind", "127.0.0.1:9500"]);
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.bind, Some("127.0.0.1:9500".to_string()));
            }
            _ => panic!("expected serve command"),
        }
    }

    #[test]
    fn test_cli_parse_send() {
        let cli = Cli::parse_from(["courier", "send", "--file", "records.json"]);
        match cli.command {
            Commands::Send(args) => {
                assert_eq!(args.file, "records.json");
                assert_eq!(args.addr, "127.0.0.1:7010");
            }
            _ => panic!("expected send command"),
        }
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["courier", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["courier", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
