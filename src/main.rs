// Courier - Clinical Results Delivery Service
// Copyright (c) 2025 Courier Contributors
// Licensed under the MIT License

use clap::Parser;
use courier::cli::{Cli, Commands};
use courier::config::LoggingConfig;
use courier::core::pipeline::control::{control_channel, ServiceSignals};
use courier::logging::init_logging;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    // This is optional - if .env doesn't exist, it's silently ignored
    let _ = dotenvy::dotenv();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging with console-only config (no file logging for CLI)
    let log_level = cli.log_level.as_deref().unwrap_or("info");
    let logging_config = LoggingConfig {
        local_enabled: false, // Disable file logging for CLI
        local_path: String::new(),
        local_rotation: "daily".to_string(),
        local_max_size_mb: 100,
    };
    if let Err(e) = init_logging(log_level, &logging_config) {
        eprintln!("Failed to initialize logging: {e}");
        process::exit(5);
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Courier - Clinical Results Delivery Service"
    );

    // Create run/pause control channels for graceful shutdown
    let (control, signals) = control_channel();

    // Spawn signal handler task
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm =
                signal(SignalKind::terminate()).expect("Failed to create SIGTERM handler");
            let mut sigusr1 =
                signal(SignalKind::user_defined1()).expect("Failed to create SIGUSR1 handler");

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
                        println!("\n⚠️  Shutdown signal received, completing current batch...");
                        control.shutdown();
                        break;
                    }
                    _ = sigterm.recv() => {
                        tracing::info!("Received SIGTERM, initiating graceful shutdown...");
                        println!("\n⚠️  Shutdown signal received, completing current batch...");
                        control.shutdown();
                        break;
                    }
                    _ = sigusr1.recv() => {
                        let paused = control.toggle_pause();
                        tracing::info!(paused, "Received SIGUSR1, pause toggled");
                    }
                }
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            } else {
                tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
                println!("\n⚠️  Shutdown signal received, completing current batch...");
                control.shutdown();
            }
        }
    });

    // Execute command and get exit code
    let exit_code = match execute_command(&cli, signals).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5 // Fatal error exit code
        }
    };

    // Exit with appropriate code
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, signals: ServiceSignals) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Run(args) => args.execute(&cli.config, signals).await,
        Commands::Serve(args) => args.execute(&cli.config, signals).await,
        Commands::Send(args) => args.execute().await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
