// Courier - Clinical Results Delivery Service
// Copyright (c) 2025 Courier Contributors
// Licensed under the MIT License

//! # Courier - Clinical Results Delivery
//!
//! Courier is a delivery service built in Rust that fetches clinical result
//! records from a results API and converts them into flat HL7 v2 message
//! files that EMR software (Best Practice, Medical Director) imports from
//! watched directories.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Fetching** unsent result records from a local results API
//! - **Building** delimited HL7 v2 messages (observation result or referral)
//! - **Resolving** per-EMR import directories from EMR databases
//! - **Writing** Latin-1 message files with per-record failure isolation
//!
//! ## Architecture
//!
//! Courier follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (pipeline, message construction, delivery)
//! - [`server`] - Framed TCP front end for pushed record batches
//! - [`adapters`] - External integrations (APIs, discovery, EMR databases)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use courier::config::load_config;
//! use courier::core::pipeline::DeliveryCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load configuration
//!     let config = load_config("courier.toml")?;
//!
//!     // Create delivery coordinator
//!     let coordinator = DeliveryCoordinator::new(config);
//!
//!     // Execute one delivery cycle
//!     let report = coordinator.run_cycle().await?;
//!
//!     println!("Delivered {} messages", report.summary.written);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! ### Message Construction
//!
//! Records become fixed-segment messages deterministically; the only
//! per-record failure is a missing identity field:
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use courier::config::{DeliveryConfig, MessageVariant};
//! use courier::core::message::{build_message, BuildContext, SoftwareInfo};
//! use courier::domain::record::ResultRecord;
//!
//! # fn example(record: &ResultRecord) -> Result<(), Box<dyn std::error::Error>> {
//! let software = SoftwareInfo::from_config(&DeliveryConfig::default());
//! let ctx = BuildContext::new(software, Utc::now());
//!
//! let message = build_message(record, MessageVariant::ObservationResult, &ctx)?;
//! println!("{}", message.serialize());
//! # Ok(())
//! # }
//! ```
//!
//! ### Directory Resolution
//!
//! Import directories come from the target EMR's own database, cached per
//! kind for the life of the resolver; a configured override wins over
//! everything:
//!
//! ```rust,no_run
//! use courier::adapters::emr::FixedEmrPaths;
//! use courier::core::deliver::DirectoryResolver;
//! use courier::domain::emr::EmrKind;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = Arc::new(FixedEmrPaths::new().with_bp_report_path("/import/bp"));
//! let mut resolver = DirectoryResolver::new(None, "RECEPTION-1".to_string(), repository);
//!
//! let dir = resolver.resolve(&EmrKind::BestPractice).await?;
//! println!("Importing via {}", dir.display());
//! # Ok(())
//! # }
//! ```
//!
//! ### Pushed Batches
//!
//! Besides polling, record batches can be pushed over a framed TCP
//! connection; the same batch procedure runs and the outcome line goes
//! back to the client:
//!
//! ```rust,no_run
//! use courier::config::load_config;
//! use courier::core::pipeline::{control_channel, DeliveryCoordinator};
//! use courier::server::stream::serve;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("courier.toml")?;
//! let stream_config = config.stream.clone();
//! let coordinator = Arc::new(DeliveryCoordinator::new(config));
//! let (_control, signals) = control_channel();
//!
//! serve(&stream_config, coordinator, signals).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Courier uses the [`domain::CourierError`] type for all errors:
//!
//! ```rust,no_run
//! use courier::domain::CourierError;
//!
//! fn example() -> Result<(), CourierError> {
//!     // Errors are automatically converted using the ? operator
//!     let config = courier::config::load_config("courier.toml")?;
//!     let _ = config;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Courier uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn, error};
//!
//! info!("Starting delivery cycle");
//! warn!(emr = "Genie", "Unsupported EMR software");
//! error!(error = "connection refused", "Record fetch failed");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod server;
