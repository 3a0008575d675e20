//! Core business logic for Courier.
//!
//! This module contains the core business logic and orchestration for
//! message delivery.
//!
//! # Modules
//!
//! - [`pipeline`] - Cycle orchestration, batch processing, and control
//! - [`message`] - Message construction and wire serialization
//! - [`deliver`] - Import-directory resolution and file delivery
//!
//! # Delivery Workflow
//!
//! The typical delivery cycle:
//!
//! 1. **Login**: Authenticate against the remote results API
//! 2. **Fetch Config**: Retrieve remote configuration and merge it over local
//! 3. **Fetch Records**: Request unsent records from the local API
//! 4. **Build**: Convert each record into a delimited message
//! 5. **Resolve**: Locate the import directory for each record's EMR
//! 6. **Write**: Deliver message files, isolating per-record failures
//! 7. **Report**: Produce the batch summary
//!
//! # Example
//!
//! ```rust,no_run
//! use courier::config::load_config;
//! use courier::core::pipeline::DeliveryCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration
//! let config = load_config("courier.toml")?;
//!
//! // Create delivery coordinator
//! let coordinator = DeliveryCoordinator::new(config);
//!
//! // Execute one cycle
//! let report = coordinator.run_cycle().await?;
//!
//! println!("Written: {}", report.summary.written);
//! println!("Silent: {}", report.summary.silent);
//! println!("Failed: {}", report.summary.failed);
//! # Ok(())
//! # }
//! ```

pub mod deliver;
pub mod message;
pub mod pipeline;
