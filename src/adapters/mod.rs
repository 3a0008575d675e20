//! External system integrations for Courier.
//!
//! This module provides adapters for integrating with external systems:
//!
//! - [`api`] - HTTP client for the remote results API and the local API
//! - [`discovery`] - UDP multicast discovery of the local API host
//! - [`emr`] - EMR database lookups for import directories (trait-based)
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies
//! and enable testing with mock implementations. The EMR layer uses
//! trait-based abstraction so directory lookups can be faked in tests.
//!
//! # API Adapter
//!
//! One client type serves both APIs; the remote one issues the session
//! token that the local one presents:
//!
//! ```rust,no_run
//! use courier::adapters::api::ApiClient;
//! use courier::config::secret_string;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut remote = ApiClient::new(
//!     "https://results.example.com/api/",
//!     Duration::from_secs(30),
//!     true,
//! )?;
//! let session = remote.login("svc-courier", &secret_string("pw".to_string())).await?;
//!
//! let mut local = ApiClient::new(
//!     "https://localhost:7080/",
//!     Duration::from_secs(30),
//!     false,
//! )?;
//! local.set_token(Some(session.token));
//! let records = local.fetch_unsent_records().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # EMR Adapter
//!
//! Import-directory lookups go through [`emr::EmrPathRepository`]; the
//! production implementation queries the EMR databases over PostgreSQL:
//!
//! ```rust,no_run
//! use courier::adapters::emr::{EmrPathRepository, PostgresEmrPaths};
//! use courier::config::secret_string;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = PostgresEmrPaths::new(
//!     Some(secret_string("postgresql://bp:pw@emr-host/bp".to_string())),
//!     None,
//! );
//! let path = repository.bp_report_path("RECEPTION-1").await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod discovery;
pub mod emr;
