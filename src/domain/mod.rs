//! Domain models and types for Courier.
//!
//! This module contains the core domain models, types, and business rules
//! for Courier: the result-record data model, target-EMR kinds, the
//! doctor-name value, and the error hierarchy.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Result records** ([`ResultRecord`] and its sections)
//! - **Target EMR kinds** ([`EmrKind`])
//! - **Doctor names** ([`DoctorName`])
//! - **Error types** ([`CourierError`], [`ApiError`], [`DeliveryError`], [`StreamError`])
//! - **Result type alias** ([`Result`])
//!
//! # Leniency
//!
//! Record deserialization never fails on absent or unknown optional data:
//! missing fields default, unknown coding systems become the local code,
//! and unknown EMR names are carried as [`EmrKind::Other`] so they can be
//! grouped and reported downstream. Only the mandatory identity fields
//! (patient id, observation identifier) are enforced, and that happens at
//! message-build time.
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, CourierError>`]:
//!
//! ```rust
//! use courier::domain::{CourierError, Result};
//!
//! fn example() -> Result<()> {
//!     let config = courier::config::load_config("courier.toml")?;
//!     Ok(())
//! }
//! ```

pub mod doctor;
pub mod emr;
pub mod errors;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use doctor::DoctorName;
pub use emr::EmrKind;
pub use errors::{ApiError, CourierError, DeliveryError, StreamError};
pub use record::{
    ClinicalTrialInfo, CodingSystem, ObservationInfo, PatientInfo, RecordIdentity, ResultRecord,
    VisitInfo,
};
pub use result::Result;
