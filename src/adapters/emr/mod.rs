//! EMR database adapters
//!
//! This module provides access to the import locations each EMR keeps in
//! its own database, behind a repository trait so the delivery pipeline
//! never takes a database dependency directly.

pub mod postgres;
pub mod repository;

pub use postgres::PostgresEmrPaths;
pub use repository::{EmrPathRepository, FixedEmrPaths};
