//! EMR path lookup abstraction
//!
//! This module defines the trait that EMR database adapters implement to
//! expose the locations messages must be written to.

use crate::domain::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// EMR path repository trait
///
/// Each supported EMR keeps its import locations in its own database.
/// Implementations answer the two lookups the delivery pipeline needs;
/// `None` means the database is reachable but holds no matching row.
#[async_trait]
pub trait EmrPathRepository: Send + Sync {
    /// Look up the Best Practice report path for a host
    ///
    /// # Arguments
    ///
    /// * `hostname` - Machine name the path must be registered for
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(path))` for the lowest-numbered active row bound to
    /// the host, `Ok(None)` when no row matches.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be reached or queried.
    async fn bp_report_path(&self, hostname: &str) -> Result<Option<PathBuf>>;

    /// Look up the Medical Director import directory
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(path))` for the first enabled import configuration,
    /// `Ok(None)` when none is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be reached or queried.
    async fn md_import_dir(&self) -> Result<Option<PathBuf>>;
}

/// Fixed path repository
///
/// Serves preconfigured paths without touching a database. Used by tests
/// and by deployments that pin their import directories.
#[derive(Debug, Clone, Default)]
pub struct FixedEmrPaths {
    bp_report_path: Option<PathBuf>,
    md_import_dir: Option<PathBuf>,
}

impl FixedEmrPaths {
    /// Create a repository with no paths configured
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Best Practice report path
    pub fn with_bp_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.bp_report_path = Some(path.into());
        self
    }

    /// Set the Medical Director import directory
    pub fn with_md_import_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.md_import_dir = Some(path.into());
        self
    }
}

#[async_trait]
impl EmrPathRepository for FixedEmrPaths {
    async fn bp_report_path(&self, _hostname: &str) -> Result<Option<PathBuf>> {
        Ok(self.bp_report_path.clone())
    }

    async fn md_import_dir(&self) -> Result<Option<PathBuf>> {
        Ok(self.md_import_dir.clone())
    }
}
