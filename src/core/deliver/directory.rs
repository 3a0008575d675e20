//! Import directory resolution
//!
//! Maps an EMR kind to the directory message files are written into. The
//! configured override directory, when present, wins for every kind,
//! including kinds the service cannot otherwise deliver to. Without an
//! override the per-EMR repository is consulted.
//!
//! A resolver lives for one delivery cycle and caches each kind's outcome,
//! successful or not, so a batch never repeats a lookup.

use crate::adapters::emr::EmrPathRepository;
use crate::domain::emr::EmrKind;
use crate::domain::errors::DeliveryError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Resolves the hostname used for Best Practice path lookups
///
/// A configured value wins; otherwise the machine's own hostname is used.
pub fn local_hostname(configured: Option<&str>) -> String {
    match configured.map(str::trim).filter(|v| !v.is_empty()) {
        Some(name) => name.to_string(),
        None => gethostname::gethostname().to_string_lossy().into_owned(),
    }
}

/// Per-cycle import directory resolver
pub struct DirectoryResolver {
    override_dir: Option<PathBuf>,
    hostname: String,
    repository: Arc<dyn EmrPathRepository>,
    cache: HashMap<EmrKind, Result<PathBuf, DeliveryError>>,
}

impl DirectoryResolver {
    /// Create a resolver for one delivery cycle
    pub fn new(
        override_dir: Option<PathBuf>,
        hostname: String,
        repository: Arc<dyn EmrPathRepository>,
    ) -> Self {
        Self {
            override_dir,
            hostname,
            repository,
            cache: HashMap::new(),
        }
    }

    /// Resolve the import directory for an EMR kind
    ///
    /// The first resolution per kind performs the lookup; later calls
    /// replay the cached outcome.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::UnsupportedEmr`] for kinds without a
    /// lookup, [`DeliveryError::DirectoryNotFound`] when the lookup
    /// matches nothing and [`DeliveryError::DirectoryLookup`] when the
    /// lookup itself fails.
    pub async fn resolve(&mut self, kind: &EmrKind) -> Result<PathBuf, DeliveryError> {
        if let Some(cached) = self.cache.get(kind) {
            return cached.clone();
        }

        let resolved = self.lookup(kind).await;
        self.cache.insert(kind.clone(), resolved.clone());
        resolved
    }

    async fn lookup(&self, kind: &EmrKind) -> Result<PathBuf, DeliveryError> {
        // The override applies to every kind, supported or not
        if let Some(dir) = &self.override_dir {
            return Ok(dir.clone());
        }

        match kind {
            EmrKind::BestPractice => {
                self.found(kind, self.repository.bp_report_path(&self.hostname).await)
            }
            EmrKind::MedicalDirector => self.found(kind, self.repository.md_import_dir().await),
            EmrKind::Other(name) => Err(DeliveryError::UnsupportedEmr(name.clone())),
        }
    }

    fn found(
        &self,
        kind: &EmrKind,
        outcome: crate::domain::Result<Option<PathBuf>>,
    ) -> Result<PathBuf, DeliveryError> {
        match outcome {
            Ok(Some(path)) => Ok(path),
            Ok(None) => Err(DeliveryError::DirectoryNotFound(kind.name().to_string())),
            Err(e) => Err(DeliveryError::DirectoryLookup(e.to_string())),
        }
    }
}
