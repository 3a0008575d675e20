//! PostgreSQL-backed EMR path lookups
//!
//! Both supported EMRs keep their import locations in PostgreSQL. Lookups
//! are rare (at most once per EMR kind per delivery cycle), so this adapter
//! opens a short-lived connection per query instead of holding a pool.

use crate::config::SecretString;
use crate::domain::{CourierError, Result};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use std::path::PathBuf;
use tokio_postgres::NoTls;

use super::repository::EmrPathRepository;

/// Lowest-numbered active report path registered for the host
const BP_REPORT_PATH_QUERY: &str = "SELECT reportpath FROM reportpaths \
     WHERE recordstatus = 1 AND UPPER(TRIM(computer)) = UPPER(TRIM($1)) \
     ORDER BY recordid ASC LIMIT 1";

/// First enabled import configuration that is not marked deleted
const MD_IMPORT_DIR_QUERY: &str = "SELECT import_directory FROM md_updown_config \
     WHERE enabled = 'Y' AND sdi_enabled = 'Y' \
     AND stamp_action_code IS DISTINCT FROM 'D' LIMIT 1";

/// PostgreSQL EMR path repository
///
/// Holds one optional connection string per EMR. A lookup against an EMR
/// with no configured connection string fails; the delivery pipeline
/// records that as a per-group failure.
pub struct PostgresEmrPaths {
    bp_connection_string: Option<SecretString>,
    md_connection_string: Option<SecretString>,
}

impl PostgresEmrPaths {
    /// Create a repository from the per-EMR connection strings
    pub fn new(
        bp_connection_string: Option<SecretString>,
        md_connection_string: Option<SecretString>,
    ) -> Self {
        Self {
            bp_connection_string,
            md_connection_string,
        }
    }

    fn require_dsn<'a>(secret: &'a Option<SecretString>, emr: &str) -> Result<&'a str> {
        match secret {
            Some(value) => Ok(value.expose_secret().as_ref()),
            None => Err(CourierError::Database(format!(
                "No {emr} connection string configured"
            ))),
        }
    }

    async fn connect(dsn: &str) -> Result<tokio_postgres::Client> {
        let (client, connection) = tokio_postgres::connect(dsn, NoTls)
            .await
            .map_err(|e| CourierError::Database(format!("Failed to connect to EMR database: {e}")))?;

        // The connection object drives the socket; it finishes when the
        // client is dropped at the end of the lookup.
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(error = %e, "EMR database connection closed with error");
            }
        });

        Ok(client)
    }
}

#[async_trait]
impl EmrPathRepository for PostgresEmrPaths {
    async fn bp_report_path(&self, hostname: &str) -> Result<Option<PathBuf>> {
        let dsn = Self::require_dsn(&self.bp_connection_string, "Best Practice")?;
        let client = Self::connect(dsn).await?;

        let row = client
            .query_opt(BP_REPORT_PATH_QUERY, &[&hostname])
            .await
            .map_err(|e| {
                CourierError::Database(format!("Best Practice report path query failed: {e}"))
            })?;

        Ok(row.map(|r| PathBuf::from(r.get::<_, String>(0))))
    }

    async fn md_import_dir(&self) -> Result<Option<PathBuf>> {
        let dsn = Self::require_dsn(&self.md_connection_string, "Medical Director")?;
        let client = Self::connect(dsn).await?;

        let row = client
            .query_opt(MD_IMPORT_DIR_QUERY, &[])
            .await
            .map_err(|e| {
                CourierError::Database(format!("Medical Director import dir query failed: {e}"))
            })?;

        Ok(row.map(|r| PathBuf::from(r.get::<_, String>(0))))
    }
}
