//! Results API request and response models
//!
//! Wire shapes for the remote results API. Field names on the wire are
//! camelCase.

use serde::{Deserialize, Serialize};

/// Login request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_name: String,
    pub password: String,
}

/// Successful login response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub user_name: String,

    /// Bearer token attached to every later call
    pub token: String,

    pub account_id: i64,
}

/// System configuration request body
///
/// Both identifiers travel as strings regardless of their local types.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRequest {
    pub account_id: String,
    pub software_id: String,
}
