//! Results API adapter
//!
//! This module provides the HTTP client for the remote results API and
//! the local API, including login, system configuration retrieval and
//! unsent record fetching.

pub mod client;
pub mod models;

pub use client::ApiClient;
pub use models::{ConfigRequest, LoginRequest, SessionInfo};
