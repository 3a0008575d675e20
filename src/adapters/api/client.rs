//! Results API client
//!
//! One client per base URL. The same type fronts both the remote results
//! API (login, system configuration) and the local API serving unsent
//! records; the poll loop copies the remote session token onto the local
//! client so every call carries the same bearer.

use crate::config::{ConfigDecryptor, RemoteApiConfig, RemoteConfig, SecretString};
use crate::domain::errors::ApiError;
use crate::domain::record::ResultRecord;
use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

use super::models::{ConfigRequest, LoginRequest, SessionInfo};

/// HTTP client for a results API endpoint
#[derive(Debug)]
pub struct ApiClient {
    base_url: Url,
    client: Client,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for a base URL
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidEndpoint`] when the base URL does not
    /// parse.
    pub fn new(base_url: &str, timeout: Duration, tls_verify: bool) -> Result<Self, ApiError> {
        // Relative endpoint paths require the base to end with a slash
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| ApiError::InvalidEndpoint(format!("{normalized}: {e}")))?;

        let mut builder = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(30));
        if !tls_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::ConnectionFailed(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            client,
            token: None,
        })
    }

    /// Create a client for the configured remote results API
    pub fn from_remote_config(config: &RemoteApiConfig) -> Result<Self, ApiError> {
        Self::new(
            &config.base_url,
            Duration::from_secs(config.timeout_seconds),
            config.tls_verify,
        )
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Current session token, if any
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Replace the session token
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Log in and keep the returned bearer token for later calls
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::AuthenticationFailed`] when the response carries
    /// no usable token.
    pub async fn login(
        &mut self,
        username: &str,
        password: &SecretString,
    ) -> Result<SessionInfo, ApiError> {
        let body = LoginRequest {
            user_name: username.to_string(),
            password: password.expose_secret().as_ref().to_string(),
        };

        let session: SessionInfo = self.post_json("login", &body).await?;
        if session.token.trim().is_empty() {
            return Err(ApiError::AuthenticationFailed(
                "login response carried no token".to_string(),
            ));
        }

        self.token = Some(session.token.clone());
        tracing::info!(
            user = %session.user_name,
            account_id = session.account_id,
            "Logged in to results API"
        );
        Ok(session)
    }

    /// Fetch the remote system configuration for this account
    ///
    /// Encrypted fields are passed through the decryptor; values it does
    /// not recognize stay as received.
    pub async fn fetch_remote_config(
        &self,
        account_id: i64,
        software_id: u32,
        decryptor: &dyn ConfigDecryptor,
    ) -> Result<RemoteConfig, ApiError> {
        let body = ConfigRequest {
            account_id: account_id.to_string(),
            software_id: software_id.to_string(),
        };

        let mut remote: RemoteConfig = self.post_json("SystemConfig", &body).await?;
        remote.decrypt_secrets(decryptor);
        Ok(remote)
    }

    /// Fetch the batch of unsent result records
    pub async fn fetch_unsent_records(&self) -> Result<Vec<ResultRecord>, ApiError> {
        self.get_json("GetUnsentMessages").await
    }

    /// GET a JSON payload from a path relative to the base URL
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }

    /// POST a JSON body to a path relative to the base URL
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let response = self
            .authorize(self.client.post(url).json(body))
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidEndpoint(format!("{path}: {e}")))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()));
    }

    let message = response.text().await.unwrap_or_default();
    if status.is_server_error() {
        Err(ApiError::ServerError {
            status: status.as_u16(),
            message,
        })
    } else {
        Err(ApiError::ClientError {
            status: status.as_u16(),
            message,
        })
    }
}

fn transport_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout(e.to_string())
    } else {
        ApiError::ConnectionFailed(e.to_string())
    }
}
