// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Registry transport.
//!
//! [`RegistryTransport`] performs one network call for an already encoded
//! payload. [`HttpTransport`] is the reqwest-backed implementation used in
//! production; tests substitute their own.

use crate::config::RegistryConfig;
use crate::error::TransportError;
use reqwest::header::CONTENT_TYPE;
use std::future::Future;
use tracing::debug;
use url::Url;

/// Name of the header carrying the caller's signature.
pub const SIGNATURE_HEADER: &str = "Signature";

/// Status and body returned by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    /// The registry acknowledges a created document with exactly 200.
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Performs the registry call for a serialized document.
///
/// Implementations return `Ok` for any HTTP response, whatever its status;
/// `Err` means no response was obtained.
pub trait RegistryTransport: Send + Sync {
    fn send(
        &self,
        payload: String,
        signature: &str,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

/// HTTP transport posting JSON documents to the registry.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: Url,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport for the configured endpoint.
    pub fn new(config: &RegistryConfig) -> Result<Self, TransportError> {
        let endpoint = Url::parse(&config.endpoint)?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl RegistryTransport for HttpTransport {
    async fn send(
        &self,
        payload: String,
        signature: &str,
    ) -> Result<TransportResponse, TransportError> {
        debug!(endpoint = %self.endpoint, bytes = payload.len(), "Posting document");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(SIGNATURE_HEADER, signature)
            .body(payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }
}
