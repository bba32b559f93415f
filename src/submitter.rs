// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Rate-limited document submission.

use crate::error::SubmissionError;
use crate::gate::RateGate;
use crate::transport::{RegistryTransport, TransportResponse};
use serde::Serialize;
use std::future::{self, Future};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Wraps each registry call with a permit from a shared [`RateGate`].
///
/// Cheap to share: clone the `Arc<RateGate>` into as many submitters as
/// needed, or share one submitter behind an `Arc`.
#[derive(Debug)]
pub struct DocumentSubmitter<T> {
    gate: Arc<RateGate>,
    transport: T,
}

impl<T: RegistryTransport> DocumentSubmitter<T> {
    pub fn new(gate: Arc<RateGate>, transport: T) -> Self {
        Self { gate, transport }
    }

    pub fn gate(&self) -> &Arc<RateGate> {
        &self.gate
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Submit a document, waiting for a permit as long as necessary.
    ///
    /// Returns the registry response on status 200. Failures are returned
    /// as-is and never retried.
    pub async fn submit<D>(
        &self,
        document: &D,
        signature: &str,
    ) -> Result<TransportResponse, SubmissionError>
    where
        D: Serialize + ?Sized,
    {
        self.submit_until(document, signature, future::pending()).await
    }

    /// Submit a document, abandoning the wait for a permit once `cancel`
    /// completes. A cancelled submission consumes no capacity.
    pub async fn submit_until<D, F>(
        &self,
        document: &D,
        signature: &str,
        cancel: F,
    ) -> Result<TransportResponse, SubmissionError>
    where
        D: Serialize + ?Sized,
        F: Future<Output = ()>,
    {
        let permit = self.gate.acquire_until(cancel).await?;

        // An encode failure drops the permit, which releases it.
        let payload = serde_json::to_string(document)?;
        let result = self.transport.send(payload, signature).await;
        self.gate.release(permit);

        let response = result.map_err(|err| {
            warn!(error = %err, "Registry request failed");
            SubmissionError::from(err)
        })?;

        if !response.is_success() {
            warn!(
                status = response.status,
                body = %response.body,
                "Registry rejected document"
            );
            return Err(SubmissionError::TransportFailure {
                status: response.status,
                body: response.body,
            });
        }

        info!(status = response.status, "Document submitted");
        debug!(body = %response.body, "Registry response");
        Ok(response)
    }
}
