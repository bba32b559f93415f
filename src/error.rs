// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the rate gate and document submission.

use thiserror::Error;

/// Errors returned by [`RateGate`](crate::gate::RateGate).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("Request limit must be greater than zero")]
    ZeroLimit,

    #[error("Window duration must be greater than zero")]
    ZeroWindow,

    /// The window cannot be scheduled because now + window overflows.
    #[error("Window duration is too long to schedule")]
    WindowTooLong,

    /// The caller stopped waiting before a permit was granted.
    #[error("Wait for permit cancelled: {0}")]
    Cancelled(String),

    #[error("Rate gate has been shut down")]
    Shutdown,
}

/// Errors raised by a [`RegistryTransport`](crate::transport::RegistryTransport).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid registry endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("Registry request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Errors returned by [`DocumentSubmitter`](crate::submitter::DocumentSubmitter).
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Wait for permit cancelled: {reason}")]
    CancelledWait { reason: String },

    #[error("Rate gate has been shut down")]
    Shutdown,

    /// The gate rejected its own construction parameters.
    #[error("Rate gate misconfigured: {0}")]
    GateConfig(GateError),

    #[error("Failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    /// The registry answered with a status other than 200.
    #[error("Registry rejected document with status {status}: {body}")]
    TransportFailure { status: u16, body: String },

    /// The request never produced a response.
    #[error(transparent)]
    TransportFault(#[from] TransportError),
}

impl SubmissionError {
    /// HTTP status reported by the registry, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::TransportFailure { status, .. } => Some(*status),
            Self::TransportFault(TransportError::Request(err)) => {
                err.status().map(|s| s.as_u16())
            }
            _ => None,
        }
    }

    /// Whether the failure came from the registry call rather than the gate.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            Self::TransportFailure { .. } | Self::TransportFault(_)
        )
    }
}

impl From<GateError> for SubmissionError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Cancelled(reason) => Self::CancelledWait { reason },
            GateError::Shutdown => Self::Shutdown,
            err @ (GateError::ZeroLimit | GateError::ZeroWindow | GateError::WindowTooLong) => {
                Self::GateConfig(err)
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Unknown time unit: {0:?}")]
    UnknownTimeUnit(String),

    #[error(transparent)]
    Gate(#[from] GateError),
}
