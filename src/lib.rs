// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Registry Rate Gate
//!
//! This crate submits documents to the registry's document creation API
//! without exceeding a fixed number of requests per time window:
//!
//! - Fixed-window rate gate with a hard reset at every window boundary
//! - Cancellable and time-bounded waits for a permit
//! - Clean shutdown of the replenishment ticker
//! - JSON document model matching the registry wire format
//! - Rate-limited submitter over a pluggable transport (reqwest by default)

pub mod config;
pub mod document;
pub mod error;
pub mod gate;
pub mod submitter;
pub mod transport;

pub use config::{Config, RateLimitConfig, RegistryConfig, TimeUnit};
pub use document::{Description, Document, Product};
pub use error::{ConfigError, GateError, SubmissionError, TransportError};
pub use gate::{Permit, RateGate};
pub use submitter::DocumentSubmitter;
pub use transport::{HttpTransport, RegistryTransport, TransportResponse};
