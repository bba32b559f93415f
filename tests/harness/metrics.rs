// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Metrics collected while workers hold permits.

use registry_rate_gate::{RegistryTransport, TransportError, TransportResponse};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Tracks how many operations run at once.
#[derive(Debug, Default)]
pub struct ConcurrencyProbe {
    current: AtomicUsize,
    peak: AtomicUsize,
    total: AtomicUsize,
}

impl ConcurrencyProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an operation as started.
    pub fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.total.fetch_add(1, Ordering::SeqCst);
    }

    /// Mark an operation as finished.
    pub fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    /// Highest number of simultaneous operations observed.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

/// Transport that answers 200 after a fixed delay, recording when each
/// call was admitted and how many overlapped.
#[derive(Debug)]
pub struct RecordingTransport {
    delay: Duration,
    probe: ConcurrencyProbe,
    admissions: Mutex<Vec<Instant>>,
}

impl RecordingTransport {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            probe: ConcurrencyProbe::new(),
            admissions: Mutex::new(Vec::new()),
        }
    }

    pub fn probe(&self) -> &ConcurrencyProbe {
        &self.probe
    }

    /// Admission instants, sorted.
    pub fn admissions(&self) -> Vec<Instant> {
        let mut admissions = self.admissions.lock().unwrap().clone();
        admissions.sort();
        admissions
    }
}

impl RegistryTransport for RecordingTransport {
    async fn send(
        &self,
        _payload: String,
        _signature: &str,
    ) -> Result<TransportResponse, TransportError> {
        self.admissions.lock().unwrap().push(Instant::now());
        self.probe.enter();
        tokio::time::sleep(self.delay).await;
        self.probe.exit();
        Ok(TransportResponse {
            status: 200,
            body: "{}".to_string(),
        })
    }
}
