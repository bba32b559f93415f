// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate gate.
//!
//! A [`RateGate`] hands out at most `limit` permits per window. Releasing a
//! permit returns its capacity immediately; independently of releases, an
//! owned background ticker resets the available capacity to `limit` at every
//! window boundary. Capacity is therefore a per-window budget: a permit held
//! across a boundary does not keep new callers out of the next window.
//!
//! The available count and the closed flag share one mutex, and the periodic
//! reset takes that same mutex, so `0 <= available <= limit` holds at every
//! observable instant.

use crate::config::RateLimitConfig;
use crate::error::GateError;
use std::future::{self, Future};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Mutable gate state, guarded by [`Shared::state`].
#[derive(Debug)]
struct GateState {
    /// Permits currently unclaimed, always within `0..=limit`
    available: u32,
    /// Set once by `shutdown`
    closed: bool,
}

/// State shared between the gate, its permits and its ticker.
#[derive(Debug)]
struct Shared {
    limit: u32,
    window: Duration,
    state: Mutex<GateState>,
    /// Woken on every release, reset and shutdown
    capacity_changed: Notify,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, GateState> {
        // Every critical section leaves the counter within bounds, so a
        // poisoned lock still holds consistent state.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return one permit's worth of capacity, clamped to the limit.
    fn give_back(&self) {
        let available = {
            let mut state = self.lock();
            if state.available < self.limit {
                state.available += 1;
            }
            state.available
        };
        debug!(available, limit = self.limit, "Permit released");
        self.capacity_changed.notify_waiters();
    }

    /// Hard reset at a window boundary.
    fn reset(&self) {
        let restored = {
            let mut state = self.lock();
            if state.closed {
                return;
            }
            let restored = self.limit - state.available;
            state.available = self.limit;
            restored
        };
        debug!(restored, limit = self.limit, "Window elapsed, capacity reset");
        self.capacity_changed.notify_waiters();
    }
}

/// One unit of capacity issued by a [`RateGate`].
///
/// Dropping a permit releases it back to the gate that issued it. Use
/// [`RateGate::release`] or [`Permit::release`] to make the release explicit,
/// or [`Permit::forget`] to leave the capacity consumed until the next window.
#[must_use = "dropping a permit releases it immediately"]
#[derive(Debug)]
pub struct Permit {
    shared: Option<Arc<Shared>>,
}

impl Permit {
    fn new(shared: Arc<Shared>) -> Self {
        Self {
            shared: Some(shared),
        }
    }

    /// Release this permit.
    pub fn release(self) {
        drop(self);
    }

    /// Consume the permit without returning its capacity.
    ///
    /// The capacity comes back at the next window reset.
    pub fn forget(mut self) {
        self.shared = None;
    }
}

impl Drop for Permit {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            shared.give_back();
        }
    }
}

/// Admits at most `limit` operations per fixed window.
///
/// Must be created inside a Tokio runtime: construction spawns the
/// replenishment ticker. The ticker stops on [`RateGate::shutdown`] or when
/// the gate is dropped.
#[derive(Debug)]
pub struct RateGate {
    shared: Arc<Shared>,
    stop: watch::Sender<bool>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl RateGate {
    /// Create a gate issuing `limit` permits per `window`.
    ///
    /// The first reset happens one full window after creation.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn new(limit: u32, window: Duration) -> Result<Self, GateError> {
        if limit == 0 {
            return Err(GateError::ZeroLimit);
        }
        if window.is_zero() {
            return Err(GateError::ZeroWindow);
        }
        let first_reset = Instant::now()
            .checked_add(window)
            .ok_or(GateError::WindowTooLong)?;

        let shared = Arc::new(Shared {
            limit,
            window,
            state: Mutex::new(GateState {
                available: limit,
                closed: false,
            }),
            capacity_changed: Notify::new(),
        });

        let (stop, stop_rx) = watch::channel(false);
        let ticker = spawn_ticker(Arc::clone(&shared), first_reset, stop_rx);
        info!(limit, ?window, "Rate gate started");

        Ok(Self {
            shared,
            stop,
            ticker: Mutex::new(Some(ticker)),
        })
    }

    /// Create a gate from the rate limit configuration.
    pub fn from_config(config: &RateLimitConfig) -> Result<Self, GateError> {
        Self::new(config.request_limit, config.window_duration())
    }

    /// Maximum permits issued per window.
    pub fn limit(&self) -> u32 {
        self.shared.limit
    }

    /// Replenishment period.
    pub fn window(&self) -> Duration {
        self.shared.window
    }

    /// Permits currently unclaimed.
    pub fn available(&self) -> u32 {
        self.shared.lock().available
    }

    /// Whether [`RateGate::shutdown`] has been called.
    pub fn is_shutdown(&self) -> bool {
        self.shared.lock().closed
    }

    /// Claim a permit if one is available right now.
    pub fn try_acquire(&self) -> Result<Option<Permit>, GateError> {
        let available = {
            let mut state = self.shared.lock();
            if state.closed {
                return Err(GateError::Shutdown);
            }
            if state.available == 0 {
                return Ok(None);
            }
            state.available -= 1;
            state.available
        };
        debug!(available, limit = self.shared.limit, "Permit acquired");
        Ok(Some(Permit::new(Arc::clone(&self.shared))))
    }

    /// Wait until a permit is available and claim it.
    ///
    /// Dropping the returned future abandons the wait without consuming
    /// capacity.
    pub async fn acquire(&self) -> Result<Permit, GateError> {
        self.acquire_until(future::pending()).await
    }

    /// Wait for a permit, giving up with [`GateError::Cancelled`] as soon as
    /// `cancel` completes.
    pub async fn acquire_until<F>(&self, cancel: F) -> Result<Permit, GateError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(cancel);

        loop {
            // Register interest before checking, so a release landing between
            // the check and the wait still wakes us.
            let changed = self.shared.capacity_changed.notified();
            tokio::pin!(changed);
            changed.as_mut().enable();

            if let Some(permit) = self.try_acquire()? {
                return Ok(permit);
            }

            tokio::select! {
                _ = &mut changed => {}
                _ = &mut cancel => {
                    debug!("Permit wait cancelled by caller");
                    return Err(GateError::Cancelled("cancelled by caller".to_string()));
                }
            }
        }
    }

    /// Wait for a permit for at most `deadline`.
    pub async fn acquire_timeout(&self, deadline: Duration) -> Result<Permit, GateError> {
        match time::timeout(deadline, self.acquire()).await {
            Ok(result) => result,
            Err(_) => {
                debug!(?deadline, "Permit wait timed out");
                Err(GateError::Cancelled(format!(
                    "no permit within {deadline:?}"
                )))
            }
        }
    }

    /// Return a permit's capacity to the gate.
    ///
    /// The count never exceeds the limit, even when the permit was issued
    /// before the last window reset.
    pub fn release(&self, permit: Permit) {
        permit.release();
    }

    /// Stop the ticker and fail every pending and future acquire with
    /// [`GateError::Shutdown`]. Calling it again is a no-op.
    pub async fn shutdown(&self) {
        {
            let mut state = self.shared.lock();
            if state.closed {
                return;
            }
            state.closed = true;
        }
        self.shared.capacity_changed.notify_waiters();
        self.stop.send_replace(true);

        let ticker = self
            .ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(ticker) = ticker {
            if let Err(err) = ticker.await {
                warn!(error = %err, "Replenishment ticker ended abnormally");
            }
        }
        info!(limit = self.shared.limit, "Rate gate shut down");
    }
}

/// Spawn the task resetting capacity once per window.
///
/// Exits when `stop` flips or its sender (the gate) is dropped.
fn spawn_ticker(
    shared: Arc<Shared>,
    first_reset: Instant,
    mut stop: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let window = shared.window;

    tokio::spawn(async move {
        let mut ticker = time::interval_at(first_reset, window);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => shared.reset(),
                _ = stop.changed() => break,
            }
        }
        debug!("Replenishment ticker stopped");
    })
}
