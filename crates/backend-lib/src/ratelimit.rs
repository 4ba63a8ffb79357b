// ============================
// crates/backend-lib/src/ratelimit.rs
// ============================
//! Sliding-window admission control, keyed by client identity.
//!
//! Each identity owns an ordered sequence of accepted-request instants
//! bounded by the window duration. Admission is decided against the
//! trailing window ending at `now`, never against fixed buckets, so a
//! burst cannot run twice across a bucket boundary.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Default number of admitted requests per window
const DEFAULT_MAX_REQUESTS: usize = 10;

/// Default sliding window duration
const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Idle grace added to the window before the sweep drops an identity
const SWEEP_MARGIN: Duration = Duration::from_secs(60);

/// Default interval between background sweeps
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Accepted-request instants for one identity
type Window = Arc<Mutex<VecDeque<Instant>>>;

/// Per-identity sliding-window rate limiter.
///
/// Two locking tiers: the map guards creation of per-identity entries,
/// each entry's mutex guards the read-modify-write of its instant
/// sequence. Requests from different identities do not contend.
#[derive(Debug)]
pub struct RateLimiter {
    windows: DashMap<String, Window>,
    window: Duration,
    max_requests: usize,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW, DEFAULT_MAX_REQUESTS)
    }
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            windows: DashMap::new(),
            window,
            max_requests,
        }
    }

    /// Decide admission for a request from `identity` at `now`.
    ///
    /// Instants older than the window are discarded, then the request is
    /// admitted and recorded only if the remaining count is under the
    /// budget. Rejected requests are not recorded and consume no quota.
    /// Never blocks on I/O; cost is bounded by the window occupancy.
    pub fn admit(&self, identity: &str, now: Instant) -> bool {
        let window = self
            .windows
            .entry(identity.to_owned())
            .or_default()
            .clone();
        // map tier released; the rest runs under this identity's lock only
        let mut requests = window.lock();

        if let Some(cutoff) = now.checked_sub(self.window) {
            // instants arrive near-sorted; stopping at the first in-window
            // entry only ever over-counts, so the bound still holds
            while requests.front().is_some_and(|&t| t <= cutoff) {
                requests.pop_front();
            }
        }

        if requests.len() >= self.max_requests {
            return false;
        }

        requests.push_back(now);
        true
    }

    /// Drop identities whose newest accepted instant is idle beyond the
    /// window plus a grace margin. Bounds memory to active clients no
    /// matter how many distinct identities have ever connected.
    ///
    /// Called periodically by the sweeper task; public so tests can run
    /// it deterministically.
    pub fn sweep(&self, now: Instant) {
        let Some(cutoff) = now.checked_sub(self.window + SWEEP_MARGIN) else {
            return;
        };
        self.windows.retain(|_, window| {
            let requests = window.lock();
            requests.back().is_some_and(|&t| t > cutoff)
        });
    }

    /// Number of identities currently tracked.
    pub fn tracked_identities(&self) -> usize {
        self.windows.len()
    }
}

/// Handle owning the background sweep task.
///
/// [`SweeperHandle::stop`] shuts the task down and waits for it; merely
/// dropping the handle aborts it. Either way no background activity
/// outlives the handle.
pub struct SweeperHandle {
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Signal the sweep task to exit and wait for it to finish.
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Spawn the periodic sweep for `limiter`, running every `every`.
pub fn start_sweeper(limiter: Arc<RateLimiter>, every: Duration) -> SweeperHandle {
    let (stop_tx, mut stop_rx) = oneshot::channel();
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // the first tick completes immediately
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = &mut stop_rx => return,
                _ = ticker.tick() => limiter.sweep(Instant::now()),
            }
        }
    });

    SweeperHandle {
        stop: Some(stop_tx),
        task: Some(task),
    }
}
