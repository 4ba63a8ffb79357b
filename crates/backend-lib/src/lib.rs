// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core backend-lib functionality for the `AuthGate` credential service.

pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod ratelimit;
pub mod router;
pub mod storage;
pub mod validation;

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthService, DefaultAuth};
use crate::config::Settings;
use crate::ratelimit::RateLimiter;
use crate::storage::FlatFileDirectory;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth: Arc<dyn AuthService>,
    /// Settings
    pub settings: Arc<Settings>,
    /// Admission-control rate limiter
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Create application state backed by the flat-file user directory.
    pub fn new(directory: FlatFileDirectory, settings: Settings) -> Self {
        let auth = Arc::new(DefaultAuth::new(directory, &settings.auth));
        let rate_limiter = Arc::new(RateLimiter::new(
            Duration::from_secs(settings.rate_limit.window_secs),
            settings.rate_limit.max_requests,
        ));

        Self {
            auth,
            settings: Arc::new(settings),
            rate_limiter,
        }
    }
}
