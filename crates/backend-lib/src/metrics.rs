// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for Prometheus metric keys
pub const REGISTER_SUCCESS: &str = "auth.register.success";
pub const REGISTER_CONFLICT: &str = "auth.register.conflict";
pub const LOGIN_SUCCESS: &str = "auth.login.success";
pub const LOGIN_REJECTED: &str = "auth.login.rejected";
pub const RATELIMIT_REJECTED: &str = "ratelimit.rejected";
