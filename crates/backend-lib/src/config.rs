// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use figment::{
    providers::{Data, Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Data directory path
    pub data_dir: PathBuf,
    /// Log level
    pub log_level: String,
    /// Auth service settings
    pub auth: AuthSettings,
    /// Admission-control settings
    pub rate_limit: RateLimitSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// HS256 signing secret; override outside development
    pub jwt_secret: String,
    /// Token TTL in seconds
    pub jwt_ttl_secs: u64,
    /// bcrypt cost factor
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Maximum admitted requests per window, per client identity
    pub max_requests: usize,
    /// Sliding window duration in seconds
    pub window_secs: u64,
    /// Interval between eviction sweeps in seconds
    pub sweep_interval_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".parse().expect("static addr"),
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            auth: AuthSettings::default(),
            rate_limit: RateLimitSettings::default(),
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: "insecure-dev-secret".to_string(),
            jwt_ttl_secs: 60 * 60 * 72, // 72 hours
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window_secs: 60,
            sweep_interval_secs: 5 * 60,
        }
    }
}

impl Settings {
    /// Load settings: defaults, then `config.toml`, then `AUTHGATE_`
    /// environment variables (nested keys split on `__`).
    pub fn load() -> Result<Self> {
        Self::figment(Toml::file("config.toml"))
    }

    /// Load settings from an explicit TOML file path.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::figment(Toml::file(path.as_ref()))
    }

    fn figment(file: Data<Toml>) -> Result<Self> {
        let settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(file)
            .merge(Env::prefixed("AUTHGATE_").split("__"))
            .extract()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sane() {
        let settings = Settings::default();
        assert_eq!(settings.auth.jwt_ttl_secs, 259_200);
        assert_eq!(settings.rate_limit.max_requests, 10);
        assert_eq!(settings.rate_limit.window_secs, 60);
        assert!(settings.auth.bcrypt_cost >= 10);
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
log_level = "debug"

[rate_limit]
max_requests = 3
"#
        )
        .unwrap();

        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.rate_limit.max_requests, 3);
        // untouched keys keep their defaults
        assert_eq!(settings.rate_limit.window_secs, 60);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = Settings::load_from("does-not-exist.toml").unwrap();
        assert_eq!(settings.bind_addr, Settings::default().bind_addr);
    }
}
