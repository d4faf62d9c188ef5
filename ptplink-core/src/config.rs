// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration parser with strict schema validation.
//!
//! Validates the daemon endpoint settings at startup time.
//! Any invalid field results in a ConfigError that prevents startup.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::{ControlPort, ShmName};

/// Default name of the daemon's shared memory segment.
const DEFAULT_SHM_NAME: &str = "/ptplinkd";

/// Default UDP control port of the daemon.
const DEFAULT_CONTROL_PORT: u16 = 9539;

/// Upper bound on the embedded-lock wait. The reader must stay bounded
/// even when misconfigured.
const MAX_LOCK_TIMEOUT_MS: u64 = 10_000;

/// Raw daemon endpoint settings as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
struct RawDaemonConfig {
    #[serde(default = "default_shm_name")]
    shm_name: String,
    #[serde(default = "default_control_port")]
    control_port: u16,
    #[serde(default = "default_lock_timeout_ms")]
    lock_timeout_ms: u64,
    #[serde(default = "default_lock_retry_interval_us")]
    lock_retry_interval_us: u64,
}

fn default_shm_name() -> String {
    DEFAULT_SHM_NAME.to_string()
}

fn default_control_port() -> u16 {
    DEFAULT_CONTROL_PORT
}

fn default_lock_timeout_ms() -> u64 {
    100
}

fn default_lock_retry_interval_us() -> u64 {
    2000
}

impl Default for RawDaemonConfig {
    fn default() -> Self {
        Self {
            shm_name: default_shm_name(),
            control_port: default_control_port(),
            lock_timeout_ms: default_lock_timeout_ms(),
            lock_retry_interval_us: default_lock_retry_interval_us(),
        }
    }
}

/// Raw root configuration file.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    daemon: RawDaemonConfig,
}

/// Validated daemon endpoint configuration.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    shm_name: ShmName,
    control_port: ControlPort,
    lock_timeout: Duration,
    lock_retry_interval: Duration,
}

impl DaemonConfig {
    /// Name of the daemon's shared memory segment.
    pub fn shm_name(&self) -> &ShmName {
        &self.shm_name
    }

    /// UDP control port of the daemon.
    pub fn control_port(&self) -> ControlPort {
        self.control_port
    }

    /// Bound on a single embedded-lock acquisition.
    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    /// Pause between trylock attempts while waiting for the embedded lock.
    pub fn lock_retry_interval(&self) -> Duration {
        self.lock_retry_interval
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        // The compiled-in defaults always validate.
        ConfigLoader::validate(RawConfig {
            daemon: RawDaemonConfig::default(),
        })
        .expect("default configuration must be valid")
    }
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<DaemonConfig, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;

        Self::load_string(&content)
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str) -> Result<DaemonConfig, ConfigError> {
        let raw: RawConfig = serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
            message: format!("YAML parse error: {}", e),
        })?;

        Self::validate(raw)
    }

    /// Validate raw configuration and convert to validated types.
    fn validate(raw: RawConfig) -> Result<DaemonConfig, ConfigError> {
        let daemon = raw.daemon;

        let shm_name = ShmName::new(daemon.shm_name)?;
        let control_port = ControlPort::new(daemon.control_port)?;

        if daemon.lock_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout {
                field: "lock_timeout_ms",
                reason: "Timeout must be non-zero; an unbounded wait is not available"
                    .to_string(),
            });
        }
        if daemon.lock_timeout_ms > MAX_LOCK_TIMEOUT_MS {
            return Err(ConfigError::InvalidTimeout {
                field: "lock_timeout_ms",
                reason: format!(
                    "Timeout {}ms exceeds maximum {}ms",
                    daemon.lock_timeout_ms, MAX_LOCK_TIMEOUT_MS
                ),
            });
        }

        let lock_timeout = Duration::from_millis(daemon.lock_timeout_ms);
        let lock_retry_interval = Duration::from_micros(daemon.lock_retry_interval_us);

        if lock_retry_interval.is_zero() {
            return Err(ConfigError::InvalidTimeout {
                field: "lock_retry_interval_us",
                reason: "Retry interval must be non-zero".to_string(),
            });
        }
        if lock_retry_interval >= lock_timeout {
            return Err(ConfigError::InvalidTimeout {
                field: "lock_retry_interval_us",
                reason: format!(
                    "Retry interval {}us must be shorter than the {}ms timeout",
                    daemon.lock_retry_interval_us, daemon.lock_timeout_ms
                ),
            });
        }

        Ok(DaemonConfig {
            shm_name,
            control_port,
            lock_timeout,
            lock_retry_interval,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DaemonConfig::default();
        assert_eq!(config.shm_name().as_str(), "/ptplinkd");
        assert_eq!(config.control_port().value(), 9539);
        assert_eq!(config.lock_timeout(), Duration::from_millis(100));
        assert_eq!(config.lock_retry_interval(), Duration::from_micros(2000));
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ConfigLoader::load_string("{}").unwrap();
        assert_eq!(config.shm_name().as_str(), "/ptplinkd");
    }

    #[test]
    fn test_load_valid_config() {
        let yaml = r#"
daemon:
  shm_name: /testclockd
  control_port: 19539
  lock_timeout_ms: 50
  lock_retry_interval_us: 500
"#;
        let config = ConfigLoader::load_string(yaml).unwrap();
        assert_eq!(config.shm_name().as_str(), "/testclockd");
        assert_eq!(config.control_port().value(), 19539);
        assert_eq!(config.lock_timeout(), Duration::from_millis(50));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let yaml = "daemon:\n  lock_timeout_ms: 0\n";
        assert!(matches!(
            ConfigLoader::load_string(yaml),
            Err(ConfigError::InvalidTimeout { .. })
        ));
    }

    #[test]
    fn test_rejects_retry_interval_longer_than_timeout() {
        let yaml = "daemon:\n  lock_timeout_ms: 1\n  lock_retry_interval_us: 5000\n";
        assert!(matches!(
            ConfigLoader::load_string(yaml),
            Err(ConfigError::InvalidTimeout { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_shm_name() {
        let yaml = "daemon:\n  shm_name: no-slash\n";
        assert!(matches!(
            ConfigLoader::load_string(yaml),
            Err(ConfigError::InvalidShmName { .. })
        ));
    }

    #[test]
    fn test_load_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.yaml");
        assert!(matches!(
            ConfigLoader::load_file(&missing),
            Err(ConfigError::NotFound { .. })
        ));
    }

    #[test]
    fn test_load_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ptplink.yaml");
        std::fs::write(&path, "daemon:\n  control_port: 10001\n").unwrap();
        let config = ConfigLoader::load_file(&path).unwrap();
        assert_eq!(config.control_port().value(), 10001);
    }
}
