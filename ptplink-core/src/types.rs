// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for validated inputs.
//!
//! Following the "Newtype" pattern in Rust to ensure valid state by construction.
//! All types validate their invariants at creation time.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Maximum length of a POSIX shared memory object name, including the
/// leading slash.
const MAX_SHM_NAME_LEN: usize = 255;

/// Identifier of a PTP clock.
///
/// An opaque 64-bit value assigned by the daemon; conventionally printed
/// as 16 hex digits, the way PTP clock identities appear on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClockId(u64);

impl ClockId {
    /// Get the raw identifier value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl From<u64> for ClockId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ClockId> for u64 {
    fn from(id: ClockId) -> Self {
        id.0
    }
}

/// Validated POSIX shared memory object name.
/// Must start with `/`, contain no interior NUL or further slashes,
/// and fit within the OS name limit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShmName(String);

impl ShmName {
    /// Create a new ShmName with validation.
    pub fn new(name: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();

        if name.len() < 2 || !name.starts_with('/') {
            return Err(ConfigError::InvalidShmName {
                name,
                reason: "Name must start with '/' followed by at least one character"
                    .to_string(),
            });
        }

        if name.len() > MAX_SHM_NAME_LEN {
            return Err(ConfigError::InvalidShmName {
                reason: format!("Name too long: {} bytes (max {})", name.len(), MAX_SHM_NAME_LEN),
                name,
            });
        }

        if name[1..].contains('/') {
            return Err(ConfigError::InvalidShmName {
                name,
                reason: "Name must not contain '/' after the leading slash".to_string(),
            });
        }

        if name.contains('\0') {
            return Err(ConfigError::InvalidShmName {
                name,
                reason: "Name must not contain NUL bytes".to_string(),
            });
        }

        Ok(Self(name))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShmName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ShmName {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ShmName> for String {
    fn from(name: ShmName) -> Self {
        name.0
    }
}

/// Validated UDP control port.
/// Must be in range 1-65535 (0 is reserved).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct ControlPort(u16);

impl ControlPort {
    /// Create a new ControlPort with validation.
    pub fn new(port: u16) -> Result<Self, ConfigError> {
        if port == 0 {
            return Err(ConfigError::InvalidPort {
                port,
                reason: "Port 0 is reserved and cannot be used".to_string(),
            });
        }
        Ok(Self(port))
    }

    /// Get the inner port value.
    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for ControlPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for ControlPort {
    type Error = ConfigError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ControlPort> for u16 {
    fn from(port: ControlPort) -> Self {
        port.0
    }
}
