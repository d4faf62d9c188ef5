//! Custom error types for ptplink.
//!
//! This module defines explicit enum error types as per coding guidelines.
//! No `Box<dyn Error>`, no `anyhow::Result` - all errors are strongly typed.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the ptplink bridge.
/// All errors are explicit variants - no catch-all or generic handling.
#[derive(Debug, Error)]
pub enum PtplinkError {
    // =========================================================================
    // Configuration Errors - Fail-Fast on Invalid Config
    // =========================================================================
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    // =========================================================================
    // Shared-Memory Interface Errors - Recovered Locally, Never Fatal
    // =========================================================================
    #[error("Clock daemon interface error: {0}")]
    Shm(#[from] ShmError),

    // =========================================================================
    // Control Channel Errors - Caller Decides Whether They Are Fatal
    // =========================================================================
    #[error("Control channel error: {0}")]
    Control(#[from] ControlError),
}

/// Errors from the daemon's shared-memory interface.
///
/// Every variant is recoverable: the caller gets a failure status and the
/// documented zero defaults, never stale or torn data.
#[derive(Debug, Error)]
pub enum ShmError {
    #[error("Shared memory segment {name} does not exist - is the clock daemon running?")]
    SegmentNotFound { name: String },

    #[error("Failed to open shared memory segment {name}: {reason}")]
    OpenFailed { name: String, reason: String },

    #[error("Shared memory segment {name} is {actual} bytes, expected at least {expected}")]
    SegmentTruncated {
        name: String,
        expected: usize,
        actual: u64,
    },

    #[error("Failed to map shared memory: {reason}")]
    MapFailed { reason: String },

    #[error("Embedded segment lock not acquired within {waited_ms}ms")]
    LockTimeout { waited_ms: u64 },

    #[error("Embedded segment lock operation failed: errno {errno}")]
    LockFailed { errno: i32 },

    #[error(
        "Clock daemon publishes shared-memory interface version {actual}, \
         but this build requires version {expected} - install a matching daemon"
    )]
    VersionMismatch { expected: u16, actual: u16 },
}

/// Control channel errors - transport only, policy belongs to the caller.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("Failed to create control socket: {source}")]
    SocketCreate {
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to send control message to port {port}: {source}")]
    SendFailed {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("Control message truncated: sent {sent} of {expected} bytes")]
    ShortSend { sent: usize, expected: usize },
}

/// Configuration validation errors. Invalid fields prevent startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    Parse { message: String },

    #[error("Invalid shared memory name: {name} - {reason}")]
    InvalidShmName { name: String, reason: String },

    #[error("Invalid control port: {port} - {reason}")]
    InvalidPort { port: u16, reason: String },

    #[error("Invalid timeout: {field} - {reason}")]
    InvalidTimeout {
        field: &'static str,
        reason: String,
    },
}

/// Result type alias using PtplinkError.
pub type PtplinkResult<T> = Result<T, PtplinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_mismatch_names_both_versions() {
        let err = ShmError::VersionMismatch {
            expected: 3,
            actual: 7,
        };
        let message = err.to_string();
        assert!(message.contains('3'));
        assert!(message.contains('7'));
    }

    #[test]
    fn test_error_chain() {
        let shm_err = ShmError::SegmentNotFound {
            name: "/ptplinkd".to_string(),
        };
        let top: PtplinkError = shm_err.into();
        assert!(matches!(top, PtplinkError::Shm(_)));
    }

    #[test]
    fn test_segment_not_found_display() {
        let err = ShmError::SegmentNotFound {
            name: "/ptplinkd".to_string(),
        };
        assert!(err.to_string().contains("/ptplinkd"));
        assert!(err.to_string().contains("running"));
    }
}
