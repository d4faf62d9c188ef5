//! ptplink Core Library
//!
//! Client-side bridge to an external PTP clock-synchronization daemon.
//! Provides the shared-memory interchange contract, a bounded-time clock
//! state reader, and the daemon's UDP control channel.
//!
//! The daemon computes and publishes clock state; this library only reads
//! it out under the segment's embedded lock and pushes control messages
//! back. It never interprets offsets and never manages the daemon.

pub mod config;
pub mod control;
pub mod error;
pub mod reader;
pub mod shm;
pub mod types;

// Re-export commonly used types
pub use config::{ConfigLoader, DaemonConfig};
pub use control::ControlSender;
pub use error::{ConfigError, ControlError, PtplinkError, PtplinkResult, ShmError};
pub use reader::{ClockReader, ClockSnapshot};
pub use types::{ClockId, ControlPort, ShmName};
