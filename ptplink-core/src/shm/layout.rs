// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Binary interchange contract with the clock daemon.
//!
//! Mirrors the C structure the daemon publishes in its shared memory
//! segment. The layout is fixed by the daemon; field order, types, and the
//! leading mutex must match exactly or the version gate below rejects it.

use crate::error::ShmError;

/// Shared-memory interface version this build was compiled against.
///
/// The daemon stamps every published structure with its own version;
/// anything else is untrusted and discarded.
pub const SHM_INTERFACE_VERSION: u16 = 3;

/// Byte length of the daemon's textual master-clock address field.
pub const MASTER_CLOCK_ADDRESS_LEN: usize = 64;

/// The structure published by the clock daemon.
///
/// The first field is a process-shared mutex: readers take it before
/// copying so the daemon cannot publish a half-written update underneath
/// them. Fields marked daemon-internal are copied but never interpreted
/// here.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ClockShmLayout {
    /// Process-shared lock guarding every field below.
    pub access_lock: libc::pthread_mutex_t,
    /// Interface version stamped by the daemon.
    pub version: u16,
    /// Identifier of the clock currently acting as master.
    pub master_clock_id: u64,
    /// Textual address of the master clock (daemon-internal).
    pub master_clock_address: [u8; MASTER_CLOCK_ADDRESS_LEN],
    /// Daemon-local timestamp at publication (daemon-internal).
    pub local_time: u64,
    /// Raw local-to-master time offset in nanoseconds. Wrapping add to a
    /// local monotonic reading yields master time; the sign convention
    /// belongs to the daemon and is not interpreted here.
    pub local_to_master_time_offset: u64,
    /// Time the master clock was selected (daemon-internal).
    pub master_clock_start_time: u64,
}

impl ClockShmLayout {
    /// Check the copied structure against the compiled-in contract.
    ///
    /// A mismatch means every other field is untrusted - the caller must
    /// discard the copy and report the daemon as unavailable.
    pub fn validate_version(&self) -> Result<(), ShmError> {
        if self.version != SHM_INTERFACE_VERSION {
            return Err(ShmError::VersionMismatch {
                expected: SHM_INTERFACE_VERSION,
                actual: self.version,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zeroed_layout() -> ClockShmLayout {
        // SAFETY: all-zero bytes are a valid bit pattern for every field;
        // the mutex is never used in these tests
        unsafe { std::mem::zeroed() }
    }

    #[test]
    fn test_version_gate_accepts_matching_version() {
        let mut layout = zeroed_layout();
        layout.version = SHM_INTERFACE_VERSION;
        assert!(layout.validate_version().is_ok());
    }

    #[test]
    fn test_version_gate_rejects_mismatch() {
        let mut layout = zeroed_layout();
        layout.version = SHM_INTERFACE_VERSION + 1;
        match layout.validate_version() {
            Err(ShmError::VersionMismatch { expected, actual }) => {
                assert_eq!(expected, SHM_INTERFACE_VERSION);
                assert_eq!(actual, SHM_INTERFACE_VERSION + 1);
            }
            other => panic!("expected VersionMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_layout_starts_with_the_mutex() {
        // The reader takes the embedded lock through a pointer to the
        // first field; the contract pins the mutex at offset zero.
        let layout = zeroed_layout();
        let base = std::ptr::addr_of!(layout) as usize;
        let lock = std::ptr::addr_of!(layout.access_lock) as usize;
        assert_eq!(base, lock);
    }

    #[test]
    fn test_layout_is_larger_than_the_mutex_alone() {
        assert!(
            std::mem::size_of::<ClockShmLayout>()
                > std::mem::size_of::<libc::pthread_mutex_t>()
        );
    }
}
