// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Clock state reader over the daemon's shared memory interface.
//!
//! Every query is a fresh open / lock / copy / unlock / unmap cycle; no
//! mapping survives between calls. The only cross-call state is the
//! one-bit diagnostic suppression flag.

use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::config::DaemonConfig;
use crate::error::ShmError;
use crate::shm::{ClockShmLayout, SegmentLockGuard, SegmentMapping};
use crate::types::ClockId;

/// A consistent copy of the daemon's published clock state.
///
/// `default()` is the documented all-zero fallback for failed reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockSnapshot {
    /// Identifier of the clock currently acting as master.
    pub clock_id: ClockId,
    /// Raw local-to-master offset in nanoseconds, exactly as published.
    pub local_to_master_offset: u64,
}

/// Reader for the clock daemon's shared memory interface.
///
/// Owns all cross-call state: the endpoint configuration, a process-local
/// gate serializing concurrent queries, and the diagnostic suppression
/// flag. Construct one per process and share it by reference.
pub struct ClockReader {
    config: DaemonConfig,
    /// Serializes queries from threads of this process. Distinct from the
    /// inter-process lock embedded in the segment itself; non-reentrant.
    query_gate: Mutex<()>,
    /// Set once a failure diagnostic has been emitted, so a daemon that
    /// stays down does not flood the log. Cleared by the next success.
    failure_reported: AtomicBool,
}

impl ClockReader {
    /// Create a reader for the given daemon endpoints.
    pub fn new(config: DaemonConfig) -> Self {
        Self {
            config,
            query_gate: Mutex::new(()),
            failure_reported: AtomicBool::new(false),
        }
    }

    /// The endpoint configuration this reader queries.
    pub fn config(&self) -> &DaemonConfig {
        &self.config
    }

    /// Read the daemon's current master clock id and time offset.
    ///
    /// A success is always a consistent snapshot taken while the segment's
    /// embedded lock was held - never a torn mix of old and new fields.
    /// On failure the data is discarded; `ClockSnapshot::default()` is the
    /// zero fallback for callers that need a value regardless.
    pub fn query(&self) -> Result<ClockSnapshot, ShmError> {
        // A poisoned gate only means another caller panicked mid-query;
        // the segment itself is re-opened from scratch below.
        let _gate = self
            .query_gate
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let result = self.read_snapshot();
        match &result {
            Ok(snapshot) => {
                // Report again if the daemon disappears after this.
                self.failure_reported.store(false, Ordering::Relaxed);
                tracing::debug!(
                    clock_id = %snapshot.clock_id,
                    offset_ns = snapshot.local_to_master_offset,
                    "Read clock state from daemon"
                );
            }
            Err(err) => self.report_failure(err),
        }
        result
    }

    /// One full read transaction against a freshly opened segment.
    fn read_snapshot(&self) -> Result<ClockSnapshot, ShmError> {
        let mapping = SegmentMapping::open(self.config.shm_name())?;

        let copied = {
            let layout = mapping.layout_ptr();
            // SAFETY: the mapping spans a full ClockShmLayout and the
            // contract pins the process-shared mutex at offset zero; the
            // guard is dropped before the mapping
            let _lock = unsafe {
                SegmentLockGuard::acquire(
                    std::ptr::addr_of_mut!((*layout).access_lock),
                    self.config.lock_timeout(),
                    self.config.lock_retry_interval(),
                )
            }?;

            // SAFETY: the embedded lock is held, so the daemon is not
            // writing; copying the whole structure yields a non-torn
            // snapshot valid after the mapping goes away
            unsafe {
                let mut copy = MaybeUninit::<ClockShmLayout>::uninit();
                std::ptr::copy_nonoverlapping(
                    layout as *const u8,
                    copy.as_mut_ptr() as *mut u8,
                    std::mem::size_of::<ClockShmLayout>(),
                );
                copy.assume_init()
            }
            // lock released here
        };

        // Unmap before trusting anything: the copy is all we keep.
        drop(mapping);

        copied.validate_version()?;

        Ok(ClockSnapshot {
            clock_id: ClockId::from(copied.master_clock_id),
            local_to_master_offset: copied.local_to_master_time_offset,
        })
    }

    /// Emit one diagnostic per outage, not one per query.
    fn report_failure(&self, err: &ShmError) {
        if self.failure_reported.swap(true, Ordering::Relaxed) {
            return;
        }
        match err {
            ShmError::VersionMismatch { expected, actual } => {
                tracing::warn!(
                    expected = *expected,
                    actual = *actual,
                    "Clock daemon shared-memory interface version mismatch; \
                     install a matching daemon"
                );
            }
            ShmError::MapFailed { reason } => {
                tracing::debug!(
                    reason = %reason,
                    "Unable to map the clock daemon's shared memory; is the daemon running?"
                );
            }
            _ => {
                tracing::warn!(
                    error = %err,
                    "Can't reach the clock daemon; is the service running?"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::shm::SHM_INTERFACE_VERSION;
    use crate::types::ShmName;
    use std::ffi::CString;
    use std::sync::atomic::AtomicU32;

    static NEXT_SEGMENT: AtomicU32 = AtomicU32::new(0);

    fn unique_name(tag: &str) -> ShmName {
        let n = NEXT_SEGMENT.fetch_add(1, Ordering::Relaxed);
        ShmName::new(format!("/ptplink-rdr-{}-{}-{}", tag, std::process::id(), n)).unwrap()
    }

    fn reader_for(name: &ShmName) -> ClockReader {
        let yaml = format!(
            "daemon:\n  shm_name: {}\n  lock_timeout_ms: 50\n  lock_retry_interval_us: 500\n",
            name.as_str()
        );
        ClockReader::new(ConfigLoader::load_string(&yaml).unwrap())
    }

    /// Stands in for the daemon: creates the segment and publishes one
    /// structure with a process-shared mutex in front.
    struct FakeDaemon {
        c_name: CString,
        ptr: *mut ClockShmLayout,
    }

    impl FakeDaemon {
        fn publish(name: &ShmName, version: u16, clock_id: u64, offset: u64) -> Self {
            let len = std::mem::size_of::<ClockShmLayout>();
            let c_name = CString::new(name.as_str()).unwrap();
            unsafe {
                let fd = libc::shm_open(
                    c_name.as_ptr(),
                    libc::O_CREAT | libc::O_RDWR | libc::O_EXCL,
                    0o600,
                );
                assert!(fd >= 0, "shm_open: {}", std::io::Error::last_os_error());
                assert_eq!(libc::ftruncate(fd, len as libc::off_t), 0);
                let ptr = libc::mmap(
                    std::ptr::null_mut(),
                    len,
                    libc::PROT_READ | libc::PROT_WRITE,
                    libc::MAP_SHARED,
                    fd,
                    0,
                );
                assert_ne!(ptr, libc::MAP_FAILED);
                libc::close(fd);

                let layout = ptr as *mut ClockShmLayout;
                std::ptr::write_bytes(ptr as *mut u8, 0, len);

                let mut attr = std::mem::zeroed::<libc::pthread_mutexattr_t>();
                assert_eq!(libc::pthread_mutexattr_init(&mut attr), 0);
                assert_eq!(
                    libc::pthread_mutexattr_setpshared(&mut attr, libc::PTHREAD_PROCESS_SHARED),
                    0
                );
                assert_eq!(
                    libc::pthread_mutex_init(std::ptr::addr_of_mut!((*layout).access_lock), &attr),
                    0
                );
                libc::pthread_mutexattr_destroy(&mut attr);

                (*layout).version = version;
                (*layout).master_clock_id = clock_id;
                (*layout).local_to_master_time_offset = offset;

                Self { c_name, ptr: layout }
            }
        }
    }

    impl Drop for FakeDaemon {
        fn drop(&mut self) {
            unsafe {
                libc::munmap(
                    self.ptr as *mut libc::c_void,
                    std::mem::size_of::<ClockShmLayout>(),
                );
                libc::shm_unlink(self.c_name.as_ptr());
            }
        }
    }

    #[test]
    fn test_missing_daemon_sets_suppression_once() {
        let name = unique_name("missing");
        let reader = reader_for(&name);

        assert!(!reader.failure_reported.load(Ordering::Relaxed));

        // First failure arms the flag (one diagnostic emitted inside).
        assert!(matches!(
            reader.query(),
            Err(ShmError::SegmentNotFound { .. })
        ));
        assert!(reader.failure_reported.load(Ordering::Relaxed));

        // Repeats stay suppressed.
        for _ in 0..5 {
            assert!(reader.query().is_err());
            assert!(reader.failure_reported.load(Ordering::Relaxed));
        }
    }

    #[test]
    fn test_success_clears_suppression() {
        let name = unique_name("cycle");
        let reader = reader_for(&name);

        assert!(reader.query().is_err());
        assert!(reader.failure_reported.load(Ordering::Relaxed));

        {
            let _daemon = FakeDaemon::publish(&name, SHM_INTERFACE_VERSION, 0xfeed, 42);
            let snapshot = reader.query().unwrap();
            assert_eq!(snapshot.clock_id.value(), 0xfeed);
            assert_eq!(snapshot.local_to_master_offset, 42);
            assert!(!reader.failure_reported.load(Ordering::Relaxed));
        }

        // Daemon gone again: the next failure re-arms the flag, so it is
        // reported afresh rather than stuck in suppression.
        assert!(reader.query().is_err());
        assert!(reader.failure_reported.load(Ordering::Relaxed));
    }

    #[test]
    fn test_version_mismatch_is_rejected_and_suppressed() {
        let name = unique_name("version");
        let _daemon = FakeDaemon::publish(&name, SHM_INTERFACE_VERSION + 9, 0xabc, 7);
        let reader = reader_for(&name);

        match reader.query() {
            Err(ShmError::VersionMismatch { expected, actual }) => {
                assert_eq!(expected, SHM_INTERFACE_VERSION);
                assert_eq!(actual, SHM_INTERFACE_VERSION + 9);
            }
            other => panic!("expected VersionMismatch, got {:?}", other),
        }
        assert!(reader.failure_reported.load(Ordering::Relaxed));
    }

    #[test]
    fn test_default_snapshot_is_zero() {
        let snapshot = ClockSnapshot::default();
        assert_eq!(snapshot.clock_id.value(), 0);
        assert_eq!(snapshot.local_to_master_offset, 0);
    }
}
