// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Bounded acquisition of the segment's embedded process-shared mutex.
//!
//! The daemon can crash while holding its own lock. Polling with trylock
//! against a deadline keeps a dead peer from hanging every reader; the
//! wait fails with LockTimeout instead of blocking forever.

use std::time::{Duration, Instant};

use crate::error::ShmError;

/// Holds the segment's embedded lock; releases it on drop.
pub struct SegmentLockGuard {
    mutex: *mut libc::pthread_mutex_t,
}

impl SegmentLockGuard {
    /// Take the embedded lock, giving up after `timeout`.
    ///
    /// Retries `pthread_mutex_trylock` every `retry_interval` until the
    /// deadline passes. EBUSY past the deadline becomes LockTimeout; any
    /// other failure becomes LockFailed with the errno.
    ///
    /// # Safety
    /// `mutex` must point to an initialized process-shared pthread mutex
    /// that stays mapped for the lifetime of the returned guard.
    pub unsafe fn acquire(
        mutex: *mut libc::pthread_mutex_t,
        timeout: Duration,
        retry_interval: Duration,
    ) -> Result<Self, ShmError> {
        let deadline = Instant::now() + timeout;
        loop {
            match libc::pthread_mutex_trylock(mutex) {
                0 => return Ok(Self { mutex }),
                libc::EBUSY => {
                    if Instant::now() >= deadline {
                        return Err(ShmError::LockTimeout {
                            waited_ms: timeout.as_millis() as u64,
                        });
                    }
                    std::thread::sleep(retry_interval);
                }
                errno => return Err(ShmError::LockFailed { errno }),
            }
        }
    }
}

impl Drop for SegmentLockGuard {
    fn drop(&mut self) {
        // SAFETY: acquire() locked this mutex and the caller keeps the
        // segment mapped while the guard lives
        let result = unsafe { libc::pthread_mutex_unlock(self.mutex) };
        if result != 0 {
            tracing::error!(errno = result, "Failed to release embedded segment lock");
        }
    }
}
