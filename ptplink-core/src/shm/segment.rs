//! Mapped view of the clock daemon's shared memory segment.
//!
//! Opened fresh for every query and unmapped before the query returns.
//! The descriptor is closed as soon as the mapping exists; only the
//! mapping itself is retained.

use std::ffi::CString;
use std::mem::MaybeUninit;
use std::ptr::NonNull;

use crate::error::ShmError;
use crate::shm::layout::ClockShmLayout;
use crate::types::ShmName;

/// A live mapping of the daemon's segment.
///
/// Owns the mapped pages and unmaps them on drop, on every exit path.
pub struct SegmentMapping {
    /// Name of the shared memory object, kept for diagnostics.
    name: String,
    /// Pointer to the mapped memory.
    ptr: NonNull<u8>,
    /// Size of the mapped region in bytes.
    size: usize,
}

// SAFETY: SegmentMapping owns its mapping; the pages stay valid wherever
// the value moves. Access to the shared contents is synchronized through
// the segment's embedded lock.
unsafe impl Send for SegmentMapping {}

impl SegmentMapping {
    /// Open and map the daemon's segment.
    ///
    /// Requests read-write access: the caller only reads the payload, but
    /// releasing the embedded lock writes to the segment. The descriptor
    /// is closed before this returns, whether mapping succeeded or not.
    pub fn open(name: &ShmName) -> Result<Self, ShmError> {
        let size = std::mem::size_of::<ClockShmLayout>();

        let c_name = CString::new(name.as_str()).map_err(|e| ShmError::OpenFailed {
            name: name.to_string(),
            reason: format!("Invalid name: {}", e),
        })?;

        // SAFETY: c_name is a valid CString, flags are valid POSIX flags
        let fd = unsafe { libc::shm_open(c_name.as_ptr(), libc::O_RDWR, 0) };
        if fd < 0 {
            let errno = std::io::Error::last_os_error();
            if errno.raw_os_error() == Some(libc::ENOENT) {
                return Err(ShmError::SegmentNotFound {
                    name: name.to_string(),
                });
            }
            return Err(ShmError::OpenFailed {
                name: name.to_string(),
                reason: format!("shm_open failed: {}", errno),
            });
        }

        // The daemon sizes the segment. Refuse anything smaller than the
        // full structure: mapping past end-of-object would fault on the
        // first read instead of failing cleanly here.
        let mut stat = MaybeUninit::<libc::stat>::uninit();
        // SAFETY: fd is a valid descriptor, stat points to writable memory
        if unsafe { libc::fstat(fd, stat.as_mut_ptr()) } < 0 {
            let errno = std::io::Error::last_os_error();
            // SAFETY: fd was opened above
            unsafe { libc::close(fd) };
            return Err(ShmError::OpenFailed {
                name: name.to_string(),
                reason: format!("fstat failed: {}", errno),
            });
        }
        // SAFETY: fstat succeeded and initialized the buffer
        let actual = unsafe { stat.assume_init() }.st_size as u64;
        if actual < size as u64 {
            // SAFETY: fd was opened above
            unsafe { libc::close(fd) };
            return Err(ShmError::SegmentTruncated {
                name: name.to_string(),
                expected: size,
                actual,
            });
        }

        // SAFETY: fd is valid, size is the structure size, offset 0 is valid.
        // PROT_READ | PROT_WRITE so the embedded mutex can lock and unlock.
        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                fd,
                0,
            )
        };

        // Only the mapping is retained past this point.
        // SAFETY: fd was opened above and is closed exactly once
        if unsafe { libc::close(fd) } < 0 {
            tracing::debug!(
                name = %name,
                error = %std::io::Error::last_os_error(),
                "Error closing segment descriptor after mapping"
            );
        }

        if ptr == libc::MAP_FAILED {
            return Err(ShmError::MapFailed {
                reason: format!("mmap failed: {}", std::io::Error::last_os_error()),
            });
        }

        let ptr = NonNull::new(ptr as *mut u8).expect("mmap returned null but not MAP_FAILED");

        tracing::debug!(name = %name, size = size, "Mapped clock daemon segment");

        Ok(Self {
            name: name.to_string(),
            ptr,
            size,
        })
    }

    /// Get the name of the mapped segment.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the size of the mapped region.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Pointer to the daemon's structure at the start of the mapping.
    ///
    /// # Safety
    /// Dereferencing is only sound while the embedded lock coordinates
    /// access with the daemon; the pointer dies with this mapping.
    pub fn layout_ptr(&self) -> *mut ClockShmLayout {
        self.ptr.as_ptr() as *mut ClockShmLayout
    }
}

impl Drop for SegmentMapping {
    fn drop(&mut self) {
        // SAFETY: ptr and size were set by a successful mmap
        let result = unsafe { libc::munmap(self.ptr.as_ptr() as *mut libc::c_void, self.size) };
        if result < 0 {
            // Not propagated: the handle is gone either way and the next
            // query opens a fresh mapping.
            tracing::error!(
                name = %self.name,
                error = %std::io::Error::last_os_error(),
                "Failed to unmap clock daemon segment"
            );
        }
    }
}
