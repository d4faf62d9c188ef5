// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Shared memory interface to the clock daemon.
//!
//! The daemon publishes its clock state in a named POSIX shared memory
//! segment. This module holds the binary interchange contract, the mapped
//! view of the segment, and bounded acquisition of the embedded lock.

mod layout;
mod lock;
mod segment;

pub use layout::{ClockShmLayout, MASTER_CLOCK_ADDRESS_LEN, SHM_INTERFACE_VERSION};
pub use lock::SegmentLockGuard;
pub use segment::SegmentMapping;
