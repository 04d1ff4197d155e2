//! # The Log Buffer
//!
//! Every record ever logged, back to back, followed by a single NUL:
//!
//! ```text
//! ┌───────────┬──────────────┬─────┬───┬──────────────┐
//! │ <6>boot\n │ <7>disk 0\n  │ ... │\0 │   (unused)   │
//! └───────────┴──────────────┴─────┴───┴──────────────┘
//!                                    ▲                 ▲
//!                                  offset           capacity
//! ```
//!
//! The buffer starts at one page and grows a page at a time. Once growth
//! is no longer possible it stamps `"syslog buffer overflow\n"` so that the
//! marker ends right before the last byte, and ignores further records.

use alloc::vec::Vec;
use boot_error::{Error, Result};

pub const PAGE_SIZE: usize = 4096;

/// Upper bound for automatic growth.
pub const LOG_BUFFER_MAX: usize = 256 * PAGE_SIZE;

pub const OVERFLOW_MARKER: &[u8] = b"syslog buffer overflow\n";

#[derive(Debug)]
pub struct LogBuffer {
    data: Vec<u8>,
    offset: usize,
    expand_allowed: bool,
    overflowed: bool,
}

/// Location and size of the log buffer, for handing to a kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogBufferInfo {
    pub addr: u64,
    pub capacity: usize,
    /// Bytes in use, excluding the final NUL.
    pub used: usize,
}

impl LogBuffer {
    /// A one-page buffer that may grow.
    ///
    /// # Errors
    /// [`Error::OutOfResources`] if the page cannot be allocated.
    pub fn new() -> Result<Self> {
        Self::with_capacity(PAGE_SIZE, true)
    }

    /// A buffer of `capacity` bytes, rounded up so the overflow marker fits.
    ///
    /// # Errors
    /// [`Error::OutOfResources`] if the memory cannot be allocated.
    pub fn with_capacity(capacity: usize, expand_allowed: bool) -> Result<Self> {
        let capacity = capacity.max(OVERFLOW_MARKER.len() + 1);
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| Error::OutOfResources)?;
        data.resize(capacity, 0);
        Ok(Self {
            data,
            offset: 0,
            expand_allowed,
            overflowed: false,
        })
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Index of the terminating NUL.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub const fn expand_allowed(&self) -> bool {
        self.expand_allowed
    }

    #[must_use]
    pub const fn is_overflowed(&self) -> bool {
        self.overflowed
    }

    /// All records, without the terminating NUL.
    #[must_use]
    pub fn contents(&self) -> &[u8] {
        &self.data[..self.offset]
    }

    #[must_use]
    pub fn info(&self) -> LogBufferInfo {
        LogBufferInfo {
            addr: self.data.as_ptr() as u64,
            capacity: self.capacity(),
            used: self.offset,
        }
    }

    /// Append one formatted record (without NUL).
    pub fn append(&mut self, record: &[u8]) {
        if self.overflowed {
            return;
        }

        let needed = record.len() + 1;
        let free = self.capacity() - self.offset;
        if free < needed && !(self.expand_allowed && self.grow(needed - free)) {
            self.stamp_overflow(record);
            return;
        }

        self.data[self.offset..self.offset + record.len()].copy_from_slice(record);
        self.offset += record.len();
        self.data[self.offset] = 0;
    }

    /// Grow one final time by at least `final_extra` bytes, then freeze the
    /// capacity.
    pub fn expand_disable(&mut self, final_extra: usize) {
        if self.expand_allowed && final_extra > 0 {
            let _ = self.grow(final_extra);
        }
        self.expand_allowed = false;
    }

    fn grow(&mut self, extra: usize) -> bool {
        let new_capacity = self.capacity() + extra.next_multiple_of(PAGE_SIZE);
        if new_capacity > LOG_BUFFER_MAX
            || self
                .data
                .try_reserve_exact(new_capacity - self.capacity())
                .is_err()
        {
            return false;
        }
        self.data.resize(new_capacity, 0);
        true
    }

    fn stamp_overflow(&mut self, record: &[u8]) {
        let end = self.capacity() - 1;
        let start = end - OVERFLOW_MARKER.len();

        // Whatever fits of the rejected record keeps the records contiguous.
        if self.offset < start {
            let fill = start - self.offset;
            self.data[self.offset..start].copy_from_slice(&record[..fill]);
        }
        self.data[start..end].copy_from_slice(OVERFLOW_MARKER);
        self.data[end] = 0;
        self.offset = end;
        self.expand_allowed = false;
        self.overflowed = true;
    }
}
