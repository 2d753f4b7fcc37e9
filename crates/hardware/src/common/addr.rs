//! Physical addresses and address ranges.
//!
//! This module defines strong types for the memory map handed to the engine. It provides:
//! 1. **Type Safety:** `PhysAddr` keeps raw integers and addresses apart.
//! 2. **Ranges:** `AddrRange` describes the half-open window a memory controller backs.

use std::fmt;

use serde::Serialize;

/// A physical address in the simulated system's address space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PhysAddr(pub u64);

impl PhysAddr {
    /// Creates a new physical address from a raw 64-bit value.
    ///
    /// # Arguments
    ///
    /// * `addr` - The raw 64-bit address value.
    ///
    /// # Returns
    ///
    /// A new `PhysAddr` instance wrapping the provided address.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub const fn val(&self) -> u64 {
        self.0
    }
}

/// A half-open physical address range `[start, start + size)`.
///
/// Mirrors the `AddrRange(size)` objects of gem5 configuration scripts: a range built
/// from a size alone starts at address zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct AddrRange {
    start: PhysAddr,
    size: u64,
}

impl AddrRange {
    /// Creates a range starting at `start` and spanning `size` bytes.
    ///
    /// # Arguments
    ///
    /// * `start` - First address covered by the range.
    /// * `size` - Number of bytes covered.
    ///
    /// # Returns
    ///
    /// The new `AddrRange`.
    pub const fn new(start: u64, size: u64) -> Self {
        Self {
            start: PhysAddr(start),
            size,
        }
    }

    /// Creates a range of `size` bytes starting at address zero.
    pub const fn with_size(size: u64) -> Self {
        Self::new(0, size)
    }

    /// Returns the first address in the range.
    pub const fn start(&self) -> PhysAddr {
        self.start
    }

    /// Returns the number of bytes covered by the range.
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Returns the first address past the end of the range, saturating at `u64::MAX`.
    pub const fn end(&self) -> u64 {
        self.start.0.saturating_add(self.size)
    }

    /// Returns whether `addr` falls inside the range.
    pub const fn contains(&self, addr: PhysAddr) -> bool {
        addr.0 >= self.start.0 && addr.0 < self.end()
    }

    /// Returns whether the two ranges share at least one address.
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start.0 < other.end() && other.start.0 < self.end()
    }
}

impl fmt::Display for AddrRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:#x}:{:#x})", self.start.0, self.end())
    }
}
