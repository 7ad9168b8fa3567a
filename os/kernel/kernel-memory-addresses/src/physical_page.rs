use crate::PhysicalAddress;
use core::fmt;
use kernel_info::memory::{PAGE_FRAME, PAGE_SHIFT};

/// One physical frame, identified by its frame-aligned base address.
///
/// Frame `n` starts at physical address `n * PAGE_SIZE`; the coremap indexes
/// its descriptors by [`frame_number`](Self::frame_number).
///
/// ### Invariants
/// - The low [`PAGE_SHIFT`] bits of the base are always zero.
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalPage(u32);

impl PhysicalPage {
    /// Frame that contains `addr` (aligns down to the frame boundary).
    #[inline]
    #[must_use]
    pub const fn containing_address(addr: PhysicalAddress) -> Self {
        Self(addr.0 & PAGE_FRAME)
    }

    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_frame_number(n: usize) -> Self {
        Self((n as u32) << PAGE_SHIFT)
    }

    #[inline]
    #[must_use]
    pub const fn frame_number(self) -> usize {
        (self.0 >> PAGE_SHIFT) as usize
    }

    #[inline]
    #[must_use]
    pub const fn base(self) -> PhysicalAddress {
        PhysicalAddress(self.0)
    }
}

impl fmt::Debug for PhysicalPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysicalPage(#{} @ 0x{:08X})", self.frame_number(), self.0)
    }
}

impl fmt::Display for PhysicalPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}
