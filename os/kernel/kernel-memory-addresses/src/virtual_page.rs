use crate::VirtualAddress;
use core::fmt;
use kernel_info::memory::{PAGE_FRAME, PAGE_SHIFT};

/// Virtual page base.
///
/// The page-aligned part of a [`VirtualAddress`]; this is what the TLB
/// matches on (the VPN field of `EntryHi`).
///
/// ### Invariants
/// - The low [`PAGE_SHIFT`] bits of the base are always zero.
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VirtualPage(u32);

impl VirtualPage {
    /// Page that contains `addr` (aligns down to page boundary).
    #[inline]
    #[must_use]
    pub const fn containing_address(addr: VirtualAddress) -> Self {
        Self(addr.0 & PAGE_FRAME)
    }

    #[inline]
    #[must_use]
    pub const fn from_page_number(vpn: u32) -> Self {
        Self(vpn << PAGE_SHIFT)
    }

    /// Virtual page number (address bits 31..12).
    #[inline]
    #[must_use]
    pub const fn page_number(self) -> u32 {
        self.0 >> PAGE_SHIFT
    }

    #[inline]
    #[must_use]
    pub const fn base(self) -> VirtualAddress {
        VirtualAddress(self.0)
    }
}

impl fmt::Debug for VirtualPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtualPage(0x{:08X})", self.0)
    }
}

impl fmt::Display for VirtualPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}
