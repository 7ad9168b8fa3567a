use crate::{PhysicalAddress, VirtualPage};
use core::fmt;
use kernel_info::memory::{MIPS_KSEG0, MIPS_KSEG1, PAGE_SIZE, USERSPACE_TOP};

/// Virtual memory address.
///
/// Denotes an address as issued by the CPU. It does not validate which
/// segment it falls into; it only carries the *kind* of address at the type
/// level so you don't accidentally mix virtual and physical values.
///
/// ### Segments
/// - [`is_user`](Self::is_user): below [`USERSPACE_TOP`], translated by the TLB.
/// - [`is_kernel`](Self::is_kernel): kseg0 and above, never resolved from a
///   process page table.
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VirtualAddress(pub(crate) u32);

impl VirtualAddress {
    #[inline]
    #[must_use]
    pub const fn new(v: u32) -> Self {
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// The page containing this address.
    #[inline]
    #[must_use]
    pub const fn page(self) -> VirtualPage {
        VirtualPage::containing_address(self)
    }

    /// Byte offset inside the containing page.
    #[inline]
    #[must_use]
    pub const fn offset(self) -> u32 {
        self.0 & (PAGE_SIZE - 1)
    }

    #[inline]
    #[must_use]
    pub const fn is_user(self) -> bool {
        self.0 < USERSPACE_TOP
    }

    #[inline]
    #[must_use]
    pub const fn is_kernel(self) -> bool {
        !self.is_user()
    }

    /// Physical address behind a kseg0 alias, or `None` outside kseg0.
    #[inline]
    #[must_use]
    pub const fn kseg0_to_physical(self) -> Option<PhysicalAddress> {
        if self.0 >= MIPS_KSEG0 && self.0 < MIPS_KSEG1 {
            Some(PhysicalAddress(self.0 - MIPS_KSEG0))
        } else {
            None
        }
    }
}

impl fmt::Debug for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VA(0x{:08X})", self.0)
    }
}

impl fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

impl From<u32> for VirtualAddress {
    #[inline]
    fn from(v: u32) -> Self {
        Self::new(v)
    }
}

impl From<VirtualPage> for VirtualAddress {
    #[inline]
    fn from(value: VirtualPage) -> Self {
        value.base()
    }
}
