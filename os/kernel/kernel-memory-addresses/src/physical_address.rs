use crate::{PhysicalPage, VirtualAddress};
use core::fmt;
use core::ops::{Add, AddAssign};
use kernel_info::memory::{KSEG0_PHYS_LIMIT, MIPS_KSEG0, PAGE_SIZE};

/// Physical memory address.
///
/// Denotes a byte address on the memory bus. Like [`VirtualAddress`], this
/// type carries intent and prevents accidental VA↔PA mix-ups.
///
/// A value of zero is the platform's "no memory" answer when stealing RAM
/// during early boot; see [`is_null`](Self::is_null).
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalAddress(pub(crate) u32);

impl PhysicalAddress {
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

    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// The frame containing this address.
    #[inline]
    #[must_use]
    pub const fn page(self) -> PhysicalPage {
        PhysicalPage::containing_address(self)
    }

    /// Byte offset inside the containing frame.
    #[inline]
    #[must_use]
    pub const fn offset(self) -> u32 {
        self.0 & (PAGE_SIZE - 1)
    }

    /// Round up to the next multiple of `align` (a power of two).
    #[inline]
    #[must_use]
    pub const fn align_up(self, align: u32) -> Self {
        Self((self.0 + align - 1) & !(align - 1))
    }

    #[inline]
    #[must_use]
    pub const fn checked_add(self, rhs: u32) -> Option<Self> {
        match self.0.checked_add(rhs) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// The kseg0 alias through which the kernel reaches this address.
    ///
    /// Only meaningful for addresses below 512 MiB; larger addresses have no
    /// kseg0 alias and trip a debug assertion.
    #[inline]
    #[must_use]
    pub const fn to_kernel_virtual(self) -> VirtualAddress {
        debug_assert!(self.0 < KSEG0_PHYS_LIMIT);
        VirtualAddress(self.0 + MIPS_KSEG0)
    }
}

impl fmt::Debug for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PA(0x{:08X})", self.0)
    }
}

impl fmt::Display for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

impl From<u32> for PhysicalAddress {
    #[inline]
    fn from(v: u32) -> Self {
        Self::new(v)
    }
}

impl From<PhysicalPage> for PhysicalAddress {
    #[inline]
    fn from(value: PhysicalPage) -> Self {
        value.base()
    }
}

impl Add<u32> for PhysicalAddress {
    type Output = Self;
    #[inline]
    fn add(self, rhs: u32) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl AddAssign<u32> for PhysicalAddress {
    #[inline]
    fn add_assign(&mut self, rhs: u32) {
        self.0 += rhs;
    }
}
