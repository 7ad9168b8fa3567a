//! Interfaces to the code around the memory manager.

use bitfield_struct::bitfield;
use core::fmt;
use kernel_memory_addresses::{PhysicalAddress, PhysicalPage, VirtualPage};
use kernel_sync::InterruptControl;

/// A reading of the platform's monotonic clock, in nanoseconds since boot.
///
/// Frames remember when they were handed out; the oldest one is evicted
/// first.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const ZERO: Self = Self(0);

    #[inline]
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    #[inline]
    #[must_use]
    pub const fn as_nanos(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T+{}ns", self.0)
    }
}

/// Opaque handle of a process address space.
///
/// The memory manager only stores it as a back-reference on user frames; it
/// never dereferences it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AddressSpaceId(u32);

impl AddressSpaceId {
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

/// Services of the machine-dependent layer.
pub trait Platform {
    type Interrupts: InterruptControl;

    /// The local core's interrupt controller.
    fn interrupts(&self) -> &Self::Interrupts;

    /// Physical RAM still unclaimed by early boot: `(first, last)`.
    ///
    /// Everything below `first` (exception vectors, kernel image, stolen
    /// memory) is already in use. `last` is the top of RAM.
    fn ram_range(&self) -> (PhysicalAddress, PhysicalAddress);

    /// Permanently takes `pages` frames off the bottom of unclaimed RAM.
    ///
    /// Returns a null address when RAM is exhausted.
    fn ram_steal(&self, pages: usize) -> PhysicalAddress;

    /// Current time, or `None` if the clock cannot be read.
    fn now(&self) -> Option<Timestamp>;
}

/// Access rights recorded in a page-table entry.
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct Permissions {
    pub readable: bool,
    pub writable: bool,
    pub executable: bool,
    #[bits(5, default = 0)]
    __: u8,
}

impl Permissions {
    pub const READ_ONLY: Self = Self::new().with_readable(true);
    pub const READ_WRITE: Self = Self::new().with_readable(true).with_writable(true);
}

/// A resolved page-table entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Mapping {
    pub frame: PhysicalPage,
    pub permissions: Permissions,
}

/// The page-table owner, consulted read-only by the fault handler.
pub trait AddressSpaces {
    /// Address space of the thread that trapped, if any.
    fn current(&self) -> Option<AddressSpaceId>;

    /// Translation of `page` in `space`, or `None` if unmapped.
    fn lookup_mapping(&self, space: AddressSpaceId, page: VirtualPage) -> Option<Mapping>;
}
