use bitfield_struct::bitfield;
use core::fmt;
use kernel_info::memory::{MIPS_KSEG0, PAGE_SHIFT};
use kernel_memory_addresses::{PhysicalPage, VirtualPage};

/// `EntryHi`: the lookup key of a TLB slot.
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct TlbHi {
    /// Bits 0–5: Reserved (must be 0).
    #[bits(6, default = 0)]
    __: u8,

    /// Bits 6–11: Address space identifier.
    ///
    /// The kernel flushes the TLB on address-space switch instead of tagging
    /// entries, so this stays 0.
    #[bits(6)]
    pub asid: u8,

    /// Bits 12–31: Virtual page number.
    #[bits(20)]
    vpn: u32,
}

impl TlbHi {
    /// Key matching accesses to `page`.
    #[inline]
    #[must_use]
    pub const fn for_page(page: VirtualPage) -> Self {
        Self::new().with_vpn(page.page_number())
    }

    /// A key that can never match a user access, unique to slot `index`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn invalid(index: usize) -> Self {
        Self::new().with_vpn((MIPS_KSEG0 >> PAGE_SHIFT) + index as u32)
    }

    #[inline]
    #[must_use]
    pub const fn page(self) -> VirtualPage {
        VirtualPage::from_page_number(self.vpn())
    }
}

/// `EntryLo`: the translation and permission half of a TLB slot.
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct TlbLo {
    /// Bits 0–7: Reserved (must be 0).
    #[bits(8, default = 0)]
    __: u8,

    /// Bit 8: Global, ignore the ASID when matching.
    pub global: bool,

    /// Bit 9: Valid, the translation may be used.
    pub valid: bool,

    /// Bit 10: Dirty, stores are permitted through this entry.
    pub dirty: bool,

    /// Bit 11: Non-cacheable.
    pub no_cache: bool,

    /// Bits 12–31: Physical frame number.
    #[bits(20)]
    pfn: u32,
}

impl TlbLo {
    /// A valid translation to `frame`, writable iff `dirty`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn for_frame(frame: PhysicalPage, dirty: bool) -> Self {
        Self::new()
            .with_pfn(frame.frame_number() as u32)
            .with_valid(true)
            .with_dirty(dirty)
    }

    #[inline]
    #[must_use]
    pub const fn frame(self) -> PhysicalPage {
        PhysicalPage::from_frame_number(self.pfn() as usize)
    }
}

/// One TLB slot.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct TlbEntry {
    pub hi: TlbHi,
    pub lo: TlbLo,
}

impl TlbEntry {
    #[inline]
    #[must_use]
    pub const fn new(hi: TlbHi, lo: TlbLo) -> Self {
        Self { hi, lo }
    }

    /// The invalidation pattern for slot `index`.
    #[inline]
    #[must_use]
    pub const fn invalid(index: usize) -> Self {
        Self::new(TlbHi::invalid(index), TlbLo::new())
    }

    /// A valid entry translating `page` to `frame`.
    #[inline]
    #[must_use]
    pub const fn mapping(page: VirtualPage, frame: PhysicalPage, dirty: bool) -> Self {
        Self::new(TlbHi::for_page(page), TlbLo::for_frame(frame, dirty))
    }

    #[inline]
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.lo.valid()
    }
}

impl fmt::Debug for TlbEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TlbEntry({} -> {}{}{})",
            self.hi.page(),
            self.lo.frame(),
            if self.lo.valid() { " V" } else { "" },
            if self.lo.dirty() { " D" } else { "" },
        )
    }
}
