//! # Memory Layout

/// Size of one physical frame / virtual page in bytes.
///
/// The MIPS TLB in this machine only supports one page size.
pub const PAGE_SIZE: u32 = 4096;

/// Number of low address bits covered by [`PAGE_SIZE`].
pub const PAGE_SHIFT: u32 = 12;

/// Mask selecting the page-number bits of an address.
pub const PAGE_FRAME: u32 = !(PAGE_SIZE - 1);

/// Start of the user segment (kuseg).
pub const MIPS_KUSEG: u32 = 0x0000_0000;

/// Start of the unmapped, cached kernel segment (kseg0).
///
/// Physical address `p` is visible to the kernel at `p + MIPS_KSEG0`.
pub const MIPS_KSEG0: u32 = 0x8000_0000;

/// Start of the unmapped, uncached kernel segment (kseg1).
pub const MIPS_KSEG1: u32 = 0xa000_0000;

/// Start of the mapped kernel segment (kseg2).
pub const MIPS_KSEG2: u32 = 0xc000_0000;

/// First address that is no longer user space.
///
/// Faults at or above this address are never resolved from a process page
/// table.
pub const USERSPACE_TOP: u32 = MIPS_KSEG0;

/// Largest physical address reachable through kseg0.
pub const KSEG0_PHYS_LIMIT: u32 = MIPS_KSEG1 - MIPS_KSEG0;

/// Number of entries in the hardware TLB.
pub const NUM_TLB: usize = 64;

const _: () = {
    assert!(PAGE_SIZE.is_power_of_two());
    assert!(1 << PAGE_SHIFT == PAGE_SIZE);
    assert!(MIPS_KSEG0.is_multiple_of(PAGE_SIZE));
    assert!(USERSPACE_TOP <= MIPS_KSEG0);
    assert!(MIPS_KSEG1 > MIPS_KSEG0 && MIPS_KSEG2 > MIPS_KSEG1);
    assert!(NUM_TLB > 0);
};
