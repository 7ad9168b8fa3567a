//! # MIPS Translation Lookaside Buffer
//!
//! Register-level model of the software-refilled MIPS TLB.
//!
//! Each of the [`NUM_TLB`] slots holds a pair of 32-bit words:
//!
//! ```text
//! EntryHi  | 31 ............ 12 | 11 ..... 6 | 5 .. 0 |
//!          |        VPN         |    ASID    |   0    |
//!
//! EntryLo  | 31 ............ 12 | 11 | 10 | 9 | 8 | 7 .. 0 |
//!          |        PFN         |  N |  D | V | G |   0    |
//! ```
//!
//! - `V` (valid): the translation may be used. A miss or an invalid match
//!   raises a TLB-miss fault.
//! - `D` (dirty): on MIPS this is really *write enable*; a store through an
//!   entry without `D` raises a read-only fault.
//!
//! Entries are "invalidated" by writing an `EntryHi` inside kseg0 (which the
//! CPU never looks up in the TLB) together with a zero `EntryLo`. Each slot
//! gets a distinct kseg0 page so no two slots ever match the same address.
//!
//! The CPU itself is reached through [`TlbHardware`]; [`SoftTlb`] is a
//! software model with the same probe/random-replacement behaviour for hosted
//! runs and tests.

#![cfg_attr(not(any(test, doctest)), no_std)]

mod entry;
mod soft;

pub use entry::{TlbEntry, TlbHi, TlbLo};
pub use kernel_info::memory::NUM_TLB;
pub use soft::SoftTlb;

/// Access to the translation cache of the local core.
///
/// Mirrors the four CP0 TLB instructions (`tlbr`, `tlbwi`, `tlbwr`, `tlbp`).
/// Callers are responsible for masking interrupts around sequences that must
/// appear atomic.
pub trait TlbHardware {
    /// Number of slots.
    fn capacity(&self) -> usize;

    /// Reads slot `index` (`tlbr`).
    fn read(&self, index: usize) -> TlbEntry;

    /// Writes slot `index` (`tlbwi`).
    fn write(&mut self, index: usize, entry: TlbEntry);

    /// Writes the slot selected by the `Random` register (`tlbwr`) and
    /// returns its index.
    fn write_random(&mut self, entry: TlbEntry) -> usize;

    /// Finds the slot whose `EntryHi` matches `hi` (`tlbp`).
    fn probe(&self, hi: TlbHi) -> Option<usize>;
}
