//! # TLB management
//!
//! All TLB updates go through [`TlbManager`], which masks interrupts for the
//! duration of each operation so a trap can never observe a half-written or
//! half-flushed TLB.

use core::ops::Range;
use kernel_memory_addresses::{PhysicalPage, VirtualPage};
use kernel_sync::{InterruptControl, IrqSpinLockGuard, SpinLock};
use kernel_tlb::{TlbEntry, TlbHardware};
use log::{debug, trace};

/// Pages whose translations must be dropped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ShootdownTarget {
    start: VirtualPage,
    pages: u32,
}

impl ShootdownTarget {
    #[must_use]
    pub const fn page(page: VirtualPage) -> Self {
        Self::range(page, 1)
    }

    #[must_use]
    pub const fn range(start: VirtualPage, pages: u32) -> Self {
        Self { start, pages }
    }

    fn page_numbers(&self) -> Range<u64> {
        let first = u64::from(self.start.page_number());
        first..first + u64::from(self.pages)
    }

    #[must_use]
    pub fn contains(&self, page: VirtualPage) -> bool {
        self.page_numbers().contains(&u64::from(page.page_number()))
    }
}

/// Serializes access to the local TLB.
pub struct TlbManager<H, I> {
    hw: SpinLock<H>,
    irq: I,
}

impl<H: TlbHardware, I: InterruptControl> TlbManager<H, I> {
    pub const fn new(hw: H, irq: I) -> Self {
        Self {
            hw: SpinLock::new(hw),
            irq,
        }
    }

    pub const fn interrupts(&self) -> &I {
        &self.irq
    }

    fn lock(&self) -> IrqSpinLockGuard<'_, H, I> {
        self.hw.lock_irq(&self.irq)
    }

    /// Runs `f` on the hardware with interrupts masked.
    pub fn with_hardware<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        f(&mut self.lock())
    }

    /// Invalidates every entry.
    pub fn shootdown_all(&self) {
        let mut hw = self.lock();
        for slot in 0..hw.capacity() {
            hw.write(slot, TlbEntry::invalid(slot));
        }
        debug!("tlb: flushed {} entries", hw.capacity());
    }

    /// Invalidates the valid entries translating pages in `target`.
    ///
    /// Returns the number of entries dropped.
    pub fn shootdown(&self, target: &ShootdownTarget) -> usize {
        let mut hw = self.lock();
        let mut dropped = 0;
        for slot in 0..hw.capacity() {
            let entry = hw.read(slot);
            if entry.is_valid() && target.contains(entry.hi.page()) {
                hw.write(slot, TlbEntry::invalid(slot));
                dropped += 1;
            }
        }
        debug!("tlb: shootdown of {target:?} dropped {dropped} entries");
        dropped
    }

    /// Installs `page -> frame`, writable iff `dirty`.
    ///
    /// Replaces an existing entry for `page` if there is one, otherwise fills
    /// the first invalid slot, otherwise a random slot. Returns the slot used.
    pub fn write_or_replace(&self, page: VirtualPage, frame: PhysicalPage, dirty: bool) -> usize {
        let entry = TlbEntry::mapping(page, frame, dirty);
        let mut hw = self.lock();

        let slot = if let Some(slot) = hw.probe(entry.hi) {
            hw.write(slot, entry);
            slot
        } else if let Some(slot) = (0..hw.capacity()).find(|&slot| !hw.read(slot).is_valid()) {
            hw.write(slot, entry);
            slot
        } else {
            hw.write_random(entry)
        };

        trace!("tlb[{slot}] = {entry:?}");
        slot
    }
}
