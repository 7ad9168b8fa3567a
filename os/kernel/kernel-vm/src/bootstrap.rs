//! # Early boot
//!
//! Before the coremap exists the kernel still needs memory (for the coremap
//! itself, among others). [`BootstrapStealer`] hands out RAM straight from
//! the platform's high-water mark; nothing taken this way is ever returned.
//! Once [`build_coremap`] has accounted for everything below the mark the
//! stealer is retired for good.

use crate::VmError;
use crate::coremap::{Coremap, FrameDescriptor};
use crate::phys_mapper::PhysMapper;
use crate::platform::Platform;
use kernel_info::memory::{KSEG0_PHYS_LIMIT, PAGE_SIZE};
use kernel_memory_addresses::PhysicalAddress;
use kernel_sync::{IrqSpinLockGuard, SpinLock};
use log::{error, info, trace, warn};

/// One-shot physical memory donor for the pre-coremap phase.
pub(crate) struct BootstrapStealer {
    /// Set once the coremap owns all of RAM.
    retired: SpinLock<bool>,
}

impl BootstrapStealer {
    pub const fn new() -> Self {
        Self {
            retired: SpinLock::new(false),
        }
    }

    /// Steals `pages` frames, or `None` if the stealer is retired.
    ///
    /// A null address means RAM is exhausted.
    pub fn steal<P: Platform>(&self, platform: &P, pages: usize) -> Option<PhysicalAddress> {
        let retired = self.retired.lock_irq(platform.interrupts());
        if *retired {
            return None;
        }
        let pa = platform.ram_steal(pages);
        trace!("stole {pages} page(s) at {pa}");
        Some(pa)
    }

    /// Locks out stealing; the caller decides whether to retire.
    pub fn lock<'a, P: Platform>(
        &'a self,
        platform: &'a P,
    ) -> IrqSpinLockGuard<'a, bool, P::Interrupts> {
        self.retired.lock_irq(platform.interrupts())
    }
}

/// Where the coremap goes and how much it pins.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct CoremapLayout {
    pub frames: usize,
    pub storage: PhysicalAddress,
    /// Frames `0..fixed` hold the kernel, stolen memory and the coremap.
    pub fixed: usize,
}

impl CoremapLayout {
    /// Places the coremap at `first` for RAM ending at `last`.
    ///
    /// Only RAM reachable through kseg0 is managed; anything above
    /// [`KSEG0_PHYS_LIMIT`] is ignored.
    pub fn compute(first: PhysicalAddress, last: PhysicalAddress) -> Result<Self, VmError> {
        let limit = PhysicalAddress::new(KSEG0_PHYS_LIMIT);
        let last = if last > limit {
            warn!("ignoring RAM above {limit}: {last} reported");
            limit
        } else {
            last
        };

        let page = PAGE_SIZE as usize;
        let frames = last.as_usize() / page;

        #[allow(clippy::cast_possible_truncation)]
        let storage = first.align_up(align_of::<FrameDescriptor>() as u32);
        let end = storage.as_usize() + frames * size_of::<FrameDescriptor>();
        if end > last.as_usize() {
            error!(
                "coremap for {frames} frames needs {end:#x} bytes of RAM, only {:#x} available",
                last.as_usize()
            );
            return Err(VmError::CoremapTooLarge { frames });
        }

        Ok(Self {
            frames,
            storage,
            fixed: end.div_ceil(page),
        })
    }
}

/// Builds the coremap in the unclaimed RAM reported by the platform.
///
/// # Safety
/// The caller must hold the stealer lock for the whole call and retire the
/// stealer on success; nothing else may use RAM above the high-water mark.
pub(crate) unsafe fn build_coremap<'m, P, M>(
    platform: &P,
    mapper: &M,
) -> Result<Coremap<'m>, VmError>
where
    P: Platform,
    M: PhysMapper + ?Sized,
{
    let (first, last) = platform.ram_range();
    let layout = CoremapLayout::compute(first, last)?;

    // SAFETY: The layout lies above the high-water mark, which nobody else uses.
    let storage =
        unsafe { mapper.phys_to_slice::<FrameDescriptor>(layout.storage, layout.frames) };
    let coremap = Coremap::init(storage, layout.fixed);

    info!(
        "coremap: {} frames, {} fixed (storage at {}), {} free",
        layout.frames,
        layout.fixed,
        layout.storage,
        layout.frames.saturating_sub(layout.fixed)
    );
    Ok(coremap)
}
