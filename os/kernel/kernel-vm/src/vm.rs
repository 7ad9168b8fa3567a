//! The memory manager front end.

use crate::VmError;
use crate::bootstrap::{self, BootstrapStealer};
use crate::coremap::{Claim, Coremap, CoremapStats, FrameDescriptor, FrameState};
use crate::eviction::{DiscardOnEvict, WriteBack};
use crate::phys_mapper::PhysMapper;
use crate::platform::{AddressSpaceId, Platform};
use kernel_memory_addresses::VirtualAddress;
use kernel_sync::{SpinLock, SyncOnceCell};
use log::{debug, error, trace, warn};

/// What to do when asked to free a fixed frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FixedFramePolicy {
    /// Log and carry on.
    Ignore,
    /// Report [`VmError::FixedFrameViolation`].
    Error,
}

/// Physical memory manager.
///
/// Owns the coremap once [`bootstrap`](Self::bootstrap) has run; until then
/// kernel allocations are served by stealing RAM from the platform. All
/// coremap access happens under one spin lock with interrupts masked.
///
/// `'m` is the lifetime of the RAM holding the coremap (`'static` in the
/// kernel).
pub struct Vm<'m, P, M, W = DiscardOnEvict> {
    platform: P,
    mapper: M,
    write_back: W,
    stealer: BootstrapStealer,
    coremap: SyncOnceCell<SpinLock<Coremap<'m>>>,
}

impl<P: Platform, M: PhysMapper> Vm<'_, P, M> {
    /// A manager that discards evicted content.
    pub const fn new(platform: P, mapper: M) -> Self {
        Self::with_write_back(platform, mapper, DiscardOnEvict)
    }
}

impl<'m, P: Platform, M: PhysMapper, W: WriteBack> Vm<'m, P, M, W> {
    pub const fn with_write_back(platform: P, mapper: M, write_back: W) -> Self {
        Self {
            platform,
            mapper,
            write_back,
            stealer: BootstrapStealer::new(),
            coremap: SyncOnceCell::new(),
        }
    }

    pub const fn platform(&self) -> &P {
        &self.platform
    }

    pub const fn write_back(&self) -> &W {
        &self.write_back
    }

    /// Builds the coremap over all RAM and retires the boot-time stealer.
    ///
    /// # Errors
    /// - [`VmError::AlreadyBootstrapped`] on every call after the first
    ///   successful one.
    /// - [`VmError::CoremapTooLarge`] if the descriptors do not fit.
    pub fn bootstrap(&self) -> Result<(), VmError> {
        let mut retired = self.stealer.lock(&self.platform);
        if *retired {
            return Err(VmError::AlreadyBootstrapped);
        }

        // SAFETY: We hold the stealer lock and retire it below.
        let coremap = unsafe { bootstrap::build_coremap(&self.platform, &self.mapper)? };
        self.coremap
            .set(SpinLock::new(coremap))
            .map_err(|_| VmError::AlreadyBootstrapped)?;
        *retired = true;
        Ok(())
    }

    #[must_use]
    pub fn is_bootstrapped(&self) -> bool {
        self.coremap.is_ready()
    }

    /// Allocates `pages` physically contiguous frames for the kernel and
    /// returns the kseg0 address of the first.
    ///
    /// # Errors
    /// - [`VmError::ZeroPages`] for `pages == 0`.
    /// - [`VmError::BootMemoryExhausted`] before bootstrap when RAM ran out.
    /// - [`VmError::ResourceExhausted`] when no run of `pages` evictable
    ///   frames exists.
    /// - [`VmError::TimeSourceUnavailable`] if the clock fails.
    pub fn alloc_kernel_pages(&self, pages: usize) -> Result<VirtualAddress, VmError> {
        if pages == 0 {
            return Err(VmError::ZeroPages);
        }

        if let Some(coremap) = self.coremap.get() {
            return self.allocate(coremap, pages, Claim::KERNEL);
        }

        match self.stealer.steal(&self.platform, pages) {
            Some(pa) if pa.is_null() => {
                error!("out of memory stealing {pages} page(s) before bootstrap");
                Err(VmError::BootMemoryExhausted { pages })
            }
            Some(pa) => Ok(pa.to_kernel_virtual()),
            // Bootstrap completed between the two checks.
            None => {
                let coremap = self.coremap.get().ok_or(VmError::NotBootstrapped)?;
                self.allocate(coremap, pages, Claim::KERNEL)
            }
        }
    }

    /// Allocates one frame to back user page `addr` of `space` and returns
    /// its kseg0 address.
    ///
    /// # Errors
    /// - [`VmError::NotBootstrapped`] before bootstrap.
    /// - [`VmError::ResourceExhausted`] when every frame is fixed.
    /// - [`VmError::TimeSourceUnavailable`] if the clock fails.
    pub fn alloc_user_page(
        &self,
        space: AddressSpaceId,
        addr: VirtualAddress,
    ) -> Result<VirtualAddress, VmError> {
        let coremap = self.coremap.get().ok_or(VmError::NotBootstrapped)?;
        self.allocate(
            coremap,
            1,
            Claim {
                owner: Some(space),
                user_address: Some(addr.page().base()),
            },
        )
    }

    fn allocate(
        &self,
        coremap: &SpinLock<Coremap<'m>>,
        pages: usize,
        claim: Claim,
    ) -> Result<VirtualAddress, VmError> {
        let now = self.platform.now().ok_or_else(|| {
            error!("clock unavailable while allocating {pages} page(s)");
            VmError::TimeSourceUnavailable
        })?;

        let mut map = coremap.lock_irq(self.platform.interrupts());
        let start = map.allocate(pages, now, claim, &self.mapper, &self.write_back)?;
        Ok(map.frames()[start].kernel_address())
    }

    /// Frees the allocation containing the frame whose kseg0 address is
    /// `addr`.
    ///
    /// Unknown addresses and frames that are already free are ignored.
    ///
    /// # Errors
    /// [`VmError::FixedFrameViolation`] if `addr` names a fixed frame and
    /// `policy` is [`FixedFramePolicy::Error`].
    pub fn free_pages(
        &self,
        addr: VirtualAddress,
        policy: FixedFramePolicy,
    ) -> Result<(), VmError> {
        let Some(coremap) = self.coremap.get() else {
            warn!("free of {addr} before bootstrap ignored; stolen memory is never returned");
            return Ok(());
        };

        let mut map = coremap.lock_irq(self.platform.interrupts());
        let Some(frame) = map.find_by_kernel_address(addr) else {
            trace!("free of unmanaged address {addr} ignored");
            return Ok(());
        };

        match map.frames()[frame].state() {
            FrameState::Fixed => {
                warn!("refusing to free fixed frame at {addr}");
                match policy {
                    FixedFramePolicy::Ignore => Ok(()),
                    FixedFramePolicy::Error => Err(VmError::FixedFrameViolation(addr)),
                }
            }
            FrameState::Free => {
                debug!("frame at {addr} is already free");
                Ok(())
            }
            FrameState::Allocated => {
                let run = map.run_containing(frame);
                debug!("freeing frames {run:?} at {addr}");
                map.release(run);
                Ok(())
            }
        }
    }

    /// Frees kernel pages, silently refusing fixed frames.
    pub fn free_kernel_pages(&self, addr: VirtualAddress) {
        let freed = self.free_pages(addr, FixedFramePolicy::Ignore);
        debug_assert!(freed.is_ok(), "ignore policy failed to free {addr}: {freed:?}");
    }

    /// Frees a user frame by its kseg0 address.
    ///
    /// # Errors
    /// [`VmError::FixedFrameViolation`] if `addr` names a fixed frame.
    pub fn free_user_page(&self, addr: VirtualAddress) -> Result<(), VmError> {
        self.free_pages(addr, FixedFramePolicy::Error)
    }

    /// Frame counts by state, or `None` before bootstrap.
    #[must_use]
    pub fn stats(&self) -> Option<CoremapStats> {
        let coremap = self.coremap.get()?;
        Some(coremap.lock_irq(self.platform.interrupts()).stats())
    }

    /// Snapshot of the descriptor for `frame`.
    #[must_use]
    pub fn descriptor(&self, frame: usize) -> Option<FrameDescriptor> {
        let coremap = self.coremap.get()?;
        let map = coremap.lock_irq(self.platform.interrupts());
        map.frames().get(frame).copied()
    }
}
