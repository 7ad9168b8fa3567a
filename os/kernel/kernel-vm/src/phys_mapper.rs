//! # Reaching physical memory from the kernel
//!
//! The coremap lives in the RAM it describes and evicted frames have to be
//! scrubbed, so the manager needs to touch physical addresses. On MIPS every
//! frame below 512 MiB is visible through kseg0 at a fixed offset, which
//! [`Kseg0PhysMapper`] uses. Tests substitute a mapper backed by ordinary
//! heap memory.

use core::mem::MaybeUninit;
use kernel_info::memory::PAGE_SIZE;
use kernel_memory_addresses::{PhysicalAddress, PhysicalPage};

/// Converts physical addresses into usable references.
pub trait PhysMapper {
    /// Views `len` values of `T` starting at `pa`.
    ///
    /// # Safety
    /// - `pa .. pa + len * size_of::<T>()` must be RAM owned by the caller
    ///   for `'a` and suitably aligned for `T`.
    /// - No other reference to that range may exist for `'a`.
    unsafe fn phys_to_slice<'a, T>(&self, pa: PhysicalAddress, len: usize)
    -> &'a mut [MaybeUninit<T>];

    /// Fills `frame` with zeros.
    ///
    /// # Safety
    /// The caller must own `frame` and hold no reference into it.
    unsafe fn zero_frame(&self, frame: PhysicalPage) {
        let words = PAGE_SIZE as usize / size_of::<u32>();
        let slice = unsafe { self.phys_to_slice::<u32>(frame.base(), words) };
        slice.fill(MaybeUninit::new(0));
    }
}

impl<M: PhysMapper + ?Sized> PhysMapper for &M {
    unsafe fn phys_to_slice<'a, T>(
        &self,
        pa: PhysicalAddress,
        len: usize,
    ) -> &'a mut [MaybeUninit<T>] {
        unsafe { (**self).phys_to_slice(pa, len) }
    }

    unsafe fn zero_frame(&self, frame: PhysicalPage) {
        unsafe { (**self).zero_frame(frame) }
    }
}

/// [`PhysMapper`] going through the kseg0 direct map.
///
/// # Safety
/// Only valid for physical addresses below
/// [`KSEG0_PHYS_LIMIT`](kernel_info::memory::KSEG0_PHYS_LIMIT), in kernel
/// mode.
#[derive(Debug, Default, Copy, Clone)]
pub struct Kseg0PhysMapper;

impl PhysMapper for Kseg0PhysMapper {
    unsafe fn phys_to_slice<'a, T>(
        &self,
        pa: PhysicalAddress,
        len: usize,
    ) -> &'a mut [MaybeUninit<T>] {
        let va = pa.to_kernel_virtual().as_u32() as usize as *mut MaybeUninit<T>;
        // SAFETY: Caller guarantees the range is owned RAM; kseg0 maps it 1:1.
        unsafe { core::slice::from_raw_parts_mut(va, len) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kseg0_mapper_points_at_the_alias() {
        // Zero-length views never touch memory, so this is fine hosted.
        let view = unsafe { Kseg0PhysMapper.phys_to_slice::<u32>(PhysicalAddress::new(0x1000), 0) };
        assert_eq!(view.as_ptr() as usize, 0x8000_1000);
        assert!(view.is_empty());
    }
}
