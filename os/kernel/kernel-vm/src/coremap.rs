//! # Coremap
//!
//! One [`FrameDescriptor`] per physical frame, indexed by frame number. The
//! array is carved out of the RAM it describes during bootstrap and lives for
//! the rest of the kernel's life; descriptors are only ever rewritten in
//! place.
//!
//! ## Runs
//!
//! A multi-frame allocation occupies contiguous slots that all carry the same
//! `run_length`. Free and fixed frames have a run length of 1. Walking the
//! array from slot 0 and stepping by `run_length` therefore lands on the
//! first frame of every run, which is how [`Coremap::run_containing`] finds
//! the bounds of an allocation from any of its frames.

use crate::platform::{AddressSpaceId, Timestamp};
use core::mem::MaybeUninit;
use core::ops::Range;
use kernel_memory_addresses::{PhysicalPage, VirtualAddress};

/// Life-cycle state of a frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameState {
    /// Kernel image, early-boot memory or the coremap itself. Never handed out.
    Fixed,
    Free,
    Allocated,
}

/// Book-keeping for one physical frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrameDescriptor {
    frame: PhysicalPage,
    kernel_address: VirtualAddress,
    owner: Option<AddressSpaceId>,
    user_address: Option<VirtualAddress>,
    timestamp: Timestamp,
    run_length: u32,
    state: FrameState,
}

impl FrameDescriptor {
    pub(crate) const fn new(frame: usize, state: FrameState) -> Self {
        let frame = PhysicalPage::from_frame_number(frame);
        Self {
            frame,
            kernel_address: frame.base().to_kernel_virtual(),
            owner: None,
            user_address: None,
            timestamp: Timestamp::ZERO,
            run_length: 1,
            state,
        }
    }

    /// The kseg0 alias of the frame.
    #[inline]
    #[must_use]
    pub const fn kernel_address(&self) -> VirtualAddress {
        self.kernel_address
    }

    #[inline]
    #[must_use]
    pub const fn frame(&self) -> PhysicalPage {
        self.frame
    }

    /// Address space the frame was handed to; `None` for kernel and free frames.
    #[inline]
    #[must_use]
    pub const fn owner(&self) -> Option<AddressSpaceId> {
        self.owner
    }

    /// User page the frame was allocated for.
    #[inline]
    #[must_use]
    pub const fn user_address(&self) -> Option<VirtualAddress> {
        self.user_address
    }

    #[inline]
    #[must_use]
    pub const fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    #[inline]
    #[must_use]
    pub const fn run_length(&self) -> usize {
        self.run_length as usize
    }

    #[inline]
    #[must_use]
    pub const fn state(&self) -> FrameState {
        self.state
    }

    #[inline]
    #[must_use]
    pub const fn is_fixed(&self) -> bool {
        matches!(self.state, FrameState::Fixed)
    }

    #[inline]
    #[must_use]
    pub const fn is_free(&self) -> bool {
        matches!(self.state, FrameState::Free)
    }

    #[inline]
    #[must_use]
    pub const fn is_allocated(&self) -> bool {
        matches!(self.state, FrameState::Allocated)
    }

    fn release(&mut self) {
        self.state = FrameState::Free;
        self.timestamp = Timestamp::ZERO;
        self.run_length = 1;
        self.owner = None;
        self.user_address = None;
    }

    #[cfg(test)]
    pub(crate) const fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Frame counts by state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CoremapStats {
    pub total: usize,
    pub fixed: usize,
    pub free: usize,
    pub allocated: usize,
}

/// Ownership fields written into every frame of a new run.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Claim {
    pub owner: Option<AddressSpaceId>,
    pub user_address: Option<VirtualAddress>,
}

impl Claim {
    pub const KERNEL: Self = Self {
        owner: None,
        user_address: None,
    };
}

/// The frame table.
pub struct Coremap<'m> {
    frames: &'m mut [FrameDescriptor],
    last_stamp: Timestamp,
}

impl<'m> Coremap<'m> {
    /// Initializes `storage` so that slot `i` describes frame `i`; the first
    /// `fixed` frames are [`FrameState::Fixed`], the rest free.
    pub(crate) fn init(storage: &'m mut [MaybeUninit<FrameDescriptor>], fixed: usize) -> Self {
        for (frame, slot) in storage.iter_mut().enumerate() {
            let state = if frame < fixed {
                FrameState::Fixed
            } else {
                FrameState::Free
            };
            slot.write(FrameDescriptor::new(frame, state));
        }

        let len = storage.len();
        // SAFETY: Every slot was written above.
        let frames = unsafe {
            core::slice::from_raw_parts_mut(storage.as_mut_ptr().cast::<FrameDescriptor>(), len)
        };

        Self {
            frames,
            last_stamp: Timestamp::ZERO,
        }
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn frames(&self) -> &[FrameDescriptor] {
        &self.frames[..]
    }

    #[must_use]
    pub fn stats(&self) -> CoremapStats {
        self.frames.iter().fold(
            CoremapStats {
                total: self.frames.len(),
                ..CoremapStats::default()
            },
            |mut stats, frame| {
                match frame.state {
                    FrameState::Fixed => stats.fixed += 1,
                    FrameState::Free => stats.free += 1,
                    FrameState::Allocated => stats.allocated += 1,
                }
                stats
            },
        )
    }

    /// Slot whose kernel alias is exactly `addr`.
    #[must_use]
    pub fn find_by_kernel_address(&self, addr: VirtualAddress) -> Option<usize> {
        self.frames.iter().position(|f| f.kernel_address == addr)
    }

    /// First slot of the lowest run of `pages` consecutive free frames.
    #[must_use]
    pub fn find_free_run(&self, pages: usize) -> Option<usize> {
        if pages == 0 {
            return None;
        }

        let mut run = 0;
        for (frame, descriptor) in self.frames.iter().enumerate() {
            if descriptor.is_free() {
                run += 1;
                if run == pages {
                    return Some(frame + 1 - pages);
                }
            } else {
                run = 0;
            }
        }
        None
    }

    /// Slots of the allocation (or single free/fixed frame) covering `frame`.
    #[must_use]
    pub fn run_containing(&self, frame: usize) -> Range<usize> {
        debug_assert!(frame < self.frames.len());

        let mut start = 0;
        while start < self.frames.len() {
            let len = self.frames[start].run_length().max(1);
            let end = start + len;
            debug_assert!(end <= self.frames.len(), "run at {start} leaves the coremap");
            if frame < end {
                return start..end.min(self.frames.len());
            }
            start = end;
        }
        frame..frame + 1
    }

    /// Issues a stamp no older than any handed out before.
    pub(crate) fn next_stamp(&mut self, now: Timestamp) -> Timestamp {
        self.last_stamp = self.last_stamp.max(now);
        self.last_stamp
    }

    /// Marks `frames` as one allocated run.
    pub(crate) fn claim(&mut self, frames: Range<usize>, stamp: Timestamp, claim: Claim) {
        #[allow(clippy::cast_possible_truncation)]
        let run_length = frames.len() as u32;
        for descriptor in &mut self.frames[frames] {
            debug_assert!(descriptor.is_free());
            descriptor.state = FrameState::Allocated;
            descriptor.timestamp = stamp;
            descriptor.run_length = run_length;
            descriptor.owner = claim.owner;
            descriptor.user_address = claim.user_address;
        }
    }

    /// Returns every non-fixed frame in `frames` to the free pool.
    pub(crate) fn release(&mut self, frames: Range<usize>) {
        for descriptor in &mut self.frames[frames] {
            if !descriptor.is_fixed() {
                descriptor.release();
            }
        }
    }
}
