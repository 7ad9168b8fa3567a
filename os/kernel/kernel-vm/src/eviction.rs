//! # FIFO eviction
//!
//! When no run of free frames is large enough, the allocator reclaims the
//! window of `n` contiguous non-fixed frames that was handed out longest ago.
//! A window's age is that of its youngest frame (free frames count as
//! infinitely old), so for `n == 1` this is plain oldest-first. Ties go to
//! the lowest frame number.
//!
//! Reclaimed content is lost unless a [`WriteBack`] hook saves it first; the
//! default [`DiscardOnEvict`] does not.

use crate::VmError;
use crate::coremap::FrameDescriptor;
use crate::platform::{AddressSpaceId, Timestamp};
use kernel_memory_addresses::{PhysicalPage, VirtualAddress};

/// First slot of the cheapest window of `pages` contiguous non-fixed frames.
///
/// `None` when no such window exists, i.e. the request can never be
/// satisfied.
#[must_use]
pub fn select_victims(frames: &[FrameDescriptor], pages: usize) -> Option<usize> {
    if pages == 0 {
        return None;
    }

    let mut best: Option<(Timestamp, usize)> = None;
    let mut start = 0;
    while start + pages <= frames.len() {
        let window = &frames[start..start + pages];
        if let Some(fixed) = window.iter().rposition(FrameDescriptor::is_fixed) {
            start += fixed + 1;
            continue;
        }

        let age = window
            .iter()
            .map(FrameDescriptor::timestamp)
            .max()
            .unwrap_or(Timestamp::ZERO);
        if best.is_none_or(|(oldest, _)| age < oldest) {
            best = Some((age, start));
        }
        start += 1;
    }

    best.map(|(_, start)| start)
}

/// What a reclaimed frame held, passed to [`WriteBack::write_back`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EvictedFrame {
    pub frame: PhysicalPage,
    pub kernel_address: VirtualAddress,
    pub owner: Option<AddressSpaceId>,
    pub user_address: Option<VirtualAddress>,
    pub timestamp: Timestamp,
}

impl EvictedFrame {
    pub(crate) fn from_descriptor(descriptor: &FrameDescriptor) -> Self {
        Self {
            frame: descriptor.frame(),
            kernel_address: descriptor.kernel_address(),
            owner: descriptor.owner(),
            user_address: descriptor.user_address(),
            timestamp: descriptor.timestamp(),
        }
    }
}

/// Saves a frame's content before it is reclaimed.
///
/// Runs with the coremap locked and interrupts masked: implementations must
/// not block. A swap implementation would copy the frame into a buffer and
/// queue the disk write.
///
/// The allocator does not touch the TLB. An evicted user frame may still be
/// mapped by a live entry for [`EvictedFrame::user_address`]; implementations
/// serving user memory should drop it, e.g. with
/// [`TlbManager::shootdown`](crate::TlbManager::shootdown) and
/// [`ShootdownTarget::page`](crate::ShootdownTarget::page).
pub trait WriteBack {
    /// Called once for every allocated frame about to be reclaimed.
    ///
    /// # Errors
    /// Returning an error aborts the allocation before any frame is touched.
    fn write_back(&self, victim: &EvictedFrame) -> Result<(), VmError>;
}

impl<W: WriteBack + ?Sized> WriteBack for &W {
    fn write_back(&self, victim: &EvictedFrame) -> Result<(), VmError> {
        (**self).write_back(victim)
    }
}

/// Drops evicted content.
#[derive(Debug, Default, Copy, Clone)]
pub struct DiscardOnEvict;

impl WriteBack for DiscardOnEvict {
    fn write_back(&self, _victim: &EvictedFrame) -> Result<(), VmError> {
        Ok(())
    }
}
