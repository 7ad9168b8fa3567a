//! Find-or-evict allocation of contiguous frame runs.

use crate::VmError;
use crate::coremap::{Claim, Coremap};
use crate::eviction::{self, EvictedFrame, WriteBack};
use crate::phys_mapper::PhysMapper;
use crate::platform::Timestamp;
use core::ops::Range;
use kernel_memory_addresses::PhysicalPage;
use log::{debug, trace};

impl Coremap<'_> {
    /// Hands out `pages` contiguous frames, evicting if necessary.
    ///
    /// Prefers the lowest free run; otherwise reclaims the oldest window
    /// chosen by [`eviction::select_victims`]. Every handed-out frame is
    /// zeroed and stamped with `now` (clamped to be monotonic).
    ///
    /// Returns the first frame number of the run.
    pub(crate) fn allocate<M, W>(
        &mut self,
        pages: usize,
        now: Timestamp,
        claim: Claim,
        mapper: &M,
        write_back: &W,
    ) -> Result<usize, VmError>
    where
        M: PhysMapper + ?Sized,
        W: WriteBack + ?Sized,
    {
        if pages == 0 {
            return Err(VmError::ZeroPages);
        }

        let start = if let Some(start) = self.find_free_run(pages) {
            start
        } else {
            let start = eviction::select_victims(self.frames(), pages)
                .ok_or(VmError::ResourceExhausted { requested: pages })?;
            self.evict(start..start + pages, write_back)?;
            start
        };

        let run = start..start + pages;
        for frame in run.clone() {
            // SAFETY: The frame is free and about to be claimed under the coremap lock.
            unsafe { mapper.zero_frame(PhysicalPage::from_frame_number(frame)) };
        }

        let stamp = self.next_stamp(now);
        self.claim(run.clone(), stamp, claim);
        trace!("allocated frames {run:?} at {stamp:?} for {:?}", claim.owner);
        Ok(start)
    }

    /// Frees every allocation overlapping `window`.
    ///
    /// Allocations are reclaimed whole so a run never loses part of its
    /// frames. Nothing is changed if the write-back hook fails.
    fn evict<W: WriteBack + ?Sized>(
        &mut self,
        window: Range<usize>,
        write_back: &W,
    ) -> Result<(), VmError> {
        let reclaim =
            self.run_containing(window.start).start..self.run_containing(window.end - 1).end;

        for descriptor in &self.frames()[reclaim.clone()] {
            debug_assert!(!descriptor.is_fixed(), "eviction window covers a fixed frame");
            if descriptor.is_allocated() {
                write_back.write_back(&EvictedFrame::from_descriptor(descriptor))?;
            }
        }

        debug!(
            "evicting frames {reclaim:?} (oldest stamp {:?})",
            self.frames()[reclaim.clone()]
                .iter()
                .filter(|d| d.is_allocated())
                .map(|d| d.timestamp())
                .min()
        );
        self.release(reclaim);
        Ok(())
    }
}
