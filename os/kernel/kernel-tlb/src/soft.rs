use crate::{NUM_TLB, TlbEntry, TlbHardware, TlbHi};

/// Software model of the MIPS TLB.
///
/// Starts fully invalidated. [`write_random`](TlbHardware::write_random)
/// walks slots downwards from the top, wrapping around, like the hardware
/// `Random` register.
#[derive(Debug, Clone)]
pub struct SoftTlb<const N: usize = NUM_TLB> {
    entries: [TlbEntry; N],
    random: usize,
}

impl<const N: usize> Default for SoftTlb<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SoftTlb<N> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: core::array::from_fn(TlbEntry::invalid),
            random: N - 1,
        }
    }

    #[must_use]
    pub const fn entries(&self) -> &[TlbEntry] {
        &self.entries
    }

    /// Slots currently holding a usable translation.
    pub fn valid_entries(&self) -> impl Iterator<Item = (usize, &TlbEntry)> {
        self.entries.iter().enumerate().filter(|(_, e)| e.is_valid())
    }
}

impl<const N: usize> TlbHardware for SoftTlb<N> {
    fn capacity(&self) -> usize {
        N
    }

    fn read(&self, index: usize) -> TlbEntry {
        self.entries[index]
    }

    fn write(&mut self, index: usize, entry: TlbEntry) {
        self.entries[index] = entry;
    }

    fn write_random(&mut self, entry: TlbEntry) -> usize {
        let index = self.random;
        self.random = index.checked_sub(1).unwrap_or(N - 1);
        self.entries[index] = entry;
        index
    }

    fn probe(&self, hi: TlbHi) -> Option<usize> {
        self.entries.iter().position(|e| e.hi == hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel_memory_addresses::{PhysicalPage, VirtualPage};

    #[test]
    fn starts_empty() {
        let tlb = SoftTlb::<8>::new();
        assert_eq!(tlb.valid_entries().count(), 0);
        assert_eq!(tlb.capacity(), 8);
    }

    #[test]
    fn probe_finds_written_page() {
        let mut tlb = SoftTlb::<8>::new();
        let page = VirtualPage::from_page_number(0x400);
        tlb.write(3, TlbEntry::mapping(page, PhysicalPage::from_frame_number(9), false));

        assert_eq!(tlb.probe(TlbHi::for_page(page)), Some(3));
        assert_eq!(tlb.probe(TlbHi::for_page(VirtualPage::from_page_number(0x401))), None);
    }

    #[test]
    fn random_replacement_cycles_downwards() {
        let mut tlb = SoftTlb::<3>::new();
        let e = TlbEntry::mapping(
            VirtualPage::from_page_number(1),
            PhysicalPage::from_frame_number(1),
            false,
        );
        assert_eq!(tlb.write_random(e), 2);
        assert_eq!(tlb.write_random(e), 1);
        assert_eq!(tlb.write_random(e), 0);
        assert_eq!(tlb.write_random(e), 2);
    }
}
