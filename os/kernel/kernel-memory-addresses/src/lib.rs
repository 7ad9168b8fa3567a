//! # Virtual and Physical Memory Address Types
//!
//! Strongly typed wrappers for the 32-bit addresses and page bases used by the
//! frame allocator, the TLB code and the fault handler.
//!
//! ## Overview
//!
//! Mixing a physical frame address with a kernel alias or a user virtual
//! address is the classic bug in this part of a kernel. The types here make
//! those mix-ups a compile error while remaining zero-cost `u32` wrappers:
//!
//! | Type | Meaning |
//! |------|---------|
//! | [`PhysicalAddress`] | A byte address in RAM as seen by the memory bus. |
//! | [`PhysicalPage`] | A frame-aligned physical address, i.e. one frame. |
//! | [`VirtualAddress`] | A byte address as issued by the CPU (user or kernel). |
//! | [`VirtualPage`] | A page-aligned virtual address, i.e. one TLB page. |
//!
//! There is exactly one page size ([`PAGE_SIZE`](kernel_info::memory::PAGE_SIZE));
//! the machine has no huge pages, so the types carry no size parameter.
//!
//! ## Kernel Aliases
//!
//! Every physical frame below 512 MiB is visible to the kernel through kseg0
//! at a fixed offset. [`PhysicalAddress::to_kernel_virtual`] and
//! [`VirtualAddress::kseg0_to_physical`] convert between the two views.
//!
//! ```rust
//! # use kernel_memory_addresses::*;
//! let pa = PhysicalAddress::new(0x0003_2010);
//! let kva = pa.to_kernel_virtual();
//! assert_eq!(kva.as_u32(), 0x8003_2010);
//! assert_eq!(kva.kseg0_to_physical(), Some(pa));
//!
//! let frame = pa.page();
//! assert_eq!(frame.frame_number(), 0x32);
//! assert_eq!(frame.base().as_u32(), 0x0003_2000);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

mod physical_address;
mod physical_page;
mod virtual_address;
mod virtual_page;

pub use physical_address::PhysicalAddress;
pub use physical_page::PhysicalPage;
pub use virtual_address::VirtualAddress;
pub use virtual_page::VirtualPage;

#[cfg(test)]
mod tests {
    use super::*;
    use kernel_info::memory::{MIPS_KSEG0, PAGE_SIZE};

    #[test]
    fn page_and_offset_split() {
        let va = VirtualAddress::new(0x0040_1234);
        assert_eq!(va.page().base().as_u32(), 0x0040_1000);
        assert_eq!(va.offset(), 0x234);
        assert_eq!(va.page().page_number(), 0x401);
    }

    #[test]
    fn kernel_alias_round_trip() {
        let pa = PhysicalAddress::new(7 * PAGE_SIZE);
        let kva = pa.to_kernel_virtual();
        assert_eq!(kva.as_u32(), MIPS_KSEG0 + 7 * PAGE_SIZE);
        assert!(kva.is_kernel());
        assert_eq!(kva.kseg0_to_physical(), Some(pa));
    }

    #[test]
    fn user_addresses_have_no_kseg0_alias() {
        let va = VirtualAddress::new(0x0040_0000);
        assert!(va.is_user());
        assert_eq!(va.kseg0_to_physical(), None);
        assert_eq!(VirtualAddress::new(0xa000_0000).kseg0_to_physical(), None);
    }

    #[test]
    fn frame_numbers() {
        let frame = PhysicalPage::from_frame_number(3);
        assert_eq!(frame.base().as_u32(), 3 * PAGE_SIZE);
        assert_eq!(frame.frame_number(), 3);
        assert_eq!(
            PhysicalPage::containing_address(PhysicalAddress::new(3 * PAGE_SIZE + 17)),
            frame
        );
    }

    #[test]
    fn null_physical_address() {
        assert!(PhysicalAddress::zero().is_null());
        assert!(!PhysicalAddress::new(PAGE_SIZE).is_null());
    }
}
