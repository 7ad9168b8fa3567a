//! # VM fault handling
//!
//! Resolves TLB misses against existing page-table entries. Nothing is ever
//! paged in: a fault on an unmapped page is an error for the faulting
//! process to deal with.

use crate::VmError;
use crate::platform::AddressSpaces;
use crate::tlb::TlbManager;
use kernel_memory_addresses::VirtualAddress;
use kernel_sync::{InterruptControl, IrqGuard};
use kernel_tlb::TlbHardware;
use log::{debug, trace};

/// Why the CPU trapped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FaultKind {
    /// TLB miss on a load or instruction fetch.
    Read,
    /// TLB miss on a store.
    Write,
    /// Store through a valid entry without the dirty bit.
    ReadOnly,
}

impl FaultKind {
    /// Whether resolving the fault requires a writable entry.
    #[must_use]
    pub const fn needs_write(self) -> bool {
        matches!(self, Self::Write | Self::ReadOnly)
    }
}

impl TryFrom<u32> for FaultKind {
    type Error = VmError;

    /// Decodes the trap layer's fault code.
    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Read),
            1 => Ok(Self::Write),
            2 => Ok(Self::ReadOnly),
            other => Err(VmError::UnknownFaultKind(other)),
        }
    }
}

/// Resolves faults for the current address space.
pub struct FaultHandler<'a, S: ?Sized, H, I> {
    spaces: &'a S,
    tlb: &'a TlbManager<H, I>,
}

impl<'a, S, H, I> FaultHandler<'a, S, H, I>
where
    S: AddressSpaces + ?Sized,
    H: TlbHardware,
    I: InterruptControl,
{
    pub const fn new(spaces: &'a S, tlb: &'a TlbManager<H, I>) -> Self {
        Self { spaces, tlb }
    }

    /// Installs the translation for `addr`.
    ///
    /// # Errors
    /// - [`VmError::InvalidFaultAddress`] for kernel addresses, when no
    ///   process is running, or when the page is unmapped.
    /// - [`VmError::ProtectionViolation`] for a store to a page mapped
    ///   without write permission.
    pub fn handle_fault(&self, kind: FaultKind, addr: VirtualAddress) -> Result<(), VmError> {
        let _irq = IrqGuard::new(self.tlb.interrupts());

        let page = addr.page();
        if page.base().is_kernel() {
            debug!("{kind:?} fault at kernel address {addr}");
            return Err(VmError::InvalidFaultAddress(addr));
        }

        let Some(space) = self.spaces.current() else {
            debug!("{kind:?} fault at {addr} with no current address space");
            return Err(VmError::InvalidFaultAddress(addr));
        };

        let Some(mapping) = self.spaces.lookup_mapping(space, page) else {
            debug!("{kind:?} fault at unmapped {addr} in {space:?}");
            return Err(VmError::InvalidFaultAddress(addr));
        };

        if kind.needs_write() && !mapping.permissions.writable() {
            debug!("{kind:?} fault at {addr}: page is read-only");
            return Err(VmError::ProtectionViolation(addr));
        }

        let slot = self
            .tlb
            .write_or_replace(page, mapping.frame, kind.needs_write());
        trace!("{kind:?} fault at {addr} resolved via tlb[{slot}]");
        Ok(())
    }
}
