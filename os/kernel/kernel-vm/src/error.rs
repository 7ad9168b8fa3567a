use kernel_memory_addresses::{PhysicalPage, VirtualAddress};

/// Errors reported by the memory manager.
///
/// Most of these are recoverable: the trap layer kills the offending process
/// (or fails the kernel allocation) and carries on. The few that indicate the
/// kernel cannot continue are flagged by [`is_fatal`](Self::is_fatal).
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VmError {
    #[error("no run of {requested} evictable frame(s) exists")]
    ResourceExhausted { requested: usize },
    #[error("no valid translation for fault address {0}")]
    InvalidFaultAddress(VirtualAddress),
    #[error("write to read-only page at {0}")]
    ProtectionViolation(VirtualAddress),
    #[error("unknown fault code {0}")]
    UnknownFaultKind(u32),
    #[error("the platform clock is unavailable")]
    TimeSourceUnavailable,
    #[error("refusing to free fixed frame at {0}")]
    FixedFrameViolation(VirtualAddress),
    #[error("allocation of zero pages")]
    ZeroPages,
    #[error("out of boot memory while stealing {pages} page(s)")]
    BootMemoryExhausted { pages: usize },
    #[error("a coremap for {frames} frames does not fit in RAM")]
    CoremapTooLarge { frames: usize },
    #[error("the coremap was already bootstrapped")]
    AlreadyBootstrapped,
    #[error("the coremap is not bootstrapped")]
    NotBootstrapped,
    #[error("write-back of evicted frame {0} failed")]
    WriteBackFailed(PhysicalPage),
}

impl VmError {
    /// Whether the kernel must halt rather than fail a single request.
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        matches!(
            self,
            Self::TimeSourceUnavailable
                | Self::BootMemoryExhausted { .. }
                | Self::CoremapTooLarge { .. }
        )
    }
}
