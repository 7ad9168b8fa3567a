use crate::{SpinLock, SpinLockGuard};

/// Access to the local core's interrupt-enable state.
///
/// On MIPS this is the `IE` bit of the CP0 status register; the platform
/// layer provides the implementation (the equivalent of `splhigh()` /
/// `splx()`). Only the local core is affected: there is no cross-core
/// coordination.
///
/// # Safety & Privilege
///
/// Implementations must only be used in kernel mode, where the status
/// register is writable.
pub trait InterruptControl {
    /// Whether interrupts are currently enabled on this core.
    fn interrupts_enabled(&self) -> bool;

    /// Masks all interrupts on this core.
    fn disable_interrupts(&self);

    /// Unmasks interrupts on this core.
    fn enable_interrupts(&self);
}

impl<T: InterruptControl + ?Sized> InterruptControl for &T {
    fn interrupts_enabled(&self) -> bool {
        (**self).interrupts_enabled()
    }

    fn disable_interrupts(&self) {
        (**self).disable_interrupts();
    }

    fn enable_interrupts(&self) {
        (**self).enable_interrupts();
    }
}

/// RAII guard that disables interrupts on creation and restores them on drop.
///
/// `IrqGuard::new()` snapshots the interrupt-enable state. If interrupts were
/// enabled, it masks them. On drop, it re-enables them **only** if they were
/// previously enabled, so guards nest: an inner guard created while an outer
/// one is alive leaves interrupts disabled when it goes away.
///
/// # Examples
///
/// ```ignore
/// use kernel_sync::IrqGuard;
///
/// {
///     let _g = IrqGuard::new(&platform_irq); // interrupts masked here
///     // critical section
/// }
/// // prior state restored here
/// ```
pub struct IrqGuard<'a, I: InterruptControl + ?Sized> {
    irq: &'a I,
    /// Whether interrupts were enabled when the guard was created.
    were_enabled: bool,
}

impl<'a, I: InterruptControl + ?Sized> IrqGuard<'a, I> {
    /// Disables interrupts if they are currently enabled and remembers the state.
    #[inline]
    #[must_use]
    pub fn new(irq: &'a I) -> Self {
        let enabled = irq.interrupts_enabled();
        if enabled {
            irq.disable_interrupts();
        }
        Self {
            irq,
            were_enabled: enabled,
        }
    }

    /// Whether interrupts were enabled before this guard masked them.
    #[inline]
    #[must_use]
    pub const fn were_enabled(&self) -> bool {
        self.were_enabled
    }
}

impl<I: InterruptControl + ?Sized> Drop for IrqGuard<'_, I> {
    fn drop(&mut self) {
        if self.were_enabled {
            self.irq.enable_interrupts();
        }
    }
}

impl<T> SpinLock<T> {
    /// Acquires the lock with interrupts disabled for the guard's lifetime.
    ///
    /// Interrupts are masked *before* spinning, so a trap handler on this core
    /// can never find the lock held by the code it interrupted. Dropping the
    /// guard releases the lock first and then restores the interrupt state.
    #[inline]
    pub fn lock_irq<'a, I: InterruptControl + ?Sized>(
        &'a self,
        irq: &'a I,
    ) -> crate::IrqSpinLockGuard<'a, T, I> {
        let irq = IrqGuard::new(irq);
        let guard: SpinLockGuard<'a, T> = self.lock();
        crate::IrqSpinLockGuard::new(guard, irq)
    }
}
