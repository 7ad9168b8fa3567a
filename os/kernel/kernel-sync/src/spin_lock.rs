use crate::irq::{InterruptControl, IrqGuard};
use core::{
    cell::UnsafeCell,
    hint::spin_loop,
    ops::{Deref, DerefMut},
    sync::atomic::{AtomicBool, Ordering},
};

/// Non-blocking mutual exclusion for short critical sections.
///
/// Waiters busy-wait, so the holder must never sleep or perform I/O while
/// holding the lock. Use [`lock_irq`](SpinLock::lock_irq) when the same lock
/// is also taken from trap context.
pub struct SpinLock<T> {
    /// lock state
    /// * `false`: unlocked
    /// * `true`: locked
    locked: AtomicBool,
    inner: UnsafeCell<T>,
}

// Safety: mutual exclusion; only T: Send may cross threads.
unsafe impl<T: Send> Sync for SpinLock<T> {}

impl<T> SpinLock<T> {
    pub const fn new(inner: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            inner: UnsafeCell::new(inner),
        }
    }

    /// Try once; returns immediately.
    #[inline]
    pub fn try_lock(&self) -> Option<SpinLockGuard<'_, T>> {
        self.try_acquire().then(|| SpinLockGuard { lock: self })
    }

    /// Spin until acquired, then return a guard.
    #[inline]
    pub fn lock(&self) -> SpinLockGuard<'_, T> {
        while !self.try_acquire() {
            // Spin on a plain load so waiters don't bounce the cache line.
            while self.locked.load(Ordering::Relaxed) {
                spin_loop();
            }
        }
        SpinLockGuard { lock: self }
    }

    /// Closure convenience, built on the guard.
    #[inline]
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut g = self.lock();
        f(&mut g)
    }

    /// Whether some guard currently holds the lock.
    ///
    /// Only useful for assertions; the answer may be stale immediately.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }

    /// Mutable access when you have `&mut self` (no contention possible).
    #[inline]
    pub const fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }

    #[inline]
    fn try_acquire(&self) -> bool {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }
}

pub struct SpinLockGuard<'a, T> {
    lock: &'a SpinLock<T>,
}

impl<T> Deref for SpinLockGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        unsafe { &*self.lock.inner.get() }
    }
}

impl<T> DerefMut for SpinLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.lock.inner.get() }
    }
}

impl<T> Drop for SpinLockGuard<'_, T> {
    fn drop(&mut self) {
        // Release publishes the critical section.
        self.lock.locked.store(false, Ordering::Release);
    }
}

/// A [`SpinLockGuard`] that also keeps interrupts masked while held.
///
/// Created by [`SpinLock::lock_irq`]. Field order matters: the lock guard is
/// dropped before the interrupt guard, so interrupts come back only after the
/// lock is free.
pub struct IrqSpinLockGuard<'a, T, I: InterruptControl + ?Sized> {
    guard: SpinLockGuard<'a, T>,
    _irq: IrqGuard<'a, I>,
}

impl<'a, T, I: InterruptControl + ?Sized> IrqSpinLockGuard<'a, T, I> {
    pub(crate) const fn new(guard: SpinLockGuard<'a, T>, irq: IrqGuard<'a, I>) -> Self {
        Self { guard, _irq: irq }
    }
}

impl<T, I: InterruptControl + ?Sized> Deref for IrqSpinLockGuard<'_, T, I> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T, I: InterruptControl + ?Sized> DerefMut for IrqSpinLockGuard<'_, T, I> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}
