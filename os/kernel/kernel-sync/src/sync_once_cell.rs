use core::{
    cell::UnsafeCell,
    hint::spin_loop,
    mem::MaybeUninit,
    sync::atomic::{AtomicU8, Ordering},
};

const UNINIT: u8 = 0;
const INITING: u8 = 1;
const READY: u8 = 2;

/// A value that is published exactly once and then shared read-only.
///
/// The memory manager uses this as its "bootstrapped" flag: until
/// [`set`](Self::set) succeeds, [`get`](Self::get) returns `None` and callers
/// fall back to boot-time paths; afterwards every reader sees the same value.
pub struct SyncOnceCell<T> {
    state: AtomicU8,
    value: UnsafeCell<MaybeUninit<T>>,
}

impl<T> Default for SyncOnceCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SyncOnceCell<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(UNINIT),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    /// Returns `Some(&T)` once the value has been published.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        if self.is_ready() {
            // SAFETY: READY guarantees the write is done and never repeated.
            Some(unsafe { (*self.value.get()).assume_init_ref() })
        } else {
            None
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.state.load(Ordering::Acquire) == READY
    }

    /// Publishes `value` unless a value was already published.
    ///
    /// # Errors
    /// Hands `value` back if another caller won the race or the cell is
    /// already initialized.
    pub fn set(&self, value: T) -> Result<&T, T> {
        if self
            .state
            .compare_exchange(UNINIT, INITING, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(value);
        }

        // SAFETY: INITING makes us the only writer.
        let slot = unsafe { &mut *self.value.get() };
        slot.write(value);
        self.state.store(READY, Ordering::Release);
        Ok(unsafe { slot.assume_init_ref() })
    }

    /// Spins until a concurrent [`set`](Self::set) has completed.
    ///
    /// Returns `None` right away if nobody has started publishing.
    pub fn wait(&self) -> Option<&T> {
        loop {
            match self.state.load(Ordering::Acquire) {
                UNINIT => return None,
                INITING => spin_loop(),
                _ => return self.get(),
            }
        }
    }
}

impl<T> Drop for SyncOnceCell<T> {
    fn drop(&mut self) {
        if *self.state.get_mut() == READY {
            // SAFETY: READY means the value was written exactly once.
            unsafe { self.value.get_mut().assume_init_drop() };
        }
    }
}

// Safety: shared after READY; initialization is single-writer.
unsafe impl<T: Sync + Send> Sync for SyncOnceCell<T> {}
unsafe impl<T: Send> Send for SyncOnceCell<T> {}
