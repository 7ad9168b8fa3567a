//! # Kernel synchronization primitives
//!
//! The memory manager runs on a single core but is entered both from thread
//! context and from trap handlers. Two primitives cover that:
//!
//! - [`SpinLock`]: a test-and-test-and-set lock that never deschedules the
//!   caller, optionally paired with an [`IrqGuard`] via
//!   [`SpinLock::lock_irq`] so a trap cannot re-enter the critical section.
//! - [`SyncOnceCell`]: a value published exactly once (the coremap), readable
//!   lock-free afterwards.
//!
//! Interrupt masking itself is platform code; it is reached through the
//! [`InterruptControl`] trait.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod irq;
mod spin_lock;
mod sync_once_cell;

pub use irq::{InterruptControl, IrqGuard};
pub use spin_lock::{IrqSpinLockGuard, SpinLock, SpinLockGuard};
pub use sync_once_cell::SyncOnceCell;
