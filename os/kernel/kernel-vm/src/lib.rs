//! # Physical Memory Management and VM Faults
//!
//! The memory manager of a single-core MIPS kernel. It tracks every physical
//! frame, hands frames to the kernel and to user processes, reclaims the
//! oldest frames when RAM runs out, and refills the software-managed TLB on
//! faults.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌───────────────────────────┐     ┌───────────────────────────┐
//! │ Vm                        │     │ FaultHandler              │
//! │ • bootstrap               │     │ • fault kind decoding     │
//! │ • kernel/user alloc, free │     │ • page-table lookup       │
//! └─────────────┬─────────────┘     └─────────────┬─────────────┘
//!               │ one spin lock, IRQs off         │ IRQs off
//! ┌─────────────▼─────────────┐     ┌─────────────▼─────────────┐
//! │ Coremap                   │     │ TlbManager                │
//! │ • frame descriptors       │     │ • shootdown (all / range) │
//! │ • find-or-evict N frames  │     │ • write-or-replace        │
//! └─────────────┬─────────────┘     └─────────────┬─────────────┘
//!               │                                 │
//!        PhysMapper, WriteBack              TlbHardware
//! ```
//!
//! ## Phases
//!
//! 1. **Early boot.** [`Vm::alloc_kernel_pages`] steals RAM from the
//!    platform's high-water mark. Nothing stolen is ever given back.
//! 2. **Bootstrap.** [`Vm::bootstrap`] places the coremap in the RAM it
//!    describes. Every frame below the end of the coremap is
//!    [`FrameState::Fixed`]; the rest start out free.
//! 3. **Steady state.** Allocations take the lowest free run of the
//!    requested size, or evict the oldest run of allocated frames
//!    ([`eviction`]). Every frame handed out is zero-filled.
//!
//! ## Collaborators
//!
//! The manager does not know the machine. It is handed:
//!
//! | Trait | Provides |
//! |-------|----------|
//! | [`Platform`] | RAM range, boot-time stealing, clock, interrupt masking |
//! | [`PhysMapper`] | access to physical memory ([`Kseg0PhysMapper`] in the kernel) |
//! | [`WriteBack`] | saving frames before eviction ([`DiscardOnEvict`] by default) |
//! | [`AddressSpaces`] | the current process and its page table |
//! | [`TlbHardware`](kernel_tlb::TlbHardware) | the TLB itself |
//!
//! ## Errors
//!
//! Everything fallible returns [`VmError`]. The caller decides what is
//! fatal; [`VmError::is_fatal`] marks the conditions the kernel cannot
//! survive.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod allocator;
mod bootstrap;
pub mod coremap;
mod error;
pub mod eviction;
pub mod fault;
pub mod phys_mapper;
pub mod platform;
pub mod tlb;
mod vm;

pub use coremap::{CoremapStats, FrameDescriptor, FrameState};
pub use error::VmError;
pub use eviction::{DiscardOnEvict, EvictedFrame, WriteBack};
pub use fault::{FaultHandler, FaultKind};
pub use phys_mapper::{Kseg0PhysMapper, PhysMapper};
pub use platform::{AddressSpaceId, AddressSpaces, Mapping, Permissions, Platform, Timestamp};
pub use tlb::{ShootdownTarget, TlbManager};
pub use vm::{FixedFramePolicy, Vm};
