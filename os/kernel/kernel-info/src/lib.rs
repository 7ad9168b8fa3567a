//! # Kernel Platform Configuration
//!
//! Compile-time constants describing the MIPS-class machine the kernel runs
//! on. Every crate that needs to know where user space ends, how large a frame
//! is, or how many TLB slots the CPU has reads it from here, so the values
//! cannot drift between the allocator, the fault handler and the TLB code.
//!
//! ## Virtual Address Space (32-bit MIPS)
//!
//! ```text
//! 0x0000_0000 ┌─────────────────────────────────┐
//!             │  kuseg: user space, TLB-mapped  │
//!             │                                 │
//! 0x8000_0000 ├─────────────────────────────────┤ MIPS_KSEG0 / USERSPACE_TOP
//!             │  kseg0: kernel, unmapped,       │
//!             │  cached, phys + 0x8000_0000     │
//! 0xa000_0000 ├─────────────────────────────────┤ MIPS_KSEG1
//!             │  kseg1: kernel, unmapped,       │
//!             │  uncached (device registers)    │
//! 0xc000_0000 ├─────────────────────────────────┤ MIPS_KSEG2
//!             │  kseg2: kernel, TLB-mapped      │
//! 0xffff_ffff └─────────────────────────────────┘
//! ```
//!
//! The kernel never walks page tables for its own addresses: physical frame
//! `p` is always reachable at `p + MIPS_KSEG0`. This is the "fixed
//! physical-to-kernel-virtual offset" the coremap stores per frame.

#![cfg_attr(not(any(test, doctest)), no_std)]

pub mod memory;
