//! Fakes for the memory manager's collaborators.

#![allow(dead_code)]

use kernel_console::ConsoleLogger;
use kernel_info::memory::PAGE_SIZE;
use kernel_memory_addresses::{PhysicalAddress, PhysicalPage, VirtualAddress, VirtualPage};
use kernel_sync::InterruptControl;
use kernel_vm::{
    AddressSpaceId, AddressSpaces, EvictedFrame, Mapping, Permissions, PhysMapper, Platform,
    Timestamp, VmError, WriteBack,
};
use log::LevelFilter;
use std::cell::UnsafeCell;
use std::collections::HashMap;
use std::mem::MaybeUninit;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};

fn stdout_sink(s: &str) {
    print!("{s}");
}

static LOGGER: ConsoleLogger = ConsoleLogger::new(LevelFilter::Trace, stdout_sink);

/// Routes `log` output to the test's stdout (shown for failing tests).
pub fn init_logging() {
    let _ = LOGGER.init();
}

/// Kernel alias of frame `n`.
pub fn kva(frame: usize) -> VirtualAddress {
    PhysicalPage::from_frame_number(frame).base().to_kernel_virtual()
}

/// Frame number behind a kernel alias.
pub fn frame_of(addr: VirtualAddress) -> usize {
    addr.kseg0_to_physical().expect("kseg0 address").page().frame_number()
}

/// Interrupt controller recording how often it was masked.
#[derive(Debug)]
pub struct TestIrq {
    enabled: AtomicBool,
    disables: AtomicUsize,
}

impl Default for TestIrq {
    fn default() -> Self {
        Self::new()
    }
}

impl TestIrq {
    pub const fn new() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            disables: AtomicUsize::new(0),
        }
    }

    pub fn disables(&self) -> usize {
        self.disables.load(Ordering::SeqCst)
    }
}

impl InterruptControl for TestIrq {
    fn interrupts_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn disable_interrupts(&self) {
        self.disables.fetch_add(1, Ordering::SeqCst);
        self.enabled.store(false, Ordering::SeqCst);
    }

    fn enable_interrupts(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }
}

/// A machine with RAM `[0, last)` of which `[0, first)` is already used.
///
/// The clock advances by 10ns on every read.
pub struct TestPlatform {
    irq: TestIrq,
    first: AtomicU32,
    last: u32,
    clock: AtomicU64,
    clock_broken: AtomicBool,
}

impl TestPlatform {
    /// `used_frames` frames of kernel image below `frames` frames of RAM.
    pub fn new(used_frames: u32, frames: u32) -> Self {
        Self::with_range(
            PhysicalAddress::new(used_frames * PAGE_SIZE),
            PhysicalAddress::new(frames * PAGE_SIZE),
        )
    }

    pub fn with_range(first: PhysicalAddress, last: PhysicalAddress) -> Self {
        Self {
            irq: TestIrq::new(),
            first: AtomicU32::new(first.as_u32()),
            last: last.as_u32(),
            clock: AtomicU64::new(0),
            clock_broken: AtomicBool::new(false),
        }
    }

    pub fn first(&self) -> PhysicalAddress {
        PhysicalAddress::new(self.first.load(Ordering::SeqCst))
    }

    pub fn set_clock(&self, nanos: u64) {
        self.clock.store(nanos, Ordering::SeqCst);
    }

    pub fn break_clock(&self) {
        self.clock_broken.store(true, Ordering::SeqCst);
    }

    pub fn irq(&self) -> &TestIrq {
        &self.irq
    }
}

impl Platform for TestPlatform {
    type Interrupts = TestIrq;

    fn interrupts(&self) -> &TestIrq {
        &self.irq
    }

    fn ram_range(&self) -> (PhysicalAddress, PhysicalAddress) {
        (self.first(), PhysicalAddress::new(self.last))
    }

    fn ram_steal(&self, pages: usize) -> PhysicalAddress {
        let bytes = u32::try_from(pages).expect("page count") * PAGE_SIZE;
        let last = self.last;
        self.first
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |first| {
                first.checked_add(bytes).filter(|&end| end <= last)
            })
            .map_or(PhysicalAddress::zero(), PhysicalAddress::new)
    }

    fn now(&self) -> Option<Timestamp> {
        if self.clock_broken.load(Ordering::SeqCst) {
            return None;
        }
        Some(Timestamp::from_nanos(
            self.clock.fetch_add(10, Ordering::SeqCst) + 10,
        ))
    }
}

#[repr(C, align(4096))]
struct Frame([u8; PAGE_SIZE as usize]);

/// Heap-backed physical RAM; frame `n` is the `n`th 4 KiB block.
pub struct TestRam {
    frames: Box<[UnsafeCell<Frame>]>,
}

// SAFETY: Callers of `phys_to_slice` guarantee exclusive access per range.
unsafe impl Sync for TestRam {}

impl TestRam {
    pub fn new(frames: usize) -> Self {
        Self {
            frames: (0..frames)
                .map(|_| UnsafeCell::new(Frame([0; PAGE_SIZE as usize])))
                .collect(),
        }
    }

    /// Scribbles over a frame the manager does not hold a reference into.
    pub fn fill(&self, frame: usize, byte: u8) {
        unsafe { (*self.frames[frame].get()).0.fill(byte) }
    }

    pub fn is_zeroed(&self, frame: usize) -> bool {
        unsafe { (*self.frames[frame].get()).0.iter().all(|&b| b == 0) }
    }

    fn len_bytes(&self) -> usize {
        self.frames.len() * PAGE_SIZE as usize
    }
}

impl PhysMapper for TestRam {
    unsafe fn phys_to_slice<'a, T>(
        &self,
        pa: PhysicalAddress,
        len: usize,
    ) -> &'a mut [MaybeUninit<T>] {
        let end = pa.as_usize() + len * size_of::<T>();
        assert!(end <= self.len_bytes(), "{pa} + {len} elements is outside test RAM");
        let base = UnsafeCell::raw_get(self.frames.as_ptr()).cast::<u8>();
        unsafe { std::slice::from_raw_parts_mut(base.add(pa.as_usize()).cast(), len) }
    }
}

/// Page tables as a plain map.
#[derive(Default)]
pub struct FakeSpaces {
    current: Option<AddressSpaceId>,
    mappings: HashMap<(AddressSpaceId, VirtualPage), Mapping>,
}

impl FakeSpaces {
    pub fn running(space: AddressSpaceId) -> Self {
        Self {
            current: Some(space),
            mappings: HashMap::new(),
        }
    }

    pub fn map(
        mut self,
        space: AddressSpaceId,
        addr: u32,
        frame: usize,
        permissions: Permissions,
    ) -> Self {
        self.mappings.insert(
            (space, VirtualAddress::new(addr).page()),
            Mapping {
                frame: PhysicalPage::from_frame_number(frame),
                permissions,
            },
        );
        self
    }
}

impl AddressSpaces for FakeSpaces {
    fn current(&self) -> Option<AddressSpaceId> {
        self.current
    }

    fn lookup_mapping(&self, space: AddressSpaceId, page: VirtualPage) -> Option<Mapping> {
        self.mappings.get(&(space, page)).copied()
    }
}

/// Write-back hook that remembers every victim and can be told to fail.
#[derive(Default)]
pub struct RecordingWriteBack {
    evicted: Mutex<Vec<EvictedFrame>>,
    fail: AtomicBool,
}

impl RecordingWriteBack {
    pub fn evicted(&self) -> Vec<EvictedFrame> {
        self.evicted.lock().unwrap().clone()
    }

    pub fn fail(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

impl WriteBack for RecordingWriteBack {
    fn write_back(&self, victim: &EvictedFrame) -> Result<(), VmError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(VmError::WriteBackFailed(victim.frame));
        }
        self.evicted.lock().unwrap().push(*victim);
        Ok(())
    }
}
