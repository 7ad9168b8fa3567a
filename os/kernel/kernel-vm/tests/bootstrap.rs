mod support;

use kernel_info::memory::PAGE_SIZE;
use kernel_memory_addresses::{PhysicalAddress, VirtualAddress};
use kernel_vm::{CoremapStats, FrameState, Timestamp, Vm, VmError};
use support::{TestPlatform, TestRam, frame_of, init_logging, kva};

#[test]
fn bootstrap_accounts_for_every_frame() {
    init_logging();
    let ram = TestRam::new(16);
    let vm = Vm::new(TestPlatform::new(2, 16), &ram);
    assert!(!vm.is_bootstrapped());
    assert_eq!(vm.stats(), None);

    vm.bootstrap().unwrap();
    assert!(vm.is_bootstrapped());

    let stats = vm.stats().unwrap();
    assert_eq!(
        stats,
        CoremapStats {
            total: 16,
            fixed: 3,
            free: 13,
            allocated: 0
        }
    );
    assert_eq!(stats.fixed + stats.free, stats.total);

    for frame in 0..16 {
        let d = vm.descriptor(frame).unwrap();
        assert_eq!(d.kernel_address(), kva(frame));
        assert_eq!(d.frame().frame_number(), frame);
        assert_eq!(d.timestamp(), Timestamp::ZERO);
        assert_eq!(d.run_length(), 1);
        assert_eq!(d.owner(), None);
        let expected = if frame < 3 { FrameState::Fixed } else { FrameState::Free };
        assert_eq!(d.state(), expected, "frame {frame}");
    }
    assert_eq!(vm.descriptor(16), None);
}

#[test]
fn stolen_pages_become_fixed() {
    init_logging();
    let ram = TestRam::new(16);
    let vm = Vm::new(TestPlatform::new(1, 16), &ram);

    let early = vm.alloc_kernel_pages(2).unwrap();
    assert_eq!(early, VirtualAddress::new(0x8000_1000));
    assert_eq!(vm.platform().first(), PhysicalAddress::new(3 * PAGE_SIZE));

    vm.bootstrap().unwrap();

    // Kernel image, two stolen pages and the coremap frame.
    assert_eq!(vm.stats().unwrap().fixed, 4);
    assert_eq!(vm.descriptor(2).unwrap().state(), FrameState::Fixed);
    assert_eq!(vm.descriptor(4).unwrap().state(), FrameState::Free);
}

#[test]
fn stealer_is_retired_after_bootstrap() {
    init_logging();
    let ram = TestRam::new(16);
    let vm = Vm::new(TestPlatform::new(2, 16), &ram);
    vm.bootstrap().unwrap();
    let mark = vm.platform().first();

    let addr = vm.alloc_kernel_pages(1).unwrap();

    assert_eq!(vm.platform().first(), mark, "RAM was stolen after bootstrap");
    assert_eq!(frame_of(addr), 3);
    assert_eq!(vm.descriptor(3).unwrap().state(), FrameState::Allocated);
}

#[test]
fn exhausted_boot_memory_is_fatal() {
    init_logging();
    let ram = TestRam::new(16);
    let vm = Vm::new(TestPlatform::new(15, 16), &ram);

    let err = vm.alloc_kernel_pages(2).unwrap_err();
    assert_eq!(err, VmError::BootMemoryExhausted { pages: 2 });
    assert!(err.is_fatal());
}

#[test]
fn second_bootstrap_is_rejected() {
    init_logging();
    let ram = TestRam::new(16);
    let vm = Vm::new(TestPlatform::new(2, 16), &ram);
    vm.bootstrap().unwrap();
    vm.alloc_kernel_pages(1).unwrap();
    let before = vm.stats();

    assert_eq!(vm.bootstrap(), Err(VmError::AlreadyBootstrapped));
    assert_eq!(vm.stats(), before);
}

#[test]
fn coremap_that_does_not_fit_is_fatal() {
    init_logging();
    let ram = TestRam::new(16);
    let vm = Vm::new(
        TestPlatform::with_range(
            PhysicalAddress::new(16 * PAGE_SIZE - 16),
            PhysicalAddress::new(16 * PAGE_SIZE),
        ),
        &ram,
    );

    let err = vm.bootstrap().unwrap_err();
    assert_eq!(err, VmError::CoremapTooLarge { frames: 16 });
    assert!(err.is_fatal());
    assert!(!vm.is_bootstrapped());
}

#[test]
fn freeing_unknown_addresses_changes_nothing() {
    init_logging();
    let ram = TestRam::new(16);
    let vm = Vm::new(TestPlatform::new(2, 16), &ram);
    vm.bootstrap().unwrap();
    vm.alloc_kernel_pages(2).unwrap();
    let snapshot: Vec<_> = (0..16).map(|f| vm.descriptor(f).unwrap()).collect();

    vm.free_kernel_pages(VirtualAddress::new(0x8010_0000));
    vm.free_kernel_pages(VirtualAddress::new(0x8000_3004));
    assert_eq!(vm.free_user_page(VirtualAddress::new(0x0040_0000)), Ok(()));

    let after: Vec<_> = (0..16).map(|f| vm.descriptor(f).unwrap()).collect();
    assert_eq!(after, snapshot);
}

#[test]
fn fixed_frames_are_never_freed() {
    init_logging();
    let ram = TestRam::new(16);
    let vm = Vm::new(TestPlatform::new(2, 16), &ram);
    vm.bootstrap().unwrap();

    vm.free_kernel_pages(kva(0));
    assert_eq!(vm.descriptor(0).unwrap().state(), FrameState::Fixed);

    assert_eq!(
        vm.free_user_page(kva(2)),
        Err(VmError::FixedFrameViolation(kva(2)))
    );
    assert_eq!(vm.descriptor(2).unwrap().state(), FrameState::Fixed);
    assert_eq!(vm.stats().unwrap().fixed, 3);
}

#[test]
fn free_before_bootstrap_is_ignored() {
    init_logging();
    let ram = TestRam::new(16);
    let vm = Vm::new(TestPlatform::new(2, 16), &ram);
    let early = vm.alloc_kernel_pages(1).unwrap();

    vm.free_kernel_pages(early);
    assert_eq!(vm.free_user_page(early), Ok(()));
    assert_eq!(vm.platform().first(), PhysicalAddress::new(3 * PAGE_SIZE));
}
