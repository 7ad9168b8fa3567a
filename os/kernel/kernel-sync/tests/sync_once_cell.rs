use kernel_sync::SyncOnceCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn empty_until_set() {
    let cell = SyncOnceCell::<u32>::new();
    assert!(cell.get().is_none());
    assert!(!cell.is_ready());
    assert!(cell.wait().is_none());

    assert_eq!(cell.set(5), Ok(&5));
    assert_eq!(cell.get(), Some(&5));
    assert!(cell.is_ready());
}

#[test]
fn second_set_is_rejected_and_returns_value() {
    let cell = SyncOnceCell::new();
    assert!(cell.set(String::from("first")).is_ok());

    let err = cell.set(String::from("second")).unwrap_err();
    assert_eq!(err, "second");
    assert_eq!(cell.get().map(String::as_str), Some("first"));
}

#[test]
fn exactly_one_racer_wins() {
    let threads = 8;
    let cell = Arc::new(SyncOnceCell::new());
    let wins = Arc::new(AtomicUsize::new(0));
    let start = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let cell = Arc::clone(&cell);
            let wins = Arc::clone(&wins);
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                if cell.set(i).is_ok() {
                    wins.fetch_add(1, Ordering::SeqCst);
                }
                assert!(cell.wait().is_some());
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(wins.load(Ordering::SeqCst), 1);
    assert!(cell.get().is_some());
}

#[test]
fn published_value_is_dropped_with_the_cell() {
    struct Counted<'a>(&'a AtomicUsize);
    impl Drop for Counted<'_> {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    let drops = AtomicUsize::new(0);
    {
        let cell = SyncOnceCell::new();
        assert!(cell.set(Counted(&drops)).is_ok());
    }
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}
