#![allow(dead_code)]

use smtx::{Config, Error, RawSmtx};
use tracing::{debug, trace};

cfg_if::cfg_if! {
    if #[cfg(loom)] {
        pub(crate) use loom::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
        pub(crate) use loom::sync::Arc;
        pub(crate) use loom::thread;
    } else if #[cfg(feature = "shuttle")] {
        pub(crate) use shuttle::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
        pub(crate) use shuttle::sync::Arc;
        pub(crate) use shuttle::thread;
    } else {
        pub(crate) use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
        pub(crate) use std::sync::Arc;
        pub(crate) use std::thread;
    }
}

/// Spin caps small enough for a model checker to enumerate.
pub(crate) fn tiny_config() -> Config {
    Config::new()
        .with_max_writer_wait_spins(2)
        .with_max_reader_wait_spins(2)
        .with_yield_threshold(1)
        .with_debug_checks(true)
}

/// Observations made from inside critical sections. A writer that sees another writer or a reader
/// inside, or a reader that sees a writer inside, means mutual exclusion was broken.
#[derive(Debug)]
pub(crate) struct CriticalSections {
    writer_inside: AtomicBool,
    readers_inside: AtomicUsize,
    value: AtomicUsize,
}

impl CriticalSections {
    pub(crate) fn new() -> Self {
        Self {
            writer_inside: AtomicBool::new(false),
            readers_inside: AtomicUsize::new(0),
            value: AtomicUsize::new(0),
        }
    }

    pub(crate) fn write(&self) {
        assert!(
            !self.writer_inside.swap(true, Ordering::SeqCst),
            "two writers inside"
        );
        assert_eq!(
            self.readers_inside.load(Ordering::SeqCst),
            0,
            "writer inside with readers"
        );
        // deliberately not a fetch_add: a lost update shows that exclusion failed
        let value: usize = self.value.load(Ordering::Relaxed);
        self.value.store(value + 1, Ordering::Relaxed);
        self.writer_inside.store(false, Ordering::SeqCst);
    }

    pub(crate) fn read(&self) -> usize {
        self.readers_inside.fetch_add(1, Ordering::SeqCst);
        assert!(
            !self.writer_inside.load(Ordering::SeqCst),
            "reader inside with a writer"
        );
        let value: usize = self.value.load(Ordering::Relaxed);
        self.readers_inside.fetch_sub(1, Ordering::SeqCst);
        value
    }

    pub(crate) fn value(&self) -> usize {
        self.value.load(Ordering::SeqCst)
    }
}

/// Readers and writers hammer one lock with the blocking operations.
pub(crate) fn reader_writer_test(num_readers: usize, num_writers: usize, iterations: usize) {
    let smtx: Arc<RawSmtx> = Arc::new(RawSmtx::with_config(tiny_config()));
    let sections: Arc<CriticalSections> = Arc::new(CriticalSections::new());

    let mut join_handles: Vec<thread::JoinHandle<()>> = Vec::new();
    for writer in 0..num_writers {
        let smtx = smtx.clone();
        let sections = sections.clone();
        join_handles.push(thread::spawn(move || {
            for _ in 0..iterations {
                smtx.lock_exclusive();
                sections.write();
                unsafe { smtx.unlock_exclusive() };
            }
            trace!("writer {writer} done");
        }));
    }
    for reader in 0..num_readers {
        let smtx = smtx.clone();
        let sections = sections.clone();
        join_handles.push(thread::spawn(move || {
            for _ in 0..iterations {
                smtx.lock_shared();
                let value: usize = sections.read();
                unsafe { smtx.unlock_shared() };
                assert!(value <= num_writers * iterations);
            }
            trace!("reader {reader} done");
        }));
    }

    join_handles
        .into_iter()
        .for_each(|join_handle| join_handle.join().expect("A thread panicked"));

    debug!("final state: {smtx:?}");
    assert_eq!(sections.value(), num_writers * iterations);
    assert_eq!(smtx.reader_count(), 0);
    assert!(!smtx.is_writer_locked());
}

/// A reader and a writer race with the try operations. Whatever the interleaving, they must never
/// both succeed while the other is inside, and a failed attempt must leave nothing behind.
pub(crate) fn try_race_test() {
    let smtx: Arc<RawSmtx> = Arc::new(RawSmtx::with_config(tiny_config()));
    let sections: Arc<CriticalSections> = Arc::new(CriticalSections::new());

    let writer = {
        let smtx = smtx.clone();
        let sections = sections.clone();
        thread::spawn(move || match smtx.try_lock_exclusive() {
            Ok(()) => {
                sections.write();
                unsafe { smtx.unlock_exclusive() };
                true
            }
            Err(error) => {
                assert_eq!(error, Error::Busy);
                false
            }
        })
    };
    let reader = {
        let smtx = smtx.clone();
        let sections = sections.clone();
        thread::spawn(move || match smtx.try_lock_shared() {
            Ok(()) => {
                sections.read();
                unsafe { smtx.unlock_shared() };
                true
            }
            Err(error) => {
                assert_eq!(error, Error::Busy);
                false
            }
        })
    };

    let wrote: bool = writer.join().expect("writer panicked");
    let _read: bool = reader.join().expect("reader panicked");

    assert_eq!(sections.value(), usize::from(wrote));
    assert_eq!(smtx.reader_count(), 0);
    assert!(!smtx.is_writer_locked());
}
