use core::ops::Deref;

use crate::sync::{AtomicBool, AtomicU32, Ordering};
use crate::types::ReaderCount;

/// Keeps its contents on a cache line of its own when the `padding` feature is enabled, so that
/// cores polling one field do not invalidate the line another core is writing. The line is 64
/// bytes, or 128 with the `cache-line-128` feature for cores that prefetch lines in pairs.
#[cfg_attr(
    all(feature = "padding", not(feature = "cache-line-128")),
    repr(align(64))
)]
#[cfg_attr(
    all(feature = "padding", feature = "cache-line-128"),
    repr(align(128))
)]
#[derive(Debug)]
pub(crate) struct CachePadded<T>(T);

impl<T> CachePadded<T> {
    pub(crate) fn new(value: T) -> Self {
        Self(value)
    }
}

impl<T> Deref for CachePadded<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

/// The two atomic fields every operation works on.
///
/// At every quiescent point, `writer_locked` implies `reader_count == 0`, and `reader_count > 0`
/// implies `!writer_locked`. Between those points a reader may briefly hold a provisional
/// increment it is about to validate or undo, and a writer may hold the gate while readers drain.
#[derive(Debug)]
pub(crate) struct LockState {
    /// Threads currently holding shared access, plus readers between their optimistic increment
    /// and its validation.
    pub(crate) reader_count: CachePadded<AtomicU32>,

    /// The writer gate. Set by the one writer that won the compare-and-swap, from the start of its
    /// drain until it unlocks.
    pub(crate) writer_locked: CachePadded<AtomicBool>,
}

impl LockState {
    pub(crate) fn new() -> Self {
        Self {
            reader_count: CachePadded::new(AtomicU32::new(0)),
            writer_locked: CachePadded::new(AtomicBool::new(false)),
        }
    }

    /// Zero both fields. Requires exclusive access, so it can never race an acquisition.
    pub(crate) fn reset(&mut self) {
        self.reader_count.store(0, Ordering::Relaxed);
        self.writer_locked.store(false, Ordering::Relaxed);
    }

    pub(crate) fn reader_count(&self) -> ReaderCount {
        self.reader_count.load(Ordering::Acquire)
    }

    pub(crate) fn is_writer_locked(&self) -> bool {
        self.writer_locked.load(Ordering::Acquire)
    }
}

#[cfg(all(test, feature = "std", not(feature = "shuttle"), not(loom)))]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_reset_zeroes_both_fields() {
        let mut state: LockState = LockState::new();
        state.reader_count.store(3, Ordering::Relaxed);
        state.writer_locked.store(true, Ordering::Relaxed);

        state.reset();
        assert_eq!(state.reader_count(), 0);
        assert!(!state.is_writer_locked());
    }

    #[cfg(feature = "padding")]
    const CACHE_LINE_SIZE: usize = if cfg!(feature = "cache-line-128") {
        128
    } else {
        64
    };

    #[cfg(feature = "padding")]
    #[test]
    fn test_fields_do_not_share_a_cache_line() {
        let state: LockState = LockState::new();
        let reader_count_address: usize = &*state.reader_count as *const AtomicU32 as usize;
        let writer_locked_address: usize = &*state.writer_locked as *const AtomicBool as usize;

        assert_eq!(core::mem::align_of::<LockState>(), CACHE_LINE_SIZE);
        assert!(reader_count_address.abs_diff(writer_locked_address) >= CACHE_LINE_SIZE);
    }
}
