//! The spin-then-yield wait used by every blocking and timed acquisition.
//!
//! A [Backoff] lives on the stack of a single wait loop. It starts at one pause per wait and grows
//! according to [Config::next_spins] until it reaches the cap that applies to the loop. Short
//! contention is therefore resolved within a few pause instructions, while sustained contention
//! escalates to yielding once the spin count passes [Config::yield_threshold].

use crate::config::Config;
use crate::sync::spin_loop;
use crate::types::SpinCount;

/// The spin counter of one wait loop.
#[derive(Debug)]
pub struct Backoff<'a> {
    config: &'a Config,
    spins: SpinCount,
    cap: SpinCount,
}

impl<'a> Backoff<'a> {
    /// A backoff for waiting on a writer, capped at [Config::max_writer_wait_spins].
    pub fn for_writer(config: &'a Config) -> Self {
        Self::with_cap(config, config.max_writer_wait_spins)
    }

    /// A backoff for draining readers, capped at [Config::max_reader_wait_spins].
    pub fn for_readers(config: &'a Config) -> Self {
        Self::with_cap(config, config.max_reader_wait_spins)
    }

    fn with_cap(config: &'a Config, cap: SpinCount) -> Self {
        Self {
            config,
            spins: 1,
            cap: cap.max(1),
        }
    }

    /// Spin for the current count, yield if the count is past the threshold, then grow.
    #[inline]
    pub fn wait(&mut self) {
        let spins: SpinCount = self.spins;
        for _ in 0..spins {
            spin_loop();
        }
        if spins > self.config.yield_threshold {
            (self.config.yield_now)();
        }
        if spins < self.cap {
            self.spins = (self.config.next_spins)(spins).clamp(1, self.cap);
        }
    }

    /// The number of pauses the next [Backoff::wait] will issue.
    pub fn current(&self) -> SpinCount {
        self.spins
    }
}
