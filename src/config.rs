use crate::types::SpinCount;

/// The default upper bound on spins while waiting for a writer to release the gate.
pub const DEFAULT_MAX_WRITER_WAIT_SPINS: SpinCount = 1024;

/// The default upper bound on spins while waiting for admitted readers to drain.
pub const DEFAULT_MAX_READER_WAIT_SPINS: SpinCount = 1024;

/// The default spin count above which a wait also yields the time slice.
pub const DEFAULT_YIELD_THRESHOLD: SpinCount = 512;

/// Per-lock tuning of the contention behavior.
///
/// None of these settings change what the lock guarantees, only how much CPU a contended wait
/// burns and how quickly it reacts. Tests can shrink every cap to keep model checking tractable:
///
/// ```
/// use smtx::{Config, RawSmtx};
///
/// let config = Config::new()
///     .with_max_writer_wait_spins(4)
///     .with_max_reader_wait_spins(2)
///     .with_yield_threshold(1);
/// let smtx = RawSmtx::with_config(config);
/// assert_eq!(smtx.config().max_reader_wait_spins, 2);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Computes the next spin count from the current one. The result is clamped to
    /// `1..=cap` for whichever cap applies to the wait loop.
    pub next_spins: fn(SpinCount) -> SpinCount,

    /// Cap on the spin count while waiting on a writer: readers waiting for the gate to clear and
    /// writers waiting to win the gate.
    pub max_writer_wait_spins: SpinCount,

    /// Cap on the spin count while a writer that already owns the gate waits for readers to drain.
    pub max_reader_wait_spins: SpinCount,

    /// Once the spin count exceeds this value, every wait also calls [Config::yield_now].
    pub yield_threshold: SpinCount,

    /// Hands the time slice back to the scheduler.
    pub yield_now: fn(),

    /// Whether unbalanced unlocks are detected and reported as a panic.
    pub debug_checks: bool,
}

/// Doubles the spin count.
pub fn double_spins(spins: SpinCount) -> SpinCount {
    spins.saturating_mul(2)
}

impl Config {
    pub const fn new() -> Self {
        Self {
            next_spins: double_spins,
            max_writer_wait_spins: DEFAULT_MAX_WRITER_WAIT_SPINS,
            max_reader_wait_spins: DEFAULT_MAX_READER_WAIT_SPINS,
            yield_threshold: DEFAULT_YIELD_THRESHOLD,
            yield_now: crate::sync::yield_now,
            debug_checks: cfg!(debug_assertions),
        }
    }

    pub const fn with_next_spins(mut self, next_spins: fn(SpinCount) -> SpinCount) -> Self {
        self.next_spins = next_spins;
        self
    }

    /// A cap of 0 is treated as 1.
    pub const fn with_max_writer_wait_spins(mut self, spins: SpinCount) -> Self {
        self.max_writer_wait_spins = at_least_one(spins);
        self
    }

    /// A cap of 0 is treated as 1.
    pub const fn with_max_reader_wait_spins(mut self, spins: SpinCount) -> Self {
        self.max_reader_wait_spins = at_least_one(spins);
        self
    }

    pub const fn with_yield_threshold(mut self, threshold: SpinCount) -> Self {
        self.yield_threshold = threshold;
        self
    }

    pub const fn with_yield_now(mut self, yield_now: fn()) -> Self {
        self.yield_now = yield_now;
        self
    }

    pub const fn with_debug_checks(mut self, debug_checks: bool) -> Self {
        self.debug_checks = debug_checks;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

const fn at_least_one(spins: SpinCount) -> SpinCount {
    if spins == 0 {
        1
    } else {
        spins
    }
}
