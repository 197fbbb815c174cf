//! The lock itself: two atomic fields and the acquisition protocols over them.
//!
//! # Protocol
//!
//! A reader waits until the writer gate reads clear, provisionally increments the reader count and
//! then re-reads the gate. If a writer won the gate in between, the reader takes its increment back
//! and starts over. A writer first wins the gate with a compare-and-swap and then waits for the
//! readers that were admitted before it to drain.
//!
//! The reader's increment followed by its re-check, and the writer's gate swap followed by its
//! reader count load, form a store-then-load handshake in both directions. All four accesses are
//! `SeqCst` so that at least one side always observes the other; with anything weaker a reader and a
//! writer may both enter on weakly ordered hardware. Waiting on the gate uses `Acquire` loads and
//! every release uses a `Release` store or decrement, so a holder observes everything the previous
//! exclusive holder wrote.
//!
//! # Fairness
//!
//! There is none. Readers that keep arriving before a writer wins the gate can starve it. Once the
//! gate is won no new reader completes its validation, so the writer only waits for readers that
//! were already admitted.

use crate::backoff::Backoff;
use crate::config::Config;
use crate::deadline::Deadline;
use crate::err::{ContractViolation, Error};
use crate::state::LockState;
use crate::sync::Ordering;
use crate::types::{ReaderCount, MAX_READERS};
use tracing::trace;

#[cfg(feature = "instrument")]
use tracing::instrument;

/// A shared mutex without associated data.
///
/// Successful acquisitions grant a permit which must be given back through the matching unlock.
/// [crate::Smtx] wraps this type with guards that do that automatically; use `RawSmtx` directly
/// when the protected state lives elsewhere.
///
/// ```
/// use smtx::{Error, RawSmtx};
///
/// let smtx = RawSmtx::new();
/// smtx.lock_shared();
/// assert_eq!(smtx.try_lock_exclusive(), Err(Error::Busy));
/// unsafe { smtx.unlock_shared() };
/// assert_eq!(smtx.try_lock_exclusive(), Ok(()));
/// unsafe { smtx.unlock_exclusive() };
/// ```
#[derive(Debug)]
pub struct RawSmtx {
    state: LockState,
    config: Config,
}

impl RawSmtx {
    /// An unlocked lock with the default [Config].
    pub fn new() -> Self {
        Self::with_config(Config::new())
    }

    /// An unlocked lock with the given [Config].
    pub fn with_config(config: Config) -> Self {
        Self {
            state: LockState::new(),
            config,
        }
    }

    /// Reset the lock to its unlocked state. Any permits still outstanding are forgotten.
    pub fn init(&mut self) {
        self.state.reset();
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A snapshot of the number of readers, including any which are about to validate or undo a
    /// provisional increment.
    pub fn reader_count(&self) -> ReaderCount {
        self.state.reader_count()
    }

    /// Whether a writer currently owns the gate. The owner may still be draining readers.
    pub fn is_writer_locked(&self) -> bool {
        self.state.is_writer_locked()
    }

    /// Acquire shared access, waiting for as long as it takes.
    ///
    /// Every shared acquisition panics with [ContractViolation::TooManyReaders] when
    /// [MAX_READERS] permits are already out.
    #[inline]
    pub fn lock_shared(&self) {
        if !self.attempt_shared() {
            self.lock_shared_slow();
        }
    }

    /// Acquire shared access if no writer holds or is contending for the gate.
    ///
    /// Returns [Error::Busy] otherwise, without waiting.
    #[inline]
    pub fn try_lock_shared(&self) -> Result<(), Error> {
        if self.attempt_shared() {
            Ok(())
        } else {
            trace!("shared acquisition busy");
            Err(Error::Busy)
        }
    }

    /// Acquire shared access, giving up with [Error::TimedOut] once `deadline` has passed.
    ///
    /// The deadline is checked before every attempt, so an expired deadline never acquires. A
    /// provisional increment is always taken back before returning.
    #[cfg_attr(feature = "instrument", instrument(level = "trace", skip_all))]
    pub fn lock_shared_until<D: Deadline>(&self, deadline: D) -> Result<(), Error> {
        let mut backoff: Backoff = Backoff::for_writer(&self.config);
        loop {
            if deadline.has_passed() {
                trace!("shared acquisition timed out");
                return Err(Error::TimedOut);
            }
            if self.state.writer_locked.load(Ordering::Acquire) {
                backoff.wait();
                continue;
            }
            if self.claim_shared() {
                return Ok(());
            }
            backoff.wait();
        }
    }

    /// Give back a shared permit.
    ///
    /// # Safety
    ///
    /// The calling thread must hold a shared permit obtained from this lock which it has not given
    /// back yet. With [Config::debug_checks] enabled, releasing while no reader is registered
    /// panics with [ContractViolation::UnbalancedSharedUnlock]; otherwise the count wraps and the
    /// lock is corrupted for good.
    #[inline]
    pub unsafe fn unlock_shared(&self) {
        let previous: ReaderCount = self.state.reader_count.fetch_sub(1, Ordering::Release);
        if self.config.debug_checks && previous == 0 {
            self.state.reader_count.fetch_add(1, Ordering::Relaxed);
            panic!("{}", ContractViolation::UnbalancedSharedUnlock);
        }
    }

    /// Acquire exclusive access, waiting for as long as it takes.
    #[inline]
    pub fn lock_exclusive(&self) {
        if !self.win_gate() {
            self.win_gate_slow();
        }
        if self.state.reader_count.load(Ordering::SeqCst) != 0 {
            self.drain_readers();
        }
    }

    /// Acquire exclusive access if the gate is free and no reader holds the lock.
    ///
    /// Never waits for readers to drain: when readers are present the gate is released again and
    /// [Error::Busy] is returned.
    #[inline]
    pub fn try_lock_exclusive(&self) -> Result<(), Error> {
        if !self.win_gate() {
            trace!("exclusive acquisition busy: gate taken");
            return Err(Error::Busy);
        }
        if self.state.reader_count.load(Ordering::SeqCst) != 0 {
            self.state.writer_locked.store(false, Ordering::Release);
            trace!("exclusive acquisition busy: readers present");
            return Err(Error::Busy);
        }
        Ok(())
    }

    /// Acquire exclusive access, giving up with [Error::TimedOut] once `deadline` has passed.
    ///
    /// One deadline bounds both winning the gate and draining readers. If the drain runs out of
    /// time the gate is released before returning, so a timed out writer never leaves the lock
    /// held.
    #[cfg_attr(feature = "instrument", instrument(level = "trace", skip_all))]
    pub fn lock_exclusive_until<D: Deadline>(&self, deadline: D) -> Result<(), Error> {
        let mut backoff: Backoff = Backoff::for_writer(&self.config);
        loop {
            if deadline.has_passed() {
                trace!("exclusive acquisition timed out before winning the gate");
                return Err(Error::TimedOut);
            }
            if self.win_gate_weak() {
                break;
            }
            backoff.wait();
        }

        let mut backoff: Backoff = Backoff::for_readers(&self.config);
        while self.state.reader_count.load(Ordering::SeqCst) != 0 {
            if deadline.has_passed() {
                // nobody else can ever get in while we hold the gate
                self.state.writer_locked.store(false, Ordering::Release);
                trace!("exclusive acquisition timed out while draining readers; gate released");
                return Err(Error::TimedOut);
            }
            backoff.wait();
        }
        Ok(())
    }

    /// Give back an exclusive permit.
    ///
    /// # Safety
    ///
    /// The calling thread must hold the exclusive permit of this lock. With
    /// [Config::debug_checks] enabled, releasing while the gate is clear panics with
    /// [ContractViolation::UnbalancedExclusiveUnlock].
    #[inline]
    pub unsafe fn unlock_exclusive(&self) {
        if self.config.debug_checks {
            let was_locked: bool = self.state.writer_locked.swap(false, Ordering::Release);
            assert!(
                was_locked,
                "{}",
                ContractViolation::UnbalancedExclusiveUnlock
            );
        } else {
            self.state.writer_locked.store(false, Ordering::Release);
        }
    }

    /// One shared attempt: check the gate, then claim.
    #[inline]
    fn attempt_shared(&self) -> bool {
        !self.state.writer_locked.load(Ordering::Acquire) && self.claim_shared()
    }

    /// Provisionally register as a reader and validate that no writer won the gate meanwhile.
    /// The registration is undone when validation fails.
    ///
    /// Panics with [ContractViolation::TooManyReaders] once [MAX_READERS] permits are out, after
    /// taking the registration back.
    #[inline]
    fn claim_shared(&self) -> bool {
        let previous: ReaderCount = self.state.reader_count.fetch_add(1, Ordering::SeqCst);
        if previous >= MAX_READERS {
            self.state.reader_count.fetch_sub(1, Ordering::Release);
            panic!("{}", ContractViolation::TooManyReaders);
        }
        if !self.state.writer_locked.load(Ordering::SeqCst) {
            return true;
        }
        self.state.reader_count.fetch_sub(1, Ordering::Release);
        false
    }

    #[cold]
    #[cfg_attr(feature = "instrument", instrument(level = "trace", skip_all))]
    fn lock_shared_slow(&self) {
        let mut backoff: Backoff = Backoff::for_writer(&self.config);
        loop {
            while self.state.writer_locked.load(Ordering::Acquire) {
                backoff.wait();
            }
            if self.claim_shared() {
                return;
            }
            trace!("writer won the gate during validation; retrying");
        }
    }

    #[inline]
    fn win_gate(&self) -> bool {
        self.state
            .writer_locked
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::Relaxed)
            .is_ok()
    }

    #[inline]
    fn win_gate_weak(&self) -> bool {
        self.state
            .writer_locked
            .compare_exchange_weak(false, true, Ordering::SeqCst, Ordering::Relaxed)
            .is_ok()
    }

    #[cold]
    #[cfg_attr(feature = "instrument", instrument(level = "trace", skip_all))]
    fn win_gate_slow(&self) {
        let mut backoff: Backoff = Backoff::for_writer(&self.config);
        while !self.win_gate_weak() {
            backoff.wait();
        }
    }

    #[cold]
    #[cfg_attr(feature = "instrument", instrument(level = "trace", skip_all))]
    fn drain_readers(&self) {
        let mut backoff: Backoff = Backoff::for_readers(&self.config);
        while self.state.reader_count.load(Ordering::SeqCst) != 0 {
            backoff.wait();
        }
    }
}

impl Default for RawSmtx {
    fn default() -> Self {
        Self::new()
    }
}
