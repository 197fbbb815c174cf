//! A shared mutex (reader-writer lock) built only from atomic operations.
//!
//! Any number of readers may hold the lock at once; a writer holds it alone. Waiting never involves
//! the operating system: contended acquisitions spin with an escalating [Backoff] and, past a
//! threshold, yield their time slice. Every acquisition comes in three flavors: blocking, try
//! (returns [Error::Busy] instead of waiting) and timed (returns [Error::TimedOut] once an
//! absolute [Deadline] passes).
//!
//! [Smtx] owns the protected value and hands out guards; [RawSmtx] is the bare lock for state kept
//! elsewhere; [ops] exposes the same operations as free functions which report a missing lock as
//! [Error::InvalidArgument].
//!
//! ```
//! use std::time::{Duration, Instant};
//! use smtx::{Error, Smtx};
//!
//! let smtx = Smtx::new(Vec::new());
//! smtx.write().push(1);
//!
//! let reader = smtx.read();
//! let deadline = Instant::now() + Duration::from_millis(1);
//! assert_eq!(smtx.write_until(deadline).err(), Some(Error::TimedOut));
//! assert_eq!(*reader, [1]);
//! ```
//!
//! The lock makes no fairness promise: a continuous stream of readers can starve a writer that has
//! not yet won the writer gate.
#![cfg_attr(
    not(any(test, feature = "std", feature = "shuttle", loom)),
    no_std
)]

mod backoff;
mod config;
mod deadline;
mod err;
mod guard;
pub mod ops;
mod raw;
mod state;
mod sync;
mod types;

pub use backoff::Backoff;
pub use config::{
    double_spins, Config, DEFAULT_MAX_READER_WAIT_SPINS, DEFAULT_MAX_WRITER_WAIT_SPINS,
    DEFAULT_YIELD_THRESHOLD,
};
#[cfg(feature = "std")]
pub use deadline::MonotonicClock;
pub use deadline::{At, Clock, Deadline};
pub use err::{ContractViolation, Error};
pub use guard::{ReadGuard, Smtx, WriteGuard};
pub use raw::RawSmtx;
pub use types::{ReaderCount, SpinCount, MAX_READERS};
