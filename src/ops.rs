//! Free functions with one uniform outcome type for all nine operations.
//!
//! These mirror the status-code style of lock APIs that operate on caller-supplied memory: the
//! lock (and, for the timed variants, the deadline) may be missing, which is reported as
//! [Error::InvalidArgument] instead of being ruled out by the type system. Raw pointers convert
//! with [pointer::as_ref]:
//!
//! ```
//! use smtx::{ops, Error, RawSmtx};
//!
//! let mut storage = RawSmtx::new();
//! let pointer: *mut RawSmtx = &mut storage;
//!
//! assert_eq!(ops::init(unsafe { pointer.as_mut() }), Ok(()));
//! assert_eq!(ops::try_lock_shared(unsafe { pointer.as_ref() }), Ok(()));
//! assert_eq!(unsafe { ops::unlock_shared(pointer.as_ref()) }, Ok(()));
//!
//! let missing: *const RawSmtx = core::ptr::null();
//! assert_eq!(ops::lock_exclusive(unsafe { missing.as_ref() }), Err(Error::InvalidArgument));
//! ```
//!
//! Success is `Ok(())`; [Error::Busy] and [Error::TimedOut] are returned only by the try and
//! timed variants respectively.

use crate::deadline::Deadline;
use crate::err::Error;
use crate::raw::RawSmtx;

fn require<T>(argument: Option<T>) -> Result<T, Error> {
    argument.ok_or(Error::InvalidArgument)
}

/// Zero the reader count and clear the writer gate.
pub fn init(smtx: Option<&mut RawSmtx>) -> Result<(), Error> {
    require(smtx)?.init();
    Ok(())
}

pub fn lock_shared(smtx: Option<&RawSmtx>) -> Result<(), Error> {
    require(smtx)?.lock_shared();
    Ok(())
}

pub fn try_lock_shared(smtx: Option<&RawSmtx>) -> Result<(), Error> {
    require(smtx)?.try_lock_shared()
}

pub fn timed_lock_shared<D: Deadline>(
    smtx: Option<&RawSmtx>,
    deadline: Option<D>,
) -> Result<(), Error> {
    let smtx: &RawSmtx = require(smtx)?;
    smtx.lock_shared_until(require(deadline)?)
}

/// # Safety
///
/// See [RawSmtx::unlock_shared].
pub unsafe fn unlock_shared(smtx: Option<&RawSmtx>) -> Result<(), Error> {
    require(smtx)?.unlock_shared();
    Ok(())
}

pub fn lock_exclusive(smtx: Option<&RawSmtx>) -> Result<(), Error> {
    require(smtx)?.lock_exclusive();
    Ok(())
}

pub fn try_lock_exclusive(smtx: Option<&RawSmtx>) -> Result<(), Error> {
    require(smtx)?.try_lock_exclusive()
}

pub fn timed_lock_exclusive<D: Deadline>(
    smtx: Option<&RawSmtx>,
    deadline: Option<D>,
) -> Result<(), Error> {
    let smtx: &RawSmtx = require(smtx)?;
    smtx.lock_exclusive_until(require(deadline)?)
}

/// # Safety
///
/// See [RawSmtx::unlock_exclusive].
pub unsafe fn unlock_exclusive(smtx: Option<&RawSmtx>) -> Result<(), Error> {
    require(smtx)?.unlock_exclusive();
    Ok(())
}
