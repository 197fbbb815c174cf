use displaydoc::Display;

/// The outcome of an acquisition which did not grant a permit.
///
/// `Busy` and `TimedOut` are ordinary contention outcomes which callers are expected to handle;
/// they never leave the lock in a different state than it was before the call.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Error {
    /// No lock or no deadline was supplied to the operation.
    InvalidArgument,
    /// The lock is held in a conflicting mode and the operation does not wait.
    Busy,
    /// The deadline passed before the lock could be acquired.
    TimedOut,
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Misuse of the lock which is never recoverable. An unbalanced release panics with this message
/// when debug checks are enabled; exhausting the reader count always panics, since a wrapped count
/// would let a writer in alongside live readers.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ContractViolation {
    /// unlock_shared was called while the reader count was already 0
    UnbalancedSharedUnlock,
    /// unlock_exclusive was called while the writer gate was not held
    UnbalancedExclusiveUnlock,
    /// too many readers: the shared permit count reached its maximum
    TooManyReaders,
}
