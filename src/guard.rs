use core::cell::UnsafeCell;
use core::fmt;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};

use crate::config::Config;
use crate::deadline::Deadline;
use crate::err::Error;
use crate::raw::RawSmtx;

/// A shared mutex protecting a value of type `T`.
///
/// Every acquisition returns a guard which gives the permit back when dropped, so a permit can
/// neither be forgotten nor released twice.
///
/// ```
/// use smtx::Smtx;
///
/// let smtx = Smtx::new(5);
/// {
///     let first = smtx.read();
///     let second = smtx.read();
///     assert_eq!(*first + *second, 10);
///     assert!(smtx.try_write().is_err());
/// }
/// *smtx.write() += 1;
/// assert_eq!(*smtx.read(), 6);
/// ```
pub struct Smtx<T: ?Sized> {
    raw: RawSmtx,
    data: UnsafeCell<T>,
}

unsafe impl<T: ?Sized + Send> Send for Smtx<T> {}
unsafe impl<T: ?Sized + Send + Sync> Sync for Smtx<T> {}

/// Shared access to the value of a [Smtx], released on drop.
#[must_use = "the shared permit is released as soon as the guard is dropped"]
pub struct ReadGuard<'a, T: ?Sized> {
    smtx: &'a Smtx<T>,
    // the permit belongs to the acquiring thread
    _not_send: PhantomData<*const ()>,
}

unsafe impl<T: ?Sized + Sync> Sync for ReadGuard<'_, T> {}

/// Exclusive access to the value of a [Smtx], released on drop.
#[must_use = "the exclusive permit is released as soon as the guard is dropped"]
pub struct WriteGuard<'a, T: ?Sized> {
    smtx: &'a Smtx<T>,
    _not_send: PhantomData<*const ()>,
}

unsafe impl<T: ?Sized + Sync> Sync for WriteGuard<'_, T> {}

impl<T> Smtx<T> {
    pub fn new(data: T) -> Self {
        Self::with_config(data, Config::new())
    }

    pub fn with_config(data: T, config: Config) -> Self {
        Self {
            raw: RawSmtx::with_config(config),
            data: UnsafeCell::new(data),
        }
    }

    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: ?Sized> Smtx<T> {
    /// Wait for shared access.
    pub fn read(&self) -> ReadGuard<'_, T> {
        self.raw.lock_shared();
        ReadGuard::new(self)
    }

    /// Shared access if no writer holds or contends for the lock, [Error::Busy] otherwise.
    pub fn try_read(&self) -> Result<ReadGuard<'_, T>, Error> {
        self.raw.try_lock_shared()?;
        Ok(ReadGuard::new(self))
    }

    /// Wait for shared access until `deadline`, then give up with [Error::TimedOut].
    pub fn read_until<D: Deadline>(&self, deadline: D) -> Result<ReadGuard<'_, T>, Error> {
        self.raw.lock_shared_until(deadline)?;
        Ok(ReadGuard::new(self))
    }

    /// Wait for exclusive access.
    pub fn write(&self) -> WriteGuard<'_, T> {
        self.raw.lock_exclusive();
        WriteGuard::new(self)
    }

    /// Exclusive access if the lock is entirely free, [Error::Busy] otherwise.
    pub fn try_write(&self) -> Result<WriteGuard<'_, T>, Error> {
        self.raw.try_lock_exclusive()?;
        Ok(WriteGuard::new(self))
    }

    /// Wait for exclusive access until `deadline`, then give up with [Error::TimedOut].
    pub fn write_until<D: Deadline>(&self, deadline: D) -> Result<WriteGuard<'_, T>, Error> {
        self.raw.lock_exclusive_until(deadline)?;
        Ok(WriteGuard::new(self))
    }

    /// Mutable access without locking; the borrow checker already guarantees exclusivity.
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    /// The underlying lock, for inspecting its state.
    pub fn raw(&self) -> &RawSmtx {
        &self.raw
    }
}

impl<T: Default> Default for Smtx<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Smtx<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Smtx");
        match self.try_read() {
            Ok(guard) => debug.field("data", &&*guard),
            Err(_) => debug.field("data", &format_args!("<locked>")),
        };
        debug.finish()
    }
}

impl<'a, T: ?Sized> ReadGuard<'a, T> {
    fn new(smtx: &'a Smtx<T>) -> Self {
        Self {
            smtx,
            _not_send: PhantomData,
        }
    }
}

impl<T: ?Sized> Deref for ReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // shared permit held: no writer can be inside
        unsafe { &*self.smtx.data.get() }
    }
}

impl<T: ?Sized> Drop for ReadGuard<'_, T> {
    fn drop(&mut self) {
        // this guard owns exactly one shared permit
        unsafe { self.smtx.raw.unlock_shared() }
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for ReadGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<'a, T: ?Sized> WriteGuard<'a, T> {
    fn new(smtx: &'a Smtx<T>) -> Self {
        Self {
            smtx,
            _not_send: PhantomData,
        }
    }
}

impl<T: ?Sized> Deref for WriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { &*self.smtx.data.get() }
    }
}

impl<T: ?Sized> DerefMut for WriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // exclusive permit held: nobody else is inside
        unsafe { &mut *self.smtx.data.get() }
    }
}

impl<T: ?Sized> Drop for WriteGuard<'_, T> {
    fn drop(&mut self) {
        unsafe { self.smtx.raw.unlock_exclusive() }
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for WriteGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}
