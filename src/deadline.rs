//! Absolute deadlines for the timed acquisitions.
//!
//! A deadline is a point in time on some monotonic clock, never a duration: callers compute
//! "now + timeout" once and every retry compares the clock against the same point. Which clock is
//! consulted is decided by the deadline type itself. With `std`, [std::time::Instant] is a
//! deadline on the platform's monotonic clock. Any other source can be plugged in by implementing
//! [Clock] and wrapping its time points in [At].

/// An absolute point in time after which a timed acquisition gives up.
pub trait Deadline {
    /// Whether the current time is at or past the deadline.
    fn has_passed(&self) -> bool;
}

impl<D: Deadline + ?Sized> Deadline for &D {
    fn has_passed(&self) -> bool {
        (**self).has_passed()
    }
}

/// A monotonic source of time points.
pub trait Clock {
    type Instant: PartialOrd;

    fn now(&self) -> Self::Instant;
}

/// A time point on a particular [Clock].
#[derive(Clone, Copy, Debug)]
pub struct At<C: Clock> {
    clock: C,
    instant: C::Instant,
}

impl<C: Clock> At<C> {
    pub fn new(clock: C, instant: C::Instant) -> Self {
        Self { clock, instant }
    }

    pub fn instant(&self) -> &C::Instant {
        &self.instant
    }
}

impl<C: Clock> Deadline for At<C> {
    fn has_passed(&self) -> bool {
        self.clock.now() >= self.instant
    }
}

#[cfg(feature = "std")]
mod monotonic {
    use super::{Clock, Deadline};
    use std::time::{Duration, Instant};

    impl Deadline for Instant {
        fn has_passed(&self) -> bool {
            Instant::now() >= *self
        }
    }

    /// The platform's monotonic clock.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct MonotonicClock;

    impl MonotonicClock {
        /// The deadline `timeout` from now.
        pub fn after(timeout: Duration) -> Instant {
            Instant::now() + timeout
        }
    }

    impl Clock for MonotonicClock {
        type Instant = Instant;

        fn now(&self) -> Instant {
            Instant::now()
        }
    }
}

#[cfg(feature = "std")]
pub use monotonic::MonotonicClock;
