//! A module which decides which synchronization primitives to use throughout the rest of the crate
//! depending on features and configuration options

cfg_if::cfg_if! {
    if #[cfg(loom)] {
        pub(crate) use loom::sync::atomic::{AtomicBool, AtomicU32, Ordering};
        pub(crate) use loom::hint::spin_loop;

        pub(crate) fn yield_now() {
            loom::thread::yield_now();
        }
    } else if #[cfg(feature = "shuttle")] {
        pub(crate) use shuttle::sync::atomic::{AtomicBool, AtomicU32, Ordering};

        /// Shuttle only switches threads at its own operations, so a pause has to be a yield.
        pub(crate) fn spin_loop() {
            shuttle::thread::yield_now();
        }

        pub(crate) fn yield_now() {
            shuttle::thread::yield_now();
        }
    } else if #[cfg(feature = "std")] {
        pub(crate) use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
        pub(crate) use core::hint::spin_loop;

        pub(crate) fn yield_now() {
            std::thread::yield_now();
        }
    } else {
        pub(crate) use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
        pub(crate) use core::hint::spin_loop;

        // there is no scheduler to hand the time slice back to
        pub(crate) fn yield_now() {}
    }
}
