/// The number of threads currently holding (or optimistically claiming) shared access.
pub type ReaderCount = u32;

/// The most shared permits a lock hands out at once. Half the range of [ReaderCount], so that
/// provisional increments racing past the bound can never wrap the count back to 0.
pub const MAX_READERS: ReaderCount = ReaderCount::MAX / 2;

/// The number of pause instructions issued by a single [crate::Backoff] wait.
///
/// Spin counts start at 1 on every entry into a wait loop and grow according to
/// [crate::Config::next_spins].
pub type SpinCount = u32;
