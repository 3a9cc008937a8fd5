use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

/// A shared, monotonically increasing counter.
///
/// Work that completes out of order (such as image decodes racing each other)
/// is stamped with `next()` when it starts. Whoever applies the results keeps
/// the highest stamp applied so far and drops anything older.
#[derive(Clone, Debug, Default)]
pub struct Sequence {
    value: Arc<AtomicU64>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently issued stamp, 0 if none was issued yet.
    pub fn current(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Issue the next stamp. Stamps start at 1.
    pub fn next(&self) -> u64 {
        self.value.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// A value stamped with the sequence number it was created under.
#[derive(Clone, Debug)]
pub struct Stamped<T> {
    pub stamp: u64,
    pub inner: T,
}

impl<T> Stamped<T> {
    pub fn new(stamp: u64, inner: T) -> Self {
        Self { stamp, inner }
    }

    /// True when this value should replace one applied under `applied`.
    pub fn is_newer_than(&self, applied: u64) -> bool {
        self.stamp > applied
    }
}
