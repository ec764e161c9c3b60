//! End-of-life hook for cached values

use std::fmt;

/// Cleanup invoked exactly once per value when it leaves the cache.
///
/// The cache calls this on eviction, explicit removal, replacement by an
/// update, and for a value that lost an insertion race and was never
/// published.
pub trait Disposer<V>: Send + Sync {
    fn dispose(&self, value: &V);
}

/// Disposer for plain values that need no cleanup
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDisposer;

impl<V> Disposer<V> for NoopDisposer {
    #[inline(always)]
    fn dispose(&self, _value: &V) {}
}

/// Adapts a closure into a [`Disposer`].
pub struct DisposeFn<F>(pub F);

impl<V, F> Disposer<V> for DisposeFn<F>
where
    F: Fn(&V) + Send + Sync,
{
    fn dispose(&self, value: &V) {
        (self.0)(value)
    }
}

impl<F> fmt::Debug for DisposeFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DisposeFn")
    }
}
