//! Stale/fresh wrapper for lazily derived values
//!
//! Every derived quantity of the camera and the frustum (matrices, corner
//! vertices, planes, bounding box) lives in a `Cached<T>`. Producers mark
//! the value stale when an input changes; consumers check `is_stale()` and
//! `refresh()` it before reading.

/// Freshness of a cached value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Inputs changed since the value was last computed
    Stale,
    /// Value matches its inputs
    Fresh,
}

/// A derived value together with its staleness
#[derive(Debug, Clone)]
pub struct Cached<T> {
    value: T,
    freshness: Freshness,
    rebuilds: u64,
}

impl<T> Cached<T> {
    /// Wrap a placeholder value that must be computed before first use
    pub fn stale(value: T) -> Self {
        Self { value, freshness: Freshness::Stale, rebuilds: 0 }
    }

    /// Wrap a value that is already valid
    pub fn fresh(value: T) -> Self {
        Self { value, freshness: Freshness::Fresh, rebuilds: 0 }
    }

    /// Mark the value stale
    pub fn invalidate(&mut self) {
        self.freshness = Freshness::Stale;
    }

    pub fn is_stale(&self) -> bool {
        self.freshness == Freshness::Stale
    }

    pub fn freshness(&self) -> Freshness {
        self.freshness
    }

    /// Read the stored value without checking freshness
    pub fn peek(&self) -> &T {
        &self.value
    }

    /// Store a recomputed value, leaving freshness untouched
    ///
    /// Used when several caches must be cleared together after a combined
    /// value has been derived from them (see `validate`).
    pub fn replace(&mut self, value: T) {
        self.value = value;
        self.rebuilds += 1;
    }

    /// Mark the value fresh
    pub fn validate(&mut self) {
        self.freshness = Freshness::Fresh;
    }

    /// Store a recomputed value and mark it fresh
    pub fn refresh(&mut self, value: T) -> &T {
        self.replace(value);
        self.validate();
        &self.value
    }

    /// How many times the value has been recomputed
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }
}

impl<T: Default> Default for Cached<T> {
    fn default() -> Self {
        Self::stale(T::default())
    }
}

#[cfg(test)]
#[path = "cached_tests.rs"]
mod tests;
