use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Time source for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

// ---------------------------------------------------------------------------
// Memo table
// ---------------------------------------------------------------------------

/// Maps a canonical input key to `(result, computed_at)`.
///
/// An entry is served while `now - computed_at < ttl`; there is no other
/// invalidation. The lock is held while a missing entry is computed, so a
/// key is never computed twice concurrently.
pub struct Memo<K, V> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<K, (V, Instant)>>,
}

impl<K: Eq + Hash, V: Clone> Memo<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached value for `key`, computing and storing it when
    /// absent or expired. Every miss also drops the other expired entries.
    pub fn get_or_compute(&self, key: K, compute: impl FnOnce() -> V) -> V {
        let mut entries = self.lock();
        if let Some((value, computed_at)) = entries.get(&key) {
            if self.is_fresh(*computed_at) {
                return value.clone();
            }
        }
        entries.retain(|_, (_, at)| self.is_fresh(*at));
        let value = compute();
        entries.insert(key, (value.clone(), self.clock.now()));
        value
    }

    fn is_fresh(&self, computed_at: Instant) -> bool {
        self.clock.now().saturating_duration_since(computed_at) < self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, (V, Instant)>> {
        // A panic inside `compute` must not take the cache down with it.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
impl<K: Eq + Hash, V: Clone> Memo<K, V> {
    fn get(&self, key: &K) -> Option<V> {
        self.lock()
            .get(key)
            .filter(|(_, at)| self.is_fresh(*at))
            .map(|(v, _)| v.clone())
    }

    /// Stored entries, expired or not.
    fn len(&self) -> usize {
        self.lock().len()
    }
}

/// Test clock advanced by hand.
#[cfg(test)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_hit_within_ttl_skips_compute() {
        let clock = Arc::new(ManualClock::new());
        let memo: Memo<&str, u32> = Memo::with_clock(Duration::from_secs(3600), clock.clone());
        let calls = Cell::new(0);

        let first = memo.get_or_compute("benin", || {
            calls.set(calls.get() + 1);
            7
        });
        clock.advance(Duration::from_secs(3599));
        let second = memo.get_or_compute("benin", || {
            calls.set(calls.get() + 1);
            8
        });

        assert_eq!((first, second), (7, 7));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_expired_entry_is_recomputed() {
        let clock = Arc::new(ManualClock::new());
        let memo: Memo<&str, u32> = Memo::with_clock(Duration::from_secs(3600), clock.clone());

        memo.get_or_compute("togo", || 1);
        clock.advance(Duration::from_secs(3600));
        assert_eq!(memo.get(&"togo"), None);
        assert_eq!(memo.get_or_compute("togo", || 2), 2);
        assert_eq!(memo.get(&"togo"), Some(2));
    }

    #[test]
    fn test_keys_are_independent() {
        let memo: Memo<Vec<&str>, usize> = Memo::new(Duration::from_secs(60));
        memo.get_or_compute(vec!["a", "b"], || 2);
        memo.get_or_compute(vec!["b", "a"], || 3);
        assert_eq!(memo.get(&vec!["a", "b"]), Some(2));
        assert_eq!(memo.get(&vec!["b", "a"]), Some(3));
        assert_eq!(memo.len(), 2);
    }

    #[test]
    fn test_miss_evicts_expired_entries() {
        let clock = Arc::new(ManualClock::new());
        let memo: Memo<u32, u32> = Memo::with_clock(Duration::from_secs(10), clock.clone());
        for key in 0..100 {
            memo.get_or_compute(key, || key);
            clock.advance(Duration::from_secs(11));
        }
        assert_eq!(memo.len(), 1);

        memo.get_or_compute(500, || 5);
        clock.advance(Duration::from_secs(5));
        memo.get_or_compute(501, || 6);
        assert_eq!(memo.len(), 2);
        assert_eq!(memo.get(&500), Some(5));
    }
}
