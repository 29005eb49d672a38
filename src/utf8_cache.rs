use crate::ClassFileResult;
use indexmap::IndexMap;
use java_string::{JavaStr, JavaString};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A bounded cache of decoded `CONSTANT_Utf8` values, keyed by their raw modified UTF-8 bytes.
///
/// Classes parsed with the same cache share one allocation per distinct string. The cache is
/// internally synchronized and is meant to be shared through an [`Arc`] between unrelated parses,
/// see [`ReadOptions::with_utf8_cache`](crate::ReadOptions::with_utf8_cache).
///
/// Eviction approximates least-recently-used with the clock algorithm: a hit only marks its
/// entry, and a full cache sweeps a hand over the entries, giving each marked one a second
/// chance before evicting the first unmarked one.
#[derive(Debug)]
pub struct Utf8Cache {
    capacity: usize,
    state: Mutex<ClockState>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

#[derive(Debug, Default)]
struct ClockState {
    entries: IndexMap<Box<[u8]>, Slot>,
    hand: usize,
}

#[derive(Debug)]
struct Slot {
    value: Arc<JavaString>,
    referenced: bool,
}

impl ClockState {
    fn evict(&mut self) {
        while !self.entries.is_empty() {
            if self.hand >= self.entries.len() {
                self.hand = 0;
            }
            let Some((_, slot)) = self.entries.get_index_mut(self.hand) else {
                return;
            };
            if slot.referenced {
                slot.referenced = false;
                self.hand += 1;
            } else {
                // the last entry takes the evicted one's place, so the hand stays put
                self.entries.swap_remove_index(self.hand);
                return;
            }
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Utf8CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub len: usize,
}

impl Utf8Cache {
    pub fn new(capacity: usize) -> Utf8Cache {
        Utf8Cache {
            capacity: capacity.max(1),
            state: Mutex::new(ClockState::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the shared value for `bytes`, decoding and inserting it on a miss.
    pub fn intern(&self, bytes: &[u8]) -> ClassFileResult<Arc<JavaString>> {
        let mut state = self.state.lock();
        if let Some(slot) = state.entries.get_mut(bytes) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            slot.referenced = true;
            return Ok(Arc::clone(&slot.value));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = Arc::new(JavaStr::from_modified_utf8(bytes)?.into_owned());
        if state.entries.len() >= self.capacity {
            state.evict();
            self.evictions.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(capacity = self.capacity, "utf8 cache evicted an entry");
        }
        state.entries.insert(
            bytes.into(),
            Slot {
                value: Arc::clone(&value),
                referenced: false,
            },
        );
        Ok(value)
    }

    pub fn stats(&self) -> Utf8CacheStats {
        Utf8CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            len: self.state.lock().entries.len(),
        }
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.hand = 0;
    }
}

#[cfg(test)]
mod test {
    use crate::Utf8Cache;
    use std::sync::Arc;

    #[test]
    fn test_shares_equal_strings() {
        let cache = Utf8Cache::new(4);
        let a = cache.intern(b"java/lang/Object").unwrap();
        let b = cache.intern(b"java/lang/Object").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        let stats = cache.stats();
        assert_eq!((1, 1, 1), (stats.hits, stats.misses, stats.len));
    }

    #[test]
    fn test_recently_used_entry_survives_eviction() {
        let cache = Utf8Cache::new(2);
        let a = cache.intern(b"a").unwrap();
        cache.intern(b"b").unwrap();
        // touch "a" so that "b" becomes the eviction candidate
        cache.intern(b"a").unwrap();
        cache.intern(b"c").unwrap();
        assert_eq!(1, cache.stats().evictions);
        assert!(Arc::ptr_eq(&a, &cache.intern(b"a").unwrap()));
        assert_eq!(2, cache.stats().len);
        cache.intern(b"b").unwrap();
        assert_eq!(4, cache.stats().misses);
    }

    #[test]
    fn test_eviction_keeps_capacity_under_churn() {
        let cache = Utf8Cache::new(3);
        let hot = cache.intern(b"hot").unwrap();
        for i in 0..50u8 {
            cache.intern(&[b'a' + i % 26, b'0' + i / 26]).unwrap();
            // keeps "hot" marked between sweeps
            assert!(Arc::ptr_eq(&hot, &cache.intern(b"hot").unwrap()));
            assert!(cache.stats().len <= 3);
        }
        let stats = cache.stats();
        assert_eq!(48, stats.evictions);
        assert_eq!(51, stats.misses);
        assert_eq!(50, stats.hits);
    }

    #[test]
    fn test_rejects_bad_modified_utf8() {
        let cache = Utf8Cache::new(2);
        assert!(cache.intern(&[0xff]).is_err());
        assert_eq!(0, cache.stats().len);
    }
}
