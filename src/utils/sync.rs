//! Synchronization primitives and compute-once caches.
//!
//! Locks come from `parking_lot`; lazily computed values are built on
//! [`OnceLock`], which runs an initializer at most once and blocks every
//! concurrent caller until the result is published.
use dashmap::DashMap;
use std::{
    fmt::{Debug, Formatter},
    hash::Hash,
    sync::{Arc, OnceLock},
};
use tracing::debug;

pub use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A lazily computed value that lives as long as its owner, typically a `static`.
///
/// The first outcome is kept, including a failure: once `init` returns an
/// error every later `get` reports a clone of that error without running
/// `init` again.
pub struct Memoized<T, E, F = fn() -> Result<T, E>> {
    cell: OnceLock<Result<T, E>>,
    init: F,
}

impl<T, E, F> Memoized<T, E, F> {
    pub const fn new(init: F) -> Self {
        Self {
            cell: OnceLock::new(),
            init,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T, E, F> Memoized<T, E, F>
where
    E: Clone,
    F: Fn() -> Result<T, E>,
{
    pub fn get(&self) -> Result<&T, E> {
        let outcome = self.cell.get_or_init(|| {
            debug!(value = std::any::type_name::<T>(), "computing memoized value");
            (self.init)()
        });
        match outcome {
            Ok(value) => Ok(value),
            Err(e) => Err(e.clone()),
        }
    }
}

impl<T: Debug, E: Debug, F> Debug for Memoized<T, E, F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.cell.get() {
            Some(outcome) => f.debug_tuple("Memoized").field(outcome).finish(),
            None => write!(f, "Memoized(<uninit>)"),
        }
    }
}

/// Keyed, process-scoped init-once registry.
///
/// Every key owns its own cell: initializers for different keys run in
/// parallel and an initializer may consult the cache for another key. The
/// shard lock of the map is released before an initializer runs.
pub struct SingletonCache<K, T, E> {
    entries: DashMap<K, Arc<OnceLock<Result<T, E>>>>,
}

impl<K: Eq + Hash + Clone + Debug, T: Clone, E: Clone> SingletonCache<K, T, E> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn get_or_init(&self, key: K, init: impl FnOnce(&K) -> Result<T, E>) -> Result<T, E> {
        let cell = self.entries.entry(key.clone()).or_default().value().clone();
        cell.get_or_init(|| {
            debug!(?key, "initializing singleton");
            init(&key)
        })
        .clone()
    }

    /// The published outcome for `key`, if initialization has completed.
    pub fn get(&self, key: &K) -> Option<Result<T, E>> {
        let cell = self.entries.get(key)?.value().clone();
        cell.get().cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Eq + Hash + Clone + Debug, T: Clone, E: Clone> Default for SingletonCache<K, T, E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Barrier,
    };

    #[test]
    fn failures_are_kept() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        fn fails() -> Result<u32, String> {
            CALLS.fetch_add(1, Ordering::SeqCst);
            Err("unavailable".to_string())
        }
        let memo: Memoized<u32, String> = Memoized::new(fails);

        assert!(!memo.is_initialized());
        assert_eq!(memo.get(), Err("unavailable".to_string()));
        assert_eq!(memo.get(), Err("unavailable".to_string()));
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
        assert!(memo.is_initialized());
    }

    #[test]
    fn closures_can_capture() {
        let base = 40;
        let memo = Memoized::new(move || Ok::<_, ()>(base + 2));
        assert_eq!(memo.get(), Ok(&42));
    }

    #[test]
    fn singleton_cache_runs_each_key_once() {
        const THREADS: usize = 8;
        let cache: SingletonCache<&str, usize, ()> = SingletonCache::new();
        let calls = AtomicUsize::new(0);
        let barrier = Barrier::new(THREADS);

        std::thread::scope(|s| {
            for i in 0..THREADS {
                let (cache, calls, barrier) = (&cache, &calls, &barrier);
                s.spawn(move || {
                    barrier.wait();
                    let key = if i % 2 == 0 { "even" } else { "odd" };
                    let value = cache.get_or_init(key, |k| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(k.len())
                    });
                    assert_eq!(value, Ok(key.len()));
                });
            }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"odd"), Some(Ok(3)));
        assert_eq!(cache.get(&"missing"), None);
    }

    #[test]
    fn nested_initialization_of_other_keys() {
        let cache: SingletonCache<u32, u32, ()> = SingletonCache::new();
        let outer = cache.get_or_init(1, |_| {
            let inner = cache.get_or_init(2, |_| Ok(20))?;
            Ok(inner + 1)
        });
        assert_eq!(outer, Ok(21));
    }
}
