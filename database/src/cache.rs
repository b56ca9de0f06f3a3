use indexmap::IndexMap;
use parking_lot::RwLock;
use std::{collections::hash_map::RandomState, hash::BuildHasher, sync::Arc};

/// A concurrent, write-through, full-retention cache in front of a DB store.
///
/// Unlike an LRU cache, entries are never evicted on access pressure: the ledger and
/// mempool keep every block, cube, and transaction record resident for the lifetime of
/// the process, so there is nothing to reclaim short of an explicit delete.
struct Inner<TKey, TData, S = RandomState>
where
    TKey: Clone + std::hash::Hash + Eq + Send + Sync,
    TData: Clone + Send + Sync,
{
    map: IndexMap<TKey, TData, S>,
}

#[derive(Clone)]
pub struct Cache<TKey, TData, S = RandomState>
where
    TKey: Clone + std::hash::Hash + Eq + Send + Sync,
    TData: Clone + Send + Sync,
{
    inner: Arc<RwLock<Inner<TKey, TData, S>>>,
}

impl<TKey, TData, S> Cache<TKey, TData, S>
where
    TKey: Clone + std::hash::Hash + Eq + Send + Sync,
    TData: Clone + Send + Sync,
    S: BuildHasher + Default,
{
    pub fn new() -> Self {
        Self { inner: Arc::new(RwLock::new(Inner { map: IndexMap::with_hasher(S::default()) })) }
    }

    pub fn get(&self, key: &TKey) -> Option<TData> {
        self.inner.read().map.get(key).cloned()
    }

    pub fn contains_key(&self, key: &TKey) -> bool {
        self.inner.read().map.contains_key(key)
    }

    pub fn insert(&self, key: TKey, data: TData) {
        self.inner.write().map.insert(key, data);
    }

    pub fn insert_many(&self, iter: &mut impl Iterator<Item = (TKey, TData)>) {
        let mut guard = self.inner.write();
        for (key, data) in iter {
            guard.map.insert(key, data);
        }
    }

    pub fn remove(&self, key: &TKey) -> Option<TData> {
        self.inner.write().map.swap_remove(key)
    }

    pub fn remove_many(&self, key_iter: &mut impl Iterator<Item = TKey>) {
        let mut guard = self.inner.write();
        for key in key_iter {
            guard.map.swap_remove(&key);
        }
    }

    pub fn remove_all(&self) {
        self.inner.write().map.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.read().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<TKey, TData, S> Default for Cache<TKey, TData, S>
where
    TKey: Clone + std::hash::Hash + Eq + Send + Sync,
    TData: Clone + Send + Sync,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get_round_trips() {
        let cache: Cache<u64, &'static str> = Cache::new();
        cache.insert(1, "one");
        assert_eq!(cache.get(&1), Some("one"));
        assert!(cache.contains_key(&1));
        assert!(!cache.contains_key(&2));
    }

    #[test]
    fn remove_all_empties_the_cache() {
        let cache: Cache<u64, u64> = Cache::new();
        cache.insert_many(&mut (0..10).map(|i| (i, i * 2)));
        assert_eq!(cache.len(), 10);
        cache.remove_all();
        assert!(cache.is_empty());
    }
}
