//! Bidirectional one-to-one mapping.
//!
//! Records individual renaming decisions — member moved from A to B, type T
//! renamed to U — with both directions indexed. Every lens needs the inverse
//! direction for its previous-signature walk, so the two indexes are kept
//! synchronized by construction.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

/// A mutable, reversible key↔value mapping where every value has at most one
/// key.
///
/// Built incrementally while a pass runs, then frozen into an immutable lens.
/// Inserting a pair displaces any existing pairing of either the key or the
/// value, keeping the two indexes consistent.
#[derive(Debug, Clone)]
pub struct BidirectionalOneToOneMap<K, V> {
    forward: HashMap<K, V>,
    backward: HashMap<V, K>,
}

impl<K, V> Default for BidirectionalOneToOneMap<K, V> {
    fn default() -> Self {
        Self {
            forward: HashMap::new(),
            backward: HashMap::new(),
        }
    }
}

impl<K, V> BidirectionalOneToOneMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a key↔value pair, displacing stale pairings of either side.
    pub fn put(&mut self, key: K, value: V) {
        if let Some(old_value) = self.forward.remove(&key) {
            self.backward.remove(&old_value);
        }
        if let Some(old_key) = self.backward.remove(&value) {
            self.forward.remove(&old_key);
        }
        self.forward.insert(key.clone(), value.clone());
        self.backward.insert(value, key);
    }

    /// Forward lookup.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.forward.get(key)
    }

    /// Reverse lookup.
    pub fn get_key(&self, value: &V) -> Option<&K> {
        self.backward.get(value)
    }

    /// Removes a pair by key, returning the value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let value = self.forward.remove(key)?;
        self.backward.remove(&value);
        Some(value)
    }

    /// Whether `key` has a mapping.
    pub fn contains_key(&self, key: &K) -> bool {
        self.forward.contains_key(key)
    }

    /// Whether `value` has a mapping.
    pub fn contains_value(&self, value: &V) -> bool {
        self.backward.contains_key(value)
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.forward.len(), self.backward.len());
        self.forward.len()
    }

    /// Whether the map holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Iterates all pairs, unordered.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.forward.iter()
    }
}

/// Lock-protected builder for a [`BidirectionalOneToOneMap`].
///
/// Workers partition the program by class, so the same key is never written
/// twice, but many workers write the same backing map; each mutation is a
/// critical section. `freeze` consumes the builder, so no partially built map
/// can ever be observed through a published lens.
#[derive(Debug)]
pub struct ConcurrentOneToOneBuilder<K, V> {
    inner: Mutex<BidirectionalOneToOneMap<K, V>>,
}

impl<K, V> Default for ConcurrentOneToOneBuilder<K, V> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(BidirectionalOneToOneMap::default()),
        }
    }
}

impl<K, V> ConcurrentOneToOneBuilder<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(BidirectionalOneToOneMap::new()),
        }
    }

    /// Records a pair. Safe to call from many threads.
    pub fn put(&self, key: K, value: V) {
        self.inner.lock().unwrap().put(key, value);
    }

    /// Whether no pair has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }

    /// Freezes the builder into the immutable map.
    #[must_use]
    pub fn freeze(self) -> BidirectionalOneToOneMap<K, V> {
        self.inner.into_inner().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_displaces_stale_pairings() {
        let mut map = BidirectionalOneToOneMap::new();
        map.put("a", 1);
        map.put("b", 2);
        assert_eq!(map.len(), 2);

        // Rebinding the value moves it off the old key.
        map.put("c", 1);
        assert_eq!(map.get(&"c"), Some(&1));
        assert_eq!(map.get(&"a"), None);
        assert_eq!(map.get_key(&1), Some(&"c"));
        assert_eq!(map.len(), 2);

        // Rebinding the key drops its old value.
        map.put("b", 3);
        assert_eq!(map.get(&"b"), Some(&3));
        assert!(!map.contains_value(&2));
    }

    #[test]
    fn remove_clears_both_directions() {
        let mut map = BidirectionalOneToOneMap::new();
        map.put("a", 1);
        assert_eq!(map.remove(&"a"), Some(1));
        assert!(map.is_empty());
        assert_eq!(map.get_key(&1), None);
    }
}
