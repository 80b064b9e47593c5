//! Bidirectional many-to-one mapping.
//!
//! Records merging decisions: several source identities collapse onto one
//! target. The reverse index keeps the full key set per value, in insertion
//! order, so merge groups report their sources deterministically.

use std::collections::HashMap;
use std::hash::Hash;

/// A mutable, reversible mapping where a value may have many keys.
///
/// Removing a value removes all of its keys atomically; the forward and
/// reverse indexes never disagree.
#[derive(Debug, Clone)]
pub struct BidirectionalManyToOneMap<K, V> {
    forward: HashMap<K, V>,
    backward: HashMap<V, Vec<K>>,
}

impl<K, V> Default for BidirectionalManyToOneMap<K, V> {
    fn default() -> Self {
        Self {
            forward: HashMap::new(),
            backward: HashMap::new(),
        }
    }
}

impl<K, V> BidirectionalManyToOneMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a key→value pairing, detaching the key from any old value.
    pub fn put(&mut self, key: K, value: V) {
        if let Some(old_value) = self.forward.remove(&key) {
            if let Some(keys) = self.backward.get_mut(&old_value) {
                keys.retain(|existing| existing != &key);
                if keys.is_empty() {
                    self.backward.remove(&old_value);
                }
            }
        }
        self.forward.insert(key.clone(), value.clone());
        self.backward.entry(value).or_default().push(key);
    }

    /// Inserts many keys mapping to the same value.
    pub fn put_all<I: IntoIterator<Item = K>>(&mut self, keys: I, value: V) {
        for key in keys {
            self.put(key, value.clone());
        }
    }

    /// Forward lookup.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.forward.get(key)
    }

    /// All keys mapping to `value`, in insertion order.
    pub fn get_keys(&self, value: &V) -> &[K] {
        self.backward.get(value).map_or(&[], Vec::as_slice)
    }

    /// Whether `key` has a mapping.
    pub fn contains_key(&self, key: &K) -> bool {
        self.forward.contains_key(key)
    }

    /// Whether any key maps to `value`.
    pub fn contains_value(&self, value: &V) -> bool {
        self.backward.contains_key(value)
    }

    /// Removes a single key, returning its value.
    pub fn remove_key(&mut self, key: &K) -> Option<V> {
        let value = self.forward.remove(key)?;
        if let Some(keys) = self.backward.get_mut(&value) {
            keys.retain(|existing| existing != key);
            if keys.is_empty() {
                self.backward.remove(&value);
            }
        }
        Some(value)
    }

    /// Removes a value together with all of its keys.
    pub fn remove_value(&mut self, value: &V) -> Vec<K> {
        let keys = self.backward.remove(value).unwrap_or_default();
        for key in &keys {
            self.forward.remove(key);
        }
        keys
    }

    /// Number of key→value pairings.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Whether the map holds no pairings.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Iterates `(keys, value)` groups, unordered across values.
    pub fn for_each_many_to_one(&self, mut consumer: impl FnMut(&[K], &V)) {
        for (value, keys) in &self.backward {
            consumer(keys, value);
        }
    }

    /// Iterator form of [`BidirectionalManyToOneMap::for_each_many_to_one`].
    pub fn many_to_one_iter(&self) -> impl Iterator<Item = (&[K], &V)> {
        self.backward.iter().map(|(value, keys)| (keys.as_slice(), value))
    }

    /// Iterates all forward pairings, unordered.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.forward.iter()
    }
}
