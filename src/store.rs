//! Generic keyed collection with synchronous change notification.
//!
//! `Store` is the building block for every entity collection on a graph.
//! Dependents register a subscriber and are called, in registration order,
//! right after each mutation. There is no global reactive runtime: the
//! subscriber list is the whole mechanism.
//!
//! Iteration order is the key order, so renderers and tests see a stable
//! sequence.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::BTreeMap;
use std::fmt;

/// Handle returned by [`Store::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// A mutation observed by subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent<K> {
    Added(K),
    Updated(K),
    Removed(K),
    Cleared,
}

type Subscriber<K> = Box<dyn FnMut(&StoreEvent<K>)>;

/// Keyed collection of `V` that notifies subscribers on every mutation.
pub struct Store<K, V> {
    entries: BTreeMap<K, V>,
    subscribers: Vec<(SubscriberId, Subscriber<K>)>,
    next_subscriber: u64,
}

impl<K: Ord + Clone, V> Store<K, V> {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: BTreeMap::new(), subscribers: Vec::new(), next_subscriber: 0 }
    }

    /// Insert `value` under `key`, replacing any previous value.
    ///
    /// Returns the replaced value. Subscribers see `Added` for a new key and
    /// `Updated` for a replacement.
    pub fn add(&mut self, key: K, value: V) -> Option<V> {
        let previous = self.entries.insert(key.clone(), value);
        let event = if previous.is_some() { StoreEvent::Updated(key) } else { StoreEvent::Added(key) };
        self.notify(&event);
        previous
    }

    /// Remove the value under `key`, returning it if it was present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let removed = self.entries.remove(key)?;
        self.notify(&StoreEvent::Removed(key.clone()));
        Some(removed)
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Apply `f` to the value under `key` and notify `Updated`.
    ///
    /// Returns `None` without notifying when the key is absent.
    pub fn update<R>(&mut self, key: &K, f: impl FnOnce(&mut V) -> R) -> Option<R> {
        let value = self.entries.get_mut(key)?;
        let result = f(value);
        self.notify(&StoreEvent::Updated(key.clone()));
        Some(result)
    }

    /// All values in key order.
    #[must_use]
    pub fn get_all(&self) -> Vec<&V> {
        self.entries.values().collect()
    }

    /// All keys in order.
    #[must_use]
    pub fn keys(&self) -> Vec<K> {
        self.entries.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }

    /// Remove every entry. Subscribers see a single `Cleared`.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.notify(&StoreEvent::Cleared);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register `f` to run after every mutation.
    pub fn subscribe(&mut self, f: impl FnMut(&StoreEvent<K>) + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_subscriber);
        self.next_subscriber += 1;
        self.subscribers.push((id, Box::new(f)));
        id
    }

    /// Drop a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self, event: &StoreEvent<K>) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(event);
        }
    }
}

impl<K: Ord + Clone, V> Default for Store<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Store<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("entries", &self.entries)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
