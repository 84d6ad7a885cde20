//! The global id registry shared by every batch built in a process.
//!
//! A train split and one or more test splits all go through the same
//! `IdRegistry`, so a raw user or item id resolves to the same mapped id
//! everywhere, and a (user, item) pair is only ever counted once.
//!
//! ## Ownership
//! Callers own exactly one registry and lend it to each construction:
//! - `&mut IdRegistry` for single-threaded use
//! - `SharedIdRegistry` (an `Arc<Mutex<_>>` handle) when batches are built
//!   from several threads. The handle is the synchronization point; a batch
//!   holds the lock for its whole pass.

use crate::id_map::IdMap;
use crate::types::{MappedItemId, MappedUserId};
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;

/// Global raw → mapped id tables plus the set of (user, item) pairs seen so far.
#[derive(Debug, Clone)]
pub struct IdRegistry<U, I> {
    users: IdMap<U>,
    items: IdMap<I>,
    seen: HashSet<(U, I)>,
}

impl<U, I> IdRegistry<U, I>
where
    U: Clone + Eq + Hash,
    I: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            users: IdMap::new(),
            items: IdMap::new(),
            seen: HashSet::new(),
        }
    }

    /// Resolve a raw user id, assigning the next dense id if it is new
    pub fn map_user(&mut self, raw: U) -> (MappedUserId, bool) {
        self.users.get_or_insert(raw)
    }

    /// Resolve a raw item id, assigning the next dense id if it is new
    pub fn map_item(&mut self, raw: I) -> (MappedItemId, bool) {
        self.items.get_or_insert(raw)
    }

    pub fn user_id(&self, raw: &U) -> Option<MappedUserId> {
        self.users.get(raw)
    }

    pub fn item_id(&self, raw: &I) -> Option<MappedItemId> {
        self.items.get(raw)
    }

    pub fn contains_user(&self, raw: &U) -> bool {
        self.users.contains(raw)
    }

    pub fn contains_item(&self, raw: &I) -> bool {
        self.items.contains(raw)
    }

    /// Marks the pair as seen. Returns `false` if it already was.
    pub fn observe_pair(&mut self, user: &U, item: &I) -> bool {
        self.seen.insert((user.clone(), item.clone()))
    }

    /// Registers a training observation: marks the pair seen and maps both ids.
    ///
    /// Returns `None` without touching the id tables when the pair is a duplicate.
    pub fn register(&mut self, user: U, item: I) -> Option<(MappedUserId, MappedItemId)> {
        if !self.observe_pair(&user, &item) {
            return None;
        }
        let (uid, _) = self.map_user(user);
        let (iid, _) = self.map_item(item);
        Some((uid, iid))
    }

    /// Registers every (user, item, _) triplet; returns how many were new pairs
    pub fn register_triplets<T, R>(&mut self, triplets: T) -> usize
    where
        T: IntoIterator<Item = (U, I, R)>,
    {
        let registered = triplets
            .into_iter()
            .filter_map(|(user, item, _)| self.register(user, item))
            .count();
        tracing::debug!(
            "Registered {} pairs ({} users, {} items known)",
            registered,
            self.users.len(),
            self.items.len()
        );
        registered
    }

    pub fn num_users(&self) -> usize {
        self.users.len()
    }

    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    pub fn num_pairs(&self) -> usize {
        self.seen.len()
    }

    pub fn users(&self) -> &IdMap<U> {
        &self.users
    }

    pub fn items(&self) -> &IdMap<I> {
        &self.items
    }

    /// Wrap this registry in a cloneable, lockable handle
    pub fn into_shared(self) -> SharedIdRegistry<U, I> {
        SharedIdRegistry {
            inner: Arc::new(Mutex::new(self)),
        }
    }
}

impl<U, I> Default for IdRegistry<U, I>
where
    U: Clone + Eq + Hash,
    I: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe handle to one `IdRegistry`.
///
/// Clones point at the same registry.
#[derive(Debug)]
pub struct SharedIdRegistry<U, I> {
    inner: Arc<Mutex<IdRegistry<U, I>>>,
}

impl<U, I> SharedIdRegistry<U, I>
where
    U: Clone + Eq + Hash,
    I: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        IdRegistry::new().into_shared()
    }

    /// Blocks until the registry is free and returns exclusive access to it
    ///
    /// The guard derefs to `IdRegistry`, and the lock is released when it is dropped.
    pub fn lock(&self) -> MutexGuard<'_, IdRegistry<U, I>> {
        self.inner.lock()
    }
}

impl<U, I> Clone for SharedIdRegistry<U, I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<U, I> Default for SharedIdRegistry<U, I>
where
    U: Clone + Eq + Hash,
    I: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_pair_once() {
        let mut registry: IdRegistry<&str, &str> = IdRegistry::new();
        assert!(registry.observe_pair(&"u1", &"i1"));
        assert!(!registry.observe_pair(&"u1", &"i1"));
        assert!(registry.observe_pair(&"u1", &"i2"));
        assert_eq!(registry.num_pairs(), 2);
        // Observing a pair does not map ids
        assert_eq!(registry.num_users(), 0);
    }

    #[test]
    fn test_register_skips_duplicates() {
        let mut registry = IdRegistry::new();
        assert_eq!(registry.register("u1", "i1"), Some((0, 0)));
        assert_eq!(registry.register("u2", "i1"), Some((1, 0)));
        assert_eq!(registry.register("u1", "i1"), None);
        assert_eq!(registry.num_users(), 2);
        assert_eq!(registry.num_items(), 1);
    }

    #[test]
    fn test_register_triplets() {
        let mut registry = IdRegistry::new();
        let count = registry.register_triplets(vec![
            ("u1", "i1", 4.0),
            ("u1", "i2", 3.0),
            ("u1", "i1", 1.0),
        ]);
        assert_eq!(count, 2);
        assert_eq!(registry.item_id(&"i2"), Some(1));
        assert!(registry.contains_user(&"u1"));
        assert!(!registry.contains_item(&"i3"));
    }

    #[test]
    fn test_shared_handle_points_at_one_registry() {
        let shared: SharedIdRegistry<u32, u32> = SharedIdRegistry::new();
        let other = shared.clone();

        shared.lock().map_user(7);
        assert_eq!(other.lock().user_id(&7), Some(0));
    }
}
