//! Raw id → mapped id tables.
//!
//! - `IdMap` hands out dense ids: the first new raw id gets `len()`, the next
//!   one `len() + 1`, and so on. Ids are never reassigned or removed.
//! - `LocalIdMap` only records ids handed out elsewhere, remembering the order
//!   in which raw ids first appeared.
//!
//! Rust concepts you'll see here:
//! - The `Entry` API: one hash lookup decides between "already known" and
//!   "insert now", with no second lookup
//! - Generic structs bounded by `Clone + Eq + Hash` so any raw id type works
//! - A `HashMap` + `Vec` pair: the map gives O(1) lookups, the vec keeps order

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;

/// Dense insert-or-lookup mapping from raw ids to `usize` indices.
#[derive(Debug, Clone)]
pub struct IdMap<T> {
    map: HashMap<T, usize>,
    vec: Vec<T>,
}

impl<T: Clone + Eq + Hash> IdMap<T> {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
            vec: Vec::new(),
        }
    }

    /// Returns the id for `raw`, assigning the next dense id if it is new.
    ///
    /// The flag is `true` when the id was assigned by this call.
    ///
    /// Rust concept: `v.key()` borrows the key still owned by the vacant entry,
    /// so the raw id is cloned once for the reverse vec and moved into the map.
    pub fn get_or_insert(&mut self, raw: T) -> (usize, bool) {
        match self.map.entry(raw) {
            Entry::Occupied(o) => (*o.get(), false),
            Entry::Vacant(v) => {
                let id = self.vec.len();
                self.vec.push(v.key().clone());
                v.insert(id);
                (id, true)
            }
        }
    }

    pub fn get(&self, raw: &T) -> Option<usize> {
        self.map.get(raw).copied()
    }

    pub fn contains(&self, raw: &T) -> bool {
        self.map.contains_key(raw)
    }

    /// Reverse lookup: the raw id behind a mapped id
    pub fn lookup(&self, id: usize) -> Option<&T> {
        self.vec.get(id)
    }

    pub fn len(&self) -> usize {
        self.vec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }

    /// Raw ids ordered by their mapped id
    pub fn ids(&self) -> &[T] {
        &self.vec
    }
}

impl<T: Clone + Eq + Hash> Default for IdMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Insertion-ordered record of raw → mapped ids observed in one batch.
#[derive(Debug, Clone)]
pub struct LocalIdMap<T> {
    positions: HashMap<T, usize>,
    entries: Vec<(T, usize)>,
}

impl<T: Clone + Eq + Hash> LocalIdMap<T> {
    pub fn new() -> Self {
        Self {
            positions: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Records `raw → id`. A repeated raw id is overwritten in place and keeps
    /// its first-occurrence position.
    pub fn insert(&mut self, raw: T, id: usize) {
        match self.positions.entry(raw) {
            Entry::Occupied(o) => {
                self.entries[*o.get()].1 = id;
            }
            Entry::Vacant(v) => {
                let pos = self.entries.len();
                self.entries.push((v.key().clone(), id));
                v.insert(pos);
            }
        }
    }

    pub fn get(&self, raw: &T) -> Option<usize> {
        self.positions.get(raw).map(|&pos| self.entries[pos].1)
    }

    pub fn contains(&self, raw: &T) -> bool {
        self.positions.contains_key(raw)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(raw, mapped)` pairs in first-occurrence order
    pub fn iter(&self) -> impl Iterator<Item = (&T, usize)> + '_ {
        self.entries.iter().map(|(raw, id)| (raw, *id))
    }
}

impl<T: Clone + Eq + Hash> Default for LocalIdMap<T> {
    fn default() -> Self {
        Self::new()
    }
}
