//! Test split container.
//!
//! A `TestSet` is built once from a batch of (user, item, rating) triplets
//! against the global `IdRegistry` and is read-only afterwards.
//!
//! Lookups come in two flavours on purpose:
//! - `get_ratings` is lenient: an unknown mapped user simply has no ratings
//! - `get_uid` / `get_iid` are strict: a raw id outside this batch is an error

use crate::error::{DataError, Result};
use crate::id_map::LocalIdMap;
use crate::registry::{IdRegistry, SharedIdRegistry};
use crate::types::{BuildStats, MappedItemId, MappedUserId, RatingValue};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Ratings of one batch grouped by mapped user id.
#[derive(Debug, Clone)]
pub struct TestSet<U, I> {
    /// Mapped users in first-seen order
    users: Vec<MappedUserId>,
    user_ratings: HashMap<MappedUserId, Vec<(MappedItemId, f64)>>,
    uid_map: LocalIdMap<U>,
    iid_map: LocalIdMap<I>,
    stats: BuildStats,
}

impl<U, I> TestSet<U, I>
where
    U: Clone + Eq + Hash + Debug,
    I: Clone + Eq + Hash + Debug,
{
    /// Build a test set from triplets, updating the global registry in place.
    ///
    /// ## Algorithm
    /// For each triplet, in input order:
    /// 1. Skip it if its (user, item) pair was already seen anywhere
    /// 2. Otherwise mark the pair seen
    /// 3. Count raw ids the registry did not know yet
    /// 4. Resolve mapped ids, assigning new ones from the registry
    /// 5. Record the ids locally and append the rating under the user
    ///
    /// A skipped triplet has no side effect at all.
    ///
    /// Rust concept: `T: IntoIterator` accepts a `Vec`, a slice iterator, or a
    /// lazy adapter chain alike, and `R: RatingValue` lets each caller keep
    /// ratings in whatever type they were parsed as.
    ///
    /// # Errors
    /// `DataError::InvalidRating` on the first rating that is not a number.
    /// Registry updates made before that triplet (and for that triplet's pair
    /// and ids) are kept.
    pub fn from_uir_triplets<T, R>(
        triplets: T,
        registry: &mut IdRegistry<U, I>,
        verbose: bool,
    ) -> Result<Self>
    where
        T: IntoIterator<Item = (U, I, R)>,
        R: RatingValue,
    {
        let mut users = Vec::new();
        let mut user_ratings: HashMap<MappedUserId, Vec<(MappedItemId, f64)>> = HashMap::new();
        let mut uid_map = LocalIdMap::new();
        let mut iid_map = LocalIdMap::new();
        let mut stats = BuildStats::default();

        for (raw_uid, raw_iid, rating) in triplets {
            if !registry.observe_pair(&raw_uid, &raw_iid) {
                tracing::trace!("Skipping duplicate rating ({:?}, {:?})", raw_uid, raw_iid);
                stats.skipped_duplicates += 1;
                continue;
            }

            let (mapped_uid, new_user) = registry.map_user(raw_uid.clone());
            let (mapped_iid, new_item) = registry.map_item(raw_iid.clone());
            if new_user {
                stats.unknown_users += 1;
            }
            if new_item {
                stats.unknown_items += 1;
            }

            uid_map.insert(raw_uid, mapped_uid);
            iid_map.insert(raw_iid, mapped_iid);

            let value = rating.to_rating()?;
            user_ratings
                .entry(mapped_uid)
                .or_insert_with(|| {
                    users.push(mapped_uid);
                    Vec::new()
                })
                .push((mapped_iid, value));
            stats.ratings += 1;
        }

        stats.tested_users = user_ratings.len();

        if verbose {
            tracing::info!("Number of tested users = {}", stats.tested_users);
            tracing::info!("Number of unknown users = {}", stats.unknown_users);
            tracing::info!("Number of unknown items = {}", stats.unknown_items);
        }
        tracing::debug!(
            "Built test set: {} ratings, {} duplicates skipped",
            stats.ratings,
            stats.skipped_duplicates
        );

        Ok(Self {
            users,
            user_ratings,
            uid_map,
            iid_map,
            stats,
        })
    }

    /// Same as `from_uir_triplets`, holding the shared registry's lock for
    /// the whole batch.
    pub fn from_shared_registry<T, R>(
        triplets: T,
        registry: &SharedIdRegistry<U, I>,
        verbose: bool,
    ) -> Result<Self>
    where
        T: IntoIterator<Item = (U, I, R)>,
        R: RatingValue,
    {
        let mut guard = registry.lock();
        Self::from_uir_triplets(triplets, &mut guard, verbose)
    }

    /// Mapped ids of users with ratings in this set, in first-seen order
    pub fn get_users(&self) -> &[MappedUserId] {
        &self.users
    }

    /// Ratings of a mapped user as `(mapped item, rating)` pairs.
    ///
    /// Returns an empty slice for users not in this set.
    ///
    /// Rust concept: `&[T]` is a borrowed view into the stored `Vec`, so no
    /// ratings are copied. `&[]` is a valid empty slice with any lifetime.
    pub fn get_ratings(&self, mapped_uid: MappedUserId) -> &[(MappedItemId, f64)] {
        self.user_ratings
            .get(&mapped_uid)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Mapped id of a raw user that appears in this batch
    pub fn get_uid(&self, raw_uid: &U) -> Result<MappedUserId> {
        self.uid_map
            .get(raw_uid)
            .ok_or_else(|| DataError::UnknownUser {
                raw: format!("{:?}", raw_uid),
            })
    }

    /// Mapped id of a raw item that appears in this batch
    pub fn get_iid(&self, raw_iid: &I) -> Result<MappedItemId> {
        self.iid_map
            .get(raw_iid)
            .ok_or_else(|| DataError::UnknownItem {
                raw: format!("{:?}", raw_iid),
            })
    }

    pub fn num_users(&self) -> usize {
        self.users.len()
    }

    pub fn num_ratings(&self) -> usize {
        self.stats.ratings
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn uid_map(&self) -> &LocalIdMap<U> {
        &self.uid_map
    }

    pub fn iid_map(&self) -> &LocalIdMap<I> {
        &self.iid_map
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// `(mapped user, ratings)` in first-seen user order
    pub fn iter(&self) -> impl Iterator<Item = (MappedUserId, &[(MappedItemId, f64)])> + '_ {
        self.users
            .iter()
            .map(move |&uid| (uid, self.get_ratings(uid)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(
        triplets: Vec<(&'static str, &'static str, f64)>,
        registry: &mut IdRegistry<&'static str, &'static str>,
    ) -> TestSet<&'static str, &'static str> {
        TestSet::from_uir_triplets(triplets, registry, false).unwrap()
    }

    #[test]
    fn test_groups_ratings_by_user() {
        let mut registry = IdRegistry::new();
        let test_set = build(
            vec![("u1", "i1", 4.0), ("u2", "i1", 2.0), ("u1", "i2", 5.0)],
            &mut registry,
        );

        assert_eq!(test_set.get_users(), &[0, 1]);
        assert_eq!(test_set.get_ratings(0), &[(0, 4.0), (1, 5.0)]);
        assert_eq!(test_set.get_ratings(1), &[(0, 2.0)]);
        assert_eq!(test_set.num_ratings(), 3);
    }

    #[test]
    fn test_first_rating_wins_for_repeated_pair() {
        let mut registry = IdRegistry::new();
        let test_set = build(
            vec![("u1", "i1", 1.0), ("u1", "i1", 5.0)],
            &mut registry,
        );

        assert_eq!(test_set.get_ratings(0), &[(0, 1.0)]);
        assert_eq!(test_set.stats().skipped_duplicates, 1);
    }

    #[test]
    fn test_ratings_stored_at_full_precision() {
        let mut registry: IdRegistry<&str, &str> = IdRegistry::new();
        let test_set = TestSet::from_uir_triplets(
            vec![("u1", "i1", "1e300"), ("u1", "i2", "0.1"), ("u1", "i3", "16777217")],
            &mut registry,
            false,
        )
        .unwrap();

        assert_eq!(
            test_set.get_ratings(0),
            &[(0, 1e300), (1, 0.1), (2, 16_777_217.0)]
        );
    }

    #[test]
    fn test_unknown_counters() {
        let mut registry = IdRegistry::new();
        registry.register("u1", "i1");

        let test_set = build(
            vec![("u1", "i2", 3.0), ("u2", "i1", 4.0), ("u2", "i3", 1.0)],
            &mut registry,
        );

        let stats = test_set.stats();
        assert_eq!(stats.tested_users, 2);
        assert_eq!(stats.unknown_users, 1);
        assert_eq!(stats.unknown_items, 2);
    }

    #[test]
    fn test_lenient_and_strict_lookups() {
        let mut registry = IdRegistry::new();
        let test_set = build(vec![("u1", "i1", 3.0)], &mut registry);

        assert!(test_set.get_ratings(42).is_empty());
        assert!(matches!(
            test_set.get_uid(&"nobody"),
            Err(DataError::UnknownUser { .. })
        ));
        assert!(matches!(
            test_set.get_iid(&"nothing"),
            Err(DataError::UnknownItem { .. })
        ));
    }

    #[test]
    fn test_empty_batch() {
        let mut registry = IdRegistry::new();
        let test_set = build(Vec::new(), &mut registry);

        assert!(test_set.is_empty());
        assert_eq!(test_set.stats(), &BuildStats::default());
        assert_eq!(test_set.iter().count(), 0);
    }
}
