//! # Eval Data Crate
//!
//! This crate builds the test split of a recommender evaluation run.
//!
//! ## Main Components
//!
//! - **registry**: Global raw → mapped id tables and the seen-pairs set
//! - **test_set**: Deduplicated, id-mapped ratings grouped by user
//! - **id_map**: Dense and insertion-ordered id tables
//! - **parser**: Read (user, item, rating) triplets from text files
//! - **types**: Id aliases, rating conversion, build statistics
//! - **error**: Error types
//!
//! ## Example Usage
//!
//! ```ignore
//! use eval_data::{IdRegistry, TestSet};
//!
//! let mut registry = IdRegistry::new();
//!
//! // Train ratings reserve ids first
//! registry.register_triplets(train_triplets);
//!
//! let test_set = TestSet::from_uir_triplets(test_triplets, &mut registry, true)?;
//! for &uid in test_set.get_users() {
//!     println!("user {} has {} test ratings", uid, test_set.get_ratings(uid).len());
//! }
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod id_map;
pub mod registry;
pub mod test_set;
pub mod parser;

// Re-export commonly used types for convenience
pub use error::{DataError, Result};
pub use id_map::{IdMap, LocalIdMap};
pub use registry::{IdRegistry, SharedIdRegistry};
pub use test_set::TestSet;
pub use types::{
    BuildStats,
    MappedItemId,
    MappedUserId,
    RatingValue,
    RawTriplet,
    TripletFormat,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        let registry: IdRegistry<String, String> = IdRegistry::new();

        assert_eq!(registry.num_users(), 0);
        assert_eq!(registry.num_items(), 0);
        assert_eq!(registry.num_pairs(), 0);
    }

    #[test]
    fn test_string_triplets_from_parser() {
        let triplets =
            parser::parse_triplets_str("7::42::4\n7::43::2\n", &TripletFormat::default(), "t").unwrap();

        let mut registry = IdRegistry::new();
        let test_set = TestSet::from_uir_triplets(triplets, &mut registry, false).unwrap();

        let uid = test_set.get_uid(&"7".to_string()).unwrap();
        assert_eq!(test_set.get_ratings(uid), &[(0, 4.0), (1, 2.0)]);
        assert_eq!(test_set.get_iid(&"43".to_string()).unwrap(), 1);
    }
}
