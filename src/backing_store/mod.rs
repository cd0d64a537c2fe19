//! Backing stores are unique tables which canonicalize every record of the
//! library: structurally equal records are interned once and afterwards
//! compared by handle.
pub mod unique_table;

use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

pub use unique_table::UniqueTable;

/// Hash an internable record with the hasher used throughout the library.
pub fn u64hash<T: Hash>(elem: &T) -> u64 {
    let mut hasher = FxHasher::default();
    elem.hash(&mut hasher);
    hasher.finish()
}
