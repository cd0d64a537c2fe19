//! A sorted flat set of integers, hash-consed in a thread-local unique table
//! so equality, hashing and ordering are O(1) on the interned id. Suited to
//! sparse or unbounded per-level domains.

use super::Values;
use itertools::Itertools;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

thread_local! {
    /// the unique table of all flat sets of this thread
    static UNIQUE: RefCell<FxHashMap<Rc<[u32]>, u32>> =
        RefCell::new(FxHashMap::default());
}

/// An interned sorted set of `u32`. Cloning shares the underlying storage.
#[derive(Debug, Clone)]
pub struct FlatSet {
    id: u32,
    data: Rc<[u32]>,
}

impl FlatSet {
    /// Canonicalize `values` (sorting and deduplicating) and intern it.
    pub fn new<I: IntoIterator<Item = u32>>(values: I) -> FlatSet {
        let mut v: Vec<u32> = values.into_iter().collect();
        v.sort_unstable();
        v.dedup();
        Self::intern(v)
    }

    pub fn singleton(v: u32) -> FlatSet {
        Self::intern(vec![v])
    }

    pub fn contains(&self, v: u32) -> bool {
        self.data.binary_search(&v).is_ok()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.data
    }

    /// requires `sorted` to be sorted and free of duplicates
    fn intern(sorted: Vec<u32>) -> FlatSet {
        UNIQUE.with(|tbl| {
            let mut tbl = tbl.borrow_mut();
            if let Some((data, &id)) = tbl.get_key_value(sorted.as_slice()) {
                return FlatSet {
                    id,
                    data: data.clone(),
                };
            }
            let id = u32::try_from(tbl.len()).expect("flat set table overflow");
            let data: Rc<[u32]> = sorted.into();
            tbl.insert(data.clone(), id);
            FlatSet { id, data }
        })
    }
}

impl FromIterator<u32> for FlatSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> FlatSet {
        FlatSet::new(iter)
    }
}

// Interning makes id equality coincide with content equality, so all of the
// comparison traits go through the id.
impl PartialEq for FlatSet {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FlatSet {}

impl PartialOrd for FlatSet {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FlatSet {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for FlatSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Values for FlatSet {
    type Iter = FlatSetIter;

    fn empty() -> FlatSet {
        FlatSet::intern(Vec::new())
    }

    fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn union(&self, other: &FlatSet) -> FlatSet {
        let merged = self
            .data
            .iter()
            .merge(other.data.iter())
            .copied()
            .dedup()
            .collect();
        FlatSet::intern(merged)
    }

    fn intersection(&self, other: &FlatSet) -> FlatSet {
        let common = self
            .data
            .iter()
            .copied()
            .filter(|v| other.contains(*v))
            .collect();
        FlatSet::intern(common)
    }

    fn difference(&self, other: &FlatSet) -> FlatSet {
        let rest = self
            .data
            .iter()
            .copied()
            .filter(|v| !other.contains(*v))
            .collect();
        FlatSet::intern(rest)
    }

    fn iter(&self) -> FlatSetIter {
        FlatSetIter {
            data: self.data.clone(),
            pos: 0,
        }
    }
}

pub struct FlatSetIter {
    data: Rc<[u32]>,
    pos: usize,
}

impl Iterator for FlatSetIter {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let v = self.data.get(self.pos).copied();
        self.pos += 1;
        v
    }
}

impl fmt::Display for FlatSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.data.iter().join(","))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn interning_canonicalizes() {
        let a = FlatSet::new([3, 1, 2, 1]);
        let b = FlatSet::new([1, 2, 3]);
        assert_eq!(a, b);
        assert!(Rc::ptr_eq(&a.data, &b.data));
        assert_ne!(a, FlatSet::new([1, 2]));
    }

    #[test]
    fn set_algebra() {
        let a = FlatSet::new([0, 1, 2]);
        let b = FlatSet::new([1, 3]);
        assert_eq!(a.union(&b), FlatSet::new([0, 1, 2, 3]));
        assert_eq!(a.intersection(&b), FlatSet::singleton(1));
        assert_eq!(a.difference(&b), FlatSet::new([0, 2]));
        assert_eq!(b.difference(&a), FlatSet::singleton(3));
        assert!(FlatSet::empty().is_empty());
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![0, 1, 2]);
    }
}
