//! A unique table based on robin-hood hashing over an append-only arena.
//! This is the primary store for SDD and homomorphism nodes: interning a
//! record returns a stable `u32` handle, and two records receive the same
//! handle exactly when they are structurally equal.

use super::u64hash;
use std::hash::Hash;
use std::mem;

/// The load factor of the table, i.e. how full the table will be when it
/// automatically resizes
const LOAD_FACTOR: f64 = 0.7;
const DEFAULT_SIZE: usize = 8192;

/// a slot of the probing table; records themselves live in the arena
#[derive(Clone, Copy, Debug, Default)]
struct Slot {
    /// arena index of the interned record, present iff the slot is occupied
    idx: Option<u32>,
    /// precomputed hash of the record, cached so probing never rehashes
    hash: u64,
    /// the psl is the *probe sequence length*: it is the distance of this slot
    /// from the location that it hashes to in the table.
    psl: u8,
}

impl Slot {
    fn new(idx: u32, hash: u64, psl: u8) -> Slot {
        Slot {
            idx: Some(idx),
            hash,
            psl,
        }
    }

    #[inline]
    fn is_occupied(&self) -> bool {
        self.idx.is_some()
    }
}

/// Insert a slot into `tbl` for a record that is already in the arena. This
/// is used during growing and after a displacement during `get_or_insert`.
fn propagate(v: &mut [Slot], cap: usize, itm: Slot, pos: usize) {
    let mut searcher = itm;
    let mut pos = pos;
    loop {
        if v[pos].is_occupied() {
            let cur_itm = v[pos];
            // check if this item's position is closer than ours
            if cur_itm.psl < searcher.psl {
                // swap the searcher and this item
                v[pos] = searcher;
                searcher = cur_itm;
            }
            searcher.psl += 1;
            pos = (pos + 1) % cap; // wrap to the beginning of the array
        } else {
            // place the element in the current spot, we're done
            v[pos] = searcher;
            return;
        }
    }
}

/// A mutable vector-backed robin-hood linear probing hash table. Interned
/// records are immutable and never move; their arena index is the handle.
pub struct UniqueTable<T>
where
    T: Hash + Eq,
{
    /// probing table which stores indexes into the arena
    tbl: Vec<Slot>,
    /// owning store for the interned records
    arena: Vec<T>,
    cap: usize,
    /// # times an insertion found an existing record
    hits: usize,
}

impl<T> UniqueTable<T>
where
    T: Hash + Eq,
{
    pub fn new() -> UniqueTable<T> {
        UniqueTable {
            tbl: vec![Slot::default(); DEFAULT_SIZE],
            arena: Vec::new(),
            cap: DEFAULT_SIZE,
            hits: 0,
        }
    }

    /// Fetch the record for a handle previously returned by `get_or_insert`.
    #[inline]
    pub fn get(&self, handle: u32) -> &T {
        &self.arena[handle as usize]
    }

    /// Canonicalize `elem`: return the handle of the structurally equal
    /// record if one was interned before, otherwise intern `elem` and return
    /// its fresh handle.
    pub fn get_or_insert(&mut self, elem: T) -> u32 {
        if (self.arena.len() + 1) as f64 > (self.cap as f64 * LOAD_FACTOR) {
            self.grow();
        }

        let hash = u64hash(&elem);
        // the current index into the probing table
        let mut pos: usize = (hash as usize) % self.cap;
        // the distance this item is from its desired location
        let mut psl = 0;

        loop {
            if self.tbl[pos].is_occupied() {
                let cur_itm = self.tbl[pos];
                // check the cached hashes first; only on a match compare the
                // records themselves
                if let (true, Some(idx)) = (hash == cur_itm.hash, cur_itm.idx) {
                    if self.arena[idx as usize] == elem {
                        self.hits += 1;
                        return idx;
                    }
                }

                // not equal; begin probing
                if cur_itm.psl < psl {
                    // elem is not in the table; insert it at pos and propagate
                    // the slot that is currently here
                    propagate(&mut self.tbl, self.cap, cur_itm, pos);
                    let idx = self.push_record(elem);
                    self.tbl[pos] = Slot::new(idx, hash, psl);
                    return idx;
                }
                psl += 1;
                pos = (pos + 1) % self.cap; // wrap to the beginning of the array
            } else {
                // this element is unique, so place it in the current spot
                let idx = self.push_record(elem);
                self.tbl[pos] = Slot::new(idx, hash, psl);
                return idx;
            }
        }
    }

    fn push_record(&mut self, elem: T) -> u32 {
        assert!(self.arena.len() < u32::MAX as usize, "unique table overflow");
        self.arena.push(elem);
        (self.arena.len() - 1) as u32
    }

    /// Expands the capacity of the probing table; arena indices are untouched
    fn grow(&mut self) {
        let new_sz = (self.cap + 1).next_power_of_two();
        self.cap = new_sz;
        let old = mem::replace(&mut self.tbl, vec![Slot::default(); new_sz]);
        for i in old.iter().filter(|s| s.is_occupied()) {
            let mut itm = *i;
            itm.psl = 0;
            propagate(&mut self.tbl, self.cap, itm, (itm.hash as usize) % new_sz);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.arena.iter()
    }

    pub fn num_nodes(&self) -> usize {
        self.arena.len()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }
}

impl<T> Default for UniqueTable<T>
where
    T: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

#[test]
fn intern_dedups() {
    let mut tbl: UniqueTable<(u32, u32)> = UniqueTable::new();
    let a = tbl.get_or_insert((1, 2));
    let b = tbl.get_or_insert((3, 4));
    let c = tbl.get_or_insert((1, 2));
    assert_eq!(a, c);
    assert_ne!(a, b);
    assert_eq!(tbl.num_nodes(), 2);
    assert_eq!(tbl.hits(), 1);
    assert_eq!(*tbl.get(b), (3, 4));
}

#[test]
fn intern_survives_growth() {
    let mut tbl: UniqueTable<u64> = UniqueTable::new();
    let handles: Vec<u32> = (0..20_000u64).map(|i| tbl.get_or_insert(i)).collect();
    for (i, h) in handles.iter().enumerate() {
        assert_eq!(*tbl.get(*h), i as u64);
        assert_eq!(tbl.get_or_insert(i as u64), *h);
    }
}
