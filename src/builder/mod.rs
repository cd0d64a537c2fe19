//! Contains the manager: the owner of the unique tables and the operation
//! caches, and the home of every constructor and operation of the library.

pub mod cache;
pub mod eval;
pub mod hom_builder;
pub mod sdd_builder;

use crate::backing_store::UniqueTable;
use crate::repr::hom::{HomNode, HomPtr};
use crate::repr::order::Order;
use crate::repr::sdd::{SddNode, SddPtr};
use crate::values::Values;
use cache::Cache;

/// Default bound of the SDD operation cache.
pub const DEFAULT_SDD_CACHE_SIZE: usize = 1 << 16;
/// Default bound of the homomorphism evaluation cache.
pub const DEFAULT_HOM_CACHE_SIZE: usize = 1 << 16;

/// Largest arc or operand count a single node may carry.
pub(crate) const MAX_ARITY: usize = u16::MAX as usize;

/// Key of the SDD operation cache. Union is n-ary with sorted operands;
/// intersection operands are sorted as well since the operation commutes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum SddOp {
    Union(Box<[SddPtr]>),
    Inter(SddPtr, SddPtr),
    Diff(SddPtr, SddPtr),
}

/// Key of the homomorphism evaluation cache. The order is deliberately not
/// part of the key: within one evaluation session it is a function of the
/// operand, and a session is tied to a single top-level order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct HomOp {
    pub hom: HomPtr,
    pub sdd: SddPtr,
}

#[derive(Debug, Clone, Default)]
pub struct ManagerStats {
    /// total number of recursive set-operation calls
    pub num_rec: usize,
    /// total number of homomorphism evaluations (cached or not)
    pub num_eval: usize,
}

/// The manager owns every canonicalized node and both operation caches. All
/// construction and evaluation goes through it; it is single-threaded by
/// design.
pub struct Manager<V: Values> {
    pub(crate) sdd_tbl: UniqueTable<SddNode<V>>,
    pub(crate) hom_tbl: UniqueTable<HomNode<V>>,
    pub(crate) sdd_cache: Cache<SddOp, SddPtr>,
    pub(crate) hom_cache: Cache<HomOp, SddPtr>,
    /// top-level order the hom cache is currently valid for
    pub(crate) session: Option<Order>,
    pub(crate) stats: ManagerStats,
}

impl<V: Values> Manager<V> {
    pub fn new() -> Manager<V> {
        Self::with_cache_sizes(DEFAULT_HOM_CACHE_SIZE, DEFAULT_SDD_CACHE_SIZE)
    }

    pub fn with_cache_sizes(hom_cache_size: usize, sdd_cache_size: usize) -> Manager<V> {
        let mut sdd_tbl = UniqueTable::new();
        // the terminals are interned first so their handles are pinned
        let zero = sdd_tbl.get_or_insert(SddNode::Zero);
        let one = sdd_tbl.get_or_insert(SddNode::One);
        debug_assert_eq!(SddPtr::new(zero), SddPtr::ZERO);
        debug_assert_eq!(SddPtr::new(one), SddPtr::ONE);

        let mut hom_tbl = UniqueTable::new();
        let id = hom_tbl.get_or_insert(HomNode::Identity);
        debug_assert_eq!(HomPtr::new(id), HomPtr::IDENTITY);

        Manager {
            sdd_tbl,
            hom_tbl,
            sdd_cache: Cache::new("sdd_cache", sdd_cache_size),
            hom_cache: Cache::new("homomorphism_cache", hom_cache_size),
            session: None,
            stats: ManagerStats::default(),
        }
    }

    /// The diagram of the empty set.
    pub fn zero(&self) -> SddPtr {
        SddPtr::ZERO
    }

    /// The diagram of the set containing the empty tuple.
    pub fn one(&self) -> SddPtr {
        SddPtr::ONE
    }

    /// The node behind a handle.
    pub fn node(&self, x: SddPtr) -> &SddNode<V> {
        self.sdd_tbl.get(x.index())
    }

    /// The operator node behind a handle.
    pub fn hom_node(&self, h: HomPtr) -> &HomNode<V> {
        self.hom_tbl.get(h.index())
    }

    pub(crate) fn intern_sdd(&mut self, node: SddNode<V>) -> SddPtr {
        SddPtr::new(self.sdd_tbl.get_or_insert(node))
    }

    pub(crate) fn intern_hom(&mut self, node: HomNode<V>) -> HomPtr {
        HomPtr::new(self.hom_tbl.get_or_insert(node))
    }

    /// Comparing two diagrams compares the sets they denote; O(1).
    pub fn sdd_eq(&self, a: SddPtr, b: SddPtr) -> bool {
        a == b
    }

    /// Turn both operation caches on or off. Results never depend on the
    /// caches; disabling exists to test exactly that.
    pub fn set_cache_enabled(&mut self, enabled: bool) {
        self.sdd_cache.set_enabled(enabled);
        self.hom_cache.set_enabled(enabled);
    }

    /// Scrubbing entry point: drop every cached operation. Interned nodes
    /// are kept for the lifetime of the manager.
    pub fn clear_caches(&mut self) {
        self.sdd_cache.clear();
        self.hom_cache.clear();
        self.session = None;
    }

    pub fn stats(&self) -> &ManagerStats {
        &self.stats
    }

    pub fn sdd_cache_stats(&self) -> &cache::CacheStatistics {
        self.sdd_cache.statistics()
    }

    pub fn hom_cache_stats(&self) -> &cache::CacheStatistics {
        self.hom_cache.statistics()
    }

    pub fn print_stats(&self) {
        println!("***************[ hsdd stats ]***************");
        println!(
            "\tsdd nodes: {} (table hits: {})",
            self.sdd_tbl.num_nodes(),
            self.sdd_tbl.hits()
        );
        println!(
            "\thom nodes: {} (table hits: {})",
            self.hom_tbl.num_nodes(),
            self.hom_tbl.hits()
        );
        println!("\trecursive set operations: {}", self.stats.num_rec);
        println!("\thomomorphism evaluations: {}", self.stats.num_eval);
        for (name, stats, len) in [
            (
                self.sdd_cache.name(),
                self.sdd_cache.statistics(),
                self.sdd_cache.len(),
            ),
            (
                self.hom_cache.name(),
                self.hom_cache.statistics(),
                self.hom_cache.len(),
            ),
        ] {
            let total = stats.total();
            println!(
                "\t{}: {} entries, {} cleanups, {} hits / {} misses / {} filtered",
                name,
                len,
                stats.cleanups(),
                total.hits,
                total.misses,
                total.filtered
            );
        }
    }
}

impl<V: Values> Default for Manager<V> {
    fn default() -> Self {
        Self::new()
    }
}
