//! A generic bounded operation cache. When full, half of the entries are
//! evicted with a least-frequently-used strategy: fixpoint loops consult the
//! same operation many times, so high-frequency entries are worth more than
//! recent ones.

use log::debug;
use rustc_hash::FxHashMap;
use std::hash::Hash;

/// Counters between two cleanups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Round {
    pub hits: usize,
    pub misses: usize,
    pub filtered: usize,
}

/// The statistics of a cache: one round per cleanup, plus the running one.
#[derive(Debug, Clone)]
pub struct CacheStatistics {
    rounds: Vec<Round>,
}

impl CacheStatistics {
    fn new() -> CacheStatistics {
        CacheStatistics {
            rounds: vec![Round::default()],
        }
    }

    /// All rounds, oldest first.
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    /// Number of performed cleanups.
    pub fn cleanups(&self) -> usize {
        self.rounds.len() - 1
    }

    pub fn total(&self) -> Round {
        self.rounds.iter().fold(Round::default(), |acc, r| Round {
            hits: acc.hits + r.hits,
            misses: acc.misses + r.misses,
            filtered: acc.filtered + r.filtered,
        })
    }

    fn current(&mut self) -> &mut Round {
        self.rounds.last_mut().expect("statistics have no round")
    }
}

#[derive(Debug, Clone)]
struct Entry<R> {
    result: R,
    /// number of times this entry has been consulted; drives eviction
    hits: u32,
}

/// Associates operations to their results, bounded by `max_size`.
pub struct Cache<O, R> {
    name: &'static str,
    max_size: usize,
    enabled: bool,
    map: FxHashMap<O, Entry<R>>,
    stats: CacheStatistics,
}

impl<O, R> Cache<O, R>
where
    O: Hash + Eq + Clone,
    R: Clone,
{
    pub fn new(name: &'static str, max_size: usize) -> Cache<O, R> {
        assert!(max_size >= 2, "cache too small to evict from");
        Cache {
            name,
            max_size,
            enabled: true,
            map: FxHashMap::default(),
            stats: CacheStatistics::new(),
        }
    }

    /// Disabling makes every lookup miss and every insert a no-op; results
    /// must not change.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Look `op` up; a hit bumps the entry's counter.
    pub fn lookup(&mut self, op: &O) -> Option<R> {
        if !self.enabled {
            return None;
        }
        match self.map.get_mut(op) {
            Some(entry) => {
                entry.hits += 1;
                self.stats.current().hits += 1;
                Some(entry.result.clone())
            }
            None => {
                self.stats.current().misses += 1;
                None
            }
        }
    }

    /// Record the result of an operation that missed. Triggers a cleanup
    /// when the cache is full.
    pub fn insert(&mut self, op: O, result: R) {
        if !self.enabled {
            return;
        }
        if self.map.len() >= self.max_size {
            self.cleanup();
        }
        self.map.insert(op, Entry { result, hits: 0 });
    }

    /// An operation was rejected from caching.
    pub fn note_filtered(&mut self) {
        self.stats.current().filtered += 1;
    }

    /// The evaluation behind the last counted miss failed; errors are not
    /// cached and do not count.
    pub fn forget_miss(&mut self) {
        let round = self.stats.current();
        round.misses = round.misses.saturating_sub(1);
    }

    /// As [`Cache::forget_miss`], for a filtered operation.
    pub fn forget_filtered(&mut self) {
        let round = self.stats.current();
        round.filtered = round.filtered.saturating_sub(1);
    }

    /// Remove the half of the cache that was consulted least; survivors keep
    /// their counters. Opens a new statistics round.
    pub fn cleanup(&mut self) {
        self.stats.rounds.push(Round::default());
        let cut = self.map.len() / 2;
        if cut == 0 {
            return;
        }
        let mut by_hits: Vec<(u32, O)> = self
            .map
            .iter()
            .map(|(op, entry)| (entry.hits, op.clone()))
            .collect();
        by_hits.select_nth_unstable_by_key(cut, |(hits, _)| *hits);
        for (_, op) in by_hits.drain(..cut) {
            self.map.remove(&op);
        }
        debug!(
            "{}: cleanup evicted {} entries, {} survive",
            self.name,
            cut,
            self.map.len()
        );
    }

    /// Remove every entry; statistics are kept.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn statistics(&self) -> &CacheStatistics {
        &self.stats
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hit_and_miss_counting() {
        let mut c: Cache<u64, u64> = Cache::new("test", 8);
        assert_eq!(c.lookup(&1), None);
        c.insert(1, 10);
        assert_eq!(c.lookup(&1), Some(10));
        assert_eq!(c.lookup(&1), Some(10));
        let total = c.statistics().total();
        assert_eq!(total.hits, 2);
        assert_eq!(total.misses, 1);
    }

    #[test]
    fn size_never_exceeds_max() {
        let mut c: Cache<u64, u64> = Cache::new("test", 16);
        for i in 0..1000 {
            c.lookup(&i);
            c.insert(i, i);
            assert!(c.len() <= 16);
        }
    }

    #[test]
    fn cleanup_keeps_the_frequent_half() {
        let mut c: Cache<u64, u64> = Cache::new("test", 8);
        for i in 0..8 {
            c.insert(i, i);
        }
        // consult the upper half often
        for _ in 0..5 {
            for i in 4..8 {
                c.lookup(&i);
            }
        }
        c.cleanup();
        assert_eq!(c.len(), 4);
        for i in 4..8 {
            assert_eq!(c.lookup(&i), Some(i));
        }
        assert_eq!(c.statistics().cleanups(), 1);
        // survivors keep their counters: a second cleanup opens a new round
        assert_eq!(c.statistics().rounds().len(), 2);
    }

    #[test]
    fn disabled_cache_stores_nothing() {
        let mut c: Cache<u64, u64> = Cache::new("test", 8);
        c.set_enabled(false);
        c.insert(1, 10);
        assert_eq!(c.lookup(&1), None);
        assert_eq!(c.len(), 0);
    }

    #[test]
    fn error_miss_is_uncounted() {
        let mut c: Cache<u64, u64> = Cache::new("test", 8);
        assert_eq!(c.lookup(&1), None);
        c.forget_miss();
        assert_eq!(c.statistics().total().misses, 0);
    }
}
