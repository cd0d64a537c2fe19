//! Node constructors and the set operations on diagrams: union,
//! intersection and difference, implemented as recursive traversals over the
//! arc lists, with an n-ary sum that batches operands so the recursion
//! degree stays flat.

use super::{Manager, SddOp, MAX_ARITY};
use crate::error::{Error, Result};
use crate::repr::sdd::{FlatArc, HierArc, SddNode, SddPtr};
use crate::repr::var_label::Var;
use crate::values::Values;
use itertools::Itertools;
use num::{BigUint, One, Zero};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::hash_map::Entry;

/// snapshot of a node taken before recursing, so the tables can be mutated
pub(crate) enum NodeView<V> {
    Zero,
    One,
    Flat(Var, Vec<(V, SddPtr)>),
    Hier(Var, Vec<(SddPtr, SddPtr)>),
}

impl<V: Values> Manager<V> {
    pub(crate) fn view(&self, x: SddPtr) -> NodeView<V> {
        match self.node(x) {
            SddNode::Zero => NodeView::Zero,
            SddNode::One => NodeView::One,
            SddNode::Flat { var, alpha } => NodeView::Flat(
                *var,
                alpha
                    .iter()
                    .map(|a| (a.values().clone(), a.succ()))
                    .collect(),
            ),
            SddNode::Hier { var, alpha } => NodeView::Hier(
                *var,
                alpha.iter().map(|a| (a.label(), a.succ())).collect(),
            ),
        }
    }

    /// Build a flat node from arbitrary arcs: empty labels and arcs to
    /// `Zero` are dropped, overlapping labels are partitioned (unioning the
    /// targets), arcs sharing a target are merged.
    pub fn flat(
        &mut self,
        var: Var,
        arcs: impl IntoIterator<Item = (V, SddPtr)>,
    ) -> Result<SddPtr> {
        let mut parts: Vec<(V, SddPtr)> = Vec::new();
        for (values, succ) in arcs {
            if values.is_empty() || succ.is_zero() {
                continue;
            }
            self.flat_partition_insert(&mut parts, values, succ)?;
        }
        Ok(self.mk_flat(var, parts))
    }

    /// Build a hierarchical node from arbitrary arcs; the counterpart of
    /// [`Manager::flat`] with nested diagrams as labels.
    pub fn hier(
        &mut self,
        var: Var,
        arcs: impl IntoIterator<Item = (SddPtr, SddPtr)>,
    ) -> Result<SddPtr> {
        let mut parts: Vec<(SddPtr, SddPtr)> = Vec::new();
        for (label, succ) in arcs {
            if label.is_zero() || succ.is_zero() {
                continue;
            }
            self.hier_partition_insert(&mut parts, label, succ)?;
        }
        self.mk_hier(var, parts)
    }

    /// Union of two diagrams over the same order.
    pub fn union(&mut self, a: SddPtr, b: SddPtr) -> Result<SddPtr> {
        self.union_many([a, b])
    }

    /// N-ary union; this is the entry the sum homomorphism evaluates
    /// through, so that a sum of k operands costs one traversal, not k.
    pub fn union_many(&mut self, ops: impl IntoIterator<Item = SddPtr>) -> Result<SddPtr> {
        let mut ops: Vec<SddPtr> = ops.into_iter().filter(|p| !p.is_zero()).collect();
        ops.sort_unstable();
        ops.dedup();
        match ops.len() {
            0 => return Ok(SddPtr::ZERO),
            1 => return Ok(ops[0]),
            _ => {}
        }
        let key = SddOp::Union(ops.clone().into_boxed_slice());
        if let Some(r) = self.sdd_cache.lookup(&key) {
            return Ok(r);
        }
        match self.union_nodes(&ops) {
            Ok(r) => {
                self.sdd_cache.insert(key, r);
                Ok(r)
            }
            Err(e) => {
                self.sdd_cache.forget_miss();
                Err(e)
            }
        }
    }

    /// Intersection of two diagrams. Operands over incompatible levels have
    /// no common tuple, so the result is `Zero` rather than an error.
    pub fn inter(&mut self, a: SddPtr, b: SddPtr) -> Result<SddPtr> {
        if a == b {
            return Ok(a);
        }
        if a.is_zero() || b.is_zero() {
            return Ok(SddPtr::ZERO);
        }
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        let key = SddOp::Inter(a, b);
        if let Some(r) = self.sdd_cache.lookup(&key) {
            return Ok(r);
        }
        match self.inter_nodes(a, b) {
            Ok(r) => {
                self.sdd_cache.insert(key, r);
                Ok(r)
            }
            Err(e) => {
                self.sdd_cache.forget_miss();
                Err(e)
            }
        }
    }

    /// The tuples of `a` not in `b`.
    pub fn diff(&mut self, a: SddPtr, b: SddPtr) -> Result<SddPtr> {
        if a == b || a.is_zero() {
            return Ok(SddPtr::ZERO);
        }
        if b.is_zero() {
            return Ok(a);
        }
        let key = SddOp::Diff(a, b);
        if let Some(r) = self.sdd_cache.lookup(&key) {
            return Ok(r);
        }
        match self.diff_nodes(a, b) {
            Ok(r) => {
                self.sdd_cache.insert(key, r);
                Ok(r)
            }
            Err(e) => {
                self.sdd_cache.forget_miss();
                Err(e)
            }
        }
    }

    /// requires at least two operands, none of them `Zero`, deduplicated
    fn union_nodes(&mut self, ops: &[SddPtr]) -> Result<SddPtr> {
        self.stats.num_rec += 1;
        if ops.iter().any(|p| p.is_one()) {
            // `One` survives a union only with itself, and ops are deduped
            return Err(Error::top("union of the one terminal with a node"));
        }
        match self.view(ops[0]) {
            NodeView::Flat(var, _) => {
                // sum-builder: group every operand's arcs by target first,
                // pre-merging their labels
                let mut by_target: FxHashMap<SddPtr, V> = FxHashMap::default();
                for &p in ops {
                    let arcs = match self.view(p) {
                        NodeView::Flat(v, arcs) if v == var => arcs,
                        _ => return Err(Error::top("union of nodes at different levels")),
                    };
                    for (values, succ) in arcs {
                        match by_target.entry(succ) {
                            Entry::Occupied(mut e) => {
                                let merged = e.get().union(&values);
                                e.insert(merged);
                            }
                            Entry::Vacant(e) => {
                                e.insert(values);
                            }
                        }
                    }
                }
                let mut parts: Vec<(V, SddPtr)> = Vec::new();
                for (succ, values) in by_target {
                    self.flat_partition_insert(&mut parts, values, succ)?;
                }
                Ok(self.mk_flat(var, parts))
            }
            NodeView::Hier(var, _) => {
                let mut by_target: FxHashMap<SddPtr, Vec<SddPtr>> = FxHashMap::default();
                for &p in ops {
                    let arcs = match self.view(p) {
                        NodeView::Hier(v, arcs) if v == var => arcs,
                        _ => return Err(Error::top("union of nodes at different levels")),
                    };
                    for (label, succ) in arcs {
                        by_target.entry(succ).or_default().push(label);
                    }
                }
                let grouped: Vec<(SddPtr, Vec<SddPtr>)> = by_target.into_iter().collect();
                let mut parts: Vec<(SddPtr, SddPtr)> = Vec::new();
                for (succ, labels) in grouped {
                    let label = self.union_many(labels)?;
                    self.hier_partition_insert(&mut parts, label, succ)?;
                }
                self.mk_hier(var, parts)
            }
            NodeView::Zero | NodeView::One => unreachable!("terminals filtered by union_many"),
        }
    }

    fn inter_nodes(&mut self, a: SddPtr, b: SddPtr) -> Result<SddPtr> {
        self.stats.num_rec += 1;
        match (self.view(a), self.view(b)) {
            (NodeView::Flat(va, arcs_a), NodeView::Flat(vb, arcs_b)) if va == vb => {
                let mut parts: Vec<(V, SddPtr)> = Vec::new();
                for (av, x) in &arcs_a {
                    for (bv, y) in &arcs_b {
                        let common = av.intersection(bv);
                        if common.is_empty() {
                            continue;
                        }
                        let t = self.inter(*x, *y)?;
                        if !t.is_zero() {
                            parts.push((common, t));
                        }
                    }
                }
                Ok(self.mk_flat(va, parts))
            }
            (NodeView::Hier(va, arcs_a), NodeView::Hier(vb, arcs_b)) if va == vb => {
                let mut parts: Vec<(SddPtr, SddPtr)> = Vec::new();
                for &(al, x) in &arcs_a {
                    for &(bl, y) in &arcs_b {
                        let common = self.inter(al, bl)?;
                        if common.is_zero() {
                            continue;
                        }
                        let t = self.inter(x, y)?;
                        if !t.is_zero() {
                            parts.push((common, t));
                        }
                    }
                }
                self.mk_hier(va, parts)
            }
            // incompatible levels share no tuple
            _ => Ok(SddPtr::ZERO),
        }
    }

    fn diff_nodes(&mut self, a: SddPtr, b: SddPtr) -> Result<SddPtr> {
        self.stats.num_rec += 1;
        match (self.view(a), self.view(b)) {
            (NodeView::Flat(va, arcs_a), NodeView::Flat(vb, arcs_b)) if va == vb => {
                let mut parts: Vec<(V, SddPtr)> = Vec::new();
                for (av, x) in &arcs_a {
                    let mut rest = av.clone();
                    for (bv, y) in &arcs_b {
                        let common = av.intersection(bv);
                        if common.is_empty() {
                            continue;
                        }
                        rest = rest.difference(bv);
                        let t = self.diff(*x, *y)?;
                        if !t.is_zero() {
                            parts.push((common, t));
                        }
                    }
                    if !rest.is_empty() {
                        parts.push((rest, *x));
                    }
                }
                Ok(self.mk_flat(va, parts))
            }
            (NodeView::Hier(va, arcs_a), NodeView::Hier(vb, arcs_b)) if va == vb => {
                let mut parts: Vec<(SddPtr, SddPtr)> = Vec::new();
                for &(al, x) in &arcs_a {
                    let mut rest = al;
                    for &(bl, y) in &arcs_b {
                        let common = self.inter(al, bl)?;
                        if common.is_zero() {
                            continue;
                        }
                        rest = self.diff(rest, bl)?;
                        let t = self.diff(x, y)?;
                        if !t.is_zero() {
                            parts.push((common, t));
                        }
                    }
                    if !rest.is_zero() {
                        parts.push((rest, x));
                    }
                }
                self.mk_hier(va, parts)
            }
            _ => Err(Error::top("difference of nodes at different levels")),
        }
    }

    /// Distribute `(label, succ)` over `parts`, keeping the labels of
    /// `parts` pairwise disjoint; overlaps union their targets recursively.
    fn flat_partition_insert(
        &mut self,
        parts: &mut Vec<(V, SddPtr)>,
        label: V,
        succ: SddPtr,
    ) -> Result<()> {
        let mut remaining = label;
        let mut i = 0;
        while i < parts.len() && !remaining.is_empty() {
            let (rl, rs) = parts[i].clone();
            let common = remaining.intersection(&rl);
            if !common.is_empty() {
                remaining = remaining.difference(&common);
                if rs != succ {
                    let merged = self.union(rs, succ)?;
                    let rest = rl.difference(&common);
                    if rest.is_empty() {
                        parts[i] = (common, merged);
                    } else {
                        parts[i] = (rest, rs);
                        parts.push((common, merged));
                    }
                }
            }
            i += 1;
        }
        if !remaining.is_empty() {
            parts.push((remaining, succ));
        }
        Ok(())
    }

    /// The hierarchical counterpart of [`Manager::flat_partition_insert`]:
    /// label arithmetic is itself diagram arithmetic on the nested level.
    fn hier_partition_insert(
        &mut self,
        parts: &mut Vec<(SddPtr, SddPtr)>,
        label: SddPtr,
        succ: SddPtr,
    ) -> Result<()> {
        let mut remaining = label;
        let mut i = 0;
        while i < parts.len() && !remaining.is_zero() {
            let (rl, rs) = parts[i];
            let common = self.inter(remaining, rl)?;
            if !common.is_zero() {
                remaining = self.diff(remaining, common)?;
                if rs != succ {
                    let merged = self.union(rs, succ)?;
                    let rest = self.diff(rl, common)?;
                    if rest.is_zero() {
                        parts[i] = (common, merged);
                    } else {
                        parts[i] = (rest, rs);
                        parts.push((common, merged));
                    }
                }
            }
            i += 1;
        }
        if !remaining.is_zero() {
            parts.push((remaining, succ));
        }
        Ok(())
    }

    /// Intern a flat node from disjoint parts: merge arcs sharing a target,
    /// sort by label, drop the node entirely if no arc remains.
    fn mk_flat(&mut self, var: Var, parts: Vec<(V, SddPtr)>) -> SddPtr {
        let mut by_target: FxHashMap<SddPtr, V> = FxHashMap::default();
        for (values, succ) in parts {
            debug_assert!(!values.is_empty() && !succ.is_zero());
            match by_target.entry(succ) {
                Entry::Occupied(mut e) => {
                    let merged = e.get().union(&values);
                    e.insert(merged);
                }
                Entry::Vacant(e) => {
                    e.insert(values);
                }
            }
        }
        if by_target.is_empty() {
            return SddPtr::ZERO;
        }
        let mut alpha: Vec<FlatArc<V>> = by_target
            .into_iter()
            .map(|(succ, values)| FlatArc::new(values, succ))
            .collect();
        alpha.sort_by(|a, b| a.values().cmp(b.values()));
        assert!(alpha.len() <= MAX_ARITY, "arc count overflow");
        self.intern_sdd(SddNode::Flat {
            var,
            alpha: alpha.into_boxed_slice(),
        })
    }

    fn mk_hier(&mut self, var: Var, parts: Vec<(SddPtr, SddPtr)>) -> Result<SddPtr> {
        let mut by_target: FxHashMap<SddPtr, Vec<SddPtr>> = FxHashMap::default();
        for (label, succ) in parts {
            debug_assert!(!label.is_zero() && !succ.is_zero());
            by_target.entry(succ).or_default().push(label);
        }
        if by_target.is_empty() {
            return Ok(SddPtr::ZERO);
        }
        let grouped: Vec<(SddPtr, Vec<SddPtr>)> = by_target.into_iter().collect();
        let mut alpha: Vec<HierArc> = Vec::with_capacity(grouped.len());
        for (succ, labels) in grouped {
            // labels here are disjoint parts of the same nested level
            let label = self.union_many(labels)?;
            alpha.push(HierArc::new(label, succ));
        }
        alpha.sort_by_key(|a| a.label());
        assert!(alpha.len() <= MAX_ARITY, "arc count overflow");
        Ok(self.intern_sdd(SddNode::Hier {
            var,
            alpha: alpha.into_boxed_slice(),
        }))
    }

    /// Number of paths from the root to `One`, one per arc regardless of how
    /// many values its label carries.
    pub fn count_paths(&self, x: SddPtr) -> BigUint {
        fn rec<V: Values>(
            mgr: &Manager<V>,
            x: SddPtr,
            memo: &mut FxHashMap<SddPtr, BigUint>,
        ) -> BigUint {
            if x.is_zero() {
                return BigUint::zero();
            }
            if x.is_one() {
                return BigUint::one();
            }
            if let Some(c) = memo.get(&x) {
                return c.clone();
            }
            let total: BigUint = match mgr.node(x) {
                SddNode::Flat { alpha, .. } => {
                    alpha.iter().map(|a| rec(mgr, a.succ(), memo)).sum()
                }
                SddNode::Hier { alpha, .. } => alpha
                    .iter()
                    .map(|a| rec(mgr, a.label(), memo) * rec(mgr, a.succ(), memo))
                    .sum(),
                SddNode::Zero | SddNode::One => unreachable!(),
            };
            memo.insert(x, total.clone());
            total
        }
        rec(self, x, &mut FxHashMap::default())
    }

    /// Number of tuples the diagram denotes.
    pub fn count_combinations(&self, x: SddPtr) -> BigUint {
        fn rec<V: Values>(
            mgr: &Manager<V>,
            x: SddPtr,
            memo: &mut FxHashMap<SddPtr, BigUint>,
        ) -> BigUint {
            if x.is_zero() {
                return BigUint::zero();
            }
            if x.is_one() {
                return BigUint::one();
            }
            if let Some(c) = memo.get(&x) {
                return c.clone();
            }
            let total: BigUint = match mgr.node(x) {
                SddNode::Flat { alpha, .. } => alpha
                    .iter()
                    .map(|a| BigUint::from(a.values().len()) * rec(mgr, a.succ(), memo))
                    .sum(),
                SddNode::Hier { alpha, .. } => alpha
                    .iter()
                    .map(|a| rec(mgr, a.label(), memo) * rec(mgr, a.succ(), memo))
                    .sum(),
                SddNode::Zero | SddNode::One => unreachable!(),
            };
            memo.insert(x, total.clone());
            total
        }
        rec(self, x, &mut FxHashMap::default())
    }

    /// Number of distinct non-terminal nodes in the diagram, nested levels
    /// included.
    pub fn sdd_size(&self, x: SddPtr) -> usize {
        fn visit<V: Values>(mgr: &Manager<V>, x: SddPtr, seen: &mut FxHashSet<SddPtr>) {
            if x.is_terminal() || !seen.insert(x) {
                return;
            }
            match mgr.node(x) {
                SddNode::Flat { alpha, .. } => {
                    for a in alpha.iter() {
                        visit(mgr, a.succ(), seen);
                    }
                }
                SddNode::Hier { alpha, .. } => {
                    for a in alpha.iter() {
                        visit(mgr, a.label(), seen);
                        visit(mgr, a.succ(), seen);
                    }
                }
                SddNode::Zero | SddNode::One => {}
            }
        }
        let mut seen = FxHashSet::default();
        visit(self, x, &mut seen);
        seen.len()
    }

    pub fn print_sdd(&self, x: SddPtr) -> String {
        match self.node(x) {
            SddNode::Zero => "0".to_string(),
            SddNode::One => "1".to_string(),
            SddNode::Flat { alpha, .. } => format!(
                "({})",
                alpha
                    .iter()
                    .map(|a| format!("{} -> {}", a.values(), self.print_sdd(a.succ())))
                    .join(", ")
            ),
            SddNode::Hier { alpha, .. } => format!(
                "({})",
                alpha
                    .iter()
                    .map(|a| format!("{} -> {}", self.print_sdd(a.label()), self.print_sdd(a.succ())))
                    .join(", ")
            ),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::values::Bitset;

    fn bs(vals: &[u32]) -> Bitset {
        vals.iter().copied().collect()
    }

    /// x = [a: {0,1} -> [b: {0} -> 1]]
    fn chain(mgr: &mut Manager<Bitset>) -> SddPtr {
        let one = mgr.one();
        let b = mgr.flat(Var::new(0), [(bs(&[0]), one)]).unwrap();
        mgr.flat(Var::new(1), [(bs(&[0, 1]), b)]).unwrap()
    }

    #[test]
    fn terminals_are_singletons() {
        let mgr: Manager<Bitset> = Manager::new();
        assert_ne!(mgr.zero(), mgr.one());
        assert!(mgr.zero().is_zero());
        assert!(mgr.one().is_one());
    }

    #[test]
    fn construction_is_canonical() {
        let mut mgr: Manager<Bitset> = Manager::new();
        let one = mgr.one();
        // same node built arc-by-arc in different orders
        let x = mgr
            .flat(Var::new(0), [(bs(&[0]), one), (bs(&[1]), one)])
            .unwrap();
        let y = mgr
            .flat(Var::new(0), [(bs(&[1]), one), (bs(&[0]), one)])
            .unwrap();
        assert_eq!(x, y);
        // arcs to the same target merge their labels
        let z = mgr.flat(Var::new(0), [(bs(&[0, 1]), one)]).unwrap();
        assert_eq!(x, z);
        // empty labels and zero targets vanish
        let w = mgr
            .flat(
                Var::new(0),
                [(bs(&[0, 1]), one), (Bitset::empty(), one), (bs(&[3]), SddPtr::ZERO)],
            )
            .unwrap();
        assert_eq!(w, z);
        let empty = mgr.flat(Var::new(0), []).unwrap();
        assert_eq!(empty, SddPtr::ZERO);
    }

    #[test]
    fn union_laws() {
        let mut mgr: Manager<Bitset> = Manager::new();
        let x = chain(&mut mgr);
        let zero = mgr.zero();
        assert_eq!(mgr.union(x, x).unwrap(), x);
        assert_eq!(mgr.union(x, zero).unwrap(), x);
        let one = mgr.one();
        let y = mgr.flat(Var::new(0), [(bs(&[2]), one)]).unwrap();
        let b = mgr.flat(Var::new(0), [(bs(&[0]), one)]).unwrap();
        let x2 = mgr.flat(Var::new(1), [(bs(&[2]), y), (bs(&[0]), b)]).unwrap();
        let u1 = mgr.union(x, x2).unwrap();
        let u2 = mgr.union(x2, x).unwrap();
        assert_eq!(u1, u2);
    }

    #[test]
    fn union_splits_overlapping_labels() {
        let mut mgr: Manager<Bitset> = Manager::new();
        let one = mgr.one();
        let s0 = mgr.flat(Var::new(0), [(bs(&[0]), one)]).unwrap();
        let s1 = mgr.flat(Var::new(0), [(bs(&[1]), one)]).unwrap();
        let a = mgr.flat(Var::new(1), [(bs(&[0, 1]), s0)]).unwrap();
        let b = mgr.flat(Var::new(1), [(bs(&[1, 2]), s1)]).unwrap();
        let u = mgr.union(a, b).unwrap();
        // {0} -> s0, {1} -> s0|s1, {2} -> s1
        let s01 = mgr.union(s0, s1).unwrap();
        let expected = mgr
            .flat(
                Var::new(1),
                [(bs(&[0]), s0), (bs(&[1]), s01), (bs(&[2]), s1)],
            )
            .unwrap();
        assert_eq!(u, expected);
        assert_eq!(mgr.count_paths(u), BigUint::from(3u32));
        assert_eq!(mgr.count_combinations(u), BigUint::from(4u32));
    }

    #[test]
    fn intersection_laws() {
        let mut mgr: Manager<Bitset> = Manager::new();
        let x = chain(&mut mgr);
        let zero = mgr.zero();
        assert_eq!(mgr.inter(x, x).unwrap(), x);
        assert_eq!(mgr.inter(x, zero).unwrap(), zero);
        let one = mgr.one();
        let b2 = mgr.flat(Var::new(0), [(bs(&[1]), one)]).unwrap();
        let y = mgr.flat(Var::new(1), [(bs(&[1, 2]), b2)]).unwrap();
        // x and y overlap on the top label but not below
        assert_eq!(mgr.inter(x, y).unwrap(), zero);
    }

    #[test]
    fn difference_laws() {
        let mut mgr: Manager<Bitset> = Manager::new();
        let x = chain(&mut mgr);
        let zero = mgr.zero();
        assert_eq!(mgr.diff(x, x).unwrap(), zero);
        assert_eq!(mgr.diff(x, zero).unwrap(), x);
        let one = mgr.one();
        let b = mgr.flat(Var::new(0), [(bs(&[0]), one)]).unwrap();
        let y = mgr.flat(Var::new(1), [(bs(&[0]), b)]).unwrap();
        let d = mgr.diff(x, y).unwrap();
        let expected = mgr.flat(Var::new(1), [(bs(&[1]), b)]).unwrap();
        assert_eq!(d, expected);
        let back = mgr.union(d, y).unwrap();
        assert_eq!(back, x);
    }

    #[test]
    fn mixed_levels_error() {
        let mut mgr: Manager<Bitset> = Manager::new();
        let one = mgr.one();
        let a = mgr.flat(Var::new(0), [(bs(&[0]), one)]).unwrap();
        let b = mgr.flat(Var::new(1), [(bs(&[0]), one)]).unwrap();
        assert!(matches!(mgr.union(a, b), Err(Error::Top { .. })));
        assert!(matches!(mgr.union(a, one), Err(Error::Top { .. })));
        assert_eq!(mgr.inter(a, b).unwrap(), SddPtr::ZERO);
        assert_eq!(mgr.inter(a, one).unwrap(), SddPtr::ZERO);
        assert!(matches!(mgr.diff(a, b), Err(Error::Top { .. })));
    }

    #[test]
    fn hierarchical_ops() {
        let mut mgr: Manager<Bitset> = Manager::new();
        let one = mgr.one();
        let l0 = mgr.flat(Var::new(0), [(bs(&[0]), one)]).unwrap();
        let l1 = mgr.flat(Var::new(0), [(bs(&[1]), one)]).unwrap();
        let l01 = mgr.union(l0, l1).unwrap();
        let h0 = mgr.hier(Var::new(1), [(l0, one)]).unwrap();
        let h1 = mgr.hier(Var::new(1), [(l1, one)]).unwrap();
        let u = mgr.union(h0, h1).unwrap();
        let expected = mgr.hier(Var::new(1), [(l01, one)]).unwrap();
        assert_eq!(u, expected);
        assert_eq!(mgr.inter(u, h0).unwrap(), h0);
        assert_eq!(mgr.diff(u, h1).unwrap(), h0);
        assert_eq!(mgr.count_paths(u), BigUint::one());
        assert_eq!(mgr.count_combinations(u), BigUint::from(2u32));
    }

    #[test]
    fn path_count_of_chain() {
        let mut mgr: Manager<Bitset> = Manager::new();
        let x = chain(&mut mgr);
        assert_eq!(mgr.count_paths(x), BigUint::one());
        assert_eq!(mgr.count_combinations(x), BigUint::from(2u32));
        assert_eq!(mgr.sdd_size(x), 2);
        assert_eq!(mgr.count_paths(mgr.zero()), BigUint::zero());
        assert_eq!(mgr.count_paths(mgr.one()), BigUint::one());
    }

    #[test]
    fn printed_forms() {
        let mut mgr: Manager<Bitset> = Manager::new();
        assert_eq!(mgr.print_sdd(SddPtr::ZERO), "0");
        assert_eq!(mgr.print_sdd(SddPtr::ONE), "1");
        let x = chain(&mut mgr);
        assert_eq!(mgr.print_sdd(x), "({0,1} -> ({0} -> 1))");
    }
}
