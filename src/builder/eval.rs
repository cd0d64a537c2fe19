//! The homomorphism evaluation engine: dispatch on the operator variant,
//! memoization in the evaluation cache, the skip push-down that carries
//! operators past unrelated levels, and the saturation rewrite.

use super::sdd_builder::NodeView;
use super::{HomOp, Manager};
use crate::error::{Error, Result};
use crate::repr::hom::{HomNode, HomPtr};
use crate::repr::order::Order;
use crate::repr::sdd::SddPtr;
use crate::values::Values;
use log::{debug, trace};

impl<V: Values> Manager<V> {
    /// Evaluate `h` on `x` under the top-level order `o`.
    ///
    /// The evaluation cache is keyed by `(h, x)` only: within one session
    /// the order is a function of the operand, so it stays out of the key,
    /// and a session is tied to one top-level order. Evaluating under a
    /// different order opens a new session.
    pub fn eval(&mut self, h: HomPtr, o: &Order, x: SddPtr) -> Result<SddPtr> {
        let same = self.session.as_ref().map_or(false, |s| s.same(o));
        if !same {
            if self.session.is_some() {
                debug!("new top-level order, resetting the evaluation cache");
                self.hom_cache.clear();
            }
            self.session = Some(o.clone());
        }
        self.eval_rec(h, o, x)
    }

    pub(crate) fn eval_rec(&mut self, h: HomPtr, o: &Order, x: SddPtr) -> Result<SddPtr> {
        self.stats.num_eval += 1;
        // O(1) operators bypass the cache entirely
        match self.hom_node(h) {
            HomNode::Identity => return Ok(x),
            HomNode::Constant(c) => return Ok(*c),
            _ => {}
        }
        // cons is cheaper to redo than to cache
        let cacheable = !matches!(
            self.hom_node(h),
            HomNode::Cons { .. } | HomNode::HierCons { .. }
        );
        let key = HomOp { hom: h, sdd: x };
        if cacheable {
            if let Some(r) = self.hom_cache.lookup(&key) {
                return Ok(r);
            }
        } else {
            self.hom_cache.note_filtered();
        }
        match self.eval_dispatch(h, o, x) {
            Ok(r) => {
                if cacheable {
                    self.hom_cache.insert(key, r);
                }
                Ok(r)
            }
            Err(e) => {
                // errors are not cached and do not count
                if cacheable {
                    self.hom_cache.forget_miss();
                } else {
                    self.hom_cache.forget_filtered();
                }
                Err(e.add_step(self.print_hom(h)))
            }
        }
    }

    fn eval_dispatch(&mut self, h: HomPtr, o: &Order, x: SddPtr) -> Result<SddPtr> {
        if self.hom_skip(h, o) {
            return self.eval_skip(h, o, x);
        }
        let node = self.hom_node(h).clone();
        match node {
            HomNode::Identity | HomNode::Constant(_) => {
                unreachable!("terminal operators handled before dispatch")
            }
            HomNode::Cons { var, values, next } => {
                if !x.is_one() {
                    return Err(Error::ConsOnNonOne);
                }
                if o.is_empty() {
                    return Err(Error::InvariantViolation("cons below the order"));
                }
                let succ = self.eval_rec(next, &o.next(), x)?;
                self.flat(var, [(values, succ)])
            }
            HomNode::HierCons { var, label, next } => {
                if !x.is_one() {
                    return Err(Error::ConsOnNonOne);
                }
                if o.is_empty() {
                    return Err(Error::InvariantViolation("cons below the order"));
                }
                let succ = self.eval_rec(next, &o.next(), x)?;
                self.hier(var, [(label, succ)])
            }
            HomNode::Sum(ops) => {
                let mut results = Vec::with_capacity(ops.len());
                for op in ops.iter() {
                    results.push(self.eval_rec(*op, o, x)?);
                }
                self.union_many(results)
            }
            HomNode::Intersection(ops) => {
                let mut result = self.eval_rec(ops[0], o, x)?;
                for op in &ops[1..] {
                    if result.is_zero() {
                        break;
                    }
                    let r = self.eval_rec(*op, o, x)?;
                    result = self.inter(result, r)?;
                }
                Ok(result)
            }
            HomNode::Composition { lhs, rhs } => {
                let inner = self.eval_rec(rhs, o, x)?;
                self.eval_rec(lhs, o, inner)
            }
            HomNode::Fixpoint(inner) => {
                let mut x1 = x;
                let mut iterations = 0usize;
                loop {
                    let x2 = self.eval_rec(inner, o, x1)?;
                    iterations += 1;
                    // handle equality, O(1)
                    if x2 == x1 {
                        break;
                    }
                    x1 = x2;
                }
                trace!("fixpoint stable after {} iterations", iterations);
                Ok(x1)
            }
            HomNode::Local { hom, .. } => match self.view(x) {
                NodeView::Zero => Ok(SddPtr::ZERO),
                NodeView::One => Err(Error::InvariantViolation(
                    "local operator evaluated on a terminal",
                )),
                NodeView::Hier(var, arcs) => {
                    let nested = o.nested();
                    let mut new_arcs = Vec::with_capacity(arcs.len());
                    for (label, succ) in arcs {
                        let nl = self.eval_rec(hom, &nested, label)?;
                        new_arcs.push((nl, succ));
                    }
                    self.hier(var, new_arcs)
                }
                // a flat level has no nested diagrams: the local work lands
                // on the successors instead
                NodeView::Flat(var, arcs) => {
                    let next = o.next();
                    let mut new_arcs = Vec::with_capacity(arcs.len());
                    for (values, succ) in arcs {
                        let ns = self.eval_rec(hom, &next, succ)?;
                        new_arcs.push((values, ns));
                    }
                    self.flat(var, new_arcs)
                }
            },
            HomNode::Inductive(u) => match self.view(x) {
                NodeView::Zero => Ok(SddPtr::ZERO),
                NodeView::One => Ok(u.0.terminal(self)),
                NodeView::Flat(var, arcs) => {
                    let next = o.next();
                    let mut new_arcs = Vec::with_capacity(arcs.len());
                    for (values, succ) in arcs {
                        let nh = u.0.flat(self, var, &values);
                        let t = self.eval_rec(nh, &next, succ)?;
                        new_arcs.push((values, t));
                    }
                    self.flat(var, new_arcs)
                }
                NodeView::Hier(var, arcs) => {
                    let next = o.next();
                    let mut new_arcs = Vec::with_capacity(arcs.len());
                    for (label, succ) in arcs {
                        let nh = u.0.hier(self, var, label);
                        let t = self.eval_rec(nh, &next, succ)?;
                        new_arcs.push((label, t));
                    }
                    self.hier(var, new_arcs)
                }
            },
            HomNode::ValuesFunction { var, f } => match self.view(x) {
                NodeView::Zero => Ok(SddPtr::ZERO),
                NodeView::Flat(xvar, arcs) if xvar == var => {
                    let mapped: Vec<(V, SddPtr)> = arcs
                        .into_iter()
                        .map(|(values, succ)| (f.0.apply(&values), succ))
                        .collect();
                    self.flat(var, mapped)
                }
                _ => Err(Error::top("values function applied off its level")),
            },
            HomNode::SaturationFixpoint {
                forward,
                global,
                local,
                ..
            } => {
                let mut x1 = x;
                loop {
                    let x2 = x1;
                    x1 = self.eval_rec(forward, o, x1)?;
                    x1 = self.eval_rec(local, o, x1)?;
                    for g in global.iter() {
                        let r = self.eval_rec(*g, o, x1)?;
                        x1 = self.union(x1, r)?;
                    }
                    if x1 == x2 {
                        break;
                    }
                }
                Ok(x1)
            }
            HomNode::SaturationSum {
                forward,
                global,
                local,
                ..
            } => {
                let mut results = Vec::with_capacity(global.len() + 2);
                if let Some(f) = forward {
                    results.push(self.eval_rec(f, o, x)?);
                }
                if let Some(l) = local {
                    results.push(self.eval_rec(l, o, x)?);
                }
                for g in global.iter() {
                    results.push(self.eval_rec(*g, o, x)?);
                }
                self.union_many(results)
            }
        }
    }

    /// The skip push-down: `h` ignores the head level of `o`, so rebuild
    /// the node with `h` applied below every arc.
    fn eval_skip(&mut self, h: HomPtr, o: &Order, x: SddPtr) -> Result<SddPtr> {
        match self.view(x) {
            NodeView::Zero => Ok(SddPtr::ZERO),
            NodeView::One => Err(Error::InvariantViolation(
                "operator skipped past the terminal",
            )),
            NodeView::Flat(var, arcs) => {
                debug_assert_eq!(var, o.variable(), "operand level disagrees with the order");
                let next = o.next();
                let mut new_arcs = Vec::with_capacity(arcs.len());
                for (values, succ) in arcs {
                    let t = self.eval_rec(h, &next, succ)?;
                    new_arcs.push((values, t));
                }
                self.flat(var, new_arcs)
            }
            NodeView::Hier(var, arcs) => {
                debug_assert_eq!(var, o.variable(), "operand level disagrees with the order");
                let next = o.next();
                let mut new_arcs = Vec::with_capacity(arcs.len());
                for (label, succ) in arcs {
                    let t = self.eval_rec(h, &next, succ)?;
                    new_arcs.push((label, t));
                }
                self.hier(var, new_arcs)
            }
        }
    }

    /// Rewrite `h` against `o` into its saturation form: fixpoints of sums
    /// are split per level so that each level's fixpoint runs where its
    /// operands live, instead of re-traversing the whole diagram each
    /// round.
    pub fn rewrite(&mut self, o: &Order, h: HomPtr) -> Result<HomPtr> {
        if o.is_empty() {
            return Ok(h);
        }
        // an operator blind to this whole level is rewritten for the next
        if self.hom_skip(h, o) {
            return self.rewrite(&o.next(), h);
        }
        let node = self.hom_node(h).clone();
        match node {
            HomNode::Fixpoint(inner) => {
                if let HomNode::Sum(ops) = self.hom_node(inner).clone() {
                    let has_id = ops.iter().any(|op| op.is_identity());
                    if has_id {
                        let (forward_ops, local_ops, global_ops) = self.partition(&ops, o);
                        if !forward_ops.is_empty() || !local_ops.is_empty() {
                            let mut forward_ops = forward_ops;
                            forward_ops.push(self.identity());
                            let fsum = self.sum(&forward_ops)?;
                            let ffix = self.fixpoint(fsum);
                            let forward = self.rewrite(&o.next(), ffix)?;
                            let local = if local_ops.is_empty() {
                                self.identity()
                            } else {
                                let mut local_ops = local_ops;
                                local_ops.push(self.identity());
                                let lsum = self.sum(&local_ops)?;
                                let lfix = self.fixpoint(lsum);
                                let rewritten = self.rewrite(&o.nested(), lfix)?;
                                let id = o
                                    .identifier()
                                    .ok_or(Error::InvariantViolation(
                                        "local operands at an artificial level",
                                    ))?
                                    .to_string();
                                self.local(&id, rewritten)
                            };
                            return Ok(self.saturation_fixpoint(
                                o.variable(),
                                forward,
                                global_ops,
                                local,
                            ));
                        }
                    }
                }
                let inner = self.rewrite(o, inner)?;
                Ok(self.fixpoint(inner))
            }
            HomNode::Sum(ops) => {
                let (mut forward_ops, local_ops, global_ops) = self.partition(&ops, o);
                if forward_ops.is_empty() && local_ops.is_empty() {
                    return Ok(h);
                }
                // the identity skips, so it travels with the forward part
                if ops.iter().any(|op| op.is_identity()) {
                    forward_ops.push(self.identity());
                }
                let forward = if forward_ops.is_empty() {
                    None
                } else {
                    let fsum = self.sum(&forward_ops)?;
                    Some(self.rewrite(&o.next(), fsum)?)
                };
                let local = if local_ops.is_empty() {
                    None
                } else {
                    let lsum = self.sum(&local_ops)?;
                    let rewritten = self.rewrite(&o.nested(), lsum)?;
                    let id = o
                        .identifier()
                        .ok_or(Error::InvariantViolation(
                            "local operands at an artificial level",
                        ))?
                        .to_string();
                    Some(self.local(&id, rewritten))
                };
                Ok(self.saturation_sum(o.variable(), forward, global_ops, local))
            }
            HomNode::Composition { lhs, rhs } => {
                let l = self.rewrite(o, lhs)?;
                let r = self.rewrite(o, rhs)?;
                Ok(self.composition(l, r))
            }
            HomNode::Local { identifier, hom } => {
                // skip is false here, so the head level is this local's
                let inner = self.rewrite(&o.nested(), hom)?;
                Ok(self.local(&identifier, inner))
            }
            _ => Ok(h),
        }
    }

    /// Split sum operands by where they work relative to the head of `o`:
    /// operands that skip the level (forwarded below), operands local to the
    /// level's nested order, and the rest. The identity is dropped.
    fn partition(&self, ops: &[HomPtr], o: &Order) -> (Vec<HomPtr>, Vec<HomPtr>, Vec<HomPtr>) {
        let mut forward = Vec::new();
        let mut local = Vec::new();
        let mut global = Vec::new();
        for &op in ops {
            if op.is_identity() {
                continue;
            }
            if self.hom_skip(op, o) {
                forward.push(op);
            } else if let HomNode::Local { hom, .. } = self.hom_node(op) {
                // a non-skipping local is a local at the head identifier
                local.push(*hom);
            } else {
                global.push(op);
            }
        }
        (forward, local, global)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::values::Bitset;
    use std::rc::Rc;

    #[derive(Debug)]
    struct AddVal(u32);
    impl crate::repr::hom::ValuesFn<Bitset> for AddVal {
        fn apply(&self, values: &Bitset) -> Bitset {
            values.with(self.0)
        }
    }

    fn bs(vals: &[u32]) -> Bitset {
        vals.iter().copied().collect()
    }

    /// x = [a: {0,1} -> [b: {0} -> [c: {0} -> 1]]] over o = [a, b, c]
    fn setup(mgr: &mut Manager<Bitset>) -> (Order, SddPtr) {
        let o = Order::from_identifiers(["a", "b", "c"]);
        let one = mgr.one();
        let c = mgr
            .flat(o.next().next().variable(), [(bs(&[0]), one)])
            .unwrap();
        let b = mgr.flat(o.next().variable(), [(bs(&[0]), c)]).unwrap();
        let x = mgr.flat(o.variable(), [(bs(&[0, 1]), b)]).unwrap();
        (o, x)
    }

    #[test]
    fn identity_and_constant() {
        let mut mgr: Manager<Bitset> = Manager::new();
        let (o, x) = setup(&mut mgr);
        let id = mgr.identity();
        assert_eq!(mgr.eval(id, &o, x).unwrap(), x);
        let k = mgr.constant(x);
        assert_eq!(mgr.eval(k, &o, mgr.zero()).unwrap(), x);
    }

    #[test]
    fn cons_builds_the_chain() {
        let mut mgr: Manager<Bitset> = Manager::new();
        let (o, x) = setup(&mut mgr);
        let id = mgr.identity();
        let cc = mgr.cons(o.next().next().variable(), bs(&[0]), id);
        let cb = mgr.cons(o.next().variable(), bs(&[0]), cc);
        let ca = mgr.cons(o.variable(), bs(&[0, 1]), cb);
        let one = mgr.one();
        let built = mgr.eval(ca, &o, one).unwrap();
        assert_eq!(built, x);
    }

    #[test]
    fn cons_rejects_non_terminals() {
        let mut mgr: Manager<Bitset> = Manager::new();
        let (o, x) = setup(&mut mgr);
        let id = mgr.identity();
        let c = mgr.cons(o.variable(), bs(&[0]), id);
        assert_eq!(mgr.eval(c, &o, x), Err(Error::ConsOnNonOne));
    }

    #[test]
    fn skip_invariance() {
        let mut mgr: Manager<Bitset> = Manager::new();
        let (o, x) = setup(&mut mgr);
        // f works at c only, so at the head it must push below each arc
        let f = mgr.values_function(o.next().next().variable(), Rc::new(AddVal(1)));
        assert!(mgr.hom_skip(f, &o));
        let direct = mgr.eval(f, &o, x).unwrap();
        let arcs: Vec<(Bitset, SddPtr)> = match mgr.view(x) {
            NodeView::Flat(_, arcs) => arcs,
            _ => unreachable!(),
        };
        let mut pushed = Vec::new();
        for (values, succ) in arcs {
            let t = mgr.eval_rec(f, &o.next(), succ).unwrap();
            pushed.push((values, t));
        }
        let rebuilt = mgr.flat(o.variable(), pushed).unwrap();
        assert_eq!(direct, rebuilt);
    }

    #[test]
    fn evaluation_errors_carry_steps() {
        let mut mgr: Manager<Bitset> = Manager::new();
        let (o, x) = setup(&mut mgr);
        let id = mgr.identity();
        let b = mgr
            .flat(o.next().variable(), [(bs(&[0]), mgr.one())])
            .unwrap();
        let k = mgr.constant(b);
        let s = mgr.sum(&[id, k]).unwrap();
        match mgr.eval(s, &o, x) {
            Err(Error::Top { .. }) => {
                let err = mgr.eval(s, &o, x).unwrap_err();
                assert!(!err.steps().is_empty());
            }
            other => panic!("expected a top error, got {:?}", other),
        }
    }

    #[test]
    fn results_do_not_depend_on_the_caches() {
        let mut mgr: Manager<Bitset> = Manager::new();
        let (o, x) = setup(&mut mgr);
        let id = mgr.identity();
        let f = mgr.values_function(o.next().next().variable(), Rc::new(AddVal(3)));
        let s = mgr.sum(&[id, f]).unwrap();
        let h = mgr.fixpoint(s);
        let cached = mgr.eval(h, &o, x).unwrap();
        mgr.clear_caches();
        mgr.set_cache_enabled(false);
        let uncached = mgr.eval(h, &o, x).unwrap();
        assert_eq!(cached, uncached);
    }

    #[test]
    fn evaluation_is_memoized() {
        let mut mgr: Manager<Bitset> = Manager::new();
        let (o, x) = setup(&mut mgr);
        let f = mgr.values_function(o.next().next().variable(), Rc::new(AddVal(1)));
        let r1 = mgr.eval(f, &o, x).unwrap();
        let hits_before = mgr.hom_cache_stats().total().hits;
        let r2 = mgr.eval(f, &o, x).unwrap();
        assert_eq!(r1, r2);
        assert!(mgr.hom_cache_stats().total().hits > hits_before);
    }
}
