//! Constructors of the homomorphism algebra. Every builder first applies
//! its algebraic rewrites, then interns: two equivalent constructions hand
//! back the same handle, which is what makes the evaluation cache effective.

use super::{Manager, MAX_ARITY};
use crate::error::{Error, Result};
use crate::repr::hom::{HomNode, HomPtr, InductiveHom, InductiveRef, ValuesFn, ValuesFnRef};
use crate::repr::order::Order;
use crate::repr::sdd::SddPtr;
use crate::repr::var_label::Var;
use crate::values::Values;
use itertools::Itertools;
use rustc_hash::FxHashMap;
use std::rc::Rc;

impl<V: Values> Manager<V> {
    /// The identity operator.
    pub fn identity(&self) -> HomPtr {
        HomPtr::IDENTITY
    }

    /// The operator mapping everything to `x`.
    pub fn constant(&mut self, x: SddPtr) -> HomPtr {
        self.intern_hom(HomNode::Constant(x))
    }

    /// Prepend the flat arc `var: values` to the image of `next`. An empty
    /// label can never carry a tuple, so the operator collapses to the
    /// constant `Zero`.
    pub fn cons(&mut self, var: Var, values: V, next: HomPtr) -> HomPtr {
        if values.is_empty() {
            return self.constant(SddPtr::ZERO);
        }
        self.intern_hom(HomNode::Cons { var, values, next })
    }

    /// Prepend the hierarchical arc `var: label` to the image of `next`.
    pub fn hier_cons(&mut self, var: Var, label: SddPtr, next: HomPtr) -> HomPtr {
        if label.is_zero() {
            return self.constant(SddPtr::ZERO);
        }
        self.intern_hom(HomNode::HierCons { var, label, next })
    }

    /// Sum of operators: `(h1 + h2)(x) = h1(x) ∪ h2(x)`.
    ///
    /// Nested sums are flattened, operands working on the same local level
    /// are regrouped under a single local operator (saturation does not
    /// terminate without this), operands are sorted and deduplicated, and a
    /// singleton sum is unwrapped.
    pub fn sum(&mut self, ops: &[HomPtr]) -> Result<HomPtr> {
        if ops.is_empty() {
            return Err(Error::EmptyOperandList);
        }
        let mut operands: Vec<HomPtr> = Vec::new();
        let mut locals: FxHashMap<String, Vec<HomPtr>> = FxHashMap::default();
        let mut worklist: Vec<HomPtr> = ops.to_vec();
        while let Some(h) = worklist.pop() {
            match self.hom_node(h) {
                HomNode::Sum(inner) => worklist.extend(inner.iter().copied()),
                HomNode::Local { identifier, hom } => {
                    locals.entry(identifier.clone()).or_default().push(*hom)
                }
                _ => operands.push(h),
            }
        }
        // regroup the locals: one local operator per identifier
        let mut grouped: Vec<(String, Vec<HomPtr>)> = locals.into_iter().collect();
        grouped.sort_by(|a, b| a.0.cmp(&b.0));
        for (id, homs) in grouped {
            let inner = self.sum(&homs)?;
            operands.push(self.local(&id, inner));
        }
        operands.sort_unstable();
        operands.dedup();
        if operands.len() == 1 {
            return Ok(operands[0]);
        }
        assert!(operands.len() <= MAX_ARITY, "operand count overflow");
        Ok(self.intern_hom(HomNode::Sum(operands.into_boxed_slice())))
    }

    /// Intersection of operators: `(h1 & h2)(x) = h1(x) ∩ h2(x)`. The
    /// canonicalization mirrors [`Manager::sum`].
    pub fn intersection(&mut self, ops: &[HomPtr]) -> Result<HomPtr> {
        if ops.is_empty() {
            return Err(Error::EmptyOperandList);
        }
        let mut operands: Vec<HomPtr> = Vec::new();
        let mut locals: FxHashMap<String, Vec<HomPtr>> = FxHashMap::default();
        let mut worklist: Vec<HomPtr> = ops.to_vec();
        while let Some(h) = worklist.pop() {
            match self.hom_node(h) {
                HomNode::Intersection(inner) => worklist.extend(inner.iter().copied()),
                HomNode::Local { identifier, hom } => {
                    locals.entry(identifier.clone()).or_default().push(*hom)
                }
                _ => operands.push(h),
            }
        }
        let mut grouped: Vec<(String, Vec<HomPtr>)> = locals.into_iter().collect();
        grouped.sort_by(|a, b| a.0.cmp(&b.0));
        for (id, homs) in grouped {
            let inner = self.intersection(&homs)?;
            operands.push(self.local(&id, inner));
        }
        operands.sort_unstable();
        operands.dedup();
        if operands.len() == 1 {
            return Ok(operands[0]);
        }
        assert!(operands.len() <= MAX_ARITY, "operand count overflow");
        Ok(self.intern_hom(HomNode::Intersection(operands.into_boxed_slice())))
    }

    /// `composition(f, g)(x) = f(g(x))`.
    pub fn composition(&mut self, f: HomPtr, g: HomPtr) -> HomPtr {
        if f.is_identity() {
            return g;
        }
        if g.is_identity() {
            return f;
        }
        // a constant absorbs whatever ran before it
        if matches!(self.hom_node(f), HomNode::Constant(_)) {
            return f;
        }
        self.intern_hom(HomNode::Composition { lhs: f, rhs: g })
    }

    /// Apply `h` until the result is stable.
    pub fn fixpoint(&mut self, h: HomPtr) -> HomPtr {
        if h.is_identity() {
            return h;
        }
        let local_parts = match self.hom_node(h) {
            HomNode::Fixpoint(_) => return h,
            // a fixpoint of purely local work is local fixpoint work
            HomNode::Local { identifier, hom } => Some((identifier.clone(), *hom)),
            _ => None,
        };
        if let Some((id, hom)) = local_parts {
            let inner = self.fixpoint(hom);
            return self.local(&id, inner);
        }
        self.intern_hom(HomNode::Fixpoint(h))
    }

    /// Apply `h` inside the level identified by `identifier`.
    pub fn local(&mut self, identifier: &str, h: HomPtr) -> HomPtr {
        if h.is_identity() {
            return h;
        }
        self.intern_hom(HomNode::Local {
            identifier: identifier.to_string(),
            hom: h,
        })
    }

    /// Wrap a user strategy; see [`InductiveHom`].
    pub fn inductive(&mut self, u: Rc<dyn InductiveHom<V>>) -> HomPtr {
        self.intern_hom(HomNode::Inductive(InductiveRef(u)))
    }

    /// Apply a pure function to every arc label at `var`; see [`ValuesFn`].
    pub fn values_function(&mut self, var: Var, f: Rc<dyn ValuesFn<V>>) -> HomPtr {
        self.intern_hom(HomNode::ValuesFunction {
            var,
            f: ValuesFnRef(f),
        })
    }

    pub(crate) fn saturation_fixpoint(
        &mut self,
        var: Var,
        forward: HomPtr,
        mut global: Vec<HomPtr>,
        local: HomPtr,
    ) -> HomPtr {
        global.sort_unstable();
        global.dedup();
        assert!(global.len() <= MAX_ARITY, "operand count overflow");
        self.intern_hom(HomNode::SaturationFixpoint {
            var,
            forward,
            global: global.into_boxed_slice(),
            local,
        })
    }

    pub(crate) fn saturation_sum(
        &mut self,
        var: Var,
        forward: Option<HomPtr>,
        mut global: Vec<HomPtr>,
        local: Option<HomPtr>,
    ) -> HomPtr {
        global.sort_unstable();
        global.dedup();
        assert!(global.len() <= MAX_ARITY, "operand count overflow");
        self.intern_hom(HomNode::SaturationSum {
            var,
            forward,
            global: global.into_boxed_slice(),
            local,
        })
    }

    /// The skip predicate: true when `h` does not inspect the head level of
    /// `o` and may be pushed down into the children of its operand.
    pub fn hom_skip(&self, h: HomPtr, o: &Order) -> bool {
        if o.is_empty() {
            return false;
        }
        match self.hom_node(h) {
            HomNode::Identity => true,
            HomNode::Constant(_) => false,
            HomNode::Cons { .. } | HomNode::HierCons { .. } => false,
            HomNode::Sum(ops) | HomNode::Intersection(ops) => {
                ops.iter().all(|op| self.hom_skip(*op, o))
            }
            HomNode::Composition { lhs, rhs } => {
                self.hom_skip(*lhs, o) && self.hom_skip(*rhs, o)
            }
            HomNode::Fixpoint(inner) => self.hom_skip(*inner, o),
            HomNode::Local { identifier, .. } => {
                o.identifier() != Some(identifier.as_str())
            }
            HomNode::Inductive(u) => u.0.skip(o.variable()),
            HomNode::ValuesFunction { var, .. } => o.variable() != *var,
            HomNode::SaturationFixpoint { var, .. } | HomNode::SaturationSum { var, .. } => {
                o.variable() != *var
            }
        }
    }

    /// The selector predicate: true when `h(o, x) ⊆ x` for every `x`.
    pub fn hom_selector(&self, h: HomPtr) -> bool {
        match self.hom_node(h) {
            HomNode::Identity => true,
            HomNode::Constant(_) => false,
            HomNode::Cons { .. } | HomNode::HierCons { .. } => false,
            HomNode::Sum(ops) => ops.iter().all(|op| self.hom_selector(*op)),
            // one shrinking operand bounds the whole intersection
            HomNode::Intersection(ops) => ops.iter().any(|op| self.hom_selector(*op)),
            HomNode::Composition { lhs, rhs } => {
                self.hom_selector(*lhs) && self.hom_selector(*rhs)
            }
            HomNode::Fixpoint(inner) => self.hom_selector(*inner),
            HomNode::Local { hom, .. } => self.hom_selector(*hom),
            HomNode::Inductive(_) => false,
            HomNode::ValuesFunction { f, .. } => f.0.selector(),
            HomNode::SaturationFixpoint {
                forward,
                global,
                local,
                ..
            } => {
                self.hom_selector(*forward)
                    && self.hom_selector(*local)
                    && global.iter().all(|op| self.hom_selector(*op))
            }
            HomNode::SaturationSum {
                forward,
                global,
                local,
                ..
            } => {
                forward.map_or(true, |f| self.hom_selector(f))
                    && local.map_or(true, |l| self.hom_selector(l))
                    && global.iter().all(|op| self.hom_selector(*op))
            }
        }
    }

    pub fn print_hom(&self, h: HomPtr) -> String {
        match self.hom_node(h) {
            HomNode::Identity => "Id".to_string(),
            HomNode::Constant(c) => self.print_sdd(*c),
            HomNode::Cons { var, values, next } => {
                format!("cons({}, {}, {})", var, values, self.print_hom(*next))
            }
            HomNode::HierCons { var, label, next } => format!(
                "cons({}, {}, {})",
                var,
                self.print_sdd(*label),
                self.print_hom(*next)
            ),
            HomNode::Sum(ops) => {
                format!("({})", ops.iter().map(|op| self.print_hom(*op)).join(" + "))
            }
            HomNode::Intersection(ops) => {
                format!("({})", ops.iter().map(|op| self.print_hom(*op)).join(" & "))
            }
            HomNode::Composition { lhs, rhs } => {
                format!("{} ∘ {}", self.print_hom(*lhs), self.print_hom(*rhs))
            }
            HomNode::Fixpoint(inner) => format!("({})*", self.print_hom(*inner)),
            HomNode::Local { identifier, hom } => {
                format!("@{}({})", identifier, self.print_hom(*hom))
            }
            HomNode::Inductive(u) => format!("ind({:?})", u.0),
            HomNode::ValuesFunction { var, f } => format!("fun({}, {:?})", var, f.0),
            HomNode::SaturationFixpoint {
                var,
                forward,
                global,
                local,
            } => {
                let mut parts = vec![self.print_hom(*forward)];
                parts.extend(global.iter().map(|op| self.print_hom(*op)));
                if !local.is_identity() {
                    parts.push(self.print_hom(*local));
                }
                format!("sat{}({})*", var, parts.join(" + "))
            }
            HomNode::SaturationSum {
                var,
                forward,
                global,
                local,
            } => {
                let mut parts: Vec<String> = Vec::new();
                if let Some(f) = forward {
                    parts.push(self.print_hom(*f));
                }
                parts.extend(global.iter().map(|op| self.print_hom(*op)));
                if let Some(l) = local {
                    parts.push(self.print_hom(*l));
                }
                format!("sat{}({})", var, parts.join(" + "))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::values::Bitset;

    #[derive(Debug)]
    struct AddTwo;
    impl ValuesFn<Bitset> for AddTwo {
        fn apply(&self, values: &Bitset) -> Bitset {
            values.with(2)
        }
    }

    #[test]
    fn fixpoint_rewrites() {
        let mut mgr: Manager<Bitset> = Manager::new();
        let id = mgr.identity();
        assert_eq!(mgr.fixpoint(id), id);
        let f = mgr.values_function(Var::new(0), Rc::new(AddTwo));
        let star = mgr.fixpoint(f);
        assert_eq!(mgr.fixpoint(star), star);
        // fixpoint of local work commutes to a local fixpoint
        let l = mgr.local("a", f);
        let lf = mgr.fixpoint(l);
        let expected_inner = mgr.fixpoint(f);
        let expected = mgr.local("a", expected_inner);
        assert_eq!(lf, expected);
    }

    #[test]
    fn sum_canonicalizes() {
        let mut mgr: Manager<Bitset> = Manager::new();
        let id = mgr.identity();
        let f = mgr.values_function(Var::new(0), Rc::new(AddTwo));
        // flattening, deduplication, commutativity
        let s1 = mgr.sum(&[f, id]).unwrap();
        let s2 = mgr.sum(&[id, f, id]).unwrap();
        assert_eq!(s1, s2);
        let nested = mgr.sum(&[s1, f]).unwrap();
        assert_eq!(nested, s1);
        // a singleton sum is its operand
        assert_eq!(mgr.sum(&[f]).unwrap(), f);
        assert_eq!(mgr.sum(&[]), Err(Error::EmptyOperandList));
    }

    #[test]
    fn sum_regroups_locals() {
        let mut mgr: Manager<Bitset> = Manager::new();
        let f1 = mgr.values_function(Var::new(0), Rc::new(AddTwo));
        let f2 = mgr.values_function(Var::new(1), Rc::new(AddTwo));
        let l1 = mgr.local("b", f1);
        let l2 = mgr.local("b", f2);
        let s = mgr.sum(&[l1, l2]).unwrap();
        let inner = mgr.sum(&[f1, f2]).unwrap();
        let expected = mgr.local("b", inner);
        assert_eq!(s, expected);
        assert!(matches!(
            mgr.hom_node(s),
            HomNode::Local { identifier, .. } if identifier == "b"
        ));
    }

    #[test]
    fn composition_rewrites() {
        let mut mgr: Manager<Bitset> = Manager::new();
        let id = mgr.identity();
        let f = mgr.values_function(Var::new(0), Rc::new(AddTwo));
        assert_eq!(mgr.composition(id, f), f);
        assert_eq!(mgr.composition(f, id), f);
        let k = mgr.constant(SddPtr::ONE);
        assert_eq!(mgr.composition(k, f), k);
    }

    #[test]
    fn local_of_identity_is_identity() {
        let mut mgr: Manager<Bitset> = Manager::new();
        let id = mgr.identity();
        assert_eq!(mgr.local("a", id), id);
    }

    #[test]
    fn cons_of_empty_label_is_zero() {
        let mut mgr: Manager<Bitset> = Manager::new();
        let id = mgr.identity();
        let c = mgr.cons(Var::new(0), Bitset::empty(), id);
        assert!(matches!(mgr.hom_node(c), HomNode::Constant(x) if x.is_zero()));
    }

    #[test]
    fn printed_forms() {
        let mut mgr: Manager<Bitset> = Manager::new();
        let id = mgr.identity();
        let f = mgr.values_function(Var::new(0), Rc::new(AddTwo));
        let s = mgr.sum(&[f, id]).unwrap();
        let printed = mgr.print_hom(s);
        assert!(printed.starts_with('(') && printed.contains(" + ") && printed.ends_with(')'));
        let star = mgr.fixpoint(f);
        assert!(mgr.print_hom(star).ends_with(")*"));
        let l = mgr.local("a", f);
        assert!(mgr.print_hom(l).starts_with("@a("));
        let k = mgr.constant(SddPtr::ZERO);
        let comp = mgr.composition(f, k);
        assert!(mgr.print_hom(comp).contains(" ∘ "));
    }

    #[test]
    fn skip_and_selector() {
        let mut mgr: Manager<Bitset> = Manager::new();
        let o = Order::from_identifiers(["a", "b"]);
        let id = mgr.identity();
        assert!(mgr.hom_skip(id, &o));
        assert!(mgr.hom_selector(id));
        // a values function skips every level but its own
        let top = o.variable();
        let below = o.next().variable();
        let f_top = mgr.values_function(top, Rc::new(AddTwo));
        let f_below = mgr.values_function(below, Rc::new(AddTwo));
        assert!(!mgr.hom_skip(f_top, &o));
        assert!(mgr.hom_skip(f_below, &o));
        // locals skip everywhere except their identifier
        let l = mgr.local("b", f_below);
        assert!(mgr.hom_skip(l, &o));
        assert!(!mgr.hom_skip(l, &o.next()));
        // sums skip when every operand does
        let s1 = mgr.sum(&[f_below, id]).unwrap();
        assert!(mgr.hom_skip(s1, &o));
        let s2 = mgr.sum(&[f_top, f_below]).unwrap();
        assert!(!mgr.hom_skip(s2, &o));
        // selectors
        assert!(!mgr.hom_selector(f_top));
        let k = mgr.constant(SddPtr::ONE);
        assert!(!mgr.hom_selector(k));
        let i = mgr.intersection(&[f_top, id]).unwrap();
        assert!(mgr.hom_selector(i));
    }
}
