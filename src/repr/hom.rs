//! The canonical representation of homomorphisms. Like SDD nodes, operator
//! nodes are interned in the manager's unique table and referenced by
//! handle; the builders in `builder::hom_builder` apply the algebraic
//! rewrites before interning.

use crate::builder::Manager;
use crate::repr::sdd::SddPtr;
use crate::repr::var_label::Var;
use crate::values::Values;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// A handle to an interned homomorphism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HomPtr(u32);

impl HomPtr {
    /// The identity operator.
    pub const IDENTITY: HomPtr = HomPtr(0);

    pub(crate) fn new(idx: u32) -> HomPtr {
        HomPtr(idx)
    }

    pub(crate) fn index(&self) -> u32 {
        self.0
    }

    pub fn is_identity(&self) -> bool {
        *self == HomPtr::IDENTITY
    }
}

/// A user strategy wrapped by the inductive homomorphism. For each arc of
/// the visited node the strategy returns the homomorphism to apply to the
/// arc's successor, one level below.
pub trait InductiveHom<V: Values>: Debug {
    /// True when the strategy ignores levels at `var` entirely.
    fn skip(&self, var: Var) -> bool;

    /// The homomorphism to apply below a flat arc labeled `values` at `var`.
    fn flat(&self, mgr: &mut Manager<V>, var: Var, values: &V) -> HomPtr;

    /// The homomorphism to apply below a hierarchical arc labeled `label` at
    /// `var`.
    fn hier(&self, mgr: &mut Manager<V>, var: Var, label: SddPtr) -> HomPtr;

    /// The image of the `One` terminal.
    fn terminal(&self, mgr: &mut Manager<V>) -> SddPtr;
}

/// A pure function over arc values, wrapped by the values-function
/// homomorphism. It must preserve the empty set.
pub trait ValuesFn<V: Values>: Debug {
    fn apply(&self, values: &V) -> V;

    /// True when `apply` always returns a subset of its input.
    fn selector(&self) -> bool {
        false
    }
}

/// Shared ownership of a user strategy. Two inductive homomorphisms are the
/// same operator exactly when they share the same allocation, so reuse the
/// `Rc` to share cache entries.
#[derive(Debug, Clone)]
pub struct InductiveRef<V: Values>(pub Rc<dyn InductiveHom<V>>);

impl<V: Values> PartialEq for InductiveRef<V> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<V: Values> Eq for InductiveRef<V> {}

impl<V: Values> Hash for InductiveRef<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as *const () as usize).hash(state);
    }
}

/// Shared ownership of a values function; identity follows the allocation,
/// as for [`InductiveRef`].
#[derive(Debug, Clone)]
pub struct ValuesFnRef<V: Values>(pub Rc<dyn ValuesFn<V>>);

impl<V: Values> PartialEq for ValuesFnRef<V> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<V: Values> Eq for ValuesFnRef<V> {}

impl<V: Values> Hash for ValuesFnRef<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as *const () as usize).hash(state);
    }
}

/// An interned homomorphism node.
///
/// Operand lists of `Sum` and `Intersection` are canonical: flattened,
/// sorted by handle and deduplicated. The saturation variants are produced
/// by `Manager::rewrite`, never directly by the user-facing builders.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HomNode<V: Values> {
    Identity,
    Constant(SddPtr),
    /// Prepend a flat arc `var: values` to the image of `next`.
    Cons {
        var: Var,
        values: V,
        next: HomPtr,
    },
    /// Prepend a hierarchical arc `var: label` to the image of `next`.
    HierCons {
        var: Var,
        label: SddPtr,
        next: HomPtr,
    },
    Sum(Box<[HomPtr]>),
    Intersection(Box<[HomPtr]>),
    /// `lhs` applied to the image of `rhs`.
    Composition {
        lhs: HomPtr,
        rhs: HomPtr,
    },
    Fixpoint(HomPtr),
    /// Apply `hom` inside the level identified by `identifier`.
    Local {
        identifier: String,
        hom: HomPtr,
    },
    Inductive(InductiveRef<V>),
    ValuesFunction {
        var: Var,
        f: ValuesFnRef<V>,
    },
    /// Saturation form of `Fixpoint(Sum(..))` at `var`: `forward` is the
    /// fixpoint of the operands that skip `var`, `local` the fixpoint of the
    /// operands local to `var`'s nested level, and `global` the remaining
    /// operands, interleaved until the whole loop is stable.
    SaturationFixpoint {
        var: Var,
        forward: HomPtr,
        global: Box<[HomPtr]>,
        local: HomPtr,
    },
    /// Saturation form of `Sum(..)` at `var`, with the same partition as
    /// `SaturationFixpoint` but applied once.
    SaturationSum {
        var: Var,
        forward: Option<HomPtr>,
        global: Box<[HomPtr]>,
        local: Option<HomPtr>,
    },
}
