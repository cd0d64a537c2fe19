//! The canonical representation of hierarchical set decision diagrams. Every
//! node lives in the manager's unique table; an [`SddPtr`] is its stable
//! handle, and handle equality coincides with semantic equality.

use crate::repr::var_label::Var;
use crate::values::Values;

/// A handle to an interned SDD node. Comparing handles compares the sets the
/// diagrams denote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SddPtr(u32);

impl SddPtr {
    /// The diagram of the empty set.
    pub const ZERO: SddPtr = SddPtr(0);

    /// The diagram of the set containing the empty tuple.
    pub const ONE: SddPtr = SddPtr(1);

    pub(crate) fn new(idx: u32) -> SddPtr {
        SddPtr(idx)
    }

    pub(crate) fn index(&self) -> u32 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == SddPtr::ZERO
    }

    pub fn is_one(&self) -> bool {
        *self == SddPtr::ONE
    }

    pub fn is_terminal(&self) -> bool {
        self.is_zero() || self.is_one()
    }
}

/// An arc of a flat node: a non-empty set of values and a successor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlatArc<V> {
    values: V,
    succ: SddPtr,
}

impl<V: Values> FlatArc<V> {
    pub fn new(values: V, succ: SddPtr) -> FlatArc<V> {
        FlatArc { values, succ }
    }

    pub fn values(&self) -> &V {
        &self.values
    }

    pub fn succ(&self) -> SddPtr {
        self.succ
    }
}

/// An arc of a hierarchical node: a non-empty nested diagram and a successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HierArc {
    label: SddPtr,
    succ: SddPtr,
}

impl HierArc {
    pub fn new(label: SddPtr, succ: SddPtr) -> HierArc {
        HierArc { label, succ }
    }

    pub fn label(&self) -> SddPtr {
        self.label
    }

    pub fn succ(&self) -> SddPtr {
        self.succ
    }
}

/// An interned SDD node.
///
/// Construction invariants, enforced by the manager's node builders:
/// arc lists are never empty, no arc leads to `Zero`, no arc label is empty
/// (or `Zero` for hierarchical nodes), labels are pairwise disjoint, arcs
/// sharing a target are merged, and arcs are sorted by label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SddNode<V> {
    Zero,
    One,
    Flat { var: Var, alpha: Box<[FlatArc<V>]> },
    Hier { var: Var, alpha: Box<[HierArc]> },
}

impl<V: Values> SddNode<V> {
    /// The variable of this node's level; `None` for the terminals.
    pub fn var(&self) -> Option<Var> {
        match self {
            SddNode::Zero | SddNode::One => None,
            SddNode::Flat { var, .. } | SddNode::Hier { var, .. } => Some(*var),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SddNode::Zero | SddNode::One)
    }

    /// Number of arcs; 0 for the terminals.
    pub fn num_arcs(&self) -> usize {
        match self {
            SddNode::Zero | SddNode::One => 0,
            SddNode::Flat { alpha, .. } => alpha.len(),
            SddNode::Hier { alpha, .. } => alpha.len(),
        }
    }
}
