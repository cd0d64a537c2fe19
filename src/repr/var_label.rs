//! A label for each distinct level variable in a diagram. Variables are
//! assigned by the order builder, never chosen by the user.

use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var(u32);

impl Var {
    #[inline]
    pub fn new(v: u32) -> Var {
        Var(v)
    }

    #[inline]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// The variable handed out to the first identifier added to an order.
    pub fn first() -> Var {
        Var(0)
    }

    /// The variable handed out after `self`. Orders grow head-ward, so the
    /// head of an order always carries the largest variable.
    pub fn next(&self) -> Var {
        Var(self.0.checked_add(1).expect("variable overflow"))
    }
}

impl Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}
