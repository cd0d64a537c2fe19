//! Contains the representations of the core datatypes: variables, orders,
//! SDD nodes and homomorphism nodes.

pub mod hom;
pub mod order;
pub mod sdd;
pub mod var_label;

pub use hom::{HomNode, HomPtr, InductiveHom, InductiveRef, ValuesFn, ValuesFnRef};
pub use order::Order;
pub use sdd::{FlatArc, HierArc, SddNode, SddPtr};
pub use var_label::Var;
