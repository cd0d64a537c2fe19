//! `hsdd` is a library for symbolic manipulation of very large structured
//! sets of tuples, represented as hierarchical set decision diagrams. Every
//! node is hash-consed, so comparing two diagrams (and detecting the
//! convergence of a fixpoint) is a handle comparison. Diagrams are
//! transformed by *homomorphisms*, a composable operator algebra evaluated
//! under a variable order with memoization.
//!
//! ```
//! use hsdd::{Bitset, Manager, Order};
//!
//! let mut mgr: Manager<Bitset> = Manager::new();
//! let o = Order::from_identifiers(["a", "b"]);
//! let one = mgr.one();
//! let b = mgr.flat(o.next().variable(), [(Bitset::singleton(0), one)]).unwrap();
//! let x = mgr.flat(o.variable(), [(Bitset::singleton(1), b)]).unwrap();
//! assert_eq!(mgr.union(x, x).unwrap(), x);
//! ```

pub mod backing_store;
pub mod builder;
pub mod error;
pub mod repr;
pub mod values;

pub use builder::Manager;
pub use error::{Error, Result};
pub use repr::{HomNode, HomPtr, InductiveHom, Order, SddNode, SddPtr, ValuesFn, Var};
pub use values::{Bitset, FlatSet, Values};
