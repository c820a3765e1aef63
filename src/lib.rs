//! Ordered set of keys, indexed using a [left-leaning-red-black][llrb]
//! tree. Every node caches the size of its sub-tree, so that [`Llrb::len`]
//! is O(1).
//!
//! ```
//! use llrb_set::Llrb;
//!
//! let set = Llrb::build_from("primes", vec![7, 3, 5, 2, 3, 11]);
//! assert_eq!(set.len(), 5);
//! assert!(set.contains(&5));
//! assert_eq!(set.iter().collect::<Vec<i32>>(), vec![2, 3, 5, 7, 11]);
//! ```
//!
//! [llrb]: https://en.wikipedia.org/wiki/Left-leaning_red-black_tree

mod depth;
mod error;
mod llrb;
mod node;

pub use crate::depth::Depth;
pub use crate::error::LlrbError;
pub use crate::llrb::{Iter, Llrb, Range, Reverse, Stats};

#[cfg(test)]
mod llrb_test;
