//! Lazily evaluated, restartable sequences with composable memoization.
//!
//! A [`LazySeq`] produces its elements on demand and may be traversed any
//! number of times. Base sequences wrap a producer ([`Lazy`]), an index
//! function ([`Indexed`]) or a realized collection ([`Materialized`]);
//! decorators add behavior on top of any sequence:
//!
//! * [`Mapped`] transforms elements as they are read,
//! * [`MemoizedLength`] caches the element count,
//! * [`Memoized`] caches the elements of the first complete traversal.
//!
//! Decorators stack, so `seq.map(f).memoize()` ([`MemoizedMapped`]) reads the
//! source and runs `f` exactly once per element, however often the result is
//! traversed afterwards.
//!
//! ```
//! use thinmodels_lazy_seq::{Lazy, LazySeq};
//!
//! let squares = Lazy::new(|| 1..=4).map_memoized(|n| n * n);
//! assert_eq!(squares.to_vec(), vec![1, 4, 9, 16]);
//! assert_eq!(squares.as_slice(), Some(&[1, 4, 9, 16][..]));
//! assert_eq!(squares.slice(3, 10), Some(vec![16]));
//! assert_eq!(squares.slice(5, 1), None);
//! ```

mod mapped;
mod memoized;
mod seq;
#[cfg(feature = "serde")]
mod serialize;
mod source;

#[cfg(test)]
mod probe;

pub use mapped::Mapped;
pub use memoized::{CountingIter, Memoized, MemoizedIter, MemoizedLength, MemoizedMapped};
pub use seq::LazySeq;
pub use source::{Indexed, Lazy, Materialized};
