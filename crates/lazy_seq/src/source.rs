//! Base sequences that wrap a producer.

use core::fmt;
use core::iter::{Cloned, Map};
use core::ops::Range;

use crate::seq::{LazySeq, window};

/// A sequence backed by a producer closure that yields a fresh iterable on
/// every traversal.
///
/// Neither length nor slicing are known in advance, so both use the default
/// linear traversal.
///
/// ```
/// use thinmodels_lazy_seq::{Lazy, LazySeq};
///
/// let seq = Lazy::new(|| 1..=3);
/// assert_eq!(seq.slice(1, 5), Some(vec![2, 3]));
/// assert_eq!(seq.slice(4, 1), None);
/// ```
#[derive(Clone)]
pub struct Lazy<F> {
	producer: F,
}

impl<F, I> Lazy<F>
where
	F: Fn() -> I,
	I: IntoIterator,
{
	pub fn new(producer: F) -> Self {
		Self { producer }
	}
}

impl<F, I> LazySeq for Lazy<F>
where
	F: Fn() -> I,
	I: IntoIterator,
{
	type Item = I::Item;
	type Iter<'a>
		= I::IntoIter
	where
		Self: 'a;

	fn iter(&self) -> Self::Iter<'_> {
		(self.producer)().into_iter()
	}
}

impl<F> fmt::Debug for Lazy<F> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("[LazySeq:...]")
	}
}

/// A random-access sequence of known length whose elements are computed on
/// demand from their index.
///
/// Length and slicing never traverse: `len` is stored and `slice` only
/// evaluates the indices inside the window.
#[derive(Clone)]
pub struct Indexed<F> {
	len: usize,
	at: F,
}

impl<F, T> Indexed<F>
where
	F: Fn(usize) -> T,
{
	pub fn new(len: usize, at: F) -> Self {
		Self { len, at }
	}
}

impl<F, T> LazySeq for Indexed<F>
where
	F: Fn(usize) -> T,
{
	type Item = T;
	type Iter<'a>
		= Map<Range<usize>, &'a F>
	where
		Self: 'a;

	fn iter(&self) -> Self::Iter<'_> {
		(0..self.len).map(&self.at)
	}

	fn len(&self) -> usize {
		self.len
	}

	fn is_empty(&self) -> bool {
		self.len == 0
	}

	fn slice(&self, start: usize, length: usize) -> Option<Vec<T>> {
		if start > self.len {
			return None;
		}
		let end = start.saturating_add(length).min(self.len);
		Some((start..end).map(&self.at).collect())
	}
}

impl<F> fmt::Debug for Indexed<F> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[LazySeq(length={}):...]", self.len)
	}
}

/// An already realized collection viewed as a sequence.
///
/// Length is O(1) and slices are cut straight from the stored elements.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Materialized<T> {
	items: Vec<T>,
}

impl<T> Materialized<T> {
	pub fn new(items: Vec<T>) -> Self {
		Self { items }
	}

	pub fn as_slice(&self) -> &[T] {
		&self.items
	}

	pub fn into_inner(self) -> Vec<T> {
		self.items
	}
}

impl<T> From<Vec<T>> for Materialized<T> {
	fn from(items: Vec<T>) -> Self {
		Self::new(items)
	}
}

impl<T> FromIterator<T> for Materialized<T> {
	fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
		Self::new(iter.into_iter().collect())
	}
}

impl<T: Clone> LazySeq for Materialized<T> {
	type Item = T;
	type Iter<'a>
		= Cloned<core::slice::Iter<'a, T>>
	where
		Self: 'a;

	fn iter(&self) -> Self::Iter<'_> {
		self.items.as_slice().iter().cloned()
	}

	fn len(&self) -> usize {
		self.items.len()
	}

	fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	fn slice(&self, start: usize, length: usize) -> Option<Vec<T>> {
		window(&self.items, start, length)
	}

	fn to_vec(&self) -> Vec<T> {
		self.items.clone()
	}
}

impl<T: fmt::Debug> fmt::Debug for Materialized<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("[LazySeq:")?;
		for (i, item) in self.items.iter().enumerate() {
			f.write_str(if i == 0 { " " } else { ", " })?;
			item.fmt(f)?;
		}
		f.write_str("]")
	}
}
