//! Memoizing decorators.
//!
//! [`MemoizedLength`] remembers how many elements its source has, learning it
//! either from an explicit length query or as a side effect of a complete
//! traversal. [`Memoized`] additionally records the elements of the first
//! complete traversal and serves every later read from that record.
//!
//! Both caches are write-once. When several traversals finish, the first one
//! to store its result wins and the rest are discarded.

use core::fmt;
use std::sync::OnceLock;

use crate::mapped::Mapped;
use crate::seq::{LazySeq, window};

mod iter;

pub use iter::{CountingIter, MemoizedIter};

/// Memoized sequence of transformed elements.
pub type MemoizedMapped<S, F> = Memoized<Mapped<S, F>>;

/// Caches the length of `S` once it is known.
///
/// Element reads are not cached: every traversal and every slice still goes
/// to the source.
#[derive(Clone)]
pub struct MemoizedLength<S> {
	source: S,
	length: OnceLock<usize>,
}

impl<S> MemoizedLength<S> {
	pub fn new(source: S) -> Self {
		Self {
			source,
			length: OnceLock::new(),
		}
	}

	pub fn source(&self) -> &S {
		&self.source
	}

	/// The cached length, without computing it.
	pub fn known_len(&self) -> Option<usize> {
		self.length.get().copied()
	}
}

impl<S: LazySeq> LazySeq for MemoizedLength<S> {
	type Item = S::Item;
	type Iter<'a>
		= CountingIter<'a, S::Iter<'a>>
	where
		Self: 'a;

	fn iter(&self) -> Self::Iter<'_> {
		CountingIter::new(self.source.iter(), &self.length)
	}

	fn len(&self) -> usize {
		*self.length.get_or_init(|| source_len(&self.source))
	}

	fn is_empty(&self) -> bool {
		match self.known_len() {
			Some(len) => len == 0,
			None => self.source.is_empty(),
		}
	}

	fn slice(&self, start: usize, length: usize) -> Option<Vec<S::Item>> {
		if self.known_len().is_some_and(|len| start > len) {
			return None;
		}
		self.source.slice(start, length)
	}
}

impl<S> fmt::Debug for MemoizedLength<S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.known_len() {
			Some(len) => write!(f, "[LazySeq(length={len}):...]"),
			None => f.write_str("[LazySeq:...]"),
		}
	}
}

/// Caches both the length and the elements of `S`.
///
/// The first complete traversal stores every element it produced. From then
/// on the stored elements are authoritative: traversal, length, slicing and
/// [`to_vec`](LazySeq::to_vec) never consult the source again. Until then,
/// slices are served by the source and do not populate the cache.
pub struct Memoized<S: LazySeq> {
	source: S,
	length: OnceLock<usize>,
	items: OnceLock<Vec<S::Item>>,
}

impl<S: LazySeq> Memoized<S> {
	pub fn new(source: S) -> Self {
		Self {
			source,
			length: OnceLock::new(),
			items: OnceLock::new(),
		}
	}

	pub fn source(&self) -> &S {
		&self.source
	}

	pub fn is_materialized(&self) -> bool {
		self.items.get().is_some()
	}

	/// The stored elements, once a complete traversal has happened.
	pub fn as_slice(&self) -> Option<&[S::Item]> {
		self.items.get().map(Vec::as_slice)
	}

	pub fn known_len(&self) -> Option<usize> {
		self.items.get().map(Vec::len).or_else(|| self.length.get().copied())
	}

	/// Consumes the sequence, returning the stored elements without copying
	/// them, or collecting the source if nothing is stored yet.
	pub fn into_vec(self) -> Vec<S::Item> {
		match self.items.into_inner() {
			Some(items) => items,
			None => self.source.to_vec(),
		}
	}

	pub(crate) fn store(&self, items: Vec<S::Item>) {
		let len = items.len();
		if self.items.set(items).is_ok() {
			let _ = self.length.set(len);
			tracing::trace!(domain = "lazy_seq", len, "sequence materialized");
		}
	}
}

impl<S> LazySeq for Memoized<S>
where
	S: LazySeq,
	S::Item: Clone,
{
	type Item = S::Item;
	type Iter<'a>
		= MemoizedIter<'a, S>
	where
		Self: 'a;

	fn iter(&self) -> Self::Iter<'_> {
		match self.items.get() {
			Some(items) => MemoizedIter::cached(items),
			None => MemoizedIter::recording(self),
		}
	}

	fn len(&self) -> usize {
		match self.items.get() {
			Some(items) => items.len(),
			None => *self.length.get_or_init(|| source_len(&self.source)),
		}
	}

	fn is_empty(&self) -> bool {
		match self.known_len() {
			Some(len) => len == 0,
			None => self.source.is_empty(),
		}
	}

	fn slice(&self, start: usize, length: usize) -> Option<Vec<S::Item>> {
		if let Some(items) = self.items.get() {
			return window(items, start, length);
		}
		if self.length.get().is_some_and(|&len| start > len) {
			return None;
		}
		self.source.slice(start, length)
	}

	fn to_vec(&self) -> Vec<S::Item> {
		match self.items.get() {
			Some(items) => items.clone(),
			None => self.iter().collect(),
		}
	}
}

impl<S> fmt::Debug for Memoized<S>
where
	S: LazySeq,
	S::Item: fmt::Debug,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if let Some(items) = self.items.get() {
			f.write_str("[LazySeq:")?;
			for (i, item) in items.iter().enumerate() {
				f.write_str(if i == 0 { " " } else { ", " })?;
				item.fmt(f)?;
			}
			return f.write_str("]");
		}
		match self.length.get() {
			Some(len) => write!(f, "[LazySeq(length={len}):...]"),
			None => f.write_str("[LazySeq:...]"),
		}
	}
}

fn source_len<S: LazySeq>(source: &S) -> usize {
	let len = source.len();
	tracing::trace!(domain = "lazy_seq", len, "sequence length memoized");
	len
}
