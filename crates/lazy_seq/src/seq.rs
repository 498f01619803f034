use core::ops::{Bound, RangeBounds};
use std::rc::Rc;
use std::sync::Arc;

use crate::mapped::Mapped;
use crate::memoized::{Memoized, MemoizedLength};

/// A lazily evaluated, restartable sequence.
///
/// Implementors only have to provide [`iter`](Self::iter). Sources that know
/// their length or support random access should also override
/// [`len`](Self::len) and [`slice`](Self::slice); every other accessor is
/// built on those three.
///
/// # Slicing
///
/// `slice(start, length)` returns the elements in `start..start + length`,
/// truncated to the elements that exist. When `start` is strictly greater
/// than the number of elements the result is `None` ("no such slice"), which
/// is distinct from an empty window: for `[x, y, z]`, `slice(3, 3)` is
/// `Some(vec![])` and `slice(4, 3)` is `None`. Overrides must keep this rule.
pub trait LazySeq {
	type Item;

	type Iter<'a>: Iterator<Item = Self::Item>
	where
		Self: 'a;

	/// Starts a fresh traversal.
	fn iter(&self) -> Self::Iter<'_>;

	/// Number of elements. The default performs a full traversal.
	fn len(&self) -> usize {
		self.iter().count()
	}

	fn is_empty(&self) -> bool {
		self.slice(0, 1).is_none_or(|items| items.is_empty())
	}

	/// Elements in `start..start + length`; see the trait docs for the boundary rule.
	///
	/// The default walks from the beginning and stops once the window is
	/// complete.
	fn slice(&self, start: usize, length: usize) -> Option<Vec<Self::Item>> {
		let stop = start.saturating_add(length);
		let mut index = 0;
		let mut result = Vec::new();
		for item in self.iter() {
			if index >= stop {
				break;
			}
			if index >= start {
				result.push(item);
			}
			index += 1;
		}
		(index >= start).then_some(result)
	}

	/// Element at `index`, if it exists.
	fn get(&self, index: usize) -> Option<Self::Item> {
		self.slice(index, 1)?.into_iter().next()
	}

	fn first(&self) -> Option<Self::Item> {
		self.get(0)
	}

	fn last(&self) -> Option<Self::Item> {
		self.len().checked_sub(1).and_then(|index| self.get(index))
	}

	/// All elements as a plain vector.
	fn to_vec(&self) -> Vec<Self::Item> {
		self.iter().collect()
	}

	/// Slices by range, with the same boundary rule as [`slice`](Self::slice).
	fn slice_range(&self, range: impl RangeBounds<usize>) -> Option<Vec<Self::Item>>
	where
		Self: Sized,
	{
		let start = match range.start_bound() {
			Bound::Included(&s) => s,
			Bound::Excluded(&s) => s.saturating_add(1),
			Bound::Unbounded => 0,
		};
		let length = match range.end_bound() {
			Bound::Included(&e) => e.saturating_add(1).saturating_sub(start),
			Bound::Excluded(&e) => e.saturating_sub(start),
			Bound::Unbounded => usize::MAX - start,
		};
		self.slice(start, length)
	}

	/// Lazily transforms every element. Nothing is traversed until the result is.
	fn map<U, F>(self, transform: F) -> Mapped<Self, F>
	where
		Self: Sized,
		F: Fn(Self::Item) -> U,
	{
		Mapped::new(self, transform)
	}

	/// Lazily transforms every element and memoizes the transformed results
	/// after the first full traversal.
	fn map_memoized<U, F>(self, transform: F) -> Memoized<Mapped<Self, F>>
	where
		Self: Sized,
		F: Fn(Self::Item) -> U,
		U: Clone,
	{
		Memoized::new(Mapped::new(self, transform))
	}

	/// Caches the length once known.
	fn memoize_length(self) -> MemoizedLength<Self>
	where
		Self: Sized,
	{
		MemoizedLength::new(self)
	}

	/// Caches the elements after the first full traversal.
	fn memoize(self) -> Memoized<Self>
	where
		Self: Sized,
		Self::Item: Clone,
	{
		Memoized::new(self)
	}
}

/// Applies the slice boundary rule to an already materialized collection.
pub(crate) fn window<T: Clone>(items: &[T], start: usize, length: usize) -> Option<Vec<T>> {
	if start > items.len() {
		return None;
	}
	let end = start.saturating_add(length).min(items.len());
	Some(items[start..end].to_vec())
}

macro_rules! forward_lazy_seq {
	($($ptr:ident),* $(,)?) => {$(
		impl<S: LazySeq> LazySeq for $ptr<S> {
			type Item = S::Item;
			type Iter<'a> = S::Iter<'a> where Self: 'a;

			fn iter(&self) -> Self::Iter<'_> {
				(**self).iter()
			}

			fn len(&self) -> usize {
				(**self).len()
			}

			fn is_empty(&self) -> bool {
				(**self).is_empty()
			}

			fn slice(&self, start: usize, length: usize) -> Option<Vec<Self::Item>> {
				(**self).slice(start, length)
			}

			fn to_vec(&self) -> Vec<Self::Item> {
				(**self).to_vec()
			}
		}
	)*};
}

impl<S: LazySeq> LazySeq for &S {
	type Item = S::Item;
	type Iter<'a>
		= S::Iter<'a>
	where
		Self: 'a;

	fn iter(&self) -> Self::Iter<'_> {
		(**self).iter()
	}

	fn len(&self) -> usize {
		(**self).len()
	}

	fn is_empty(&self) -> bool {
		(**self).is_empty()
	}

	fn slice(&self, start: usize, length: usize) -> Option<Vec<Self::Item>> {
		(**self).slice(start, length)
	}

	fn to_vec(&self) -> Vec<Self::Item> {
		(**self).to_vec()
	}
}

forward_lazy_seq!(Box, Rc, Arc);
