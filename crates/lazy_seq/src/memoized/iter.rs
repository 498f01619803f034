use core::iter::{Cloned, FusedIterator};
use core::slice;
use std::sync::OnceLock;

use super::Memoized;
use crate::seq::LazySeq;

/// Traversal of a [`MemoizedLength`](super::MemoizedLength) that stores the
/// element count once the source runs out.
pub struct CountingIter<'a, I> {
	inner: I,
	count: usize,
	length: &'a OnceLock<usize>,
	done: bool,
}

impl<'a, I> CountingIter<'a, I> {
	pub(super) fn new(inner: I, length: &'a OnceLock<usize>) -> Self {
		Self {
			inner,
			count: 0,
			length,
			done: false,
		}
	}
}

impl<I: Iterator> Iterator for CountingIter<'_, I> {
	type Item = I::Item;

	fn next(&mut self) -> Option<I::Item> {
		if self.done {
			return None;
		}
		match self.inner.next() {
			Some(item) => {
				self.count += 1;
				Some(item)
			}
			None => {
				self.done = true;
				if self.length.set(self.count).is_ok() {
					tracing::trace!(domain = "lazy_seq", len = self.count, "sequence length memoized");
				}
				None
			}
		}
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		if self.done { (0, Some(0)) } else { self.inner.size_hint() }
	}
}

impl<I: Iterator> FusedIterator for CountingIter<'_, I> {}

/// Traversal of a [`Memoized`] sequence.
///
/// Reads the stored elements when they exist. Otherwise it walks the source,
/// keeping a copy of each element, and stores the copies if it reaches the
/// end. A traversal dropped early stores nothing.
pub struct MemoizedIter<'a, S: LazySeq + 'a> {
	state: State<'a, S>,
}

enum State<'a, S: LazySeq + 'a> {
	Cached(Cloned<slice::Iter<'a, S::Item>>),
	Recording {
		inner: S::Iter<'a>,
		buffer: Vec<S::Item>,
		memo: &'a Memoized<S>,
	},
	Done,
}

impl<'a, S> MemoizedIter<'a, S>
where
	S: LazySeq + 'a,
	S::Item: Clone,
{
	pub(super) fn cached(items: &'a [S::Item]) -> Self {
		Self {
			state: State::Cached(items.iter().cloned()),
		}
	}

	pub(super) fn recording(memo: &'a Memoized<S>) -> Self {
		Self {
			state: State::Recording {
				inner: memo.source.iter(),
				buffer: Vec::new(),
				memo,
			},
		}
	}
}

impl<'a, S> Iterator for MemoizedIter<'a, S>
where
	S: LazySeq + 'a,
	S::Item: Clone,
{
	type Item = S::Item;

	fn next(&mut self) -> Option<S::Item> {
		match &mut self.state {
			State::Cached(items) => items.next(),
			State::Recording { inner, buffer, memo } => match inner.next() {
				Some(item) => {
					buffer.push(item.clone());
					Some(item)
				}
				None => {
					let memo = *memo;
					memo.store(core::mem::take(buffer));
					self.state = State::Done;
					None
				}
			},
			State::Done => None,
		}
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		match &self.state {
			State::Cached(items) => items.size_hint(),
			State::Recording { inner, .. } => inner.size_hint(),
			State::Done => (0, Some(0)),
		}
	}
}

impl<'a, S> FusedIterator for MemoizedIter<'a, S>
where
	S: LazySeq + 'a,
	S::Item: Clone,
{
}
