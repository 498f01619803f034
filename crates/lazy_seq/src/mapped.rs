use core::fmt;
use core::iter::Map;

use crate::seq::LazySeq;

/// Applies a transform to each element of a source as it is traversed.
///
/// Length comes straight from the source, and slices are taken from the
/// source before the transform runs, so a cheap source stays cheap.
#[derive(Clone)]
pub struct Mapped<S, F> {
	source: S,
	transform: F,
}

impl<S, F> Mapped<S, F> {
	pub fn new(source: S, transform: F) -> Self {
		Self { source, transform }
	}

	pub fn source(&self) -> &S {
		&self.source
	}
}

impl<S, F, U> LazySeq for Mapped<S, F>
where
	S: LazySeq,
	F: Fn(S::Item) -> U,
{
	type Item = U;
	type Iter<'a>
		= Map<S::Iter<'a>, &'a F>
	where
		Self: 'a;

	fn iter(&self) -> Self::Iter<'_> {
		self.source.iter().map(&self.transform)
	}

	fn len(&self) -> usize {
		self.source.len()
	}

	fn is_empty(&self) -> bool {
		self.source.is_empty()
	}

	fn slice(&self, start: usize, length: usize) -> Option<Vec<U>> {
		self.source
			.slice(start, length)
			.map(|items| items.into_iter().map(&self.transform).collect())
	}
}

impl<S, F> fmt::Debug for Mapped<S, F> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("[LazySeq:...]")
	}
}
