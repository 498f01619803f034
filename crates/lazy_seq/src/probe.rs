//! Instrumented source for tests.

use std::cell::Cell;

use crate::seq::LazySeq;

/// Counts how often it is traversed and how many elements it hands out.
pub(crate) struct Probe {
	items: Vec<i32>,
	cheap_len: bool,
	traversals: Cell<usize>,
	visits: Cell<usize>,
	len_calls: Cell<usize>,
}

impl Probe {
	/// A source whose length is only known by traversing it.
	pub(crate) fn new(items: impl Into<Vec<i32>>) -> Self {
		Self {
			items: items.into(),
			cheap_len: false,
			traversals: Cell::new(0),
			visits: Cell::new(0),
			len_calls: Cell::new(0),
		}
	}

	/// A source that reports its length without traversing.
	pub(crate) fn sized(items: impl Into<Vec<i32>>) -> Self {
		Self {
			cheap_len: true,
			..Self::new(items)
		}
	}

	pub(crate) fn traversals(&self) -> usize {
		self.traversals.get()
	}

	pub(crate) fn visits(&self) -> usize {
		self.visits.get()
	}

	pub(crate) fn len_calls(&self) -> usize {
		self.len_calls.get()
	}
}

impl LazySeq for Probe {
	type Item = i32;
	type Iter<'a>
		= Box<dyn Iterator<Item = i32> + 'a>
	where
		Self: 'a;

	fn iter(&self) -> Self::Iter<'_> {
		self.traversals.set(self.traversals.get() + 1);
		let visits = &self.visits;
		Box::new(self.items.as_slice().iter().copied().inspect(move |_| visits.set(visits.get() + 1)))
	}

	fn len(&self) -> usize {
		if self.cheap_len {
			self.len_calls.set(self.len_calls.get() + 1);
			self.items.len()
		} else {
			self.iter().count()
		}
	}
}
