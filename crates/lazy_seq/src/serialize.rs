//! Sequences serialize as plain arrays of their elements.

use serde::{Serialize, Serializer};

use crate::mapped::Mapped;
use crate::memoized::{Memoized, MemoizedLength};
use crate::seq::LazySeq;
use crate::source::{Indexed, Lazy, Materialized};

impl<F, I> Serialize for Lazy<F>
where
	F: Fn() -> I,
	I: IntoIterator,
	I::Item: Serialize,
{
	fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
		serializer.collect_seq(self.iter())
	}
}

impl<F, T> Serialize for Indexed<F>
where
	F: Fn(usize) -> T,
	T: Serialize,
{
	fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
		serializer.collect_seq(self.iter())
	}
}

impl<T: Serialize> Serialize for Materialized<T> {
	fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
		serializer.collect_seq(self.as_slice())
	}
}

impl<S, F, U> Serialize for Mapped<S, F>
where
	S: LazySeq,
	F: Fn(S::Item) -> U,
	U: Serialize,
{
	fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
		serializer.collect_seq(self.iter())
	}
}

impl<S> Serialize for MemoizedLength<S>
where
	S: LazySeq,
	S::Item: Serialize,
{
	fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
		serializer.collect_seq(self.iter())
	}
}

/// Serializing a memoized sequence is a full traversal, so it materializes it.
impl<S> Serialize for Memoized<S>
where
	S: LazySeq,
	S::Item: Clone + Serialize,
{
	fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
		match self.as_slice() {
			Some(items) => serializer.collect_seq(items),
			None => serializer.collect_seq(self.iter()),
		}
	}
}
