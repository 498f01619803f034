//! Thin data-model building blocks.
//!
//! Re-exports the lazily populated [`Record`](record::Record) and the
//! [`LazySeq`](lazy_seq::LazySeq) family, plus helpers for feeding a sequence
//! into a record attribute.

pub use thinmodels_lazy_seq as lazy_seq;
pub use thinmodels_record as record;

pub use thinmodels_lazy_seq::{Indexed, Lazy, LazySeq, Materialized, Memoized, MemoizedLength, MemoizedMapped};
pub use thinmodels_record::{
	Attribute, Conformance, Record, RecordError, Schema, SchemaBuilder, SchemaCatalog, SchemaError, Value, ValueType,
};

/// Collects every element of `seq` into a list value.
///
/// A memoized sequence that has already been traversed is read from its
/// stored elements.
pub fn list_value<S>(seq: &S) -> Value
where
	S: LazySeq,
	S::Item: Into<Value>,
{
	let items: Vec<Value> = seq.iter().map(Into::into).collect();
	tracing::trace!(domain = "lazy_seq", len = items.len(), "sequence collected into list");
	Value::List(items)
}

/// Builds a lazy sequence over the elements of a list value.
///
/// Returns `None` when `value` is not a list. The sequence clones elements out
/// of `value` as it is traversed and knows its length without traversing.
pub fn list_seq(value: &Value) -> Option<Indexed<impl Fn(usize) -> Value + '_>> {
	let items = value.as_list()?;
	Some(Indexed::new(items.len(), move |i| items[i].clone()))
}
