//! Per-attribute value contracts for type-checked record types.
//!
//! A [`TypeContract`] maps attribute slots to a [`Conformance`] predicate. The
//! predicate is shallow: it inspects the outermost shape of a value and never
//! recurses into lists, maps or nested records.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::{AttrId, Attribute};
use crate::error::RecordError;
use crate::value::{Value, ValueType};

/// Opaque conformance check for custom predicates.
pub type ConformanceFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Predicate a value must satisfy before it is stored.
#[derive(Clone)]
pub enum Conformance {
	/// The value must have exactly this shallow type.
	Type(ValueType),
	/// The value must have this shallow type or be null.
	Nullable(ValueType),
	/// Caller-supplied predicate with a human-readable expectation.
	Predicate { expected: Arc<str>, check: ConformanceFn },
}

impl Conformance {
	/// Wraps a custom predicate.
	pub fn predicate(
		expected: impl Into<Arc<str>>,
		check: impl Fn(&Value) -> bool + Send + Sync + 'static,
	) -> Self {
		Conformance::Predicate {
			expected: expected.into(),
			check: Arc::new(check),
		}
	}

	/// Returns true if `value` satisfies this predicate.
	pub fn accepts(&self, value: &Value) -> bool {
		match self {
			Conformance::Type(ty) => value.matches_type(*ty),
			Conformance::Nullable(ty) => value.is_null() || value.matches_type(*ty),
			Conformance::Predicate { check, .. } => check(value),
		}
	}

	/// Describes the accepted values, for error messages.
	pub fn expected(&self) -> String {
		match self {
			Conformance::Type(ty) => ty.name().to_string(),
			Conformance::Nullable(ty) => format!("{ty}?"),
			Conformance::Predicate { expected, .. } => expected.to_string(),
		}
	}
}

impl From<ValueType> for Conformance {
	fn from(ty: ValueType) -> Self {
		Conformance::Type(ty)
	}
}

impl core::fmt::Debug for Conformance {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		match self {
			Conformance::Type(ty) => f.debug_tuple("Type").field(ty).finish(),
			Conformance::Nullable(ty) => f.debug_tuple("Nullable").field(ty).finish(),
			Conformance::Predicate { expected, .. } => f
				.debug_struct("Predicate")
				.field("expected", expected)
				.finish_non_exhaustive(),
		}
	}
}

/// Attribute slot to conformance predicate table for one record type.
#[derive(Debug, Clone, Default)]
pub struct TypeContract {
	entries: FxHashMap<AttrId, Conformance>,
}

impl TypeContract {
	pub fn new() -> Self {
		Self::default()
	}

	pub(crate) fn insert(&mut self, id: AttrId, conformance: Conformance) {
		self.entries.insert(id, conformance);
	}

	/// Returns the predicate registered for `id`, if any.
	pub fn get(&self, id: AttrId) -> Option<&Conformance> {
		self.entries.get(&id)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Checks `value` against the predicate for `attribute`.
	///
	/// Attributes without a predicate accept every value.
	pub fn check(&self, schema: &str, attribute: &Attribute, value: &Value) -> Result<(), RecordError> {
		let Some(conformance) = self.get(attribute.id()) else {
			return Ok(());
		};
		if conformance.accepts(value) {
			return Ok(());
		}
		tracing::debug!(
			domain = "record",
			schema,
			attribute = attribute.name(),
			expected = %conformance.expected(),
			got = value.type_name(),
			"type contract rejected value",
		);
		Err(RecordError::TypeMismatch {
			schema: schema.to_string(),
			attribute: attribute.name().to_string(),
			expected: conformance.expected(),
			got: value.type_name(),
		})
	}
}
