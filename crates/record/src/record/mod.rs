//! Lazily-populated records.
//!
//! A [`Record`] holds the values loaded so far for the attributes of its
//! [`Schema`], plus an optional one-shot [`Resolver`] that computes missing
//! values on first access. Any write discards the resolver for good: once a
//! record has been modified it can no longer be lazily completed.
//!
//! Records are handles. Cloning a `Record` yields another handle to the same
//! instance; [`Record::duplicate`] produces an independent copy.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::error::{RecordError, ResolveFailure, Result};
use crate::schema::{AttrKey, Attribute, Schema};
use crate::value::Value;

mod identity;
mod render;

#[cfg(test)]
mod tests;

/// Computes the value of an unloaded attribute.
///
/// Invoked at most once per attribute per record; the result is cached in
/// the record's own store.
pub type Resolver = Arc<dyn Fn(&Record, &Attribute) -> std::result::Result<Value, ResolveFailure> + Send + Sync>;

/// Handle to a record instance.
#[derive(Clone)]
pub struct Record {
	inner: Arc<RecordInner>,
}

struct RecordInner {
	schema: Schema,
	state: Mutex<RecordState>,
}

struct RecordState {
	values: Vec<Option<Value>>,
	resolver: Option<Resolver>,
	frozen: bool,
}

impl Record {
	/// Creates an empty record with no resolver.
	pub fn new(schema: &Schema) -> Self {
		Self::from_parts(schema.clone(), vec![None; schema.len()], None)
	}

	/// Creates a record preloaded with `values`.
	///
	/// Every key must be declared on the schema and every value must satisfy
	/// the schema's type contract; otherwise no record is produced.
	pub fn from_values<I, K, V>(schema: &Schema, values: I) -> Result<Self>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AttrKey,
		V: Into<Value>,
	{
		Self::build(schema, values, None)
	}

	/// Creates a record preloaded with `values` whose remaining attributes are
	/// computed on demand by `resolver`.
	///
	/// Preloaded values are type-checked; lazily resolved ones are not.
	pub fn with_resolver<I, K, V, F>(schema: &Schema, values: I, resolver: F) -> Result<Self>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AttrKey,
		V: Into<Value>,
		F: Fn(&Record, &Attribute) -> std::result::Result<Value, ResolveFailure> + Send + Sync + 'static,
	{
		Self::build(schema, values, Some(Arc::new(resolver)))
	}

	/// Creates a record with nothing loaded and every attribute left to `resolver`.
	pub fn lazy<F>(schema: &Schema, resolver: F) -> Self
	where
		F: Fn(&Record, &Attribute) -> std::result::Result<Value, ResolveFailure> + Send + Sync + 'static,
	{
		Self::from_parts(schema.clone(), vec![None; schema.len()], Some(Arc::new(resolver)))
	}

	fn build<I, K, V>(schema: &Schema, values: I, resolver: Option<Resolver>) -> Result<Self>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AttrKey,
		V: Into<Value>,
	{
		let mut store = vec![None; schema.len()];
		for (index, value) in validate_updates(schema, values)? {
			store[index] = Some(value);
		}
		Ok(Self::from_parts(schema.clone(), store, resolver))
	}

	fn from_parts(schema: Schema, values: Vec<Option<Value>>, resolver: Option<Resolver>) -> Self {
		Self {
			inner: Arc::new(RecordInner {
				schema,
				state: Mutex::new(RecordState {
					values,
					resolver,
					frozen: false,
				}),
			}),
		}
	}

	pub fn schema(&self) -> &Schema {
		&self.inner.schema
	}

	/// Name of the record's type.
	pub fn type_name(&self) -> &str {
		self.inner.schema.name()
	}

	/// Effective attributes of the record's type.
	pub fn attributes(&self) -> impl ExactSizeIterator<Item = &Attribute> {
		self.inner.schema.attributes()
	}

	fn attribute<K: AttrKey>(&self, key: &K) -> Result<&Attribute> {
		key.lookup(&self.inner.schema).ok_or_else(|| RecordError::UnknownAttribute {
			schema: self.type_name().to_string(),
			attribute: key.label(),
		})
	}

	/// Reads an attribute, resolving it if needed.
	///
	/// Returns `Ok(None)` when the attribute is not loaded and no resolver is
	/// bound. Use [`fetch`](Self::fetch) to treat that case as an error.
	pub fn get(&self, key: impl AttrKey) -> Result<Option<Value>> {
		let attribute = self.attribute(&key)?;
		self.load(attribute, false)
	}

	/// Reads an attribute, resolving it if needed.
	///
	/// Fails with [`RecordError::PartialData`] when the attribute is not loaded
	/// and no resolver is bound.
	pub fn fetch(&self, key: impl AttrKey) -> Result<Value> {
		let attribute = self.attribute(&key)?;
		match self.load(attribute, true)? {
			Some(value) => Ok(value),
			None => Err(self.partial(attribute)),
		}
	}

	fn partial(&self, attribute: &Attribute) -> RecordError {
		RecordError::PartialData {
			schema: self.type_name().to_string(),
			attribute: attribute.name().to_string(),
		}
	}

	fn immutable(&self) -> RecordError {
		RecordError::Immutable {
			schema: self.type_name().to_string(),
		}
	}

	fn load(&self, attribute: &Attribute, strict: bool) -> Result<Option<Value>> {
		let index = attribute.id().index();
		let resolver = {
			let state = self.inner.state.lock();
			if let Some(value) = &state.values[index] {
				return Ok(Some(value.clone()));
			}
			let Some(resolver) = state.resolver.clone() else {
				return if strict { Err(self.partial(attribute)) } else { Ok(None) };
			};
			if state.frozen {
				tracing::debug!(
					domain = "record",
					schema = self.type_name(),
					attribute = attribute.name(),
					"frozen record cannot store resolved value",
				);
				return Err(self.immutable());
			}
			resolver
		};

		// The lock is released while the resolver runs; it may read the record.
		tracing::trace!(
			domain = "record",
			schema = self.type_name(),
			attribute = attribute.name(),
			"resolving attribute",
		);
		let value = resolver(self, attribute).map_err(|source| RecordError::Resolve {
			schema: self.type_name().to_string(),
			attribute: attribute.name().to_string(),
			source,
		})?;

		let mut state = self.inner.state.lock();
		if state.frozen {
			return Err(self.immutable());
		}
		if let Some(stored) = &state.values[index] {
			return Ok(Some(stored.clone()));
		}
		// A write during resolution discarded the resolver; its result must not
		// land in a store that has since been modified.
		let still_bound = state.resolver.as_ref().is_some_and(|current| Arc::ptr_eq(current, &resolver));
		if !still_bound {
			tracing::debug!(
				domain = "record",
				schema = self.type_name(),
				attribute = attribute.name(),
				"resolver discarded during resolution, value not cached",
			);
			return Ok(Some(value));
		}
		state.values[index] = Some(value.clone());
		Ok(Some(value))
	}

	/// Writes an attribute and permanently discards the resolver.
	///
	/// The write is rejected, leaving the record untouched, if the attribute
	/// is unknown, the record is frozen, or the value violates the type contract.
	pub fn set(&self, key: impl AttrKey, value: impl Into<Value>) -> Result<()> {
		let attribute = self.attribute(&key)?;
		let value = value.into();
		let mut state = self.inner.state.lock();
		if state.frozen {
			return Err(self.immutable());
		}
		self.inner.schema.contract().check(self.type_name(), attribute, &value)?;
		self.discard_resolver(&mut state);
		state.values[attribute.id().index()] = Some(value);
		Ok(())
	}

	/// Returns a copy of this record with `updates` applied.
	///
	/// All keys and values are validated before anything is applied. The copy
	/// has no resolver; the receiver is unaffected.
	pub fn merge<I, K, V>(&self, updates: I) -> Result<Record>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AttrKey,
		V: Into<Value>,
	{
		let updates = validate_updates(&self.inner.schema, updates)?;
		let state = self.inner.state.lock();
		if state.frozen {
			return Err(self.immutable());
		}
		let mut values = state.values.clone();
		drop(state);
		for (index, value) in updates {
			values[index] = Some(value);
		}
		Ok(Self::from_parts(self.inner.schema.clone(), values, None))
	}

	/// Applies `updates` to this record, discarding its resolver.
	///
	/// Validation is identical to [`merge`](Self::merge): on failure nothing
	/// changes.
	pub fn merge_in_place<I, K, V>(&self, updates: I) -> Result<()>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AttrKey,
		V: Into<Value>,
	{
		let updates = validate_updates(&self.inner.schema, updates)?;
		let mut state = self.inner.state.lock();
		if state.frozen {
			return Err(self.immutable());
		}
		self.discard_resolver(&mut state);
		for (index, value) in updates {
			state.values[index] = Some(value);
		}
		Ok(())
	}

	fn discard_resolver(&self, state: &mut RecordState) {
		if state.resolver.take().is_some() {
			tracing::debug!(domain = "record", schema = self.type_name(), "write discarded resolver");
		}
	}

	/// Returns true if the attribute has a value in the store.
	///
	/// Never triggers resolution; unknown attributes are reported as not loaded.
	pub fn attribute_loaded(&self, key: impl AttrKey) -> bool {
		let Some(attribute) = key.lookup(&self.inner.schema) else {
			return false;
		};
		self.inner.state.lock().values[attribute.id().index()].is_some()
	}

	/// Copy of the loaded `(attribute, value)` pairs in declaration order.
	pub fn loaded_values(&self) -> IndexMap<Arc<str>, Value> {
		let state = self.inner.state.lock();
		self.inner
			.schema
			.attributes()
			.zip(state.values.iter())
			.filter_map(|(a, v)| v.as_ref().map(|v| (a.name_arc().clone(), v.clone())))
			.collect()
	}

	/// Attributes with a loaded value, in declaration order.
	pub fn loaded_attributes(&self) -> Vec<&Attribute> {
		let state = self.inner.state.lock();
		self.inner
			.schema
			.attributes()
			.zip(state.values.iter())
			.filter(|(_, v)| v.is_some())
			.map(|(a, _)| a)
			.collect()
	}

	pub fn has_resolver(&self) -> bool {
		self.inner.state.lock().resolver.is_some()
	}

	/// Discards the resolver without writing a value.
	pub fn remove_resolver(&self) -> Result<()> {
		let mut state = self.inner.state.lock();
		if state.frozen {
			return Err(self.immutable());
		}
		self.discard_resolver(&mut state);
		Ok(())
	}

	/// Creates an independent record with a copy of the value store.
	///
	/// The resolver is shared: both records may keep resolving the attributes
	/// still unloaded, each caching into its own store. The copy is never frozen.
	pub fn duplicate(&self) -> Record {
		let state = self.inner.state.lock();
		Self::from_parts(self.inner.schema.clone(), state.values.clone(), state.resolver.clone())
	}

	/// Makes the record permanently immutable.
	///
	/// Loaded values stay readable. Unloaded attributes are not forced; reading
	/// one through the resolver afterwards fails with [`RecordError::Immutable`].
	pub fn freeze(&self) {
		self.inner.state.lock().frozen = true;
	}

	pub fn is_frozen(&self) -> bool {
		self.inner.state.lock().frozen
	}

	/// Returns true if both handles refer to the same instance.
	pub fn same_instance(&self, other: &Record) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}

	pub(crate) fn instance_key(&self) -> usize {
		Arc::as_ptr(&self.inner) as usize
	}

	/// Validates a loaded attribute against the type contract.
	///
	/// Fails with [`RecordError::PartialData`] if the attribute is not loaded;
	/// this check never triggers resolution.
	pub fn check_attribute(&self, key: impl AttrKey) -> Result<()> {
		let attribute = self.attribute(&key)?;
		let value = self.inner.state.lock().values[attribute.id().index()].clone();
		let value = value.ok_or_else(|| self.partial(attribute))?;
		self.inner.schema.contract().check(self.type_name(), attribute, &value)
	}

	/// Validates every loaded attribute against the type contract.
	pub fn check_attributes(&self) -> Result<()> {
		for (name, value) in self.loaded_values() {
			let attribute = self.attribute(&name)?;
			self.inner.schema.contract().check(self.type_name(), attribute, &value)?;
		}
		Ok(())
	}

	pub(crate) fn loaded_slot(&self, attribute: &Attribute) -> Option<Value> {
		self.inner.state.lock().values[attribute.id().index()].clone()
	}
}

/// Resolves and type-checks every update before any of them is applied.
fn validate_updates<I, K, V>(schema: &Schema, updates: I) -> Result<Vec<(usize, Value)>>
where
	I: IntoIterator<Item = (K, V)>,
	K: AttrKey,
	V: Into<Value>,
{
	updates
		.into_iter()
		.map(|(key, value)| {
			let attribute = key.lookup(schema).ok_or_else(|| RecordError::UnknownAttribute {
				schema: schema.name().to_string(),
				attribute: key.label(),
			})?;
			let value = value.into();
			schema.contract().check(schema.name(), attribute, &value)?;
			Ok((attribute.id().index(), value))
		})
		.collect()
}
