//! Attribute registries for record types.
//!
//! A [`Schema`] is the immutable descriptor of one concrete record type: its
//! name, its effective attribute list (ancestors' attributes first, then its
//! own), and the optional identity and type-contract descriptors. Schemas are
//! built once through a [`SchemaBuilder`] and then only referenced by records.
//!
//! Every attribute owns a dense storage slot ([`AttrId`]). Records index their
//! value store by slot, so name lookup happens once per call and never inside
//! the store itself.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::SchemaError;

mod builder;
mod catalog;
mod contract;
mod key;


pub use builder::SchemaBuilder;
pub use catalog::SchemaCatalog;
pub use contract::{Conformance, ConformanceFn, TypeContract};
pub use key::AttrKey;

/// Dense storage slot of an attribute within its schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttrId(u32);

impl AttrId {
	pub(crate) fn from_index(index: usize) -> Self {
		Self(index as u32)
	}

	pub fn as_u32(self) -> u32 {
		self.0
	}

	pub(crate) fn index(self) -> usize {
		self.0 as usize
	}
}

/// A declared attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
	id: AttrId,
	name: Arc<str>,
	declared_in: Arc<str>,
}

impl Attribute {
	pub fn id(&self) -> AttrId {
		self.id
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub(crate) fn name_arc(&self) -> &Arc<str> {
		&self.name
	}

	/// Name of the record type that declared this attribute.
	pub fn declared_in(&self) -> &str {
		&self.declared_in
	}
}

/// Immutable descriptor of a record type.
///
/// Cloning a schema is cheap and yields the same type: equality is identity
/// of the underlying descriptor, not structural.
#[derive(Clone)]
pub struct Schema {
	inner: Arc<SchemaInner>,
}

struct SchemaInner {
	name: Arc<str>,
	parent: Option<Schema>,
	attributes: IndexMap<Arc<str>, Attribute>,
	own_start: usize,
	identity: Option<AttrId>,
	contract: TypeContract,
}

impl Schema {
	/// Starts declaring a root record type.
	pub fn builder(name: impl Into<Arc<str>>) -> SchemaBuilder {
		SchemaBuilder::new(name.into(), None)
	}

	/// Starts declaring a record type derived from `self`.
	///
	/// The derived type inherits every attribute, the identity attribute and
	/// the type contract of its ancestors.
	pub fn extend(&self, name: impl Into<Arc<str>>) -> SchemaBuilder {
		SchemaBuilder::new(name.into(), Some(self.clone()))
	}

	/// Declares a root type with the given attributes.
	pub fn define<I, S>(name: impl Into<Arc<str>>, attributes: I) -> Result<Self, SchemaError>
	where
		I: IntoIterator<Item = S>,
		S: Into<Arc<str>>,
	{
		Ok(Self::builder(name).attributes(attributes)?.build())
	}

	/// Declares a root type with an `id` identity attribute followed by the given attributes.
	pub fn define_with_identity<I, S>(name: impl Into<Arc<str>>, attributes: I) -> Result<Self, SchemaError>
	where
		I: IntoIterator<Item = S>,
		S: Into<Arc<str>>,
	{
		Ok(Self::builder(name).identity("id").attributes(attributes)?.build())
	}

	pub(crate) fn from_parts(
		name: Arc<str>,
		parent: Option<Schema>,
		attributes: IndexMap<Arc<str>, Attribute>,
		own_start: usize,
		identity: Option<AttrId>,
		contract: TypeContract,
	) -> Self {
		Self {
			inner: Arc::new(SchemaInner {
				name,
				parent,
				attributes,
				own_start,
				identity,
				contract,
			}),
		}
	}

	/// Type name, also used as the serialization discriminator.
	pub fn name(&self) -> &str {
		&self.inner.name
	}

	pub(crate) fn name_arc(&self) -> &Arc<str> {
		&self.inner.name
	}

	pub fn parent(&self) -> Option<&Schema> {
		self.inner.parent.as_ref()
	}

	/// Returns true if `self` is `other` or derives from it.
	pub fn is_a(&self, other: &Schema) -> bool {
		let mut current = Some(self);
		while let Some(schema) = current {
			if schema == other {
				return true;
			}
			current = schema.parent();
		}
		false
	}

	/// Effective attributes: every ancestor's declarations followed by this type's own.
	pub fn attributes(&self) -> impl ExactSizeIterator<Item = &Attribute> {
		self.inner.attributes.values()
	}

	/// Attributes declared directly on this type.
	pub fn own_attributes(&self) -> impl Iterator<Item = &Attribute> {
		self.inner.attributes.values().skip(self.inner.own_start)
	}

	pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
		self.inner.attributes.keys().map(|k| &**k)
	}

	pub fn len(&self) -> usize {
		self.inner.attributes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.attributes.is_empty()
	}

	pub fn contains(&self, key: impl AttrKey) -> bool {
		self.lookup(key).is_some()
	}

	/// Finds an attribute by name.
	pub fn attribute(&self, name: &str) -> Option<&Attribute> {
		self.inner.attributes.get(name)
	}

	/// Finds an attribute by slot.
	pub fn attribute_by_id(&self, id: AttrId) -> Option<&Attribute> {
		self.inner.attributes.get_index(id.index()).map(|(_, a)| a)
	}

	/// Finds an attribute by any key kind.
	pub fn lookup(&self, key: impl AttrKey) -> Option<&Attribute> {
		key.lookup(self)
	}

	/// The attribute that overrides reference equality, if this type has one.
	pub fn identity(&self) -> Option<&Attribute> {
		self.inner.identity.and_then(|id| self.attribute_by_id(id))
	}

	pub fn contract(&self) -> &TypeContract {
		&self.inner.contract
	}

	pub fn is_typed(&self) -> bool {
		!self.inner.contract.is_empty()
	}
}

impl PartialEq for Schema {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}
}

impl Eq for Schema {}

impl core::hash::Hash for Schema {
	fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
		(Arc::as_ptr(&self.inner) as usize).hash(state);
	}
}

impl core::fmt::Debug for Schema {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("Schema")
			.field("name", &self.name())
			.field("parent", &self.parent().map(Schema::name))
			.field("attributes", &self.attribute_names().collect::<Vec<_>>())
			.field("identity", &self.identity().map(Attribute::name))
			.field("contract", &self.inner.contract)
			.finish()
	}
}

impl core::fmt::Display for Schema {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.write_str(self.name())
	}
}
