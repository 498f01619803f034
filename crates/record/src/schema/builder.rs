use std::sync::Arc;

use indexmap::IndexMap;

use super::{AttrId, Attribute, Conformance, Schema, TypeContract};
use crate::error::SchemaError;

/// Append-only declaration of a record type.
///
/// Attributes can only be added; a name may be declared once across the
/// whole ancestry. [`build`](Self::build) freezes the declaration into a
/// [`Schema`].
pub struct SchemaBuilder {
	name: Arc<str>,
	parent: Option<Schema>,
	attributes: IndexMap<Arc<str>, Attribute>,
	own_start: usize,
	identity: Option<AttrId>,
	contract: TypeContract,
}

impl SchemaBuilder {
	pub(super) fn new(name: Arc<str>, parent: Option<Schema>) -> Self {
		let (attributes, identity, contract) = match &parent {
			Some(p) => (
				p.attributes().map(|a| (a.name_arc().clone(), a.clone())).collect(),
				p.identity().map(Attribute::id),
				p.contract().clone(),
			),
			None => (IndexMap::new(), None, TypeContract::new()),
		};
		let own_start = attributes.len();
		Self {
			name,
			parent,
			attributes,
			own_start,
			identity,
			contract,
		}
	}

	/// Declares a new attribute on this type and returns its slot.
	///
	/// Fails if the name is already declared here or on any ancestor.
	pub fn register(&mut self, name: impl Into<Arc<str>>) -> Result<AttrId, SchemaError> {
		let name = name.into();
		if let Some(existing) = self.attributes.get(&name) {
			return Err(SchemaError::DuplicateAttribute {
				schema: self.name.to_string(),
				attribute: name.to_string(),
				declared_in: existing.declared_in().to_string(),
			});
		}
		let id = AttrId::from_index(self.attributes.len());
		self.attributes.insert(
			name.clone(),
			Attribute {
				id,
				name,
				declared_in: self.name.clone(),
			},
		);
		Ok(id)
	}

	/// Chaining form of [`register`](Self::register).
	pub fn attribute(mut self, name: impl Into<Arc<str>>) -> Result<Self, SchemaError> {
		self.register(name)?;
		Ok(self)
	}

	pub fn attributes<I, S>(mut self, names: I) -> Result<Self, SchemaError>
	where
		I: IntoIterator<Item = S>,
		S: Into<Arc<str>>,
	{
		for name in names {
			self.register(name)?;
		}
		Ok(self)
	}

	/// Designates the identity attribute, declaring it if it does not exist yet.
	///
	/// An already-declared attribute is aliased rather than redeclared.
	pub fn identity(mut self, name: impl Into<Arc<str>>) -> Self {
		let id = self.ensure(name.into());
		self.identity = Some(id);
		self
	}

	/// Attaches a conformance predicate to an attribute, declaring it if needed.
	///
	/// A later call for the same attribute replaces the earlier predicate,
	/// including one inherited from an ancestor.
	pub fn typed(mut self, name: impl Into<Arc<str>>, conformance: impl Into<Conformance>) -> Self {
		let id = self.ensure(name.into());
		self.contract.insert(id, conformance.into());
		self
	}

	fn ensure(&mut self, name: Arc<str>) -> AttrId {
		if let Some(existing) = self.attributes.get(&name) {
			return existing.id();
		}
		let id = AttrId::from_index(self.attributes.len());
		self.attributes.insert(
			name.clone(),
			Attribute {
				id,
				name,
				declared_in: self.name.clone(),
			},
		);
		id
	}

	pub fn build(self) -> Schema {
		tracing::trace!(
			domain = "schema",
			name = &*self.name,
			attributes = self.attributes.len(),
			own = self.attributes.len() - self.own_start,
			typed = self.contract.len(),
			"schema built",
		);
		Schema::from_parts(
			self.name,
			self.parent,
			self.attributes,
			self.own_start,
			self.identity,
			self.contract,
		)
	}
}
