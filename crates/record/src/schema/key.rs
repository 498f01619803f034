use std::sync::Arc;

use super::{AttrId, Attribute, Schema};

/// Anything that can name an attribute of a schema.
///
/// Implemented for attribute names (`&str`, `String`, `Arc<str>`), slots
/// ([`AttrId`]) and [`Attribute`] descriptors.
pub trait AttrKey {
	fn lookup<'s>(&self, schema: &'s Schema) -> Option<&'s Attribute>;

	/// Human-readable form of the key, for error messages.
	fn label(&self) -> String;
}

impl AttrKey for str {
	fn lookup<'s>(&self, schema: &'s Schema) -> Option<&'s Attribute> {
		schema.attribute(self)
	}

	fn label(&self) -> String {
		self.to_string()
	}
}

impl AttrKey for String {
	fn lookup<'s>(&self, schema: &'s Schema) -> Option<&'s Attribute> {
		schema.attribute(self)
	}

	fn label(&self) -> String {
		self.clone()
	}
}

impl AttrKey for Arc<str> {
	fn lookup<'s>(&self, schema: &'s Schema) -> Option<&'s Attribute> {
		schema.attribute(self)
	}

	fn label(&self) -> String {
		self.to_string()
	}
}

impl AttrKey for AttrId {
	fn lookup<'s>(&self, schema: &'s Schema) -> Option<&'s Attribute> {
		schema.attribute_by_id(*self)
	}

	fn label(&self) -> String {
		format!("#{}", self.as_u32())
	}
}

/// Descriptors only match schemas that share the declaration, so a
/// descriptor from an unrelated type with the same slot is rejected.
impl AttrKey for Attribute {
	fn lookup<'s>(&self, schema: &'s Schema) -> Option<&'s Attribute> {
		schema.attribute_by_id(self.id()).filter(|a| *a == self)
	}

	fn label(&self) -> String {
		self.name().to_string()
	}
}

impl<T: AttrKey + ?Sized> AttrKey for &T {
	fn lookup<'s>(&self, schema: &'s Schema) -> Option<&'s Attribute> {
		(**self).lookup(schema)
	}

	fn label(&self) -> String {
		(**self).label()
	}
}
