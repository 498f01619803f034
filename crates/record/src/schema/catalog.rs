use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::Schema;
use crate::error::SchemaError;

/// Lookup of record types by discriminator.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
	schemas: FxHashMap<Arc<str>, Schema>,
}

impl SchemaCatalog {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a schema under its type name.
	pub fn register(&mut self, schema: &Schema) -> Result<(), SchemaError> {
		if self.schemas.contains_key(schema.name()) {
			return Err(SchemaError::DuplicateSchema {
				schema: schema.name().to_string(),
			});
		}
		self.schemas.insert(schema.name_arc().clone(), schema.clone());
		Ok(())
	}

	pub fn with(mut self, schema: &Schema) -> Result<Self, SchemaError> {
		self.register(schema)?;
		Ok(self)
	}

	pub fn get(&self, name: &str) -> Option<&Schema> {
		self.schemas.get(name)
	}

	pub fn len(&self) -> usize {
		self.schemas.len()
	}

	pub fn is_empty(&self) -> bool {
		self.schemas.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Schema> {
		self.schemas.values()
	}
}
