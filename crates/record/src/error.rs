//! Error types for schemas and records.

use thiserror::Error;

/// Boxed failure returned by a resolver.
pub type ResolveFailure = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while declaring a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
	/// The attribute is already declared on this type or one of its ancestors.
	#[error("attribute '{attribute}' already defined on {schema} (declared in {declared_in})")]
	DuplicateAttribute {
		schema: String,
		attribute: String,
		declared_in: String,
	},

	/// A catalog already holds a schema with this type name.
	#[error("schema {schema} already registered")]
	DuplicateSchema { schema: String },
}

/// Errors raised by record reads and writes.
#[derive(Debug, Error)]
pub enum RecordError {
	/// The attribute is not declared on the record's type.
	#[error("no attribute '{attribute}' in {schema}")]
	UnknownAttribute { schema: String, attribute: String },

	/// Strict read of an unloaded attribute with no resolver bound.
	#[error("attribute '{attribute}' not loaded in {schema}")]
	PartialData { schema: String, attribute: String },

	/// The value does not satisfy the attribute's type contract.
	#[error("type mismatch for attribute '{attribute}' in {schema}: expected {expected}, got {got}")]
	TypeMismatch {
		schema: String,
		attribute: String,
		expected: String,
		got: &'static str,
	},

	/// Mutation attempted on a frozen record.
	#[error("can't modify frozen {schema}")]
	Immutable { schema: String },

	/// The resolver failed to produce a value.
	#[error("resolver failed for attribute '{attribute}' in {schema}: {source}")]
	Resolve {
		schema: String,
		attribute: String,
		#[source]
		source: ResolveFailure,
	},
}

impl RecordError {
	/// Returns the name of the attribute the error refers to, if any.
	pub fn attribute(&self) -> Option<&str> {
		match self {
			RecordError::UnknownAttribute { attribute, .. }
			| RecordError::PartialData { attribute, .. }
			| RecordError::TypeMismatch { attribute, .. }
			| RecordError::Resolve { attribute, .. } => Some(attribute),
			RecordError::Immutable { .. } => None,
		}
	}
}

/// Result type for record operations.
pub type Result<T> = std::result::Result<T, RecordError>;
