//! Identity-based equality for record types that designate an identity attribute.
//!
//! Without an identity attribute, records compare and hash by instance. With
//! one, two records of the same type are also equal when both have the same
//! non-null identity value loaded. Identity reads go straight to the store and
//! never trigger resolution.

use std::hash::{Hash, Hasher};

use super::Record;
use crate::error::{RecordError, Result};
use crate::value::Value;

impl Record {
	/// Loaded value of the identity attribute, if the type has one.
	pub fn id(&self) -> Option<Value> {
		let attribute = self.schema().identity()?;
		self.loaded_slot(attribute)
	}

	/// Writes the identity attribute.
	pub fn set_id(&self, value: impl Into<Value>) -> Result<()> {
		let Some(attribute) = self.schema().identity() else {
			return Err(RecordError::UnknownAttribute {
				schema: self.type_name().to_string(),
				attribute: "id".to_string(),
			});
		};
		self.set(attribute, value)
	}

	fn identity_value(&self) -> Option<Value> {
		self.id().filter(|v| !v.is_null())
	}
}

impl PartialEq for Record {
	fn eq(&self, other: &Self) -> bool {
		if self.same_instance(other) {
			return true;
		}
		if self.schema() != other.schema() {
			return false;
		}
		match (self.identity_value(), other.identity_value()) {
			(Some(a), Some(b)) => a == b,
			_ => false,
		}
	}
}

impl Eq for Record {}

impl Hash for Record {
	fn hash<H: Hasher>(&self, state: &mut H) {
		match self.identity_value() {
			Some(id) => id.hash(state),
			None => self.instance_key().hash(state),
		}
	}
}
