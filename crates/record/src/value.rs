use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use crate::record::Record;

/// The value of a record attribute.
#[derive(Debug, Clone, Default)]
pub enum Value {
	/// Explicit null. A loaded `Null` is still a loaded attribute.
	#[default]
	Null,
	/// Boolean value.
	Bool(bool),
	/// Integer value.
	Int(i64),
	/// Floating point value. Compared and hashed by bit pattern.
	Float(f64),
	/// String value.
	String(String),
	/// Ordered list of values.
	List(Vec<Value>),
	/// String-keyed map of values.
	Map(BTreeMap<String, Value>),
	/// Nested record handle.
	Record(Record),
}

impl Value {
	/// Returns true for [`Value::Null`].
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	/// Returns the boolean value if this is a `Bool` variant.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(v) => Some(*v),
			_ => None,
		}
	}

	/// Returns the integer value if this is an `Int` variant.
	pub fn as_int(&self) -> Option<i64> {
		match self {
			Value::Int(v) => Some(*v),
			_ => None,
		}
	}

	/// Returns the float value if this is a `Float` variant.
	pub fn as_float(&self) -> Option<f64> {
		match self {
			Value::Float(v) => Some(*v),
			_ => None,
		}
	}

	/// Returns the string value if this is a `String` variant.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::String(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_list(&self) -> Option<&[Value]> {
		match self {
			Value::List(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
		match self {
			Value::Map(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_record(&self) -> Option<&Record> {
		match self {
			Value::Record(v) => Some(v),
			_ => None,
		}
	}

	/// Returns true if this value matches the given shallow type.
	///
	/// Only the outermost variant is inspected; list elements and map values
	/// are never examined.
	pub fn matches_type(&self, ty: ValueType) -> bool {
		matches!(
			(self, ty),
			(_, ValueType::Any)
				| (Value::Null, ValueType::Null)
				| (Value::Bool(_), ValueType::Bool)
				| (Value::Int(_), ValueType::Int)
				| (Value::Float(_), ValueType::Float)
				| (Value::String(_), ValueType::String)
				| (Value::List(_), ValueType::List)
				| (Value::Map(_), ValueType::Map)
				| (Value::Record(_), ValueType::Record)
		)
	}

	/// Returns the type name of this value.
	pub fn type_name(&self) -> &'static str {
		match self {
			Value::Null => "null",
			Value::Bool(_) => "bool",
			Value::Int(_) => "int",
			Value::Float(_) => "float",
			Value::String(_) => "string",
			Value::List(_) => "list",
			Value::Map(_) => "map",
			Value::Record(_) => "record",
		}
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Value::Null, Value::Null) => true,
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(Value::Int(a), Value::Int(b)) => a == b,
			(Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
			(Value::String(a), Value::String(b)) => a == b,
			(Value::List(a), Value::List(b)) => a == b,
			(Value::Map(a), Value::Map(b)) => a == b,
			(Value::Record(a), Value::Record(b)) => a == b,
			_ => false,
		}
	}
}

impl Eq for Value {}

impl Hash for Value {
	fn hash<H: Hasher>(&self, state: &mut H) {
		core::mem::discriminant(self).hash(state);
		match self {
			Value::Null => {}
			Value::Bool(v) => v.hash(state),
			Value::Int(v) => v.hash(state),
			Value::Float(v) => v.to_bits().hash(state),
			Value::String(v) => v.hash(state),
			Value::List(v) => v.hash(state),
			Value::Map(v) => v.hash(state),
			Value::Record(v) => v.hash(state),
		}
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Value::Bool(v)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::Int(v)
	}
}

impl From<i32> for Value {
	fn from(v: i32) -> Self {
		Value::Int(i64::from(v))
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Value::Float(v)
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::String(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::String(v.to_string())
	}
}

impl From<Record> for Value {
	fn from(v: Record) -> Self {
		Value::Record(v)
	}
}

impl<T: Into<Value>> From<Vec<T>> for Value {
	fn from(v: Vec<T>) -> Self {
		Value::List(v.into_iter().map(Into::into).collect())
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(v: Option<T>) -> Self {
		v.map_or(Value::Null, Into::into)
	}
}

/// The shallow type of a value, used by type contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
	/// Accepts every value.
	Any,
	Null,
	Bool,
	Int,
	Float,
	String,
	List,
	Map,
	Record,
}

impl ValueType {
	pub fn name(self) -> &'static str {
		match self {
			ValueType::Any => "any",
			ValueType::Null => "null",
			ValueType::Bool => "bool",
			ValueType::Int => "int",
			ValueType::Float => "float",
			ValueType::String => "string",
			ValueType::List => "list",
			ValueType::Map => "map",
			ValueType::Record => "record",
		}
	}
}

impl core::fmt::Display for ValueType {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.write_str(self.name())
	}
}
