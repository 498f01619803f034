//! JSON encoding and decoding of records.
//!
//! A record encodes as a JSON object holding its loaded attributes plus a
//! [`DISCRIMINATOR`] member naming its type. Decoding looks the type up in a
//! [`SchemaCatalog`] and keeps only members the type declares; anything else
//! is ignored so older or richer payloads still load.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use serde_json::{Map, Number, Value as Json};
use thiserror::Error;

use crate::error::RecordError;
use crate::record::Record;
use crate::schema::{Schema, SchemaCatalog};
use crate::value::Value;


/// Object member carrying the record type name.
pub const DISCRIMINATOR: &str = "json_class";

/// Errors raised while encoding or decoding records.
#[derive(Debug, Error)]
pub enum CodecError {
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// A record contains itself through its loaded values.
	#[error("cannot encode {schema}: record graph contains a cycle")]
	Cycle { schema: String },

	/// JSON numbers cannot represent NaN or infinities.
	#[error("cannot encode non-finite float {0}")]
	NonFiniteFloat(f64),

	/// The record type declares an attribute named like the discriminator.
	#[error("attribute 'json_class' of {schema} collides with the type discriminator")]
	ReservedAttribute { schema: String },

	#[error("missing 'json_class' member")]
	MissingDiscriminator,

	#[error("unknown record type '{0}'")]
	UnknownType(String),

	#[error("expected a JSON object, got {0}")]
	NotAnObject(&'static str),

	#[error(transparent)]
	Record(#[from] RecordError),
}

/// Encodes the loaded attributes of `record` with its type discriminator.
///
/// Unloaded attributes are not resolved and do not appear in the output.
pub fn encode(record: &Record) -> Result<Json, CodecError> {
	Encoder::default().record(record)
}

pub fn to_string(record: &Record) -> Result<String, CodecError> {
	Ok(serde_json::to_string(&encode(record)?)?)
}

/// Decodes a record whose type is named by the payload's discriminator.
pub fn decode(catalog: &SchemaCatalog, json: &Json) -> Result<Record, CodecError> {
	let object = as_object(json)?;
	let name = object
		.get(DISCRIMINATOR)
		.and_then(Json::as_str)
		.ok_or(CodecError::MissingDiscriminator)?;
	let schema = catalog.get(name).ok_or_else(|| CodecError::UnknownType(name.to_string()))?;
	decode_object(catalog, schema, object)
}

pub fn from_str(catalog: &SchemaCatalog, text: &str) -> Result<Record, CodecError> {
	decode(catalog, &serde_json::from_str(text)?)
}

/// Decodes `object` as a record of `schema`, ignoring any discriminator it carries.
pub fn decode_as(catalog: &SchemaCatalog, schema: &Schema, json: &Json) -> Result<Record, CodecError> {
	decode_object(catalog, schema, as_object(json)?)
}

fn as_object(json: &Json) -> Result<&Map<String, Json>, CodecError> {
	json.as_object().ok_or_else(|| CodecError::NotAnObject(json_type(json)))
}

fn json_type(json: &Json) -> &'static str {
	match json {
		Json::Null => "null",
		Json::Bool(_) => "bool",
		Json::Number(_) => "number",
		Json::String(_) => "string",
		Json::Array(_) => "array",
		Json::Object(_) => "object",
	}
}

fn decode_object(catalog: &SchemaCatalog, schema: &Schema, object: &Map<String, Json>) -> Result<Record, CodecError> {
	let mut values = Vec::with_capacity(object.len());
	let mut ignored = Vec::new();
	for (name, json) in object {
		if name == DISCRIMINATOR {
			continue;
		}
		match schema.attribute(name) {
			Some(attribute) => values.push((attribute.id(), decode_value(catalog, json)?)),
			None => ignored.push(name.as_str()),
		}
	}
	if !ignored.is_empty() {
		tracing::warn!(
			domain = "record",
			schema = schema.name(),
			?ignored,
			"decode ignored undeclared attributes",
		);
	}
	Ok(Record::from_values(schema, values)?)
}

fn decode_value(catalog: &SchemaCatalog, json: &Json) -> Result<Value, CodecError> {
	Ok(match json {
		Json::Null => Value::Null,
		Json::Bool(v) => Value::Bool(*v),
		Json::Number(n) => match n.as_i64() {
			Some(i) => Value::Int(i),
			None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
		},
		Json::String(s) => Value::String(s.clone()),
		Json::Array(items) => Value::List(
			items
				.iter()
				.map(|item| decode_value(catalog, item))
				.collect::<Result<_, _>>()?,
		),
		Json::Object(object) => {
			let nested = object
				.get(DISCRIMINATOR)
				.and_then(Json::as_str)
				.and_then(|name| catalog.get(name));
			match nested {
				Some(schema) => Value::Record(decode_object(catalog, schema, object)?),
				None => Value::Map(
					object
						.iter()
						.map(|(k, v)| Ok((k.clone(), decode_value(catalog, v)?)))
						.collect::<Result<BTreeMap<_, _>, CodecError>>()?,
				),
			}
		}
	})
}

/// Tracks the records on the current encoding path.
#[derive(Default)]
struct Encoder {
	active: FxHashSet<usize>,
}

impl Encoder {
	fn record(&mut self, record: &Record) -> Result<Json, CodecError> {
		if record.schema().contains(DISCRIMINATOR) {
			return Err(CodecError::ReservedAttribute {
				schema: record.type_name().to_string(),
			});
		}
		let key = record.instance_key();
		if !self.active.insert(key) {
			return Err(CodecError::Cycle {
				schema: record.type_name().to_string(),
			});
		}
		let mut object = Map::new();
		for (name, value) in record.loaded_values() {
			object.insert(name.to_string(), self.value(&value)?);
		}
		object.insert(DISCRIMINATOR.to_string(), Json::String(record.type_name().to_string()));
		self.active.remove(&key);
		Ok(Json::Object(object))
	}

	fn value(&mut self, value: &Value) -> Result<Json, CodecError> {
		Ok(match value {
			Value::Null => Json::Null,
			Value::Bool(v) => Json::Bool(*v),
			Value::Int(v) => Json::Number((*v).into()),
			Value::Float(v) => Json::Number(Number::from_f64(*v).ok_or(CodecError::NonFiniteFloat(*v))?),
			Value::String(v) => Json::String(v.clone()),
			Value::List(items) => Json::Array(items.iter().map(|item| self.value(item)).collect::<Result<_, _>>()?),
			Value::Map(entries) => {
				let mut object = Map::new();
				for (k, v) in entries {
					object.insert(k.clone(), self.value(v)?);
				}
				Json::Object(object)
			}
			Value::Record(record) => self.record(record)?,
		})
	}
}

impl serde::Serialize for Record {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let json = encode(self).map_err(serde::ser::Error::custom)?;
		serde::Serialize::serialize(&json, serializer)
	}
}
