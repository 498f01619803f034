//! Records whose attributes may be loaded lazily.
//!
//! - [`Schema`] declares the attributes of a record type, optionally with an
//!   identity attribute and a per-attribute [`TypeContract`].
//! - [`Record`] stores loaded values and resolves missing ones on demand
//!   through a one-shot [`Resolver`].
//! - [`codec`] encodes records to JSON and decodes them back through a
//!   [`SchemaCatalog`].
//!
//! ```
//! use thinmodels_record::{Record, Schema, Value};
//!
//! let schema = Schema::define("Foo", ["foo", "bar"])?;
//! let record = Record::lazy(&schema, |_, attribute| Ok(Value::from(attribute.name())));
//! assert_eq!(record.fetch("foo")?.as_str(), Some("foo"));
//! assert!(record.attribute_loaded("foo"));
//! assert!(!record.attribute_loaded("bar"));
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```

#[cfg(feature = "codec")]
pub mod codec;
pub mod error;
pub mod record;
pub mod schema;
pub mod value;

pub use error::{RecordError, ResolveFailure, Result, SchemaError};
pub use record::{Record, Resolver};
pub use schema::{AttrId, AttrKey, Attribute, Conformance, Schema, SchemaBuilder, SchemaCatalog, TypeContract};
pub use value::{Value, ValueType};
