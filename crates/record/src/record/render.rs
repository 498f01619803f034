use core::fmt::{self, Write};

use rustc_hash::FxHashSet;

use super::Record;
use crate::value::Value;

/// Instances currently being rendered by one formatting call.
///
/// A record reached again while its own rendering is still in progress is
/// printed as `#<Type ...>` instead of recursing.
#[derive(Default)]
pub(crate) struct Rendering {
	active: FxHashSet<usize>,
}

impl Record {
	fn render<W: Write>(&self, out: &mut W, rendering: &mut Rendering) -> fmt::Result {
		write!(out, "#<{}", self.type_name())?;
		let key = self.instance_key();
		if !rendering.active.insert(key) {
			return out.write_str(" ...>");
		}

		let values = self.loaded_values();
		let lazy = self.has_resolver();
		let mut first = true;
		for (name, value) in &values {
			if !first {
				out.write_char(',')?;
			}
			first = false;
			write!(out, " {name}=")?;
			render_value(value, out, rendering)?;
		}
		if lazy {
			if !first {
				out.write_char(',')?;
			}
			out.write_str(" ...")?;
		}

		rendering.active.remove(&key);
		out.write_char('>')
	}
}

fn render_value<W: Write>(value: &Value, out: &mut W, rendering: &mut Rendering) -> fmt::Result {
	match value {
		Value::Null => out.write_str("null"),
		Value::Bool(v) => write!(out, "{v}"),
		Value::Int(v) => write!(out, "{v}"),
		Value::Float(v) => write!(out, "{v:?}"),
		Value::String(v) => write!(out, "{v:?}"),
		Value::List(items) => {
			out.write_char('[')?;
			for (i, item) in items.iter().enumerate() {
				if i > 0 {
					out.write_str(", ")?;
				}
				render_value(item, out, rendering)?;
			}
			out.write_char(']')
		}
		Value::Map(entries) => {
			out.write_char('{')?;
			for (i, (k, v)) in entries.iter().enumerate() {
				if i > 0 {
					out.write_str(", ")?;
				}
				write!(out, "{k:?}: ")?;
				render_value(v, out, rendering)?;
			}
			out.write_char('}')
		}
		Value::Record(record) => record.render(out, rendering),
	}
}

impl fmt::Display for Record {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.render(f, &mut Rendering::default())
	}
}

impl fmt::Debug for Record {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.render(f, &mut Rendering::default())
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		render_value(self, f, &mut Rendering::default())
	}
}
