//! Resolved JSON snapshots of a node graph.

use rustc_hash::FxHashSet;
use serde_json::{Map, Number, Value as Json};

use crate::error::ResolveError;
use crate::node::{Node, Shape};
use crate::value::{Key, Value};

/// Errors raised while exporting a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
	/// A plain node contains itself.
	#[error("cycle through field \"{field}\" has no snapshot form")]
	Cycle { field: Key },

	/// A value that only exists at runtime.
	#[error("field \"{field}\" holds a {kind}, which has no snapshot form")]
	Opaque { field: Key, kind: &'static str },

	#[error(transparent)]
	Resolve(#[from] ResolveError),
}

impl Node {
	/// Resolves every reachable field and renders the result as JSON.
	///
	/// Nested records render as `{"$record": <type>, "id": <id>}` references.
	/// Shared plain nodes are rendered at each occurrence.
	pub fn to_json(&self) -> Result<Json, SnapshotError> {
		let mut ancestors = FxHashSet::default();
		render_node(self, &mut ancestors)
	}
}

fn render_node(node: &Node, ancestors: &mut FxHashSet<*const ()>) -> Result<Json, SnapshotError> {
	ancestors.insert(node.addr());
	let entries = node.entries()?;
	let rendered = match node.shape() {
		Shape::List => Json::Array(
			entries
				.into_iter()
				.map(|(key, value)| render_value(&key, &value, ancestors))
				.collect::<Result<_, _>>()?,
		),
		Shape::Object => {
			let mut map = Map::with_capacity(entries.len());
			for (key, value) in entries {
				let json = render_value(&key, &value, ancestors)?;
				map.insert(key.to_string(), json);
			}
			Json::Object(map)
		}
	};
	ancestors.remove(&node.addr());
	Ok(rendered)
}

fn render_value(key: &Key, value: &Value, ancestors: &mut FxHashSet<*const ()>) -> Result<Json, SnapshotError> {
	Ok(match value {
		Value::Null => Json::Null,
		Value::Bool(v) => Json::Bool(*v),
		Value::Int(v) => Json::from(*v),
		Value::Float(v) => Number::from_f64(*v).map_or(Json::Null, Json::Number),
		Value::Str(v) => Json::String(v.to_string()),
		Value::Node(child) => match child.record_tag() {
			Some(tag) => serde_json::json!({ "$record": tag.record_type(), "id": tag.id() }),
			None if ancestors.contains(&child.addr()) => return Err(SnapshotError::Cycle { field: key.clone() }),
			None => render_node(child, ancestors)?,
		},
		Value::Function(_) | Value::Resolver(_) | Value::View(_) => {
			return Err(SnapshotError::Opaque {
				field: key.clone(),
				kind: value.type_name(),
			});
		}
	})
}
