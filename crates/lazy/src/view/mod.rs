//! Context views: read-through facades handed to contextual resolvers.
//!
//! A view wraps a real node and adds two things on top of it: a synthetic
//! parent link exposed under the configured parent key, and a masked field
//! that reads as absent. Fields whose resolver is currently running read as
//! absent from any node (see [`Node::get`]), so self-reads never re-enter a
//! resolver and never fail, at any depth.

use std::fmt;
use std::rc::Rc;

use crate::error::ResolveError;
use crate::node::Node;
use crate::value::{Key, Value};

/// Role a view plays for the resolver it is handed to. Diagnostic only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewRole {
	Parent,
	Root,
}

struct ViewInner {
	node: Node,
	parent: Option<ContextView>,
	masked: Option<Key>,
	role: ViewRole,
	parent_key: Option<Rc<str>>,
}

/// Ephemeral view over a node during one resolver invocation.
#[derive(Clone)]
pub struct ContextView(Rc<ViewInner>);

impl ContextView {
	/// Creates a view over `node`.
	///
	/// `masked` is the field that reads as absent, normally the one being
	/// computed or the edge leading towards it. `parent_key` names the synthetic
	/// parent field; `None` suppresses it.
	pub fn new(
		node: Node,
		parent: Option<ContextView>,
		masked: Option<Key>,
		role: ViewRole,
		parent_key: Option<Rc<str>>,
	) -> Self {
		Self(Rc::new(ViewInner {
			node,
			parent,
			masked,
			role,
			parent_key,
		}))
	}

	/// The real node behind this view.
	pub fn node(&self) -> &Node {
		&self.0.node
	}

	/// The next view up, if any.
	pub fn parent(&self) -> Option<&ContextView> {
		self.0.parent.as_ref()
	}

	pub fn masked(&self) -> Option<&Key> {
		self.0.masked.as_ref()
	}

	pub fn role(&self) -> ViewRole {
		self.0.role
	}

	pub fn parent_key(&self) -> Option<&str> {
		self.0.parent_key.as_deref()
	}

	fn is_parent_key(&self, key: &Key) -> bool {
		match (&self.0.parent_key, key) {
			(Some(parent_key), Key::Name(name)) => parent_key == name,
			_ => false,
		}
	}

	/// Reads a field through the view.
	///
	/// The parent key yields the parent view (or `Null` at the top) and the
	/// masked field yields `Null`. Everything else reads from the node,
	/// evaluating deferred fields.
	pub fn get(&self, key: impl Into<Key>) -> Result<Value, ResolveError> {
		let key = key.into();
		if self.is_parent_key(&key) {
			return Ok(self.0.parent.clone().map_or(Value::Null, Value::View));
		}
		if self.0.masked.as_ref() == Some(&key) {
			tracing::trace!(field = %key, role = ?self.0.role, "masked read through context view");
			return Ok(Value::Null);
		}
		self.0.node.get(key)
	}

	/// Field keys: the parent key first (if configured), then the node's keys.
	///
	/// The masked key stays in the list; only its value is hidden.
	pub fn keys(&self) -> Vec<Key> {
		let mut keys = Vec::with_capacity(self.0.node.len() + 1);
		if let Some(parent_key) = &self.0.parent_key {
			keys.push(Key::Name(parent_key.clone()));
		}
		keys.extend(self.0.node.keys().into_iter().filter(|key| !self.is_parent_key(key)));
		keys
	}

	/// Reads every field in [`ContextView::keys`] order.
	pub fn entries(&self) -> Result<Vec<(Key, Value)>, ResolveError> {
		self.keys()
			.into_iter()
			.map(|key| {
				let value = self.get(&key)?;
				Ok((key, value))
			})
			.collect()
	}

	/// Follows `path` starting at this view; see [`Value::lookup`].
	pub fn lookup<I, K>(&self, path: I) -> Result<Value, ResolveError>
	where
		I: IntoIterator<Item = K>,
		K: Into<Key>,
	{
		Value::View(self.clone()).lookup(path)
	}

	/// Returns true if both handles are the same view.
	pub fn ptr_eq(&self, other: &ContextView) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for ContextView {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ContextView")
			.field("role", &self.0.role)
			.field("node", &self.0.node)
			.field("masked", &self.0.masked)
			.field("has_parent", &self.0.parent.is_some())
			.finish()
	}
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests;
