//! Graph walker: installs deferred accessors and evaluates them on first read.
//!
//! # Purpose
//!
//! [`bind`] visits every node reachable from a fill root and turns each ready
//! [`Value::Resolver`] into an accessor slot. Nothing is evaluated during the
//! walk; the first [`Node::get`] of a deferred field runs its resolver, binds the
//! produced value, and memoizes it in place.
//!
//! # Mental Model
//!
//! 1. **Bind:** identity-keyed visited set per call; records other than the
//!    root are never entered; plain composite fields recurse with a child view
//!    whose mask is the edge leading to the child.
//! 2. **Evaluate:** slot goes `Deferred → Evaluating`, the resolver runs with a
//!    view of the holding node and a view of the root, chained resolvers are
//!    followed until a plain value comes out, the value is bound and stored.
//! 3. **Freeze:** with [`LazyOptions::freeze`], nodes without resolvers are frozen
//!    during the walk; nodes with resolvers are sealed and frozen once their last
//!    accessor has been replaced.
//!
//! # Invariants
//!
//! - Each node is processed at most once per bind call.
//!   - Enforced in: `bind_node` (visited set keyed by node address).
//!   - Tested by: `walker::tests::binds_plain_cycles`
//!   - Failure symptom: stack overflow on cyclic graphs.
//!
//! - A failed resolver memoizes nothing.
//!   - Enforced in: [`evaluate`] (accessor restored on error).
//!   - Tested by: `walker::tests::failed_resolver_keeps_accessor`
//!   - Failure symptom: field stuck in `Evaluating`, later reads see `Null` forever.

use std::rc::Rc;

use rustc_hash::FxHashSet;

use crate::error::ResolveError;
use crate::freeze;
use crate::node::{Mutability, Node};
use crate::options::LazyOptions;
use crate::resolver::{Resolved, Resolver, ResolverKind};
use crate::value::{Key, Value};
use crate::view::{ContextView, ViewRole};

type Visited = FxHashSet<*const ()>;

/// Per-fill state shared by every accessor installed during one [`bind`] call.
struct Fill {
	root: Node,
	options: LazyOptions,
}

impl Fill {
	/// View of `node` as seen from below, masking the edge `field`.
	fn child_view(&self, node: &Node, parent: Option<&ContextView>, field: &Key) -> ContextView {
		ContextView::new(
			node.clone(),
			parent.cloned(),
			Some(field.clone()),
			ViewRole::Parent,
			self.options.parent_key.clone(),
		)
	}

	/// View of the fill root. Masks `field` only when it sits on the root itself.
	fn root_view(&self, node: &Node, field: &Key) -> ContextView {
		let masked = node.ptr_eq(&self.root).then(|| field.clone());
		ContextView::new(self.root.clone(), None, masked, ViewRole::Root, self.options.parent_key.clone())
	}
}

/// Deferred field accessor stored in a node slot until its first read.
pub(crate) struct Accessor {
	resolver: Resolver,
	parent: Option<ContextView>,
	fill: Rc<Fill>,
}

impl Accessor {
	pub(crate) fn kind(&self) -> ResolverKind {
		self.resolver.kind()
	}
}

/// Binds every deferred field reachable from `root`.
///
/// `root` becomes the root view for every resolver installed by this call.
/// Fails with [`ResolveError::ContextualDisabled`] if a contextual resolver is
/// found while [`LazyOptions::allow_tree_resolvers`] is off.
pub fn bind(root: &Node, options: &LazyOptions) -> Result<(), ResolveError> {
	tracing::trace!(id = ?root.id(), freeze = options.freeze, "binding deferred fields");
	let fill = Rc::new(Fill {
		root: root.clone(),
		options: options.clone(),
	});
	bind_node(root, None, &fill, &mut Visited::default())
}

fn bind_node(node: &Node, parent: Option<&ContextView>, fill: &Rc<Fill>, visited: &mut Visited) -> Result<(), ResolveError> {
	if !visited.insert(node.addr()) {
		return Ok(());
	}

	if node.is_frozen() || !node.has_unbound_resolvers() {
		if fill.options.freeze {
			if node.has_pending() {
				seal(node);
			} else {
				node.set_mutability(Mutability::Frozen);
			}
		}
		for (key, child) in node.plain_children() {
			let view = fill.child_view(node, parent, &key);
			bind_node(&child, Some(&view), fill, visited)?;
		}
		return Ok(());
	}

	let entries = node.ready_entries();
	if !fill.options.allow_tree_resolvers {
		let contextual = entries
			.iter()
			.find(|(_, value)| value.resolver_kind() == Some(ResolverKind::Contextual));
		if let Some((key, _)) = contextual {
			return Err(ResolveError::ContextualDisabled { field: key.clone() });
		}
	}

	for (key, value) in entries {
		match value {
			Value::Resolver(resolver) => {
				tracing::trace!(field = %key, kind = ?resolver.kind(), "installing deferred accessor");
				let accessor = Accessor {
					resolver,
					parent: parent.cloned(),
					fill: fill.clone(),
				};
				node.install(&key, accessor, fill.options.track_pending);
			}
			Value::Node(child) if !child.is_record() => {
				let view = fill.child_view(node, parent, &key);
				bind_node(&child, Some(&view), fill, visited)?;
			}
			_ => {}
		}
	}

	if fill.options.freeze {
		seal(node);
	}
	Ok(())
}

fn seal(node: &Node) {
	node.set_mutability(Mutability::Sealed);
	node.set_freeze_when_resolved();
}

/// Runs the accessor behind `node[key]` and memoizes the result.
///
/// Called by [`Node::get`] for deferred slots only.
pub(crate) fn evaluate(node: &Node, key: &Key) -> Result<Value, ResolveError> {
	let Some(accessor) = node.begin_evaluation(key) else {
		return node.get(key);
	};

	match produce(node, key, &accessor) {
		Ok(value) => {
			node.finish_evaluation(key, value.clone());
			if node.freeze_when_resolved() && !node.has_pending() {
				freeze::deep_freeze(node);
			}
			Ok(value)
		}
		Err(err) => {
			tracing::debug!(field = %key, error = %err, "resolver failed, accessor restored");
			node.abort_evaluation(key, accessor);
			Err(err)
		}
	}
}

fn produce(node: &Node, key: &Key, accessor: &Accessor) -> Resolved {
	let fill = &accessor.fill;
	let mut resolver = accessor.resolver.clone();
	let mut depth = 0usize;

	let value = loop {
		if resolver.kind() == ResolverKind::Contextual && !fill.options.allow_tree_resolvers {
			return Err(ResolveError::ContextualDisabled { field: key.clone() });
		}
		tracing::trace!(field = %key, kind = ?resolver.kind(), depth, "evaluating deferred field");
		let produced = resolver.invoke(|| {
			(
				fill.child_view(node, accessor.parent.as_ref(), key),
				fill.root_view(node, key),
			)
		})?;
		match produced {
			Value::Resolver(next) => {
				resolver = next;
				depth += 1;
			}
			// Views live for one invocation; the node behind one is already bound.
			Value::View(view) => return Ok(Value::Node(view.node().clone())),
			other => break other,
		}
	};

	if let Value::Node(child) = &value {
		if !child.is_record() {
			let view = fill.child_view(node, accessor.parent.as_ref(), key);
			bind_node(child, Some(&view), fill, &mut Visited::default())?;
		}
	}
	Ok(value)
}
