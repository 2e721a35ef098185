//! Immutability pass.
//!
//! [`deep_freeze`] freezes a node and every ready composite reachable from it.
//! Records other than the target own their own lifecycle and are skipped, and
//! frozen nodes are not re-entered. A node that still has pending accessors is
//! sealed instead and frozen, deeply, when its last accessor is replaced.

use rustc_hash::FxHashSet;

use crate::node::{Mutability, Node};

/// Freezes `node` and its reachable plain composites.
pub fn deep_freeze(node: &Node) {
	let mut sealed = FxHashSet::default();
	freeze_node(node, &mut sealed);
}

fn freeze_node(node: &Node, sealed: &mut FxHashSet<*const ()>) {
	if node.is_frozen() {
		return;
	}

	if node.has_pending() {
		if !sealed.insert(node.addr()) {
			return;
		}
		tracing::trace!(id = ?node.id(), "sealing node with pending accessors");
		node.set_mutability(Mutability::Sealed);
		node.set_freeze_when_resolved();
	} else {
		node.set_mutability(Mutability::Frozen);
	}

	for (_, child) in node.plain_children() {
		freeze_node(&child, sealed);
	}
}
