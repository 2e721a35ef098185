//! Graph nodes: ordered, shared field storage with one-way mutability.
//!
//! # Mental Model
//!
//! A [`Node`] is a cheap handle over shared slots. Each slot is one of:
//!
//! - **Ready:** an ordinary stored value.
//! - **Deferred:** an accessor installed by the walker; the first read runs the
//!   resolver and replaces the slot with a ready value.
//! - **Evaluating:** the accessor's resolver is running right now.
//!
//! Mutability only moves forward: `Open → Sealed → Frozen`. A sealed node has a
//! final shape and rejects user writes, but its pending accessors may still be
//! replaced once each by the engine.
//!
//! # Invariants
//!
//! - A deferred slot is evaluated at most once on success.
//!   - Enforced in: [`crate::walker::evaluate`] (slot swapped to `Evaluating` before the call).
//!   - Tested by: `walker::tests::memoizes_resolver_once`
//!   - Failure symptom: resolver side effects observed twice.
//!
//! - Reading an `Evaluating` slot yields `Null`, whether the read comes through
//!   a context view or from a node reached by navigating one.
//!   - Enforced in: [`Node::get`].
//!   - Tested by: `walker::tests::self_reads_through_root_are_absent`
//!   - Failure symptom: a resolver re-entering itself, or a self-read failing.
//!
//! - No `RefCell` borrow of the slots is held while user code runs.
//!   - Enforced in: [`Node::get`] (state snapshot before evaluation).
//!   - Tested by: `walker::tests::resolver_reads_sibling_fields`
//!   - Failure symptom: `BorrowMutError` panics on nested reads.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashSet;

use crate::error::{MutationError, ResolveError};
use crate::resolver::ResolverKind;
use crate::value::{Fields, Key, Value};
use crate::walker::{self, Accessor};

/// Identity and type marker of a record node.
///
/// Set once when the stub is created and never changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordTag {
	id: Rc<str>,
	record_type: Rc<str>,
}

impl RecordTag {
	pub fn new(id: impl Into<Rc<str>>, record_type: impl Into<Rc<str>>) -> Self {
		Self {
			id: id.into(),
			record_type: record_type.into(),
		}
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn record_type(&self) -> &str {
		&self.record_type
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
	Object,
	List,
}

/// How far a node has progressed towards immutability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Mutability {
	#[default]
	Open,
	/// Shape is final; only pending accessors may still be replaced.
	Sealed,
	Frozen,
}

/// Observable state of one field, read without triggering evaluation.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldState {
	Ready(Value),
	Deferred(ResolverKind),
	Evaluating,
}

pub(crate) enum Slot {
	Ready(Value),
	Deferred(Accessor),
	Evaluating,
}

struct NodeInner {
	shape: Shape,
	record: Option<RecordTag>,
	slots: RefCell<IndexMap<Key, Slot>>,
	mutability: Cell<Mutability>,
	freeze_when_resolved: Cell<bool>,
	pending: RefCell<IndexSet<Key>>,
}

/// Shared handle to an object, list or record.
///
/// Cloning the handle never copies fields; equality is identity.
#[derive(Clone)]
pub struct Node(Rc<NodeInner>);

impl Node {
	fn with_parts(shape: Shape, record: Option<RecordTag>) -> Self {
		Self(Rc::new(NodeInner {
			shape,
			record,
			slots: RefCell::new(IndexMap::new()),
			mutability: Cell::new(Mutability::Open),
			freeze_when_resolved: Cell::new(false),
			pending: RefCell::new(IndexSet::new()),
		}))
	}

	/// Creates an empty object node.
	pub fn object() -> Self {
		Self::with_parts(Shape::Object, None)
	}

	/// Creates an empty list node.
	pub fn list() -> Self {
		Self::with_parts(Shape::List, None)
	}

	/// Creates an empty record stub.
	pub fn record(tag: RecordTag) -> Self {
		Self::with_parts(Shape::Object, Some(tag))
	}

	/// Creates an object node holding `fields` in order.
	pub fn from_fields(fields: Fields) -> Self {
		let node = Self::object();
		node.0.slots.borrow_mut().extend(fields.into_iter().map(|(k, v)| (k, Slot::Ready(v))));
		node
	}

	/// Creates a list node holding `values` in order.
	pub fn list_from<I, V>(values: I) -> Self
	where
		I: IntoIterator<Item = V>,
		V: Into<Value>,
	{
		let node = Self::list();
		node.0
			.slots
			.borrow_mut()
			.extend(values.into_iter().enumerate().map(|(i, v)| (Key::Index(i), Slot::Ready(v.into()))));
		node
	}

	pub fn shape(&self) -> Shape {
		self.0.shape
	}

	pub fn record_tag(&self) -> Option<&RecordTag> {
		self.0.record.as_ref()
	}

	pub fn is_record(&self) -> bool {
		self.0.record.is_some()
	}

	/// Record id, if this node is a record.
	pub fn id(&self) -> Option<&str> {
		self.0.record.as_ref().map(RecordTag::id)
	}

	/// Record type, if this node is a record.
	pub fn record_type(&self) -> Option<&str> {
		self.0.record.as_ref().map(RecordTag::record_type)
	}

	/// Returns true if both handles refer to the same node.
	pub fn ptr_eq(&self, other: &Node) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	pub(crate) fn addr(&self) -> *const () {
		Rc::as_ptr(&self.0).cast()
	}

	pub fn len(&self) -> usize {
		self.0.slots.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.slots.borrow().is_empty()
	}

	/// Field keys in insertion order. Never evaluates anything.
	pub fn keys(&self) -> Vec<Key> {
		self.0.slots.borrow().keys().cloned().collect()
	}

	pub fn contains_key(&self, key: impl Into<Key>) -> bool {
		self.0.slots.borrow().contains_key(&key.into())
	}

	/// Reads a field, running its resolver if it is still deferred.
	///
	/// Missing fields read as [`Value::Null`], and so does a field whose resolver
	/// is currently running, however the read reaches it.
	pub fn get(&self, key: impl Into<Key>) -> Result<Value, ResolveError> {
		let key = key.into();
		match self.peek(&key) {
			None => Ok(Value::Null),
			Some(FieldState::Ready(value)) => Ok(value),
			Some(FieldState::Evaluating) => {
				tracing::trace!(field = %key, "in-flight field read as null");
				Ok(Value::Null)
			}
			Some(FieldState::Deferred(_)) => walker::evaluate(self, &key),
		}
	}

	/// Returns the state of a field without evaluating it.
	pub fn peek(&self, key: impl Into<Key>) -> Option<FieldState> {
		let key = key.into();
		let slots = self.0.slots.borrow();
		slots.get(&key).map(|slot| match slot {
			Slot::Ready(value) => FieldState::Ready(value.clone()),
			Slot::Deferred(accessor) => FieldState::Deferred(accessor.kind()),
			Slot::Evaluating => FieldState::Evaluating,
		})
	}

	/// Returns true if the field is backed by an accessor that has not run yet.
	pub fn is_deferred(&self, key: impl Into<Key>) -> bool {
		matches!(self.peek(key), Some(FieldState::Deferred(_)))
	}

	/// Reads every field in order, evaluating deferred ones.
	pub fn entries(&self) -> Result<Vec<(Key, Value)>, ResolveError> {
		self.keys()
			.into_iter()
			.map(|key| {
				let value = self.get(&key)?;
				Ok((key, value))
			})
			.collect()
	}

	/// Writes a field, returning the previous value.
	pub fn insert(&self, key: impl Into<Key>, value: impl Into<Value>) -> Result<Option<Value>, MutationError> {
		let key = key.into();
		self.check_writable(&key)?;
		let mut slots = self.0.slots.borrow_mut();
		if matches!(slots.get(&key), Some(Slot::Deferred(_) | Slot::Evaluating)) {
			return Err(MutationError::Deferred { field: key });
		}
		Ok(match slots.insert(key, Slot::Ready(value.into())) {
			Some(Slot::Ready(previous)) => Some(previous),
			_ => None,
		})
	}

	/// Appends to a list node.
	pub fn push(&self, value: impl Into<Value>) -> Result<(), MutationError> {
		if self.0.shape != Shape::List {
			return Err(MutationError::NotAList);
		}
		let key = Key::Index(self.len());
		self.check_writable(&key)?;
		self.0.slots.borrow_mut().insert(key, Slot::Ready(value.into()));
		Ok(())
	}

	/// Merges `fields` in order; later keys overwrite earlier values in place.
	pub fn merge(&self, fields: Fields) -> Result<(), MutationError> {
		for (key, value) in fields {
			self.insert(key, value)?;
		}
		Ok(())
	}

	fn check_writable(&self, key: &Key) -> Result<(), MutationError> {
		match self.0.mutability.get() {
			Mutability::Open => Ok(()),
			Mutability::Sealed => Err(MutationError::Sealed { field: key.clone() }),
			Mutability::Frozen => Err(MutationError::Frozen { field: key.clone() }),
		}
	}

	pub fn mutability(&self) -> Mutability {
		self.0.mutability.get()
	}

	pub fn is_frozen(&self) -> bool {
		self.0.mutability.get() == Mutability::Frozen
	}

	pub fn is_sealed(&self) -> bool {
		self.0.mutability.get() == Mutability::Sealed
	}

	/// Forces every deferred field reachable from this node.
	///
	/// Other records are not entered; they resolve through their own reads.
	pub fn resolve_all(&self) -> Result<(), ResolveError> {
		let mut visited = FxHashSet::default();
		self.resolve_reachable(&mut visited)
	}

	fn resolve_reachable(&self, visited: &mut FxHashSet<*const ()>) -> Result<(), ResolveError> {
		if !visited.insert(self.addr()) {
			return Ok(());
		}
		for key in self.keys() {
			if let Value::Node(child) = self.get(key)? {
				if !child.is_record() {
					child.resolve_reachable(visited)?;
				}
			}
		}
		Ok(())
	}

	// Engine-side slot access. None of these hold a borrow past their return.

	pub(crate) fn set_mutability(&self, mutability: Mutability) {
		if mutability > self.0.mutability.get() {
			self.0.mutability.set(mutability);
		}
	}

	pub(crate) fn freeze_when_resolved(&self) -> bool {
		self.0.freeze_when_resolved.get()
	}

	pub(crate) fn set_freeze_when_resolved(&self) {
		self.0.freeze_when_resolved.set(true);
	}

	/// True if any slot is deferred or evaluating.
	pub(crate) fn has_pending(&self) -> bool {
		self.0
			.slots
			.borrow()
			.values()
			.any(|slot| matches!(slot, Slot::Deferred(_) | Slot::Evaluating))
	}

	/// True if any ready slot still holds an uninstalled resolver.
	pub(crate) fn has_unbound_resolvers(&self) -> bool {
		self.0
			.slots
			.borrow()
			.values()
			.any(|slot| matches!(slot, Slot::Ready(Value::Resolver(_))))
	}

	/// Snapshot of all ready slots in order.
	pub(crate) fn ready_entries(&self) -> Vec<(Key, Value)> {
		self.0
			.slots
			.borrow()
			.iter()
			.filter_map(|(key, slot)| match slot {
				Slot::Ready(value) => Some((key.clone(), value.clone())),
				_ => None,
			})
			.collect()
	}

	/// Ready composite children that are not records.
	pub(crate) fn plain_children(&self) -> Vec<(Key, Node)> {
		self.ready_entries()
			.into_iter()
			.filter_map(|(key, value)| match value {
				Value::Node(child) if !child.is_record() => Some((key, child)),
				_ => None,
			})
			.collect()
	}

	/// Replaces a ready resolver slot with an accessor.
	pub(crate) fn install(&self, key: &Key, accessor: Accessor, track: bool) {
		if let Some(slot) = self.0.slots.borrow_mut().get_mut(key) {
			*slot = Slot::Deferred(accessor);
		}
		if track {
			self.0.pending.borrow_mut().insert(key.clone());
		}
	}

	/// Takes the accessor out of a deferred slot, leaving it `Evaluating`.
	pub(crate) fn begin_evaluation(&self, key: &Key) -> Option<Accessor> {
		let mut slots = self.0.slots.borrow_mut();
		let slot = slots.get_mut(key)?;
		match std::mem::replace(slot, Slot::Evaluating) {
			Slot::Deferred(accessor) => Some(accessor),
			other => {
				*slot = other;
				None
			}
		}
	}

	/// Puts an accessor back after a failed evaluation.
	pub(crate) fn abort_evaluation(&self, key: &Key, accessor: Accessor) {
		if let Some(slot) = self.0.slots.borrow_mut().get_mut(key) {
			*slot = Slot::Deferred(accessor);
		}
	}

	/// Stores the produced value in place of the accessor.
	pub(crate) fn finish_evaluation(&self, key: &Key, value: Value) {
		if let Some(slot) = self.0.slots.borrow_mut().get_mut(key) {
			*slot = Slot::Ready(value);
		}
		self.0.pending.borrow_mut().shift_remove(key);
	}

	// Debug tracking.

	/// Keys still backed by accessors, in install order.
	///
	/// Only populated when the walker ran with
	/// [`LazyOptions::track_pending`](crate::LazyOptions::track_pending) on;
	/// returns `None` once nothing is pending.
	pub fn pending_fields(&self) -> Option<Vec<Key>> {
		let pending = self.0.pending.borrow();
		if pending.is_empty() {
			None
		} else {
			Some(pending.iter().cloned().collect())
		}
	}
}

impl PartialEq for Node {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other)
	}
}

impl fmt::Debug for Node {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut s = f.debug_struct("Node");
		if let Some(tag) = &self.0.record {
			s.field("record_type", &tag.record_type()).field("id", &tag.id());
		} else {
			s.field("shape", &self.0.shape);
		}
		s.field("keys", &self.keys()).field("mutability", &self.mutability()).finish()
	}
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests;
