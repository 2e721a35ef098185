//! The static record registry.
//!
//! # Mental Model
//!
//! ```text
//! define(id, factory) ──► stub (id + record type) handed back immediately
//!                         factory stored, not run
//! lock()              ──► every factory runs in definition order
//!                         filler applies its output to the stub
//!                         freezer runs on the filled record
//! ```
//!
//! Stubs exist before their contents, so factories can reference any record of
//! any registry by grabbing its stub. That is what makes forward and circular
//! references work.
//!
//! # Invariants
//!
//! - Record identity never changes; `get(id)` after `lock()` returns the stub
//!   `define(id, ..)` returned.
//! - A failed `lock()` leaves the registry `Poisoned`, never `Locked`.
//! - No registry borrow is held while a factory, creator or filler runs, so
//!   user code may call back into any registry.
//!
//! Records referencing each other through `Rc` handles form reference cycles
//! and are never dropped. Registries are meant to live for the whole program.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use statica_lazy::{Fields, Node, RecordTag};

use crate::error::RegistryError;
use crate::options::RegistryOptions;

type Factory = Box<dyn FnOnce(&Node) -> Result<Fields, RegistryError>>;

/// Where a registry is in its one-way lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
	Open,
	/// `lock()` is running factories.
	Locking,
	Locked,
	/// `lock()` failed.
	Poisoned,
}

struct RegistryInner {
	record_type: Rc<str>,
	options: RegistryOptions,
	lifecycle: Cell<Lifecycle>,
	records: RefCell<IndexMap<Rc<str>, Node>>,
	factories: RefCell<FxHashMap<Rc<str>, Factory>>,
}

/// A named collection of static records.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone)]
pub struct Registry(Rc<RegistryInner>);

impl Registry {
	/// Creates an empty registry with default options.
	pub fn new(record_type: &str) -> Self {
		Self::with_options(record_type, RegistryOptions::default())
	}

	pub fn with_options(record_type: &str, options: RegistryOptions) -> Self {
		Self(Rc::new(RegistryInner {
			record_type: Rc::from(record_type),
			options,
			lifecycle: Cell::new(Lifecycle::Open),
			records: RefCell::new(IndexMap::new()),
			factories: RefCell::new(FxHashMap::default()),
		}))
	}

	pub fn record_type(&self) -> &str {
		&self.0.record_type
	}

	pub fn lifecycle(&self) -> Lifecycle {
		self.0.lifecycle.get()
	}

	pub fn is_locked(&self) -> bool {
		self.0.lifecycle.get() == Lifecycle::Locked
	}

	/// Registers `id` and returns its stub.
	///
	/// The stub carries the creator's fields right away. `factory` runs during
	/// [`Registry::lock`] and receives the same stub.
	pub fn define<F>(&self, id: &str, factory: F) -> Result<Node, RegistryError>
	where
		F: FnOnce(&Node) -> Result<Fields, RegistryError> + 'static,
	{
		match self.0.lifecycle.get() {
			Lifecycle::Open => {}
			Lifecycle::Locking | Lifecycle::Locked => {
				return Err(RegistryError::DefineAfterLock {
					record_type: self.0.record_type.to_string(),
				});
			}
			Lifecycle::Poisoned => return Err(self.poisoned()),
		}
		if self.has(id) {
			return Err(RegistryError::Duplicate {
				record_type: self.0.record_type.to_string(),
				id: id.to_string(),
			});
		}

		let id: Rc<str> = Rc::from(id);
		let stub = Node::record(RecordTag::new(id.clone(), self.0.record_type.clone()));
		let initial = self.0.options.effective_creator().create(&id, &self.0.record_type);
		stub.merge(initial).map_err(|source| RegistryError::Mutation {
			id: id.to_string(),
			source,
		})?;

		self.0.records.borrow_mut().insert(id.clone(), stub.clone());
		self.0.factories.borrow_mut().insert(id.clone(), Box::new(factory));
		tracing::debug!(record_type = %self.0.record_type, id = %id, "defined static record");
		Ok(stub)
	}

	/// Runs every factory, fills and freezes each record, and locks the registry.
	pub fn lock(&self) -> Result<(), RegistryError> {
		match self.0.lifecycle.get() {
			Lifecycle::Open => {}
			Lifecycle::Locking | Lifecycle::Locked => {
				return Err(RegistryError::AlreadyLocked {
					record_type: self.0.record_type.to_string(),
				});
			}
			Lifecycle::Poisoned => return Err(self.poisoned()),
		}

		self.0.lifecycle.set(Lifecycle::Locking);
		match self.fill_all() {
			Ok(count) => {
				self.0.lifecycle.set(Lifecycle::Locked);
				tracing::debug!(record_type = %self.0.record_type, count, "locked static records");
				Ok(())
			}
			Err(err) => {
				self.0.lifecycle.set(Lifecycle::Poisoned);
				self.0.factories.borrow_mut().clear();
				tracing::warn!(record_type = %self.0.record_type, error = %err, "lock failed, registry poisoned");
				Err(err)
			}
		}
	}

	fn fill_all(&self) -> Result<usize, RegistryError> {
		let options = &self.0.options;
		let freezer = options.effective_freezer(&self.0.record_type)?;
		let filler = options.effective_filler();

		let records: Vec<(Rc<str>, Node)> = self
			.0
			.records
			.borrow()
			.iter()
			.map(|(id, node)| (id.clone(), node.clone()))
			.collect();
		let mut factories = std::mem::take(&mut *self.0.factories.borrow_mut());

		for (id, stub) in &records {
			let Some(factory) = factories.remove(id) else {
				continue;
			};
			let fields = factory(stub)?;
			tracing::trace!(record_type = %self.0.record_type, id = %id, fields = fields.len(), filler = filler.name(), "filling static record");
			filler.fill(stub, fields)?;
			freezer.apply(stub);
		}
		Ok(records.len())
	}

	fn poisoned(&self) -> RegistryError {
		RegistryError::Poisoned {
			record_type: self.0.record_type.to_string(),
		}
	}

	/// Returns the record for `id`. Works before `lock()` (the stub) and after
	/// a failed one.
	pub fn get(&self, id: &str) -> Result<Node, RegistryError> {
		self.0
			.records
			.borrow()
			.get(id)
			.cloned()
			.ok_or_else(|| RegistryError::NotFound {
				record_type: self.0.record_type.to_string(),
				id: id.to_string(),
			})
	}

	pub fn has(&self, id: &str) -> bool {
		self.0.records.borrow().contains_key(id)
	}

	pub fn len(&self) -> usize {
		self.0.records.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.records.borrow().is_empty()
	}

	/// All records in definition order.
	pub fn to_vec(&self) -> Vec<Node> {
		self.0.records.borrow().values().cloned().collect()
	}

	/// An owned id → record map in definition order. Changing the map does not
	/// affect the registry.
	pub fn to_map(&self) -> IndexMap<String, Node> {
		self.0
			.records
			.borrow()
			.iter()
			.map(|(id, node)| (id.to_string(), node.clone()))
			.collect()
	}
}

impl fmt::Debug for Registry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Registry")
			.field("record_type", &self.0.record_type)
			.field("lifecycle", &self.0.lifecycle.get())
			.field("len", &self.len())
			.field("options", &self.0.options)
			.finish()
	}
}
