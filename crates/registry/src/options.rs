//! Registry options: how stubs are created, filled and frozen.
//!
//! Every option is optional. Unset options fall back to defaults when the
//! registry is locked, so [`RegistryOptions::merge`] can layer per-registry
//! overrides over factory-wide defaults without losing "not configured".

use std::fmt;
use std::rc::Rc;

use statica_lazy::{Fields, LazyOptions, Node, bind, deep_freeze};

use crate::error::RegistryError;

/// Builds the initial fields of a stub from `(id, record_type)`.
///
/// The default inserts a single `id` field.
#[derive(Clone)]
pub struct Creator(Rc<dyn Fn(&str, &str) -> Fields>);

impl Creator {
	pub fn new<F>(f: F) -> Self
	where
		F: Fn(&str, &str) -> Fields + 'static,
	{
		Self(Rc::new(f))
	}

	pub(crate) fn create(&self, id: &str, record_type: &str) -> Fields {
		(self.0)(id, record_type)
	}
}

impl Default for Creator {
	fn default() -> Self {
		Self::new(|id, _| Fields::new().with("id", id))
	}
}

impl fmt::Debug for Creator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("Creator(..)")
	}
}

type FillFn = dyn Fn(&Node, Fields) -> Result<(), RegistryError>;

/// Applies factory output to a stub.
#[derive(Clone, Default)]
pub enum Filler {
	/// Shallow ordered merge.
	#[default]
	Assign,
	/// Merge, then bind deferred fields with the given options.
	Lazy(LazyOptions),
	Custom(Rc<FillFn>),
}

impl Filler {
	pub fn custom<F>(f: F) -> Self
	where
		F: Fn(&Node, Fields) -> Result<(), RegistryError> + 'static,
	{
		Filler::Custom(Rc::new(f))
	}

	/// Short name used in diagnostics.
	pub fn name(&self) -> &'static str {
		match self {
			Filler::Assign => "assign",
			Filler::Lazy(_) => "lazy",
			Filler::Custom(_) => "custom",
		}
	}

	pub(crate) fn fill(&self, stub: &Node, fields: Fields) -> Result<(), RegistryError> {
		let id = || stub.id().unwrap_or_default().to_string();
		match self {
			Filler::Assign => stub.merge(fields).map_err(|source| RegistryError::Mutation { id: id(), source }),
			Filler::Lazy(options) => {
				stub.merge(fields).map_err(|source| RegistryError::Mutation { id: id(), source })?;
				bind(stub, options).map_err(|source| RegistryError::Resolve { id: id(), source })
			}
			Filler::Custom(f) => f(stub, fields),
		}
	}
}

impl fmt::Debug for Filler {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Filler::Lazy(options) => f.debug_tuple("Lazy").field(options).finish(),
			other => f.write_str(other.name()),
		}
	}
}

/// Runs on each filled record during `lock()`.
#[derive(Clone, Default)]
pub enum Freezer {
	/// [`deep_freeze`] the record.
	#[default]
	Deep,
	Disabled,
	Custom(Rc<dyn Fn(&Node)>),
}

impl Freezer {
	pub fn custom<F>(f: F) -> Self
	where
		F: Fn(&Node) + 'static,
	{
		Freezer::Custom(Rc::new(f))
	}

	pub(crate) fn apply(&self, record: &Node) {
		match self {
			Freezer::Deep => deep_freeze(record),
			Freezer::Disabled => {}
			Freezer::Custom(f) => f(record),
		}
	}
}

impl fmt::Debug for Freezer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Freezer::Deep => "Deep",
			Freezer::Disabled => "Disabled",
			Freezer::Custom(_) => "Custom(..)",
		})
	}
}

/// Options for a single registry.
#[derive(Clone, Debug, Default)]
pub struct RegistryOptions {
	creator: Option<Creator>,
	filler: Option<Filler>,
	freezer: Option<Freezer>,
}

impl RegistryOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn creator(mut self, creator: Creator) -> Self {
		self.creator = Some(creator);
		self
	}

	pub fn filler(mut self, filler: Filler) -> Self {
		self.filler = Some(filler);
		self
	}

	/// Shorthand for `filler(Filler::Lazy(options))`.
	pub fn lazy(self, options: LazyOptions) -> Self {
		self.filler(Filler::Lazy(options))
	}

	pub fn freezer(mut self, freezer: Freezer) -> Self {
		self.freezer = Some(freezer);
		self
	}

	/// Overlays `overrides` on `self`; options set in `overrides` win.
	pub fn merge(self, overrides: RegistryOptions) -> Self {
		Self {
			creator: overrides.creator.or(self.creator),
			filler: overrides.filler.or(self.filler),
			freezer: overrides.freezer.or(self.freezer),
		}
	}

	pub(crate) fn effective_creator(&self) -> Creator {
		self.creator.clone().unwrap_or_default()
	}

	pub(crate) fn effective_filler(&self) -> Filler {
		self.filler.clone().unwrap_or_default()
	}

	/// Resolves the freezer, rejecting combinations that cannot work.
	///
	/// A lazy filler freezes through its own options; an explicit deep or
	/// custom freezer would run before the deferred fields resolve.
	pub(crate) fn effective_freezer(&self, record_type: &str) -> Result<Freezer, RegistryError> {
		match (&self.filler, &self.freezer) {
			(Some(filler @ Filler::Lazy(_)), Some(Freezer::Deep | Freezer::Custom(_))) => Err(RegistryError::ConfigConflict {
				record_type: record_type.to_string(),
				filler: filler.name(),
				option: "freezer",
				reason: "use LazyOptions::freeze to freeze lazily filled records",
			}),
			(Some(Filler::Lazy(_)), None) => Ok(Freezer::Disabled),
			(_, freezer) => Ok(freezer.clone().unwrap_or_default()),
		}
	}
}
