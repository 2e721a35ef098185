use std::rc::Rc;

/// Configuration for binding deferred fields.
#[derive(Clone, Debug)]
pub struct LazyOptions {
	pub(crate) freeze: bool,
	pub(crate) parent_key: Option<Rc<str>>,
	pub(crate) allow_tree_resolvers: bool,
	pub(crate) track_pending: bool,
}

impl Default for LazyOptions {
	fn default() -> Self {
		Self {
			freeze: true,
			parent_key: Some(Rc::from("parent")),
			allow_tree_resolvers: true,
			track_pending: cfg!(debug_assertions),
		}
	}
}

impl LazyOptions {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets whether fully resolved nodes are frozen.
	pub fn freeze(mut self, on: bool) -> Self {
		self.freeze = on;
		self
	}

	/// Sets the field name under which views expose their parent view.
	pub fn parent_key(mut self, key: &str) -> Self {
		self.parent_key = Some(Rc::from(key));
		self
	}

	/// Removes the synthetic parent field from views.
	pub fn without_parent_key(mut self) -> Self {
		self.parent_key = None;
		self
	}

	/// Sets whether contextual resolvers are accepted at all.
	pub fn allow_tree_resolvers(mut self, on: bool) -> Self {
		self.allow_tree_resolvers = on;
		self
	}

	/// Sets whether nodes record which of their fields are still deferred.
	pub fn track_pending(mut self, on: bool) -> Self {
		self.track_pending = on;
		self
	}

	pub fn freezes(&self) -> bool {
		self.freeze
	}

	pub fn parent_key_name(&self) -> Option<&str> {
		self.parent_key.as_deref()
	}

	pub fn tree_resolvers_allowed(&self) -> bool {
		self.allow_tree_resolvers
	}

	pub fn tracks_pending(&self) -> bool {
		self.track_pending
	}
}
