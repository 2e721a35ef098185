use crate::value::Key;

/// Errors raised while reading or binding deferred fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
	/// A contextual resolver was found while tree resolvers are disabled.
	#[error("contextual resolver found on field \"{field}\" with tree resolvers disabled")]
	ContextualDisabled { field: Key },

	/// Failure reported by user code inside a resolver.
	#[error("{0}")]
	Custom(String),
}

impl ResolveError {
	/// Builds a [`ResolveError::Custom`] from any message.
	pub fn custom(message: impl Into<String>) -> Self {
		ResolveError::Custom(message.into())
	}
}

/// Errors raised by writes to a node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
	#[error("cannot write field \"{field}\": node is frozen")]
	Frozen { field: Key },

	#[error("cannot write field \"{field}\": node shape is sealed")]
	Sealed { field: Key },

	#[error("cannot overwrite field \"{field}\": it is backed by a pending resolver")]
	Deferred { field: Key },

	#[error("cannot push onto an object node")]
	NotAList,
}
