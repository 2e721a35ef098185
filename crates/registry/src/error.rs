use statica_lazy::{MutationError, ResolveError};

/// Registry lifecycle and fill errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
	#[error("Cannot define() after locking Static Records \"{record_type}\".")]
	DefineAfterLock { record_type: String },

	#[error("Cannot lock() when Static Record Type \"{record_type}\" is already locked.")]
	AlreadyLocked { record_type: String },

	#[error("A Static Record Type \"{record_type}\" with id \"{id}\" already exists.")]
	Duplicate { record_type: String, id: String },

	#[error("Cannot find a Static Record Type \"{record_type}\" with id \"{id}\".")]
	NotFound { record_type: String, id: String },

	/// Two options that cannot be combined were configured together.
	#[error("Static Record Type \"{record_type}\": {filler} filler cannot be combined with option \"{option}\": {reason}")]
	ConfigConflict {
		record_type: String,
		filler: &'static str,
		option: &'static str,
		reason: &'static str,
	},

	/// A previous `lock()` failed; the registry cannot be completed.
	#[error("Static Record Type \"{record_type}\" is poisoned by a failed lock()")]
	Poisoned { record_type: String },

	#[error("failed to bind record \"{id}\": {source}")]
	Resolve {
		id: String,
		#[source]
		source: ResolveError,
	},

	#[error("failed to fill record \"{id}\": {source}")]
	Mutation {
		id: String,
		#[source]
		source: MutationError,
	},

	/// Failure reported by a factory, filler or creator.
	#[error("{0}")]
	Custom(String),
}

impl RegistryError {
	/// Builds a [`RegistryError::Custom`] from any message.
	pub fn custom(message: impl Into<String>) -> Self {
		RegistryError::Custom(message.into())
	}
}

/// Lets resolvers use `?` on registry lookups.
impl From<RegistryError> for ResolveError {
	fn from(err: RegistryError) -> Self {
		ResolveError::Custom(err.to_string())
	}
}
