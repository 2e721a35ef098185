use crate::options::RegistryOptions;
use crate::registry::Registry;

/// Produces registries sharing a set of default options.
#[derive(Clone, Debug, Default)]
pub struct RegistryFactory {
	defaults: RegistryOptions,
}

impl RegistryFactory {
	pub fn new(defaults: RegistryOptions) -> Self {
		Self { defaults }
	}

	pub fn defaults(&self) -> &RegistryOptions {
		&self.defaults
	}

	/// Creates a registry with the factory defaults.
	pub fn registry(&self, record_type: &str) -> Registry {
		Registry::with_options(record_type, self.defaults.clone())
	}

	/// Creates a registry whose options are the defaults overlaid by `overrides`.
	pub fn registry_with(&self, record_type: &str, overrides: RegistryOptions) -> Registry {
		tracing::trace!(record_type, "creating registry with overridden options");
		Registry::with_options(record_type, self.defaults.clone().merge(overrides))
	}
}
