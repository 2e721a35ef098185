//! Static record registries.
//!
//! # Purpose
//!
//! A [`Registry`] holds the records of one record type. Records are
//! [`define`](Registry::define)d up front, which hands back a stub that other
//! definitions can reference immediately, and filled in one pass by
//! [`lock`](Registry::lock). With the lazy filler
//! ([`Filler::Lazy`]) fields may hold deferred values from `statica-lazy` that
//! resolve on first read, after every registry involved has been locked.
//!
//! # Lifecycle
//!
//! `Open → Locking → Locked`, or `Poisoned` if a factory, creator, filler or
//! the option check fails during `lock()`. Nothing moves backwards.
//!
//! # Concurrency
//!
//! Single-threaded; registries and records are `!Send`.

mod error;
mod factory;
mod options;
mod registry;

pub use error::RegistryError;
pub use factory::RegistryFactory;
pub use options::{Creator, Filler, Freezer, RegistryOptions};
pub use registry::{Lifecycle, Registry};

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests;
