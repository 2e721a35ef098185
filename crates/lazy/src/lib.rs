//! Lazy, cycle-tolerant field resolution for static record graphs.
//!
//! # Purpose
//!
//! Records and the plain objects hanging off them are [`Node`]s. A field may
//! hold a literal [`Value`] or a [`Resolver`] standing in for one. [`bind`]
//! walks a graph and installs accessors for every resolver; the first read of
//! such a field runs the resolver exactly once and stores the result in place.
//!
//! Contextual resolvers ([`lazy_tree`]) receive two [`ContextView`]s: one over
//! the node holding the field, whose parent link leads further up the graph, and
//! one over the root of the fill. Views mask the field being computed, so a
//! resolver reading itself sees `Null` instead of recursing.
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`Node`] | Shared object/list/record storage with one-way mutability. |
//! | [`Value`] | Field value: scalar, node, function, resolver or view. |
//! | [`Resolver`] | Tagged deferred computation (simple or contextual). |
//! | [`ContextView`] | Read-through facade with parent link and mask. |
//! | [`LazyOptions`] | Freeze, parent key, tree-resolver gate, pending tracking. |
//!
//! # Concurrency
//!
//! Single-threaded. Handles are `Rc`-based and `!Send`; evaluation is
//! synchronous and pull-based.

mod error;
mod freeze;
mod macros;
mod node;
mod options;
mod resolver;
mod snapshot;
mod value;
mod view;
mod walker;

pub use error::{MutationError, ResolveError};
pub use freeze::deep_freeze;
pub use node::{FieldState, Mutability, Node, RecordTag, Shape};
pub use options::LazyOptions;
pub use resolver::{Resolved, Resolver, ResolverKind, lazy, lazy_tree};
pub use snapshot::SnapshotError;
pub use value::{Fields, Function, Key, Value};
pub use view::{ContextView, ViewRole};
pub use walker::bind;
