//! Resolver tags: deferred computations standing in for field values.
//!
//! A [`Resolver`] is distinguishable from a [`Function`](crate::Function) value
//! by construction: the tag is the variant, never a field on the containing
//! node, so it cannot show up when a node's fields are enumerated.

use std::fmt;
use std::rc::Rc;

use crate::error::ResolveError;
use crate::value::Value;
use crate::view::ContextView;

/// Outcome of a resolver invocation.
pub type Resolved = Result<Value, ResolveError>;

/// Which arguments a resolver receives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResolverKind {
	/// No arguments.
	Simple,
	/// Parent and root context views.
	Contextual,
}

enum Thunk {
	Simple(Box<dyn Fn() -> Resolved>),
	Contextual(Box<dyn Fn(&ContextView, &ContextView) -> Resolved>),
}

/// A deferred field value, evaluated at most once on first read.
#[derive(Clone)]
pub struct Resolver(Rc<Thunk>);

impl Resolver {
	/// Creates a resolver that takes no arguments.
	pub fn simple<F, V>(f: F) -> Self
	where
		F: Fn() -> Result<V, ResolveError> + 'static,
		V: Into<Value>,
	{
		Self(Rc::new(Thunk::Simple(Box::new(move || f().map(Into::into)))))
	}

	/// Creates a resolver that receives `(parent, root)` context views.
	pub fn contextual<F, V>(f: F) -> Self
	where
		F: Fn(&ContextView, &ContextView) -> Result<V, ResolveError> + 'static,
		V: Into<Value>,
	{
		Self(Rc::new(Thunk::Contextual(Box::new(move |parent, root| {
			f(parent, root).map(Into::into)
		}))))
	}

	pub fn kind(&self) -> ResolverKind {
		match &*self.0 {
			Thunk::Simple(_) => ResolverKind::Simple,
			Thunk::Contextual(_) => ResolverKind::Contextual,
		}
	}

	/// Returns true if both handles point at the same computation.
	pub fn ptr_eq(&self, other: &Resolver) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	/// Runs the computation. `views` is only called for contextual resolvers.
	pub(crate) fn invoke(&self, views: impl FnOnce() -> (ContextView, ContextView)) -> Resolved {
		match &*self.0 {
			Thunk::Simple(f) => f(),
			Thunk::Contextual(f) => {
				let (parent, root) = views();
				f(&parent, &root)
			}
		}
	}
}

impl fmt::Debug for Resolver {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Resolver({:?})", self.kind())
	}
}

/// Marks `f` as a simple resolver and returns it as a field value.
pub fn lazy<F, V>(f: F) -> Value
where
	F: Fn() -> Result<V, ResolveError> + 'static,
	V: Into<Value>,
{
	Value::Resolver(Resolver::simple(f))
}

/// Marks `f` as a contextual resolver and returns it as a field value.
///
/// `f` receives a view of the node holding the field (whose own parent link
/// leads further up) and a view of the root of the current fill.
pub fn lazy_tree<F, V>(f: F) -> Value
where
	F: Fn(&ContextView, &ContextView) -> Result<V, ResolveError> + 'static,
	V: Into<Value>,
{
	Value::Resolver(Resolver::contextual(f))
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests;
