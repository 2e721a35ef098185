//! Construction macros.

/// Builds a [`Fields`](crate::Fields) set from `key => value` pairs.
///
/// ```
/// use statica_lazy::{fields, lazy};
///
/// let input = fields! {
/// 	"name" => "Dan",
/// 	"car" => lazy(|| Ok("Mustang")),
/// };
/// assert_eq!(input.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
	() => {
		$crate::Fields::new()
	};
	($($key:expr => $value:expr),+ $(,)?) => {
		$crate::Fields::new()$(.with($key, $value))+
	};
}
