//! Lazy traversals over the semantic model.
//!
//! Every traversal is a single-pass [`Iterator`] that also reports a
//! [`SizeHint`] through the [`Traversal`] trait. Type traversals yield
//! `Result`s because each step may resolve a type through the environment.

mod hint;
mod modules;
mod nested;
mod query;
mod supertypes;

pub use hint::{SizeHint, Traversal};
pub use modules::ModuleDependencies;
pub use nested::NestedTypes;
pub use query::{Filtered, Predicate, TypeItem, TypeTraversalExt};
pub use supertypes::SuperTypes;
