use crate::{SizeHint, Traversal};
use jsm_model::{EnvironmentError, TypeDecl};
use std::sync::Arc;

pub type TypeItem = Result<Arc<TypeDecl>, EnvironmentError>;

pub type Predicate = Box<dyn FnMut(&TypeDecl) -> bool>;

/// A type traversal narrowed by a predicate. Errors always pass through.
pub struct Filtered<T, F> {
    inner: T,
    predicate: F,
}

impl<T, F> Iterator for Filtered<T, F>
where
    T: Iterator<Item = TypeItem>,
    F: FnMut(&TypeDecl) -> bool,
{
    type Item = TypeItem;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(item) = self.inner.next() {
            if let Ok(decl) = &item {
                if !(self.predicate)(&**decl) {
                    continue;
                }
            }
            return Some(item);
        }
        None
    }
}

impl<T, F> Traversal for Filtered<T, F>
where
    T: Traversal<Item = TypeItem>,
    F: FnMut(&TypeDecl) -> bool,
{
    fn size(&self) -> SizeHint {
        match self.inner.size() {
            SizeHint::Exact(0) => SizeHint::Exact(0),
            SizeHint::Exact(count) | SizeHint::Estimated(count) => SizeHint::Estimated(count),
            SizeHint::Unknown => SizeHint::Unknown,
        }
    }
}

/// Query helpers shared by the type traversals.
pub trait TypeTraversalExt: Traversal<Item = TypeItem> + Sized {
    fn filter_types<F>(self, predicate: F) -> Filtered<Self, F>
    where
        F: FnMut(&TypeDecl) -> bool,
    {
        Filtered {
            inner: self,
            predicate,
        }
    }

    /// Types whose simple name is `simple_name`.
    fn named(self, simple_name: &str) -> Filtered<Self, Predicate> {
        let simple_name = simple_name.to_string();
        let predicate: Predicate = Box::new(move |decl: &TypeDecl| decl.simple_name == simple_name);
        self.filter_types(predicate)
    }

    fn annotated_with(self, fqn: &str) -> Filtered<Self, Predicate> {
        let fqn = fqn.to_string();
        let predicate: Predicate = Box::new(move |decl: &TypeDecl| decl.has_annotation(&fqn));
        self.filter_types(predicate)
    }

    /// Types carrying every bit of `flags`.
    fn with_flags(self, flags: u16) -> Filtered<Self, Predicate> {
        let predicate: Predicate = Box::new(move |decl: &TypeDecl| decl.flags.contains(flags));
        self.filter_types(predicate)
    }

    fn first_type(mut self) -> Result<Option<Arc<TypeDecl>>, EnvironmentError> {
        self.next().transpose()
    }

    /// Collect at most `limit` types, stopping at the first error.
    fn collect_types(self, limit: usize) -> Result<Vec<Arc<TypeDecl>>, EnvironmentError> {
        self.take(limit).collect()
    }
}

impl<T: Traversal<Item = TypeItem>> TypeTraversalExt for T {}
