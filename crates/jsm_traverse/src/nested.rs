use crate::{SizeHint, Traversal};
use jsm_model::{Environment, EnvironmentError, TypeDecl};
use std::sync::Arc;
use tracing::debug;

/// Member types of a type in declaration order.
///
/// The recursive form is a pre-order walk: every nested type comes before
/// its own member types.
pub struct NestedTypes<'env> {
    env: &'env Environment,
    recursive: bool,
    /// Names still to visit, next one last.
    stack: Vec<String>,
    failed: bool,
}

impl<'env> NestedTypes<'env> {
    pub fn of(env: &'env Environment, owner: &TypeDecl) -> Self {
        Self {
            env,
            recursive: false,
            stack: owner.nested.iter().rev().cloned().collect(),
            failed: false,
        }
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }
}

impl Iterator for NestedTypes<'_> {
    type Item = Result<Arc<TypeDecl>, EnvironmentError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        while let Some(name) = self.stack.pop() {
            match self.env.find_type(&name) {
                Ok(Some(decl)) => {
                    if self.recursive {
                        self.stack.extend(decl.nested.iter().rev().cloned());
                    }
                    return Some(Ok(decl));
                }
                Ok(None) => debug!(name = %name, "skipping unresolved member type"),
                Err(error) => {
                    self.failed = true;
                    return Some(Err(error));
                }
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.size().bounds()
    }
}

impl Traversal for NestedTypes<'_> {
    fn size(&self) -> SizeHint {
        match (self.stack.len(), self.recursive) {
            (0, _) => SizeHint::Exact(0),
            (pending, false) => SizeHint::Estimated(pending),
            (_, true) => SizeHint::Unknown,
        }
    }
}
