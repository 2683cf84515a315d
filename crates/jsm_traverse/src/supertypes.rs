use crate::{SizeHint, Traversal};
use jsm_model::{Environment, EnvironmentError, TypeDecl};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::debug;

/// Walks the super types of a type.
///
/// Classes come closest first. After each class level its interfaces follow
/// breadth first, so a class's own interfaces precede those of its
/// superclass. The start type, when included, precedes everything. Types
/// that cannot be resolved are skipped together with their supertypes.
pub struct SuperTypes<'env> {
    env: &'env Environment,
    classes: bool,
    interfaces: bool,
    include_self: bool,
    next_level: Option<Level>,
    buffer: VecDeque<Arc<TypeDecl>>,
    visited: HashSet<String>,
    exact: Option<usize>,
    failed: bool,
}

struct Level {
    ty: Arc<TypeDecl>,
    is_start: bool,
}

impl<'env> SuperTypes<'env> {
    /// Classes, interfaces and the start type are all included by default.
    pub fn of(env: &'env Environment, start: Arc<TypeDecl>) -> Self {
        let mut visited = HashSet::new();
        visited.insert(start.fqn.clone());
        let mut traversal = Self {
            env,
            classes: true,
            interfaces: true,
            include_self: true,
            next_level: Some(Level {
                ty: start,
                is_start: true,
            }),
            buffer: VecDeque::new(),
            visited,
            exact: None,
            failed: false,
        };
        traversal.update_exact();
        traversal
    }

    pub fn classes(mut self, include: bool) -> Self {
        self.classes = include;
        self.update_exact();
        self
    }

    pub fn interfaces(mut self, include: bool) -> Self {
        self.interfaces = include;
        self.update_exact();
        self
    }

    pub fn include_self(mut self, include: bool) -> Self {
        self.include_self = include;
        self.update_exact();
        self
    }

    fn walks_hierarchy(&self) -> bool {
        self.classes || self.interfaces
    }

    fn update_exact(&mut self) {
        self.exact = match (self.walks_hierarchy(), self.include_self) {
            (true, _) => None,
            (false, true) => Some(1),
            (false, false) => Some(0),
        };
    }

    fn expand(&mut self, level: Level) -> Result<(), EnvironmentError> {
        let emit = if level.is_start { self.include_self } else { self.classes };
        if emit {
            self.buffer.push_back(Arc::clone(&level.ty));
        }
        if !self.walks_hierarchy() {
            return Ok(());
        }

        if self.interfaces {
            let mut queue: VecDeque<String> = level
                .ty
                .interfaces
                .iter()
                .map(|ty| ty.name.clone())
                .collect();
            while let Some(name) = queue.pop_front() {
                if !self.visited.insert(name.clone()) {
                    continue;
                }
                match self.env.find_type(&name)? {
                    Some(decl) => {
                        queue.extend(decl.interfaces.iter().map(|ty| ty.name.clone()));
                        self.buffer.push_back(decl);
                    }
                    None => debug!(name = %name, "skipping unresolved super interface"),
                }
            }
        }

        if let Some(super_class) = &level.ty.super_class {
            if self.visited.insert(super_class.name.clone()) {
                match self.env.find_type(&super_class.name)? {
                    Some(decl) => {
                        self.next_level = Some(Level {
                            ty: decl,
                            is_start: false,
                        })
                    }
                    None => debug!(name = %super_class.name, "skipping unresolved super class"),
                }
            }
        }
        Ok(())
    }
}

impl Iterator for SuperTypes<'_> {
    type Item = Result<Arc<TypeDecl>, EnvironmentError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(decl) = self.buffer.pop_front() {
                if let Some(remaining) = self.exact.as_mut() {
                    *remaining = remaining.saturating_sub(1);
                }
                return Some(Ok(decl));
            }
            if self.failed || self.exact == Some(0) {
                return None;
            }
            let level = self.next_level.take()?;
            if let Err(error) = self.expand(level) {
                self.failed = true;
                self.buffer.clear();
                return Some(Err(error));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.size().bounds()
    }
}

impl Traversal for SuperTypes<'_> {
    fn size(&self) -> SizeHint {
        match self.exact {
            Some(remaining) => SizeHint::Exact(remaining),
            None if self.next_level.is_none() => SizeHint::Exact(self.buffer.len()),
            None => SizeHint::Unknown,
        }
    }
}
