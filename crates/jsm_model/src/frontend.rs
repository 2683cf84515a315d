//! The seam between the environment and whatever compiles or indexes the
//! classpath. The environment owns exactly one front-end at a time and
//! recreates it through [`FrontendFactory`] after a reload.

use crate::element::{OriginKind, TypeDecl};
use crate::error::EnvironmentError;
use crate::module::ModuleGraphBuilder;
use crate::source::Import;
use crate::unit::{UnitKey, WorkingCopy};
use jsm_classpath::{ClasspathEntry, ResolvedClasspath};
use std::sync::Arc;

/// Where a type name was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeLocation {
    pub kind: OriginKind,
    pub entry: Option<ClasspathEntry>,
    pub unit: Option<UnitKey>,
}

/// Names visible from a declaration in a compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameContext {
    pub package: Option<String>,
    pub imports: Vec<Import>,
    /// Binary names of the declaring type and its enclosing types, innermost first.
    pub scope: Vec<String>,
    pub type_parameters: Vec<String>,
}

pub trait CompilerFrontend {
    fn locate(&self, fqn: &str) -> Option<TypeLocation>;

    fn resolve_type(&self, fqn: &str) -> Result<Option<TypeDecl>, EnvironmentError>;

    /// Resolve a type name as written in the given context.
    fn resolve_name(&self, context: &NameContext, name: &str) -> Option<String>;

    /// Shadow or add a compilation unit; later lookups see its declarations.
    fn apply_working_copy(&mut self, copy: &WorkingCopy) -> Result<(), EnvironmentError>;

    fn unit_source(&self, unit: &UnitKey) -> Result<Option<Arc<str>>, EnvironmentError>;

    fn describe_modules(&self, builder: &mut ModuleGraphBuilder) -> Result<(), EnvironmentError>;

    /// Source classpath entries that contain the package, in classpath order.
    fn source_folders_with_package(&self, package: &str) -> Vec<ClasspathEntry>;
}

pub type FrontendFactory = Arc<
    dyn Fn(&ResolvedClasspath) -> Result<Box<dyn CompilerFrontend>, EnvironmentError> + Send + Sync,
>;

pub fn indexing_frontend_factory() -> FrontendFactory {
    Arc::new(|classpath| {
        let frontend = crate::index::IndexingFrontend::index(classpath)?;
        Ok(Box::new(frontend) as Box<dyn CompilerFrontend>)
    })
}

/// Binary names that an fqn could denote, outermost split first.
///
/// `a.b.Outer.Inner` yields `a.b.Outer.Inner`, `a.b.Outer$Inner`, `a.b$Outer$Inner`.
pub fn binary_candidates(fqn: &str) -> impl Iterator<Item = String> + '_ {
    let dots: Vec<usize> = fqn.match_indices('.').map(|(index, _)| index).collect();
    (0..=dots.len()).map(move |replaced| {
        let mut candidate = fqn.to_string();
        for &index in dots.iter().rev().take(replaced) {
            candidate.replace_range(index..index + 1, "$");
        }
        candidate
    })
}
