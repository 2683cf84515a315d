//! In-memory semantic model of Java types for a resolved classpath.
//!
//! An [`Environment`] owns one [`CompilerFrontend`] built from the resolved
//! classpath plus any registered working copies, and memoizes the types,
//! annotations and source texts it hands out. Closing drops everything but
//! the raw classpath; reloading rebuilds from it.

pub mod annotation;
pub mod classfile;
mod element;
mod environment;
mod error;
mod frontend;
mod index;
mod manifest;
mod module;
pub mod source;
mod unit;

pub use annotation::{Annotation, AnnotationValue, RawAnnotation, RawPayload};
pub use element::{
    package_of, simple_name_of, FieldDecl, Flags, MethodDecl, OriginKind, TypeDecl, TypeKind,
    TypeOrigin, TypeRef, ACC_ABSTRACT, ACC_ANNOTATION, ACC_ENUM, ACC_FINAL, ACC_INTERFACE,
    ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC, ACC_STATIC, ACC_SYNTHETIC,
};
pub use environment::{CacheStats, Environment, EnvironmentConfig, DEFAULT_API_MARKER_TYPE};
pub use error::EnvironmentError;
pub use frontend::{
    binary_candidates, indexing_frontend_factory, CompilerFrontend, FrontendFactory, NameContext,
    TypeLocation,
};
pub use index::IndexingFrontend;
pub use manifest::artifact_version;
pub use module::{ModuleGraph, ModuleGraphBuilder, ModuleId, ModuleNode, ModuleRequirement};
pub use unit::{CompilationUnitInfo, UnitKey, WorkingCopy};

#[cfg(test)]
mod tests;
