//! Regeneration of data-transfer mirrors for annotated model types.
//!
//! A change to a model type (a form, a table page or a table) enters
//! [`DerivedResourcePipeline::apply`]. The type is classified by its mirror
//! annotation, the target source folder is resolved through the module
//! graph, and a [`SourceGenerator`] is handed to the injected
//! [`CompilationUnitWriter`]. The returned [`ApplyOutcome`] owns every
//! scheduled write so callers can await all of them even when some requests
//! failed.

mod api;
mod builder;
mod classify;
mod config;
mod error;
mod generate;
mod inflight;
mod pipeline;
mod progress;
mod writer;

pub use api::{builtin_catalog, generated_annotation, DtoApi, GeneratedAnnotationApi};
pub use builder::SourceBuilder;
pub use classify::{classify, mirror_of, super_mirror_of, DerivedResource, MirrorKind, MirrorSpec};
pub use config::MirrorConfig;
pub use error::{DerivedResourceError, GenerationFailure};
pub use generate::{merge, render, ColumnData, FieldData, MirrorContent, MirrorGenerator, MirrorTemplate};
pub use inflight::{InFlightGuard, InFlightRegistry};
pub use pipeline::{ApplyOutcome, DerivedResourcePipeline, ModelTypeChanged};
pub use progress::{CancellationFlag, ProgressMonitor, ProgressToken};
pub use writer::{CompilationUnitWriter, GeneratedType, SourceGenerator, WriteFuture, WriteHandle};
