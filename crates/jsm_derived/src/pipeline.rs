use crate::api::{generated_annotation, DtoApi};
use crate::classify::{classify, super_mirror_of};
use crate::generate::{ColumnData, FieldData, MirrorContent, MirrorGenerator, MirrorTemplate};
use crate::{
    builtin_catalog, CompilationUnitWriter, DerivedResource, DerivedResourceError, GeneratedType,
    GenerationFailure, InFlightRegistry, MirrorConfig, MirrorKind, MirrorSpec, ProgressToken,
    WriteHandle,
};
use jsm_api::{ApiCatalog, ApiContext, ApiError, ApiSpecification};
use jsm_classpath::ClasspathEntry;
use jsm_model::{CompilationUnitInfo, Environment, OriginKind, TypeDecl, TypeRef};
use jsm_traverse::{ModuleDependencies, NestedTypes, SuperTypes, TypeTraversalExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Notification that a model type changed and its mirror may be stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelTypeChanged {
    pub model_type: String,
}

impl ModelTypeChanged {
    pub fn new(model_type: impl Into<String>) -> Self {
        Self {
            model_type: model_type.into(),
        }
    }
}

/// Result of one [`DerivedResourcePipeline::apply`] call.
///
/// `handles` holds every write that was scheduled, including those scheduled
/// before a later request failed.
#[derive(Debug, Default)]
pub struct ApplyOutcome {
    pub handles: Vec<WriteHandle>,
    pub failures: Vec<GenerationFailure>,
    /// Model types that needed no generation.
    pub skipped: Vec<String>,
    /// Set when cancellation stopped the remaining requests.
    pub cancelled: bool,
}

impl ApplyOutcome {
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty() && self.failures.is_empty()
    }

    /// Await every handle; returns the written types and all failures.
    pub async fn settle(self) -> (Vec<GeneratedType>, Vec<GenerationFailure>) {
        let ApplyOutcome {
            handles,
            mut failures,
            ..
        } = self;
        let models: Vec<String> = handles
            .iter()
            .map(|handle| handle.model_type().to_string())
            .collect();
        let results = futures::future::join_all(handles).await;

        let mut written = Vec::with_capacity(results.len());
        for (model_type, result) in models.into_iter().zip(results) {
            match result {
                Ok(generated) => written.push(generated),
                Err(error) => failures.push(GenerationFailure { model_type, error }),
            }
        }
        (written, failures)
    }

    /// Await every handle; any failure turns into [`DerivedResourceError::Multiple`].
    pub async fn join(self) -> Result<Vec<GeneratedType>, DerivedResourceError> {
        let (written, failures) = self.settle().await;
        if failures.is_empty() {
            Ok(written)
        } else {
            Err(DerivedResourceError::Multiple(failures))
        }
    }
}

enum Step {
    Scheduled(WriteHandle),
    Skipped(&'static str),
    Cancelled,
}

/// Regenerates data mirrors of changed model types.
pub struct DerivedResourcePipeline {
    config: MirrorConfig,
    catalog: ApiCatalog,
    writer: Arc<dyn CompilationUnitWriter>,
    in_flight: InFlightRegistry,
}

impl DerivedResourcePipeline {
    pub fn new(writer: Arc<dyn CompilationUnitWriter>) -> Self {
        Self {
            config: MirrorConfig::default(),
            catalog: builtin_catalog(),
            writer,
            in_flight: InFlightRegistry::new(),
        }
    }

    pub fn with_config(mut self, config: MirrorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_catalog(mut self, catalog: ApiCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    pub fn in_flight(&self) -> &InFlightRegistry {
        &self.in_flight
    }

    /// Handle each change in order. A failing request is recorded and the
    /// remaining ones still run; cancellation stops before the next request.
    pub fn apply<'c, I>(&self, env: &Environment, changes: I, progress: &ProgressToken) -> ApplyOutcome
    where
        I: IntoIterator<Item = &'c ModelTypeChanged>,
    {
        let mut outcome = ApplyOutcome::default();
        for change in changes {
            let model_type = change.model_type.as_str();
            if progress.is_cancelled() {
                info!(model = model_type, "derived resource generation cancelled");
                outcome.cancelled = true;
                break;
            }
            match self.process(env, model_type, progress.split(model_type, 1)) {
                Ok(Step::Scheduled(handle)) => outcome.handles.push(handle),
                Ok(Step::Skipped(reason)) => {
                    debug!(model = model_type, reason, "no derived resource to generate");
                    outcome.skipped.push(model_type.to_string());
                }
                Ok(Step::Cancelled) => {
                    info!(model = model_type, "derived resource generation cancelled before write");
                    outcome.cancelled = true;
                    break;
                }
                Err(error) => {
                    warn!(model = model_type, error = %error, "derived resource generation failed");
                    outcome.failures.push(GenerationFailure {
                        model_type: model_type.to_string(),
                        error,
                    });
                }
            }
        }
        outcome
    }

    /// Classification of `model` including its super-mirror hint.
    pub fn classify(&self, env: &Environment, model: &Arc<TypeDecl>) -> Result<Option<DerivedResource>, DerivedResourceError> {
        let annotations = env.annotations(model)?;
        let Some(mut resource) = classify(model, &annotations, &self.config) else {
            return Ok(None);
        };
        let kind = resource.kind();
        for ancestor in SuperTypes::of(env, Arc::clone(model))
            .include_self(false)
            .interfaces(false)
        {
            let ancestor = ancestor?;
            if let Some(mirror) = super_mirror_of(kind, &env.annotations(&ancestor)?, &self.config) {
                resource.spec_mut().super_mirror = Some(mirror);
                break;
            }
        }
        Ok(Some(resource))
    }

    fn process(&self, env: &Environment, model_type: &str, progress: ProgressToken) -> Result<Step, DerivedResourceError> {
        let Some(model) = env.find_type(model_type)? else {
            return Ok(Step::Skipped("model type not found"));
        };
        let Some(resource) = self.classify(env, &model)? else {
            return Ok(Step::Skipped("no mirror annotation applies"));
        };
        let spec = resource.spec();
        debug!(model = model_type, mirror = %spec.mirror_type, kind = ?resource.kind(), "classified model type");

        let Some(guard) = self.in_flight.try_acquire(model_type) else {
            return Ok(Step::Skipped("generation already in flight"));
        };

        let specification = self.specification(env)?;
        let entry = self.resolve_source_folder(env, &model, spec)?;
        debug!(mirror = %spec.mirror_type, folder = %entry.path().display(), "resolved mirror source folder");

        let template = self.template(env, &model, &resource, &specification)?;
        let package = Some(spec.mirror_package()).filter(|package| !package.is_empty());
        let unit = CompilationUnitInfo::new(Some(entry.path()), package, spec.mirror_simple_name())?;
        let existing = self.existing_source(env, &spec.mirror_type)?;
        let generator = MirrorGenerator::new(spec.mirror_type.clone(), template, unit, existing);

        if progress.is_cancelled() {
            return Ok(Step::Cancelled);
        }
        let future = self.writer.write(Box::new(generator), &entry, progress);
        debug!(mirror = %spec.mirror_type, "scheduled mirror write");
        Ok(Step::Scheduled(WriteHandle::new(
            model_type.to_string(),
            spec.mirror_type.clone(),
            future,
            guard,
        )))
    }

    fn specification(&self, env: &Environment) -> Result<ApiSpecification, DerivedResourceError> {
        let version = env.api_version().ok_or_else(|| ApiError::NoApplicableVersion {
            requested: "<unknown>".to_string(),
        })?;
        let specification = self
            .catalog
            .specification(&version)
            .ok_or_else(|| ApiError::NoApplicableVersion {
                requested: version.to_string(),
            })?;
        Ok(specification)
    }

    /// The folder already holding the mirror, otherwise the first folder
    /// containing the mirror package in the model's module or the modules
    /// it reads, nearest first.
    fn resolve_source_folder(
        &self,
        env: &Environment,
        model: &TypeDecl,
        spec: &MirrorSpec,
    ) -> Result<ClasspathEntry, DerivedResourceError> {
        if let Some(mirror) = env.find_type(&spec.mirror_type)? {
            if mirror.origin.kind != OriginKind::Binary {
                if let Some(entry) = &mirror.origin.entry {
                    return Ok(entry.clone());
                }
            }
        }

        let candidates = env.source_folders_with_package(spec.mirror_package())?;
        let not_found = || DerivedResourceError::NoSourceFolder {
            mirror: spec.mirror_type.clone(),
        };
        let Some(module) = &model.module else {
            return candidates.into_iter().next().ok_or_else(not_found);
        };

        let graph = env.module_graph()?;
        let Some(start) = graph.find(module) else {
            return candidates.into_iter().next().ok_or_else(not_found);
        };
        let nearest = ModuleDependencies::of(&graph, start)
            .recursive(true)
            .include_self(true)
            .flat_map(|node| node.source_folders())
            .find(|folder| candidates.contains(folder))
            .cloned();
        nearest.ok_or_else(not_found)
    }

    fn template(
        &self,
        env: &Environment,
        model: &Arc<TypeDecl>,
        resource: &DerivedResource,
        specification: &ApiSpecification,
    ) -> Result<MirrorTemplate, DerivedResourceError> {
        let dto = specification.api::<dyn DtoApi>()?;
        let spec = resource.spec();
        let (default_super, content) = match resource.kind() {
            MirrorKind::Form => (
                dto.abstract_form_data(),
                MirrorContent::Form {
                    fields: self.form_fields(env, model)?,
                },
            ),
            MirrorKind::Page => (
                dto.abstract_table_page_data(),
                MirrorContent::Page {
                    columns: self.page_columns(env, model)?,
                },
            ),
            MirrorKind::Table => (
                dto.abstract_table_row_data(),
                MirrorContent::Table {
                    columns: self.columns(env, model)?,
                },
            ),
        };
        Ok(MirrorTemplate {
            package: spec.mirror_package().to_string(),
            simple_name: spec.mirror_simple_name().to_string(),
            model_type: model.fqn.clone(),
            super_class: spec
                .super_mirror
                .clone()
                .unwrap_or_else(|| default_super.to_string()),
            generated_annotation: generated_annotation().apply_to(specification)?,
            value_field_data: dto.abstract_value_field_data().to_string(),
            table_row_data: dto.abstract_table_row_data().to_string(),
            field_accessor: dto.field_accessor().to_string(),
            content,
        })
    }

    /// Value fields anywhere below the form, skipping those marked ignored.
    fn form_fields(&self, env: &Environment, form: &TypeDecl) -> Result<Vec<FieldData>, DerivedResourceError> {
        let mut fields = Vec::new();
        for field in NestedTypes::of(env, form).recursive(true) {
            let field = field?;
            if !self.is_subtype(env, &field, &self.config.value_field_interface)? {
                continue;
            }
            let ignored = env
                .annotation(&field, &self.config.form_data_annotation)?
                .and_then(|annotation| {
                    annotation
                        .enum_value(&self.config.sdk_command_element)
                        .map(|command| self.config.is_ignored_command(command))
                })
                .unwrap_or(false);
            if ignored {
                debug!(field = %field.fqn, "skipping ignored form field");
                continue;
            }
            fields.push(FieldData {
                field_type: field.simple_name.clone(),
                value_type: self.value_type(env, &field)?,
            });
        }
        Ok(fields)
    }

    fn page_columns(&self, env: &Environment, page: &TypeDecl) -> Result<Vec<ColumnData>, DerivedResourceError> {
        for nested in NestedTypes::of(env, page).recursive(true) {
            let nested = nested?;
            if self.is_subtype(env, &nested, &self.config.table_interface)? {
                return self.columns(env, &nested);
            }
        }
        Ok(Vec::new())
    }

    fn columns(&self, env: &Environment, table: &TypeDecl) -> Result<Vec<ColumnData>, DerivedResourceError> {
        let mut columns = Vec::new();
        for column in NestedTypes::of(env, table) {
            let column = column?;
            if self.is_subtype(env, &column, &self.config.column_interface)? {
                columns.push(ColumnData {
                    column_type: column.simple_name.clone(),
                    value_type: self.value_type(env, &column)?,
                });
            }
        }
        Ok(columns)
    }

    fn is_subtype(&self, env: &Environment, ty: &Arc<TypeDecl>, fqn: &str) -> Result<bool, DerivedResourceError> {
        let declares = |decl: &TypeDecl| {
            decl.fqn == fqn
                || decl.super_class.as_ref().is_some_and(|parent| parent.name == fqn)
                || decl.interfaces.iter().any(|parent| parent.name == fqn)
        };
        let found = SuperTypes::of(env, Arc::clone(ty))
            .filter_types(declares)
            .first_type()?;
        Ok(found.is_some())
    }

    /// First concrete type argument passed up the superclass chain.
    fn value_type(&self, env: &Environment, ty: &Arc<TypeDecl>) -> Result<Option<TypeRef>, DerivedResourceError> {
        for decl in SuperTypes::of(env, Arc::clone(ty)).interfaces(false) {
            let decl = decl?;
            let argument = decl
                .super_class
                .as_ref()
                .and_then(|super_class| super_class.arguments.first())
                .filter(|argument| !decl.type_parameters.contains(&argument.name));
            if let Some(argument) = argument {
                return Ok(Some(argument.clone()));
            }
        }
        Ok(None)
    }

    fn existing_source(&self, env: &Environment, mirror_type: &str) -> Result<Option<Arc<str>>, DerivedResourceError> {
        let Some(mirror) = env.find_type(mirror_type)? else {
            return Ok(None);
        };
        if mirror.origin.kind == OriginKind::Binary {
            return Ok(None);
        }
        Ok(env.source_of(&mirror)?)
    }
}
