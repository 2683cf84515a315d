use crate::annotation::{decode_binary, decode_source, Annotation, RawPayload};
use crate::element::TypeDecl;
use crate::error::EnvironmentError;
use crate::frontend::{indexing_frontend_factory, CompilerFrontend, FrontendFactory, TypeLocation};
use crate::manifest::artifact_version;
use crate::module::ModuleGraph;
use crate::unit::{CompilationUnitInfo, UnitKey, WorkingCopy};
use indexmap::IndexMap;
use jsm_api::{ApiContext, ApiVersion};
use jsm_classpath::{ClasspathEntry, ClasspathResolver, ResolvedClasspath};
use once_cell::unsync::OnceCell;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Type whose archive identifies the runtime API version by default.
pub const DEFAULT_API_MARKER_TYPE: &str = "org.eclipse.scout.rt.platform.Platform";

#[derive(Clone)]
pub struct EnvironmentConfig {
    raw_classpath: Vec<ClasspathEntry>,
    runtime_home: Option<PathBuf>,
    module_requires: IndexMap<String, Vec<String>>,
    api_version: Option<ApiVersion>,
    api_marker_type: String,
    frontend: FrontendFactory,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            raw_classpath: Vec::new(),
            runtime_home: None,
            module_requires: IndexMap::new(),
            api_version: None,
            api_marker_type: DEFAULT_API_MARKER_TYPE.to_string(),
            frontend: indexing_frontend_factory(),
        }
    }
}

impl EnvironmentConfig {
    pub fn new<I>(raw_classpath: I) -> Self
    where
        I: IntoIterator<Item = ClasspathEntry>,
    {
        Self {
            raw_classpath: raw_classpath.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_entry(mut self, entry: ClasspathEntry) -> Self {
        self.raw_classpath.push(entry);
        self
    }

    /// Use this runtime installation instead of the current one.
    pub fn with_runtime_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.runtime_home = Some(home.into());
        self
    }

    /// Add `requires` edges that no module descriptor declares.
    pub fn with_module_requires<I, S>(mut self, module: impl Into<String>, requires: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.module_requires
            .entry(module.into())
            .or_default()
            .extend(requires.into_iter().map(Into::into));
        self
    }

    pub fn with_api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    pub fn with_api_marker_type(mut self, fqn: impl Into<String>) -> Self {
        self.api_marker_type = fqn.into();
        self
    }

    pub fn with_frontend(mut self, factory: FrontendFactory) -> Self {
        self.frontend = factory;
        self
    }

    pub fn raw_classpath(&self) -> &[ClasspathEntry] {
        &self.raw_classpath
    }

    pub fn runtime_home(&self) -> Option<&Path> {
        self.runtime_home.as_deref()
    }
}

impl fmt::Debug for EnvironmentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentConfig")
            .field("raw_classpath", &self.raw_classpath)
            .field("runtime_home", &self.runtime_home)
            .field("module_requires", &self.module_requires)
            .field("api_version", &self.api_version)
            .field("api_marker_type", &self.api_marker_type)
            .finish_non_exhaustive()
    }
}

/// Sizes of the caches and state of the lazily built handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub elements: usize,
    pub binary_annotations: usize,
    pub source_annotations: usize,
    pub sources: usize,
    pub compiler_initialized: bool,
    pub classpath_initialized: bool,
}

impl CacheStats {
    pub fn is_empty(&self) -> bool {
        self.elements == 0
            && self.binary_annotations == 0
            && self.source_annotations == 0
            && self.sources == 0
    }
}

struct CompilerState {
    frontend: RefCell<Box<dyn CompilerFrontend>>,
    modules: RefCell<Option<Arc<ModuleGraph>>>,
}

type AnnotationKey = (String, String);

/// Queryable model of the types visible from one classpath.
///
/// The environment is single-threaded: lookups take `&self` and populate
/// interior caches, lifecycle changes take `&mut self`.
pub struct Environment {
    config: EnvironmentConfig,
    closed: bool,
    classpath: OnceCell<Arc<ResolvedClasspath>>,
    compiler: OnceCell<CompilerState>,
    overrides: IndexMap<UnitKey, WorkingCopy>,
    /// Overrides registered after the compiler was built and not yet applied to it.
    pending: RefCell<Vec<UnitKey>>,
    elements: RefCell<HashMap<String, Arc<TypeDecl>>>,
    binary_annotations: RefCell<HashMap<AnnotationKey, Arc<Annotation>>>,
    source_annotations: RefCell<HashMap<AnnotationKey, Arc<Annotation>>>,
    sources: RefCell<HashMap<UnitKey, Arc<str>>>,
}

impl Environment {
    /// Nothing is resolved until the first query.
    pub fn new(config: EnvironmentConfig) -> Self {
        Self {
            config,
            closed: false,
            classpath: OnceCell::new(),
            compiler: OnceCell::new(),
            overrides: IndexMap::new(),
            pending: RefCell::new(Vec::new()),
            elements: RefCell::new(HashMap::new()),
            binary_annotations: RefCell::new(HashMap::new()),
            source_annotations: RefCell::new(HashMap::new()),
            sources: RefCell::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    pub fn raw_classpath(&self) -> &[ClasspathEntry] {
        &self.config.raw_classpath
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn overrides(&self) -> impl Iterator<Item = &WorkingCopy> {
        self.overrides.values()
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            elements: self.elements.borrow().len(),
            binary_annotations: self.binary_annotations.borrow().len(),
            source_annotations: self.source_annotations.borrow().len(),
            sources: self.sources.borrow().len(),
            compiler_initialized: self.compiler.get().is_some(),
            classpath_initialized: self.classpath.get().is_some(),
        }
    }

    pub fn resolved_classpath(&self) -> Result<Arc<ResolvedClasspath>, EnvironmentError> {
        self.ensure_open()?;
        self.classpath
            .get_or_try_init(|| {
                ClasspathResolver::new()
                    .resolve(&self.config.raw_classpath, self.config.runtime_home.as_deref())
                    .map(Arc::new)
            })
            .map(Arc::clone)
            .map_err(EnvironmentError::from)
    }

    pub fn find_type(&self, fqn: &str) -> Result<Option<Arc<TypeDecl>>, EnvironmentError> {
        let compiler = self.compiler()?;
        if let Some(hit) = self.elements.borrow().get(fqn) {
            return Ok(Some(Arc::clone(hit)));
        }
        let resolved = compiler.frontend.borrow().resolve_type(fqn)?;
        Ok(resolved.map(|decl| {
            let decl = Arc::new(decl);
            self.elements
                .borrow_mut()
                .insert(fqn.to_string(), Arc::clone(&decl));
            decl
        }))
    }

    pub fn locate(&self, fqn: &str) -> Result<Option<TypeLocation>, EnvironmentError> {
        Ok(self.compiler()?.frontend.borrow().locate(fqn))
    }

    /// Shadow a compilation unit with in-memory source.
    ///
    /// Accepted in every state. On a closed environment the override only
    /// becomes visible after [`Environment::reload`].
    pub fn register_compilation_unit_override(
        &mut self,
        source: impl AsRef<[u8]>,
        info: CompilationUnitInfo,
    ) {
        let copy = WorkingCopy::new(info, source);
        let key = copy.key();
        debug!(unit = %key, closed = self.closed, "registered working copy");
        self.overrides.insert(key.clone(), copy);
        if !self.closed && self.compiler.get().is_some() {
            self.pending.get_mut().push(key);
        }
    }

    /// Drop caches and the compiler; the raw classpath and overrides are kept.
    pub fn close(&mut self) {
        self.reset();
        if !self.closed {
            info!(entries = self.config.raw_classpath.len(), "closed semantic environment");
        }
        self.closed = true;
    }

    /// Rebuild classpath and compiler from the raw classpath and all overrides.
    pub fn reload(&mut self) -> Result<(), EnvironmentError> {
        self.reset();
        self.closed = false;
        self.compiler()?;
        info!(
            entries = self.config.raw_classpath.len(),
            overrides = self.overrides.len(),
            "reloaded semantic environment"
        );
        Ok(())
    }

    pub fn module_graph(&self) -> Result<Arc<ModuleGraph>, EnvironmentError> {
        let compiler = self.compiler()?;
        if let Some(graph) = compiler.modules.borrow().as_ref() {
            return Ok(Arc::clone(graph));
        }
        let mut builder = ModuleGraph::builder();
        compiler.frontend.borrow().describe_modules(&mut builder)?;
        for (module, requires) in &self.config.module_requires {
            for target in requires {
                builder.requires(module, target, false);
            }
        }
        let graph = Arc::new(builder.build());
        debug!(modules = graph.len(), "built module graph");
        *compiler.modules.borrow_mut() = Some(Arc::clone(&graph));
        Ok(graph)
    }

    /// Text of the compilation unit declaring `ty`, working copy first.
    pub fn source_of(&self, ty: &TypeDecl) -> Result<Option<Arc<str>>, EnvironmentError> {
        let compiler = self.compiler()?;
        let Some(unit) = &ty.origin.unit else {
            return Ok(None);
        };
        if let Some(hit) = self.sources.borrow().get(unit) {
            return Ok(Some(Arc::clone(hit)));
        }
        let text = compiler.frontend.borrow().unit_source(unit)?;
        if let Some(text) = &text {
            self.sources
                .borrow_mut()
                .insert(unit.clone(), Arc::clone(text));
        }
        Ok(text)
    }

    /// Decoded annotation `fqn` on `ty`, if present.
    pub fn annotation(&self, ty: &TypeDecl, fqn: &str) -> Result<Option<Arc<Annotation>>, EnvironmentError> {
        let compiler = self.compiler()?;
        let Some(raw) = ty.annotations.iter().find(|raw| raw.type_name == fqn) else {
            return Ok(None);
        };
        let key = (ty.binary_name.clone(), fqn.to_string());
        let cache = match raw.payload {
            RawPayload::Binary(_) => &self.binary_annotations,
            RawPayload::Source { .. } => &self.source_annotations,
        };
        if let Some(hit) = cache.borrow().get(&key) {
            return Ok(Some(Arc::clone(hit)));
        }
        let decoded = match &raw.payload {
            RawPayload::Binary(pairs) => decode_binary(&raw.type_name, pairs),
            RawPayload::Source { arguments, context } => {
                let frontend = compiler.frontend.borrow();
                decode_source(&raw.type_name, arguments.as_deref(), context, &|name| {
                    frontend.resolve_name(context, name)
                })
            }
        };
        let decoded = Arc::new(decoded);
        cache.borrow_mut().insert(key, Arc::clone(&decoded));
        Ok(Some(decoded))
    }

    pub fn annotations(&self, ty: &TypeDecl) -> Result<Vec<Arc<Annotation>>, EnvironmentError> {
        let mut decoded = Vec::with_capacity(ty.annotations.len());
        for raw in &ty.annotations {
            if let Some(annotation) = self.annotation(ty, &raw.type_name)? {
                decoded.push(annotation);
            }
        }
        Ok(decoded)
    }

    pub fn source_folders_with_package(&self, package: &str) -> Result<Vec<ClasspathEntry>, EnvironmentError> {
        Ok(self
            .compiler()?
            .frontend
            .borrow()
            .source_folders_with_package(package))
    }

    /// Version of the runtime API on the classpath.
    pub fn detect_api_version(&self) -> Result<Option<ApiVersion>, EnvironmentError> {
        if let Some(version) = &self.config.api_version {
            return Ok(Some(version.clone()));
        }
        let location = self.locate(&self.config.api_marker_type)?;
        let Some(entry) = location.and_then(|location| location.entry) else {
            debug!(marker = %self.config.api_marker_type, "API marker type not on classpath");
            return Ok(None);
        };
        let version = artifact_version(entry.path())?;
        debug!(path = %entry.path().display(), version = ?version.as_ref().map(ToString::to_string), "detected API version");
        Ok(version)
    }

    fn ensure_open(&self) -> Result<(), EnvironmentError> {
        if self.closed {
            return Err(EnvironmentError::Closed);
        }
        Ok(())
    }

    fn compiler(&self) -> Result<&CompilerState, EnvironmentError> {
        self.ensure_open()?;
        let state = self.compiler.get_or_try_init(|| self.create_compiler())?;
        self.apply_pending(state)?;
        Ok(state)
    }

    fn create_compiler(&self) -> Result<CompilerState, EnvironmentError> {
        let classpath = self.resolved_classpath()?;
        let mut frontend = (self.config.frontend)(&classpath)?;
        for copy in self.overrides.values() {
            frontend.apply_working_copy(copy)?;
        }
        self.pending.borrow_mut().clear();
        info!(
            user_entries = classpath.user_classpath().len(),
            boot_entries = classpath.boot_classpath().len(),
            overrides = self.overrides.len(),
            "initialized compiler front-end"
        );
        Ok(CompilerState {
            frontend: RefCell::new(frontend),
            modules: RefCell::new(None),
        })
    }

    fn apply_pending(&self, state: &CompilerState) -> Result<(), EnvironmentError> {
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        if pending.is_empty() {
            return Ok(());
        }
        {
            let mut frontend = state.frontend.borrow_mut();
            for key in &pending {
                if let Some(copy) = self.overrides.get(key) {
                    frontend.apply_working_copy(copy)?;
                }
            }
        }
        state.modules.borrow_mut().take();
        self.clear_caches();
        debug!(applied = pending.len(), "applied pending working copies");
        Ok(())
    }

    fn reset(&mut self) {
        self.clear_caches();
        self.compiler = OnceCell::new();
        self.classpath = OnceCell::new();
        self.pending.get_mut().clear();
    }

    fn clear_caches(&self) {
        self.elements.borrow_mut().clear();
        self.binary_annotations.borrow_mut().clear();
        self.source_annotations.borrow_mut().clear();
        self.sources.borrow_mut().clear();
    }
}

impl ApiContext for Environment {
    fn api_version(&self) -> Option<ApiVersion> {
        self.detect_api_version().unwrap_or_else(|error| {
            warn!(error = %error, "API version detection failed");
            None
        })
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("closed", &self.closed)
            .field("raw_classpath", &self.config.raw_classpath)
            .field("overrides", &self.overrides.len())
            .field("caches", &self.cache_stats())
            .finish()
    }
}
