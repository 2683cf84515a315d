use crate::{ApiError, ApiVersion, FacetSet};
use std::any::type_name;
use std::sync::Arc;
use tracing::trace;

/// One release line of the target runtime API.
#[derive(Debug)]
pub struct ApiImplementation {
    name: String,
    min_version: ApiVersion,
    facets: FacetSet,
}

impl ApiImplementation {
    pub fn new(name: impl Into<String>, min_version: ApiVersion) -> Self {
        Self {
            name: name.into(),
            min_version,
            facets: FacetSet::new(),
        }
    }

    pub fn with_facet<F>(mut self, facet: Arc<F>) -> Self
    where
        F: ?Sized + Send + Sync + 'static,
    {
        self.facets.insert(facet);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min_version(&self) -> &ApiVersion {
        &self.min_version
    }

    pub fn facets(&self) -> &FacetSet {
        &self.facets
    }
}

/// Ordered list of implementations owned by the caller.
#[derive(Debug, Clone, Default)]
pub struct ApiCatalog {
    implementations: Vec<Arc<ApiImplementation>>,
}

impl ApiCatalog {
    pub fn new(implementations: Vec<Arc<ApiImplementation>>) -> Self {
        Self { implementations }
    }

    pub fn with(mut self, implementation: ApiImplementation) -> Self {
        self.implementations.push(Arc::new(implementation));
        self
    }

    pub fn implementations(&self) -> &[Arc<ApiImplementation>] {
        &self.implementations
    }

    pub fn specification(&self, requested: &ApiVersion) -> Option<ApiSpecification> {
        ApiSpecification::create(&self.implementations, requested)
    }
}

/// The implementation chosen for a requested version.
#[derive(Debug, Clone)]
pub struct ApiSpecification {
    implementation: Arc<ApiImplementation>,
    requested: ApiVersion,
}

impl ApiSpecification {
    /// Pick the implementation with the greatest minimum version not exceeding
    /// `requested`. Ties keep the earlier implementation. `None` when
    /// `requested` is below every minimum.
    pub fn create(
        implementations: &[Arc<ApiImplementation>],
        requested: &ApiVersion,
    ) -> Option<Self> {
        let mut selected: Option<&Arc<ApiImplementation>> = None;
        for candidate in implementations {
            if candidate.min_version() > requested {
                continue;
            }
            match selected {
                Some(current) if current.min_version() >= candidate.min_version() => {}
                _ => selected = Some(candidate),
            }
        }

        let implementation = selected?.clone();
        trace!(
            requested = %requested,
            selected = implementation.name(),
            "selected API implementation"
        );
        Some(Self {
            implementation,
            requested: requested.clone(),
        })
    }

    pub fn name(&self) -> &str {
        self.implementation.name()
    }

    pub fn min_version(&self) -> &ApiVersion {
        self.implementation.min_version()
    }

    pub fn requested_version(&self) -> &ApiVersion {
        &self.requested
    }

    pub fn implementation(&self) -> &Arc<ApiImplementation> {
        &self.implementation
    }

    /// Mandatory facet access.
    pub fn api<F>(&self) -> Result<Arc<F>, ApiError>
    where
        F: ?Sized + Send + Sync + 'static,
    {
        self.opt_api::<F>().ok_or_else(|| ApiError::MissingFacet {
            api: self.name().to_string(),
            version: self.min_version().clone(),
            facet: type_name::<F>(),
        })
    }

    /// Optional facet access; absence is not an error.
    pub fn opt_api<F>(&self) -> Option<Arc<F>>
    where
        F: ?Sized + Send + Sync + 'static,
    {
        self.implementation.facets().get::<F>()
    }
}
