use crate::{ApiCatalog, ApiError, ApiSpecification, ApiVersion};
use std::any::type_name;
use std::fmt;
use std::sync::Arc;

/// Anything that can tell which runtime API version it targets.
pub trait ApiContext {
    fn api_version(&self) -> Option<ApiVersion>;
}

impl ApiContext for ApiVersion {
    fn api_version(&self) -> Option<ApiVersion> {
        Some(self.clone())
    }
}

type FacetResolver<R> = Arc<dyn Fn(&ApiSpecification) -> Result<R, ApiError> + Send + Sync>;

enum Binding<R> {
    Value(R),
    Facet {
        facet: &'static str,
        optional: bool,
        resolve: FacetResolver<R>,
    },
}

/// A value that is either fixed or read from an API facet once a context is known.
pub struct ApiFunction<R> {
    binding: Binding<R>,
}

impl<R: Clone> ApiFunction<R> {
    /// Context-free value.
    pub fn value(value: R) -> Self {
        Self {
            binding: Binding::Value(value),
        }
    }

    /// Read from facet `F`; a missing facet is an error.
    pub fn facet<F>(accessor: impl Fn(&F) -> R + Send + Sync + 'static) -> Self
    where
        F: ?Sized + Send + Sync + 'static,
    {
        Self::bind::<F>(accessor, false)
    }

    /// Read from facet `F`; a missing facet yields `None`.
    pub fn optional_facet<F>(accessor: impl Fn(&F) -> R + Send + Sync + 'static) -> Self
    where
        F: ?Sized + Send + Sync + 'static,
    {
        Self::bind::<F>(accessor, true)
    }

    fn bind<F>(accessor: impl Fn(&F) -> R + Send + Sync + 'static, optional: bool) -> Self
    where
        F: ?Sized + Send + Sync + 'static,
    {
        Self {
            binding: Binding::Facet {
                facet: type_name::<F>(),
                optional,
                resolve: Arc::new(move |specification: &ApiSpecification| {
                    specification.api::<F>().map(|api| accessor(&*api))
                }),
            },
        }
    }

    pub fn requires_context(&self) -> bool {
        matches!(self.binding, Binding::Facet { .. })
    }

    /// Resolve against the specification the catalog selects for `context`.
    pub fn apply(
        &self,
        catalog: &ApiCatalog,
        context: Option<&dyn ApiContext>,
    ) -> Result<Option<R>, ApiError> {
        let (facet, optional) = match &self.binding {
            Binding::Value(value) => return Ok(Some(value.clone())),
            Binding::Facet {
                facet, optional, ..
            } => (*facet, *optional),
        };

        let context = context.ok_or(ApiError::MissingContext { facet })?;
        let version = context.api_version();
        let specification = version.as_ref().and_then(|v| catalog.specification(v));
        match specification {
            Some(specification) => self.apply_to(&specification),
            None if optional => Ok(None),
            None => Err(ApiError::NoApplicableVersion {
                requested: version
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "<unknown>".to_string()),
            }),
        }
    }

    pub fn apply_to(&self, specification: &ApiSpecification) -> Result<Option<R>, ApiError> {
        match &self.binding {
            Binding::Value(value) => Ok(Some(value.clone())),
            Binding::Facet {
                optional, resolve, ..
            } => match resolve(specification) {
                Ok(value) => Ok(Some(value)),
                Err(ApiError::MissingFacet { .. }) if *optional => Ok(None),
                Err(error) => Err(error),
            },
        }
    }
}

impl<R: Clone> Clone for ApiFunction<R> {
    fn clone(&self) -> Self {
        let binding = match &self.binding {
            Binding::Value(value) => Binding::Value(value.clone()),
            Binding::Facet {
                facet,
                optional,
                resolve,
            } => Binding::Facet {
                facet: *facet,
                optional: *optional,
                resolve: Arc::clone(resolve),
            },
        };
        Self { binding }
    }
}

impl<R: fmt::Debug> fmt::Debug for ApiFunction<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.binding {
            Binding::Value(value) => f.debug_tuple("ApiFunction::Value").field(value).finish(),
            Binding::Facet {
                facet, optional, ..
            } => f
                .debug_struct("ApiFunction::Facet")
                .field("facet", facet)
                .field("optional", optional)
                .finish(),
        }
    }
}
