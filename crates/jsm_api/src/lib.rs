//! Selection of version-specific runtime API descriptions.
//!
//! A target runtime changes class names and capabilities between releases.
//! Each release line is described by an [`ApiImplementation`] tagged with the
//! minimum [`ApiVersion`] it applies to and a set of facets. Given the version
//! declared by a project, [`ApiSpecification::create`] picks the latest
//! implementation that does not exceed it. Callers own the ordered list of
//! implementations; there is no process-wide registry.

mod facet;
mod function;
mod specification;
mod version;

pub use facet::FacetSet;
pub use function::{ApiContext, ApiFunction};
pub use specification::{ApiCatalog, ApiImplementation, ApiSpecification};
pub use version::ApiVersion;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("API '{api}' ({version}) does not provide facet '{facet}'")]
    MissingFacet {
        api: String,
        version: ApiVersion,
        facet: &'static str,
    },
    #[error("API function bound to facet '{facet}' requires a context")]
    MissingContext { facet: &'static str },
    #[error("no API implementation applies to version {requested}")]
    NoApplicableVersion { requested: String },
}

#[cfg(test)]
mod tests;
