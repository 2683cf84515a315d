use jsm_api::ApiError;
use jsm_model::source::ScanError;
use jsm_model::EnvironmentError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DerivedResourceError {
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("No source folder found for mirror type '{mirror}'")]
    NoSourceFolder { mirror: String },

    #[error("Failed to scan existing mirror '{mirror}': {source}")]
    Merge {
        mirror: String,
        #[source]
        source: ScanError,
    },

    #[error("Existing unit of '{mirror}' does not declare the mirror type")]
    MirrorNotDeclared { mirror: String },

    #[error("Writing '{mirror}' failed: {message}")]
    Write { mirror: String, message: String },

    #[error("Failed to read mirror configuration {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid mirror configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("{} derived resource request(s) failed", .0.len())]
    Multiple(Vec<GenerationFailure>),
}

/// A request that did not produce its mirror.
#[derive(Debug)]
pub struct GenerationFailure {
    pub model_type: String,
    pub error: DerivedResourceError,
}

impl fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.model_type, self.error)
    }
}
