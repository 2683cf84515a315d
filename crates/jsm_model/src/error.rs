use crate::classfile::ClassParseError;
use crate::source::ScanError;
use jsm_classpath::ClasspathError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("the environment is closed; reload it before querying")]
    Closed,
    #[error(transparent)]
    Classpath(#[from] ClasspathError),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("malformed class file {path}: {source}")]
    ClassFile {
        path: String,
        #[source]
        source: ClassParseError,
    },
    #[error("cannot scan {unit}: {source}")]
    Source {
        unit: String,
        #[source]
        source: ScanError,
    },
    #[error("invalid compilation unit: {0}")]
    InvalidUnit(String),
}

impl EnvironmentError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn archive(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        Self::Archive {
            path: path.into(),
            source,
        }
    }
}
