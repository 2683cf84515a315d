// jsm_classpath - classpath ordering and runtime discovery
mod entry;
mod resolver;
mod runtime;

pub use entry::{normalize_path, ClasspathEntry, EntryMode};
pub use resolver::{ClasspathBucket, ClasspathResolver, ResolvedClasspath};
pub use runtime::{discover_runtime, runtime_from_home, RuntimeDescriptor, RuntimeSource};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClasspathError {
    #[error("Unable to probe classpath entry {path}: {source}")]
    ClasspathProbe {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Java runtime not found: {0}")]
    RuntimeNotFound(String),
    #[error("Unable to resolve working directory for {path}: {source}")]
    Normalize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests;
