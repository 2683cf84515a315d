use crate::ClasspathError;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Component, Path, PathBuf};

/// Whether an entry contributes compilation units or compiled classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryMode {
    Source,
    Binary,
}

impl EntryMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            EntryMode::Source => "source",
            EntryMode::Binary => "binary",
        }
    }
}

impl fmt::Display for EntryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single source folder or binary location on the classpath.
///
/// Identity is the normalized absolute path plus the mode; the owning module is
/// carried along but never takes part in equality.
#[derive(Debug, Clone)]
pub struct ClasspathEntry {
    path: PathBuf,
    mode: EntryMode,
    module: Option<String>,
}

impl ClasspathEntry {
    pub fn new(path: impl AsRef<Path>, mode: EntryMode) -> Result<Self, ClasspathError> {
        Ok(Self {
            path: normalize_path(path.as_ref())?,
            mode,
            module: None,
        })
    }

    pub fn source(path: impl AsRef<Path>) -> Result<Self, ClasspathError> {
        Self::new(path, EntryMode::Source)
    }

    pub fn binary(path: impl AsRef<Path>) -> Result<Self, ClasspathError> {
        Self::new(path, EntryMode::Binary)
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> EntryMode {
        self.mode
    }

    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    pub fn is_source(&self) -> bool {
        self.mode == EntryMode::Source
    }
}

impl PartialEq for ClasspathEntry {
    fn eq(&self, other: &Self) -> bool {
        self.mode == other.mode && self.path == other.path
    }
}

impl Eq for ClasspathEntry {}

impl Hash for ClasspathEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
        self.mode.hash(state);
    }
}

impl fmt::Display for ClasspathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.path.display(), self.mode)
    }
}

/// Make `path` absolute and drop `.`/`..` components without touching the file system.
pub fn normalize_path(path: &Path) -> Result<PathBuf, ClasspathError> {
    let absolute = std::path::absolute(path).map_err(|source| ClasspathError::Normalize {
        path: path.to_path_buf(),
        source,
    })?;

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}
