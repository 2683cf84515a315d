use crate::error::EnvironmentError;
use jsm_classpath::normalize_path;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const JAVA_SUFFIX: &str = ".java";

/// Identifies a compilation unit independent of where it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitKey {
    /// Empty for the default package.
    pub package: String,
    pub file_name: String,
}

impl UnitKey {
    pub fn new(package: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            file_name: file_name.into(),
        }
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            f.write_str(&self.file_name)
        } else {
            write!(f, "{}/{}", self.package.replace('.', "/"), self.file_name)
        }
    }
}

/// Location description of a compilation unit, existing or about to be written.
#[derive(Debug, Clone)]
pub struct CompilationUnitInfo {
    file_name: String,
    package: Option<String>,
    source_folder: Option<PathBuf>,
    target_directory: PathBuf,
    target_file: PathBuf,
}

impl CompilationUnitInfo {
    /// Describe `<source_folder>/<package path>/<file_name>`; the `.java`
    /// suffix is appended when missing.
    pub fn new(
        source_folder: Option<&Path>,
        package: Option<&str>,
        file_name: &str,
    ) -> Result<Self, EnvironmentError> {
        let file_name = file_name.trim();
        if file_name.is_empty() || file_name.contains(['/', '\\']) {
            return Err(EnvironmentError::InvalidUnit(format!(
                "`{file_name}` is not a compilation unit file name"
            )));
        }
        let file_name = if file_name.ends_with(JAVA_SUFFIX) {
            file_name.to_string()
        } else {
            format!("{file_name}{JAVA_SUFFIX}")
        };
        let package = package
            .map(str::trim)
            .filter(|package| !package.is_empty())
            .map(str::to_string);
        let source_folder = source_folder
            .map(|folder| normalize_path(folder).map_err(EnvironmentError::from))
            .transpose()?;

        let mut target_directory = source_folder.clone().unwrap_or_default();
        if let Some(package) = &package {
            for segment in package.split('.') {
                target_directory.push(segment);
            }
        }
        let target_file = target_directory.join(&file_name);
        Ok(Self {
            file_name,
            package,
            source_folder,
            target_directory,
            target_file,
        })
    }

    /// Derive the package from a path relative to `source_folder`.
    pub fn from_relative_path(source_folder: &Path, relative: &Path) -> Result<Self, EnvironmentError> {
        let file_name = relative
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                EnvironmentError::InvalidUnit(format!("`{}` has no file name", relative.display()))
            })?;
        let package = relative
            .parent()
            .map(|parent| {
                parent
                    .components()
                    .filter_map(|component| component.as_os_str().to_str())
                    .collect::<Vec<_>>()
                    .join(".")
            })
            .unwrap_or_default();
        Self::new(Some(source_folder), Some(&package), file_name)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    pub fn source_folder(&self) -> Option<&Path> {
        self.source_folder.as_deref()
    }

    pub fn target_directory(&self) -> &Path {
        &self.target_directory
    }

    pub fn target_file(&self) -> &Path {
        &self.target_file
    }

    /// Simple name of the primary type, the file name without `.java`.
    pub fn main_type_simple_name(&self) -> &str {
        self.file_name
            .strip_suffix(JAVA_SUFFIX)
            .unwrap_or(&self.file_name)
    }

    pub fn main_type_fqn(&self) -> String {
        match &self.package {
            Some(package) => format!("{package}.{}", self.main_type_simple_name()),
            None => self.main_type_simple_name().to_string(),
        }
    }

    pub fn unit_key(&self) -> UnitKey {
        UnitKey::new(self.package.clone().unwrap_or_default(), self.file_name.clone())
    }
}

impl PartialEq for CompilationUnitInfo {
    fn eq(&self, other: &Self) -> bool {
        self.target_file == other.target_file && self.source_folder == other.source_folder
    }
}

impl Eq for CompilationUnitInfo {}

impl fmt::Display for CompilationUnitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.target_file.display())
    }
}

/// In-memory source that shadows or adds a compilation unit.
#[derive(Debug, Clone)]
pub struct WorkingCopy {
    pub info: CompilationUnitInfo,
    pub text: Arc<str>,
}

impl WorkingCopy {
    pub fn new(info: CompilationUnitInfo, source: impl AsRef<[u8]>) -> Self {
        let text: Arc<str> = String::from_utf8_lossy(source.as_ref()).into();
        Self { info, text }
    }

    pub fn key(&self) -> UnitKey {
        self.info.unit_key()
    }
}
