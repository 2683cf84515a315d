use crate::{ClasspathEntry, ClasspathError};
use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// How the runtime home was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeSource {
    /// Supplied by the caller.
    Explicit,
    /// The installation of the currently running Java runtime.
    Current,
}

/// A resolved Java runtime installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeDescriptor {
    pub home: PathBuf,
    pub source: RuntimeSource,
    /// Raw `JAVA_VERSION` from the `release` file, when present.
    pub version: Option<String>,
    pub major_version: Option<u32>,
}

impl RuntimeDescriptor {
    /// Platform libraries of this runtime in lookup order. Never empty.
    pub fn boot_classpath(&self) -> Result<Vec<ClasspathEntry>, ClasspathError> {
        let mut entries = Vec::new();

        let jmods = self.home.join("jmods");
        if jmods.is_dir() {
            let mut archives = list_files_with_extension(&jmods, "jmod")?;
            archives.sort();
            for archive in archives {
                let module = archive
                    .file_stem()
                    .and_then(OsStr::to_str)
                    .map(str::to_string);
                let entry = ClasspathEntry::binary(&archive)?;
                entries.push(match module {
                    Some(name) => entry.with_module(name),
                    None => entry,
                });
            }
        }

        if entries.is_empty() {
            let image = self.home.join("lib").join("modules");
            if image.is_file() {
                entries.push(ClasspathEntry::binary(image)?);
            }
        }

        if entries.is_empty() {
            for lib in [self.home.join("jre").join("lib"), self.home.join("lib")] {
                if !lib.is_dir() {
                    continue;
                }
                let mut jars = list_files_with_extension(&lib, "jar")?;
                // rt.jar carries java.lang and must be looked at first.
                jars.sort_by_key(|path| {
                    (
                        path.file_name() != Some(OsStr::new("rt.jar")),
                        path.clone(),
                    )
                });
                for jar in jars {
                    entries.push(ClasspathEntry::binary(jar)?);
                }
            }
        }

        if entries.is_empty() {
            return Err(ClasspathError::RuntimeNotFound(format!(
                "no platform libraries found under '{}'",
                self.home.display()
            )));
        }

        Ok(entries)
    }
}

/// Bind to `explicit_home` when given, otherwise to the running Java installation.
pub fn discover_runtime(explicit_home: Option<&Path>) -> Result<RuntimeDescriptor, ClasspathError> {
    match explicit_home {
        Some(home) => runtime_from_home(home, RuntimeSource::Explicit),
        None => {
            let home = find_current_home().ok_or_else(|| {
                ClasspathError::RuntimeNotFound(
                    "Unable to locate a Java runtime. Set JAVA_HOME or put 'java' on PATH.".into(),
                )
            })?;
            runtime_from_home(&home, RuntimeSource::Current)
        }
    }
}

pub fn runtime_from_home(
    home: &Path,
    source: RuntimeSource,
) -> Result<RuntimeDescriptor, ClasspathError> {
    if !home.is_dir() {
        return Err(ClasspathError::RuntimeNotFound(format!(
            "runtime home '{}' is not a directory",
            home.display()
        )));
    }

    let home = crate::normalize_path(home)?;
    let version = read_release_version(&home);
    let major_version = version.as_deref().and_then(interpret_version_token);
    debug!(home = %home.display(), version = ?version, ?source, "resolved Java runtime");

    Ok(RuntimeDescriptor {
        home,
        source,
        version,
        major_version,
    })
}

fn find_current_home() -> Option<PathBuf> {
    find_home_from_env().or_else(find_home_from_path)
}

fn find_home_from_env() -> Option<PathBuf> {
    for var in ["JAVA_HOME", "JDK_HOME"] {
        if let Some(value) = env::var_os(var) {
            let path = PathBuf::from(value);
            if path.is_dir() {
                return Some(path);
            }
        }
    }
    None
}

fn find_home_from_path() -> Option<PathBuf> {
    let java = which::which(java_executable()).ok()?;
    let java = fs::canonicalize(&java).unwrap_or(java);
    let bin_dir = java.parent()?;
    let home = bin_dir.parent()?;
    // JDK 8 ships its launcher inside jre/bin.
    if home.file_name() == Some(OsStr::new("jre")) {
        if let Some(parent) = home.parent() {
            return Some(parent.to_path_buf());
        }
    }
    Some(home.to_path_buf())
}

fn read_release_version(home: &Path) -> Option<String> {
    let release = fs::read_to_string(home.join("release")).ok()?;
    release.lines().find_map(|line| {
        let value = line.strip_prefix("JAVA_VERSION=")?;
        Some(value.trim().trim_matches('"').to_string())
    })
}

pub(crate) fn interpret_version_token(token: &str) -> Option<u32> {
    if let Some(stripped) = token.strip_prefix("1.") {
        let mut parts = stripped.split(['.', '_', '-']);
        let minor = parts.next()?;
        return minor
            .chars()
            .take_while(|ch| ch.is_ascii_digit())
            .collect::<String>()
            .parse::<u32>()
            .ok();
    }

    let digits: String = token.chars().take_while(|ch| ch.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse::<u32>().ok()
    }
}

fn list_files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, ClasspathError> {
    let entries = fs::read_dir(dir).map_err(|source| ClasspathError::ClasspathProbe {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ClasspathError::ClasspathProbe {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(OsStr::to_str)
            .map(|ext| ext.eq_ignore_ascii_case(extension))
            .unwrap_or(false);
        if matches && path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

fn java_executable() -> &'static str {
    if cfg!(windows) { "java.exe" } else { "java" }
}
