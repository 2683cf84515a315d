use crate::runtime::discover_runtime;
use crate::{ClasspathEntry, ClasspathError, EntryMode, RuntimeDescriptor};
use indexmap::IndexSet;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Ordering class of a user classpath entry. Lower buckets sort first.
///
/// The discriminant packs "is binary" into bit 1 and "is not a directory" into
/// bit 0, so source folders precede binaries and directories precede archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClasspathBucket {
    SourceDirectory = 0,
    SourceFile = 1,
    BinaryDirectory = 2,
    BinaryFile = 3,
}

impl ClasspathBucket {
    pub fn from_bits(is_binary: bool, is_directory: bool) -> Self {
        match ((is_binary as u8) << 1) | (!is_directory as u8) {
            0 => ClasspathBucket::SourceDirectory,
            1 => ClasspathBucket::SourceFile,
            2 => ClasspathBucket::BinaryDirectory,
            _ => ClasspathBucket::BinaryFile,
        }
    }

    /// Probe the file system to find the bucket of `entry`.
    pub fn classify(entry: &ClasspathEntry) -> Result<Self, ClasspathError> {
        let metadata =
            fs::metadata(entry.path()).map_err(|source| ClasspathError::ClasspathProbe {
                path: entry.path().to_path_buf(),
                source,
            })?;
        Ok(Self::from_bits(
            entry.mode() == EntryMode::Binary,
            metadata.is_dir(),
        ))
    }
}

/// Result of a classpath resolution.
#[derive(Debug, Clone)]
pub struct ResolvedClasspath {
    user: Vec<ClasspathEntry>,
    boot: Vec<ClasspathEntry>,
    full: Vec<ClasspathEntry>,
    runtime: RuntimeDescriptor,
}

impl ResolvedClasspath {
    /// Project entries: sources first, then binaries, without duplicates.
    pub fn user_classpath(&self) -> &[ClasspathEntry] {
        &self.user
    }

    /// Platform libraries of the runtime. Never empty.
    pub fn boot_classpath(&self) -> &[ClasspathEntry] {
        &self.boot
    }

    /// `boot ++ user`, the order in which types are looked up.
    pub fn full_classpath(&self) -> &[ClasspathEntry] {
        &self.full
    }

    pub fn runtime(&self) -> &RuntimeDescriptor {
        &self.runtime
    }

    pub fn source_entries(&self) -> impl Iterator<Item = &ClasspathEntry> {
        self.user.iter().filter(|entry| entry.is_source())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ClasspathResolver;

impl ClasspathResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(
        &self,
        raw_entries: &[ClasspathEntry],
        explicit_runtime_home: Option<&Path>,
    ) -> Result<ResolvedClasspath, ClasspathError> {
        let unique: IndexSet<&ClasspathEntry> = raw_entries.iter().collect();
        if unique.len() != raw_entries.len() {
            debug!(
                dropped = raw_entries.len() - unique.len(),
                "collapsed duplicate classpath entries"
            );
        }

        let mut bucketed = Vec::with_capacity(unique.len());
        for entry in unique {
            let bucket = ClasspathBucket::classify(entry)?;
            bucketed.push((bucket, entry.clone()));
        }
        // Stable: insertion order is kept within a bucket.
        bucketed.sort_by_key(|(bucket, _)| *bucket);
        let user: Vec<ClasspathEntry> = bucketed.into_iter().map(|(_, entry)| entry).collect();

        let runtime = discover_runtime(explicit_runtime_home)?;
        let boot = runtime.boot_classpath()?;

        let mut full = Vec::with_capacity(boot.len() + user.len());
        full.extend(boot.iter().cloned());
        full.extend(user.iter().cloned());

        debug!(
            user = user.len(),
            boot = boot.len(),
            runtime = %runtime.home.display(),
            "resolved classpath"
        );

        Ok(ResolvedClasspath {
            user,
            boot,
            full,
            runtime,
        })
    }
}
