//! Default [`CompilerFrontend`]: scans source folders eagerly, lists class
//! files in directories and archives, and parses class files on demand.

use crate::annotation::{RawAnnotation, RawPayload};
use crate::classfile::{binary_to_fqn, parse_class, ParsedClass};
use crate::element::{
    Flags, FieldDecl, MethodDecl, OriginKind, TypeDecl, TypeKind, TypeOrigin, TypeRef,
    ACC_ANNOTATION, ACC_ENUM, ACC_INTERFACE, ACC_SYNTHETIC,
};
use crate::error::EnvironmentError;
use crate::frontend::{binary_candidates, CompilerFrontend, NameContext, TypeLocation};
use crate::module::ModuleGraphBuilder;
use crate::source::{parse_compilation_unit, MemberKind, ParsedUnit, SourceType};
use crate::unit::{UnitKey, WorkingCopy};
use jsm_classpath::{ClasspathEntry, ResolvedClasspath};
use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use zip::ZipArchive;

const ACC_BRIDGE: u16 = 0x0040;

/// `java.lang` members assumed present when no runtime classes are readable.
const IMPLICIT_JAVA_LANG: &[&str] = &[
    "Object", "String", "Class", "Enum", "Record", "Boolean", "Byte", "Character", "Short",
    "Integer", "Long", "Float", "Double", "Number", "Void", "Iterable", "Comparable", "Runnable",
    "CharSequence", "Exception", "RuntimeException", "Error", "Throwable", "Override",
    "Deprecated", "SuppressWarnings", "FunctionalInterface", "SafeVarargs", "AutoCloseable",
];

#[derive(Debug)]
enum RootKind {
    Sources,
    Directory,
    Archive { prefix: &'static str },
    /// Runtime images and other binaries this front-end cannot read.
    Opaque,
}

#[derive(Debug)]
struct Root {
    entry: ClasspathEntry,
    kind: RootKind,
    module: Option<String>,
    /// Binary name to directory-relative path or archive member.
    classes: Vec<(String, String)>,
    module_info: Option<crate::classfile::ModuleInfo>,
}

#[derive(Debug)]
struct SourceUnit {
    key: UnitKey,
    root: Option<usize>,
    origin: OriginKind,
    text: Arc<str>,
    parsed: Arc<ParsedUnit>,
}

#[derive(Debug, Clone)]
enum Slot {
    Source { unit: usize },
    Binary { root: usize, member: String },
}

pub struct IndexingFrontend {
    roots: Vec<Root>,
    units: Vec<SourceUnit>,
    types: HashMap<String, Slot>,
    archives: RefCell<HashMap<usize, ZipArchive<BufReader<File>>>>,
}

impl IndexingFrontend {
    pub fn index(classpath: &ResolvedClasspath) -> Result<Self, EnvironmentError> {
        let mut frontend = Self {
            roots: Vec::new(),
            units: Vec::new(),
            types: HashMap::new(),
            archives: RefCell::new(HashMap::new()),
        };
        for entry in classpath.full_classpath() {
            frontend.scan_entry(entry)?;
        }
        frontend.rebuild_type_table();
        tracing::debug!(
            roots = frontend.roots.len(),
            units = frontend.units.len(),
            types = frontend.types.len(),
            "indexed classpath"
        );
        Ok(frontend)
    }

    fn scan_entry(&mut self, entry: &ClasspathEntry) -> Result<(), EnvironmentError> {
        let root_index = self.roots.len();
        let path = entry.path().to_path_buf();
        let mut root = Root {
            entry: entry.clone(),
            kind: RootKind::Opaque,
            module: entry.module().map(str::to_string),
            classes: Vec::new(),
            module_info: None,
        };

        if entry.is_source() {
            root.kind = RootKind::Sources;
            let files = if path.is_dir() {
                collect_files(&path, "java")?
            } else {
                vec![path.clone()]
            };
            for file in files {
                let text = fs::read_to_string(&file).map_err(|source| EnvironmentError::io(&file, source))?;
                let file_name = file
                    .file_name()
                    .and_then(OsStr::to_str)
                    .unwrap_or_default()
                    .to_string();
                self.add_unit(&file_name, Some(root_index), OriginKind::Source, text.into());
            }
        } else if path.is_dir() {
            root.kind = RootKind::Directory;
            for file in collect_files(&path, "class")? {
                let relative = file
                    .strip_prefix(&path)
                    .unwrap_or(&file)
                    .to_string_lossy()
                    .replace('\\', "/");
                if relative == "module-info.class" {
                    let bytes = fs::read(&file).map_err(|source| EnvironmentError::io(&file, source))?;
                    root.module_info = Some(parse_module_descriptor(&bytes, &relative)?);
                    continue;
                }
                if let Some(binary) = class_member_name(&relative, "") {
                    root.classes.push((binary, relative));
                }
            }
        } else if is_archive(&path) {
            let prefix = if has_extension(&path, "jmod") { "classes/" } else { "" };
            root.kind = RootKind::Archive { prefix };
            self.list_archive(&path, prefix, &mut root)?;
        } else {
            tracing::debug!(path = %path.display(), "classpath entry is not a readable class container");
        }

        if root.module.is_none() {
            root.module = root.module_info.as_ref().map(|info| info.name.clone());
        }
        self.roots.push(root);
        Ok(())
    }

    fn list_archive(&mut self, path: &Path, prefix: &'static str, root: &mut Root) -> Result<(), EnvironmentError> {
        let file = File::open(path).map_err(|source| EnvironmentError::io(path, source))?;
        let mut archive = ZipArchive::new(BufReader::new(file))
            .map_err(|source| EnvironmentError::archive(path, source))?;
        let module_info_name = format!("{prefix}module-info.class");
        let mut module_info_bytes = None;
        for index in 0..archive.len() {
            let mut member = archive
                .by_index(index)
                .map_err(|source| EnvironmentError::archive(path, source))?;
            if !member.is_file() {
                continue;
            }
            let name = member.name().to_string();
            if name == module_info_name {
                let mut buffer = Vec::new();
                member
                    .read_to_end(&mut buffer)
                    .map_err(|source| EnvironmentError::io(path, source))?;
                module_info_bytes = Some(buffer);
                continue;
            }
            if name.starts_with("META-INF/") {
                continue;
            }
            if let Some(binary) = class_member_name(&name, prefix) {
                root.classes.push((binary, name));
            }
        }
        if let Some(bytes) = module_info_bytes {
            root.module_info = Some(parse_module_descriptor(&bytes, &module_info_name)?);
        }
        Ok(())
    }

    fn add_unit(&mut self, file_name: &str, root: Option<usize>, origin: OriginKind, text: Arc<str>) -> usize {
        let parsed = match parse_compilation_unit(&text) {
            Ok(parsed) => parsed,
            Err(error) => {
                tracing::warn!(file = file_name, error = %error, "skipping declarations of unscannable compilation unit");
                ParsedUnit::default()
            }
        };
        let key = UnitKey::new(parsed.package.clone().unwrap_or_default(), file_name);
        self.units.push(SourceUnit {
            key,
            root,
            origin,
            text,
            parsed: Arc::new(parsed),
        });
        self.units.len() - 1
    }

    /// First declaration wins in classpath order; working copies win over everything.
    fn rebuild_type_table(&mut self) {
        let mut types = HashMap::new();
        let register_unit = |types: &mut HashMap<String, Slot>, index: usize, unit: &SourceUnit, force: bool| {
            let package = unit.parsed.package.clone().unwrap_or_default();
            unit.parsed.walk_types(&mut |relative, _| {
                let binary = qualify(&package, relative);
                if force {
                    types.insert(binary, Slot::Source { unit: index });
                } else {
                    types.entry(binary).or_insert(Slot::Source { unit: index });
                }
            });
        };

        for (index, unit) in self.units.iter().enumerate() {
            if unit.origin == OriginKind::WorkingCopy {
                register_unit(&mut types, index, unit, true);
            }
        }
        for (root_index, root) in self.roots.iter().enumerate() {
            match root.kind {
                RootKind::Sources => {
                    for (index, unit) in self.units.iter().enumerate() {
                        if unit.root == Some(root_index) && unit.origin == OriginKind::Source {
                            register_unit(&mut types, index, unit, false);
                        }
                    }
                }
                RootKind::Directory | RootKind::Archive { .. } => {
                    for (binary, member) in &root.classes {
                        types.entry(binary.clone()).or_insert_with(|| Slot::Binary {
                            root: root_index,
                            member: member.clone(),
                        });
                    }
                }
                RootKind::Opaque => {}
            }
        }
        self.types = types;
    }

    fn slot(&self, fqn: &str) -> Option<(String, &Slot)> {
        binary_candidates(fqn).find_map(|candidate| {
            self.types
                .get(&candidate)
                .map(|slot| (candidate, slot))
        })
    }

    fn read_member(&self, root_index: usize, member: &str) -> Result<Vec<u8>, EnvironmentError> {
        let root = &self.roots[root_index];
        let path = root.entry.path();
        match root.kind {
            RootKind::Directory => {
                let file = path.join(member);
                fs::read(&file).map_err(|source| EnvironmentError::io(file, source))
            }
            _ => {
                let mut archives = self.archives.borrow_mut();
                if !archives.contains_key(&root_index) {
                    let file = File::open(path).map_err(|source| EnvironmentError::io(path, source))?;
                    let archive = ZipArchive::new(BufReader::new(file))
                        .map_err(|source| EnvironmentError::archive(path, source))?;
                    archives.insert(root_index, archive);
                }
                let Some(archive) = archives.get_mut(&root_index) else {
                    return Ok(Vec::new());
                };
                let mut entry = archive
                    .by_name(member)
                    .map_err(|source| EnvironmentError::archive(path, source))?;
                let mut buffer = Vec::new();
                entry
                    .read_to_end(&mut buffer)
                    .map_err(|source| EnvironmentError::io(path, source))?;
                Ok(buffer)
            }
        }
    }

    fn binary_type(&self, root_index: usize, member: &str) -> Result<TypeDecl, EnvironmentError> {
        let bytes = self.read_member(root_index, member)?;
        let root = &self.roots[root_index];
        let parsed = parse_class(&bytes).map_err(|source| EnvironmentError::ClassFile {
            path: format!("{}!/{member}", root.entry.path().display()),
            source,
        })?;
        Ok(binary_decl(parsed, root))
    }

    fn source_type(&self, unit_index: usize, binary: &str) -> Option<TypeDecl> {
        let unit = &self.units[unit_index];
        let package = unit.parsed.package.clone().unwrap_or_default();
        let relative = if package.is_empty() {
            binary
        } else {
            binary.strip_prefix(&package)?.strip_prefix('.')?
        };

        // Collect the declaration chain from the outermost type inwards.
        let mut chain: Vec<&SourceType> = Vec::new();
        for segment in relative.split('$') {
            let next = match chain.last() {
                None => unit.parsed.types.iter().find(|ty| ty.name == segment)?,
                Some(parent) => parent.nested_type(segment)?,
            };
            chain.push(next);
        }
        let declared = *chain.last()?;

        let mut scope = Vec::with_capacity(chain.len());
        let mut prefix = String::new();
        for ty in &chain {
            if !prefix.is_empty() {
                prefix.push('$');
            }
            prefix.push_str(&ty.name);
            scope.push(qualify(&package, &prefix));
        }
        scope.reverse();
        let context = Arc::new(NameContext {
            package: unit.parsed.package.clone(),
            imports: unit.parsed.imports.clone(),
            scope,
            type_parameters: chain
                .iter()
                .flat_map(|ty| ty.type_parameters.iter().cloned())
                .collect(),
        });
        let fqn = binary_to_fqn(binary);
        let resolve = |ty: &TypeRef| -> TypeRef {
            let mut resolved = ty.clone();
            resolved.map_names(&mut |name| self.resolve_name(&context, name));
            resolved
        };

        let super_class = match (declared.kind, &declared.super_class) {
            (_, Some(written)) => Some(resolve(written)),
            (TypeKind::Class, None) if fqn != "java.lang.Object" => Some(TypeRef::new("java.lang.Object")),
            (TypeKind::Enum, None) => {
                Some(TypeRef::new("java.lang.Enum").with_arguments(vec![TypeRef::new(fqn.clone())]))
            }
            (TypeKind::Record, None) => Some(TypeRef::new("java.lang.Record")),
            _ => None,
        };
        let mut interfaces: Vec<TypeRef> = declared.interfaces.iter().map(&resolve).collect();
        if declared.kind == TypeKind::Annotation {
            interfaces.push(TypeRef::new("java.lang.annotation.Annotation"));
        }

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        for member in &declared.members {
            match member.kind {
                MemberKind::Field | MemberKind::EnumConstant => fields.push(FieldDecl {
                    name: member.name.clone(),
                    ty: member
                        .ty
                        .as_ref()
                        .map(&resolve)
                        .unwrap_or_else(|| TypeRef::new(fqn.clone())),
                    flags: member.flags,
                }),
                MemberKind::Method | MemberKind::Constructor => methods.push(MethodDecl {
                    name: member.name.clone(),
                    parameters: member.parameters.iter().map(&resolve).collect(),
                    return_type: member.ty.as_ref().map(&resolve),
                    flags: member.flags,
                }),
            }
        }

        let annotations = declared
            .annotations
            .iter()
            .map(|annotation| RawAnnotation {
                type_name: self
                    .resolve_name(&context, &annotation.name)
                    .unwrap_or_else(|| annotation.name.clone()),
                payload: RawPayload::Source {
                    arguments: annotation.arguments.clone(),
                    context: Arc::clone(&context),
                },
            })
            .collect();

        let declaring_type = (chain.len() > 1).then(|| {
            let (outer, _) = binary.rsplit_once('$').unwrap_or((binary, ""));
            binary_to_fqn(outer)
        });
        let entry = unit.root.map(|index| self.roots[index].entry.clone());
        Some(TypeDecl {
            binary_name: binary.to_string(),
            simple_name: declared.name.clone(),
            package,
            kind: declared.kind,
            flags: declared.flags,
            type_parameters: declared.type_parameters.clone(),
            super_class,
            interfaces,
            nested: declared
                .nested
                .iter()
                .map(|nested| format!("{fqn}.{}", nested.name))
                .collect(),
            declaring_type,
            fields,
            methods,
            annotations,
            module: self.unit_module(unit),
            origin: TypeOrigin {
                kind: unit.origin,
                entry,
                unit: Some(unit.key.clone()),
            },
            fqn,
        })
    }

    fn unit_module(&self, unit: &SourceUnit) -> Option<String> {
        let root = unit.root?;
        if let Some(module) = &self.roots[root].module {
            return Some(module.clone());
        }
        self.units
            .iter()
            .filter(|candidate| candidate.root == Some(root))
            .find_map(|candidate| candidate.parsed.module.as_ref().map(|module| module.name.clone()))
    }

    fn source_root_for(&self, folder: &Path) -> Option<usize> {
        self.roots
            .iter()
            .position(|root| matches!(root.kind, RootKind::Sources) && root.entry.path() == folder)
    }

    fn known(&self, fqn: &str) -> Option<String> {
        self.slot(fqn).map(|(binary, _)| binary_to_fqn(&binary))
    }

    fn resolve_simple(&self, context: &NameContext, simple: &str) -> Option<String> {
        if context.type_parameters.iter().any(|name| name == simple) {
            return None;
        }
        for scope in &context.scope {
            if scope.rsplit(['.', '$']).next() == Some(simple) {
                return Some(binary_to_fqn(scope));
            }
            let member = format!("{scope}${simple}");
            if self.types.contains_key(&member) {
                return Some(binary_to_fqn(&member));
            }
        }
        for import in context.imports.iter().filter(|import| !import.on_demand) {
            if import.name.rsplit('.').next() != Some(simple) {
                continue;
            }
            if !import.is_static {
                return Some(self.known(&import.name).unwrap_or_else(|| import.name.clone()));
            }
            if let Some(found) = self.known(&import.name) {
                return Some(found);
            }
        }
        let local = qualify(context.package.as_deref().unwrap_or(""), simple);
        if self.types.contains_key(&local) {
            return Some(local);
        }
        for import in context.imports.iter().filter(|import| import.on_demand) {
            if let Some(found) = self.known(&format!("{}.{simple}", import.name)) {
                return Some(found);
            }
        }
        let lang = format!("java.lang.{simple}");
        if self.types.contains_key(&lang) || IMPLICIT_JAVA_LANG.contains(&simple) {
            return Some(lang);
        }
        None
    }
}

impl CompilerFrontend for IndexingFrontend {
    fn locate(&self, fqn: &str) -> Option<TypeLocation> {
        let (_, slot) = self.slot(fqn)?;
        Some(match slot {
            Slot::Source { unit } => {
                let unit = &self.units[*unit];
                TypeLocation {
                    kind: unit.origin,
                    entry: unit.root.map(|index| self.roots[index].entry.clone()),
                    unit: Some(unit.key.clone()),
                }
            }
            Slot::Binary { root, .. } => TypeLocation {
                kind: OriginKind::Binary,
                entry: Some(self.roots[*root].entry.clone()),
                unit: None,
            },
        })
    }

    fn resolve_type(&self, fqn: &str) -> Result<Option<TypeDecl>, EnvironmentError> {
        let Some((binary, slot)) = self.slot(fqn) else {
            return Ok(None);
        };
        match slot {
            Slot::Source { unit } => Ok(self.source_type(*unit, &binary)),
            Slot::Binary { root, member } => self.binary_type(*root, member).map(Some),
        }
    }

    fn resolve_name(&self, context: &NameContext, name: &str) -> Option<String> {
        if name.is_empty() || name == "?" {
            return None;
        }
        match name.split_once('.') {
            None => self.resolve_simple(context, name),
            Some((head, rest)) => match self.resolve_simple(context, head) {
                Some(outer) => Some(format!("{outer}.{rest}")),
                None => self.known(name),
            },
        }
    }

    fn apply_working_copy(&mut self, copy: &WorkingCopy) -> Result<(), EnvironmentError> {
        let root = copy
            .info
            .source_folder()
            .and_then(|folder| self.source_root_for(folder));
        let key = copy.key();
        let index = self.add_unit(copy.info.file_name(), root, OriginKind::WorkingCopy, Arc::clone(&copy.text));
        let declared = self.units[index].key.clone();
        if declared != key {
            tracing::debug!(unit = %key, declared = %declared, "working copy declares a different package");
        }
        // Earlier copies of the same unit stop contributing declarations.
        let mut replaced = 0;
        for (position, unit) in self.units.iter_mut().enumerate() {
            if position != index && unit.root == root && (unit.key == key || unit.key == declared) {
                unit.parsed = Arc::new(ParsedUnit::default());
                replaced += 1;
            }
        }
        self.units[index].key = key.clone();
        self.rebuild_type_table();
        tracing::debug!(unit = %key, replaced, "applied working copy");
        Ok(())
    }

    fn unit_source(&self, unit: &UnitKey) -> Result<Option<Arc<str>>, EnvironmentError> {
        Ok(self
            .units
            .iter()
            .rev()
            .find(|candidate| &candidate.key == unit && candidate.origin == OriginKind::WorkingCopy)
            .or_else(|| self.units.iter().find(|candidate| &candidate.key == unit))
            .map(|candidate| Arc::clone(&candidate.text)))
    }

    fn describe_modules(&self, builder: &mut ModuleGraphBuilder) -> Result<(), EnvironmentError> {
        for (root_index, root) in self.roots.iter().enumerate() {
            let declared = self
                .units
                .iter()
                .filter(|unit| unit.root == Some(root_index))
                .find_map(|unit| unit.parsed.module.as_ref());
            let name = root
                .module
                .clone()
                .or_else(|| declared.map(|module| module.name.clone()));
            let Some(name) = name else {
                continue;
            };
            builder.entry(&name, root.entry.clone());
            if let Some(info) = &root.module_info {
                for require in &info.requires {
                    builder.requires(&name, &require.name, require.transitive);
                }
                for package in &info.exports {
                    builder.exports(&name, package);
                }
            }
            if let Some(module) = declared {
                for require in &module.requires {
                    builder.requires(&module.name, &require.module, require.transitive);
                }
                for package in &module.exports {
                    builder.exports(&module.name, package);
                }
            }
        }
        Ok(())
    }

    fn source_folders_with_package(&self, package: &str) -> Vec<ClasspathEntry> {
        let relative: PathBuf = package.split('.').collect();
        self.roots
            .iter()
            .enumerate()
            .filter(|(_, root)| matches!(root.kind, RootKind::Sources))
            .filter(|(index, root)| {
                root.entry.path().join(&relative).is_dir()
                    || self.units.iter().any(|unit| {
                        unit.root == Some(*index) && unit.parsed.package.as_deref() == Some(package)
                    })
            })
            .map(|(_, root)| root.entry.clone())
            .collect()
    }
}

fn binary_decl(parsed: ParsedClass, root: &Root) -> TypeDecl {
    let own_entry = parsed.own_inner_entry().cloned();
    let flags = Flags(own_entry.as_ref().map_or(parsed.access_flags, |entry| entry.flags));
    let kind = if flags.contains(ACC_ANNOTATION) {
        TypeKind::Annotation
    } else if flags.contains(ACC_INTERFACE) {
        TypeKind::Interface
    } else if flags.contains(ACC_ENUM) {
        TypeKind::Enum
    } else if parsed.super_class.as_ref().is_some_and(|ty| ty.name == "java.lang.Record") {
        TypeKind::Record
    } else {
        TypeKind::Class
    };
    let simple_name = own_entry
        .as_ref()
        .and_then(|entry| entry.simple_name.clone())
        .unwrap_or_else(|| {
            parsed
                .binary_name
                .rsplit(['.', '$'])
                .next()
                .unwrap_or(&parsed.binary_name)
                .to_string()
        });
    let nested = parsed
        .member_classes()
        .filter(|entry| entry.flags & ACC_SYNTHETIC == 0)
        .map(|entry| binary_to_fqn(&entry.inner))
        .collect();
    let declaring_type = own_entry
        .as_ref()
        .and_then(|entry| entry.outer.as_deref())
        .map(binary_to_fqn);
    let package = parsed.package().to_string();
    let methods = parsed
        .methods
        .into_iter()
        .filter(|method| !method.flags.is_synthetic() && !method.flags.contains(ACC_BRIDGE))
        .map(|mut method| {
            if method.name == "<init>" {
                method.name = simple_name.clone();
            }
            method
        })
        .collect();
    let fields = parsed
        .fields
        .into_iter()
        .filter(|field| !field.flags.is_synthetic())
        .collect();
    let annotations = parsed
        .annotations
        .into_iter()
        .map(|annotation| RawAnnotation {
            type_name: annotation.type_name,
            payload: RawPayload::Binary(annotation.pairs),
        })
        .collect();
    let super_class = if kind.is_interface() {
        None
    } else {
        parsed.super_class
    };

    TypeDecl {
        fqn: binary_to_fqn(&parsed.binary_name),
        binary_name: parsed.binary_name,
        simple_name,
        package,
        kind,
        flags,
        type_parameters: parsed.type_parameters,
        super_class,
        interfaces: parsed.interfaces,
        nested,
        declaring_type,
        fields,
        methods,
        annotations,
        module: root.module.clone(),
        origin: TypeOrigin {
            kind: OriginKind::Binary,
            entry: Some(root.entry.clone()),
            unit: None,
        },
    }
}

fn parse_module_descriptor(bytes: &[u8], member: &str) -> Result<crate::classfile::ModuleInfo, EnvironmentError> {
    let parsed = parse_class(bytes).map_err(|source| EnvironmentError::ClassFile {
        path: member.to_string(),
        source,
    })?;
    parsed.module.ok_or_else(|| EnvironmentError::InvalidUnit(format!("{member} has no Module attribute")))
}

fn qualify(package: &str, relative: &str) -> String {
    if package.is_empty() {
        relative.to_string()
    } else {
        format!("{package}.{relative}")
    }
}

/// `a/b/C$D.class` under `prefix` to the binary name `a.b.C$D`.
fn class_member_name(member: &str, prefix: &str) -> Option<String> {
    let stripped = member.strip_prefix(prefix)?.strip_suffix(".class")?;
    if stripped.ends_with("module-info") || stripped.ends_with("package-info") {
        return None;
    }
    Some(stripped.replace('/', "."))
}

fn collect_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>, EnvironmentError> {
    let mut files = Vec::new();
    let mut dirs = vec![root.to_path_buf()];
    while let Some(dir) = dirs.pop() {
        let entries = fs::read_dir(&dir).map_err(|source| EnvironmentError::io(&dir, source))?;
        let mut children = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| EnvironmentError::io(&dir, source))?;
            children.push(entry.path());
        }
        children.sort();
        for path in children.into_iter().rev() {
            if path.is_dir() {
                dirs.push(path);
            } else if has_extension(&path, extension) {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

fn is_archive(path: &Path) -> bool {
    ["jar", "zip", "jmod"]
        .iter()
        .any(|extension| has_extension(path, extension))
}
