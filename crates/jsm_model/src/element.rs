use crate::annotation::RawAnnotation;
use crate::unit::UnitKey;
use jsm_classpath::ClasspathEntry;
use std::fmt;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_SYNTHETIC: u16 = 0x1000;
pub const ACC_ANNOTATION: u16 = 0x2000;
pub const ACC_ENUM: u16 = 0x4000;

/// Access and property flags using the class-file bit layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Flags(pub u16);

impl Flags {
    pub const fn contains(self, bits: u16) -> bool {
        self.0 & bits == bits
    }

    pub fn insert(&mut self, bits: u16) {
        self.0 |= bits;
    }

    pub const fn is_public(self) -> bool {
        self.contains(ACC_PUBLIC)
    }

    pub const fn is_static(self) -> bool {
        self.contains(ACC_STATIC)
    }

    pub const fn is_abstract(self) -> bool {
        self.contains(ACC_ABSTRACT)
    }

    pub const fn is_final(self) -> bool {
        self.contains(ACC_FINAL)
    }

    pub const fn is_synthetic(self) -> bool {
        self.contains(ACC_SYNTHETIC)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Record,
}

impl TypeKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Annotation => "@interface",
            TypeKind::Record => "record",
        }
    }

    pub const fn is_interface(self) -> bool {
        matches!(self, TypeKind::Interface | TypeKind::Annotation)
    }
}

/// A reference to a type as it appears in a signature.
///
/// `name` is fully qualified when it could be resolved and kept as written
/// otherwise (type variables, unknown names, primitives).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub name: String,
    pub arguments: Vec<TypeRef>,
    pub dimensions: u8,
}

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
            dimensions: 0,
        }
    }

    pub fn with_arguments(mut self, arguments: Vec<TypeRef>) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn with_dimensions(mut self, dimensions: u8) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn simple_name(&self) -> &str {
        simple_name_of(&self.name)
    }

    pub fn is_primitive(&self) -> bool {
        self.dimensions == 0
            && matches!(
                self.name.as_str(),
                "boolean" | "byte" | "char" | "short" | "int" | "long" | "float" | "double" | "void"
            )
    }

    /// Rewrite every name through `resolve`, leaving unresolved names untouched.
    pub fn map_names(&mut self, resolve: &mut dyn FnMut(&str) -> Option<String>) {
        if let Some(resolved) = resolve(&self.name) {
            self.name = resolved;
        }
        for argument in &mut self.arguments {
            argument.map_names(resolve);
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.arguments.is_empty() {
            f.write_str("<")?;
            for (index, argument) in self.arguments.iter().enumerate() {
                if index > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{argument}")?;
            }
            f.write_str(">")?;
        }
        for _ in 0..self.dimensions {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,
    pub flags: Flags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub name: String,
    pub parameters: Vec<TypeRef>,
    /// `None` for constructors.
    pub return_type: Option<TypeRef>,
    pub flags: Flags,
}

impl MethodDecl {
    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginKind {
    Source,
    WorkingCopy,
    Binary,
}

/// Where a type was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeOrigin {
    pub kind: OriginKind,
    /// `None` for working copies outside every source folder.
    pub entry: Option<ClasspathEntry>,
    /// Compilation unit for source and working-copy types.
    pub unit: Option<UnitKey>,
}

/// A resolved type of the semantic model.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    /// Dotted name, nested types separated by `.`.
    pub fqn: String,
    /// Name with nested types separated by `$`.
    pub binary_name: String,
    pub simple_name: String,
    /// Empty for the default package.
    pub package: String,
    pub kind: TypeKind,
    pub flags: Flags,
    pub type_parameters: Vec<String>,
    pub super_class: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    /// Fully qualified names of member types in declaration order.
    pub nested: Vec<String>,
    pub declaring_type: Option<String>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    pub annotations: Vec<RawAnnotation>,
    pub module: Option<String>,
    pub origin: TypeOrigin,
}

impl TypeDecl {
    pub fn is_interface(&self) -> bool {
        self.kind.is_interface()
    }

    pub fn is_nested(&self) -> bool {
        self.declaring_type.is_some()
    }

    pub fn has_annotation(&self, fqn: &str) -> bool {
        self.annotations.iter().any(|raw| raw.type_name == fqn)
    }

    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods.iter().find(|method| method.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|field| field.name == name)
    }
}

impl PartialEq for TypeDecl {
    fn eq(&self, other: &Self) -> bool {
        self.binary_name == other.binary_name && self.origin == other.origin
    }
}

impl Eq for TypeDecl {}

pub fn simple_name_of(name: &str) -> &str {
    name.rsplit(['.', '$']).next().unwrap_or(name)
}

/// Package part of a top-level type name.
pub fn package_of(fqn: &str) -> &str {
    fqn.rsplit_once('.').map(|(package, _)| package).unwrap_or("")
}
