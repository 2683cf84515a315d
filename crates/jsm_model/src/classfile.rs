//! Reader for the parts of the class-file format the semantic model needs:
//! the type header, member signatures, nesting information, type-level
//! annotations and the module descriptor.

use crate::element::{FieldDecl, Flags, MethodDecl, TypeRef};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassParseError {
    #[error("unexpected end of class file")]
    UnexpectedEof,
    #[error("invalid class file magic header")]
    InvalidMagic,
    #[error("unsupported constant pool tag {tag}")]
    UnsupportedConstant { tag: u8 },
    #[error("invalid constant pool index {index}")]
    InvalidConstantIndex { index: u16 },
    #[error("invalid UTF-8 string in constant pool: {0}")]
    Utf8Decode(#[from] std::string::FromUtf8Error),
    #[error("malformed signature `{0}`")]
    InvalidSignature(String),
    #[error("unknown annotation element tag '{0}'")]
    InvalidElementTag(char),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Utf8(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    /// Primitive or string constant; `tag` is the element tag (`Z`, `I`, `s`, ...).
    Const { tag: u8, value: ConstValue },
    Enum { type_name: TypeRef, constant: String },
    Class(TypeRef),
    Annotation(Box<BinaryAnnotation>),
    Array(Vec<ElementValue>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryAnnotation {
    pub type_name: String,
    pub pairs: Vec<(String, ElementValue)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClassEntry {
    /// Binary name of the nested class.
    pub inner: String,
    pub outer: Option<String>,
    /// `None` for anonymous classes.
    pub simple_name: Option<String>,
    pub flags: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRequire {
    pub name: String,
    pub transitive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    pub name: String,
    pub requires: Vec<ModuleRequire>,
    pub exports: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ParsedClass {
    /// Dotted binary name, nested classes separated by `$`.
    pub binary_name: String,
    pub access_flags: u16,
    pub type_parameters: Vec<String>,
    pub super_class: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub fields: Vec<FieldDecl>,
    /// Constructors keep the `<init>` name.
    pub methods: Vec<MethodDecl>,
    pub inner_classes: Vec<InnerClassEntry>,
    pub annotations: Vec<BinaryAnnotation>,
    pub module: Option<ModuleInfo>,
}

impl ParsedClass {
    pub fn package(&self) -> &str {
        self.binary_name
            .rsplit_once('.')
            .map(|(package, _)| package)
            .unwrap_or("")
    }

    /// The nesting record describing this class itself, when it is nested.
    pub fn own_inner_entry(&self) -> Option<&InnerClassEntry> {
        self.inner_classes
            .iter()
            .find(|entry| entry.inner == self.binary_name)
    }

    /// Named member classes declared directly in this class.
    pub fn member_classes(&self) -> impl Iterator<Item = &InnerClassEntry> {
        self.inner_classes.iter().filter(move |entry| {
            entry.simple_name.is_some() && entry.outer.as_deref() == Some(self.binary_name.as_str())
        })
    }
}

const ACC_TRANSITIVE: u16 = 0x0020;
const ACC_SYNTHETIC: u16 = 0x1000;

pub fn parse_class(bytes: &[u8]) -> Result<ParsedClass, ClassParseError> {
    let mut reader = ClassReader::new(bytes);
    reader.expect_magic()?;
    let _minor_version = reader.read_u2()?;
    let _major_version = reader.read_u2()?;
    let pool = ConstantPool::parse(&mut reader)?;

    let access_flags = reader.read_u2()?;
    let this_class = reader.read_u2()?;
    let super_index = reader.read_u2()?;
    let binary_name = internal_to_binary(&pool.class_name(this_class)?);
    let mut super_class = if super_index == 0 {
        None
    } else {
        Some(TypeRef::new(internal_to_fqn(&pool.class_name(super_index)?)))
    };

    let interfaces_count = reader.read_u2()?;
    let mut interfaces = Vec::with_capacity(interfaces_count as usize);
    for _ in 0..interfaces_count {
        let index = reader.read_u2()?;
        interfaces.push(TypeRef::new(internal_to_fqn(&pool.class_name(index)?)));
    }

    let fields_count = reader.read_u2()?;
    let mut fields = Vec::with_capacity(fields_count as usize);
    for _ in 0..fields_count {
        let member = read_member(&mut reader, &pool)?;
        let mut parser = SignatureParser::new(member.signature.as_deref().unwrap_or(member.descriptor));
        let ty = parser.parse_field()?;
        fields.push(FieldDecl {
            name: member.name.to_string(),
            ty,
            flags: Flags(member.flags),
        });
    }

    let methods_count = reader.read_u2()?;
    let mut methods = Vec::with_capacity(methods_count as usize);
    for _ in 0..methods_count {
        let member = read_member(&mut reader, &pool)?;
        if member.name == "<clinit>" {
            continue;
        }
        let (parameters, return_type) = match member.signature.as_deref() {
            Some(signature) => SignatureParser::new(signature).parse_method()?,
            None => SignatureParser::new(member.descriptor).parse_method()?,
        };
        let return_type = if member.name == "<init>" {
            None
        } else {
            Some(return_type)
        };
        methods.push(MethodDecl {
            name: member.name.to_string(),
            parameters,
            return_type,
            flags: Flags(member.flags),
        });
    }

    let mut parsed = ParsedClass {
        binary_name,
        access_flags,
        type_parameters: Vec::new(),
        super_class: None,
        interfaces,
        fields,
        methods,
        inner_classes: Vec::new(),
        annotations: Vec::new(),
        module: None,
    };

    let attributes_count = reader.read_u2()?;
    for _ in 0..attributes_count {
        let name_index = reader.read_u2()?;
        let length = reader.read_u4()? as usize;
        let body = reader.read_slice(length)?;
        let mut sub = ClassReader::new(body);
        match pool.utf8(name_index)? {
            "Signature" => {
                let signature = pool.utf8(sub.read_u2()?)?;
                let class_signature = SignatureParser::new(signature).parse_class()?;
                parsed.type_parameters = class_signature.type_parameters;
                super_class = class_signature.super_class.or(super_class);
                if !class_signature.interfaces.is_empty() {
                    parsed.interfaces = class_signature.interfaces;
                }
            }
            "InnerClasses" => {
                let count = sub.read_u2()?;
                for _ in 0..count {
                    let inner_index = sub.read_u2()?;
                    let outer_index = sub.read_u2()?;
                    let name_index = sub.read_u2()?;
                    let flags = sub.read_u2()?;
                    let outer = if outer_index == 0 {
                        None
                    } else {
                        Some(internal_to_binary(&pool.class_name(outer_index)?))
                    };
                    let simple_name = if name_index == 0 {
                        None
                    } else {
                        Some(pool.utf8(name_index)?.to_string())
                    };
                    parsed.inner_classes.push(InnerClassEntry {
                        inner: internal_to_binary(&pool.class_name(inner_index)?),
                        outer,
                        simple_name,
                        flags,
                    });
                }
            }
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                let count = sub.read_u2()?;
                for _ in 0..count {
                    parsed.annotations.push(read_annotation(&mut sub, &pool)?);
                }
            }
            "Module" => parsed.module = Some(read_module(&mut sub, &pool)?),
            _ => {}
        }
    }

    if parsed.binary_name != "java.lang.Object" {
        parsed.super_class = super_class;
    }
    Ok(parsed)
}

struct RawMember<'p> {
    flags: u16,
    name: &'p str,
    descriptor: &'p str,
    signature: Option<String>,
}

fn read_member<'p>(
    reader: &mut ClassReader<'_>,
    pool: &'p ConstantPool,
) -> Result<RawMember<'p>, ClassParseError> {
    let flags = reader.read_u2()?;
    let name = pool.utf8(reader.read_u2()?)?;
    let descriptor = pool.utf8(reader.read_u2()?)?;
    let mut signature = None;
    let attributes_count = reader.read_u2()?;
    for _ in 0..attributes_count {
        let name_index = reader.read_u2()?;
        let length = reader.read_u4()? as usize;
        if pool.utf8(name_index)? == "Signature" && length == 2 {
            signature = Some(pool.utf8(reader.read_u2()?)?.to_string());
        } else {
            reader.skip(length)?;
        }
    }
    Ok(RawMember {
        flags,
        name,
        descriptor,
        signature,
    })
}

fn read_annotation(
    reader: &mut ClassReader<'_>,
    pool: &ConstantPool,
) -> Result<BinaryAnnotation, ClassParseError> {
    let type_descriptor = pool.utf8(reader.read_u2()?)?;
    let type_name = SignatureParser::new(type_descriptor).parse_field()?.name;
    let pairs_count = reader.read_u2()?;
    let mut pairs = Vec::with_capacity(pairs_count as usize);
    for _ in 0..pairs_count {
        let name = pool.utf8(reader.read_u2()?)?.to_string();
        pairs.push((name, read_element_value(reader, pool)?));
    }
    Ok(BinaryAnnotation { type_name, pairs })
}

fn read_element_value(
    reader: &mut ClassReader<'_>,
    pool: &ConstantPool,
) -> Result<ElementValue, ClassParseError> {
    let tag = reader.read_u1()?;
    match tag {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' => {
            let value = pool.value(reader.read_u2()?)?;
            Ok(ElementValue::Const { tag, value })
        }
        b'e' => {
            let descriptor = pool.utf8(reader.read_u2()?)?;
            let constant = pool.utf8(reader.read_u2()?)?.to_string();
            Ok(ElementValue::Enum {
                type_name: SignatureParser::new(descriptor).parse_field()?,
                constant,
            })
        }
        b'c' => {
            let descriptor = pool.utf8(reader.read_u2()?)?;
            Ok(ElementValue::Class(SignatureParser::new(descriptor).parse_return()?))
        }
        b'@' => Ok(ElementValue::Annotation(Box::new(read_annotation(reader, pool)?))),
        b'[' => {
            let count = reader.read_u2()?;
            let mut values = Vec::with_capacity(count as usize);
            for _ in 0..count {
                values.push(read_element_value(reader, pool)?);
            }
            Ok(ElementValue::Array(values))
        }
        other => Err(ClassParseError::InvalidElementTag(other as char)),
    }
}

fn read_module(
    reader: &mut ClassReader<'_>,
    pool: &ConstantPool,
) -> Result<ModuleInfo, ClassParseError> {
    let name = pool.module_name(reader.read_u2()?)?;
    let _module_flags = reader.read_u2()?;
    let _module_version = reader.read_u2()?;

    let requires_count = reader.read_u2()?;
    let mut requires = Vec::with_capacity(requires_count as usize);
    for _ in 0..requires_count {
        let target = pool.module_name(reader.read_u2()?)?;
        let flags = reader.read_u2()?;
        let _version = reader.read_u2()?;
        if flags & ACC_SYNTHETIC != 0 {
            continue;
        }
        requires.push(ModuleRequire {
            name: target,
            transitive: flags & ACC_TRANSITIVE != 0,
        });
    }

    let exports_count = reader.read_u2()?;
    let mut exports = Vec::with_capacity(exports_count as usize);
    for _ in 0..exports_count {
        let package = pool.package_name(reader.read_u2()?)?;
        let _flags = reader.read_u2()?;
        let targets = reader.read_u2()?;
        reader.skip(targets as usize * 2)?;
        exports.push(package.replace('/', "."));
    }

    Ok(ModuleInfo {
        name,
        requires,
        exports,
    })
}

/// `a/b/Outer$Inner` to `a.b.Outer$Inner`.
pub fn internal_to_binary(internal: &str) -> String {
    internal.replace('/', ".")
}

/// `a/b/Outer$Inner` to `a.b.Outer.Inner`. `$` followed by a digit marks a
/// local or anonymous class and is kept.
pub fn internal_to_fqn(internal: &str) -> String {
    binary_to_fqn(&internal_to_binary(internal))
}

pub fn binary_to_fqn(binary: &str) -> String {
    let mut out = String::with_capacity(binary.len());
    let mut chars = binary.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek().is_some_and(|next| next.is_alphabetic() || *next == '_') && !out.is_empty() && !out.ends_with('.') {
            out.push('.');
        } else {
            out.push(ch);
        }
    }
    out
}

#[derive(Debug, Clone)]
enum Constant {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class { name_index: u16 },
    String { string_index: u16 },
    Module { name_index: u16 },
    Package { name_index: u16 },
    Other,
    Unusable,
}

struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    fn parse(reader: &mut ClassReader<'_>) -> Result<Self, ClassParseError> {
        let count = reader.read_u2()? as usize;
        let mut entries = Vec::with_capacity(count);
        entries.push(Constant::Unusable);

        while entries.len() < count {
            let tag = reader.read_u1()?;
            let (entry, wide) = match tag {
                1 => {
                    let length = reader.read_u2()? as usize;
                    let bytes = reader.read_slice(length)?;
                    (Constant::Utf8(decode_modified_utf8(bytes)?), false)
                }
                3 => (Constant::Integer(reader.read_u4()? as i32), false),
                4 => (Constant::Float(f32::from_bits(reader.read_u4()?)), false),
                5 => (Constant::Long(reader.read_u8()? as i64), true),
                6 => (Constant::Double(f64::from_bits(reader.read_u8()?)), true),
                7 => (
                    Constant::Class {
                        name_index: reader.read_u2()?,
                    },
                    false,
                ),
                8 => (
                    Constant::String {
                        string_index: reader.read_u2()?,
                    },
                    false,
                ),
                9 | 10 | 11 | 12 | 17 | 18 => {
                    reader.skip(4)?;
                    (Constant::Other, false)
                }
                15 => {
                    reader.skip(3)?;
                    (Constant::Other, false)
                }
                16 => {
                    reader.skip(2)?;
                    (Constant::Other, false)
                }
                19 => (
                    Constant::Module {
                        name_index: reader.read_u2()?,
                    },
                    false,
                ),
                20 => (
                    Constant::Package {
                        name_index: reader.read_u2()?,
                    },
                    false,
                ),
                other => return Err(ClassParseError::UnsupportedConstant { tag: other }),
            };
            entries.push(entry);
            if wide {
                entries.push(Constant::Unusable);
            }
        }

        Ok(Self { entries })
    }

    fn get(&self, index: u16) -> Result<&Constant, ClassParseError> {
        self.entries
            .get(index as usize)
            .ok_or(ClassParseError::InvalidConstantIndex { index })
    }

    fn utf8(&self, index: u16) -> Result<&str, ClassParseError> {
        match self.get(index)? {
            Constant::Utf8(value) => Ok(value.as_str()),
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }

    fn indirect(&self, index: u16) -> Result<String, ClassParseError> {
        match self.get(index)? {
            Constant::Class { name_index }
            | Constant::Module { name_index }
            | Constant::Package { name_index } => Ok(self.utf8(*name_index)?.to_string()),
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }

    fn class_name(&self, index: u16) -> Result<String, ClassParseError> {
        self.indirect(index)
    }

    fn package_name(&self, index: u16) -> Result<String, ClassParseError> {
        self.indirect(index)
    }

    fn module_name(&self, index: u16) -> Result<String, ClassParseError> {
        self.indirect(index)
    }

    fn value(&self, index: u16) -> Result<ConstValue, ClassParseError> {
        Ok(match self.get(index)? {
            Constant::Integer(v) => ConstValue::Int(*v),
            Constant::Long(v) => ConstValue::Long(*v),
            Constant::Float(v) => ConstValue::Float(*v),
            Constant::Double(v) => ConstValue::Double(*v),
            Constant::Utf8(v) => ConstValue::Utf8(v.clone()),
            Constant::String { string_index } => ConstValue::Utf8(self.utf8(*string_index)?.to_string()),
            _ => return Err(ClassParseError::InvalidConstantIndex { index }),
        })
    }
}

/// Class files store strings as modified UTF-8; the only difference that
/// matters for names and literals is the two-byte encoding of NUL.
fn decode_modified_utf8(bytes: &[u8]) -> Result<String, ClassParseError> {
    if !bytes.windows(2).any(|pair| pair == [0xC0, 0x80]) {
        return Ok(String::from_utf8(bytes.to_vec())?);
    }
    let mut cleaned = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == 0xC0 && bytes.get(index + 1) == Some(&0x80) {
            cleaned.push(0);
            index += 2;
        } else {
            cleaned.push(bytes[index]);
            index += 1;
        }
    }
    Ok(String::from_utf8(cleaned)?)
}

struct ClassReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ClassReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn expect_magic(&mut self) -> Result<(), ClassParseError> {
        if self.read_u4()? != 0xCAFE_BABE {
            return Err(ClassParseError::InvalidMagic);
        }
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ClassParseError> {
        let slice = self.read_slice(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn read_u1(&mut self) -> Result<u8, ClassParseError> {
        Ok(self.read_array::<1>()?[0])
    }

    fn read_u2(&mut self) -> Result<u16, ClassParseError> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    fn read_u4(&mut self) -> Result<u32, ClassParseError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    fn read_u8(&mut self) -> Result<u64, ClassParseError> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    fn read_slice(&mut self, len: usize) -> Result<&'a [u8], ClassParseError> {
        let end = self.pos.checked_add(len).ok_or(ClassParseError::UnexpectedEof)?;
        let slice = self
            .data
            .get(self.pos..end)
            .ok_or(ClassParseError::UnexpectedEof)?;
        self.pos = end;
        Ok(slice)
    }

    fn skip(&mut self, len: usize) -> Result<(), ClassParseError> {
        self.read_slice(len).map(|_| ())
    }
}

struct ClassSignature {
    type_parameters: Vec<String>,
    super_class: Option<TypeRef>,
    interfaces: Vec<TypeRef>,
}

/// Parses both erased descriptors and generic signatures; descriptors are
/// the subset of signatures without type arguments.
struct SignatureParser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SignatureParser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn error(&self) -> ClassParseError {
        ClassParseError::InvalidSignature(self.text.to_string())
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Result<u8, ClassParseError> {
        let byte = self.peek().ok_or_else(|| self.error())?;
        self.pos += 1;
        Ok(byte)
    }

    fn expect(&mut self, byte: u8) -> Result<(), ClassParseError> {
        if self.bump()? != byte {
            return Err(self.error());
        }
        Ok(())
    }

    fn finish<T>(&self, value: T) -> Result<T, ClassParseError> {
        if self.pos != self.bytes.len() {
            return Err(self.error());
        }
        Ok(value)
    }

    fn parse_field(&mut self) -> Result<TypeRef, ClassParseError> {
        let ty = self.parse_type()?;
        self.finish(ty)
    }

    fn parse_return(&mut self) -> Result<TypeRef, ClassParseError> {
        let ty = self.parse_return_type()?;
        self.finish(ty)
    }

    fn parse_class(&mut self) -> Result<ClassSignature, ClassParseError> {
        let type_parameters = self.parse_type_parameters()?;
        let super_class = Some(self.parse_type()?);
        let mut interfaces = Vec::new();
        while self.peek().is_some() {
            interfaces.push(self.parse_type()?);
        }
        Ok(ClassSignature {
            type_parameters,
            super_class,
            interfaces,
        })
    }

    fn parse_method(&mut self) -> Result<(Vec<TypeRef>, TypeRef), ClassParseError> {
        self.parse_type_parameters()?;
        self.expect(b'(')?;
        let mut parameters = Vec::new();
        while self.peek() != Some(b')') {
            parameters.push(self.parse_type()?);
        }
        self.expect(b')')?;
        let return_type = self.parse_return_type()?;
        while self.peek() == Some(b'^') {
            self.pos += 1;
            self.parse_type()?;
        }
        self.finish((parameters, return_type))
    }

    fn parse_return_type(&mut self) -> Result<TypeRef, ClassParseError> {
        if self.peek() == Some(b'V') {
            self.pos += 1;
            return Ok(TypeRef::new("void"));
        }
        self.parse_type()
    }

    fn parse_type_parameters(&mut self) -> Result<Vec<String>, ClassParseError> {
        let mut names = Vec::new();
        if self.peek() != Some(b'<') {
            return Ok(names);
        }
        self.pos += 1;
        while self.peek() != Some(b'>') {
            names.push(self.take_until(b':')?.to_string());
            // Class bound may be empty; interface bounds each start with ':'.
            self.expect(b':')?;
            if !matches!(self.peek(), Some(b':') | Some(b'>')) {
                self.parse_type()?;
            }
            while self.peek() == Some(b':') {
                self.pos += 1;
                self.parse_type()?;
            }
        }
        self.expect(b'>')?;
        Ok(names)
    }

    fn take_until(&mut self, stop: u8) -> Result<&'a str, ClassParseError> {
        let start = self.pos;
        while self.peek().ok_or_else(|| self.error())? != stop {
            self.pos += 1;
        }
        Ok(&self.text[start..self.pos])
    }

    fn parse_type(&mut self) -> Result<TypeRef, ClassParseError> {
        let primitive = match self.bump()? {
            b'B' => "byte",
            b'C' => "char",
            b'D' => "double",
            b'F' => "float",
            b'I' => "int",
            b'J' => "long",
            b'S' => "short",
            b'Z' => "boolean",
            b'[' => {
                let element = self.parse_type()?;
                let dimensions = element.dimensions.saturating_add(1);
                return Ok(element.with_dimensions(dimensions));
            }
            b'T' => {
                let name = self.take_until(b';')?;
                self.pos += 1;
                return Ok(TypeRef::new(name));
            }
            b'L' => return self.parse_class_type(),
            _ => return Err(self.error()),
        };
        Ok(TypeRef::new(primitive))
    }

    fn parse_class_type(&mut self) -> Result<TypeRef, ClassParseError> {
        let mut internal = String::new();
        let mut arguments = Vec::new();
        loop {
            match self.bump()? {
                b';' => break,
                b'<' => arguments = self.parse_type_arguments()?,
                b'.' => {
                    // Inner class of a parameterized outer type.
                    internal.push('$');
                    arguments.clear();
                }
                _ => {
                    let start = self.pos - 1;
                    while !matches!(self.peek(), Some(b';' | b'<' | b'.') | None) {
                        self.pos += 1;
                    }
                    internal.push_str(&self.text[start..self.pos]);
                }
            }
        }
        Ok(TypeRef::new(internal_to_fqn(&internal)).with_arguments(arguments))
    }

    fn parse_type_arguments(&mut self) -> Result<Vec<TypeRef>, ClassParseError> {
        let mut arguments = Vec::new();
        while self.peek() != Some(b'>') {
            match self.peek() {
                Some(b'*') => {
                    self.pos += 1;
                    arguments.push(TypeRef::new("?"));
                }
                // Wildcard bounds are reduced to the bound itself.
                Some(b'+' | b'-') => {
                    self.pos += 1;
                    arguments.push(self.parse_type()?);
                }
                _ => arguments.push(self.parse_type()?),
            }
        }
        self.expect(b'>')?;
        Ok(arguments)
    }
}
