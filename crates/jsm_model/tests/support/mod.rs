#![allow(dead_code)]

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::FileOptions;
use zip::ZipWriter;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;

#[derive(Debug, Clone)]
pub enum Element {
    Str(String),
    Int(i32),
    Bool(bool),
    /// Enum descriptor and constant name.
    Enum(String, String),
    /// Class descriptor.
    Class(String),
    Array(Vec<Element>),
}

#[derive(Default)]
struct Pool {
    bytes: Vec<u8>,
    next: u16,
    known: HashMap<(u8, String), u16>,
}

impl Pool {
    fn new() -> Self {
        Self {
            next: 1,
            ..Self::default()
        }
    }

    fn push(&mut self, tag: u8, key: String, body: &[u8]) -> u16 {
        if let Some(index) = self.known.get(&(tag, key.clone())) {
            return *index;
        }
        self.bytes.push(tag);
        self.bytes.extend_from_slice(body);
        let index = self.next;
        self.next += 1;
        self.known.insert((tag, key), index);
        index
    }

    fn utf8(&mut self, value: &str) -> u16 {
        let mut body = (value.len() as u16).to_be_bytes().to_vec();
        body.extend_from_slice(value.as_bytes());
        self.push(1, value.to_string(), &body)
    }

    fn integer(&mut self, value: i32) -> u16 {
        self.push(3, value.to_string(), &value.to_be_bytes())
    }

    fn indirect(&mut self, tag: u8, name: &str) -> u16 {
        let name_index = self.utf8(name);
        self.push(tag, name.to_string(), &name_index.to_be_bytes())
    }

    fn class(&mut self, internal: &str) -> u16 {
        self.indirect(7, internal)
    }

    fn module(&mut self, name: &str) -> u16 {
        self.indirect(19, name)
    }
}

/// Writes minimal but well-formed class files.
pub struct ClassFileBuilder {
    name: String,
    access: u16,
    super_name: Option<String>,
    interfaces: Vec<String>,
    signature: Option<String>,
    fields: Vec<(u16, String, String)>,
    methods: Vec<(u16, String, String)>,
    inner: Vec<(String, Option<String>, Option<String>, u16)>,
    annotations: Vec<(String, Vec<(String, Element)>)>,
    module: Option<(String, Vec<(String, bool)>)>,
}

impl ClassFileBuilder {
    /// `internal` uses slashes, e.g. `com/acme/Person`.
    pub fn class(internal: &str) -> Self {
        Self {
            name: internal.to_string(),
            access: ACC_PUBLIC,
            super_name: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            signature: None,
            fields: Vec::new(),
            methods: Vec::new(),
            inner: Vec::new(),
            annotations: Vec::new(),
            module: None,
        }
    }

    pub fn module_info(name: &str, requires: &[(&str, bool)]) -> Self {
        let mut builder = Self::class("module-info");
        builder.access = 0x8000;
        builder.super_name = None;
        builder.module = Some((
            name.to_string(),
            requires
                .iter()
                .map(|(target, transitive)| (target.to_string(), *transitive))
                .collect(),
        ));
        builder
    }

    pub fn access(mut self, access: u16) -> Self {
        self.access = access;
        self
    }

    pub fn super_class(mut self, internal: Option<&str>) -> Self {
        self.super_name = internal.map(str::to_string);
        self
    }

    pub fn interface(mut self, internal: &str) -> Self {
        self.interfaces.push(internal.to_string());
        self
    }

    pub fn signature(mut self, signature: &str) -> Self {
        self.signature = Some(signature.to_string());
        self
    }

    pub fn field(mut self, access: u16, name: &str, descriptor: &str) -> Self {
        self.fields.push((access, name.to_string(), descriptor.to_string()));
        self
    }

    pub fn method(mut self, access: u16, name: &str, descriptor: &str) -> Self {
        self.methods.push((access, name.to_string(), descriptor.to_string()));
        self
    }

    pub fn inner_class(mut self, inner: &str, outer: Option<&str>, simple: Option<&str>, access: u16) -> Self {
        self.inner.push((
            inner.to_string(),
            outer.map(str::to_string),
            simple.map(str::to_string),
            access,
        ));
        self
    }

    pub fn annotation(mut self, descriptor: &str, elements: Vec<(&str, Element)>) -> Self {
        self.annotations.push((
            descriptor.to_string(),
            elements
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        ));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut pool = Pool::new();
        let this_index = pool.class(&self.name);
        let super_index = self.super_name.as_deref().map_or(0, |name| pool.class(name));
        let interfaces: Vec<u16> = self.interfaces.iter().map(|name| pool.class(name)).collect();
        let members = |pool: &mut Pool, list: &[(u16, String, String)]| -> Vec<u8> {
            let mut out = (list.len() as u16).to_be_bytes().to_vec();
            for (access, name, descriptor) in list {
                out.extend_from_slice(&access.to_be_bytes());
                out.extend_from_slice(&pool.utf8(name).to_be_bytes());
                out.extend_from_slice(&pool.utf8(descriptor).to_be_bytes());
                out.extend_from_slice(&0u16.to_be_bytes());
            }
            out
        };
        let fields = members(&mut pool, &self.fields);
        let methods = members(&mut pool, &self.methods);

        let mut attributes: Vec<(u16, Vec<u8>)> = Vec::new();
        if let Some(signature) = &self.signature {
            let name = pool.utf8("Signature");
            attributes.push((name, pool.utf8(signature).to_be_bytes().to_vec()));
        }
        if !self.inner.is_empty() {
            let name = pool.utf8("InnerClasses");
            let mut body = (self.inner.len() as u16).to_be_bytes().to_vec();
            for (inner, outer, simple, access) in &self.inner {
                body.extend_from_slice(&pool.class(inner).to_be_bytes());
                let outer = outer.as_deref().map_or(0, |outer| pool.class(outer));
                body.extend_from_slice(&outer.to_be_bytes());
                let simple = simple.as_deref().map_or(0, |simple| pool.utf8(simple));
                body.extend_from_slice(&simple.to_be_bytes());
                body.extend_from_slice(&access.to_be_bytes());
            }
            attributes.push((name, body));
        }
        if !self.annotations.is_empty() {
            let name = pool.utf8("RuntimeVisibleAnnotations");
            let mut body = (self.annotations.len() as u16).to_be_bytes().to_vec();
            for (descriptor, elements) in &self.annotations {
                body.extend_from_slice(&pool.utf8(descriptor).to_be_bytes());
                body.extend_from_slice(&(elements.len() as u16).to_be_bytes());
                for (element, value) in elements {
                    body.extend_from_slice(&pool.utf8(element).to_be_bytes());
                    write_element(&mut pool, value, &mut body);
                }
            }
            attributes.push((name, body));
        }
        if let Some((module, requires)) = &self.module {
            let name = pool.utf8("Module");
            let mut body = Vec::new();
            body.extend_from_slice(&pool.module(module).to_be_bytes());
            body.extend_from_slice(&0u16.to_be_bytes());
            body.extend_from_slice(&0u16.to_be_bytes());
            body.extend_from_slice(&(requires.len() as u16).to_be_bytes());
            for (target, transitive) in requires {
                body.extend_from_slice(&pool.module(target).to_be_bytes());
                let flags: u16 = if *transitive { 0x0020 } else { 0 };
                body.extend_from_slice(&flags.to_be_bytes());
                body.extend_from_slice(&0u16.to_be_bytes());
            }
            // exports, opens, uses, provides
            for _ in 0..4 {
                body.extend_from_slice(&0u16.to_be_bytes());
            }
            attributes.push((name, body));
        }

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&61u16.to_be_bytes());
        out.extend_from_slice(&pool.next.to_be_bytes());
        out.extend_from_slice(&pool.bytes);
        out.extend_from_slice(&self.access.to_be_bytes());
        out.extend_from_slice(&this_index.to_be_bytes());
        out.extend_from_slice(&super_index.to_be_bytes());
        out.extend_from_slice(&(interfaces.len() as u16).to_be_bytes());
        for index in interfaces {
            out.extend_from_slice(&index.to_be_bytes());
        }
        out.extend_from_slice(&fields);
        out.extend_from_slice(&methods);
        out.extend_from_slice(&(attributes.len() as u16).to_be_bytes());
        for (name, body) in attributes {
            out.extend_from_slice(&name.to_be_bytes());
            out.extend_from_slice(&(body.len() as u32).to_be_bytes());
            out.extend_from_slice(&body);
        }
        out
    }
}

fn write_element(pool: &mut Pool, value: &Element, out: &mut Vec<u8>) {
    match value {
        Element::Str(text) => {
            out.push(b's');
            out.extend_from_slice(&pool.utf8(text).to_be_bytes());
        }
        Element::Int(number) => {
            out.push(b'I');
            out.extend_from_slice(&pool.integer(*number).to_be_bytes());
        }
        Element::Bool(flag) => {
            out.push(b'Z');
            out.extend_from_slice(&pool.integer(i32::from(*flag)).to_be_bytes());
        }
        Element::Enum(descriptor, constant) => {
            out.push(b'e');
            out.extend_from_slice(&pool.utf8(descriptor).to_be_bytes());
            out.extend_from_slice(&pool.utf8(constant).to_be_bytes());
        }
        Element::Class(descriptor) => {
            out.push(b'c');
            out.extend_from_slice(&pool.utf8(descriptor).to_be_bytes());
        }
        Element::Array(values) => {
            out.push(b'[');
            out.extend_from_slice(&(values.len() as u16).to_be_bytes());
            for value in values {
                write_element(pool, value, out);
            }
        }
    }
}

/// Write a zip archive from `(member name, bytes)` pairs.
pub fn write_archive(path: &Path, members: &[(&str, Vec<u8>)]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create archive parent");
    }
    let file = File::create(path).expect("create archive");
    let mut writer = ZipWriter::new(file);
    for (name, bytes) in members {
        writer
            .start_file(*name, FileOptions::default())
            .expect("start archive member");
        writer.write_all(bytes).expect("write archive member");
    }
    writer.finish().expect("finish archive");
}

pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent directory");
    }
    std::fs::write(path, contents).expect("write fixture file");
}

/// A runtime installation with a `java.base` jmod holding `java.lang.Object`.
pub fn fake_jdk(root: &Path) -> std::path::PathBuf {
    let home = root.join("jdk");
    write_file(&home.join("release"), "JAVA_VERSION=\"17.0.2\"\n");
    write_archive(
        &home.join("jmods").join("java.base.jmod"),
        &[
            (
                "classes/module-info.class",
                ClassFileBuilder::module_info("java.base", &[]).build(),
            ),
            (
                "classes/java/lang/Object.class",
                ClassFileBuilder::class("java/lang/Object").super_class(None).build(),
            ),
            (
                "classes/java/lang/String.class",
                ClassFileBuilder::class("java/lang/String")
                    .access(ACC_PUBLIC | 0x0010)
                    .interface("java/lang/CharSequence")
                    .build(),
            ),
            (
                "classes/java/lang/CharSequence.class",
                ClassFileBuilder::class("java/lang/CharSequence")
                    .access(ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT)
                    .build(),
            ),
        ],
    );
    home
}
