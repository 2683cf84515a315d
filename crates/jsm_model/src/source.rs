//! Declaration-level scanner for Java compilation units.
//!
//! Only declarations are recognised: package, imports, types, members and
//! annotations, each with the byte span it occupies. Method bodies and
//! field initializers are skipped by bracket matching.

use crate::element::{
    Flags, TypeKind, TypeRef, ACC_ABSTRACT, ACC_ANNOTATION, ACC_ENUM, ACC_FINAL, ACC_INTERFACE,
    ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC, ACC_STATIC,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("unterminated {what} starting at offset {offset}")]
    Unterminated { what: &'static str, offset: usize },
    #[error("unexpected `{found}` at offset {offset}, expected {expected}")]
    Unexpected {
        found: String,
        expected: &'static str,
        offset: usize,
    },
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEnd { expected: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Number,
    Str,
    TextBlock,
    Char,
    Punct(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start..self.end]
    }
}

/// Byte range into the scanned text, end exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub name: String,
    pub is_static: bool,
    pub on_demand: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAnnotation {
    pub name: String,
    pub arguments: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Method,
    Constructor,
    EnumConstant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMember {
    pub kind: MemberKind,
    pub name: String,
    pub flags: Flags,
    /// Field type or method return type, as written.
    pub ty: Option<TypeRef>,
    pub parameters: Vec<TypeRef>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceType {
    pub name: String,
    pub kind: TypeKind,
    pub flags: Flags,
    pub annotations: Vec<SourceAnnotation>,
    pub type_parameters: Vec<String>,
    pub super_class: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub members: Vec<SourceMember>,
    pub nested: Vec<SourceType>,
    /// Whole declaration including leading annotations.
    pub span: Span,
    /// From the opening to the closing brace, both included.
    pub body: Span,
}

impl SourceType {
    /// Offset of the closing brace of the type body.
    pub fn body_close(&self) -> usize {
        self.body.end.saturating_sub(1)
    }

    pub fn member(&self, name: &str) -> Option<&SourceMember> {
        self.members.iter().find(|member| member.name == name)
    }

    pub fn nested_type(&self, name: &str) -> Option<&SourceType> {
        self.nested.iter().find(|nested| nested.name == name)
    }

    /// Whether a member or member type with this name is declared directly.
    pub fn declares(&self, name: &str) -> bool {
        self.member(name).is_some() || self.nested_type(name).is_some()
    }

    /// Whether a member matching `member` is declared directly. Methods and
    /// constructors match on name and parameter erasures, so overloads are
    /// distinct; fields and enum constants match on name.
    pub fn declares_member(&self, member: &SourceMember) -> bool {
        match member.kind {
            MemberKind::Method | MemberKind::Constructor => self.members.iter().any(|existing| {
                existing.kind == member.kind
                    && existing.name == member.name
                    && same_erasures(&existing.parameters, &member.parameters)
            }),
            MemberKind::Field | MemberKind::EnumConstant => self.member(&member.name).is_some(),
        }
    }
}

/// Parameter lists compare by simple erased name and array depth, since
/// either side may spell a type qualified or not.
fn same_erasures(left: &[TypeRef], right: &[TypeRef]) -> bool {
    left.len() == right.len()
        && left.iter().zip(right).all(|(left, right)| {
            crate::element::simple_name_of(&left.name) == crate::element::simple_name_of(&right.name)
                && left.dimensions == right.dimensions
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDirective {
    pub module: String,
    pub transitive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceModule {
    pub name: String,
    pub requires: Vec<ModuleDirective>,
    pub exports: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedUnit {
    pub package: Option<String>,
    pub imports: Vec<Import>,
    pub types: Vec<SourceType>,
    pub module: Option<SourceModule>,
}

impl ParsedUnit {
    /// Look up a type by its name relative to the package, `Outer$Inner` or `Outer.Inner`.
    pub fn find_type(&self, relative: &str) -> Option<&SourceType> {
        let mut segments = relative.split(['$', '.']);
        let first = segments.next()?;
        let mut current = self.types.iter().find(|ty| ty.name == first)?;
        for segment in segments {
            current = current.nested_type(segment)?;
        }
        Some(current)
    }

    /// Visit every type with its `$`-separated name relative to the package.
    pub fn walk_types(&self, visit: &mut dyn FnMut(&str, &SourceType)) {
        fn walk(prefix: &str, ty: &SourceType, visit: &mut dyn FnMut(&str, &SourceType)) {
            let name = if prefix.is_empty() {
                ty.name.clone()
            } else {
                format!("{prefix}${}", ty.name)
            };
            visit(&name, ty);
            for nested in &ty.nested {
                walk(&name, nested, visit);
            }
        }
        for ty in &self.types {
            walk("", ty, visit);
        }
    }
}

pub fn parse_compilation_unit(text: &str) -> Result<ParsedUnit, ScanError> {
    let tokens = tokenize(text)?;
    Parser {
        text,
        tokens: &tokens,
        pos: 0,
    }
    .compilation_unit()
}

pub fn tokenize(text: &str) -> Result<Vec<Token>, ScanError> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let byte = bytes[pos];
        if byte.is_ascii_whitespace() {
            pos += 1;
            continue;
        }
        if text[pos..].starts_with("//") {
            pos = text[pos..].find('\n').map_or(bytes.len(), |offset| pos + offset);
            continue;
        }
        if text[pos..].starts_with("/*") {
            let end = text[pos + 2..].find("*/").ok_or(ScanError::Unterminated {
                what: "comment",
                offset: pos,
            })?;
            pos += end + 4;
            continue;
        }

        let start = pos;
        let kind = if text[pos..].starts_with("\"\"\"") {
            pos = scan_text_block(bytes, pos)?;
            TokenKind::TextBlock
        } else if byte == b'"' || byte == b'\'' {
            pos = scan_quoted(bytes, pos)?;
            if byte == b'"' {
                TokenKind::Str
            } else {
                TokenKind::Char
            }
        } else if byte.is_ascii_digit()
            || (byte == b'.' && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit))
        {
            pos = scan_number(bytes, pos);
            TokenKind::Number
        } else {
            let ch = text[pos..].chars().next().unwrap_or('\0');
            if is_ident_start(ch) {
                pos += ch.len_utf8();
                while let Some(next) = text[pos..].chars().next() {
                    if !is_ident_part(next) {
                        break;
                    }
                    pos += next.len_utf8();
                }
                TokenKind::Ident
            } else {
                pos += ch.len_utf8().max(1);
                TokenKind::Punct(ch)
            }
        };
        tokens.push(Token {
            kind,
            start,
            end: pos,
        });
    }
    Ok(tokens)
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_part(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

fn scan_text_block(bytes: &[u8], start: usize) -> Result<usize, ScanError> {
    let mut pos = start + 3;
    while pos < bytes.len() {
        if bytes[pos] == b'\\' {
            pos += 2;
        } else if bytes[pos..].starts_with(b"\"\"\"") {
            return Ok(pos + 3);
        } else {
            pos += 1;
        }
    }
    Err(ScanError::Unterminated {
        what: "text block",
        offset: start,
    })
}

fn scan_quoted(bytes: &[u8], start: usize) -> Result<usize, ScanError> {
    let quote = bytes[start];
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b'\n' => break,
            byte if byte == quote => return Ok(pos + 1),
            _ => pos += 1,
        }
    }
    Err(ScanError::Unterminated {
        what: if quote == b'"' { "string" } else { "character literal" },
        offset: start,
    })
}

fn scan_number(bytes: &[u8], start: usize) -> usize {
    let hex = bytes.get(start + 1).is_some_and(|b| matches!(b, b'x' | b'X'));
    let mut pos = start;
    while pos < bytes.len() {
        let byte = bytes[pos];
        let exponent_sign = matches!(byte, b'+' | b'-')
            && pos > start
            && if hex {
                matches!(bytes[pos - 1], b'p' | b'P')
            } else {
                matches!(bytes[pos - 1], b'e' | b'E')
            };
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'.' || exponent_sign {
            pos += 1;
        } else {
            break;
        }
    }
    pos
}

/// Content of a string, text block or character literal with escapes applied.
pub fn unescape_literal(token: &Token, source: &str) -> String {
    let raw = token.text(source);
    let body = match token.kind {
        TokenKind::TextBlock => {
            let inner = &raw[3..raw.len().saturating_sub(3).max(3)];
            let content = inner.split_once('\n').map_or("", |(_, rest)| rest);
            return unescape(&strip_indent(content));
        }
        TokenKind::Str | TokenKind::Char if raw.len() >= 2 => &raw[1..raw.len() - 1],
        _ => raw,
    };
    unescape(body)
}

fn strip_indent(content: &str) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    let indent = lines
        .iter()
        .enumerate()
        .filter(|(index, line)| !line.trim().is_empty() || *index == lines.len() - 1)
        .map(|(_, line)| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|line| line.get(indent..).unwrap_or("").trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('s') => out.push(' '),
            Some('\n') => {}
            Some('u') => {
                while chars.peek() == Some(&'u') {
                    chars.next();
                }
                let digits: String = chars.by_ref().take(4).collect();
                if let Some(decoded) = u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
                    out.push(decoded);
                }
            }
            Some(digit @ '0'..='7') => {
                let mut value = digit.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(next) if value * 8 + next <= 0o377 => {
                            value = value * 8 + next;
                            chars.next();
                        }
                        _ => break,
                    }
                }
                out.extend(char::from_u32(value));
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

struct Modifiers {
    flags: Flags,
    annotations: Vec<SourceAnnotation>,
    start: Option<usize>,
}

struct Parser<'a> {
    text: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek_at(&self, offset: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + offset)
    }

    fn at_punct(&self, ch: char) -> bool {
        self.punct_at(0, ch)
    }

    fn punct_at(&self, offset: usize, ch: char) -> bool {
        self.peek_at(offset).is_some_and(|t| t.kind == TokenKind::Punct(ch))
    }

    fn ident_at(&self, offset: usize) -> Option<&'a str> {
        self.peek_at(offset)
            .filter(|t| t.kind == TokenKind::Ident)
            .map(|t| t.text(self.text))
    }

    fn at_word(&self, word: &str) -> bool {
        self.ident_at(0) == Some(word)
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn unexpected(&self, expected: &'static str) -> ScanError {
        match self.peek_at(0) {
            Some(token) => ScanError::Unexpected {
                found: token.text(self.text).to_string(),
                expected,
                offset: token.start,
            },
            None => ScanError::UnexpectedEnd { expected },
        }
    }

    fn expect_punct(&mut self, ch: char, expected: &'static str) -> Result<&'a Token, ScanError> {
        if !self.at_punct(ch) {
            return Err(self.unexpected(expected));
        }
        self.bump().ok_or(ScanError::UnexpectedEnd { expected })
    }

    fn expect_ident(&mut self, expected: &'static str) -> Result<&'a str, ScanError> {
        let name = self.ident_at(0).ok_or_else(|| self.unexpected(expected))?;
        self.pos += 1;
        Ok(name)
    }

    fn previous_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|index| self.tokens.get(index))
            .map_or(0, |t| t.end)
    }

    fn compilation_unit(mut self) -> Result<ParsedUnit, ScanError> {
        let mut unit = ParsedUnit::default();
        while self.pos < self.tokens.len() {
            if self.at_punct(';') {
                self.pos += 1;
                continue;
            }
            let modifiers = self.modifiers()?;
            if self.at_word("package") {
                self.pos += 1;
                unit.package = Some(self.qualified_name("package name")?);
                self.expect_punct(';', "`;` after package declaration")?;
            } else if self.at_word("import") {
                self.pos += 1;
                unit.imports.push(self.import()?);
            } else if self.at_word("module")
                || (self.at_word("open") && self.ident_at(1) == Some("module"))
            {
                unit.module = Some(self.module_declaration()?);
            } else if self.pos < self.tokens.len() {
                unit.types.push(self.type_declaration(modifiers)?);
            }
        }
        Ok(unit)
    }

    fn import(&mut self) -> Result<Import, ScanError> {
        let is_static = self.at_word("static");
        if is_static {
            self.pos += 1;
        }
        let mut name = self.expect_ident("imported name")?.to_string();
        let mut on_demand = false;
        while self.at_punct('.') {
            self.pos += 1;
            if self.at_punct('*') {
                self.pos += 1;
                on_demand = true;
                break;
            }
            name.push('.');
            name.push_str(self.expect_ident("imported name")?);
        }
        self.expect_punct(';', "`;` after import")?;
        Ok(Import {
            name,
            is_static,
            on_demand,
        })
    }

    fn module_declaration(&mut self) -> Result<SourceModule, ScanError> {
        if self.at_word("open") {
            self.pos += 1;
        }
        self.pos += 1;
        let name = self.qualified_name("module name")?;
        self.expect_punct('{', "module body")?;
        let mut module = SourceModule {
            name,
            requires: Vec::new(),
            exports: Vec::new(),
        };
        while !self.at_punct('}') {
            let directive = self.expect_ident("module directive")?;
            match directive {
                "requires" => {
                    let mut transitive = false;
                    while matches!(self.ident_at(0), Some("transitive" | "static"))
                        && self.ident_at(1).is_some()
                    {
                        transitive |= self.at_word("transitive");
                        self.pos += 1;
                    }
                    let target = self.qualified_name("required module")?;
                    module.requires.push(ModuleDirective {
                        module: target,
                        transitive,
                    });
                }
                "exports" => {
                    module.exports.push(self.qualified_name("exported package")?);
                }
                _ => {}
            }
            while !self.at_punct(';') {
                self.bump().ok_or(ScanError::UnexpectedEnd {
                    expected: "`;` after module directive",
                })?;
            }
            self.pos += 1;
        }
        self.pos += 1;
        Ok(module)
    }

    fn qualified_name(&mut self, expected: &'static str) -> Result<String, ScanError> {
        let mut name = self.expect_ident(expected)?.to_string();
        while self.at_punct('.') && self.ident_at(1).is_some() {
            self.pos += 1;
            name.push('.');
            name.push_str(self.expect_ident(expected)?);
        }
        Ok(name)
    }

    fn modifiers(&mut self) -> Result<Modifiers, ScanError> {
        let mut modifiers = Modifiers {
            flags: Flags::default(),
            annotations: Vec::new(),
            start: None,
        };
        loop {
            let start = self.peek_at(0).map(|t| t.start);
            if self.at_punct('@') && self.ident_at(1) != Some("interface") {
                modifiers.annotations.push(self.annotation()?);
            } else if self.at_word("non") && self.punct_at(1, '-') && self.ident_at(2) == Some("sealed") {
                self.pos += 3;
            } else if let Some(bits) = self.ident_at(0).and_then(modifier_bits) {
                // `sealed` and `default` only act as modifiers before another word.
                if self.ident_at(1).is_none() && !self.punct_at(1, '@') && !self.punct_at(1, '<') {
                    break;
                }
                modifiers.flags.insert(bits);
                self.pos += 1;
            } else {
                break;
            }
            modifiers.start = modifiers.start.or(start);
        }
        Ok(modifiers)
    }

    fn annotation(&mut self) -> Result<SourceAnnotation, ScanError> {
        let at = self.expect_punct('@', "annotation")?;
        let name = self.qualified_name("annotation name")?;
        let mut arguments = None;
        if self.at_punct('(') {
            let open = self.bump().ok_or(ScanError::UnexpectedEnd { expected: "`(`" })?;
            let close = self.skip_balanced('(', ')')?;
            arguments = Some(self.text[open.end..close.start].to_string());
        }
        Ok(SourceAnnotation {
            name,
            arguments,
            span: Span::new(at.start, self.previous_end()),
        })
    }

    /// Skip to the token matching an already consumed opener and return it.
    fn skip_balanced(&mut self, open: char, close: char) -> Result<&'a Token, ScanError> {
        let mut depth = 1usize;
        while let Some(token) = self.bump() {
            match token.kind {
                TokenKind::Punct(ch) if ch == open => depth += 1,
                TokenKind::Punct(ch) if ch == close => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(token);
                    }
                }
                _ => {}
            }
        }
        Err(ScanError::UnexpectedEnd {
            expected: "closing bracket",
        })
    }

    fn type_keyword(&self) -> Option<(TypeKind, usize)> {
        match self.ident_at(0) {
            Some("class") => Some((TypeKind::Class, 1)),
            Some("interface") => Some((TypeKind::Interface, 1)),
            Some("enum") if self.ident_at(1).is_some() => Some((TypeKind::Enum, 1)),
            Some("record")
                if self.ident_at(1).is_some() && (self.punct_at(2, '(') || self.punct_at(2, '<')) =>
            {
                Some((TypeKind::Record, 1))
            }
            _ if self.at_punct('@') && self.ident_at(1) == Some("interface") => {
                Some((TypeKind::Annotation, 2))
            }
            _ => None,
        }
    }

    fn type_declaration(&mut self, modifiers: Modifiers) -> Result<SourceType, ScanError> {
        let keyword_start = self.peek_at(0).map_or(0, |t| t.start);
        let (kind, keyword_len) = self
            .type_keyword()
            .ok_or_else(|| self.unexpected("type declaration"))?;
        self.pos += keyword_len;
        let name = self.expect_ident("type name")?.to_string();

        let mut flags = modifiers.flags;
        match kind {
            TypeKind::Interface => flags.insert(ACC_INTERFACE | ACC_ABSTRACT),
            TypeKind::Annotation => flags.insert(ACC_INTERFACE | ACC_ABSTRACT | ACC_ANNOTATION),
            TypeKind::Enum => flags.insert(ACC_ENUM | ACC_FINAL),
            TypeKind::Record => flags.insert(ACC_FINAL),
            TypeKind::Class => {}
        }

        let type_parameters = if self.at_punct('<') {
            self.type_parameter_names()?
        } else {
            Vec::new()
        };

        let mut members = Vec::new();
        if kind == TypeKind::Record {
            self.expect_punct('(', "record header")?;
            let header_start = self.previous_end();
            for (ty, component) in self.parameter_list()? {
                members.push(SourceMember {
                    kind: MemberKind::Field,
                    name: component,
                    flags: Flags(ACC_PRIVATE | ACC_FINAL),
                    ty: Some(ty),
                    parameters: Vec::new(),
                    span: Span::new(header_start, self.previous_end()),
                });
            }
        }

        let mut super_class = None;
        let mut interfaces = Vec::new();
        loop {
            match self.ident_at(0) {
                Some("extends") => {
                    self.pos += 1;
                    if kind.is_interface() {
                        interfaces.extend(self.type_list()?);
                    } else {
                        super_class = Some(self.parse_type()?);
                    }
                }
                Some("implements") => {
                    self.pos += 1;
                    interfaces.extend(self.type_list()?);
                }
                Some("permits") => {
                    self.pos += 1;
                    self.type_list()?;
                }
                _ => break,
            }
        }

        let open = self.expect_punct('{', "type body")?;
        let mut nested = Vec::new();
        if kind == TypeKind::Enum {
            self.enum_constants(&name, &mut members)?;
        }
        let close = self.class_body(&name, kind, &mut members, &mut nested)?;

        Ok(SourceType {
            name,
            kind,
            flags,
            annotations: modifiers.annotations,
            type_parameters,
            super_class,
            interfaces,
            members,
            nested,
            span: Span::new(modifiers.start.unwrap_or(keyword_start), close.end),
            body: Span::new(open.start, close.end),
        })
    }

    fn type_parameter_names(&mut self) -> Result<Vec<String>, ScanError> {
        self.expect_punct('<', "type parameters")?;
        let mut names = Vec::new();
        let mut depth = 1usize;
        let mut expect_name = true;
        while depth > 0 {
            let token = self.bump().ok_or(ScanError::UnexpectedEnd {
                expected: "`>` closing type parameters",
            })?;
            match token.kind {
                TokenKind::Punct('<') => depth += 1,
                TokenKind::Punct('>') => depth -= 1,
                TokenKind::Punct(',') if depth == 1 => expect_name = true,
                TokenKind::Punct('@') => {
                    self.pos -= 1;
                    self.annotation()?;
                }
                TokenKind::Ident if depth == 1 && expect_name => {
                    names.push(token.text(self.text).to_string());
                    expect_name = false;
                }
                _ => {}
            }
        }
        Ok(names)
    }

    fn type_list(&mut self) -> Result<Vec<TypeRef>, ScanError> {
        let mut types = vec![self.parse_type()?];
        while self.at_punct(',') {
            self.pos += 1;
            types.push(self.parse_type()?);
        }
        Ok(types)
    }

    fn parse_type(&mut self) -> Result<TypeRef, ScanError> {
        while self.at_punct('@') {
            self.annotation()?;
        }
        let mut name = self.expect_ident("type")?.to_string();
        let mut arguments = Vec::new();
        loop {
            if self.at_punct('<') {
                arguments = self.type_arguments()?;
            } else if self.at_punct('.') && self.ident_at(1).is_some() {
                self.pos += 1;
                while self.at_punct('@') {
                    self.annotation()?;
                }
                name.push('.');
                name.push_str(self.expect_ident("type")?);
                arguments.clear();
            } else {
                break;
            }
        }
        let mut dimensions = 0u8;
        loop {
            while self.at_punct('@') {
                self.annotation()?;
            }
            if self.at_punct('[') && self.punct_at(1, ']') {
                self.pos += 2;
                dimensions += 1;
            } else if self.at_punct('.') && self.punct_at(1, '.') && self.punct_at(2, '.') {
                self.pos += 3;
                dimensions += 1;
            } else {
                break;
            }
        }
        Ok(TypeRef::new(name)
            .with_arguments(arguments)
            .with_dimensions(dimensions))
    }

    fn type_arguments(&mut self) -> Result<Vec<TypeRef>, ScanError> {
        self.expect_punct('<', "type arguments")?;
        let mut arguments = Vec::new();
        while !self.at_punct('>') {
            while self.at_punct('@') {
                self.annotation()?;
            }
            if self.at_punct('?') {
                self.pos += 1;
                if matches!(self.ident_at(0), Some("extends" | "super")) {
                    self.pos += 1;
                    arguments.push(self.parse_type()?);
                } else {
                    arguments.push(TypeRef::new("?"));
                }
            } else {
                arguments.push(self.parse_type()?);
            }
            if self.at_punct(',') {
                self.pos += 1;
            } else if !self.at_punct('>') {
                return Err(self.unexpected("`,` or `>` in type arguments"));
            }
        }
        self.pos += 1;
        Ok(arguments)
    }

    /// Parameters up to and including the closing parenthesis.
    fn parameter_list(&mut self) -> Result<Vec<(TypeRef, String)>, ScanError> {
        let mut parameters = Vec::new();
        while !self.at_punct(')') {
            self.modifiers()?;
            let mut ty = self.parse_type()?;
            let name = if self.at_word("this") {
                self.pos += 1;
                None
            } else {
                let name = self.expect_ident("parameter name")?.to_string();
                // `Outer.this` receivers.
                if self.at_punct('.') && self.ident_at(1) == Some("this") {
                    self.pos += 2;
                    None
                } else {
                    Some(name)
                }
            };
            while self.at_punct('[') && self.punct_at(1, ']') {
                self.pos += 2;
                ty.dimensions += 1;
            }
            if let Some(name) = name {
                parameters.push((ty, name));
            }
            if self.at_punct(',') {
                self.pos += 1;
            } else if !self.at_punct(')') {
                return Err(self.unexpected("`,` or `)` in parameter list"));
            }
        }
        self.pos += 1;
        Ok(parameters)
    }

    fn enum_constants(&mut self, owner: &str, members: &mut Vec<SourceMember>) -> Result<(), ScanError> {
        loop {
            if self.at_punct(';') {
                self.pos += 1;
                return Ok(());
            }
            if self.at_punct('}') {
                return Ok(());
            }
            let modifiers = self.modifiers()?;
            let name_start = self.peek_at(0).map_or(0, |t| t.start);
            let name = self.expect_ident("enum constant")?.to_string();
            if self.at_punct('(') {
                self.pos += 1;
                self.skip_balanced('(', ')')?;
            }
            if self.at_punct('{') {
                self.pos += 1;
                self.skip_balanced('{', '}')?;
            }
            members.push(SourceMember {
                kind: MemberKind::EnumConstant,
                name,
                flags: Flags(ACC_PUBLIC | ACC_STATIC | ACC_FINAL | ACC_ENUM),
                ty: Some(TypeRef::new(owner)),
                parameters: Vec::new(),
                span: Span::new(modifiers.start.unwrap_or(name_start), self.previous_end()),
            });
            if self.at_punct(',') {
                self.pos += 1;
            }
        }
    }

    /// Members up to the closing brace of the body, which is returned.
    fn class_body(
        &mut self,
        owner: &str,
        kind: TypeKind,
        members: &mut Vec<SourceMember>,
        nested: &mut Vec<SourceType>,
    ) -> Result<&'a Token, ScanError> {
        loop {
            if self.at_punct('}') {
                return self.bump().ok_or(ScanError::UnexpectedEnd { expected: "`}`" });
            }
            if self.at_punct(';') {
                self.pos += 1;
                continue;
            }
            if self.pos >= self.tokens.len() {
                return Err(ScanError::UnexpectedEnd {
                    expected: "`}` closing type body",
                });
            }

            let mut modifiers = self.modifiers()?;
            let start = modifiers
                .start
                .or_else(|| self.peek_at(0).map(|t| t.start))
                .unwrap_or(0);
            if kind.is_interface() && !modifiers.flags.contains(ACC_PRIVATE) {
                modifiers.flags.insert(ACC_PUBLIC);
            }

            if self.at_punct('{') {
                self.pos += 1;
                self.skip_balanced('{', '}')?;
                continue;
            }
            if self.type_keyword().is_some() {
                let mut member_type = self.type_declaration(modifiers)?;
                if kind.is_interface() || member_type.kind != TypeKind::Class {
                    member_type.flags.insert(ACC_STATIC);
                }
                nested.push(member_type);
                continue;
            }
            if self.at_punct('<') {
                self.type_parameter_names()?;
            }

            // Constructors, including compact record constructors.
            if self.ident_at(0) == Some(owner) && (self.punct_at(1, '(') || self.punct_at(1, '{')) {
                self.pos += 1;
                let parameters = if self.at_punct('(') {
                    self.pos += 1;
                    self.parameter_list()?.into_iter().map(|(ty, _)| ty).collect()
                } else {
                    Vec::new()
                };
                self.skip_method_tail()?;
                members.push(SourceMember {
                    kind: MemberKind::Constructor,
                    name: owner.to_string(),
                    flags: modifiers.flags,
                    ty: None,
                    parameters,
                    span: Span::new(start, self.previous_end()),
                });
                continue;
            }

            let ty = self.parse_type()?;
            let name = self.expect_ident("member name")?.to_string();
            if self.at_punct('(') {
                self.pos += 1;
                let parameters = self.parameter_list()?.into_iter().map(|(ty, _)| ty).collect();
                let mut flags = modifiers.flags;
                if kind.is_interface() && !flags.is_static() && !self.method_has_body() {
                    flags.insert(ACC_ABSTRACT);
                }
                self.skip_method_tail()?;
                members.push(SourceMember {
                    kind: MemberKind::Method,
                    name,
                    flags,
                    ty: Some(ty),
                    parameters,
                    span: Span::new(start, self.previous_end()),
                });
                continue;
            }

            let mut flags = modifiers.flags;
            if kind.is_interface() {
                flags.insert(ACC_PUBLIC | ACC_STATIC | ACC_FINAL);
            }
            let mut declarators = Vec::new();
            let mut name = name;
            loop {
                let mut declared = ty.clone();
                while self.at_punct('[') && self.punct_at(1, ']') {
                    self.pos += 2;
                    declared.dimensions += 1;
                }
                declarators.push((name, declared));
                if self.at_punct('=') {
                    self.pos += 1;
                    self.skip_initializer()?;
                }
                if self.at_punct(',') {
                    self.pos += 1;
                    name = self.expect_ident("field name")?.to_string();
                    continue;
                }
                self.expect_punct(';', "`;` after field declaration")?;
                break;
            }
            let span = Span::new(start, self.previous_end());
            for (name, declared) in declarators {
                members.push(SourceMember {
                    kind: MemberKind::Field,
                    name,
                    flags,
                    ty: Some(declared),
                    parameters: Vec::new(),
                    span,
                });
            }
        }
    }

    fn method_has_body(&self) -> bool {
        let mut offset = 0;
        while let Some(token) = self.peek_at(offset) {
            match token.kind {
                TokenKind::Punct('{') => return true,
                TokenKind::Punct(';') => return false,
                _ => offset += 1,
            }
        }
        false
    }

    /// Dimensions, throws clause, annotation default and body or `;`.
    fn skip_method_tail(&mut self) -> Result<(), ScanError> {
        loop {
            let token = self.bump().ok_or(ScanError::UnexpectedEnd {
                expected: "method body or `;`",
            })?;
            match token.kind {
                TokenKind::Punct(';') => return Ok(()),
                TokenKind::Punct('{') => {
                    self.skip_balanced('{', '}')?;
                    return Ok(());
                }
                TokenKind::Punct('(') => {
                    self.skip_balanced('(', ')')?;
                }
                _ => {}
            }
        }
    }

    /// Stop before the `;` or the `,` that separates the next declarator.
    fn skip_initializer(&mut self) -> Result<(), ScanError> {
        let mut depth = 0usize;
        loop {
            let token = self.peek_at(0).ok_or(ScanError::UnexpectedEnd {
                expected: "`;` after field initializer",
            })?;
            match token.kind {
                TokenKind::Punct('(' | '{' | '[') => depth += 1,
                TokenKind::Punct(')' | '}' | ']') => depth = depth.saturating_sub(1),
                TokenKind::Punct(';') if depth == 0 => return Ok(()),
                TokenKind::Punct(',') if depth == 0 => {
                    let next_declarator = self.ident_at(1).is_some()
                        && (self.punct_at(2, '=')
                            || self.punct_at(2, ',')
                            || self.punct_at(2, ';')
                            || self.punct_at(2, '['));
                    if next_declarator {
                        return Ok(());
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
    }
}

fn modifier_bits(word: &str) -> Option<u16> {
    Some(match word {
        "public" => ACC_PUBLIC,
        "private" => ACC_PRIVATE,
        "protected" => ACC_PROTECTED,
        "static" => ACC_STATIC,
        "final" => ACC_FINAL,
        "abstract" => ACC_ABSTRACT,
        "synchronized" => 0x0020,
        "volatile" => 0x0040,
        "transient" => 0x0080,
        "native" => 0x0100,
        "strictfp" => 0x0800,
        "default" | "sealed" => 0,
        _ => return None,
    })
}
