//! Annotation values and the two decoders that produce them.
//!
//! Binary annotations arrive as already-structured element values read
//! from the class file. Source annotations keep the raw argument text of
//! the declaration together with the name context of their compilation
//! unit and are evaluated on first request.

use crate::classfile::{ConstValue, ElementValue};
use crate::element::TypeRef;
use crate::frontend::NameContext;
use crate::source::{tokenize, unescape_literal, Token, TokenKind};
use indexmap::IndexMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    Boolean(bool),
    Char(char),
    Integer(i64),
    Float(f64),
    String(String),
    Class(TypeRef),
    Enum { type_name: String, constant: String },
    Annotation(Box<Annotation>),
    Array(Vec<AnnotationValue>),
    /// Expression text that is not a compile-time literal this decoder understands.
    Unresolved(String),
}

impl AnnotationValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnnotationValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&TypeRef> {
        match self {
            AnnotationValue::Class(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn enum_constant(&self) -> Option<&str> {
        match self {
            AnnotationValue::Enum { constant, .. } => Some(constant),
            _ => None,
        }
    }
}

/// A decoded annotation instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub type_name: String,
    pub elements: IndexMap<String, AnnotationValue>,
}

impl Annotation {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            elements: IndexMap::new(),
        }
    }

    pub fn get(&self, element: &str) -> Option<&AnnotationValue> {
        self.elements.get(element)
    }

    /// The implicit `value` element.
    pub fn value(&self) -> Option<&AnnotationValue> {
        self.get("value")
    }

    pub fn class_value(&self, element: &str) -> Option<&TypeRef> {
        self.get(element).and_then(AnnotationValue::as_class)
    }

    pub fn enum_value(&self, element: &str) -> Option<&str> {
        self.get(element).and_then(AnnotationValue::enum_constant)
    }
}

/// An annotation as attached to a [`crate::TypeDecl`], not yet decoded.
#[derive(Debug, Clone)]
pub struct RawAnnotation {
    /// Fully qualified when resolvable, as written otherwise.
    pub type_name: String,
    pub payload: RawPayload,
}

#[derive(Debug, Clone)]
pub enum RawPayload {
    Binary(Vec<(String, ElementValue)>),
    Source {
        /// Text between the parentheses, `None` for marker annotations.
        arguments: Option<String>,
        context: Arc<NameContext>,
    },
}

impl RawAnnotation {
    pub fn is_binary(&self) -> bool {
        matches!(self.payload, RawPayload::Binary(_))
    }
}

pub(crate) fn decode_binary(type_name: &str, pairs: &[(String, ElementValue)]) -> Annotation {
    let mut annotation = Annotation::new(type_name);
    for (name, value) in pairs {
        annotation
            .elements
            .insert(name.clone(), decode_element_value(value));
    }
    annotation
}

fn decode_element_value(value: &ElementValue) -> AnnotationValue {
    match value {
        ElementValue::Const { tag, value } => match (tag, value) {
            (b'Z', ConstValue::Int(v)) => AnnotationValue::Boolean(*v != 0),
            (b'C', ConstValue::Int(v)) => char::from_u32(*v as u32)
                .map(AnnotationValue::Char)
                .unwrap_or_else(|| AnnotationValue::Integer(i64::from(*v))),
            (_, ConstValue::Int(v)) => AnnotationValue::Integer(i64::from(*v)),
            (_, ConstValue::Long(v)) => AnnotationValue::Integer(*v),
            (_, ConstValue::Float(v)) => AnnotationValue::Float(f64::from(*v)),
            (_, ConstValue::Double(v)) => AnnotationValue::Float(*v),
            (_, ConstValue::Utf8(v)) => AnnotationValue::String(v.clone()),
        },
        ElementValue::Enum {
            type_name,
            constant,
        } => AnnotationValue::Enum {
            type_name: type_name.name.clone(),
            constant: constant.clone(),
        },
        ElementValue::Class(ty) => AnnotationValue::Class(ty.clone()),
        ElementValue::Annotation(nested) => {
            AnnotationValue::Annotation(Box::new(decode_binary(&nested.type_name, &nested.pairs)))
        }
        ElementValue::Array(values) => {
            AnnotationValue::Array(values.iter().map(decode_element_value).collect())
        }
    }
}

/// Evaluate the argument text of a source annotation.
///
/// `resolve` maps a type name as written to its fully qualified form. Class
/// literals whose name cannot be resolved are assumed to live in the
/// package of the annotated unit.
pub(crate) fn decode_source(
    type_name: &str,
    arguments: Option<&str>,
    context: &NameContext,
    resolve: &dyn Fn(&str) -> Option<String>,
) -> Annotation {
    let mut annotation = Annotation::new(type_name);
    let Some(text) = arguments else {
        return annotation;
    };
    let tokens = match tokenize(text) {
        Ok(tokens) => tokens,
        Err(error) => {
            tracing::debug!(annotation = type_name, error = %error, "annotation arguments not tokenizable");
            annotation
                .elements
                .insert("value".into(), AnnotationValue::Unresolved(text.trim().to_string()));
            return annotation;
        }
    };
    if tokens.is_empty() {
        return annotation;
    }

    let decoder = ValueDecoder {
        text,
        tokens: &tokens,
        context,
        resolve,
    };
    for (name, range) in split_element_pairs(text, &tokens) {
        annotation
            .elements
            .insert(name, decoder.decode(range.0, range.1));
    }
    annotation
}

/// Split `a = x, b = y` into named token ranges, or a single `value` range.
fn split_element_pairs(text: &str, tokens: &[Token]) -> Vec<(String, (usize, usize))> {
    let named = tokens.len() >= 2
        && tokens[0].kind == TokenKind::Ident
        && tokens[1].kind == TokenKind::Punct('=')
        && tokens.get(2).map(|t| t.kind) != Some(TokenKind::Punct('='));
    if !named {
        return vec![("value".to_string(), (0, tokens.len()))];
    }

    let mut pairs = Vec::new();
    for (start, end) in split_top_level(tokens, 0, tokens.len()) {
        if end - start < 3 {
            continue;
        }
        let name = tokens[start].text(text).to_string();
        pairs.push((name, (start + 2, end)));
    }
    pairs
}

/// Comma-separated ranges at nesting depth zero.
fn split_top_level(tokens: &[Token], start: usize, end: usize) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut depth = 0usize;
    let mut from = start;
    for index in start..end {
        match tokens[index].kind {
            TokenKind::Punct('(' | '{' | '[') => depth += 1,
            TokenKind::Punct(')' | '}' | ']') => depth = depth.saturating_sub(1),
            TokenKind::Punct(',') if depth == 0 => {
                ranges.push((from, index));
                from = index + 1;
            }
            _ => {}
        }
    }
    if from < end {
        ranges.push((from, end));
    }
    ranges
}

struct ValueDecoder<'a> {
    text: &'a str,
    tokens: &'a [Token],
    context: &'a NameContext,
    resolve: &'a dyn Fn(&str) -> Option<String>,
}

impl ValueDecoder<'_> {
    fn raw(&self, start: usize, end: usize) -> String {
        if start >= end {
            return String::new();
        }
        self.text[self.tokens[start].start..self.tokens[end - 1].end]
            .trim()
            .to_string()
    }

    fn decode(&self, start: usize, end: usize) -> AnnotationValue {
        let tokens = &self.tokens[start..end];
        match tokens {
            [] => AnnotationValue::Unresolved(String::new()),
            [first, .., last]
                if first.kind == TokenKind::Punct('{') && last.kind == TokenKind::Punct('}') =>
            {
                let values = split_top_level(self.tokens, start + 1, end - 1)
                    .into_iter()
                    .map(|(from, to)| self.decode(from, to))
                    .collect();
                AnnotationValue::Array(values)
            }
            [at, ..] if at.kind == TokenKind::Punct('@') => self.decode_nested(start, end),
            [single] => self.decode_single(single),
            [sign, number] if sign.kind == TokenKind::Punct('-') && number.kind == TokenKind::Number => {
                match parse_number(number.text(self.text)) {
                    Some(AnnotationValue::Integer(v)) => AnnotationValue::Integer(-v),
                    Some(AnnotationValue::Float(v)) => AnnotationValue::Float(-v),
                    _ => AnnotationValue::Unresolved(self.raw(start, end)),
                }
            }
            _ if tokens.iter().all(|t| {
                matches!(t.kind, TokenKind::Str | TokenKind::TextBlock | TokenKind::Punct('+'))
            }) =>
            {
                let mut joined = String::new();
                for token in tokens.iter().filter(|t| t.kind != TokenKind::Punct('+')) {
                    joined.push_str(&unescape_literal(token, self.text));
                }
                AnnotationValue::String(joined)
            }
            _ => self.decode_name_expression(start, end),
        }
    }

    fn decode_single(&self, token: &Token) -> AnnotationValue {
        let text = token.text(self.text);
        match token.kind {
            TokenKind::Str | TokenKind::TextBlock => {
                AnnotationValue::String(unescape_literal(token, self.text))
            }
            TokenKind::Char => {
                let value = unescape_literal(token, self.text);
                let mut chars = value.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => AnnotationValue::Char(ch),
                    _ => AnnotationValue::Unresolved(text.to_string()),
                }
            }
            TokenKind::Number => {
                parse_number(text).unwrap_or_else(|| AnnotationValue::Unresolved(text.to_string()))
            }
            TokenKind::Ident if text == "true" => AnnotationValue::Boolean(true),
            TokenKind::Ident if text == "false" => AnnotationValue::Boolean(false),
            _ => AnnotationValue::Unresolved(text.to_string()),
        }
    }

    fn decode_nested(&self, start: usize, end: usize) -> AnnotationValue {
        let mut cursor = start + 1;
        let mut name = String::new();
        while cursor < end {
            let token = &self.tokens[cursor];
            match token.kind {
                TokenKind::Ident | TokenKind::Punct('.') => name.push_str(token.text(self.text)),
                _ => break,
            }
            cursor += 1;
        }
        let type_name = (self.resolve)(&name).unwrap_or(name);
        let arguments = if cursor + 1 < end
            && self.tokens[cursor].kind == TokenKind::Punct('(')
            && self.tokens[end - 1].kind == TokenKind::Punct(')')
        {
            let close = end - 1;
            Some(&self.text[self.tokens[cursor].end..self.tokens[close].start])
        } else {
            None
        };
        AnnotationValue::Annotation(Box::new(decode_source(
            &type_name,
            arguments,
            self.context,
            self.resolve,
        )))
    }

    /// Class literals, enum constants and anything else built from names.
    fn decode_name_expression(&self, start: usize, end: usize) -> AnnotationValue {
        let mut segments: Vec<&str> = Vec::new();
        let mut dimensions = 0u8;
        let mut cursor = start;
        let mut expect_name = true;
        while cursor < end {
            let token = &self.tokens[cursor];
            match token.kind {
                TokenKind::Ident if expect_name => {
                    segments.push(token.text(self.text));
                    expect_name = false;
                }
                TokenKind::Punct('.') if !expect_name => expect_name = true,
                TokenKind::Punct('[')
                    if !expect_name
                        && self.tokens.get(cursor + 1).map(|t| t.kind) == Some(TokenKind::Punct(']')) =>
                {
                    dimensions += 1;
                    cursor += 1;
                }
                _ => return AnnotationValue::Unresolved(self.raw(start, end)),
            }
            cursor += 1;
        }
        if expect_name || segments.is_empty() {
            return AnnotationValue::Unresolved(self.raw(start, end));
        }

        if segments.last() == Some(&"class") && segments.len() > 1 {
            let name = segments[..segments.len() - 1].join(".");
            let resolved = (self.resolve)(&name).unwrap_or_else(|| self.assume_local(&name));
            return AnnotationValue::Class(TypeRef::new(resolved).with_dimensions(dimensions));
        }

        if segments.len() > 1 && dimensions == 0 {
            let constant = segments[segments.len() - 1];
            let owner = segments[..segments.len() - 1].join(".");
            if looks_like_constant(constant) {
                let type_name = (self.resolve)(&owner).unwrap_or(owner);
                return AnnotationValue::Enum {
                    type_name,
                    constant: constant.to_string(),
                };
            }
        }
        AnnotationValue::Unresolved(self.raw(start, end))
    }

    fn assume_local(&self, name: &str) -> String {
        match &self.context.package {
            Some(package) if !name.contains('.') => format!("{package}.{name}"),
            _ => name.to_string(),
        }
    }
}

fn looks_like_constant(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

fn parse_number(text: &str) -> Option<AnnotationValue> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        let digits = hex.trim_end_matches('l');
        return i64::from_str_radix(digits, 16).ok().map(AnnotationValue::Integer);
    }
    if let Some(bin) = lower.strip_prefix("0b") {
        let digits = bin.trim_end_matches('l');
        return i64::from_str_radix(digits, 2).ok().map(AnnotationValue::Integer);
    }
    let is_float = lower.contains(['.', 'e']) || lower.ends_with(['f', 'd']);
    if is_float {
        let digits = lower.trim_end_matches(['f', 'd']);
        return digits.parse::<f64>().ok().map(AnnotationValue::Float);
    }
    let digits = lower.trim_end_matches('l');
    if digits.len() > 1 && digits.starts_with('0') {
        return i64::from_str_radix(&digits[1..], 8).ok().map(AnnotationValue::Integer);
    }
    digits.parse::<i64>().ok().map(AnnotationValue::Integer)
}
