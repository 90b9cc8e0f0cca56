// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF object model — the value types that make up a document's object graph.
//
// Every link between objects is an `ObjRef` into the document's object table,
// never an owning pointer, so cyclic graphs (page /Parent back-references)
// need no special lifetime handling.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset};
use nachtrag_core::error::{NachtragError, Result};

use super::date;

// -- References ---------------------------------------------------------------

/// Indirect reference: `(object number, generation)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjRef {
    pub number: u32,
    pub generation: u16,
}

impl ObjRef {
    pub const fn new(number: u32, generation: u16) -> Self {
        Self { number, generation }
    }
}

impl fmt::Display for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.number, self.generation)
    }
}

// -- Names --------------------------------------------------------------------

/// A PDF name, stored decoded (without the leading `/` and without `#xx`
/// escapes).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(Vec<u8>);

impl Name {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lossy UTF-8 view, for logging and comparisons against literals.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Self(value.into_bytes())
    }
}

impl Borrow<[u8]> for Name {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", String::from_utf8_lossy(&self.0))
    }
}

// -- Strings ------------------------------------------------------------------

/// Preferred output form of a string object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringFormat {
    #[default]
    Literal,
    Hexadecimal,
}

/// A PDF string: raw bytes plus the form it should be written in.
///
/// Equality and ordering look at the bytes only.
#[derive(Debug, Clone)]
pub struct PdfString {
    bytes: Vec<u8>,
    format: StringFormat,
}

impl PdfString {
    pub fn literal(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            format: StringFormat::Literal,
        }
    }

    pub fn hex(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            format: StringFormat::Hexadecimal,
        }
    }

    /// Encode a text string. Printable ASCII is stored as-is; anything else
    /// becomes UTF-16BE with a byte order mark.
    pub fn text(text: &str) -> Self {
        let plain = text
            .chars()
            .all(|c| matches!(c, ' '..='~' | '\t' | '\n' | '\r'));
        if plain {
            return Self::literal(text.as_bytes());
        }

        let mut bytes = Vec::with_capacity(2 + text.len() * 2);
        bytes.extend_from_slice(&[0xFE, 0xFF]);
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Self::literal(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn format(&self) -> StringFormat {
        self.format
    }

    /// Decode as a text string: UTF-16BE or UTF-8 when a byte order mark is
    /// present, otherwise byte-per-character.
    pub fn to_text(&self) -> String {
        match self.bytes.as_slice() {
            [0xFE, 0xFF, rest @ ..] => {
                let units: Vec<u16> = rest
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16_lossy(&units)
            }
            [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8_lossy(rest).into_owned(),
            other => other.iter().map(|&b| char::from(b)).collect(),
        }
    }
}

impl PartialEq for PdfString {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for PdfString {}

impl PartialOrd for PdfString {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PdfString {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.bytes.cmp(&other.bytes)
    }
}

// -- Dictionaries -------------------------------------------------------------

/// Dictionary keyed by name. Keys iterate in byte order, which keeps
/// serialisation and graph traversal reproducible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary(BTreeMap<Name, PdfObject>);

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `key`, failing with [`NachtragError::NotFound`] when absent.
    pub fn get(&self, key: &str) -> Result<&PdfObject> {
        self.get_opt(key)
            .ok_or_else(|| NachtragError::not_found(format!("key /{key}")))
    }

    pub fn get_opt(&self, key: &str) -> Option<&PdfObject> {
        self.0.get(key.as_bytes())
    }

    pub fn get_mut(&mut self, key: &str) -> Result<&mut PdfObject> {
        self.0
            .get_mut(key.as_bytes())
            .ok_or_else(|| NachtragError::not_found(format!("key /{key}")))
    }

    /// Insert or replace an entry, returning the previous value.
    pub fn set(&mut self, key: impl Into<Name>, value: impl Into<PdfObject>) -> Option<PdfObject> {
        self.0.insert(key.into(), value.into())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key.as_bytes())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, &PdfObject)> {
        self.0.iter()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut PdfObject> {
        self.0.values_mut()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when `/Type` is the name `type_name`.
    pub fn has_type(&self, type_name: &str) -> bool {
        matches!(self.get_opt("Type"), Some(PdfObject::Name(name)) if *name == type_name)
    }
}

impl<K: Into<Name>, V: Into<PdfObject>> FromIterator<(K, V)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// -- Streams ------------------------------------------------------------------

/// Stream object. `content` holds the bytes exactly as they appear in the
/// file, i.e. after any `/Filter` has been applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stream {
    pub dict: Dictionary,
    pub content: Vec<u8>,
}

impl Stream {
    pub fn new(dict: Dictionary, content: Vec<u8>) -> Self {
        Self { dict, content }
    }

    pub fn is_filtered(&self) -> bool {
        self.dict.contains_key("Filter")
    }
}

// -- Objects ------------------------------------------------------------------

/// Any PDF value.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfObject {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(PdfString),
    Name(Name),
    /// A date, written as a string in `D:` form.
    Date(DateTime<FixedOffset>),
    Array(Vec<PdfObject>),
    Dictionary(Dictionary),
    Stream(Stream),
    Reference(ObjRef),
}

impl PdfObject {
    pub fn name(name: &str) -> Self {
        Self::Name(Name::from(name))
    }

    pub fn text(text: &str) -> Self {
        Self::String(PdfString::text(text))
    }

    /// Human-readable variant name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::String(_) => "string",
            Self::Name(_) => "name",
            Self::Date(_) => "date",
            Self::Array(_) => "array",
            Self::Dictionary(_) => "dictionary",
            Self::Stream(_) => "stream",
            Self::Reference(_) => "reference",
        }
    }

    fn mismatch(&self, expected: &'static str) -> NachtragError {
        NachtragError::TypeMismatch {
            expected,
            found: self.type_name(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Self::Boolean(value) => Ok(*value),
            other => Err(other.mismatch("boolean")),
        }
    }

    pub fn as_i64(&self) -> Result<i64> {
        match self {
            Self::Integer(value) => Ok(*value),
            other => Err(other.mismatch("integer")),
        }
    }

    /// Numeric value of an integer or real.
    pub fn as_f64(&self) -> Result<f64> {
        match self {
            Self::Integer(value) => Ok(*value as f64),
            Self::Real(value) => Ok(*value),
            other => Err(other.mismatch("number")),
        }
    }

    pub fn as_name(&self) -> Result<&Name> {
        match self {
            Self::Name(name) => Ok(name),
            other => Err(other.mismatch("name")),
        }
    }

    pub fn as_string(&self) -> Result<&PdfString> {
        match self {
            Self::String(string) => Ok(string),
            other => Err(other.mismatch("string")),
        }
    }

    /// Decoded text of a string object.
    pub fn as_text(&self) -> Result<String> {
        self.as_string().map(PdfString::to_text)
    }

    /// A date value, parsing string objects in `D:` form.
    pub fn as_date(&self) -> Result<DateTime<FixedOffset>> {
        match self {
            Self::Date(value) => Ok(*value),
            Self::String(string) => date::decode_date(&string.to_text()),
            other => Err(other.mismatch("date")),
        }
    }

    pub fn as_array(&self) -> Result<&Vec<PdfObject>> {
        match self {
            Self::Array(items) => Ok(items),
            other => Err(other.mismatch("array")),
        }
    }

    pub fn as_array_mut(&mut self) -> Result<&mut Vec<PdfObject>> {
        match self {
            Self::Array(items) => Ok(items),
            other => Err(other.mismatch("array")),
        }
    }

    /// Element `index` of an array, failing with `NotFound` out of range.
    pub fn array_get(&self, index: usize) -> Result<&PdfObject> {
        let items = self.as_array()?;
        items.get(index).ok_or_else(|| {
            NachtragError::not_found(format!("array index {index} (length {})", items.len()))
        })
    }

    pub fn as_dict(&self) -> Result<&Dictionary> {
        match self {
            Self::Dictionary(dict) => Ok(dict),
            other => Err(other.mismatch("dictionary")),
        }
    }

    pub fn as_dict_mut(&mut self) -> Result<&mut Dictionary> {
        match self {
            Self::Dictionary(dict) => Ok(dict),
            other => Err(other.mismatch("dictionary")),
        }
    }

    pub fn as_stream(&self) -> Result<&Stream> {
        match self {
            Self::Stream(stream) => Ok(stream),
            other => Err(other.mismatch("stream")),
        }
    }

    pub fn as_stream_mut(&mut self) -> Result<&mut Stream> {
        match self {
            Self::Stream(stream) => Ok(stream),
            other => Err(other.mismatch("stream")),
        }
    }

    pub fn as_reference(&self) -> Result<ObjRef> {
        match self {
            Self::Reference(reference) => Ok(*reference),
            other => Err(other.mismatch("reference")),
        }
    }

    /// References held directly by this value (not following them), in
    /// traversal order.
    pub fn references(&self) -> Vec<ObjRef> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references(&self, out: &mut Vec<ObjRef>) {
        match self {
            Self::Reference(reference) => out.push(*reference),
            Self::Array(items) => items.iter().for_each(|item| item.collect_references(out)),
            Self::Dictionary(dict) => dict.0.values().for_each(|v| v.collect_references(out)),
            Self::Stream(stream) => stream
                .dict
                .0
                .values()
                .for_each(|v| v.collect_references(out)),
            _ => {}
        }
    }

    /// Replace every stream nested inside this value with a reference
    /// obtained from `allocate`. A stream at the top level is left in place;
    /// only its dictionary is searched.
    ///
    /// Returns true when anything was replaced.
    pub fn hoist_inline_streams(&mut self, allocate: &mut dyn FnMut(Stream) -> ObjRef) -> bool {
        match self {
            Self::Array(items) => hoist_all(items.iter_mut(), allocate),
            Self::Dictionary(dict) => hoist_all(dict.values_mut(), allocate),
            Self::Stream(stream) => hoist_all(stream.dict.values_mut(), allocate),
            _ => false,
        }
    }
}

fn hoist_all<'a>(
    values: impl Iterator<Item = &'a mut PdfObject>,
    allocate: &mut dyn FnMut(Stream) -> ObjRef,
) -> bool {
    let mut changed = false;
    for value in values {
        if let PdfObject::Stream(stream) = value {
            // Streams inside the hoisted stream's dictionary are handled when
            // the caller visits the new object.
            let stream = std::mem::take(stream);
            *value = PdfObject::Reference(allocate(stream));
            changed = true;
        } else {
            changed |= value.hoist_inline_streams(allocate);
        }
    }
    changed
}

impl From<bool> for PdfObject {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for PdfObject {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for PdfObject {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for PdfObject {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for PdfObject {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<Name> for PdfObject {
    fn from(value: Name) -> Self {
        Self::Name(value)
    }
}

impl From<PdfString> for PdfObject {
    fn from(value: PdfString) -> Self {
        Self::String(value)
    }
}

impl From<DateTime<FixedOffset>> for PdfObject {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::Date(value)
    }
}

impl From<Vec<PdfObject>> for PdfObject {
    fn from(value: Vec<PdfObject>) -> Self {
        Self::Array(value)
    }
}

impl From<Dictionary> for PdfObject {
    fn from(value: Dictionary) -> Self {
        Self::Dictionary(value)
    }
}

impl From<Stream> for PdfObject {
    fn from(value: Stream) -> Self {
        Self::Stream(value)
    }
}

impl From<ObjRef> for PdfObject {
    fn from(value: ObjRef) -> Self {
        Self::Reference(value)
    }
}
