// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — parse an existing revision with `lopdf` and lift it into the
// in-memory object table, keeping the original bytes and `startxref` offset
// so later revisions can be appended to it.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Document, Object, ObjectId};
use nachtrag_core::config::WriterConfig;
use nachtrag_core::error::{NachtragError, Result};
use nachtrag_core::types::PdfVersion;
use tracing::{debug, info, instrument, warn};

use super::document::PdfDocument;
use super::object::{Dictionary, Name, ObjRef, PdfObject, PdfString, StringFormat, Stream};
use super::writer::PdfWriter;
use super::xref;

/// A parsed base revision.
///
/// Wraps `lopdf::Document` together with the exact bytes it was parsed from;
/// those bytes are what an incremental writer appends to.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
    bytes: Vec<u8>,
    /// Offset of the last cross-reference section.
    startxref: usize,
    /// Source path, if opened from a file (useful for diagnostics).
    source_path: Option<String>,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let bytes = std::fs::read(path_ref)?;
        let mut reader = Self::from_bytes(&bytes)?;
        reader.source_path = Some(path_ref.display().to_string());
        Ok(reader)
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let startxref = xref::find_startxref(data)?;
        let document = Document::load_mem(data).map_err(|err| {
            NachtragError::Parse(format!("failed to load PDF from memory: {}", err))
        })?;

        if document.trailer.get(b"Encrypt").is_ok() {
            return Err(NachtragError::Unsupported(
                "encrypted documents cannot be updated".into(),
            ));
        }

        debug!(
            pages = document.get_pages().len(),
            objects = document.objects.len(),
            startxref,
            "PDF loaded from bytes"
        );

        Ok(Self {
            document,
            bytes: data.to_vec(),
            startxref,
            source_path: None,
        })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Return the source path if the reader was created via [`PdfReader::open`].
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    pub fn startxref(&self) -> usize {
        self.startxref
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Header version; unparseable headers fall back to the default.
    pub fn version(&self) -> PdfVersion {
        match self.document.version.parse() {
            Ok(version) => version,
            Err(err) => {
                warn!(header = %self.document.version, %err, "unrecognised header version");
                PdfVersion::default()
            }
        }
    }

    // -- Conversion -----------------------------------------------------------

    /// Copy every object of the revision into a [`PdfDocument`]. Nothing in
    /// the result is dirty.
    pub fn to_document(&self) -> Result<PdfDocument> {
        let trailer = &self.document.trailer;

        let root = match trailer.get(b"Root") {
            Ok(Object::Reference(id)) => to_ref(*id),
            _ => return Err(NachtragError::Parse("trailer has no /Root reference".into())),
        };
        let info = match trailer.get(b"Info") {
            Ok(Object::Reference(id)) => Some(to_ref(*id)),
            _ => None,
        };
        let id = match trailer.get(b"ID") {
            Ok(Object::Array(items)) => match items.as_slice() {
                [Object::String(first, _), Object::String(second, _)] => {
                    Some([PdfString::hex(first.clone()), PdfString::hex(second.clone())])
                }
                _ => None,
            },
            _ => None,
        };
        let size = trailer
            .get(b"Size")
            .ok()
            .and_then(|size| size.as_i64().ok())
            .and_then(|size| u32::try_from(size).ok())
            .unwrap_or(0);

        let objects: BTreeMap<ObjRef, PdfObject> = self
            .document
            .objects
            .iter()
            .map(|(id, object)| (to_ref(*id), from_lopdf(object)))
            .collect();

        debug!(objects = objects.len(), %root, size, "revision lifted into object table");
        Ok(PdfDocument::from_committed(
            objects,
            root,
            info,
            id,
            self.version(),
            size,
        ))
    }

    /// Writer that appends a new revision to these bytes.
    pub fn into_incremental_writer(self, config: WriterConfig) -> Result<PdfWriter> {
        let document = self.to_document()?;
        Ok(PdfWriter::from_base(document, config, self.bytes, self.startxref))
    }

    /// Writer that re-serialises the whole document from scratch.
    pub fn into_full_writer(self, config: WriterConfig) -> Result<PdfWriter> {
        let document = self.to_document()?;
        Ok(PdfWriter::from_document(document, config))
    }
}

// -- Stream decoding ----------------------------------------------------------

/// Content of `stream` with its filters removed.
pub(crate) fn decode_stream(stream: &Stream) -> Result<Vec<u8>> {
    if !stream.is_filtered() {
        return Ok(stream.content.clone());
    }
    let mut dict = lopdf::Dictionary::new();
    for key in ["Filter", "DecodeParms"] {
        if let Some(value) = stream.dict.get_opt(key) {
            dict.set(key, to_lopdf(value));
        }
    }
    lopdf::Stream::new(dict, stream.content.clone())
        .decompressed_content()
        .map_err(|err| NachtragError::Unsupported(format!("cannot decode stream: {}", err)))
}

// -- Object conversion --------------------------------------------------------

fn to_ref((number, generation): ObjectId) -> ObjRef {
    ObjRef::new(number, generation)
}

fn from_lopdf(object: &Object) -> PdfObject {
    match object {
        Object::Null => PdfObject::Null,
        Object::Boolean(value) => PdfObject::Boolean(*value),
        Object::Integer(value) => PdfObject::Integer(*value),
        Object::Real(value) => PdfObject::Real(f64::from(*value)),
        Object::Name(name) => PdfObject::Name(Name::new(name.clone())),
        Object::String(bytes, lopdf::StringFormat::Hexadecimal) => {
            PdfObject::String(PdfString::hex(bytes.clone()))
        }
        Object::String(bytes, _) => PdfObject::String(PdfString::literal(bytes.clone())),
        Object::Array(items) => PdfObject::Array(items.iter().map(from_lopdf).collect()),
        Object::Dictionary(dict) => PdfObject::Dictionary(dict_from_lopdf(dict)),
        Object::Stream(stream) => PdfObject::Stream(Stream::new(
            dict_from_lopdf(&stream.dict),
            stream.content.clone(),
        )),
        Object::Reference(id) => PdfObject::Reference(to_ref(*id)),
    }
}

fn dict_from_lopdf(dict: &lopdf::Dictionary) -> Dictionary {
    dict.iter()
        .map(|(key, value)| (Name::new(key.clone()), from_lopdf(value)))
        .collect()
}

fn to_lopdf(object: &PdfObject) -> Object {
    match object {
        PdfObject::Null => Object::Null,
        PdfObject::Boolean(value) => Object::Boolean(*value),
        PdfObject::Integer(value) => Object::Integer(*value),
        PdfObject::Real(value) => Object::Real(*value as f32),
        PdfObject::Name(name) => Object::Name(name.as_bytes().to_vec()),
        PdfObject::String(string) => {
            let format = match string.format() {
                StringFormat::Literal => lopdf::StringFormat::Literal,
                StringFormat::Hexadecimal => lopdf::StringFormat::Hexadecimal,
            };
            Object::String(string.as_bytes().to_vec(), format)
        }
        PdfObject::Date(date) => Object::String(
            super::date::encode_date(date).into_bytes(),
            lopdf::StringFormat::Literal,
        ),
        PdfObject::Array(items) => Object::Array(items.iter().map(to_lopdf).collect()),
        PdfObject::Dictionary(dict) => Object::Dictionary(dict_to_lopdf(dict)),
        PdfObject::Stream(stream) => Object::Stream(lopdf::Stream::new(
            dict_to_lopdf(&stream.dict),
            stream.content.clone(),
        )),
        PdfObject::Reference(reference) => {
            Object::Reference((reference.number, reference.generation))
        }
    }
}

fn dict_to_lopdf(dict: &Dictionary) -> lopdf::Dictionary {
    let mut out = lopdf::Dictionary::new();
    for (key, value) in dict.iter() {
        out.set(key.as_bytes().to_vec(), to_lopdf(value));
    }
    out
}
