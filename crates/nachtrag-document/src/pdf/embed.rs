// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Embedded files — payload streams, file specifications, and their
// registration in the `/EmbeddedFiles` name tree and the catalog's `/AF`
// array (ISO 32000-1 §7.11.3–7.11.4, ISO 32000-2 §14.13).

use chrono::{DateTime, FixedOffset};
use nachtrag_core::config::WriterConfig;
use nachtrag_core::error::{NachtragError, Result};
use nachtrag_core::types::{AfRelationship, Feature};
use nachtrag_integrity::{digest, verify_checksum};
use tracing::{debug, info, instrument};

use super::document::PdfDocument;
use super::name_tree::NameTree;
use super::object::{Dictionary, Name, ObjRef, PdfObject, PdfString, Stream};
use super::reader;

// -- Stream parameters --------------------------------------------------------

/// Optional metadata recorded under an embedded file stream's `/Params`.
///
/// `embed_size` and `embed_checksum` fall back to the writer configuration
/// when left as `None`.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedFileParams {
    pub creation_date: Option<DateTime<FixedOffset>>,
    pub modification_date: Option<DateTime<FixedOffset>>,
    pub embed_size: Option<bool>,
    pub embed_checksum: Option<bool>,
}

impl EmbeddedFileParams {
    pub fn with_dates(
        creation_date: Option<DateTime<FixedOffset>>,
        modification_date: Option<DateTime<FixedOffset>>,
    ) -> Self {
        Self {
            creation_date,
            modification_date,
            ..Self::default()
        }
    }
}

// -- Embedded file streams ----------------------------------------------------

/// An `/EmbeddedFile` stream, not yet attached to any document until
/// [`embed_file`] (or [`EmbeddedFileObject::register`]) gives it a reference.
#[derive(Debug, Clone)]
pub struct EmbeddedFileObject {
    stream: Stream,
    reference: Option<ObjRef>,
}

impl EmbeddedFileObject {
    /// Build the stream for `data`. The bytes are copied; the checksum is
    /// taken over them as given.
    pub fn from_file_data(
        config: &WriterConfig,
        data: &[u8],
        mime_type: Option<&str>,
        params: EmbeddedFileParams,
    ) -> Self {
        let mut dict = Dictionary::new();
        dict.set("Type", PdfObject::name("EmbeddedFile"));
        if let Some(mime_type) = mime_type {
            // The name serialiser writes '/' as #2f.
            dict.set("Subtype", Name::from(mime_type));
        }

        let mut param_dict = Dictionary::new();
        if params.embed_checksum.unwrap_or(config.embed_checksum) {
            param_dict.set("CheckSum", PdfString::hex(digest(data).to_vec()));
        }
        if params.embed_size.unwrap_or(config.embed_size) {
            param_dict.set("Size", data.len() as i64);
        }
        if let Some(created) = params.creation_date {
            param_dict.set("CreationDate", created);
        }
        if let Some(modified) = params.modification_date {
            param_dict.set("ModDate", modified);
        }
        if !param_dict.is_empty() {
            dict.set("Params", param_dict);
        }

        Self {
            stream: Stream::new(dict, data.to_vec()),
            reference: None,
        }
    }

    pub fn stream(&self) -> &Stream {
        &self.stream
    }

    pub fn data(&self) -> &[u8] {
        &self.stream.content
    }

    /// Reference assigned by [`EmbeddedFileObject::register`], if any.
    pub fn reference(&self) -> Option<ObjRef> {
        self.reference
    }

    /// Store the stream in `document` as an indirect object, allocating a
    /// reference on first use.
    pub fn register(&mut self, document: &mut PdfDocument) -> ObjRef {
        let reference = match self.reference {
            Some(reference) => reference,
            None => {
                let reference = document.allocate_reference();
                self.reference = Some(reference);
                reference
            }
        };
        document.set_object(reference, self.stream.clone());
        reference
    }
}

// -- File specifications ------------------------------------------------------

/// A file specification dictionary (`/Type /Filespec`).
#[derive(Debug, Clone, Default)]
pub struct FileSpec {
    /// `/F`: the file specification string.
    pub file_spec_string: String,
    /// `/UF`: unicode file name.
    pub file_name: Option<String>,
    pub embedded_data: Option<EmbeddedFileObject>,
    /// `/Desc`.
    pub description: Option<String>,
    /// `/AFRelationship`; setting it also lists the spec in the catalog `/AF`.
    pub af_relationship: Option<AfRelationship>,
}

impl FileSpec {
    pub fn new(file_spec_string: impl Into<String>) -> Self {
        Self {
            file_spec_string: file_spec_string.into(),
            ..Self::default()
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_embedded_data(mut self, embedded_data: EmbeddedFileObject) -> Self {
        self.embedded_data = Some(embedded_data);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_af_relationship(mut self, relationship: AfRelationship) -> Self {
        self.af_relationship = Some(relationship);
        self
    }

    /// The dictionary for this spec. `/UF` entries are only present when a
    /// unicode name was given.
    fn to_dictionary(&self, stream: Option<ObjRef>) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Type", PdfObject::name("Filespec"));
        dict.set("F", PdfString::text(&self.file_spec_string));
        if let Some(file_name) = &self.file_name {
            dict.set("UF", PdfString::text(file_name));
        }
        if let Some(description) = &self.description {
            dict.set("Desc", PdfString::text(description));
        }
        if let Some(relationship) = &self.af_relationship {
            dict.set("AFRelationship", Name::from(relationship.as_name()));
        }
        if let Some(stream) = stream {
            let mut ef = Dictionary::new();
            ef.set("F", stream);
            if self.file_name.is_some() {
                ef.set("UF", stream);
            }
            dict.set("EF", ef);
        }
        dict
    }
}

/// Embed `spec` and its payload in `document`, returning the reference of
/// the file specification.
///
/// The spec is always added to the `/EmbeddedFiles` name tree under its file
/// specification string; with an `/AFRelationship` it is also appended to
/// the catalog's `/AF` array, which requires PDF 2.0.
///
/// Only the association raises the declared version. Fails before touching
/// the document when the spec carries no embedded data
/// ([`NachtragError::Write`]) or the existing tree is malformed.
#[instrument(skip(document, spec), fields(file = %spec.file_spec_string))]
pub fn embed_file(document: &mut PdfDocument, spec: FileSpec) -> Result<ObjRef> {
    let Some(mut embedded) = spec.embedded_data.clone() else {
        return Err(NachtragError::Write(
            "file spec does not have an embedded file stream".into(),
        ));
    };
    // Reject a malformed tree or /AF before anything is allocated.
    let tree = NameTree::embedded_files();
    tree.validate(document)?;
    if spec.af_relationship.is_some() {
        document.associated_files()?;
    }

    let stream_ref = match embedded.reference() {
        Some(reference) => reference,
        None => document.allocate_reference(),
    };
    embedded.reference = Some(stream_ref);
    let spec_ref = document.allocate_reference();

    tree.insert(
        document,
        PdfString::text(&spec.file_spec_string),
        spec_ref,
    )?;
    if spec.af_relationship.is_some() {
        document.append_associated_file(spec_ref)?;
    }

    embedded.register(document);
    document.set_object(spec_ref, spec.to_dictionary(Some(stream_ref)));

    if spec.af_relationship.is_some() {
        document.require_feature(Feature::AssociatedFiles)?;
    }

    info!(
        %spec_ref,
        %stream_ref,
        bytes = embedded.data().len(),
        associated = spec.af_relationship.is_some(),
        "file embedded"
    );
    Ok(spec_ref)
}

// -- Read-back ----------------------------------------------------------------

/// `(file specification string, spec reference)` for every entry of the
/// `/EmbeddedFiles` tree, in tree order.
pub fn embedded_files(document: &PdfDocument) -> Result<Vec<(String, ObjRef)>> {
    NameTree::embedded_files()
        .entries(document)?
        .into_iter()
        .map(|(key, value)| Ok((key.to_text(), value.as_reference()?)))
        .collect()
}

/// An embedded file as read back from a document.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedFile {
    pub file_spec_string: String,
    pub file_name: Option<String>,
    pub description: Option<String>,
    pub af_relationship: Option<AfRelationship>,
    /// Decoded `/Subtype` of the stream, e.g. `application/pdf`.
    pub mime_type: Option<String>,
    /// Payload with any stream filters removed.
    pub data: Vec<u8>,
    pub size: Option<i64>,
    pub checksum: Option<Vec<u8>>,
    pub creation_date: Option<DateTime<FixedOffset>>,
    pub modification_date: Option<DateTime<FixedOffset>>,
    pub stream_ref: ObjRef,
}

impl EmbeddedFile {
    /// Read the file specification at `spec_ref` and its embedded stream.
    pub fn read(document: &PdfDocument, spec_ref: ObjRef) -> Result<Self> {
        let spec = document.get(spec_ref)?.as_dict()?;
        let text = |key: &str| -> Result<Option<String>> {
            spec.get_opt(key)
                .map(|value| document.resolve(value)?.as_text())
                .transpose()
        };

        let ef = document.resolve(spec.get("EF")?)?.as_dict()?;
        let stream_ref = ef
            .get_opt("UF")
            .or_else(|| ef.get_opt("F"))
            .ok_or_else(|| NachtragError::not_found(format!("/EF stream of {spec_ref}")))?
            .as_reference()?;
        let stream = document.get(stream_ref)?.as_stream()?;
        let data = reader::decode_stream(stream)?;

        let mime_type = stream
            .dict
            .get_opt("Subtype")
            .map(|subtype| subtype.as_name().map(Name::to_string_lossy))
            .transpose()?;

        let (mut size, mut checksum, mut creation_date, mut modification_date) =
            (None, None, None, None);
        if let Some(params) = stream.dict.get_opt("Params") {
            let params = document.resolve(params)?.as_dict()?;
            if let Some(value) = params.get_opt("Size") {
                size = Some(document.resolve(value)?.as_i64()?);
            }
            if let Some(value) = params.get_opt("CheckSum") {
                checksum = Some(document.resolve(value)?.as_string()?.as_bytes().to_vec());
            }
            if let Some(value) = params.get_opt("CreationDate") {
                creation_date = Some(document.resolve(value)?.as_date()?);
            }
            if let Some(value) = params.get_opt("ModDate") {
                modification_date = Some(document.resolve(value)?.as_date()?);
            }
        }

        let af_relationship = spec
            .get_opt("AFRelationship")
            .map(|value| value.as_name().map(|name| AfRelationship::from_name(&name.to_string_lossy())))
            .transpose()?;

        debug!(%spec_ref, %stream_ref, bytes = data.len(), "embedded file read");
        Ok(Self {
            file_spec_string: text("F")?.unwrap_or_default(),
            file_name: text("UF")?,
            description: text("Desc")?,
            af_relationship,
            mime_type,
            data,
            size,
            checksum,
            creation_date,
            modification_date,
            stream_ref,
        })
    }

    /// Check the payload against the recorded `/CheckSum` and `/Size`.
    pub fn verify(&self) -> Result<()> {
        if let Some(expected) = &self.checksum {
            verify_checksum(&self.data, expected)?;
        }
        if let Some(size) = self.size {
            if size != self.data.len() as i64 {
                return Err(NachtragError::IntegrityMismatch {
                    expected: format!("{size} bytes"),
                    actual: format!("{} bytes", self.data.len()),
                });
            }
        }
        Ok(())
    }
}
