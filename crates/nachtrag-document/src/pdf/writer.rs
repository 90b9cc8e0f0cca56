// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — serialise a document either as a complete file or as an
// incremental revision appended to the bytes it was read from.
//
// An incremental revision copies the prior bytes verbatim, then writes only
// the objects changed since, an xref section covering exactly those, and a
// trailer whose `/Prev` points at the previous xref section.

use std::fs;
use std::io::Write;
use std::path::Path;

use nachtrag_core::config::WriterConfig;
use nachtrag_core::error::Result;
use nachtrag_integrity::{digest, hash_bytes};
use tracing::{debug, info, instrument};

use super::document::PdfDocument;
use super::embed::{self, EmbeddedFileObject, EmbeddedFileParams, FileSpec};
use super::object::{Dictionary, ObjRef, PdfObject, PdfString, Stream};
use super::reader::PdfReader;
use super::serialize;
use super::xref::XrefSection;

/// Marker comment after the header so transfer tools treat the file as binary.
const BINARY_MARKER: &[u8] = b"%\xE2\xE3\xCF\xD3\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Every reachable object, fresh xref and trailer.
    Full,
    /// Only objects changed since the base revision, appended to it.
    Incremental,
}

/// The revision a session appends to.
#[derive(Debug, Clone)]
struct Revision {
    bytes: Vec<u8>,
    xref_offset: usize,
}

/// A writer session owning one document.
pub struct PdfWriter {
    document: PdfDocument,
    config: WriterConfig,
    /// Present in incremental mode.
    base: Option<Revision>,
}

impl PdfWriter {
    // -- Construction ---------------------------------------------------------

    /// Full-mode writer for a fresh one-page document.
    pub fn new(config: WriterConfig) -> Self {
        let mut document = PdfDocument::new(config.default_version);
        if let Some(producer) = &config.producer {
            let mut info = Dictionary::new();
            info.set("Producer", PdfString::text(producer));
            let info_ref = document.add_object(info);
            document.set_info(info_ref);
        }
        Self {
            document,
            config,
            base: None,
        }
    }

    /// Incremental writer on top of `bytes` with the default configuration.
    pub fn incremental(bytes: &[u8]) -> Result<Self> {
        Self::incremental_with_config(bytes, WriterConfig::default())
    }

    pub fn incremental_with_config(bytes: &[u8], config: WriterConfig) -> Result<Self> {
        PdfReader::from_bytes(bytes)?.into_incremental_writer(config)
    }

    pub(crate) fn from_document(document: PdfDocument, config: WriterConfig) -> Self {
        Self {
            document,
            config,
            base: None,
        }
    }

    pub(crate) fn from_base(
        document: PdfDocument,
        config: WriterConfig,
        bytes: Vec<u8>,
        xref_offset: usize,
    ) -> Self {
        Self {
            document,
            config,
            base: Some(Revision { bytes, xref_offset }),
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn mode(&self) -> WriteMode {
        match self.base {
            Some(_) => WriteMode::Incremental,
            None => WriteMode::Full,
        }
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    pub fn document(&self) -> &PdfDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut PdfDocument {
        &mut self.document
    }

    /// Payload stream for `data` built with this session's configuration.
    pub fn embedded_file_object(
        &self,
        data: &[u8],
        mime_type: Option<&str>,
        params: EmbeddedFileParams,
    ) -> EmbeddedFileObject {
        EmbeddedFileObject::from_file_data(&self.config, data, mime_type, params)
    }

    /// Embed a file into this session's document. See [`embed::embed_file`].
    pub fn embed_file(&mut self, spec: FileSpec) -> Result<ObjRef> {
        embed::embed_file(&mut self.document, spec)
    }

    // -- Output ---------------------------------------------------------------

    /// Serialise the document.
    ///
    /// In incremental mode the result always starts with the previous output
    /// of this session (or the base bytes on the first call), and the session
    /// then continues from the returned bytes.
    #[instrument(skip(self), fields(mode = ?self.mode()))]
    pub fn write(&mut self) -> Result<Vec<u8>> {
        self.hoist_inline_streams();

        let (mut out, order, mut section, prev) = match &self.base {
            Some(base) => {
                let dirty = self.document.dirty_references();
                if dirty.is_empty() {
                    debug!("nothing changed since the last revision");
                    return Ok(base.bytes.clone());
                }
                let mut out = base.bytes.clone();
                if !out.ends_with(b"\n") && !out.ends_with(b"\r") {
                    out.push(b'\n');
                }
                (out, dirty, XrefSection::new(), Some(base.xref_offset))
            }
            None => {
                let mut out = format!("%PDF-{}\n", self.document.declared_version()?).into_bytes();
                out.extend_from_slice(BINARY_MARKER);
                let mut order = self.document.reachable();
                order.sort();
                (out, order, XrefSection::with_free_head(), None)
            }
        };

        let body_start = out.len();
        for &reference in &order {
            section.add(reference, out.len());
            serialize::write_indirect(&mut out, reference, self.document.get(reference)?);
        }

        let body_digest = PdfString::hex(digest(&out[body_start..]).to_vec());
        let id = [
            self.document
                .trailer_id()
                .map_or_else(|| body_digest.clone(), |id| id[0].clone()),
            body_digest,
        ];
        self.document.set_trailer_id(id.clone());

        let xref_offset = out.len();
        section.write(&mut out);

        let mut trailer = Dictionary::new();
        trailer.set("Size", self.document.size());
        trailer.set("Root", self.document.root());
        if let Some(info) = self.document.info() {
            trailer.set("Info", info);
        }
        trailer.set("ID", id.into_iter().map(PdfObject::String).collect::<Vec<_>>());
        if let Some(prev) = prev {
            trailer.set("Prev", prev as i64);
        }
        out.extend_from_slice(b"trailer\n");
        serialize::write_object(&mut out, &PdfObject::Dictionary(trailer));
        out.extend_from_slice(format!("\nstartxref\n{}\n%%EOF\n", xref_offset).as_bytes());

        info!(
            objects = order.len(),
            bytes = out.len(),
            xref_offset,
            sha256 = %hash_bytes(&out),
            "revision written"
        );

        if let Some(base) = &mut self.base {
            base.bytes = out.clone();
            base.xref_offset = xref_offset;
        }
        self.document.commit();
        Ok(out)
    }

    /// [`PdfWriter::write`] into `sink`, returning the byte count.
    pub fn write_to(&mut self, mut sink: impl Write) -> Result<usize> {
        let bytes = self.write()?;
        sink.write_all(&bytes)?;
        Ok(bytes.len())
    }

    /// [`PdfWriter::write`] to a file, replacing it.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn write_to_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let bytes = self.write()?;
        fs::write(path.as_ref(), &bytes)?;
        Ok(bytes.len())
    }

    // -- Helpers --------------------------------------------------------------

    /// Move streams nested inside the objects about to be written into their
    /// own indirect objects, depth-first from the catalog. New streams are
    /// visited right after the object they came from.
    fn hoist_inline_streams(&mut self) {
        let mut candidates = self.document.reachable();
        if self.base.is_some() {
            let reached: Vec<ObjRef> = candidates;
            candidates = reached
                .iter()
                .copied()
                .filter(|reference| self.document.is_dirty(*reference))
                .collect();
            candidates.extend(
                self.document
                    .dirty_references()
                    .into_iter()
                    .filter(|reference| !reached.contains(reference)),
            );
        }

        let mut stack: Vec<ObjRef> = candidates.into_iter().rev().collect();
        while let Some(reference) = stack.pop() {
            let Some(mut object) = self.document.take_object(reference) else {
                continue;
            };
            let mut hoisted = Vec::new();
            let document = &mut self.document;
            let changed = object.hoist_inline_streams(&mut |stream: Stream| {
                let stream_ref = document.add_object(stream);
                hoisted.push(stream_ref);
                stream_ref
            });
            self.document.put_back(reference, object);
            if changed {
                self.document.mark_dirty(reference);
                debug!(%reference, streams = hoisted.len(), "hoisted inline streams");
            }
            stack.extend(hoisted.into_iter().rev());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::embed::{EmbeddedFile, embedded_files};
    use crate::pdf::object::Name;
    use crate::pdf::xref::find_startxref;
    use chrono::{Duration, FixedOffset, TimeZone};
    use nachtrag_core::types::{AfRelationship, PdfVersion};
    use lopdf::dictionary;

    fn payload_spec(name: &str, data: &[u8]) -> FileSpec {
        let ef = EmbeddedFileObject::from_file_data(
            &WriterConfig::default(),
            data,
            Some("application/pdf"),
            EmbeddedFileParams::default(),
        );
        FileSpec::new(name).with_embedded_data(ef)
    }

    fn base_pdf() -> Vec<u8> {
        PdfWriter::new(WriterConfig::default()).write().unwrap()
    }

    /// A one-page file written by lopdf rather than by this crate.
    fn lopdf_base(version: &str) -> Vec<u8> {
        let mut doc = lopdf::Document::with_version(version);
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(lopdf::dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        doc.objects.insert(
            pages_id,
            lopdf::Object::Dictionary(lopdf::dictionary! {
                "Type" => "Pages",
                "Kids" => vec![lopdf::Object::Reference(page_id)],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(lopdf::dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut base = Vec::new();
        doc.save_to(&mut base).unwrap();
        base
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    fn last_trailer(bytes: &[u8]) -> String {
        let start = bytes
            .windows(7)
            .rposition(|w| w == b"trailer")
            .unwrap();
        String::from_utf8_lossy(&bytes[start..]).into_owned()
    }

    #[test]
    fn full_write_reads_back_in_lopdf() {
        let out = base_pdf();
        assert!(out.starts_with(b"%PDF-1.7\n"));
        assert!(out.ends_with(b"%%EOF\n"));

        let doc = lopdf::Document::load_mem(&out).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        assert!(doc.trailer.get(b"ID").is_ok());
        assert!(last_trailer(&out).contains("/Size 4"));
    }

    #[test]
    fn full_writes_are_deterministic() {
        assert_eq!(base_pdf(), base_pdf());
    }

    #[test]
    fn producer_goes_into_the_info_dictionary() {
        let config = WriterConfig {
            producer: Some("nachtrag".into()),
            ..WriterConfig::default()
        };
        let mut writer = PdfWriter::new(config);
        let out = writer.write().unwrap();

        let doc = lopdf::Document::load_mem(&out).unwrap();
        let info = match doc.trailer.get(b"Info").unwrap() {
            lopdf::Object::Reference(id) => doc.get_dictionary(*id).unwrap(),
            other => panic!("unexpected /Info: {other:?}"),
        };
        assert!(matches!(info.get(b"Producer").unwrap(), lopdf::Object::String(bytes, _) if bytes == b"nachtrag"));
    }

    #[test]
    fn incremental_write_appends_only_changed_objects() {
        let base = base_pdf();
        let base_xref = find_startxref(&base).unwrap();

        let mut writer = PdfWriter::incremental(&base).unwrap();
        assert_eq!(writer.mode(), WriteMode::Incremental);
        writer.embed_file(payload_spec("vector-test.pdf", b"payload")).unwrap();
        let out = writer.write().unwrap();

        assert!(out.starts_with(&base));
        assert!(last_trailer(&out).contains(&format!("/Prev {base_xref}")));
        // The untouched page object is written exactly once, by the base.
        assert_eq!(contains(&out, b"\n3 0 obj\n"), 1);
        assert_eq!(contains(&out, b"\n1 0 obj\n"), 2);

        let doc = lopdf::Document::load_mem(&out).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn embedded_file_survives_a_round_trip() {
        let data = b"%PDF-1.7\n% embedded payload\n%%EOF\n".to_vec();
        let modified = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2020, 11, 1, 0, 0, 0)
            .unwrap();
        let created = modified - Duration::days(1);
        let ef = EmbeddedFileObject::from_file_data(
            &WriterConfig::default(),
            &data,
            Some("application/pdf"),
            EmbeddedFileParams::with_dates(Some(created), Some(modified)),
        );
        let spec = FileSpec::new("vector-test.pdf")
            .with_file_name("テスト.pdf")
            .with_description("Embedding test")
            .with_embedded_data(ef);

        let mut writer = PdfWriter::incremental(&base_pdf()).unwrap();
        writer.embed_file(spec).unwrap();
        let out = writer.write().unwrap();
        assert_eq!(contains(&out, b"/Subtype /application#2fpdf"), 1);

        let document = PdfReader::from_bytes(&out).unwrap().to_document().unwrap();
        let listed = embedded_files(&document).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].0, "vector-test.pdf");

        let file = EmbeddedFile::read(&document, listed[0].1).unwrap();
        file.verify().unwrap();
        assert_eq!(file.data, data);
        assert_eq!(file.checksum.as_deref(), Some(digest(&data).as_slice()));
        assert_eq!(file.file_name.as_deref(), Some("テスト.pdf"));
        assert_eq!(file.description.as_deref(), Some("Embedding test"));
        assert_eq!(file.creation_date, Some(created));
        assert_eq!(file.modification_date, Some(modified));
        assert!(document.catalog().unwrap().get_opt("AF").is_none());
        assert_eq!(document.declared_version().unwrap(), PdfVersion::V1_7);
    }

    #[test]
    fn repeated_incremental_writes_extend_each_other() {
        let mut writer = PdfWriter::incremental(&base_pdf()).unwrap();
        writer.embed_file(payload_spec("a.pdf", b"first")).unwrap();
        let first = writer.write().unwrap();
        assert!(writer.document().dirty_references().is_empty());

        writer.embed_file(payload_spec("b.pdf", b"second")).unwrap();
        let second = writer.write().unwrap();
        assert!(second.starts_with(&first));
        let first_xref = find_startxref(&first).unwrap();
        assert!(last_trailer(&second).contains(&format!("/Prev {first_xref}")));

        let document = PdfReader::from_bytes(&second).unwrap().to_document().unwrap();
        let names: Vec<String> = embedded_files(&document)
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf"]);

        // The trailer /ID keeps its first element across revisions.
        let base_id = PdfReader::from_bytes(&first).unwrap().to_document().unwrap();
        assert_eq!(
            base_id.trailer_id().unwrap()[0],
            document.trailer_id().unwrap()[0]
        );
        assert_ne!(
            base_id.trailer_id().unwrap()[1],
            document.trailer_id().unwrap()[1]
        );
    }

    #[test]
    fn unchanged_sessions_return_the_previous_output() {
        let base = base_pdf();
        let mut writer = PdfWriter::incremental(&base).unwrap();
        assert_eq!(writer.write().unwrap(), base);
    }

    #[test]
    fn association_bumps_the_declared_version() {
        let mut writer = PdfWriter::incremental(&base_pdf()).unwrap();
        let ef = writer.embedded_file_object(b"payload", None, EmbeddedFileParams::default());
        let spec = FileSpec::new("vector-test.pdf")
            .with_embedded_data(ef)
            .with_description("Embedding test /w assoc file")
            .with_af_relationship(AfRelationship::Unspecified);
        let spec_ref = writer.embed_file(spec).unwrap();
        let out = writer.write().unwrap();

        let document = PdfReader::from_bytes(&out).unwrap().to_document().unwrap();
        assert_eq!(document.associated_files().unwrap(), vec![spec_ref]);
        assert_eq!(embedded_files(&document).unwrap()[0].1, spec_ref);
        assert_eq!(document.declared_version().unwrap(), PdfVersion::V2_0);
        assert!(document.get(spec_ref).unwrap().as_dict().unwrap().get_opt("UF").is_none());
    }

    #[test]
    fn lopdf_produced_bases_accept_revisions() {
        let base = lopdf_base("1.4");
        let mut writer = PdfWriter::incremental(&base).unwrap();
        writer.embed_file(payload_spec("attached.bin", b"\x00\x01\x02")).unwrap();
        let out = writer.write().unwrap();
        assert!(out.starts_with(&base));

        let document = PdfReader::from_bytes(&out).unwrap().to_document().unwrap();
        assert_eq!(document.page_count().unwrap(), 1);
        let (_, spec_ref) = embedded_files(&document).unwrap().remove(0);
        assert_eq!(EmbeddedFile::read(&document, spec_ref).unwrap().data, b"\x00\x01\x02");
    }

    #[test]
    fn inline_streams_are_hoisted_before_writing() {
        let mut writer = PdfWriter::new(WriterConfig::default());
        let mut holder = Dictionary::new();
        holder.set("Inline", Stream::new(Dictionary::new(), b"inline".to_vec()));
        writer
            .document_mut()
            .catalog_mut()
            .unwrap()
            .set("Extra", holder);
        let out = writer.write().unwrap();

        let extra = writer.document().catalog().unwrap().get("Extra").unwrap();
        let hoisted = extra.as_dict().unwrap().get("Inline").unwrap().as_reference().unwrap();
        assert_eq!(hoisted, ObjRef::new(4, 0));
        assert!(writer.document().get(hoisted).unwrap().as_stream().is_ok());
        assert_eq!(contains(&out, b"/Inline 4 0 R"), 1);
        lopdf::Document::load_mem(&out).unwrap();
    }

    #[test]
    fn copying_into_a_full_writer_rewrites_everything() {
        let mut writer = PdfWriter::incremental(&base_pdf()).unwrap();
        writer.embed_file(payload_spec("a.pdf", b"first")).unwrap();
        let incremental = writer.write().unwrap();

        let mut full = PdfReader::from_bytes(&incremental)
            .unwrap()
            .into_full_writer(WriterConfig::default())
            .unwrap();
        assert_eq!(full.mode(), WriteMode::Full);
        let out = full.write().unwrap();
        assert_eq!(contains(&out, b"%%EOF"), 1);
        assert_eq!(contains(&out, b"\n1 0 obj\n"), 1);

        let document = PdfReader::from_bytes(&out).unwrap().to_document().unwrap();
        assert_eq!(embedded_files(&document).unwrap().len(), 1);
        assert_eq!(
            document.catalog().unwrap().get("Type").unwrap().as_name().unwrap(),
            &Name::from("Catalog")
        );
    }

    #[test]
    fn write_to_file_and_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        let mut writer = PdfWriter::new(WriterConfig::default());
        let written = writer.write_to_file(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap().len(), written);

        let mut sink = Vec::new();
        let mut writer = PdfWriter::new(WriterConfig::default());
        assert_eq!(writer.write_to(&mut sink).unwrap(), sink.len());
        assert_eq!(sink, std::fs::read(&path).unwrap());
    }

    #[test]
    fn embedded_files_keep_their_embed_order() {
        let mut writer = PdfWriter::incremental(&base_pdf()).unwrap();
        let first = writer.embed_file(payload_spec("vector-test.pdf", b"first")).unwrap();
        let second = writer
            .embed_file(payload_spec("some-other-file.pdf", b"second"))
            .unwrap();
        let out = writer.write().unwrap();

        let document = PdfReader::from_bytes(&out).unwrap().to_document().unwrap();
        assert_eq!(
            embedded_files(&document).unwrap(),
            vec![
                ("vector-test.pdf".to_owned(), first),
                ("some-other-file.pdf".to_owned(), second),
            ]
        );
        let names = document
            .lookup_path(&["Names", "EmbeddedFiles", "Names"])
            .unwrap()
            .as_array()
            .unwrap();
        assert_eq!(names[0].as_text().unwrap(), "vector-test.pdf");
        assert_eq!(names[2].as_text().unwrap(), "some-other-file.pdf");
    }

    #[test]
    fn unicode_names_leave_a_1_4_base_at_1_4() {
        let base = lopdf_base("1.4");
        let mut writer = PdfWriter::incremental(&base).unwrap();
        let spec = payload_spec("vector-test.pdf", b"payload").with_file_name("テスト.pdf");
        writer.embed_file(spec).unwrap();
        let out = writer.write().unwrap();
        assert!(out.starts_with(b"%PDF-1.4"));

        let document = PdfReader::from_bytes(&out).unwrap().to_document().unwrap();
        assert_eq!(document.declared_version().unwrap(), PdfVersion::V1_4);
        assert!(document.catalog().unwrap().get_opt("Version").is_none());
        let (_, spec_ref) = embedded_files(&document).unwrap().remove(0);
        let file = EmbeddedFile::read(&document, spec_ref).unwrap();
        assert_eq!(file.file_name.as_deref(), Some("テスト.pdf"));
    }

    #[test]
    fn full_mode_embed_reads_back() {
        let mut writer = PdfReader::from_bytes(&base_pdf())
            .unwrap()
            .into_full_writer(WriterConfig::default())
            .unwrap();
        let modified = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2020, 11, 1, 0, 0, 0)
            .unwrap();
        let created = modified - Duration::days(1);
        let data = b"%PDF-1.7\n% full mode payload\n%%EOF\n".to_vec();
        let ef = writer.embedded_file_object(
            &data,
            Some("application/pdf"),
            EmbeddedFileParams::with_dates(Some(created), Some(modified)),
        );
        let spec = FileSpec::new("vector-test.pdf")
            .with_file_name("テスト.pdf")
            .with_description("Embedding test")
            .with_embedded_data(ef);
        writer.embed_file(spec).unwrap();
        let out = writer.write().unwrap();

        assert!(out.starts_with(b"%PDF-1.7\n"));
        assert_eq!(contains(&out, b"%%EOF"), 1);
        assert_eq!(contains(&out, b"/Subtype /application#2fpdf"), 1);
        lopdf::Document::load_mem(&out).unwrap();

        let document = PdfReader::from_bytes(&out).unwrap().to_document().unwrap();
        let listed = embedded_files(&document).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].0, "vector-test.pdf");
        let file = EmbeddedFile::read(&document, listed[0].1).unwrap();
        file.verify().unwrap();
        assert_eq!(file.data, data);
        assert_eq!(file.file_name.as_deref(), Some("テスト.pdf"));
        assert_eq!(file.description.as_deref(), Some("Embedding test"));
        assert_eq!(file.mime_type.as_deref(), Some("application/pdf"));
        assert_eq!(file.creation_date, Some(created));
        assert_eq!(file.modification_date, Some(modified));
        assert!(document.catalog().unwrap().get_opt("AF").is_none());
        assert_eq!(document.declared_version().unwrap(), PdfVersion::V1_7);
    }

    #[test]
    fn full_mode_association_writes_a_2_0_header() {
        let mut writer = PdfWriter::new(WriterConfig::default());
        let ef = writer.embedded_file_object(b"payload", None, EmbeddedFileParams::default());
        let spec = FileSpec::new("vector-test.pdf")
            .with_embedded_data(ef)
            .with_description("Embedding test /w assoc file")
            .with_af_relationship(AfRelationship::Unspecified);
        writer.embed_file(spec).unwrap();
        let out = writer.write().unwrap();
        assert!(out.starts_with(b"%PDF-2.0\n"));

        let document = PdfReader::from_bytes(&out).unwrap().to_document().unwrap();
        let listed = embedded_files(&document).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(document.associated_files().unwrap(), vec![listed[0].1]);
        assert_eq!(document.declared_version().unwrap(), PdfVersion::V2_0);
        let file = EmbeddedFile::read(&document, listed[0].1).unwrap();
        assert_eq!(file.af_relationship, Some(AfRelationship::Unspecified));
        assert_eq!(file.data, b"payload");
    }

    #[test]
    fn embedded_file_objects_follow_the_writer_config() {
        let writer = PdfWriter::new(WriterConfig {
            embed_checksum: false,
            ..WriterConfig::default()
        });
        let ef = writer.embedded_file_object(b"abc", Some("text/plain"), EmbeddedFileParams::default());
        assert!(ef.reference().is_none());
        let params = ef.stream().dict.get("Params").unwrap().as_dict().unwrap();
        assert_eq!(params.get("Size").unwrap().as_i64().unwrap(), 3);
        assert!(params.get_opt("CheckSum").is_none());

        let writer = PdfWriter::new(WriterConfig::default());
        let ef = writer.embedded_file_object(b"abc", None, EmbeddedFileParams::default());
        let params = ef.stream().dict.get("Params").unwrap().as_dict().unwrap();
        assert_eq!(params.get("CheckSum").unwrap().as_string().unwrap().as_bytes(), &digest(b"abc"));
    }
}
