// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// nachtrag-document — PDF object graph and revision writer for Nachtrag.
//
// Provides an in-memory object table over a PDF, catalog and name-tree
// accessors, embedded files (with checksums, dates, and the `/AF` array), and
// a writer producing either complete files or append-only incremental
// revisions on top of bytes parsed with `lopdf`.

pub mod pdf;

// Re-export the primary types so callers can use `nachtrag_document::PdfWriter` etc.
pub use pdf::document::PdfDocument;
pub use pdf::embed::{EmbeddedFile, EmbeddedFileObject, EmbeddedFileParams, FileSpec, embed_file};
pub use pdf::reader::PdfReader;
pub use pdf::writer::{PdfWriter, WriteMode};
