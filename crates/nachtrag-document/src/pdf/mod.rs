// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — object model, catalog and name-tree access, embedded files,
// and the full/incremental writer.

pub mod catalog;
pub mod date;
pub mod document;
pub mod embed;
pub mod name_tree;
pub mod object;
pub mod reader;
pub mod serialize;
pub mod writer;
pub mod xref;

pub use document::PdfDocument;
pub use embed::{EmbeddedFile, EmbeddedFileObject, EmbeddedFileParams, FileSpec, embed_file};
pub use name_tree::NameTree;
pub use object::{Dictionary, Name, ObjRef, PdfObject, PdfString, Stream};
pub use reader::PdfReader;
pub use writer::{PdfWriter, WriteMode};
