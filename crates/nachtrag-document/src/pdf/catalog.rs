// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Catalog accessors — key-path lookups from the document root, declared
// version handling, and the document-level associated-files array.

use std::collections::HashSet;

use nachtrag_core::error::{NachtragError, Result};
use nachtrag_core::types::{Feature, PdfVersion};
use tracing::{debug, info, warn};

use super::document::PdfDocument;
use super::object::{Dictionary, Name, ObjRef, PdfObject};

impl PdfDocument {
    pub fn catalog(&self) -> Result<&Dictionary> {
        self.get(self.root())?.as_dict()
    }

    /// Mutable catalog; marks it dirty.
    pub fn catalog_mut(&mut self) -> Result<&mut Dictionary> {
        let root = self.root();
        self.get_mut(root)?.as_dict_mut()
    }

    /// Walk `path` from the catalog, resolving one level of indirection at
    /// every step, e.g. `["Names", "EmbeddedFiles", "Names"]`.
    pub fn lookup_path(&self, path: &[&str]) -> Result<&PdfObject> {
        let mut current = self.get(self.root())?;
        for (depth, key) in path.iter().enumerate() {
            let dict = self.resolve(current)?.as_dict()?;
            current = dict.get_opt(key).ok_or_else(|| {
                NachtragError::not_found(format!("/Root/{}", path[..=depth].join("/")))
            })?;
        }
        self.resolve(current)
    }

    /// Reference of the dictionary stored under `owner[key]`.
    ///
    /// An absent entry becomes a new empty indirect dictionary; a direct
    /// dictionary is moved into its own indirect object so later edits can
    /// be tracked per object.
    pub fn ensure_indirect_dict(&mut self, owner: ObjRef, key: &str) -> Result<ObjRef> {
        let existing = self.get(owner)?.as_dict()?.get_opt(key).cloned();
        match existing {
            Some(PdfObject::Reference(reference)) => {
                self.get(reference)?.as_dict()?;
                Ok(reference)
            }
            Some(PdfObject::Dictionary(dict)) => {
                let reference = self.add_object(dict);
                self.get_mut(owner)?.as_dict_mut()?.set(key, reference);
                debug!(%owner, key, %reference, "moved direct dictionary into its own object");
                Ok(reference)
            }
            Some(other) => Err(NachtragError::TypeMismatch {
                expected: "dictionary",
                found: other.type_name(),
            }),
            None => {
                let reference = self.add_object(Dictionary::new());
                self.get_mut(owner)?.as_dict_mut()?.set(key, reference);
                Ok(reference)
            }
        }
    }

    // -- Versions -------------------------------------------------------------

    /// The newer of the header version and the catalog's `/Version`.
    pub fn declared_version(&self) -> Result<PdfVersion> {
        let header = self.header_version();
        let catalog_version = match self.catalog()?.get_opt("Version") {
            Some(PdfObject::Name(name)) => match name.to_string_lossy().parse::<PdfVersion>() {
                Ok(version) => Some(version),
                Err(err) => {
                    warn!(%err, "ignoring unparseable catalog /Version");
                    None
                }
            },
            _ => None,
        };
        Ok(catalog_version.map_or(header, |v| v.max(header)))
    }

    /// Raise the declared version to the minimum `feature` needs when it is
    /// currently lower. Never lowers it.
    pub fn require_feature(&mut self, feature: Feature) -> Result<()> {
        let required = feature.min_version();
        let declared = self.declared_version()?;
        if required > declared {
            info!(?feature, from = %declared, to = %required, "raising declared version");
            self.catalog_mut()?
                .set("Version", Name::from(required.to_string()));
        }
        Ok(())
    }

    // -- Associated files -----------------------------------------------------

    /// References in the catalog's `/AF` array, in order. Empty when absent.
    pub fn associated_files(&self) -> Result<Vec<ObjRef>> {
        let Some(af) = self.catalog()?.get_opt("AF") else {
            return Ok(Vec::new());
        };
        self.resolve(af)?
            .as_array()?
            .iter()
            .map(PdfObject::as_reference)
            .collect()
    }

    /// Append a file specification to the catalog's `/AF` array, creating
    /// the array when absent.
    pub fn append_associated_file(&mut self, spec: ObjRef) -> Result<()> {
        let target = match self.catalog()?.get_opt("AF") {
            Some(PdfObject::Reference(reference)) => Some(*reference),
            Some(PdfObject::Array(_)) | None => None,
            Some(other) => {
                return Err(NachtragError::TypeMismatch {
                    expected: "array",
                    found: other.type_name(),
                });
            }
        };

        let array = match target {
            Some(reference) => self.get_mut(reference)?.as_array_mut()?,
            None => {
                let catalog = self.catalog_mut()?;
                if !catalog.contains_key("AF") {
                    catalog.set("AF", Vec::<PdfObject>::new());
                }
                catalog.get_mut("AF")?.as_array_mut()?
            }
        };
        array.push(PdfObject::Reference(spec));
        Ok(())
    }

    // -- Pages ----------------------------------------------------------------

    /// Number of leaf pages under the catalog's `/Pages` tree.
    pub fn page_count(&self) -> Result<usize> {
        let pages = self.catalog()?.get("Pages")?.as_reference()?;
        let mut seen = HashSet::new();
        let mut stack = vec![pages];
        let mut count = 0;
        while let Some(reference) = stack.pop() {
            if !seen.insert(reference) {
                continue;
            }
            let node = self.get(reference)?.as_dict()?;
            match node.get_opt("Kids") {
                Some(kids) => {
                    for kid in self.resolve(kids)?.as_array()? {
                        stack.push(kid.as_reference()?);
                    }
                }
                None => count += 1,
            }
        }
        Ok(count)
    }
}
