// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document object table — the arena of indirect objects, the reference
// allocator, and dirty tracking for incremental revisions.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use nachtrag_core::error::{NachtragError, Result};
use nachtrag_core::types::PdfVersion;
use tracing::{debug, warn};

use super::object::{Dictionary, ObjRef, PdfObject, PdfString};

/// A PDF document held in memory as a table of indirect objects.
///
/// Every object written since the last committed revision (new or fetched
/// through [`PdfDocument::get_mut`]) is tracked as dirty; the incremental
/// writer serialises exactly that set.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    objects: BTreeMap<ObjRef, PdfObject>,
    dirty: BTreeSet<ObjRef>,
    /// Next object number handed out by [`PdfDocument::allocate_reference`].
    next_number: u32,
    root: ObjRef,
    info: Option<ObjRef>,
    /// Trailer `/ID` pair, when the document has one.
    id: Option<[PdfString; 2]>,
    header_version: PdfVersion,
}

impl PdfDocument {
    // -- Construction ---------------------------------------------------------

    /// Create a minimal document: catalog, page tree, and one blank A4 page.
    pub fn new(version: PdfVersion) -> Self {
        let mut document = Self {
            objects: BTreeMap::new(),
            dirty: BTreeSet::new(),
            next_number: 1,
            root: ObjRef::new(0, 0),
            info: None,
            id: None,
            header_version: version,
        };

        let catalog_ref = document.allocate_reference();
        let pages_ref = document.allocate_reference();

        let mut page = Dictionary::new();
        page.set("Type", PdfObject::name("Page"));
        page.set("Parent", pages_ref);
        page.set(
            "MediaBox",
            vec![
                PdfObject::Integer(0),
                PdfObject::Integer(0),
                PdfObject::Integer(595),
                PdfObject::Integer(842),
            ],
        );
        let page_ref = document.add_object(page);

        let mut pages = Dictionary::new();
        pages.set("Type", PdfObject::name("Pages"));
        pages.set("Kids", vec![PdfObject::Reference(page_ref)]);
        pages.set("Count", 1);
        document.set_object(pages_ref, pages);

        let mut catalog = Dictionary::new();
        catalog.set("Type", PdfObject::name("Catalog"));
        catalog.set("Pages", pages_ref);
        document.set_object(catalog_ref, catalog);
        document.root = catalog_ref;

        document
    }

    /// Assemble a document from an already-committed object table. Nothing is
    /// dirty.
    pub(crate) fn from_committed(
        objects: BTreeMap<ObjRef, PdfObject>,
        root: ObjRef,
        info: Option<ObjRef>,
        id: Option<[PdfString; 2]>,
        header_version: PdfVersion,
        size: u32,
    ) -> Self {
        let highest = objects.keys().map(|r| r.number).max().unwrap_or(0);
        Self {
            objects,
            dirty: BTreeSet::new(),
            next_number: size.max(highest + 1).max(1),
            root,
            info,
            id,
            header_version,
        }
    }

    // -- Allocation -----------------------------------------------------------

    /// Hand out a fresh reference. Numbers are never reused; generation is
    /// always 0.
    pub fn allocate_reference(&mut self) -> ObjRef {
        let reference = ObjRef::new(self.next_number, 0);
        self.next_number += 1;
        reference
    }

    /// Store `object` under a freshly allocated reference.
    pub fn add_object(&mut self, object: impl Into<PdfObject>) -> ObjRef {
        let reference = self.allocate_reference();
        self.set_object(reference, object);
        reference
    }

    /// Store (or replace) the object at `reference`, marking it dirty.
    pub fn set_object(&mut self, reference: ObjRef, object: impl Into<PdfObject>) {
        if reference.number >= self.next_number {
            self.next_number = reference.number + 1;
        }
        self.objects.insert(reference, object.into());
        self.dirty.insert(reference);
    }

    /// `/Size` for a trailer written now.
    pub fn size(&self) -> u32 {
        self.next_number
    }

    // -- Resolution -----------------------------------------------------------

    /// The object stored at `reference`. Exactly one level of indirection is
    /// followed: a stored reference is returned as-is.
    pub fn get(&self, reference: ObjRef) -> Result<&PdfObject> {
        self.objects
            .get(&reference)
            .ok_or_else(|| NachtragError::not_found(format!("object {reference}")))
    }

    /// Mutable access to an object; marks it dirty.
    pub fn get_mut(&mut self, reference: ObjRef) -> Result<&mut PdfObject> {
        match self.objects.get_mut(&reference) {
            Some(object) => {
                self.dirty.insert(reference);
                Ok(object)
            }
            None => Err(NachtragError::not_found(format!("object {reference}"))),
        }
    }

    /// Dereference `object` if it is a reference, otherwise return it.
    pub fn resolve<'a>(&'a self, object: &'a PdfObject) -> Result<&'a PdfObject> {
        match object {
            PdfObject::Reference(reference) => self.get(*reference),
            other => Ok(other),
        }
    }

    pub fn contains(&self, reference: ObjRef) -> bool {
        self.objects.contains_key(&reference)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn references(&self) -> impl Iterator<Item = ObjRef> + '_ {
        self.objects.keys().copied()
    }

    // -- Trailer state --------------------------------------------------------

    pub fn root(&self) -> ObjRef {
        self.root
    }

    pub fn info(&self) -> Option<ObjRef> {
        self.info
    }

    pub fn set_info(&mut self, info: ObjRef) {
        self.info = Some(info);
    }

    pub fn header_version(&self) -> PdfVersion {
        self.header_version
    }

    pub fn trailer_id(&self) -> Option<&[PdfString; 2]> {
        self.id.as_ref()
    }

    pub(crate) fn set_trailer_id(&mut self, id: [PdfString; 2]) {
        self.id = Some(id);
    }

    // -- Dirty tracking -------------------------------------------------------

    pub fn is_dirty(&self, reference: ObjRef) -> bool {
        self.dirty.contains(&reference)
    }

    pub fn mark_dirty(&mut self, reference: ObjRef) {
        if self.objects.contains_key(&reference) {
            self.dirty.insert(reference);
        }
    }

    /// Objects changed since the last committed revision, ascending.
    pub fn dirty_references(&self) -> Vec<ObjRef> {
        self.dirty.iter().copied().collect()
    }

    /// Mark the current state as committed: nothing is dirty any more.
    pub(crate) fn commit(&mut self) {
        debug!(committed = self.dirty.len(), "revision committed");
        self.dirty.clear();
    }

    pub(crate) fn take_object(&mut self, reference: ObjRef) -> Option<PdfObject> {
        self.objects.remove(&reference)
    }

    pub(crate) fn put_back(&mut self, reference: ObjRef, object: PdfObject) {
        self.objects.insert(reference, object);
    }

    // -- Traversal ------------------------------------------------------------

    /// Every object reachable from the catalog and the Info dictionary, in
    /// depth-first pre-order. The order only depends on the graph, so two
    /// calls on the same document agree.
    pub fn reachable(&self) -> Vec<ObjRef> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut stack: Vec<ObjRef> = Vec::new();

        let starts: Vec<ObjRef> = std::iter::once(self.root).chain(self.info).collect();
        for start in starts {
            stack.push(start);
            while let Some(reference) = stack.pop() {
                if !seen.insert(reference) {
                    continue;
                }
                let Some(object) = self.objects.get(&reference) else {
                    warn!(%reference, "dangling reference during traversal");
                    continue;
                };
                order.push(reference);
                let mut children = object.references();
                children.reverse();
                stack.extend(children.into_iter().filter(|child| !seen.contains(child)));
            }
        }
        order
    }
}
