// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Name trees (ISO 32000-1 §7.9.6) — string-keyed indices hanging off the
// catalog's `/Names` dictionary, e.g. `/Names /EmbeddedFiles`.
//
// Leaves hold a flat `/Names [key1 value1 key2 value2 ...]` array; interior
// nodes hold `/Kids` whose `/Limits [min max]` bound the keys below them.
// New entries are appended to the rightmost leaf, so entries read back in
// insertion order. Nodes are never split.

use nachtrag_core::error::{NachtragError, Result};
use tracing::debug;

use super::document::PdfDocument;
use super::object::{Dictionary, ObjRef, PdfObject, PdfString};

/// Deeper trees than this are treated as cyclic.
const MAX_DEPTH: usize = 32;

/// Category under `/Root /Names` holding embedded file specifications.
pub const EMBEDDED_FILES: &str = "EmbeddedFiles";

/// Handle on one name tree category of a document.
///
/// The handle holds no references into the document, so it stays valid
/// across edits; every operation re-resolves the tree from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTree {
    category: String,
}

impl NameTree {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
        }
    }

    /// The `/EmbeddedFiles` tree.
    pub fn embedded_files() -> Self {
        Self::new(EMBEDDED_FILES)
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Root node, if the tree exists.
    fn root<'d>(&self, document: &'d PdfDocument) -> Result<Option<&'d Dictionary>> {
        let Some(names) = document.catalog()?.get_opt("Names") else {
            return Ok(None);
        };
        let Some(root) = document.resolve(names)?.as_dict()?.get_opt(&self.category) else {
            return Ok(None);
        };
        document.resolve(root)?.as_dict().map(Some)
    }

    pub fn exists(&self, document: &PdfDocument) -> Result<bool> {
        Ok(self.root(document)?.is_some())
    }

    /// Root node reference, creating `/Root /Names /<category>` with an empty
    /// `/Names` array when the tree does not exist yet.
    fn ensure_root(&self, document: &mut PdfDocument) -> Result<ObjRef> {
        let names = document.ensure_indirect_dict(document.root(), "Names")?;
        let root = document.ensure_indirect_dict(names, &self.category)?;

        let node = document.get(root)?.as_dict()?;
        if !node.contains_key("Names") && !node.contains_key("Kids") {
            document
                .get_mut(root)?
                .as_dict_mut()?
                .set("Names", Vec::<PdfObject>::new());
            debug!(category = %self.category, %root, "created name tree");
        }
        Ok(root)
    }

    /// Check that the existing tree has the shape [`NameTree::insert`]
    /// edits, without touching the document.
    pub fn validate(&self, document: &PdfDocument) -> Result<()> {
        if let Some(root) = self.root(document)? {
            rightmost_path(document, root)?;
        }
        Ok(())
    }

    /// Append `key -> value` after every existing entry.
    ///
    /// Duplicate keys are kept; [`NameTree::get`] returns the first one.
    pub fn insert(&self, document: &mut PdfDocument, key: PdfString, value: ObjRef) -> Result<()> {
        self.validate(document)?;
        let root = self.ensure_root(document)?;
        let path = rightmost_path(document, document.get(root)?.as_dict()?)?;
        let leaf = path.last().copied().unwrap_or(root);

        let names = leaf_names_mut(document, leaf)?;
        names.push(PdfObject::String(key.clone()));
        names.push(PdfObject::Reference(value));
        let position = names.len() / 2 - 1;
        debug!(category = %self.category, %leaf, position, "name tree entry appended");

        // The root carries no limits; every node below it must cover the key.
        for &node in &path {
            let dict = document.get_mut(node)?.as_dict_mut()?;
            let (min, max) = match dict.get_opt("Limits").map(read_limits).transpose()? {
                Some((min, max)) => (min.min(&key).clone(), max.max(&key).clone()),
                None => (key.clone(), key.clone()),
            };
            dict.set("Limits", vec![PdfObject::String(min), PdfObject::String(max)]);
        }
        Ok(())
    }

    /// All entries in tree order, values unresolved.
    pub fn entries<'d>(&self, document: &'d PdfDocument) -> Result<Vec<(&'d PdfString, &'d PdfObject)>> {
        let mut out = Vec::new();
        if let Some(root) = self.root(document)? {
            collect_entries(document, root, 0, &mut out)?;
        }
        Ok(out)
    }

    /// Value of the first entry whose key equals `key`.
    pub fn get<'d>(&self, document: &'d PdfDocument, key: &[u8]) -> Result<Option<&'d PdfObject>> {
        Ok(self
            .entries(document)?
            .into_iter()
            .find(|(existing, _)| existing.as_bytes() == key)
            .map(|(_, value)| value))
    }

    pub fn len(&self, document: &PdfDocument) -> Result<usize> {
        Ok(self.entries(document)?.len())
    }

    pub fn is_empty(&self, document: &PdfDocument) -> Result<bool> {
        Ok(self.len(document)? == 0)
    }
}

/// Kid references from `node` down to its rightmost leaf. Empty when `node`
/// is itself a leaf.
fn rightmost_path<'d>(document: &'d PdfDocument, mut node: &'d Dictionary) -> Result<Vec<ObjRef>> {
    let mut path = Vec::new();
    while let Some(kids) = node.get_opt("Kids") {
        if path.len() >= MAX_DEPTH {
            return Err(NachtragError::Parse(format!(
                "name tree deeper than {MAX_DEPTH} levels"
            )));
        }
        let Some(last) = document.resolve(kids)?.as_array()?.last() else {
            break;
        };
        let kid = last.as_reference()?;
        node = document.get(kid)?.as_dict()?;
        path.push(kid);
    }
    if let Some(names) = node.get_opt("Names") {
        document.resolve(names)?.as_array()?;
    }
    Ok(path)
}

/// `/Limits [min max]` of a node.
fn read_limits(limits: &PdfObject) -> Result<(&PdfString, &PdfString)> {
    let min = limits.array_get(0)?.as_string()?;
    let max = limits.array_get(1)?.as_string()?;
    Ok((min, max))
}

/// The `/Names` array of a leaf, following an indirect array if needed.
fn leaf_names_mut(document: &mut PdfDocument, leaf: ObjRef) -> Result<&mut Vec<PdfObject>> {
    let indirect = match document.get(leaf)?.as_dict()?.get_opt("Names") {
        Some(PdfObject::Reference(reference)) => Some(*reference),
        _ => None,
    };
    match indirect {
        Some(reference) => document.get_mut(reference)?.as_array_mut(),
        None => {
            let dict = document.get_mut(leaf)?.as_dict_mut()?;
            if !dict.contains_key("Names") {
                dict.set("Names", Vec::<PdfObject>::new());
            }
            dict.get_mut("Names")?.as_array_mut()
        }
    }
}

fn collect_entries<'d>(
    document: &'d PdfDocument,
    node: &'d Dictionary,
    depth: usize,
    out: &mut Vec<(&'d PdfString, &'d PdfObject)>,
) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(NachtragError::Parse(format!(
            "name tree deeper than {MAX_DEPTH} levels"
        )));
    }
    if let Some(kids) = node.get_opt("Kids") {
        for kid in document.resolve(kids)?.as_array()? {
            let child = document.resolve(kid)?.as_dict()?;
            collect_entries(document, child, depth + 1, out)?;
        }
    }
    if let Some(names) = node.get_opt("Names") {
        for pair in document.resolve(names)?.as_array()?.chunks_exact(2) {
            out.push((pair[0].as_string()?, &pair[1]));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nachtrag_core::types::PdfVersion;

    fn keys(document: &PdfDocument, tree: &NameTree) -> Vec<String> {
        tree.entries(document)
            .unwrap()
            .into_iter()
            .map(|(key, _)| key.to_text())
            .collect()
    }

    #[test]
    fn absent_tree_reads_as_empty() {
        let document = PdfDocument::new(PdfVersion::V1_7);
        let tree = NameTree::embedded_files();
        assert!(!tree.exists(&document).unwrap());
        assert!(tree.is_empty(&document).unwrap());
        assert!(tree.get(&document, b"x").unwrap().is_none());
        assert!(document.lookup_path(&["Names"]).unwrap_err().is_not_found());
    }

    #[test]
    fn first_insert_creates_the_skeleton() {
        let mut document = PdfDocument::new(PdfVersion::V1_7);
        let tree = NameTree::embedded_files();
        let target = document.add_object(Dictionary::new());
        tree.insert(&mut document, PdfString::text("a.pdf"), target).unwrap();

        let names = document.lookup_path(&["Names", "EmbeddedFiles", "Names"]).unwrap();
        assert_eq!(names.as_array().unwrap().len(), 2);
        assert_eq!(tree.get(&document, b"a.pdf").unwrap(), Some(&PdfObject::Reference(target)));
        // Root nodes carry no limits.
        let root = document.lookup_path(&["Names", "EmbeddedFiles"]).unwrap();
        assert!(root.as_dict().unwrap().get_opt("Limits").is_none());
    }

    #[test]
    fn entries_keep_insertion_order_and_duplicates() {
        let mut document = PdfDocument::new(PdfVersion::V1_7);
        let tree = NameTree::embedded_files();
        let refs: Vec<ObjRef> = (0..4).map(|_| document.add_object(Dictionary::new())).collect();

        tree.insert(&mut document, PdfString::text("m"), refs[0]).unwrap();
        tree.insert(&mut document, PdfString::text("c"), refs[1]).unwrap();
        tree.insert(&mut document, PdfString::text("x"), refs[2]).unwrap();
        tree.insert(&mut document, PdfString::text("m"), refs[3]).unwrap();

        assert_eq!(keys(&document, &tree), vec!["m", "c", "x", "m"]);
        let entries = tree.entries(&document).unwrap();
        assert_eq!(entries[0].1, &PdfObject::Reference(refs[0]));
        assert_eq!(entries[3].1, &PdfObject::Reference(refs[3]));
        assert_eq!(tree.get(&document, b"m").unwrap(), Some(&PdfObject::Reference(refs[0])));
    }

    #[test]
    fn later_keys_never_move_ahead_of_earlier_ones() {
        let mut document = PdfDocument::new(PdfVersion::V1_7);
        let tree = NameTree::embedded_files();
        let first = document.add_object(Dictionary::new());
        let second = document.add_object(Dictionary::new());
        tree.insert(&mut document, PdfString::text("vector-test.pdf"), first).unwrap();
        tree.insert(&mut document, PdfString::text("some-other-file.pdf"), second).unwrap();

        let names = document.lookup_path(&["Names", "EmbeddedFiles", "Names"]).unwrap();
        let names = names.as_array().unwrap();
        assert_eq!(names[0].as_text().unwrap(), "vector-test.pdf");
        assert_eq!(names[1], PdfObject::Reference(first));
        assert_eq!(names[2].as_text().unwrap(), "some-other-file.pdf");
        assert_eq!(names[3], PdfObject::Reference(second));
    }

    #[test]
    fn inserts_go_to_the_rightmost_leaf_and_widen_its_limits() {
        let mut document = PdfDocument::new(PdfVersion::V1_7);
        let value = document.add_object(Dictionary::new());

        let leaf = |lo: &str, hi: &str| {
            let mut dict = Dictionary::new();
            dict.set(
                "Names",
                vec![
                    PdfObject::text(lo),
                    PdfObject::Reference(value),
                    PdfObject::text(hi),
                    PdfObject::Reference(value),
                ],
            );
            dict.set("Limits", vec![PdfObject::text(lo), PdfObject::text(hi)]);
            dict
        };
        let left = document.add_object(leaf("a", "f"));
        let right = document.add_object(leaf("p", "t"));
        let mut root = Dictionary::new();
        root.set("Kids", vec![PdfObject::Reference(left), PdfObject::Reference(right)]);
        let root = document.add_object(root);
        let mut names = Dictionary::new();
        names.set("EmbeddedFiles", root);
        document.catalog_mut().unwrap().set("Names", names);
        document.commit();

        let tree = NameTree::embedded_files();
        tree.insert(&mut document, PdfString::text("c"), value).unwrap();
        tree.insert(&mut document, PdfString::text("z"), value).unwrap();

        assert_eq!(keys(&document, &tree), vec!["a", "f", "p", "t", "c", "z"]);
        let right_limits = document.get(right).unwrap().as_dict().unwrap().get("Limits").unwrap();
        assert_eq!(right_limits.array_get(0).unwrap().as_text().unwrap(), "c");
        assert_eq!(right_limits.array_get(1).unwrap().as_text().unwrap(), "z");
        assert!(!document.is_dirty(left));
        assert!(document.is_dirty(right));
        assert!(!document.is_dirty(root));
    }

    #[test]
    fn wrongly_shaped_names_entry_is_a_type_mismatch() {
        let mut document = PdfDocument::new(PdfVersion::V1_7);
        document.catalog_mut().unwrap().set("Names", PdfObject::Integer(1));
        let target = document.add_object(Dictionary::new());
        let err = NameTree::embedded_files()
            .insert(&mut document, PdfString::text("a"), target)
            .unwrap_err();
        assert!(matches!(err, NachtragError::TypeMismatch { .. }));
    }

    #[test]
    fn malformed_kids_fail_before_anything_changes() {
        let mut document = PdfDocument::new(PdfVersion::V1_7);
        let mut root = Dictionary::new();
        root.set("Kids", vec![PdfObject::Integer(5)]);
        let mut names = Dictionary::new();
        names.set("EmbeddedFiles", root);
        document.catalog_mut().unwrap().set("Names", names);
        document.commit();

        let tree = NameTree::embedded_files();
        assert!(matches!(tree.validate(&document), Err(NachtragError::TypeMismatch { .. })));
        let size = document.size();
        let target = ObjRef::new(size, 0);
        let err = tree.insert(&mut document, PdfString::text("a"), target).unwrap_err();
        assert!(matches!(err, NachtragError::TypeMismatch { .. }));
        assert!(document.dirty_references().is_empty());
        assert_eq!(document.size(), size);
    }
}
