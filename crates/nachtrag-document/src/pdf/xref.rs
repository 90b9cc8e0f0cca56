// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cross-reference tables — building the `xref` section of a revision and
// locating the previous one through `startxref`.
//
// Layout written:
//
//   xref
//   0 1
//   0000000000 65535 f \n        (full revisions only)
//   4 2
//   0000001234 00000 n \n
//   0000001502 00000 n \n

use std::collections::BTreeMap;

use nachtrag_core::error::{NachtragError, Result};

use super::object::ObjRef;

/// How far back from the end of the file `startxref` is searched for.
const STARTXREF_WINDOW: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct XrefEntry {
    offset: usize,
    generation: u16,
    in_use: bool,
}

/// Entries of one cross-reference section, keyed by object number.
#[derive(Debug, Default)]
pub struct XrefSection {
    entries: BTreeMap<u32, XrefEntry>,
}

impl XrefSection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Section that starts with the free-list head for object 0, as required
    /// for the first revision of a file.
    pub fn with_free_head() -> Self {
        let mut section = Self::new();
        section.entries.insert(
            0,
            XrefEntry {
                offset: 0,
                generation: 65535,
                in_use: false,
            },
        );
        section
    }

    /// Record that `reference` was written at byte `offset`.
    pub fn add(&mut self, reference: ObjRef, offset: usize) {
        self.entries.insert(
            reference.number,
            XrefEntry {
                offset,
                generation: reference.generation,
                in_use: true,
            },
        );
    }

    /// Runs of consecutive object numbers, as `(first, entries)`.
    fn subsections(&self) -> Vec<(u32, Vec<XrefEntry>)> {
        let mut runs: Vec<(u32, Vec<XrefEntry>)> = Vec::new();
        for (&number, &entry) in &self.entries {
            match runs.last_mut() {
                Some((first, run)) if *first + run.len() as u32 == number => run.push(entry),
                _ => runs.push((number, vec![entry])),
            }
        }
        runs
    }

    /// Append the `xref` keyword, subsection headers, and 20-byte entries.
    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"xref\n");
        for (first, run) in self.subsections() {
            out.extend_from_slice(format!("{} {}\n", first, run.len()).as_bytes());
            for entry in run {
                let kind = if entry.in_use { 'n' } else { 'f' };
                out.extend_from_slice(
                    format!("{:010} {:05} {} \n", entry.offset, entry.generation, kind).as_bytes(),
                );
            }
        }
    }
}

/// Byte offset recorded after the last `startxref` keyword of `bytes`.
pub fn find_startxref(bytes: &[u8]) -> Result<usize> {
    let window_start = bytes.len().saturating_sub(STARTXREF_WINDOW);
    let tail = &bytes[window_start..];

    let keyword = b"startxref";
    let position = tail
        .windows(keyword.len())
        .rposition(|window| window == keyword)
        .ok_or_else(|| NachtragError::Parse("startxref not found".into()))?;

    let digits: String = tail[position + keyword.len()..]
        .iter()
        .skip_while(|b| b.is_ascii_whitespace())
        .take_while(|b| b.is_ascii_digit())
        .map(|&b| char::from(b))
        .collect();

    digits
        .parse()
        .map_err(|_| NachtragError::Parse("invalid startxref offset".into()))
}
