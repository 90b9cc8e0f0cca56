// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// nachtrag-integrity — Checksums for embedded payloads and fingerprints for
// written revisions.

pub mod integrity;

pub use integrity::{CHECKSUM_LEN, digest, hash_bytes, verify_checksum, verify_hash};
