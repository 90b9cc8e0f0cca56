// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Payload integrity — MD5 checksums for embedded file streams and SHA-256
// fingerprints for written revisions.

use md5::Md5;
use nachtrag_core::error::NachtragError;
use sha2::{Digest, Sha256};

/// Length in bytes of an embedded-file `/CheckSum`.
pub const CHECKSUM_LEN: usize = 16;

/// Compute the 16-byte checksum of `data`.
///
/// This is the value stored under `/Params /CheckSum` of an embedded file
/// stream, always taken over the raw payload before any stream filter.
pub fn digest(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut hasher = Md5::new();
    hasher.update(data);
    let mut checksum = [0u8; CHECKSUM_LEN];
    checksum.copy_from_slice(&hasher.finalize());
    checksum
}

/// Verify that `data` matches an expected checksum.
///
/// Returns `Err(NachtragError::IntegrityMismatch)` carrying both values as
/// lowercase hex when it does not.
pub fn verify_checksum(data: &[u8], expected: &[u8]) -> Result<(), NachtragError> {
    let actual = digest(data);
    if actual.as_slice() == expected {
        Ok(())
    } else {
        Err(NachtragError::IntegrityMismatch {
            expected: hex::encode(expected),
            actual: hex::encode(actual),
        })
    }
}

/// Compute the SHA-256 hash of `data` and return it as a lowercase hex string.
///
/// Used to fingerprint each written revision in the logs.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Verify that `data` matches the expected SHA-256 hex digest.
pub fn verify_hash(data: &[u8], expected_hex: &str) -> Result<(), NachtragError> {
    let actual = hash_bytes(data);
    if actual == expected_hex {
        Ok(())
    } else {
        Err(NachtragError::IntegrityMismatch {
            expected: expected_hex.to_owned(),
            actual,
        })
    }
}
