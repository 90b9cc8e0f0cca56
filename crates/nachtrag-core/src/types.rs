// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: format versions, version-gated features, and
// associated-file relationships.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NachtragError;

/// A declared PDF version such as `1.7` or `2.0`.
///
/// Ordering follows (major, minor), so `max` picks the newer version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PdfVersion {
    pub major: u8,
    pub minor: u8,
}

impl PdfVersion {
    pub const V1_3: Self = Self::new(1, 3);
    pub const V1_4: Self = Self::new(1, 4);
    pub const V1_7: Self = Self::new(1, 7);
    pub const V2_0: Self = Self::new(2, 0);

    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl Default for PdfVersion {
    fn default() -> Self {
        Self::V1_7
    }
}

impl fmt::Display for PdfVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for PdfVersion {
    type Err = NachtragError;

    /// Accepts `1.7` as well as the name form `/1.7` found in catalog entries.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('/');
        let (major, minor) = trimmed
            .split_once('.')
            .ok_or_else(|| NachtragError::Parse(format!("invalid PDF version {s:?}")))?;
        let major = major
            .parse::<u8>()
            .map_err(|_| NachtragError::Parse(format!("invalid PDF major version {s:?}")))?;
        let minor = minor
            .parse::<u8>()
            .map_err(|_| NachtragError::Parse(format!("invalid PDF minor version {s:?}")))?;
        Ok(Self::new(major, minor))
    }
}

impl TryFrom<String> for PdfVersion {
    type Error = NachtragError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PdfVersion> for String {
    fn from(version: PdfVersion) -> Self {
        version.to_string()
    }
}

/// Format features whose use forces a minimum declared version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    /// Document-level `/AF` arrays and `/AFRelationship`.
    AssociatedFiles,
}

impl Feature {
    /// Earliest version of the format that defines this feature.
    pub fn min_version(&self) -> PdfVersion {
        match self {
            Self::AssociatedFiles => PdfVersion::V2_0,
        }
    }
}

/// `/AFRelationship` values (ISO 32000-2 §14.13).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AfRelationship {
    Source,
    Data,
    Alternative,
    Supplement,
    EncryptedPayload,
    FormData,
    Schema,
    Unspecified,
    /// Second-class name registered outside the standard set.
    Custom(String),
}

impl AfRelationship {
    /// Name value as written into the file specification (without `/`).
    pub fn as_name(&self) -> &str {
        match self {
            Self::Source => "Source",
            Self::Data => "Data",
            Self::Alternative => "Alternative",
            Self::Supplement => "Supplement",
            Self::EncryptedPayload => "EncryptedPayload",
            Self::FormData => "FormData",
            Self::Schema => "Schema",
            Self::Unspecified => "Unspecified",
            Self::Custom(name) => name,
        }
    }

    /// Map a name read from a document back to a relationship.
    pub fn from_name(name: &str) -> Self {
        match name.trim_start_matches('/') {
            "Source" => Self::Source,
            "Data" => Self::Data,
            "Alternative" => Self::Alternative,
            "Supplement" => Self::Supplement,
            "EncryptedPayload" => Self::EncryptedPayload,
            "FormData" => Self::FormData,
            "Schema" => Self::Schema,
            "Unspecified" => Self::Unspecified,
            other => Self::Custom(other.to_owned()),
        }
    }
}
