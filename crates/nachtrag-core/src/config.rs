// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Writer configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::PdfVersion;

/// Settings shared by every writer session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Header version written for freshly created documents.
    pub default_version: PdfVersion,
    /// Record `/Size` in the parameters of new embedded file streams.
    pub embed_size: bool,
    /// Record `/CheckSum` in the parameters of new embedded file streams.
    pub embed_checksum: bool,
    /// `/Producer` for the Info dictionary of freshly created documents.
    pub producer: Option<String>,
}

impl WriterConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialise the configuration to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            default_version: PdfVersion::V1_7,
            embed_size: true,
            embed_checksum: true,
            producer: None,
        }
    }
}
