//! Provenance record for one irguard run: inputs by digest plus host details.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use irguard_contract::SpecDocument;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const RUN_MANIFEST_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformInfo {
    pub os: String,
    pub arch: String,
}

impl PlatformInfo {
    pub fn current() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: u32,
    pub timestamp: DateTime<Utc>,
    pub tool_version: String,
    pub target: String,
    pub files: BTreeMap<String, String>,
    pub platform: PlatformInfo,
}

/// Hex SHA-256 of the file at `path`, or `None` when it does not exist.
pub fn sha256_file(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read '{}' for hashing", path.display()))?;
    Ok(Some(format!("{:x}", Sha256::digest(&bytes))))
}

pub fn build_run_manifest(
    document: &SpecDocument,
    ir_path: &Path,
    config_path: Option<&Path>,
    report_path: Option<&Path>,
) -> Result<RunManifest> {
    let mut files = BTreeMap::new();
    let ir_digest = sha256_file(ir_path)?
        .with_context(|| format!("IR document '{}' does not exist", ir_path.display()))?;
    files.insert("ir_json".to_string(), ir_digest);
    for (key, path) in [("config", config_path), ("report", report_path)] {
        let Some(path) = path else {
            continue;
        };
        if let Some(digest) = sha256_file(path)? {
            files.insert(key.to_string(), digest);
        }
    }

    Ok(RunManifest {
        schema_version: RUN_MANIFEST_SCHEMA_VERSION,
        timestamp: Utc::now(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        target: document.target.clone(),
        files,
        platform: PlatformInfo::current(),
    })
}
