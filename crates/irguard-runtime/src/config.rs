use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use irguard_contract::DEFAULT_EQUALS_TOLERANCE;
use serde::{Deserialize, Serialize};

use crate::outcome_classifier::{OutcomeThresholds, DEFAULT_MISMATCH_RATIO};

/// Tunables for one validation cycle, loaded from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IrGuardConfig {
    pub default_tolerance: f64,
    pub mismatch_ratio: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_path: Option<PathBuf>,
    pub auto_correct: bool,
}

impl Default for IrGuardConfig {
    fn default() -> Self {
        Self {
            default_tolerance: DEFAULT_EQUALS_TOLERANCE,
            mismatch_ratio: DEFAULT_MISMATCH_RATIO,
            schema_path: None,
            auto_correct: true,
        }
    }
}

impl IrGuardConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.default_tolerance.is_finite() || self.default_tolerance < 0.0 {
            bail!(
                "default_tolerance must be a finite non-negative number, got {}",
                self.default_tolerance
            );
        }
        if let Err(message) = self.thresholds().validate() {
            bail!(message);
        }
        Ok(())
    }

    pub fn thresholds(&self) -> OutcomeThresholds {
        OutcomeThresholds {
            mismatch_ratio: self.mismatch_ratio,
        }
    }

    /// Relative `schema_path` values resolve against `base_dir`.
    pub fn resolve_schema_path(&mut self, base_dir: &Path) {
        if let Some(path) = self.schema_path.as_mut() {
            if path.is_relative() {
                *path = base_dir.join(&*path);
            }
        }
    }
}

pub fn parse_config(raw: &str) -> Result<IrGuardConfig> {
    let config = toml::from_str::<IrGuardConfig>(raw).context("failed to parse irguard config")?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<IrGuardConfig> {
    let payload = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read irguard config '{}'", path.display()))?;
    let mut config = parse_config(&payload)
        .with_context(|| format!("invalid irguard config '{}'", path.display()))?;
    if let Some(base_dir) = path.parent() {
        config.resolve_schema_path(base_dir);
    }
    tracing::debug!(path = %path.display(), "loaded irguard config");
    Ok(config)
}
