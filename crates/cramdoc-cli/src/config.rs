// SPDX-License-Identifier: AGPL-3.0-or-later
//! Optional TOML configuration file

use anyhow::{Context, Result};
use cramdoc_core::{ParseConfig, RenderConfig};
use serde::Deserialize;
use std::path::Path;

/// `[parse]` and `[render]` tables; missing keys keep their defaults
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub parse: ParseConfig,
    pub render: RenderConfig,
}

impl CliConfig {
    pub fn from_toml(input: &str) -> Result<Self> {
        toml::from_str(input).context("Invalid configuration")
    }

    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let input = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&input)
    }
}
