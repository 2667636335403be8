//! Parser Configuration
//!
//! Options shared by a markup parse and the expression parses it drives.
//! Loaded from JSON with camelCase keys; every field has a default.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::ml_parser::defaults::InterpolationConfig;
use crate::ml_parser::lexer::TokenizeOptions;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParserConfig {
    pub interpolation: InterpolationConfig,
    /// Keep `\r\n` and `\r` in token payloads instead of normalizing to `\n`.
    pub preserve_line_endings: bool,
}

impl ParserConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ParserConfig = serde_json::from_str(json)?;
        config.interpolation.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read parser config {}", path.display()))?;
        let config = ParserConfig::from_json(&content)
            .with_context(|| format!("failed to parse parser config {}", path.display()))?;
        Ok(config)
    }

    pub fn tokenize_options(&self) -> TokenizeOptions {
        TokenizeOptions {
            interpolation_config: self.interpolation.clone(),
            preserve_line_endings: self.preserve_line_endings,
        }
    }
}
