// SPDX-License-Identifier: AGPL-3.0-or-later
//! Document tree JSON format handler

use crate::ast::RichDocument;
use crate::ids::{IdGenerator, UuidIds};
use crate::normalize::normalize_with;
use crate::traits::{
    FormatHandler, ParseConfig, Parser, RenderConfig, Renderer, Result, SourceFormat,
};
use std::sync::Arc;

/// Editor tree handler; parsed trees are normalized
pub struct TreeHandler {
    ids: Arc<dyn IdGenerator>,
}

impl TreeHandler {
    pub fn new() -> Self {
        Self::with_ids(Arc::new(UuidIds))
    }

    pub fn with_ids(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }
}

impl Default for TreeHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for TreeHandler {
    fn format(&self) -> SourceFormat {
        SourceFormat::Tree
    }

    fn parse(&self, input: &str, config: &ParseConfig) -> Result<RichDocument> {
        let doc: RichDocument = serde_json::from_str(input)?;
        Ok(normalize_with(&doc, self.ids.as_ref(), config))
    }
}

impl Renderer for TreeHandler {
    fn format(&self) -> SourceFormat {
        SourceFormat::Tree
    }

    fn render(&self, doc: &RichDocument, _config: &RenderConfig) -> Result<String> {
        Ok(serde_json::to_string_pretty(doc)?)
    }
}

impl FormatHandler for TreeHandler {
    fn supported_features(&self) -> &[&str] {
        &[
            "headings",
            "lists",
            "blockquotes",
            "code_blocks",
            "formulas",
            "images",
            "hard_breaks",
            "emphasis",
            "domain_blocks",
            "embeds",
        ]
    }
}
