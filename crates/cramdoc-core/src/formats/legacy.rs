// SPDX-License-Identifier: AGPL-3.0-or-later
//! Flat block array format handler
//!
//! Stored documents from before the tree editor, and the array the
//! drag-reorder view works on, are JSON arrays of flat blocks.

use crate::ast::RichDocument;
use crate::block::Block;
use crate::builder::build_with;
use crate::flatten::flatten_with;
use crate::ids::{IdGenerator, UuidIds};
use crate::traits::{
    FormatHandler, ParseConfig, Parser, RenderConfig, Renderer, Result, SourceFormat,
};
use std::sync::Arc;

/// Legacy flat block handler
pub struct LegacyHandler {
    ids: Arc<dyn IdGenerator>,
}

impl LegacyHandler {
    pub fn new() -> Self {
        Self::with_ids(Arc::new(UuidIds))
    }

    pub fn with_ids(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }
}

impl Default for LegacyHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for LegacyHandler {
    fn format(&self) -> SourceFormat {
        SourceFormat::Legacy
    }

    fn parse(&self, input: &str, config: &ParseConfig) -> Result<RichDocument> {
        let blocks: Vec<Block> = serde_json::from_str(input)?;
        Ok(build_with(&blocks, self.ids.as_ref(), config))
    }
}

impl Renderer for LegacyHandler {
    fn format(&self) -> SourceFormat {
        SourceFormat::Legacy
    }

    fn render(&self, doc: &RichDocument, config: &RenderConfig) -> Result<String> {
        let blocks = flatten_with(doc, self.ids.as_ref(), config);
        Ok(serde_json::to_string_pretty(&blocks)?)
    }
}

impl FormatHandler for LegacyHandler {
    fn supported_features(&self) -> &[&str] {
        &["domain_blocks", "embeds"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BlockNode, InlineNode};
    use crate::ids::SequentialIds;
    use crate::traits::ConversionError;
    use pretty_assertions::assert_eq;

    fn handler() -> LegacyHandler {
        LegacyHandler::with_ids(Arc::new(SequentialIds::new()))
    }

    #[test]
    fn test_parse_stored_blocks() {
        let input = r###"[
            { "id": "a", "type": "text", "content": "## Heading" },
            { "id": "b", "type": "page_break" }
        ]"###;
        let doc = handler().parse(input, &ParseConfig::default()).unwrap();
        assert_eq!(doc.content.len(), 2);
        assert_eq!(
            doc.content[0],
            BlockNode::heading(2, vec![InlineNode::text("Heading")])
        );
        assert_eq!(doc.content[1].node_type(), "pageBreak");
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let err = handler().parse("{not json", &ParseConfig::default()).unwrap_err();
        assert!(matches!(err, ConversionError::SerializationError(_)));
    }

    #[test]
    fn test_render_is_json_array() {
        let doc = RichDocument::new(vec![BlockNode::paragraph(vec![InlineNode::text("hi")])]);
        let output = handler().render(&doc, &RenderConfig::default()).unwrap();
        let blocks: Vec<Block> = serde_json::from_str(&output).unwrap();
        assert_eq!(blocks, vec![Block::text("block-1", "hi")]);
    }
}
