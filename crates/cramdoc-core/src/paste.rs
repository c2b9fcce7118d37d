// SPDX-License-Identifier: AGPL-3.0-or-later
//! Staging pasted text for insertion
//!
//! Pasted text is parsed into a detached fragment; the editor inserts it.
//! Oversized input is cut to the configured limits, and image sources that
//! name a local file are pointed at their uploaded URL.

use crate::ast::{BlockNode, InlineNode};
use crate::builder::build_with;
use crate::ids::IdGenerator;
use crate::tokenizer::tokenize;
use crate::traits::ParseConfig;
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

/// Parsed paste content, ready for the editor to insert
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PasteFragment {
    pub content: Vec<BlockNode>,
    /// Input or output was cut to the configured limits
    pub truncated: bool,
}

impl PasteFragment {
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Parse pasted text into a fragment
pub fn stage_paste(text: &str, config: &ParseConfig, ids: &dyn IdGenerator) -> PasteFragment {
    if text.trim().is_empty() {
        return PasteFragment::default();
    }

    let mut truncated = false;
    let text = match text.char_indices().nth(config.max_paste_chars) {
        Some((cut, _)) => {
            warn!(limit = config.max_paste_chars, "paste input truncated");
            truncated = true;
            &text[..cut]
        }
        None => text,
    };

    let blocks = tokenize(text, ids);
    let mut content = build_with(&blocks, ids, config).content;

    if content.len() > config.max_paste_blocks {
        warn!(
            limit = config.max_paste_blocks,
            blocks = content.len(),
            "paste fragment truncated"
        );
        content.truncate(config.max_paste_blocks);
        truncated = true;
    }

    if !config.image_mappings.is_empty() {
        for block in &mut content {
            map_images(block, &config.image_mappings);
        }
    }

    PasteFragment { content, truncated }
}

/// Last path segment of an image source
fn file_name(src: &str) -> &str {
    src.rsplit(['/', '\\']).next().unwrap_or(src)
}

fn map_images(block: &mut BlockNode, mappings: &HashMap<String, String>) {
    match block {
        BlockNode::Paragraph { content } | BlockNode::Heading { content, .. } => {
            for inline in content {
                if let InlineNode::Image { attrs } = inline {
                    if let Some(url) = mappings.get(file_name(&attrs.src)) {
                        attrs.src = url.clone();
                    }
                }
            }
        }
        BlockNode::Blockquote { content }
        | BlockNode::BulletList { content }
        | BlockNode::OrderedList { content, .. }
        | BlockNode::ListItem { content }
        | BlockNode::Unknown { content, .. } => {
            for child in content {
                map_images(child, mappings);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blank_paste_is_empty() {
        let fragment = stage_paste(" \n\t", &ParseConfig::default(), &SequentialIds::new());
        assert!(fragment.is_empty());
        assert!(!fragment.truncated);
    }

    #[test]
    fn test_paste_parses_formulas() {
        let fragment = stage_paste("given $a$\n\n$$b$$", &ParseConfig::default(), &SequentialIds::new());
        assert_eq!(
            fragment.content,
            vec![
                BlockNode::paragraph(vec![InlineNode::text("given "), InlineNode::formula("a")]),
                BlockNode::formula_block(Some("block-2".into()), "b"),
            ]
        );
    }

    #[test]
    fn test_char_limit_respects_boundaries() {
        let config = ParseConfig {
            max_paste_chars: 3,
            ..ParseConfig::default()
        };
        let fragment = stage_paste("αβγδ", &config, &SequentialIds::new());
        assert!(fragment.truncated);
        assert_eq!(
            fragment.content,
            vec![BlockNode::paragraph(vec![InlineNode::text("αβγ")])]
        );
    }

    #[test]
    fn test_block_limit() {
        let config = ParseConfig {
            max_paste_blocks: 2,
            ..ParseConfig::default()
        };
        let fragment = stage_paste("a\n\nb\n\nc", &config, &SequentialIds::new());
        assert!(fragment.truncated);
        assert_eq!(fragment.content.len(), 2);
    }

    #[test]
    fn test_image_sources_are_mapped() {
        let mut config = ParseConfig::default();
        config
            .image_mappings
            .insert("fig1.png".into(), "https://cdn.example.com/u/fig1.png".into());
        let fragment = stage_paste(
            "- ![fig](C:\\scans\\fig1.png)\n- ![other](img/other.png)",
            &config,
            &SequentialIds::new(),
        );
        assert_eq!(
            fragment.content,
            vec![BlockNode::BulletList {
                content: vec![
                    BlockNode::ListItem {
                        content: vec![BlockNode::paragraph(vec![InlineNode::image(
                            "https://cdn.example.com/u/fig1.png",
                            "fig"
                        )])]
                    },
                    BlockNode::ListItem {
                        content: vec![BlockNode::paragraph(vec![InlineNode::image(
                            "img/other.png",
                            "other"
                        )])]
                    },
                ]
            }]
        );
    }
}
