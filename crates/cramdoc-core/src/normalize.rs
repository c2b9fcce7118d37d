// SPDX-License-Identifier: AGPL-3.0-or-later
//! Re-parsing text inside an existing tree
//!
//! Stored trees and editor fragments can carry formulas that were typed as
//! plain `$...$` text. Normalizing runs the inline parser over every
//! unmarked text run, lifts display formulas out of paragraphs and merges
//! formulas split across top-level paragraphs. Nodes that are already
//! formulas, images or domain blocks pass through unchanged.

use crate::ast::{BlockNode, InlineNode, RichDocument};
use crate::ids::IdGenerator;
use crate::inline::{
    inline_only, lift_block_formulas, lift_nested_formulas, parse_inline_with, Segment,
};
use crate::merge::merge_adjacent_formulas_with;
use crate::traits::ParseConfig;

/// Normalize with default parse options
pub fn normalize(doc: &RichDocument, ids: &dyn IdGenerator) -> RichDocument {
    normalize_with(doc, ids, &ParseConfig::default())
}

/// Produce a normalized copy of a document
pub fn normalize_with(doc: &RichDocument, ids: &dyn IdGenerator, config: &ParseConfig) -> RichDocument {
    let siblings = normalize_siblings(&doc.content, ids, config, false);
    let content = merge_adjacent_formulas_with(siblings, ids, config);
    if content.is_empty() {
        RichDocument::empty()
    } else {
        RichDocument::new(content)
    }
}

/// `nested` is set below the top level, where lifted formulas get no id
fn normalize_siblings(
    nodes: &[BlockNode],
    ids: &dyn IdGenerator,
    config: &ParseConfig,
    nested: bool,
) -> Vec<BlockNode> {
    nodes
        .iter()
        .flat_map(|node| normalize_node(node, ids, config, nested))
        .collect()
}

fn normalize_node(
    node: &BlockNode,
    ids: &dyn IdGenerator,
    config: &ParseConfig,
    nested: bool,
) -> Vec<BlockNode> {
    match node {
        BlockNode::Paragraph { content } => {
            let segments = reparse(content, config);
            let lifted = if nested {
                lift_nested_formulas(segments)
            } else {
                lift_block_formulas(segments, ids)
            };
            if lifted.is_empty() {
                vec![node.clone()]
            } else {
                lifted
            }
        }
        BlockNode::Heading { attrs, content } => vec![BlockNode::Heading {
            attrs: *attrs,
            content: inline_only(reparse(content, config)),
        }],
        BlockNode::Blockquote { content } => vec![BlockNode::Blockquote {
            content: normalize_siblings(content, ids, config, true),
        }],
        BlockNode::BulletList { content } => vec![BlockNode::BulletList {
            content: normalize_siblings(content, ids, config, true),
        }],
        BlockNode::OrderedList { attrs, content } => vec![BlockNode::OrderedList {
            attrs: *attrs,
            content: normalize_siblings(content, ids, config, true),
        }],
        BlockNode::ListItem { content } => vec![BlockNode::ListItem {
            content: normalize_siblings(content, ids, config, true),
        }],
        BlockNode::Unknown { node_type, content } => vec![BlockNode::Unknown {
            node_type: node_type.clone(),
            content: normalize_siblings(content, ids, config, true),
        }],
        _ => vec![node.clone()],
    }
}

/// Parse unmarked text runs; other inline nodes are kept as they are
fn reparse(content: &[InlineNode], config: &ParseConfig) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(content.len());
    for node in content {
        match node {
            InlineNode::Text { text, marks } if marks.is_empty() => {
                segments.extend(parse_inline_with(text, config));
            }
            other => segments.push(Segment::Inline(other.clone())),
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Mark;
    use crate::ids::SequentialIds;
    use pretty_assertions::assert_eq;

    fn para(text: &str) -> BlockNode {
        BlockNode::paragraph(vec![InlineNode::text(text)])
    }

    #[test]
    fn test_text_formulas_become_nodes() {
        let doc = RichDocument::new(vec![para("let $x$ and $$y$$ then")]);
        let normalized = normalize(&doc, &SequentialIds::new());
        assert_eq!(
            normalized.content,
            vec![
                BlockNode::paragraph(vec![
                    InlineNode::text("let "),
                    InlineNode::formula("x"),
                    InlineNode::text(" and"),
                ]),
                BlockNode::formula_block(Some("block-1".into()), "y"),
                para("then"),
            ]
        );
    }

    #[test]
    fn test_split_formula_in_editor_paragraphs() {
        let doc = RichDocument::new(vec![para("$$"), para("\\sum_i x_i"), para("$$")]);
        let normalized = normalize(&doc, &SequentialIds::new());
        assert_eq!(
            normalized.content,
            vec![BlockNode::formula_block(Some("block-1".into()), "\\sum_i x_i")]
        );
    }

    #[test]
    fn test_marked_text_and_empty_paragraphs_kept() {
        let doc = RichDocument::new(vec![
            BlockNode::empty_paragraph(),
            BlockNode::paragraph(vec![InlineNode::marked("$x$", vec![Mark::Code])]),
        ]);
        assert_eq!(normalize(&doc, &SequentialIds::new()), doc);
    }

    #[test]
    fn test_nested_containers_are_reparsed() {
        let doc = RichDocument::new(vec![BlockNode::Blockquote {
            content: vec![para("$a$")],
        }]);
        assert_eq!(
            normalize(&doc, &SequentialIds::new()).content,
            vec![BlockNode::Blockquote {
                content: vec![BlockNode::paragraph(vec![InlineNode::formula("a")])],
            }]
        );
    }

    #[test]
    fn test_nested_display_formula_gets_no_id() {
        let doc = RichDocument::new(vec![BlockNode::BulletList {
            content: vec![BlockNode::ListItem {
                content: vec![para("a $$x$$")],
            }],
        }]);
        assert_eq!(
            normalize(&doc, &SequentialIds::new()).content,
            vec![BlockNode::BulletList {
                content: vec![BlockNode::ListItem {
                    content: vec![para("a"), BlockNode::formula_block(None, "x")],
                }],
            }]
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let ids = SequentialIds::new();
        let doc = RichDocument::new(vec![para("a $b$ $$c$$"), para("d $$e"), para("f$$")]);
        let once = normalize(&doc, &ids);
        assert_eq!(normalize(&once, &ids), once);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let doc = RichDocument::new(vec![para("$x$")]);
        let copy = doc.clone();
        let _ = normalize(&doc, &SequentialIds::new());
        assert_eq!(doc, copy);
    }
}
