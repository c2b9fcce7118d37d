// SPDX-License-Identifier: AGPL-3.0-or-later
//! Reassembling display formulas split across paragraphs
//!
//! Text split on blank lines before it reaches this crate can leave a `$$`
//! opener in one paragraph and its closer several paragraphs later. The merger
//! scans one sibling list and joins such runs back into a single formula
//! block. It never looks inside lists or quotes.

use crate::ast::BlockNode;
use crate::ids::IdGenerator;
use crate::inline::kinds::Formula;
use crate::inline::{lift_block_formulas, parse_inline_with, source_text};
use crate::traits::ParseConfig;
use std::collections::VecDeque;
use tracing::debug;

/// Merge split display formulas with default parse options
pub fn merge_adjacent_formulas(siblings: Vec<BlockNode>, ids: &dyn IdGenerator) -> Vec<BlockNode> {
    merge_adjacent_formulas_with(siblings, ids, &ParseConfig::default())
}

/// Merge split display formulas in a sibling list
///
/// A paragraph with an unpaired `$$` opens a formula; following paragraphs
/// are absorbed until one containing `$$` closes it. Text before the opener
/// and after the closer becomes paragraphs of its own. When a non-paragraph
/// sibling or the end of the list comes first, nothing is merged.
pub fn merge_adjacent_formulas_with(
    siblings: Vec<BlockNode>,
    ids: &dyn IdGenerator,
    config: &ParseConfig,
) -> Vec<BlockNode> {
    let mut pending: VecDeque<BlockNode> = siblings.into();
    let mut merged = Vec::with_capacity(pending.len());

    while let Some(node) = pending.pop_front() {
        debug_assert!(
            !matches!(node, BlockNode::ListItem { .. }),
            "list items are not sibling-level nodes"
        );

        let Some(opening) = unpaired_opener(&node) else {
            merged.push(node);
            continue;
        };
        let Some(closing) = find_closer(&pending) else {
            debug!("display formula never closed, paragraph kept as text");
            merged.push(node);
            continue;
        };

        let mut formula = opening.head;
        formula.push_str(&closing.body);
        let formula = formula.trim();
        if formula.is_empty() {
            merged.push(node);
            continue;
        }

        debug!(
            paragraphs = closing.consumed + 1,
            "reassembled display formula"
        );
        pending.drain(..closing.consumed);

        merged.extend(remainder_blocks(&opening.before, ids, config));
        merged.push(BlockNode::formula_block(Some(ids.next_id()), formula));

        // Text after the closer may open another formula
        for block in remainder_blocks(&closing.after, ids, config).into_iter().rev() {
            pending.push_front(block);
        }
    }

    merged
}

struct Opening {
    before: String,
    head: String,
}

struct Closing {
    /// Number of siblings absorbed, the closing paragraph included
    consumed: usize,
    body: String,
    after: String,
}

fn paragraph_text(node: &BlockNode) -> Option<String> {
    match node {
        BlockNode::Paragraph { content } => Some(source_text(content)),
        _ => None,
    }
}

/// Paragraphs whose last `$$` has no partner
fn unpaired_opener(node: &BlockNode) -> Option<Opening> {
    let text = paragraph_text(node)?;
    let delimiters: Vec<usize> = text
        .match_indices(Formula::DISPLAY)
        .map(|(at, _)| at)
        .collect();
    if delimiters.len() % 2 == 0 {
        return None;
    }
    let at = *delimiters.last()?;
    Some(Opening {
        before: text[..at].to_string(),
        head: text[at + Formula::DISPLAY.len()..].to_string(),
    })
}

fn find_closer(pending: &VecDeque<BlockNode>) -> Option<Closing> {
    let mut body = String::new();
    for (index, node) in pending.iter().enumerate() {
        let text = paragraph_text(node)?;
        if let Some(at) = text.find(Formula::DISPLAY) {
            body.push_str(&text[..at]);
            return Some(Closing {
                consumed: index + 1,
                body,
                after: text[at + Formula::DISPLAY.len()..].to_string(),
            });
        }
        body.push_str(&text);
    }
    None
}

fn remainder_blocks(text: &str, ids: &dyn IdGenerator, config: &ParseConfig) -> Vec<BlockNode> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    lift_block_formulas(parse_inline_with(text, config), ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::InlineNode;
    use crate::ids::SequentialIds;
    use pretty_assertions::assert_eq;

    fn para(text: &str) -> BlockNode {
        BlockNode::paragraph(vec![InlineNode::text(text)])
    }

    #[test]
    fn test_formula_across_three_paragraphs() {
        let ids = SequentialIds::new();
        let merged = merge_adjacent_formulas(
            vec![para("before $$a"), para("b"), para("c$$ after")],
            &ids,
        );
        assert_eq!(
            merged,
            vec![
                para("before"),
                BlockNode::formula_block(Some("block-1".into()), "abc"),
                para("after"),
            ]
        );
    }

    #[test]
    fn test_no_closer_keeps_input() {
        let ids = SequentialIds::new();
        let input = vec![para("open $$a"), para("b")];
        assert_eq!(merge_adjacent_formulas(input.clone(), &ids), input);
    }

    #[test]
    fn test_non_paragraph_sibling_blocks_merge() {
        let ids = SequentialIds::new();
        let input = vec![
            para("$$a"),
            BlockNode::heading(1, vec![InlineNode::text("h")]),
            para("b$$"),
        ];
        assert_eq!(merge_adjacent_formulas(input.clone(), &ids), input);
    }

    #[test]
    fn test_paired_delimiters_do_not_open() {
        let ids = SequentialIds::new();
        let input = vec![para("$$ $$ literal"), para("next $$")];
        assert_eq!(merge_adjacent_formulas(input.clone(), &ids), input);
    }

    #[test]
    fn test_text_after_closer_can_open_again() {
        let ids = SequentialIds::new();
        let merged = merge_adjacent_formulas(
            vec![para("$$a"), para("b$$ mid $$c"), para("d$$")],
            &ids,
        );
        assert_eq!(
            merged,
            vec![
                BlockNode::formula_block(Some("block-1".into()), "ab"),
                para("mid"),
                BlockNode::formula_block(Some("block-2".into()), "cd"),
            ]
        );
    }

    #[test]
    fn test_inline_formulas_in_remainders_are_parsed() {
        let ids = SequentialIds::new();
        let merged = merge_adjacent_formulas(vec![para("let $x$ be $$x"), para("=1$$")], &ids);
        assert_eq!(
            merged,
            vec![
                BlockNode::paragraph(vec![InlineNode::text("let "), InlineNode::formula("x"), InlineNode::text(" be")]),
                BlockNode::formula_block(Some("block-1".into()), "x=1"),
            ]
        );
    }

    #[test]
    fn test_empty_formula_is_not_merged() {
        let ids = SequentialIds::new();
        let input = vec![para("a $$"), para(" "), para("$$ b")];
        assert_eq!(merge_adjacent_formulas(input.clone(), &ids), input);
    }
}
