// SPDX-License-Identifier: AGPL-3.0-or-later
//! Turning inline segments into sibling blocks
//!
//! A paragraph cannot hold a display formula, so a paragraph whose text
//! contains one is split around it: text before, the formula block, text after.

use super::Segment;
use crate::ast::{BlockNode, InlineNode};
use crate::ids::IdGenerator;

/// Split segments into paragraphs and display formula blocks
///
/// Text touching a lifted formula loses its whitespace on that side, and
/// paragraphs left empty by that are dropped. Returns nothing for no segments.
pub fn lift_block_formulas(segments: Vec<Segment>, ids: &dyn IdGenerator) -> Vec<BlockNode> {
    lift(segments, || Some(ids.next_id()))
}

/// Like [`lift_block_formulas`] for content inside lists and quotes
///
/// Flat blocks only carry ids for top-level nodes, so formulas lifted here
/// get no id.
pub fn lift_nested_formulas(segments: Vec<Segment>) -> Vec<BlockNode> {
    lift(segments, || None)
}

fn lift(segments: Vec<Segment>, mut next_id: impl FnMut() -> Option<String>) -> Vec<BlockNode> {
    let mut blocks = Vec::new();
    let mut run = Vec::new();
    let mut after_formula = false;

    for segment in segments {
        match segment {
            Segment::Inline(node) => run.push(node),
            Segment::BlockFormula(formula) => {
                flush_paragraph(&mut blocks, std::mem::take(&mut run), after_formula, true);
                blocks.push(BlockNode::formula_block(next_id(), formula));
                after_formula = true;
            }
        }
    }
    flush_paragraph(&mut blocks, run, after_formula, false);

    blocks
}

/// Inline content for nodes that cannot be split; display formulas degrade
/// to inline ones
pub fn inline_only(segments: Vec<Segment>) -> Vec<InlineNode> {
    segments
        .into_iter()
        .map(|segment| match segment {
            Segment::Inline(node) => node,
            Segment::BlockFormula(formula) => InlineNode::formula(formula),
        })
        .collect()
}

fn flush_paragraph(
    blocks: &mut Vec<BlockNode>,
    mut run: Vec<InlineNode>,
    trim_start: bool,
    trim_end: bool,
) {
    if trim_start {
        trim_leading(&mut run);
    }
    if trim_end {
        trim_trailing(&mut run);
    }
    if !run.is_empty() {
        blocks.push(BlockNode::paragraph(run));
    }
}

fn trim_leading(run: &mut Vec<InlineNode>) {
    while let Some(InlineNode::Text { text, .. }) = run.first_mut() {
        let kept = text.trim_start().len();
        if kept == 0 {
            run.remove(0);
            continue;
        }
        let cut = text.len() - kept;
        text.drain(..cut);
        break;
    }
}

fn trim_trailing(run: &mut Vec<InlineNode>) {
    while let Some(InlineNode::Text { text, .. }) = run.last_mut() {
        let kept = text.trim_end().len();
        if kept == 0 {
            run.pop();
            continue;
        }
        text.truncate(kept);
        break;
    }
}
