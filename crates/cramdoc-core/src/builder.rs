// SPDX-License-Identifier: AGPL-3.0-or-later
//! Flat blocks to the document tree
//!
//! Each block becomes one or more sibling nodes of the matching kind, with
//! inline content parsed from its text. Once all siblings exist, split
//! display formulas are merged back together.

use crate::ast::{
    BlockNode, EmbedKind, NodeIdAttrs, OrderedListAttrs, QuestionAttrs, RichDocument,
    TemplateAttrs,
};
use crate::block::{Block, BlockKind};
use crate::ids::IdGenerator;
use crate::inline::{inline_only, lift_block_formulas, lift_nested_formulas, parse_inline_with};
use crate::merge::merge_adjacent_formulas_with;
use crate::tokenizer::classify::{is_blank, CodeFence, Heading, ListMarker, MathFence, Quote};
use crate::tokenizer::tokenize;
use crate::traits::ParseConfig;
use serde_json::Value;
use tracing::debug;

/// Build a document with default parse options
pub fn build(blocks: &[Block], ids: &dyn IdGenerator) -> RichDocument {
    build_with(blocks, ids, &ParseConfig::default())
}

/// Build a document from flat blocks
///
/// An empty block list gives a document holding one empty paragraph.
pub fn build_with(blocks: &[Block], ids: &dyn IdGenerator, config: &ParseConfig) -> RichDocument {
    let content = build_siblings(blocks, ids, config);
    if content.is_empty() {
        RichDocument::empty()
    } else {
        RichDocument::new(content)
    }
}

/// Tokenize text and build a document from it
pub fn build_from_text(text: &str, ids: &dyn IdGenerator, config: &ParseConfig) -> RichDocument {
    build_with(&tokenize(text, ids), ids, config)
}

fn build_siblings(blocks: &[Block], ids: &dyn IdGenerator, config: &ParseConfig) -> Vec<BlockNode> {
    let mut siblings = Vec::with_capacity(blocks.len());
    for block in blocks {
        lower_block(block, ids, config, &mut siblings);
    }
    merge_adjacent_formulas_with(siblings, ids, config)
}

fn lower_block(block: &Block, ids: &dyn IdGenerator, config: &ParseConfig, out: &mut Vec<BlockNode>) {
    match &block.kind {
        BlockKind::Heading { level } => {
            let text = Heading::text(&block.content);
            out.push(BlockNode::heading(*level, inline_only(parse_inline_with(text, config))));
        }
        BlockKind::FencedCode { language } => out.push(code_or_embed(block, language)),
        BlockKind::FencedMath => math_block(block, ids, config, out),
        BlockKind::Blockquote => {
            let text = block
                .content
                .lines()
                .map(Quote::strip)
                .collect::<Vec<_>>()
                .join("\n");
            let mut content = lift_nested_formulas(parse_inline_with(&text, config));
            if content.is_empty() {
                content.push(BlockNode::empty_paragraph());
            }
            out.push(BlockNode::Blockquote { content });
        }
        BlockKind::List { ordered } => out.push(list(&block.content, *ordered, config)),
        BlockKind::Paragraph => {
            out.extend(lift_block_formulas(parse_inline_with(&block.content, config), ids));
        }
        BlockKind::Text => {
            // Legacy text may hold any markup, so it goes through the tokenizer
            let before = out.len();
            let mut tokens = tokenize(&block.content, ids);
            // A text block holding one construct keeps its id (flattened formulas)
            if let [only] = tokens.as_mut_slice() {
                only.id = block.id.clone();
            }
            for token in tokens {
                lower_block(&token, ids, config, out);
            }
            if out.len() == before {
                out.push(BlockNode::empty_paragraph());
            }
        }
        BlockKind::Question { question_id } => out.push(BlockNode::QuestionBlock {
            attrs: QuestionAttrs {
                id: Some(block.id.clone()),
                question_id: question_id.clone(),
            },
        }),
        BlockKind::Template { template_id } => out.push(BlockNode::TemplateBlock {
            attrs: TemplateAttrs {
                id: Some(block.id.clone()),
                template_id: template_id.clone(),
            },
        }),
        BlockKind::PageBreak => out.push(BlockNode::PageBreak {
            attrs: NodeIdAttrs {
                id: Some(block.id.clone()),
            },
        }),
        BlockKind::Embed { kind, data } => {
            out.push(BlockNode::embed(*kind, Some(block.id.clone()), data.clone()));
        }
    }
}

/// Code fence body, or an embed when the fence carries a reserved tag and
/// a well-formed JSON body
fn code_or_embed(block: &Block, language: &str) -> BlockNode {
    let mut lines: Vec<&str> = block.content.split('\n').collect();
    if !lines.is_empty() {
        lines.remove(0);
    }
    let closed = lines.last().is_some_and(|line| CodeFence::closes(line));
    if closed {
        lines.pop();
    }
    let body = lines.join("\n");
    let language = language.trim();

    if let Some(kind) = EmbedKind::from_fence_tag(language).filter(|_| closed) {
        match serde_json::from_str::<Value>(&body) {
            Ok(data) => return BlockNode::embed(kind, Some(block.id.clone()), data),
            Err(e) => debug!(error = %e, tag = language, "embed body is not JSON, kept as code"),
        }
    }

    let language = (!language.is_empty()).then(|| language.to_string());
    BlockNode::code_block(language, &body)
}

/// Fenced math becomes a formula block; text after a closing `$$` on the
/// same line becomes a following paragraph
fn math_block(block: &Block, ids: &dyn IdGenerator, config: &ParseConfig, out: &mut Vec<BlockNode>) {
    let lines: Vec<&str> = block.content.split('\n').collect();
    let Some((first, rest)) = lines.split_first() else {
        return;
    };
    let opener = first.trim_start();
    let opener = opener.strip_prefix(MathFence::DELIM).unwrap_or(opener);

    let (formula, trailing) = if let Some(at) = opener.find(MathFence::DELIM) {
        (opener[..at].to_string(), &opener[at + MathFence::DELIM.len()..])
    } else {
        let mut body: Vec<&str> = vec![opener];
        let mut trailing = "";
        match rest.split_last() {
            Some((last, middle)) if MathFence::closes(last) => {
                body.extend_from_slice(middle);
                let closer = last.trim_start();
                trailing = &closer[MathFence::DELIM.len()..];
            }
            _ => body.extend_from_slice(rest),
        }
        (body.join("\n"), trailing)
    };

    let formula = formula.trim();
    if formula.is_empty() {
        // Nothing to typeset; keep the source visible
        out.extend(lift_block_formulas(parse_inline_with(&block.content, config), ids));
        return;
    }
    out.push(BlockNode::formula_block(Some(block.id.clone()), formula));

    let trailing = trailing.trim();
    if !trailing.is_empty() {
        out.extend(lift_block_formulas(parse_inline_with(trailing, config), ids));
    }
}

fn list(content: &str, ordered: bool, config: &ParseConfig) -> BlockNode {
    let mut items: Vec<String> = Vec::new();
    let mut start = None;

    for line in content.lines() {
        let item = if ordered {
            ListMarker::ordered(line).map(|(number, body)| {
                start.get_or_insert(number);
                body
            })
        } else {
            ListMarker::bullet_body(line)
        };

        if let Some(body) = item {
            items.push(body.trim().to_string());
        } else if is_blank(line) {
            continue;
        } else if let Some(last) = items.last_mut() {
            last.push('\n');
            last.push_str(line.trim());
        } else {
            items.push(line.trim().to_string());
        }
    }

    let content = items
        .iter()
        .map(|text| {
            let mut paragraphs = lift_nested_formulas(parse_inline_with(text, config));
            if paragraphs.is_empty() {
                paragraphs.push(BlockNode::empty_paragraph());
            }
            BlockNode::ListItem { content: paragraphs }
        })
        .collect();

    if ordered {
        BlockNode::OrderedList {
            attrs: OrderedListAttrs {
                start: start.unwrap_or(1),
            },
            content,
        }
    } else {
        BlockNode::BulletList { content }
    }
}
