// SPDX-License-Identifier: AGPL-3.0-or-later
//! Document tree to flat blocks
//!
//! Only top-level children are lowered. Anything the flat format has no
//! type for is written back as a text block in the same markup the
//! tokenizer reads, so the result builds into the same tree again. Domain
//! blocks keep their own flat types and identifiers.

use crate::ast::{BlockNode, InlineNode, RichDocument};
use crate::block::{Block, BlockKind};
use crate::ids::IdGenerator;
use crate::inline::kinds::Formula;
use crate::inline::source_text;
use crate::tokenizer::classify::{CodeFence, Heading, ListMarker, Quote};
use crate::traits::{EmptyDocument, RenderConfig};
use tracing::debug;

/// Flatten with default render options
pub fn flatten(doc: &RichDocument, ids: &dyn IdGenerator) -> Vec<Block> {
    flatten_with(doc, ids, &RenderConfig::default())
}

/// Lower the top level of a document into flat blocks
pub fn flatten_with(doc: &RichDocument, ids: &dyn IdGenerator, config: &RenderConfig) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(doc.content.len());
    lower_siblings(&doc.content, ids, &mut blocks);

    if blocks.is_empty() && config.empty_document == EmptyDocument::Placeholder {
        blocks.push(Block::text(ids.next_id(), ""));
    }
    blocks
}

fn lower_siblings(nodes: &[BlockNode], ids: &dyn IdGenerator, out: &mut Vec<Block>) {
    for node in nodes {
        lower_node(node, ids, out);
    }
}

fn text_block(out: &mut Vec<Block>, id: String, text: String) {
    out.push(Block::text(id, text));
}

fn lower_node(node: &BlockNode, ids: &dyn IdGenerator, out: &mut Vec<Block>) {
    match node {
        BlockNode::Paragraph { content } => {
            let text = source_text(content);
            if !text.trim().is_empty() {
                text_block(out, ids.next_id(), text);
            }
        }
        BlockNode::Heading { attrs, content } => {
            let marker = Heading::MARKER
                .to_string()
                .repeat(usize::from(attrs.level.clamp(1, 6)));
            text_block(out, ids.next_id(), format!("{marker} {}", source_text(content)));
        }
        BlockNode::BulletList { content } => {
            text_block(out, ids.next_id(), list_text(content, None));
        }
        BlockNode::OrderedList { attrs, content } => {
            text_block(out, ids.next_id(), list_text(content, Some(attrs.start)));
        }
        BlockNode::Blockquote { content } => {
            text_block(out, ids.next_id(), quote_text(content));
        }
        BlockNode::CodeBlock { attrs, content } => {
            let language = attrs.language.as_deref().unwrap_or_default();
            let code = plain_inline_text(content);
            text_block(
                out,
                ids.next_id(),
                format!("{fence}{language}\n{code}\n{fence}", fence = CodeFence::TICKS),
            );
        }
        BlockNode::LatexBlock { attrs } => {
            let id = attrs.id.clone().unwrap_or_else(|| ids.next_id());
            text_block(out, id, formula_text(&attrs.formula, attrs.display_mode, true));
        }
        BlockNode::QuestionBlock { attrs } => out.push(Block::new(
            attrs.id.clone().unwrap_or_else(|| ids.next_id()),
            BlockKind::Question {
                question_id: attrs.question_id.clone(),
            },
            "",
        )),
        BlockNode::TemplateBlock { attrs } => out.push(Block::new(
            attrs.id.clone().unwrap_or_else(|| ids.next_id()),
            BlockKind::Template {
                template_id: attrs.template_id.clone(),
            },
            "",
        )),
        BlockNode::PageBreak { attrs } => out.push(Block::new(
            attrs.id.clone().unwrap_or_else(|| ids.next_id()),
            BlockKind::PageBreak,
            "",
        )),
        BlockNode::Diagram2D { .. } | BlockNode::Diagram3D { .. } | BlockNode::CircuitBlock { .. } => {
            if let Some((kind, id, data)) = node.as_embed() {
                out.push(Block::new(
                    id.map_or_else(|| ids.next_id(), str::to_string),
                    BlockKind::Embed {
                        kind,
                        data: data.clone(),
                    },
                    "",
                ));
            }
        }
        BlockNode::ListItem { content } => lower_siblings(content, ids, out),
        BlockNode::Unknown { node_type, content } => {
            if content.is_empty() {
                debug!(node_type = %node_type, "dropping node with no flat form");
            } else {
                lower_siblings(content, ids, out);
            }
        }
    }
}

/// Formula in its source delimiters; multi-line display form when `fenced`
fn formula_text(formula: &str, display_mode: bool, fenced: bool) -> String {
    let inline = Formula::INLINE as char;
    match (display_mode, fenced) {
        (true, true) => format!("{d}\n{formula}\n{d}", d = Formula::DISPLAY),
        (true, false) => format!("{d}{formula}{d}", d = Formula::DISPLAY),
        (false, _) => format!("{inline}{formula}{inline}"),
    }
}

fn plain_inline_text(content: &[InlineNode]) -> String {
    content
        .iter()
        .filter_map(|node| match node {
            InlineNode::Text { text, .. } => Some(text.as_str()),
            InlineNode::HardBreak => Some("\n"),
            _ => None,
        })
        .collect()
}

/// Text of a nested node, for containers that flatten to a single text block
fn extract_text(node: &BlockNode) -> String {
    match node {
        BlockNode::Paragraph { content } | BlockNode::Heading { content, .. } => {
            source_text(content)
        }
        BlockNode::CodeBlock { content, .. } => plain_inline_text(content),
        BlockNode::LatexBlock { attrs } => {
            formula_text(&attrs.formula, attrs.display_mode, false)
        }
        _ => node
            .children()
            .map(|children| {
                children
                    .iter()
                    .map(extract_text)
                    .filter(|text| !text.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default(),
    }
}

fn list_text(items: &[BlockNode], start: Option<u32>) -> String {
    let indent = " ".repeat(ListMarker::CONTINUATION_INDENT);
    let mut lines = Vec::new();

    for (index, item) in items.iter().enumerate() {
        let marker = match start {
            Some(start) => format!("{}. ", u64::from(start) + index as u64),
            None => format!("{} ", ListMarker::BULLETS[0]),
        };
        let text = extract_text(item);
        let mut item_lines = text.lines();
        lines.push(format!("{marker}{}", item_lines.next().unwrap_or_default()));
        for line in item_lines {
            lines.push(format!("{indent}{line}"));
        }
    }
    lines.join("\n")
}

fn quote_text(content: &[BlockNode]) -> String {
    let text = content
        .iter()
        .map(extract_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    let prefix = format!("{} ", Quote::MARKER);
    if text.is_empty() {
        return prefix;
    }
    text.lines()
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
