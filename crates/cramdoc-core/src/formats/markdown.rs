// SPDX-License-Identifier: AGPL-3.0-or-later
//! Markdown format handler
//!
//! Parsing runs the block tokenizer and tree builder. Rendering is a whole
//! document export: unlike the flattener it recurses into containers and
//! writes marks, and domain blocks become bracketed placeholders.

use crate::ast::{BlockNode, InlineNode, Mark, RichDocument};
use crate::builder::build_from_text;
use crate::ids::{IdGenerator, UuidIds};
use crate::inline::kinds::{Emphasis, Formula};
use crate::traits::{
    FormatHandler, ParseConfig, Parser, RenderConfig, Renderer, Result, SourceFormat,
};
use serde_json::Value;
use std::sync::Arc;

/// Markdown format handler (linear text with embedded formulas)
pub struct MarkdownHandler {
    ids: Arc<dyn IdGenerator>,
}

impl MarkdownHandler {
    pub fn new() -> Self {
        Self::with_ids(Arc::new(UuidIds))
    }

    pub fn with_ids(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }
}

impl Default for MarkdownHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for MarkdownHandler {
    fn format(&self) -> SourceFormat {
        SourceFormat::Markdown
    }

    fn parse(&self, input: &str, config: &ParseConfig) -> Result<RichDocument> {
        Ok(build_from_text(input, self.ids.as_ref(), config))
    }
}

impl Renderer for MarkdownHandler {
    fn format(&self) -> SourceFormat {
        SourceFormat::Markdown
    }

    fn render(&self, doc: &RichDocument, config: &RenderConfig) -> Result<String> {
        Ok(to_markdown(doc, config))
    }
}

impl FormatHandler for MarkdownHandler {
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
        ]
    }
}

/// Export a whole document as Markdown
pub fn to_markdown(doc: &RichDocument, config: &RenderConfig) -> String {
    let mut blocks = Vec::with_capacity(doc.content.len());
    for block in &doc.content {
        let mut output = String::new();
        render_block(&mut output, block, config);
        if !output.trim().is_empty() {
            blocks.push(output);
        }
    }
    blocks.join("\n\n").trim_end().to_string()
}

fn render_block(output: &mut String, block: &BlockNode, config: &RenderConfig) {
    match block {
        BlockNode::Paragraph { content } => render_inlines(output, content),

        BlockNode::Heading { attrs, content } => {
            output.push_str(&"#".repeat(usize::from(attrs.level)));
            output.push(' ');
            render_inlines(output, content);
        }

        BlockNode::CodeBlock { attrs, content } => {
            let language = attrs
                .language
                .as_deref()
                .filter(|lang| !lang.is_empty())
                .unwrap_or(&config.code_language_fallback);
            output.push_str("```");
            output.push_str(language);
            output.push('\n');
            for inline in content {
                if let InlineNode::Text { text, .. } = inline {
                    output.push_str(text);
                }
            }
            output.push_str("\n```");
        }

        BlockNode::BulletList { content } => render_list(output, content, None, config),
        BlockNode::OrderedList { attrs, content } => {
            render_list(output, content, Some(attrs.start), config)
        }

        BlockNode::Blockquote { content } => {
            let inner = render_children(content, config, "\n");
            let lines: Vec<String> = inner.lines().map(|line| format!("> {line}")).collect();
            output.push_str(&lines.join("\n"));
        }

        BlockNode::LatexBlock { attrs } => {
            output.push_str(Formula::DISPLAY);
            output.push('\n');
            output.push_str(&attrs.formula);
            output.push('\n');
            output.push_str(Formula::DISPLAY);
        }

        BlockNode::QuestionBlock { attrs } => {
            output.push_str(&format!(
                "[Question Block: {}]",
                placeholder_id(attrs.question_id.as_ref())
            ));
        }

        BlockNode::TemplateBlock { attrs } => {
            output.push_str(&format!(
                "[Template Block: {}]",
                placeholder_id(attrs.template_id.as_ref())
            ));
        }

        BlockNode::Diagram2D { .. } | BlockNode::Diagram3D { .. } | BlockNode::CircuitBlock { .. } => {
            output.push_str(&format!("[{}]", block.node_type()));
        }

        BlockNode::PageBreak { .. } => {}

        BlockNode::ListItem { content } | BlockNode::Unknown { content, .. } => {
            output.push_str(&render_children(content, config, "\n\n"));
        }
    }
}

fn render_children(children: &[BlockNode], config: &RenderConfig, separator: &str) -> String {
    children
        .iter()
        .map(|child| {
            let mut output = String::new();
            render_block(&mut output, child, config);
            output
        })
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

fn render_list(output: &mut String, items: &[BlockNode], start: Option<u32>, config: &RenderConfig) {
    let mut lines = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let prefix = match start {
            Some(start) => format!("{}. ", u64::from(start) + i as u64),
            None => "- ".to_string(),
        };
        let text = match item.children() {
            Some(children) => render_children(children, config, "\n"),
            None => String::new(),
        };
        let mut item_lines = text.trim().lines();
        lines.push(format!("{prefix}{}", item_lines.next().unwrap_or_default()));
        lines.extend(item_lines.map(|line| format!("  {line}")));
    }
    output.push_str(&lines.join("\n"));
}

fn render_inlines(output: &mut String, content: &[InlineNode]) {
    for inline in content {
        render_inline(output, inline);
    }
}

fn render_inline(output: &mut String, inline: &InlineNode) {
    match inline {
        InlineNode::Text { text, marks } => {
            let mut wrapped = text.clone();
            for mark in marks {
                let delim = match mark {
                    Mark::Bold => Emphasis::BOLD,
                    Mark::Italic => Emphasis::ITALIC,
                    Mark::Code => Emphasis::CODE,
                    _ => continue,
                };
                wrapped = format!("{delim}{wrapped}{delim}");
            }
            output.push_str(&wrapped);
        }

        InlineNode::HardBreak => output.push('\n'),

        InlineNode::InlineLatex { attrs } => {
            let delim = Formula::INLINE as char;
            output.push(delim);
            output.push_str(&attrs.formula);
            output.push(delim);
        }

        InlineNode::Image { attrs } => {
            output.push_str(&format!("![{}]({})", attrs.alt, attrs.src));
        }
    }
}

fn placeholder_id(id: Option<&Value>) -> String {
    match id {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
