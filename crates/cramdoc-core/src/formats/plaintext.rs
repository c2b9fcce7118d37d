// SPDX-License-Identifier: AGPL-3.0-or-later
//! Plain text format handler

use crate::ast::{BlockNode, InlineNode, RichDocument};
use crate::traits::{
    FormatHandler, ParseConfig, Parser, RenderConfig, Renderer, Result, SourceFormat,
};

/// Plain text format handler
pub struct PlainTextHandler;

impl PlainTextHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlainTextHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for PlainTextHandler {
    fn format(&self) -> SourceFormat {
        SourceFormat::PlainText
    }

    fn parse(&self, input: &str, _config: &ParseConfig) -> Result<RichDocument> {
        // Split into paragraphs on blank lines; no markup is recognized
        let paragraphs: Vec<BlockNode> = input
            .split("\n\n")
            .filter(|p| !p.trim().is_empty())
            .map(|p| BlockNode::paragraph(vec![InlineNode::text(p.trim())]))
            .collect();

        if paragraphs.is_empty() {
            return Ok(RichDocument::empty());
        }
        Ok(RichDocument::new(paragraphs))
    }
}

impl Renderer for PlainTextHandler {
    fn format(&self) -> SourceFormat {
        SourceFormat::PlainText
    }

    fn render(&self, doc: &RichDocument, _config: &RenderConfig) -> Result<String> {
        Ok(plain_text(doc))
    }
}

impl FormatHandler for PlainTextHandler {
    fn supports_feature(&self, _feature: &str) -> bool {
        false // Plain text doesn't support any special features
    }

    fn supported_features(&self) -> &[&str] {
        &[]
    }
}

/// Visible text of a document, one block per paragraph
///
/// Formulas contribute their source; domain blocks contribute nothing.
pub fn plain_text(doc: &RichDocument) -> String {
    let mut blocks = Vec::new();
    for block in &doc.content {
        let mut output = String::new();
        render_block(&mut output, block);
        if !output.trim().is_empty() {
            blocks.push(output);
        }
    }
    blocks.join("\n\n")
}

fn render_block(output: &mut String, block: &BlockNode) {
    match block {
        BlockNode::Paragraph { content }
        | BlockNode::Heading { content, .. }
        | BlockNode::CodeBlock { content, .. } => {
            for inline in content {
                render_inline(output, inline);
            }
        }
        BlockNode::LatexBlock { attrs } => output.push_str(&attrs.formula),
        BlockNode::Blockquote { content }
        | BlockNode::BulletList { content }
        | BlockNode::OrderedList { content, .. }
        | BlockNode::ListItem { content }
        | BlockNode::Unknown { content, .. } => {
            for (i, block) in content.iter().enumerate() {
                if i > 0 && !output.is_empty() && !output.ends_with('\n') {
                    output.push('\n');
                }
                render_block(output, block);
            }
        }
        _ => {}
    }
}

fn render_inline(output: &mut String, inline: &InlineNode) {
    match inline {
        InlineNode::Text { text, .. } => output.push_str(text),
        InlineNode::HardBreak => output.push('\n'),
        InlineNode::InlineLatex { attrs } => output.push_str(&attrs.formula),
        InlineNode::Image { attrs } => output.push_str(&attrs.alt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple() {
        let handler = PlainTextHandler::new();
        let doc = handler
            .parse("Hello world\n\nSecond paragraph", &ParseConfig::default())
            .unwrap();

        assert_eq!(doc.content.len(), 2);
    }

    #[test]
    fn test_dollars_stay_literal() {
        let handler = PlainTextHandler::new();
        let doc = handler.parse("costs $5 or $6", &ParseConfig::default()).unwrap();
        assert_eq!(
            doc.content,
            vec![BlockNode::paragraph(vec![InlineNode::text("costs $5 or $6")])]
        );
    }

    #[test]
    fn test_roundtrip() {
        let handler = PlainTextHandler::new();
        let input = "Hello world\n\nSecond paragraph";
        let doc = handler.parse(input, &ParseConfig::default()).unwrap();
        let output = handler.render(&doc, &RenderConfig::default()).unwrap();

        assert_eq!(output, input);
    }

    #[test]
    fn test_render_nested_and_formulas() {
        let doc = RichDocument::new(vec![
            BlockNode::paragraph(vec![InlineNode::text("x is "), InlineNode::formula("x^2")]),
            BlockNode::BulletList {
                content: vec![
                    BlockNode::ListItem {
                        content: vec![BlockNode::paragraph(vec![InlineNode::text("a")])],
                    },
                    BlockNode::ListItem {
                        content: vec![BlockNode::paragraph(vec![InlineNode::text("b")])],
                    },
                ],
            },
            BlockNode::formula_block(None, "y"),
        ]);
        assert_eq!(plain_text(&doc), "x is x^2\n\na\nb\n\ny");
    }

    #[test]
    fn test_empty_input() {
        let doc = PlainTextHandler::new()
            .parse("\n\n", &ParseConfig::default())
            .unwrap();
        assert_eq!(doc, RichDocument::empty());
    }
}
