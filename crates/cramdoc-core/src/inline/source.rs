// SPDX-License-Identifier: AGPL-3.0-or-later
//! Inline nodes back to source text
//!
//! The encoding is the one [`parse_inline`](super::parse_inline) reads, so
//! parsing the result yields the same nodes again. Marks are not encoded.

use super::kinds::{Formula, HardBreak};
use crate::ast::InlineNode;

/// Encode inline content as source text
pub fn source_text(nodes: &[InlineNode]) -> String {
    // Hard breaks only survive as `\\` in text the parser will split on them
    let has_dollar = nodes.iter().any(|node| match node {
        InlineNode::Text { text, .. } => text.contains(Formula::INLINE as char),
        InlineNode::InlineLatex { .. } => true,
        _ => false,
    });

    let mut output = String::new();
    for node in nodes {
        write_inline(&mut output, node, has_dollar);
    }
    output
}

fn write_inline(output: &mut String, node: &InlineNode, has_dollar: bool) {
    match node {
        InlineNode::Text { text, .. } => output.push_str(text),
        InlineNode::HardBreak => {
            if !has_dollar {
                output.push_str(HardBreak::MARKER);
            }
            output.push('\n');
        }
        InlineNode::InlineLatex { attrs } => {
            let delim = Formula::INLINE as char;
            output.push(delim);
            output.push_str(&attrs.formula);
            output.push(delim);
        }
        InlineNode::Image { attrs } => {
            output.push_str("![");
            output.push_str(&attrs.alt);
            output.push_str("](");
            output.push_str(&attrs.src);
            output.push(')');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inline::{inline_only, parse_inline};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_encode_mixed_content() {
        let nodes = vec![
            InlineNode::text("see "),
            InlineNode::formula("x^2"),
            InlineNode::text(" and "),
            InlineNode::image("a.png", "fig"),
        ];
        assert_eq!(source_text(&nodes), "see $x^2$ and ![fig](a.png)");
    }

    #[test]
    fn test_hard_break_marker_depends_on_formulas() {
        let plain = vec![InlineNode::text("a"), InlineNode::HardBreak, InlineNode::text("b")];
        assert_eq!(source_text(&plain), "a\\\\\nb");

        let with_formula = vec![
            InlineNode::formula("x"),
            InlineNode::HardBreak,
            InlineNode::text("b"),
        ];
        assert_eq!(source_text(&with_formula), "$x$\nb");
    }

    #[test]
    fn test_reparse_gives_same_nodes() {
        let nodes = vec![InlineNode::text("a"), InlineNode::HardBreak, InlineNode::text("b")];
        assert_eq!(inline_only(parse_inline(&source_text(&nodes))), nodes);
    }
}
