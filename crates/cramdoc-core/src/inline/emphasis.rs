// SPDX-License-Identifier: AGPL-3.0-or-later
//! Opt-in `**bold**`, `*italic*` and `` `code` `` marks for plain text runs

use crate::ast::{InlineNode, Mark};
use regex::Regex;
use std::sync::OnceLock;

static CODE: OnceLock<Regex> = OnceLock::new();
static BOLD: OnceLock<Regex> = OnceLock::new();
static ITALIC: OnceLock<Regex> = OnceLock::new();

fn code() -> &'static Regex {
    CODE.get_or_init(|| Regex::new(r"`([^`\n]+)`").expect("Invalid code span regex"))
}

fn bold() -> &'static Regex {
    BOLD.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*|__(.+?)__").expect("Invalid bold regex"))
}

fn italic() -> &'static Regex {
    ITALIC.get_or_init(|| Regex::new(r"\*([^*\n]+?)\*|_([^_\n]+?)_").expect("Invalid italic regex"))
}

/// Split a text run into marked text nodes
pub fn split_emphasis(text: &str) -> Vec<InlineNode> {
    let mut nodes = Vec::new();
    let mut last = 0;
    for caps in code().captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        push_bold(&text[last..whole.start()], &mut nodes);
        push_marked(inner.as_str(), &[Mark::Code], &mut nodes);
        last = whole.end();
    }
    push_bold(&text[last..], &mut nodes);
    nodes
}

fn push_bold(text: &str, nodes: &mut Vec<InlineNode>) {
    let mut last = 0;
    for caps in bold().captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let Some(inner) = caps.get(1).or_else(|| caps.get(2)) else {
            continue;
        };
        push_italic(&text[last..whole.start()], &[], nodes);
        push_italic(inner.as_str(), &[Mark::Bold], nodes);
        last = whole.end();
    }
    push_italic(&text[last..], &[], nodes);
}

fn push_italic(text: &str, outer: &[Mark], nodes: &mut Vec<InlineNode>) {
    let bytes = text.as_bytes();
    let mut last = 0;
    for caps in italic().captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let Some(inner) = caps.get(1).or_else(|| caps.get(2)) else {
            continue;
        };
        let delim = bytes[whole.start()];
        let before = whole.start().checked_sub(1).map(|p| bytes[p]);
        let after = bytes.get(whole.end()).copied();
        if before == Some(delim) || after == Some(delim) {
            continue;
        }
        // snake_case identifiers
        if delim == b'_'
            && (before.is_some_and(|b| b.is_ascii_alphanumeric())
                || after.is_some_and(|b| b.is_ascii_alphanumeric()))
        {
            continue;
        }

        push_marked(&text[last..whole.start()], outer, nodes);
        let mut marks = outer.to_vec();
        marks.push(Mark::Italic);
        push_marked(inner.as_str(), &marks, nodes);
        last = whole.end();
    }
    push_marked(&text[last..], outer, nodes);
}

fn push_marked(text: &str, marks: &[Mark], nodes: &mut Vec<InlineNode>) {
    if !text.is_empty() {
        nodes.push(InlineNode::marked(text, marks.to_vec()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bold_and_italic() {
        assert_eq!(
            split_emphasis("a **b** *c*"),
            vec![
                InlineNode::text("a "),
                InlineNode::marked("b", vec![Mark::Bold]),
                InlineNode::text(" "),
                InlineNode::marked("c", vec![Mark::Italic]),
            ]
        );
    }

    #[test]
    fn test_italic_inside_bold() {
        assert_eq!(
            split_emphasis("**x *y***"),
            vec![
                InlineNode::marked("x *y", vec![Mark::Bold]),
                InlineNode::text("*"),
            ]
        );
    }

    #[test]
    fn test_code_span() {
        assert_eq!(
            split_emphasis("run `cargo *x*`"),
            vec![
                InlineNode::text("run "),
                InlineNode::marked("cargo *x*", vec![Mark::Code]),
            ]
        );
    }

    #[test]
    fn test_snake_case_is_not_italic() {
        assert_eq!(
            split_emphasis("my_var_name"),
            vec![InlineNode::text("my_var_name")]
        );
    }
}
