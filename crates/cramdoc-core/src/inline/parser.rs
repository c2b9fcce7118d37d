// SPDX-License-Identifier: AGPL-3.0-or-later
//! Text to inline segments
//!
//! Recognition runs in a fixed order: hard breaks split the text first (only
//! when it contains no `$`), then display formulas are taken from each piece,
//! then inline formulas from the gaps between display formulas, then images
//! from what is left. Each step only sees text earlier steps did not claim.

use super::emphasis::split_emphasis;
use super::kinds::Formula;
use super::Segment;
use crate::ast::InlineNode;
use crate::traits::ParseConfig;
use regex::Regex;
use std::sync::OnceLock;

static DISPLAY_FORMULA: OnceLock<Regex> = OnceLock::new();
static IMAGE_LINK: OnceLock<Regex> = OnceLock::new();
static HARD_BREAK: OnceLock<Regex> = OnceLock::new();

fn display_formula() -> &'static Regex {
    DISPLAY_FORMULA
        .get_or_init(|| Regex::new(r"(?s)\$\$(.*?)\$\$").expect("Invalid display formula regex"))
}

fn image_link() -> &'static Regex {
    IMAGE_LINK
        .get_or_init(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").expect("Invalid image regex"))
}

fn hard_break() -> &'static Regex {
    HARD_BREAK
        .get_or_init(|| Regex::new(r"(?m)\\\\[ \t]*(?:\r?\n|$)").expect("Invalid hard break regex"))
}

/// Parse text with default options (no emphasis)
pub fn parse_inline(text: &str) -> Vec<Segment> {
    parse_inline_with(text, &ParseConfig::default())
}

/// Parse text into inline nodes and display formulas, in source order
pub fn parse_inline_with(text: &str, config: &ParseConfig) -> Vec<Segment> {
    let mut segments = Vec::new();

    // `\\` is a LaTeX row separator whenever formulas may be present
    if text.contains(Formula::INLINE as char) {
        parse_run(text, config, &mut segments);
        return segments;
    }

    let mut last = 0;
    for m in hard_break().find_iter(text) {
        parse_run(&text[last..m.start()], config, &mut segments);
        segments.push(Segment::Inline(InlineNode::HardBreak));
        last = m.end();
    }
    parse_run(&text[last..], config, &mut segments);
    segments
}

fn parse_run(run: &str, config: &ParseConfig, out: &mut Vec<Segment>) {
    let mut last = 0;
    for caps in display_formula().captures_iter(run) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let formula = body.as_str().trim();
        if formula.is_empty() {
            continue;
        }
        push_inline_formulas(run, last, whole.start(), config, out);
        out.push(Segment::BlockFormula(formula.to_string()));
        last = whole.end();
    }
    push_inline_formulas(run, last, run.len(), config, out);
}

/// Inline formulas found in `text[from..to]`; neighbours outside the range
/// still count for the adjacency rule
fn push_inline_formulas(
    text: &str,
    from: usize,
    to: usize,
    config: &ParseConfig,
    out: &mut Vec<Segment>,
) {
    let mut last = from;
    for span in inline_formula_spans(text, from, to) {
        push_with_images(&text[last..span.start], config, out);
        out.push(Segment::Inline(InlineNode::formula(span.formula)));
        last = span.end;
    }
    push_with_images(&text[last..to], config, out);
}

fn push_with_images(text: &str, config: &ParseConfig, out: &mut Vec<Segment>) {
    let mut last = 0;
    for caps in image_link().captures_iter(text) {
        let (Some(whole), Some(alt), Some(src)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        push_residual(&text[last..whole.start()], config, out);
        out.push(Segment::Inline(InlineNode::image(
            src.as_str().trim(),
            alt.as_str(),
        )));
        last = whole.end();
    }

    if last == 0 {
        push_plain(text, config, out);
    } else {
        push_residual(&text[last..], config, out);
    }
}

/// Text cut loose by an image gets one more look for inline formulas
fn push_residual(text: &str, config: &ParseConfig, out: &mut Vec<Segment>) {
    let mut last = 0;
    for span in inline_formula_spans(text, 0, text.len()) {
        push_plain(&text[last..span.start], config, out);
        out.push(Segment::Inline(InlineNode::formula(span.formula)));
        last = span.end;
    }
    push_plain(&text[last..], config, out);
}

fn push_plain(text: &str, config: &ParseConfig, out: &mut Vec<Segment>) {
    if text.is_empty() {
        return;
    }
    if config.parse_emphasis {
        out.extend(split_emphasis(text).into_iter().map(Segment::Inline));
    } else {
        out.push(Segment::Inline(InlineNode::text(text)));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FormulaSpan<'a> {
    start: usize,
    end: usize,
    formula: &'a str,
}

/// Scan for `$...$` pairs on a single line
///
/// A pair is rejected when the opener is escaped or either delimiter touches
/// another `$`; scanning then resumes after the rejected closer.
fn inline_formula_spans(text: &str, from: usize, to: usize) -> Vec<FormulaSpan<'_>> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut i = from;

    while i < to {
        if bytes[i] != Formula::INLINE {
            i += 1;
            continue;
        }
        let Some(offset) = text[i + 1..to].find(['$', '\n']) else {
            break;
        };
        let close = i + 1 + offset;
        if bytes[close] == b'\n' {
            i = close + 1;
            continue;
        }
        if close == i + 1 {
            // `$$` with nothing between; the second `$` may still open a pair
            i += 1;
            continue;
        }

        let before = i.checked_sub(1).map(|p| bytes[p]);
        let after = bytes.get(close + 1).copied();
        let escaped = before == Some(Formula::ESCAPE);
        let adjacent = before == Some(Formula::INLINE) || after == Some(Formula::INLINE);
        let formula = text[i + 1..close].trim();

        if !escaped && !adjacent && !formula.is_empty() {
            spans.push(FormulaSpan {
                start: i,
                end: close + 1,
                formula,
            });
        }
        i = close + 1;
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Mark;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn text(s: &str) -> Segment {
        Segment::Inline(InlineNode::text(s))
    }

    fn formula(s: &str) -> Segment {
        Segment::Inline(InlineNode::formula(s))
    }

    fn display(s: &str) -> Segment {
        Segment::BlockFormula(s.to_string())
    }

    fn hard_break() -> Segment {
        Segment::Inline(InlineNode::HardBreak)
    }

    #[test]
    fn test_inline_formula() {
        assert_eq!(parse_inline("$x$"), vec![formula("x")]);
    }

    #[test]
    fn test_display_formula() {
        assert_eq!(parse_inline("$$x$$"), vec![display("x")]);
    }

    #[test]
    fn test_empty_display_formula_stays_literal() {
        assert_eq!(parse_inline("$$$$"), vec![text("$$$$")]);
    }

    #[test]
    fn test_formulas_in_text_order() {
        assert_eq!(
            parse_inline("Let $a$ be $$a^2$$ and $b$."),
            vec![
                text("Let "),
                formula("a"),
                text(" be "),
                display("a^2"),
                text(" and "),
                formula("b"),
                text("."),
            ]
        );
    }

    #[test]
    fn test_formula_content_is_trimmed() {
        assert_eq!(parse_inline("$$ \n x + 1 \n $$"), vec![display("x + 1")]);
        assert_eq!(parse_inline("a $ y $ b"), vec![text("a "), formula("y"), text(" b")]);
    }

    #[rstest]
    #[case::whitespace_only("$ $")]
    #[case::spans_lines("$a\nb$")]
    #[case::escaped("\\$5 and $6")]
    #[case::unterminated("costs $5")]
    fn test_dollar_text_stays_literal(#[case] input: &str) {
        assert_eq!(parse_inline(input), vec![text(input)]);
    }

    #[test]
    fn test_inline_pair_touching_display_formula_is_literal() {
        assert_eq!(parse_inline("$$a$$$b$"), vec![display("a"), text("$b$")]);
    }

    #[test]
    fn test_hard_break() {
        assert_eq!(
            parse_inline("a\\\\\nb"),
            vec![text("a"), hard_break(), text("b")]
        );
    }

    #[test]
    fn test_hard_break_consumes_trailing_blanks() {
        assert_eq!(
            parse_inline("a\\\\  \r\nb"),
            vec![text("a"), hard_break(), text("b")]
        );
    }

    #[test]
    fn test_row_separator_kept_when_dollar_present() {
        assert_eq!(
            parse_inline("$\\frac{a}{b}\\\\$"),
            vec![formula("\\frac{a}{b}\\\\")]
        );
    }

    #[test]
    fn test_any_dollar_suppresses_line_end_breaks() {
        assert_eq!(
            parse_inline("a\\\\\nb x"),
            vec![text("a"), hard_break(), text("b x")]
        );
        assert_eq!(
            parse_inline("a\\\\\nb $x$"),
            vec![text("a\\\\\nb "), formula("x")]
        );
        assert_eq!(
            parse_inline("$$a\\\\\nb$$"),
            vec![display("a\\\\\nb")]
        );
    }

    #[test]
    fn test_trailing_break_without_dollar() {
        assert_eq!(
            parse_inline("\\frac{a}{b}\\\\"),
            vec![text("\\frac{a}{b}"), hard_break()]
        );
    }

    #[test]
    fn test_mid_line_backslashes_are_text() {
        assert_eq!(parse_inline("a \\\\ b"), vec![text("a \\\\ b")]);
    }

    #[test]
    fn test_image_link() {
        assert_eq!(
            parse_inline("see ![plot](img/a.png) here"),
            vec![
                text("see "),
                Segment::Inline(InlineNode::image("img/a.png", "plot")),
                text(" here"),
            ]
        );
    }

    #[test]
    fn test_image_between_formulas() {
        assert_eq!(
            parse_inline("$a$ ![](b.png) $c$"),
            vec![
                formula("a"),
                text(" "),
                Segment::Inline(InlineNode::image("b.png", "")),
                text(" "),
                formula("c"),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_inline(""), Vec::<Segment>::new());
    }

    #[test]
    fn test_emphasis_is_opt_in() {
        assert_eq!(parse_inline("**bold**"), vec![text("**bold**")]);

        let config = ParseConfig {
            parse_emphasis: true,
            ..ParseConfig::default()
        };
        assert_eq!(
            parse_inline_with("a **b** $x$", &config),
            vec![
                text("a "),
                Segment::Inline(InlineNode::marked("b", vec![Mark::Bold])),
                text(" "),
                formula("x"),
            ]
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        // Property: parsing never panics on arbitrary input
        #[test]
        fn prop_parse_never_panics(input in "\\PC{0,200}") {
            let _ = parse_inline(&input);
        }

        // Property: text without markup comes back as a single text node
        #[test]
        fn prop_plain_text_is_one_node(input in "[a-zA-Z0-9 .,]{1,80}") {
            let segments = parse_inline(&input);
            prop_assert_eq!(segments, vec![Segment::Inline(InlineNode::text(input.clone()))]);
        }

        // Property: text nodes are never empty
        #[test]
        fn prop_no_empty_text(input in "[a-z$\\\\\n !\\[\\]()]{0,60}") {
            for segment in parse_inline(&input) {
                if let Segment::Inline(InlineNode::Text { text, .. }) = segment {
                    prop_assert!(!text.is_empty());
                }
            }
        }
    }
}
