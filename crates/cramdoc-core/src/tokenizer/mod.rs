// SPDX-License-Identifier: AGPL-3.0-or-later
//! # Block tokenizer
//!
//! Splits linear text into flat blocks, one pass over the lines. The first
//! line of each block decides its type ([`classify`]); the block then
//! extends by rules specific to that type:
//!
//! - fences (```` ``` ```` and `$$`) are raw zones that run to the next line
//!   starting with the same delimiter, or to end of input when never closed
//! - quotes take consecutive `>` lines
//! - lists take item lines and indented continuations, and stay open over a
//!   blank line only when another item follows it
//! - paragraphs run until a blank line or a line that opens something else
//!
//! Blank lines between blocks produce nothing.

pub mod classify;

use crate::block::{Block, BlockKind};
use crate::ids::IdGenerator;
use classify::{classify, is_blank, CodeFence, LineKind, ListMarker, MathFence, Quote};
use tracing::{debug, trace};

/// Split text into flat blocks
pub fn tokenize(text: &str, ids: &dyn IdGenerator) -> Vec<Block> {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    let mut scanner = LineScanner::new(&lines, ids);
    scanner.run();
    trace!(lines = lines.len(), blocks = scanner.blocks.len(), "tokenized");
    scanner.blocks
}

/// Concatenate block contents back into linear text
///
/// Blocks without content are skipped; the rest are separated by one blank
/// line.
pub fn join_blocks(blocks: &[Block]) -> String {
    blocks
        .iter()
        .filter(|block| !block.content.is_empty())
        .map(|block| block.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

struct LineScanner<'a> {
    lines: &'a [&'a str],
    pos: usize,
    ids: &'a dyn IdGenerator,
    blocks: Vec<Block>,
}

impl<'a> LineScanner<'a> {
    fn new(lines: &'a [&'a str], ids: &'a dyn IdGenerator) -> Self {
        Self {
            lines,
            pos: 0,
            ids,
            blocks: Vec::new(),
        }
    }

    fn run(&mut self) {
        while self.pos < self.lines.len() {
            match classify(self.lines[self.pos]) {
                LineKind::Blank => self.pos += 1,
                LineKind::CodeFence { language } => self.code_fence(language),
                LineKind::MathFence => self.math_fence(),
                LineKind::Heading { level } => self.heading(level),
                LineKind::Quote => self.quote(),
                LineKind::BulletItem => self.list(false),
                LineKind::OrderedItem => self.list(true),
                LineKind::Text => self.paragraph(),
            }
        }
    }

    fn emit(&mut self, kind: BlockKind, start: usize, end: usize, content: String) {
        let block = Block::new(self.ids.next_id(), kind, content).with_lines(start, end);
        self.blocks.push(block);
    }

    fn joined(&self, start: usize, end: usize) -> String {
        self.lines[start..=end].join("\n")
    }

    /// Advance past the opener and up to and including the first closing
    /// line; false when input ran out first
    fn advance_to_closer(&mut self, closes: fn(&str) -> bool) -> bool {
        self.pos += 1;
        while self.pos < self.lines.len() {
            let line = self.lines[self.pos];
            self.pos += 1;
            if closes(line) {
                return true;
            }
        }
        false
    }

    fn code_fence(&mut self, language: &str) {
        let start = self.pos;
        if !self.advance_to_closer(CodeFence::closes) {
            debug!(start_line = start, "code fence never closed, block runs to end of input");
        }
        let kind = BlockKind::FencedCode {
            language: language.to_string(),
        };
        let end = self.pos - 1;
        self.emit(kind, start, end, self.joined(start, end));
    }

    fn math_fence(&mut self) {
        let start = self.pos;
        if MathFence::is_one_line(self.lines[start]) {
            self.pos += 1;
        } else if !self.advance_to_closer(MathFence::closes) {
            debug!(start_line = start, "math fence never closed, block runs to end of input");
        }
        let end = self.pos - 1;
        self.emit(BlockKind::FencedMath, start, end, self.joined(start, end));
    }

    fn heading(&mut self, level: u8) {
        let start = self.pos;
        let content = self.lines[start].trim_end().to_string();
        self.pos += 1;
        self.emit(BlockKind::Heading { level }, start, start, content);
    }

    fn quote(&mut self) {
        let start = self.pos;
        while self.pos < self.lines.len() && Quote::is_quote(self.lines[self.pos]) {
            self.pos += 1;
        }
        let end = self.pos - 1;
        self.emit(BlockKind::Blockquote, start, end, self.joined(start, end));
    }

    fn list(&mut self, ordered: bool) {
        let start = self.pos;
        let mut last_content = start;
        self.pos += 1;

        while self.pos < self.lines.len() {
            let line = self.lines[self.pos];
            if ListMarker::is_item(line, ordered) || ListMarker::is_continuation(line) {
                last_content = self.pos;
                self.pos += 1;
            } else if is_blank(line)
                && self
                    .lines
                    .get(self.pos + 1)
                    .is_some_and(|next| ListMarker::is_item(next, ordered))
            {
                self.pos += 1;
            } else {
                break;
            }
        }

        // An empty last item (`- `) keeps its trailing space
        let content = self.joined(start, last_content);
        self.emit(BlockKind::List { ordered }, start, last_content, content);
    }

    fn paragraph(&mut self) {
        let start = self.pos;
        self.pos += 1;
        while self.pos < self.lines.len() && classify(self.lines[self.pos]) == LineKind::Text {
            self.pos += 1;
        }
        let end = self.pos - 1;
        self.emit(BlockKind::Paragraph, start, end, self.joined(start, end));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use pretty_assertions::assert_eq;

    fn kinds_and_content(text: &str) -> Vec<(BlockKind, String)> {
        tokenize(text, &SequentialIds::new())
            .into_iter()
            .map(|b| (b.kind, b.content))
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(tokenize("", &SequentialIds::new()), Vec::new());
        assert_eq!(tokenize("\n\n  \n", &SequentialIds::new()), Vec::new());
    }

    #[test]
    fn test_mixed_document() {
        let text = "# Title\n\nSome text\nmore text\n\n$$\nx^2\n$$\n> quote\n> again\n- a\n- b";
        let blocks = tokenize(text, &SequentialIds::new());
        assert_eq!(
            blocks,
            vec![
                Block::new("block-1", BlockKind::Heading { level: 1 }, "# Title").with_lines(0, 0),
                Block::new("block-2", BlockKind::Paragraph, "Some text\nmore text").with_lines(2, 3),
                Block::new("block-3", BlockKind::FencedMath, "$$\nx^2\n$$").with_lines(5, 7),
                Block::new("block-4", BlockKind::Blockquote, "> quote\n> again").with_lines(8, 9),
                Block::new("block-5", BlockKind::List { ordered: false }, "- a\n- b").with_lines(10, 11),
            ]
        );
    }

    #[test]
    fn test_unterminated_code_fence_runs_to_end() {
        let blocks = tokenize("```js\ncode", &SequentialIds::new());
        assert_eq!(
            blocks,
            vec![Block::new(
                "block-1",
                BlockKind::FencedCode { language: "js".into() },
                "```js\ncode"
            )
            .with_lines(0, 1)]
        );
    }

    #[test]
    fn test_code_fence_is_a_raw_zone() {
        assert_eq!(
            kinds_and_content("```\n# not a heading\n$$\n```\nafter"),
            vec![
                (
                    BlockKind::FencedCode { language: String::new() },
                    "```\n# not a heading\n$$\n```".to_string()
                ),
                (BlockKind::Paragraph, "after".to_string()),
            ]
        );
    }

    #[test]
    fn test_list_with_continuation_and_blank() {
        let blocks = tokenize("- a\n  continued\n\n- b\nnext para", &SequentialIds::new());
        assert_eq!(
            blocks,
            vec![
                Block::new(
                    "block-1",
                    BlockKind::List { ordered: false },
                    "- a\n  continued\n\n- b"
                )
                .with_lines(0, 3),
                Block::new("block-2", BlockKind::Paragraph, "next para").with_lines(4, 4),
            ]
        );
    }

    #[test]
    fn test_continuation_then_blank_line_before_paragraph() {
        assert_eq!(
            kinds_and_content("- a\n  continued\n- b\n\ntext"),
            vec![
                (
                    BlockKind::List { ordered: false },
                    "- a\n  continued\n- b".to_string()
                ),
                (BlockKind::Paragraph, "text".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_last_item_keeps_its_marker() {
        assert_eq!(
            kinds_and_content("- a\n- "),
            vec![(BlockKind::List { ordered: false }, "- a\n- ".to_string())]
        );
        assert_eq!(
            kinds_and_content("1. "),
            vec![(BlockKind::List { ordered: true }, "1. ".to_string())]
        );
    }

    #[test]
    fn test_blank_line_ends_list_without_following_item() {
        assert_eq!(
            kinds_and_content("1. one\n2. two\n\ntext"),
            vec![
                (BlockKind::List { ordered: true }, "1. one\n2. two".to_string()),
                (BlockKind::Paragraph, "text".to_string()),
            ]
        );
    }

    #[test]
    fn test_one_line_math_fence() {
        assert_eq!(
            kinds_and_content("$$x$$\ntext"),
            vec![
                (BlockKind::FencedMath, "$$x$$".to_string()),
                (BlockKind::Paragraph, "text".to_string()),
            ]
        );
    }

    #[test]
    fn test_paragraph_stops_at_other_openers() {
        assert_eq!(
            kinds_and_content("intro\n## Part"),
            vec![
                (BlockKind::Paragraph, "intro".to_string()),
                (BlockKind::Heading { level: 2 }, "## Part".to_string()),
            ]
        );
    }

    #[test]
    fn test_crlf_input() {
        assert_eq!(
            kinds_and_content("# T\r\n\r\nbody\r\n"),
            vec![
                (BlockKind::Heading { level: 1 }, "# T".to_string()),
                (BlockKind::Paragraph, "body".to_string()),
            ]
        );
    }

    #[test]
    fn test_join_blocks_skips_empty_content() {
        let blocks = vec![
            Block::text("a", "first"),
            Block::new("b", BlockKind::PageBreak, ""),
            Block::text("c", "second"),
        ];
        assert_eq!(join_blocks(&blocks), "first\n\nsecond");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::ids::SequentialIds;
    use proptest::prelude::*;

    proptest! {
        // Property: tokenizing never panics and block line ranges are ordered
        #[test]
        fn prop_line_ranges_are_ordered(input in "[a-z#>*$`0-9. \n-]{0,200}") {
            let blocks = tokenize(&input, &SequentialIds::new());
            let mut previous_end = None;
            for block in &blocks {
                prop_assert!(block.start_line.is_some() && block.end_line.is_some());
                let (start, end) = (block.start_line.unwrap(), block.end_line.unwrap());
                prop_assert!(start <= end);
                if let Some(prev) = previous_end {
                    prop_assert!(start > prev);
                }
                previous_end = Some(end);
            }
        }

        // Property: every block has content
        #[test]
        fn prop_blocks_have_content(input in "[a-z#>*$`0-9. \n-]{0,200}") {
            for block in tokenize(&input, &SequentialIds::new()) {
                prop_assert!(!block.content.trim().is_empty());
            }
        }
    }
}
