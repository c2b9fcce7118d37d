// SPDX-License-Identifier: AGPL-3.0-or-later
//! Flat block records
//!
//! A flat block is one self-contained chunk of source text (a heading, a
//! fenced region, a list, a paragraph) or one opaque domain block. Flat
//! blocks are what the tokenizer produces, what drag-reordering shuffles and
//! what older documents were stored as.

use crate::ast::EmbedKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    #[serde(flatten)]
    pub kind: BlockKind,
    /// Source text; fenced blocks keep their fence lines
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    /// Zero-based source line the block starts on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_line: Option<usize>,
    /// Zero-based source line the block ends on, inclusive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
}

impl Block {
    pub fn new(id: impl Into<String>, kind: BlockKind, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            content: content.into(),
            start_line: None,
            end_line: None,
        }
    }

    /// Legacy free-text block
    pub fn text(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(id, BlockKind::Text, content)
    }

    pub fn with_lines(mut self, start: usize, end: usize) -> Self {
        self.start_line = Some(start);
        self.end_line = Some(end);
        self
    }
}

/// Block type together with its type-specific attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    Heading {
        level: u8,
    },
    FencedCode {
        #[serde(default)]
        language: String,
    },
    FencedMath,
    Blockquote,
    List {
        #[serde(default)]
        ordered: bool,
    },
    Paragraph,
    /// Legacy free text holding any mix of markup
    Text,
    Question {
        #[serde(default)]
        question_id: Option<Value>,
    },
    Template {
        #[serde(default)]
        template_id: Option<Value>,
    },
    PageBreak,
    Embed {
        kind: EmbedKind,
        #[serde(default)]
        data: Value,
    },
}
