// SPDX-License-Identifier: AGPL-3.0-or-later
//! # Inline content
//!
//! Converts one run of source text into inline nodes: plain text, inline
//! formulas (`$...$`), images (`![alt](src)`), hard breaks (`\\` at line end)
//! and, when enabled, emphasis marks. Display formulas (`$$...$$`) cannot
//! live inside a paragraph, so the parser reports them as
//! [`Segment::BlockFormula`] and leaves placement to the caller.
//!
//! ## Modules
//!
//! - [`parser`]: recognition order and the `$` pairing rules
//! - [`emphasis`]: opt-in bold, italic and code marks
//! - [`lift`]: splitting segments into paragraphs and formula blocks
//! - [`source`]: the reverse direction, inline nodes to text
//! - [`kinds`]: delimiter constants

pub mod emphasis;
pub mod kinds;
pub mod lift;
pub mod parser;
pub mod source;

use crate::ast::InlineNode;

pub use lift::{inline_only, lift_block_formulas, lift_nested_formulas};
pub use parser::{parse_inline, parse_inline_with};
pub use source::source_text;

/// One unit of parsed inline content
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Inline(InlineNode),
    /// Display formula content, trimmed and non-empty
    BlockFormula(String),
}
