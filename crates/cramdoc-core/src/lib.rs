// SPDX-License-Identifier: AGPL-3.0-or-later
//! Cramdoc Core - rich content conversion for worksheet authoring
//!
//! Authored content lives in three shapes and this crate converts between
//! them:
//! - linear text: markdown-like markup with `$...$` / `$$...$$` formulas,
//!   fenced code and fenced JSON embeds
//! - flat blocks: the coarse array used for reordering and legacy storage
//! - the rich document tree the editor works on
//!
//! text → [`tokenize`] → [`Block`]s → [`build`] → [`RichDocument`] →
//! [`flatten`] → [`Block`]s
//!
//! Conversions never fail on content: anything unrecognized degrades to
//! literal text. Errors only come from the format boundary (JSON, IO).

pub mod ast;
pub mod block;
pub mod builder;
pub mod flatten;
pub mod formats;
pub mod ids;
pub mod inline;
pub mod merge;
pub mod normalize;
pub mod paste;
pub mod tokenizer;
pub mod traits;

pub use ast::{BlockNode, EmbedKind, InlineNode, Mark, RichDocument};
pub use block::{Block, BlockKind};
pub use builder::{build, build_from_text, build_with};
pub use flatten::{flatten, flatten_with};
pub use formats::default_registry;
pub use ids::{IdGenerator, SequentialIds, UuidIds};
pub use inline::{parse_inline, parse_inline_with, Segment};
pub use merge::{merge_adjacent_formulas, merge_adjacent_formulas_with};
pub use normalize::{normalize, normalize_with};
pub use paste::{stage_paste, PasteFragment};
pub use tokenizer::{join_blocks, tokenize};
pub use traits::{
    ConversionError, EmptyDocument, FormatRegistry, ParseConfig, Parser, RenderConfig, Renderer,
    Result, SourceFormat,
};
