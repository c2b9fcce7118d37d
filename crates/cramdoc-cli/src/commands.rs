// SPDX-License-Identifier: AGPL-3.0-or-later
//! Document operations behind each subcommand
//!
//! Every command reads its input from a file and returns the text to write;
//! `main` decides where the output goes.

use anyhow::{Context, Result};
use cramdoc_core::formats::markdown::to_markdown;
use cramdoc_core::formats::plaintext::plain_text;
use cramdoc_core::{
    build_with, default_registry, flatten_with, normalize_with, tokenize, Block, EmptyDocument,
    IdGenerator, ParseConfig, RenderConfig, RichDocument, SourceFormat,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Text output formats for `export`
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Markdown,
    Plain,
}

/// Summary printed by `stats`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStats {
    /// No text and no domain payload anywhere
    pub blank: bool,
    pub blocks: usize,
    pub formulas: usize,
    pub word_count: usize,
    pub char_count: usize,
}

impl DocumentStats {
    pub fn of(doc: &RichDocument) -> Self {
        Self {
            blank: doc.is_blank(),
            blocks: doc.content.len(),
            formulas: doc
                .content
                .iter()
                .filter(|node| node.node_type() == "latexBlock")
                .count(),
            word_count: doc.word_count(),
            char_count: doc.char_count(),
        }
    }
}

async fn read_input(path: &Path) -> Result<String> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    debug!(path = %path.display(), bytes = content.len(), "read input");
    Ok(content)
}

async fn read_document(path: &Path) -> Result<RichDocument> {
    let input = read_input(path).await?;
    serde_json::from_str(&input)
        .with_context(|| format!("{} is not a document tree", path.display()))
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

/// Linear text to flat blocks
pub async fn tokenize_file(path: &Path, ids: &dyn IdGenerator) -> Result<String> {
    let text = read_input(path).await?;
    to_json(&tokenize(&text, ids))
}

/// Linear text to a document tree
pub async fn import_file(path: &Path, ids: &dyn IdGenerator, config: &ParseConfig) -> Result<String> {
    let text = read_input(path).await?;
    let blocks = tokenize(&text, ids);
    to_json(&build_with(&blocks, ids, config))
}

/// Flat block JSON to a document tree
pub async fn build_file(path: &Path, ids: &dyn IdGenerator, config: &ParseConfig) -> Result<String> {
    let input = read_input(path).await?;
    let blocks: Vec<Block> = serde_json::from_str(&input)
        .with_context(|| format!("{} is not a flat block array", path.display()))?;
    to_json(&build_with(&blocks, ids, config))
}

/// Document tree to flat block JSON
pub async fn flatten_file(
    path: &Path,
    ids: &dyn IdGenerator,
    config: &RenderConfig,
    allow_empty: bool,
) -> Result<String> {
    let doc = read_document(path).await?;
    let mut config = config.clone();
    if allow_empty {
        config.empty_document = EmptyDocument::Empty;
    }
    to_json(&flatten_with(&doc, ids, &config))
}

/// Re-parse formulas typed as text inside a stored tree
pub async fn normalize_file(path: &Path, ids: &dyn IdGenerator, config: &ParseConfig) -> Result<String> {
    let doc = read_document(path).await?;
    to_json(&normalize_with(&doc, ids, config))
}

/// Document tree to Markdown or plain text
pub async fn export_file(path: &Path, to: ExportFormat, config: &RenderConfig) -> Result<String> {
    let doc = read_document(path).await?;
    Ok(match to {
        ExportFormat::Markdown => to_markdown(&doc, config),
        ExportFormat::Plain => plain_text(&doc),
    })
}

/// Convert a file between any two registered formats
///
/// Without `from`, the source format comes from the file extension.
pub async fn convert_file(
    path: &Path,
    from: Option<SourceFormat>,
    to: SourceFormat,
    ids: Arc<dyn IdGenerator>,
    parse_config: &ParseConfig,
    render_config: &RenderConfig,
) -> Result<String> {
    let from = match from {
        Some(format) => format,
        None => SourceFormat::from_path(path).with_context(|| {
            format!("Cannot tell the format of {}; pass --from", path.display())
        })?,
    };
    let input = read_input(path).await?;
    let registry = default_registry(ids);
    registry
        .convert(&input, from, to, parse_config, render_config)
        .with_context(|| format!("Failed to convert {from} to {to}"))
}

/// Block, formula, word and character counts of a document tree
pub async fn stats_file(path: &Path) -> Result<String> {
    let doc = read_document(path).await?;
    to_json(&DocumentStats::of(&doc))
}

/// Write output to a file, or stdout when no path is given
pub async fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{content}");
            Ok(())
        }
    }
}
