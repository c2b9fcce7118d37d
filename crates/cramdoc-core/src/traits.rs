// SPDX-License-Identifier: AGPL-3.0-or-later
//! Parser and Renderer traits for format handlers

use crate::ast::RichDocument;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Error type for parsing and rendering
///
/// The conversion engine itself never fails; errors come from the format
/// boundary (malformed JSON, missing handlers, IO).
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("Unsupported feature: {feature} in format {format}")]
    UnsupportedFeature { format: SourceFormat, feature: String },

    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConversionError>;

/// Content formats the engine reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Linear text: markdown-like markup with embedded formulas
    Markdown,
    /// Plain text with no markup
    PlainText,
    /// JSON array of flat blocks
    Legacy,
    /// JSON rich document tree
    Tree,
}

impl SourceFormat {
    pub const ALL: [Self; 4] = [Self::Markdown, Self::PlainText, Self::Legacy, Self::Tree];

    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::PlainText => "txt",
            Self::Legacy => "blocks.json",
            Self::Tree => "json",
        }
    }

    /// Format named by a file's extension; `.blocks.json` wins over `.json`
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        let mut formats = Self::ALL;
        formats.sort_by_key(|format| std::cmp::Reverse(format.extension().len()));
        formats
            .into_iter()
            .find(|format| name.ends_with(&format!(".{}", format.extension())))
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::PlainText => "plain",
            Self::Legacy => "legacy",
            Self::Tree => "tree",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SourceFormat {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "plain" | "plaintext" | "txt" | "text" => Ok(Self::PlainText),
            "legacy" | "blocks" => Ok(Self::Legacy),
            "tree" | "json" | "doc" => Ok(Self::Tree),
            other => Err(ConversionError::UnknownFormat(other.to_string())),
        }
    }
}

/// Configuration for parsing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// Recognize `**bold**` and `*italic*` in text runs
    pub parse_emphasis: bool,
    /// Paste input beyond this many characters is dropped
    pub max_paste_chars: usize,
    /// Pasted fragments keep at most this many top-level blocks
    pub max_paste_blocks: usize,
    /// Image file name to uploaded URL, applied to pasted image sources
    pub image_mappings: HashMap<String, String>,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            parse_emphasis: false,
            max_paste_chars: 10_000,
            max_paste_blocks: 100,
            image_mappings: HashMap::new(),
        }
    }
}

/// What flattening an empty document produces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyDocument {
    /// A single empty text block, so stored documents always have a first block
    #[default]
    Placeholder,
    /// No blocks at all
    Empty,
}

/// Configuration for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub empty_document: EmptyDocument,
    /// Language written on exported code fences that have none
    pub code_language_fallback: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            empty_document: EmptyDocument::Placeholder,
            code_language_fallback: "text".to_string(),
        }
    }
}

/// Parser trait: convert source format to the document tree
pub trait Parser: Send + Sync {
    /// The source format this parser handles
    fn format(&self) -> SourceFormat;

    /// Parse a string into a document
    fn parse(&self, input: &str, config: &ParseConfig) -> Result<RichDocument>;
}

/// Renderer trait: convert the document tree to target format
pub trait Renderer: Send + Sync {
    /// The target format this renderer produces
    fn format(&self) -> SourceFormat;

    /// Render a document to a string
    fn render(&self, doc: &RichDocument, config: &RenderConfig) -> Result<String>;
}

/// Combined parser + renderer for a format
pub trait FormatHandler: Parser + Renderer {
    /// Check if this format supports a specific feature
    fn supports_feature(&self, feature: &str) -> bool {
        self.supported_features().contains(&feature)
    }

    /// Get list of supported features
    fn supported_features(&self) -> &[&str];
}

/// Registry of format handlers
pub struct FormatRegistry {
    handlers: HashMap<SourceFormat, Box<dyn FormatHandler>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register(&mut self, handler: Box<dyn FormatHandler>) {
        let format = Parser::format(handler.as_ref());
        self.handlers.insert(format, handler);
    }

    pub fn get(&self, format: SourceFormat) -> Option<&dyn FormatHandler> {
        self.handlers.get(&format).map(|h| h.as_ref())
    }

    fn handler(&self, format: SourceFormat, feature: &str) -> Result<&dyn FormatHandler> {
        self.get(format)
            .ok_or_else(|| ConversionError::UnsupportedFeature {
                format,
                feature: feature.to_string(),
            })
    }

    /// Parse input of the given format into a document
    pub fn parse(
        &self,
        input: &str,
        from: SourceFormat,
        config: &ParseConfig,
    ) -> Result<RichDocument> {
        self.handler(from, "parsing")?.parse(input, config)
    }

    /// Render a document into the given format
    pub fn render(
        &self,
        doc: &RichDocument,
        to: SourceFormat,
        config: &RenderConfig,
    ) -> Result<String> {
        self.handler(to, "rendering")?.render(doc, config)
    }

    /// Convert between formats
    pub fn convert(
        &self,
        input: &str,
        from: SourceFormat,
        to: SourceFormat,
        parse_config: &ParseConfig,
        render_config: &RenderConfig,
    ) -> Result<String> {
        if from == to {
            return Ok(input.to_string());
        }

        let doc = self.parse(input, from, parse_config)?;
        self.render(&doc, to, render_config)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}
