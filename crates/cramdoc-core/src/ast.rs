// SPDX-License-Identifier: AGPL-3.0-or-later
//! Rich document tree used by the interactive editor
//!
//! The tree mirrors the editor's JSON schema: every node carries a camelCase
//! `type` tag, attributes live under `attrs`, and a node's `content` array
//! exclusively owns its children. Domain blocks (questions, templates, page
//! breaks, diagram and circuit embeds) are opaque to this crate and are
//! carried through unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use unicode_segmentation::UnicodeSegmentation;

/// The root document node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "doc")]
pub struct RichDocument {
    #[serde(default)]
    pub content: Vec<BlockNode>,
}

impl RichDocument {
    pub fn new(content: Vec<BlockNode>) -> Self {
        Self { content }
    }

    /// A document holding a single empty paragraph, the editor's cursor target
    pub fn empty() -> Self {
        Self {
            content: vec![BlockNode::empty_paragraph()],
        }
    }

    /// True when the document has no block carrying text or a domain payload
    pub fn is_blank(&self) -> bool {
        self.content.iter().all(BlockNode::is_blank)
    }

    /// Count words in the document
    pub fn word_count(&self) -> usize {
        self.content.iter().map(|b| b.word_count()).sum()
    }

    /// Count characters in the document
    pub fn char_count(&self) -> usize {
        self.content.iter().map(|b| b.char_count()).sum()
    }
}

impl Default for RichDocument {
    fn default() -> Self {
        Self::empty()
    }
}

/// Block-level nodes (structural)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BlockNode {
    /// Plain paragraph; an image on its own line is a paragraph holding one image
    Paragraph {
        #[serde(default)]
        content: Vec<InlineNode>,
    },

    /// Heading with level 1-6
    Heading {
        attrs: HeadingAttrs,
        #[serde(default)]
        content: Vec<InlineNode>,
    },

    Blockquote {
        #[serde(default)]
        content: Vec<BlockNode>,
    },

    /// Unordered list; children are `listItem` nodes
    BulletList {
        #[serde(default)]
        content: Vec<BlockNode>,
    },

    /// Ordered list; children are `listItem` nodes
    OrderedList {
        #[serde(default)]
        attrs: OrderedListAttrs,
        #[serde(default)]
        content: Vec<BlockNode>,
    },

    ListItem {
        #[serde(default)]
        content: Vec<BlockNode>,
    },

    /// Code block; content is a single unmarked text node (or nothing)
    CodeBlock {
        #[serde(default)]
        attrs: CodeBlockAttrs,
        #[serde(default)]
        content: Vec<InlineNode>,
    },

    /// Display formula
    LatexBlock { attrs: FormulaAttrs },

    QuestionBlock {
        #[serde(default)]
        attrs: QuestionAttrs,
    },

    TemplateBlock {
        #[serde(default)]
        attrs: TemplateAttrs,
    },

    PageBreak {
        #[serde(default)]
        attrs: NodeIdAttrs,
    },

    #[serde(rename = "diagram2DBlock")]
    Diagram2D { attrs: DiagramAttrs },

    #[serde(rename = "diagram3DBlock")]
    Diagram3D { attrs: DiagramAttrs },

    CircuitBlock { attrs: CircuitAttrs },

    /// Any node type this crate does not model; only its children survive conversion
    #[serde(untagged)]
    Unknown {
        #[serde(rename = "type")]
        node_type: String,
        #[serde(default)]
        content: Vec<BlockNode>,
    },
}

impl BlockNode {
    pub fn paragraph(content: Vec<InlineNode>) -> Self {
        BlockNode::Paragraph { content }
    }

    pub fn empty_paragraph() -> Self {
        BlockNode::Paragraph {
            content: Vec::new(),
        }
    }

    pub fn heading(level: u8, content: Vec<InlineNode>) -> Self {
        BlockNode::Heading {
            attrs: HeadingAttrs {
                level: level.clamp(1, 6),
            },
            content,
        }
    }

    /// Display-mode formula block
    pub fn formula_block(id: Option<String>, formula: impl Into<String>) -> Self {
        BlockNode::LatexBlock {
            attrs: FormulaAttrs {
                id,
                formula: formula.into(),
                display_mode: true,
            },
        }
    }

    pub fn code_block(language: Option<String>, code: &str) -> Self {
        let content = if code.is_empty() {
            Vec::new()
        } else {
            vec![InlineNode::text(code)]
        };
        BlockNode::CodeBlock {
            attrs: CodeBlockAttrs { language },
            content,
        }
    }

    pub fn embed(kind: EmbedKind, id: Option<String>, data: Value) -> Self {
        match kind {
            EmbedKind::Diagram2D => BlockNode::Diagram2D {
                attrs: DiagramAttrs {
                    id,
                    diagram_data: data,
                },
            },
            EmbedKind::Diagram3D => BlockNode::Diagram3D {
                attrs: DiagramAttrs {
                    id,
                    diagram_data: data,
                },
            },
            EmbedKind::Circuit => BlockNode::CircuitBlock {
                attrs: CircuitAttrs {
                    id,
                    circuit_data: data,
                },
            },
        }
    }

    /// The editor type tag of this node
    pub fn node_type(&self) -> &str {
        match self {
            BlockNode::Paragraph { .. } => "paragraph",
            BlockNode::Heading { .. } => "heading",
            BlockNode::Blockquote { .. } => "blockquote",
            BlockNode::BulletList { .. } => "bulletList",
            BlockNode::OrderedList { .. } => "orderedList",
            BlockNode::ListItem { .. } => "listItem",
            BlockNode::CodeBlock { .. } => "codeBlock",
            BlockNode::LatexBlock { .. } => "latexBlock",
            BlockNode::QuestionBlock { .. } => "questionBlock",
            BlockNode::TemplateBlock { .. } => "templateBlock",
            BlockNode::PageBreak { .. } => "pageBreak",
            BlockNode::Diagram2D { .. } => EmbedKind::Diagram2D.node_type(),
            BlockNode::Diagram3D { .. } => EmbedKind::Diagram3D.node_type(),
            BlockNode::CircuitBlock { .. } => EmbedKind::Circuit.node_type(),
            BlockNode::Unknown { node_type, .. } => node_type,
        }
    }

    /// Embed payload, if this node is one of the fenced-JSON embeds
    pub fn as_embed(&self) -> Option<(EmbedKind, Option<&str>, &Value)> {
        match self {
            BlockNode::Diagram2D { attrs } => {
                Some((EmbedKind::Diagram2D, attrs.id.as_deref(), &attrs.diagram_data))
            }
            BlockNode::Diagram3D { attrs } => {
                Some((EmbedKind::Diagram3D, attrs.id.as_deref(), &attrs.diagram_data))
            }
            BlockNode::CircuitBlock { attrs } => {
                Some((EmbedKind::Circuit, attrs.id.as_deref(), &attrs.circuit_data))
            }
            _ => None,
        }
    }

    /// Block children of container nodes
    pub fn children(&self) -> Option<&[BlockNode]> {
        match self {
            BlockNode::Blockquote { content }
            | BlockNode::BulletList { content }
            | BlockNode::OrderedList { content, .. }
            | BlockNode::ListItem { content }
            | BlockNode::Unknown { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Inline children of text-holding nodes
    pub fn inline_content(&self) -> Option<&[InlineNode]> {
        match self {
            BlockNode::Paragraph { content }
            | BlockNode::Heading { content, .. }
            | BlockNode::CodeBlock { content, .. } => Some(content),
            _ => None,
        }
    }

    /// True for nodes with neither visible text nor a domain payload
    pub fn is_blank(&self) -> bool {
        match self {
            BlockNode::Paragraph { content } | BlockNode::Heading { content, .. } => {
                content.iter().all(InlineNode::is_blank)
            }
            BlockNode::Blockquote { content }
            | BlockNode::BulletList { content }
            | BlockNode::OrderedList { content, .. }
            | BlockNode::ListItem { content }
            | BlockNode::Unknown { content, .. } => content.iter().all(BlockNode::is_blank),
            BlockNode::CodeBlock { content, .. } => content.iter().all(InlineNode::is_blank),
            BlockNode::LatexBlock { attrs } => attrs.formula.trim().is_empty(),
            _ => false,
        }
    }

    /// Count words in this block
    pub fn word_count(&self) -> usize {
        if let Some(inlines) = self.inline_content() {
            return inlines.iter().map(|i| i.word_count()).sum();
        }
        match self.children() {
            Some(children) => children.iter().map(|b| b.word_count()).sum(),
            None => 0,
        }
    }

    /// Count characters in this block
    pub fn char_count(&self) -> usize {
        if let Some(inlines) = self.inline_content() {
            return inlines.iter().map(|i| i.char_count()).sum();
        }
        match self {
            BlockNode::LatexBlock { attrs } => attrs.formula.chars().count(),
            _ => self
                .children()
                .map_or(0, |children| children.iter().map(|b| b.char_count()).sum()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingAttrs {
    pub level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedListAttrs {
    #[serde(default = "default_list_start")]
    pub start: u32,
}

impl Default for OrderedListAttrs {
    fn default() -> Self {
        Self { start: 1 }
    }
}

fn default_list_start() -> u32 {
    1
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlockAttrs {
    #[serde(default)]
    pub language: Option<String>,
}

/// Formula payload; stored trees written by older editors use `latex`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, alias = "latex")]
    pub formula: String,
    #[serde(default = "default_display_mode")]
    pub display_mode: bool,
}

fn default_display_mode() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub question_id: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub template_id: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeIdAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub diagram_data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub circuit_data: Value,
}

/// Kind of a fenced-JSON embed; the payload schema belongs to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmbedKind {
    #[serde(rename = "diagram-2d")]
    Diagram2D,
    #[serde(rename = "diagram-3d")]
    Diagram3D,
    #[serde(rename = "circuit")]
    Circuit,
}

impl EmbedKind {
    pub const ALL: [Self; 3] = [Self::Diagram2D, Self::Diagram3D, Self::Circuit];

    /// Reserved language tag of the code fence carrying this embed
    pub const fn fence_tag(&self) -> &'static str {
        match self {
            Self::Diagram2D => "diagram-2d",
            Self::Diagram3D => "diagram-3d",
            Self::Circuit => "circuit",
        }
    }

    pub const fn node_type(&self) -> &'static str {
        match self {
            Self::Diagram2D => "diagram2DBlock",
            Self::Diagram3D => "diagram3DBlock",
            Self::Circuit => "circuitBlock",
        }
    }

    pub fn from_fence_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.fence_tag() == tag)
    }
}

/// Inline nodes (character-level)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InlineNode {
    /// Text run; never empty
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        marks: Vec<Mark>,
    },

    HardBreak,

    /// Inline formula (`$...$`)
    InlineLatex { attrs: InlineFormulaAttrs },

    Image { attrs: ImageAttrs },
}

impl InlineNode {
    pub fn text(text: impl Into<String>) -> Self {
        InlineNode::Text {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    pub fn marked(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        InlineNode::Text {
            text: text.into(),
            marks,
        }
    }

    pub fn formula(formula: impl Into<String>) -> Self {
        InlineNode::InlineLatex {
            attrs: InlineFormulaAttrs {
                formula: formula.into(),
            },
        }
    }

    pub fn image(src: impl Into<String>, alt: impl Into<String>) -> Self {
        let alt = alt.into();
        InlineNode::Image {
            attrs: ImageAttrs {
                src: src.into(),
                title: (!alt.is_empty()).then(|| alt.clone()),
                alt,
            },
        }
    }

    /// Whitespace-only text (hard breaks count as blank)
    pub fn is_blank(&self) -> bool {
        match self {
            InlineNode::Text { text, .. } => text.trim().is_empty(),
            InlineNode::HardBreak => true,
            InlineNode::InlineLatex { attrs } => attrs.formula.trim().is_empty(),
            InlineNode::Image { .. } => false,
        }
    }

    /// Count words in this inline node
    pub fn word_count(&self) -> usize {
        match self {
            InlineNode::Text { text, .. } => text.unicode_words().count(),
            InlineNode::InlineLatex { .. } => 1,
            _ => 0,
        }
    }

    /// Count characters in this inline node
    pub fn char_count(&self) -> usize {
        match self {
            InlineNode::Text { text, .. } => text.chars().count(),
            InlineNode::InlineLatex { attrs } => attrs.formula.chars().count(),
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineFormulaAttrs {
    #[serde(default, alias = "latex")]
    pub formula: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttrs {
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Text formatting marks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mark {
    Bold,
    Italic,
    Code,
    Strike,
    Underline,
    /// Marks owned by other editor extensions
    #[serde(other)]
    Other,
}
