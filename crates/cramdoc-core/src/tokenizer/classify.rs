// SPDX-License-Identifier: AGPL-3.0-or-later
//! Line classification
//!
//! Each line is classified from local facts only. Constructs own their
//! delimiters here; the scanner never hardcodes a fence or a marker.

/// What a line can open (or be) when it starts a new block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    CodeFence { language: &'a str },
    MathFence,
    Heading { level: u8 },
    Quote,
    BulletItem,
    OrderedItem,
    Text,
}

/// Classify a line; earlier constructs win when several could match
pub fn classify(line: &str) -> LineKind<'_> {
    if let Some(language) = CodeFence::opens(line) {
        LineKind::CodeFence { language }
    } else if MathFence::opens(line) {
        LineKind::MathFence
    } else if let Some(level) = Heading::level(line) {
        LineKind::Heading { level }
    } else if Quote::is_quote(line) {
        LineKind::Quote
    } else if ListMarker::bullet_body(line).is_some() {
        LineKind::BulletItem
    } else if ListMarker::ordered(line).is_some() {
        LineKind::OrderedItem
    } else if is_blank(line) {
        LineKind::Blank
    } else {
        LineKind::Text
    }
}

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

pub struct CodeFence;

impl CodeFence {
    pub const TICKS: &'static str = "```";

    /// Language tag when the line opens a fence (possibly empty)
    pub fn opens(line: &str) -> Option<&str> {
        line.trim_start().strip_prefix(Self::TICKS).map(str::trim)
    }

    /// Any later line starting with the fence closes it, text after it included
    pub fn closes(line: &str) -> bool {
        line.trim_start().starts_with(Self::TICKS)
    }
}

pub struct MathFence;

impl MathFence {
    pub const DELIM: &'static str = "$$";

    pub fn opens(line: &str) -> bool {
        line.trim().starts_with(Self::DELIM)
    }

    pub fn closes(line: &str) -> bool {
        Self::opens(line)
    }

    /// `$$x$$` on one line opens and closes the fence
    pub fn is_one_line(line: &str) -> bool {
        line.trim()
            .strip_prefix(Self::DELIM)
            .is_some_and(|rest| rest.contains(Self::DELIM))
    }
}

pub struct Heading;

impl Heading {
    pub const MARKER: char = '#';
    pub const MAX_LEVEL: usize = 6;

    /// One to six `#` at the very start of the line, then whitespace
    pub fn level(line: &str) -> Option<u8> {
        let hashes = line.chars().take_while(|&c| c == Self::MARKER).count();
        if hashes == 0 || hashes > Self::MAX_LEVEL {
            return None;
        }
        let rest = &line[hashes..];
        rest.starts_with(char::is_whitespace).then_some(hashes as u8)
    }

    /// Heading text without its marker
    pub fn text(line: &str) -> &str {
        line.trim_start_matches(Self::MARKER).trim()
    }
}

pub struct Quote;

impl Quote {
    pub const MARKER: char = '>';

    pub fn is_quote(line: &str) -> bool {
        line.trim_start().starts_with(Self::MARKER)
    }

    /// Quoted text without its marker and one following space
    pub fn strip(line: &str) -> &str {
        let rest = line.trim_start();
        let rest = rest.strip_prefix(Self::MARKER).unwrap_or(rest);
        rest.strip_prefix(' ').unwrap_or(rest)
    }
}

pub struct ListMarker;

impl ListMarker {
    pub const BULLETS: [char; 3] = ['-', '*', '+'];
    /// Indent that makes a line continue the previous item
    pub const CONTINUATION_INDENT: usize = 2;

    /// Item text of a bullet line (`- x`, `* x`, `+ x`, indentation allowed)
    pub fn bullet_body(line: &str) -> Option<&str> {
        let rest = line.trim_start().strip_prefix(Self::BULLETS)?;
        rest.starts_with(char::is_whitespace)
            .then(|| rest.trim_start())
    }

    /// Number and item text of an ordered line (`12. x`, no indentation)
    pub fn ordered(line: &str) -> Option<(u32, &str)> {
        let digits = line.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        let rest = line[digits..].strip_prefix('.')?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let number = line[..digits].parse().unwrap_or(u32::MAX);
        Some((number, rest.trim_start()))
    }

    pub fn is_item(line: &str, ordered: bool) -> bool {
        if ordered {
            Self::ordered(line).is_some()
        } else {
            Self::bullet_body(line).is_some()
        }
    }

    /// Indented non-blank line
    pub fn is_continuation(line: &str) -> bool {
        !is_blank(line)
            && line
                .chars()
                .take(Self::CONTINUATION_INDENT)
                .filter(|c| c.is_whitespace())
                .count()
                == Self::CONTINUATION_INDENT
    }
}
