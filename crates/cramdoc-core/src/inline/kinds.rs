// SPDX-License-Identifier: AGPL-3.0-or-later
//! Delimiters owned by each inline construct
//!
//! Parser and encoder code reads these constants; neither hardcodes `$` or `\\`.

/// Formula delimiters
pub struct Formula;

impl Formula {
    /// Opens and closes an inline formula
    pub const INLINE: u8 = b'$';
    /// Opens and closes a display formula
    pub const DISPLAY: &'static str = "$$";
    /// Written before `$` to keep it literal
    pub const ESCAPE: u8 = b'\\';
}

/// Explicit line break: two backslashes ending a line
pub struct HardBreak;

impl HardBreak {
    pub const MARKER: &'static str = "\\\\";
}

/// Emphasis delimiters, recognized only when enabled
pub struct Emphasis;

impl Emphasis {
    pub const BOLD: &'static str = "**";
    pub const ITALIC: &'static str = "*";
    pub const CODE: &'static str = "`";
}
