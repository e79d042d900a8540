//! Inline formatting model for text block content.
//!
//! Text blocks persist their content as a small HTML subset: bold, italic
//! and underline runs plus line breaks. This module parses that subset into
//! a flat list of runs, edits it (range formatting toggles), and writes it
//! back in one canonical form, so stored content never depends on a
//! particular editor widget's output.
//!
//! Parsing is forgiving. Unknown tags are dropped and their text kept;
//! unknown entities and stray `<` are kept as literal text.

#[cfg(test)]
#[path = "markup_test.rs"]
mod markup_test;

use std::fmt;
use std::ops::Range;

/// Formatting flags of a text run.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Marks {
    fn has(self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
        }
    }

    fn set(&mut self, mark: Mark, on: bool) {
        match mark {
            Mark::Bold => self.bold = on,
            Mark::Italic => self.italic = on,
            Mark::Underline => self.underline = on,
        }
    }
}

/// A single formatting toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Bold,
    Italic,
    Underline,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mark: {0}")]
pub struct UnknownMark(pub String);

impl std::str::FromStr for Mark {
    type Err = UnknownMark;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bold" => Ok(Self::Bold),
            "italic" => Ok(Self::Italic),
            "underline" => Ok(Self::Underline),
            other => Err(UnknownMark(other.to_owned())),
        }
    }
}

/// One node of inline content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    /// A run of text sharing the same marks.
    Text { text: String, marks: Marks },
    /// A hard line break.
    Break,
}

/// Parsed inline content. Adjacent runs with equal marks are always merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup {
    nodes: Vec<Inline>,
}

/// Per-character view used while editing.
#[derive(Debug, Clone, Copy)]
enum Unit {
    Char(char, Marks),
    Break,
}

impl Markup {
    /// Parse persisted markup.
    #[must_use]
    pub fn parse(src: &str) -> Self {
        let mut units = Vec::new();
        let mut depth = [0usize; 3];
        let mut rest = src;

        while let Some(c) = rest.chars().next() {
            match c {
                '<' => {
                    if let Some(end) = rest.find('>') {
                        apply_tag(&rest[1..end], &mut depth, &mut units);
                        rest = &rest[end + 1..];
                    } else {
                        units.push(Unit::Char('<', marks_from(depth)));
                        rest = &rest[1..];
                    }
                }
                '&' => {
                    let (decoded, consumed) = decode_entity(rest);
                    units.push(Unit::Char(decoded, marks_from(depth)));
                    rest = &rest[consumed..];
                }
                _ => {
                    units.push(Unit::Char(c, marks_from(depth)));
                    rest = &rest[c.len_utf8()..];
                }
            }
        }
        Self::from_units(&units)
    }

    /// Plain text with `\n` line breaks, one per break node.
    #[must_use]
    pub fn from_plain(text: &str) -> Self {
        let units: Vec<Unit> = text
            .chars()
            .map(|c| if c == '\n' { Unit::Break } else { Unit::Char(c, Marks::default()) })
            .collect();
        Self::from_units(&units)
    }

    #[must_use]
    pub fn nodes(&self) -> &[Inline] {
        &self.nodes
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Text without formatting; breaks become `\n`.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Inline::Text { text, .. } => out.push_str(text),
                Inline::Break => out.push('\n'),
            }
        }
        out
    }

    /// Plain text split at breaks. Empty content is one empty line.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.plain_text().split('\n').map(str::to_owned).collect()
    }

    /// Length in editing positions: one per character, one per break.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.nodes
            .iter()
            .map(|n| match n {
                Inline::Text { text, .. } => text.chars().count(),
                Inline::Break => 1,
            })
            .sum()
    }

    /// Toggle `mark` over the character range. If every character in range
    /// already carries the mark it is removed; otherwise it is applied to all
    /// of them. Out-of-range bounds are clamped.
    pub fn toggle(&mut self, range: Range<usize>, mark: Mark) {
        let mut units = self.units();
        let end = range.end.min(units.len());
        let start = range.start.min(end);
        if start == end {
            return;
        }
        let all_marked = units[start..end].iter().all(|u| match u {
            Unit::Char(_, marks) => marks.has(mark),
            Unit::Break => true,
        });
        for unit in &mut units[start..end] {
            if let Unit::Char(_, marks) = unit {
                marks.set(mark, !all_marked);
            }
        }
        *self = Self::from_units(&units);
    }

    /// Canonical serialization: `<b><i><u>` nesting, `<br>` breaks, text escaped.
    #[must_use]
    pub fn to_html(&self) -> String {
        self.to_string()
    }

    fn units(&self) -> Vec<Unit> {
        let mut units = Vec::new();
        for node in &self.nodes {
            match node {
                Inline::Text { text, marks } => units.extend(text.chars().map(|c| Unit::Char(c, *marks))),
                Inline::Break => units.push(Unit::Break),
            }
        }
        units
    }

    fn from_units(units: &[Unit]) -> Self {
        let mut nodes: Vec<Inline> = Vec::new();
        for unit in units {
            match *unit {
                Unit::Break => nodes.push(Inline::Break),
                Unit::Char(c, marks) => match nodes.last_mut() {
                    Some(Inline::Text { text, marks: last }) if *last == marks => text.push(c),
                    _ => nodes.push(Inline::Text { text: c.to_string(), marks }),
                },
            }
        }
        Self { nodes }
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            match node {
                Inline::Break => f.write_str("<br>")?,
                Inline::Text { text, marks } => {
                    if marks.bold {
                        f.write_str("<b>")?;
                    }
                    if marks.italic {
                        f.write_str("<i>")?;
                    }
                    if marks.underline {
                        f.write_str("<u>")?;
                    }
                    f.write_str(&escape_text(text))?;
                    if marks.underline {
                        f.write_str("</u>")?;
                    }
                    if marks.italic {
                        f.write_str("</i>")?;
                    }
                    if marks.bold {
                        f.write_str("</b>")?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn marks_from(depth: [usize; 3]) -> Marks {
    Marks { bold: depth[0] > 0, italic: depth[1] > 0, underline: depth[2] > 0 }
}

/// Interpret one tag body (the text between `<` and `>`).
fn apply_tag(body: &str, depth: &mut [usize; 3], units: &mut Vec<Unit>) {
    let body = body.trim();
    let (closing, body) = match body.strip_prefix('/') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, body),
    };
    let name: String = body
        .chars()
        .take_while(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let slot = match name.as_str() {
        "b" | "strong" => Some(0),
        "i" | "em" => Some(1),
        "u" => Some(2),
        "br" => {
            units.push(Unit::Break);
            None
        }
        "div" | "p" => {
            let after_text = matches!(units.last(), Some(Unit::Char(..)));
            if !closing && after_text {
                units.push(Unit::Break);
            }
            None
        }
        _ => None,
    };

    if let Some(slot) = slot {
        if closing {
            depth[slot] = depth[slot].saturating_sub(1);
        } else if !body.ends_with('/') {
            depth[slot] += 1;
        }
    }
}

/// Decode the entity at the start of `s` (which begins with `&`). Returns
/// the character and how many bytes were consumed; unknown entities decode
/// as a literal `&`.
fn decode_entity(s: &str) -> (char, usize) {
    let Some(semi) = s.find(';').filter(|&i| i <= 10) else {
        return ('&', 1);
    };
    let name = &s[1..semi];
    let decoded = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" | "#39" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => name.strip_prefix('#').and_then(|num| {
            let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16),
                None => num.parse::<u32>(),
            };
            match code {
                Ok(code) => char::from_u32(code),
                Err(_) => None,
            }
        }),
    };
    match decoded {
        Some(c) => (c, semi + 1),
        None => ('&', 1),
    }
}

/// Escape text for an HTML text node.
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text for a double-quoted HTML attribute value.
#[must_use]
pub fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
