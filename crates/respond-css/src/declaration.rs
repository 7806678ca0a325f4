//! Single-line declaration input.
//!
//! The inline editor hands over one line of text at a time. A line is only
//! accepted when it holds exactly one `property: value` declaration, with an
//! optional trailing `;` and any amount of surrounding whitespace.

use thiserror::Error;

use crate::parser::CSSParser;
use crate::tokenizer::CSSTokenizer;

/// A line that does not hold a single `property: value` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a declaration: '{line}'")]
pub struct MalformedDeclaration {
    /// The rejected input, trimmed.
    pub line: String,
}

/// A declaration parsed from one editor line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationLine {
    /// The property name.
    pub property: String,
    /// The value, trimmed and without the trailing `;`.
    pub value: String,
}

/// Parse one editor line as a declaration.
///
/// # Errors
///
/// Returns [`MalformedDeclaration`] when the line is empty, lacks a `:`,
/// has an empty value, or contains anything besides one declaration and
/// its trailing `;` terminators.
pub fn parse_declaration_line(line: &str) -> Result<DeclarationLine, MalformedDeclaration> {
    let mut tokenizer = CSSTokenizer::new(line);
    tokenizer.run();
    CSSParser::new(line, tokenizer.into_tokens())
        .parse_declaration()
        .map(|decl| DeclarationLine {
            property: decl.name,
            value: decl.value,
        })
        .ok_or_else(|| MalformedDeclaration {
            line: line.trim().to_string(),
        })
}

/// Normalize a stored value: drop trailing `;` terminators and surrounding
/// whitespace. A `;` inside the value (e.g. in a string) is kept.
#[must_use]
pub fn normalize_value(value: &str) -> String {
    value
        .trim()
        .trim_end_matches(|c: char| c == ';' || c.is_whitespace())
        .to_string()
}
