//! CSS tokenizer and rule parser for the respond authoring tools.
//!
//! # Scope
//!
//! This crate implements:
//! - **CSS Tokenizer** ([§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization))
//!   - Comment handling
//!   - Escape sequences
//!   - Byte spans on every token
//!
//! - **CSS Parser** ([§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing))
//!   - Stylesheet parsing with nested conditional group rules
//!   - Declaration parsing with values kept as source text
//!   - Single-line declaration input
//!   - Selector text normalization
//!
//! - **Media preludes** ([Media Queries Level 4](https://www.w3.org/TR/mediaqueries-4/))
//!   - `(max-width: Npx)` breakpoint conditions
//!
//! # Not Implemented
//!
//! - Selector parsing or matching (selectors are opaque strings)
//! - Value parsing (values are opaque strings)
//! - Any media feature other than `max-width`

/// Single-line declaration input.
pub mod declaration;
/// Breakpoint conditions in `@media` preludes.
pub mod media;
/// CSS parser per [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing).
pub mod parser;
/// Canonical selector keys.
pub mod selector;
/// CSS tokenizer per [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization).
pub mod tokenizer;

pub use declaration::{DeclarationLine, MalformedDeclaration, normalize_value, parse_declaration_line};
pub use media::{MediaCondition, MediaError};
pub use parser::{AtRule, AtRuleBlock, CSSParser, Declaration, Rule, StyleRule, Stylesheet, parse_stylesheet};
pub use selector::{InvalidSelector, normalize_selector};
pub use tokenizer::{CSSToken, CSSTokenizer, Span, SpannedToken};
