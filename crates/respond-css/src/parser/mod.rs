//! CSS parser module.

/// CSS parser implementation per [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing).
#[allow(clippy::module_inception)]
pub mod parser;

pub use parser::{
    AtRule, AtRuleBlock, CSSParser, Declaration, Rule, StyleRule, Stylesheet, parse_stylesheet,
};
