//! Selector keys.
//!
//! Selectors are never matched, only used as keys and written back into the
//! stylesheet. Editor input is brought into the form the parser reports for
//! the same text, so a rule added under `ul  li` is found under `ul li`
//! after the stylesheet is read again.

use thiserror::Error;

use crate::parser::CSSParser;
use crate::tokenizer::CSSTokenizer;

/// Text that cannot be written as the selector of a style rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a selector: '{selector}'")]
pub struct InvalidSelector {
    /// The rejected input, trimmed.
    pub selector: String,
}

/// Canonical form of a selector list: comments dropped, whitespace runs
/// collapsed to one space, ends trimmed.
///
/// # Errors
///
/// Returns [`InvalidSelector`] for empty text and for text that would break
/// out of the rule when written back, such as `a } b` or `p;`.
pub fn normalize_selector(selector: &str) -> Result<String, InvalidSelector> {
    let mut tokenizer = CSSTokenizer::new(selector);
    tokenizer.run();
    CSSParser::new(selector, tokenizer.into_tokens())
        .parse_selector()
        .ok_or_else(|| InvalidSelector {
            selector: selector.trim().to_string(),
        })
}
