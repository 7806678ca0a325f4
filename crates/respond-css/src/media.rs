//! Media query preludes of generated breakpoint blocks.
//!
//! [Media Queries Level 4 § 3](https://www.w3.org/TR/mediaqueries-4/#mq-syntax)
//!
//! Only the shape the authoring tools write is understood:
//!
//! ```text
//! [only] [screen | all] [and] (max-width: <integer>px)
//! ```
//!
//! Every other media query is reported as unsupported so the caller can skip
//! the block.

use thiserror::Error;

use crate::tokenizer::CSSToken;

/// Why a media prelude is not a breakpoint condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    /// The prelude is not `[only] [screen] [and] (max-width: ...)`.
    #[error("unsupported media query '{0}'")]
    Unsupported(String),
    /// The max-width value is not an integer number of pixels.
    #[error("max-width must be an integer px length, got '{0}'")]
    BadLength(String),
}

/// A breakpoint condition, `(max-width: <max_width>px)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaCondition {
    /// The max-width in pixels as written; may be zero or negative.
    pub max_width: i64,
}

impl MediaCondition {
    /// Interpret an `@media` prelude.
    ///
    /// `prelude_text` is only used for error messages.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError`] when the prelude is not a single max-width condition.
    pub fn from_prelude(prelude: &[CSSToken], prelude_text: &str) -> Result<Self, MediaError> {
        let unsupported = || MediaError::Unsupported(prelude_text.to_string());
        let mut tokens = prelude.iter().filter(|t| !t.is_whitespace()).peekable();

        // STEP 1: Optional `only`, media type and `and`.
        if tokens.peek().is_some_and(|t| t.is_ident("only")) {
            let _ = tokens.next();
        }
        if tokens
            .peek()
            .is_some_and(|t| t.is_ident("screen") || t.is_ident("all"))
        {
            let _ = tokens.next();
            if !tokens.next().is_some_and(|t| t.is_ident("and")) {
                return Err(unsupported());
            }
        }

        // STEP 2: `(max-width:`
        if tokens.next() != Some(&CSSToken::LeftParen)
            || !tokens.next().is_some_and(|t| t.is_ident("max-width"))
            || tokens.next() != Some(&CSSToken::Colon)
        {
            return Err(unsupported());
        }

        // STEP 3: `<integer>px`
        let max_width = match tokens.next() {
            Some(CSSToken::Dimension {
                int_value: Some(v),
                unit,
                ..
            }) if unit.eq_ignore_ascii_case("px") => *v,
            Some(CSSToken::Number {
                int_value: Some(0), ..
            }) => 0,
            Some(other) => return Err(MediaError::BadLength(other.to_string())),
            None => return Err(unsupported()),
        };

        // STEP 4: `)` and nothing after it.
        if tokens.next() != Some(&CSSToken::RightParen) || tokens.next().is_some() {
            return Err(unsupported());
        }

        Ok(Self { max_width })
    }
}
