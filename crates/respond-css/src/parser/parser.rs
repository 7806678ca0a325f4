//! CSS Parser per [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing).
//!
//! "The input to the parsing stage is a stream of tokens from the tokenization stage."
//!
//! The parser keeps the source text next to the tokens: selectors and
//! declaration values are rebuilt from the source slices of their tokens, so
//! nothing the author wrote is normalized away except comments and runs of
//! whitespace (collapsed to one space).

use std::ops::Range;

use crate::tokenizer::{CSSToken, CSSTokenizer, Span, SpannedToken};

/// [§ 5.4.6 Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-declaration)
///
/// A CSS declaration (e.g., `color: red`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// The property name.
    pub name: String,
    /// The property value as source text, including any `!important`.
    pub value: String,
    /// Whether the declaration has `!important`.
    pub important: bool,
    /// 1-based source line of the property name.
    pub line: usize,
}

/// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-qualified-rule)
///
/// A CSS style rule (selector + declarations).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    /// Selector list text, e.g. `h1, .title > a`.
    pub selector: String,
    /// The declarations in this rule block.
    pub declarations: Vec<Declaration>,
    /// Whether the block was closed by a `}` before the input ended.
    pub closed: bool,
    /// 1-based source line of the selector.
    pub line: usize,
}

/// Contents of an at-rule's `{}` block.
#[derive(Debug, Clone, PartialEq)]
pub enum AtRuleBlock {
    /// Conditional group rules (`@media`, `@supports`, ...) contain rules.
    Rules(Vec<Rule>),
    /// Any other at-rule block is kept as source text.
    Raw(String),
}

/// [§ 5.4.2 Consume an at-rule](https://www.w3.org/TR/css-syntax-3/#consume-at-rule)
///
/// A CSS at-rule.
#[derive(Debug, Clone, PartialEq)]
pub struct AtRule {
    /// The at-keyword name (without the `@`).
    pub name: String,
    /// The prelude tokens, without leading or trailing whitespace.
    pub prelude: Vec<CSSToken>,
    /// The prelude as source text.
    pub prelude_text: String,
    /// The optional block contents.
    pub block: Option<AtRuleBlock>,
    /// Whether the block (if any) was closed by a `}` before the input ended.
    pub closed: bool,
    /// 1-based source line of the at-keyword.
    pub line: usize,
}

/// [§ 5.3.3 Consume a list of rules](https://www.w3.org/TR/css-syntax-3/#consume-list-of-rules)
///
/// A CSS rule (either a style rule or an at-rule).
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// A style rule (qualified rule).
    Style(StyleRule),
    /// An at-rule.
    At(AtRule),
}

impl Rule {
    /// 1-based source line where the rule starts.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::Style(rule) => rule.line,
            Self::At(rule) => rule.line,
        }
    }
}

/// [§ 5.3.2 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
///
/// A parsed CSS stylesheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stylesheet {
    /// The list of rules in the stylesheet.
    pub rules: Vec<Rule>,
}

/// Tokenize and parse a whole stylesheet.
#[must_use]
pub fn parse_stylesheet(css: &str) -> Stylesheet {
    let mut tokenizer = CSSTokenizer::new(css);
    tokenizer.run();
    CSSParser::new(css, tokenizer.into_tokens()).parse_stylesheet()
}

/// At-rules whose block is a list of rules rather than declarations.
///
/// [CSS Conditional Rules Level 3 § 2](https://www.w3.org/TR/css-conditional-3/#processing)
fn is_conditional_group_rule(name: &str) -> bool {
    ["media", "supports", "document", "container", "layer"]
        .iter()
        .any(|group| name.eq_ignore_ascii_case(group))
}

/// CSS parser
pub struct CSSParser<'a> {
    source: &'a str,
    tokens: Vec<SpannedToken>,
    position: usize,
}

impl<'a> CSSParser<'a> {
    /// Create a new parser from the source text and its tokens.
    #[must_use]
    pub const fn new(source: &'a str, tokens: Vec<SpannedToken>) -> Self {
        Self {
            source,
            tokens,
            position: 0,
        }
    }

    /// [§ 5.3.3 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
    ///
    /// "To parse a stylesheet from input..."
    pub fn parse_stylesheet(&mut self) -> Stylesheet {
        // "Consume a list of rules from input, with the top-level flag set."
        let rules = self.consume_list_of_rules(true);
        Stylesheet { rules }
    }

    /// [§ 5.3.6 Parse a list of declarations](https://www.w3.org/TR/css-syntax-3/#parse-list-of-declarations)
    ///
    /// Parse declarations from a style attribute or similar.
    pub fn parse_declaration_list(&mut self) -> Vec<Declaration> {
        self.consume_list_of_declarations()
    }

    /// [§ 5.3.5 Parse a declaration](https://www.w3.org/TR/css-syntax-3/#parse-declaration)
    ///
    /// "If the next input token is not an <ident-token>, return a syntax error.
    /// Consume a declaration. If anything was returned, return it. Otherwise,
    /// return a syntax error."
    ///
    /// Trailing `;` terminators are allowed; anything else after the
    /// declaration is an error.
    pub fn parse_declaration(&mut self) -> Option<Declaration> {
        self.skip_whitespace();
        if !matches!(self.peek(), Some(CSSToken::Ident(_))) {
            return None;
        }
        let declaration = self.consume_declaration()?;

        while matches!(self.peek(), Some(CSSToken::Semicolon | CSSToken::Whitespace)) {
            let _ = self.consume();
        }
        matches!(self.peek(), None | Some(CSSToken::EOF)).then_some(declaration)
    }

    /// The whole input as the prelude of a style rule, whitespace collapsed
    /// and comments dropped, the same text [`CSSParser::parse_stylesheet`]
    /// reports as [`StyleRule::selector`].
    ///
    /// Returns `None` for input that would not read back as one selector
    /// list in front of a `{`: empty text, `;`, braces, at-keywords, CDO/CDC,
    /// bad strings, a dangling `\` or unbalanced `()`/`[]`.
    #[must_use]
    pub fn parse_selector(&self) -> Option<String> {
        let end = self
            .tokens
            .iter()
            .position(|t| t.token.is_eof())
            .unwrap_or(self.tokens.len());

        let mut open = Vec::new();
        for token in &self.tokens[..end] {
            match &token.token {
                CSSToken::Semicolon
                | CSSToken::LeftBrace
                | CSSToken::RightBrace
                | CSSToken::AtKeyword(_)
                | CSSToken::CDO
                | CSSToken::CDC
                | CSSToken::BadString
                | CSSToken::Delim('\\') => return None,
                CSSToken::LeftParen | CSSToken::Function(_) => open.push(CSSToken::RightParen),
                CSSToken::LeftBracket => open.push(CSSToken::RightBracket),
                closing @ (CSSToken::RightParen | CSSToken::RightBracket) => {
                    if open.pop().as_ref() != Some(closing) {
                        return None;
                    }
                }
                _ => {}
            }
        }
        if !open.is_empty() {
            return None;
        }

        let text = self.text(0..end);
        (!text.is_empty()).then_some(text)
    }

    /// [§ 5.4.1 Consume a list of rules](https://www.w3.org/TR/css-syntax-3/#consume-list-of-rules)
    ///
    /// A nested list (the inside of a `@media` block) ends at the `}` that
    /// closes its block; that token is left for the caller.
    fn consume_list_of_rules(&mut self, top_level: bool) -> Vec<Rule> {
        let mut rules = Vec::new();

        loop {
            match self.peek() {
                // "<whitespace-token>"
                // "Do nothing."
                Some(CSSToken::Whitespace) => {
                    let _ = self.consume();
                }

                // "<EOF-token>"
                // "Return the list of rules."
                None | Some(CSSToken::EOF) => return rules,

                Some(CSSToken::RightBrace) if !top_level => return rules,

                // "<CDO-token>" or "<CDC-token>"
                Some(CSSToken::CDO | CSSToken::CDC) if top_level => {
                    let _ = self.consume();
                }

                // "<at-keyword-token>"
                // "Reconsume the current input token. Consume an at-rule, and append
                // the returned value to the list of rules."
                Some(CSSToken::AtKeyword(_)) => {
                    if let Some(at_rule) = self.consume_at_rule() {
                        rules.push(Rule::At(at_rule));
                    }
                }

                // "anything else"
                // "Reconsume the current input token. Consume a qualified rule. If
                // anything is returned, append it to the list of rules."
                Some(_) => {
                    if let Some(rule) = self.consume_qualified_rule(top_level) {
                        rules.push(Rule::Style(rule));
                    }
                }
            }
        }
    }

    /// [§ 5.4.2 Consume an at-rule](https://www.w3.org/TR/css-syntax-3/#consume-at-rule)
    fn consume_at_rule(&mut self) -> Option<AtRule> {
        let line = self.current_line();
        let name = match self.consume() {
            Some(CSSToken::AtKeyword(name)) => name.clone(),
            _ => return None,
        };

        let prelude_start = self.position;
        loop {
            match self.peek() {
                // "<semicolon-token>"
                // "Return the at-rule."
                Some(CSSToken::Semicolon) => {
                    let prelude_end = self.position;
                    let _ = self.consume();
                    return Some(self.at_rule(name, prelude_start..prelude_end, None, true, line));
                }

                // "<EOF-token>"
                // "This is a parse error. Return the at-rule."
                None | Some(CSSToken::EOF) => {
                    let prelude_end = self.position;
                    return Some(self.at_rule(name, prelude_start..prelude_end, None, true, line));
                }

                // "<{-token>"
                // "Consume a simple block and assign it to the at-rule's block.
                // Return the at-rule."
                Some(CSSToken::LeftBrace) => {
                    let prelude_end = self.position;
                    let _ = self.consume();

                    let (block, closed) = if is_conditional_group_rule(&name) {
                        let rules = self.consume_list_of_rules(false);
                        (AtRuleBlock::Rules(rules), self.consume_closing_brace())
                    } else {
                        let start = self.position;
                        let closed = self.skip_until_closing_brace();
                        let end = self.position - usize::from(closed);
                        (AtRuleBlock::Raw(self.text(start..end)), closed)
                    };

                    return Some(self.at_rule(
                        name,
                        prelude_start..prelude_end,
                        Some(block),
                        closed,
                        line,
                    ));
                }

                // Inside a conditional group the enclosing block's `}` ends the
                // prelude; the rule is dropped.
                Some(CSSToken::RightBrace) => return None,

                // "anything else"
                // "Reconsume the current input token. Consume a component value.
                // Append the returned value to the at-rule's prelude."
                Some(_) => self.skip_component_value(),
            }
        }
    }

    fn at_rule(
        &self,
        name: String,
        prelude: Range<usize>,
        block: Option<AtRuleBlock>,
        closed: bool,
        line: usize,
    ) -> AtRule {
        let prelude_tokens = trim_whitespace(&self.tokens[prelude.clone()])
            .iter()
            .map(|t| t.token.clone())
            .collect();
        AtRule {
            name,
            prelude: prelude_tokens,
            prelude_text: self.text(prelude),
            block,
            closed,
            line,
        }
    }

    /// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-qualified-rule)
    fn consume_qualified_rule(&mut self, top_level: bool) -> Option<StyleRule> {
        let line = self.current_line();
        let prelude_start = self.position;

        loop {
            match self.peek() {
                // "<EOF-token>"
                // "This is a parse error. Return nothing."
                None | Some(CSSToken::EOF) => return None,

                // A stray `}` at the top level is discarded; in a nested list it
                // closes the enclosing block.
                Some(CSSToken::RightBrace) => {
                    if top_level {
                        let _ = self.consume();
                    }
                    return None;
                }

                // A declaration sitting directly inside a conditional group is
                // dropped rather than glued onto the next selector.
                Some(CSSToken::Semicolon) if !top_level => {
                    let _ = self.consume();
                    return None;
                }

                // "<{-token>"
                // "Consume a simple block and assign it to the qualified rule's block.
                // Return the qualified rule."
                Some(CSSToken::LeftBrace) => {
                    let selector = self.text(prelude_start..self.position);
                    let _ = self.consume();
                    let declarations = self.consume_list_of_declarations();
                    let closed = self.consume_closing_brace();
                    return Some(StyleRule {
                        selector,
                        declarations,
                        closed,
                        line,
                    });
                }

                // "anything else"
                Some(_) => self.skip_component_value(),
            }
        }
    }

    /// [§ 5.4.5 Consume a list of declarations](https://www.w3.org/TR/css-syntax-3/#consume-list-of-declarations)
    fn consume_list_of_declarations(&mut self) -> Vec<Declaration> {
        let mut declarations = Vec::new();

        loop {
            match self.peek() {
                // "<whitespace-token>" or "<semicolon-token>"
                // "Do nothing."
                Some(CSSToken::Whitespace | CSSToken::Semicolon) => {
                    let _ = self.consume();
                }

                // "<EOF-token>" or "<}-token>"
                // "Return the list of declarations."
                None | Some(CSSToken::EOF | CSSToken::RightBrace) => return declarations,

                // "<at-keyword-token>"
                // Nested at-rules in a style block are not kept.
                Some(CSSToken::AtKeyword(_)) => {
                    let _ = self.consume_at_rule();
                }

                // "<ident-token>"
                // "Consume a declaration. If anything was returned, append it to
                // the list of declarations."
                Some(CSSToken::Ident(_)) => {
                    if let Some(decl) = self.consume_declaration() {
                        declarations.push(decl);
                    } else {
                        self.skip_to_declaration_end();
                    }
                }

                // "anything else"
                // "This is a parse error. ... consume a component value and throw
                // away the returned value."
                Some(_) => self.skip_to_declaration_end(),
            }
        }
    }

    /// [§ 5.4.6 Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-declaration)
    fn consume_declaration(&mut self) -> Option<Declaration> {
        let line = self.current_line();
        let name = match self.consume() {
            Some(CSSToken::Ident(name)) => name.clone(),
            _ => return None,
        };

        // "While the next input token is a <whitespace-token>, consume the next input token."
        self.skip_whitespace();

        // "If the next input token is anything other than a <colon-token>, this is a parse error.
        // Return nothing."
        if self.peek() != Some(&CSSToken::Colon) {
            return None;
        }
        let _ = self.consume();

        // "As long as the next input token is anything other than an <EOF-token>, consume a
        // component value and append it to the declaration's value."
        let value_start = self.position;
        while !matches!(
            self.peek(),
            None | Some(CSSToken::EOF | CSSToken::Semicolon | CSSToken::RightBrace)
        ) {
            // A `{}` block cannot be part of a declaration value in a style rule.
            if self.peek() == Some(&CSSToken::LeftBrace) {
                return None;
            }
            self.skip_component_value();
        }
        let value_tokens = trim_whitespace(&self.tokens[value_start..self.position]);

        // "If the declaration's value is empty, this is a parse error."
        if value_tokens.is_empty() {
            return None;
        }

        let value = self.join(value_tokens);
        let important = is_important(value_tokens);

        Some(Declaration {
            name,
            value,
            important,
            line,
        })
    }

    /// [§ 5.4.7 Consume a component value](https://www.w3.org/TR/css-syntax-3/#consume-component-value)
    ///
    /// Blocks and functions are skipped up to their matching closing token.
    fn skip_component_value(&mut self) {
        let closing = match self.consume() {
            Some(CSSToken::LeftBrace) => CSSToken::RightBrace,
            Some(CSSToken::LeftBracket) => CSSToken::RightBracket,
            Some(CSSToken::LeftParen | CSSToken::Function(_)) => CSSToken::RightParen,
            _ => return,
        };

        loop {
            match self.peek() {
                Some(token) if *token == closing => {
                    let _ = self.consume();
                    return;
                }
                None | Some(CSSToken::EOF) => return,
                Some(_) => self.skip_component_value(),
            }
        }
    }

    /// Recover from a bad declaration: skip to the next `;` or the end of the block.
    fn skip_to_declaration_end(&mut self) {
        while !matches!(
            self.peek(),
            None | Some(CSSToken::Semicolon | CSSToken::RightBrace | CSSToken::EOF)
        ) {
            self.skip_component_value();
        }
    }

    /// Skip a block body whose `{` has been consumed, including its `}`.
    /// Returns whether the `}` was found.
    fn skip_until_closing_brace(&mut self) -> bool {
        loop {
            match self.peek() {
                None | Some(CSSToken::EOF) => return false,
                Some(CSSToken::RightBrace) => {
                    let _ = self.consume();
                    return true;
                }
                Some(_) => self.skip_component_value(),
            }
        }
    }

    fn consume_closing_brace(&mut self) -> bool {
        if self.peek() == Some(&CSSToken::RightBrace) {
            let _ = self.consume();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek() == Some(&CSSToken::Whitespace) {
            let _ = self.consume();
        }
    }

    /// Source text of a token range, trimmed.
    fn text(&self, range: Range<usize>) -> String {
        self.join(trim_whitespace(&self.tokens[range]))
    }

    /// Rebuild text from token source slices. Whitespace becomes a single
    /// space and comments (which have no token) disappear.
    fn join(&self, tokens: &[SpannedToken]) -> String {
        let mut text = String::new();
        for token in tokens {
            if token.token.is_whitespace() {
                // A comment between two whitespace runs leaves two tokens.
                if !text.ends_with(' ') {
                    text.push(' ');
                }
            } else {
                text.push_str(token.span.slice(self.source));
            }
        }
        text
    }

    fn current_line(&self) -> usize {
        self.tokens
            .get(self.position)
            .map_or(Span::default(), |t| t.span)
            .line(self.source)
    }

    fn consume(&mut self) -> Option<&CSSToken> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(&token.token)
    }

    fn peek(&self) -> Option<&CSSToken> {
        self.tokens.get(self.position).map(|t| &t.token)
    }
}

/// Strip leading and trailing whitespace tokens.
fn trim_whitespace(tokens: &[SpannedToken]) -> &[SpannedToken] {
    let start = tokens
        .iter()
        .position(|t| !t.token.is_whitespace())
        .unwrap_or(tokens.len());
    let end = tokens
        .iter()
        .rposition(|t| !t.token.is_whitespace())
        .map_or(start, |i| i + 1);
    &tokens[start..end]
}

/// [§ 6.4.2 Important declarations](https://www.w3.org/TR/css-cascade-4/#importance)
///
/// "A declaration is important if it has a !important annotation, i.e.
/// if the last two (non-whitespace, non-comment) tokens in its value are
/// a <delim-token> with the value "!" followed by an <ident-token> with
/// a value that is an ASCII case-insensitive match for "important"."
fn is_important(value: &[SpannedToken]) -> bool {
    let mut iter = value.iter().rev().filter(|t| !t.token.is_whitespace());
    matches!(iter.next(), Some(t) if t.token.is_ident("important"))
        && matches!(iter.next(), Some(t) if t.token == CSSToken::Delim('!'))
}
