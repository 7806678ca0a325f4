use super::token::{CSSToken, HashType, Span, SpannedToken};

/// [§ 4.3 Tokenizer Algorithms](https://www.w3.org/TR/css-syntax-3/#tokenizer-algorithms)
///
/// CSS tokenizer following the CSS Syntax Module Level 3 specification.
/// Every token carries the byte span it was consumed from.
pub struct CSSTokenizer {
    /// The input code points paired with their byte offsets
    input: Vec<(usize, char)>,
    /// Byte length of the input, the offset of EOF
    len: usize,
    /// Current position in `input`
    position: usize,
    /// Collected tokens
    tokens: Vec<SpannedToken>,
}

impl CSSTokenizer {
    /// Create a new CSS tokenizer with the given input.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self {
            input: input.char_indices().collect(),
            len: input.len(),
            position: 0,
            tokens: Vec::new(),
        }
    }

    /// [§ 4.3.1 Consume a token](https://www.w3.org/TR/css-syntax-3/#consume-token)
    ///
    /// "This section describes how to consume a token from a stream of code points.
    /// It will return a single token of any type."
    ///
    /// Runs until EOF; the last collected token is always [`CSSToken::EOF`].
    pub fn run(&mut self) {
        loop {
            // "Consume comments."
            self.consume_comments();

            let start = self.offset();
            let token = self.consume_token();
            let span = Span {
                start,
                end: self.offset(),
            };
            let is_eof = token.is_eof();
            self.tokens.push(SpannedToken { token, span });
            if is_eof {
                break;
            }
        }
    }

    /// Return the collected tokens.
    #[must_use]
    pub fn into_tokens(self) -> Vec<SpannedToken> {
        self.tokens
    }

    /// Return a reference to the collected tokens.
    #[must_use]
    pub fn tokens(&self) -> &[SpannedToken] {
        &self.tokens
    }

    /// [§ 4.3.1 Consume a token](https://www.w3.org/TR/css-syntax-3/#consume-token)
    fn consume_token(&mut self) -> CSSToken {
        // "Consume the next input code point."
        let Some(c) = self.consume() else {
            return CSSToken::EOF;
        };

        match c {
            // "whitespace"
            // "Consume as much whitespace as possible. Return a <whitespace-token>."
            c if is_whitespace(c) => {
                while self.peek().is_some_and(is_whitespace) {
                    let _ = self.consume();
                }
                CSSToken::Whitespace
            }

            // "U+0022 QUOTATION MARK (")" / "U+0027 APOSTROPHE (')"
            // "Consume a string token and return it."
            '"' | '\'' => self.consume_string_token(c),

            // "U+0023 NUMBER SIGN (#)"
            '#' => {
                if self.peek().is_some_and(is_ident_code_point)
                    || is_valid_escape(self.peek(), self.peek_at(1))
                {
                    let hash_type = if self.next_would_start_ident_sequence() {
                        HashType::Id
                    } else {
                        HashType::Unrestricted
                    };
                    let value = self.consume_ident_sequence();
                    CSSToken::Hash { value, hash_type }
                } else {
                    CSSToken::Delim('#')
                }
            }

            '(' => CSSToken::LeftParen,
            ')' => CSSToken::RightParen,

            // "U+002B PLUS SIGN (+)" / "U+002E FULL STOP (.)"
            // "If the input stream starts with a number, reconsume the current
            // input code point, consume a numeric token, and return it."
            '+' | '.' => {
                if self.would_start_number(c) {
                    self.reconsume();
                    self.consume_numeric_token()
                } else {
                    CSSToken::Delim(c)
                }
            }

            ',' => CSSToken::Comma,

            // "U+002D HYPHEN-MINUS (-)"
            '-' => {
                if self.would_start_number(c) {
                    self.reconsume();
                    self.consume_numeric_token()
                } else if self.peek() == Some('-') && self.peek_at(1) == Some('>') {
                    let _ = self.consume();
                    let _ = self.consume();
                    CSSToken::CDC
                } else if would_start_ident_sequence(Some('-'), self.peek(), self.peek_at(1))
                {
                    self.reconsume();
                    self.consume_ident_like_token()
                } else {
                    CSSToken::Delim('-')
                }
            }

            ':' => CSSToken::Colon,
            ';' => CSSToken::Semicolon,

            // "U+003C LESS-THAN SIGN (<)"
            '<' => {
                if self.peek() == Some('!')
                    && self.peek_at(1) == Some('-')
                    && self.peek_at(2) == Some('-')
                {
                    let _ = self.consume();
                    let _ = self.consume();
                    let _ = self.consume();
                    CSSToken::CDO
                } else {
                    CSSToken::Delim('<')
                }
            }

            // "U+0040 COMMERCIAL AT (@)"
            // "If the next 3 input code points would start an ident sequence, consume
            // an ident sequence, create an <at-keyword-token> with its value set to
            // the returned value, and return it."
            '@' => {
                if self.next_would_start_ident_sequence() {
                    CSSToken::AtKeyword(self.consume_ident_sequence())
                } else {
                    CSSToken::Delim('@')
                }
            }

            '[' => CSSToken::LeftBracket,
            ']' => CSSToken::RightBracket,

            // "U+005C REVERSE SOLIDUS (\)"
            '\\' => {
                if is_valid_escape(Some('\\'), self.peek()) {
                    self.reconsume();
                    self.consume_ident_like_token()
                } else {
                    // "This is a parse error."
                    CSSToken::Delim('\\')
                }
            }

            '{' => CSSToken::LeftBrace,
            '}' => CSSToken::RightBrace,

            c if c.is_ascii_digit() => {
                self.reconsume();
                self.consume_numeric_token()
            }

            c if is_ident_start_code_point(c) => {
                self.reconsume();
                self.consume_ident_like_token()
            }

            // "anything else"
            c => CSSToken::Delim(c),
        }
    }

    /// [§ 4.3.2 Consume comments](https://www.w3.org/TR/css-syntax-3/#consume-comment)
    ///
    /// CSS comments do not nest: the first `*/` closes the comment, and an
    /// unterminated comment runs to EOF.
    fn consume_comments(&mut self) {
        while self.peek() == Some('/') && self.peek_at(1) == Some('*') {
            let _ = self.consume();
            let _ = self.consume();

            loop {
                match self.consume() {
                    Some('*') if self.peek() == Some('/') => {
                        let _ = self.consume();
                        break;
                    }
                    Some(_) => {}
                    None => break,
                }
            }
        }
    }

    /// [§ 4.3.4 Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    fn consume_string_token(&mut self, ending_code_point: char) -> CSSToken {
        let mut value = String::new();

        loop {
            match self.consume() {
                Some(c) if c == ending_code_point => return CSSToken::String(value),

                // "EOF"
                // "This is a parse error. Return the <string-token>."
                None => return CSSToken::String(value),

                // "newline"
                // "This is a parse error. Reconsume the current input code point,
                // create a <bad-string-token>, and return it."
                Some('\n') => {
                    self.reconsume();
                    return CSSToken::BadString;
                }

                Some('\\') => match self.peek() {
                    None => {}
                    Some('\n') => {
                        let _ = self.consume();
                    }
                    Some(_) => value.push(self.consume_escaped_code_point()),
                },

                Some(c) => value.push(c),
            }
        }
    }

    /// [§ 4.3.3 Consume a numeric token](https://www.w3.org/TR/css-syntax-3/#consume-numeric-token)
    fn consume_numeric_token(&mut self) -> CSSToken {
        let (value, int_value) = self.consume_number();

        if self.next_would_start_ident_sequence() {
            let unit = self.consume_ident_sequence();
            CSSToken::Dimension {
                value,
                int_value,
                unit,
            }
        } else if self.peek() == Some('%') {
            let _ = self.consume();
            CSSToken::Percentage { value }
        } else {
            CSSToken::Number { value, int_value }
        }
    }

    /// [§ 4.3.4 Consume an ident-like token](https://www.w3.org/TR/css-syntax-3/#consume-ident-like-token)
    fn consume_ident_like_token(&mut self) -> CSSToken {
        let string = self.consume_ident_sequence();

        // "If the next input code point is U+0028 LEFT PARENTHESIS ((), consume
        // it. Create a <function-token> with its value set to string and return it."
        if self.peek() == Some('(') {
            let _ = self.consume();
            CSSToken::Function(string)
        } else {
            CSSToken::Ident(string)
        }
    }

    /// [§ 4.3.11 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    fn consume_ident_sequence(&mut self) -> String {
        let mut result = String::new();

        loop {
            match self.consume() {
                Some(c) if is_ident_code_point(c) => result.push(c),
                Some('\\') if is_valid_escape(Some('\\'), self.peek()) => {
                    result.push(self.consume_escaped_code_point());
                }
                Some(_) => {
                    self.reconsume();
                    return result;
                }
                None => return result,
            }
        }
    }

    /// [§ 4.3.12 Consume a number](https://www.w3.org/TR/css-syntax-3/#consume-number)
    ///
    /// Returns the numeric value and, for an integer-typed number, its exact value.
    fn consume_number(&mut self) -> (f64, Option<i64>) {
        let mut integer = true;
        let mut repr = String::new();

        // STEP 1: Optional sign.
        if let Some(sign @ ('+' | '-')) = self.peek() {
            repr.push(sign);
            let _ = self.consume();
        }

        // STEP 2: Integer digits.
        self.consume_digits(&mut repr);

        // STEP 3: Fraction.
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            repr.push('.');
            let _ = self.consume();
            self.consume_digits(&mut repr);
            integer = false;
        }

        // STEP 4: Exponent.
        let exponent_digit_at = match (self.peek(), self.peek_at(1)) {
            (Some('e' | 'E'), Some('+' | '-')) => Some(2),
            (Some('e' | 'E'), _) => Some(1),
            _ => None,
        };
        let exponent_digit_at =
            exponent_digit_at.filter(|&at| self.peek_at(at).is_some_and(|c| c.is_ascii_digit()));
        if let Some(at) = exponent_digit_at {
            for _ in 0..at {
                if let Some(c) = self.consume() {
                    repr.push(c);
                }
            }
            self.consume_digits(&mut repr);
            integer = false;
        }

        let value = repr.parse::<f64>().unwrap_or(0.0);
        let int_value = if integer {
            repr.parse::<i64>().ok()
        } else {
            None
        };
        (value, int_value)
    }

    fn consume_digits(&mut self, repr: &mut String) {
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            repr.push(c);
            let _ = self.consume();
        }
    }

    /// [§ 4.3.7 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    fn consume_escaped_code_point(&mut self) -> char {
        match self.consume() {
            // "hex digit"
            // "Consume as many hex digits as possible, but no more than 5.
            // If the next input code point is whitespace, consume it as well."
            Some(c) if c.is_ascii_hexdigit() => {
                let mut hex = String::from(c);
                while hex.len() < 6 {
                    match self.peek() {
                        Some(h) if h.is_ascii_hexdigit() => {
                            hex.push(h);
                            let _ = self.consume();
                        }
                        _ => break,
                    }
                }
                if self.peek().is_some_and(is_whitespace) {
                    let _ = self.consume();
                }
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|&cp| cp != 0)
                    .and_then(char::from_u32)
                    .unwrap_or(char::REPLACEMENT_CHARACTER)
            }
            // "EOF"
            // "This is a parse error. Return U+FFFD REPLACEMENT CHARACTER."
            None => char::REPLACEMENT_CHARACTER,
            Some(c) => c,
        }
    }

    /// [§ 4.3.9 Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#would-start-an-identifier)
    /// for the next three code points in the stream.
    fn next_would_start_ident_sequence(&self) -> bool {
        would_start_ident_sequence(self.peek(), self.peek_at(1), self.peek_at(2))
    }

    /// [§ 4.3.10 Check if three code points would start a number](https://www.w3.org/TR/css-syntax-3/#starts-with-a-number)
    ///
    /// `current` has already been consumed; the rest is peeked.
    fn would_start_number(&self, current: char) -> bool {
        let digit = |c: Option<char>| c.is_some_and(|c| c.is_ascii_digit());
        match current {
            '+' | '-' => {
                digit(self.peek()) || (self.peek() == Some('.') && digit(self.peek_at(1)))
            }
            '.' => digit(self.peek()),
            c => c.is_ascii_digit(),
        }
    }

    /// Byte offset of the current position.
    fn offset(&self) -> usize {
        self.input
            .get(self.position)
            .map_or(self.len, |&(offset, _)| offset)
    }

    /// Consume and return the next character.
    fn consume(&mut self) -> Option<char> {
        let (_, c) = *self.input.get(self.position)?;
        self.position += 1;
        Some(c)
    }

    /// Put back the last consumed character.
    const fn reconsume(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    /// Peek at the next character without consuming it.
    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    /// Peek at a character at an offset from current position.
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).map(|&(_, c)| c)
    }
}

/// [§ 4.3.8 Check if two code points are a valid escape](https://www.w3.org/TR/css-syntax-3/#starts-with-a-valid-escape)
///
/// "If the first code point is not U+005C REVERSE SOLIDUS (\), return false.
/// Otherwise, if the second code point is a newline, return false.
/// Otherwise, return true."
fn is_valid_escape(first: Option<char>, second: Option<char>) -> bool {
    first == Some('\\') && second.is_some_and(|c| c != '\n')
}

/// [§ 4.3.9 Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#would-start-an-identifier)
fn would_start_ident_sequence(
    first: Option<char>,
    second: Option<char>,
    third: Option<char>,
) -> bool {
    match first {
        // "U+002D HYPHEN-MINUS"
        // "If the second code point is an ident-start code point or a U+002D
        // HYPHEN-MINUS, or the second and third code points are a valid escape,
        // return true. Otherwise, return false."
        Some('-') => {
            second.is_some_and(|c| is_ident_start_code_point(c) || c == '-')
                || is_valid_escape(second, third)
        }
        // "ident-start code point"
        Some(c) if is_ident_start_code_point(c) => true,
        // "U+005C REVERSE SOLIDUS (\)"
        Some('\\') => is_valid_escape(first, second),
        _ => false,
    }
}

/// [§ 4.2 Definitions - whitespace](https://www.w3.org/TR/css-syntax-3/#whitespace)
const fn is_whitespace(c: char) -> bool {
    matches!(c, '\n' | '\t' | ' ' | '\r' | '\x0C')
}

/// [§ 4.2 Definitions - ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
///
/// "A letter, a non-ASCII code point, or U+005F LOW LINE (_)."
const fn is_ident_start_code_point(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// [§ 4.2 Definitions - ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
///
/// "An ident-start code point, a digit, or U+002D HYPHEN-MINUS (-)."
const fn is_ident_code_point(c: char) -> bool {
    is_ident_start_code_point(c) || c.is_ascii_digit() || c == '-'
}
