/**
 * Expression Lexer
 *
 * Splits a binding expression into tokens. Scanning never fails: problems
 * are reported as `Error` tokens and the parser turns them into diagnostics.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::chars;
use crate::cursor::Cursor;
use crate::error::{CompilerError, LexErrorKind};

/// Words scanned as `Keyword` tokens unless the lexer is given its own table.
pub const KEYWORDS: &[&str] = &["this", "true", "false", "null", "undefined"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
    Character,
    Identifier,
    PrivateIdentifier,
    Keyword,
    String,
    Operator,
    Number,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Byte offset of the first character.
    pub index: usize,
    /// Byte offset just past the last character.
    pub end: usize,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub num_value: f64,
    pub str_value: String,
    pub error_kind: Option<LexErrorKind>,
}

impl Token {
    pub fn new(index: usize, end: usize, token_type: TokenType, num_value: f64, str_value: String) -> Self {
        Token {
            index,
            end,
            token_type,
            num_value,
            str_value,
            error_kind: None,
        }
    }

    pub fn character(index: usize, end: usize, code: char) -> Self {
        Token::new(index, end, TokenType::Character, code as u32 as f64, code.to_string())
    }

    pub fn operator(index: usize, end: usize, text: &str) -> Self {
        Token::new(index, end, TokenType::Operator, 0.0, text.to_string())
    }

    pub fn number(index: usize, end: usize, value: f64) -> Self {
        Token::new(index, end, TokenType::Number, value, String::new())
    }

    pub fn error(index: usize, end: usize, kind: LexErrorKind, message: String) -> Self {
        Token {
            error_kind: Some(kind),
            ..Token::new(index, end, TokenType::Error, 0.0, message)
        }
    }

    pub fn is_character(&self, code: char) -> bool {
        self.token_type == TokenType::Character && self.str_value.starts_with(code)
    }

    pub fn is_number(&self) -> bool {
        self.token_type == TokenType::Number
    }

    pub fn is_string(&self) -> bool {
        self.token_type == TokenType::String
    }

    pub fn is_identifier(&self) -> bool {
        self.token_type == TokenType::Identifier
    }

    pub fn is_keyword(&self) -> bool {
        self.token_type == TokenType::Keyword
    }

    pub fn is_private_identifier(&self) -> bool {
        self.token_type == TokenType::PrivateIdentifier
    }

    pub fn is_operator(&self, operator: &str) -> bool {
        self.token_type == TokenType::Operator && self.str_value == operator
    }

    pub fn is_error(&self) -> bool {
        self.token_type == TokenType::Error
    }

    /// A bare word that is an identifier or keyword, e.g. `let` or `as` in
    /// a template binding.
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self.token_type, TokenType::Identifier | TokenType::Keyword) && self.str_value == word
    }

    pub fn is_keyword_null(&self) -> bool {
        self.is_keyword() && self.str_value == "null"
    }

    pub fn is_keyword_undefined(&self) -> bool {
        self.is_keyword() && self.str_value == "undefined"
    }

    pub fn is_keyword_true(&self) -> bool {
        self.is_keyword() && self.str_value == "true"
    }

    pub fn is_keyword_false(&self) -> bool {
        self.is_keyword() && self.str_value == "false"
    }

    pub fn is_keyword_this(&self) -> bool {
        self.is_keyword() && self.str_value == "this"
    }

    pub fn to_number(&self) -> f64 {
        if self.is_number() {
            self.num_value
        } else {
            -1.0
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.token_type {
            TokenType::Number => write!(f, "{}", self.num_value),
            _ => f.write_str(&self.str_value),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Lexer {
    keywords: Vec<String>,
}

impl Lexer {
    pub fn new() -> Self {
        Lexer::with_keywords(KEYWORDS)
    }

    /// A lexer that classifies `keywords` as `Keyword` tokens instead of the
    /// default table.
    pub fn with_keywords(keywords: &[&str]) -> Self {
        Lexer {
            keywords: keywords.iter().map(|word| word.to_string()).collect(),
        }
    }

    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        Scanner::new(text, &self.keywords).scan()
    }
}

impl Default for Lexer {
    fn default() -> Self {
        Lexer::new()
    }
}

struct ScanError {
    kind: LexErrorKind,
    index: usize,
    end: usize,
    message: String,
}

impl ScanError {
    fn new(kind: LexErrorKind, index: usize, end: usize, message: impl Into<String>) -> Self {
        ScanError {
            kind,
            index,
            end,
            message: message.into(),
        }
    }

    fn into_token(self, input: &str) -> Token {
        let message = format!(
            "Lexer Error: {} at column {} in expression [{}]",
            self.message, self.index, input
        );
        Token::error(self.index, self.end, self.kind, message)
    }
}

impl From<CompilerError> for ScanError {
    fn from(err: CompilerError) -> Self {
        let offset = match err {
            CompilerError::UnexpectedEof { offset } => offset,
            _ => 0,
        };
        ScanError::new(LexErrorKind::UnexpectedCharacter, offset, offset, "Unexpected end of input")
    }
}

type ScanResult = Result<Token, ScanError>;

struct Scanner<'a> {
    input: &'a str,
    cursor: Cursor<'a>,
    keywords: &'a [String],
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str, keywords: &'a [String]) -> Self {
        Scanner {
            input,
            cursor: Cursor::new(input),
            keywords,
        }
    }

    fn scan(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.scan_token() {
            tokens.push(token);
        }
        tokens
    }

    fn peek(&self) -> char {
        self.cursor.peek()
    }

    fn index(&self) -> usize {
        self.cursor.offset()
    }

    fn scan_token(&mut self) -> Option<Token> {
        while !self.cursor.at_eof() && chars::is_whitespace(self.peek()) {
            if self.cursor.advance().is_err() {
                return None;
            }
        }
        if self.cursor.at_eof() {
            return None;
        }

        let start = self.index();
        let ch = self.peek();
        let result = if chars::is_identifier_start(ch) {
            self.scan_identifier()
        } else if chars::is_digit(ch) || (ch == chars::PERIOD && chars::is_digit(self.cursor.peek_at(1))) {
            self.scan_number(start)
        } else {
            match ch {
                chars::PERIOD
                | chars::LPAREN
                | chars::RPAREN
                | chars::LBRACE
                | chars::RBRACE
                | chars::LBRACKET
                | chars::RBRACKET
                | chars::COMMA
                | chars::COLON
                | chars::SEMICOLON => self.scan_character(start, ch),
                chars::SQ | chars::DQ => self.scan_string(),
                chars::HASH => self.scan_private_identifier(),
                chars::PLUS | chars::MINUS | chars::STAR | chars::SLASH | chars::PERCENT | chars::CARET => {
                    self.scan_operator(start, ch)
                }
                chars::QUESTION => self.scan_question(start),
                chars::LT | chars::GT => self.scan_complex_operator(start, ch, chars::EQ, None),
                chars::BANG | chars::EQ => self.scan_complex_operator(start, ch, chars::EQ, Some(chars::EQ)),
                chars::AMPERSAND | chars::BAR => self.scan_doubled_operator(start, ch),
                _ => self.unexpected_character(start, ch),
            }
        };

        Some(result.unwrap_or_else(|err| err.into_token(self.input)))
    }

    fn unexpected_character(&mut self, start: usize, ch: char) -> ScanResult {
        self.cursor.advance()?;
        Err(ScanError::new(
            LexErrorKind::UnexpectedCharacter,
            start,
            self.index(),
            format!("Unexpected character [{}]", ch),
        ))
    }

    fn scan_character(&mut self, start: usize, ch: char) -> ScanResult {
        self.cursor.advance()?;
        Ok(Token::character(start, self.index(), ch))
    }

    fn scan_operator(&mut self, start: usize, ch: char) -> ScanResult {
        self.cursor.advance()?;
        Ok(Token::operator(start, self.index(), &ch.to_string()))
    }

    /// `?`, `??` or `?.`
    fn scan_question(&mut self, start: usize) -> ScanResult {
        self.cursor.advance()?;
        let mut text = String::from(chars::QUESTION);
        if matches!(self.peek(), chars::QUESTION | chars::PERIOD) {
            text.push(self.peek());
            self.cursor.advance()?;
        }
        Ok(Token::operator(start, self.index(), &text))
    }

    /// `first`, optionally followed by `second` and then `third`, e.g. `!`,
    /// `!=` and `!==`.
    fn scan_complex_operator(&mut self, start: usize, first: char, second: char, third: Option<char>) -> ScanResult {
        self.cursor.advance()?;
        let mut text = String::from(first);
        if self.peek() == second {
            self.cursor.advance()?;
            text.push(second);
            if let Some(third) = third {
                if self.peek() == third {
                    self.cursor.advance()?;
                    text.push(third);
                }
            }
        }
        Ok(Token::operator(start, self.index(), &text))
    }

    /// `&&` and `||`. A single `&` or `|` is not an operator.
    fn scan_doubled_operator(&mut self, start: usize, ch: char) -> ScanResult {
        if self.cursor.peek_at(1) != ch {
            return self.unexpected_character(start, ch);
        }
        self.cursor.advance()?;
        self.cursor.advance()?;
        Ok(Token::operator(start, self.index(), &format!("{}{}", ch, ch)))
    }

    fn scan_identifier(&mut self) -> ScanResult {
        let start = self.cursor;
        self.cursor.advance()?;
        while !self.cursor.at_eof() && chars::is_identifier_part(self.peek()) {
            self.cursor.advance()?;
        }
        let text = self.cursor.slice_between(&start);
        let token_type = if self.keywords.iter().any(|keyword| keyword == text) {
            TokenType::Keyword
        } else {
            TokenType::Identifier
        };
        Ok(Token::new(start.offset(), self.index(), token_type, 0.0, text.to_string()))
    }

    fn scan_private_identifier(&mut self) -> ScanResult {
        let start = self.cursor;
        self.cursor.advance()?;
        if !chars::is_identifier_start(self.peek()) {
            return Err(ScanError::new(
                LexErrorKind::UnexpectedCharacter,
                start.offset(),
                self.index(),
                "Invalid character [#]",
            ));
        }
        while !self.cursor.at_eof() && chars::is_identifier_part(self.peek()) {
            self.cursor.advance()?;
        }
        let text = self.cursor.slice_between(&start);
        Ok(Token::new(
            start.offset(),
            self.index(),
            TokenType::PrivateIdentifier,
            0.0,
            text.to_string(),
        ))
    }

    fn scan_number(&mut self, start: usize) -> ScanResult {
        let mut simple = true;
        let mut seen_dot = false;
        let mut seen_exponent = false;

        while !self.cursor.at_eof() {
            let ch = self.peek();
            if chars::is_digit(ch) {
                // plain digit
            } else if ch == chars::UNDERSCORE {
                // A separator must sit between two digits.
                let prev = self.input[..self.index()].chars().next_back().unwrap_or(chars::EOF);
                let next = self.cursor.peek_at(1);
                if !chars::is_digit(prev) || !chars::is_digit(next) {
                    let index = self.index();
                    self.skip_number_run();
                    return Err(ScanError::new(
                        LexErrorKind::InvalidNumericSeparator,
                        index,
                        self.index(),
                        "Invalid numeric separator",
                    ));
                }
            } else if ch == chars::PERIOD && !seen_dot && !seen_exponent {
                seen_dot = true;
                simple = false;
            } else if chars::is_exponent_start(ch) && !seen_exponent {
                self.cursor.advance()?;
                if chars::is_exponent_sign(self.peek()) {
                    self.cursor.advance()?;
                }
                if !chars::is_digit(self.peek()) {
                    return Err(ScanError::new(
                        LexErrorKind::InvalidExponent,
                        self.index(),
                        self.index(),
                        "Invalid exponent",
                    ));
                }
                seen_exponent = true;
                simple = false;
                continue;
            } else {
                break;
            }
            self.cursor.advance()?;
        }

        let end = self.index();
        let text: String = self.input[start..end].chars().filter(|ch| *ch != chars::UNDERSCORE).collect();
        let value = if simple {
            text.parse::<u64>().map(|n| n as f64).or_else(|_| text.parse::<f64>())
        } else {
            text.parse::<f64>()
        };
        match value {
            Ok(value) => Ok(Token::number(start, end, value)),
            Err(_) => Err(ScanError::new(
                LexErrorKind::UnexpectedCharacter,
                start,
                end,
                format!("Invalid number [{}]", text),
            )),
        }
    }

    fn scan_string(&mut self) -> ScanResult {
        let start = self.index();
        let quote = self.peek();
        self.cursor.advance()?;

        let mut buffer = String::new();
        let mut marker = self.cursor;

        loop {
            if self.cursor.at_eof() {
                return Err(self.unterminated_quote(start));
            }
            let ch = self.peek();
            if ch == quote {
                buffer.push_str(self.cursor.slice_between(&marker));
                self.cursor.advance()?;
                break;
            }
            if ch != chars::BACKSLASH {
                self.cursor.advance()?;
                continue;
            }

            buffer.push_str(self.cursor.slice_between(&marker));
            self.cursor.advance()?;
            if self.cursor.at_eof() {
                return Err(self.unterminated_quote(start));
            }
            if self.peek() == 'u' {
                self.cursor.advance()?;
                match self.scan_unicode_escape() {
                    Ok(ch) => buffer.push(ch),
                    Err(err) => return Err(self.skip_past_quote(quote, err)),
                }
            } else {
                buffer.push(unescape(self.peek()));
                self.cursor.advance()?;
            }
            marker = self.cursor;
        }

        Ok(Token::new(start, self.index(), TokenType::String, 0.0, buffer))
    }

    /// The four hex digits after `\u`.
    fn scan_unicode_escape(&mut self) -> Result<char, ScanError> {
        let index = self.index();
        let hex: String = self.input[index..].chars().take(4).collect();
        let decoded = if hex.chars().count() == 4 && hex.chars().all(chars::is_ascii_hex_digit) {
            u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
        } else {
            None
        };
        match decoded {
            Some(ch) => {
                for _ in 0..4 {
                    self.cursor.advance()?;
                }
                Ok(ch)
            }
            None => Err(ScanError::new(
                LexErrorKind::InvalidUnicodeEscape,
                index,
                index,
                format!("Invalid unicode escape [\\u{}]", hex),
            )),
        }
    }

    /// Consume the rest of a malformed number so it is reported once.
    fn skip_number_run(&mut self) {
        while !self.cursor.at_eof() && (chars::is_identifier_part(self.peek()) || self.peek() == chars::PERIOD) {
            if self.cursor.advance().is_err() {
                break;
            }
        }
    }

    /// Consume the rest of a string after a bad escape; the error covers it.
    fn skip_past_quote(&mut self, quote: char, mut err: ScanError) -> ScanError {
        while !self.cursor.at_eof() {
            let ch = self.peek();
            if self.cursor.advance().is_err() {
                break;
            }
            if ch == quote {
                break;
            }
            if ch == chars::BACKSLASH && !self.cursor.at_eof() && self.cursor.advance().is_err() {
                break;
            }
        }
        err.end = self.index();
        err
    }

    fn unterminated_quote(&self, start: usize) -> ScanError {
        ScanError::new(LexErrorKind::UnterminatedQuote, start, self.index(), "Unterminated quote")
    }
}

fn unescape(ch: char) -> char {
    match ch {
        'n' => chars::LF,
        'f' => chars::FF,
        'r' => chars::CR,
        't' => chars::TAB,
        'v' => chars::VTAB,
        'b' => chars::BSPACE,
        '0' => chars::EOF,
        _ => ch,
    }
}
