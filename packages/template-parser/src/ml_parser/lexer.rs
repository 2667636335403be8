//! ML Parser Lexer
//!
//! Converts markup source into a flat token stream. Interpolations are
//! split out of text and attribute values as they are scanned.
//!
//! Structural problems inside a construct (a missing terminator, a bad
//! character where a name was required) abort that construct with a
//! [`ParseError`]. The dispatch loop records it and resumes scanning from
//! where the cursor stopped.

use serde::Serialize;
use tracing::{debug, trace};

use super::defaults::InterpolationConfig;
use super::tags::TagDefinitionProvider;
use super::tokens::{Token, TokenType};
use crate::chars;
use crate::cursor::Cursor;
use crate::error::LexErrorKind;
use crate::parse_util::{ParseError, ParseSourceFile};

#[derive(Debug, Clone, Serialize)]
pub struct TokenizeResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<ParseError>,
    pub file: ParseSourceFile,
}

#[derive(Debug, Clone, Default)]
pub struct TokenizeOptions {
    pub interpolation_config: InterpolationConfig,
    pub preserve_line_endings: bool,
}

pub fn tokenize(
    source: &str,
    url: &str,
    tag_definitions: &dyn TagDefinitionProvider,
    options: &TokenizeOptions,
) -> TokenizeResult {
    let mut tokenizer = Tokenizer::new(source, tag_definitions, options);
    tokenizer.tokenize();

    let result = TokenizeResult {
        tokens: merge_text_tokens(tokenizer.tokens),
        errors: tokenizer.errors,
        file: ParseSourceFile::new(source.to_string(), url.to_string()),
    };
    debug!(
        url,
        tokens = result.tokens.len(),
        errors = result.errors.len(),
        "tokenized markup"
    );
    result
}

type LexResult<T> = std::result::Result<T, ParseError>;

/// Where a run of text or an attribute value stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextEnd {
    Tag,
    Quote(char),
    Unquoted,
}

#[derive(Debug, Clone, Copy)]
struct PendingToken<'a> {
    token_type: TokenType,
    start: Cursor<'a>,
}

struct Tokenizer<'a> {
    cursor: Cursor<'a>,
    tag_definitions: &'a dyn TagDefinitionProvider,
    interpolation: &'a InterpolationConfig,
    preserve_line_endings: bool,
    tokens: Vec<Token>,
    errors: Vec<ParseError>,
}

impl<'a> Tokenizer<'a> {
    fn new(
        source: &'a str,
        tag_definitions: &'a dyn TagDefinitionProvider,
        options: &'a TokenizeOptions,
    ) -> Self {
        Tokenizer {
            cursor: Cursor::new(source),
            tag_definitions,
            interpolation: &options.interpolation_config,
            preserve_line_endings: options.preserve_line_endings,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn process_carriage_returns(&self, content: &str) -> String {
        if self.preserve_line_endings {
            return content.to_string();
        }
        let mut result = String::with_capacity(content.len());
        let mut iter = content.chars().peekable();
        while let Some(c) = iter.next() {
            if c == chars::CR {
                if iter.peek() == Some(&chars::LF) {
                    iter.next();
                }
                result.push(chars::LF);
            } else {
                result.push(c);
            }
        }
        result
    }

    fn tokenize(&mut self) {
        while !self.cursor.at_eof() {
            let start = self.cursor;
            let result = if self.is_tag_start() {
                self.consume_markup(start)
            } else {
                self.consume_with_interpolation(TokenType::Text, TokenType::Interpolation, TextEnd::Tag)
            };
            if let Err(error) = result {
                self.handle_error(error);
            }
        }

        let eof = self.begin_token(TokenType::Eof);
        self.end_token(eof, vec![]);
    }

    fn consume_markup(&mut self, start: Cursor<'a>) -> LexResult<()> {
        self.require_char(chars::LT)?;
        if self.attempt_char(chars::BANG) {
            if self.attempt_char(chars::LBRACKET) {
                self.consume_cdata(start)
            } else if self.attempt_char(chars::MINUS) {
                self.consume_comment(start)
            } else {
                self.consume_doc_type(start)
            }
        } else if self.attempt_char(chars::SLASH) {
            self.consume_tag_close(start)
        } else {
            self.consume_tag_open(start)
        }
    }

    fn handle_error(&mut self, error: ParseError) {
        trace!(code = ?error.code, offset = error.span.start.offset, "{}", error.msg);
        self.errors.push(error);
    }

    fn begin_token(&self, token_type: TokenType) -> PendingToken<'a> {
        self.begin_token_at(token_type, self.cursor)
    }

    fn begin_token_at(&self, token_type: TokenType, start: Cursor<'a>) -> PendingToken<'a> {
        PendingToken { token_type, start }
    }

    fn end_token(&mut self, pending: PendingToken<'a>, parts: Vec<String>) -> usize {
        let end = self.cursor;
        self.end_token_at(pending, parts, end)
    }

    fn end_token_at(&mut self, pending: PendingToken<'a>, parts: Vec<String>, end: Cursor<'a>) -> usize {
        let span = end.span_from(&pending.start);
        self.tokens.push(Token::new(pending.token_type, parts, span));
        self.tokens.len() - 1
    }

    fn create_error(&self, msg: String, kind: LexErrorKind, start: &Cursor<'a>) -> ParseError {
        ParseError::new(self.cursor.span_from(start), msg, kind)
    }

    fn unexpected_character_error(&self) -> ParseError {
        let msg = if self.cursor.at_eof() {
            "Unexpected character \"EOF\"".to_string()
        } else {
            format!("Unexpected character \"{}\"", self.cursor.peek())
        };
        self.create_error(msg, LexErrorKind::UnexpectedCharacter, &self.cursor)
    }

    fn advance(&mut self) -> LexResult<()> {
        if self.cursor.advance().is_err() {
            return Err(self.unexpected_character_error());
        }
        Ok(())
    }

    fn attempt_char(&mut self, ch: char) -> bool {
        if self.cursor.peek() == ch && !self.cursor.at_eof() {
            return self.cursor.advance().is_ok();
        }
        false
    }

    fn require_char(&mut self, ch: char) -> LexResult<()> {
        if !self.attempt_char(ch) {
            return Err(self.unexpected_character_error());
        }
        Ok(())
    }

    /// Consume `expected` if the input continues with them, otherwise restore
    /// the cursor and report no match.
    fn attempt_str(&mut self, expected: &str) -> bool {
        let initial = self.cursor;
        for ch in expected.chars() {
            if !self.attempt_char(ch) {
                self.cursor = initial;
                return false;
            }
        }
        true
    }

    fn require_str(&mut self, expected: &str, kind: LexErrorKind) -> LexResult<()> {
        if self.attempt_str(expected) {
            return Ok(());
        }
        let msg = match kind {
            LexErrorKind::UnterminatedComment => format!("Unterminated comment, expected \"{}\"", expected),
            LexErrorKind::UnterminatedCData => format!("Unterminated CDATA section, expected \"{}\"", expected),
            _ => return Err(self.unexpected_character_error()),
        };
        Err(self.create_error(msg, kind, &self.cursor))
    }

    fn attempt_chars_while(&mut self, predicate: impl Fn(char) -> bool) {
        while !self.cursor.at_eof() && predicate(self.cursor.peek()) {
            if self.cursor.advance().is_err() {
                break;
            }
        }
    }

    fn skip_whitespace(&mut self) {
        self.attempt_chars_while(chars::is_whitespace);
    }

    /// `<` followed by a letter, `/` or `!`.
    fn is_tag_start(&self) -> bool {
        if self.cursor.peek() != chars::LT || self.cursor.at_eof() {
            return false;
        }
        let next = self.cursor.peek_at(1);
        chars::is_ascii_letter(next) || next == chars::SLASH || next == chars::BANG
    }

    fn processed_slice(&self, start: &Cursor<'a>, end: &Cursor<'a>) -> String {
        self.process_carriage_returns(end.slice_between(start))
    }

    fn consume_cdata(&mut self, start: Cursor<'a>) -> LexResult<()> {
        let cdata_start = self.begin_token_at(TokenType::CdataStart, start);
        self.require_str("CDATA[", LexErrorKind::UnexpectedCharacter)?;
        self.end_token(cdata_start, vec![]);

        self.consume_raw_text("]]>");

        let cdata_end = self.begin_token(TokenType::CdataEnd);
        self.require_str("]]>", LexErrorKind::UnterminatedCData)?;
        self.end_token(cdata_end, vec![]);
        Ok(())
    }

    fn consume_comment(&mut self, start: Cursor<'a>) -> LexResult<()> {
        let comment_start = self.begin_token_at(TokenType::CommentStart, start);
        self.require_char(chars::MINUS)?;
        self.end_token(comment_start, vec![]);

        self.consume_raw_text("-->");

        let comment_end = self.begin_token(TokenType::CommentEnd);
        self.require_str("-->", LexErrorKind::UnterminatedComment)?;
        self.end_token(comment_end, vec![]);
        Ok(())
    }

    /// Emit everything up to `end_marker` (or EOF) as a single RawText token.
    /// The marker itself is left for the caller.
    fn consume_raw_text(&mut self, end_marker: &str) {
        let raw_text = self.begin_token(TokenType::RawText);
        while !self.cursor.at_eof() {
            let lookahead = self.cursor;
            if self.attempt_str(end_marker) {
                self.cursor = lookahead;
                break;
            }
            if self.cursor.advance().is_err() {
                break;
            }
        }
        let content = self.processed_slice(&raw_text.start, &self.cursor);
        self.end_token(raw_text, vec![content]);
    }

    fn consume_doc_type(&mut self, start: Cursor<'a>) -> LexResult<()> {
        let doc_type = self.begin_token_at(TokenType::DocType, start);
        let content_start = self.cursor;
        self.attempt_chars_while(|ch| ch != chars::GT);
        if self.cursor.at_eof() {
            return Err(self.create_error(
                "Unterminated doctype, expected \">\"".to_string(),
                LexErrorKind::UnterminatedDocType,
                &start,
            ));
        }
        let content = self.cursor.slice_between(&content_start).to_string();
        self.advance()?;
        self.end_token(doc_type, vec![content]);
        Ok(())
    }

    fn consume_name(&mut self) -> LexResult<String> {
        let name_start = self.cursor;
        self.attempt_chars_while(|ch| !chars::is_name_end(ch));
        if self.cursor.offset() == name_start.offset() {
            return Err(self.unexpected_character_error());
        }
        Ok(self.cursor.slice_between(&name_start).to_string())
    }

    fn consume_tag_open(&mut self, start: Cursor<'a>) -> LexResult<()> {
        let tag_open_start = self.begin_token_at(TokenType::TagOpenStart, start);
        let name = self.consume_name()?;
        let open_index = self.end_token(tag_open_start, vec![name.clone()]);

        if let Err(error) = self.consume_attributes() {
            self.tokens[open_index].token_type = TokenType::IncompleteTagOpen;
            return Err(error);
        }
        // The tree builder reports unterminated tags.
        if !self.consume_tag_open_end() {
            self.tokens[open_index].token_type = TokenType::IncompleteTagOpen;
            return Ok(());
        }

        let is_void_end = self
            .tokens
            .last()
            .map_or(false, |token| token.token_type == TokenType::TagOpenEndVoid);
        if !is_void_end && self.tag_definitions.tag_definition(&name).content_type.is_raw() {
            self.consume_raw_text_with_tag_close(&name)?;
        }
        Ok(())
    }

    fn consume_attributes(&mut self) -> LexResult<()> {
        self.skip_whitespace();
        while !self.cursor.at_eof()
            && !matches!(self.cursor.peek(), chars::SLASH | chars::GT | chars::LT)
        {
            self.consume_attribute_name()?;
            self.skip_whitespace();
            if self.attempt_char(chars::EQ) {
                self.skip_whitespace();
                self.consume_attribute_value()?;
            }
            self.skip_whitespace();
        }
        Ok(())
    }

    fn consume_attribute_name(&mut self) -> LexResult<()> {
        let peek = self.cursor.peek();
        if peek == chars::SQ || peek == chars::DQ || peek == chars::EQ {
            return Err(self.unexpected_character_error());
        }
        let attr_name = self.begin_token(TokenType::AttrName);
        let name = self.consume_name()?;
        self.end_token(attr_name, vec![name]);
        Ok(())
    }

    fn consume_attribute_value(&mut self) -> LexResult<()> {
        let peek = self.cursor.peek();
        if peek == chars::SQ || peek == chars::DQ {
            let quote = peek;
            self.consume_quote(quote)?;
            self.consume_with_interpolation(
                TokenType::AttrValueText,
                TokenType::AttrValueInterpolation,
                TextEnd::Quote(quote),
            )?;
            if self.cursor.at_eof() {
                return Err(self.create_error(
                    format!("Unterminated quote, expected \"{}\"", quote),
                    LexErrorKind::UnterminatedQuote,
                    &self.cursor,
                ));
            }
            self.consume_quote(quote)
        } else {
            self.consume_with_interpolation(
                TokenType::AttrValueText,
                TokenType::AttrValueInterpolation,
                TextEnd::Unquoted,
            )
        }
    }

    fn consume_quote(&mut self, quote: char) -> LexResult<()> {
        let attr_quote = self.begin_token(TokenType::AttrQuote);
        self.require_char(quote)?;
        self.end_token(attr_quote, vec![quote.to_string()]);
        Ok(())
    }

    /// Returns false when the tag is not terminated by `>` or `/>`.
    fn consume_tag_open_end(&mut self) -> bool {
        let start = self.cursor;
        let token_type = if self.attempt_char(chars::SLASH) {
            TokenType::TagOpenEndVoid
        } else {
            TokenType::TagOpenEnd
        };
        let tag_open_end = self.begin_token_at(token_type, start);
        if !self.attempt_char(chars::GT) {
            return false;
        }
        self.end_token(tag_open_end, vec![]);
        true
    }

    fn consume_tag_close(&mut self, start: Cursor<'a>) -> LexResult<()> {
        let tag_close = self.begin_token_at(TokenType::TagClose, start);
        self.skip_whitespace();
        let name = self.consume_name()?;
        self.skip_whitespace();
        self.require_char(chars::GT)?;
        self.end_token(tag_close, vec![name]);
        Ok(())
    }

    fn consume_raw_text_with_tag_close(&mut self, tag_name: &str) -> LexResult<()> {
        let raw_text = self.begin_token(TokenType::RawText);
        let mut closing_end = None;
        while !self.cursor.at_eof() {
            closing_end = self.closing_tag_end(tag_name);
            if closing_end.is_some() {
                break;
            }
            self.advance()?;
        }
        let content = self.processed_slice(&raw_text.start, &self.cursor);
        self.end_token(raw_text, vec![content]);

        if let Some(end) = closing_end {
            let tag_close = self.begin_token(TokenType::TagClose);
            self.cursor = end;
            self.end_token(tag_close, vec![tag_name.to_string()]);
        }
        Ok(())
    }

    /// If the input continues with `</tag_name>` (case-insensitive, optional
    /// whitespace around the name), return the cursor just past the `>`.
    fn closing_tag_end(&self, tag_name: &str) -> Option<Cursor<'a>> {
        let mut lookahead = self.cursor;
        if !lookahead.starts_with("</") {
            return None;
        }
        lookahead.advance().ok()?;
        lookahead.advance().ok()?;
        skip_whitespace_on(&mut lookahead);

        let rest = &lookahead.input()[lookahead.offset()..];
        let candidate = rest.get(..tag_name.len())?;
        if !candidate.eq_ignore_ascii_case(tag_name) {
            return None;
        }
        for _ in tag_name.chars() {
            lookahead.advance().ok()?;
        }
        skip_whitespace_on(&mut lookahead);
        if lookahead.peek() != chars::GT || lookahead.at_eof() {
            return None;
        }
        lookahead.advance().ok()?;
        Some(lookahead)
    }

    fn is_text_end(&self, end: TextEnd) -> bool {
        if self.cursor.at_eof() {
            return true;
        }
        match end {
            TextEnd::Tag => self.is_tag_start(),
            TextEnd::Quote(quote) => self.cursor.peek() == quote,
            TextEnd::Unquoted => chars::is_name_end(self.cursor.peek()),
        }
    }

    /// Ends an interpolation body early, before its end marker.
    fn is_premature_end(&self, end: TextEnd) -> bool {
        match end {
            TextEnd::Tag => false,
            TextEnd::Quote(quote) => self.cursor.peek() == quote,
            TextEnd::Unquoted => chars::is_name_end(self.cursor.peek()),
        }
    }

    fn consume_with_interpolation(
        &mut self,
        text_type: TokenType,
        interpolation_type: TokenType,
        end: TextEnd,
    ) -> LexResult<()> {
        let interpolation = self.interpolation;
        let mut text = self.begin_token(text_type);

        while !self.is_text_end(end) {
            let current = self.cursor;
            if self.attempt_str(&interpolation.start) {
                let content = self.processed_slice(&text.start, &current);
                self.end_token_at(text, vec![content], current);
                self.consume_interpolation(interpolation_type, current, end)?;
                text = self.begin_token(text_type);
            } else {
                self.advance()?;
            }
        }

        let content = self.processed_slice(&text.start, &self.cursor);
        self.end_token(text, vec![content]);
        Ok(())
    }

    /// Scan an interpolation body, the start marker having been consumed.
    ///
    /// Quotes are tracked so that an end marker inside a string literal does
    /// not close the interpolation. After `//` quotes are no longer tracked.
    /// A tag start ends the interpolation without an end marker.
    fn consume_interpolation(
        &mut self,
        interpolation_type: TokenType,
        interpolation_start: Cursor<'a>,
        end: TextEnd,
    ) -> LexResult<()> {
        let interpolation = self.interpolation;
        let token = self.begin_token_at(interpolation_type, interpolation_start);
        let mut parts = vec![interpolation.start.clone()];

        let expression_start = self.cursor;
        let mut in_quote: Option<char> = None;
        let mut in_comment = false;

        while !self.cursor.at_eof() && !self.is_premature_end(end) {
            let current = self.cursor;

            if self.is_tag_start() {
                parts.push(self.processed_slice(&expression_start, &current));
                self.end_token(token, parts);
                return Ok(());
            }

            if in_comment {
                // Runs to the next line break; markers and quotes are inert.
                let ch = self.cursor.peek();
                self.advance()?;
                in_comment = !chars::is_new_line(ch);
                continue;
            }

            if in_quote.is_none() {
                if self.attempt_str(&interpolation.end) {
                    parts.push(self.processed_slice(&expression_start, &current));
                    parts.push(interpolation.end.clone());
                    self.end_token(token, parts);
                    return Ok(());
                } else if self.attempt_str("//") {
                    in_comment = true;
                    continue;
                }
            }

            let ch = self.cursor.peek();
            self.advance()?;
            if ch == chars::BACKSLASH {
                // Skip the escaped character.
                if !self.cursor.at_eof() {
                    self.advance()?;
                }
            } else if Some(ch) == in_quote {
                in_quote = None;
            } else if in_quote.is_none() && chars::is_quote(ch) {
                in_quote = Some(ch);
            }
        }

        parts.push(self.processed_slice(&expression_start, &self.cursor));
        self.end_token(token, parts);
        Ok(())
    }
}

fn skip_whitespace_on(cursor: &mut Cursor<'_>) {
    while !cursor.at_eof() && chars::is_whitespace(cursor.peek()) {
        if cursor.advance().is_err() {
            break;
        }
    }
}

/// Join adjacent text tokens and drop empty ones.
fn merge_text_tokens(src_tokens: Vec<Token>) -> Vec<Token> {
    let mut dst_tokens: Vec<Token> = Vec::with_capacity(src_tokens.len());
    for token in src_tokens {
        if token.token_type == TokenType::Text && token.parts.iter().all(String::is_empty) {
            continue;
        }
        match dst_tokens.last_mut() {
            Some(last) if last.token_type == TokenType::Text && token.token_type == TokenType::Text => {
                if let Some(first) = last.parts.first_mut() {
                    first.push_str(&token.value());
                }
                last.source_span.end = token.source_span.end;
            }
            _ => dst_tokens.push(token),
        }
    }
    dst_tokens
}
