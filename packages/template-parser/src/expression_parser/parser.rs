/**
 * Expression Parser
 *
 * Recursive descent over the expression lexer's tokens. Parsing never
 * fails: grammar violations are recorded and an `EmptyExpr` stands in for
 * the broken sub-tree.
 */
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::ast::*;
use super::lexer::{Lexer, Token};
use crate::chars;
use crate::error::{ErrorCode, ParseErrorKind};
use crate::ml_parser::defaults::InterpolationConfig;
use crate::parse_util::{ParseError, ParseLocation, ParseSourceSpan};

/// A slice of an interpolated string. For expressions `start..end` spans
/// the markers as well, so the pieces of a split cover the whole input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpolationPiece {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl InterpolationPiece {
    fn new(text: &str, start: usize, end: usize) -> Self {
        InterpolationPiece {
            text: text.to_string(),
            start,
            end,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitInterpolation {
    pub strings: Vec<InterpolationPiece>,
    pub expressions: Vec<InterpolationPiece>,
    /// Offset of each expression's text, just after the start marker.
    pub offsets: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionParseResult {
    pub ast: AST,
    pub errors: Vec<ParseError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateBindingParseResult {
    pub template_bindings: Vec<TemplateBinding>,
    pub errors: Vec<ParseError>,
}

#[derive(Debug, Clone, Default)]
pub struct Parser {
    lexer: Lexer,
}

impl Parser {
    pub fn new() -> Self {
        Parser::default()
    }

    pub fn with_lexer(lexer: Lexer) -> Self {
        Parser { lexer }
    }

    /// Parse a binding expression. `absolute_offset` is where `input`
    /// starts in the enclosing template.
    pub fn parse_expression(&self, input: &str, absolute_offset: usize) -> ExpressionParseResult {
        let tokens = self.lexer.tokenize(input);
        let mut parse_ast = ParseAST::new(input, absolute_offset, tokens);
        let ast = parse_ast.parse_root();
        ExpressionParseResult {
            ast,
            errors: parse_ast.errors,
        }
    }

    /// Parse a text containing interpolations into an `Interpolation` node.
    pub fn parse_interpolation(
        &self,
        input: &str,
        absolute_offset: usize,
        config: &InterpolationConfig,
    ) -> ExpressionParseResult {
        let split = self.split_interpolation(input, config);
        let mut errors = Vec::new();
        let mut expressions = Vec::with_capacity(split.expressions.len());

        for (piece, offset) in split.expressions.iter().zip(&split.offsets) {
            if piece.text.trim().is_empty() {
                let msg = format!(
                    "Parser Error: Blank expressions are not allowed in interpolated strings at column {} in [{}]",
                    piece.start, input
                );
                let location = shifted_location(input, piece.start, absolute_offset);
                trace!(offset = location.offset, "{}", msg);
                errors.push(ParseError::new(
                    ParseSourceSpan::new(location, location),
                    msg,
                    ParseErrorKind::UnexpectedEndOfInput,
                ));
            }
            let result = self.parse_expression(&piece.text, absolute_offset + offset);
            errors.extend(result.errors);
            expressions.push(result.ast);
        }

        let span = ParseSpan::new(0, input.len());
        let ast = AST::Interpolation(Interpolation {
            span,
            source_span: span.to_absolute(absolute_offset),
            strings: split.strings.into_iter().map(|piece| piece.text).collect(),
            expressions,
        });
        ExpressionParseResult { ast, errors }
    }

    /// Split `input` into literal and expression pieces. An interpolation
    /// with no end marker is kept as literal text.
    pub fn split_interpolation(&self, input: &str, config: &InterpolationConfig) -> SplitInterpolation {
        let start_marker = config.start.as_str();
        let end_marker = config.end.as_str();
        let mut strings = Vec::new();
        let mut expressions = Vec::new();
        let mut offsets = Vec::new();

        if start_marker.is_empty() || end_marker.is_empty() {
            strings.push(InterpolationPiece::new(input, 0, input.len()));
            return SplitInterpolation {
                strings,
                expressions,
                offsets,
            };
        }

        let mut i = 0;
        let mut at_interpolation = false;
        let mut extend_last_string = false;
        while i < input.len() {
            if !at_interpolation {
                let start = i;
                i = input[i..].find(start_marker).map_or(input.len(), |idx| i + idx);
                strings.push(InterpolationPiece::new(&input[start..i], start, i));
                at_interpolation = true;
                continue;
            }

            let full_start = i;
            let expr_start = full_start + start_marker.len();
            let Some(expr_end) = interpolation_end_index(input, end_marker, expr_start) else {
                at_interpolation = false;
                extend_last_string = true;
                break;
            };
            let full_end = expr_end + end_marker.len();
            expressions.push(InterpolationPiece::new(&input[expr_start..expr_end], full_start, full_end));
            offsets.push(expr_start);
            i = full_end;
            at_interpolation = false;
        }

        if !at_interpolation {
            match strings.last_mut() {
                Some(last) if extend_last_string => {
                    last.text.push_str(&input[i..]);
                    last.end = input.len();
                }
                _ => strings.push(InterpolationPiece::new(&input[i..], i, input.len())),
            }
        }

        SplitInterpolation {
            strings,
            expressions,
            offsets,
        }
    }

    /// Parse the value of a template directive shorthand such as
    /// `*ngFor="let item of items; index as i"`.
    pub fn parse_template_bindings(
        &self,
        template_key: &str,
        template_value: &str,
        absolute_key_offset: usize,
        absolute_value_offset: usize,
    ) -> TemplateBindingParseResult {
        let tokens = self.lexer.tokenize(template_value);
        let mut parse_ast = ParseAST::new(template_value, absolute_value_offset, tokens);
        let key = TemplateBindingIdentifier {
            source: template_key.to_string(),
            span: AbsoluteSourceSpan::new(absolute_key_offset, absolute_key_offset + template_key.len()),
        };
        let template_bindings = parse_ast.parse_template_bindings(key);
        TemplateBindingParseResult {
            template_bindings,
            errors: parse_ast.errors,
        }
    }
}

/// Index of the end marker, skipping quoted text and `//` comments. A
/// comment runs to the next line break.
fn interpolation_end_index(input: &str, end_marker: &str, start: usize) -> Option<usize> {
    let mut current_quote: Option<char> = None;
    let mut escape_count = 0;
    let mut in_comment = false;

    for (idx, ch) in input[start..].char_indices() {
        let i = start + idx;
        if in_comment {
            in_comment = !chars::is_new_line(ch);
            continue;
        }
        if chars::is_quote(ch) && current_quote.map_or(true, |quote| quote == ch) && escape_count % 2 == 0 {
            current_quote = match current_quote {
                Some(_) => None,
                None => Some(ch),
            };
        } else if current_quote.is_none() {
            if input[i..].starts_with(end_marker) {
                return Some(i);
            }
            if input[i..].starts_with("//") {
                in_comment = true;
            }
        }
        escape_count = if ch == chars::BACKSLASH { escape_count + 1 } else { 0 };
    }
    None
}

fn shifted_location(input: &str, index: usize, absolute_offset: usize) -> ParseLocation {
    let mut location = ParseLocation::from_offset(input, index);
    location.offset = absolute_offset + index;
    location
}

fn capitalize(word: &str) -> String {
    let mut iter = word.chars();
    match iter.next() {
        Some(first) => first.to_uppercase().chain(iter).collect(),
        None => String::new(),
    }
}

/// Per-call parser state.
struct ParseAST<'a> {
    input: &'a str,
    absolute_offset: usize,
    tokens: Vec<Token>,
    index: usize,
    errors: Vec<ParseError>,
}

impl<'a> ParseAST<'a> {
    /// Lexer errors are recorded up front and their tokens dropped.
    fn new(input: &'a str, absolute_offset: usize, tokens: Vec<Token>) -> Self {
        let mut errors = Vec::new();
        let mut kept = Vec::with_capacity(tokens.len());
        for token in tokens {
            match token.error_kind {
                Some(kind) if token.is_error() => {
                    let location = shifted_location(input, token.index, absolute_offset);
                    trace!(code = ?kind, offset = location.offset, "{}", token.str_value);
                    errors.push(ParseError::new(
                        ParseSourceSpan::new(location, location),
                        token.str_value,
                        ErrorCode::Lex(kind),
                    ));
                }
                _ => kept.push(token),
            }
        }
        ParseAST {
            input,
            absolute_offset,
            tokens: kept,
            index: 0,
            errors,
        }
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    /// Offset of the next token, or the input length at the end.
    fn input_index(&self) -> usize {
        self.current().map_or(self.input.len(), |token| token.index)
    }

    fn current_absolute_offset(&self) -> usize {
        self.absolute_offset + self.input_index()
    }

    /// End of the last consumed token.
    fn current_end_index(&self) -> usize {
        match self.index.checked_sub(1).and_then(|idx| self.tokens.get(idx)) {
            Some(token) => token.end,
            None => 0,
        }
    }

    fn span(&self, start: usize) -> ParseSpan {
        ParseSpan::new(start, self.current_end_index().max(start))
    }

    fn source_span(&self, start: usize) -> AbsoluteSourceSpan {
        self.span(start).to_absolute(self.absolute_offset)
    }

    fn empty(&self, start: usize) -> AST {
        AST::empty(self.span(start), self.source_span(start))
    }

    fn error(&mut self, message: &str, kind: ParseErrorKind) {
        let index = self.input_index();
        let location = match self.current() {
            Some(token) => format!("at column {} in", token.index + 1),
            None => "at the end of the expression".to_string(),
        };
        let msg = format!("Parser Error: {} {} [{}]", message, location, self.input);
        let location = shifted_location(self.input, index, self.absolute_offset);
        trace!(code = ?kind, offset = location.offset, "{}", msg);
        self.errors
            .push(ParseError::new(ParseSourceSpan::new(location, location), msg, kind));
    }

    fn consume_optional_character(&mut self, code: char) -> bool {
        if self.current().map_or(false, |token| token.is_character(code)) {
            self.advance();
            return true;
        }
        false
    }

    fn consume_optional_operator(&mut self, operator: &str) -> bool {
        if self.current().map_or(false, |token| token.is_operator(operator)) {
            self.advance();
            return true;
        }
        false
    }

    fn consume_operator_in(&mut self, operators: &[&str]) -> Option<String> {
        let token = self.current()?;
        let operator = operators.iter().find(|op| token.is_operator(op))?.to_string();
        self.advance();
        Some(operator)
    }

    fn expect_character(&mut self, code: char) -> bool {
        if self.consume_optional_character(code) {
            return true;
        }
        self.error(&format!("Missing expected {}", code), ParseErrorKind::UnexpectedToken);
        false
    }

    /// Records exactly one error when no name follows.
    fn expect_identifier_or_keyword(&mut self) -> Option<String> {
        let Some(token) = self.current() else {
            self.error("Expected identifier for property access", ParseErrorKind::UnexpectedEndOfInput);
            return None;
        };
        if token.is_identifier() || token.is_keyword() {
            let name = token.str_value.clone();
            self.advance();
            return Some(name);
        }
        if token.is_private_identifier() {
            let message = format!(
                "Private identifiers are not supported. Unexpected private identifier: {}",
                token
            );
            self.error(&message, ParseErrorKind::UnexpectedToken);
            self.advance();
        } else {
            self.error("Expected identifier for property access", ParseErrorKind::UnexpectedToken);
        }
        None
    }

    fn expect_identifier_or_keyword_or_string(&mut self) -> Option<String> {
        if let Some(token) = self.current() {
            if token.is_identifier() || token.is_keyword() || token.is_string() {
                let value = token.str_value.clone();
                self.advance();
                return Some(value);
            }
        }
        let message = match self.current() {
            Some(token) => format!("Unexpected token {}, expected identifier, keyword, or string", token),
            None => "Unexpected end of input, expected identifier, keyword, or string".to_string(),
        };
        self.error(&message, ParseErrorKind::UnexpectedToken);
        None
    }

    fn parse_root(&mut self) -> AST {
        let ast = self.parse_conditional();
        if let Some(token) = self.current() {
            let message = format!("Unexpected token '{}'", token);
            self.error(&message, ParseErrorKind::UnexpectedToken);
        }
        ast
    }

    fn parse_conditional(&mut self) -> AST {
        let start = self.input_index();
        let result = self.parse_logical_or();

        if !self.consume_optional_operator("?") {
            return result;
        }
        let yes = self.parse_conditional();
        let no = if self.consume_optional_character(':') {
            self.parse_conditional()
        } else {
            let end = self.input_index();
            let expression = self.input.get(start..end).unwrap_or_default().to_string();
            self.error(
                &format!("Conditional expression {} requires all 3 expressions", expression),
                ParseErrorKind::ConditionalMissingBranch,
            );
            self.empty(end)
        };
        AST::Conditional(Conditional {
            span: self.span(start),
            source_span: self.source_span(start),
            condition: Box::new(result),
            true_exp: Box::new(yes),
            false_exp: Box::new(no),
        })
    }

    /// One left-associative binary level.
    fn parse_binary(&mut self, operators: &[&str], operand: fn(&mut Self) -> AST) -> AST {
        let start = self.input_index();
        let mut result = operand(self);
        while let Some(operation) = self.consume_operator_in(operators) {
            let right = operand(self);
            result = AST::Binary(Binary {
                span: self.span(start),
                source_span: self.source_span(start),
                operation,
                left: Box::new(result),
                right: Box::new(right),
            });
        }
        result
    }

    fn parse_logical_or(&mut self) -> AST {
        self.parse_binary(&["||"], Self::parse_logical_and)
    }

    fn parse_logical_and(&mut self) -> AST {
        self.parse_binary(&["&&"], Self::parse_nullish_coalescing)
    }

    fn parse_nullish_coalescing(&mut self) -> AST {
        self.parse_binary(&["??"], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> AST {
        self.parse_binary(&["==", "!=", "===", "!=="], Self::parse_relational)
    }

    fn parse_relational(&mut self) -> AST {
        self.parse_binary(&["<", ">", "<=", ">="], Self::parse_additive)
    }

    fn parse_additive(&mut self) -> AST {
        self.parse_binary(&["+", "-"], Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> AST {
        self.parse_binary(&["*", "%", "/"], Self::parse_prefix)
    }

    fn parse_prefix(&mut self) -> AST {
        let start = self.input_index();
        let Some(operator) = self.consume_operator_in(&["+", "-", "!"]) else {
            return self.parse_call_chain();
        };
        let operand = self.parse_prefix();
        let span = self.span(start);
        let source_span = self.source_span(start);
        if operator == "!" {
            AST::PrefixNot(PrefixNot {
                span,
                source_span,
                expression: Box::new(operand),
            })
        } else {
            AST::Unary(Unary::new(span, source_span, &operator, operand))
        }
    }

    fn parse_call_chain(&mut self) -> AST {
        let start = self.input_index();
        let mut result = self.parse_primary();

        loop {
            if self.consume_optional_character('.') {
                result = self.parse_access_member(result, start, false);
            } else if self.consume_optional_operator("?.") {
                result = if self.consume_optional_character('(') {
                    self.parse_call(result, start, true)
                } else if self.consume_optional_character('[') {
                    self.parse_keyed_read_or_write(result, start, true)
                } else {
                    self.parse_access_member(result, start, true)
                };
            } else if self.consume_optional_character('[') {
                result = self.parse_keyed_read_or_write(result, start, false);
            } else if self.consume_optional_character('(') {
                result = self.parse_call(result, start, false);
            } else {
                return result;
            }
        }
    }

    fn parse_primary(&mut self) -> AST {
        let start = self.input_index();
        let Some(token) = self.current().cloned() else {
            let message = format!("Unexpected end of expression: {}", self.input);
            self.error(&message, ParseErrorKind::UnexpectedEndOfInput);
            return self.empty(start);
        };

        if token.is_character('(') {
            self.advance();
            let result = self.parse_conditional();
            self.expect_character(')');
            return result;
        }
        if token.is_keyword_null() || token.is_keyword_undefined() || token.is_keyword_true() || token.is_keyword_false() {
            self.advance();
            let value = match token.str_value.as_str() {
                "null" => LiteralValue::Null,
                "undefined" => LiteralValue::Undefined,
                word => LiteralValue::Boolean(word == "true"),
            };
            return self.literal(start, value);
        }
        if token.is_keyword_this() {
            self.advance();
            return AST::ThisReceiver(ThisReceiver {
                span: self.span(start),
                source_span: self.source_span(start),
            });
        }
        if token.is_character('[') {
            self.advance();
            let expressions = self.parse_expression_list(']');
            self.expect_character(']');
            return AST::LiteralArray(LiteralArray {
                span: self.span(start),
                source_span: self.source_span(start),
                expressions,
            });
        }
        if token.is_character('{') {
            return self.parse_literal_map();
        }
        if token.is_identifier() {
            let receiver = self.implicit_receiver(start);
            return self.parse_access_member(receiver, start, false);
        }
        if token.is_number() {
            self.advance();
            return self.literal(start, LiteralValue::Number(token.num_value));
        }
        if token.is_string() {
            self.advance();
            return self.literal(start, LiteralValue::String(token.str_value));
        }
        if token.is_private_identifier() {
            let message = format!(
                "Private identifiers are not supported. Unexpected private identifier: {}",
                token
            );
            self.error(&message, ParseErrorKind::UnexpectedToken);
            self.advance();
            return self.empty(start);
        }

        self.error(&format!("Unexpected token {}", token), ParseErrorKind::UnexpectedToken);
        // Closing delimiters and separators are left for the enclosing rule.
        if !matches!(token.str_value.as_str(), ")" | "]" | "}" | "," | ":" | ";") {
            self.advance();
        }
        self.empty(start)
    }

    fn literal(&self, start: usize, value: LiteralValue) -> AST {
        AST::LiteralPrimitive(LiteralPrimitive::new(self.span(start), self.source_span(start), value))
    }

    fn implicit_receiver(&self, start: usize) -> AST {
        let span = ParseSpan::new(start, start);
        AST::ImplicitReceiver(ImplicitReceiver {
            span,
            source_span: span.to_absolute(self.absolute_offset),
        })
    }

    fn parse_expression_list(&mut self, terminator: char) -> Vec<AST> {
        let mut result = Vec::new();
        if self.current().map_or(false, |token| token.is_character(terminator)) {
            return result;
        }
        loop {
            result.push(self.parse_conditional());
            if !self.consume_optional_character(',') {
                return result;
            }
        }
    }

    fn parse_literal_map(&mut self) -> AST {
        let start = self.input_index();
        let mut keys = Vec::new();
        let mut values = Vec::new();
        self.expect_character('{');

        if !self.consume_optional_character('}') {
            loop {
                let key_start = self.input_index();
                let quoted = self.current().map_or(false, Token::is_string);
                let key = self.expect_identifier_or_keyword_or_string().unwrap_or_default();
                if quoted {
                    self.expect_character(':');
                    values.push(self.parse_conditional());
                } else if self.consume_optional_character(':') {
                    values.push(self.parse_conditional());
                } else {
                    // `{a}` is shorthand for `{a: a}`.
                    let span = self.span(key_start);
                    let source_span = self.source_span(key_start);
                    values.push(AST::PropertyRead(PropertyRead {
                        span,
                        source_span,
                        name_span: source_span,
                        receiver: Box::new(self.implicit_receiver(key_start)),
                        name: key.clone(),
                    }));
                }
                keys.push(LiteralMapKey { key, quoted });

                if !self.consume_optional_character(',') || self.current().map_or(false, |t| t.is_character('}')) {
                    break;
                }
            }
            self.expect_character('}');
        }

        AST::LiteralMap(LiteralMap {
            span: self.span(start),
            source_span: self.source_span(start),
            keys,
            values,
        })
    }

    fn parse_access_member(&mut self, receiver: AST, start: usize, is_safe: bool) -> AST {
        let name_start = self.input_index();
        let name = self.expect_identifier_or_keyword().unwrap_or_default();
        let name_span = self.source_span(name_start);

        if self.consume_optional_operator("=") {
            if is_safe {
                self.unsafe_assignment();
                self.parse_conditional();
                return self.empty(start);
            }
            let value = self.parse_conditional();
            return AST::PropertyWrite(PropertyWrite {
                span: self.span(start),
                source_span: self.source_span(start),
                name_span,
                receiver: Box::new(receiver),
                name,
                value: Box::new(value),
            });
        }

        let (span, source_span) = (self.span(start), self.source_span(start));
        if is_safe {
            AST::SafePropertyRead(SafePropertyRead {
                span,
                source_span,
                name_span,
                receiver: Box::new(receiver),
                name,
            })
        } else {
            AST::PropertyRead(PropertyRead {
                span,
                source_span,
                name_span,
                receiver: Box::new(receiver),
                name,
            })
        }
    }

    /// Called with the `[` already consumed.
    fn parse_keyed_read_or_write(&mut self, receiver: AST, start: usize, is_safe: bool) -> AST {
        let key = if self.current().map_or(false, |token| token.is_character(']')) {
            self.error("Key access cannot be empty", ParseErrorKind::UnexpectedToken);
            self.empty(self.input_index())
        } else {
            self.parse_conditional()
        };
        self.expect_character(']');

        if self.consume_optional_operator("=") {
            if is_safe {
                self.unsafe_assignment();
                self.parse_conditional();
                return self.empty(start);
            }
            let value = self.parse_conditional();
            return AST::KeyedWrite(KeyedWrite {
                span: self.span(start),
                source_span: self.source_span(start),
                receiver: Box::new(receiver),
                key: Box::new(key),
                value: Box::new(value),
            });
        }

        let (span, source_span) = (self.span(start), self.source_span(start));
        if is_safe {
            AST::SafeKeyedRead(SafeKeyedRead {
                span,
                source_span,
                receiver: Box::new(receiver),
                key: Box::new(key),
            })
        } else {
            AST::KeyedRead(KeyedRead {
                span,
                source_span,
                receiver: Box::new(receiver),
                key: Box::new(key),
            })
        }
    }

    fn unsafe_assignment(&mut self) {
        self.error(
            "The '?.' operator cannot be used in the assignment",
            ParseErrorKind::UnsafeAssignmentThroughOptionalChain,
        );
    }

    /// Called with the `(` already consumed.
    fn parse_call(&mut self, receiver: AST, start: usize, is_safe: bool) -> AST {
        let argument_start = self.input_index();
        let args = self.parse_expression_list(')');
        let argument_span = self.source_span(argument_start);
        self.expect_character(')');

        let (span, source_span) = (self.span(start), self.source_span(start));
        let receiver = Box::new(receiver);
        if is_safe {
            AST::SafeCall(SafeCall {
                span,
                source_span,
                receiver,
                args,
                argument_span,
            })
        } else {
            AST::Call(Call {
                span,
                source_span,
                receiver,
                args,
                argument_span,
            })
        }
    }

    fn parse_template_bindings(&mut self, template_key: TemplateBindingIdentifier) -> Vec<TemplateBinding> {
        // The first binding is for the directive key itself.
        let mut bindings = self.parse_directive_keyword_bindings(template_key.clone());

        while self.index < self.tokens.len() {
            let before = self.index;
            if let Some(binding) = self.parse_let_binding() {
                bindings.push(binding);
            } else {
                let mut key = self.expect_template_binding_key();
                if let Some(binding) = self.parse_as_binding(&key) {
                    bindings.push(binding);
                } else {
                    key.source = format!("{}{}", template_key.source, capitalize(&key.source));
                    bindings.extend(self.parse_directive_keyword_bindings(key));
                }
            }
            self.consume_statement_terminator();

            if self.index == before {
                if let Some(token) = self.current() {
                    let message = format!("Unexpected token '{}'", token);
                    self.error(&message, ParseErrorKind::UnexpectedToken);
                }
                self.advance();
            }
        }
        bindings
    }

    /// `key[:] [expr] [as alias]`
    fn parse_directive_keyword_bindings(&mut self, key: TemplateBindingIdentifier) -> Vec<TemplateBinding> {
        self.consume_optional_character(':');
        let value = self.directive_bound_target();
        let mut span_end = self.current_absolute_offset();
        let as_binding = self.parse_as_binding(&key);
        if as_binding.is_none() {
            self.consume_statement_terminator();
            span_end = self.current_absolute_offset();
        }

        let mut bindings = vec![TemplateBinding::Expression(ExpressionBinding {
            source_span: AbsoluteSourceSpan::new(key.span.start, span_end),
            key,
            value,
        })];
        bindings.extend(as_binding);
        bindings
    }

    fn directive_bound_target(&mut self) -> Option<ASTWithSource> {
        let token = self.current()?;
        if token.is_word("as") || token.is_word("let") {
            return None;
        }
        let ast = self.parse_conditional();
        let span = ast.span();
        Some(ASTWithSource {
            source: self.input.get(span.start..span.end).unwrap_or_default().to_string(),
            absolute_offset: self.absolute_offset + span.start,
            ast,
        })
    }

    /// `value as key`
    fn parse_as_binding(&mut self, value: &TemplateBindingIdentifier) -> Option<TemplateBinding> {
        if !self.current().map_or(false, |token| token.is_word("as")) {
            return None;
        }
        self.advance();
        let key = self.expect_template_binding_key();
        self.consume_statement_terminator();
        Some(TemplateBinding::Variable(VariableBinding {
            source_span: AbsoluteSourceSpan::new(value.span.start, self.current_absolute_offset()),
            key,
            value: Some(value.clone()),
        }))
    }

    /// `let key [= value]`
    fn parse_let_binding(&mut self) -> Option<TemplateBinding> {
        if !self.current().map_or(false, |token| token.is_word("let")) {
            return None;
        }
        let span_start = self.current_absolute_offset();
        self.advance();
        let key = self.expect_template_binding_key();
        let value = if self.consume_optional_operator("=") {
            Some(self.expect_template_binding_key())
        } else {
            None
        };
        self.consume_statement_terminator();
        Some(TemplateBinding::Variable(VariableBinding {
            source_span: AbsoluteSourceSpan::new(span_start, self.current_absolute_offset()),
            key,
            value,
        }))
    }

    /// A key made of words joined by `-`, such as `ng-for-of`.
    fn expect_template_binding_key(&mut self) -> TemplateBindingIdentifier {
        let start = self.current_absolute_offset();
        let mut source = String::new();
        loop {
            if let Some(word) = self.expect_identifier_or_keyword_or_string() {
                source.push_str(&word);
            }
            if !self.consume_optional_operator("-") {
                break;
            }
            source.push('-');
        }
        TemplateBindingIdentifier {
            span: AbsoluteSourceSpan::new(start, start + source.len()),
            source,
        }
    }

    fn consume_statement_terminator(&mut self) {
        if !self.consume_optional_character(';') {
            self.consume_optional_character(',');
        }
    }
}
