//! ML Parser
//!
//! Builds the markup tree from the lexer's token stream. Open elements live
//! on an explicit stack; a close tag pops up to the nearest element with the
//! same name, closing everything above it.

use rayon::prelude::*;
use serde::Serialize;
use smallvec::SmallVec;
use std::iter::Peekable;
use std::vec;
use tracing::{debug, trace};

use super::ast::{Attribute, Comment, Element, Node, Text};
use super::lexer::{tokenize, TokenizeOptions};
use super::tags::TagDefinitionProvider;
use super::tokens::{Token, TokenType};
use crate::error::ParseErrorKind;
use crate::parse_util::{ParseError, ParseSourceFile, ParseSourceSpan};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseTreeResult {
    pub root_nodes: Vec<Node>,
    pub errors: Vec<ParseError>,
    pub file: ParseSourceFile,
}

pub struct Parser<'t> {
    tag_definitions: &'t dyn TagDefinitionProvider,
}

impl<'t> Parser<'t> {
    pub fn new(tag_definitions: &'t dyn TagDefinitionProvider) -> Self {
        Parser { tag_definitions }
    }

    pub fn parse(&self, source: &str, url: &str, options: &TokenizeOptions) -> ParseTreeResult {
        let tokenize_result = tokenize(source, url, self.tag_definitions, options);

        let mut tree_builder = TreeBuilder::new(tokenize_result.tokens, self.tag_definitions);
        tree_builder.build();

        let mut errors = tokenize_result.errors;
        errors.extend(tree_builder.errors);
        debug!(
            url,
            roots = tree_builder.root_nodes.len(),
            errors = errors.len(),
            "parsed markup"
        );

        ParseTreeResult {
            root_nodes: tree_builder.root_nodes,
            errors,
            file: tokenize_result.file,
        }
    }

    /// Parse independent templates in parallel. Results keep input order.
    pub fn parse_all(&self, files: &[ParseSourceFile], options: &TokenizeOptions) -> Vec<ParseTreeResult> {
        files
            .par_iter()
            .map(|file| self.parse(&file.content, &file.url, options))
            .collect()
    }
}

struct TreeBuilder<'t> {
    tokens: Peekable<vec::IntoIter<Token>>,
    tag_definitions: &'t dyn TagDefinitionProvider,
    element_stack: SmallVec<[Element; 8]>,
    root_nodes: Vec<Node>,
    errors: Vec<ParseError>,
}

impl<'t> TreeBuilder<'t> {
    fn new(tokens: Vec<Token>, tag_definitions: &'t dyn TagDefinitionProvider) -> Self {
        TreeBuilder {
            tokens: tokens.into_iter().peekable(),
            tag_definitions,
            element_stack: SmallVec::new(),
            root_nodes: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn build(&mut self) {
        while let Some(token) = self.tokens.next() {
            match token.token_type {
                TokenType::TagOpenStart | TokenType::IncompleteTagOpen => self.consume_start_tag(token),
                TokenType::TagClose => self.consume_end_tag(token),
                TokenType::CdataStart => self.consume_cdata(token),
                TokenType::CommentStart => self.consume_comment(token),
                TokenType::Text | TokenType::RawText | TokenType::Interpolation => self.consume_text(token),
                TokenType::Eof => break,
                // Doctypes are not part of the tree.
                _ => {}
            }
        }

        // Elements still open at the end of input keep `end_source_span == None`.
        while !self.element_stack.is_empty() {
            self.pop_element();
        }
    }

    fn advance_if(&mut self, token_type: TokenType) -> Option<Token> {
        self.tokens.next_if(|token| token.token_type == token_type)
    }

    fn report(&mut self, span: ParseSourceSpan, msg: String, kind: ParseErrorKind) {
        trace!(code = ?kind, offset = span.start.offset, "{}", msg);
        self.errors.push(ParseError::new(span, msg, kind));
    }

    fn consume_cdata(&mut self, start_token: Token) {
        let text = self.advance_if(TokenType::RawText);
        let end = self.advance_if(TokenType::CdataEnd);
        let Some(text) = text else {
            return;
        };
        let value = text.value();
        if value.is_empty() {
            return;
        }
        let end_location = end.map_or(text.source_span.end, |token| token.source_span.end);
        let source_span = ParseSourceSpan::new(start_token.source_span.start, end_location);
        self.add_to_parent(Node::Text(Text {
            value,
            source_span,
            tokens: vec![text],
        }));
    }

    fn consume_comment(&mut self, start_token: Token) {
        let text = self.advance_if(TokenType::RawText);
        let end = self.advance_if(TokenType::CommentEnd);
        let value = text.as_ref().map(|token| token.value().trim().to_string());
        let end_location = end
            .map(|token| token.source_span.end)
            .or_else(|| text.map(|token| token.source_span.end))
            .unwrap_or(start_token.source_span.end);
        self.add_to_parent(Node::Comment(Comment {
            value,
            source_span: ParseSourceSpan::new(start_token.source_span.start, end_location),
        }));
    }

    fn consume_text(&mut self, first_token: Token) {
        let start = first_token.source_span.start;
        let mut end = first_token.source_span.end;
        let mut value = first_token.value();
        let mut tokens = vec![first_token];

        while let Some(token) = self
            .tokens
            .next_if(|token| matches!(token.token_type, TokenType::Text | TokenType::Interpolation))
        {
            value.push_str(&token.value());
            end = token.source_span.end;
            tokens.push(token);
        }

        if !value.is_empty() {
            self.add_to_parent(Node::Text(Text {
                value,
                source_span: ParseSourceSpan::new(start, end),
                tokens,
            }));
        }
    }

    fn consume_start_tag(&mut self, start_tag: Token) {
        let name = first_part(&start_tag);
        let mut attrs = Vec::new();
        while let Some(attr_name) = self.advance_if(TokenType::AttrName) {
            attrs.push(self.consume_attr(attr_name));
        }

        let definition = self.tag_definitions.tag_definition(&name);
        let mut end = attrs
            .last()
            .map_or(start_tag.source_span.end, |attr: &Attribute| attr.source_span.end);
        let mut self_closing = false;
        if let Some(token) = self.advance_if(TokenType::TagOpenEndVoid) {
            self_closing = true;
            end = token.source_span.end;
        } else if let Some(token) = self.advance_if(TokenType::TagOpenEnd) {
            end = token.source_span.end;
        }

        let start_span = ParseSourceSpan::new(start_tag.source_span.start, end);
        if self_closing && !(definition.can_self_close || definition.is_void) {
            self.report(
                start_span,
                format!("Only void and foreign elements can be self closed \"{}\"", name),
                ParseErrorKind::InvalidSelfClose,
            );
        }

        let mut element = Element::new(name.clone(), attrs, start_span);
        element.is_self_closing = self_closing;
        self.element_stack.push(element);

        if start_tag.token_type == TokenType::IncompleteTagOpen {
            self.pop_element();
            self.report(
                start_span,
                format!("Opening tag \"{}\" not terminated.", name),
                ParseErrorKind::UnterminatedOpenTag,
            );
        } else if self_closing || definition.is_void {
            self.pop_element();
        }
    }

    fn consume_attr(&mut self, attr_name: Token) -> Attribute {
        let name = first_part(&attr_name);
        let mut end = attr_name.source_span.end;

        if let Some(quote) = self.advance_if(TokenType::AttrQuote) {
            end = quote.source_span.end;
        }

        let mut value = String::new();
        let mut value_span: Option<ParseSourceSpan> = None;
        let mut value_tokens = Vec::new();
        let mut has_interpolation = false;
        while let Some(token) = self.tokens.next_if(|token| {
            matches!(
                token.token_type,
                TokenType::AttrValueText | TokenType::AttrValueInterpolation
            )
        }) {
            value.push_str(&token.value());
            has_interpolation |= token.token_type == TokenType::AttrValueInterpolation;
            value_span.get_or_insert(token.source_span).end = token.source_span.end;
            end = token.source_span.end;
            value_tokens.push(token);
        }

        if let Some(quote) = self.advance_if(TokenType::AttrQuote) {
            end = quote.source_span.end;
        }

        Attribute {
            name,
            value,
            source_span: ParseSourceSpan::new(attr_name.source_span.start, end),
            key_span: attr_name.source_span,
            value_span,
            value_tokens: has_interpolation.then_some(value_tokens),
        }
    }

    fn consume_end_tag(&mut self, end_tag: Token) {
        let name = first_part(&end_tag);

        if self.tag_definitions.tag_definition(&name).is_void {
            self.report(
                end_tag.source_span,
                format!("Void elements do not have end tags \"{}\"", name),
                ParseErrorKind::VoidElementWithEndTag,
            );
            return;
        }

        if !self.close_element(&name, end_tag.source_span) {
            self.report(
                end_tag.source_span,
                format!(
                    "Unexpected closing tag \"{}\". It may happen when the tag has already been closed by another tag.",
                    name
                ),
                ParseErrorKind::UnexpectedClosingTag,
            );
        }
    }

    /// Close the nearest open element named `name`, and every element opened
    /// after it. Returns false when no such element is open.
    fn close_element(&mut self, name: &str, end_span: ParseSourceSpan) -> bool {
        let Some(index) = self.element_stack.iter().rposition(|el| el.name == name) else {
            return false;
        };
        while self.element_stack.len() > index + 1 {
            self.pop_element();
        }
        if let Some(element) = self.element_stack.last_mut() {
            element.end_source_span = Some(end_span);
            element.source_span.end = end_span.end;
        }
        self.pop_element();
        true
    }

    fn pop_element(&mut self) {
        if let Some(element) = self.element_stack.pop() {
            self.add_to_parent(Node::Element(element));
        }
    }

    fn add_to_parent(&mut self, node: Node) {
        match self.element_stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root_nodes.push(node),
        }
    }
}

fn first_part(token: &Token) -> String {
    token.parts.first().cloned().unwrap_or_default()
}
