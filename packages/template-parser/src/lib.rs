#![deny(clippy::all)]

/**
 * Template Parser
 *
 * Markup lexer and tree builder, binding expression parser, interpolation
 * splitting and template binding shorthands.
 */

#[cfg(feature = "napi-bindings")]
use napi_derive::napi;

pub mod chars;
pub mod config;
pub mod cursor;
pub mod error;
pub mod parse_util;

pub mod expression_parser;
pub mod ml_parser;

pub use config::ParserConfig;
pub use error::{CompilerError, ErrorCode, LexErrorKind, ParseErrorKind, Result};
pub use expression_parser::{
    ExpressionParseResult, InterpolationPiece, SplitInterpolation, TemplateBinding, AST,
};
pub use ml_parser::{
    html_tag_definitions, InterpolationConfig, ParseTreeResult, TagContentType, TagDefinition,
    TagDefinitionProvider, TokenizeOptions, TokenizeResult,
};
pub use parse_util::{ParseError, ParseSourceFile, ParseSourceSpan};

use tracing::debug;

use expression_parser::{Lexer, Parser as ExpressionParser};
use ml_parser::Parser as MarkupParser;

/// Tokenize a template with the default options.
pub fn tokenize_markup(source: &str, tag_definitions: &dyn TagDefinitionProvider) -> TokenizeResult {
    ml_parser::tokenize(source, "", tag_definitions, &TokenizeOptions::default())
}

/// Parse a template into its element tree.
pub fn parse_markup(source: &str, tag_definitions: &dyn TagDefinitionProvider) -> ParseTreeResult {
    MarkupParser::new(tag_definitions).parse(source, "", &TokenizeOptions::default())
}

/// Parse independent templates in parallel. Results keep input order.
pub fn parse_markup_all(sources: &[&str], tag_definitions: &dyn TagDefinitionProvider) -> Vec<ParseTreeResult> {
    let files: Vec<ParseSourceFile> = sources
        .iter()
        .map(|source| ParseSourceFile::new(source.to_string(), String::new()))
        .collect();
    MarkupParser::new(tag_definitions).parse_all(&files, &TokenizeOptions::default())
}

pub fn tokenize_expression(source: &str) -> Vec<expression_parser::Token> {
    let tokens = Lexer::new().tokenize(source);
    debug!(tokens = tokens.len(), "tokenized expression");
    tokens
}

pub fn parse_expression(source: &str) -> ExpressionParseResult {
    let result = ExpressionParser::new().parse_expression(source, 0);
    debug!(errors = result.errors.len(), "parsed expression");
    result
}

/// Split `source` on the given interpolation markers.
pub fn split_interpolation(source: &str, start_marker: &str, end_marker: &str) -> SplitInterpolation {
    let config = InterpolationConfig::new(start_marker, end_marker);
    ExpressionParser::new().split_interpolation(source, &config)
}

/// Parse a directive shorthand such as `*ngFor="let item of items"`. Errors
/// are logged; use [`expression_parser::Parser::parse_template_bindings`]
/// to receive them.
pub fn parse_template_bindings(key: &str, value: &str) -> Vec<TemplateBinding> {
    let result = ExpressionParser::new().parse_template_bindings(key, value, 0, 0);
    debug!(
        key,
        bindings = result.template_bindings.len(),
        errors = result.errors.len(),
        "parsed template bindings"
    );
    result.template_bindings
}

#[cfg(feature = "napi-bindings")]
fn to_json<T: serde::Serialize>(value: &T) -> napi::Result<String> {
    serde_json::to_string(value).map_err(|err| napi::Error::from_reason(err.to_string()))
}

/// Parse a template and return the tree and errors as JSON.
#[cfg(feature = "napi-bindings")]
#[napi]
pub fn parse_template(template: String, url: Option<String>) -> napi::Result<String> {
    let url = url.unwrap_or_default();
    let result = MarkupParser::new(html_tag_definitions()).parse(&template, &url, &TokenizeOptions::default());
    to_json(&result)
}

#[cfg(feature = "napi-bindings")]
#[napi(js_name = "parseExpression")]
pub fn parse_expression_json(expression: String) -> napi::Result<String> {
    let result = parse_expression(&expression);
    to_json(&serde_json::json!({
        "ast": result.ast,
        "errors": result.errors,
    }))
}

#[cfg(feature = "napi-bindings")]
#[napi(js_name = "tokenizeExpression")]
pub fn tokenize_expression_json(expression: String) -> napi::Result<String> {
    to_json(&tokenize_expression(&expression))
}
