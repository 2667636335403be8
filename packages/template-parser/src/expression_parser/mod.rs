/**
 * Expression Parser Module
 *
 * Binding expressions, interpolations and template binding shorthands.
 */
pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::*;
pub use lexer::{Lexer, Token, TokenType};
pub use parser::{
    ExpressionParseResult, InterpolationPiece, Parser, SplitInterpolation,
    TemplateBindingParseResult,
};
