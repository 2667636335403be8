//! ML (Markup Language) Parser Module
//!
//! Tokenizes markup and builds the element tree.

pub mod ast;
pub mod defaults;
pub mod html_tags;
pub mod lexer;
pub mod parser;
pub mod tags;
pub mod tokens;

pub use ast::*;
pub use defaults::InterpolationConfig;
pub use html_tags::{html_tag_definitions, HtmlTagDefinitions};
pub use lexer::{tokenize, TokenizeOptions, TokenizeResult};
pub use parser::{ParseTreeResult, Parser};
pub use tags::*;
pub use tokens::{Token, TokenType};
