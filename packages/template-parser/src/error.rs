//! Error Types
//!
//! Hard failures are returned as [`CompilerError`]. Recoverable problems are
//! recorded as [`crate::parse_util::ParseError`] values tagged with an
//! [`ErrorCode`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Problems found while scanning characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LexErrorKind {
    UnexpectedCharacter,
    UnterminatedQuote,
    UnterminatedComment,
    UnterminatedCData,
    UnterminatedDocType,
    InvalidNumericSeparator,
    InvalidExponent,
    InvalidUnicodeEscape,
}

/// Problems found while assembling tokens into a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParseErrorKind {
    UnexpectedClosingTag,
    VoidElementWithEndTag,
    UnterminatedOpenTag,
    InvalidSelfClose,
    ConditionalMissingBranch,
    UnexpectedToken,
    UnexpectedEndOfInput,
    UnsafeAssignmentThroughOptionalChain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "tier", content = "kind")]
pub enum ErrorCode {
    Lex(LexErrorKind),
    Parse(ParseErrorKind),
}

impl From<LexErrorKind> for ErrorCode {
    fn from(kind: LexErrorKind) -> Self {
        ErrorCode::Lex(kind)
    }
}

impl From<ParseErrorKind> for ErrorCode {
    fn from(kind: ParseErrorKind) -> Self {
        ErrorCode::Parse(kind)
    }
}

#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("Unexpected character \"EOF\" at offset {offset}")]
    UnexpectedEof { offset: usize },

    #[error("{0}")]
    InvalidInterpolationConfig(String),

    #[error("invalid parser configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CompilerError>;
