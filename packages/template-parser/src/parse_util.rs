//! Parse Utilities
//!
//! Source files, locations, spans and the diagnostic record shared by the
//! markup and expression tiers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::chars;
use crate::error::ErrorCode;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseSourceFile {
    pub content: String,
    pub url: String,
}

impl ParseSourceFile {
    pub fn new(content: String, url: String) -> Self {
        ParseSourceFile { content, url }
    }

    /// Return the source around `offset`: up to `max_chars` characters or
    /// `max_lines` lines on each side.
    pub fn get_context(&self, offset: usize, max_chars: usize, max_lines: usize) -> (&str, &str) {
        let content = self.content.as_str();
        let mut offset = offset.min(content.len());
        while !content.is_char_boundary(offset) {
            offset -= 1;
        }

        let mut start = offset;
        let mut ctx_chars = 0;
        let mut ctx_lines = 0;
        for (idx, ch) in content[..offset].char_indices().rev() {
            if ctx_chars >= max_chars {
                break;
            }
            start = idx;
            ctx_chars += 1;
            if ch == chars::LF {
                ctx_lines += 1;
                if ctx_lines >= max_lines {
                    break;
                }
            }
        }

        let mut end = offset;
        ctx_chars = 0;
        ctx_lines = 0;
        for (idx, ch) in content[offset..].char_indices() {
            if ctx_chars >= max_chars {
                break;
            }
            end = offset + idx + ch.len_utf8();
            ctx_chars += 1;
            if ch == chars::LF {
                ctx_lines += 1;
                if ctx_lines >= max_lines {
                    break;
                }
            }
        }

        (&content[start..offset], &content[offset..end])
    }
}

/// A position in a source file. `offset` is a byte offset; `line` and `col`
/// are zero based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParseLocation {
    pub offset: usize,
    pub line: usize,
    pub col: usize,
}

impl ParseLocation {
    pub fn new(offset: usize, line: usize, col: usize) -> Self {
        ParseLocation { offset, line, col }
    }

    /// Compute the line and column of `offset` by scanning `content`.
    pub fn from_offset(content: &str, offset: usize) -> Self {
        let mut line = 0;
        let mut col = 0;
        let mut prev = chars::EOF;
        for (idx, ch) in content.char_indices() {
            if idx >= offset {
                break;
            }
            match ch {
                chars::CR => {
                    line += 1;
                    col = 0;
                }
                chars::LF if prev == chars::CR => col = 0,
                chars::LF => {
                    line += 1;
                    col = 0;
                }
                _ => col += 1,
            }
            prev = ch;
        }
        ParseLocation::new(offset.min(content.len()), line, col)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParseSourceSpan {
    pub start: ParseLocation,
    pub end: ParseLocation,
}

impl ParseSourceSpan {
    pub fn new(start: ParseLocation, end: ParseLocation) -> Self {
        ParseSourceSpan { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The source text this span covers.
    pub fn text<'a>(&self, file: &'a ParseSourceFile) -> &'a str {
        file.content
            .get(self.start.offset..self.end.offset)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseErrorLevel {
    Warning,
    Error,
}

/// A recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{msg}")]
pub struct ParseError {
    pub span: ParseSourceSpan,
    pub msg: String,
    pub level: ParseErrorLevel,
    pub code: ErrorCode,
}

impl ParseError {
    pub fn new(span: ParseSourceSpan, msg: impl Into<String>, code: impl Into<ErrorCode>) -> Self {
        ParseError {
            span,
            msg: msg.into(),
            level: ParseErrorLevel::Error,
            code: code.into(),
        }
    }

    pub fn contextual_message(&self, file: &ParseSourceFile) -> String {
        let (before, after) = file.get_context(self.span.start.offset, 100, 3);
        let level_str = match self.level {
            ParseErrorLevel::Warning => "WARNING",
            ParseErrorLevel::Error => "ERROR",
        };
        format!("{} (\"{}[{} ->]{}\")", self.msg, before, level_str, after)
    }

    /// Contextual message followed by `url@line:col`.
    pub fn located<'a>(&'a self, file: &'a ParseSourceFile) -> LocatedError<'a> {
        LocatedError { error: self, file }
    }
}

pub struct LocatedError<'a> {
    error: &'a ParseError,
    file: &'a ParseSourceFile,
}

impl fmt::Display for LocatedError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self.error.span.start;
        write!(
            f,
            "{}: {}@{}:{}",
            self.error.contextual_message(self.file),
            self.file.url,
            start.line,
            start.col
        )
    }
}
