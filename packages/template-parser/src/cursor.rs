//! Source Cursor
//!
//! A `Copy` position tracker over an input buffer. Both scanners read their
//! input through it; backtracking is done by keeping a copy and assigning it
//! back.
//!
//! Offsets are byte offsets into the UTF-8 input, so they can be used to slice
//! the source directly. Columns and [`Cursor::diff`] count characters.

use crate::chars;
use crate::error::{CompilerError, Result};
use crate::parse_util::{ParseLocation, ParseSourceSpan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorState {
    pub peek: char,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    after_cr: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    input: &'a str,
    state: CursorState,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a str) -> Self {
        Cursor {
            input,
            state: CursorState {
                peek: input.chars().next().unwrap_or(chars::EOF),
                offset: 0,
                line: 0,
                column: 0,
                after_cr: false,
            },
        }
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Current character, or [`chars::EOF`] past the end of the input.
    pub fn peek(&self) -> char {
        self.state.peek
    }

    /// Character `n` positions ahead of the current one.
    pub fn peek_at(&self, n: usize) -> char {
        self.rest().chars().nth(n).unwrap_or(chars::EOF)
    }

    /// True once every character has been consumed. A NUL character inside
    /// the input does not count as the end.
    pub fn at_eof(&self) -> bool {
        self.state.offset >= self.input.len()
    }

    pub fn offset(&self) -> usize {
        self.state.offset
    }

    pub fn advance(&mut self) -> Result<()> {
        let ch = match self.rest().chars().next() {
            Some(ch) => ch,
            None => {
                return Err(CompilerError::UnexpectedEof {
                    offset: self.state.offset,
                })
            }
        };

        let state = &mut self.state;
        state.offset += ch.len_utf8();
        match ch {
            chars::CR => {
                state.line += 1;
                state.column = 0;
                state.after_cr = true;
            }
            chars::LF => {
                // The `\n` of a `\r\n` pair was already counted by the `\r`.
                if !state.after_cr {
                    state.line += 1;
                }
                state.column = 0;
                state.after_cr = false;
            }
            _ => {
                state.column += 1;
                state.after_cr = false;
            }
        }
        state.peek = self.input[state.offset..].chars().next().unwrap_or(chars::EOF);
        Ok(())
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    /// Number of characters left to consume.
    pub fn remaining_length(&self) -> usize {
        self.rest().chars().count()
    }

    /// Number of characters between `self` and `other`, in either order.
    pub fn diff(&self, other: &Cursor<'_>) -> usize {
        let (from, to) = if self.state.offset >= other.state.offset {
            (other.state.offset, self.state.offset)
        } else {
            (self.state.offset, other.state.offset)
        };
        self.input[from..to].chars().count()
    }

    pub fn location(&self) -> ParseLocation {
        ParseLocation::new(self.state.offset, self.state.line, self.state.column)
    }

    pub fn span_from(&self, start: &Cursor<'_>) -> ParseSourceSpan {
        ParseSourceSpan::new(start.location(), self.location())
    }

    /// Source text between `start` and this cursor.
    pub fn slice_between(&self, start: &Cursor<'_>) -> &'a str {
        let from = start.state.offset.min(self.state.offset);
        &self.input[from..self.state.offset]
    }

    fn rest(&self) -> &'a str {
        &self.input[self.state.offset..]
    }
}
