// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Front end error types

use thiserror::Error;

/// Result type for front end parsing
pub type ParseResult<T> = Result<T, ParseError>;

/// Categories of front end errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The line matches no known form
    #[error("Syntax error")]
    Syntax,
    /// A `block` line before any `function` line
    #[error("Block outside of a function")]
    BlockOutsideFunction,
    /// An instruction before any `block` line
    #[error("Instruction outside of a block")]
    InstructionOutsideBlock,
    /// Wrong operand count or missing result for the mnemonic
    #[error("Malformed instruction")]
    MalformedInstruction,
    /// A block label used twice in one function
    #[error("Duplicate block label")]
    DuplicateLabel,
    /// A successor naming no block of the function
    #[error("Unknown block")]
    UnknownBlock,
}

/// Error raised while reading textual IR
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at line {line}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// 1-based line number
    pub line: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_line() {
        let err = ParseError::new(ParseErrorKind::UnknownBlock, 7, "no block named 'exit'");
        assert_eq!(err.to_string(), "Unknown block at line 7: no block named 'exit'");
    }
}
