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

//! Textual IR front end
//!
//! Reads a small line-oriented form of functions, blocks and instructions
//! and builds one [`ControlFlowGraph`](dotflow_core::ControlFlowGraph) per
//! function:
//!
//! ```text
//! function sum
//! block entry -> loop, exit
//!   %1 = load a
//!   %2 = load b
//!   %3 = add %1, %2
//!   store %3, x
//! block loop -> entry    # comment
//! block exit
//! ```
//!
//! The first block of a function is its entry. A `%` prefix marks a numbered
//! or named value (`%1` is the value `1`); a bare integer literal is a
//! constant and becomes an unnamed operand.

pub mod error;
pub mod parser;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use parser::parse_module;
