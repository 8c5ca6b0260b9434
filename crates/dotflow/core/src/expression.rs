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

//! Canonical binary expressions, the lattice elements of Available Expressions

use crate::cfg::BinaryOp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether commutative operands are put in a fixed order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperandOrder {
    /// Sort the operands of `+` and `*` lexicographically
    #[default]
    Canonical,
    /// Keep operands in the order they were written
    AsWritten,
}

impl OperandOrder {
    pub fn from_flag(canonicalize_commutative_operands: bool) -> Self {
        if canonicalize_commutative_operands { OperandOrder::Canonical } else { OperandOrder::AsWritten }
    }
}

/// One side of an expression
///
/// Variables order before constants, so canonical commutative expressions
/// read `a + 1` rather than `1 + a`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    Variable(String),
    Constant(String),
}

impl Term {
    /// Variable name or literal text
    pub fn text(&self) -> &str {
        match self {
            Term::Variable(text) | Term::Constant(text) => text,
        }
    }

    pub fn is_variable(&self, name: &str) -> bool {
        matches!(self, Term::Variable(v) if v == name)
    }
}

impl From<&str> for Term {
    fn from(name: &str) -> Self {
        Term::Variable(name.to_string())
    }
}

impl From<String> for Term {
    fn from(name: String) -> Self {
        Term::Variable(name)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Immutable `lhs <op> rhs` value. Equality, hashing and ordering all follow
/// the operand order fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Expression {
    op: BinaryOp,
    lhs: Term,
    rhs: Term,
}

impl Expression {
    pub fn new(op: BinaryOp, lhs: impl Into<Term>, rhs: impl Into<Term>, order: OperandOrder) -> Self {
        let (mut lhs, mut rhs) = (lhs.into(), rhs.into());
        if order == OperandOrder::Canonical && op.is_commutative() && rhs < lhs {
            std::mem::swap(&mut lhs, &mut rhs);
        }
        Self { op, lhs, rhs }
    }

    /// Expression with commutative operands sorted
    pub fn canonical(op: BinaryOp, lhs: impl Into<Term>, rhs: impl Into<Term>) -> Self {
        Self::new(op, lhs, rhs, OperandOrder::Canonical)
    }

    pub fn op(&self) -> BinaryOp {
        self.op
    }

    pub fn lhs(&self) -> &Term {
        &self.lhs
    }

    pub fn rhs(&self) -> &Term {
        &self.rhs
    }

    /// Whether `variable` appears as either operand. Constants never match.
    pub fn uses(&self, variable: &str) -> bool {
        self.lhs.is_variable(variable) || self.rhs.is_variable(variable)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.op.symbol(), self.rhs)
    }
}
