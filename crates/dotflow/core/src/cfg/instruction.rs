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

//! Instruction records consumed by the analyses

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary arithmetic operators tracked by Available Expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    SignedDiv,
}

impl BinaryOp {
    /// Operator symbol used in expression strings
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::SignedDiv => "/",
        }
    }

    pub fn is_commutative(self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Mul)
    }

    /// Parse an IR mnemonic (`add`, `sub`, `mul`, `sdiv`)
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        match mnemonic {
            "add" => Some(BinaryOp::Add),
            "sub" => Some(BinaryOp::Sub),
            "mul" => Some(BinaryOp::Mul),
            "sdiv" => Some(BinaryOp::SignedDiv),
            _ => None,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::SignedDiv => "sdiv",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Opcode category of an instruction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    Binary(BinaryOp),
    Load,
    /// Operand 0 is the stored value, operand 1 the destination variable
    Store,
    Phi,
    Compare,
    /// Anything the analyses do not model, keeping its mnemonic for diagnostics
    Other(String),
}

impl Opcode {
    pub fn from_mnemonic(mnemonic: &str) -> Self {
        if let Some(op) = BinaryOp::from_mnemonic(mnemonic) {
            return Opcode::Binary(op);
        }
        match mnemonic {
            "load" => Opcode::Load,
            "store" => Opcode::Store,
            "phi" => Opcode::Phi,
            "icmp" | "cmp" => Opcode::Compare,
            other => Opcode::Other(other.to_string()),
        }
    }

    pub fn mnemonic(&self) -> &str {
        match self {
            Opcode::Binary(op) => op.mnemonic(),
            Opcode::Load => "load",
            Opcode::Store => "store",
            Opcode::Phi => "phi",
            Opcode::Compare => "icmp",
            Opcode::Other(name) => name,
        }
    }
}

/// Instruction operand
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Operand {
    /// A variable or a named SSA value
    Named(String),
    /// An integer literal, kept as written
    Constant(String),
    /// A value with no name and no literal text
    Unnamed,
}

impl Operand {
    pub fn named(name: impl Into<String>) -> Self {
        Operand::Named(name.into())
    }

    pub fn constant(literal: impl Into<String>) -> Self {
        Operand::Constant(literal.into())
    }

    pub fn unnamed() -> Self {
        Operand::Unnamed
    }

    /// Name or literal text; empty for an unnamed operand
    pub fn name(&self) -> &str {
        match self {
            Operand::Named(text) | Operand::Constant(text) => text,
            Operand::Unnamed => "",
        }
    }

    pub fn is_unnamed(&self) -> bool {
        matches!(self, Operand::Unnamed)
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Operand::Constant(_))
    }

    /// Whether the operand names a variable (not a constant or an unnamed value)
    pub fn is_variable(&self) -> bool {
        matches!(self, Operand::Named(_))
    }
}

impl From<&str> for Operand {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Unnamed => f.write_str("_"),
            _ => f.write_str(self.name()),
        }
    }
}

/// One instruction of a basic block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: Opcode,
    /// Name of the value this instruction produces, if any
    pub result: Option<String>,
    pub operands: Vec<Operand>,
}

impl Instruction {
    pub fn new(opcode: Opcode, result: Option<String>, operands: Vec<Operand>) -> Self {
        Self { opcode, result, operands }
    }

    /// `result = lhs <op> rhs`
    pub fn binary(op: BinaryOp, result: &str, lhs: &str, rhs: &str) -> Self {
        Self::new(Opcode::Binary(op), Some(result.to_string()), vec![lhs.into(), rhs.into()])
    }

    /// `result = load source`
    pub fn load(result: &str, source: &str) -> Self {
        Self::new(Opcode::Load, Some(result.to_string()), vec![source.into()])
    }

    /// `store value, destination`
    pub fn store(value: &str, destination: &str) -> Self {
        Self::new(Opcode::Store, None, vec![value.into(), destination.into()])
    }

    pub fn phi(result: &str, incoming: &[&str]) -> Self {
        Self::new(Opcode::Phi, Some(result.to_string()), incoming.iter().map(|&name| name.into()).collect())
    }

    pub fn compare(result: &str, lhs: &str, rhs: &str) -> Self {
        Self::new(Opcode::Compare, Some(result.to_string()), vec![lhs.into(), rhs.into()])
    }

    pub fn other(mnemonic: &str, operands: &[&str]) -> Self {
        Self::new(Opcode::Other(mnemonic.to_string()), None, operands.iter().map(|&name| name.into()).collect())
    }

    pub fn operand(&self, index: usize) -> Option<&Operand> {
        self.operands.get(index)
    }

    /// Destination variable of a store
    pub fn store_destination(&self) -> Option<&Operand> {
        match self.opcode {
            Opcode::Store => self.operand(1),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(result) = &self.result {
            write!(f, "{} = ", result)?;
        }
        write!(f, "{}", self.opcode.mnemonic())?;
        for (i, operand) in self.operands.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{}{}", sep, operand)?;
        }
        Ok(())
    }
}
