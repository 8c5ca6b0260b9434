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

//! Line parser for the textual IR

use super::error::{ParseError, ParseErrorKind, ParseResult};
use dotflow_core::{ControlFlowGraph, Instruction, Opcode, Operand};
use std::collections::HashMap;
use tracing::{debug, trace};

struct PendingBlock {
    label: String,
    line: usize,
    successors: Vec<String>,
    instructions: Vec<Instruction>,
}

struct PendingFunction {
    name: String,
    blocks: Vec<PendingBlock>,
}

impl PendingFunction {
    /// Successor labels can point forward, so edges are resolved only once
    /// every block of the function is known.
    fn finish(self) -> ParseResult<ControlFlowGraph> {
        let mut cfg = ControlFlowGraph::new(self.name);
        let mut ids = HashMap::new();
        for block in &self.blocks {
            if ids.contains_key(&block.label) {
                return Err(ParseError::new(
                    ParseErrorKind::DuplicateLabel,
                    block.line,
                    format!("block '{}' is already defined in function '{}'", block.label, cfg.name),
                ));
            }
            let id = cfg.add_block(block.label.clone());
            ids.insert(block.label.clone(), id);
        }

        for (from, block) in self.blocks.into_iter().enumerate() {
            for successor in &block.successors {
                let to = *ids.get(successor).ok_or_else(|| {
                    ParseError::new(
                        ParseErrorKind::UnknownBlock,
                        block.line,
                        format!("no block named '{}' in function '{}'", successor, cfg.name),
                    )
                })?;
                cfg.add_edge(from, to).map_err(|e| ParseError::new(ParseErrorKind::UnknownBlock, block.line, e.to_string()))?;
            }
            for instruction in block.instructions {
                cfg.push_instruction(from, instruction)
                    .map_err(|e| ParseError::new(ParseErrorKind::UnknownBlock, block.line, e.to_string()))?;
            }
        }

        trace!("parsed function '{}' with {} blocks", cfg.name, cfg.len());
        Ok(cfg)
    }
}

/// Parse every function in `source`, in order of appearance
pub fn parse_module(source: &str) -> ParseResult<Vec<ControlFlowGraph>> {
    let mut functions = Vec::new();
    let mut current: Option<PendingFunction> = None;

    for (index, raw) in source.lines().enumerate() {
        let line_no = index + 1;
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        let (keyword, rest) = split_keyword(line);
        match keyword {
            "function" => {
                let name = parse_identifier(rest, line_no, "function name")?;
                if let Some(done) = current.take() {
                    functions.push(done.finish()?);
                }
                current = Some(PendingFunction { name, blocks: Vec::new() });
            }
            "block" => {
                let function = current
                    .as_mut()
                    .ok_or_else(|| ParseError::new(ParseErrorKind::BlockOutsideFunction, line_no, format!("block '{}' precedes any function", rest)))?;
                function.blocks.push(parse_block_header(rest, line_no)?);
            }
            _ => {
                let block = current
                    .as_mut()
                    .and_then(|function| function.blocks.last_mut())
                    .ok_or_else(|| ParseError::new(ParseErrorKind::InstructionOutsideBlock, line_no, format!("'{}' precedes any block", line)))?;
                block.instructions.push(parse_instruction(line, line_no)?);
            }
        }
    }

    if let Some(done) = current.take() {
        functions.push(done.finish()?);
    }
    debug!("parsed {} functions", functions.len());
    Ok(functions)
}

fn strip_comment(line: &str) -> &str {
    line.split_once('#').map_or(line, |(code, _)| code)
}

fn split_keyword(line: &str) -> (&str, &str) {
    line.split_once(char::is_whitespace).map_or((line, ""), |(keyword, rest)| (keyword, rest.trim()))
}

fn is_identifier(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '$' | '-'))
}

fn parse_identifier(text: &str, line: usize, what: &str) -> ParseResult<String> {
    if is_identifier(text) {
        Ok(text.to_string())
    } else {
        Err(ParseError::new(ParseErrorKind::Syntax, line, format!("invalid {} '{}'", what, text)))
    }
}

/// `<label> [-> succ, succ...]`
fn parse_block_header(text: &str, line: usize) -> ParseResult<PendingBlock> {
    let (label, successors) = match text.split_once("->") {
        Some((label, targets)) => {
            let targets = targets.trim();
            if targets.is_empty() {
                return Err(ParseError::new(ParseErrorKind::Syntax, line, "expected successor labels after '->'"));
            }
            let successors = targets
                .split(',')
                .map(|target| parse_identifier(target.trim(), line, "successor label"))
                .collect::<ParseResult<Vec<_>>>()?;
            (label.trim(), successors)
        }
        None => (text, Vec::new()),
    };

    Ok(PendingBlock {
        label: parse_identifier(label, line, "block label")?,
        line,
        successors,
        instructions: Vec::new(),
    })
}

/// A value name, with an optional `%` sigil
fn parse_value(text: &str, line: usize) -> ParseResult<String> {
    parse_identifier(text.strip_prefix('%').unwrap_or(text), line, "value name")
}

fn parse_operand(text: &str, line: usize) -> ParseResult<Operand> {
    if text.parse::<i64>().is_ok() {
        return Ok(Operand::constant(text));
    }
    parse_value(text, line).map(Operand::named)
}

/// `[<result> =] <mnemonic> [operand {, operand}]`
fn parse_instruction(text: &str, line: usize) -> ParseResult<Instruction> {
    let (result, body) = match text.split_once('=') {
        Some((lhs, rhs)) => (Some(parse_value(lhs.trim(), line)?), rhs.trim()),
        None => (None, text),
    };

    let (mnemonic, rest) = split_keyword(body);
    if mnemonic.is_empty() {
        return Err(ParseError::new(ParseErrorKind::Syntax, line, "missing mnemonic"));
    }
    let operands = if rest.is_empty() {
        Vec::new()
    } else {
        rest.split(',').map(|operand| parse_operand(operand.trim(), line)).collect::<ParseResult<Vec<_>>>()?
    };

    let opcode = Opcode::from_mnemonic(mnemonic);
    check_shape(&opcode, result.is_some(), operands.len(), line)?;
    Ok(Instruction::new(opcode, result, operands))
}

fn check_shape(opcode: &Opcode, has_result: bool, operand_count: usize, line: usize) -> ParseResult<()> {
    let (wants_result, arity_ok, expected) = match opcode {
        Opcode::Binary(_) | Opcode::Compare => (Some(true), operand_count == 2, "two operands"),
        Opcode::Load => (Some(true), operand_count == 1, "one operand"),
        Opcode::Store => (Some(false), operand_count == 2, "a value and a destination"),
        Opcode::Phi => (Some(true), operand_count >= 1, "at least one incoming value"),
        Opcode::Other(_) => (None, true, ""),
    };

    if let Some(wants_result) = wants_result {
        if wants_result != has_result {
            let message = if wants_result {
                format!("'{}' must assign a result", opcode.mnemonic())
            } else {
                format!("'{}' does not produce a result", opcode.mnemonic())
            };
            return Err(ParseError::new(ParseErrorKind::MalformedInstruction, line, message));
        }
    }
    if !arity_ok {
        return Err(ParseError::new(
            ParseErrorKind::MalformedInstruction,
            line,
            format!("'{}' takes {}, got {}", opcode.mnemonic(), expected, operand_count),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotflow_core::BinaryOp;
    use test_case::test_case;

    const SUM: &str = "
function sum
block entry -> loop, exit
  %1 = load a
  %2 = load b
  %3 = add %1, %2
  store %3, x
block loop -> entry   # back edge
  %4 = mul %1, 2
block exit
";

    #[test]
    fn test_parse_single_function() {
        let functions = parse_module(SUM).unwrap();
        assert_eq!(functions.len(), 1);

        let cfg = &functions[0];
        assert_eq!(cfg.name, "sum");
        assert_eq!(cfg.len(), 3);
        assert_eq!(cfg.entry_block(), Some(0));
        assert!(cfg.validate().is_ok());

        let entry = cfg.block_by_label("entry").unwrap();
        assert_eq!(entry.successors.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(entry.instructions.len(), 4);
        assert_eq!(entry.instructions[2], Instruction::binary(BinaryOp::Add, "3", "1", "2"));
        assert_eq!(entry.instructions[3], Instruction::store("3", "x"));

        let loop_block = cfg.block_by_label("loop").unwrap();
        assert_eq!(loop_block.instructions[0].operands[1], Operand::constant("2"));
        assert!(cfg.block_by_label("exit").unwrap().is_exit());
    }

    #[test]
    fn test_parse_several_functions_in_order() {
        let source = "function f\nblock a\nfunction g\nblock b -> c\nblock c\nfunction empty\n";
        let functions = parse_module(source).unwrap();
        let names: Vec<&str> = functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["f", "g", "empty"]);
        assert!(functions[2].is_empty());
    }

    #[test]
    fn test_unmodelled_mnemonics_are_kept() {
        let functions = parse_module("function f\nblock a\n  call g, %1\n  ret\n").unwrap();
        let block = &functions[0].blocks()[0];
        assert_eq!(block.instructions[0].opcode, Opcode::Other("call".to_string()));
        assert_eq!(block.instructions[1].operands.len(), 0);
    }

    #[test_case("block a\n", ParseErrorKind::BlockOutsideFunction, 1 ; "block before function")]
    #[test_case("function f\n  %1 = load a\n", ParseErrorKind::InstructionOutsideBlock, 2 ; "instruction before block")]
    #[test_case("function f\nblock a -> nowhere\n", ParseErrorKind::UnknownBlock, 2 ; "unknown successor")]
    #[test_case("function f\nblock a\nblock a\n", ParseErrorKind::DuplicateLabel, 3 ; "duplicate label")]
    #[test_case("function f\nblock a ->\n", ParseErrorKind::Syntax, 2 ; "empty successor list")]
    #[test_case("function f g\n", ParseErrorKind::Syntax, 1 ; "function name with space")]
    #[test_case("function f\nblock a\n  %1 = add %2\n", ParseErrorKind::MalformedInstruction, 3 ; "binary arity")]
    #[test_case("function f\nblock a\n  load a\n", ParseErrorKind::MalformedInstruction, 3 ; "load without result")]
    #[test_case("function f\nblock a\n  %1 = store %2, x\n", ParseErrorKind::MalformedInstruction, 3 ; "store with result")]
    #[test_case("function f\nblock a\n  %1 = add %2, b c\n", ParseErrorKind::Syntax, 3 ; "operand with space")]
    fn test_malformed_input(source: &str, kind: ParseErrorKind, line: usize) {
        let err = parse_module(source).unwrap_err();
        assert_eq!(err.kind, kind);
        assert_eq!(err.line, line);
    }
}
