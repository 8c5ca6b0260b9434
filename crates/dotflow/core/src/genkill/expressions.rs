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

//! GEN/KILL construction for Available Expressions
//!
//! GEN[B] holds every expression computed in B. KILL[B] holds expressions with
//! an operand that B stores to, matched by name only. Which expressions a
//! store can reach depends on [`KillScope`]:
//!
//! - `Universe`: every expression generated anywhere in the function. A store
//!   to `v` makes all `v`-expressions unavailable after B, including ones that
//!   flowed in from predecessors.
//! - `BlockLocal`: only expressions already in GEN[B] when the store executes.
//!   Expressions arriving through IN[B] survive a local store.
//!
//! GEN is never reduced by KILL; `OUT = GEN ∪ (IN − KILL)` lets GEN win.

use crate::cfg::{ControlFlowGraph, Instruction, Opcode, Operand};
use crate::context::{LocalSets, RunContext, WarningKind};
use crate::expression::{Expression, OperandOrder, Term};
use dotflow_common::{AnalysisConfig, KillScope};
use std::collections::BTreeSet;
use tracing::debug;

/// Builds per-block expression GEN/KILL sets
#[derive(Debug, Clone, Copy)]
pub struct ExpressionGenKill {
    order: OperandOrder,
    kill_scope: KillScope,
}

impl ExpressionGenKill {
    pub fn new(order: OperandOrder, kill_scope: KillScope) -> Self {
        Self { order, kill_scope }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(OperandOrder::from_flag(config.canonicalize_commutative_operands), config.kill_scope)
    }

    /// Walk every block once, filling the resolver and universe in `ctx`
    pub fn build(&self, cfg: &ControlFlowGraph, ctx: &mut RunContext) -> LocalSets<Expression> {
        let mut sets = LocalSets::with_blocks(cfg.len());
        // Variables stored to in each block, in program order
        let mut stored: Vec<BTreeSet<String>> = vec![BTreeSet::new(); cfg.len()];

        for block in cfg.blocks() {
            let generated = &mut sets.generated[block.id];
            let killed = &mut sets.killed[block.id];

            for (index, instruction) in block.instructions.iter().enumerate() {
                match &instruction.opcode {
                    Opcode::Binary(op) => {
                        let lhs = self.resolve_operand(instruction, 0, &block.label, index, ctx);
                        let rhs = self.resolve_operand(instruction, 1, &block.label, index, ctx);
                        let expression = Expression::new(*op, lhs, rhs, self.order);
                        ctx.universe.insert(expression.clone());
                        generated.insert(expression);
                    }
                    Opcode::Load => {
                        if let (Some(result), Some(source)) = (&instruction.result, instruction.operand(0)) {
                            ctx.resolver.record_load(result, source.name());
                        }
                    }
                    Opcode::Store => {
                        // constants and unnamed values are never store targets
                        let Some(destination) = instruction.store_destination().filter(|d| d.is_variable()) else {
                            continue;
                        };
                        let variable = destination.name();
                        if self.kill_scope == KillScope::BlockLocal {
                            killed.extend(generated.iter().filter(|e| e.uses(variable)).cloned());
                        }
                        stored[block.id].insert(variable.to_string());
                    }
                    _ => {}
                }
            }
        }

        if self.kill_scope == KillScope::Universe {
            for (block_id, variables) in stored.iter().enumerate() {
                sets.killed[block_id] = ctx.universe.iter().filter(|e| variables.iter().any(|v| e.uses(v))).cloned().collect();
            }
        }

        debug!("{}: {} expressions across {} blocks", ctx.function, ctx.universe.len(), cfg.len());
        sets
    }

    fn resolve_operand(&self, instruction: &Instruction, position: usize, block: &str, index: usize, ctx: &mut RunContext) -> Term {
        match instruction.operand(position) {
            Some(Operand::Named(name)) => Term::Variable(ctx.resolver.resolve(name).to_string()),
            Some(Operand::Constant(literal)) => Term::Constant(literal.clone()),
            Some(Operand::Unnamed) | None => {
                ctx.warn(block, index, WarningKind::UnresolvedOperand { position });
                Term::Variable(String::new())
            }
        }
    }
}
