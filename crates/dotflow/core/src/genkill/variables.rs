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

//! GEN/KILL construction for Liveness
//!
//! GEN[B] is the set of upward-exposed uses: an operand joins GEN only if it
//! is not yet in KILL as accumulated so far in the block. KILL[B] is the set
//! of variables defined in B.
//!
//! Every operand of a `store` is a definition, the stored value included.
//! Opcodes the analysis does not model (`Opcode::Other`) are likewise treated
//! as pure definitions of all their operands. Constants and unnamed operands
//! never enter either set.

use crate::cfg::{BasicBlock, ControlFlowGraph, Opcode};
use crate::context::LocalSets;
use std::collections::BTreeSet;
use tracing::trace;

/// Builds per-block variable GEN/KILL sets
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableGenKill;

impl VariableGenKill {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, cfg: &ControlFlowGraph) -> LocalSets<String> {
        let mut sets = LocalSets::with_blocks(cfg.len());
        for block in cfg.blocks() {
            let (generated, killed) = Self::block_sets(block);
            sets.generated[block.id] = generated;
            sets.killed[block.id] = killed;
        }
        sets
    }

    /// GEN and KILL for one block, scanning instructions in order
    pub fn block_sets(block: &BasicBlock) -> (BTreeSet<String>, BTreeSet<String>) {
        let mut generated = BTreeSet::new();
        let mut killed = BTreeSet::new();

        for instruction in &block.instructions {
            match instruction.opcode {
                Opcode::Binary(_) | Opcode::Phi | Opcode::Compare | Opcode::Load => {
                    for operand in instruction.operands.iter().filter(|op| op.is_variable()) {
                        let name = operand.name();
                        if !killed.contains(name) {
                            generated.insert(name.to_string());
                        }
                    }
                }
                Opcode::Store | Opcode::Other(_) => {
                    for operand in instruction.operands.iter().filter(|op| op.is_variable()) {
                        killed.insert(operand.name().to_string());
                    }
                }
            }
        }

        trace!("{}: gen={:?} kill={:?}", block.label, generated, killed);
        (generated, killed)
    }
}
