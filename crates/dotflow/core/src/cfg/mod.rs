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

//! Control Flow Graph model for dataflow analysis
//!
//! The graph is the sole owner of its blocks. Edges are stored on both ends as
//! block ids, so a block never holds a reference to another block.

pub mod instruction;

pub use instruction::{BinaryOp, Instruction, Opcode, Operand};

use dotflow_common::CfgError;
use std::collections::{BTreeSet, HashSet, VecDeque};

/// Block identifier (index into the graph's block list)
pub type BlockId = usize;

/// Basic block in the control flow graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicBlock {
    /// Block identifier
    pub id: BlockId,
    /// Label used in reports
    pub label: String,
    /// Instructions in program order
    pub instructions: Vec<Instruction>,
    /// Predecessor blocks
    pub predecessors: BTreeSet<BlockId>,
    /// Successor blocks
    pub successors: BTreeSet<BlockId>,
}

impl BasicBlock {
    pub fn new(id: BlockId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            instructions: Vec::new(),
            predecessors: BTreeSet::new(),
            successors: BTreeSet::new(),
        }
    }

    pub fn with_instructions(mut self, instructions: Vec<Instruction>) -> Self {
        self.instructions = instructions;
        self
    }

    /// Whether the block ends the function (no successors)
    pub fn is_exit(&self) -> bool {
        self.successors.is_empty()
    }
}

/// Control Flow Graph of a single function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlFlowGraph {
    /// Function name
    pub name: String,
    blocks: Vec<BasicBlock>,
    entry_block: Option<BlockId>,
}

impl ControlFlowGraph {
    /// Create an empty graph for the named function
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blocks: Vec::new(),
            entry_block: None,
        }
    }

    /// Build a graph from blocks whose adjacency was filled in by a front end.
    ///
    /// Block ids must match their position. The result is validated, so an
    /// inconsistent adjacency is rejected here rather than during solving.
    pub fn from_blocks(name: impl Into<String>, entry: BlockId, blocks: Vec<BasicBlock>) -> Result<Self, CfgError> {
        let cfg = Self {
            name: name.into(),
            entry_block: if blocks.is_empty() { None } else { Some(entry) },
            blocks,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Append a new block; the first block added becomes the entry
    pub fn add_block(&mut self, label: impl Into<String>) -> BlockId {
        let id = self.blocks.len();
        self.blocks.push(BasicBlock::new(id, label));
        if self.entry_block.is_none() {
            self.entry_block = Some(id);
        }
        id
    }

    /// Append an instruction to a block
    pub fn push_instruction(&mut self, block: BlockId, instruction: Instruction) -> Result<(), CfgError> {
        match self.blocks.get_mut(block) {
            Some(target) => {
                target.instructions.push(instruction);
                Ok(())
            }
            None => Err(CfgError::NoSuchBlock {
                function: self.name.clone(),
                block,
            }),
        }
    }

    /// Add a directed edge, recording it on both ends
    pub fn add_edge(&mut self, from: BlockId, to: BlockId) -> Result<(), CfgError> {
        if from >= self.blocks.len() {
            return Err(CfgError::UnknownBlock {
                block: self.label_of(to),
                target: from,
            });
        }
        if to >= self.blocks.len() {
            return Err(CfgError::UnknownBlock {
                block: self.label_of(from),
                target: to,
            });
        }
        self.blocks[from].successors.insert(to);
        self.blocks[to].predecessors.insert(from);
        Ok(())
    }

    pub fn set_entry(&mut self, entry: BlockId) {
        self.entry_block = Some(entry);
    }

    /// Entry block, None only for an empty graph
    pub fn entry_block(&self) -> Option<BlockId> {
        self.entry_block
    }

    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id)
    }

    pub fn block_by_label(&self, label: &str) -> Option<&BasicBlock> {
        self.blocks.iter().find(|block| block.label == label)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Blocks with no successors; the boundary of backward analyses
    pub fn exit_blocks(&self) -> Vec<BlockId> {
        self.blocks.iter().filter(|block| block.is_exit()).map(|block| block.id).collect()
    }

    /// Check that every edge is known on both ends and labels are unique
    pub fn validate(&self) -> Result<(), CfgError> {
        if self.blocks.is_empty() {
            return Ok(());
        }

        match self.entry_block {
            None => return Err(CfgError::MissingEntry { function: self.name.clone() }),
            Some(entry) if entry >= self.blocks.len() => {
                return Err(CfgError::UnknownEntry {
                    function: self.name.clone(),
                    entry,
                });
            }
            Some(_) => {}
        }

        let mut labels = HashSet::new();
        for (position, block) in self.blocks.iter().enumerate() {
            if block.id != position {
                return Err(CfgError::MisnumberedBlock { position, id: block.id });
            }
            if !labels.insert(block.label.as_str()) {
                return Err(CfgError::DuplicateLabel { label: block.label.clone() });
            }
        }

        for block in &self.blocks {
            for &succ in &block.successors {
                let target = self.blocks.get(succ).ok_or_else(|| CfgError::UnknownBlock {
                    block: block.label.clone(),
                    target: succ,
                })?;
                if !target.predecessors.contains(&block.id) {
                    return Err(CfgError::UnreciprocatedSuccessor {
                        from: block.label.clone(),
                        to: target.label.clone(),
                    });
                }
            }
            for &pred in &block.predecessors {
                let source = self.blocks.get(pred).ok_or_else(|| CfgError::UnknownBlock {
                    block: block.label.clone(),
                    target: pred,
                })?;
                if !source.successors.contains(&block.id) {
                    return Err(CfgError::UnreciprocatedPredecessor {
                        from: source.label.clone(),
                        to: block.label.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Blocks reachable from the entry, in breadth-first order
    pub fn reachable_blocks(&self) -> Vec<BlockId> {
        let Some(entry) = self.entry_block else {
            return Vec::new();
        };

        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(entry);
        visited.insert(entry);

        while let Some(block_id) = queue.pop_front() {
            order.push(block_id);
            if let Some(block) = self.blocks.get(block_id) {
                for &successor_id in &block.successors {
                    if visited.insert(successor_id) {
                        queue.push_back(successor_id);
                    }
                }
            }
        }
        order
    }

    /// Blocks not reachable from the entry
    pub fn unreachable_blocks(&self) -> Vec<BlockId> {
        let reachable: HashSet<BlockId> = self.reachable_blocks().into_iter().collect();
        self.blocks.iter().map(|block| block.id).filter(|id| !reachable.contains(id)).collect()
    }

    /// Depth-first post-order from the entry, followed by unreachable blocks
    pub fn post_order(&self) -> Vec<BlockId> {
        let mut order = Vec::with_capacity(self.blocks.len());
        let mut visited = vec![false; self.blocks.len()];

        let roots = self.entry_block.into_iter().chain(0..self.blocks.len());
        for root in roots {
            if root >= self.blocks.len() || visited[root] {
                continue;
            }
            // Iterative DFS; each frame keeps the successors still to visit
            visited[root] = true;
            let mut stack: Vec<(BlockId, Vec<BlockId>)> = vec![(root, self.successors_rev(root))];
            while let Some((block_id, pending)) = stack.last_mut() {
                match pending.pop() {
                    Some(next) if !visited[next] => {
                        visited[next] = true;
                        let successors = self.successors_rev(next);
                        stack.push((next, successors));
                    }
                    Some(_) => {}
                    None => {
                        order.push(*block_id);
                        stack.pop();
                    }
                }
            }
        }
        order
    }

    /// Reverse of [`post_order`](Self::post_order)
    pub fn reverse_post_order(&self) -> Vec<BlockId> {
        let mut order = self.post_order();
        order.reverse();
        order
    }

    fn successors_rev(&self, block: BlockId) -> Vec<BlockId> {
        self.blocks[block].successors.iter().rev().copied().collect()
    }

    fn label_of(&self, block: BlockId) -> String {
        self.blocks.get(block).map(|b| b.label.clone()).unwrap_or_else(|| block.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> ControlFlowGraph {
        let mut cfg = ControlFlowGraph::new("diamond");
        let entry = cfg.add_block("entry");
        let left = cfg.add_block("left");
        let right = cfg.add_block("right");
        let exit = cfg.add_block("exit");
        cfg.add_edge(entry, left).unwrap();
        cfg.add_edge(entry, right).unwrap();
        cfg.add_edge(left, exit).unwrap();
        cfg.add_edge(right, exit).unwrap();
        cfg
    }

    #[test]
    fn test_add_edge_is_symmetric() {
        let cfg = diamond();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.block(3).unwrap().predecessors, BTreeSet::from([1, 2]));
        assert_eq!(cfg.entry_block(), Some(0));
        assert_eq!(cfg.exit_blocks(), vec![3]);
    }

    #[test]
    fn test_add_edge_rejects_unknown_block() {
        let mut cfg = diamond();
        assert!(matches!(cfg.add_edge(0, 9), Err(CfgError::UnknownBlock { target: 9, .. })));
    }

    #[test]
    fn test_unreciprocated_successor_detected() {
        let mut a = BasicBlock::new(0, "a");
        let b = BasicBlock::new(1, "b");
        a.successors.insert(1);
        let err = ControlFlowGraph::from_blocks("f", 0, vec![a, b]).unwrap_err();
        assert_eq!(
            err,
            CfgError::UnreciprocatedSuccessor {
                from: "a".to_string(),
                to: "b".to_string()
            }
        );
    }

    #[test]
    fn test_unreciprocated_predecessor_detected() {
        let a = BasicBlock::new(0, "a");
        let mut b = BasicBlock::new(1, "b");
        b.predecessors.insert(0);
        let err = ControlFlowGraph::from_blocks("f", 0, vec![a, b]).unwrap_err();
        assert!(matches!(err, CfgError::UnreciprocatedPredecessor { .. }));
    }

    #[test]
    fn test_duplicate_label_detected() {
        let blocks = vec![BasicBlock::new(0, "bb"), BasicBlock::new(1, "bb")];
        let err = ControlFlowGraph::from_blocks("f", 0, blocks).unwrap_err();
        assert_eq!(err, CfgError::DuplicateLabel { label: "bb".to_string() });
    }

    #[test]
    fn test_bad_entry_detected() {
        let err = ControlFlowGraph::from_blocks("f", 4, vec![BasicBlock::new(0, "a")]).unwrap_err();
        assert!(matches!(err, CfgError::UnknownEntry { entry: 4, .. }));
    }

    #[test]
    fn test_empty_graph_is_valid() {
        let cfg = ControlFlowGraph::from_blocks("empty", 0, Vec::new()).unwrap();
        assert!(cfg.is_empty());
        assert_eq!(cfg.entry_block(), None);
        assert!(cfg.post_order().is_empty());
    }

    #[test]
    fn test_orders() {
        let cfg = diamond();
        let rpo = cfg.reverse_post_order();
        assert_eq!(rpo.first(), Some(&0));
        assert_eq!(rpo.last(), Some(&3));
        assert_eq!(rpo.len(), 4);
        assert_eq!(cfg.post_order().first(), Some(&3));
    }

    #[test]
    fn test_unreachable_blocks_are_ordered_after_reachable_ones() {
        let mut cfg = diamond();
        let orphan = cfg.add_block("orphan");
        assert_eq!(cfg.unreachable_blocks(), vec![orphan]);
        assert_eq!(cfg.post_order().last(), Some(&orphan));
        assert_eq!(cfg.reachable_blocks().len(), 4);
    }

    #[test]
    fn test_loop_back_edge_to_entry_is_valid() {
        let mut cfg = ControlFlowGraph::new("loop");
        let b1 = cfg.add_block("b1");
        let b2 = cfg.add_block("b2");
        cfg.add_edge(b1, b2).unwrap();
        cfg.add_edge(b2, b1).unwrap();
        assert!(cfg.validate().is_ok());
        assert!(cfg.exit_blocks().is_empty());
        assert_eq!(cfg.reverse_post_order(), vec![0, 1]);
    }

    #[test]
    fn test_push_instruction_to_unknown_block_is_rejected() {
        let mut cfg = ControlFlowGraph::new("f");
        let entry = cfg.add_block("entry");
        cfg.push_instruction(entry, Instruction::load("t1", "a")).unwrap();

        let err = cfg.push_instruction(5, Instruction::load("t2", "b")).unwrap_err();
        assert_eq!(
            err,
            CfgError::NoSuchBlock {
                function: "f".to_string(),
                block: 5
            }
        );
        assert_eq!(cfg.block(entry).map(|b| b.instructions.len()), Some(1));
    }
}
