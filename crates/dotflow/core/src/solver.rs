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

//! Iterative fixed-point solver for gen/kill dataflow problems
//!
//! A problem is described by its direction, its meet operator, the per-block
//! GEN/KILL sets and the universe of lattice elements. The transfer function
//! is always `GEN ∪ (x − KILL)`.
//!
//! | direction | meet input          | transfer output    | empty meet |
//! |-----------|---------------------|--------------------|------------|
//! | forward   | `IN = ⋀ OUT[pred]`  | `OUT = f(IN)`      | `IN = ∅`   |
//! | backward  | `OUT = ⋀ IN[succ]`  | `IN = f(OUT)`      | `OUT = ∅`  |
//!
//! The entry block (forward) and blocks without successors (backward) are
//! pinned to the boundary value. Every other set starts at the optimistic
//! estimate: the universe under intersection, the empty set under union.
//! Rounds repeat until no IN or OUT set changes.

use crate::cfg::{BlockId, ControlFlowGraph};
use crate::context::LocalSets;
use dotflow_common::{DataflowError, DataflowResult, IterationOrder};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Direction information flows through the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Operator combining facts at control flow merge points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meet {
    /// Must-analysis: a fact holds only if it holds on every path
    Intersection,
    /// May-analysis: a fact holds if it holds on some path
    Union,
}

/// A gen/kill dataflow problem over one function
#[derive(Debug, Clone)]
pub struct DataflowProblem<'a, T: Ord + Clone> {
    /// Analysis name used in logs and errors
    pub analysis: &'static str,
    pub direction: Direction,
    pub meet: Meet,
    pub local: &'a LocalSets<T>,
    /// All lattice elements that can appear in any set
    pub universe: &'a BTreeSet<T>,
    /// Value pinned at the entry (forward) or at exits (backward)
    pub boundary: BTreeSet<T>,
}

impl<T: Ord + Clone> DataflowProblem<'_, T> {
    /// Starting estimate for non-boundary sets
    fn initial_estimate(&self) -> BTreeSet<T> {
        match self.meet {
            Meet::Intersection => self.universe.clone(),
            Meet::Union => BTreeSet::new(),
        }
    }

    /// `GEN[block] ∪ (input − KILL[block])`
    pub fn transfer(&self, block: BlockId, input: &BTreeSet<T>) -> BTreeSet<T> {
        let kill = self.local.kill_of(block);
        let mut output: BTreeSet<T> = input.iter().filter(|item| !kill.contains(item)).cloned().collect();
        output.extend(self.local.gen_of(block).iter().cloned());
        output
    }

    fn meet_all<'s>(&self, mut sets: impl Iterator<Item = &'s BTreeSet<T>>) -> BTreeSet<T>
    where
        T: 's,
    {
        let Some(first) = sets.next() else {
            return BTreeSet::new();
        };
        let mut acc = first.clone();
        for set in sets {
            match self.meet {
                Meet::Intersection => acc.retain(|item| set.contains(item)),
                Meet::Union => acc.extend(set.iter().cloned()),
            }
        }
        acc
    }
}

/// Converged IN/OUT sets, indexed by block id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataflowSolution<T: Ord> {
    pub in_sets: Vec<BTreeSet<T>>,
    pub out_sets: Vec<BTreeSet<T>>,
    /// Rounds run, including the final round that observed no change
    pub rounds: usize,
}

/// Round-based solver. The solver exclusively owns the IN/OUT sets while it runs.
pub struct FixedPointSolver<'a, T: Ord + Clone> {
    cfg: &'a ControlFlowGraph,
    problem: DataflowProblem<'a, T>,
    order: Vec<BlockId>,
    in_sets: Vec<BTreeSet<T>>,
    out_sets: Vec<BTreeSet<T>>,
    rounds: usize,
    max_rounds: usize,
}

impl<'a, T: Ord + Clone> FixedPointSolver<'a, T> {
    /// Set up the initial estimate. Without an explicit cap, one is derived
    /// from the lattice height: each of the 2n sets can change at most
    /// |universe| times before it stops moving.
    pub fn new(cfg: &'a ControlFlowGraph, problem: DataflowProblem<'a, T>, iteration_order: IterationOrder, max_rounds: Option<usize>) -> Self {
        let n = cfg.len();
        let order = match (iteration_order, problem.direction) {
            (IterationOrder::Program, _) => (0..n).collect(),
            (IterationOrder::ReversePostOrder, Direction::Forward) => cfg.reverse_post_order(),
            (IterationOrder::ReversePostOrder, Direction::Backward) => cfg.post_order(),
        };

        let initial = problem.initial_estimate();
        let mut in_sets = vec![initial.clone(); n];
        let mut out_sets = vec![initial; n];

        match problem.direction {
            Direction::Forward => {
                if let Some(entry) = cfg.entry_block() {
                    in_sets[entry] = problem.boundary.clone();
                }
            }
            Direction::Backward => {
                for exit in cfg.exit_blocks() {
                    out_sets[exit] = problem.boundary.clone();
                }
            }
        }

        let max_rounds = max_rounds.unwrap_or_else(|| 2 * n * (problem.universe.len() + 1) + 1);

        Self {
            cfg,
            problem,
            order,
            in_sets,
            out_sets,
            rounds: 0,
            max_rounds,
        }
    }

    /// Run one round over all blocks; returns whether any set changed
    pub fn step(&mut self) -> bool {
        self.rounds += 1;
        let mut changed_blocks = 0;

        for index in 0..self.order.len() {
            let block_id = self.order[index];
            let changed = match self.problem.direction {
                Direction::Forward => self.update_forward(block_id),
                Direction::Backward => self.update_backward(block_id),
            };
            if changed {
                changed_blocks += 1;
            }
        }

        debug!("{} round {}: {} blocks changed", self.problem.analysis, self.rounds, changed_blocks);
        changed_blocks > 0
    }

    /// Iterate until a round changes nothing
    pub fn run(mut self) -> DataflowResult<DataflowSolution<T>> {
        while self.step() {
            if self.rounds >= self.max_rounds {
                return Err(DataflowError::ConvergenceInvariantViolated {
                    analysis: format!("{} on '{}'", self.problem.analysis, self.cfg.name),
                    iterations: self.rounds,
                });
            }
        }

        info!("{} converged on '{}' after {} rounds", self.problem.analysis, self.cfg.name, self.rounds);
        Ok(DataflowSolution {
            in_sets: self.in_sets,
            out_sets: self.out_sets,
            rounds: self.rounds,
        })
    }

    pub fn in_sets(&self) -> &[BTreeSet<T>] {
        &self.in_sets
    }

    pub fn out_sets(&self) -> &[BTreeSet<T>] {
        &self.out_sets
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    fn update_forward(&mut self, block_id: BlockId) -> bool {
        let block = &self.cfg.blocks()[block_id];
        let new_in = if Some(block_id) == self.cfg.entry_block() {
            self.problem.boundary.clone()
        } else {
            self.problem.meet_all(block.predecessors.iter().map(|&pred| &self.out_sets[pred]))
        };
        let new_out = self.problem.transfer(block_id, &new_in);
        self.store(block_id, new_in, new_out)
    }

    fn update_backward(&mut self, block_id: BlockId) -> bool {
        let block = &self.cfg.blocks()[block_id];
        let new_out = if block.is_exit() {
            self.problem.boundary.clone()
        } else {
            self.problem.meet_all(block.successors.iter().map(|&succ| &self.in_sets[succ]))
        };
        let new_in = self.problem.transfer(block_id, &new_out);
        self.store(block_id, new_in, new_out)
    }

    fn store(&mut self, block_id: BlockId, new_in: BTreeSet<T>, new_out: BTreeSet<T>) -> bool {
        let changed = new_in != self.in_sets[block_id] || new_out != self.out_sets[block_id];
        self.in_sets[block_id] = new_in;
        self.out_sets[block_id] = new_out;
        changed
    }
}
