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

//! Liveness: backward may-analysis over variable names

use crate::analysis::{DataflowAnalysis, check_inputs};
use crate::cfg::{BlockId, ControlFlowGraph};
use crate::context::LocalSets;
use crate::genkill::VariableGenKill;
use crate::solver::{DataflowProblem, DataflowSolution, Direction, FixedPointSolver, Meet};
use dotflow_common::{AnalysisConfig, DataflowResult};
use std::collections::BTreeSet;
use tracing::debug;

pub const ANALYSIS_NAME: &str = "liveness";

/// Returned for block ids outside the analyzed function
static NO_VARIABLES: BTreeSet<String> = BTreeSet::new();

/// Liveness analyzer
#[derive(Debug, Clone, Default)]
pub struct LivenessAnalysis {
    config: AnalysisConfig,
}

impl LivenessAnalysis {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }
}

impl DataflowAnalysis for LivenessAnalysis {
    type Output = LivenessResult;

    fn name(&self) -> &'static str {
        ANALYSIS_NAME
    }

    fn analyze(&self, cfg: &ControlFlowGraph) -> DataflowResult<LivenessResult> {
        check_inputs(cfg, &self.config)?;

        let local = VariableGenKill::new().build(cfg);
        let variables: BTreeSet<String> = local.generated.iter().chain(local.killed.iter()).flatten().cloned().collect();
        debug!("{}: {} variables across {} blocks", cfg.name, variables.len(), cfg.len());

        let problem = DataflowProblem {
            analysis: ANALYSIS_NAME,
            direction: Direction::Backward,
            meet: Meet::Union,
            local: &local,
            universe: &variables,
            boundary: BTreeSet::new(),
        };
        let solution = FixedPointSolver::new(cfg, problem, self.config.iteration_order, self.config.max_iterations).run()?;

        Ok(LivenessResult {
            function: cfg.name.clone(),
            labels: cfg.blocks().iter().map(|block| block.label.clone()).collect(),
            variables,
            local,
            solution,
        })
    }
}

/// Converged liveness sets of one function
#[derive(Debug, Clone)]
pub struct LivenessResult {
    pub function: String,
    /// Block labels, indexed by block id
    pub labels: Vec<String>,
    /// Every variable name seen in the function
    pub variables: BTreeSet<String>,
    pub local: LocalSets<String>,
    pub solution: DataflowSolution<String>,
}

impl LivenessResult {
    pub fn live_in(&self, block: BlockId) -> &BTreeSet<String> {
        self.solution.in_sets.get(block).unwrap_or(&NO_VARIABLES)
    }

    pub fn live_out(&self, block: BlockId) -> &BTreeSet<String> {
        self.solution.out_sets.get(block).unwrap_or(&NO_VARIABLES)
    }

    pub fn is_live_in(&self, block: BlockId, variable: &str) -> bool {
        self.solution.in_sets.get(block).is_some_and(|set| set.contains(variable))
    }

    pub fn is_live_out(&self, block: BlockId, variable: &str) -> bool {
        self.solution.out_sets.get(block).is_some_and(|set| set.contains(variable))
    }

    /// Upward-exposed uses of the block
    pub fn upward_exposed(&self, block: BlockId) -> &BTreeSet<String> {
        self.local.generated.get(block).unwrap_or(&NO_VARIABLES)
    }

    pub fn defined(&self, block: BlockId) -> &BTreeSet<String> {
        self.local.killed.get(block).unwrap_or(&NO_VARIABLES)
    }

    pub fn block_id(&self, label: &str) -> Option<BlockId> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn rounds(&self) -> usize {
        self.solution.rounds
    }
}
