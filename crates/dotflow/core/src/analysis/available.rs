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

//! Available Expressions: forward must-analysis over binary arithmetic
//!
//! An expression is available at a point when every path from the entry
//! computes it and no store to one of its operands follows the last
//! computation. Operand identity is textual: stores kill by variable name,
//! with no aliasing information.

use crate::analysis::{DataflowAnalysis, check_inputs};
use crate::cfg::{BlockId, ControlFlowGraph};
use crate::context::{AnalysisWarning, LocalSets, RunContext};
use crate::expression::Expression;
use crate::genkill::ExpressionGenKill;
use crate::solver::{DataflowProblem, DataflowSolution, Direction, FixedPointSolver, Meet};
use dotflow_common::{AnalysisConfig, DataflowResult};
use std::collections::BTreeSet;

pub const ANALYSIS_NAME: &str = "available-expressions";

/// Returned for block ids outside the analyzed function
static NO_EXPRESSIONS: BTreeSet<Expression> = BTreeSet::new();

/// Available Expressions analyzer
#[derive(Debug, Clone, Default)]
pub struct AvailableExpressions {
    config: AnalysisConfig,
}

impl AvailableExpressions {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }
}

impl DataflowAnalysis for AvailableExpressions {
    type Output = AvailableExpressionsResult;

    fn name(&self) -> &'static str {
        ANALYSIS_NAME
    }

    fn analyze(&self, cfg: &ControlFlowGraph) -> DataflowResult<AvailableExpressionsResult> {
        check_inputs(cfg, &self.config)?;

        let mut ctx = RunContext::new(cfg.name.clone());
        let local = ExpressionGenKill::from_config(&self.config).build(cfg, &mut ctx);

        let problem = DataflowProblem {
            analysis: ANALYSIS_NAME,
            direction: Direction::Forward,
            meet: Meet::Intersection,
            local: &local,
            universe: &ctx.universe,
            boundary: BTreeSet::new(),
        };
        let solution = FixedPointSolver::new(cfg, problem, self.config.iteration_order, self.config.max_iterations).run()?;

        Ok(AvailableExpressionsResult {
            function: ctx.function,
            labels: cfg.blocks().iter().map(|block| block.label.clone()).collect(),
            universe: ctx.universe,
            local,
            solution,
            warnings: ctx.warnings,
        })
    }
}

/// Converged Available Expressions sets of one function
#[derive(Debug, Clone)]
pub struct AvailableExpressionsResult {
    pub function: String,
    /// Block labels, indexed by block id
    pub labels: Vec<String>,
    /// Every expression computed in the function
    pub universe: BTreeSet<Expression>,
    pub local: LocalSets<Expression>,
    pub solution: DataflowSolution<Expression>,
    pub warnings: Vec<AnalysisWarning>,
}

impl AvailableExpressionsResult {
    /// Expressions available on entry to the block
    pub fn available_at_entry(&self, block: BlockId) -> &BTreeSet<Expression> {
        self.solution.in_sets.get(block).unwrap_or(&NO_EXPRESSIONS)
    }

    /// Expressions available on exit from the block
    pub fn available_at_exit(&self, block: BlockId) -> &BTreeSet<Expression> {
        self.solution.out_sets.get(block).unwrap_or(&NO_EXPRESSIONS)
    }

    pub fn generated(&self, block: BlockId) -> &BTreeSet<Expression> {
        self.local.generated.get(block).unwrap_or(&NO_EXPRESSIONS)
    }

    pub fn killed(&self, block: BlockId) -> &BTreeSet<Expression> {
        self.local.killed.get(block).unwrap_or(&NO_EXPRESSIONS)
    }

    pub fn is_available_at_entry(&self, block: BlockId, expression: &Expression) -> bool {
        self.solution.in_sets.get(block).is_some_and(|set| set.contains(expression))
    }

    /// The block computes `expression` although it is already available on entry
    pub fn is_redundant(&self, block: BlockId, expression: &Expression) -> bool {
        self.is_available_at_entry(block, expression) && self.local.generated.get(block).is_some_and(|set| set.contains(expression))
    }

    pub fn block_id(&self, label: &str) -> Option<BlockId> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn rounds(&self) -> usize {
        self.solution.rounds
    }
}
