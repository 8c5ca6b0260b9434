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

//! Dotflow Core
//!
//! Classic intraprocedural dataflow analyses over a function's control flow
//! graph: Available Expressions (forward, must) and Liveness (backward, may),
//! both driven by one gen/kill fixed-point solver.
//!
//! Analyses are independent per function and keep all run state in a
//! per-run context, so callers may analyze several functions in parallel.

pub mod analysis;
pub mod cfg;
pub mod context;
pub mod expression;
pub mod genkill;
pub mod report;
pub mod resolver;
pub mod solver;

pub use analysis::{AnalysisKind, AvailableExpressions, AvailableExpressionsResult, DataflowAnalysis, LivenessAnalysis, LivenessResult};
pub use cfg::{BasicBlock, BinaryOp, BlockId, ControlFlowGraph, Instruction, Opcode, Operand};
pub use context::{AnalysisWarning, LocalSets, RunContext, WarningKind};
pub use expression::{Expression, OperandOrder, Term};
pub use report::{BlockReport, FunctionReport, Reporter};
pub use resolver::NameResolver;
pub use solver::{DataflowProblem, DataflowSolution, Direction, FixedPointSolver, Meet};

pub use dotflow_common::{AnalysisConfig, CfgError, DataflowError, DataflowResult, DotflowConfig, IterationOrder, KillScope, ReportConfig, ReportFormat};
