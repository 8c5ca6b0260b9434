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

//! Intraprocedural dataflow analyses

pub mod available;
pub mod liveness;

pub use available::{AvailableExpressions, AvailableExpressionsResult};
pub use liveness::{LivenessAnalysis, LivenessResult};

use crate::cfg::ControlFlowGraph;
use dotflow_common::{AnalysisConfig, DataflowError, DataflowResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The analyses this crate provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisKind {
    AvailableExpressions,
    Liveness,
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisKind::AvailableExpressions => f.write_str(available::ANALYSIS_NAME),
            AnalysisKind::Liveness => f.write_str(liveness::ANALYSIS_NAME),
        }
    }
}

/// Trait for whole-function dataflow analyses
pub trait DataflowAnalysis {
    /// Converged per-block results
    type Output;

    /// Name used in logs and reports
    fn name(&self) -> &'static str;

    /// Analyze one function. Fails only on malformed input or a broken solver invariant.
    fn analyze(&self, cfg: &ControlFlowGraph) -> DataflowResult<Self::Output>;
}

/// Reject bad configuration and malformed graphs before any solving
pub(crate) fn check_inputs(cfg: &ControlFlowGraph, config: &AnalysisConfig) -> DataflowResult<()> {
    config.validate().map_err(DataflowError::Config)?;
    cfg.validate()?;
    Ok(())
}
