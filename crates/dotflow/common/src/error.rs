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

//! Error types for dataflow analysis

use thiserror::Error;

/// Structural defects found while validating a control flow graph.
///
/// These are reported before any solving begins; an analysis never produces
/// partial results for a graph that fails validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CfgError {
    #[error("Function '{function}' has blocks but no entry block")]
    MissingEntry { function: String },

    #[error("Entry block {entry} does not exist in function '{function}'")]
    UnknownEntry { function: String, entry: usize },

    #[error("Block '{block}' references unknown block {target}")]
    UnknownBlock { block: String, target: usize },

    #[error("Function '{function}' has no block {block}")]
    NoSuchBlock { function: String, block: usize },

    #[error("Block '{from}' lists '{to}' as successor but '{to}' does not list '{from}' as predecessor")]
    UnreciprocatedSuccessor { from: String, to: String },

    #[error("Block '{to}' lists '{from}' as predecessor but '{from}' does not list '{to}' as successor")]
    UnreciprocatedPredecessor { from: String, to: String },

    #[error("Duplicate block label '{label}'")]
    DuplicateLabel { label: String },

    #[error("Block at position {position} carries id {id}")]
    MisnumberedBlock { position: usize, id: usize },
}

/// Errors that can abort a dataflow analysis run
#[derive(Error, Debug)]
pub enum DataflowError {
    #[error("Malformed CFG: {0}")]
    MalformedCfg(#[from] CfgError),

    #[error("{analysis} did not converge within {iterations} rounds; the solver invariants were violated")]
    ConvergenceInvariantViolated { analysis: String, iterations: usize },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DataflowError {
    /// Whether the error points at a bug in the engine rather than bad input
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::ConvergenceInvariantViolated { .. })
    }
}

/// Result type for dataflow operations
pub type DataflowResult<T> = Result<T, DataflowError>;
