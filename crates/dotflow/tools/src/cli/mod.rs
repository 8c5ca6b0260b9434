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

//! Command implementations for the `dotflow` binary

pub mod analyze;
pub mod check;

pub use analyze::{AnalysisArg, AnalyzeArgs, FormatArg, KillScopeArg, OrderArg, run_analyze};
pub use check::{CheckArgs, run_check};

use crate::frontend::{ParseError, parse_module};
use dotflow_core::{ControlFlowGraph, DataflowError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors surfaced by the command-line driver
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Analysis of '{function}' failed: {source}")]
    Analysis {
        function: String,
        #[source]
        source: DataflowError,
    },

    #[error(transparent)]
    Config(#[from] DataflowError),

    #[error("Failed to write report: {0}")]
    Output(#[source] std::io::Error),
}

/// Read and parse every function of a textual IR file
pub fn load_functions(path: &Path) -> Result<Vec<ControlFlowGraph>, DriverError> {
    let source = fs::read_to_string(path).map_err(|source| DriverError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let functions = parse_module(&source).map_err(|source| DriverError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!("loaded {} functions from {}", functions.len(), path.display());
    Ok(functions)
}
