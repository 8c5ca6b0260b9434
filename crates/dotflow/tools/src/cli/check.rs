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

//! `dotflow check`: parse and validate input without solving

use super::{DriverError, load_functions};
use clap::Args;
use dotflow_core::DataflowError;
use std::io::Write;
use std::path::PathBuf;
use tracing::warn;

/// CLI arguments for the check command
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Textual IR file to check
    pub input: PathBuf,
}

/// Print a one-line summary per function; fails on the first malformed graph
pub fn run_check<W: Write>(args: &CheckArgs, out: &mut W) -> Result<(), DriverError> {
    let functions = load_functions(&args.input)?;

    for cfg in &functions {
        cfg.validate().map_err(|e| DriverError::Analysis {
            function: cfg.name.clone(),
            source: DataflowError::MalformedCfg(e),
        })?;

        let edges: usize = cfg.blocks().iter().map(|block| block.successors.len()).sum();
        let unreachable = cfg.unreachable_blocks();
        for &block in &unreachable {
            warn!("{}: block '{}' is unreachable from the entry", cfg.name, cfg.blocks()[block].label);
        }

        writeln!(
            out,
            "{}: {} blocks, {} edges, {} exits, {} unreachable",
            cfg.name,
            cfg.len(),
            edges,
            cfg.exit_blocks().len(),
            unreachable.len()
        )
        .map_err(DriverError::Output)?;
    }
    Ok(())
}
