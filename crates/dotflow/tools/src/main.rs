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

//! Dotflow CLI Tool
//!
//! Main entry point for the dotflow command-line interface.

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotflow_tools::{AnalyzeArgs, CheckArgs, run_analyze, run_check};
use std::io;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dotflow")]
#[command(about = "Dotflow - Available Expressions and Liveness analysis")]
#[command(version = "0.1.0")]
struct Cli {
    /// Verbose logging (repeat for trace output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run dataflow analyses and print per-block sets
    Analyze(AnalyzeArgs),
    /// Parse and validate input without solving
    Check(CheckArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Commands::Analyze(args) => run_analyze(&args, &mut out)?,
        Commands::Check(args) => run_check(&args, &mut out)?,
    }

    Ok(())
}
