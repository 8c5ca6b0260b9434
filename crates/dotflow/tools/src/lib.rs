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

//! Dotflow Tools Library
//!
//! Command-line driver for the Dotflow analyses: a textual IR front end and
//! the `analyze` and `check` commands.

pub mod cli;
pub mod frontend;

pub use cli::{AnalyzeArgs, CheckArgs, DriverError, run_analyze, run_check};
pub use frontend::{ParseError, ParseErrorKind, parse_module};
