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

//! Read-only rendering of converged analysis results
//!
//! Sets are emitted sorted. The temporary-name filter only affects what is
//! printed, never the solved sets themselves.

use crate::analysis::{AnalysisKind, AvailableExpressionsResult, LivenessResult};
use dotflow_common::{DataflowError, DataflowResult, ReportConfig, ReportFormat};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::io::{self, Write};

/// Sets of one block, already rendered to strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockReport {
    pub block: String,
    #[serde(rename = "gen", skip_serializing_if = "Option::is_none")]
    pub generated: Option<Vec<String>>,
    #[serde(rename = "kill", skip_serializing_if = "Option::is_none")]
    pub killed: Option<Vec<String>>,
    #[serde(rename = "in")]
    pub in_set: Vec<String>,
    #[serde(rename = "out")]
    pub out_set: Vec<String>,
}

/// Report for one analysis of one function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionReport {
    pub function: String,
    pub analysis: AnalysisKind,
    pub rounds: usize,
    pub blocks: Vec<BlockReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Renders analysis results as text or JSON
#[derive(Debug, Clone)]
pub struct Reporter {
    config: ReportConfig,
    temporaries: Option<Regex>,
}

impl Reporter {
    pub fn new(config: ReportConfig) -> DataflowResult<Self> {
        let temporaries = if config.hide_temporaries {
            Some(Regex::new(&config.temporary_pattern).map_err(|e| DataflowError::Config(format!("Invalid temporary_pattern: {}", e)))?)
        } else {
            None
        };
        Ok(Self { config, temporaries })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Whether a variable name is shown
    pub fn is_visible(&self, name: &str) -> bool {
        self.temporaries.as_ref().is_none_or(|pattern| !pattern.is_match(name))
    }

    pub fn available_report(&self, result: &AvailableExpressionsResult) -> FunctionReport {
        let blocks = result
            .labels
            .iter()
            .enumerate()
            .map(|(id, label)| BlockReport {
                block: label.clone(),
                generated: Some(render(result.generated(id))),
                killed: self.config.include_local_sets.then(|| render(result.killed(id))),
                in_set: render(result.available_at_entry(id)),
                out_set: render(result.available_at_exit(id)),
            })
            .collect();

        FunctionReport {
            function: result.function.clone(),
            analysis: AnalysisKind::AvailableExpressions,
            rounds: result.rounds(),
            blocks,
            warnings: result.warnings.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn liveness_report(&self, result: &LivenessResult) -> FunctionReport {
        let blocks = result
            .labels
            .iter()
            .enumerate()
            .map(|(id, label)| BlockReport {
                block: label.clone(),
                generated: self.config.include_local_sets.then(|| self.render_names(result.upward_exposed(id))),
                killed: self.config.include_local_sets.then(|| self.render_names(result.defined(id))),
                in_set: self.render_names(result.live_in(id)),
                out_set: self.render_names(result.live_out(id)),
            })
            .collect();

        FunctionReport {
            function: result.function.clone(),
            analysis: AnalysisKind::Liveness,
            rounds: result.rounds(),
            blocks,
            warnings: Vec::new(),
        }
    }

    /// Write reports in the configured format
    pub fn write<W: Write>(&self, reports: &[FunctionReport], out: &mut W) -> io::Result<()> {
        match self.config.format {
            ReportFormat::Text => {
                for report in reports {
                    self.write_text(report, out)?;
                }
                Ok(())
            }
            ReportFormat::Json => self.write_json(reports, out),
        }
    }

    pub fn write_text<W: Write>(&self, report: &FunctionReport, out: &mut W) -> io::Result<()> {
        writeln!(out, "{} analysis: {} ({} rounds)", report.analysis, report.function, report.rounds)?;
        let separator = match report.analysis {
            AnalysisKind::AvailableExpressions => ", ",
            AnalysisKind::Liveness => " ",
        };

        for block in &report.blocks {
            if let Some(generated) = &block.generated {
                writeln!(out, "{} GEN : {}", block.block, generated.join(separator))?;
            }
            if let Some(killed) = &block.killed {
                writeln!(out, "{} KILL : {}", block.block, killed.join(separator))?;
            }
            writeln!(out, "{} IN : {}", block.block, block.in_set.join(separator))?;
            writeln!(out, "{} OUT : {}", block.block, block.out_set.join(separator))?;
            writeln!(out)?;
        }

        for warning in &report.warnings {
            writeln!(out, "warning: {}", warning)?;
        }
        Ok(())
    }

    pub fn write_json<W: Write>(&self, reports: &[FunctionReport], out: &mut W) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, reports).map_err(io::Error::from)?;
        writeln!(out)
    }

    fn render_names(&self, names: &BTreeSet<String>) -> Vec<String> {
        names.iter().filter(|name| self.is_visible(name)).cloned().collect()
    }
}

fn render<T: Display>(items: &BTreeSet<T>) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}
