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

//! `dotflow analyze`: run the dataflow analyses and print per-block sets

use super::{DriverError, load_functions};
use clap::{Args, ValueEnum};
use dotflow_core::{
    AnalysisConfig, AvailableExpressions, ControlFlowGraph, DataflowAnalysis, DotflowConfig, FunctionReport, IterationOrder, KillScope, LivenessAnalysis,
    ReportFormat, Reporter,
};
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, info_span, warn};

/// CLI arguments for the analyze command
#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Textual IR file to analyze
    pub input: PathBuf,

    /// Which analysis to run
    #[arg(short, long, value_enum, default_value = "all")]
    pub analysis: AnalysisArg,

    /// Report format (overrides the config file)
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Path to configuration file (TOML, overrides $DOTFLOW_CONFIG)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Hide compiler temporaries in variable listings
    #[arg(long)]
    pub hide_temporaries: bool,

    /// Also print per-block GEN and KILL sets
    #[arg(long)]
    pub local_sets: bool,

    /// Keep commutative operands in written order
    #[arg(long)]
    pub no_canonicalize: bool,

    /// Which expressions a store kills
    #[arg(long, value_enum)]
    pub kill_scope: Option<KillScopeArg>,

    /// Hard cap on solver rounds
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Block visiting order
    #[arg(long, value_enum)]
    pub order: Option<OrderArg>,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Analysis selection for CLI
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AnalysisArg {
    Available,
    Liveness,
    All,
}

impl AnalysisArg {
    fn runs_available(self) -> bool {
        matches!(self, AnalysisArg::Available | AnalysisArg::All)
    }

    fn runs_liveness(self) -> bool {
        matches!(self, AnalysisArg::Liveness | AnalysisArg::All)
    }
}

/// Report format selection for CLI
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

/// Kill scope selection for CLI
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum KillScopeArg {
    Universe,
    BlockLocal,
}

impl From<KillScopeArg> for KillScope {
    fn from(scope: KillScopeArg) -> Self {
        match scope {
            KillScopeArg::Universe => KillScope::Universe,
            KillScopeArg::BlockLocal => KillScope::BlockLocal,
        }
    }
}

/// Iteration order selection for CLI
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OrderArg {
    Program,
    Rpo,
}

impl From<OrderArg> for IterationOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Program => IterationOrder::Program,
            OrderArg::Rpo => IterationOrder::ReversePostOrder,
        }
    }
}

impl AnalyzeArgs {
    /// Layer command-line flags over the resolved configuration file
    pub fn effective_config(&self) -> Result<DotflowConfig, DriverError> {
        let mut config = DotflowConfig::resolve_config(self.config.clone())?;

        if let Some(format) = self.format {
            config.report.format = format.into();
        }
        if self.hide_temporaries {
            config.report.hide_temporaries = true;
        }
        if self.local_sets {
            config.report.include_local_sets = true;
        }
        if self.no_canonicalize {
            config.analysis.canonicalize_commutative_operands = false;
        }
        if let Some(scope) = self.kill_scope {
            config.analysis.kill_scope = scope.into();
        }
        if let Some(max_iterations) = self.max_iterations {
            config.analysis.max_iterations = Some(max_iterations);
        }
        if let Some(order) = self.order {
            config.analysis.iteration_order = order.into();
        }

        config.validate()?;
        Ok(config)
    }
}

/// Analyze every function of the input, writing reports to `out` unless
/// `--output` names a file
pub fn run_analyze<W: Write>(args: &AnalyzeArgs, out: &mut W) -> Result<(), DriverError> {
    let config = args.effective_config()?;
    let reporter = Reporter::new(config.report.clone())?;
    let functions = load_functions(&args.input)?;

    // Functions are independent; results are gathered back in input order
    let reports: Vec<Vec<FunctionReport>> = functions
        .par_iter()
        .map(|cfg| analyze_function(cfg, args.analysis, &config.analysis, &reporter))
        .collect::<Result<_, _>>()?;
    let reports: Vec<FunctionReport> = reports.into_iter().flatten().collect();

    match &args.output {
        Some(path) => {
            let file = File::create(path).map_err(DriverError::Output)?;
            let mut writer = BufWriter::new(file);
            reporter.write(&reports, &mut writer).map_err(DriverError::Output)?;
            writer.flush().map_err(DriverError::Output)
        }
        None => reporter.write(&reports, out).map_err(DriverError::Output),
    }
}

fn analyze_function(cfg: &ControlFlowGraph, selection: AnalysisArg, config: &AnalysisConfig, reporter: &Reporter) -> Result<Vec<FunctionReport>, DriverError> {
    let span = info_span!("function", name = %cfg.name);
    let _enter = span.enter();

    let failed = |source| DriverError::Analysis {
        function: cfg.name.clone(),
        source,
    };

    let unreachable = cfg.unreachable_blocks();
    if !unreachable.is_empty() {
        warn!("{} blocks unreachable from the entry of '{}'", unreachable.len(), cfg.name);
    }

    let mut reports = Vec::new();
    if selection.runs_available() {
        let analysis = AvailableExpressions::new(config.clone());
        debug!("running {}", analysis.name());
        let result = analysis.analyze(cfg).map_err(failed)?;
        reports.push(reporter.available_report(&result));
    }
    if selection.runs_liveness() {
        let analysis = LivenessAnalysis::new(config.clone());
        debug!("running {}", analysis.name());
        let result = analysis.analyze(cfg).map_err(failed)?;
        reports.push(reporter.liveness_report(&result));
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const PROGRAM: &str = "
function f
block entry -> exit
  %1 = load a
  %2 = load b
  %3 = add %1, %2
  store %3, x
block exit
  %4 = load b
  %5 = load a
  %6 = add %4, %5
  store %6, y

function g
block only
  %1 = load a
  %2 = sub %1, 1
";

    fn args(input: PathBuf) -> AnalyzeArgs {
        AnalyzeArgs {
            input,
            analysis: AnalysisArg::All,
            format: None,
            config: None,
            hide_temporaries: false,
            local_sets: false,
            no_canonicalize: false,
            kill_scope: None,
            max_iterations: None,
            order: None,
            output: None,
        }
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("dotflow.toml");
        fs::write(&config_path, "[analysis]\nkill_scope = \"block_local\"\n\n[report]\nformat = \"json\"\n").unwrap();

        let mut args = args(dir.path().join("unused.ir"));
        args.config = Some(config_path);
        args.format = Some(FormatArg::Text);
        args.no_canonicalize = true;

        let config = args.effective_config().unwrap();
        assert_eq!(config.analysis.kill_scope, KillScope::BlockLocal);
        assert_eq!(config.report.format, ReportFormat::Text);
        assert!(!config.analysis.canonicalize_commutative_operands);
    }

    #[test]
    fn test_zero_iteration_cap_rejected() {
        let dir = tempdir().unwrap();
        let mut args = args(dir.path().join("unused.ir"));
        args.config = Some(dir.path().join("missing.toml"));
        assert!(matches!(args.effective_config(), Err(DriverError::Config(_))));

        args.config = None;
        args.max_iterations = Some(0);
        // only fails when no $DOTFLOW_CONFIG points somewhere unreadable
        if std::env::var(dotflow_common::config::CONFIG_ENV_VAR).is_err() {
            assert!(matches!(args.effective_config(), Err(DriverError::Config(_))));
        }
    }

    #[test]
    fn test_reports_every_function_in_input_order() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("program.ir");
        fs::write(&input, PROGRAM).unwrap();

        let mut out = Vec::new();
        run_analyze(&args(input), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let f_available = text.find("available-expressions analysis: f").unwrap();
        let f_liveness = text.find("liveness analysis: f").unwrap();
        let g_available = text.find("available-expressions analysis: g").unwrap();
        assert!(f_available < f_liveness && f_liveness < g_available);
        assert!(text.contains("exit IN : a + b\n"));
        assert!(text.contains("only OUT : a - 1\n"));
        assert!(!text.contains("warning:"));
    }

    #[test]
    fn test_output_file_and_json() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("program.ir");
        let output = dir.path().join("report.json");
        fs::write(&input, PROGRAM).unwrap();

        let mut args = args(input);
        args.analysis = AnalysisArg::Liveness;
        args.format = Some(FormatArg::Json);
        args.output = Some(output.clone());

        let mut out = Vec::new();
        run_analyze(&args, &mut out).unwrap();
        assert!(out.is_empty());

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 2);
        assert_eq!(json[0]["analysis"], "liveness");
        assert_eq!(json[1]["function"], "g");
    }

    #[test]
    fn test_parse_errors_name_the_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("broken.ir");
        fs::write(&input, "function f\nblock a -> b\n").unwrap();

        let err = run_analyze(&args(input), &mut Vec::new()).unwrap_err();
        assert!(matches!(err, DriverError::Parse { .. }));
        assert!(err.to_string().contains("broken.ir"));
        assert!(err.to_string().contains("line 2"));
    }
}
