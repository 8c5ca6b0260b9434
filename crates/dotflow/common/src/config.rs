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

//! Configuration for dataflow analyses and reporting

use crate::error::{DataflowError, DataflowResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable consulted for a configuration file path
pub const CONFIG_ENV_VAR: &str = "DOTFLOW_CONFIG";

/// Default pattern for synthetic temporaries (`%0`, `%1`, `tmp3`, ...)
pub const DEFAULT_TEMPORARY_PATTERN: &str = r"^(\d+|tmp\d*)$";

/// Which expressions a store invalidates in Available Expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KillScope {
    /// Match the stored-to variable against every expression in the function
    #[default]
    Universe,
    /// Match only against expressions generated earlier in the same block
    BlockLocal,
}

/// Order in which the solver visits blocks during a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IterationOrder {
    /// Blocks in the order the front end produced them
    Program,
    /// Reverse post-order for forward problems, post-order for backward ones
    #[default]
    ReversePostOrder,
}

/// Output format of the reporter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Settings that influence the solved sets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Sort the operands of `+` and `*` so `a + b` and `b + a` are one expression
    pub canonicalize_commutative_operands: bool,

    /// Kill rule used by Available Expressions
    pub kill_scope: KillScope,

    /// Hard cap on solver rounds (None derives one from the lattice height)
    pub max_iterations: Option<usize>,

    /// Block visiting order
    pub iteration_order: IterationOrder,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            canonicalize_commutative_operands: true,
            kill_scope: KillScope::Universe,
            max_iterations: None,
            iteration_order: IterationOrder::ReversePostOrder,
        }
    }
}

impl AnalysisConfig {
    /// Configuration that keeps operand order exactly as written
    pub fn order_preserving() -> Self {
        Self {
            canonicalize_commutative_operands: false,
            ..Default::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_iterations == Some(0) {
            return Err("max_iterations must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Settings that only affect how solved sets are rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub format: ReportFormat,

    /// Suppress names matching `temporary_pattern` in variable listings
    pub hide_temporaries: bool,

    pub temporary_pattern: String,

    /// Also print the per-block GEN and KILL sets
    pub include_local_sets: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Text,
            hide_temporaries: false,
            temporary_pattern: DEFAULT_TEMPORARY_PATTERN.to_string(),
            include_local_sets: false,
        }
    }
}

impl ReportConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        regex::Regex::new(&self.temporary_pattern).map_err(|e| format!("Invalid temporary_pattern '{}': {}", self.temporary_pattern, e))?;
        Ok(())
    }
}

/// Top-level configuration file contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DotflowConfig {
    pub analysis: AnalysisConfig,
    pub report: ReportConfig,
}

impl DotflowConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> DataflowResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| DataflowError::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> DataflowResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| DataflowError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> DataflowResult<String> {
        toml::to_string_pretty(self).map_err(|e| DataflowError::Config(e.to_string()))
    }

    /// Pick the configuration from the CLI path, then `$DOTFLOW_CONFIG`, then defaults
    pub fn resolve_config(cli_config: Option<PathBuf>) -> DataflowResult<Self> {
        if let Some(config_path) = cli_config {
            Self::load_from_file(config_path)
        } else if let Ok(env_config) = std::env::var(CONFIG_ENV_VAR) {
            Self::load_from_file(env_config)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate both sections
    pub fn validate(&self) -> DataflowResult<()> {
        self.analysis.validate().map_err(DataflowError::Config)?;
        self.report.validate().map_err(DataflowError::Config)?;
        Ok(())
    }
}
