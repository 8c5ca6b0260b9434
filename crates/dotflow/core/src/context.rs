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

//! Per-run analysis state
//!
//! Everything an analysis accumulates while walking one function lives here
//! and is dropped with the run. Nothing is shared between functions.

use crate::cfg::BlockId;
use crate::expression::Expression;
use crate::resolver::NameResolver;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::warn;

/// Kind of a non-fatal analysis diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum WarningKind {
    /// An expression operand had no name and nothing to resolve it through
    UnresolvedOperand { position: usize },
}

/// Non-fatal diagnostic collected during an analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisWarning {
    pub function: String,
    pub block: String,
    pub instruction_index: usize,
    pub kind: WarningKind,
}

impl fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            WarningKind::UnresolvedOperand { position } => write!(
                f,
                "{}:{}#{}: operand {} is unnamed, using it verbatim",
                self.function, self.block, self.instruction_index, position
            ),
        }
    }
}

/// State owned by a single analysis of a single function
#[derive(Debug, Default)]
pub struct RunContext {
    pub function: String,
    pub resolver: NameResolver,
    /// Every expression generated anywhere in the function
    pub universe: BTreeSet<Expression>,
    pub warnings: Vec<AnalysisWarning>,
}

impl RunContext {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            ..Default::default()
        }
    }

    /// Record and log a degraded-but-continuing condition
    pub fn warn(&mut self, block: &str, instruction_index: usize, kind: WarningKind) {
        let warning = AnalysisWarning {
            function: self.function.clone(),
            block: block.to_string(),
            instruction_index,
            kind,
        };
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Blocks touched by warnings, for quick lookups in reports
    pub fn blocks_with_warnings(&self) -> BTreeSet<&str> {
        self.warnings.iter().map(|w| w.block.as_str()).collect()
    }
}

/// Block-indexed pair of GEN and KILL sets, immutable once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSets<T: Ord> {
    pub generated: Vec<BTreeSet<T>>,
    pub killed: Vec<BTreeSet<T>>,
}

impl<T: Ord> LocalSets<T> {
    pub fn with_blocks(count: usize) -> Self {
        Self {
            generated: (0..count).map(|_| BTreeSet::new()).collect(),
            killed: (0..count).map(|_| BTreeSet::new()).collect(),
        }
    }

    pub fn gen_of(&self, block: BlockId) -> &BTreeSet<T> {
        &self.generated[block]
    }

    pub fn kill_of(&self, block: BlockId) -> &BTreeSet<T> {
        &self.killed[block]
    }

    pub fn len(&self) -> usize {
        self.generated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generated.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_are_collected() {
        let mut ctx = RunContext::new("main");
        ctx.warn("entry", 2, WarningKind::UnresolvedOperand { position: 1 });
        assert_eq!(ctx.warnings.len(), 1);
        assert_eq!(ctx.warnings[0].to_string(), "main:entry#2: operand 1 is unnamed, using it verbatim");
        assert!(ctx.blocks_with_warnings().contains("entry"));
    }

    #[test]
    fn test_local_sets_shape() {
        let sets: LocalSets<String> = LocalSets::with_blocks(3);
        assert_eq!(sets.len(), 3);
        assert!(sets.gen_of(2).is_empty());
        assert!(sets.kill_of(0).is_empty());
    }
}
