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

//! Load-result to source-variable name resolution
//!
//! Arithmetic in the IR works on temporaries produced by loads. The resolver
//! maps each load result back to the variable it was loaded from so that
//! expressions are keyed by surface variable names. Entries live for the whole
//! function and are never invalidated by later stores.

use std::collections::HashMap;
use tracing::trace;

/// Function-wide table from load results to loaded variables
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
    table: HashMap<String, String>,
}

impl NameResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `result = load source`
    pub fn record_load(&mut self, result: &str, source: &str) {
        trace!("resolver: {} -> {}", result, source);
        self.table.insert(result.to_string(), source.to_string());
    }

    /// Resolve an operand name, falling back to the raw name when nothing was loaded into it
    pub fn resolve<'a>(&'a self, operand: &'a str) -> &'a str {
        self.table.get(operand).map(String::as_str).unwrap_or(operand)
    }

    /// Whether the operand was produced by a recorded load
    pub fn is_resolved(&self, operand: &str) -> bool {
        self.table.contains_key(operand)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_recorded_loads() {
        let mut resolver = NameResolver::new();
        resolver.record_load("t1", "a");
        assert_eq!(resolver.resolve("t1"), "a");
        assert!(resolver.is_resolved("t1"));
    }

    #[test]
    fn test_unknown_names_pass_through() {
        let resolver = NameResolver::new();
        assert_eq!(resolver.resolve("b"), "b");
        assert_eq!(resolver.resolve(""), "");
        assert!(!resolver.is_resolved("b"));
    }

    #[test]
    fn test_later_load_overwrites_entry() {
        let mut resolver = NameResolver::new();
        resolver.record_load("t1", "a");
        resolver.record_load("t1", "b");
        assert_eq!(resolver.resolve("t1"), "b");
        assert_eq!(resolver.len(), 1);
    }
}
