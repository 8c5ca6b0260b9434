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

//! Property tests for the fixed-point solver over randomly generated graphs

use dotflow_core::genkill::{ExpressionGenKill, VariableGenKill};
use dotflow_core::{
    AnalysisConfig, AvailableExpressions, BinaryOp, ControlFlowGraph, DataflowAnalysis, DataflowProblem, Direction, Expression, FixedPointSolver, Instruction,
    IterationOrder, KillScope, LivenessAnalysis, Meet, OperandOrder, RunContext,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

const NAMES: &[&str] = &["a", "b", "c", "x", "t0", "t1", "t2"];
const TEMPORARIES: &[&str] = &["t0", "t1", "t2"];
const OPS: &[BinaryOp] = &[BinaryOp::Add, BinaryOp::Sub, BinaryOp::Mul, BinaryOp::SignedDiv];

fn name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(NAMES)
}

fn instruction() -> impl Strategy<Value = Instruction> {
    prop_oneof![
        (prop::sample::select(TEMPORARIES), name()).prop_map(|(result, source)| Instruction::load(result, source)),
        (name(), name()).prop_map(|(value, destination)| Instruction::store(value, destination)),
        (prop::sample::select(OPS), name(), name(), name()).prop_map(|(op, result, lhs, rhs)| Instruction::binary(op, result, lhs, rhs)),
        (name(), name(), name()).prop_map(|(result, lhs, rhs)| Instruction::compare(result, lhs, rhs)),
    ]
}

prop_compose! {
    fn graph()(size in 1usize..7)(
        bodies in prop::collection::vec(prop::collection::vec(instruction(), 0..6), size),
        edges in prop::collection::vec((0..size, 0..size), 0..size * 2)
    ) -> ControlFlowGraph {
        let mut cfg = ControlFlowGraph::new("random");
        for (index, body) in bodies.into_iter().enumerate() {
            let id = cfg.add_block(format!("b{}", index));
            for inst in body {
                cfg.push_instruction(id, inst).unwrap();
            }
        }
        for (from, to) in edges {
            cfg.add_edge(from, to).unwrap();
        }
        cfg
    }
}

fn is_subset<T: Ord>(small: &[BTreeSet<T>], large: &[BTreeSet<T>]) -> bool {
    small.iter().zip(large).all(|(s, l)| s.is_subset(l))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn available_sets_only_shrink(cfg in graph()) {
        let mut ctx = RunContext::new("random");
        let local = ExpressionGenKill::from_config(&AnalysisConfig::default()).build(&cfg, &mut ctx);
        let problem = DataflowProblem {
            analysis: "available-expressions",
            direction: Direction::Forward,
            meet: Meet::Intersection,
            local: &local,
            universe: &ctx.universe,
            boundary: BTreeSet::new(),
        };
        let mut solver = FixedPointSolver::new(&cfg, problem, IterationOrder::Program, None);

        loop {
            let previous_in = solver.in_sets().to_vec();
            let previous_out = solver.out_sets().to_vec();
            let changed = solver.step();
            prop_assert!(is_subset(solver.in_sets(), &previous_in));
            prop_assert!(is_subset(solver.out_sets(), &previous_out));
            if !changed {
                break;
            }
            prop_assert!(solver.rounds() < 1000);
        }

        // one more round over a converged state changes nothing
        prop_assert!(!solver.step());
    }

    #[test]
    fn live_sets_only_grow(cfg in graph()) {
        let local = VariableGenKill::new().build(&cfg);
        let universe: BTreeSet<String> = local.generated.iter().chain(local.killed.iter()).flatten().cloned().collect();
        let problem = DataflowProblem {
            analysis: "liveness",
            direction: Direction::Backward,
            meet: Meet::Union,
            local: &local,
            universe: &universe,
            boundary: BTreeSet::new(),
        };
        let mut solver = FixedPointSolver::new(&cfg, problem, IterationOrder::ReversePostOrder, None);

        loop {
            let previous_in = solver.in_sets().to_vec();
            let previous_out = solver.out_sets().to_vec();
            let changed = solver.step();
            prop_assert!(is_subset(&previous_in, solver.in_sets()));
            prop_assert!(is_subset(&previous_out, solver.out_sets()));
            if !changed {
                break;
            }
            prop_assert!(solver.rounds() < 1000);
        }
        prop_assert!(!solver.step());
    }

    #[test]
    fn boundary_sets_are_empty(cfg in graph()) {
        let available = AvailableExpressions::default().analyze(&cfg).unwrap();
        prop_assert!(available.available_at_entry(0).is_empty());

        let liveness = LivenessAnalysis::default().analyze(&cfg).unwrap();
        for exit in cfg.exit_blocks() {
            prop_assert!(liveness.live_out(exit).is_empty());
        }
    }

    #[test]
    fn solutions_satisfy_the_dataflow_equations(cfg in graph()) {
        let available = AvailableExpressions::default().analyze(&cfg).unwrap();
        for block in cfg.blocks() {
            let out = available.available_at_exit(block.id);
            let expected: BTreeSet<Expression> = available
                .available_at_entry(block.id)
                .iter()
                .filter(|e| !available.killed(block.id).contains(*e))
                .chain(available.generated(block.id))
                .cloned()
                .collect();
            prop_assert_eq!(out, &expected);
        }

        let liveness = LivenessAnalysis::default().analyze(&cfg).unwrap();
        for block in cfg.blocks() {
            let mut expected_out = BTreeSet::new();
            for &succ in &block.successors {
                expected_out.extend(liveness.live_in(succ).iter().cloned());
            }
            prop_assert_eq!(liveness.live_out(block.id), &expected_out);
        }
    }

    #[test]
    fn killed_expressions_never_survive_a_store(cfg in graph()) {
        let result = AvailableExpressions::default().analyze(&cfg).unwrap();
        for block in cfg.blocks() {
            for inst in &block.instructions {
                let Some(destination) = inst.store_destination() else { continue };
                for expression in result.available_at_exit(block.id) {
                    if expression.uses(destination.name()) {
                        prop_assert!(result.generated(block.id).contains(expression));
                    }
                }
            }
        }
    }

    #[test]
    fn iteration_order_does_not_change_the_solution(cfg in graph()) {
        let program_order = AnalysisConfig { iteration_order: IterationOrder::Program, ..Default::default() };

        let rpo = AvailableExpressions::default().analyze(&cfg).unwrap();
        let program = AvailableExpressions::new(program_order.clone()).analyze(&cfg).unwrap();
        prop_assert_eq!(&rpo.solution.in_sets, &program.solution.in_sets);
        prop_assert_eq!(&rpo.solution.out_sets, &program.solution.out_sets);

        let rpo = LivenessAnalysis::default().analyze(&cfg).unwrap();
        let program = LivenessAnalysis::new(program_order).analyze(&cfg).unwrap();
        prop_assert_eq!(&rpo.solution.in_sets, &program.solution.in_sets);
        prop_assert_eq!(&rpo.solution.out_sets, &program.solution.out_sets);
    }

    #[test]
    fn block_local_kill_never_exceeds_universe_kill(cfg in graph()) {
        let universe = AvailableExpressions::default().analyze(&cfg).unwrap();
        let local = AvailableExpressions::new(AnalysisConfig { kill_scope: KillScope::BlockLocal, ..Default::default() })
            .analyze(&cfg)
            .unwrap();
        for block in cfg.blocks() {
            prop_assert!(local.killed(block.id).is_subset(universe.killed(block.id)));
        }
    }

    #[test]
    fn commutative_operands_canonicalize(op in prop::sample::select(OPS), lhs in "[a-z]{1,4}", rhs in "[a-z]{1,4}") {
        let forward = Expression::new(op, lhs.clone(), rhs.clone(), OperandOrder::Canonical);
        let swapped = Expression::new(op, rhs.clone(), lhs.clone(), OperandOrder::Canonical);
        if op.is_commutative() {
            prop_assert_eq!(forward, swapped);
        } else if lhs != rhs {
            prop_assert_ne!(forward, swapped);
        }
    }
}
