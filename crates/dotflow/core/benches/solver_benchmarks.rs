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

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use dotflow_core::{AvailableExpressions, BinaryOp, ControlFlowGraph, DataflowAnalysis, Instruction, LivenessAnalysis};

/// A chain of loops: each block loads two variables, combines them and
/// stores the result, then branches forward and back to its predecessor.
fn loop_chain(blocks: usize) -> ControlFlowGraph {
    let mut cfg = ControlFlowGraph::new(format!("chain_{}", blocks));
    for i in 0..blocks {
        let id = cfg.add_block(format!("b{}", i));
        let a = format!("v{}", i % 7);
        let b = format!("v{}", (i * 3 + 1) % 7);
        let (t1, t2, t3) = (format!("t{}a", i), format!("t{}b", i), format!("t{}c", i));
        cfg.push_instruction(id, Instruction::load(&t1, &a)).unwrap();
        cfg.push_instruction(id, Instruction::load(&t2, &b)).unwrap();
        cfg.push_instruction(id, Instruction::binary(if i % 2 == 0 { BinaryOp::Add } else { BinaryOp::Mul }, &t3, &t1, &t2)).unwrap();
        cfg.push_instruction(id, Instruction::store(&t3, &format!("v{}", (i + 2) % 7))).unwrap();
    }
    for i in 1..blocks {
        let _ = cfg.add_edge(i - 1, i);
        if i % 3 == 0 {
            let _ = cfg.add_edge(i, i - 2);
        }
    }
    cfg
}

fn benchmark_available_expressions(c: &mut Criterion) {
    let mut group = c.benchmark_group("available_expressions");
    for size in [16, 128, 1024] {
        let cfg = loop_chain(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &cfg, |b, cfg| {
            let analysis = AvailableExpressions::default();
            b.iter(|| analysis.analyze(black_box(cfg)))
        });
    }
    group.finish();
}

fn benchmark_liveness(c: &mut Criterion) {
    let mut group = c.benchmark_group("liveness");
    for size in [16, 128, 1024] {
        let cfg = loop_chain(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &cfg, |b, cfg| {
            let analysis = LivenessAnalysis::default();
            b.iter(|| analysis.analyze(black_box(cfg)))
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_available_expressions, benchmark_liveness);
criterion_main!(benches);
