//! Benchmarks for graph construction, traversal, and path enumeration.
//!
//! The synthetic CFGs mirror the shapes real functions produce: a linear
//! run of fall-through blocks, and a chain of diamonds whose path count
//! doubles per diamond. The diamond chain is where laziness matters - the
//! bounded enumeration benches pull a fixed number of paths out of a graph
//! holding 2^N of them.

extern crate flowtrace;

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use flowtrace::{
    BlockSpec, CfgSource, Direction, Emulator, FunctionGraph, FunctionSpec, PathFinder, Result,
    Strategy,
};

const BLOCK_LEN: u64 = 0x10;

/// CFG source scripted from an edge list, instruction per address.
#[derive(Debug)]
struct BenchCfg {
    start: u64,
    end: u64,
    blocks: Vec<BlockSpec>,
}

impl BenchCfg {
    fn new(bounds: (u64, u64), edges: Vec<(u64, u64, Vec<u64>)>) -> Self {
        let blocks = edges
            .iter()
            .map(|(start, end, successors)| BlockSpec {
                start: *start,
                end: *end,
                predecessors: edges
                    .iter()
                    .filter(|(_, _, succs)| succs.contains(start))
                    .map(|(pred, _, _)| *pred)
                    .collect(),
                successors: successors.clone(),
            })
            .collect();
        Self {
            start: bounds.0,
            end: bounds.1,
            blocks,
        }
    }
}

impl CfgSource for BenchCfg {
    fn function(&self, _address: u64) -> Result<FunctionSpec> {
        Ok(FunctionSpec {
            start: self.start,
            end: self.end,
            blocks: self.blocks.clone(),
        })
    }

    fn instructions(&self, start: u64, end: u64) -> Vec<u64> {
        (start..end).collect()
    }
}

/// Emulator with a trivially cloneable state; replay cost is dominated by
/// the enumeration machinery, which is what these benches measure.
#[derive(Debug)]
struct NopEmulator;

impl Emulator for NopEmulator {
    type State = u64;

    fn initial_state(&self) -> Self::State {
        0
    }

    fn execute(&self, state: &mut Self::State, address: u64) -> Result<()> {
        *state = state.wrapping_add(address);
        Ok(())
    }
}

/// `count` blocks in a straight fall-through line.
fn linear_cfg(count: u64) -> BenchCfg {
    let base = 0x1000;
    let edges = (0..count)
        .map(|i| {
            let start = base + i * BLOCK_LEN;
            let succs = if i + 1 < count {
                vec![start + BLOCK_LEN]
            } else {
                vec![]
            };
            (start, start + BLOCK_LEN, succs)
        })
        .collect();
    BenchCfg::new((base, base + count * BLOCK_LEN), edges)
}

/// `count` diamonds chained head to tail; 2^count paths end to end.
fn diamond_chain_cfg(count: u64) -> BenchCfg {
    let base = 0x1000;
    let mut edges = Vec::new();
    for i in 0..count {
        // Four blocks per diamond: head, left, right, join; the join doubles
        // as the next diamond's head.
        let head = base + i * 3 * BLOCK_LEN;
        let left = head + BLOCK_LEN;
        let right = head + 2 * BLOCK_LEN;
        let join = head + 3 * BLOCK_LEN;
        edges.push((head, head + BLOCK_LEN, vec![left, right]));
        edges.push((left, left + BLOCK_LEN, vec![join]));
        edges.push((right, right + BLOCK_LEN, vec![join]));
    }
    let last = base + count * 3 * BLOCK_LEN;
    edges.push((last, last + BLOCK_LEN, vec![]));
    BenchCfg::new((base, last + BLOCK_LEN), edges)
}

fn bench_graph_build(c: &mut Criterion) {
    let source: Arc<dyn CfgSource> = Arc::new(linear_cfg(256));

    c.bench_function("graph_build_256_blocks", |b| {
        b.iter(|| {
            let graph = FunctionGraph::build(black_box(Arc::clone(&source)), 0x1000).unwrap();
            black_box(graph)
        });
    });
}

fn bench_block_walk(c: &mut Criterion) {
    let source = Arc::new(diamond_chain_cfg(32));
    let graph = FunctionGraph::build(source, 0x1000).unwrap();

    c.bench_function("block_walk_dfs_forward", |b| {
        b.iter(|| {
            let count = graph
                .walk_blocks(Strategy::DepthFirst, Direction::Forward, None)
                .unwrap()
                .count();
            black_box(count)
        });
    });

    c.bench_function("address_walk_dfs_forward", |b| {
        b.iter(|| {
            let sum: u64 = graph
                .walk_addresses(Strategy::DepthFirst, Direction::Forward, None)
                .unwrap()
                .sum();
            black_box(sum)
        });
    });
}

fn bench_path_enumeration(c: &mut Criterion) {
    let source = Arc::new(diamond_chain_cfg(16));
    let graph = FunctionGraph::build(source, 0x1000).unwrap();
    let target = graph.function_end() - 1;

    // Cold: fresh finder per iteration, first 64 of 65536 paths.
    c.bench_function("paths_first_64_of_65536_cold", |b| {
        b.iter(|| {
            let finder = PathFinder::new(&graph, Arc::new(NopEmulator));
            let count = finder.paths_to(target).unwrap().take(64).count();
            black_box(count)
        });
    });

    // Warm: the memo is primed, re-enumeration replays the record.
    c.bench_function("paths_first_64_of_65536_warm", |b| {
        let finder = PathFinder::new(&graph, Arc::new(NopEmulator));
        finder.paths_to(target).unwrap().take(64).count();
        b.iter(|| {
            let count = finder.paths_to(target).unwrap().take(64).count();
            black_box(count)
        });
    });
}

fn bench_state_replay(c: &mut Criterion) {
    let source = Arc::new(linear_cfg(64));
    let graph = FunctionGraph::build(source, 0x1000).unwrap();
    let target = graph.function_end() - 1;

    c.bench_function("state_replay_64_blocks_cold", |b| {
        b.iter(|| {
            let finder = PathFinder::new(&graph, Arc::new(NopEmulator));
            let path = finder.paths_to(target).unwrap().next().unwrap();
            black_box(path.state_at(target).unwrap())
        });
    });
}

criterion_group!(
    benches,
    bench_graph_build,
    bench_block_walk,
    bench_path_enumeration,
    bench_state_replay
);
criterion_main!(benches);
