//! Shared fixtures for integration tests: a scripted CFG source and an
//! instruction-counting emulator, exercising the crate through its public API
//! only.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use flowtrace::{
    BlockSpec, CfgSource, Emulator, Error, FunctionGraph, FunctionSpec, Result,
};

/// Scripted CFG source for one synthetic function.
///
/// Every address in a block is one instruction (stride 1) unless a stride is
/// given, mirroring how a disassembler would report instruction heads.
#[derive(Debug)]
pub struct ScriptedCfg {
    start: u64,
    end: u64,
    blocks: Vec<BlockSpec>,
    stride: u64,
}

impl ScriptedCfg {
    /// Builds a source from `(start, end, successors)` triples; predecessors
    /// are derived from the successor edges.
    pub fn new(bounds: (u64, u64), blocks: &[(u64, u64, &[u64])]) -> Self {
        Self::with_stride(bounds, blocks, 1)
    }

    pub fn with_stride(bounds: (u64, u64), blocks: &[(u64, u64, &[u64])], stride: u64) -> Self {
        let specs = blocks
            .iter()
            .map(|&(start, end, successors)| BlockSpec {
                start,
                end,
                predecessors: blocks
                    .iter()
                    .filter(|&&(_, _, succs)| succs.contains(&start))
                    .map(|&(pred, _, _)| pred)
                    .collect(),
                successors: successors.to_vec(),
            })
            .collect();

        Self {
            start: bounds.0,
            end: bounds.1,
            blocks: specs,
            stride,
        }
    }

    /// Convenience: build the [`FunctionGraph`] for this source.
    pub fn graph(self) -> FunctionGraph {
        let start = self.start;
        FunctionGraph::build(Arc::new(self), start).expect("fixture graph must build")
    }
}

impl CfgSource for ScriptedCfg {
    fn function(&self, address: u64) -> Result<FunctionSpec> {
        if address < self.start || address >= self.end {
            return Err(Error::AddressOutOfFunction {
                address,
                start: self.start,
                end: self.end,
            });
        }
        Ok(FunctionSpec {
            start: self.start,
            end: self.end,
            blocks: self.blocks.clone(),
        })
    }

    fn instructions(&self, start: u64, end: u64) -> Vec<u64> {
        (start..end)
            .filter(|address| (address - self.start) % self.stride == 0)
            .collect()
    }
}

/// Emulation state recording every executed instruction address in order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Trace {
    pub executed: Vec<u64>,
}

/// Emulator that records execution and counts instruction applications,
/// making incremental replay observable from the outside.
#[derive(Debug, Default)]
pub struct MeterEmulator {
    applied: AtomicUsize,
}

impl MeterEmulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total instruction applications across all replayed states.
    pub fn applied(&self) -> usize {
        self.applied.load(Ordering::SeqCst)
    }
}

impl Emulator for MeterEmulator {
    type State = Trace;

    fn initial_state(&self) -> Self::State {
        Trace::default()
    }

    fn execute(&self, state: &mut Self::State, address: u64) -> Result<()> {
        self.applied.fetch_add(1, Ordering::SeqCst);
        state.executed.push(address);
        Ok(())
    }
}
