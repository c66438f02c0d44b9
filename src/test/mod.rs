//! Shared functionality which is used in unit-tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    emulation::Emulator,
    flow::{BlockSpec, CfgSource, FunctionSpec},
    Error, Result,
};

/// In-memory CFG source describing one synthetic function.
///
/// Blocks are given as `(start, end, successors)`; predecessor edges are
/// derived. Instruction addresses are generated at a fixed stride from the
/// function start, so tests control exactly which addresses replay.
#[derive(Debug)]
pub(crate) struct SyntheticCfg {
    start: u64,
    end: u64,
    blocks: Vec<BlockSpec>,
    stride: u64,
}

impl SyntheticCfg {
    /// One instruction per address.
    pub(crate) fn from_edges(bounds: (u64, u64), blocks: &[(u64, u64, &[u64])]) -> Self {
        Self::with_stride(bounds, blocks, 1)
    }

    pub(crate) fn with_stride(
        bounds: (u64, u64),
        blocks: &[(u64, u64, &[u64])],
        stride: u64,
    ) -> Self {
        let specs: Vec<BlockSpec> = blocks
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
}

impl CfgSource for SyntheticCfg {
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

/// Emulation state recording every executed instruction address.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct TraceState {
    pub(crate) trace: Vec<u64>,
}

/// Test double emulator counting instruction applications.
///
/// The counter makes incremental replay observable: a cache-respecting query
/// applies exactly the instructions not yet replayed. Optionally fails at one
/// address to exercise error propagation.
#[derive(Debug, Default)]
pub(crate) struct CountingEmulator {
    applied: AtomicUsize,
    fail_at: Option<u64>,
}

impl CountingEmulator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing_at(address: u64) -> Self {
        Self {
            applied: AtomicUsize::new(0),
            fail_at: Some(address),
        }
    }

    /// Total instruction applications across all states.
    pub(crate) fn applied(&self) -> usize {
        self.applied.load(Ordering::SeqCst)
    }
}

impl Emulator for CountingEmulator {
    type State = TraceState;

    fn initial_state(&self) -> Self::State {
        TraceState::default()
    }

    fn execute(&self, state: &mut Self::State, address: u64) -> Result<()> {
        if self.fail_at == Some(address) {
            return Err(Error::UnresolvedInstruction {
                address,
                message: "synthetic decode failure".to_string(),
            });
        }
        self.applied.fetch_add(1, Ordering::SeqCst);
        state.trace.push(address);
        Ok(())
    }
}
