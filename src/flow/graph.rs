//! Function graph implementation.
//!
//! This module provides [`FunctionGraph`], the control-flow graph of one
//! analyzed function. The graph is built once from a
//! [`CfgSource`](crate::flow::CfgSource) and is read-only afterwards; all
//! traversal and path enumeration operate on it without mutation.

use std::sync::Arc;

use crate::{
    flow::{
        traversal::{AddressWalk, BlockWalk, Direction, Strategy},
        Block, CfgSource,
    },
    Error, Result,
};

/// The control-flow graph of one analyzed function.
///
/// Holds the function's basic blocks in the order the [`CfgSource`] reported
/// them (index 0 is the entry block) together with the function's address
/// bounds. Blocks are standalone value types copied out of the source at build
/// time; the source itself is retained only so instruction addresses can be
/// enumerated lazily during traversal and state replay.
///
/// # Construction
///
/// ```rust,ignore
/// let source: Arc<dyn CfgSource> = Arc::new(MyDisassembler::open("sample.bin")?);
/// let graph = FunctionGraph::build(source, 0x401000)?;
/// assert_eq!(graph.entry().start(), 0x401000);
/// ```
///
/// # Invariants
///
/// Enforced at build time, relied upon everywhere else:
///
/// - at least one block exists (the entry),
/// - every block range is non-empty and lies within the function bounds,
/// - block ranges never overlap,
/// - every predecessor/successor edge references a block of this graph.
#[derive(Debug)]
pub struct FunctionGraph {
    /// Instruction-address oracle, shared with the embedding application.
    source: Arc<dyn CfgSource>,
    /// Blocks in source order; index 0 is the entry block.
    blocks: Vec<Block>,
    /// `(start, index into blocks)` sorted ascending by start, for lookups.
    by_start: Vec<(u64, usize)>,
    /// Address of the function's first instruction.
    function_start: u64,
    /// Exclusive end address of the function.
    function_end: u64,
}

impl FunctionGraph {
    /// Builds the graph of the function containing `function` from `source`.
    ///
    /// The source's block layout is copied into owned [`Block`] values and
    /// validated; the source handle is retained for lazy instruction
    /// enumeration.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyGraph`] if the source reports no blocks.
    /// - [`Error::Graph`] if a block range is empty or inverted, lies outside
    ///   the function bounds, overlaps another block, or an edge references a
    ///   start address no block has.
    /// - Any error of [`CfgSource::function`], unchanged.
    pub fn build(source: Arc<dyn CfgSource>, function: u64) -> Result<Self> {
        let spec = source.function(function)?;
        if spec.blocks.is_empty() {
            return Err(Error::EmptyGraph);
        }

        let blocks: Vec<Block> = spec
            .blocks
            .into_iter()
            .map(|b| Block::new(b.start, b.end, b.predecessors, b.successors))
            .collect();

        for block in &blocks {
            if block.start() >= block.end() {
                return Err(Error::Graph(format!(
                    "Block 0x{:X}..0x{:X} has an empty or inverted range",
                    block.start(),
                    block.end()
                )));
            }
            if block.start() < spec.start || block.end() > spec.end {
                return Err(Error::Graph(format!(
                    "Block 0x{:X}..0x{:X} lies outside function 0x{:X}..0x{:X}",
                    block.start(),
                    block.end(),
                    spec.start,
                    spec.end
                )));
            }
        }

        let mut by_start: Vec<(u64, usize)> = blocks
            .iter()
            .enumerate()
            .map(|(idx, b)| (b.start(), idx))
            .collect();
        by_start.sort_unstable_by_key(|&(start, _)| start);

        for pair in by_start.windows(2) {
            let earlier = &blocks[pair[0].1];
            let later = &blocks[pair[1].1];
            if earlier.end() > later.start() {
                return Err(Error::Graph(format!(
                    "Blocks 0x{:X}..0x{:X} and 0x{:X}..0x{:X} overlap",
                    earlier.start(),
                    earlier.end(),
                    later.start(),
                    later.end()
                )));
            }
        }

        let graph = Self {
            source,
            blocks,
            by_start,
            function_start: spec.start,
            function_end: spec.end,
        };

        for block in &graph.blocks {
            for &edge in block.predecessors().iter().chain(block.successors()) {
                if graph.block_at(edge).is_none() {
                    return Err(Error::Graph(format!(
                        "Block 0x{:X} has an edge to 0x{edge:X}, which is not a block start",
                        block.start()
                    )));
                }
            }
        }

        Ok(graph)
    }

    /// Returns the entry block.
    ///
    /// The entry block contains the function's first instruction and is the
    /// root of every path this crate enumerates.
    #[must_use]
    pub fn entry(&self) -> &Block {
        &self.blocks[0]
    }

    /// Returns the address of the function's first instruction.
    #[must_use]
    pub const fn function_start(&self) -> u64 {
        self.function_start
    }

    /// Returns the exclusive end address of the function.
    #[must_use]
    pub const fn function_end(&self) -> u64 {
        self.function_end
    }

    /// Returns `true` if `address` lies within the function's bounds.
    ///
    /// Gaps between blocks count as inside the function; use
    /// [`block_containing`](Self::block_containing) to test for code.
    #[must_use]
    pub const fn contains(&self, address: u64) -> bool {
        self.function_start <= address && address < self.function_end
    }

    /// Returns the number of blocks in the graph.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Returns the blocks in source order (entry first).
    pub fn blocks(&self) -> impl Iterator<Item = &Block> + '_ {
        self.blocks.iter()
    }

    /// Returns the block starting exactly at `start`, if any.
    #[must_use]
    pub fn block_at(&self, start: u64) -> Option<&Block> {
        let idx = self
            .by_start
            .binary_search_by_key(&start, |&(s, _)| s)
            .ok()?;
        Some(&self.blocks[self.by_start[idx].1])
    }

    /// Returns the block whose range contains `address`, if any.
    ///
    /// Binary search over the non-overlapping, start-sorted ranges.
    #[must_use]
    pub fn block_containing(&self, address: u64) -> Option<&Block> {
        let candidates = self.by_start.partition_point(|&(s, _)| s <= address);
        if candidates == 0 {
            return None;
        }
        let block = &self.blocks[self.by_start[candidates - 1].1];
        block.contains(address).then_some(block)
    }

    /// Resolves `block`'s predecessor edges to blocks of this graph.
    ///
    /// Yields them in the order the CFG source reported the edges.
    pub fn predecessors<'g>(&'g self, block: &Block) -> impl Iterator<Item = &'g Block> + 'g {
        block
            .predecessors()
            .to_vec()
            .into_iter()
            .filter_map(|start| self.block_at(start))
    }

    /// Resolves `block`'s successor edges to blocks of this graph.
    ///
    /// Yields them in the order the CFG source reported the edges.
    pub fn successors<'g>(&'g self, block: &Block) -> impl Iterator<Item = &'g Block> + 'g {
        block
            .successors()
            .to_vec()
            .into_iter()
            .filter_map(|start| self.block_at(start))
    }

    /// Returns the instruction addresses beginning in `[start, end)`, ascending.
    ///
    /// Delegates to the [`CfgSource`]; the range must lie within one block.
    #[must_use]
    pub fn instructions(&self, start: u64, end: u64) -> Vec<u64> {
        self.source.instructions(start, end)
    }

    /// Returns the address of the instruction following `address`, or `limit`
    /// if `address` belongs to the last instruction before `limit`.
    #[must_use]
    pub fn instruction_after(&self, address: u64, limit: u64) -> u64 {
        self.source
            .instructions(address, limit)
            .into_iter()
            .find(|&a| a > address)
            .unwrap_or(limit)
    }

    /// Starts a lazy block traversal of this graph.
    ///
    /// See [`BlockWalk`] for the exact ordering semantics of each
    /// strategy/direction combination, including the positional
    /// cycle-suppression rule reverse walks use instead of a visited set.
    ///
    /// # Arguments
    ///
    /// * `strategy` - Depth-first or breadth-first ordering
    /// * `direction` - Follow successor or predecessor edges
    /// * `start` - Optional address to begin at. Forward walks still seed at
    ///   the entry but suppress output until the block containing `start` is
    ///   reached; reverse walks seed at that block directly. Without a start,
    ///   forward walks yield from the entry and reverse walks seed at the
    ///   block with the greatest start address.
    ///
    /// # Errors
    ///
    /// [`Error::AddressOutOfFunction`] if `start` is given but no block
    /// contains it.
    pub fn walk_blocks(
        &self,
        strategy: Strategy,
        direction: Direction,
        start: Option<u64>,
    ) -> Result<BlockWalk<'_>> {
        BlockWalk::new(self, strategy, direction, start)
    }

    /// Starts a lazy instruction-address traversal of this graph.
    ///
    /// Yields, for every block a [`walk_blocks`](Self::walk_blocks) with the
    /// same arguments would visit, the instruction addresses of that block in
    /// natural order (forward) or reversed (reverse). On the first block a
    /// given `start` truncates the range: forward walks begin at `start`
    /// itself, reverse walks begin at the instruction before it.
    ///
    /// # Errors
    ///
    /// [`Error::AddressOutOfFunction`] if `start` is given but no block
    /// contains it.
    pub fn walk_addresses(
        &self,
        strategy: Strategy,
        direction: Direction,
        start: Option<u64>,
    ) -> Result<AddressWalk<'_>> {
        AddressWalk::new(self, strategy, direction, start)
    }
}
