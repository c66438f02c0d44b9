//! Lazy block and instruction-address traversals.
//!
//! This module provides the four traversal orderings over a
//! [`FunctionGraph`]: depth-first and breadth-first, each forward (following
//! successor edges from the entry) or reverse (following predecessor edges
//! back toward the entry). [`BlockWalk`] yields blocks; [`AddressWalk`] wraps
//! it and yields the instruction addresses inside each visited block.
//!
//! Both iterators are lazy: a caller that stops consuming pays nothing for the
//! rest of the traversal.
//!
//! # Reverse traversal and cycles
//!
//! Forward walks carry a visited set and yield every reachable block exactly
//! once. Reverse walks instead rely on a positional rule: a predecessor edge
//! is only followed when the predecessor's start address is strictly less than
//! the current block's. This guarantees termination on looping control flow
//! without tracking visited blocks, but it is an approximation: a legitimate
//! back-edge whose source lexically precedes its loop header is
//! indistinguishable from ordinary fall-through and will be followed, while
//! blocks reachable along several forward paths can be yielded more than once.
//! The rule is kept as-is for compatibility with the path enumeration in
//! [`paths`](crate::paths), which prunes loops the same way.

use std::collections::{HashSet, VecDeque};

use strum::Display;

use crate::{
    flow::{Block, FunctionGraph},
    Error, Result,
};

/// Ordering discipline of a traversal.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Exhaust one branch before starting the next.
    DepthFirst,
    /// Visit all blocks at one edge distance before the next.
    BreadthFirst,
}

/// Edge direction of a traversal.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Follow successor edges from the function entry.
    Forward,
    /// Follow predecessor edges back toward the function entry.
    Reverse,
}

/// Lazy iterator over the blocks of a [`FunctionGraph`].
///
/// Created by [`FunctionGraph::walk_blocks`]. Forward walks seed at the entry
/// block, visit successors in ascending start order, and skip blocks already
/// visited; when a start address was supplied, output is suppressed until the
/// block containing it is first reached, after which every subsequently
/// visited block is yielded (this resumes iteration mid-function). Reverse
/// walks seed at the block containing the start address (or the block with the
/// greatest start address when none is given), visit predecessors in
/// descending start order, and apply the positional cycle rule described in
/// the [module documentation](self) instead of a visited set.
///
/// # Examples
///
/// ```rust,ignore
/// for block in graph.walk_blocks(Strategy::DepthFirst, Direction::Forward, None)? {
///     println!("0x{:X}..0x{:X}", block.start(), block.end());
/// }
/// ```
#[derive(Debug)]
pub struct BlockWalk<'g> {
    graph: &'g FunctionGraph,
    strategy: Strategy,
    direction: Direction,
    /// Block starts still to be processed; may contain duplicates, resolved
    /// at pop time.
    worklist: VecDeque<u64>,
    /// Starts already yielded; forward walks only.
    visited: HashSet<u64>,
    /// Forward walks: whether the block containing the requested start
    /// address has been reached yet.
    emitting: bool,
    start: Option<u64>,
}

impl<'g> BlockWalk<'g> {
    pub(crate) fn new(
        graph: &'g FunctionGraph,
        strategy: Strategy,
        direction: Direction,
        start: Option<u64>,
    ) -> Result<Self> {
        let start_block = match start {
            Some(address) => Some(
                graph
                    .block_containing(address)
                    .ok_or(Error::AddressOutOfFunction {
                        address,
                        start: graph.function_start(),
                        end: graph.function_end(),
                    })?
                    .start(),
            ),
            None => None,
        };

        let seed = match direction {
            Direction::Forward => graph.entry().start(),
            Direction::Reverse => start_block.unwrap_or_else(|| {
                // "Last" block heuristic: highest start address.
                graph.blocks().map(Block::start).max().unwrap_or_default()
            }),
        };

        Ok(Self {
            graph,
            strategy,
            direction,
            worklist: VecDeque::from([seed]),
            visited: HashSet::new(),
            emitting: start.is_none() || direction == Direction::Reverse,
            start,
        })
    }

    fn next_forward(&mut self) -> Option<&'g Block> {
        loop {
            let current = self.worklist.pop_front()?;
            if !self.visited.insert(current) {
                continue;
            }
            let block = self.graph.block_at(current)?;

            let mut successors = block.successors().to_vec();
            successors.sort_unstable();
            match self.strategy {
                Strategy::DepthFirst => {
                    for &succ in successors.iter().rev() {
                        self.worklist.push_front(succ);
                    }
                }
                Strategy::BreadthFirst => self.worklist.extend(successors),
            }

            if !self.emitting {
                self.emitting = self.start.is_some_and(|address| block.contains(address));
            }
            if self.emitting {
                return Some(block);
            }
        }
    }

    fn next_reverse(&mut self) -> Option<&'g Block> {
        let current = self.worklist.pop_front()?;
        let block = self.graph.block_at(current)?;

        // Positional cycle rule: only predecessors that lexically precede the
        // current block are followed.
        let mut predecessors: Vec<u64> = block
            .predecessors()
            .iter()
            .copied()
            .filter(|&pred| pred < block.start())
            .collect();
        predecessors.sort_unstable_by(|a, b| b.cmp(a));
        match self.strategy {
            Strategy::DepthFirst => {
                for &pred in predecessors.iter().rev() {
                    self.worklist.push_front(pred);
                }
            }
            Strategy::BreadthFirst => self.worklist.extend(predecessors),
        }

        Some(block)
    }
}

impl<'g> Iterator for BlockWalk<'g> {
    type Item = &'g Block;

    fn next(&mut self) -> Option<Self::Item> {
        match self.direction {
            Direction::Forward => self.next_forward(),
            Direction::Reverse => self.next_reverse(),
        }
    }
}

/// Lazy iterator over instruction addresses, in traversal order.
///
/// Created by [`FunctionGraph::walk_addresses`]. For every block the
/// underlying [`BlockWalk`] visits, yields the instruction addresses in
/// `[block.start, block.end)` - ascending for forward walks, descending for
/// reverse walks. A supplied start address truncates the first block: forward
/// walks begin at the start address itself, reverse walks at the instruction
/// before it.
#[derive(Debug)]
pub struct AddressWalk<'g> {
    graph: &'g FunctionGraph,
    walk: BlockWalk<'g>,
    buffered: std::vec::IntoIter<u64>,
    first_block: bool,
    start: Option<u64>,
}

impl<'g> AddressWalk<'g> {
    pub(crate) fn new(
        graph: &'g FunctionGraph,
        strategy: Strategy,
        direction: Direction,
        start: Option<u64>,
    ) -> Result<Self> {
        Ok(Self {
            graph,
            walk: BlockWalk::new(graph, strategy, direction, start)?,
            buffered: Vec::new().into_iter(),
            first_block: true,
            start,
        })
    }
}

impl Iterator for AddressWalk<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(address) = self.buffered.next() {
                return Some(address);
            }

            let block = self.walk.next()?;
            let truncate = if self.first_block { self.start } else { None };
            self.first_block = false;

            let addresses = match self.walk.direction {
                Direction::Forward => {
                    let from = truncate.unwrap_or_else(|| block.start());
                    self.graph.instructions(from, block.end())
                }
                Direction::Reverse => {
                    let to = truncate.unwrap_or_else(|| block.end());
                    let mut addresses = self.graph.instructions(block.start(), to);
                    addresses.reverse();
                    addresses
                }
            };
            self.buffered = addresses.into_iter();
        }
    }
}
