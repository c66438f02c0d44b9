//! Basic block representation.
//!
//! A [`Block`] is a standalone value type describing one maximal straight-line
//! instruction range of a function. Blocks are constructed once, when the owning
//! [`FunctionGraph`](crate::flow::FunctionGraph) is built from a
//! [`CfgSource`](crate::flow::CfgSource), and are immutable afterwards. They
//! deliberately do not borrow or extend the CFG source's own object model: all
//! data is pulled out of the source at graph-build time so the rest of the
//! system works with stable, comparison-safe node identities.

use std::fmt;
use std::hash::{Hash, Hasher};

/// A basic block of an analyzed function.
///
/// Covers the half-open address range `[start, end)`. Within one
/// [`FunctionGraph`](crate::flow::FunctionGraph) the ranges of distinct blocks
/// never overlap, so a block is fully identified by its `start` address:
/// equality, ordering and hashing are defined solely by `start`.
///
/// Predecessor and successor edges are stored as the start addresses of the
/// neighboring blocks and resolved through the owning graph (see
/// [`FunctionGraph::predecessors`](crate::flow::FunctionGraph::predecessors)
/// and [`FunctionGraph::successors`](crate::flow::FunctionGraph::successors)).
///
/// # Examples
///
/// ```rust,ignore
/// let block = graph.block_containing(0x401023).unwrap();
/// assert!(block.contains(0x401023));
/// for pred in graph.predecessors(block) {
///     println!("predecessor at 0x{:X}", pred.start());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Block {
    /// Address of the first instruction in the block.
    start: u64,
    /// Address one past the last instruction in the block (exclusive).
    end: u64,
    /// Start addresses of the blocks that can branch or fall through into this one.
    predecessors: Vec<u64>,
    /// Start addresses of the blocks reachable from this one.
    successors: Vec<u64>,
}

impl Block {
    /// Creates a new block over `[start, end)` with the given edge sets.
    ///
    /// Only the owning graph constructs blocks; validation of the range and of
    /// the edge targets happens during
    /// [`FunctionGraph::build`](crate::flow::FunctionGraph::build).
    pub(crate) fn new(start: u64, end: u64, predecessors: Vec<u64>, successors: Vec<u64>) -> Self {
        Self {
            start,
            end,
            predecessors,
            successors,
        }
    }

    /// Returns the address of the first instruction in this block.
    #[must_use]
    pub const fn start(&self) -> u64 {
        self.start
    }

    /// Returns the exclusive end address of this block.
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.end
    }

    /// Returns `true` if `address` lies within this block's range.
    ///
    /// The range is half-open: `start` is included, `end` is not.
    #[must_use]
    pub const fn contains(&self, address: u64) -> bool {
        self.start <= address && address < self.end
    }

    /// Returns the start addresses of this block's predecessors.
    ///
    /// Order is the order the CFG source reported the edges in.
    #[must_use]
    pub fn predecessors(&self) -> &[u64] {
        &self.predecessors
    }

    /// Returns the start addresses of this block's successors.
    ///
    /// Order is the order the CFG source reported the edges in.
    #[must_use]
    pub fn successors(&self) -> &[u64] {
        &self.successors
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start
    }
}

impl Eq for Block {}

impl PartialOrd for Block {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Block {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.start.cmp(&other.start)
    }
}

impl Hash for Block {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.start.hash(state);
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block(0x{:08X}..0x{:08X})", self.start, self.end)
    }
}
