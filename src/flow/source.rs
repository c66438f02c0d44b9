//! Adapter boundary to the external disassembler.
//!
//! This crate does not decode instructions or extract control flow itself. A
//! [`CfgSource`] supplies, for a function address, the basic block layout and
//! edges the disassembler recovered, and enumerates instruction addresses on
//! demand. [`FunctionGraph`](crate::flow::FunctionGraph) copies the layout into
//! its own value types at build time; the source is kept only for lazy
//! instruction enumeration during traversal and state replay.

use std::fmt::Debug;

use crate::Result;

/// Basic block layout reported by a [`CfgSource`] for one function.
///
/// Blocks are ordered; index 0 must be the entry block (the block containing
/// the function's first instruction). Edges reference blocks by their start
/// address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSpec {
    /// Address of the block's first instruction.
    pub start: u64,
    /// Exclusive end address of the block.
    pub end: u64,
    /// Start addresses of blocks with an edge into this block.
    pub predecessors: Vec<u64>,
    /// Start addresses of blocks this block has an edge to.
    pub successors: Vec<u64>,
}

/// Function bounds and block layout reported by a [`CfgSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSpec {
    /// Address of the function's first instruction.
    pub start: u64,
    /// Exclusive end address of the function.
    pub end: u64,
    /// Ordered basic blocks; index 0 is the entry block.
    pub blocks: Vec<BlockSpec>,
}

/// Control-flow information supplied by an external disassembler.
///
/// Implementations adapt a concrete disassembler (or a test fixture) to the
/// two queries this crate needs: the block layout of a function, and the
/// ordered instruction addresses within an address range.
///
/// # Contract
///
/// - [`function`](Self::function) returns the blocks of the function
///   containing `address`, entry block first. Addresses covered by no block
///   (alignment padding, embedded data) are simply absent from the layout.
/// - [`instructions`](Self::instructions) returns the addresses of all
///   instructions beginning in `[start, end)`, in ascending order. The range
///   is expected to lie within a single basic block; callers never ask for
///   ranges spanning block boundaries.
///
/// # Examples
///
/// ```rust,ignore
/// struct IdaExport { /* parsed basic-block dump */ }
///
/// impl CfgSource for IdaExport {
///     fn function(&self, address: u64) -> flowtrace::Result<FunctionSpec> {
///         self.lookup(address).ok_or(flowtrace::Error::AddressOutOfFunction {
///             address,
///             start: self.image_base,
///             end: self.image_end,
///         })
///     }
///
///     fn instructions(&self, start: u64, end: u64) -> Vec<u64> {
///         self.heads.range(start..end).copied().collect()
///     }
/// }
/// ```
pub trait CfgSource: Debug + Send + Sync {
    /// Returns the block layout of the function containing `address`.
    ///
    /// # Errors
    ///
    /// Returns an error if no function contains `address` or the layout cannot
    /// be recovered; the error is propagated unchanged by
    /// [`FunctionGraph::build`](crate::flow::FunctionGraph::build).
    fn function(&self, address: u64) -> Result<FunctionSpec>;

    /// Returns the addresses of instructions beginning in `[start, end)`,
    /// ascending.
    fn instructions(&self, start: u64, end: u64) -> Vec<u64>;
}
