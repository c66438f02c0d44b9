//! Function graph abstraction and traversals.
//!
//! This module turns the block layout an external disassembler recovered into
//! stable value types and provides the traversal orderings the rest of the
//! crate builds on:
//!
//! - [`Block`] - one basic block, identified by its start address
//! - [`FunctionGraph`] - the CFG of one function, built from a [`CfgSource`]
//! - [`BlockWalk`] / [`AddressWalk`] - lazy forward/reverse, depth/breadth
//!   first traversals over blocks or instruction addresses
//!
//! # Example
//!
//! ```rust,ignore
//! use flowtrace::{Direction, FunctionGraph, Strategy};
//!
//! let graph = FunctionGraph::build(source, 0x401000)?;
//! for block in graph.walk_blocks(Strategy::DepthFirst, Direction::Forward, None)? {
//!     println!("{block}");
//! }
//! ```

mod block;
mod graph;
mod source;
pub mod traversal;

pub use block::Block;
pub use graph::FunctionGraph;
pub use source::{BlockSpec, CfgSource, FunctionSpec};
pub use traversal::{AddressWalk, BlockWalk, Direction, Strategy};
