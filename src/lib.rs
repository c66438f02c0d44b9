// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # flowtrace
//!
//! Control-flow-graph path enumeration and incremental emulation-state replay
//! for reverse engineering compiled binaries.
//!
//! Given the CFG of a function (supplied by an external disassembler) and an
//! instruction address inside it, `flowtrace` reconstructs the execution paths
//! that reach the address from the function entry and the processor state that
//! would exist along each path. This enables automated recovery of
//! runtime-computed values - decrypted strings, derived keys, resolved
//! imports - without running the real binary.
//!
//! ## Architecture
//!
//! - [`flow`] - [`Block`] / [`FunctionGraph`] value types built from a
//!   [`CfgSource`], plus lazy forward/reverse, depth/breadth-first traversals
//! - [`paths`] - [`PathFinder`], the lazy and memoized enumeration of every
//!   simple path to a target, and [`PathNode`], the shared-prefix path links
//!   with cached incremental state replay
//! - [`emulation`] - the [`Emulator`] capability this crate consumes; the
//!   instruction semantics themselves live in the embedding application
//! - [`Error`] and [`Result`] - error handling across the crate
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use flowtrace::{FunctionGraph, PathFinder};
//!
//! // Adapt your disassembler to the CfgSource trait, then:
//! let graph = FunctionGraph::build(source, 0x401000)?;
//! let finder = PathFinder::new(&graph, Arc::new(emulator));
//!
//! // Enumerate paths to the interesting call site, bounded - path counts
//! // grow exponentially with the number of branches.
//! for path in finder.paths_to(0x40123A)?.take(64) {
//!     let state = path.state_at(0x40123A)?;
//!     // inspect the recovered registers/memory
//! }
//! ```
//!
//! ## Laziness and Memoization
//!
//! Everything in this crate is demand-driven. Traversals and path enumeration
//! yield one item per pull; a caller that stops consuming pays nothing for the
//! remainder. Path enumeration additionally memoizes per block: chains are
//! recorded the first time they are derived and every later enumeration -
//! same target or a different one routing through the block - is served from
//! the record before new work happens. Emulation states are cached per path
//! node and extended monotonically, so widening a state query replays only
//! the instructions not yet applied.
//!
//! ## Cycles
//!
//! Looping control flow is pruned by a positional heuristic: predecessor
//! edges are only followed toward strictly lower start addresses. This keeps
//! enumeration finite without a general loop model, at the cost of missing
//! back-edges whose source lexically precedes its loop header; see
//! [`flow::traversal`] for the full discussion. Irreducible or obfuscated
//! control flow is explicitly out of scope.
//!
//! ## Threading
//!
//! The crate is designed for single-threaded, demand-driven use; all types
//! are nevertheless [`Send`] and [`Sync`], with the per-block memo and the
//! per-node state caches behind their own locks, so embedding in a threaded
//! analysis pipeline requires no external synchronization.

pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
pub mod prelude;

/// Consumed emulation capability: the [`Emulator`] trait.
pub mod emulation;

/// Function graph abstraction: [`Block`], [`FunctionGraph`], [`CfgSource`]
/// and the traversal iterators.
pub mod flow;

/// Path enumeration and per-path state replay: [`PathFinder`] and
/// [`PathNode`].
pub mod paths;

/// `flowtrace` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is
/// always [`Error`]. Used consistently throughout the crate for all fallible
/// operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `flowtrace` Error type
///
/// The main error type for all operations in this crate. See [`error::Error`]
/// for the individual failure modes.
pub use error::Error;

pub use emulation::Emulator;
pub use flow::{
    AddressWalk, Block, BlockSpec, BlockWalk, CfgSource, Direction, FunctionGraph, FunctionSpec,
    Strategy,
};
pub use paths::{PathFinder, PathNode, Paths};
