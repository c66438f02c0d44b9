//! Path enumeration and per-path state replay.
//!
//! The central abstraction of this crate: [`PathFinder`] lazily enumerates
//! every simple path from a function's entry to the block containing a target
//! address, and each enumerated [`PathNode`] can replay an emulation state
//! incrementally along its path up to any address in its block.
//!
//! Paths are represented as a shared-prefix tree - each node links to its
//! predecessor node by a reference-counted parent pointer - so the state of a
//! common prefix is computed once no matter how many divergent paths reuse it.
//!
//! # Example
//!
//! ```rust,ignore
//! use flowtrace::PathFinder;
//!
//! let finder = PathFinder::new(&graph, Arc::new(emulator));
//! for path in finder.paths_to(target)?.take(32) {
//!     let state = path.state_at(target)?;
//!     println!("{path}: {state:?}");
//! }
//! ```

mod finder;
mod node;

pub use finder::{PathFinder, Paths};
pub use node::PathNode;
