//! # flowtrace Prelude
//!
//! This module provides a convenient prelude for the most commonly used types
//! and traits from the flowtrace library. Import this module to get quick
//! access to the essential types for path tracing and state replay.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all flowtrace operations
pub use crate::Error;

/// The result type used throughout flowtrace
pub use crate::Result;

// ================================================================================================
// Function Graph
// ================================================================================================

/// One basic block of an analyzed function
pub use crate::flow::Block;

/// The control-flow graph of one function
pub use crate::flow::FunctionGraph;

/// Adapter boundary to the external disassembler
pub use crate::flow::{BlockSpec, CfgSource, FunctionSpec};

// ================================================================================================
// Traversal
// ================================================================================================

/// Lazy traversal iterators and their ordering parameters
pub use crate::flow::{AddressWalk, BlockWalk, Direction, Strategy};

// ================================================================================================
// Path Enumeration and State Replay
// ================================================================================================

/// Consumed emulation capability
pub use crate::emulation::Emulator;

/// Lazy, memoized enumeration of all paths to a target address
pub use crate::paths::{PathFinder, Paths};

/// One block occurrence on one path, with cached state replay
pub use crate::paths::PathNode;
