//! Shared-prefix path nodes with incremental state replay.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::{
    emulation::Emulator,
    flow::{Block, FunctionGraph},
    Error, Result,
};

/// Lazily-filled emulation state of one path node.
///
/// `filled_to` is the exclusive address the state has been replayed to and is
/// only meaningful while `state` is `Some`; it then lies within
/// `[block.start, block.end]`. A replay failure leaves `state` as `None` so
/// the next query rebuilds from the parent instead of continuing from a
/// half-applied snapshot.
struct StateCache<S> {
    state: Option<S>,
    filled_to: u64,
}

/// One block occurrence on one execution path.
///
/// A path from the function entry to a target block is represented as a chain
/// of `PathNode`s linked through [`parent`](Self::parent); the node itself is
/// the path's final block, its ancestors spell the route back to the entry.
/// Parent links are shared ([`Arc`]): paths that diverge late share one prefix
/// chain, so the prefix's state is computed once no matter how many paths
/// reuse it, and memory stays proportional to the tree rather than to
/// paths × path-length.
///
/// Nodes are created by [`PathFinder`](crate::PathFinder) and handed out as
/// `Arc<PathNode>`; they are immutable except for the internal state cache,
/// which only ever extends monotonically forward (or is rebuilt after a
/// narrower query or a replay failure).
///
/// # State replay
///
/// [`state_at`](Self::state_at) and [`state`](Self::state) return the
/// emulation state as it would exist after executing this path up to (and
/// including) a given address. The state is computed incrementally: the
/// parent's end-of-block state is taken as the base and the instructions of
/// this block are applied one by one through the
/// [`Emulator`](crate::Emulator), caching progress so that widening queries
/// only pay for the instructions not yet applied.
pub struct PathNode<'g, E: Emulator> {
    graph: &'g FunctionGraph,
    block: &'g Block,
    parent: Option<Arc<PathNode<'g, E>>>,
    emulator: Arc<E>,
    cache: Mutex<StateCache<E::State>>,
}

impl<'g, E: Emulator> PathNode<'g, E> {
    pub(crate) fn new(
        graph: &'g FunctionGraph,
        block: &'g Block,
        parent: Option<Arc<PathNode<'g, E>>>,
        emulator: Arc<E>,
    ) -> Self {
        Self {
            graph,
            block,
            parent,
            emulator,
            cache: Mutex::new(StateCache {
                state: None,
                filled_to: block.start(),
            }),
        }
    }

    /// Returns the block this node represents.
    #[must_use]
    pub const fn block(&self) -> &'g Block {
        self.block
    }

    /// Returns the previous node on this path, or `None` at the entry block.
    #[must_use]
    pub const fn parent(&self) -> Option<&Arc<PathNode<'g, E>>> {
        self.parent.as_ref()
    }

    /// Returns `true` if `address` lies within this node's block.
    #[must_use]
    pub const fn contains(&self, address: u64) -> bool {
        self.block.contains(address)
    }

    /// Materializes the path as a block sequence, entry block first.
    #[must_use]
    pub fn blocks(&self) -> Vec<&'g Block> {
        let mut chain = Vec::new();
        let mut node = Some(self);
        while let Some(current) = node {
            chain.push(current.block);
            node = current.parent.as_deref();
        }
        chain.reverse();
        chain
    }

    /// Returns the number of blocks on this path, the node itself included.
    ///
    /// Always at least 1; a path is never empty.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut count = 1;
        let mut node = self.parent.as_deref();
        while let Some(current) = node {
            count += 1;
            node = current.parent.as_deref();
        }
        count
    }

    /// Returns the emulation state after executing this path through the
    /// instruction at `address`.
    ///
    /// The returned state is an independent copy; mutating it does not affect
    /// the cached state or other callers.
    ///
    /// # Errors
    ///
    /// - [`Error::AddressOutOfBlock`] if `address` is not within this node's
    ///   block.
    /// - Any error of [`Emulator::execute`], unchanged; the partially advanced
    ///   cache is discarded so a later query restarts from a consistent base.
    pub fn state_at(&self, address: u64) -> Result<E::State> {
        if !self.block.contains(address) {
            return Err(Error::AddressOutOfBlock {
                address,
                start: self.block.start(),
                end: self.block.end(),
            });
        }
        self.fill(self.graph.instruction_after(address, self.block.end()))
    }

    /// Returns the emulation state after executing this path through the end
    /// of this node's block.
    ///
    /// Equivalent to [`state_at`](Self::state_at) with the block's last
    /// instruction. Used internally as the replay base of child nodes.
    ///
    /// # Errors
    ///
    /// Any error of [`Emulator::execute`], unchanged.
    pub fn state(&self) -> Result<E::State> {
        self.fill(self.block.end())
    }

    /// Replays the cached state up to the exclusive address `end` and returns
    /// an independent copy.
    fn fill(&self, end: u64) -> Result<E::State> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);

        // Reuse the cached state only if it has not been filled past `end`;
        // a narrower query after a wider one rebuilds from the parent.
        let mut state = match cache.state.take() {
            Some(state) if cache.filled_to <= end => state,
            _ => {
                cache.filled_to = self.block.start();
                match &self.parent {
                    Some(parent) => parent.state()?,
                    None => self.emulator.initial_state(),
                }
            }
        };

        if cache.filled_to < end {
            // On failure `cache.state` stays None and the next query rebuilds.
            for address in self.graph.instructions(cache.filled_to, end) {
                self.emulator.execute(&mut state, address)?;
            }
            cache.filled_to = end;
        }

        cache.state = Some(state.clone());
        Ok(state)
    }
}

impl<E: Emulator> fmt::Debug for PathNode<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathNode")
            .field("block", &self.block)
            .field("depth", &self.depth())
            .finish_non_exhaustive()
    }
}

impl<E: Emulator> fmt::Display for PathNode<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chain = self.blocks();
        let mut first = true;
        for block in chain {
            if !first {
                write!(f, " -> ")?;
            }
            write!(f, "0x{:X}", block.start())?;
            first = false;
        }
        Ok(())
    }
}
