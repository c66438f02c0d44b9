//! Lazy enumeration of all simple paths to a target address.

use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;

use crate::{
    emulation::Emulator,
    flow::{Block, FunctionGraph},
    paths::PathNode,
    Error, Result,
};

/// Resumable production state of one per-block memo entry.
///
/// Advancing is monotonic: each step either appends exactly one new chain to
/// the entry's log or marks the cursor exhausted. Chains already logged are
/// never re-derived.
#[derive(Debug)]
enum Cursor {
    /// No chain has been requested for this block yet.
    NotStarted,
    /// Enumerating chains through the eligible predecessors, in edge order.
    InProgress {
        /// Predecessor starts that passed the cycle rule, in edge order.
        parents: Vec<u64>,
        /// Index of the predecessor currently being drained.
        parent_idx: usize,
        /// How many of that predecessor's chains have been consumed.
        child_idx: usize,
    },
    /// Every chain ending at this block has been produced.
    Exhausted,
}

/// Memo entry for one block: the append-only log of discovered chains plus the
/// cursor that produces the rest. The log is always a prefix of everything the
/// cursor will ever yield.
#[derive(Debug)]
struct BlockPaths<'g, E: Emulator> {
    block: &'g Block,
    produced: Vec<Arc<PathNode<'g, E>>>,
    cursor: Cursor,
}

/// Enumerates every simple path from the function entry to a target address.
///
/// Paths are produced lazily - one chain per pull - and memoized at every
/// block: chains ending at a block are recorded in a per-block log the first
/// time they are derived, and both later [`paths_to`](Self::paths_to) calls
/// for the same target and enumerations for other targets that route through
/// the block are served from that log before its cursor is advanced further.
/// Shared sub-paths are therefore computed once regardless of how many targets
/// reuse them, a caller that stops after N paths never pays for path N+1, and
/// repeated calls observe the same chains in the same order.
///
/// Loops are pruned by the same positional rule the reverse traversals use: a
/// predecessor is only considered when its start address is strictly less than
/// the current block's (an equal start is the block itself, a self-loop). The
/// filtered predecessor relation strictly decreases the start address, so the
/// enumeration runs over an acyclic projection of the CFG and per-block memo
/// entries are valid in every context. Back-edges whose source precedes the
/// loop header are a known blind spot of this heuristic; see
/// [`flow::traversal`](crate::flow::traversal).
///
/// # Examples
///
/// ```rust,ignore
/// let finder = PathFinder::new(&graph, Arc::new(emulator));
/// for path in finder.paths_to(0x40123A)?.take(64) {
///     let state = path.state_at(0x40123A)?;
///     // inspect recovered registers/memory
/// }
/// ```
#[derive(Debug)]
pub struct PathFinder<'g, E: Emulator> {
    graph: &'g FunctionGraph,
    emulator: Arc<E>,
    /// Per-block memo entries keyed by block start. Entries are `Arc`ed out of
    /// the map before locking so nested lookups never hold a map shard.
    #[allow(clippy::type_complexity)]
    memo: DashMap<u64, Arc<Mutex<BlockPaths<'g, E>>>>,
}

impl<'g, E: Emulator> PathFinder<'g, E> {
    /// Creates a path finder over `graph`, replaying states through `emulator`.
    ///
    /// The emulator is shared with every [`PathNode`] the finder creates.
    #[must_use]
    pub fn new(graph: &'g FunctionGraph, emulator: Arc<E>) -> Self {
        Self {
            graph,
            emulator,
            memo: DashMap::new(),
        }
    }

    /// Returns the graph this finder enumerates paths over.
    #[must_use]
    pub const fn graph(&self) -> &'g FunctionGraph {
        self.graph
    }

    /// Enumerates every path from the function entry to the block containing
    /// `address`, lazily.
    ///
    /// Chains already discovered for that block are yielded first, in the
    /// order they were originally found; further chains are derived on demand
    /// and appended to the block's log before being yielded. Dropping the
    /// iterator abandons nothing: a later call resumes exactly where
    /// enumeration stopped.
    ///
    /// Every yielded chain starts at the entry block. A block whose incoming
    /// edges are all back-edges under the cycle rule is unreachable from the
    /// entry as far as enumeration is concerned; the iterator is empty for it
    /// and for everything only reachable through it.
    ///
    /// The number of paths grows exponentially with the branch count of the
    /// function. Never collect the iterator into a container on real-world
    /// functions; consume it with conservative bounds (`take`, an address
    /// match, a deadline) instead.
    ///
    /// # Errors
    ///
    /// [`Error::AddressOutOfFunction`] if `address` lies outside the
    /// function's bounds or in a gap no block covers. Returned before any
    /// enumeration work is done.
    pub fn paths_to(&self, address: u64) -> Result<Paths<'_, 'g, E>> {
        let block = self
            .graph
            .block_containing(address)
            .ok_or(Error::AddressOutOfFunction {
                address,
                start: self.graph.function_start(),
                end: self.graph.function_end(),
            })?;

        Ok(Paths {
            finder: self,
            block,
            index: 0,
        })
    }

    /// Returns the memo entry for `block`, creating it on first use.
    ///
    /// The map guard is dropped before the caller locks the entry, keeping
    /// nested entry lookups off the map's shards.
    fn entry(&self, block: &'g Block) -> Arc<Mutex<BlockPaths<'g, E>>> {
        self.memo
            .entry(block.start())
            .or_insert_with(|| {
                Arc::new(Mutex::new(BlockPaths {
                    block,
                    produced: Vec::new(),
                    cursor: Cursor::NotStarted,
                }))
            })
            .clone()
    }

    /// Returns the `index`th chain ending at `block`, deriving it if the log
    /// does not reach that far yet. `None` once the block's chains are
    /// exhausted.
    ///
    /// Entry locks nest only from a block into its (strictly lower-starting)
    /// predecessors, so re-entrant enumeration cannot deadlock.
    fn nth(&self, block: &'g Block, index: usize) -> Option<Arc<PathNode<'g, E>>> {
        let entry = self.entry(block);
        let mut paths = entry.lock().unwrap_or_else(PoisonError::into_inner);
        while paths.produced.len() <= index {
            if !self.advance(&mut paths) {
                break;
            }
        }
        paths.produced.get(index).cloned()
    }

    /// Performs one production step on `paths`: appends exactly one new chain
    /// to its log and returns `true`, or returns `false` once exhausted.
    fn advance(&self, paths: &mut BlockPaths<'g, E>) -> bool {
        loop {
            let (parent_start, child_idx) = match &mut paths.cursor {
                Cursor::Exhausted => return false,
                Cursor::NotStarted => {
                    let block = paths.block;

                    // The entry block (or a block without any incoming edge)
                    // is its own single-node chain.
                    if block == self.graph.entry() || block.predecessors().is_empty() {
                        paths.produced.push(Arc::new(PathNode::new(
                            self.graph,
                            block,
                            None,
                            Arc::clone(&self.emulator),
                        )));
                        paths.cursor = Cursor::Exhausted;
                        return true;
                    }

                    let parents: Vec<u64> = block
                        .predecessors()
                        .iter()
                        .copied()
                        .filter(|&pred| pred < block.start())
                        .collect();

                    if parents.is_empty() {
                        // Every incoming edge is a back-edge: no chain from
                        // the entry reaches this block.
                        paths.cursor = Cursor::Exhausted;
                        return false;
                    }

                    paths.cursor = Cursor::InProgress {
                        parents,
                        parent_idx: 0,
                        child_idx: 0,
                    };
                    continue;
                }
                Cursor::InProgress {
                    parents,
                    parent_idx,
                    child_idx,
                } => match parents.get(*parent_idx) {
                    Some(&parent) => (parent, *child_idx),
                    None => {
                        paths.cursor = Cursor::Exhausted;
                        return false;
                    }
                },
            };

            let parent_chain = self
                .graph
                .block_at(parent_start)
                .and_then(|parent| self.nth(parent, child_idx));

            match parent_chain {
                Some(chain) => {
                    paths.produced.push(Arc::new(PathNode::new(
                        self.graph,
                        paths.block,
                        Some(chain),
                        Arc::clone(&self.emulator),
                    )));
                    if let Cursor::InProgress { child_idx, .. } = &mut paths.cursor {
                        *child_idx += 1;
                    }
                    return true;
                }
                None => {
                    // Current predecessor is drained; move to the next one.
                    if let Cursor::InProgress {
                        parent_idx,
                        child_idx,
                        ..
                    } = &mut paths.cursor
                    {
                        *parent_idx += 1;
                        *child_idx = 0;
                    }
                }
            }
        }
    }
}

/// Lazy iterator over the paths ending at one target block.
///
/// Created by [`PathFinder::paths_to`]. Yields shared [`PathNode`] chains;
/// each chain's node is the target block, its ancestors lead back to the
/// entry. Multiple `Paths` iterators over the same finder may be interleaved
/// freely, for the same target or different ones; they draw from the shared
/// per-block memo and never observe duplicate or reordered chains.
#[derive(Debug)]
pub struct Paths<'f, 'g, E: Emulator> {
    finder: &'f PathFinder<'g, E>,
    block: &'g Block,
    index: usize,
}

impl<'g, E: Emulator> Iterator for Paths<'_, 'g, E> {
    type Item = Arc<PathNode<'g, E>>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.finder.nth(self.block, self.index)?;
        self.index += 1;
        Some(path)
    }
}
