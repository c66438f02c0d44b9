use thiserror::Error;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers all failure modes of graph construction, traversal, path enumeration
/// and emulation-state replay. Each variant provides specific context about the failure
/// to enable appropriate error handling.
///
/// All failures in this crate are structural, not transient: an address is either inside
/// the analyzed function or it is not, a graph is either well formed or it is not. No
/// internal retries exist; every error is returned to the immediate caller, which decides
/// whether to log, skip the function, or abort the run.
///
/// # Error Categories
///
/// ## Address Resolution Errors
/// - [`Error::AddressOutOfFunction`] - Address outside the analyzed function's bounds
/// - [`Error::AddressOutOfBlock`] - Address outside the queried block's range
///
/// ## Graph Construction Errors
/// - [`Error::EmptyGraph`] - The CFG source produced no basic blocks
/// - [`Error::Graph`] - Structurally invalid block layout or edges
///
/// ## Replay Errors
/// - [`Error::UnresolvedInstruction`] - The emulator could not apply an instruction
///
/// # Examples
///
/// ```rust
/// use flowtrace::Error;
///
/// # fn check(result: flowtrace::Result<()>) {
/// match result {
///     Ok(()) => println!("ok"),
///     Err(Error::AddressOutOfFunction { address, start, end }) => {
///         eprintln!("0x{address:X} not in function 0x{start:X}..0x{end:X}");
///     }
///     Err(e) => eprintln!("error: {e}"),
/// }
/// # }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The requested address lies outside the analyzed function.
    ///
    /// Returned by [`PathFinder::paths_to`](crate::PathFinder::paths_to) and the
    /// traversal constructors before any graph work is performed. Also covers
    /// addresses that fall inside the function's bounds but in a gap between
    /// basic blocks (data, alignment padding).
    #[error("Address 0x{address:X} is not within function 0x{start:X}..0x{end:X}")]
    AddressOutOfFunction {
        /// The address that was requested
        address: u64,
        /// Start of the function's address range
        start: u64,
        /// End of the function's address range (exclusive)
        end: u64,
    },

    /// The requested address lies outside the queried basic block.
    ///
    /// Returned by [`PathNode::state_at`](crate::PathNode::state_at) when the
    /// address does not fall within the range of the block that path node
    /// represents.
    #[error("Address 0x{address:X} is not within block 0x{start:X}..0x{end:X}")]
    AddressOutOfBlock {
        /// The address that was requested
        address: u64,
        /// Start of the block's address range
        start: u64,
        /// End of the block's address range (exclusive)
        end: u64,
    },

    /// The emulator could not apply the instruction at the given address.
    ///
    /// Surfaced unchanged during state replay. Skipping the instruction instead
    /// would silently corrupt every state derived from it, so replay aborts and
    /// the partially advanced cache is discarded.
    #[error("Unresolved instruction at 0x{address:X}: {message}")]
    UnresolvedInstruction {
        /// Address of the instruction that failed to apply
        address: u64,
        /// Description of the failure, supplied by the emulator
        message: String,
    },

    /// The CFG source produced no basic blocks for the function.
    ///
    /// A function graph without blocks has no entry and cannot be traversed;
    /// this is a fatal construction-time error.
    #[error("Cannot build a function graph from an empty block list")]
    EmptyGraph,

    /// The CFG source produced a structurally invalid graph.
    ///
    /// Covers overlapping or inverted block ranges, blocks outside the function
    /// bounds, and predecessor/successor edges that reference unknown blocks.
    #[error("{0}")]
    Graph(String),
}
