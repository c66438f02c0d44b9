//! Consumed emulation capability.
//!
//! This crate replays processor state along control-flow paths but does not
//! implement instruction semantics itself. An [`Emulator`] is supplied by the
//! embedding application and applies one instruction at a time to an opaque
//! state snapshot. The state type only has to be cloneable: path nodes cache
//! one snapshot each and hand out independent copies to callers.
//!
//! There is no process-wide emulator setup. An emulator instance is created
//! explicitly and passed into [`PathFinder::new`](crate::PathFinder::new);
//! path nodes share it through an [`Arc`](std::sync::Arc).

use std::fmt::Debug;

use crate::Result;

/// Applies instruction semantics to an opaque state snapshot.
///
/// Implementations advance a [`State`](Self::State) by exactly one instruction
/// per [`execute`](Self::execute) call and produce the empty initial state for
/// function entry points. `execute` takes `&self`: an emulator shared between
/// path nodes must keep any internal bookkeeping behind interior mutability.
///
/// # Examples
///
/// ```rust
/// use flowtrace::{Emulator, Result};
///
/// /// Toy emulator that only records which addresses were executed.
/// #[derive(Debug)]
/// struct Recorder;
///
/// impl Emulator for Recorder {
///     type State = Vec<u64>;
///
///     fn initial_state(&self) -> Self::State {
///         Vec::new()
///     }
///
///     fn execute(&self, state: &mut Self::State, address: u64) -> Result<()> {
///         state.push(address);
///         Ok(())
///     }
/// }
/// ```
pub trait Emulator: Debug + Send + Sync {
    /// Register/memory snapshot advanced by this emulator.
    type State: Clone;

    /// Produces the empty state a function is entered with.
    ///
    /// Used as the replay base for path nodes that have no parent, i.e. the
    /// entry block of a function.
    fn initial_state(&self) -> Self::State;

    /// Applies the single instruction at `address` to `state`.
    ///
    /// # Errors
    ///
    /// Returns an error if the instruction cannot be decoded or its semantics
    /// are unsupported, typically
    /// [`Error::UnresolvedInstruction`](crate::Error::UnresolvedInstruction).
    /// The failure is propagated to the caller of
    /// [`PathNode::state_at`](crate::PathNode::state_at) rather than skipped,
    /// since skipping would corrupt every state derived from it.
    fn execute(&self, state: &mut Self::State, address: u64) -> Result<()>;
}
