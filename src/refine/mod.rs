//! Bounded refinement loop.
//!
//! This module provides the generic propose -> execute -> judge driver:
//! - `Proposer` / `Executor` collaborator traits
//! - `LoopState`, the record threaded through every round
//! - `RefinementLoop`, which runs rounds until success, a fatal error, or the
//!   round budget is spent, and returns a `LoopReport`

mod outcome;
mod runner;
mod state;
mod traits;

pub use outcome::{Outcome, Termination};
pub use runner::{RefinementConfig, RefinementLoop};
pub use state::{LoopReport, LoopState, Phase, RoundRecord};
pub use traits::{Executor, Proposal, ProposalRequest, Proposer};
