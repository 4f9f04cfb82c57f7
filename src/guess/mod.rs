//! Number-guessing collaborators
//!
//! A small game that exercises the refinement loop without any external
//! tool: the judge answers "higher" or "lower" and the proposer narrows in.

mod judge;
mod proposer;
mod range;

pub use judge::GuessJudge;
pub use proposer::{BisectProposer, LlmGuessProposer, first_number};
pub use range::{GuessBounds, GuessRange, HIGHER, LOWER};
