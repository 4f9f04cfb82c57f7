//! Synthloop - bounded generate, execute, evaluate refinement loops
//!
//! A proposer produces a candidate artifact, an executor applies it and
//! reports a structured outcome, and the loop feeds that outcome back until
//! the candidate succeeds, a fatal error occurs, or the round budget runs out.
//! The `synth` module drives Yosys with LLM-written scripts; the `guess`
//! module is a self-contained game built on the same loop.

pub mod error;
pub mod guess;
pub mod llm;
pub mod prompt;
pub mod refine;
pub mod synth;

pub use error::{Result, SynthloopError};
