//! Yosys synthesis collaborators
//!
//! A `ScriptProposer` asks a language model for a Yosys script, a
//! `YosysExecutor` runs it, and the refinement loop feeds the tool log back
//! until a netlist is written or the round limit is reached.

mod executor;
mod proposer;
mod script;
mod target;

pub use executor::{SynthesisOutput, YosysConfig, YosysExecutor};
pub use proposer::{DEFAULT_MAX_LOG_CHARS, ScriptProposer, tail};
pub use script::{YosysScript, extract_script, is_command_line};
pub use target::SynthesisTarget;
