//! CLI command definitions using clap.
//!
//! - synth: refine a Yosys script until it synthesizes the design
//! - guess: play the number-guessing game
//! - check: report the installed Yosys version

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Synthloop - LLM-driven refinement loops for Yosys synthesis
#[derive(Parser, Debug)]
#[command(name = "synthloop")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate and refine a Yosys script for a design
    Synth {
        /// Verilog source file
        verilog: PathBuf,

        /// SDC constraints file
        sdc: PathBuf,

        /// Netlist to write (default: <verilog stem>_synthesized_netlist.v).
        /// An existing file at this path is removed before each round.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum refinement rounds
        #[arg(short = 'n', long)]
        max_rounds: Option<u32>,

        /// Write the full loop report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Play the number-guessing game
    Guess {
        /// Lowest possible number
        #[arg(long)]
        min: Option<u32>,

        /// Highest possible number
        #[arg(long)]
        max: Option<u32>,

        /// Secret number (random when omitted)
        #[arg(long)]
        target: Option<u32>,

        /// Maximum guesses
        #[arg(short = 'n', long)]
        max_attempts: Option<u32>,

        /// Let the language model guess instead of bisecting
        #[arg(long)]
        llm: bool,
    },

    /// Check that Yosys is installed
    Check,
}
