//! CLI argument definitions: top-level `Cli` struct and `Commands` enum.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub(crate) const CLI_LONG_ABOUT: &str =
    "Equilibrium verification and convergence bounds for population games.\n\n\
    Typical session:\n  \
    1. popgame equilibrium              (find a Nash equilibrium of the DRAM game)\n  \
    2. popgame equilibrium --exclude on (is it the only one?)\n  \
    3. popgame bound --n 3              (worst-case RM-Smith bound for 3 strategies)\n\n\
    Use --model to load a different payoff model from JSON; `popgame model`\n\
    prints the built-in one as a starting point.";

#[derive(Parser)]
#[command(name = "popgame")]
#[command(about = "Equilibrium verification and convergence bounds for population games")]
#[command(long_about = CLI_LONG_ABOUT)]
#[command(version)]
pub(crate) struct Cli {
    /// Log at debug level (per-iteration optimizer progress, solver steps)
    #[arg(long, global = true, default_value_t = false)]
    pub(crate) verbose: bool,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Search for a Nash equilibrium of the payoff model
    #[command(display_order = 10)]
    Equilibrium {
        /// Exclude the model's candidate equilibrium: off | on
        #[arg(long, default_value = "off")]
        exclude: String,

        /// Payoff model JSON file (default: built-in DRAM instance)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Solver backend to use: z3 | cvc5
        #[arg(long, default_value = "z3")]
        solver: String,

        /// Solver timeout in seconds (0 disables)
        #[arg(long, default_value_t = 0)]
        timeout: u64,

        /// Dump SMT encoding to file
        #[arg(long)]
        dump_smt: Option<String>,

        /// Output format: text | json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Check that the model's candidate is the unique Nash equilibrium
    #[command(display_order = 11)]
    Uniqueness {
        /// Payoff model JSON file (default: built-in DRAM instance)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Solver backend to use: z3 | cvc5
        #[arg(long, default_value = "z3")]
        solver: String,

        /// Solver timeout in seconds (0 disables)
        #[arg(long, default_value_t = 0)]
        timeout: u64,

        /// Output format: text | json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Print a payoff model as JSON
    #[command(display_order = 12)]
    Model {
        /// Payoff model JSON file to validate and normalize (default: built-in DRAM instance)
        #[arg(long)]
        model: Option<PathBuf>,
    },

    /// Approximate the worst-case RM-Smith bound for n strategies
    #[command(display_order = 20)]
    Bound {
        /// Number of strategies
        #[arg(long, default_value_t = 3)]
        n: usize,

        /// Box bound on each component of p
        #[arg(long, default_value_t = 1.0)]
        b: f64,

        /// Maximum optimizer iterations
        #[arg(long, default_value_t = 3000)]
        max_iter: usize,

        /// Output format: text | json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Approximate the bound for every n in an inclusive range
    #[command(display_order = 21)]
    BoundSweep {
        /// Smallest number of strategies
        #[arg(long)]
        min_n: usize,

        /// Largest number of strategies
        #[arg(long)]
        max_n: usize,

        /// Box bound on each component of p
        #[arg(long, default_value_t = 1.0)]
        b: f64,

        /// Maximum optimizer iterations per run
        #[arg(long, default_value_t = 3000)]
        max_iter: usize,

        /// Output format: text | json
        #[arg(long, default_value = "text")]
        format: String,
    },
}
