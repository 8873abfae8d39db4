#![doc = include_str!("../README.md")]

mod cli;
mod commands;
mod types;

pub(crate) use types::{
    AssignmentEntry, BoundSweepReport, EquilibriumReport, OutputFormat, RecheckReport,
    UniquenessReport,
};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Equilibrium {
            exclude,
            model,
            solver,
            timeout,
            dump_smt,
            format,
        } => {
            commands::equilibrium::run_equilibrium_command(
                exclude, model, solver, timeout, dump_smt, format,
            )?;
        }
        Commands::Uniqueness {
            model,
            solver,
            timeout,
            format,
        } => {
            commands::equilibrium::run_uniqueness_command(model, solver, timeout, format)?;
        }
        Commands::Model { model } => {
            commands::equilibrium::run_model_command(model)?;
        }
        Commands::Bound {
            n,
            b,
            max_iter,
            format,
        } => {
            commands::bound::run_bound_command(n, b, max_iter, format)?;
        }
        Commands::BoundSweep {
            min_n,
            max_n,
            b,
            max_iter,
            format,
        } => {
            commands::bound::run_bound_sweep_command(min_n, max_n, b, max_iter, format)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bound_defaults_match_reference_run() {
        let cli = Cli::try_parse_from(["popgame", "bound"]).unwrap();
        match cli.command {
            Commands::Bound { n, b, max_iter, .. } => {
                assert_eq!(n, 3);
                assert_eq!(b, 1.0);
                assert_eq!(max_iter, 3000);
            }
            _ => panic!("expected bound subcommand"),
        }
    }

    #[test]
    fn equilibrium_flags_parse() {
        let cli = Cli::try_parse_from([
            "popgame",
            "equilibrium",
            "--exclude",
            "on",
            "--solver",
            "cvc5",
            "--timeout",
            "30",
        ])
        .unwrap();
        match cli.command {
            Commands::Equilibrium {
                exclude,
                solver,
                timeout,
                ..
            } => {
                assert_eq!(exclude, "on");
                assert_eq!(solver, "cvc5");
                assert_eq!(timeout, 30);
            }
            _ => panic!("expected equilibrium subcommand"),
        }
    }

    #[test]
    fn sweep_requires_range() {
        assert!(Cli::try_parse_from(["popgame", "bound-sweep"]).is_err());
    }
}
