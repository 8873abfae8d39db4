// Parsing and loading helpers shared by the command handlers.

use std::path::Path;

use miette::IntoDiagnostic;
use serde::Serialize;
use tracing::info;

use popgame_equilibrium::{ExclusionMode, PayoffModel, SolverChoice};

use crate::OutputFormat;

pub(crate) fn parse_output_format(raw: &str) -> miette::Result<OutputFormat> {
    match raw {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        other => Err(miette::miette!(
            "Unknown output format: {other}. Use 'text' or 'json'."
        )),
    }
}

pub(crate) fn parse_solver_choice(raw: &str) -> miette::Result<SolverChoice> {
    raw.parse::<SolverChoice>().map_err(|e| miette::miette!("{e}"))
}

pub(crate) fn parse_exclusion_mode(raw: &str) -> miette::Result<ExclusionMode> {
    raw.parse::<ExclusionMode>()
        .map_err(|e| miette::miette!("{e}"))
}

/// Load the payoff model from `path`, or the built-in DRAM instance.
pub(crate) fn load_model(path: Option<&Path>) -> miette::Result<PayoffModel> {
    match path {
        Some(path) => {
            info!("Loading payoff model from {}...", path.display());
            let model = PayoffModel::load(path).into_diagnostic()?;
            info!(
                model = %model.name,
                populations = model.population_count(),
                strategies = model.strategy_count(),
                "Payoff model loaded"
            );
            Ok(model)
        }
        None => {
            info!("Using built-in DRAM payoff model");
            Ok(PayoffModel::dram())
        }
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> miette::Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).into_diagnostic()?
    );
    Ok(())
}
