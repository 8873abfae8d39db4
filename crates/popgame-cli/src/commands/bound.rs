// Command handlers for: Bound, BoundSweep

use miette::IntoDiagnostic;

use popgame_bound::{minimize, sweep, BoundConfig, BoundResult};

use super::helpers::{parse_output_format, print_json};
use crate::{BoundSweepReport, OutputFormat};

fn bound_config(n: usize, b: f64, max_iter: usize) -> BoundConfig {
    BoundConfig {
        n,
        b,
        max_iter,
        ..BoundConfig::default()
    }
}

fn render_sweep_row(result: &BoundResult) -> String {
    format!(
        "{:>4}  {:<20}  {:>6}  {}",
        result.n,
        result.value,
        result.iterations,
        if result.status.converged() {
            "converged"
        } else {
            "max-iter"
        }
    )
}

pub(crate) fn run_bound_command(
    n: usize,
    b: f64,
    max_iter: usize,
    format: String,
) -> miette::Result<()> {
    let output_format = parse_output_format(&format)?;
    let result = minimize(&bound_config(n, b, max_iter)).into_diagnostic()?;
    match output_format {
        OutputFormat::Text => println!("{result}"),
        OutputFormat::Json => print_json(&result)?,
    }
    Ok(())
}

pub(crate) fn run_bound_sweep_command(
    min_n: usize,
    max_n: usize,
    b: f64,
    max_iter: usize,
    format: String,
) -> miette::Result<()> {
    let output_format = parse_output_format(&format)?;
    if min_n > max_n {
        return Err(miette::miette!(
            "--min-n ({min_n}) must not exceed --max-n ({max_n})"
        ));
    }
    let points = sweep(min_n..=max_n, &bound_config(min_n, b, max_iter)).into_diagnostic()?;
    match output_format {
        OutputFormat::Text => {
            println!("{:>4}  {:<20}  {:>6}  status", "n", "bound", "iters");
            for point in &points {
                println!("{}", render_sweep_row(point));
            }
        }
        OutputFormat::Json => print_json(&BoundSweepReport {
            schema_version: 1,
            min_n,
            max_n,
            b,
            points: &points,
        })?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use popgame_bound::TerminationStatus;

    #[test]
    fn sweep_rows_align_and_flag_budget_exhaustion() {
        let result = BoundResult {
            n: 7,
            b: 1.0,
            x: vec![1.0, 0.0, -1.0],
            value: 4.5,
            iterations: 3000,
            status: TerminationStatus::MaxIter,
            max_violation: 0.0,
        };
        let row = render_sweep_row(&result);
        assert!(row.starts_with("   7  4.5"));
        assert!(row.ends_with("max-iter"));
    }
}
