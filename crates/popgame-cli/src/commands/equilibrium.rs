// Command handlers for: Equilibrium, Uniqueness, Model
//
// These commands load a payoff model, run the SMT equilibrium query or the
// uniqueness check, and render the verdict.

use std::path::PathBuf;

use miette::IntoDiagnostic;

use popgame_equilibrium::{
    check_uniqueness, run_verification, UniquenessVerdict, Verdict, VerifierConfig,
};

use super::helpers::{
    load_model, parse_exclusion_mode, parse_output_format, parse_solver_choice, print_json,
};
use crate::{AssignmentEntry, EquilibriumReport, OutputFormat, RecheckReport, UniquenessReport};

pub(crate) fn equilibrium_report(config: &VerifierConfig, verdict: &Verdict) -> EquilibriumReport {
    let mut report = EquilibriumReport {
        schema_version: 1,
        model: config.model.name.clone(),
        solver: config.solver.to_string(),
        exclude: config.exclude.to_string(),
        result: verdict.token().to_string(),
        assignment: None,
        witness: None,
        recheck: None,
        reason: None,
    };
    match verdict {
        Verdict::Sat {
            assignment,
            witness,
            recheck,
        } => {
            report.assignment = Some(
                assignment
                    .iter()
                    .map(|(var, value)| AssignmentEntry {
                        var: var.clone(),
                        value: value.to_string(),
                    })
                    .collect(),
            );
            report.witness = Some(witness.to_string());
            report.recheck = Some(RecheckReport {
                holds: recheck.holds(),
                checked: recheck.checked,
                violations: recheck
                    .violations
                    .iter()
                    .map(|v| format!("{}: {}", v.constraint, v.detail))
                    .collect(),
            });
        }
        Verdict::Unsat => {}
        Verdict::Unknown(reason) => report.reason = Some(reason.clone()),
    }
    report
}

fn uniqueness_result_kind(verdict: &UniquenessVerdict) -> &'static str {
    match verdict {
        UniquenessVerdict::Unique { .. } => "unique",
        UniquenessVerdict::Multiple { .. } => "multiple",
        UniquenessVerdict::NotAnEquilibrium { .. } => "not_an_equilibrium",
        UniquenessVerdict::Inconclusive { .. } => "inconclusive",
    }
}

pub(crate) fn run_equilibrium_command(
    exclude: String,
    model: Option<PathBuf>,
    solver: String,
    timeout: u64,
    dump_smt: Option<String>,
    format: String,
) -> miette::Result<()> {
    let output_format = parse_output_format(&format)?;
    let config = VerifierConfig {
        model: load_model(model.as_deref())?,
        exclude: parse_exclusion_mode(&exclude)?,
        solver: parse_solver_choice(&solver)?,
        timeout_secs: timeout,
        dump_smt,
    };

    let verdict = run_verification(&config).into_diagnostic()?;

    match output_format {
        OutputFormat::Text => println!("{verdict}"),
        OutputFormat::Json => print_json(&equilibrium_report(&config, &verdict))?,
    }
    Ok(())
}

pub(crate) fn run_uniqueness_command(
    model: Option<PathBuf>,
    solver: String,
    timeout: u64,
    format: String,
) -> miette::Result<()> {
    let output_format = parse_output_format(&format)?;
    let config = VerifierConfig {
        model: load_model(model.as_deref())?,
        solver: parse_solver_choice(&solver)?,
        timeout_secs: timeout,
        ..VerifierConfig::default()
    };

    let verdict = check_uniqueness(&config).into_diagnostic()?;

    match output_format {
        OutputFormat::Text => println!("{verdict}"),
        OutputFormat::Json => print_json(&UniquenessReport {
            schema_version: 1,
            model: config.model.name.clone(),
            solver: config.solver.to_string(),
            candidate: config.model.candidate.as_ref().map(ToString::to_string),
            result: uniqueness_result_kind(&verdict).to_string(),
            output: verdict.to_string(),
        })?,
    }
    Ok(())
}

pub(crate) fn run_model_command(model: Option<PathBuf>) -> miette::Result<()> {
    let model = load_model(model.as_deref())?;
    print_json(&model)
}
