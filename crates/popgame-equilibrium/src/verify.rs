//! Running equilibrium queries against an SMT backend.

use popgame_smt::backends::cvc5_backend::Cvc5Solver;
use popgame_smt::backends::z3_backend::Z3Solver;
use popgame_smt::script::query_to_smt2_script;
use popgame_smt::solver::{Model, SatResult, SmtSolver};
use popgame_smt::sorts::SmtSort;
use thiserror::Error;
use tracing::{info, warn};

use crate::encoder::{encode_query, EquilibriumQuery};
use crate::model::{Coefficient, ModelError, PayoffModel, SocialState};
use crate::witness::{check_witness, WitnessReport};

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
    #[error("Solver error: {0}")]
    Solver(String),
    #[error("solver model has no rational value for `{0}`")]
    IncompleteModel(String),
    #[error("exclusion requested but model `{0}` has no candidate state")]
    MissingCandidate(String),
}

/// Which solver backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverChoice {
    #[default]
    Z3,
    Cvc5,
}

impl std::str::FromStr for SolverChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "z3" => Ok(SolverChoice::Z3),
            "cvc5" => Ok(SolverChoice::Cvc5),
            other => Err(format!("Unknown solver: {other}. Use 'z3' or 'cvc5'.")),
        }
    }
}

impl std::fmt::Display for SolverChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverChoice::Z3 => write!(f, "z3"),
            SolverChoice::Cvc5 => write!(f, "cvc5"),
        }
    }
}

/// Whether the known candidate equilibrium is excluded from the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExclusionMode {
    /// Search for any equilibrium.
    #[default]
    Off,
    /// Search for any equilibrium other than the candidate.
    On,
}

impl std::str::FromStr for ExclusionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(ExclusionMode::Off),
            "on" => Ok(ExclusionMode::On),
            other => Err(format!("Unknown exclusion mode: {other}. Use 'off' or 'on'.")),
        }
    }
}

impl std::fmt::Display for ExclusionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExclusionMode::Off => write!(f, "off"),
            ExclusionMode::On => write!(f, "on"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VerifierConfig {
    pub model: PayoffModel,
    pub exclude: ExclusionMode,
    pub solver: SolverChoice,
    /// Solver timeout in seconds; `0` disables it.
    pub timeout_secs: u64,
    pub dump_smt: Option<String>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            model: PayoffModel::dram(),
            exclude: ExclusionMode::Off,
            solver: SolverChoice::Z3,
            timeout_secs: 0,
            dump_smt: None,
        }
    }
}

/// Solver verdict on an equilibrium query.
#[derive(Debug, Clone)]
pub enum Verdict {
    Sat {
        /// Variable assignment in declaration order.
        assignment: Vec<(String, Coefficient)>,
        witness: SocialState,
        recheck: WitnessReport,
    },
    Unsat,
    Unknown(String),
}

impl Verdict {
    pub fn token(&self) -> &'static str {
        match self {
            Verdict::Sat { .. } => "sat",
            Verdict::Unsat => "unsat",
            Verdict::Unknown(_) => "unknown",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Sat {
                assignment,
                recheck,
                ..
            } => {
                let cells: Vec<String> = assignment
                    .iter()
                    .map(|(name, value)| format!("{name} = {value}"))
                    .collect();
                writeln!(f, "sat")?;
                writeln!(f, "[{}]", cells.join(", "))?;
                write!(f, "{recheck}")
            }
            Verdict::Unsat => write!(f, "unsat"),
            Verdict::Unknown(reason) => write!(f, "unknown ({reason})"),
        }
    }
}

/// Outcome of the two-step uniqueness check.
#[derive(Debug, Clone)]
pub enum UniquenessVerdict {
    /// The candidate is an equilibrium and no other equilibrium exists.
    Unique { candidate: SocialState },
    /// Another equilibrium was found.
    Multiple {
        candidate: SocialState,
        other: Box<Verdict>,
    },
    /// The candidate violates the equilibrium conditions.
    NotAnEquilibrium {
        candidate: SocialState,
        report: WitnessReport,
    },
    /// The solver could not decide the excluded query.
    Inconclusive { reason: String },
}

impl std::fmt::Display for UniquenessVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UniquenessVerdict::Unique { candidate } => {
                write!(f, "unique: {candidate} is the only Nash equilibrium")
            }
            UniquenessVerdict::Multiple { candidate, other } => {
                write!(
                    f,
                    "not unique: {candidate} is an equilibrium, another one exists\n{other}"
                )
            }
            UniquenessVerdict::NotAnEquilibrium { candidate, report } => {
                write!(f, "{candidate} is not a Nash equilibrium\n{report}")
            }
            UniquenessVerdict::Inconclusive { reason } => write!(f, "inconclusive ({reason})"),
        }
    }
}

fn solver_err<E: std::error::Error>(e: E) -> VerifyError {
    VerifyError::Solver(e.to_string())
}

fn declare_and_assert<S: SmtSolver>(
    solver: &mut S,
    query: &EquilibriumQuery,
) -> Result<(), VerifyError> {
    for (name, sort) in &query.declarations {
        solver.declare_var(name, sort).map_err(solver_err)?;
    }
    for assertion in &query.assertions {
        solver.assert(assertion).map_err(solver_err)?;
    }
    Ok(())
}

fn witness_from_model(model: &PayoffModel, smt_model: &Model) -> Result<Verdict, VerifyError> {
    let mut assignment = Vec::new();
    let mut rows = Vec::with_capacity(model.population_count());
    for r in 0..model.population_count() {
        let mut row = Vec::with_capacity(model.strategy_count());
        for i in 0..model.strategy_count() {
            let name = model.state_var(r, i);
            let value = smt_model
                .get_real(&name)
                .map(Coefficient::new)
                .ok_or_else(|| VerifyError::IncompleteModel(name.clone()))?;
            assignment.push((name, value));
            row.push(value);
        }
        rows.push(row);
    }
    let witness = SocialState(rows);
    let recheck = check_witness(model, &witness);
    if !recheck.holds() {
        warn!(%witness, "solver witness fails the exact equilibrium re-check");
    }
    Ok(Verdict::Sat {
        assignment,
        witness,
        recheck,
    })
}

fn check_with_model<S: SmtSolver>(
    solver: &mut S,
    model: &PayoffModel,
    query: &EquilibriumQuery,
) -> Result<Verdict, VerifyError> {
    let var_names: Vec<(&str, &SmtSort)> = query
        .declarations
        .iter()
        .map(|(name, sort)| (name.as_str(), sort))
        .collect();
    let (result, smt_model) = solver.check_sat_with_model(&var_names).map_err(solver_err)?;
    match result {
        SatResult::Sat => match smt_model {
            Some(smt_model) => witness_from_model(model, &smt_model),
            None => {
                warn!("solver returned SAT without a model");
                Err(VerifyError::Solver("SAT without a model".into()))
            }
        },
        SatResult::Unsat => Ok(Verdict::Unsat),
        SatResult::Unknown(reason) => Ok(Verdict::Unknown(reason)),
    }
}

/// Encode the query for `model`, check it once and report the verdict.
pub fn verify_with_solver<S: SmtSolver>(
    solver: &mut S,
    model: &PayoffModel,
    exclude: Option<&SocialState>,
) -> Result<Verdict, VerifyError> {
    model.validate()?;
    if let Some(state) = exclude {
        model.check_state_shape(state)?;
    }
    let query = encode_query(model, exclude);
    declare_and_assert(solver, &query)?;
    if let Some(exclusion) = &query.exclusion {
        solver.assert(exclusion).map_err(solver_err)?;
    }
    check_with_model(solver, model, &query)
}

/// Check that the model's candidate is an equilibrium, then search for any
/// other equilibrium in a nested solver scope.
pub fn uniqueness_with_solver<S: SmtSolver>(
    solver: &mut S,
    model: &PayoffModel,
    candidate: &SocialState,
) -> Result<UniquenessVerdict, VerifyError> {
    model.validate()?;
    let report = check_witness(model, candidate);
    if !report.holds() {
        return Ok(UniquenessVerdict::NotAnEquilibrium {
            candidate: candidate.clone(),
            report,
        });
    }

    let query = encode_query(model, Some(candidate));
    declare_and_assert(solver, &query)?;

    solver.push().map_err(solver_err)?;
    if let Some(exclusion) = &query.exclusion {
        solver.assert(exclusion).map_err(solver_err)?;
    }
    let verdict = check_with_model(solver, model, &query);
    solver.pop().map_err(solver_err)?;

    Ok(match verdict? {
        Verdict::Unsat => UniquenessVerdict::Unique {
            candidate: candidate.clone(),
        },
        Verdict::Unknown(reason) => UniquenessVerdict::Inconclusive { reason },
        other @ Verdict::Sat { .. } => UniquenessVerdict::Multiple {
            candidate: candidate.clone(),
            other: Box::new(other),
        },
    })
}

fn dump_smt_to_file(query: &EquilibriumQuery, path: &str) {
    let smt = query_to_smt2_script(&query.declarations, &query.all_assertions());
    if let Err(e) = std::fs::write(path, smt) {
        warn!("could not write SMT dump to {path}: {e}");
    } else {
        info!("SMT dump written to {path}");
    }
}

fn exclusion_candidate(
    model: &PayoffModel,
    mode: ExclusionMode,
) -> Result<Option<&SocialState>, VerifyError> {
    match mode {
        ExclusionMode::Off => Ok(None),
        ExclusionMode::On => model
            .candidate
            .as_ref()
            .map(Some)
            .ok_or_else(|| VerifyError::MissingCandidate(model.name.clone())),
    }
}

/// Run one equilibrium query as configured.
pub fn run_verification(config: &VerifierConfig) -> Result<Verdict, VerifyError> {
    config.model.validate()?;
    let candidate = exclusion_candidate(&config.model, config.exclude)?;

    if let Some(path) = &config.dump_smt {
        dump_smt_to_file(&encode_query(&config.model, candidate), path);
    }

    info!(
        model = %config.model.name,
        solver = %config.solver,
        exclude = %config.exclude,
        "Checking equilibrium query..."
    );

    let verdict = match config.solver {
        SolverChoice::Z3 => {
            let mut solver = Z3Solver::with_timeout_secs(config.timeout_secs);
            verify_with_solver(&mut solver, &config.model, candidate)?
        }
        SolverChoice::Cvc5 => {
            let mut solver =
                Cvc5Solver::with_timeout_secs(config.timeout_secs).map_err(solver_err)?;
            verify_with_solver(&mut solver, &config.model, candidate)?
        }
    };

    info!(verdict = verdict.token(), "Equilibrium query finished");
    Ok(verdict)
}

/// Run the uniqueness check for the model's candidate.
pub fn check_uniqueness(config: &VerifierConfig) -> Result<UniquenessVerdict, VerifyError> {
    config.model.validate()?;
    let candidate = config
        .model
        .candidate
        .as_ref()
        .ok_or_else(|| VerifyError::MissingCandidate(config.model.name.clone()))?;

    if let Some(path) = &config.dump_smt {
        dump_smt_to_file(&encode_query(&config.model, Some(candidate)), path);
    }

    info!(
        model = %config.model.name,
        solver = %config.solver,
        %candidate,
        "Checking uniqueness of candidate equilibrium..."
    );

    match config.solver {
        SolverChoice::Z3 => {
            let mut solver = Z3Solver::with_timeout_secs(config.timeout_secs);
            uniqueness_with_solver(&mut solver, &config.model, candidate)
        }
        SolverChoice::Cvc5 => {
            let mut solver =
                Cvc5Solver::with_timeout_secs(config.timeout_secs).map_err(solver_err)?;
            uniqueness_with_solver(&mut solver, &config.model, candidate)
        }
    }
}
