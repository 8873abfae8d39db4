//! Projected trust-region minimization of the bound objective.
//!
//! Each iteration takes one trial step of length `r` along the negative
//! gradient and projects it back onto the feasible set. A step is accepted
//! when it passes the Armijo test, which doubles `r`; otherwise `r` is
//! halved. Points where the objective is undefined are never accepted.
//!
//! The difference step, the stationarity test and the radius floor are all
//! measured relative to `b`, so the iterates for a box of size `b` are the
//! unit-box iterates scaled by `b`.

use ndarray::Array1;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{BoundConfig, ConfigError};
use crate::constraints::{initial_guess, ordering_constraint, project_feasible, Bounds};
use crate::objective::{objective, ObjectiveError};

const ARMIJO: f64 = 1e-4;

#[derive(Debug, Error)]
pub enum BoundError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("initial point is degenerate: {0}")]
    Objective(#[from] ObjectiveError),
    #[error("starting point has {found} components, expected {expected}")]
    StartDimension { expected: usize, found: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationStatus {
    /// Projected gradient norm fell below `gtol · b`.
    Gtol,
    /// Trust radius fell below `xtol · b`.
    Xtol,
    /// Iteration budget exhausted.
    MaxIter,
}

impl TerminationStatus {
    pub fn converged(self) -> bool {
        !matches!(self, TerminationStatus::MaxIter)
    }

    pub fn message(self) -> &'static str {
        match self {
            TerminationStatus::Gtol => "`gtol` termination condition is satisfied.",
            TerminationStatus::Xtol => "`xtol` termination condition is satisfied.",
            TerminationStatus::MaxIter => {
                "The maximum number of function evaluations is exceeded."
            }
        }
    }
}

impl std::fmt::Display for TerminationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Minimizer, value and diagnostics of one run.
#[derive(Debug, Clone, Serialize)]
pub struct BoundResult {
    pub n: usize,
    pub b: f64,
    pub x: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub status: TerminationStatus,
    /// Largest ordering-constraint violation at `x`.
    pub max_violation: f64,
}

impl std::fmt::Display for BoundResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cells: Vec<String> = self.x.iter().map(|v| format!("{v:.8}")).collect();
        writeln!(f, "[{}]", cells.join(" "))?;
        writeln!(f, "{}", self.value)?;
        write!(f, "{} ({} iterations)", self.status, self.iterations)
    }
}

fn norm(v: &Array1<f64>) -> f64 {
    v.dot(v).sqrt()
}

/// Central-difference gradient. Falls back to a one-sided difference when
/// one neighbour is degenerate, and to zero when both are.
fn gradient(p: &Array1<f64>, value: f64, b: f64) -> Array1<f64> {
    let step = f64::EPSILON.cbrt();
    let mut grad = Array1::zeros(p.len());
    for i in 0..p.len() {
        let h = step * p[i].abs().max(b);
        let mut forward = p.clone();
        forward[i] += h;
        let mut backward = p.clone();
        backward[i] -= h;
        grad[i] = match (objective(&forward), objective(&backward)) {
            (Ok(fa), Ok(fb)) => (fa - fb) / (2.0 * h),
            (Ok(fa), Err(_)) => (fa - value) / h,
            (Err(_), Ok(fb)) => (value - fb) / h,
            (Err(_), Err(_)) => 0.0,
        };
    }
    grad
}

/// Minimize the bound objective over the ordered box of `config`.
///
/// The result is returned whether or not a tolerance was met; check
/// [`TerminationStatus::converged`].
pub fn minimize(config: &BoundConfig) -> Result<BoundResult, BoundError> {
    minimize_from(config, &initial_guess(config.n, config.b))
}

/// Like [`minimize`], starting from `start` (projected onto the feasible
/// set first) instead of the linspace.
pub fn minimize_from(
    config: &BoundConfig,
    start: &Array1<f64>,
) -> Result<BoundResult, BoundError> {
    config.validate()?;
    if start.len() != config.n {
        return Err(BoundError::StartDimension {
            expected: config.n,
            found: start.len(),
        });
    }
    let BoundConfig {
        n,
        b,
        max_iter,
        gtol,
        xtol,
    } = *config;

    let bounds = Bounds::symmetric(b);
    let ordering = ordering_constraint(n, b);
    let max_radius = 2.0 * b * (n as f64).sqrt();

    let mut x = project_feasible(start, &bounds);
    let mut value = objective(&x)?;
    let mut grad = gradient(&x, value, b);
    let mut radius = b;
    let mut iterations = 0;

    info!(n, b, start = value, "Minimizing bound objective");

    let status = loop {
        // gradients scale like 1/b, so the unit step in y = x/b is b^2 here
        let projected_step = &project_feasible(&(&x - &(&grad * (b * b))), &bounds) - &x;
        if norm(&projected_step) < gtol * b {
            break TerminationStatus::Gtol;
        }
        if iterations >= max_iter {
            break TerminationStatus::MaxIter;
        }
        iterations += 1;

        let direction = &grad * (radius / norm(&grad));
        let trial = project_feasible(&(&x - &direction), &bounds);
        let decrease = grad.dot(&(&trial - &x));
        let accepted = match objective(&trial) {
            Ok(trial_value) if trial_value <= value + ARMIJO * decrease => Some(trial_value),
            _ => None,
        };

        match accepted {
            Some(trial_value) => {
                x = trial;
                value = trial_value;
                radius = (2.0 * radius).min(max_radius);
                grad = gradient(&x, value, b);
            }
            None => {
                radius *= 0.5;
                if radius < xtol * b {
                    break TerminationStatus::Xtol;
                }
            }
        }
        debug!(
            iteration = iterations,
            value,
            radius,
            accepted = accepted.is_some(),
            "trust-region step"
        );
    };

    let result = BoundResult {
        n,
        b,
        max_violation: ordering.max_violation(&x),
        x: x.to_vec(),
        value,
        iterations,
        status,
    };
    info!(
        n,
        value = result.value,
        iterations = result.iterations,
        status = ?result.status,
        "Bound minimization finished"
    );
    Ok(result)
}
