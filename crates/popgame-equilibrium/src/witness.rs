//! Exact re-check of a candidate state against the equilibrium conditions.
//!
//! Evaluation uses `BigRational` so the check is free of rounding and
//! overflow regardless of the solver's witness denominators.

use num::bigint::BigInt;
use num::rational::{BigRational, Rational64};
use num::{One, Zero};

use crate::model::{PayoffModel, SocialState};

fn big(value: Rational64) -> BigRational {
    BigRational::new(BigInt::from(*value.numer()), BigInt::from(*value.denom()))
}

/// A single violated constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub constraint: String,
    pub detail: String,
}

/// Outcome of checking a state against every simplex and best-response
/// constraint.
#[derive(Debug, Clone, Default)]
pub struct WitnessReport {
    pub checked: usize,
    pub violations: Vec<Violation>,
}

impl WitnessReport {
    pub fn holds(&self) -> bool {
        self.violations.is_empty()
    }
}

impl std::fmt::Display for WitnessReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.holds() {
            write!(f, "exact re-check: {} constraints hold", self.checked)
        } else {
            write!(
                f,
                "exact re-check: {} of {} constraints violated",
                self.violations.len(),
                self.checked
            )?;
            for v in &self.violations {
                write!(f, "\n  {}: {}", v.constraint, v.detail)?;
            }
            Ok(())
        }
    }
}

/// Exact payoff `F_ri` at `state`.
pub fn payoff(
    model: &PayoffModel,
    state: &SocialState,
    population: usize,
    strategy: usize,
) -> BigRational {
    let load = model
        .populations
        .iter()
        .enumerate()
        .fold(BigRational::zero(), |acc, (s, pop)| {
            acc + big(pop.weight.value()) * big(state.share(s, strategy))
        });
    let base = big(model.populations[population].base_costs[strategy].value());
    -base - &load * &load
}

/// Check `state` against box bounds, simplex sums and best responses.
///
/// The state must have the model's shape; a mismatch is reported as a
/// violation rather than a panic.
pub fn check_witness(model: &PayoffModel, state: &SocialState) -> WitnessReport {
    let mut report = WitnessReport::default();
    let populations = model.population_count();
    let strategies = model.strategy_count();

    report.checked += 1;
    if state.shape() != vec![strategies; populations] {
        report.violations.push(Violation {
            constraint: "shape".into(),
            detail: format!(
                "state has shape {:?}, model expects {:?}",
                state.shape(),
                vec![strategies; populations]
            ),
        });
        return report;
    }

    let zero = BigRational::zero();
    let one = BigRational::one();

    for r in 0..populations {
        for i in 0..strategies {
            let x = big(state.share(r, i));
            report.checked += 1;
            if x < zero || x > one {
                report.violations.push(Violation {
                    constraint: format!("0 <= {} <= 1", model.state_var(r, i)),
                    detail: format!("{} = {x}", model.state_var(r, i)),
                });
            }
        }

        let total = (0..strategies).fold(BigRational::zero(), |acc, i| acc + big(state.share(r, i)));
        report.checked += 1;
        if total != one {
            report.violations.push(Violation {
                constraint: format!("simplex of population {}", model.populations[r].name),
                detail: format!("shares sum to {total}"),
            });
        }
    }

    for r in 0..populations {
        let payoffs: Vec<BigRational> = (0..strategies).map(|i| payoff(model, state, r, i)).collect();
        for i in 0..strategies {
            report.checked += 1;
            if big(state.share(r, i)).is_zero() {
                continue;
            }
            if let Some(j) = (0..strategies).find(|&j| j != i && payoffs[i] < payoffs[j]) {
                report.violations.push(Violation {
                    constraint: format!("best response {}", model.state_var(r, i)),
                    detail: format!(
                        "{} > 0 but F{}{} = {} < F{}{} = {}",
                        model.state_var(r, i),
                        r + 1,
                        i + 1,
                        payoffs[i],
                        r + 1,
                        j + 1,
                        payoffs[j]
                    ),
                });
            }
        }
    }

    report
}
