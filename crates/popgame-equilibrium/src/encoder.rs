//! Nash-equilibrium conditions as SMT assertions.

use num::One;
use popgame_smt::sorts::SmtSort;
use popgame_smt::terms::SmtTerm;

use crate::model::{PayoffModel, SocialState};

/// Declarations and assertions of one equilibrium query.
///
/// The exclusion constraint is kept apart from the base assertions so a
/// caller can check the base query first and then push the exclusion in a
/// nested scope.
#[derive(Debug, Clone)]
pub struct EquilibriumQuery {
    pub declarations: Vec<(String, SmtSort)>,
    pub assertions: Vec<SmtTerm>,
    pub exclusion: Option<SmtTerm>,
}

impl EquilibriumQuery {
    /// Base assertions followed by the exclusion, if any.
    pub fn all_assertions(&self) -> Vec<SmtTerm> {
        let mut out = self.assertions.clone();
        out.extend(self.exclusion.iter().cloned());
        out
    }
}

fn share(model: &PayoffModel, population: usize, strategy: usize) -> SmtTerm {
    SmtTerm::var(model.state_var(population, strategy))
}

/// `F_ri = -c_ri - (Σ_s m_s · x_si)^2`.
pub fn payoff_term(model: &PayoffModel, population: usize, strategy: usize) -> SmtTerm {
    let load = SmtTerm::sum(
        model
            .populations
            .iter()
            .enumerate()
            .map(|(s, pop)| {
                let x = share(model, s, strategy);
                if pop.weight.value().is_one() {
                    x
                } else {
                    SmtTerm::real(pop.weight.value()).mul(x)
                }
            })
            .collect(),
    );
    let base = model.populations[population].base_costs[strategy].value();
    SmtTerm::real(-base).sub(load.square())
}

/// `∨_{r,i} x_ri ≠ candidate_ri`.
pub fn exclusion_term(model: &PayoffModel, candidate: &SocialState) -> SmtTerm {
    let mut disjuncts = Vec::new();
    for r in 0..model.population_count() {
        for i in 0..model.strategy_count() {
            disjuncts.push(share(model, r, i).ne(SmtTerm::real(candidate.share(r, i))));
        }
    }
    SmtTerm::or(disjuncts)
}

/// Encode simplex membership and best-response conditions for every
/// population and strategy, plus the optional exclusion of `candidate`.
///
/// Assertion order: box bounds, simplex sums, best responses.
pub fn encode_query(model: &PayoffModel, exclude: Option<&SocialState>) -> EquilibriumQuery {
    let populations = model.population_count();
    let strategies = model.strategy_count();

    let declarations: Vec<(String, SmtSort)> = model
        .state_vars()
        .into_iter()
        .map(|name| (name, SmtSort::Real))
        .collect();

    let mut assertions = Vec::new();

    for r in 0..populations {
        for i in 0..strategies {
            assertions.push(SmtTerm::int(0).le(share(model, r, i)));
            assertions.push(share(model, r, i).le(SmtTerm::int(1)));
        }
    }

    for r in 0..populations {
        let row = (0..strategies).map(|i| share(model, r, i)).collect();
        assertions.push(SmtTerm::sum(row).eq(SmtTerm::int(1)));
    }

    let payoffs: Vec<Vec<SmtTerm>> = (0..populations)
        .map(|r| (0..strategies).map(|i| payoff_term(model, r, i)).collect())
        .collect();

    // A strategy is either unused or a best response within its population.
    for r in 0..populations {
        for i in 0..strategies {
            let best_response = SmtTerm::and(
                (0..strategies)
                    .filter(|&j| j != i)
                    .map(|j| payoffs[r][i].clone().ge(payoffs[r][j].clone()))
                    .collect(),
            );
            assertions.push(SmtTerm::or(vec![
                share(model, r, i).eq(SmtTerm::int(0)),
                best_response,
            ]));
        }
    }

    EquilibriumQuery {
        declarations,
        assertions,
        exclusion: exclude.map(|candidate| exclusion_term(model, candidate)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use popgame_smt::backends::smtlib_printer::to_smtlib;

    #[test]
    fn dram_payoffs_match_closed_form() {
        let model = PayoffModel::dram();
        assert_eq!(
            to_smtlib(&payoff_term(&model, 0, 0)),
            "(- (- 11.0) (* (+ x11 (* 2.0 x21)) (+ x11 (* 2.0 x21))))"
        );
        assert_eq!(
            to_smtlib(&payoff_term(&model, 0, 1)),
            "(- (- (/ 46.0 5.0)) (* (+ x12 (* 2.0 x22)) (+ x12 (* 2.0 x22))))"
        );
        assert_eq!(
            to_smtlib(&payoff_term(&model, 1, 2)),
            "(- (- (/ 13.0 2.0)) (* (+ x13 (* 2.0 x23)) (+ x13 (* 2.0 x23))))"
        );
    }

    #[test]
    fn query_shape_for_two_by_three_game() {
        let model = PayoffModel::dram();
        let query = encode_query(&model, None);
        assert_eq!(query.declarations.len(), 6);
        // 12 bounds + 2 simplex sums + 6 best responses
        assert_eq!(query.assertions.len(), 20);
        assert!(query.exclusion.is_none());
        assert_eq!(query.all_assertions().len(), 20);
    }

    #[test]
    fn simplex_and_best_response_encoding() {
        let model = PayoffModel::dram();
        let query = encode_query(&model, None);
        assert_eq!(
            to_smtlib(&query.assertions[12]),
            "(= (+ (+ x11 x12) x13) 1.0)"
        );
        let best_response = to_smtlib(&query.assertions[14]);
        assert!(best_response.starts_with("(or (= x11 0.0) (and (>= "));
    }

    #[test]
    fn exclusion_forbids_every_component_of_candidate() {
        let model = PayoffModel::dram();
        let candidate = SocialState::pure(&[1, 2], 3);
        let query = encode_query(&model, Some(&candidate));
        let exclusion = query.exclusion.as_ref().expect("exclusion requested");
        let printed = to_smtlib(exclusion);
        assert!(printed.contains("(not (= x12 1.0))"));
        assert!(printed.contains("(not (= x23 1.0))"));
        assert!(printed.contains("(not (= x11 0.0))"));
        assert_eq!(query.all_assertions().len(), 21);
    }
}
