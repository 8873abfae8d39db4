//! Payoff model of a heterogeneous population game.
//!
//! Population `r` playing strategy `i` receives
//!
//! ```text
//! F_ri(x) = -c_ri - (Σ_s m_s · x_si)^2
//! ```
//!
//! where `c_ri` is a base cost and `m_s` is the congestion weight of
//! population `s`. The congestion term is shared by every population using
//! strategy `i`; the base cost is population-specific.

use std::path::Path;

use num::rational::Rational64;
use num::{One, Zero};
use popgame_smt::numeral::parse_rational;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model has no populations")]
    NoPopulations,
    #[error("population `{population}` has no strategies")]
    NoStrategies { population: String },
    #[error("population `{population}` has {found} strategies, expected {expected}")]
    StrategyCountMismatch {
        population: String,
        expected: usize,
        found: usize,
    },
    #[error("candidate state has shape {found:?}, expected {expected:?}")]
    CandidateShape {
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    #[error("candidate state is not in the simplex: {0}")]
    CandidateNotInSimplex(String),
    #[error("invalid coefficient `{0}`")]
    InvalidCoefficient(String),
    #[error("failed to read model file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse model file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// An exact rational constant that deserializes from JSON integers,
/// floats (read through their shortest decimal form) or strings such as
/// `"9.2"` and `"46/5"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CoefficientRepr", into = "String")]
pub struct Coefficient(Rational64);

impl Coefficient {
    pub fn new(value: Rational64) -> Self {
        Self(value)
    }

    pub fn integer(n: i64) -> Self {
        Self(Rational64::from_integer(n))
    }

    pub fn value(self) -> Rational64 {
        self.0
    }
}

impl std::str::FromStr for Coefficient {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_rational(s)
            .map(Coefficient)
            .ok_or_else(|| ModelError::InvalidCoefficient(s.to_string()))
    }
}

impl std::fmt::Display for Coefficient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Coefficient> for String {
    fn from(c: Coefficient) -> Self {
        c.to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CoefficientRepr {
    Int(i64),
    Float(f64),
    Text(String),
}

impl TryFrom<CoefficientRepr> for Coefficient {
    type Error = ModelError;

    fn try_from(repr: CoefficientRepr) -> Result<Self, Self::Error> {
        match repr {
            CoefficientRepr::Int(n) => Ok(Coefficient::integer(n)),
            CoefficientRepr::Float(f) if f.is_finite() => f.to_string().parse(),
            CoefficientRepr::Float(f) => Err(ModelError::InvalidCoefficient(f.to_string())),
            CoefficientRepr::Text(s) => s.parse(),
        }
    }
}

/// One population of the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Population {
    pub name: String,
    /// Congestion weight `m_r` of this population's mass.
    pub weight: Coefficient,
    /// Base cost `c_ri` per strategy.
    pub base_costs: Vec<Coefficient>,
}

/// A social state: one strategy distribution per population, indexed
/// `[population][strategy]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SocialState(pub Vec<Vec<Coefficient>>);

impl SocialState {
    /// Pure state where population `r` puts all of its mass on
    /// `strategies[r]` (0-based).
    pub fn pure(strategies: &[usize], strategy_count: usize) -> Self {
        let rows = strategies
            .iter()
            .map(|&chosen| {
                (0..strategy_count)
                    .map(|i| {
                        if i == chosen {
                            Coefficient::integer(1)
                        } else {
                            Coefficient::integer(0)
                        }
                    })
                    .collect()
            })
            .collect();
        SocialState(rows)
    }

    pub fn share(&self, population: usize, strategy: usize) -> Rational64 {
        self.0[population][strategy].value()
    }

    pub fn shape(&self) -> Vec<usize> {
        self.0.iter().map(Vec::len).collect()
    }

    /// True when every row is non-negative and sums to one.
    pub fn is_in_simplex(&self) -> bool {
        self.0.iter().all(|row| {
            row.iter().all(|c| c.value() >= Rational64::zero())
                && row.iter().map(|c| c.value()).sum::<Rational64>() == Rational64::one()
        })
    }
}

impl std::fmt::Display for SocialState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows: Vec<String> = self
            .0
            .iter()
            .map(|row| {
                let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
                format!("({})", cells.join(","))
            })
            .collect();
        write!(f, "({})", rows.join(","))
    }
}

/// Complete game instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffModel {
    pub name: String,
    pub populations: Vec<Population>,
    /// Known candidate equilibrium, used by the exclusion constraint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate: Option<SocialState>,
}

impl PayoffModel {
    /// DRAM market instance: two populations, three strategies.
    pub fn dram() -> Self {
        PayoffModel {
            name: "dram".into(),
            populations: vec![
                Population {
                    name: "1".into(),
                    weight: Coefficient::integer(1),
                    base_costs: vec![
                        Coefficient::integer(11),
                        Coefficient::new(Rational64::new(46, 5)),
                        Coefficient::new(Rational64::new(15, 2)),
                    ],
                },
                Population {
                    name: "2".into(),
                    weight: Coefficient::integer(2),
                    base_costs: vec![
                        Coefficient::integer(11),
                        Coefficient::new(Rational64::new(51, 5)),
                        Coefficient::new(Rational64::new(13, 2)),
                    ],
                },
            ],
            candidate: Some(SocialState::pure(&[1, 2], 3)),
        }
    }

    pub fn from_json(source: &str, path: &str) -> Result<Self, ModelError> {
        let model: PayoffModel = serde_json::from_str(source).map_err(|source| {
            ModelError::Parse {
                path: path.to_string(),
                source,
            }
        })?;
        model.validate()?;
        Ok(model)
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let display = path.display().to_string();
        let source = std::fs::read_to_string(path).map_err(|source| ModelError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_json(&source, &display)
    }

    pub fn population_count(&self) -> usize {
        self.populations.len()
    }

    pub fn strategy_count(&self) -> usize {
        self.populations
            .first()
            .map(|p| p.base_costs.len())
            .unwrap_or(0)
    }

    /// Variable name of the share of population `r` on strategy `i`
    /// (0-based), e.g. `x12` for the first population's second strategy.
    pub fn state_var(&self, population: usize, strategy: usize) -> String {
        if self.population_count() <= 9 && self.strategy_count() <= 9 {
            format!("x{}{}", population + 1, strategy + 1)
        } else {
            format!("x{}_{}", population + 1, strategy + 1)
        }
    }

    pub fn state_vars(&self) -> Vec<String> {
        let mut vars = Vec::with_capacity(self.population_count() * self.strategy_count());
        for r in 0..self.population_count() {
            for i in 0..self.strategy_count() {
                vars.push(self.state_var(r, i));
            }
        }
        vars
    }

    /// Reject a state that does not have one row of `strategy_count()`
    /// shares per population.
    pub fn check_state_shape(&self, state: &SocialState) -> Result<(), ModelError> {
        let expected = vec![self.strategy_count(); self.population_count()];
        if state.shape() != expected {
            return Err(ModelError::CandidateShape {
                expected,
                found: state.shape(),
            });
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let first = self.populations.first().ok_or(ModelError::NoPopulations)?;
        let expected = first.base_costs.len();
        if expected == 0 {
            return Err(ModelError::NoStrategies {
                population: first.name.clone(),
            });
        }
        for population in &self.populations {
            if population.base_costs.len() != expected {
                return Err(ModelError::StrategyCountMismatch {
                    population: population.name.clone(),
                    expected,
                    found: population.base_costs.len(),
                });
            }
        }
        if let Some(candidate) = &self.candidate {
            self.check_state_shape(candidate)?;
            if !candidate.is_in_simplex() {
                return Err(ModelError::CandidateNotInSimplex(candidate.to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dram_model_is_valid_and_named_like_the_paper() {
        let model = PayoffModel::dram();
        model.validate().expect("built-in model must validate");
        assert_eq!(model.population_count(), 2);
        assert_eq!(model.strategy_count(), 3);
        assert_eq!(
            model.state_vars(),
            vec!["x11", "x12", "x13", "x21", "x22", "x23"]
        );
        assert_eq!(
            model.populations[0].base_costs[1].value(),
            Rational64::new(46, 5)
        );
    }

    #[test]
    fn coefficients_accept_ints_floats_and_strings() {
        let parsed: Vec<Coefficient> =
            serde_json::from_str(r#"[11, 9.2, "7.5", "46/5", -0.5]"#).unwrap();
        let values: Vec<Rational64> = parsed.into_iter().map(Coefficient::value).collect();
        assert_eq!(
            values,
            vec![
                Rational64::from_integer(11),
                Rational64::new(46, 5),
                Rational64::new(15, 2),
                Rational64::new(46, 5),
                Rational64::new(-1, 2),
            ]
        );
    }

    #[test]
    fn coefficient_rejects_garbage() {
        let err = serde_json::from_str::<Coefficient>(r#""nine""#);
        assert!(err.is_err());
    }

    #[test]
    fn model_round_trips_through_json() {
        let model = PayoffModel::dram();
        let json = serde_json::to_string_pretty(&model).unwrap();
        let back = PayoffModel::from_json(&json, "<memory>").unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn ragged_model_is_rejected() {
        let json = r#"{
            "name": "ragged",
            "populations": [
                {"name": "a", "weight": 1, "base_costs": [1, 2, 3]},
                {"name": "b", "weight": 1, "base_costs": [1, 2]}
            ]
        }"#;
        let err = PayoffModel::from_json(json, "ragged.json").unwrap_err();
        assert!(matches!(
            err,
            ModelError::StrategyCountMismatch {
                expected: 3,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn state_shape_follows_the_model() {
        let model = PayoffModel::dram();
        assert!(model.check_state_shape(&SocialState::pure(&[0, 2], 3)).is_ok());
        let err = model
            .check_state_shape(&SocialState::pure(&[0, 2], 2))
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::CandidateShape { ref expected, ref found }
                if expected == &vec![3, 3] && found == &vec![2, 2]
        ));
    }

    #[test]
    fn candidate_outside_simplex_is_rejected() {
        let mut model = PayoffModel::dram();
        model.candidate = Some(SocialState(vec![
            vec![Coefficient::integer(1), Coefficient::integer(1), Coefficient::integer(0)],
            vec![Coefficient::integer(0), Coefficient::integer(0), Coefficient::integer(1)],
        ]));
        assert!(matches!(
            model.validate(),
            Err(ModelError::CandidateNotInSimplex(_))
        ));
    }

    #[test]
    fn empty_model_is_rejected() {
        let model = PayoffModel {
            name: "empty".into(),
            populations: Vec::new(),
            candidate: None,
        };
        assert!(matches!(model.validate(), Err(ModelError::NoPopulations)));
    }

    #[test]
    fn pure_state_display() {
        let state = SocialState::pure(&[1, 2], 3);
        assert_eq!(state.to_string(), "((0,1,0),(0,0,1))");
        assert!(state.is_in_simplex());
    }
}
