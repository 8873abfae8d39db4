use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("strategy count n must be at least 3, got {0}")]
    TooFewStrategies(usize),
    #[error("bound b must be positive and finite, got {0}")]
    InvalidBound(f64),
    #[error("iteration budget must be at least 1")]
    ZeroIterations,
    #[error("tolerance `{name}` must be positive and finite, got {value}")]
    InvalidTolerance { name: &'static str, value: f64 },
}

/// Parameters of one bound approximation.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundConfig {
    /// Number of strategies.
    pub n: usize,
    /// Box bound on `|p_i|`. The objective is scale invariant, so this only
    /// fixes the size of the search region.
    pub b: f64,
    /// Maximum number of trial steps.
    pub max_iter: usize,
    /// Termination threshold on the projected-gradient norm, relative to `b`.
    pub gtol: f64,
    /// Termination threshold on the trust radius, relative to `b`.
    pub xtol: f64,
}

impl Default for BoundConfig {
    fn default() -> Self {
        Self {
            n: 3,
            b: 1.0,
            max_iter: 3000,
            gtol: 1e-8,
            xtol: 1e-10,
        }
    }
}

impl BoundConfig {
    pub fn new(n: usize, b: f64) -> Self {
        Self {
            n,
            b,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n < 3 {
            return Err(ConfigError::TooFewStrategies(self.n));
        }
        if !(self.b.is_finite() && self.b > 0.0) {
            return Err(ConfigError::InvalidBound(self.b));
        }
        if self.max_iter == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        for (name, value) in [("gtol", self.gtol), ("xtol", self.xtol)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidTolerance { name, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_run() {
        let config = BoundConfig::default();
        assert_eq!(config.n, 3);
        assert_eq!(config.b, 1.0);
        assert_eq!(config.max_iter, 3000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_small_n_and_bad_bounds() {
        assert_eq!(
            BoundConfig::new(2, 1.0).validate(),
            Err(ConfigError::TooFewStrategies(2))
        );
        assert_eq!(
            BoundConfig::new(3, 0.0).validate(),
            Err(ConfigError::InvalidBound(0.0))
        );
        assert!(BoundConfig::new(3, -1.0).validate().is_err());
        assert!(BoundConfig::new(3, f64::INFINITY).validate().is_err());
        assert!(BoundConfig::new(3, f64::NAN).validate().is_err());
    }

    #[test]
    fn rejects_zero_budget_and_bad_tolerances() {
        let config = BoundConfig {
            max_iter: 0,
            ..BoundConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroIterations));

        let config = BoundConfig {
            gtol: 0.0,
            ..BoundConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTolerance { name: "gtol", .. })
        ));
    }
}
