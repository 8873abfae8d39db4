use std::ops::RangeInclusive;

use ndarray::Array1;
use tracing::{debug, info};

use crate::config::BoundConfig;
use crate::optimizer::{minimize, minimize_from, BoundError, BoundResult};

/// `p` with its last coordinate repeated once. The objective is unchanged,
/// so a minimizer for `n` is a feasible start for `n + 1`.
fn pad_with_last(p: &[f64]) -> Array1<f64> {
    let mut padded = p.to_vec();
    if let Some(&last) = p.last() {
        padded.push(last);
    }
    Array1::from(padded)
}

/// Run [`minimize`] for every `n` in `range`, keeping every other setting
/// of `base`. Stops at the first invalid configuration.
///
/// Past the first `n`, the linspace start is raced against the previous
/// minimizer padded by one coordinate and the lower value is kept, so the
/// reported values never increase with `n`.
pub fn sweep(
    range: RangeInclusive<usize>,
    base: &BoundConfig,
) -> Result<Vec<BoundResult>, BoundError> {
    info!(
        min_n = *range.start(),
        max_n = *range.end(),
        b = base.b,
        "Sweeping bound over strategy counts"
    );
    let mut results: Vec<BoundResult> = Vec::new();
    for n in range {
        let config = BoundConfig { n, ..base.clone() };
        let cold = minimize(&config)?;
        let best = match results.last() {
            Some(previous) => {
                let warm = minimize_from(&config, &pad_with_last(&previous.x))?;
                debug!(n, cold = cold.value, warm = warm.value, "warm start compared");
                if warm.value < cold.value {
                    warm
                } else {
                    cold
                }
            }
            None => cold,
        };
        results.push(best);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::objective::objective;

    #[test]
    fn sweep_is_ordered_and_decreasing_for_small_n() {
        let results = sweep(3..=10, &BoundConfig::default()).unwrap();
        let ns: Vec<usize> = results.iter().map(|r| r.n).collect();
        assert_eq!(ns, (3..=10).collect::<Vec<_>>());
        for pair in results.windows(2) {
            assert!(
                pair[1].value < pair[0].value,
                "bound rose from n={} ({}) to n={} ({})",
                pair[0].n,
                pair[0].value,
                pair[1].n,
                pair[1].value
            );
        }
    }

    #[test]
    fn padding_keeps_the_objective() {
        let p = [1.0, 0.2, -0.5];
        let padded = pad_with_last(&p);
        assert_eq!(padded.len(), 4);
        assert_eq!(padded[3], -0.5);
        let original = objective(&Array1::from(p.to_vec())).unwrap();
        assert!((objective(&padded).unwrap() - original).abs() < 1e-12);
    }

    #[test]
    fn empty_range_yields_nothing() {
        #[allow(clippy::reversed_empty_ranges)]
        let results = sweep(5..=4, &BoundConfig::default()).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn range_starting_below_three_fails() {
        let err = sweep(2..=4, &BoundConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            BoundError::Config(ConfigError::TooFewStrategies(2))
        ));
    }
}
