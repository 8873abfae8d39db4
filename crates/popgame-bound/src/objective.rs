//! Ratio objective of the bound problem.
//!
//! On the ordered region every `p_i - p_n` and `p_k - p_i` (`k < i`) has a
//! fixed sign, so the positive parts of the general expression drop out.

use ndarray::Array1;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObjectiveError {
    #[error("objective is undefined at {point:?}: numerator {numerator}, denominator {denominator}")]
    Degenerate {
        point: Vec<f64>,
        numerator: f64,
        denominator: f64,
    },
}

/// `Σ_i (p_i - p_n)^2 · Σ_i (p_i - p_n)`.
pub fn numerator(p: &Array1<f64>) -> f64 {
    let Some(last) = p.iter().next_back().copied() else {
        return 0.0;
    };
    let squares: f64 = p.iter().map(|&v| (v - last).powi(2)).sum();
    let linear: f64 = p.iter().map(|&v| v - last).sum();
    squares * linear
}

/// `Σ_i (p_i - p_n) · Σ_{k<i} (p_k - p_i)^2`.
pub fn denominator(p: &Array1<f64>) -> f64 {
    let Some(last) = p.iter().next_back().copied() else {
        return 0.0;
    };
    let mut total = 0.0;
    for (i, &pi) in p.iter().enumerate() {
        let spread: f64 = p.iter().take(i).map(|&pk| (pk - pi).powi(2)).sum();
        total += (pi - last) * spread;
    }
    total
}

/// `numerator(p) / denominator(p)`, or `Degenerate` when the denominator
/// is zero or the ratio is not finite.
pub fn objective(p: &Array1<f64>) -> Result<f64, ObjectiveError> {
    let num = numerator(p);
    let den = denominator(p);
    let degenerate = || ObjectiveError::Degenerate {
        point: p.to_vec(),
        numerator: num,
        denominator: den,
    };
    if den == 0.0 {
        return Err(degenerate());
    }
    let ratio = num / den;
    if ratio.is_finite() {
        Ok(ratio)
    } else {
        Err(degenerate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use proptest::prelude::*;

    #[test]
    fn symmetric_three_point_value() {
        let p = array![1.0, 0.0, -1.0];
        assert_eq!(numerator(&p), 15.0);
        assert_eq!(denominator(&p), 1.0);
        assert_eq!(objective(&p), Ok(15.0));
    }

    #[test]
    fn constant_vector_is_degenerate() {
        for c in [-1.0, 0.0, 0.3, 1.0] {
            let p = Array1::from_elem(4, c);
            assert_eq!(denominator(&p), 0.0);
            assert!(matches!(
                objective(&p),
                Err(ObjectiveError::Degenerate { .. })
            ));
        }
    }

    #[test]
    fn top_heavy_point_is_degenerate() {
        // only p_1 differs: every p_i - p_n with k < i is zero
        let p = array![1.0, -1.0, -1.0];
        assert_eq!(denominator(&p), 0.0);
        assert!(objective(&p).is_err());
    }

    #[test]
    fn closed_form_on_the_one_parameter_family() {
        // p = (1, t, 0) gives (1 + t^2)(1 + t) / (t (1 - t)^2)
        let t: f64 = 0.25;
        let p = array![1.0, t, 0.0];
        let expected = (1.0 + t * t) * (1.0 + t) / (t * (1.0 - t).powi(2));
        let value = objective(&p).unwrap();
        assert!((value - expected).abs() < 1e-12, "{value} vs {expected}");
    }

    fn ordered_point() -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(-1.0f64..1.0, 3..8).prop_map(|mut v| {
            v.sort_by(|a, b| b.total_cmp(a));
            v
        })
    }

    proptest! {
        #[test]
        fn positive_scaling_leaves_value_unchanged(v in ordered_point(), c in 0.1f64..10.0) {
            let p = Array1::from(v);
            prop_assume!(denominator(&p).abs() > 1e-6);
            let base = objective(&p).unwrap();
            let scaled = objective(&p.mapv(|x| x * c)).unwrap();
            prop_assert!((scaled - base).abs() <= 1e-8 * base.abs().max(1.0));
        }

        #[test]
        fn translation_leaves_value_unchanged(v in ordered_point(), t in -5.0f64..5.0) {
            let p = Array1::from(v);
            prop_assume!(denominator(&p).abs() > 1e-6);
            let base = objective(&p).unwrap();
            let shifted = objective(&p.mapv(|x| x + t)).unwrap();
            prop_assert!((shifted - base).abs() <= 1e-6 * base.abs().max(1.0));
        }
    }
}
