//! Feasible set of the bound problem: `p ∈ [-b, b]^n` with
//! `p_1 ≥ p_2 ≥ … ≥ p_n`.

use ndarray::{Array1, Array2};

/// Two-sided linear constraint `lower ≤ A·p ≤ upper`, row by row.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub matrix: Array2<f64>,
    pub lower: Array1<f64>,
    pub upper: Array1<f64>,
}

impl LinearConstraint {
    /// `A·p` for a candidate point.
    pub fn residuals(&self, p: &Array1<f64>) -> Array1<f64> {
        self.matrix.dot(p)
    }

    /// Largest amount by which any row leaves `[lower, upper]`; zero when
    /// `p` is feasible.
    pub fn max_violation(&self, p: &Array1<f64>) -> f64 {
        self.residuals(p)
            .iter()
            .zip(self.lower.iter().zip(self.upper.iter()))
            .map(|(&v, (&lo, &hi))| (lo - v).max(v - hi).max(0.0))
            .fold(0.0, f64::max)
    }
}

/// Ordering constraint: row `i` has `+1` at column `i` and `-1` at column
/// `i + 1`, so `0 ≤ p_i - p_{i+1} ≤ 2b`.
pub fn ordering_constraint(n: usize, b: f64) -> LinearConstraint {
    let rows = n.saturating_sub(1);
    let mut matrix = Array2::zeros((rows, n));
    for i in 0..rows {
        matrix[[i, i]] = 1.0;
        matrix[[i, i + 1]] = -1.0;
    }
    LinearConstraint {
        matrix,
        lower: Array1::zeros(rows),
        upper: Array1::from_elem(rows, 2.0 * b),
    }
}

/// Per-component box bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn symmetric(b: f64) -> Self {
        Self {
            lower: -b,
            upper: b,
        }
    }

    pub fn contains(&self, p: &Array1<f64>) -> bool {
        p.iter().all(|&v| v >= self.lower && v <= self.upper)
    }

    pub fn clip(&self, p: &mut Array1<f64>) {
        p.mapv_inplace(|v| v.clamp(self.lower, self.upper));
    }
}

/// Evenly spaced points from `b` down to `-b`.
pub fn initial_guess(n: usize, b: f64) -> Array1<f64> {
    Array1::linspace(b, -b, n)
}

/// Euclidean projection onto `{p : p_1 ≥ … ≥ p_n}` by pool-adjacent-violators.
fn isotonic_decreasing(y: &Array1<f64>) -> Array1<f64> {
    // (sum, count) of each pooled block
    let mut blocks: Vec<(f64, usize)> = Vec::with_capacity(y.len());
    for &v in y.iter() {
        blocks.push((v, 1));
        while blocks.len() > 1 {
            let (s1, c1) = blocks[blocks.len() - 2];
            let (s2, c2) = blocks[blocks.len() - 1];
            if s1 / c1 as f64 >= s2 / c2 as f64 {
                break;
            }
            blocks.pop();
            if let Some(last) = blocks.last_mut() {
                *last = (s1 + s2, c1 + c2);
            }
        }
    }
    let mut out = Vec::with_capacity(y.len());
    for (sum, count) in blocks {
        out.extend(std::iter::repeat(sum / count as f64).take(count));
    }
    Array1::from(out)
}

/// Exact projection onto the feasible set. Clipping a non-increasing
/// vector to a box keeps it non-increasing, so isotonic regression followed
/// by clipping is the projection onto the intersection.
pub fn project_feasible(y: &Array1<f64>, bounds: &Bounds) -> Array1<f64> {
    let mut p = isotonic_decreasing(y);
    bounds.clip(&mut p);
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn ordering_matrix_for_three_strategies() {
        let c = ordering_constraint(3, 1.0);
        assert_eq!(c.matrix, array![[1.0, -1.0, 0.0], [0.0, 1.0, -1.0]]);
        assert_eq!(c.lower, array![0.0, 0.0]);
        assert_eq!(c.upper, array![2.0, 2.0]);
    }

    #[test]
    fn violation_measures_out_of_order_points() {
        let c = ordering_constraint(3, 1.0);
        assert_eq!(c.max_violation(&array![1.0, 0.0, -1.0]), 0.0);
        assert!((c.max_violation(&array![0.0, 0.5, -1.0]) - 0.5).abs() < 1e-15);
    }

    #[test]
    fn initial_guess_is_feasible_linspace() {
        let p = initial_guess(5, 2.0);
        assert_eq!(p, array![2.0, 1.0, 0.0, -1.0, -2.0]);
        assert_eq!(ordering_constraint(5, 2.0).max_violation(&p), 0.0);
        assert!(Bounds::symmetric(2.0).contains(&p));
    }

    #[test]
    fn projection_pools_violators_and_clips() {
        let bounds = Bounds::symmetric(1.0);
        let p = project_feasible(&array![0.0, 0.4, -3.0], &bounds);
        assert_eq!(p, array![0.2, 0.2, -1.0]);
    }

    #[test]
    fn projection_fixes_feasible_points() {
        let bounds = Bounds::symmetric(1.0);
        let p = array![0.9, 0.1, 0.1, -0.7];
        assert_eq!(project_feasible(&p, &bounds), p);
    }
}
