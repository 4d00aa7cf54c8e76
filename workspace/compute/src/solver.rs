//! Dense linear solve for the model's normal equations. The systems are
//! small (tens of unknowns), so Gaussian elimination with partial pivoting
//! is plenty.

const PIVOT_EPS: f64 = 1e-12;

/// Solves `a * x = b` in place. Returns `None` when the system is singular
/// or the inputs are not finite.
pub(crate) fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    if a.len() != n || a.iter().any(|row| row.len() != n) {
        return None;
    }
    if b.iter().any(|v| !v.is_finite())
        || a.iter().flatten().any(|v| !v.is_finite())
    {
        return None;
    }

    for col in 0..n {
        // Partial pivoting: bring the largest remaining entry to the diagonal.
        let pivot_row = (col..n).max_by(|&i, &j| {
            a[i][col]
                .abs()
                .partial_cmp(&a[j][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if a[pivot_row][col].abs() < PIVOT_EPS {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for col in (0..n).rev() {
        let mut sum = b[col];
        for k in (col + 1)..n {
            sum -= a[col][k] * x[k];
        }
        x[col] = sum / a[col][col];
    }

    if x.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_well_conditioned_system() {
        // x = 1, y = 2
        let a = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        let b = vec![4.0, 7.0];
        let x = solve(a, b).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-10);
        assert!((x[1] - 2.0).abs() < 1e-10);
    }

    #[test]
    fn rejects_singular_system() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        let b = vec![1.0, 2.0];
        assert!(solve(a, b).is_none());
    }

    #[test]
    fn rejects_non_finite_input() {
        let a = vec![vec![f64::NAN, 0.0], vec![0.0, 1.0]];
        let b = vec![1.0, 1.0];
        assert!(solve(a, b).is_none());
    }
}
