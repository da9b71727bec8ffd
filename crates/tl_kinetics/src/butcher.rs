use ndarray::{array, Array1, Array2};

use crate::LeapError;

/// An explicit Runge–Kutta scheme in Butcher form.
///
/// `a` is the stage matrix (strictly lower triangular for an explicit
/// scheme) and `b` the weights, which must sum to one. The node vector `c`
/// is not needed: propensities do not depend on time explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct ButcherTableau {
    a: Array2<f64>,
    b: Array1<f64>,
}

impl ButcherTableau {
    pub fn new(a: Array2<f64>, b: Array1<f64>) -> Result<Self, LeapError> {
        let (rows, cols) = a.dim();
        if rows != cols {
            return Err(LeapError::Tableau(format!("stage matrix is {rows}x{cols}, not square")));
        }
        if b.len() != rows {
            return Err(LeapError::Tableau(format!("{} weights for {} stages", b.len(), rows)));
        }
        if rows == 0 {
            return Err(LeapError::Tableau("no stages".to_string()));
        }
        for ((i, j), &aij) in a.indexed_iter() {
            if j >= i && aij != 0.0 {
                return Err(LeapError::Tableau(format!("a[{i}][{j}] = {aij} makes the scheme implicit")));
            }
        }
        let sum = b.sum();
        if (sum - 1.0).abs() > 1e-12 {
            return Err(LeapError::Tableau(format!("weights sum to {sum}, not 1")));
        }
        Ok(Self { a, b })
    }

    /// Forward Euler: the effective propensities are those at the start of
    /// the leap.
    pub fn euler() -> Self {
        Self { a: array![[0.0]], b: array![1.0] }
    }

    pub fn midpoint() -> Self {
        Self {
            a: array![[0.0, 0.0], [0.5, 0.0]],
            b: array![0.0, 1.0],
        }
    }

    pub fn heun() -> Self {
        Self {
            a: array![[0.0, 0.0], [1.0, 0.0]],
            b: array![0.5, 0.5],
        }
    }

    pub fn rk4() -> Self {
        Self {
            a: array![
                [0.0, 0.0, 0.0, 0.0],
                [0.5, 0.0, 0.0, 0.0],
                [0.0, 0.5, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
            ],
            b: array![1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0],
        }
    }

    pub fn stages(&self) -> usize {
        self.b.len()
    }

    pub fn a(&self, i: usize, j: usize) -> f64 {
        self.a[[i, j]]
    }

    pub fn b(&self, i: usize) -> f64 {
        self.b[i]
    }
}
