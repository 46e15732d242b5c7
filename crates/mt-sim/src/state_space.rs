//! State-space realization and exact discretization.
//!
//! A proper transfer function with monic denominator
//! `s^n + a_1 s^{n-1} + ... + a_n` and numerator padded to `b_0 ... b_n`
//! is realized in controllable canonical form:
//!
//! ```text
//! A = [-a_1 -a_2 ... -a_n]    B = [1 0 ... 0]^T
//!     [ 1    0   ...  0  ]
//!     [      ...         ]    C = [b_1 - a_1 b_0, ..., b_n - a_n b_0]
//!     [ 0   ...   1   0  ]    D = b_0
//! ```

use mt_controls::TransferFunction;
use mt_controls::polynomial;
use nalgebra::{DMatrix, DVector};

use crate::error::{SimError, SimResult};

/// Continuous-time SISO state-space model `x' = Ax + Bu`, `y = Cx + Du`.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSpace {
    pub a: DMatrix<f64>,
    pub b: DVector<f64>,
    pub c: DVector<f64>,
    pub d: f64,
}

/// Zero-order-hold discretization for a fixed step `h`.
#[derive(Debug, Clone, PartialEq)]
pub struct Discretization {
    pub h: f64,
    pub ad: DMatrix<f64>,
    pub bd: DVector<f64>,
}

impl StateSpace {
    /// Realize `tf` in controllable canonical form.
    pub fn from_transfer_function(tf: &TransferFunction) -> SimResult<Self> {
        let tf = tf.normalized();
        let den = tf.den();
        let n = den.len() - 1;
        let num_degree = polynomial::degree(tf.num());
        if !polynomial::is_zero(tf.num()) && num_degree > n {
            return Err(SimError::Improper {
                num_degree,
                den_degree: n,
            });
        }
        let num = polynomial::pad_to(tf.num(), n + 1);
        let d = num[0];

        let mut a = DMatrix::zeros(n, n);
        let mut b = DVector::zeros(n);
        let mut c = DVector::zeros(n);
        if n > 0 {
            for j in 0..n {
                a[(0, j)] = -den[j + 1];
                c[j] = num[j + 1] - den[j + 1] * d;
            }
            for i in 1..n {
                a[(i, i - 1)] = 1.0;
            }
            b[0] = 1.0;
        }

        Ok(Self { a, b, c, d })
    }

    /// Number of states.
    pub fn order(&self) -> usize {
        self.b.len()
    }

    /// Exact discretization for a piecewise-constant input over step `h`.
    ///
    /// Uses the block matrix exponential
    /// `exp([[A, B], [0, 0]] h) = [[Ad, Bd], [0, 1]]`.
    pub fn discretize(&self, h: f64) -> SimResult<Discretization> {
        if !(h > 0.0) || !h.is_finite() {
            return Err(SimError::InvalidArg {
                what: "discretization step must be positive and finite",
            });
        }
        let n = self.order();
        let mut m = DMatrix::zeros(n + 1, n + 1);
        m.view_mut((0, 0), (n, n)).copy_from(&(&self.a * h));
        m.view_mut((0, n), (n, 1)).copy_from(&(&self.b * h));
        let e = m.exp();

        let ad = e.view((0, 0), (n, n)).into_owned();
        let bd = DVector::from_iterator(n, e.view((0, n), (n, 1)).iter().copied());
        Ok(Discretization { h, ad, bd })
    }
}
