use crate::{MtError, MtResult};

/// Floating point type of every model and solver quantity
pub type Real = f64;

/// `n` evenly spaced samples over `[start, end]`, both endpoints included.
pub fn linspace(start: Real, end: Real, n: usize) -> Vec<Real> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as Real;
            let mut out: Vec<Real> = (0..n).map(|i| start + step * i as Real).collect();
            out[n - 1] = end;
            out
        }
    }
}

/// `n` samples spaced evenly on a log scale over `[start, end]`.
///
/// Both bounds must be strictly positive.
pub fn geomspace(start: Real, end: Real, n: usize) -> MtResult<Vec<Real>> {
    if start <= 0.0 || end <= 0.0 {
        return Err(MtError::InvalidArg {
            what: "geomspace bounds must be positive",
        });
    }
    let mut out: Vec<Real> = linspace(start.ln(), end.ln(), n)
        .into_iter()
        .map(Real::exp)
        .collect();
    if let Some(first) = out.first_mut() {
        *first = start;
    }
    if n > 1 {
        out[n - 1] = end;
    }
    Ok(out)
}

/// Samples `start, start + step, ...` strictly below `stop`.
pub fn arange(start: Real, stop: Real, step: Real) -> MtResult<Vec<Real>> {
    if !(step > 0.0) || !step.is_finite() {
        return Err(MtError::InvalidArg {
            what: "arange step must be positive and finite",
        });
    }
    let span = stop - start;
    if !span.is_finite() {
        return Err(MtError::NonFinite {
            what: "arange span",
            value: span,
        });
    }
    if span <= 0.0 {
        return Ok(Vec::new());
    }
    let n = (span / step).ceil() as usize;
    Ok((0..n).map(|i| start + step * i as Real).collect())
}

/// Trapezoidal integral of `y` over the sample points `x`.
pub fn trapezoid(x: &[Real], y: &[Real]) -> MtResult<Real> {
    if x.len() != y.len() {
        return Err(MtError::LengthMismatch {
            what: "trapezoid samples",
            expected: x.len(),
            actual: y.len(),
        });
    }
    Ok(x.windows(2)
        .zip(y.windows(2))
        .map(|(xw, yw)| 0.5 * (xw[1] - xw[0]) * (yw[0] + yw[1]))
        .sum())
}

/// True when `values` is strictly increasing.
pub fn is_strictly_increasing(values: &[Real]) -> bool {
    values.windows(2).all(|w| w[1] > w[0])
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn geomspace_is_monotonic(
            start in 1e-3_f64..10.0,
            factor in 1.5_f64..1e3,
            n in 2_usize..12
        ) {
            let grid = geomspace(start, start * factor, n).unwrap();
            prop_assert_eq!(grid.len(), n);
            prop_assert!(is_strictly_increasing(&grid));
        }
    }
}
