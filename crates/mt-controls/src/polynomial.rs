//! Polynomial arithmetic on coefficient slices.
//!
//! Coefficients are stored in descending powers of `s`:
//! `[a_n, a_{n-1}, ..., a_0]` represents `a_n*s^n + ... + a_0`.

/// Drop leading zero coefficients, keeping at least one entry.
pub fn trim(p: &[f64]) -> Vec<f64> {
    match p.iter().position(|c| *c != 0.0) {
        Some(first) => p[first..].to_vec(),
        None => vec![0.0],
    }
}

/// Polynomial degree after trimming. The zero polynomial has degree 0.
pub fn degree(p: &[f64]) -> usize {
    trim(p).len() - 1
}

/// True when every coefficient is zero (or the slice is empty).
pub fn is_zero(p: &[f64]) -> bool {
    p.iter().all(|c| *c == 0.0)
}

/// Product of two polynomials (discrete convolution of coefficients).
pub fn mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return vec![0.0];
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, ai) in a.iter().enumerate() {
        for (j, bj) in b.iter().enumerate() {
            out[i + j] += ai * bj;
        }
    }
    out
}

/// Sum of two polynomials, aligned on the constant term.
pub fn add(a: &[f64], b: &[f64]) -> Vec<f64> {
    let n = a.len().max(b.len());
    let mut out = vec![0.0; n];
    for (k, c) in a.iter().rev().enumerate() {
        out[n - 1 - k] += c;
    }
    for (k, c) in b.iter().rev().enumerate() {
        out[n - 1 - k] += c;
    }
    out
}

/// Multiply every coefficient by `k`.
pub fn scale(p: &[f64], k: f64) -> Vec<f64> {
    p.iter().map(|c| c * k).collect()
}

/// Evaluate at a real point with Horner's rule.
pub fn eval(p: &[f64], s: f64) -> f64 {
    p.iter().fold(0.0, |acc, c| acc * s + c)
}

/// Divide both polynomials by the largest power of `s` they share.
pub fn cancel_origin_factors(num: &[f64], den: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let num = trim(num);
    let den = trim(den);
    if is_zero(&num) || is_zero(&den) {
        return (num, den);
    }
    let trailing = |p: &[f64]| p.iter().rev().take_while(|c| **c == 0.0).count();
    let k = trailing(&num).min(trailing(&den));
    (num[..num.len() - k].to_vec(), den[..den.len() - k].to_vec())
}

/// Left-pad with zeros to length `n`.
pub fn pad_to(p: &[f64], n: usize) -> Vec<f64> {
    if p.len() >= n {
        return p.to_vec();
    }
    let mut out = vec![0.0; n - p.len()];
    out.extend_from_slice(p);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_keeps_single_zero() {
        assert_eq!(trim(&[0.0, 0.0, 2.0, 1.0]), vec![2.0, 1.0]);
        assert_eq!(trim(&[0.0, 0.0]), vec![0.0]);
        assert_eq!(degree(&[0.0, 3.0, 1.0]), 1);
    }

    #[test]
    fn mul_expands_binomial() {
        // (s + 1)(s + 2) = s^2 + 3s + 2
        assert_eq!(mul(&[1.0, 1.0], &[1.0, 2.0]), vec![1.0, 3.0, 2.0]);
    }

    #[test]
    fn add_aligns_constant_terms() {
        // (s^2 + 1) + (2s + 3) = s^2 + 2s + 4
        assert_eq!(add(&[1.0, 0.0, 1.0], &[2.0, 3.0]), vec![1.0, 2.0, 4.0]);
    }

    #[test]
    fn eval_uses_horner() {
        assert_eq!(eval(&[1.0, 3.0, 2.0], 0.0), 2.0);
        assert_eq!(eval(&[1.0, 3.0, 2.0], 1.0), 6.0);
    }

    #[test]
    fn cancels_shared_integrators() {
        let (n, d) = cancel_origin_factors(&[0.0, 5.0, 0.0], &[1.0, 2.0, 0.0]);
        assert_eq!(n, vec![5.0]);
        assert_eq!(d, vec![1.0, 2.0]);
        let (n, d) = cancel_origin_factors(&[1.0, 0.0], &[1.0, 3.0]);
        assert_eq!(n, vec![1.0, 0.0]);
        assert_eq!(d, vec![1.0, 3.0]);
    }

    #[test]
    fn pad_to_prepends_zeros() {
        assert_eq!(pad_to(&[1.0, 2.0], 4), vec![0.0, 0.0, 1.0, 2.0]);
        assert_eq!(pad_to(&[1.0, 2.0], 1), vec![1.0, 2.0]);
    }
}
