//! One-dimensional minimization: downhill bracketing plus Brent's method.

use crate::error::{SolverError, SolverResult};

const GOLDEN: f64 = 1.618_034;
const CGOLD: f64 = 0.381_966_0;
const GROW_LIMIT: f64 = 110.0;
const TINY: f64 = 1e-21;
const ZEPS: f64 = 1e-11;

/// A bracketing triple `a < b < c` (or `a > b > c`) with `f(b) <= f(a), f(c)`.
#[derive(Debug, Clone, Copy)]
pub struct Bracket {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub fa: f64,
    pub fb: f64,
    pub fc: f64,
    pub evaluations: usize,
}

/// Scalar minimum found by [`brent`].
#[derive(Debug, Clone, Copy)]
pub struct LineMinimum {
    pub x: f64,
    pub fx: f64,
    pub evaluations: usize,
}

/// Search downhill from `xa`, `xb` until a minimum is bracketed.
pub fn bracket<F>(f: &mut F, xa: f64, xb: f64, max_iterations: usize) -> SolverResult<Bracket>
where
    F: FnMut(f64) -> f64,
{
    let (mut xa, mut xb) = (xa, xb);
    let mut fa = f(xa);
    let mut fb = f(xb);
    if fa < fb {
        std::mem::swap(&mut xa, &mut xb);
        std::mem::swap(&mut fa, &mut fb);
    }
    let mut xc = xb + GOLDEN * (xb - xa);
    let mut fc = f(xc);
    let mut evaluations = 3;
    let mut iter = 0;

    while fc < fb {
        let tmp1 = (xb - xa) * (fb - fc);
        let tmp2 = (xb - xc) * (fb - fa);
        let val = tmp2 - tmp1;
        let denom = if val.abs() < TINY { 2.0 * TINY } else { 2.0 * val };
        let mut w = xb - ((xb - xc) * tmp2 - (xb - xa) * tmp1) / denom;
        let wlim = xb + GROW_LIMIT * (xc - xb);
        iter += 1;
        if iter > max_iterations {
            return Err(SolverError::Numeric {
                what: "too many iterations while bracketing a line minimum".to_string(),
            });
        }

        let mut fw;
        if (w - xc) * (xb - w) > 0.0 {
            fw = f(w);
            evaluations += 1;
            if fw < fc {
                xa = xb;
                xb = w;
                fa = fb;
                fb = fw;
                break;
            } else if fw > fb {
                xc = w;
                fc = fw;
                break;
            }
            w = xc + GOLDEN * (xc - xb);
            fw = f(w);
            evaluations += 1;
        } else if (w - wlim) * (wlim - xc) >= 0.0 {
            w = wlim;
            fw = f(w);
            evaluations += 1;
        } else if (w - wlim) * (xc - w) > 0.0 {
            fw = f(w);
            evaluations += 1;
            if fw < fc {
                xb = xc;
                xc = w;
                w = xc + GOLDEN * (xc - xb);
                fb = fc;
                fc = fw;
                fw = f(w);
                evaluations += 1;
            }
        } else {
            w = xc + GOLDEN * (xc - xb);
            fw = f(w);
            evaluations += 1;
        }
        xa = xb;
        xb = xc;
        xc = w;
        fa = fb;
        fb = fc;
        fc = fw;
    }

    Ok(Bracket {
        a: xa,
        b: xb,
        c: xc,
        fa,
        fb,
        fc,
        evaluations,
    })
}

/// Brent's parabolic/golden-section minimization inside a bracket.
///
/// `tol` is relative to `|x|`.
pub fn brent<F>(f: &mut F, br: &Bracket, tol: f64, max_iterations: usize) -> LineMinimum
where
    F: FnMut(f64) -> f64,
{
    let (mut a, mut b) = if br.a < br.c {
        (br.a, br.c)
    } else {
        (br.c, br.a)
    };
    let (mut x, mut w, mut v) = (br.b, br.b, br.b);
    let (mut fx, mut fw, mut fv) = (br.fb, br.fb, br.fb);
    let mut d: f64 = 0.0;
    let mut e: f64 = 0.0;
    let mut evaluations = 0;

    for _ in 0..max_iterations {
        let xm = 0.5 * (a + b);
        let tol1 = tol * x.abs() + ZEPS;
        let tol2 = 2.0 * tol1;
        if (x - xm).abs() <= tol2 - 0.5 * (b - a) {
            break;
        }

        let mut golden = true;
        if e.abs() > tol1 {
            // Trial parabolic fit through x, w, v
            let r = (x - w) * (fx - fv);
            let mut q = (x - v) * (fx - fw);
            let mut p = (x - v) * q - (x - w) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            let etemp = e;
            e = d;
            if p.abs() < (0.5 * q * etemp).abs() && p > q * (a - x) && p < q * (b - x) {
                d = p / q;
                let u = x + d;
                if u - a < tol2 || b - u < tol2 {
                    d = tol1.copysign(xm - x);
                }
                golden = false;
            }
        }
        if golden {
            e = if x >= xm { a - x } else { b - x };
            d = CGOLD * e;
        }

        let u = if d.abs() >= tol1 {
            x + d
        } else {
            x + tol1.copysign(d)
        };
        let fu = f(u);
        evaluations += 1;

        if fu <= fx {
            if u >= x {
                a = x;
            } else {
                b = x;
            }
            v = w;
            w = x;
            x = u;
            fv = fw;
            fw = fx;
            fx = fu;
        } else {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                v = w;
                w = u;
                fv = fw;
                fw = fu;
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        }
    }

    LineMinimum {
        x,
        fx,
        evaluations,
    }
}
