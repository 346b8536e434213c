//! Elliptic integrals and Jacobi elliptic functions for the quincuncial
//! projections.
//!
//! The Peirce quincuncial maps a hemisphere conformally onto a square using
//! elliptic functions of modulus k = 1/√2. The forward direction needs the
//! incomplete integral F for complex arguments (Carlson's R_F); the inverse
//! needs sn and dn of a complex argument.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Complete elliptic integral of the first kind K(m) for m = 1/2.
pub const QUARTER_PERIOD: f64 = 1.854_074_677_301_371_9;

/// Relative tolerance for the duplication algorithm; error scales as its 6th power.
const RF_TOLERANCE: f64 = 1e-3;

const MAX_ITERATIONS: usize = 64;

/// Complex number with f64 parts
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const ZERO: Complex = Complex { re: 0.0, im: 0.0 };
    pub const ONE: Complex = Complex { re: 1.0, im: 0.0 };
    pub const I: Complex = Complex { re: 0.0, im: 1.0 };

    #[inline]
    pub const fn new(re: f64, im: f64) -> Self {
        Complex { re, im }
    }

    #[inline]
    pub const fn real(re: f64) -> Self {
        Complex { re, im: 0.0 }
    }

    #[inline]
    pub fn norm_sqr(self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    #[inline]
    pub fn norm(self) -> f64 {
        self.re.hypot(self.im)
    }

    #[inline]
    pub fn conj(self) -> Self {
        Complex::new(self.re, -self.im)
    }

    #[inline]
    pub fn scale(self, k: f64) -> Self {
        Complex::new(self.re * k, self.im * k)
    }

    /// Principal square root (branch cut along the negative real axis)
    pub fn sqrt(self) -> Self {
        let r = self.norm();
        let re = ((r + self.re) / 2.0).sqrt();
        let im = ((r - self.re) / 2.0).sqrt();
        Complex::new(re, if self.im < 0.0 { -im } else { im })
    }

    pub fn is_finite(self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }
}

impl Add for Complex {
    type Output = Complex;
    fn add(self, rhs: Complex) -> Complex {
        Complex::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for Complex {
    type Output = Complex;
    fn sub(self, rhs: Complex) -> Complex {
        Complex::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for Complex {
    type Output = Complex;
    fn mul(self, rhs: Complex) -> Complex {
        Complex::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl Div for Complex {
    type Output = Complex;
    fn div(self, rhs: Complex) -> Complex {
        let d = rhs.norm_sqr();
        Complex::new(
            (self.re * rhs.re + self.im * rhs.im) / d,
            (self.im * rhs.re - self.re * rhs.im) / d,
        )
    }
}

impl Neg for Complex {
    type Output = Complex;
    fn neg(self) -> Complex {
        Complex::new(-self.re, -self.im)
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:+}i", self.re, self.im)
    }
}

/// Carlson's symmetric integral R_F(x, y, z) for complex arguments.
///
/// Arguments must lie off the negative real axis and at most one may be zero.
pub fn carlson_rf(x: Complex, y: Complex, z: Complex) -> Complex {
    const C1: f64 = 1.0 / 24.0;
    const C2: f64 = 0.1;
    const C3: f64 = 3.0 / 44.0;
    const C4: f64 = 1.0 / 14.0;

    let (mut x, mut y, mut z) = (x, y, z);
    let mut mean = (x + y + z).scale(1.0 / 3.0);
    let (mut dx, mut dy, mut dz) = (Complex::ZERO, Complex::ZERO, Complex::ZERO);

    for _ in 0..MAX_ITERATIONS {
        let (sx, sy, sz) = (x.sqrt(), y.sqrt(), z.sqrt());
        let lambda = sx * (sy + sz) + sy * sz;
        x = (x + lambda).scale(0.25);
        y = (y + lambda).scale(0.25);
        z = (z + lambda).scale(0.25);
        mean = (x + y + z).scale(1.0 / 3.0);
        dx = (mean - x) / mean;
        dy = (mean - y) / mean;
        dz = (mean - z) / mean;
        if dx.norm().max(dy.norm()).max(dz.norm()) < RF_TOLERANCE {
            break;
        }
    }

    let e2 = dx * dy - dz * dz;
    let e3 = dx * dy * dz;
    let series = Complex::ONE
        + (e2.scale(C1) - Complex::real(C2) - e3.scale(C3)) * e2
        + e3.scale(C4);
    series / mean.sqrt()
}

/// Jacobi elliptic functions (sn, cn, dn) of a real argument with parameter m.
///
/// Uses the arithmetic-geometric mean and descending Landen transformation.
pub fn jacobi(u: f64, m: f64) -> (f64, f64, f64) {
    if m <= 0.0 {
        let (s, c) = u.sin_cos();
        return (s, c, 1.0);
    }

    const STEPS: usize = 16;
    let mut a = [0.0; STEPS];
    let mut c = [0.0; STEPS];
    a[0] = 1.0;
    c[0] = m.sqrt();
    let mut b = (1.0 - m).sqrt();
    let mut n = 0;
    while c[n].abs() > f64::EPSILON && n < STEPS - 1 {
        a[n + 1] = (a[n] + b) / 2.0;
        c[n + 1] = (a[n] - b) / 2.0;
        b = (a[n] * b).sqrt();
        n += 1;
    }

    let mut phi = 2f64.powi(n as i32) * a[n] * u;
    for j in (1..=n).rev() {
        phi = (phi + (c[j] / a[j] * phi.sin()).asin()) / 2.0;
    }

    let (sn, cn) = phi.sin_cos();
    let dn = (1.0 - m * sn * sn).sqrt();
    (sn, cn, dn)
}

/// sn and dn of a complex argument for the self-complementary parameter m = 1/2.
///
/// Near the poles of sn and dn at ±iK the addition formulas degenerate to 0/0,
/// so points closer to the imaginary axis are evaluated through the imaginary
/// transformation sd(iu) = i·sd(u), which holds because m equals its complement.
/// Returns (S, D) with S/D = sd(z) up to a common factor.
pub fn sd_parts(z: Complex) -> (Complex, Complex) {
    if z.re.abs() >= z.im.abs() {
        sn_dn(z)
    } else {
        // z = i·(y - ix)
        let (s, d) = sn_dn(Complex::new(z.im, -z.re));
        (Complex::I * s, d)
    }
}

/// sn(x+iy) and dn(x+iy) for m = 1/2, sharing the denominator (omitted).
fn sn_dn(z: Complex) -> (Complex, Complex) {
    const M: f64 = 0.5;
    let (s, c, d) = jacobi(z.re, M);
    let (s1, c1, d1) = jacobi(z.im, 1.0 - M);
    let sn = Complex::new(s * d1, c * d * s1 * c1);
    let dn = Complex::new(d * c1 * d1, -M * s * c * s1);
    (sn, dn)
}

/// Inverse of sd for m = 1/2: the ζ with sd(ζ) = t, for |t| ≤ √2.
pub fn inverse_sd(t: Complex) -> Complex {
    // sd⁻¹(t) = t · R_F(1 - k'²t², 1, 1 + k²t²)
    let half_t2 = (t * t).scale(0.5);
    t * carlson_rf(Complex::ONE - half_t2, Complex::ONE, Complex::ONE + half_t2)
}
