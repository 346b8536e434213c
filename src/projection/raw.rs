//! Raw projection formulas
//!
//! A raw projection maps a point of the unit sphere, already rotated so the
//! projection's center sits at (0, 0), onto an unscaled plane with y pointing
//! up. Scaling, translation and the y flip to screen space are the engine's
//! job.

use enum_dispatch::enum_dispatch;
use glam::{DVec2, DVec3, dvec2, dvec3};
use std::f64::consts::SQRT_2;

use super::elliptic::{Complex, QUARTER_PERIOD, inverse_sd, sd_parts};

/// Common behavior for all raw projections
#[enum_dispatch]
pub trait RawProjection {
    /// Project a unit vector (x towards the center, y east, z north)
    fn project(&self, v: DVec3) -> DVec2;

    /// Unproject a plane point back to a unit vector
    fn invert(&self, p: DVec2) -> DVec3;
}

/// Every raw projection the catalog can refer to
#[enum_dispatch(RawProjection)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Raw {
    Equirectangular(Equirectangular),
    Quincuncial(Quincuncial),
}

// ============================================================================
// Equirectangular
// ============================================================================

/// Plate carrée: longitude and latitude in radians used directly as x and y
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Equirectangular;

impl RawProjection for Equirectangular {
    fn project(&self, v: DVec3) -> DVec2 {
        dvec2(v.y.atan2(v.x), v.z.clamp(-1.0, 1.0).asin())
    }

    fn invert(&self, p: DVec2) -> DVec3 {
        let (sin_lat, cos_lat) = p.y.sin_cos();
        let (sin_long, cos_long) = p.x.sin_cos();
        dvec3(cos_lat * cos_long, cos_lat * sin_long, sin_lat)
    }
}

// ============================================================================
// Peirce quincuncial
// ============================================================================

/// Peirce quincuncial projection.
///
/// The hemisphere around the center fills the diamond |x| + |y| ≤ K; the
/// far hemisphere folds into the four corner triangles of the square
/// [-K, K]², with the antipode at the corners.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Quincuncial;

impl Quincuncial {
    /// Half the side of the square the whole sphere maps to
    pub const HALF_SIDE: f64 = QUARTER_PERIOD;

    /// Diamond point for a stereographic coordinate inside the unit disk
    fn disk_to_diamond(w: Complex) -> DVec2 {
        let z = inverse_sd(w.scale(SQRT_2));
        dvec2(z.re, z.im)
    }

    /// Mirror a diamond point across the diamond edge of its quadrant
    fn reflect(z: DVec2, east: bool, north: bool) -> DVec2 {
        const K: f64 = QUARTER_PERIOD;
        match (east, north) {
            (true, true) => dvec2(K - z.y, K - z.x),
            (false, true) => dvec2(z.y - K, z.x + K),
            (false, false) => dvec2(-K - z.y, -K - z.x),
            (true, false) => dvec2(K + z.y, z.x - K),
        }
    }
}

impl RawProjection for Quincuncial {
    fn project(&self, v: DVec3) -> DVec2 {
        let east = v.y >= 0.0;
        let north = v.z >= 0.0;
        if v.x >= 0.0 {
            // Stereographic from the antipode lands inside the unit disk
            let w = Complex::new(v.y, v.z).scale(1.0 / (1.0 + v.x));
            Self::disk_to_diamond(w)
        } else {
            // Far hemisphere: project the mirror image, then reflect outward
            let w = Complex::new(v.y, v.z).scale(1.0 / (1.0 - v.x));
            Self::reflect(Self::disk_to_diamond(w), east, north)
        }
    }

    fn invert(&self, p: DVec2) -> DVec3 {
        // w = sd(ζ)/√2 everywhere on the square, by analytic continuation
        let (s, d) = sd_parts(Complex::new(p.x, p.y));
        let d = d.scale(SQRT_2);
        let (s2, d2) = (s.norm_sqr(), d.norm_sqr());
        let sum = s2 + d2;
        // 2w / (1 + |w|²) with w = s/d, kept finite where d vanishes
        let plane = (s * d.conj()).scale(2.0 / sum);
        dvec3((d2 - s2) / sum, plane.re, plane.im)
    }
}
