//! Strongly-typed primitives shared by the transform pipeline.
//!
//! Screen points are plain `glam::DVec2` in pixels (y grows downwards).
//! Geographic positions are `LatLong` in degrees, always ordered
//! latitude-then-longitude.

use std::fmt;

use glam::{DVec2, dvec2};

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
    /// Value is zero when non-zero required
    Zero,
    /// Value is negative when positive required
    Negative,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
            NumericError::Zero => write!(f, "value is zero"),
            NumericError::Negative => write!(f, "value is negative"),
        }
    }
}

impl std::error::Error for NumericError {}

pub(crate) fn check_finite(val: f64) -> Result<f64, NumericError> {
    if val.is_nan() {
        Err(NumericError::NaN)
    } else if val.is_infinite() {
        Err(NumericError::Infinite)
    } else {
        Ok(val)
    }
}

pub(crate) fn check_non_negative(val: f64) -> Result<f64, NumericError> {
    let val = check_finite(val)?;
    if val < 0.0 {
        Err(NumericError::Negative)
    } else {
        Ok(val)
    }
}

pub(crate) fn check_positive(val: f64) -> Result<f64, NumericError> {
    let val = check_non_negative(val)?;
    if val == 0.0 {
        Err(NumericError::Zero)
    } else {
        Ok(val)
    }
}

/// Fold `value` into `[-half_range, half_range]` by whole periods.
///
/// Values already inside the range come back untouched, so folding is exact
/// for normalized input. Everything else is wrapped, never clamped; the
/// period arithmetic can then be off by a few ulps unless the value is a
/// whole number of degrees.
pub fn fold(value: f64, half_range: f64) -> f64 {
    if (-half_range..=half_range).contains(&value) {
        value
    } else {
        (value + half_range).rem_euclid(2.0 * half_range) - half_range
    }
}

// ============================================================================
// TileSize
// ============================================================================

/// Edge length of a square projection tile, in pixels
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct TileSize(f64);

impl TileSize {
    /// Create a tile size with validation (rejects NaN, infinite, zero, negative)
    pub fn try_new(px: f64) -> Result<Self, NumericError> {
        check_positive(px).map(TileSize)
    }

    #[inline]
    pub fn px(self) -> f64 {
        self.0
    }

    /// Center of the tile in tile-local pixels
    #[inline]
    pub fn center(self) -> DVec2 {
        DVec2::splat(self.0 / 2.0)
    }
}

// ============================================================================
// LatLong
// ============================================================================

/// A geographic position in degrees
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct LatLong {
    pub lat: f64,
    pub long: f64,
}

impl LatLong {
    pub const fn new(lat: f64, long: f64) -> Self {
        LatLong { lat, long }
    }

    /// Create a position with validation (rejects NaN/infinite components)
    pub fn try_new(lat: f64, long: f64) -> Result<Self, NumericError> {
        Ok(LatLong {
            lat: check_finite(lat)?,
            long: check_finite(long)?,
        })
    }

    /// Longitude folded into [-180, 180], latitude folded into [-90, 90].
    ///
    /// Upstream averaging may hand us sums far outside the valid domain, so
    /// both axes wrap by whole periods (360° and 180°) instead of clamping.
    pub fn normalized(self) -> Self {
        LatLong {
            lat: fold(self.lat, 90.0),
            long: fold(self.long, 180.0),
        }
    }

    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.long.is_finite()
    }

    /// Great-circle angle between two positions, in degrees
    pub fn angle_to(self, other: LatLong) -> f64 {
        let (a, b) = (self.to_unit(), other.to_unit());
        a.dot(b).clamp(-1.0, 1.0).acos().to_degrees()
    }

    /// Unit vector on the sphere: x towards (0, 0), y towards (0, 90E), z north
    pub(crate) fn to_unit(self) -> glam::DVec3 {
        let (sin_lat, cos_lat) = self.lat.to_radians().sin_cos();
        let (sin_long, cos_long) = self.long.to_radians().sin_cos();
        glam::dvec3(cos_lat * cos_long, cos_lat * sin_long, sin_lat)
    }

    pub(crate) fn from_unit(v: glam::DVec3) -> Self {
        LatLong {
            lat: v.z.clamp(-1.0, 1.0).asin().to_degrees(),
            long: v.y.atan2(v.x).to_degrees(),
        }
    }
}

impl fmt::Display for LatLong {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.long)
    }
}

// ============================================================================
// Rect
// ============================================================================

/// Axis-aligned rectangle in document pixels
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Rect {
            left,
            top,
            width,
            height,
        }
    }

    /// A rectangle at the origin with the given size (tile-local bounds)
    pub fn sized(size: DVec2) -> Self {
        Rect::new(0.0, 0.0, size.x, size.y)
    }

    #[inline]
    pub fn origin(&self) -> DVec2 {
        dvec2(self.left, self.top)
    }

    #[inline]
    pub fn size(&self) -> DVec2 {
        dvec2(self.width, self.height)
    }

    /// The far corner (origin + size)
    #[inline]
    pub fn extent(&self) -> DVec2 {
        self.origin() + self.size()
    }

    pub fn center(&self) -> DVec2 {
        self.origin() + self.size() / 2.0
    }

    /// Inclusive containment on both axes
    pub fn contains(&self, point: DVec2) -> bool {
        let (min, max) = (self.origin(), self.extent());
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }

    /// Smallest rectangle covering both `self` and `other`
    pub fn union(&self, other: &Rect) -> Rect {
        let min = self.origin().min(other.origin());
        let max = self.extent().max(other.extent());
        Rect::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Union of every rectangle, or `None` for an empty iterator
    pub fn union_all<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
        rects
            .into_iter()
            .fold(None, |acc: Option<Rect>, r| Some(acc.map_or(*r, |a| a.union(r))))
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} at ({}, {})",
            self.width, self.height, self.left, self.top
        )
    }
}
