//! Geographic projection engine
//!
//! Builds a concrete projection from a catalog kind: the sphere is rotated,
//! clipped and handed to a raw projection, and the raw plane is fitted so the
//! reference outline exactly fills a square tile.

pub mod elliptic;
pub mod outline;
pub mod raw;

use glam::{DMat3, DVec2, DVec3, dvec2, dvec3};

use crate::catalog::{ProjectionCatalog, ProjectionKind, Rotation};
use crate::errors::{BuildError, FitError};
use crate::log::debug;
use crate::types::{LatLong, TileSize};

pub use outline::ReferenceOutline;
pub use raw::{Raw, RawProjection};

/// Points this close to the clip circle count as visible
const CLIP_EPSILON: f64 = 1e-12;

/// Offset that pushes a point on a raw-plane cut to its negative side
const SEAM_OFFSET: f64 = 1e-12;

/// Tuning for the fit-to-tile step
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitOptions {
    /// Spacing in degrees of the points sampled along the outline and the
    /// clip circle
    pub sample_step: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        FitOptions { sample_step: 1.0 }
    }
}

/// Rotation matrix taking geographic unit vectors into the projection frame
fn rotation_matrix(rotation: Rotation) -> DMat3 {
    DMat3::from_rotation_x(rotation.gamma.to_radians())
        * DMat3::from_rotation_y(-rotation.phi.to_radians())
        * DMat3::from_rotation_z(rotation.lambda.to_radians())
}

/// Raw plane to a y-down frame
#[inline]
fn flip(p: DVec2) -> DVec2 {
    dvec2(p.x, -p.y)
}

/// A projection bound to one tile size
#[derive(Clone, Debug, PartialEq)]
pub struct GeoProjectionEngine {
    kind: ProjectionKind,
    raw: Raw,
    rotation: DMat3,
    /// Cosine of the clip angle; `None` when unclipped
    clip_cos: Option<f64>,
    size: TileSize,
    /// Pixels per raw unit on each axis, scale multiplier included
    scale: DVec2,
    /// Tile-local pixel position of `anchor`
    translate: DVec2,
    /// Flipped raw-plane point pinned under scaling
    anchor: DVec2,
}

impl GeoProjectionEngine {
    /// Build and fit a projection with default fit options
    pub fn create(
        kind: &ProjectionKind,
        tile_size_px: f64,
        outline: &ReferenceOutline,
    ) -> Result<Self, FitError> {
        Self::create_with(kind, tile_size_px, outline, FitOptions::default())
    }

    /// Build a projection and fit `outline` to a `tile_size_px` square.
    ///
    /// The catalog scale multiplies the fitted scale afterwards, keeping the
    /// kind's center (or the projection origin) fixed.
    pub fn create_with(
        kind: &ProjectionKind,
        tile_size_px: f64,
        outline: &ReferenceOutline,
        options: FitOptions,
    ) -> Result<Self, FitError> {
        let size =
            TileSize::try_new(tile_size_px).map_err(|source| FitError::InvalidTileSize { source })?;
        if outline.is_empty() {
            return Err(FitError::EmptyOutline);
        }

        let params = kind.parameters();
        params.validate()?;
        let mut engine = GeoProjectionEngine {
            kind: kind.clone(),
            raw: kind.raw(),
            rotation: rotation_matrix(params.rotation),
            clip_cos: (params.clip_angle > 0.0).then(|| params.clip_angle.to_radians().cos()),
            size,
            scale: DVec2::ONE,
            translate: DVec2::ZERO,
            anchor: DVec2::ZERO,
        };
        engine.anchor = params
            .center
            .map(|c| engine.plane(engine.rotation * c.normalized().to_unit()))
            .unwrap_or(DVec2::ZERO);

        let (min, max) = engine.projected_bounds(outline, options.sample_step);
        let extent = max - min;
        if !(extent.x > 0.0 && extent.y > 0.0 && extent.is_finite()) {
            return Err(FitError::DegenerateExtent {
                width: extent.x,
                height: extent.y,
            });
        }

        let side = size.px();
        let fitted = DVec2::splat(side) / extent;
        engine.translate = size.center() - fitted * (min + max) / 2.0;
        engine.scale = fitted * params.scale;

        debug!(
            kind = kind.name(),
            scale = ?engine.scale,
            translate = ?engine.translate,
            "fitted projection"
        );
        Ok(engine)
    }

    /// Resolve `name` in `catalog` and fit it
    pub fn for_name(
        catalog: &ProjectionCatalog,
        name: &str,
        tile_size_px: f64,
        outline: &ReferenceOutline,
    ) -> Result<Self, BuildError> {
        let kind = catalog.resolve(name)?;
        Ok(Self::create(kind, tile_size_px, outline)?)
    }

    /// Flipped raw-plane point of a rotated unit vector
    fn plane(&self, v: DVec3) -> DVec2 {
        flip(self.raw.project(v))
    }

    fn visible(&self, v: DVec3) -> bool {
        self.clip_cos.is_none_or(|c| v.x >= c - CLIP_EPSILON)
    }

    /// Bounds of the visible outline (and clip circle) relative to the anchor.
    ///
    /// Edges crossing the back meridian of the projection frame contribute
    /// the seam point on both sides, and samples near the antipode contribute
    /// all of its images, so cuts in the raw plane still reach the tile edge.
    fn projected_bounds(&self, outline: &ReferenceOutline, step: f64) -> (DVec2, DVec2) {
        let mut min = DVec2::splat(f64::INFINITY);
        let mut max = DVec2::splat(f64::NEG_INFINITY);
        let mut include = |v: DVec3| {
            if self.visible(v) {
                let p = self.plane(v) - self.anchor;
                if p.is_finite() {
                    min = min.min(p);
                    max = max.max(p);
                }
            }
        };

        let near_antipode = -step.max(0.0).to_radians().cos();
        for ring in outline.sampled_rings(step) {
            let mut prev: Option<DVec3> = None;
            for at in ring {
                let v = self.rotation * at.to_unit();
                include(v);
                if let Some(a) = prev.filter(|a| a.y * v.y < 0.0) {
                    let seam = a.lerp(v, a.y / (a.y - v.y));
                    if seam.x < 0.0 {
                        let seam = dvec3(seam.x, 0.0, seam.z).normalize();
                        include(seam);
                        include(dvec3(seam.x, -SEAM_OFFSET, seam.z));
                    }
                }
                if v.x <= near_antipode {
                    for (y, z) in [(1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0), (1.0, -1.0)] {
                        include(dvec3(-1.0, y * SEAM_OFFSET, z * SEAM_OFFSET));
                    }
                }
                prev = Some(v);
            }
        }

        if let Some(cos) = self.clip_cos {
            let sin = (1.0 - cos * cos).max(0.0).sqrt();
            let n = if step > 0.0 { (360.0 / step).ceil() as usize } else { 360 };
            for i in 0..n {
                let (s, c) = (i as f64 * 360.0 / n as f64).to_radians().sin_cos();
                include(dvec3(cos, sin * c, sin * s));
            }
        }
        (min, max)
    }

    /// Geographic position to tile-local pixels.
    ///
    /// Input is folded into range first, so denormalized sums are accepted.
    pub fn forward(&self, at: LatLong) -> DVec2 {
        let v = self.rotation * at.normalized().to_unit();
        self.translate + self.scale * (self.plane(v) - self.anchor)
    }

    /// Tile-local pixels to a normalized geographic position
    pub fn inverse(&self, point: DVec2) -> LatLong {
        let plane = (point - self.translate) / self.scale + self.anchor;
        let v = self.raw.invert(flip(plane));
        LatLong::from_unit(self.rotation.transpose() * v).normalized()
    }

    /// True if `at` lies beyond the clip angle and is not drawn
    pub fn is_clipped(&self, at: LatLong) -> bool {
        !self.visible(self.rotation * at.normalized().to_unit())
    }

    pub fn kind(&self) -> &ProjectionKind {
        &self.kind
    }

    pub fn tile_size(&self) -> TileSize {
        self.size
    }

    /// Pixels per raw unit on each axis
    pub fn scale(&self) -> DVec2 {
        self.scale
    }

    /// Tile-local position of the projection's pinned center
    pub fn translate(&self) -> DVec2 {
        self.translate
    }
}
